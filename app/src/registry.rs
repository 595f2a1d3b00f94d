//! Ordered list of runnable examples.

use crate::example::Example;

/// Creates a fresh example instance.
pub type ExampleConstructor = fn() -> Box<dyn Example>;

/// A named example constructor.
#[derive(Clone, Copy)]
pub struct ExampleEntry {
    pub name: &'static str,
    pub create: ExampleConstructor,
}

impl std::fmt::Debug for ExampleEntry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ExampleEntry")
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}

/// Examples in registration order.
#[derive(Debug, Default, Clone)]
pub struct ExampleRegistry {
    entries: Vec<ExampleEntry>,
}

impl ExampleRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an example. Names are unique ignoring case; a duplicate is
    /// ignored with a warning.
    pub fn register(&mut self, name: &'static str, create: ExampleConstructor) {
        if self.find(name).is_some() {
            log::warn!("Example '{name}' registered twice, keeping the first");
            return;
        }
        self.entries.push(ExampleEntry { name, create });
    }

    pub fn with(mut self, name: &'static str, create: ExampleConstructor) -> Self {
        self.register(name, create);
        self
    }

    /// Look up an example by name, ignoring ASCII case.
    pub fn find(&self, name: &str) -> Option<&ExampleEntry> {
        self.entries
            .iter()
            .find(|entry| entry.name.eq_ignore_ascii_case(name))
    }

    pub fn names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.entries.iter().map(|entry| entry.name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &ExampleEntry> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ExampleError;
    use crate::example::{ExampleContext, Frame};

    struct Nothing;

    impl Example for Nothing {
        fn init(&mut self, _ctx: &mut ExampleContext<'_>) -> Result<(), ExampleError> {
            Ok(())
        }

        fn draw(&mut self, _frame: &mut Frame<'_>) -> Result<(), ExampleError> {
            Ok(())
        }
    }

    fn nothing() -> Box<dyn Example> {
        Box::new(Nothing)
    }

    fn registry() -> ExampleRegistry {
        ExampleRegistry::new()
            .with("ClearScreen", nothing)
            .with("BasicTriangle", nothing)
            .with("CullMode", nothing)
    }

    #[test]
    fn test_find_ignores_case() {
        let registry = registry();
        assert_eq!(registry.find("basictriangle").map(|e| e.name), Some("BasicTriangle"));
        assert_eq!(registry.find("CULLMODE").map(|e| e.name), Some("CullMode"));
        assert!(registry.find("Triangle").is_none());
    }

    #[test]
    fn test_order_and_duplicates() {
        let mut registry = registry();
        registry.register("clearscreen", nothing);
        assert_eq!(registry.len(), 3);
        assert_eq!(
            registry.names().collect::<Vec<_>>(),
            vec!["ClearScreen", "BasicTriangle", "CullMode"]
        );
    }
}
