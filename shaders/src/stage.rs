//! Shader stages, bytecode formats and resource counts.

use bitflags::bitflags;

/// Pipeline stage a shader runs in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ShaderStage {
    Vertex,
    Fragment,
    Compute,
}

impl ShaderStage {
    /// Stage name as understood by command-line compilers.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Vertex => "vertex",
            Self::Fragment => "fragment",
            Self::Compute => "compute",
        }
    }

    pub fn to_naga(self) -> naga::ShaderStage {
        match self {
            Self::Vertex => naga::ShaderStage::Vertex,
            Self::Fragment => naga::ShaderStage::Fragment,
            Self::Compute => naga::ShaderStage::Compute,
        }
    }
}

/// Infer the stage from a shader name.
///
/// `.vert` is checked before `.frag`, both as substrings, so
/// `Foo.vert.frag` is a vertex shader. Compute shaders are never inferred
/// and must be loaded with an explicit stage.
pub fn infer_stage(name: &str) -> Option<ShaderStage> {
    if name.contains(".vert") {
        Some(ShaderStage::Vertex)
    } else if name.contains(".frag") {
        Some(ShaderStage::Fragment)
    } else {
        None
    }
}

/// Target bytecode format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ShaderFormat {
    SpirV,
    Dxil,
    Msl,
}

impl ShaderFormat {
    pub const ALL: [ShaderFormat; 3] = [Self::SpirV, Self::Dxil, Self::Msl];

    /// Directory under the compiled-shader root holding this format.
    pub fn dir_name(&self) -> &'static str {
        match self {
            Self::SpirV => "SPIRV",
            Self::Dxil => "DXIL",
            Self::Msl => "MSL",
        }
    }

    /// File extension of cached artifacts.
    pub fn extension(&self) -> &'static str {
        match self {
            Self::SpirV => "spv",
            Self::Dxil => "dxil",
            Self::Msl => "msl",
        }
    }

    /// The format the current platform's native backend consumes.
    pub fn platform_preferred() -> Self {
        if cfg!(target_os = "windows") {
            Self::Dxil
        } else if cfg!(any(target_os = "macos", target_os = "ios")) {
            Self::Msl
        } else {
            Self::SpirV
        }
    }

    /// Parse a user-facing name (`spirv`, `dxil`, `msl`), case-insensitively.
    pub fn from_name(name: &str) -> Option<Self> {
        match name.to_ascii_lowercase().as_str() {
            "spirv" | "spir-v" | "spv" => Some(Self::SpirV),
            "dxil" => Some(Self::Dxil),
            "msl" | "metal" => Some(Self::Msl),
            _ => None,
        }
    }

    pub fn flag(&self) -> ShaderFormats {
        match self {
            Self::SpirV => ShaderFormats::SPIRV,
            Self::Dxil => ShaderFormats::DXIL,
            Self::Msl => ShaderFormats::MSL,
        }
    }
}

bitflags! {
    /// Set of bytecode formats a device accepts.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct ShaderFormats: u32 {
        const SPIRV = 1 << 0;
        const DXIL = 1 << 1;
        const MSL = 1 << 2;
    }
}

impl ShaderFormats {
    pub fn supports(&self, format: ShaderFormat) -> bool {
        self.contains(format.flag())
    }
}

/// Resource slot counts declared for a shader.
///
/// Not interpreted here; handed to the device unchanged.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct ShaderResourceCounts {
    pub samplers: u32,
    pub uniform_buffers: u32,
    pub storage_buffers: u32,
    pub storage_textures: u32,
}

impl ShaderResourceCounts {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_samplers(mut self, count: u32) -> Self {
        self.samplers = count;
        self
    }

    pub fn with_uniform_buffers(mut self, count: u32) -> Self {
        self.uniform_buffers = count;
        self
    }

    pub fn with_storage_buffers(mut self, count: u32) -> Self {
        self.storage_buffers = count;
        self
    }

    pub fn with_storage_textures(mut self, count: u32) -> Self {
        self.storage_textures = count;
        self
    }
}

/// Everything a device needs to create a shader object.
#[derive(Debug, Clone, Copy)]
pub struct ShaderCreateInfo<'a> {
    pub name: &'a str,
    pub code: &'a [u8],
    pub entry_point: &'a str,
    pub format: ShaderFormat,
    pub stage: ShaderStage,
    pub resources: ShaderResourceCounts,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("RawTriangle.vert", Some(ShaderStage::Vertex))]
    #[case("SolidColor.frag", Some(ShaderStage::Fragment))]
    #[case("Foo.vert.frag", Some(ShaderStage::Vertex))]
    #[case("my.vertex_shader", Some(ShaderStage::Vertex))]
    #[case("FillTexture.comp", None)]
    #[case("Plain", None)]
    #[case("", None)]
    fn test_infer_stage(#[case] name: &str, #[case] expected: Option<ShaderStage>) {
        assert_eq!(infer_stage(name), expected);
    }

    #[test]
    fn test_format_layout() {
        assert_eq!(ShaderFormat::SpirV.dir_name(), "SPIRV");
        assert_eq!(ShaderFormat::SpirV.extension(), "spv");
        assert_eq!(ShaderFormat::Dxil.dir_name(), "DXIL");
        assert_eq!(ShaderFormat::Dxil.extension(), "dxil");
        assert_eq!(ShaderFormat::Msl.dir_name(), "MSL");
        assert_eq!(ShaderFormat::Msl.extension(), "msl");
    }

    #[test]
    fn test_platform_preferred() {
        let format = ShaderFormat::platform_preferred();
        if cfg!(target_os = "windows") {
            assert_eq!(format, ShaderFormat::Dxil);
        } else if cfg!(target_os = "macos") {
            assert_eq!(format, ShaderFormat::Msl);
        } else {
            assert_eq!(format, ShaderFormat::SpirV);
        }
    }

    #[test]
    fn test_format_from_name() {
        assert_eq!(ShaderFormat::from_name("SPIRV"), Some(ShaderFormat::SpirV));
        assert_eq!(ShaderFormat::from_name("metal"), Some(ShaderFormat::Msl));
        assert_eq!(ShaderFormat::from_name("dxbc"), None);
    }

    #[test]
    fn test_formats_supports() {
        let formats = ShaderFormats::SPIRV | ShaderFormats::MSL;
        assert!(formats.supports(ShaderFormat::SpirV));
        assert!(formats.supports(ShaderFormat::Msl));
        assert!(!formats.supports(ShaderFormat::Dxil));
        assert!(!ShaderFormats::empty().supports(ShaderFormat::SpirV));
    }

    #[test]
    fn test_resource_counts_builder() {
        let counts = ShaderResourceCounts::new()
            .with_samplers(1)
            .with_uniform_buffers(2)
            .with_storage_textures(1);
        assert_eq!(counts.samplers, 1);
        assert_eq!(counts.uniform_buffers, 2);
        assert_eq!(counts.storage_buffers, 0);
        assert_eq!(counts.storage_textures, 1);
    }
}
