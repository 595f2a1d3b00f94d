//! Content root discovery.

use std::env;
use std::path::{Path, PathBuf};

use crate::error::AppError;

/// Environment variable overriding the content root.
pub const CONTENT_ENV: &str = "GPU_EXAMPLES_CONTENT";

/// Directory name searched for next to and above the executable.
pub const CONTENT_DIR_NAME: &str = "content";

/// Candidate content roots, in priority order.
///
/// An explicit directory and the environment override are taken as given.
/// Otherwise `content` is looked for beside the executable and in each of
/// its ancestors, then `fallback` is used.
pub fn content_candidates(
    explicit: Option<&Path>,
    env_override: Option<PathBuf>,
    exe: Option<&Path>,
    fallback: &Path,
) -> Vec<PathBuf> {
    if let Some(dir) = explicit {
        return vec![dir.to_path_buf()];
    }
    if let Some(dir) = env_override {
        return vec![dir];
    }

    let mut candidates: Vec<PathBuf> = exe
        .and_then(Path::parent)
        .map(|dir| {
            dir.ancestors()
                .map(|ancestor| ancestor.join(CONTENT_DIR_NAME))
                .collect()
        })
        .unwrap_or_default();
    candidates.push(fallback.to_path_buf());
    candidates
}

/// Find the content root, see [`content_candidates`].
pub fn find_content_root(explicit: Option<&Path>, fallback: &Path) -> Result<PathBuf, AppError> {
    let exe = env::current_exe().ok();
    let candidates = content_candidates(
        explicit,
        env::var_os(CONTENT_ENV).map(PathBuf::from),
        exe.as_deref(),
        fallback,
    );

    match candidates.iter().find(|dir| dir.is_dir()) {
        Some(dir) => {
            log::info!("Content root: {:?}", dir);
            Ok(dir.clone())
        }
        None => Err(AppError::ContentNotFound(candidates)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_explicit_wins() {
        let candidates = content_candidates(
            Some(Path::new("/my/content")),
            Some(PathBuf::from("/env/content")),
            Some(Path::new("/opt/app/bin/gpu-examples")),
            Path::new("/fallback"),
        );
        assert_eq!(candidates, vec![PathBuf::from("/my/content")]);
    }

    #[test]
    fn test_env_before_exe() {
        let candidates = content_candidates(
            None,
            Some(PathBuf::from("/env/content")),
            Some(Path::new("/opt/app/bin/gpu-examples")),
            Path::new("/fallback"),
        );
        assert_eq!(candidates, vec![PathBuf::from("/env/content")]);
    }

    #[test]
    fn test_exe_ancestors_then_fallback() {
        let candidates = content_candidates(
            None,
            None,
            Some(Path::new("/opt/app/bin/gpu-examples")),
            Path::new("/fallback"),
        );
        assert_eq!(
            candidates,
            vec![
                PathBuf::from("/opt/app/bin/content"),
                PathBuf::from("/opt/app/content"),
                PathBuf::from("/opt/content"),
                PathBuf::from("/content"),
                PathBuf::from("/fallback"),
            ]
        );
    }

    #[test]
    fn test_find_uses_existing_explicit_dir() {
        let dir = tempfile::tempdir().unwrap();
        let found = find_content_root(Some(dir.path()), Path::new("/nope")).unwrap();
        assert_eq!(found, dir.path());
    }

    #[test]
    fn test_missing_explicit_dir_fails() {
        let err = find_content_root(Some(Path::new("/definitely/missing")), Path::new("/nope"))
            .unwrap_err();
        assert!(matches!(err, AppError::ContentNotFound(_)));
    }
}
