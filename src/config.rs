//! Engine configuration

use std::path::{Path, PathBuf};

/// Default separator used to join `asis` chunk lines
pub const DEFAULT_LINE_SEP: &str = "\n";
/// Default number of body lines echoed back when `echo` is enabled
pub const DEFAULT_MAX_ECHO: usize = 20;

/// Configuration shared by every chunk an engine processes
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Directory relative `external.file` / `output.file` paths resolve against
    pub base_dir: PathBuf,
    /// Separator used when a chunk sets no `line.sep`
    pub default_line_sep: String,
    /// Echo limit used when a chunk sets no `max.echo`
    pub default_max_echo: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            base_dir: PathBuf::from("."),
            default_line_sep: DEFAULT_LINE_SEP.to_string(),
            default_max_echo: DEFAULT_MAX_ECHO,
        }
    }
}

impl EngineConfig {
    /// Config rooted at the directory of the document being rendered
    pub fn with_base_dir(base_dir: impl Into<PathBuf>) -> Self {
        Self {
            base_dir: base_dir.into(),
            ..Self::default()
        }
    }

    /// Resolve a chunk-supplied path against `base_dir`
    pub fn resolve_path(&self, path: &Path) -> PathBuf {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.base_dir.join(path)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = EngineConfig::default();
        assert_eq!(config.default_line_sep, "\n");
        assert_eq!(config.default_max_echo, 20);
    }

    #[test]
    fn test_resolve_relative_path() {
        let config = EngineConfig::with_base_dir("/docs/report");
        assert_eq!(
            config.resolve_path(Path::new("data/a.csv")),
            PathBuf::from("/docs/report/data/a.csv")
        );
    }

    #[test]
    fn test_resolve_absolute_path() {
        let config = EngineConfig::with_base_dir("/docs/report");
        assert_eq!(config.resolve_path(Path::new("/tmp/a.bin")), PathBuf::from("/tmp/a.bin"));
    }
}
