//! Filesystem-backed range loader.

use std::path::{Path, PathBuf};

use cis_coverage::{RangeLoader, RangeReference};
use tracing::debug;

/// Reads referenced payloads from local files.
///
/// Relative hrefs resolve against the directory of the coverage document.
/// `file://` hrefs are accepted; other schemes are rejected.
#[derive(Debug, Clone)]
pub struct FileLoader {
    base_dir: PathBuf,
}

impl FileLoader {
    pub fn new(base_dir: impl Into<PathBuf>) -> Self {
        Self {
            base_dir: base_dir.into(),
        }
    }

    /// Loader rooted at the directory containing `document`.
    pub fn for_document(document: &Path) -> Self {
        let base = document
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from("."));
        Self::new(base)
    }

    pub fn resolve_path(&self, href: &str) -> Result<PathBuf, String> {
        let path = match href.split_once("://") {
            Some(("file", rest)) => rest,
            Some((scheme, _)) => return Err(format!("unsupported href scheme '{}'", scheme)),
            None => href,
        };
        let path = Path::new(path);
        if path.is_absolute() {
            Ok(path.to_path_buf())
        } else {
            Ok(self.base_dir.join(path))
        }
    }
}

impl RangeLoader for FileLoader {
    fn load(
        &self,
        reference: &RangeReference,
    ) -> Result<Vec<u8>, Box<dyn std::error::Error + Send + Sync>> {
        let path = self.resolve_path(&reference.href)?;
        debug!(path = %path.display(), "Reading referenced range set");
        Ok(std::fs::read(&path)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_relative_href() {
        let loader = FileLoader::new("/data/cubes");
        assert_eq!(
            loader.resolve_path("chl/values.bin").unwrap(),
            PathBuf::from("/data/cubes/chl/values.bin")
        );
    }

    #[test]
    fn test_file_scheme() {
        let loader = FileLoader::new("/data/cubes");
        assert_eq!(
            loader.resolve_path("file:///tmp/values.json").unwrap(),
            PathBuf::from("/tmp/values.json")
        );
    }

    #[test]
    fn test_other_scheme_rejected() {
        let loader = FileLoader::new("/data/cubes");
        assert!(loader.resolve_path("https://example.com/values.json").is_err());
    }

    #[test]
    fn test_for_document() {
        let loader = FileLoader::for_document(Path::new("/data/cubes/chl.json"));
        assert_eq!(
            loader.resolve_path("values.bin").unwrap(),
            PathBuf::from("/data/cubes/values.bin")
        );
    }

    #[test]
    fn test_load_from_disk() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("values.json"), b"[1, 2]").unwrap();
        let loader = FileLoader::new(dir.path());
        let bytes = loader
            .load(&RangeReference::new("values.json", None))
            .unwrap();
        assert_eq!(bytes, b"[1, 2]");
        assert!(loader.load(&RangeReference::new("missing.json", None)).is_err());
    }
}
