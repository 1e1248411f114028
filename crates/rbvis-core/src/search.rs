//! Mesh search-path resolution.
//!
//! Descriptor files reference meshes by relative name; the host decides
//! which directories those names resolve against.

use std::path::{Path, PathBuf};

/// Ordered list of directories searched for relative mesh references.
#[derive(Debug, Clone, Default)]
pub struct MeshSearchPaths {
    dirs: Vec<PathBuf>,
}

impl MeshSearchPaths {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_dirs(dirs: impl IntoIterator<Item = impl Into<PathBuf>>) -> Self {
        Self {
            dirs: dirs.into_iter().map(Into::into).collect(),
        }
    }

    /// Append a directory; earlier directories take precedence.
    pub fn push_dir(&mut self, dir: impl Into<PathBuf>) {
        self.dirs.push(dir.into());
    }

    pub fn dirs(&self) -> &[PathBuf] {
        &self.dirs
    }

    /// Resolve a mesh reference to an existing file. Absolute paths pass
    /// through unchanged if they exist; relative ones are tried against
    /// each directory in order.
    pub fn resolve(&self, src: impl AsRef<Path>) -> Option<PathBuf> {
        let src = src.as_ref();
        if src.is_absolute() {
            return src.is_file().then(|| src.to_path_buf());
        }
        self.dirs.iter().map(|dir| dir.join(src)).find(|p| p.is_file())
    }
}
