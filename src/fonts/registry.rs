//! Font registry over the engine's virtual filesystem

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::engine::{PdfEngine, VfsError};
use crate::error::Result;

/// A font file to be written verbatim into the engine filesystem
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FontDescriptor {
    /// File name under the registry root; may contain `/` subdirectories
    pub name: String,
    /// Raw font bytes
    pub data: Vec<u8>,
}

/// Writes fonts into the engine filesystem under a fixed root
pub struct FontRegistry<'a> {
    engine: &'a dyn PdfEngine,
    root: String,
}

impl<'a> FontRegistry<'a> {
    pub(crate) fn new(engine: &'a dyn PdfEngine, root: &str) -> Self {
        Self {
            engine,
            root: root.trim_end_matches('/').to_string(),
        }
    }

    pub fn root(&self) -> &str {
        &self.root
    }

    fn validate(&self, name: &str) -> Result<()> {
        let escapes = name.is_empty()
            || name.starts_with('/')
            || name.split('/').any(|part| part.is_empty() || part == ".." || part == ".");
        if escapes {
            return Err(VfsError::InvalidPath(name.to_string()).into());
        }
        Ok(())
    }

    /// Create a directory, tolerating one that already exists.
    fn mkdir_idempotent(&self, path: &str) -> Result<()> {
        match self.engine.fs_mkdir(path) {
            Ok(()) | Err(VfsError::AlreadyExists(_)) => Ok(()),
            Err(err) => Err(err.into()),
        }
    }

    /// Write a font into the filesystem, creating directories as needed.
    pub fn install(&self, font: &FontDescriptor) -> Result<()> {
        self.validate(&font.name)?;

        self.mkdir_idempotent(&self.root)?;
        let mut dir = self.root.clone();
        let mut parts = font.name.split('/').peekable();
        while let Some(part) = parts.next() {
            if parts.peek().is_none() {
                break;
            }
            dir = format!("{dir}/{part}");
            self.mkdir_idempotent(&dir)?;
        }

        let path = format!("{}/{}", self.root, font.name);
        self.engine.fs_write(&path, &font.data)?;
        debug!(%path, size = font.data.len(), "font installed");
        Ok(())
    }

    /// Names directly under the registry root. An absent root counts as an
    /// empty registry.
    pub fn list(&self) -> Result<Vec<String>> {
        match self.engine.fs_read_dir(&self.root) {
            Ok(names) => Ok(names),
            Err(VfsError::NotFound(_)) => Ok(Vec::new()),
            Err(err) => Err(err.into()),
        }
    }

    /// Whether a font file with this name is installed.
    pub fn contains(&self, name: &str) -> bool {
        if self.validate(name).is_err() {
            return false;
        }
        let path = format!("{}/{}", self.root, name);
        matches!(self.engine.fs_stat(&path), Ok(stat) if !stat.is_dir)
    }

    /// Remove an installed font file.
    pub fn remove(&self, name: &str) -> Result<()> {
        self.validate(name)?;
        let path = format!("{}/{}", self.root, name);
        self.engine.fs_unlink(&path)?;
        Ok(())
    }
}
