//! Per-session marker file. Only its existence matters: absent means the
//! session has not seen a prompt yet.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// Marker directory relative to the project root
const MARKER_DIR: &str = ".claude/tmp";

#[derive(Debug, Clone)]
pub struct SessionMarker {
    path: PathBuf,
}

impl SessionMarker {
    pub fn new(project_dir: &Path, session_id: &str) -> Self {
        Self {
            path: project_dir
                .join(MARKER_DIR)
                .join(format!("local-{}", session_id)),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn exists(&self) -> bool {
        self.path.is_file()
    }

    /// Create the (empty) marker and its parent directories.
    pub fn create(&self) -> io::Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::File::create(&self.path)?;
        Ok(())
    }
}
