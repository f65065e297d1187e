//! Temporary fixture files for testing

use std::fs;
use std::path::{Path, PathBuf};

use tempfile::TempDir;

/// A temporary directory holding fixture files, removed on drop
pub struct FixtureDir {
  temp_dir: TempDir,
}

impl Default for FixtureDir {
  fn default() -> Self {
    Self::new()
  }
}

impl FixtureDir {
  pub fn new() -> Self {
    let temp_dir = TempDir::new().expect("Failed to create temporary directory");
    Self { temp_dir }
  }

  pub fn path(&self) -> &Path {
    self.temp_dir.path()
  }

  /// Write `content` to `name` inside the directory, creating parent
  /// directories as needed, and return the full path
  pub fn write(&self, name: &str, content: &str) -> PathBuf {
    let path = self.temp_dir.path().join(name);
    if let Some(parent) = path.parent() {
      fs::create_dir_all(parent).expect("Failed to create fixture directory");
    }
    fs::write(&path, content).expect("Failed to write fixture file");
    path
  }
}
