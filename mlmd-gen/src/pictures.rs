//! Picture lookup and copying for `{picture:<name>}` references
//!
//! Pictures live under an optional pictures directory below the source
//! root, either in a per-language subdirectory or shared at the
//! directory root. The language-specific file wins. Resolved pictures
//! are copied to the same relative location below the destination root
//! so generated files can link to them.

use std::fs;
use std::path::{Path, PathBuf};

use crate::report::Report;

#[derive(Debug, Clone, Default)]
pub struct PictureStore {
    source_root: PathBuf,
    destination_root: PathBuf,
    /// Pictures directory relative to both roots; empty when pictures
    /// sit directly at the root.
    pictures_dir: String,
}

impl PictureStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_source_root(&mut self, path: impl Into<PathBuf>) {
        self.source_root = path.into();
    }

    pub fn set_destination_root(&mut self, path: impl Into<PathBuf>) {
        self.destination_root = path.into();
    }

    /// Sets the directory name declared by `.picturesdir`.
    pub fn set_pictures_dir(&mut self, dir: &str) {
        self.pictures_dir = dir.trim().trim_matches('/').to_string();
    }

    fn pictures_root(&self, below: &Path) -> PathBuf {
        if self.pictures_dir.is_empty() {
            below.to_path_buf()
        } else {
            below.join(&self.pictures_dir)
        }
    }

    /// Directory holding a picture, relative to the pictures root:
    /// the language subdirectory when the file exists there, an empty
    /// string when it sits at the root, `None` when not found.
    fn find_relative_dir(&self, name: &str, language: &str) -> Option<String> {
        let root = self.pictures_root(&self.source_root);
        if root.join(language).join(name).is_file() {
            return Some(language.to_string());
        }
        if root.join(name).is_file() {
            return Some(String::new());
        }
        None
    }

    /// Path of a picture relative to the source root (pictures
    /// directory included), or `None` when the picture is missing.
    pub fn find_relative_path(&self, name: &str, language: &str) -> Option<String> {
        let dir = self.find_relative_dir(name, language)?;
        let mut path = PathBuf::new();
        if !self.pictures_dir.is_empty() {
            path.push(&self.pictures_dir);
        }
        if !dir.is_empty() {
            path.push(dir);
        }
        path.push(name);
        Some(path.to_string_lossy().into_owned())
    }

    /// Copies a picture below the destination root, creating parent
    /// directories as needed. Failures are reported as warnings.
    pub fn copy(&self, name: &str, language: &str, report: &mut Report) -> bool {
        let Some(rel) = self.find_relative_path(name, language) else {
            return false;
        };
        let source = self.source_root.join(&rel);
        let destination = self.destination_root.join(&rel);
        if let Some(parent) = destination.parent() {
            if let Err(err) = fs::create_dir_all(parent) {
                report.warning(
                    format!("cannot create '{}': {err}", parent.display()),
                    None,
                    None,
                );
                return false;
            }
        }
        match fs::copy(&source, &destination) {
            Ok(_) => true,
            Err(err) => {
                report.warning(
                    format!("cannot copy picture '{}': {err}", source.display()),
                    None,
                    None,
                );
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn language_subdirectory_wins() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir_all(dir.path().join("pictures/fr")).unwrap();
        fs::write(dir.path().join("pictures/logo.png"), b"shared").unwrap();
        fs::write(dir.path().join("pictures/fr/logo.png"), b"fr").unwrap();

        let mut store = PictureStore::new();
        store.set_source_root(dir.path());
        store.set_pictures_dir("pictures");
        assert_eq!(
            store.find_relative_path("logo.png", "fr").as_deref(),
            Some("pictures/fr/logo.png")
        );
        assert_eq!(
            store.find_relative_path("logo.png", "en").as_deref(),
            Some("pictures/logo.png")
        );
        assert_eq!(store.find_relative_path("missing.png", "en"), None);
    }

    #[test]
    fn copy_creates_destination_tree() {
        let source = tempfile::tempdir().unwrap();
        let destination = tempfile::tempdir().unwrap();
        fs::create_dir_all(source.path().join("img")).unwrap();
        fs::write(source.path().join("img/pic.png"), b"data").unwrap();

        let mut store = PictureStore::new();
        store.set_source_root(source.path());
        store.set_destination_root(destination.path());
        store.set_pictures_dir("img");

        let mut report = Report::new();
        assert!(store.copy("pic.png", "en", &mut report));
        assert!(destination.path().join("img/pic.png").is_file());
        assert!(report.is_empty());
    }
}
