//! Index of an artwork folder, built once per run.
//!
//! Entries keep directory iteration order so "first match" means the same
//! thing it would for a fresh `read_dir` walk.

use std::fs;
use std::path::{Path, PathBuf};

use crate::error::DatError;
use crate::matcher::MatchMethod;
use crate::normalize::{loose_key, normalize};

/// A candidate source image.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageFile {
    pub path: PathBuf,
    /// File name with extension
    pub file_name: String,
    /// File name without extension
    pub stem: String,
}

impl ImageFile {
    /// Build from a path. Returns `None` for paths without a UTF-8 file name.
    pub fn from_path(path: PathBuf) -> Option<Self> {
        let file_name = path.file_name()?.to_str()?.to_string();
        let stem = path.file_stem()?.to_str()?.to_string();
        Some(Self {
            path,
            file_name,
            stem,
        })
    }
}

#[derive(Debug)]
struct IndexedImage {
    file: ImageFile,
    normalized_stem: String,
    loose_stem: String,
}

/// Normalized-name index over the files of one directory.
#[derive(Debug)]
pub struct ImageIndex {
    entries: Vec<IndexedImage>,
}

impl ImageIndex {
    /// Read `dir` once, keeping regular files only.
    pub fn scan(dir: &Path) -> Result<Self, DatError> {
        let mut files = Vec::new();
        for entry in fs::read_dir(dir)? {
            let entry = entry?;
            let path = entry.path();
            if !path.is_file() {
                continue;
            }
            match ImageFile::from_path(path) {
                Some(file) => files.push(file),
                None => log::warn!(
                    "Skipping file with non UTF-8 name: {}",
                    entry.path().display()
                ),
            }
        }
        Ok(Self::from_files(files))
    }

    /// Build an index from already-listed files, preserving their order.
    pub fn from_files(files: impl IntoIterator<Item = ImageFile>) -> Self {
        let entries = files
            .into_iter()
            .map(|file| IndexedImage {
                normalized_stem: normalize(&file.stem),
                loose_stem: loose_key(&file.stem),
                file,
            })
            .collect();
        Self { entries }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Files in directory order.
    pub fn files(&self) -> impl Iterator<Item = &ImageFile> {
        self.entries.iter().map(|e| &e.file)
    }

    /// Find the image for a catalog title.
    ///
    /// Returns the first file whose normalized stem contains the normalized
    /// title. If none does, returns the first file whose loose stem key equals
    /// the title's loose key.
    pub fn find_for_title(&self, title: &str) -> Option<(&ImageFile, MatchMethod)> {
        let normalized = normalize(title);
        if normalized.is_empty() {
            return None;
        }
        if let Some(e) = self
            .entries
            .iter()
            .find(|e| e.normalized_stem.contains(normalized.as_str()))
        {
            return Some((&e.file, MatchMethod::Normalized));
        }

        let key = loose_key(title);
        if key.is_empty() {
            return None;
        }
        self.entries
            .iter()
            .find(|e| e.loose_stem == key)
            .map(|e| (&e.file, MatchMethod::Loose))
    }
}
