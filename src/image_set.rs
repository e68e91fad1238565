use std::path::{Path, PathBuf};

use crate::error::AnnotatorError;

const IMAGE_EXTENSIONS: [&str; 3] = ["png", "jpg", "jpeg"];

pub fn is_image_name(name: &str) -> bool {
    Path::new(name)
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| {
            IMAGE_EXTENSIONS
                .iter()
                .any(|known| ext.eq_ignore_ascii_case(known))
        })
        .unwrap_or(false)
}

/// The ordered list of images in one flat input folder.
#[derive(Clone, Debug)]
pub struct ImageSet {
    dir: PathBuf,
    names: Vec<String>,
}

impl ImageSet {
    pub fn scan(dir: &Path) -> Result<Self, AnnotatorError> {
        let entries = std::fs::read_dir(dir).map_err(|e| {
            AnnotatorError::configuration(format!("cannot read {}: {e}", dir.display()))
        })?;
        let names = entries
            .filter_map(|entry| entry.ok())
            .filter(|entry| entry.file_type().map(|t| t.is_file()).unwrap_or(false))
            .filter_map(|entry| entry.file_name().into_string().ok())
            .collect();
        Self::from_names(dir, names)
    }

    /// Keeps recognized image names, sorted lexicographically.
    pub fn from_names(dir: &Path, names: Vec<String>) -> Result<Self, AnnotatorError> {
        let mut names: Vec<String> = names.into_iter().filter(|n| is_image_name(n)).collect();
        names.sort();
        if names.is_empty() {
            return Err(AnnotatorError::configuration(format!(
                "No images found in the folder {}",
                dir.display()
            )));
        }
        Ok(Self {
            dir: dir.to_path_buf(),
            names,
        })
    }

    pub fn list(&self) -> &[String] {
        &self.names
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn last_index(&self) -> usize {
        self.names.len() - 1
    }

    pub fn current(&self, cursor: usize) -> &str {
        &self.names[cursor.min(self.last_index())]
    }

    pub fn path(&self, cursor: usize) -> PathBuf {
        self.dir.join(self.current(cursor))
    }

    pub fn advance(&self, cursor: usize) -> usize {
        (cursor + 1).min(self.last_index())
    }

    pub fn retreat(&self, cursor: usize) -> usize {
        cursor.saturating_sub(1)
    }
}
