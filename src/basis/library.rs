use crate::basis::{BasisKey, BasisModel};
use crate::error::LibraryError;

use std::path::{Path, PathBuf};

/// Directory of background models shipped with the crate
pub const DEFAULT_MODEL_DIR: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/models");

/// Set of directories holding persisted [BasisModel]s
///
/// Directories are searched in order and, inside each directory, the instrument-specific file
/// name is tried before the telescope-wide one. The first existing file wins.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BasisLibrary {
    search_dirs: Vec<PathBuf>,
}

impl BasisLibrary {
    /// Library searching `user_dir` (if any) and then [DEFAULT_MODEL_DIR]
    pub fn new(user_dir: Option<PathBuf>) -> Self {
        let mut search_dirs: Vec<_> = user_dir.into_iter().collect();
        search_dirs.push(PathBuf::from(DEFAULT_MODEL_DIR));
        Self { search_dirs }
    }

    /// Library searching exactly the given directories
    pub fn with_dirs(search_dirs: Vec<PathBuf>) -> Self {
        Self { search_dirs }
    }

    pub fn search_dirs(&self) -> &[PathBuf] {
        &self.search_dirs
    }

    fn candidates(&self, key: &BasisKey) -> Vec<PathBuf> {
        let stems = key.file_stems();
        self.search_dirs
            .iter()
            .flat_map(|dir| stems.iter().map(move |stem| dir.join(format!("{stem}.json"))))
            .collect()
    }

    /// Path of the model for `key`, the lookup miss is fatal for the fit
    pub fn locate(&self, key: &BasisKey) -> Result<PathBuf, LibraryError> {
        let candidates = self.candidates(key);
        for path in &candidates {
            tracing::debug!(path = %path.display(), "looking for background model");
            if path.is_file() {
                return Ok(path.clone());
            }
        }
        Err(LibraryError::ModelNotFound {
            key: key.to_string(),
            searched: candidates,
        })
    }

    pub fn load(&self, key: &BasisKey) -> Result<BasisModel, LibraryError> {
        let path = self.locate(key)?;
        tracing::info!(path = %path.display(), %key, "loading background model");
        BasisModel::load(path)
    }

    /// Stores `model` under its instrument-specific name in `dir`
    pub fn save(dir: &Path, key: &BasisKey, model: &BasisModel) -> Result<PathBuf, LibraryError> {
        std::fs::create_dir_all(dir).map_err(|source| LibraryError::Io {
            path: dir.to_path_buf(),
            source,
        })?;
        let stem = key
            .file_stems()
            .into_iter()
            .next()
            .expect("at least one file stem is always produced");
        let path = dir.join(format!("{stem}.json"));
        model.save(&path)?;
        Ok(path)
    }
}

impl Default for BasisLibrary {
    fn default() -> Self {
        Self::new(None)
    }
}
