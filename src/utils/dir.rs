use std::{
    fs,
    path::{Path, PathBuf},
};

use serde::de::DeserializeOwned;
use tracing::debug;

use crate::utils::errors::{ResultTrait, ResultWithError};

pub struct DirUtils;

impl DirUtils {
    pub fn curr_dir() -> ResultWithError<PathBuf> {
        std::env::current_dir().auto_err("Could not read current directory")
    }

    /// Resolves `path` against the current directory when it is relative.
    pub fn absolute(path: &Path) -> ResultWithError<PathBuf> {
        if path.is_absolute() {
            Ok(path.to_path_buf())
        } else {
            Ok(Self::curr_dir()?.join(path))
        }
    }

    pub fn parse_yaml<T>(path: &Path) -> ResultWithError<T>
    where
        T: DeserializeOwned,
    {
        debug!("Parsing YAML file {:?}", path);
        let content =
            fs::read_to_string(path).auto_err(&format!("Failed to read file: {:?}", path))?;
        serde_yaml::from_str(&content).auto_err(&format!("Failed to parse YAML: {:?}", path))
    }

    /// Size of the regular file at `path`, or `None` if there is no such file.
    pub fn regular_file_size(path: &Path) -> Option<u64> {
        fs::metadata(path)
            .ok()
            .filter(|meta| meta.is_file())
            .map(|meta| meta.len())
    }
}
