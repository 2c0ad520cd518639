use std::path::Path;

use crate::{models::artifact::SourceDescriptor, utils::downloader_def::errors::ProvisionError};

/// What a provider wrote to disk for one fetch.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StreamStats {
    pub bytes_written: u64,
    pub chunks: u64,
}

/// A strategy able to materialize a [`SourceDescriptor`] at a local path.
pub trait SourceProvider {
    fn name(&self) -> &'static str;
    fn supports(&self, source: &SourceDescriptor) -> bool;
    fn fetch(&self, source: &SourceDescriptor, dest_path: &Path)
    -> Result<StreamStats, ProvisionError>;
}
