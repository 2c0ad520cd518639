use std::{
    io::{Read, Write},
    path::Path,
    time::Duration,
};

use indicatif::{ProgressBar, ProgressStyle};
use reqwest::blocking::{Client, Response};
use tempfile::NamedTempFile;
use tracing::debug;

use crate::{
    models::config::DownloadConfig,
    utils::downloader_def::{errors::ProvisionError, r#trait::StreamStats},
};

pub const URL_CHUNK_SIZE: usize = 8 * 1024;
pub const INDIRECT_CHUNK_SIZE: usize = 32 * 1024;

/// Transport settings shared by every source provider.
#[derive(Debug, Clone)]
pub struct DownloadOptions {
    pub timeout: Duration,
    pub connect_timeout: Duration,
    pub url_chunk_size: usize,
    pub indirect_chunk_size: usize,
    pub progress: bool,
}

impl Default for DownloadOptions {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(300),
            connect_timeout: Duration::from_secs(30),
            url_chunk_size: URL_CHUNK_SIZE,
            indirect_chunk_size: INDIRECT_CHUNK_SIZE,
            progress: false,
        }
    }
}

impl From<&DownloadConfig> for DownloadOptions {
    fn from(config: &DownloadConfig) -> Self {
        Self {
            timeout: Duration::from_secs(config.timeout_secs),
            connect_timeout: Duration::from_secs(config.connect_timeout_secs),
            url_chunk_size: config.url_chunk_size.max(1),
            indirect_chunk_size: config.indirect_chunk_size.max(1),
            progress: config.progress,
        }
    }
}

/// What to do with a body whose length the server did not report.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnsizedBody {
    /// Read the whole body and write it in one go.
    Buffer,
    /// Stream it in chunks, same as a body with a known length.
    Stream,
}

pub struct Downloader {}

impl Downloader {
    pub fn client(options: &DownloadOptions, cookie_store: bool) -> Result<Client, ProvisionError> {
        Client::builder()
            .timeout(options.timeout)
            .connect_timeout(options.connect_timeout)
            .cookie_store(cookie_store)
            .build()
            .map_err(|e| ProvisionError::Configuration(format!("Failed to create HTTP client: {e}")))
    }

    /// Turns a non-2xx response into a [`ProvisionError::Network`].
    pub fn check_status(url: &str, resp: Response) -> Result<Response, ProvisionError> {
        let status = resp.status();
        if !status.is_success() {
            return Err(ProvisionError::Network {
                url: url.to_owned(),
                status: status.as_u16(),
            });
        }
        Ok(resp)
    }

    /// Writes a response body to `dest` through a temporary file in the same
    /// directory, renaming it into place once the body is complete.
    ///
    /// With a known content length the body is streamed in `chunk_size` pieces.
    /// Without one, `unsized_body` decides between buffering and streaming.
    pub fn save_response(
        mut resp: Response,
        dest: &Path,
        chunk_size: usize,
        unsized_body: UnsizedBody,
        progress: bool,
    ) -> Result<StreamStats, ProvisionError> {
        let parent = dest
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .unwrap_or(Path::new("."));
        std::fs::create_dir_all(parent)?;

        let mut tmp = NamedTempFile::new_in(parent)?;
        let total = resp.content_length().filter(|len| *len > 0);
        let stats = match (total, unsized_body) {
            (None, UnsizedBody::Buffer) => {
                debug!("No content length reported, buffering body for {:?}", dest);
                let body = resp.bytes()?;
                tmp.as_file_mut().write_all(&body)?;
                StreamStats {
                    bytes_written: body.len() as u64,
                    chunks: u64::from(!body.is_empty()),
                }
            }
            (total, _) => {
                debug!("Streaming {:?} bytes to {:?}", total, dest);
                let bar = Self::progress_bar(total, dest, progress);
                let stats =
                    Self::write_chunked(&mut resp, tmp.as_file_mut(), chunk_size, |n| bar.inc(n));
                bar.finish_and_clear();
                stats?
            }
        };

        tmp.as_file_mut().flush()?;
        tmp.persist(dest).map_err(|e| ProvisionError::Download(e.error.to_string()))?;
        Ok(stats)
    }

    /// Copies `reader` into `writer` one buffer of `chunk_size` bytes at a time.
    pub fn write_chunked<R, W, F>(
        reader: &mut R,
        writer: &mut W,
        chunk_size: usize,
        mut on_chunk: F,
    ) -> Result<StreamStats, ProvisionError>
    where
        R: Read,
        W: Write,
        F: FnMut(u64),
    {
        let mut buffer = vec![0u8; chunk_size.max(1)];
        let mut stats = StreamStats::default();

        loop {
            let n = match reader.read(&mut buffer) {
                Ok(0) => break,
                Ok(n) => n,
                Err(e) if e.kind() == std::io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(e.into()),
            };
            writer.write_all(&buffer[..n])?;
            stats.bytes_written += n as u64;
            stats.chunks += 1;
            on_chunk(n as u64);
        }

        Ok(stats)
    }

    fn progress_bar(total: Option<u64>, dest: &Path, enabled: bool) -> ProgressBar {
        if !enabled {
            return ProgressBar::hidden();
        }

        let (bar, template) = match total {
            Some(total) => (
                ProgressBar::new(total),
                "{spinner:.green} {msg} [{bar:30.cyan/blue}] {bytes}/{total_bytes} ({bytes_per_sec})",
            ),
            None => (
                ProgressBar::new_spinner(),
                "{spinner:.green} {msg} {bytes} ({bytes_per_sec})",
            ),
        };
        let style = ProgressStyle::with_template(template)
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("=> ");
        bar.set_style(style);
        bar.set_message(
            dest.file_name()
                .map(|name| name.to_string_lossy().to_string())
                .unwrap_or_default(),
        );
        bar
    }
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use super::*;

    #[test]
    fn payload_larger_than_one_chunk_is_split() {
        let payload = vec![7u8; URL_CHUNK_SIZE * 3 + 10];
        let mut reader = Cursor::new(payload.clone());
        let mut out = Vec::new();
        let mut seen = 0;

        let stats =
            Downloader::write_chunked(&mut reader, &mut out, URL_CHUNK_SIZE, |n| seen += n)
                .unwrap();

        assert_eq!(stats.bytes_written, payload.len() as u64);
        assert_eq!(stats.chunks, 4);
        assert_eq!(seen, payload.len() as u64);
        assert_eq!(out, payload);
    }

    #[test]
    fn empty_reader_writes_nothing() {
        let mut reader = Cursor::new(Vec::<u8>::new());
        let mut out = Vec::new();
        let stats = Downloader::write_chunked(&mut reader, &mut out, 16, |_| {}).unwrap();
        assert_eq!(stats, StreamStats::default());
    }

    #[test]
    fn options_follow_download_config() {
        let config = DownloadConfig {
            timeout_secs: 12,
            url_chunk_size: 0,
            ..DownloadConfig::default()
        };
        let options = DownloadOptions::from(&config);
        assert_eq!(options.timeout, Duration::from_secs(12));
        assert_eq!(options.url_chunk_size, 1);
        assert_eq!(options.indirect_chunk_size, INDIRECT_CHUNK_SIZE);
    }
}
