use std::path::Path;

use reqwest::blocking::Client;
use tracing::debug;

use crate::{
    models::artifact::SourceDescriptor,
    utils::downloader_def::{
        downloader::{DownloadOptions, Downloader, UnsizedBody},
        errors::ProvisionError,
        r#trait::{SourceProvider, StreamStats},
    },
};

/// Streams an artifact straight from a URL.
#[derive(Debug)]
pub struct DirectUrlSourceProvider {
    client: Client,
    chunk_size: usize,
    progress: bool,
}

impl DirectUrlSourceProvider {
    pub fn new(options: &DownloadOptions) -> Result<Self, ProvisionError> {
        Ok(Self {
            client: Downloader::client(options, false)?,
            chunk_size: options.url_chunk_size,
            progress: options.progress,
        })
    }
}

impl SourceProvider for DirectUrlSourceProvider {
    fn name(&self) -> &'static str {
        "direct_url"
    }

    fn supports(&self, source: &SourceDescriptor) -> bool {
        matches!(source, SourceDescriptor::DirectUrl { .. })
    }

    fn fetch(
        &self,
        source: &SourceDescriptor,
        dest_path: &Path,
    ) -> Result<StreamStats, ProvisionError> {
        let SourceDescriptor::DirectUrl { url } = source else {
            return Err(ProvisionError::Configuration(format!(
                "{} cannot fetch {source}",
                self.name()
            )));
        };

        debug!("GET {}", url);
        let resp = self.client.get(url).send()?;
        let resp = Downloader::check_status(url, resp)?;

        Downloader::save_response(
            resp,
            dest_path,
            self.chunk_size,
            UnsizedBody::Buffer,
            self.progress,
        )
    }
}

#[cfg(test)]
mod tests {
    use httpmock::prelude::*;

    use super::*;
    use crate::{
        models::artifact::ArtifactSpec,
        utils::downloader_def::{
            provisioner::{Provisioner, RetryPolicy},
            test_server::serve_chunked,
        },
    };

    const URL_BODY_LEN: usize = 5000;

    #[test]
    fn streams_body_to_nested_destination() {
        let server = MockServer::start();
        let body = vec![b'x'; URL_BODY_LEN];
        let mock = server.mock(|when, then| {
            when.method(GET).path("/artifacts/model.json");
            then.status(200).body(&body);
        });

        let dir = tempfile::tempdir().unwrap();
        let dest = dir.path().join("nested").join("model.json");
        let options = DownloadOptions {
            url_chunk_size: 1024,
            ..DownloadOptions::default()
        };
        let provider = DirectUrlSourceProvider::new(&options).unwrap();
        let source = SourceDescriptor::DirectUrl {
            url: server.url("/artifacts/model.json"),
        };

        let stats = provider.fetch(&source, &dest).unwrap();

        mock.assert();
        assert_eq!(stats.bytes_written, URL_BODY_LEN as u64);
        assert!(stats.chunks > 1);
        assert_eq!(std::fs::read(&dest).unwrap(), body);
    }

    #[test]
    fn rejects_indirect_sources() {
        let provider = DirectUrlSourceProvider::new(&DownloadOptions::default()).unwrap();
        let source = SourceDescriptor::IndirectId {
            provider_endpoint: "https://drive.example/uc".into(),
            file_id: "abc".into(),
        };
        assert!(!provider.supports(&source));

        let dir = tempfile::tempdir().unwrap();
        let err = provider.fetch(&source, &dir.path().join("a.bin")).unwrap_err();
        assert_eq!(err.kind(), "ConfigurationError");
    }

    #[test]
    fn body_without_length_is_written_at_once() {
        let body = vec![b'y'; URL_BODY_LEN];
        let base = serve_chunked(body.clone(), 512);
        let options = DownloadOptions {
            url_chunk_size: 1024,
            ..DownloadOptions::default()
        };
        let provider = DirectUrlSourceProvider::new(&options).unwrap();
        let source = SourceDescriptor::DirectUrl {
            url: format!("{base}/model.json"),
        };

        let dir = tempfile::tempdir().unwrap();
        let dest = dir.path().join("model.json");
        let stats = provider.fetch(&source, &dest).unwrap();

        assert_eq!(stats.bytes_written, URL_BODY_LEN as u64);
        assert_eq!(stats.chunks, 1);
        assert_eq!(std::fs::read(&dest).unwrap(), body);
    }

    #[test]
    fn empty_body_without_length_fails_verification() {
        let base = serve_chunked(Vec::new(), 1);
        let provider = DirectUrlSourceProvider::new(&DownloadOptions::default()).unwrap();
        let provisioner = Provisioner::new(vec![Box::new(provider)], RetryPolicy::default());

        let dir = tempfile::tempdir().unwrap();
        let dest = dir.path().join("model.json");
        let spec = ArtifactSpec::new(
            "model",
            dest.clone(),
            vec![SourceDescriptor::DirectUrl {
                url: format!("{base}/model.json"),
            }],
        );

        let result = provisioner.ensure(&[spec]);

        assert!(!result.all_succeeded);
        assert_eq!(
            result.outcomes[0].error().map(ProvisionError::kind),
            Some("VerificationError")
        );
        assert!(!dest.exists());
    }
}
