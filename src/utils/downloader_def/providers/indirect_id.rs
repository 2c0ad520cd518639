use std::path::Path;

use reqwest::blocking::{Client, Response};
use tracing::{debug, info};

use crate::{
    models::artifact::SourceDescriptor,
    utils::downloader_def::{
        downloader::{DownloadOptions, Downloader, UnsizedBody},
        errors::ProvisionError,
        r#trait::{SourceProvider, StreamStats},
    },
};

/// Cookie name prefix the provider uses to carry the confirmation token.
pub const DOWNLOAD_WARNING_PREFIX: &str = "download_warning";

/// Fetches an artifact by id from a storage provider that may interpose a
/// warning page for large files.
///
/// The first response either carries the file or sets a `download_warning*`
/// cookie; in the latter case the request is repeated with `confirm=<token>`.
/// The final body is always streamed, whether or not its length is known.
#[derive(Debug)]
pub struct IndirectIdSourceProvider {
    options: DownloadOptions,
}

impl IndirectIdSourceProvider {
    pub fn new(options: &DownloadOptions) -> Result<Self, ProvisionError> {
        // Fail early on a client configuration the provider could never use.
        Downloader::client(options, true)?;
        Ok(Self {
            options: options.clone(),
        })
    }

    /// A fresh cookie-persisting session per artifact.
    fn session(&self) -> Result<Client, ProvisionError> {
        Downloader::client(&self.options, true)
    }

    fn confirm_token(resp: &Response) -> Option<String> {
        resp.cookies()
            .find(|cookie| cookie.name().starts_with(DOWNLOAD_WARNING_PREFIX))
            .map(|cookie| cookie.value().to_owned())
    }

    fn request(
        session: &Client,
        endpoint: &str,
        params: &[(&str, &str)],
    ) -> Result<Response, ProvisionError> {
        debug!("GET {} {:?}", endpoint, params);
        let resp = session.get(endpoint).query(params).send()?;
        Downloader::check_status(endpoint, resp)
    }
}

impl SourceProvider for IndirectIdSourceProvider {
    fn name(&self) -> &'static str {
        "indirect_id"
    }

    fn supports(&self, source: &SourceDescriptor) -> bool {
        matches!(source, SourceDescriptor::IndirectId { .. })
    }

    fn fetch(
        &self,
        source: &SourceDescriptor,
        dest_path: &Path,
    ) -> Result<StreamStats, ProvisionError> {
        let SourceDescriptor::IndirectId {
            provider_endpoint,
            file_id,
        } = source
        else {
            return Err(ProvisionError::Configuration(format!(
                "{} cannot fetch {source}",
                self.name()
            )));
        };

        let session = self.session()?;
        let first = Self::request(&session, provider_endpoint, &[("id", file_id.as_str())])?;

        let resp = match Self::confirm_token(&first) {
            Some(token) => {
                info!("Provider asked for confirmation, retrying {} with token", file_id);
                drop(first);
                Self::request(
                    &session,
                    provider_endpoint,
                    &[("id", file_id.as_str()), ("confirm", token.as_str())],
                )?
            }
            None => first,
        };

        Downloader::save_response(
            resp,
            dest_path,
            self.options.indirect_chunk_size,
            UnsizedBody::Stream,
            self.options.progress,
        )
    }
}

#[cfg(test)]
mod tests {
    use httpmock::prelude::*;

    use super::*;
    use crate::utils::downloader_def::test_server::serve_chunked;

    const TOKEN: &str = "t0k3n";

    fn has_confirm(req: &HttpMockRequest) -> bool {
        req.query_params
            .as_ref()
            .is_some_and(|params| params.iter().any(|(key, _)| key == "confirm"))
    }

    fn provider() -> IndirectIdSourceProvider {
        IndirectIdSourceProvider::new(&DownloadOptions::default()).unwrap()
    }

    fn source(server: &MockServer) -> SourceDescriptor {
        SourceDescriptor::IndirectId {
            provider_endpoint: server.url("/uc"),
            file_id: "FILE42".into(),
        }
    }

    #[test]
    fn warning_cookie_triggers_confirmed_request() {
        let server = MockServer::start();
        let warning = server.mock(|when, then| {
            when.method(GET)
                .path("/uc")
                .query_param("id", "FILE42")
                .matches(|req| !has_confirm(req));
            then.status(200)
                .header("Set-Cookie", format!("download_warning_9921={TOKEN}; Path=/"))
                .body("<html>too large to scan</html>");
        });
        let confirmed = server.mock(|when, then| {
            when.method(GET)
                .path("/uc")
                .query_param("id", "FILE42")
                .query_param("confirm", TOKEN);
            then.status(200).body("MODEL-BYTES");
        });

        let dir = tempfile::tempdir().unwrap();
        let dest = dir.path().join("model.json");
        let stats = provider().fetch(&source(&server), &dest).unwrap();

        warning.assert_hits(1);
        confirmed.assert_hits(1);
        assert_eq!(stats.bytes_written, 11);
        assert_eq!(std::fs::read_to_string(&dest).unwrap(), "MODEL-BYTES");
    }

    #[test]
    fn no_cookie_means_single_request() {
        let server = MockServer::start();
        let direct = server.mock(|when, then| {
            when.method(GET).path("/uc").query_param("id", "FILE42");
            then.status(200)
                .header("Set-Cookie", "NID=unrelated; Path=/")
                .body("PREPROCESSOR");
        });

        let dir = tempfile::tempdir().unwrap();
        let dest = dir.path().join("preprocessor.json");
        provider().fetch(&source(&server), &dest).unwrap();

        direct.assert_hits(1);
        assert_eq!(std::fs::read_to_string(&dest).unwrap(), "PREPROCESSOR");
    }

    #[test]
    fn failed_confirmation_is_a_network_error() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/uc").matches(|req| !has_confirm(req));
            then.status(200)
                .header("Set-Cookie", format!("download_warning_1={TOKEN}"))
                .body("warning");
        });
        server.mock(|when, then| {
            when.method(GET).path("/uc").query_param("confirm", TOKEN);
            then.status(403);
        });

        let dir = tempfile::tempdir().unwrap();
        let dest = dir.path().join("model.json");
        let err = provider().fetch(&source(&server), &dest).unwrap_err();

        assert!(matches!(err, ProvisionError::Network { status: 403, .. }));
        assert!(!dest.exists());
    }

    #[test]
    fn body_without_length_is_still_streamed_in_chunks() {
        let body: Vec<u8> = (0..100 * 1024).map(|i| (i % 251) as u8).collect();
        let base = serve_chunked(body.clone(), 4096);
        let options = DownloadOptions {
            indirect_chunk_size: 1024,
            ..DownloadOptions::default()
        };
        let source = SourceDescriptor::IndirectId {
            provider_endpoint: format!("{base}/uc"),
            file_id: "BIGFILE".into(),
        };

        let dir = tempfile::tempdir().unwrap();
        let dest = dir.path().join("model.json");
        let stats = IndirectIdSourceProvider::new(&options)
            .unwrap()
            .fetch(&source, &dest)
            .unwrap();

        assert_eq!(stats.bytes_written, body.len() as u64);
        assert!(stats.chunks > 1);
        assert_eq!(std::fs::read(&dest).unwrap(), body);
    }
}
