use std::path::Path;

use log::info;

use crate::map::url::redact_token;

/// Raw transport result of one HTTP GET.
pub struct FetchResponse {
    pub status: u16,
    pub body: Vec<u8>,
}

/// Why a fetch cycle produced no stored image.
#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    #[error("map fetch failed: HTTP status {0}")]
    Status(u16),
    #[error("map fetch failed: empty response body")]
    EmptyBody,
    #[error("map fetch failed: {0}")]
    Transport(String),
    #[error("cannot store fetched image: {0}")]
    Store(#[from] std::io::Error),
}

/// A transport that can issue one HTTP GET for a map image.
///
/// Implemented per platform: blocking `reqwest` on the desktop,
/// `EspHttpConnection` on the device, and canned bytes for offline use.
pub trait MapFetcher {
    fn get(&mut self, url: &str) -> Result<FetchResponse, FetchError>;
}

impl<T: MapFetcher + ?Sized> MapFetcher for Box<T> {
    fn get(&mut self, url: &str) -> Result<FetchResponse, FetchError> {
        (**self).get(url)
    }
}

pub type MapFetcherPointer = Box<dyn MapFetcher + Send>;

/// Issues exactly one GET for `url` and overwrites `destination` with the
/// response body.
///
/// The body is stored only when the status is exactly 200 and the body is
/// non-empty; on any failure the destination is left untouched and the error
/// carries the reason (including the status code). There is no retry.
pub fn fetch_and_store<F: MapFetcher>(
    fetcher: &mut F,
    url: &str,
    destination: &Path,
) -> Result<(), FetchError> {
    let response = fetcher.get(url)?;
    if response.status != 200 {
        return Err(FetchError::Status(response.status));
    }
    if response.body.is_empty() {
        return Err(FetchError::EmptyBody);
    }

    std::fs::write(destination, &response.body)?;
    info!(
        "stored {} bytes from {}",
        response.body.len(),
        redact_token(url)
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    /// Transport double that replays canned responses and counts calls.
    struct ScriptedFetcher {
        responses: Vec<Result<FetchResponse, FetchError>>,
        calls: usize,
    }

    impl ScriptedFetcher {
        fn new(responses: Vec<Result<FetchResponse, FetchError>>) -> Self {
            Self { responses, calls: 0 }
        }
    }

    impl MapFetcher for ScriptedFetcher {
        fn get(&mut self, _url: &str) -> Result<FetchResponse, FetchError> {
            self.calls += 1;
            self.responses.remove(0)
        }
    }

    fn temp_path(tag: &str) -> PathBuf {
        std::env::temp_dir().join(format!("mapmatrix_{}_{}.png", tag, std::process::id()))
    }

    #[test]
    fn success_stores_the_body_byte_exact() {
        let path = temp_path("fetch_ok");
        let body = b"not really a png".to_vec();
        let mut fetcher = ScriptedFetcher::new(vec![Ok(FetchResponse {
            status: 200,
            body: body.clone(),
        })]);

        fetch_and_store(&mut fetcher, "http://example/map", &path).unwrap();

        assert_eq!(std::fs::read(&path).unwrap(), body);
        assert_eq!(fetcher.calls, 1);
        std::fs::remove_file(&path).unwrap();
    }

    #[test]
    fn repeating_a_successful_fetch_is_idempotent() {
        let path = temp_path("fetch_idem");
        let body = b"same bytes".to_vec();
        let mut fetcher = ScriptedFetcher::new(vec![
            Ok(FetchResponse { status: 200, body: body.clone() }),
            Ok(FetchResponse { status: 200, body: body.clone() }),
        ]);

        fetch_and_store(&mut fetcher, "http://example/map", &path).unwrap();
        fetch_and_store(&mut fetcher, "http://example/map", &path).unwrap();

        assert_eq!(std::fs::read(&path).unwrap(), body);
        std::fs::remove_file(&path).unwrap();
    }

    #[test]
    fn non_200_status_writes_nothing_and_reports_the_code() {
        let path = temp_path("fetch_404");
        let mut fetcher = ScriptedFetcher::new(vec![Ok(FetchResponse {
            status: 404,
            body: Vec::new(),
        })]);

        let err = fetch_and_store(&mut fetcher, "http://example/map", &path).unwrap_err();

        assert!(matches!(err, FetchError::Status(404)));
        assert!(!path.exists());
        assert_eq!(fetcher.calls, 1);
    }

    #[test]
    fn empty_body_counts_as_failure() {
        let path = temp_path("fetch_empty");
        let mut fetcher = ScriptedFetcher::new(vec![Ok(FetchResponse {
            status: 200,
            body: Vec::new(),
        })]);

        let err = fetch_and_store(&mut fetcher, "http://example/map", &path).unwrap_err();

        assert!(matches!(err, FetchError::EmptyBody));
        assert!(!path.exists());
    }

    #[test]
    fn failure_leaves_a_previous_image_untouched() {
        let path = temp_path("fetch_keep");
        std::fs::write(&path, b"previous image").unwrap();
        let mut fetcher = ScriptedFetcher::new(vec![Ok(FetchResponse {
            status: 500,
            body: b"error page".to_vec(),
        })]);

        fetch_and_store(&mut fetcher, "http://example/map", &path).unwrap_err();

        assert_eq!(std::fs::read(&path).unwrap(), b"previous image");
        std::fs::remove_file(&path).unwrap();
    }

    #[test]
    fn transport_errors_pass_through() {
        let path = temp_path("fetch_transport");
        let mut fetcher = ScriptedFetcher::new(vec![Err(FetchError::Transport(
            "connection refused".into(),
        ))]);

        let err = fetch_and_store(&mut fetcher, "http://example/map", &path).unwrap_err();

        assert!(matches!(err, FetchError::Transport(_)));
        assert!(!path.exists());
    }
}
