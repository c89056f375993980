use crate::map::fetcher::{FetchError, FetchResponse, MapFetcher};

/// Blocking HTTP transport for desktop builds.
pub struct HttpMapFetcher {
    client: reqwest::blocking::Client,
}

impl HttpMapFetcher {
    pub fn new() -> Self {
        Self {
            client: reqwest::blocking::Client::new(),
        }
    }
}

impl Default for HttpMapFetcher {
    fn default() -> Self {
        Self::new()
    }
}

impl MapFetcher for HttpMapFetcher {
    fn get(&mut self, url: &str) -> Result<FetchResponse, FetchError> {
        let response = self
            .client
            .get(url)
            .send()
            .map_err(|e| FetchError::Transport(e.to_string()))?;
        let status = response.status().as_u16();
        let body = response
            .bytes()
            .map_err(|e| FetchError::Transport(e.to_string()))?
            .to_vec();
        Ok(FetchResponse { status, body })
    }
}
