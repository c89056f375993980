use embedded_svc::http::client::Client as HttpClient;
use embedded_svc::http::Method;
use embedded_svc::io::Read;
use esp_idf_svc::http::client::{Configuration, EspHttpConnection};
use mapmatrix_common::map::{FetchError, FetchResponse, MapFetcher};

const TIMEOUT_MS: u64 = 15_000;

/// One-shot HTTPS GET transport backed by the ESP-IDF HTTP client.
pub struct EspMapFetcher {
    client: HttpClient<EspHttpConnection>,
}

impl EspMapFetcher {
    pub fn new() -> anyhow::Result<Self> {
        let config = Configuration {
            timeout: Some(std::time::Duration::from_millis(TIMEOUT_MS)),
            use_global_ca_store: true,
            crt_bundle_attach: Some(esp_idf_svc::sys::esp_crt_bundle_attach),
            ..Default::default()
        };
        let connection = EspHttpConnection::new(&config)?;
        Ok(Self {
            client: HttpClient::wrap(connection),
        })
    }
}

impl MapFetcher for EspMapFetcher {
    fn get(&mut self, url: &str) -> Result<FetchResponse, FetchError> {
        let request = self
            .client
            .request(Method::Get, url, &[])
            .map_err(|e| FetchError::Transport(e.to_string()))?;
        let mut response = request
            .submit()
            .map_err(|e| FetchError::Transport(e.to_string()))?;

        let status = response.status();
        let mut body = Vec::new();
        let mut buf = [0u8; 1024];
        loop {
            let n = response
                .read(&mut buf)
                .map_err(|e| FetchError::Transport(e.to_string()))?;
            if n == 0 {
                break;
            }
            body.extend_from_slice(&buf[..n]);
        }

        Ok(FetchResponse { status, body })
    }
}
