use crate::map::fetcher::{FetchError, FetchResponse, MapFetcher};

/// Serves an embedded 128x128 map image instead of hitting the network.
///
/// Used by the desktop simulator when no secrets file is present, and by
/// tests that need a decodable image.
#[derive(Default)]
pub struct DummyMapFetcher;

impl DummyMapFetcher {
    pub const IMAGE: &'static [u8] = include_bytes!("./dummymap.png");
}

impl MapFetcher for DummyMapFetcher {
    fn get(&mut self, _url: &str) -> Result<FetchResponse, FetchError> {
        Ok(FetchResponse {
            status: 200,
            body: Self::IMAGE.to_vec(),
        })
    }
}
