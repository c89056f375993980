mod dummymapfetcher;
mod fetcher;
mod refresh;
mod render;
mod url;

pub use dummymapfetcher::DummyMapFetcher;
pub use fetcher::{fetch_and_store, FetchError, FetchResponse, MapFetcher, MapFetcherPointer};
pub use refresh::{NetworkLink, RefreshConfig, RefreshError, RefreshLoop, RefreshState};
pub use render::{decode_png, DecodeError, MapImage, MapRenderer};
pub use url::{build_image_url, redact_token, StaticMapRequest};

#[cfg(feature = "fetch")]
mod httpmapfetcher;

#[cfg(feature = "fetch")]
pub use httpmapfetcher::HttpMapFetcher;
