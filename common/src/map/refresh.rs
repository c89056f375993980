use std::path::PathBuf;
use std::time::Duration;

use log::{error, info, warn};

use crate::map::fetcher::{fetch_and_store, FetchError, MapFetcher};
use crate::map::render::MapRenderer;
use crate::map::url::{redact_token, StaticMapRequest};

/// Network bring-up as seen by the refresh loop.
///
/// On the device this associates to the WiFi access point, blocking until
/// connected or until the association timeout expires. On the desktop the
/// host network is assumed to be up already.
pub trait NetworkLink {
    fn connect(&mut self) -> Result<(), Box<dyn std::error::Error>>;
}

/// States of the refresh cycle. `Stopped` is terminal.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RefreshState {
    Connecting,
    Idle,
    Fetching,
    Rendering,
    Waiting,
    Stopped,
}

/// Why the loop reached `Stopped`.
#[derive(Debug, thiserror::Error)]
pub enum RefreshError {
    #[error("network bring-up failed: {0}")]
    Connect(String),
    #[error(transparent)]
    Fetch(#[from] FetchError),
}

pub struct RefreshConfig {
    /// Wall-clock pause between cycles.
    pub interval: Duration,
    /// Where the fetched image is stored; overwritten every cycle.
    pub image_path: PathBuf,
}

impl Default for RefreshConfig {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(300),
            image_path: PathBuf::from("map.png"),
        }
    }
}

// The wait is subdivided so a stop request could interrupt it later.
const SLEEP_CHUNK: Duration = Duration::from_secs(5);

/// The image-acquisition-and-display cycle.
///
/// Network, transport and renderer are injected; the loop owns no hidden
/// global state. A failed fetch stops the loop for good, a failed decode
/// only skips one render.
pub struct RefreshLoop<N, F, R> {
    network: N,
    fetcher: F,
    renderer: R,
    request: StaticMapRequest,
    config: RefreshConfig,
    state: RefreshState,
    error: Option<RefreshError>,
}

impl<N, F, R> RefreshLoop<N, F, R>
where
    N: NetworkLink,
    F: MapFetcher,
    R: MapRenderer,
{
    pub fn new(network: N, fetcher: F, renderer: R, request: StaticMapRequest, config: RefreshConfig) -> Self {
        Self {
            network,
            fetcher,
            renderer,
            request,
            config,
            state: RefreshState::Connecting,
            error: None,
        }
    }

    pub fn state(&self) -> RefreshState {
        self.state
    }

    /// Advances the state machine by one transition and returns the new
    /// state.
    pub fn step(&mut self) -> RefreshState {
        self.state = match self.state {
            RefreshState::Connecting => match self.network.connect() {
                Ok(()) => {
                    info!("network up");
                    RefreshState::Idle
                }
                Err(e) => {
                    error!("network bring-up failed: {e}");
                    self.error = Some(RefreshError::Connect(e.to_string()));
                    RefreshState::Stopped
                }
            },
            RefreshState::Idle => RefreshState::Fetching,
            RefreshState::Fetching => {
                let url = self.request.url();
                info!("fetching {}", redact_token(&url));
                match fetch_and_store(&mut self.fetcher, &url, &self.config.image_path) {
                    Ok(()) => RefreshState::Rendering,
                    Err(e) => {
                        error!("{e}");
                        self.error = Some(e.into());
                        RefreshState::Stopped
                    }
                }
            }
            RefreshState::Rendering => {
                if self.renderer.open(&self.config.image_path) {
                    self.renderer.decode(0, 0);
                    self.renderer.flush();
                } else {
                    warn!(
                        "stored image {} is unreadable, skipping this render",
                        self.config.image_path.display()
                    );
                }
                RefreshState::Waiting
            }
            RefreshState::Waiting => {
                let mut remaining = self.config.interval;
                while !remaining.is_zero() {
                    let chunk = remaining.min(SLEEP_CHUNK);
                    std::thread::sleep(chunk);
                    remaining -= chunk;
                }
                RefreshState::Fetching
            }
            RefreshState::Stopped => RefreshState::Stopped,
        };
        self.state
    }

    /// Runs until the terminal state and reports why the loop stopped.
    pub fn run(&mut self) -> Result<(), RefreshError> {
        while self.state != RefreshState::Stopped {
            self.step();
        }
        match self.error.take() {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }
}
