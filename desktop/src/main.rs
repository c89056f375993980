// Prevent console window in addition to Slint window in Windows release builds when, e.g., starting the app via file manager. Ignored on other platforms.
#![cfg_attr(not(debug_assertions), windows_subsystem = "windows")]

slint::include_modules!();

mod renderer;

use std::time::Duration;

use log::{error, info};
use mapmatrix_common::config::{Secrets, DEFAULT_STYLE_ID};
use mapmatrix_common::map::{
    DummyMapFetcher, HttpMapFetcher, MapFetcherPointer, MapImage, NetworkLink, RefreshConfig,
    RefreshLoop, StaticMapRequest,
};
use mapmatrix_common::Latest;

use renderer::FrameRenderer;

const SECRETS_FILE: &str = "secrets.json";

// The spot the panel points at: Gloucester, UK.
const LON: f64 = -2.2129;
const LAT: f64 = 51.8675;
const ZOOM: u32 = 15;

// Pixel dimensions of the simulated LED matrix.
const PANEL_WIDTH: u32 = 128;
const PANEL_HEIGHT: u32 = 128;

/// The OS brings the host network up; there is nothing to associate.
struct HostNetwork;

impl NetworkLink for HostNetwork {
    fn connect(&mut self) -> Result<(), Box<dyn std::error::Error>> {
        Ok(())
    }
}

/// Our App struct that holds the UI and the handoff slot for finished frames.
///
/// The refresh loop runs on a background thread and publishes frames; a
/// repeating timer on the UI thread picks them up and paints them.
struct App {
    ui: AppWindow,
    frames: Latest<MapImage>,
    timer: slint::Timer,
}

impl App {
    const POLL_INTERVAL: Duration = Duration::from_millis(500);

    /// Create a new App struct.
    ///
    /// The App struct initializes the UI and starts the refresh thread.
    fn new() -> anyhow::Result<Self> {
        // Make a new AppWindow
        let ui = AppWindow::new()?;

        let frames = Latest::default();
        spawn_refresh_thread(frames.clone());

        // Return the App struct
        Ok(Self {
            ui,
            frames,
            timer: slint::Timer::default(),
        })
    }

    /// Run the App, polling for freshly rendered frames.
    fn run(&mut self) -> anyhow::Result<()> {
        // Get the handle to the UI as a weak reference for the timer closure.
        let ui_handle = self.ui.as_weak();
        let frames = self.frames.clone();

        self.timer
            .start(slint::TimerMode::Repeated, Self::POLL_INTERVAL, move || {
                if let Some(frame) = frames.take() {
                    let mut buffer = slint::SharedPixelBuffer::<slint::Rgb8Pixel>::new(
                        frame.width,
                        frame.height,
                    );
                    buffer.make_mut_bytes().copy_from_slice(&frame.pixels);
                    let ui = ui_handle.unwrap();
                    ui.set_map_frame(slint::Image::from_rgb8(buffer));
                }
            });

        // Run the UI (and map an error to an anyhow::Error).
        self.ui.run().map_err(|e| anyhow::anyhow!(e))
    }
}

fn spawn_refresh_thread(frames: Latest<MapImage>) {
    std::thread::spawn(move || {
        let (fetcher, request) = fetcher_from_secrets();
        let renderer = FrameRenderer::new(PANEL_WIDTH, PANEL_HEIGHT, frames);
        let mut refresh = RefreshLoop::new(
            HostNetwork,
            fetcher,
            renderer,
            request,
            RefreshConfig::default(),
        );
        if let Err(e) = refresh.run() {
            error!("refresh loop stopped: {e}");
        }
    });
}

/// Picks the real transport when a secrets file is present, the canned map
/// image otherwise.
fn fetcher_from_secrets() -> (MapFetcherPointer, StaticMapRequest) {
    let mut request = StaticMapRequest {
        style_id: DEFAULT_STYLE_ID.into(),
        lon: LON,
        lat: LAT,
        zoom: ZOOM,
        width: PANEL_WIDTH,
        height: PANEL_HEIGHT,
        token: String::new(),
    };

    match Secrets::load(SECRETS_FILE) {
        Ok(secrets) => {
            info!("loaded {secrets:?}");
            request.style_id = secrets.style_id().into();
            request.token = secrets.mapbox_token;
            (Box::new(HttpMapFetcher::new()), request)
        }
        Err(e) => {
            info!("no usable {SECRETS_FILE} ({e}); showing the canned map image");
            (Box::new(DummyMapFetcher), request)
        }
    }
}

/// A minimal main function that initializes the App and runs it.
fn main() -> anyhow::Result<()> {
    env_logger::init();

    let mut app = App::new()?;

    app.run()
}
