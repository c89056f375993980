use anyhow::Result;
use esp_idf_svc::eventloop::EspSystemEventLoop;
use esp_idf_svc::hal::prelude::Peripherals;
use esp_idf_svc::nvs::EspDefaultNvsPartition;
use esp_idf_svc::wifi::{BlockingWifi, EspWifi};
use log::error;

use mapmatrix_common::map::{RefreshConfig, RefreshLoop, StaticMapRequest};

mod display;
mod http;
mod wifi;

const WIFI_SSID: &str = env!("WIFI_SSID");
const WIFI_PASS: &str = env!("WIFI_PASS");
const MAPBOX_TOKEN: &str = env!("MAPBOX_TOKEN");
const STYLE_ID: &str = match option_env!("STYLE_ID") {
    Some(style_id) => style_id,
    None => "mapbox/streets-v12",
};

// The spot the panel points at: Gloucester, UK.
const LON: f64 = -2.2129;
const LAT: f64 = 51.8675;
const ZOOM: u32 = 15;

const IMAGE_PATH: &str = "/spiffs/map.png";

/// Mounts the SPIFFS data partition holding the stored map image.
fn mount_storage() -> Result<()> {
    let base_path = std::ffi::CString::new("/spiffs")?;
    let conf = esp_idf_svc::sys::esp_vfs_spiffs_conf_t {
        base_path: base_path.as_ptr(),
        partition_label: core::ptr::null(),
        max_files: 4,
        format_if_mount_failed: true,
    };
    esp_idf_svc::sys::esp!(unsafe { esp_idf_svc::sys::esp_vfs_spiffs_register(&conf) })?;
    Ok(())
}

fn main() -> Result<()> {
    // It is necessary to call this function once. Otherwise some patches to the runtime
    // implemented by esp-idf-sys might not link properly. See https://github.com/esp-rs/esp-idf-template/issues/71
    esp_idf_svc::sys::link_patches();

    // Bind the log crate to the ESP Logging facilities
    esp_idf_svc::log::EspLogger::initialize_default();

    let peripherals = Peripherals::take()?;
    let sysloop = EspSystemEventLoop::take()?;
    let nvs = EspDefaultNvsPartition::take()?;

    mount_storage()?;

    let wifi = BlockingWifi::wrap(
        EspWifi::new(peripherals.modem, sysloop.clone(), Some(nvs))?,
        sysloop,
    )?;
    let network = wifi::WifiLink::new(wifi, WIFI_SSID, WIFI_PASS);

    let panel = display::init_panel(
        peripherals.spi2,
        peripherals.pins.gpio12,
        peripherals.pins.gpio11,
        peripherals.pins.gpio10,
        peripherals.pins.gpio9,
        peripherals.pins.gpio8,
        peripherals.pins.gpio7,
    )?;
    let renderer = display::PanelRenderer::new(panel, display::PANEL_WIDTH, display::PANEL_HEIGHT);

    let request = StaticMapRequest {
        style_id: STYLE_ID.into(),
        lon: LON,
        lat: LAT,
        zoom: ZOOM,
        width: display::PANEL_WIDTH,
        height: display::PANEL_HEIGHT,
        token: MAPBOX_TOKEN.into(),
    };
    let config = RefreshConfig {
        image_path: IMAGE_PATH.into(),
        ..Default::default()
    };

    let mut refresh = RefreshLoop::new(
        network,
        http::EspMapFetcher::new()?,
        renderer,
        request,
        config,
    );
    refresh.run().map_err(|e| {
        error!("refresh loop stopped: {e}");
        anyhow::Error::from(e)
    })
}
