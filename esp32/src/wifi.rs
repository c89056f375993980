use anyhow::Result;
use embedded_svc::wifi::{AuthMethod, ClientConfiguration, Configuration};
use esp_idf_svc::wifi::{BlockingWifi, EspWifi};
use log::info;
use mapmatrix_common::map::NetworkLink;

/// WiFi association for the refresh loop.
///
/// `BlockingWifi` bounds each phase at the ESP-IDF defaults (roughly 20 s
/// for association) before reporting failure, which the loop treats as a
/// fatal startup error.
pub struct WifiLink {
    wifi: BlockingWifi<EspWifi<'static>>,
    ssid: &'static str,
    password: &'static str,
}

impl WifiLink {
    pub fn new(
        wifi: BlockingWifi<EspWifi<'static>>,
        ssid: &'static str,
        password: &'static str,
    ) -> Self {
        Self { wifi, ssid, password }
    }

    fn associate(&mut self) -> Result<()> {
        let wifi_configuration: Configuration = Configuration::Client(ClientConfiguration {
            ssid: self
                .ssid
                .try_into()
                .map_err(|_| anyhow::anyhow!("SSID longer than 32 bytes"))?,
            bssid: None,
            auth_method: AuthMethod::WPA2Personal,
            password: self
                .password
                .try_into()
                .map_err(|_| anyhow::anyhow!("password longer than 64 bytes"))?,
            channel: None,
            ..Default::default()
        });

        self.wifi.set_configuration(&wifi_configuration)?;

        self.wifi.start()?;
        info!("Wifi started");

        self.wifi.connect()?;
        info!("Wifi connected");

        self.wifi.wait_netif_up()?;
        info!("Wifi netif up");

        Ok(())
    }
}

impl NetworkLink for WifiLink {
    fn connect(&mut self) -> Result<(), Box<dyn std::error::Error>> {
        self.associate().map_err(|e| e.into())
    }
}
