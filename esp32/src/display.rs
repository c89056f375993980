use std::path::Path;

use embedded_graphics::pixelcolor::{Rgb565, Rgb888};
use embedded_graphics::prelude::*;
use embedded_graphics::primitives::Rectangle;
use esp_idf_svc::hal::delay::FreeRtos;
use esp_idf_svc::hal::gpio::{
    AnyIOPin, Gpio7, Gpio8, Gpio9, Gpio10, Gpio11, Gpio12, Output, PinDriver,
};
use esp_idf_svc::hal::prelude::*;
use esp_idf_svc::hal::spi::{config::Config as SpiConfig, SpiDeviceDriver, SpiDriver, SpiDriverConfig, SPI2};
use log::warn;
use mapmatrix_common::map::{decode_png, MapImage, MapRenderer};

pub const PANEL_WIDTH: u32 = 240;
pub const PANEL_HEIGHT: u32 = 240;

pub type PanelDisplay = mipidsi::Display<
    mipidsi::interface::SpiInterface<
        'static,
        SpiDeviceDriver<'static, SpiDriver<'static>>,
        PinDriver<'static, Gpio9, Output>,
    >,
    mipidsi::models::ST7789,
    PinDriver<'static, Gpio8, Output>,
>;

/// Brings up the SPI panel. Adjust the pin assignment to your wiring.
pub fn init_panel(
    spi2: SPI2,
    sclk: Gpio12,
    sdo: Gpio11,
    cs: Gpio10,
    dc: Gpio9,
    rst: Gpio8,
    backlight: Gpio7,
) -> anyhow::Result<PanelDisplay> {
    let driver = SpiDriver::new(spi2, sclk, sdo, None::<AnyIOPin>, &SpiDriverConfig::new())?;
    let spi = SpiDeviceDriver::new(
        driver,
        Some(cs),
        &SpiConfig::new().baudrate(40.MHz().into()),
    )?;

    let dc = PinDriver::output(dc)?;
    let rst = PinDriver::output(rst)?;
    let buffer: &'static mut [u8; 512] = Box::leak(Box::new([0u8; 512]));
    let di = mipidsi::interface::SpiInterface::new(spi, dc, buffer);

    let mut delay = FreeRtos;
    let mut display = mipidsi::Builder::new(mipidsi::models::ST7789, di)
        .reset_pin(rst)
        .display_size(PANEL_WIDTH as u16, PANEL_HEIGHT as u16)
        .init(&mut delay)
        .map_err(|e| anyhow::anyhow!("display init failed: {e:?}"))?;

    display
        .clear(Rgb565::BLACK)
        .map_err(|e| anyhow::anyhow!("display clear failed: {e:?}"))?;

    let mut backlight = PinDriver::output(backlight)?;
    backlight.set_high()?;
    // The pin driver resets the pin on drop; keep the backlight on.
    std::mem::forget(backlight);

    Ok(display)
}

/// Renders decoded map images into an RGB framebuffer and flushes the whole
/// framebuffer to the panel in one write.
pub struct PanelRenderer<D> {
    target: D,
    width: u32,
    height: u32,
    framebuffer: Vec<Rgb888>,
    opened: Option<MapImage>,
}

impl<D> PanelRenderer<D> {
    pub fn new(target: D, width: u32, height: u32) -> Self {
        Self {
            target,
            width,
            height,
            framebuffer: vec![Rgb888::BLACK; (width * height) as usize],
            opened: None,
        }
    }
}

impl<D> MapRenderer for PanelRenderer<D>
where
    D: DrawTarget,
    D::Color: From<Rgb888>,
    D::Error: core::fmt::Debug,
{
    fn open(&mut self, path: &Path) -> bool {
        match decode_png(path) {
            Ok(image) => {
                self.opened = Some(image);
                true
            }
            Err(e) => {
                warn!("cannot open {}: {e}", path.display());
                false
            }
        }
    }

    fn decode(&mut self, x: u32, y: u32) {
        let Some(image) = self.opened.take() else {
            return;
        };
        for row in 0..image.height {
            let fy = y + row;
            if fy >= self.height {
                break;
            }
            for col in 0..image.width {
                let fx = x + col;
                if fx >= self.width {
                    break;
                }
                let src = ((row * image.width + col) * 3) as usize;
                self.framebuffer[(fy * self.width + fx) as usize] = Rgb888::new(
                    image.pixels[src],
                    image.pixels[src + 1],
                    image.pixels[src + 2],
                );
            }
        }
    }

    fn flush(&mut self) {
        let area = Rectangle::new(
            Point::zero(),
            Size::new(self.width, self.height),
        );
        let pixels = self.framebuffer.iter().map(|&c| D::Color::from(c));
        if let Err(e) = self.target.fill_contiguous(&area, pixels) {
            warn!("panel flush failed: {e:?}");
        }
    }
}
