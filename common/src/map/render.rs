use std::path::Path;

/// A decoded image as packed 8-bit RGB, row-major.
#[derive(Clone, Debug, PartialEq)]
pub struct MapImage {
    pub width: u32,
    pub height: u32,
    pub pixels: Vec<u8>,
}

/// Errors raised while decoding a stored map image.
#[derive(Debug, thiserror::Error)]
pub enum DecodeError {
    #[error("cannot open stored image: {0}")]
    Io(#[from] std::io::Error),
    #[error("cannot decode stored image: {0}")]
    Png(#[from] png::DecodingError),
    #[error("unsupported color type {0:?}")]
    UnsupportedColorType(png::ColorType),
}

/// Decodes the stored PNG into packed RGB.
///
/// A partially written or corrupt file fails closed here; callers skip the
/// render cycle instead of crashing the loop.
pub fn decode_png(path: &Path) -> Result<MapImage, DecodeError> {
    let file = std::fs::File::open(path)?;
    let mut decoder = png::Decoder::new(std::io::BufReader::new(file));
    // Normalize palette, low-bit-depth and 16-bit images to 8-bit channels.
    decoder.set_transformations(png::Transformations::EXPAND | png::Transformations::STRIP_16);
    let mut reader = decoder.read_info()?;

    let mut buf = vec![0u8; reader.output_buffer_size()];
    let info = reader.next_frame(&mut buf)?;
    let data = &buf[..info.buffer_size()];

    let pixels = match info.color_type {
        png::ColorType::Rgb => data.to_vec(),
        png::ColorType::Rgba => data.chunks_exact(4).flat_map(|px| [px[0], px[1], px[2]]).collect(),
        other => return Err(DecodeError::UnsupportedColorType(other)),
    };

    Ok(MapImage {
        width: info.width,
        height: info.height,
        pixels,
    })
}

/// The decode-and-render boundary consumed by the refresh loop.
///
/// The loop calls `open` on the freshly stored file and calls
/// `decode`/`flush` only when `open` reported success.
pub trait MapRenderer {
    /// Opens the stored image; false means this cycle's render is skipped.
    fn open(&mut self, path: &Path) -> bool;

    /// Blits the opened image into the framebuffer at `(x, y)`.
    fn decode(&mut self, x: u32, y: u32);

    /// Pushes the framebuffer to the physical panel.
    fn flush(&mut self);
}
