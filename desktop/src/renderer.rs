use std::path::Path;

use log::warn;
use mapmatrix_common::map::{decode_png, MapImage, MapRenderer};
use mapmatrix_common::Latest;

/// Blits decoded map images into an in-memory framebuffer and publishes
/// finished frames for the UI thread to paint.
pub struct FrameRenderer {
    width: u32,
    height: u32,
    framebuffer: Vec<u8>,
    opened: Option<MapImage>,
    frames: Latest<MapImage>,
}

impl FrameRenderer {
    pub fn new(width: u32, height: u32, frames: Latest<MapImage>) -> Self {
        Self {
            width,
            height,
            framebuffer: vec![0; (width * height * 3) as usize],
            opened: None,
            frames,
        }
    }
}

impl MapRenderer for FrameRenderer {
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
        // Blit with clipping at the framebuffer edges.
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
                let dst = ((fy * self.width + fx) * 3) as usize;
                self.framebuffer[dst..dst + 3].copy_from_slice(&image.pixels[src..src + 3]);
            }
        }
    }

    fn flush(&mut self) {
        self.frames.publish(MapImage {
            width: self.width,
            height: self.height,
            pixels: self.framebuffer.clone(),
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::BufWriter;
    use std::path::PathBuf;

    fn temp_path(tag: &str) -> PathBuf {
        std::env::temp_dir().join(format!("mapmatrix_frame_{}_{}.png", tag, std::process::id()))
    }

    fn write_rgb_png(path: &Path, width: u32, height: u32, data: &[u8]) {
        let file = std::fs::File::create(path).unwrap();
        let mut encoder = png::Encoder::new(BufWriter::new(file), width, height);
        encoder.set_color(png::ColorType::Rgb);
        encoder.set_depth(png::BitDepth::Eight);
        let mut writer = encoder.write_header().unwrap();
        writer.write_image_data(data).unwrap();
    }

    #[test]
    fn renders_a_frame_at_an_offset() {
        let path = temp_path("offset");
        write_rgb_png(&path, 2, 1, &[10, 20, 30, 40, 50, 60]);

        let frames = Latest::default();
        let mut renderer = FrameRenderer::new(4, 4, frames.clone());
        assert!(renderer.open(&path));
        renderer.decode(1, 2);
        renderer.flush();

        let frame = frames.take().unwrap();
        assert_eq!((frame.width, frame.height), (4, 4));
        let at = |x: u32, y: u32| {
            let i = ((y * 4 + x) * 3) as usize;
            [frame.pixels[i], frame.pixels[i + 1], frame.pixels[i + 2]]
        };
        assert_eq!(at(1, 2), [10, 20, 30]);
        assert_eq!(at(2, 2), [40, 50, 60]);
        assert_eq!(at(0, 0), [0, 0, 0]);
        std::fs::remove_file(&path).unwrap();
    }

    #[test]
    fn oversized_images_are_clipped() {
        let path = temp_path("clip");
        write_rgb_png(&path, 3, 3, &[200u8; 27]);

        let frames = Latest::default();
        let mut renderer = FrameRenderer::new(2, 2, frames.clone());
        assert!(renderer.open(&path));
        renderer.decode(0, 0);
        renderer.flush();

        let frame = frames.take().unwrap();
        assert_eq!(frame.pixels, vec![200u8; 12]);
        std::fs::remove_file(&path).unwrap();
    }

    #[test]
    fn unreadable_files_report_failure_and_publish_nothing() {
        let path = temp_path("bad");
        std::fs::write(&path, b"garbage").unwrap();

        let frames: Latest<MapImage> = Latest::default();
        let mut renderer = FrameRenderer::new(2, 2, frames.clone());
        assert!(!renderer.open(&path));

        assert!(frames.take().is_none());
        std::fs::remove_file(&path).unwrap();
    }
}
