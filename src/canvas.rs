use std::io::{Cursor, Seek, Write};
use std::path::Path;

use image::{GrayImage, ImageOutputFormat, Luma};

use crate::error::Result;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Color {
    Dark,
    Light,
}

impl Color {
    fn luma(self) -> Luma<u8> {
        match self {
            Color::Dark => Luma([0]),
            Color::Light => Luma([255]),
        }
    }
}

/// Two-color raster, light by default.
pub struct Canvas {
    img: GrayImage,
}

impl Canvas {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            img: GrayImage::from_pixel(width, height, Color::Light.luma()),
        }
    }

    pub fn width(&self) -> u32 {
        self.img.width()
    }

    pub fn height(&self) -> u32 {
        self.img.height()
    }

    pub fn contains(&self, x: i32, y: i32) -> bool {
        x >= 0 && y >= 0 && (x as u32) < self.width() && (y as u32) < self.height()
    }

    pub fn get(&self, x: i32, y: i32) -> Option<Color> {
        if !self.contains(x, y) {
            return None;
        }
        Some(match self.img.get_pixel(x as u32, y as u32).0[0] {
            0 => Color::Dark,
            _ => Color::Light,
        })
    }

    /// Sets a pixel; coordinates off the canvas are ignored.
    pub fn set(&mut self, x: i32, y: i32, c: Color) {
        if self.contains(x, y) {
            self.img.put_pixel(x as u32, y as u32, c.luma());
        }
    }

    /// Raw luma bytes, row major.
    pub fn as_bytes(&self) -> &[u8] {
        self.img.as_raw()
    }

    pub fn write_png<W: Write + Seek>(&self, w: &mut W) -> Result<()> {
        self.img.write_to(w, ImageOutputFormat::Png)?;
        Ok(())
    }

    pub fn to_png(&self) -> Result<Vec<u8>> {
        let mut buf = Cursor::new(Vec::new());
        self.write_png(&mut buf)?;
        Ok(buf.into_inner())
    }

    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        self.img.save_with_format(path, image::ImageFormat::Png)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_light() {
        let c = Canvas::new(4, 3);
        assert!(c.as_bytes().iter().all(|&b| b == 255));
        assert_eq!(c.get(3, 2), Some(Color::Light));
        assert_eq!(c.get(4, 0), None);
    }

    #[test]
    fn set_ignores_out_of_bounds() {
        let mut c = Canvas::new(4, 3);
        c.set(-1, 0, Color::Dark);
        c.set(0, 3, Color::Dark);
        c.set(1, 1, Color::Dark);
        assert_eq!(c.as_bytes().iter().filter(|&&b| b == 0).count(), 1);
        assert_eq!(c.get(1, 1), Some(Color::Dark));
    }

    #[test]
    fn png_has_signature() {
        let png = Canvas::new(8, 8).to_png().unwrap();
        assert_eq!(&png[..8], b"\x89PNG\r\n\x1a\n");
    }
}
