//! Canvas geometry and the temperature to pixel-row mapping.

use crate::error::{Error, Result};
use crate::weather::TemperatureRange;

/// Spans narrower than this are stretched so flat forecasts don't fill the band.
pub const MIN_TEMPERATURE_SPAN: f64 = 5.0;

/// Fixed horizontal and vertical measures of the landscape.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Layout {
    pub width: u32,
    pub height: u32,
    /// Columns held flat at the current temperature before the forecast begins.
    pub x_start: i32,
    /// Columns per forecast bucket.
    pub x_step: i32,
    /// Plateau width at each sample.
    pub x_flat: i32,
    /// Rows reserved under the curve for the temperature numerals.
    pub y_offset: i32,
    pub sprite_height: i32,
    pub cloud_sprite_height: i32,
}

impl Layout {
    pub fn new(width: u32, height: u32) -> Result<Layout> {
        let layout = Layout {
            width,
            height,
            x_start: 32,
            x_step: 44,
            x_flat: 10,
            y_offset: 14,
            sprite_height: 20,
            cloud_sprite_height: 13,
        };
        if width == 0 || layout.curve_band() <= 0.0 {
            return Err(Error::DegenerateCanvas { width, height });
        }
        Ok(layout)
    }

    fn drawable_height(&self) -> f64 {
        (self.height as f64 - self.y_offset as f64).max(0.0)
    }

    /// Rows available to the temperature curve.
    pub fn curve_band(&self) -> f64 {
        (self.height as f64 - self.y_offset as f64 - self.sprite_height as f64) / 3.0
    }

    pub fn temperature_band(&self) -> i32 {
        (self.drawable_height() / 3.0).round() as i32
    }

    pub fn cloud_band(&self) -> i32 {
        (self.drawable_height() / 3.0).round() as i32
    }

    /// Row clouds hang from.
    pub fn y_clouds(&self) -> i32 {
        (self.height as f64
            - self.y_offset as f64
            - self.temperature_band() as f64
            - self.cloud_sprite_height as f64 / 2.0)
            .round() as i32
    }

    /// Row of the sun and moon band.
    pub fn y_sunmoon(&self) -> i32 {
        self.height as i32 - self.y_offset - self.temperature_band() - self.cloud_band()
    }

    /// Length of the ease segment between two plateaus.
    pub fn ease(&self) -> i32 {
        (self.x_step - self.x_flat) / 2
    }

    pub fn half_step(&self) -> i32 {
        self.x_step / 2
    }

    /// Number of forecast buckets needed for the curve to reach the right edge.
    pub fn bucket_count(&self) -> usize {
        let first_end = self.x_start + self.ease() + self.x_flat;
        let rest = self.width as i32 - first_end;
        if rest <= 0 {
            1
        } else {
            1 + ((rest + self.x_step - 1) / self.x_step) as usize
        }
    }

    /// Length of the temperature line, the width plus one step of lookahead.
    pub fn line_len(&self) -> usize {
        self.width as usize + self.x_step as usize + 1
    }
}

/// Maps temperatures to pixel rows within the curve band.
#[derive(Debug, Clone, Copy)]
pub struct TemperatureMapper {
    base: f64,
    tmin: f64,
    degrees_per_pixel: f64,
}

impl TemperatureMapper {
    pub fn new(layout: &Layout, range: TemperatureRange) -> Result<Self> {
        let band = layout.curve_band();
        if band <= 0.0 {
            return Err(Error::DegenerateCanvas {
                width: layout.width,
                height: layout.height,
            });
        }
        Ok(Self {
            base: layout.height as f64 - layout.y_offset as f64,
            tmin: range.min(),
            degrees_per_pixel: range.span().max(MIN_TEMPERATURE_SPAN) / band,
        })
    }

    pub fn degrees_per_pixel(&self) -> f64 {
        self.degrees_per_pixel
    }

    pub fn to_pixel_y(&self, t: f64) -> i32 {
        (self.base - (t - self.tmin) / self.degrees_per_pixel).round() as i32
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_layout_measures() {
        let l = Layout::new(512, 128).unwrap();
        assert_eq!(l.temperature_band(), 38);
        assert_eq!(l.y_sunmoon(), 38);
        assert_eq!(l.y_clouds(), 70);
        assert_eq!(l.ease(), 17);
        assert_eq!(l.bucket_count(), 12);
        assert_eq!(l.line_len(), 557);
    }

    #[test]
    fn degenerate_canvas_is_rejected() {
        assert!(matches!(
            Layout::new(512, 34),
            Err(Error::DegenerateCanvas { .. })
        ));
        assert!(Layout::new(0, 128).is_err());
        assert!(Layout::new(16, 35).is_ok());
    }

    #[test]
    fn narrow_spans_use_minimum() {
        let l = Layout::new(512, 128).unwrap();
        let band = l.curve_band();
        let m = TemperatureMapper::new(&l, TemperatureRange::new(11.0, 10.0)).unwrap();
        assert!((m.degrees_per_pixel() - MIN_TEMPERATURE_SPAN / band).abs() < 1e-12);

        let m = TemperatureMapper::new(&l, TemperatureRange::new(30.0, 10.0)).unwrap();
        assert!((m.degrees_per_pixel() - 20.0 / band).abs() < 1e-12);
    }

    #[test]
    fn warmer_is_higher() {
        let l = Layout::new(512, 128).unwrap();
        let m = TemperatureMapper::new(&l, TemperatureRange::new(20.0, 0.0)).unwrap();
        assert_eq!(m.to_pixel_y(0.0), 114);
        let band = l.curve_band();
        assert_eq!(m.to_pixel_y(20.0), (114.0 - band).round() as i32);
        assert!(m.to_pixel_y(10.0) < m.to_pixel_y(5.0));
    }
}
