//! Built-in bitmaps and the drawing operations used by every render pass.
//!
//! Sprites are anchored at their bottom-left pixel. `#` is dark, `.` is
//! light and anything else is transparent.

use std::collections::BTreeMap;

use crate::canvas::{Canvas, Color};
use crate::curve::TemperatureLine;

/// Rain and snow mark each candidate pixel with probability
/// `mm / HEAVY_* / *_FACTOR`, capped at 1.
const HEAVY_RAIN: f64 = 5.0;
const RAIN_FACTOR: f64 = 20.0;
const HEAVY_SNOW: f64 = 5.0;
const SNOW_FACTOR: f64 = 10.0;

const GLYPH_ADVANCE: i32 = 4;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Icon {
    House,
    Sun,
    Moon,
    /// Variant 0 at midnight, 1 at noon.
    Flower,
    /// Variant is the wind strength, 0 to 3.
    Wind,
    /// Variant is the cloud size.
    Cloud,
}

impl Icon {
    pub fn name(&self) -> &'static str {
        match self {
            Icon::House => "house",
            Icon::Sun => "sun",
            Icon::Moon => "moon",
            Icon::Flower => "flower",
            Icon::Wind => "wind",
            Icon::Cloud => "cloud",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sprite {
    width: i32,
    height: i32,
    pixels: Vec<Option<Color>>,
}

impl Sprite {
    pub fn parse(rows: &[&str]) -> Sprite {
        let width = rows.iter().map(|r| r.chars().count()).max().unwrap_or(0);
        let mut pixels = Vec::with_capacity(width * rows.len());
        for row in rows {
            let mut n = 0;
            for c in row.chars() {
                pixels.push(match c {
                    '#' => Some(Color::Dark),
                    '.' => Some(Color::Light),
                    _ => None,
                });
                n += 1;
            }
            pixels.extend(std::iter::repeat(None).take(width - n));
        }
        Sprite {
            width: width as i32,
            height: rows.len() as i32,
            pixels,
        }
    }

    /// Outlined elliptical puff roughly `size` pixels across.
    pub fn cloud(size: u32) -> Sprite {
        let width = size as i32 + 4;
        let height = (width / 3).clamp(3, 13);
        let (rx, ry) = (width as f64 / 2.0, height as f64 / 2.0);
        let inside = |x: i32, y: i32| {
            if x < 0 || y < 0 || x >= width || y >= height {
                return false;
            }
            let dx = (x as f64 + 0.5 - rx) / rx;
            let dy = (y as f64 + 0.5 - ry) / ry;
            dx * dx + dy * dy <= 1.0
        };

        let mut pixels = Vec::with_capacity((width * height) as usize);
        for y in 0..height {
            for x in 0..width {
                pixels.push(if !inside(x, y) {
                    None
                } else if inside(x - 1, y) && inside(x + 1, y) && inside(x, y - 1) && inside(x, y + 1)
                {
                    Some(Color::Light)
                } else {
                    Some(Color::Dark)
                });
            }
        }
        Sprite {
            width,
            height,
            pixels,
        }
    }

    pub fn width(&self) -> i32 {
        self.width
    }

    pub fn height(&self) -> i32 {
        self.height
    }

    pub fn mirrored(&self) -> Sprite {
        let mut pixels = Vec::with_capacity(self.pixels.len());
        for row in self.pixels.chunks(self.width.max(1) as usize) {
            pixels.extend(row.iter().rev().copied());
        }
        Sprite {
            width: self.width,
            height: self.height,
            pixels,
        }
    }

    fn blit(&self, canvas: &mut Canvas, x: i32, y: i32) {
        let top = y - self.height + 1;
        for (i, p) in self.pixels.iter().enumerate() {
            if let Some(c) = p {
                let i = i as i32;
                canvas.set(x + i % self.width, top + i / self.width, *c);
            }
        }
    }
}

const HOUSE: &[&str] = &[
    "     #     ",
    "    #.#    ",
    "   #...#   ",
    "  #.....#  ",
    " #.......# ",
    "###########",
    " #.......# ",
    " #.##.##.# ",
    " #.##.##.# ",
    " #.......# ",
    " ######### ",
];

const SUN: &[&str] = &[
    "#    #    #",
    " #       # ",
    "   #####   ",
    "  #.....#  ",
    "  #.....#  ",
    "###.....###",
    "  #.....#  ",
    "  #.....#  ",
    "   #####   ",
    " #       # ",
    "#    #    #",
];

const MOON: &[&str] = &[
    "   ####  ",
    "  ##.    ",
    " ##.     ",
    "##.      ",
    "##.      ",
    "##.      ",
    " ##.     ",
    "  ##.    ",
    "   ####  ",
];

const FLOWER_NIGHT: &[&str] = &[
    " ### ",
    "#####",
    " ### ",
    "  #  ",
    "  #  ",
    " ##  ",
    "  #  ",
];

const FLOWER_DAY: &[&str] = &[
    " #.# ",
    "#...#",
    " #.# ",
    "  #  ",
    "  ## ",
    " ##  ",
    "  #  ",
];

const WIND: [&[&str]; 4] = [
    &[
        "  #  ",
        " ### ",
        "#####",
        " ### ",
        "#####",
        "  #  ",
        "  #  ",
    ],
    &[
        "   # ",
        "  ###",
        " ####",
        "  ###",
        " ####",
        "  #  ",
        "  #  ",
    ],
    &[
        "    ##",
        "  ####",
        " #### ",
        "  ####",
        " #####",
        "  #   ",
        "  #   ",
    ],
    &[
        "  ## ##",
        " ######",
        "  ##   ",
        "  #  ##",
        "  #    ",
        "  #    ",
    ],
];

const DIGITS: [&[&str]; 10] = [
    &["###", "# #", "# #", "# #", "###"],
    &[" # ", "## ", " # ", " # ", "###"],
    &["###", "  #", "###", "#  ", "###"],
    &["###", "  #", " ##", "  #", "###"],
    &["# #", "# #", "###", "  #", "  #"],
    &["###", "#  ", "###", "  #", "###"],
    &["###", "#  ", "###", "# #", "###"],
    &["###", "  #", "  #", " # ", " # "],
    &["###", "# #", "###", "# #", "###"],
    &["###", "# #", "###", "  #", "###"],
];

const MINUS: &[&str] = &["   ", "   ", "###", "   ", "   "];

const CLOUD_SIZES: [u32; 6] = [2, 3, 5, 10, 30, 50];

/// Cloud sizes drawn for a coverage percentage.
fn cloud_set(percent: f64) -> &'static [u32] {
    match percent {
        p if p < 2.0 => &[],
        p if p < 5.0 => &[2],
        p if p < 10.0 => &[3, 2],
        p if p < 20.0 => &[5, 3, 2],
        p if p < 30.0 => &[10, 5],
        p if p < 40.0 => &[10, 10],
        p if p < 50.0 => &[10, 10, 5],
        p if p < 60.0 => &[30, 5],
        p if p < 70.0 => &[30, 10],
        p if p < 80.0 => &[30, 10, 5, 5],
        p if p < 90.0 => &[30, 10, 10],
        _ => &[50, 30, 10, 10, 5],
    }
}

/// Wind strength variant for a speed in m/s.
fn wind_variant(speed: f64) -> u32 {
    match speed {
        s if s < 3.0 => 0,
        s if s < 6.0 => 1,
        s if s < 10.0 => 2,
        _ => 3,
    }
}

/// Stable pseudo-random value in `[0, 1)` for a pixel.
fn speckle(x: i32, y: i32) -> f64 {
    let mut h = (x as u32).wrapping_mul(0x9E37_79B1) ^ (y as u32).wrapping_mul(0x85EB_CA77);
    h ^= h >> 15;
    h = h.wrapping_mul(0x2C1B_3C6D);
    h ^= h >> 12;
    h as f64 / (u32::MAX as f64 + 1.0)
}

/// The sprite sheet and every drawing operation on a canvas.
pub struct Sprites {
    icons: BTreeMap<(Icon, u32), Sprite>,
    digits: Vec<Sprite>,
    minus: Sprite,
}

impl Default for Sprites {
    fn default() -> Self {
        Self::new()
    }
}

impl Sprites {
    pub fn new() -> Sprites {
        let mut icons = BTreeMap::new();
        icons.insert((Icon::House, 0), Sprite::parse(HOUSE));
        icons.insert((Icon::Sun, 0), Sprite::parse(SUN));
        icons.insert((Icon::Moon, 0), Sprite::parse(MOON));
        icons.insert((Icon::Flower, 0), Sprite::parse(FLOWER_NIGHT));
        icons.insert((Icon::Flower, 1), Sprite::parse(FLOWER_DAY));
        for (i, rows) in WIND.iter().enumerate() {
            icons.insert((Icon::Wind, i as u32), Sprite::parse(rows));
        }
        for size in CLOUD_SIZES {
            icons.insert((Icon::Cloud, size), Sprite::cloud(size));
        }
        Sprites {
            icons,
            digits: DIGITS.iter().map(|d| Sprite::parse(d)).collect(),
            minus: Sprite::parse(MINUS),
        }
    }

    pub fn sprite(&self, icon: Icon, variant: u32) -> Option<&Sprite> {
        self.icons.get(&(icon, variant))
    }

    /// Places `icon` with its bottom-left pixel at `(x, y)`.
    ///
    /// Anchors off the canvas and unknown variants are logged and dropped.
    pub fn draw(&self, canvas: &mut Canvas, icon: Icon, variant: u32, x: i32, y: i32) {
        let Some(sprite) = self.sprite(icon, variant) else {
            tracing::warn!(icon = icon.name(), variant, "no such sprite");
            return;
        };
        self.place(canvas, icon, sprite, x, y);
    }

    fn place(&self, canvas: &mut Canvas, icon: Icon, sprite: &Sprite, x: i32, y: i32) {
        if !canvas.contains(x, y) {
            tracing::warn!(icon = icon.name(), x, y, "icon anchor off canvas, dropped");
            return;
        }
        sprite.blit(canvas, x, y);
    }

    /// Draws `value` rounded to an integer, bottom-left at `(x, y)`.
    pub fn draw_int(&self, canvas: &mut Canvas, value: f64, x: i32, y: i32) {
        if !canvas.contains(x, y) {
            tracing::warn!(value, x, y, "numeral off canvas, dropped");
            return;
        }
        let mut cx = x;
        for c in format!("{}", value.round() as i64).chars() {
            let glyph = match c {
                '-' => &self.minus,
                d => match d.to_digit(10) {
                    Some(d) => &self.digits[d as usize],
                    None => continue,
                },
            };
            glyph.blit(canvas, cx, y);
            cx += GLYPH_ADVANCE;
        }
    }

    /// Spreads the cloud set for `percent` coverage across `width` columns
    /// centred on row `y`.
    pub fn draw_cloud(&self, canvas: &mut Canvas, percent: f64, x: i32, y: i32, width: i32) {
        let set = cloud_set(percent);
        for (i, &size) in set.iter().enumerate() {
            let Some(sprite) = self.sprite(Icon::Cloud, size) else {
                continue;
            };
            let cx = x + (i as i32 * width) / set.len() as i32;
            self.place(canvas, Icon::Cloud, sprite, cx, y + sprite.height() / 2);
        }
    }

    /// Rain streaks between row `y` and the temperature line.
    pub fn draw_rain(
        &self,
        canvas: &mut Canvas,
        mm: f64,
        x: i32,
        y: i32,
        width: i32,
        line: &TemperatureLine,
    ) {
        let p = (mm / HEAVY_RAIN / RAIN_FACTOR).clamp(0.0, 1.0);
        self.precipitate(canvas, p, x, y, width, line, |canvas, cx, cy| {
            canvas.set(cx, cy, Color::Dark);
            canvas.set(cx, cy - 1, Color::Dark);
        });
    }

    /// Snow flakes between row `y` and the temperature line.
    pub fn draw_snow(
        &self,
        canvas: &mut Canvas,
        mm: f64,
        x: i32,
        y: i32,
        width: i32,
        line: &TemperatureLine,
    ) {
        let p = (mm / HEAVY_SNOW / SNOW_FACTOR).clamp(0.0, 1.0);
        self.precipitate(canvas, p, x, y, width, line, |canvas, cx, cy| {
            canvas.set(cx, cy, Color::Dark);
        });
    }

    fn precipitate<F>(
        &self,
        canvas: &mut Canvas,
        p: f64,
        x: i32,
        y: i32,
        width: i32,
        line: &TemperatureLine,
        mark: F,
    ) where
        F: Fn(&mut Canvas, i32, i32),
    {
        if p <= 0.0 {
            return;
        }
        for cx in x..x + width {
            if cx >= canvas.width() as i32 {
                break;
            }
            let Some(ground) = line.get(cx) else {
                continue;
            };
            let ground = ground.min(canvas.height() as i32);
            let mut cy = y + 1;
            while cy < ground {
                if speckle(cx, cy) < p {
                    mark(&mut *canvas, cx, cy);
                }
                cy += 2;
            }
        }
    }

    /// A tree bent by the wind, standing on the line at column `x`.
    ///
    /// `deg` is where the wind comes from; easterly winds lean it left.
    pub fn draw_wind(
        &self,
        canvas: &mut Canvas,
        speed: f64,
        deg: f64,
        x: i32,
        line: &TemperatureLine,
    ) {
        let Some(y) = line.get(x) else {
            tracing::warn!(x, "wind marker past end of line, dropped");
            return;
        };
        let Some(sprite) = self.sprite(Icon::Wind, wind_variant(speed)) else {
            return;
        };
        let deg = deg.rem_euclid(360.0);
        if deg > 0.0 && deg < 180.0 {
            self.place(canvas, Icon::Wind, &sprite.mirrored(), x, y);
        } else {
            self.place(canvas, Icon::Wind, sprite, x, y);
        }
    }

    pub fn dot(&self, canvas: &mut Canvas, x: i32, y: i32, c: Color) {
        if !canvas.contains(x, y) {
            tracing::warn!(x, y, "dot off canvas, dropped");
            return;
        }
        canvas.set(x, y, c);
    }
}
