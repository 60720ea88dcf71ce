//! The per-column temperature silhouette.

use crate::mapper::Layout;

/// Cubic Bezier through four control values at `t`.
pub fn bezier(t: f64, d0: f64, d1: f64, d2: f64, d3: f64) -> f64 {
    let u = 1.0 - t;
    u * (u * (u * d0 + t * d1) + t * (u * d1 + t * d2))
        + t * (u * (u * d1 + t * d2) + t * (u * d2 + t * d3))
}

/// Eased row at column `x` travelling from `(xa, ya)` to `(xb, yb)`.
///
/// Control values are `(ya, ya, yb, yb)`, so the curve never leaves
/// `[min(ya, yb), max(ya, yb)]`.
pub fn ease(x: i32, xa: i32, ya: i32, xb: i32, yb: i32) -> i32 {
    if xb == xa {
        return yb;
    }
    let t = (x - xa) as f64 / (xb - xa) as f64;
    bezier(t, ya as f64, ya as f64, yb as f64, yb as f64) as i32
}

/// One pixel row per canvas column plus a lookahead margin.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TemperatureLine {
    rows: Vec<i32>,
}

impl TemperatureLine {
    pub fn new(len: usize) -> Self {
        Self { rows: vec![0; len] }
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn get(&self, x: i32) -> Option<i32> {
        usize::try_from(x).ok().and_then(|x| self.rows.get(x).copied())
    }

    pub fn rows(&self) -> &[i32] {
        &self.rows
    }

    fn set(&mut self, x: i32, y: i32) {
        if let Some(r) = usize::try_from(x).ok().and_then(|x| self.rows.get_mut(x)) {
            *r = y;
        }
    }

    fn fill(&mut self, from: i32, to: i32, y: i32) {
        for x in from..to {
            self.set(x, y);
        }
    }
}

/// Fills a temperature line from pixel rows sampled once per bucket.
///
/// `current` is held flat across the left margin. Each `Some(row)` sample
/// eases in from the previous row and then holds a plateau; a `None`
/// sample extends the previous plateau over its span.
pub fn interpolate(layout: &Layout, current: i32, samples: &[Option<i32>]) -> TemperatureLine {
    let mut line = TemperatureLine::new(layout.line_len());
    line.fill(0, layout.x_start, current);

    let mut x = layout.x_start;
    let mut old = current;
    let mut n = layout.ease();
    for sample in samples {
        match sample {
            Some(new) => {
                for i in 0..n {
                    line.set(x + i, ease(x + i, x, old, x + n, *new));
                }
                line.fill(x + n, x + n + layout.x_flat, *new);
                old = *new;
            }
            None => {
                tracing::debug!(x, "no sample, extending plateau");
                line.fill(x, x + n + layout.x_flat, old);
            }
        }
        x += n + layout.x_flat;
        n = layout.x_step - layout.x_flat;
    }
    line
}
