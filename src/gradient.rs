use std::fmt;

use crate::state_store::clamp_percent;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub fn hex(self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }

    /// Channels as 0.0..=1.0 for cairo.
    pub fn fractions(self) -> (f64, f64, f64) {
        (
            f64::from(self.r) / 255.0,
            f64::from(self.g) / 255.0,
            f64::from(self.b) / 255.0,
        )
    }
}

impl fmt::Display for Rgb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.hex())
    }
}

/// Green below 50%, through yellow and orange, to red at 100%.
pub fn gradient_color(pct: i32) -> Rgb {
    let pct = f64::from(clamp_percent(i64::from(pct)));
    let (r, g, b) = if pct < 50.0 {
        let ratio = pct / 50.0;
        (40.0 + ratio * 215.0, 200.0, 80.0)
    } else if pct < 80.0 {
        let ratio = (pct - 50.0) / 30.0;
        (255.0, 200.0 - ratio * 130.0, 80.0 - ratio * 50.0)
    } else {
        let ratio = (pct - 80.0) / 20.0;
        (255.0, 70.0 - ratio * 50.0, 30.0 + ratio * 30.0)
    };
    Rgb {
        r: channel(r),
        g: channel(g),
        b: channel(b),
    }
}

fn channel(value: f64) -> u8 {
    value.trunc().clamp(0.0, 255.0) as u8
}
