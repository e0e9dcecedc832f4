use std::collections::HashMap;

/// A cycling list of discrete colors, stored as `#rrggbb` strings
#[derive(Debug, Clone, PartialEq)]
pub struct ColorPalette {
    colors: Vec<&'static str>,
}

impl ColorPalette {
    /// Default qualitative sequence for categorical color mappings
    pub fn plotly() -> Self {
        Self {
            colors: vec![
                "#636efa", "#ef553b", "#00cc96", "#ab63fa", "#ffa15a", "#19d3f3", "#ff6692",
                "#b6e880", "#ff97ff", "#fecb52",
            ],
        }
    }

    pub fn set2() -> Self {
        Self {
            colors: vec![
                "#66c2a5", "#fc8d62", "#8da0cb", "#e78ac3", "#a6d854", "#ffd92f", "#e5c494",
                "#b3b3b3",
            ],
        }
    }

    pub fn color(&self, index: usize) -> String {
        self.colors[index % self.colors.len()].to_string()
    }

    /// Assign colors to keys in the given order, wrapping around
    pub fn assign_colors(&self, keys: &[String]) -> HashMap<String, String> {
        keys.iter()
            .enumerate()
            .map(|(i, k)| (k.clone(), self.color(i)))
            .collect()
    }
}

/// Piecewise-linear continuous color scale
#[derive(Debug, Clone, PartialEq)]
pub struct ColorScale {
    stops: Vec<(u8, u8, u8)>,
}

impl ColorScale {
    pub fn viridis() -> Self {
        Self {
            stops: vec![
                (0x44, 0x01, 0x54),
                (0x48, 0x28, 0x78),
                (0x3e, 0x49, 0x89),
                (0x31, 0x68, 0x8e),
                (0x26, 0x82, 0x8e),
                (0x1f, 0x9e, 0x89),
                (0x35, 0xb7, 0x79),
                (0x6e, 0xce, 0x58),
                (0xb5, 0xde, 0x2b),
                (0xfd, 0xe7, 0x25),
            ],
        }
    }

    /// Color at `t` in [0, 1]; values outside are clamped
    pub fn at(&self, t: f64) -> String {
        let t = if t.is_nan() { 0.0 } else { t.clamp(0.0, 1.0) };
        let segments = (self.stops.len() - 1) as f64;
        let pos = t * segments;
        let lo = pos.floor() as usize;
        let hi = (lo + 1).min(self.stops.len() - 1);
        let w = pos - lo as f64;

        let lerp = |a: u8, b: u8| (a as f64 + (b as f64 - a as f64) * w).round() as u8;
        let (r0, g0, b0) = self.stops[lo];
        let (r1, g1, b1) = self.stops[hi];
        to_hex(lerp(r0, r1), lerp(g0, g1), lerp(b0, b1))
    }

    /// Map numeric keys onto the scale by their position in [min, max]
    pub fn assign_colors(&self, keys: &[String]) -> HashMap<String, String> {
        let values: Vec<Option<f64>> = keys.iter().map(|k| k.parse::<f64>().ok()).collect();
        let min = values.iter().flatten().fold(f64::INFINITY, |a, &b| a.min(b));
        let max = values.iter().flatten().fold(f64::NEG_INFINITY, |a, &b| a.max(b));
        let span = max - min;

        keys.iter()
            .zip(values)
            .map(|(k, v)| {
                let t = match v {
                    Some(v) if span > 0.0 => (v - min) / span,
                    _ => 0.0,
                };
                (k.clone(), self.at(t))
            })
            .collect()
    }
}

fn to_hex(r: u8, g: u8, b: u8) -> String {
    format!("#{:02x}{:02x}{:02x}", r, g, b)
}

/// Parse `#rrggbb` into its components
pub fn parse_hex(s: &str) -> Option<(u8, u8, u8)> {
    let hex = s.strip_prefix('#')?;
    if hex.len() != 6 {
        return None;
    }
    let r = u8::from_str_radix(&hex[0..2], 16).ok()?;
    let g = u8::from_str_radix(&hex[2..4], 16).ok()?;
    let b = u8::from_str_radix(&hex[4..6], 16).ok()?;
    Some((r, g, b))
}
