// Chart request handed to a renderer: fully resolved, no data lookups left

use serde::Serialize;

use crate::palette::{ColorPalette, ColorScale};
use crate::selection::{AttributeChoice, ChartType};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartSpec {
    pub title: String,
    pub chart_type: ChartType,
    pub x_field: AttributeChoice,
    pub y_field: String,
    pub x_label: String,
    pub y_label: String,
    pub x_axis: XAxis,
    pub color: ColorEncoding,
    /// One entry per legend key, in legend order
    pub groups: Vec<GroupData>,
}

impl ChartSpec {
    /// Data-space extent of everything drawn, as ((x_min, x_max), (y_min, y_max))
    pub fn extent(&self) -> Option<((f64, f64), (f64, f64))> {
        let mut xs = Vec::new();
        let mut ys = Vec::new();
        for group in &self.groups {
            group.geometry.extend_extent(&mut xs, &mut ys);
        }
        if xs.is_empty() || ys.is_empty() {
            return None;
        }
        Some((min_max(&xs), min_max(&ys)))
    }
}

fn min_max(values: &[f64]) -> (f64, f64) {
    let min = values.iter().cloned().fold(f64::INFINITY, f64::min);
    let max = values.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
    (min, max)
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum XAxis {
    /// Category `i` is drawn centered on x = i
    Categorical { categories: Vec<String> },
    Continuous,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ColorEncoding {
    /// Column the color follows; `None` means a single fill from the palette
    pub by: Option<String>,
    pub palette: PaletteKind,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PaletteKind {
    Plotly,
    Set2,
    Viridis,
}

impl PaletteKind {
    /// Resolve legend keys to concrete colors
    pub fn assign(self, keys: &[String]) -> std::collections::HashMap<String, String> {
        match self {
            PaletteKind::Plotly => ColorPalette::plotly().assign_colors(keys),
            PaletteKind::Set2 => ColorPalette::set2().assign_colors(keys),
            PaletteKind::Viridis => ColorScale::viridis().assign_colors(keys),
        }
    }
}

/// The atomic unit of rendering: one legend key with one color
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GroupData {
    pub key: String,
    pub color: String,
    pub geometry: Geometry,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BoxStats {
    pub lower_whisker: f64,
    pub q1: f64,
    pub median: f64,
    pub q3: f64,
    pub upper_whisker: f64,
    pub outliers: Vec<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Geometry {
    Bar {
        x: f64,
        height: f64,
    },
    Bins {
        /// `counts.len() + 1` edges
        edges: Vec<f64>,
        counts: Vec<usize>,
    },
    Points {
        x: Vec<f64>,
        y: Vec<f64>,
    },
    Box {
        x: f64,
        stats: BoxStats,
    },
    Violin {
        x: f64,
        /// Grid of y positions the density was evaluated at
        density_y: Vec<f64>,
        /// Density normalized to [0, 1]
        density: Vec<f64>,
        inner_box: BoxStats,
        points: Vec<f64>,
    },
}

impl Geometry {
    fn extend_extent(&self, xs: &mut Vec<f64>, ys: &mut Vec<f64>) {
        match self {
            Geometry::Bar { x, height } => {
                xs.push(*x);
                ys.extend([0.0, *height]);
            }
            Geometry::Bins { edges, counts } => {
                xs.extend(edges.first());
                xs.extend(edges.last());
                ys.push(0.0);
                ys.extend(counts.iter().map(|&c| c as f64));
            }
            Geometry::Points { x, y } => {
                xs.extend(x);
                ys.extend(y);
            }
            Geometry::Box { x, stats } => {
                xs.push(*x);
                ys.extend([stats.lower_whisker, stats.upper_whisker]);
                ys.extend(&stats.outliers);
            }
            Geometry::Violin {
                x,
                density_y,
                points,
                ..
            } => {
                xs.push(*x);
                ys.extend(density_y);
                ys.extend(points);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extent_covers_all_groups() {
        let spec = ChartSpec {
            title: "t".to_string(),
            chart_type: ChartType::Bar,
            x_field: AttributeChoice::NotApplicable,
            y_field: "y".to_string(),
            x_label: "x".to_string(),
            y_label: "y".to_string(),
            x_axis: XAxis::Categorical {
                categories: vec!["a".to_string(), "b".to_string()],
            },
            color: ColorEncoding {
                by: None,
                palette: PaletteKind::Set2,
            },
            groups: vec![
                GroupData {
                    key: "a".to_string(),
                    color: "#000000".to_string(),
                    geometry: Geometry::Bar { x: 0.0, height: 5.0 },
                },
                GroupData {
                    key: "b".to_string(),
                    color: "#000000".to_string(),
                    geometry: Geometry::Bar { x: 1.0, height: 12.0 },
                },
            ],
        };
        assert_eq!(spec.extent(), Some(((0.0, 1.0), (0.0, 12.0))));
    }

    #[test]
    fn test_geometry_serializes_with_kind_tag() {
        let g = Geometry::Bar { x: 1.0, height: 2.0 };
        let json = serde_json::to_value(&g).unwrap();
        assert_eq!(json["kind"], "bar");
        assert_eq!(json["height"], 2.0);
    }
}
