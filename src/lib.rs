// Library exports for co2dash

pub mod chart;
pub mod data;
pub mod dispatch;
pub mod error;
pub mod filter;
pub mod graph;
pub mod loader;
pub mod palette;
pub mod runtime;
pub mod selection;
pub mod stats;

pub use error::{DashboardError, DashboardResult, ValidationError};
pub use runtime::{Dashboard, Outcome, SidebarState, View};
pub use selection::{Attribute, AttributeChoice, ChartType, Insight, ModelFilter, Selection, Variant};

use serde::Deserialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
pub enum OutputFormat {
    #[serde(rename = "png")]
    #[default]
    Png,
    #[serde(rename = "svg")]
    Svg,
    #[serde(rename = "json")]
    Json,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct RenderOptions {
    #[serde(default = "default_width")]
    pub width: u32,
    #[serde(default = "default_height")]
    pub height: u32,
    #[serde(default, rename = "type")]
    pub format: OutputFormat,
}

fn default_width() -> u32 { 800 }
fn default_height() -> u32 { 600 }

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            width: default_width(),
            height: default_height(),
            format: OutputFormat::Png,
        }
    }
}
