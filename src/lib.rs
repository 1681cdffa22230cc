// Library exports for statchart

pub mod data;
pub mod config;
pub mod template;
pub mod ir;
pub mod aggregate;
pub mod palette;
pub mod format;
pub mod layout;
pub mod scale;
pub mod labels;
pub mod legend;
pub mod animate;
pub mod compiler;
pub mod render;
pub mod cache;
pub mod engine;

use serde::Deserialize;

#[derive(Debug, Clone, Deserialize, Default, PartialEq, Eq)]
pub enum OutputFormat {
    #[serde(rename = "png")]
    #[default]
    Png,
    #[serde(rename = "svg")]
    Svg,
}

#[derive(Debug, Clone, Deserialize)]
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
            width: 800,
            height: 600,
            format: OutputFormat::Png,
        }
    }
}

pub use config::ChartConfiguration;
pub use data::{ColumnInfo, ColumnType, DataTable};
pub use engine::ChartEngine;
pub use ir::{ChartData, DataPoint, Dataset};
