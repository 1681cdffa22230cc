//! Declarative chart configuration.
//!
//! Owned by the calling UI layer and treated as an immutable input per render
//! pass. Deserialized from JSON; every field is optional and missing fields
//! fall back to the defaults below, so a partially built configuration is
//! always representable (completeness is checked against the template recipe,
//! see `template::ChartTemplate::is_complete`).

use serde::Deserialize;

/// Reduction applied when multiple raw rows share a grouping key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Aggregation {
    #[default]
    Sum,
    Average,
    Count,
    Min,
    Max,
    /// Keeps the first encountered raw value. Order-of-arrival dependent:
    /// input row order is not guaranteed stable across data sources, so this
    /// is a documented limitation, not "latest wins".
    None,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ColorMode {
    #[default]
    Scheme,
    Individual,
    Single,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LegendMapping {
    Categories,
    Series,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum VAnchor {
    #[default]
    Top,
    Middle,
    Bottom,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum HAnchor {
    Left,
    #[default]
    Center,
    Right,
}

/// Data-label position relative to a mark. `Inside`/`Outside` are
/// pie-specific; the rest apply to rectangular and point marks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum LabelPlacement {
    #[default]
    Top,
    Center,
    InsideTop,
    InsideBottom,
    Bottom,
    Left,
    Right,
    Inside,
    Outside,
}

/// Value-scaling transform applied before formatting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum DisplayUnit {
    #[default]
    None,
    Hundreds,
    Thousands,
    Millions,
    Billions,
}

impl DisplayUnit {
    pub fn divisor(self) -> f64 {
        match self {
            DisplayUnit::None => 1.0,
            DisplayUnit::Hundreds => 1.0e2,
            DisplayUnit::Thousands => 1.0e3,
            DisplayUnit::Millions => 1.0e6,
            DisplayUnit::Billions => 1.0e9,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            DisplayUnit::None | DisplayUnit::Hundreds => "",
            DisplayUnit::Thousands => "K",
            DisplayUnit::Millions => "M",
            DisplayUnit::Billions => "B",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum NegativeStyle {
    #[default]
    Minus,
    Parentheses,
    /// Strips the sign only; the caller applies the color.
    Red,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Default)]
#[serde(default, rename_all = "camelCase")]
pub struct NumberFormat {
    pub decimals: Option<u32>,
    pub display_unit: DisplayUnit,
    pub display_unit_label: bool,
    pub use_grouping: bool,
    pub negative_numbers: NegativeStyle,
    pub prefix: String,
    pub suffix: String,
}

/// A field mapping that is either one column name or an ordered list
/// (multi-line charts map several value columns at once).
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum FieldRef {
    One(String),
    Many(Vec<String>),
}

impl FieldRef {
    pub fn first(&self) -> Option<&str> {
        match self {
            FieldRef::One(s) => Some(s.as_str()),
            FieldRef::Many(v) => v.first().map(|s| s.as_str()),
        }
    }

    pub fn names(&self) -> Vec<&str> {
        match self {
            FieldRef::One(s) => vec![s.as_str()],
            FieldRef::Many(v) => v.iter().map(|s| s.as_str()).collect(),
        }
    }

    pub fn is_populated(&self) -> bool {
        match self {
            FieldRef::One(s) => !s.trim().is_empty(),
            FieldRef::Many(v) => v.iter().any(|s| !s.trim().is_empty()),
        }
    }
}

/// Explicit legend position override; wins over the anchor enums.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize, Default)]
#[serde(default)]
pub struct CustomPosition {
    pub x: f64,
    pub y: f64,
    pub rotation: f64,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ChartConfiguration {
    /// Selects chart type and required-field recipe, see `template`.
    pub template_id: String,
    pub title: Option<String>,

    // Field mappings
    pub x_axis_field: Option<FieldRef>,
    pub y_axis_field: Option<FieldRef>,
    pub category_field: Option<String>,
    pub value_field: Option<String>,
    pub series_field: Option<String>,

    pub aggregation: Aggregation,

    // Color configuration
    pub color_mode: ColorMode,
    pub legend_mapping: Option<LegendMapping>,
    pub color_scheme: String,
    pub custom_colors: Vec<Option<String>>,
    pub single_color: String,

    pub number_format: NumberFormat,

    // Legend
    pub show_legend: bool,
    pub legend_vertical_position: VAnchor,
    pub legend_horizontal_position: HAnchor,
    pub legend_offset_x: f64,
    pub legend_offset_y: f64,
    pub legend_custom_position: Option<CustomPosition>,

    // Data labels
    pub show_labels: bool,
    pub label_placement: LabelPlacement,
    pub label_offset_x: f64,
    pub label_offset_y: f64,
    pub label_show_category: bool,
    pub label_show_value: bool,
    pub label_show_percent: bool,

    // Axes
    pub x_axis_font_size: Option<u32>,
    pub y_axis_font_size: Option<u32>,
    pub rotate_x_labels: bool,
    pub show_grid: bool,
    pub y_min: Option<f64>,
    pub y_max: Option<f64>,

    pub padding: f64,
    pub animate: bool,
}

impl Default for ChartConfiguration {
    fn default() -> Self {
        Self {
            template_id: String::new(),
            title: None,
            x_axis_field: None,
            y_axis_field: None,
            category_field: None,
            value_field: None,
            series_field: None,
            aggregation: Aggregation::default(),
            color_mode: ColorMode::default(),
            legend_mapping: None,
            color_scheme: "default".to_string(),
            custom_colors: Vec::new(),
            single_color: "#4472C4".to_string(),
            number_format: NumberFormat::default(),
            show_legend: true,
            legend_vertical_position: VAnchor::Top,
            legend_horizontal_position: HAnchor::Center,
            legend_offset_x: 0.0,
            legend_offset_y: 0.0,
            legend_custom_position: None,
            show_labels: false,
            label_placement: LabelPlacement::Top,
            label_offset_x: 0.0,
            label_offset_y: 0.0,
            label_show_category: false,
            label_show_value: true,
            label_show_percent: false,
            x_axis_font_size: None,
            y_axis_font_size: None,
            rotate_x_labels: false,
            show_grid: true,
            y_min: None,
            y_max: None,
            padding: 8.0,
            animate: true,
        }
    }
}

impl ChartConfiguration {
    pub fn from_json(json: &str) -> anyhow::Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Number of multi-line value columns mapped (0 when y is unset).
    pub fn y_field_count(&self) -> usize {
        self.y_axis_field.as_ref().map(|f| f.names().len()).unwrap_or(0)
    }
}
