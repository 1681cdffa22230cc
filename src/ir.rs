//! Intermediate representation shared across the pipeline.
//!
//! `ChartData` is the normalized labels + datasets pair produced by the
//! aggregation engine and consumed by every chart compiler. `SceneGraph` is a
//! list of primitive drawing commands in pixel coordinates; the backend just
//! executes these blindly.

use plotters::style::RGBColor;

// =============================================================================
// Chart data
// =============================================================================

/// One entry in a dataset: either a plain value at a label position, or an
/// (x, y) pair for scatter charts. Renderers branch on the variant tag once
/// at the top of each drawing routine.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DataPoint {
    Scalar(f64),
    Point { x: f64, y: f64 },
}

impl DataPoint {
    /// Scalar value, or the y component for point data.
    pub fn value(&self) -> f64 {
        match *self {
            DataPoint::Scalar(v) => v,
            DataPoint::Point { y, .. } => y,
        }
    }
}

/// One named series within a chart.
#[derive(Debug, Clone, PartialEq)]
pub struct Dataset {
    pub label: String,
    pub data: Vec<DataPoint>,
}

impl Dataset {
    pub fn scalars(label: impl Into<String>, values: Vec<f64>) -> Self {
        Self {
            label: label.into(),
            data: values.into_iter().map(DataPoint::Scalar).collect(),
        }
    }

    pub fn values(&self) -> Vec<f64> {
        self.data.iter().map(|p| p.value()).collect()
    }
}

/// Normalized chart-ready data. Invariant: every dataset's data sequence has
/// the same length as `labels` (scatter excepted, where labels are positional
/// row indices). Rebuilt from scratch on every aggregation; never mutated.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ChartData {
    pub labels: Vec<String>,
    pub datasets: Vec<Dataset>,
}

impl ChartData {
    pub fn new(labels: Vec<String>, datasets: Vec<Dataset>) -> Self {
        Self { labels, datasets }
    }

    pub fn is_empty(&self) -> bool {
        self.datasets.is_empty() || self.datasets.iter().all(|d| d.data.is_empty())
    }

    /// True when every dataset has one entry per label.
    pub fn is_rectangular(&self) -> bool {
        self.datasets.iter().all(|d| d.data.len() == self.labels.len())
    }

    /// Largest single value across all datasets (0.0 when empty).
    pub fn max_value(&self) -> f64 {
        self.datasets
            .iter()
            .flat_map(|d| d.data.iter())
            .map(|p| p.value())
            .fold(0.0, f64::max)
    }

    /// Smallest single value across all datasets (0.0 when empty).
    pub fn min_value(&self) -> f64 {
        self.datasets
            .iter()
            .flat_map(|d| d.data.iter())
            .map(|p| p.value())
            .fold(0.0, f64::min)
    }

    /// Tallest cumulative stack across categories (for stacked-bar domains).
    pub fn max_stack(&self) -> f64 {
        let mut max = 0.0f64;
        for i in 0..self.labels.len() {
            let total: f64 = self
                .datasets
                .iter()
                .filter_map(|d| d.data.get(i))
                .map(|p| p.value())
                .sum();
            max = max.max(total);
        }
        max
    }
}

// =============================================================================
// Scene graph
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HAlign {
    Left,
    Center,
    Right,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VAlign {
    Top,
    Middle,
    Bottom,
}

/// Primitive drawing commands. Coordinates are pixels; `delay_ms` is the
/// enter-animation stagger for mark commands (0 for chrome).
#[derive(Debug, Clone)]
pub enum DrawCommand {
    Rect {
        tl: (i32, i32),
        br: (i32, i32),
        color: RGBColor,
        alpha: f64,
        filled: bool,
        delay_ms: u32,
    },
    Polyline {
        points: Vec<(i32, i32)>,
        color: RGBColor,
        width: u32,
        delay_ms: u32,
    },
    Polygon {
        points: Vec<(i32, i32)>,
        color: RGBColor,
        alpha: f64,
        delay_ms: u32,
    },
    Circle {
        center: (i32, i32),
        radius: i32,
        color: RGBColor,
        filled: bool,
        delay_ms: u32,
    },
    /// Pie slice, approximated as a fan polygon at render time. Angles in
    /// radians, measured clockwise from 12 o'clock.
    Wedge {
        center: (i32, i32),
        radius: i32,
        start_angle: f64,
        end_angle: f64,
        color: RGBColor,
        delay_ms: u32,
    },
    Text {
        content: String,
        pos: (i32, i32),
        font_px: u32,
        color: RGBColor,
        h_align: HAlign,
        v_align: VAlign,
        rotated: bool,
    },
}

/// Hover-sensitive region attached to one mark.
#[derive(Debug, Clone)]
pub enum HitShape {
    Rect { tl: (i32, i32), br: (i32, i32) },
    Circle { center: (i32, i32), radius: i32 },
    Wedge {
        center: (i32, i32),
        radius: i32,
        start_angle: f64,
        end_angle: f64,
    },
}

impl HitShape {
    pub fn contains(&self, x: i32, y: i32) -> bool {
        match *self {
            HitShape::Rect { tl, br } => x >= tl.0 && x <= br.0 && y >= tl.1 && y <= br.1,
            HitShape::Circle { center, radius } => {
                let dx = (x - center.0) as f64;
                let dy = (y - center.1) as f64;
                dx * dx + dy * dy <= (radius as f64) * (radius as f64)
            }
            HitShape::Wedge {
                center,
                radius,
                start_angle,
                end_angle,
            } => {
                let dx = (x - center.0) as f64;
                let dy = (y - center.1) as f64;
                if dx * dx + dy * dy > (radius as f64) * (radius as f64) {
                    return false;
                }
                // Clockwise angle from 12 o'clock
                let mut a = dx.atan2(-dy);
                if a < 0.0 {
                    a += std::f64::consts::TAU;
                }
                a >= start_angle && a <= end_angle
            }
        }
    }
}

/// Tooltip payload shown on hover: label + formatted value, plus the slice
/// percentage for pie charts.
#[derive(Debug, Clone, PartialEq)]
pub struct Tooltip {
    pub label: String,
    pub value: String,
    pub percent: Option<String>,
}

#[derive(Debug, Clone)]
pub struct HitRegion {
    pub shape: HitShape,
    pub tooltip: Tooltip,
    pub dataset: usize,
    pub index: usize,
}

/// Scale factor applied to a hovered mark by interactive frontends.
pub const HOVER_EMPHASIS: f64 = 1.08;

#[derive(Debug, Clone)]
pub struct SceneGraph {
    pub width: u32,
    pub height: u32,
    pub background: RGBColor,
    pub commands: Vec<DrawCommand>,
    pub hits: Vec<HitRegion>,
}

impl SceneGraph {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            background: RGBColor(255, 255, 255),
            commands: Vec::new(),
            hits: Vec::new(),
        }
    }

    /// Topmost hit region under the cursor, if any. Later marks win, matching
    /// draw order.
    pub fn hit_test(&self, x: i32, y: i32) -> Option<&HitRegion> {
        self.hits.iter().rev().find(|h| h.shape.contains(x, y))
    }
}
