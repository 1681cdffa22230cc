//! Scale building: label/value domains + plotting-area bounds -> positional
//! mapping functions per axis.

use crate::ir::{ChartData, DataPoint};
use crate::layout::Layout;
use crate::template::ChartKind;

/// Fraction of each band left as inter-band padding.
const BAND_PADDING: f64 = 0.2;

/// Fractional pad applied to each side of a scatter domain so boundary points
/// are never clipped.
const DOMAIN_PAD: f64 = 0.10;

/// Headroom above the observed maximum for bar/line/area value domains,
/// leaving room for data labels.
const VALUE_HEADROOM: f64 = 1.10;

#[derive(Debug, Clone)]
pub struct Scale {
    pub domain: (f64, f64),
    pub range: (f64, f64),
    pub is_categorical: bool,
    pub categories: Vec<String>,
}

impl Scale {
    pub fn linear(domain: (f64, f64), range: (f64, f64)) -> Self {
        let domain = if domain.0 == domain.1 {
            (domain.0 - 1.0, domain.1 + 1.0)
        } else {
            domain
        };
        Self {
            domain,
            range,
            is_categorical: false,
            categories: Vec::new(),
        }
    }

    pub fn band(categories: Vec<String>, range: (f64, f64)) -> Self {
        let n = categories.len().max(1) as f64;
        Self {
            domain: (0.0, n),
            range,
            is_categorical: true,
            categories,
        }
    }

    /// Point mapping over ordered labels: first label at range start, last at
    /// range end.
    pub fn point(categories: Vec<String>, range: (f64, f64)) -> Self {
        let n = categories.len().max(1) as f64;
        Self {
            domain: (0.0, (n - 1.0).max(1.0)),
            range,
            is_categorical: true,
            categories,
        }
    }

    /// Linear position of a domain value within the pixel range. Ranges may
    /// be descending (y axes pass (bottom, top)), which inverts naturally.
    pub fn position(&self, v: f64) -> f64 {
        let (d0, d1) = self.domain;
        let (r0, r1) = self.range;
        if (d1 - d0).abs() < f64::EPSILON {
            return (r0 + r1) / 2.0;
        }
        r0 + (v - d0) / (d1 - d0) * (r1 - r0)
    }

    /// Pixel extent (start, end) of the i-th band, inter-band padding applied.
    pub fn band_slot(&self, i: usize) -> (f64, f64) {
        let slot_start = self.position(i as f64);
        let slot_end = self.position(i as f64 + 1.0);
        let width = slot_end - slot_start;
        let inset = width * BAND_PADDING / 2.0;
        (slot_start + inset, slot_end - inset)
    }

    pub fn band_center(&self, i: usize) -> f64 {
        self.position(i as f64 + 0.5)
    }

    /// Pixel x of the i-th point on a point scale.
    pub fn point_x(&self, i: usize) -> f64 {
        if self.categories.len() <= 1 {
            return (self.range.0 + self.range.1) / 2.0;
        }
        self.position(i as f64)
    }
}

#[derive(Debug, Clone)]
pub struct AxisScales {
    pub x: Scale,
    pub y: Scale,
    /// Draw an explicit zero-reference line when a scatter domain straddles 0.
    pub zero_x: bool,
    pub zero_y: bool,
}

/// Build axis mappings for a chart. Explicit min/max always override computed
/// domains.
pub fn build_scales(
    kind: ChartKind,
    data: &ChartData,
    layout: &Layout,
    explicit_min: Option<f64>,
    explicit_max: Option<f64>,
) -> AxisScales {
    let x_range = (layout.plot_x() as f64, layout.plot_right() as f64);
    let y_range = (layout.plot_bottom() as f64, layout.plot_y() as f64);
    let labels = data.labels.clone();

    match kind {
        ChartKind::Scatter => {
            let (xs, ys): (Vec<f64>, Vec<f64>) = data
                .datasets
                .iter()
                .flat_map(|d| d.data.iter())
                .filter_map(|p| match *p {
                    DataPoint::Point { x, y } => Some((x, y)),
                    DataPoint::Scalar(_) => None,
                })
                .unzip();

            let x_domain = padded_extent(&xs);
            let mut y_domain = padded_extent(&ys);
            if let Some(min) = explicit_min {
                y_domain.0 = min;
            }
            if let Some(max) = explicit_max {
                y_domain.1 = max;
            }

            AxisScales {
                zero_x: x_domain.0 < 0.0 && x_domain.1 > 0.0,
                zero_y: y_domain.0 < 0.0 && y_domain.1 > 0.0,
                x: Scale::linear(x_domain, x_range),
                y: Scale::linear(y_domain, y_range),
            }
        }
        _ => {
            let observed_max = if kind == ChartKind::StackedBar {
                data.max_stack()
            } else {
                data.max_value()
            };
            let observed_min = data.min_value().min(0.0);

            let min = explicit_min.unwrap_or(observed_min);
            let max = explicit_max.unwrap_or_else(|| {
                if observed_max > 0.0 {
                    observed_max * VALUE_HEADROOM
                } else {
                    1.0
                }
            });

            let x = if kind.is_bar_family() || kind.is_radial() {
                Scale::band(labels, x_range)
            } else {
                Scale::point(labels, x_range)
            };

            AxisScales {
                x,
                y: Scale::linear((min, max), y_range),
                zero_x: false,
                zero_y: false,
            }
        }
    }
}

/// Extent of values with a 10% pad on each side.
fn padded_extent(values: &[f64]) -> (f64, f64) {
    let min = values.iter().cloned().fold(f64::INFINITY, f64::min);
    let max = values.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
    if !min.is_finite() || !max.is_finite() {
        return (0.0, 1.0);
    }
    let span = max - min;
    if span == 0.0 {
        (min - 1.0, max + 1.0)
    } else {
        (min - span * DOMAIN_PAD, max + span * DOMAIN_PAD)
    }
}

/// Round tick positions covering the domain, stepping by 1/2/5 x 10^k.
pub fn nice_ticks(min: f64, max: f64, target: usize) -> Vec<f64> {
    if !(min.is_finite() && max.is_finite()) || max <= min || target == 0 {
        return Vec::new();
    }
    let raw_step = (max - min) / target as f64;
    let mag = 10f64.powf(raw_step.log10().floor());
    let norm = raw_step / mag;
    let step = if norm <= 1.0 {
        mag
    } else if norm <= 2.0 {
        2.0 * mag
    } else if norm <= 5.0 {
        5.0 * mag
    } else {
        10.0 * mag
    };

    let mut ticks = Vec::new();
    let mut t = (min / step).ceil() * step;
    while t <= max + step * 1e-9 {
        // Snap tiny float noise to zero
        ticks.push(if t.abs() < step * 1e-9 { 0.0 } else { t });
        t += step;
    }
    ticks
}
