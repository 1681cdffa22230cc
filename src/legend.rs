//! Legend layout: text-width measurement, row wrapping for horizontal
//! legends, column stacking for vertical ones, and anchor resolution.

use plotters::style::RGBColor;

use crate::config::{ChartConfiguration, HAnchor, VAnchor};
use crate::ir::ChartData;
use crate::palette::colors_per_category;

/// Square swatch edge length, shared with the scene compiler.
pub const SWATCH_SIZE: i32 = 10;
const SWATCH_TEXT_GAP: i32 = 6;
const TRAILING_GAP: i32 = 12;
const ROW_GAP: i32 = 4;
const EDGE_PAD: i32 = 6;

/// Minimum wrap bound regardless of canvas width.
const MIN_ROW_WIDTH: i32 = 160;

/// Off-screen measurement probe. Created once per layout pass and discarded
/// after; in this headless engine the measurement is the character-count
/// estimate itself (plotters has no built-in text measuring).
pub struct TextProbe {
    font_px: u32,
}

impl TextProbe {
    pub fn new(font_px: u32) -> Self {
        Self { font_px }
    }

    pub fn width(&self, text: &str) -> i32 {
        ((text.chars().count() as f32) * (self.font_px as f32) * 0.60).ceil() as i32
    }

    pub fn line_height(&self) -> i32 {
        self.font_px as i32 + 4
    }
}

/// One positioned legend entry: color swatch plus label text.
#[derive(Debug, Clone)]
pub struct LegendEntry {
    pub label: String,
    pub color: RGBColor,
    pub swatch: (i32, i32),
    pub text_pos: (i32, i32),
    pub rotation: f64,
}

/// Legend item set: category labels or dataset labels, chosen by the legend
/// mapping (defaulting to the color resolver's per-category heuristic).
pub fn legend_items(config: &ChartConfiguration, data: &ChartData) -> Vec<String> {
    if colors_per_category(config, data) {
        data.labels.clone()
    } else {
        data.datasets.iter().map(|d| d.label.clone()).collect()
    }
}

/// Position legend entries on the canvas. Top/bottom + center anchoring wraps
/// entries into rows bounded by the max row width; every other anchor
/// combination stacks entries vertically, one row per item.
pub fn layout_legend(
    items: &[String],
    colors: &[RGBColor],
    config: &ChartConfiguration,
    width: u32,
    height: u32,
    font_px: u32,
) -> Vec<LegendEntry> {
    if items.is_empty() {
        return Vec::new();
    }

    let probe = TextProbe::new(font_px);
    let color_at = |i: usize| {
        colors
            .get(i % colors.len().max(1))
            .copied()
            .unwrap_or(RGBColor(68, 114, 196))
    };

    let dx = config.legend_offset_x.round() as i32;
    let dy = config.legend_offset_y.round() as i32;

    if let Some(custom) = config.legend_custom_position {
        // Explicit {x, y, rotation} override wins over the anchor enums.
        let ox = custom.x.round() as i32 + dx;
        let oy = custom.y.round() as i32 + dy;
        return stack_entries(items, &color_at, &probe, ox, oy, custom.rotation);
    }

    let wraps = matches!(
        config.legend_vertical_position,
        VAnchor::Top | VAnchor::Bottom
    ) && config.legend_horizontal_position == HAnchor::Center;

    if wraps {
        wrap_entries(items, &color_at, config, &probe, width, height, dx, dy)
    } else {
        let line_h = probe.line_height();
        let total_h = items.len() as i32 * (line_h + ROW_GAP) - ROW_GAP;
        let max_w = items
            .iter()
            .map(|l| block_width(&probe, l))
            .max()
            .unwrap_or(0);

        let ox = match config.legend_horizontal_position {
            HAnchor::Left => EDGE_PAD,
            HAnchor::Center => (width as i32 - max_w) / 2,
            HAnchor::Right => width as i32 - max_w - EDGE_PAD,
        } + dx;
        let oy = match config.legend_vertical_position {
            VAnchor::Top => EDGE_PAD,
            VAnchor::Middle => (height as i32 - total_h) / 2,
            VAnchor::Bottom => height as i32 - total_h - EDGE_PAD,
        } + dy;

        stack_entries(items, &color_at, &probe, ox, oy, 0.0)
    }
}

/// Max row width for wrapping legends: derived from canvas width, floor 160px.
pub fn max_row_width(canvas_width: u32) -> i32 {
    ((canvas_width as f64 * 0.8) as i32).max(MIN_ROW_WIDTH)
}

fn block_width(probe: &TextProbe, label: &str) -> i32 {
    SWATCH_SIZE + SWATCH_TEXT_GAP + probe.width(label) + TRAILING_GAP
}

fn stack_entries(
    items: &[String],
    color_at: &dyn Fn(usize) -> RGBColor,
    probe: &TextProbe,
    ox: i32,
    oy: i32,
    rotation: f64,
) -> Vec<LegendEntry> {
    let line_h = probe.line_height();
    items
        .iter()
        .enumerate()
        .map(|(i, label)| {
            let y = oy + i as i32 * (line_h + ROW_GAP);
            LegendEntry {
                label: label.clone(),
                color: color_at(i),
                swatch: (ox, y),
                text_pos: (ox + SWATCH_SIZE + SWATCH_TEXT_GAP, y),
                rotation,
            }
        })
        .collect()
}

#[allow(clippy::too_many_arguments)]
fn wrap_entries(
    items: &[String],
    color_at: &dyn Fn(usize) -> RGBColor,
    config: &ChartConfiguration,
    probe: &TextProbe,
    width: u32,
    height: u32,
    dx: i32,
    dy: i32,
) -> Vec<LegendEntry> {
    let bound = max_row_width(width);
    let line_h = probe.line_height();

    // Greedy pack into rows no wider than the bound (a row always takes at
    // least one entry, so a single oversized label cannot loop forever).
    let mut rows: Vec<Vec<usize>> = Vec::new();
    let mut current: Vec<usize> = Vec::new();
    let mut x = 0;
    for (i, label) in items.iter().enumerate() {
        let w = block_width(probe, label);
        if x + w > bound && !current.is_empty() {
            rows.push(std::mem::take(&mut current));
            x = 0;
        }
        current.push(i);
        x += w;
    }
    if !current.is_empty() {
        rows.push(current);
    }

    let total_h = rows.len() as i32 * (line_h + ROW_GAP) - ROW_GAP;
    let start_y = match config.legend_vertical_position {
        VAnchor::Bottom => height as i32 - total_h - EDGE_PAD,
        _ => EDGE_PAD,
    } + dy;

    let mut entries = Vec::with_capacity(items.len());
    for (row_idx, row) in rows.iter().enumerate() {
        let row_w: i32 = row.iter().map(|&i| block_width(probe, &items[i])).sum();
        // Each row is centered using its own total width
        let mut x = (width as i32 - row_w) / 2 + dx;
        let y = start_y + row_idx as i32 * (line_h + ROW_GAP);
        for &i in row {
            entries.push(LegendEntry {
                label: items[i].clone(),
                color: color_at(i),
                swatch: (x, y),
                text_pos: (x + SWATCH_SIZE + SWATCH_TEXT_GAP, y),
                rotation: 0.0,
            });
            x += block_width(probe, &items[i]);
        }
    }
    entries
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::CustomPosition;
    use crate::ir::Dataset;

    fn colors(n: usize) -> Vec<RGBColor> {
        (0..n).map(|i| RGBColor(i as u8, 0, 0)).collect()
    }

    fn wrap_config() -> ChartConfiguration {
        ChartConfiguration {
            legend_vertical_position: VAnchor::Top,
            legend_horizontal_position: HAnchor::Center,
            ..Default::default()
        }
    }

    #[test]
    fn test_twenty_short_labels_wrap_within_bound() {
        let items: Vec<String> = (0..20).map(|i| format!("c{:02}", i)).collect();
        let entries = layout_legend(&items, &colors(20), &wrap_config(), 400, 300, 12);
        assert_eq!(entries.len(), 20);

        let bound = max_row_width(400);
        // Group entries by row (same y), check each row's span fits the bound
        let mut rows: std::collections::HashMap<i32, (i32, i32)> = std::collections::HashMap::new();
        let probe = TextProbe::new(12);
        for e in &entries {
            let start = e.swatch.0;
            let end = e.text_pos.0 + probe.width(&e.label) + TRAILING_GAP;
            let row = rows.entry(e.swatch.1).or_insert((start, end));
            row.0 = row.0.min(start);
            row.1 = row.1.max(end);
        }
        assert!(rows.len() > 1, "20 labels should wrap into multiple rows");
        for (_, (start, end)) in rows {
            assert!(end - start <= bound, "row width {} exceeds bound {}", end - start, bound);
        }
    }

    #[test]
    fn test_row_width_floor() {
        assert_eq!(max_row_width(100), 160);
        assert_eq!(max_row_width(1000), 800);
    }

    #[test]
    fn test_vertical_stack_for_side_anchor() {
        let items: Vec<String> = vec!["alpha".into(), "beta".into(), "gamma".into()];
        let config = ChartConfiguration {
            legend_vertical_position: VAnchor::Middle,
            legend_horizontal_position: HAnchor::Right,
            ..Default::default()
        };
        let entries = layout_legend(&items, &colors(3), &config, 800, 600, 12);
        let xs: Vec<i32> = entries.iter().map(|e| e.swatch.0).collect();
        assert!(xs.windows(2).all(|w| w[0] == w[1]), "one column");
        let ys: Vec<i32> = entries.iter().map(|e| e.swatch.1).collect();
        assert!(ys.windows(2).all(|w| w[1] > w[0]), "one row per item");
    }

    #[test]
    fn test_custom_position_override() {
        let config = ChartConfiguration {
            legend_custom_position: Some(CustomPosition {
                x: 50.0,
                y: 70.0,
                rotation: 90.0,
            }),
            legend_offset_x: 5.0,
            ..Default::default()
        };
        let items = vec!["a".to_string()];
        let entries = layout_legend(&items, &colors(1), &config, 800, 600, 12);
        assert_eq!(entries[0].swatch, (55, 70));
        assert_eq!(entries[0].rotation, 90.0);
    }

    #[test]
    fn test_offset_shifts_entries() {
        let items = vec!["a".to_string(), "b".to_string()];
        let base = layout_legend(&items, &colors(2), &wrap_config(), 800, 600, 12);
        let mut config = wrap_config();
        config.legend_offset_y = 25.0;
        let moved = layout_legend(&items, &colors(2), &config, 800, 600, 12);
        assert_eq!(moved[0].swatch.1, base[0].swatch.1 + 25);
    }

    #[test]
    fn test_items_follow_mapping() {
        use crate::config::LegendMapping;
        let data = ChartData::new(
            vec!["A".into(), "B".into()],
            vec![
                Dataset::scalars("s1", vec![1.0, 2.0]),
                Dataset::scalars("s2", vec![3.0, 4.0]),
            ],
        );
        let by_cat = ChartConfiguration {
            legend_mapping: Some(LegendMapping::Categories),
            ..Default::default()
        };
        assert_eq!(legend_items(&by_cat, &data), vec!["A", "B"]);
        assert_eq!(
            legend_items(&ChartConfiguration::default(), &data),
            vec!["s1", "s2"]
        );
    }
}
