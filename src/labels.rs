//! Data-label placement: per-mark position rules, the pie outside-label
//! de-overlap pass, and multi-part label stacking.

use crate::config::{ChartConfiguration, LabelPlacement};
use crate::ir::{HAlign, VAlign};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlacedLabel {
    pub pos: (i32, i32),
    pub h_align: HAlign,
    pub v_align: VAlign,
}

fn offset(mut label: PlacedLabel, dx: f64, dy: f64) -> PlacedLabel {
    // The user's numeric offset applies unconditionally, after placement.
    label.pos.0 += dx.round() as i32;
    label.pos.1 += dy.round() as i32;
    label
}

/// Anchor + alignment for a rectangular mark (bars, stacked segments).
pub fn place_for_rect(
    placement: LabelPlacement,
    tl: (i32, i32),
    br: (i32, i32),
    offset_x: f64,
    offset_y: f64,
) -> PlacedLabel {
    let cx = (tl.0 + br.0) / 2;
    let cy = (tl.1 + br.1) / 2;
    let gap = 4;

    let (pos, h_align, v_align) = match placement {
        LabelPlacement::Top => ((cx, tl.1 - gap), HAlign::Center, VAlign::Bottom),
        LabelPlacement::Center | LabelPlacement::Inside => {
            ((cx, cy), HAlign::Center, VAlign::Middle)
        }
        LabelPlacement::InsideTop => ((cx, tl.1 + gap), HAlign::Center, VAlign::Top),
        LabelPlacement::InsideBottom => ((cx, br.1 - gap), HAlign::Center, VAlign::Bottom),
        LabelPlacement::Bottom | LabelPlacement::Outside => {
            ((cx, br.1 + gap), HAlign::Center, VAlign::Top)
        }
        LabelPlacement::Left => ((tl.0 - gap, cy), HAlign::Right, VAlign::Middle),
        LabelPlacement::Right => ((br.0 + gap, cy), HAlign::Left, VAlign::Middle),
    };

    offset(
        PlacedLabel { pos, h_align, v_align },
        offset_x,
        offset_y,
    )
}

/// Anchor + alignment for a point mark (line vertices, scatter points).
pub fn place_for_point(
    placement: LabelPlacement,
    center: (i32, i32),
    radius: i32,
    offset_x: f64,
    offset_y: f64,
) -> PlacedLabel {
    let gap = radius + 4;
    let (pos, h_align, v_align) = match placement {
        LabelPlacement::Bottom | LabelPlacement::Outside => {
            ((center.0, center.1 + gap), HAlign::Center, VAlign::Top)
        }
        LabelPlacement::Left => ((center.0 - gap, center.1), HAlign::Right, VAlign::Middle),
        LabelPlacement::Right => ((center.0 + gap, center.1), HAlign::Left, VAlign::Middle),
        LabelPlacement::Center | LabelPlacement::Inside => {
            (center, HAlign::Center, VAlign::Middle)
        }
        // Top and the inside variants all sit above a point mark
        _ => ((center.0, center.1 - gap), HAlign::Center, VAlign::Bottom),
    };

    offset(
        PlacedLabel { pos, h_align, v_align },
        offset_x,
        offset_y,
    )
}

/// Anchor for a pie slice label. `mid_angle` is radians clockwise from 12
/// o'clock. `Inside` anchors at 60% of the radius; `Outside` at 115% with
/// horizontal alignment following the slice's side.
pub fn place_for_pie(
    placement: LabelPlacement,
    center: (i32, i32),
    radius: i32,
    mid_angle: f64,
    offset_x: f64,
    offset_y: f64,
) -> PlacedLabel {
    let at = |r: f64| {
        (
            center.0 + (r * mid_angle.sin()).round() as i32,
            center.1 - (r * mid_angle.cos()).round() as i32,
        )
    };

    let (pos, h_align) = match placement {
        LabelPlacement::Outside => {
            let pos = at(radius as f64 * 1.15);
            let h_align = if mid_angle.sin() >= 0.0 {
                HAlign::Left
            } else {
                HAlign::Right
            };
            (pos, h_align)
        }
        // Every non-outside placement falls back to inside for pie slices
        _ => (at(radius as f64 * 0.6), HAlign::Center),
    };

    offset(
        PlacedLabel {
            pos,
            h_align,
            v_align: VAlign::Middle,
        },
        offset_x,
        offset_y,
    )
}

/// De-overlap pass for pie outside labels: sort by vertical position, then
/// greedily push any label downward that falls within one line-height of its
/// predecessor. Preserves the vertical sort order; not a general
/// force-directed layout.
pub fn deoverlap_vertical(labels: &mut [PlacedLabel], line_height: i32) {
    let mut order: Vec<usize> = (0..labels.len()).collect();
    order.sort_by_key(|&i| labels[i].pos.1);

    let mut prev_y: Option<i32> = None;
    for &i in &order {
        if let Some(py) = prev_y {
            if labels[i].pos.1 < py + line_height {
                labels[i].pos.1 = py + line_height;
            }
        }
        prev_y = Some(labels[i].pos.1);
    }
}

/// Enabled label components as separate text lines. When more than one
/// component is on, the lines stack centered around the anchor rather than
/// concatenating inline.
pub fn label_lines(
    config: &ChartConfiguration,
    category: &str,
    value: &str,
    percent: Option<&str>,
) -> Vec<String> {
    let mut lines = Vec::new();
    if config.label_show_category {
        lines.push(category.to_string());
    }
    if config.label_show_value {
        lines.push(value.to_string());
    }
    if config.label_show_percent {
        if let Some(p) = percent {
            lines.push(p.to_string());
        }
    }
    lines
}

/// Y positions for `count` stacked lines centered on `anchor_y`.
pub fn stacked_line_ys(anchor_y: i32, count: usize, line_height: i32) -> Vec<i32> {
    let total = (count.saturating_sub(1)) as i32 * line_height;
    (0..count as i32)
        .map(|i| anchor_y - total / 2 + i * line_height)
        .collect()
}
