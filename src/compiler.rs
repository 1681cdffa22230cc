//! Chart compilers: turn `ChartData` + scales + colors into a `SceneGraph`
//! of primitive drawing commands, one compiler per chart type. Hover
//! regions, data labels, legend entries and enter-animation delays are all
//! attached here; the backend just executes the commands.

use plotters::style::RGBColor;

use crate::animate::stagger_delays;
use crate::config::{ChartConfiguration, LabelPlacement};
use crate::format::format_number;
use crate::ir::{
    ChartData, DataPoint, DrawCommand, HAlign, HitRegion, HitShape, SceneGraph, Tooltip, VAlign,
};
use crate::labels::{
    deoverlap_vertical, label_lines, place_for_pie, place_for_point, place_for_rect,
    stacked_line_ys, PlacedLabel,
};
use crate::layout::{self, Layout};
use crate::legend::{layout_legend, legend_items, TextProbe, SWATCH_SIZE};
use crate::palette::{color_item_count, colors_per_category, resolve_colors};
use crate::scale::{build_scales, nice_ticks, AxisScales};
use crate::template::ChartKind;
use crate::RenderOptions;

const AXIS_COLOR: RGBColor = RGBColor(110, 110, 110);
const GRID_COLOR: RGBColor = RGBColor(225, 225, 225);
const TEXT_COLOR: RGBColor = RGBColor(60, 60, 60);
const PLACEHOLDER_COLOR: RGBColor = RGBColor(150, 150, 150);

/// Stacked segments shorter than this skip their data label to avoid
/// unreadable overlapping text.
const MIN_SEGMENT_LABEL_PX: i32 = 20;

const AREA_FILL_ALPHA: f64 = 0.35;

/// Compile a full scene for the given chart kind.
pub fn compile_scene(
    data: &ChartData,
    config: &ChartConfiguration,
    kind: ChartKind,
    options: &RenderOptions,
) -> SceneGraph {
    let layout = layout::plan(
        options.width,
        options.height,
        kind,
        config.padding,
        config.rotate_x_labels,
        config.title.is_some(),
    );
    let scales = build_scales(kind, data, &layout, config.y_min, config.y_max);

    let item_count = color_item_count(config, data);
    let colors = resolve_colors(config, item_count);
    let per_category = colors_per_category(config, data);

    let mut scene = SceneGraph::new(options.width, options.height);

    if let Some(title) = &config.title {
        let font = (16.0 * layout.size_class.font_scale()).round() as u32;
        scene.commands.push(DrawCommand::Text {
            content: title.clone(),
            pos: (options.width as i32 / 2, layout.plot_y() / 2),
            font_px: font,
            color: TEXT_COLOR,
            h_align: HAlign::Center,
            v_align: VAlign::Middle,
            rotated: false,
        });
    }

    if !kind.is_radial() {
        compile_axes(&mut scene, data, config, kind, &layout, &scales);
    }

    let ctx = MarkContext {
        data,
        config,
        layout: &layout,
        scales: &scales,
        colors: &colors,
        per_category,
    };

    match kind {
        ChartKind::Bar => compile_bars(&mut scene, &ctx, false),
        ChartKind::StackedBar => compile_bars(&mut scene, &ctx, true),
        ChartKind::Line | ChartKind::MultiLine => compile_lines(&mut scene, &ctx, false),
        ChartKind::Area => compile_lines(&mut scene, &ctx, true),
        ChartKind::Pie => compile_pie(&mut scene, &ctx),
        ChartKind::Scatter => compile_scatter(&mut scene, &ctx),
    }

    if config.show_legend {
        compile_legend(&mut scene, data, config, &layout, options);
    }

    scene
}

/// Placeholder scene for the "no data" and unknown-template states.
pub fn placeholder_scene(options: &RenderOptions, message: &str) -> SceneGraph {
    let mut scene = SceneGraph::new(options.width, options.height);
    scene.commands.push(DrawCommand::Text {
        content: message.to_string(),
        pos: (options.width as i32 / 2, options.height as i32 / 2),
        font_px: 14,
        color: PLACEHOLDER_COLOR,
        h_align: HAlign::Center,
        v_align: VAlign::Middle,
        rotated: false,
    });
    scene
}

struct MarkContext<'a> {
    data: &'a ChartData,
    config: &'a ChartConfiguration,
    layout: &'a Layout,
    scales: &'a AxisScales,
    colors: &'a [RGBColor],
    per_category: bool,
}

impl<'a> MarkContext<'a> {
    fn color_for(&self, dataset: usize, index: usize) -> RGBColor {
        let i = if self.per_category { index } else { dataset };
        self.colors
            .get(i % self.colors.len().max(1))
            .copied()
            .unwrap_or(RGBColor(68, 114, 196))
    }

    fn format(&self, value: f64) -> String {
        format_number(value, &self.config.number_format)
    }

    fn label_font(&self) -> u32 {
        self.layout.size_class.base_font_px()
    }

    /// Animation delays in ms, one per mark; all zeros when animation is off.
    fn delays(&self, mark_count: usize) -> Vec<u32> {
        if self.config.animate {
            stagger_delays(mark_count)
                .into_iter()
                .map(|d| d.as_millis() as u32)
                .collect()
        } else {
            vec![0; mark_count]
        }
    }
}

fn compile_axes(
    scene: &mut SceneGraph,
    data: &ChartData,
    config: &ChartConfiguration,
    kind: ChartKind,
    layout: &Layout,
    scales: &AxisScales,
) {
    let x_font = config
        .x_axis_font_size
        .unwrap_or_else(|| layout.size_class.base_font_px());
    let y_font = config
        .y_axis_font_size
        .unwrap_or_else(|| layout.size_class.base_font_px());

    // Axis lines
    scene.commands.push(DrawCommand::Polyline {
        points: vec![
            (layout.plot_x(), layout.plot_bottom()),
            (layout.plot_right(), layout.plot_bottom()),
        ],
        color: AXIS_COLOR,
        width: 1,
        delay_ms: 0,
    });
    scene.commands.push(DrawCommand::Polyline {
        points: vec![
            (layout.plot_x(), layout.plot_y()),
            (layout.plot_x(), layout.plot_bottom()),
        ],
        color: AXIS_COLOR,
        width: 1,
        delay_ms: 0,
    });

    // Y ticks + gridlines
    let (d0, d1) = scales.y.domain;
    for tick in nice_ticks(d0, d1, 5) {
        let y = scales.y.position(tick).round() as i32;
        if config.show_grid {
            scene.commands.push(DrawCommand::Polyline {
                points: vec![(layout.plot_x(), y), (layout.plot_right(), y)],
                color: GRID_COLOR,
                width: 1,
                delay_ms: 0,
            });
        }
        scene.commands.push(DrawCommand::Text {
            content: format_number(tick, &config.number_format),
            pos: (layout.plot_x() - 6, y),
            font_px: y_font,
            color: TEXT_COLOR,
            h_align: HAlign::Right,
            v_align: VAlign::Middle,
            rotated: false,
        });
    }

    // X labels
    if kind == ChartKind::Scatter {
        let (x0, x1) = scales.x.domain;
        for tick in nice_ticks(x0, x1, 6) {
            let x = scales.x.position(tick).round() as i32;
            scene.commands.push(DrawCommand::Text {
                content: format_number(tick, &config.number_format),
                pos: (x, layout.plot_bottom() + 6),
                font_px: x_font,
                color: TEXT_COLOR,
                h_align: HAlign::Center,
                v_align: VAlign::Top,
                rotated: false,
            });
        }
    } else {
        for (i, label) in data.labels.iter().enumerate() {
            let x = if kind.is_bar_family() {
                scales.x.band_center(i)
            } else {
                scales.x.point_x(i)
            }
            .round() as i32;
            let (h_align, v_align) = if config.rotate_x_labels {
                (HAlign::Right, VAlign::Middle)
            } else {
                (HAlign::Center, VAlign::Top)
            };
            scene.commands.push(DrawCommand::Text {
                content: label.clone(),
                pos: (x, layout.plot_bottom() + 6),
                font_px: x_font,
                color: TEXT_COLOR,
                h_align,
                v_align,
                rotated: config.rotate_x_labels,
            });
        }
    }
}

fn compile_bars(scene: &mut SceneGraph, ctx: &MarkContext<'_>, stacked: bool) {
    let data = ctx.data;
    let scales = ctx.scales;
    let n_datasets = data.datasets.len().max(1);
    let delays = ctx.delays(data.labels.len() * data.datasets.len());
    let mut mark = 0usize;

    let baseline_v = scales.y.domain.0.max(0.0).min(scales.y.domain.1);
    let baseline = scales.y.position(baseline_v);

    for (i, label) in data.labels.iter().enumerate() {
        let (slot_start, slot_end) = scales.x.band_slot(i);
        let mut cumulative = 0.0;

        for (di, dataset) in data.datasets.iter().enumerate() {
            let value = dataset.data.get(i).map(|p| p.value()).unwrap_or(0.0);

            let (x0, x1, y_top, y_bottom) = if stacked {
                // Cumulative offsets per category, computed before drawing
                let y0 = scales.y.position(cumulative);
                let y1 = scales.y.position(cumulative + value);
                cumulative += value;
                (slot_start, slot_end, y1.min(y0), y1.max(y0))
            } else {
                let width = (slot_end - slot_start) / n_datasets as f64;
                let x0 = slot_start + width * di as f64;
                let y = scales.y.position(value);
                (x0, x0 + width, y.min(baseline), y.max(baseline))
            };

            let tl = (x0.round() as i32, y_top.round() as i32);
            let br = (x1.round() as i32, y_bottom.round() as i32);
            let color = ctx.color_for(di, i);

            scene.commands.push(DrawCommand::Rect {
                tl,
                br,
                color,
                alpha: 1.0,
                filled: true,
                delay_ms: delays[mark],
            });

            let tooltip_label = if data.datasets.len() > 1 {
                format!("{} ({})", label, dataset.label)
            } else {
                label.clone()
            };
            scene.hits.push(HitRegion {
                shape: HitShape::Rect { tl, br },
                tooltip: Tooltip {
                    label: tooltip_label,
                    value: ctx.format(value),
                    percent: None,
                },
                dataset: di,
                index: i,
            });

            if ctx.config.show_labels {
                let segment_height = br.1 - tl.1;
                let skip = stacked && segment_height < MIN_SEGMENT_LABEL_PX;
                if !skip {
                    let placement = if stacked {
                        LabelPlacement::Center
                    } else {
                        ctx.config.label_placement
                    };
                    let placed = place_for_rect(
                        placement,
                        tl,
                        br,
                        ctx.config.label_offset_x,
                        ctx.config.label_offset_y,
                    );
                    push_label_lines(scene, ctx, placed, label, value, None);
                }
            }

            mark += 1;
        }
    }
}

fn compile_lines(scene: &mut SceneGraph, ctx: &MarkContext<'_>, area: bool) {
    let data = ctx.data;
    let scales = ctx.scales;
    let delays = ctx.delays(data.datasets.len().max(1));
    let marker_radius = (3.0 * ctx.layout.size_class.font_scale()).round() as i32;
    let baseline = scales
        .y
        .position(scales.y.domain.0.max(0.0).min(scales.y.domain.1))
        .round() as i32;

    for (di, dataset) in data.datasets.iter().enumerate() {
        let color = ctx.color_for(di, 0);
        let delay = delays[di];

        let points: Vec<(i32, i32)> = dataset
            .data
            .iter()
            .enumerate()
            .map(|(i, p)| {
                (
                    scales.x.point_x(i).round() as i32,
                    scales.y.position(p.value()).round() as i32,
                )
            })
            .collect();

        if area && points.len() > 1 {
            let mut polygon = points.clone();
            polygon.push((points[points.len() - 1].0, baseline));
            polygon.push((points[0].0, baseline));
            scene.commands.push(DrawCommand::Polygon {
                points: polygon,
                color,
                alpha: AREA_FILL_ALPHA,
                delay_ms: delay,
            });
        }

        scene.commands.push(DrawCommand::Polyline {
            points: points.clone(),
            color,
            width: 2,
            delay_ms: delay,
        });

        for (i, &center) in points.iter().enumerate() {
            let value = dataset.data[i].value();
            scene.commands.push(DrawCommand::Circle {
                center,
                radius: marker_radius,
                color,
                filled: true,
                delay_ms: delay,
            });

            let tooltip_label = if data.datasets.len() > 1 {
                format!(
                    "{} ({})",
                    data.labels.get(i).cloned().unwrap_or_default(),
                    dataset.label
                )
            } else {
                data.labels.get(i).cloned().unwrap_or_default()
            };
            scene.hits.push(HitRegion {
                shape: HitShape::Circle {
                    center,
                    radius: marker_radius + 4,
                },
                tooltip: Tooltip {
                    label: tooltip_label,
                    value: ctx.format(value),
                    percent: None,
                },
                dataset: di,
                index: i,
            });

            if ctx.config.show_labels {
                let placed = place_for_point(
                    ctx.config.label_placement,
                    center,
                    marker_radius,
                    ctx.config.label_offset_x,
                    ctx.config.label_offset_y,
                );
                let category = data.labels.get(i).cloned().unwrap_or_default();
                push_label_lines(scene, ctx, placed, &category, value, None);
            }
        }
    }
}

fn compile_pie(scene: &mut SceneGraph, ctx: &MarkContext<'_>) {
    let data = ctx.data;
    let Some(dataset) = data.datasets.first() else {
        return;
    };
    let values: Vec<f64> = dataset.values().iter().map(|v| v.max(0.0)).collect();
    let total: f64 = values.iter().sum();
    if total <= 0.0 {
        return;
    }

    let center = ctx.layout.plot_center();
    let radius = (ctx.layout.plot_width().min(ctx.layout.plot_height()) / 2).max(4);
    let delays = ctx.delays(values.len());

    // Wedges run clockwise from 12 o'clock
    let mut start = 0.0f64;
    let mut mid_angles = Vec::with_capacity(values.len());
    for (i, &value) in values.iter().enumerate() {
        let sweep = value / total * std::f64::consts::TAU;
        let end = start + sweep;
        mid_angles.push((start + end) / 2.0);

        scene.commands.push(DrawCommand::Wedge {
            center,
            radius,
            start_angle: start,
            end_angle: end,
            color: ctx.color_for(0, i),
            delay_ms: delays[i],
        });

        let percent = format!("{:.1}%", value / total * 100.0);
        scene.hits.push(HitRegion {
            shape: HitShape::Wedge {
                center,
                radius,
                start_angle: start,
                end_angle: end,
            },
            tooltip: Tooltip {
                label: data.labels.get(i).cloned().unwrap_or_default(),
                value: ctx.format(value),
                percent: Some(percent),
            },
            dataset: 0,
            index: i,
        });

        start = end;
    }

    if ctx.config.show_labels {
        let placement = match ctx.config.label_placement {
            LabelPlacement::Inside => LabelPlacement::Inside,
            _ => LabelPlacement::Outside,
        };
        let mut placed: Vec<PlacedLabel> = mid_angles
            .iter()
            .map(|&angle| {
                place_for_pie(
                    placement,
                    center,
                    radius,
                    angle,
                    ctx.config.label_offset_x,
                    ctx.config.label_offset_y,
                )
            })
            .collect();

        if placement == LabelPlacement::Outside {
            let probe = TextProbe::new(ctx.label_font());
            deoverlap_vertical(&mut placed, probe.line_height());
        }

        for (i, label_pos) in placed.into_iter().enumerate() {
            let value = values[i];
            let percent = format!("{:.1}%", value / total * 100.0);
            let category = data.labels.get(i).cloned().unwrap_or_default();
            push_label_lines(scene, ctx, label_pos, &category, value, Some(&percent));
        }
    }
}

fn compile_scatter(scene: &mut SceneGraph, ctx: &MarkContext<'_>) {
    let data = ctx.data;
    let scales = ctx.scales;
    let radius = (4.0 * ctx.layout.size_class.font_scale()).round() as i32;

    // Zero-reference lines when a domain straddles zero
    if scales.zero_y {
        let y = scales.y.position(0.0).round() as i32;
        scene.commands.push(DrawCommand::Polyline {
            points: vec![(ctx.layout.plot_x(), y), (ctx.layout.plot_right(), y)],
            color: AXIS_COLOR,
            width: 1,
            delay_ms: 0,
        });
    }
    if scales.zero_x {
        let x = scales.x.position(0.0).round() as i32;
        scene.commands.push(DrawCommand::Polyline {
            points: vec![(x, ctx.layout.plot_y()), (x, ctx.layout.plot_bottom())],
            color: AXIS_COLOR,
            width: 1,
            delay_ms: 0,
        });
    }

    for (di, dataset) in data.datasets.iter().enumerate() {
        let delays = ctx.delays(dataset.data.len());
        for (i, point) in dataset.data.iter().enumerate() {
            let (px, py) = match *point {
                DataPoint::Point { x, y } => (x, y),
                DataPoint::Scalar(v) => (i as f64, v),
            };
            let center = (
                scales.x.position(px).round() as i32,
                scales.y.position(py).round() as i32,
            );
            scene.commands.push(DrawCommand::Circle {
                center,
                radius,
                color: ctx.color_for(di, i),
                filled: true,
                delay_ms: delays[i],
            });
            scene.hits.push(HitRegion {
                shape: HitShape::Circle {
                    center,
                    radius: radius + 4,
                },
                tooltip: Tooltip {
                    label: format!("({}, {})", ctx.format(px), ctx.format(py)),
                    value: ctx.format(py),
                    percent: None,
                },
                dataset: di,
                index: i,
            });
        }
    }
}

fn compile_legend(
    scene: &mut SceneGraph,
    data: &ChartData,
    config: &ChartConfiguration,
    layout: &Layout,
    options: &RenderOptions,
) {
    let items = legend_items(config, data);
    if items.is_empty() {
        return;
    }
    let colors = resolve_colors(config, items.len());
    let font = layout.size_class.base_font_px();
    let entries = layout_legend(&items, &colors, config, options.width, options.height, font);

    for entry in entries {
        scene.commands.push(DrawCommand::Rect {
            tl: entry.swatch,
            br: (entry.swatch.0 + SWATCH_SIZE, entry.swatch.1 + SWATCH_SIZE),
            color: entry.color,
            alpha: 1.0,
            filled: true,
            delay_ms: 0,
        });
        scene.commands.push(DrawCommand::Text {
            content: entry.label,
            pos: (entry.text_pos.0, entry.text_pos.1 + SWATCH_SIZE / 2),
            font_px: font,
            color: TEXT_COLOR,
            h_align: HAlign::Left,
            v_align: VAlign::Middle,
            rotated: entry.rotation != 0.0,
        });
    }
}

fn push_label_lines(
    scene: &mut SceneGraph,
    ctx: &MarkContext<'_>,
    placed: PlacedLabel,
    category: &str,
    value: f64,
    percent: Option<&str>,
) {
    let lines = label_lines(ctx.config, category, &ctx.format(value), percent);
    if lines.is_empty() {
        return;
    }
    let font = ctx.label_font();
    let line_height = font as i32 + 2;
    let ys = stacked_line_ys(placed.pos.1, lines.len(), line_height);
    for (line, y) in lines.into_iter().zip(ys) {
        scene.commands.push(DrawCommand::Text {
            content: line,
            pos: (placed.pos.0, y),
            font_px: font,
            color: TEXT_COLOR,
            h_align: placed.h_align,
            v_align: placed.v_align,
            rotated: false,
        });
    }
}
