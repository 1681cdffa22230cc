//! Color scheme registry and the color resolver.
//!
//! Resolution is a pure function of configuration + item count: identical
//! inputs always yield identical color sequences, and there is no caching
//! across configuration changes.

use plotters::style::RGBColor;

use crate::config::{ChartConfiguration, ColorMode, LegendMapping};
use crate::ir::ChartData;

/// Special scheme token that triggers procedural hue rotation instead of
/// palette lookup.
pub const DYNAMIC_SCHEME: &str = "dynamic";

pub struct ColorScheme {
    pub name: &'static str,
    pub colors: &'static [&'static str],
}

pub const SCHEMES: &[ColorScheme] = &[
    ColorScheme {
        name: "default",
        colors: &[
            "#4472C4", "#ED7D31", "#A5A5A5", "#FFC000", "#5B9BD5",
            "#70AD47", "#264478", "#9E480E", "#636363", "#997300",
        ],
    },
    ColorScheme {
        name: "vivid",
        colors: &[
            "#E6194B", "#3CB44B", "#FFE119", "#4363D8", "#F58231",
            "#911EB4", "#46F0F0", "#F032E6",
        ],
    },
    ColorScheme {
        name: "pastel",
        colors: &[
            "#A8DADC", "#F1FAEE", "#FFB4A2", "#CDB4DB", "#BDE0FE",
            "#FFC8DD", "#B7E4C7", "#FFD6A5",
        ],
    },
    ColorScheme {
        name: "earth",
        colors: &[
            "#8D6E63", "#A1887F", "#6D4C41", "#4E342E", "#BCAAA4",
            "#795548", "#5D4037", "#D7CCC8",
        ],
    },
    ColorScheme {
        name: "cool",
        colors: &[
            "#05445E", "#189AB4", "#75E6DA", "#D4F1F4", "#0C7B93",
            "#27496D", "#00A8CC", "#142850",
        ],
    },
];

/// Palette for a scheme name; unknown names fall back to the default palette.
pub fn scheme_palette(name: &str) -> &'static [&'static str] {
    SCHEMES
        .iter()
        .find(|s| s.name.eq_ignore_ascii_case(name))
        .unwrap_or(&SCHEMES[0])
        .colors
}

/// Parse `#RRGGBB` or `#RGB`. Invalid strings return `None` so callers can
/// fall back to the active scheme.
pub fn parse_hex(s: &str) -> Option<RGBColor> {
    let hex = s.trim().strip_prefix('#')?;
    match hex.len() {
        6 => {
            let r = u8::from_str_radix(&hex[0..2], 16).ok()?;
            let g = u8::from_str_radix(&hex[2..4], 16).ok()?;
            let b = u8::from_str_radix(&hex[4..6], 16).ok()?;
            Some(RGBColor(r, g, b))
        }
        3 => {
            let d = |i: usize| u8::from_str_radix(&hex[i..i + 1], 16).ok().map(|v| v * 17);
            Some(RGBColor(d(0)?, d(1)?, d(2)?))
        }
        _ => None,
    }
}

/// HSL -> RGB, h in degrees, s and l in [0, 1].
fn hsl_to_rgb(h: f64, s: f64, l: f64) -> RGBColor {
    let h = h.rem_euclid(360.0);
    let c = (1.0 - (2.0 * l - 1.0).abs()) * s;
    let x = c * (1.0 - ((h / 60.0).rem_euclid(2.0) - 1.0).abs());
    let m = l - c / 2.0;
    let (r, g, b) = match h as u32 {
        0..=59 => (c, x, 0.0),
        60..=119 => (x, c, 0.0),
        120..=179 => (0.0, c, x),
        180..=239 => (0.0, x, c),
        240..=299 => (x, 0.0, c),
        _ => (c, 0.0, x),
    };
    RGBColor(
        ((r + m) * 255.0).round() as u8,
        ((g + m) * 255.0).round() as u8,
        ((b + m) * 255.0).round() as u8,
    )
}

/// Synthesize `n` colors by rotating hue with alternating saturation and
/// lightness perturbation, so visually identical neighbors are avoided
/// (not a flat rainbow).
pub fn dynamic_colors(n: usize) -> Vec<RGBColor> {
    let mut colors = Vec::with_capacity(n);
    for i in 0..n {
        let hue = (i as f64) * 360.0 / (n.max(1) as f64);
        let (s, l) = match i % 3 {
            0 => (0.65, 0.50),
            1 => (0.75, 0.42),
            _ => (0.55, 0.58),
        };
        colors.push(hsl_to_rgb(hue, s, l));
    }
    colors
}

/// Ordered rules of the color decision table, evaluated top to bottom.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ColorRule {
    SeriesSingle,
    Single,
    Individual,
    Scheme,
}

fn select_rule(config: &ChartConfiguration) -> ColorRule {
    if config.legend_mapping == Some(LegendMapping::Series)
        && config.color_mode == ColorMode::Single
    {
        ColorRule::SeriesSingle
    } else if config.color_mode == ColorMode::Single {
        ColorRule::Single
    } else if config.color_mode == ColorMode::Individual {
        ColorRule::Individual
    } else {
        ColorRule::Scheme
    }
}

/// Resolve the ordered color sequence for `item_count` marks. Pure and total:
/// missing schemes and invalid custom colors fall back to the default palette.
pub fn resolve_colors(config: &ChartConfiguration, item_count: usize) -> Vec<RGBColor> {
    let fallback = scheme_palette(&config.color_scheme);
    let palette_color =
        |i: usize| parse_hex(fallback[i % fallback.len()]).unwrap_or(RGBColor(68, 114, 196));

    match select_rule(config) {
        ColorRule::SeriesSingle | ColorRule::Single => {
            let color = parse_hex(&config.single_color).unwrap_or(RGBColor(68, 114, 196));
            vec![color; item_count]
        }
        ColorRule::Individual => (0..item_count)
            .map(|i| {
                config
                    .custom_colors
                    .get(i)
                    .and_then(|slot| slot.as_deref())
                    .and_then(parse_hex)
                    .unwrap_or_else(|| palette_color(i))
            })
            .collect(),
        ColorRule::Scheme => {
            if config.color_scheme.eq_ignore_ascii_case(DYNAMIC_SCHEME) {
                dynamic_colors(item_count)
            } else {
                (0..item_count).map(palette_color).collect()
            }
        }
    }
}

/// How many items need colors: per-category (labels) when the legend maps to
/// categories, or — absent an explicit mapping — when the chart has exactly
/// one dataset and the scheme is dynamic or the mode is individual.
/// Single-series bar/pie/area charts are conventionally colored per-category
/// while multi-series charts are colored per-series.
pub fn color_item_count(config: &ChartConfiguration, data: &ChartData) -> usize {
    if colors_per_category(config, data) {
        data.labels.len()
    } else {
        data.datasets.len()
    }
}

pub fn colors_per_category(config: &ChartConfiguration, data: &ChartData) -> bool {
    match config.legend_mapping {
        Some(LegendMapping::Categories) => true,
        Some(LegendMapping::Series) => false,
        None => {
            data.datasets.len() == 1
                && (config.color_scheme.eq_ignore_ascii_case(DYNAMIC_SCHEME)
                    || config.color_mode == ColorMode::Individual)
        }
    }
}
