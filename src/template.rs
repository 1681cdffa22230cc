//! Static chart template registry.
//!
//! Each template declares the chart kind, the field recipe the UI must prompt
//! for, and a deterministic sample dataset used as the fallback when a
//! configuration is incomplete or aggregation fails, so a preview is never
//! blank.

use crate::config::ChartConfiguration;
use crate::ir::{ChartData, DataPoint, Dataset};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChartKind {
    Bar,
    StackedBar,
    Line,
    MultiLine,
    Area,
    Pie,
    Scatter,
}

impl ChartKind {
    /// Charts with a banded categorical x axis.
    pub fn is_bar_family(self) -> bool {
        matches!(self, ChartKind::Bar | ChartKind::StackedBar)
    }

    /// Charts driven by category/value grouping rather than x/y mapping.
    pub fn is_radial(self) -> bool {
        matches!(self, ChartKind::Pie)
    }
}

/// Field slots a template can require.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldSlot {
    XAxis,
    YAxis,
    Category,
    Value,
    /// Satisfied by either a series_field or multiple y columns.
    Series,
}

#[derive(Debug, Clone)]
pub struct ChartTemplate {
    pub id: &'static str,
    pub category: &'static str,
    pub kind: ChartKind,
    pub required_fields: &'static [FieldSlot],
}

impl ChartTemplate {
    /// A configuration is complete when exactly the slots this recipe names
    /// are populated. Incomplete configurations render a placeholder, never
    /// partial data.
    pub fn is_complete(&self, config: &ChartConfiguration) -> bool {
        self.required_fields.iter().all(|slot| match slot {
            FieldSlot::XAxis => config
                .x_axis_field
                .as_ref()
                .map(|f| f.is_populated())
                .unwrap_or(false),
            FieldSlot::YAxis => config
                .y_axis_field
                .as_ref()
                .map(|f| f.is_populated())
                .unwrap_or(false),
            FieldSlot::Category => config
                .category_field
                .as_deref()
                .map(|f| !f.trim().is_empty())
                .unwrap_or(false),
            FieldSlot::Value => config
                .value_field
                .as_deref()
                .map(|f| !f.trim().is_empty())
                .unwrap_or(false),
            FieldSlot::Series => {
                config
                    .series_field
                    .as_deref()
                    .map(|f| !f.trim().is_empty())
                    .unwrap_or(false)
                    || config.y_field_count() > 1
            }
        })
    }
}

const TEMPLATES: &[ChartTemplate] = &[
    ChartTemplate {
        id: "bar",
        category: "comparison",
        kind: ChartKind::Bar,
        required_fields: &[FieldSlot::XAxis, FieldSlot::YAxis],
    },
    ChartTemplate {
        id: "stacked-bar",
        category: "comparison",
        kind: ChartKind::StackedBar,
        required_fields: &[FieldSlot::XAxis, FieldSlot::YAxis, FieldSlot::Series],
    },
    ChartTemplate {
        id: "line",
        category: "trend",
        kind: ChartKind::Line,
        required_fields: &[FieldSlot::XAxis, FieldSlot::YAxis],
    },
    ChartTemplate {
        id: "multi-line",
        category: "trend",
        kind: ChartKind::MultiLine,
        required_fields: &[FieldSlot::XAxis, FieldSlot::YAxis, FieldSlot::Series],
    },
    ChartTemplate {
        id: "area",
        category: "trend",
        kind: ChartKind::Area,
        required_fields: &[FieldSlot::XAxis, FieldSlot::YAxis],
    },
    ChartTemplate {
        id: "pie",
        category: "composition",
        kind: ChartKind::Pie,
        required_fields: &[FieldSlot::Category, FieldSlot::Value],
    },
    ChartTemplate {
        id: "scatter",
        category: "distribution",
        kind: ChartKind::Scatter,
        required_fields: &[FieldSlot::XAxis, FieldSlot::YAxis],
    },
];

pub fn templates() -> &'static [ChartTemplate] {
    TEMPLATES
}

pub fn find_template(id: &str) -> Option<&'static ChartTemplate> {
    TEMPLATES.iter().find(|t| t.id.eq_ignore_ascii_case(id))
}

/// Deterministic per-kind sample data for previews and failure fallback.
pub fn sample_data(kind: ChartKind) -> ChartData {
    match kind {
        ChartKind::Bar => ChartData::new(
            labels(&["North", "South", "East", "West"]),
            vec![Dataset::scalars("Sales", vec![42.0, 28.0, 35.0, 19.0])],
        ),
        ChartKind::StackedBar => ChartData::new(
            labels(&["Q1", "Q2", "Q3", "Q4"]),
            vec![
                Dataset::scalars("Product A", vec![12.0, 18.0, 15.0, 22.0]),
                Dataset::scalars("Product B", vec![8.0, 11.0, 14.0, 9.0]),
                Dataset::scalars("Product C", vec![5.0, 7.0, 6.0, 10.0]),
            ],
        ),
        ChartKind::Line => ChartData::new(
            labels(&["Jan", "Feb", "Mar", "Apr", "May", "Jun"]),
            vec![Dataset::scalars(
                "Revenue",
                vec![10.0, 14.0, 12.0, 18.0, 21.0, 19.0],
            )],
        ),
        ChartKind::MultiLine => ChartData::new(
            labels(&["Jan", "Feb", "Mar", "Apr", "May", "Jun"]),
            vec![
                Dataset::scalars("2023", vec![10.0, 14.0, 12.0, 18.0, 21.0, 19.0]),
                Dataset::scalars("2024", vec![13.0, 12.0, 17.0, 20.0, 24.0, 26.0]),
            ],
        ),
        ChartKind::Area => ChartData::new(
            labels(&["Mon", "Tue", "Wed", "Thu", "Fri"]),
            vec![Dataset::scalars(
                "Visitors",
                vec![120.0, 145.0, 132.0, 170.0, 158.0],
            )],
        ),
        // Exactly 4 items: callers rely on this for the missing-field fallback.
        ChartKind::Pie => ChartData::new(
            labels(&["Alpha", "Beta", "Gamma", "Delta"]),
            vec![Dataset::scalars("Share", vec![40.0, 30.0, 20.0, 10.0])],
        ),
        ChartKind::Scatter => {
            let points = vec![
                (1.0, 2.0),
                (2.0, 3.5),
                (3.0, 2.8),
                (4.0, 5.1),
                (5.0, 4.4),
                (6.0, 6.2),
            ];
            let data = ChartData::new(
                (0..points.len()).map(|i| i.to_string()).collect(),
                vec![Dataset {
                    label: "Sample".to_string(),
                    data: points
                        .into_iter()
                        .map(|(x, y)| DataPoint::Point { x, y })
                        .collect(),
                }],
            );
            data
        }
    }
}

fn labels(names: &[&str]) -> Vec<String> {
    names.iter().map(|s| s.to_string()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_template_resolvable() {
        for t in templates() {
            assert!(find_template(t.id).is_some());
            assert!(!sample_data(t.kind).is_empty());
        }
    }

    #[test]
    fn test_pie_sample_has_four_items() {
        let data = sample_data(ChartKind::Pie);
        assert_eq!(data.labels.len(), 4);
        assert_eq!(data.datasets[0].data.len(), 4);
    }

    #[test]
    fn test_sample_data_rectangular() {
        for t in templates() {
            if t.kind != ChartKind::Scatter {
                assert!(sample_data(t.kind).is_rectangular(), "{} sample", t.id);
            }
        }
    }

    #[test]
    fn test_pie_recipe_completeness() {
        let mut cfg = ChartConfiguration {
            template_id: "pie".into(),
            ..Default::default()
        };
        let t = find_template("pie").unwrap();
        assert!(!t.is_complete(&cfg));
        cfg.category_field = Some("region".into());
        assert!(!t.is_complete(&cfg));
        cfg.value_field = Some("sales".into());
        assert!(t.is_complete(&cfg));
    }

    #[test]
    fn test_series_slot_satisfied_by_multiple_y_fields() {
        use crate::config::FieldRef;
        let cfg = ChartConfiguration {
            template_id: "multi-line".into(),
            x_axis_field: Some(FieldRef::One("month".into())),
            y_axis_field: Some(FieldRef::Many(vec!["q1".into(), "q2".into()])),
            ..Default::default()
        };
        assert!(find_template("multi-line").unwrap().is_complete(&cfg));
    }

    #[test]
    fn test_unknown_template() {
        assert!(find_template("donut").is_none());
    }
}
