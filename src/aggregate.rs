//! Aggregation engine: raw records + field mappings + aggregation method
//! -> normalized `ChartData`.
//!
//! The public entry points never propagate failures: `aggregate` returns
//! `None` when the configuration cannot produce data (missing fields, absent
//! columns, zero rows) and `aggregate_or_sample` substitutes the template's
//! deterministic sample data so the preview is never blank.

use log::{debug, warn};
use std::collections::HashMap;

use crate::config::{Aggregation, ChartConfiguration};
use crate::data::DataTable;
use crate::ir::{ChartData, DataPoint, Dataset};
use crate::template::{find_template, sample_data, ChartKind};

/// Blank or missing categorical values coerce to this label rather than being
/// dropped, so row counts are preserved.
const UNKNOWN_LABEL: &str = "Unknown";

/// Fixed maximum-decimal precision applied to all numeric outputs to avoid
/// floating-point artifacts downstream.
const MAX_DECIMALS: f64 = 100.0;

fn round_output(v: f64) -> f64 {
    (v * MAX_DECIMALS).round() / MAX_DECIMALS
}

/// Running reduction over one group. Average is a single-pass accumulator
/// (sum and count carried together); `None` keeps the first encountered
/// value, which is order-of-arrival dependent.
#[derive(Debug, Clone)]
struct Accumulator {
    agg: Aggregation,
    count: u64,
    sum: f64,
    min: f64,
    max: f64,
    first: Option<f64>,
}

impl Accumulator {
    fn new(agg: Aggregation) -> Self {
        Self {
            agg,
            count: 0,
            sum: 0.0,
            min: f64::INFINITY,
            max: f64::NEG_INFINITY,
            first: None,
        }
    }

    fn push(&mut self, value: f64) {
        self.count += 1;
        self.sum += value;
        self.min = self.min.min(value);
        self.max = self.max.max(value);
        if self.first.is_none() {
            self.first = Some(value);
        }
    }

    fn finish(&self) -> f64 {
        if self.count == 0 {
            return 0.0;
        }
        let raw = match self.agg {
            Aggregation::Sum => self.sum,
            Aggregation::Average => self.sum / self.count as f64,
            Aggregation::Count => self.count as f64,
            Aggregation::Min => self.min,
            Aggregation::Max => self.max,
            Aggregation::None => self.first.unwrap_or(0.0),
        };
        round_output(raw)
    }
}

/// Normalize a categorical cell: trimmed, blank -> "Unknown".
fn category_label(cell: &str) -> String {
    let trimmed = cell.trim();
    if trimmed.is_empty() {
        UNKNOWN_LABEL.to_string()
    } else {
        trimmed.to_string()
    }
}

fn numeric_cell(cell: &str) -> f64 {
    cell.trim().parse::<f64>().unwrap_or(0.0)
}

/// Distinct labels of a column, deduplicated with set semantics but kept in
/// first-seen order (not sorted).
fn label_order(table: &DataTable, col: usize) -> Vec<String> {
    let mut order: Vec<String> = Vec::new();
    let mut seen: HashMap<String, ()> = HashMap::new();
    for row in 0..table.rows.len() {
        let label = category_label(table.cell(row, col));
        if seen.insert(label.clone(), ()).is_none() {
            order.push(label);
        }
    }
    order
}

/// Reduce a value column per label, emitting one value per label in order.
/// Labels with no matching rows yield 0.0, not omission.
fn reduce_by_label(
    table: &DataTable,
    key_col: usize,
    labels: &[String],
    value_col: Option<usize>,
    agg: Aggregation,
) -> Vec<f64> {
    let mut groups: HashMap<&str, Accumulator> = HashMap::new();
    for row in 0..table.rows.len() {
        let label = category_label(table.cell(row, key_col));
        let value = value_col.map(|c| numeric_cell(table.cell(row, c))).unwrap_or(0.0);
        if let Some(key) = labels.iter().find(|l| **l == label) {
            groups
                .entry(key.as_str())
                .or_insert_with(|| Accumulator::new(agg))
                .push(value);
        }
    }
    labels
        .iter()
        .map(|l| groups.get(l.as_str()).map(|a| a.finish()).unwrap_or(0.0))
        .collect()
}

/// Aggregate raw records into chart-ready data, or `None` when the referenced
/// table/columns cannot produce it. Callers fall back to sample data.
pub fn aggregate(table: &DataTable, config: &ChartConfiguration) -> Option<ChartData> {
    let template = match find_template(&config.template_id) {
        Some(t) => t,
        None => {
            warn!("unknown template id '{}'", config.template_id);
            return None;
        }
    };

    if table.is_empty() {
        return None;
    }

    match template.kind {
        ChartKind::Pie => aggregate_pie(table, config),
        ChartKind::Scatter => aggregate_scatter(table, config),
        kind => aggregate_cartesian(table, config, kind),
    }
}

/// Aggregate with the spec'd fallback: failures substitute the template's
/// sample data so the UI never shows a blank or broken chart.
pub fn aggregate_or_sample(table: &DataTable, config: &ChartConfiguration) -> ChartData {
    let kind = find_template(&config.template_id)
        .map(|t| t.kind)
        .unwrap_or(ChartKind::Bar);

    let complete = find_template(&config.template_id)
        .map(|t| t.is_complete(config))
        .unwrap_or(false);

    if !complete {
        // Incomplete configurations render placeholder sample data, silently.
        return sample_data(kind);
    }

    match aggregate(table, config) {
        Some(data) => data,
        None => {
            debug!(
                "aggregation produced no data for template '{}', using sample data",
                config.template_id
            );
            sample_data(kind)
        }
    }
}

fn aggregate_pie(table: &DataTable, config: &ChartConfiguration) -> Option<ChartData> {
    let category = config.category_field.as_deref()?;
    let value = config.value_field.as_deref()?;

    let cat_col = resolve_column(table, category)?;
    let val_col = if config.aggregation == Aggregation::Count {
        resolve_column(table, value)
    } else {
        Some(resolve_column(table, value)?)
    };

    let labels = label_order(table, cat_col);
    let values = reduce_by_label(table, cat_col, &labels, val_col, config.aggregation);

    Some(ChartData::new(
        labels,
        vec![Dataset::scalars(value, values)],
    ))
}

fn aggregate_cartesian(
    table: &DataTable,
    config: &ChartConfiguration,
    kind: ChartKind,
) -> Option<ChartData> {
    let x_field = config.x_axis_field.as_ref()?.first()?.to_string();
    let y_ref = config.y_axis_field.as_ref()?;
    let y_fields = y_ref.names();
    if y_fields.is_empty() {
        return None;
    }

    let x_col = resolve_column(table, &x_field)?;
    let labels = label_order(table, x_col);

    // Multiple mapped y columns: one dataset per column, same grouping.
    if y_fields.len() > 1 {
        let mut datasets = Vec::new();
        for field in &y_fields {
            let val_col = resolve_column(table, field)?;
            let values = reduce_by_label(table, x_col, &labels, Some(val_col), config.aggregation);
            datasets.push(Dataset::scalars(*field, values));
        }
        return Some(ChartData::new(labels, datasets));
    }

    let y_field = y_fields[0];
    let val_col = resolve_column(table, y_field)?;

    // Series dimension: one dataset per distinct series value, reduced over
    // the cartesian product of (x-label x series). An invalid series
    // reference is excluded with a warning, not a failure.
    let series_col = match config.series_field.as_deref() {
        Some(name) if !name.trim().is_empty() => match table.column_index(name) {
            Some(idx) => Some(idx),
            None => {
                warn!("series field '{}' not found in columns, ignoring", name);
                None
            }
        },
        _ => None,
    };

    if let Some(series_col) = series_col {
        let series_order = label_order(table, series_col);
        let mut groups: HashMap<(String, String), Accumulator> = HashMap::new();
        for row in 0..table.rows.len() {
            let x_label = category_label(table.cell(row, x_col));
            let s_label = category_label(table.cell(row, series_col));
            let value = numeric_cell(table.cell(row, val_col));
            groups
                .entry((s_label, x_label))
                .or_insert_with(|| Accumulator::new(config.aggregation))
                .push(value);
        }

        let datasets = series_order
            .iter()
            .map(|series| {
                // Missing (x, series) combinations yield 0, keeping all series
                // rectangular with the label axis.
                let values = labels
                    .iter()
                    .map(|label| {
                        groups
                            .get(&(series.clone(), label.clone()))
                            .map(|a| a.finish())
                            .unwrap_or(0.0)
                    })
                    .collect();
                Dataset::scalars(series, values)
            })
            .collect();

        return Some(ChartData::new(labels, datasets));
    }

    if kind == ChartKind::StackedBar || kind == ChartKind::MultiLine {
        // These kinds need a series dimension; without one they degrade to a
        // single dataset, which still renders correctly.
        debug!("{:?} chart without series dimension", kind);
    }

    let values = reduce_by_label(table, x_col, &labels, Some(val_col), config.aggregation);
    Some(ChartData::new(labels, vec![Dataset::scalars(y_field, values)]))
}

/// Scatter keeps one point per source row; labels are positional indices.
/// Rows where either coordinate fails to parse are skipped.
fn aggregate_scatter(table: &DataTable, config: &ChartConfiguration) -> Option<ChartData> {
    let x_field = config.x_axis_field.as_ref()?.first()?.to_string();
    let y_field = config.y_axis_field.as_ref()?.first()?.to_string();
    let x_col = resolve_column(table, &x_field)?;
    let y_col = resolve_column(table, &y_field)?;

    let mut points = Vec::new();
    for row in 0..table.rows.len() {
        let x = table.cell(row, x_col).trim().parse::<f64>();
        let y = table.cell(row, y_col).trim().parse::<f64>();
        if let (Ok(x), Ok(y)) = (x, y) {
            points.push(DataPoint::Point {
                x: round_output(x),
                y: round_output(y),
            });
        }
    }

    if points.is_empty() {
        return None;
    }

    let labels = (0..points.len()).map(|i| i.to_string()).collect();
    Some(ChartData::new(
        labels,
        vec![Dataset {
            label: y_field,
            data: points,
        }],
    ))
}

fn resolve_column(table: &DataTable, name: &str) -> Option<usize> {
    match table.column_index(name) {
        Some(idx) => Some(idx),
        None => {
            warn!("field '{}' not found in columns", name);
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::FieldRef;

    fn sales_table() -> DataTable {
        DataTable::new(
            vec!["region".into(), "sales".into()],
            vec![
                vec!["A".into(), "10".into()],
                vec!["A".into(), "20".into()],
                vec!["B".into(), "5".into()],
            ],
        )
    }

    fn bar_config(aggregation: Aggregation) -> ChartConfiguration {
        ChartConfiguration {
            template_id: "bar".into(),
            x_axis_field: Some(FieldRef::One("region".into())),
            y_axis_field: Some(FieldRef::One("sales".into())),
            aggregation,
            ..Default::default()
        }
    }

    #[test]
    fn test_sum_by_region() {
        let data = aggregate(&sales_table(), &bar_config(Aggregation::Sum)).unwrap();
        assert_eq!(data.labels, vec!["A", "B"]);
        assert_eq!(data.datasets.len(), 1);
        assert_eq!(data.datasets[0].label, "sales");
        assert_eq!(data.datasets[0].values(), vec![30.0, 5.0]);
    }

    #[test]
    fn test_count_ignores_values() {
        let data = aggregate(&sales_table(), &bar_config(Aggregation::Count)).unwrap();
        assert_eq!(data.datasets[0].values(), vec![2.0, 1.0]);
    }

    #[test]
    fn test_average_single_pass() {
        let data = aggregate(&sales_table(), &bar_config(Aggregation::Average)).unwrap();
        assert_eq!(data.datasets[0].values(), vec![15.0, 5.0]);
    }

    #[test]
    fn test_min_max_extrema() {
        let min = aggregate(&sales_table(), &bar_config(Aggregation::Min)).unwrap();
        assert_eq!(min.datasets[0].values(), vec![10.0, 5.0]);
        let max = aggregate(&sales_table(), &bar_config(Aggregation::Max)).unwrap();
        assert_eq!(max.datasets[0].values(), vec![20.0, 5.0]);
    }

    #[test]
    fn test_none_takes_first_encountered() {
        let data = aggregate(&sales_table(), &bar_config(Aggregation::None)).unwrap();
        assert_eq!(data.datasets[0].values(), vec![10.0, 5.0]);
    }

    #[test]
    fn test_first_seen_label_order_not_sorted() {
        let table = DataTable::new(
            vec!["region".into(), "sales".into()],
            vec![
                vec!["Z".into(), "1".into()],
                vec!["A".into(), "2".into()],
                vec!["Z".into(), "3".into()],
            ],
        );
        let data = aggregate(&table, &bar_config(Aggregation::Sum)).unwrap();
        assert_eq!(data.labels, vec!["Z", "A"]);
        assert_eq!(data.datasets[0].values(), vec![4.0, 2.0]);
    }

    #[test]
    fn test_blank_category_coerced_to_unknown() {
        let table = DataTable::new(
            vec!["region".into(), "sales".into()],
            vec![
                vec!["".into(), "7".into()],
                vec!["A".into(), "2".into()],
            ],
        );
        let data = aggregate(&table, &bar_config(Aggregation::Sum)).unwrap();
        assert_eq!(data.labels, vec!["Unknown", "A"]);
        assert_eq!(data.datasets[0].values(), vec![7.0, 2.0]);
    }

    #[test]
    fn test_empty_table_returns_none() {
        let table = DataTable::new(vec!["region".into(), "sales".into()], vec![]);
        assert!(aggregate(&table, &bar_config(Aggregation::Sum)).is_none());
    }

    #[test]
    fn test_missing_column_returns_none() {
        let mut config = bar_config(Aggregation::Sum);
        config.y_axis_field = Some(FieldRef::One("profit".into()));
        assert!(aggregate(&sales_table(), &config).is_none());
    }

    #[test]
    fn test_series_rectangularity_with_missing_combinations() {
        let table = DataTable::new(
            vec!["month".into(), "amount".into(), "product".into()],
            vec![
                vec!["Jan".into(), "10".into(), "X".into()],
                vec!["Feb".into(), "20".into(), "X".into()],
                vec!["Jan".into(), "5".into(), "Y".into()],
                // No Feb row for Y: must yield 0, not omission
            ],
        );
        let config = ChartConfiguration {
            template_id: "stacked-bar".into(),
            x_axis_field: Some(FieldRef::One("month".into())),
            y_axis_field: Some(FieldRef::One("amount".into())),
            series_field: Some("product".into()),
            ..Default::default()
        };
        let data = aggregate(&table, &config).unwrap();
        assert_eq!(data.labels, vec!["Jan", "Feb"]);
        assert_eq!(data.datasets.len(), 2);
        assert!(data.is_rectangular());
        assert_eq!(data.datasets[0].label, "X");
        assert_eq!(data.datasets[0].values(), vec![10.0, 20.0]);
        assert_eq!(data.datasets[1].label, "Y");
        assert_eq!(data.datasets[1].values(), vec![5.0, 0.0]);
    }

    #[test]
    fn test_invalid_series_reference_excluded_not_fatal() {
        let mut config = bar_config(Aggregation::Sum);
        config.series_field = Some("ghost".into());
        let data = aggregate(&sales_table(), &config).unwrap();
        assert_eq!(data.datasets.len(), 1);
        assert_eq!(data.datasets[0].values(), vec![30.0, 5.0]);
    }

    #[test]
    fn test_multiple_y_fields_become_datasets() {
        let table = DataTable::new(
            vec!["month".into(), "q1".into(), "q2".into()],
            vec![
                vec!["Jan".into(), "1".into(), "4".into()],
                vec!["Feb".into(), "2".into(), "5".into()],
            ],
        );
        let config = ChartConfiguration {
            template_id: "multi-line".into(),
            x_axis_field: Some(FieldRef::One("month".into())),
            y_axis_field: Some(FieldRef::Many(vec!["q1".into(), "q2".into()])),
            ..Default::default()
        };
        let data = aggregate(&table, &config).unwrap();
        assert_eq!(data.datasets.len(), 2);
        assert_eq!(data.datasets[0].values(), vec![1.0, 2.0]);
        assert_eq!(data.datasets[1].values(), vec![4.0, 5.0]);
    }

    #[test]
    fn test_pie_grouping() {
        let config = ChartConfiguration {
            template_id: "pie".into(),
            category_field: Some("region".into()),
            value_field: Some("sales".into()),
            ..Default::default()
        };
        let data = aggregate(&sales_table(), &config).unwrap();
        assert_eq!(data.labels, vec!["A", "B"]);
        assert_eq!(data.datasets[0].values(), vec![30.0, 5.0]);
    }

    #[test]
    fn test_pie_missing_value_field_falls_back_to_sample() {
        let config = ChartConfiguration {
            template_id: "pie".into(),
            category_field: Some("region".into()),
            ..Default::default()
        };
        let data = aggregate_or_sample(&sales_table(), &config);
        assert_eq!(data.labels.len(), 4);
        assert_eq!(data.datasets[0].data.len(), 4);
    }

    #[test]
    fn test_scatter_one_point_per_row() {
        let table = DataTable::new(
            vec!["height".into(), "weight".into()],
            vec![
                vec!["170".into(), "65".into()],
                vec!["180".into(), "80".into()],
                vec!["bad".into(), "70".into()],
            ],
        );
        let config = ChartConfiguration {
            template_id: "scatter".into(),
            x_axis_field: Some(FieldRef::One("height".into())),
            y_axis_field: Some(FieldRef::One("weight".into())),
            ..Default::default()
        };
        let data = aggregate(&table, &config).unwrap();
        assert_eq!(data.datasets[0].data.len(), 2);
        assert_eq!(data.labels, vec!["0", "1"]);
        assert_eq!(
            data.datasets[0].data[1],
            DataPoint::Point { x: 180.0, y: 80.0 }
        );
    }

    #[test]
    fn test_output_precision_rounded() {
        let table = DataTable::new(
            vec!["k".into(), "v".into()],
            vec![
                vec!["a".into(), "0.1".into()],
                vec!["a".into(), "0.2".into()],
            ],
        );
        let data = aggregate(&table, &bar_config_for(&table)).unwrap();
        assert_eq!(data.datasets[0].values(), vec![0.3]);
    }

    fn bar_config_for(_table: &DataTable) -> ChartConfiguration {
        ChartConfiguration {
            template_id: "bar".into(),
            x_axis_field: Some(FieldRef::One("k".into())),
            y_axis_field: Some(FieldRef::One("v".into())),
            ..Default::default()
        }
    }
}
