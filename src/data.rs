use anyhow::{anyhow, Result};
use serde_json::Value;
use std::io::Read;

/// Semantic type of a source column. Drives which fields are offered as
/// category vs. value axes by the calling UI.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnType {
    String,
    Number,
    Date,
    Boolean,
}

#[derive(Debug, Clone)]
pub struct ColumnInfo {
    pub name: String,
    pub column_type: ColumnType,
}

/// Flat tabular records. Cells are kept as strings and parsed on demand;
/// missing fields are empty strings, never an error.
#[derive(Debug, Clone)]
pub struct DataTable {
    pub columns: Vec<ColumnInfo>,
    pub rows: Vec<Vec<String>>,
}

impl DataTable {
    pub fn new(headers: Vec<String>, rows: Vec<Vec<String>>) -> Self {
        let columns = headers
            .iter()
            .enumerate()
            .map(|(i, name)| ColumnInfo {
                name: name.clone(),
                column_type: infer_column_type(rows.iter().map(|r| r.get(i).map(|s| s.as_str()).unwrap_or(""))),
            })
            .collect();
        Self { columns, rows }
    }

    /// Create a DataTable from a JSON array of objects. Heterogeneous field
    /// types are permitted; null/missing values become empty cells.
    pub fn from_json(value: &Value) -> Result<Self> {
        let array = value.as_array().ok_or_else(||
            anyhow!("Input data must be a JSON array of objects")
        )?;

        if array.is_empty() {
            return Ok(Self { columns: Vec::new(), rows: Vec::new() });
        }

        let first_obj = array[0].as_object().ok_or_else(||
            anyhow!("Items in array must be objects")
        )?;

        // Union of keys across all rows, first-seen order
        let mut headers: Vec<String> = first_obj.keys().cloned().collect();
        for item in array.iter().skip(1) {
            if let Some(obj) = item.as_object() {
                for key in obj.keys() {
                    if !headers.iter().any(|h| h == key) {
                        headers.push(key.clone());
                    }
                }
            }
        }

        let mut rows = Vec::new();
        for item in array {
            let obj = item.as_object().ok_or_else(||
                anyhow!("Items in array must be objects")
            )?;

            let mut row = Vec::new();
            for header in &headers {
                let val_str = match obj.get(header) {
                    Some(Value::String(s)) => s.clone(),
                    Some(Value::Number(n)) => n.to_string(),
                    Some(Value::Bool(b)) => b.to_string(),
                    Some(Value::Null) | None => String::new(),
                    _ => return Err(anyhow!("Unsupported value type for field '{}'", header)),
                };
                row.push(val_str);
            }
            rows.push(row);
        }

        Ok(Self::new(headers, rows))
    }

    /// Create a DataTable from CSV text (first record is the header row).
    pub fn from_csv<R: Read>(reader: R) -> Result<Self> {
        let mut rdr = csv::Reader::from_reader(reader);
        let headers: Vec<String> = rdr
            .headers()?
            .iter()
            .map(|h| h.trim().to_string())
            .collect();

        let mut rows = Vec::new();
        for record in rdr.records() {
            let record = record?;
            let mut row: Vec<String> = record.iter().map(|c| c.to_string()).collect();
            // Pad short records so every row matches the header width
            while row.len() < headers.len() {
                row.push(String::new());
            }
            rows.push(row);
        }

        Ok(Self::new(headers, rows))
    }

    /// Case-insensitive column lookup.
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns
            .iter()
            .position(|c| c.name.eq_ignore_ascii_case(name))
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.column_index(name).is_some()
    }

    pub fn cell(&self, row: usize, col: usize) -> &str {
        self.rows
            .get(row)
            .and_then(|r| r.get(col))
            .map(|s| s.as_str())
            .unwrap_or("")
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Infer a column type from its values: all numeric parses -> Number,
/// all true/false -> Boolean, all date-shaped -> Date, otherwise String.
/// Empty cells are ignored; an all-empty column is String.
fn infer_column_type<'a, I: Iterator<Item = &'a str>>(values: I) -> ColumnType {
    let mut saw_any = false;
    let mut all_number = true;
    let mut all_bool = true;
    let mut all_date = true;

    for v in values {
        let v = v.trim();
        if v.is_empty() {
            continue;
        }
        saw_any = true;
        if v.parse::<f64>().is_err() {
            all_number = false;
        }
        if !v.eq_ignore_ascii_case("true") && !v.eq_ignore_ascii_case("false") {
            all_bool = false;
        }
        if !is_date_like(v) {
            all_date = false;
        }
    }

    if !saw_any {
        ColumnType::String
    } else if all_number {
        ColumnType::Number
    } else if all_bool {
        ColumnType::Boolean
    } else if all_date {
        ColumnType::Date
    } else {
        ColumnType::String
    }
}

/// Accepts ISO-ish dates: YYYY-MM-DD or YYYY/MM/DD.
fn is_date_like(s: &str) -> bool {
    let bytes = s.as_bytes();
    if bytes.len() != 10 {
        return false;
    }
    let sep = bytes[4];
    if (sep != b'-' && sep != b'/') || bytes[7] != sep {
        return false;
    }
    s.char_indices()
        .all(|(i, c)| if i == 4 || i == 7 { true } else { c.is_ascii_digit() })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_from_json_basic() {
        let value = json!([
            {"region": "A", "sales": 10},
            {"region": "B", "sales": 5}
        ]);
        let table = DataTable::from_json(&value).unwrap();
        assert_eq!(table.columns.len(), 2);
        assert_eq!(table.rows.len(), 2);
        assert_eq!(table.cell(0, 0), "A");
        assert_eq!(table.cell(1, 1), "5");
    }

    #[test]
    fn test_from_json_missing_fields_become_empty() {
        let value = json!([
            {"a": 1, "b": 2},
            {"a": 3}
        ]);
        let table = DataTable::from_json(&value).unwrap();
        assert_eq!(table.cell(1, 1), "");
    }

    #[test]
    fn test_from_json_union_of_keys() {
        let value = json!([
            {"a": 1},
            {"a": 2, "b": "x"}
        ]);
        let table = DataTable::from_json(&value).unwrap();
        assert_eq!(table.columns.len(), 2);
        assert_eq!(table.cell(0, 1), "");
        assert_eq!(table.cell(1, 1), "x");
    }

    #[test]
    fn test_column_type_inference() {
        let value = json!([
            {"n": 1.5, "b": true, "d": "2024-01-31", "s": "hello"},
            {"n": 2, "b": false, "d": "2024-02-01", "s": "7 dwarfs"}
        ]);
        let table = DataTable::from_json(&value).unwrap();
        let get = |name: &str| {
            let idx = table.column_index(name).unwrap();
            table.columns[idx].column_type
        };
        assert_eq!(get("n"), ColumnType::Number);
        assert_eq!(get("b"), ColumnType::Boolean);
        assert_eq!(get("d"), ColumnType::Date);
        assert_eq!(get("s"), ColumnType::String);
    }

    #[test]
    fn test_from_csv() {
        let csv = "region,sales\nA,10\nB,5\n";
        let table = DataTable::from_csv(csv.as_bytes()).unwrap();
        assert_eq!(table.rows.len(), 2);
        assert_eq!(table.columns[1].column_type, ColumnType::Number);
    }

    #[test]
    fn test_column_index_case_insensitive() {
        let table = DataTable::new(vec!["Region".into()], vec![vec!["A".into()]]);
        assert_eq!(table.column_index("region"), Some(0));
        assert_eq!(table.column_index("missing"), None);
    }

    #[test]
    fn test_empty_json_array() {
        let table = DataTable::from_json(&json!([])).unwrap();
        assert!(table.is_empty());
    }
}
