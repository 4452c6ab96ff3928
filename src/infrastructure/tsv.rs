// Tab separated measurement export reader
use crate::domain::error::{DashboardError, DashboardResult};
use crate::domain::measurement::{Column, ColumnData, MeasurementTable};

/// Parse a rig export into a raw table.
///
/// The first line is the header, the first column is a row index and is
/// discarded. A column whose cells are all integers becomes `int64`, any
/// other numeric column `float64` with empty cells as NaN.
pub fn parse_tsv(text: &str) -> DashboardResult<MeasurementTable> {
    let mut lines = text
        .lines()
        .enumerate()
        .map(|(i, line)| (i + 1, line.trim_end_matches('\r')))
        .filter(|(_, line)| !line.is_empty());

    let Some((_, header)) = lines.next() else {
        return Err(DashboardError::schema("measurement file is empty"));
    };

    let names: Vec<&str> = header.split('\t').skip(1).collect();
    if names.is_empty() {
        return Err(DashboardError::schema("header has no data columns"));
    }

    let mut cells: Vec<Vec<&str>> = vec![Vec::new(); names.len()];
    for (line_no, line) in lines {
        let mut fields = line.split('\t');
        // row index
        fields.next();
        let mut count = 0;
        for (column, field) in fields.enumerate() {
            if column < names.len() {
                cells[column].push(field.trim());
            }
            count += 1;
        }
        if count != names.len() {
            return Err(DashboardError::schema(format!(
                "line {}: expected {} values, found {}",
                line_no,
                names.len(),
                count
            )));
        }
    }

    let columns = names
        .iter()
        .zip(cells)
        .map(|(name, values)| Ok(Column::new(*name, type_column(name, &values)?)))
        .collect::<DashboardResult<Vec<_>>>()?;

    MeasurementTable::new(columns)
}

fn type_column(name: &str, values: &[&str]) -> DashboardResult<ColumnData> {
    let integers: Option<Vec<i64>> = values.iter().map(|v| v.parse::<i64>().ok()).collect();
    if let Some(integers) = integers {
        return Ok(ColumnData::Int(integers));
    }

    values
        .iter()
        .enumerate()
        .map(|(row, v)| {
            if v.is_empty() {
                return Ok(f64::NAN);
            }
            v.parse::<f64>().map_err(|_| {
                DashboardError::schema(format!(
                    "row {} of column '{}': '{}' is not numeric",
                    row, name, v
                ))
            })
        })
        .collect::<DashboardResult<Vec<f64>>>()
        .map(ColumnData::Float)
}
