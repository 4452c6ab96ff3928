// Columnar measurement table used for both raw and canonical data
use super::error::{DashboardError, DashboardResult};

/// Round to `decimals` places, half to even on the scaled value.
pub fn round_to(value: f64, decimals: u32) -> f64 {
    let scale = 10f64.powi(decimals as i32);
    (value * scale).round_ties_even() / scale
}

/// Typed storage of one column.
#[derive(Debug, Clone, PartialEq)]
pub enum ColumnData {
    Int(Vec<i64>),
    Float(Vec<f64>),
    Int16(Vec<i16>),
    Int8(Vec<i8>),
}

impl ColumnData {
    pub fn len(&self) -> usize {
        match self {
            ColumnData::Int(v) => v.len(),
            ColumnData::Float(v) => v.len(),
            ColumnData::Int16(v) => v.len(),
            ColumnData::Int8(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn dtype(&self) -> &'static str {
        match self {
            ColumnData::Int(_) => "int64",
            ColumnData::Float(_) => "float64",
            ColumnData::Int16(_) => "int16",
            ColumnData::Int8(_) => "int8",
        }
    }

    /// Value at `row` widened to f64. Panics on out-of-range rows like slice indexing.
    pub fn float_at(&self, row: usize) -> f64 {
        match self {
            ColumnData::Int(v) => v[row] as f64,
            ColumnData::Float(v) => v[row],
            ColumnData::Int16(v) => f64::from(v[row]),
            ColumnData::Int8(v) => f64::from(v[row]),
        }
    }

    /// Value at `row` as an integer, `None` for float columns.
    pub fn integer_at(&self, row: usize) -> Option<i64> {
        match self {
            ColumnData::Int(v) => Some(v[row]),
            ColumnData::Float(_) => None,
            ColumnData::Int16(v) => Some(i64::from(v[row])),
            ColumnData::Int8(v) => Some(i64::from(v[row])),
        }
    }

    pub fn take(&self, rows: &[usize]) -> ColumnData {
        match self {
            ColumnData::Int(v) => ColumnData::Int(rows.iter().map(|&r| v[r]).collect()),
            ColumnData::Float(v) => ColumnData::Float(rows.iter().map(|&r| v[r]).collect()),
            ColumnData::Int16(v) => ColumnData::Int16(rows.iter().map(|&r| v[r]).collect()),
            ColumnData::Int8(v) => ColumnData::Int8(rows.iter().map(|&r| v[r]).collect()),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Column {
    pub name: String,
    pub data: ColumnData,
}

impl Column {
    pub fn new(name: impl Into<String>, data: ColumnData) -> Self {
        Self {
            name: name.into(),
            data,
        }
    }
}

/// Ordered set of equally long, uniquely named columns.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct MeasurementTable {
    columns: Vec<Column>,
}

impl MeasurementTable {
    pub fn new(columns: Vec<Column>) -> DashboardResult<Self> {
        if let Some(first) = columns.first() {
            let rows = first.data.len();
            if let Some(bad) = columns.iter().find(|c| c.data.len() != rows) {
                return Err(DashboardError::schema(format!(
                    "column '{}' has {} rows, expected {}",
                    bad.name,
                    bad.data.len(),
                    rows
                )));
            }
        }
        for (i, column) in columns.iter().enumerate() {
            if columns[..i].iter().any(|c| c.name == column.name) {
                return Err(DashboardError::schema(format!(
                    "duplicate column '{}'",
                    column.name
                )));
            }
        }
        Ok(Self { columns })
    }

    pub fn row_count(&self) -> usize {
        self.columns.first().map(|c| c.data.len()).unwrap_or(0)
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn column_names(&self) -> Vec<&str> {
        self.columns.iter().map(|c| c.name.as_str()).collect()
    }

    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name == name)
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.column(name).is_some()
    }

    /// Column lookup that reports the absence as a schema error.
    pub fn require(&self, name: &str) -> DashboardResult<&Column> {
        self.column(name)
            .ok_or_else(|| DashboardError::schema(format!("column '{}' is missing", name)))
    }

    pub fn remove_column(&mut self, name: &str) -> DashboardResult<Column> {
        let idx = self.index_of(name)?;
        Ok(self.columns.remove(idx))
    }

    pub fn rename_column(&mut self, from: &str, to: &str) -> DashboardResult<()> {
        if from == to {
            return self.require(from).map(|_| ());
        }
        if self.has_column(to) {
            return Err(DashboardError::schema(format!(
                "cannot rename '{}' to '{}': target already exists",
                from, to
            )));
        }
        let idx = self.index_of(from)?;
        self.columns[idx].name = to.to_string();
        Ok(())
    }

    pub fn replace_data(&mut self, name: &str, data: ColumnData) -> DashboardResult<()> {
        let idx = self.index_of(name)?;
        if data.len() != self.columns[idx].data.len() {
            return Err(DashboardError::schema(format!(
                "replacement for '{}' changes the row count",
                name
            )));
        }
        self.columns[idx].data = data;
        Ok(())
    }

    /// New table holding only the given rows, in the given order.
    pub fn take_rows(&self, rows: &[usize]) -> MeasurementTable {
        MeasurementTable {
            columns: self
                .columns
                .iter()
                .map(|c| Column::new(c.name.clone(), c.data.take(rows)))
                .collect(),
        }
    }

    fn index_of(&self, name: &str) -> DashboardResult<usize> {
        self.columns
            .iter()
            .position(|c| c.name == name)
            .ok_or_else(|| DashboardError::schema(format!("column '{}' is missing", name)))
    }
}
