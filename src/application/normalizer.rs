// Dataset normalizer - raw rig export to canonical measurement table
use crate::domain::error::{DashboardError, DashboardResult};
use crate::domain::measurement::{round_to, ColumnData, MeasurementTable};
use crate::infrastructure::config::{NarrowType, NormalizationRules, UnitConversion};
use std::cmp::Ordering;

const NANOS_PER_MILLI: i64 = 1_000_000;

/// Apply one schema variant's rules to a raw table.
///
/// Steps run in a fixed order: drop, rename, narrow types, unit conversions.
/// Later steps address columns by their renamed names. Row count and order
/// are never changed.
pub fn normalize(
    raw: &MeasurementTable,
    rules: &NormalizationRules,
) -> DashboardResult<MeasurementTable> {
    let mut table = raw.clone();

    for column in &rules.drop {
        table.remove_column(column).map_err(|_| {
            DashboardError::schema(format!("column '{}' to drop is missing", column))
        })?;
    }

    for rule in &rules.rename {
        if table.has_column(&rule.from) {
            table.rename_column(&rule.from, &rule.to)?;
        } else {
            tracing::debug!("Rename source '{}' not present, skipping", rule.from);
        }
    }

    for rule in &rules.types {
        let narrowed = narrow(&rule.column, &table.require(&rule.column)?.data, rule.dtype)?;
        table.replace_data(&rule.column, narrowed)?;
    }

    for rule in &rules.units {
        let converted = convert(&rule.column, &table.require(&rule.column)?.data, &rule.conversion)?;
        table.replace_data(&rule.column, converted)?;
    }

    tracing::debug!(
        "Normalized table: {} rows, {} columns",
        table.row_count(),
        table.columns().len()
    );
    Ok(table)
}

/// Nanoseconds to milliseconds, rounding half to even.
pub fn nanos_to_millis(ns: i64) -> i64 {
    let quotient = ns.div_euclid(NANOS_PER_MILLI);
    let remainder = ns.rem_euclid(NANOS_PER_MILLI);
    match (remainder * 2).cmp(&NANOS_PER_MILLI) {
        Ordering::Less => quotient,
        Ordering::Greater => quotient + 1,
        Ordering::Equal if quotient % 2 == 0 => quotient,
        Ordering::Equal => quotient + 1,
    }
}

fn convert(column: &str, data: &ColumnData, conversion: &UnitConversion) -> DashboardResult<ColumnData> {
    match conversion {
        UnitConversion::NanosToMillis => {
            let millis = match data {
                ColumnData::Float(values) => values
                    .iter()
                    .enumerate()
                    .map(|(row, &v)| {
                        let ms = (v * 1e-6).round_ties_even();
                        // `as` would saturate silently outside the i64 range
                        if ms.is_finite() && ms >= i64::MIN as f64 && ms < i64::MAX as f64 {
                            Ok(ms as i64)
                        } else {
                            Err(DashboardError::schema(format!(
                                "row {} of '{}': timestamp {} ns is not representable in milliseconds",
                                row, column, v
                            )))
                        }
                    })
                    .collect::<DashboardResult<Vec<i64>>>()?,
                _ => (0..data.len())
                    .filter_map(|row| data.integer_at(row))
                    .map(nanos_to_millis)
                    .collect(),
            };
            Ok(ColumnData::Int(millis))
        }
        UnitConversion::Scale { factor, decimals } => {
            let scaled = (0..data.len())
                .map(|row| {
                    let v = data.float_at(row) * factor;
                    match decimals {
                        Some(d) => round_to(v, *d),
                        None => v,
                    }
                })
                .collect();
            Ok(ColumnData::Float(scaled))
        }
    }
}

fn narrow(column: &str, data: &ColumnData, dtype: NarrowType) -> DashboardResult<ColumnData> {
    let integers = (0..data.len())
        .map(|row| exact_integer(column, data, row))
        .collect::<DashboardResult<Vec<i64>>>()?;

    let out_of_range = |row: usize, value: i64| {
        DashboardError::schema(format!(
            "row {} of '{}': value {} does not fit {:?}",
            row, column, value, dtype
        ))
    };

    match dtype {
        NarrowType::Int16 => integers
            .iter()
            .enumerate()
            .map(|(row, &v)| i16::try_from(v).map_err(|_| out_of_range(row, v)))
            .collect::<DashboardResult<Vec<i16>>>()
            .map(ColumnData::Int16),
        NarrowType::Int8 => integers
            .iter()
            .enumerate()
            .map(|(row, &v)| i8::try_from(v).map_err(|_| out_of_range(row, v)))
            .collect::<DashboardResult<Vec<i8>>>()
            .map(ColumnData::Int8),
    }
}

fn exact_integer(column: &str, data: &ColumnData, row: usize) -> DashboardResult<i64> {
    if let Some(v) = data.integer_at(row) {
        return Ok(v);
    }
    let v = data.float_at(row);
    if v.is_finite() && v.fract() == 0.0 && v >= i64::MIN as f64 && v < i64::MAX as f64 {
        Ok(v as i64)
    } else {
        Err(DashboardError::schema(format!(
            "row {} of '{}': {} is not an integer",
            row, column, v
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::measurement::Column;
    use crate::infrastructure::config::shipped_config;
    use crate::infrastructure::tsv::parse_tsv;
    use crate::test_support::{RawSample, RigExport};
    use proptest::prelude::*;

    fn rules() -> NormalizationRules {
        shipped_config().rig.schemas["press_rig"].clone()
    }

    fn raw_table() -> MeasurementTable {
        let text = RigExport::new()
            .row(RawSample::new(0, 1).position(0.125).pressure(12_345_678.0).friction(1600.0))
            .row(RawSample::new(1_000_000, 1).position(0.25).pressure(12_345_678.0).friction(1600.0))
            .build();
        parse_tsv(&text).unwrap()
    }

    #[test]
    fn test_normalize_renames_converts_and_drops() {
        let table = normalize(&raw_table(), &rules()).unwrap();

        assert!(!table.has_column("Ventilueberdeckung [%]"));
        assert!(!table.has_column("sv_loadLength"));
        assert!(!table.has_column("i_POS1_cal [m]"));
        assert_eq!(table.row_count(), 2);

        let position = &table.column("position").unwrap().data;
        assert_eq!(position, &ColumnData::Float(vec![125.0, 250.0]));

        let ps1 = &table.column("pressure PS1").unwrap().data;
        assert_eq!(ps1, &ColumnData::Float(vec![123.4568, 123.4568]));

        let ts = &table.column("Timestamp UTC").unwrap().data;
        assert_eq!(ts, &ColumnData::Int(vec![0, 1]));

        assert_eq!(table.column("autoCounter").unwrap().data.dtype(), "int16");
        assert_eq!(table.column("o_SV1").unwrap().data.dtype(), "int8");
        assert_eq!(
            table.column("compression length [mm]").unwrap().data.dtype(),
            "int8"
        );
        assert_eq!(table.column("friction [N]").unwrap().data.float_at(0), 1600.0);
    }

    #[test]
    fn test_missing_drop_column_is_schema_error() {
        let mut raw = raw_table();
        raw.remove_column("sv_loadLength").unwrap();
        let err = normalize(&raw, &rules()).unwrap_err();
        assert!(err.to_string().contains("sv_loadLength"));
    }

    #[test]
    fn test_narrowing_overflow_is_schema_error() {
        let raw = MeasurementTable::new(vec![Column::new(
            "o_SV1",
            ColumnData::Int(vec![1, 300]),
        )])
        .unwrap();
        let rules: NormalizationRules = toml::from_str(
            r#"types = [{ column = "o_SV1", dtype = "int8" }]"#,
        )
        .unwrap();
        let err = normalize(&raw, &rules).unwrap_err();
        assert!(err.to_string().contains("300"));
    }

    #[test]
    fn test_narrowing_rejects_fractions_and_nan() {
        let rules: NormalizationRules = toml::from_str(
            r#"types = [{ column = "autoCounter", dtype = "int16" }]"#,
        )
        .unwrap();
        for bad in [1.5, f64::NAN] {
            let raw = MeasurementTable::new(vec![Column::new(
                "autoCounter",
                ColumnData::Float(vec![1.0, bad]),
            )])
            .unwrap();
            assert!(matches!(
                normalize(&raw, &rules),
                Err(DashboardError::Schema(_))
            ));
        }
    }

    #[test]
    fn test_unrepresentable_timestamp_is_schema_error() {
        let raw = parse_tsv("\tTimestamp UTC\tautoCounter\n0\t-1e300\t1\n1\t1e300\t1\n").unwrap();
        let rules: NormalizationRules = toml::from_str(
            r#"units = [{ column = "Timestamp UTC", conversion = { kind = "nanos_to_millis" } }]"#,
        )
        .unwrap();
        let err = normalize(&raw, &rules).unwrap_err();
        assert!(matches!(err, DashboardError::Schema(_)));
        assert!(err.to_string().contains("row 0"));

        // large but representable float nanoseconds still convert
        let raw = parse_tsv("\tTimestamp UTC\tautoCounter\n0\t1.5e18\t1\n").unwrap();
        let table = normalize(&raw, &rules).unwrap();
        assert_eq!(
            table.column("Timestamp UTC").unwrap().data,
            ColumnData::Int(vec![1_500_000_000_000])
        );
    }

    #[test]
    fn test_unit_rule_on_missing_column() {
        let raw = MeasurementTable::new(vec![Column::new("a", ColumnData::Int(vec![1]))]).unwrap();
        let rules: NormalizationRules = toml::from_str(
            r#"units = [{ column = "position", conversion = { kind = "scale", factor = 1000.0 } }]"#,
        )
        .unwrap();
        let err = normalize(&raw, &rules).unwrap_err();
        assert!(err.to_string().contains("'position' is missing"));
    }

    #[test]
    fn test_second_schema_variant() {
        // Older exports name the position channel differently and carry no drop columns.
        let raw = parse_tsv("\tTimestamp UTC\tautoCounter\tPOS1 [m]\n0\t1500000\t1\t0.3\n").unwrap();
        let rules: NormalizationRules = toml::from_str(
            r#"
            rename = [{ from = "POS1 [m]", to = "position" }]
            types = [{ column = "autoCounter", dtype = "int16" }]
            units = [
                { column = "Timestamp UTC", conversion = { kind = "nanos_to_millis" } },
                { column = "position", conversion = { kind = "scale", factor = 1000.0 } },
            ]
            "#,
        )
        .unwrap();
        let table = normalize(&raw, &rules).unwrap();
        assert_eq!(table.column("Timestamp UTC").unwrap().data, ColumnData::Int(vec![2]));
        assert_eq!(table.column("position").unwrap().data, ColumnData::Float(vec![300.0]));
    }

    #[test]
    fn test_nanos_to_millis_half_even() {
        assert_eq!(nanos_to_millis(0), 0);
        assert_eq!(nanos_to_millis(1_000_000), 1);
        assert_eq!(nanos_to_millis(1_499_999), 1);
        assert_eq!(nanos_to_millis(500_000), 0);
        assert_eq!(nanos_to_millis(1_500_000), 2);
        assert_eq!(nanos_to_millis(2_500_000), 2);
        assert_eq!(nanos_to_millis(-1_500_000), -2);
        assert_eq!(
            nanos_to_millis(1_678_000_000_123_456_789),
            1_678_000_000_123
        );
    }

    #[test]
    fn test_round_to_half_even() {
        assert_eq!(round_to(2.5, 0), 2.0);
        assert_eq!(round_to(3.5, 0), 4.0);
        assert_eq!(round_to(0.125, 2), 0.12);
    }

    proptest! {
        #[test]
        fn prop_normalize_converts_every_cell(
            samples in proptest::collection::vec((0i64..1_000_000_000, 1i64..100, -1.0f64..1.0, 0.0f64..2.0e7), 0..40)
        ) {
            let raw = MeasurementTable::new(vec![
                Column::new("Timestamp UTC", ColumnData::Int(samples.iter().map(|s| s.0).collect())),
                Column::new("autoCounter", ColumnData::Int(samples.iter().map(|s| s.1).collect())),
                Column::new("i_POS1_cal [m]", ColumnData::Float(samples.iter().map(|s| s.2).collect())),
                Column::new("i_PS1_filt [Pa]", ColumnData::Float(samples.iter().map(|s| s.3).collect())),
            ]).unwrap();
            let rules: NormalizationRules = toml::from_str(
                r#"
                rename = [
                    { from = "i_POS1_cal [m]", to = "position" },
                    { from = "i_PS1_filt [Pa]", to = "pressure PS1" },
                ]
                types = [{ column = "autoCounter", dtype = "int16" }]
                units = [
                    { column = "Timestamp UTC", conversion = { kind = "nanos_to_millis" } },
                    { column = "position", conversion = { kind = "scale", factor = 1000.0 } },
                    { column = "pressure PS1", conversion = { kind = "scale", factor = 1e-5, decimals = 4 } },
                ]
                "#,
            ).unwrap();

            let first = normalize(&raw, &rules).unwrap();
            let second = normalize(&raw, &rules).unwrap();
            prop_assert_eq!(&first, &second);
            prop_assert_eq!(first.row_count(), raw.row_count());

            let ts = &first.column("Timestamp UTC").unwrap().data;
            let counter = &first.column("autoCounter").unwrap().data;
            let position = &first.column("position").unwrap().data;
            let pressure = &first.column("pressure PS1").unwrap().data;
            prop_assert_eq!(counter.dtype(), "int16");
            for (row, &(ns, cycle, meters, pascals)) in samples.iter().enumerate() {
                let ms = ts.integer_at(row).unwrap();
                prop_assert!((ms * 1_000_000 - ns).abs() <= 500_000);
                prop_assert_eq!(counter.integer_at(row), Some(cycle));

                prop_assert_eq!(position.float_at(row), meters * 1000.0);

                let bar = pressure.float_at(row);
                prop_assert!((bar - pascals * 1e-5).abs() <= 0.5e-4 + 1e-9);
                let scaled = bar * 1e4;
                prop_assert!((scaled - scaled.round()).abs() < 1e-6);
            }
        }
    }
}
