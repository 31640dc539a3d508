//! Polars value helpers.
//!
//! The analytics API serves every cell as JSON text, so these helpers move
//! values between analytics strings and Polars columns.

use polars::prelude::*;

/// Renders a cell for display or export.
///
/// Nulls render as an empty string and whole floats without a fractional
/// part.
///
/// # Examples
///
/// ```
/// use polars::prelude::AnyValue;
/// use datim_common::any_to_string;
///
/// assert_eq!(any_to_string(AnyValue::Null), "");
/// assert_eq!(any_to_string(AnyValue::Float64(1234.0)), "1234");
/// assert_eq!(any_to_string(AnyValue::String("Nigeria")), "Nigeria");
/// ```
pub fn any_to_string(value: AnyValue<'_>) -> String {
    match value {
        AnyValue::Null => String::new(),
        AnyValue::Float32(v) => format_numeric(f64::from(v)),
        AnyValue::Float64(v) => format_numeric(v),
        other => other.str_value().into_owned(),
    }
}

/// Shortest text form of an analytics value; `-0` is printed as `0`.
///
/// ```
/// use datim_common::format_numeric;
///
/// assert_eq!(format_numeric(1234.0), "1234");
/// assert_eq!(format_numeric(0.25), "0.25");
/// assert_eq!(format_numeric(-0.0), "0");
/// ```
pub fn format_numeric(v: f64) -> String {
    if v == 0.0 {
        return "0".to_string();
    }
    v.to_string()
}

/// Parses an analytics value cell.
///
/// Blank cells, placeholders such as `"N/A"`, and non-finite numbers yield
/// `None`.
pub fn parse_f64(value: &str) -> Option<f64> {
    match value.trim() {
        "" => None,
        trimmed => trimmed.parse::<f64>().ok().filter(|v| v.is_finite()),
    }
}

/// Nullable text column.
pub fn optional_string_column(name: &str, values: Vec<Option<String>>) -> Column {
    Series::new(name.into(), values).into_column()
}

/// Every row of `df` as display strings, in column order.
pub fn frame_to_rows(df: &DataFrame) -> PolarsResult<Vec<Vec<String>>> {
    (0..df.height())
        .map(|idx| {
            df.get_columns()
                .iter()
                .map(|column| column.get(idx).map(any_to_string))
                .collect()
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_any_to_string() {
        assert_eq!(any_to_string(AnyValue::Null), "");
        assert_eq!(any_to_string(AnyValue::Int64(-100)), "-100");
        assert_eq!(any_to_string(AnyValue::Float64(1.5)), "1.5");
        assert_eq!(any_to_string(AnyValue::Float64(40.0)), "40");
        assert_eq!(any_to_string(AnyValue::Boolean(true)), "true");
    }

    #[test]
    fn test_parse_f64() {
        assert_eq!(parse_f64("1234"), Some(1234.0));
        assert_eq!(parse_f64("  12.5 "), Some(12.5));
        assert_eq!(parse_f64(""), None);
        assert_eq!(parse_f64("   "), None);
        assert_eq!(parse_f64("N/A"), None);
        assert_eq!(parse_f64("NaN"), None);
        assert_eq!(parse_f64("inf"), None);
    }

    #[test]
    fn test_frame_to_rows() {
        let df = DataFrame::new(vec![
            optional_string_column("ou", vec![Some("Nigeria".to_string()), None]),
            Series::new("value".into(), vec![Some(10.0), Some(2.5)]).into_column(),
        ])
        .unwrap();

        let rows = frame_to_rows(&df).unwrap();
        assert_eq!(rows, vec![vec!["Nigeria", "10"], vec!["", "2.5"]]);
    }
}
