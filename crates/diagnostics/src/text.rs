//! Numeric Text Columns

use crate::DiagnosticsError;
use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::Path;

/// Format a value as `%.18e` with a signed, at least two-digit exponent
pub fn format_value(value: f64) -> String {
    if value.is_nan() {
        return "nan".to_string();
    }
    if value.is_infinite() {
        return if value > 0.0 { "inf" } else { "-inf" }.to_string();
    }

    let formatted = format!("{:.18e}", value);
    match formatted.split_once('e') {
        Some((mantissa, exponent)) => {
            let exponent: i32 = exponent.parse().unwrap_or(0);
            let sign = if exponent < 0 { '-' } else { '+' };
            format!("{}e{}{:02}", mantissa, sign, exponent.abs())
        }
        None => formatted,
    }
}

fn io_error(path: &Path, err: std::io::Error) -> DiagnosticsError {
    DiagnosticsError::Io {
        path: path.display().to_string(),
        message: err.to_string(),
    }
}

/// Write one value per line
pub fn write_column(path: &Path, values: impl IntoIterator<Item = f64>) -> Result<usize, DiagnosticsError> {
    let file = File::create(path).map_err(|e| io_error(path, e))?;
    let mut writer = BufWriter::new(file);
    let mut count = 0;
    for value in values {
        writeln!(writer, "{}", format_value(value)).map_err(|e| io_error(path, e))?;
        count += 1;
    }
    writer.flush().map_err(|e| io_error(path, e))?;
    Ok(count)
}

/// Read a whitespace/newline-separated numeric column
pub fn read_column(path: &Path) -> Result<Vec<f64>, DiagnosticsError> {
    let file = File::open(path).map_err(|e| io_error(path, e))?;
    let mut values = Vec::new();
    for (i, line) in BufReader::new(file).lines().enumerate() {
        let line = line.map_err(|e| io_error(path, e))?;
        for token in line.split_whitespace() {
            let value = token.parse::<f64>().map_err(|e| DiagnosticsError::Parse {
                path: path.display().to_string(),
                line: i + 1,
                message: e.to_string(),
            })?;
            values.push(value);
        }
    }
    Ok(values)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_format_matches_savetxt() {
        assert_eq!(format_value(2.0), "2.000000000000000000e+00");
        assert_eq!(format_value(-3.0), "-3.000000000000000000e+00");
        assert_eq!(format_value(0.0), "0.000000000000000000e+00");
        assert_eq!(format_value(0.125), "1.250000000000000000e-01");
        assert_eq!(format_value(1e22), "1.000000000000000000e+22");
        assert_eq!(format_value(f64::NAN), "nan");
        assert_eq!(format_value(f64::NEG_INFINITY), "-inf");
    }

    #[test]
    fn test_column_round_trip() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("column.txt");
        let values = vec![1.0, -0.25, 3.0e12, 7.0];

        assert_eq!(write_column(&path, values.iter().copied()).unwrap(), 4);
        assert_eq!(read_column(&path).unwrap(), values);
    }

    #[test]
    fn test_read_rejects_garbage() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("bad.txt");
        std::fs::write(&path, "1.0\nabc\n").unwrap();
        let err = read_column(&path).unwrap_err();
        assert!(matches!(err, DiagnosticsError::Parse { line: 2, .. }));
    }
}
