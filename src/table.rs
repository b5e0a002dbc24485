//! Recording tables: per-sample channel values plus one sparse marker column.
//!
//! The on-disk format is behind the [`TableReader`] trait.  [`CsvTableReader`]
//! reads a header row of channel names whose last column holds event markers:
//!
//! ```text
//! Fp1,Fp2,...,Pz,marker
//! 1.2e-5,3.4e-6,...,-2.0e-6,
//! 1.1e-5,3.3e-6,...,-2.1e-6,21
//! ```
use ndarray::{Array2, ArrayView1, Axis};
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};

/// One decoded recording file.
#[derive(Debug, Clone)]
pub struct RecordingTable {
    path: PathBuf,
    channels: Vec<String>,
    /// `[samples, channels]`
    data: Array2<f64>,
    markers: Vec<Option<i64>>,
}

impl RecordingTable {
    /// Build a table from already-decoded parts.
    ///
    /// `data` is sample-major (`[samples, channels]`); `markers` has one entry
    /// per sample.
    pub fn new(
        path: impl Into<PathBuf>,
        channels: Vec<String>,
        data: Array2<f64>,
        markers: Vec<Option<i64>>,
    ) -> Result<Self> {
        let path = path.into();
        if data.ncols() != channels.len() {
            return Err(Error::malformed(
                &path,
                format!("{} channel names for {} data columns", channels.len(), data.ncols()),
            ));
        }
        if data.nrows() != markers.len() {
            return Err(Error::malformed(
                &path,
                format!("{} marker rows for {} samples", markers.len(), data.nrows()),
            ));
        }
        Ok(Self { path, channels, data, markers })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn channels(&self) -> &[String] {
        &self.channels
    }

    pub fn n_samples(&self) -> usize {
        self.data.nrows()
    }

    pub fn markers(&self) -> &[Option<i64>] {
        &self.markers
    }

    /// Column index of `name`, first match wins.
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.channels.iter().position(|c| c == name)
    }

    /// All samples of one channel, looked up by name.
    pub fn channel(&self, name: &str) -> Result<ArrayView1<'_, f64>> {
        let idx = self.column_index(name).ok_or_else(|| Error::MissingChannel {
            path: self.path.clone(),
            channel: name.to_string(),
        })?;
        Ok(self.data.index_axis(Axis(1), idx))
    }
}

/// Loads one recording file into a [`RecordingTable`].
pub trait TableReader: Send + Sync {
    fn load(&self, path: &Path) -> Result<RecordingTable>;
}

/// CSV reader: header row of names, numeric channels, trailing marker column.
#[derive(Debug, Clone, Copy, Default)]
pub struct CsvTableReader;

impl TableReader for CsvTableReader {
    fn load(&self, path: &Path) -> Result<RecordingTable> {
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .trim(csv::Trim::All)
            .from_path(path)
            .map_err(|e| csv_error(path, e))?;

        let headers = reader.headers().map_err(|e| csv_error(path, e))?.clone();
        if headers.len() < 2 {
            return Err(Error::malformed(
                path,
                format!(
                    "expected at least one channel plus a marker column, found {} columns",
                    headers.len()
                ),
            ));
        }
        let n_ch = headers.len() - 1;
        let channels: Vec<String> = headers.iter().take(n_ch).map(String::from).collect();

        let mut values: Vec<f64> = Vec::new();
        let mut markers: Vec<Option<i64>> = Vec::new();
        for (row, record) in reader.records().enumerate() {
            let record = record.map_err(|e| csv_error(path, e))?;
            // Header is line 1.
            let line = row + 2;
            for (col, cell) in record.iter().take(n_ch).enumerate() {
                let name = &channels[col];
                let v: f64 = cell.parse().map_err(|_| {
                    Error::malformed(
                        path,
                        format!("line {line}: channel `{name}` has non-numeric value `{cell}`"),
                    )
                })?;
                // NaN or inf would smear across the whole trial in the filter.
                if !v.is_finite() {
                    return Err(Error::malformed(
                        path,
                        format!("line {line}: channel `{name}` value `{cell}` is not finite"),
                    ));
                }
                values.push(v);
            }
            markers.push(parse_marker(path, line, &record[n_ch])?);
        }

        if markers.is_empty() {
            return Err(Error::malformed(path, "no data rows"));
        }
        let data = Array2::from_shape_vec((markers.len(), n_ch), values)?;
        tracing::debug!(
            path = %path.display(),
            samples = data.nrows(),
            channels = n_ch,
            "loaded recording"
        );
        RecordingTable::new(path, channels, data, markers)
    }
}

/// Empty cells and NaN mean "no marker"; anything else must be an integer code.
fn parse_marker(path: &Path, line: usize, cell: &str) -> Result<Option<i64>> {
    if cell.is_empty() {
        return Ok(None);
    }
    let v: f64 = cell.parse().map_err(|_| {
        Error::malformed(path, format!("line {line}: marker `{cell}` is not numeric"))
    })?;
    if v.is_nan() {
        return Ok(None);
    }
    if !v.is_finite() || v.fract() != 0.0 {
        return Err(Error::malformed(
            path,
            format!("line {line}: marker `{cell}` is not an integer code"),
        ));
    }
    Ok(Some(v as i64))
}

fn csv_error(path: &Path, err: csv::Error) -> Error {
    let message = err.to_string();
    match err.into_kind() {
        csv::ErrorKind::Io(e) => Error::io(path, e),
        _ => Error::malformed(path, message),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_tmp(contents: &str) -> tempfile::NamedTempFile {
        let mut f = tempfile::NamedTempFile::new().unwrap();
        f.write_all(contents.as_bytes()).unwrap();
        f
    }

    #[test]
    fn reads_channels_and_sparse_markers() {
        let f = write_tmp("Fp1,Cz,marker\n1.0,2.0,\n3.0,4.0,21\n5.0,6.0,NaN\n7.0,8.0,4.0\n");
        let t = CsvTableReader.load(f.path()).unwrap();
        assert_eq!(t.channels(), &["Fp1".to_string(), "Cz".to_string()]);
        assert_eq!(t.n_samples(), 4);
        assert_eq!(t.markers(), &[None, Some(21), None, Some(4)]);
        assert_eq!(t.channel("Cz").unwrap().to_vec(), vec![2.0, 4.0, 6.0, 8.0]);
    }

    #[test]
    fn channel_lookup_is_by_name() {
        let f = write_tmp("A,B,marker\n1,10,\n2,20,\n");
        let t = CsvTableReader.load(f.path()).unwrap();
        assert_eq!(t.channel("B").unwrap().to_vec(), vec![10.0, 20.0]);
        assert!(matches!(t.channel("C"), Err(Error::MissingChannel { .. })));
    }

    #[test]
    fn non_numeric_channel_names_the_file() {
        let f = write_tmp("A,marker\nabc,\n");
        let err = CsvTableReader.load(f.path()).unwrap_err();
        assert!(matches!(err, Error::MalformedTable { .. }));
        assert!(err.to_string().contains(&f.path().display().to_string()));
    }

    #[test]
    fn non_finite_channel_values_are_rejected() {
        for bad in ["NaN", "inf", "-infinity"] {
            let f = write_tmp(&format!("A,B,marker\n1,2,\n3,{bad},21\n5,6,3\n"));
            let err = CsvTableReader.load(f.path()).unwrap_err();
            assert!(matches!(err, Error::MalformedTable { .. }), "{bad}: {err}");
            let msg = err.to_string();
            assert!(msg.contains(&f.path().display().to_string()), "{msg}");
            assert!(msg.contains("line 3") && msg.contains("`B`"), "{msg}");
        }
    }

    #[test]
    fn fractional_marker_is_rejected() {
        let f = write_tmp("A,marker\n1.0,2.5\n");
        assert!(CsvTableReader.load(f.path()).is_err());
    }

    #[test]
    fn ragged_rows_are_rejected() {
        let f = write_tmp("A,B,marker\n1,2,\n3,\n");
        let err = CsvTableReader.load(f.path()).unwrap_err();
        assert!(matches!(err, Error::MalformedTable { .. }));
        // Display text of the csv error, not its Debug dump.
        let msg = err.to_string();
        assert!(msg.contains("fields") && !msg.contains("UnequalLengths"), "{msg}");
    }

    #[test]
    fn header_only_is_rejected() {
        let f = write_tmp("A,marker\n");
        assert!(CsvTableReader.load(f.path()).is_err());
    }

    #[test]
    fn missing_file_is_io_error() {
        let err = CsvTableReader.load(Path::new("/nonexistent/rec.csv")).unwrap_err();
        assert!(matches!(err, Error::Io { .. }));
    }
}
