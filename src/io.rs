//! Safetensors output for conditioned datasets and pipeline intermediates.
//!
//! Layout: 8-byte little-endian header length, JSON header padded with
//! spaces to a multiple of 8, then the raw little-endian tensor bytes in
//! insertion order.
use ndarray::{ArrayView3, Axis};
use std::io::Write;
use std::path::Path;

use crate::dataset::TrialDataset;
use crate::error::{Error, Result};
use crate::graph::AdjacencyFn;

/// Simple safetensors file writer for F32, I32 and I64 tensors.
///
/// Usage:
/// ```rust,no_run
/// use eegtrial::io::StWriter;
/// use std::path::Path;
/// let mut w = StWriter::new();
/// w.add_f32("signal", &[1.0f32, 2.0, 3.0], &[1, 3]);
/// w.add_i64("labels", &[0, 2, 1], &[3]);
/// w.write(Path::new("/tmp/out.safetensors")).unwrap();
/// ```
#[derive(Default)]
pub struct StWriter {
    entries: Vec<(String, Vec<u8>, &'static str, Vec<usize>)>,
}

impl StWriter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_f32(&mut self, name: &str, data: &[f32], shape: &[usize]) {
        let bytes: Vec<u8> = data.iter().flat_map(|v| v.to_le_bytes()).collect();
        self.entries.push((name.to_string(), bytes, "F32", shape.to_vec()));
    }

    /// Store a `[N, C, T]` batch, cast to `f32`.
    pub fn add_f32_arr3(&mut self, name: &str, arr: ArrayView3<'_, f64>) {
        let data: Vec<f32> = arr.iter().map(|&v| v as f32).collect();
        let (n, c, t) = arr.dim();
        self.add_f32(name, &data, &[n, c, t]);
    }

    pub fn add_i32(&mut self, name: &str, data: &[i32], shape: &[usize]) {
        let bytes: Vec<u8> = data.iter().flat_map(|v| v.to_le_bytes()).collect();
        self.entries.push((name.to_string(), bytes, "I32", shape.to_vec()));
    }

    pub fn add_i64(&mut self, name: &str, data: &[i64], shape: &[usize]) {
        let bytes: Vec<u8> = data.iter().flat_map(|v| v.to_le_bytes()).collect();
        self.entries.push((name.to_string(), bytes, "I64", shape.to_vec()));
    }

    pub fn write(&self, path: &Path) -> Result<()> {
        let mut header_map = serde_json::Map::new();
        let mut offset: usize = 0;
        for (name, data, dtype, shape) in &self.entries {
            header_map.insert(name.clone(), serde_json::json!({
                "dtype": dtype,
                "shape": shape,
                "data_offsets": [offset, offset + data.len()],
            }));
            offset += data.len();
        }
        let hdr_bytes = serde_json::to_vec(&header_map)?;
        let pad = (8 - hdr_bytes.len() % 8) % 8;
        let padded: Vec<u8> = hdr_bytes.into_iter()
            .chain(std::iter::repeat(b' ').take(pad))
            .collect();

        let io_err = |e| Error::io(path, e);
        let mut f = std::fs::File::create(path).map_err(io_err)?;
        f.write_all(&(padded.len() as u64).to_le_bytes()).map_err(io_err)?;
        f.write_all(&padded).map_err(io_err)?;
        for (_, data, _, _) in &self.entries {
            f.write_all(data).map_err(io_err)?;
        }
        Ok(())
    }
}

/// Write a conditioned dataset to `path`.
///
/// Keys:
///   features    [N, C, T']  F32
///   adjacency   [N, C, C]   F32
///   labels      [N]         I64   zero-based (raw code − 1)
///   n_trials    [1]         I32
pub fn write_dataset<G: AdjacencyFn>(dataset: &TrialDataset<G>, path: &Path) -> Result<()> {
    let features = dataset.features();
    let (n, c, _) = features.dim();

    let mut adjacency: Vec<f32> = Vec::with_capacity(n * c * c);
    for trial in features.axis_iter(Axis(0)) {
        let graph = dataset.graph().adjacency(trial);
        adjacency.extend(graph.iter().map(|&v| v as f32));
    }
    let labels: Vec<i64> = dataset.labels().iter().map(|l| l - 1).collect();

    let mut w = StWriter::new();
    w.add_f32_arr3("features", features);
    w.add_f32("adjacency", &adjacency, &[n, c, c]);
    w.add_i64("labels", &labels, &[n]);
    w.add_i32("n_trials", &[n as i32], &[1]);
    w.write(path)?;

    tracing::info!(path = %path.display(), trials = n, "wrote dataset");
    Ok(())
}
