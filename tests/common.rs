/// Shared helpers: synthetic recordings on disk and safetensors inspection.
use std::collections::HashMap;
use std::fmt::Write as _;
use std::path::Path;

/// Electrode order of the AK-SREP montage.
#[allow(unused)]
pub const AK_SREP: [&str; 12] = [
    "F8", "FCz", "Fp1", "AF7", "AF3", "C1", "FC4", "F1", "Pz", "F2", "P5", "P6",
];

/// Deterministic multi-tone signal for channel `c` at sample `t` (1 kHz).
#[allow(unused)]
pub fn tone(c: usize, t: usize) -> f64 {
    let ts = t as f64 / 1000.0;
    let f1 = 3.0 + 2.5 * c as f64;
    let f2 = 60.0 + 7.0 * c as f64;
    (2.0 * std::f64::consts::PI * f1 * ts).sin()
        + 0.3 * (2.0 * std::f64::consts::PI * f2 * ts + c as f64).cos()
        + 0.05 * ((t * 7919 + c * 104_729) % 1000) as f64 / 1000.0
}

/// Write a CSV recording: one column per name, markers in a trailing column.
#[allow(unused)]
pub fn write_recording(
    path: &Path,
    channels: &[&str],
    n_samples: usize,
    markers: &[(usize, i64)],
    value: impl Fn(usize, usize) -> f64,
) {
    let mut out = String::new();
    out.push_str(&channels.join(","));
    out.push_str(",marker\n");
    for t in 0..n_samples {
        for c in 0..channels.len() {
            write!(out, "{},", value(c, t)).unwrap();
        }
        if let Some((_, code)) = markers.iter().find(|(s, _)| *s == t) {
            write!(out, "{code}").unwrap();
        }
        out.push('\n');
    }
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).unwrap();
    }
    std::fs::write(path, out).unwrap();
}

#[allow(unused)]
/// Header and raw tensor bytes of a safetensors file, keyed by tensor name.
pub fn read_safetensors(path: &Path) -> HashMap<String, (String, Vec<usize>, Vec<u8>)> {
    let bytes = std::fs::read(path)
        .unwrap_or_else(|_| panic!("safetensors file not found: {}", path.display()));

    let n = u64::from_le_bytes(bytes[..8].try_into().unwrap()) as usize;
    let header: serde_json::Value = serde_json::from_slice(&bytes[8..8 + n]).unwrap();
    let data_start = 8 + n;

    let mut out = HashMap::new();
    for (key, val) in header.as_object().unwrap() {
        let dtype = val["dtype"].as_str().unwrap().to_string();
        let offsets = val["data_offsets"].as_array().unwrap();
        let s = offsets[0].as_u64().unwrap() as usize;
        let e = offsets[1].as_u64().unwrap() as usize;
        let shape: Vec<usize> = val["shape"].as_array().unwrap()
            .iter().map(|v| v.as_u64().unwrap() as usize).collect();
        out.insert(key.clone(), (dtype, shape, bytes[data_start + s..data_start + e].to_vec()));
    }
    out
}

#[allow(unused)]
pub fn decode_i64(raw: &[u8]) -> Vec<i64> {
    raw.chunks_exact(8).map(|b| i64::from_le_bytes(b.try_into().unwrap())).collect()
}

#[allow(unused)]
pub fn decode_f32(raw: &[u8]) -> Vec<f32> {
    raw.chunks_exact(4).map(|b| f32::from_le_bytes(b.try_into().unwrap())).collect()
}
