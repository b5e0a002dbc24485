mod common;
use common::{decode_f32, decode_i64, read_safetensors, tone, write_recording, AK_SREP};
use eegtrial::{write_dataset, ConditionProfile, PipelineConfig, StWriter, TrialDataset};
use ndarray::Array3;

#[test]
fn dataset_file_has_expected_tensors() {
    let dir = tempfile::tempdir().unwrap();
    let root = dir.path().join("data");
    write_recording(
        &root.join("s1").join("r.csv"),
        &AK_SREP, 1600, &[(10, 5), (100, 21), (700, 1), (800, 21), (1500, 2)], tone,
    );
    let profile = ConditionProfile::from_tags("AK-SREP", "reading").unwrap();
    let cfg = PipelineConfig { target_samples: 600, ..PipelineConfig::default() };
    let ds = TrialDataset::build(&root, &profile, &cfg).unwrap();

    let out = dir.path().join("dataset.safetensors");
    write_dataset(&ds, &out).unwrap();
    let tensors = read_safetensors(&out);

    let (dtype, shape, raw) = &tensors["features"];
    assert_eq!(dtype, "F32");
    assert_eq!(shape, &vec![2, 12, 300]);
    let features = decode_f32(raw);
    let item = ds.get(1).unwrap();
    assert_eq!(&features[12 * 300..], item.features.as_slice().unwrap());

    let (dtype, shape, raw) = &tensors["adjacency"];
    assert_eq!(dtype, "F32");
    assert_eq!(shape, &vec![2, 12, 12]);
    assert_eq!(&decode_f32(raw)[144..], item.adjacency.as_slice().unwrap());

    let (dtype, shape, raw) = &tensors["labels"];
    assert_eq!(dtype, "I64");
    assert_eq!(shape, &vec![2]);
    assert_eq!(decode_i64(raw), vec![4, 0]);

    let (dtype, _, raw) = &tensors["n_trials"];
    assert_eq!(dtype, "I32");
    assert_eq!(i32::from_le_bytes(raw[..4].try_into().unwrap()), 2);
}

#[test]
fn header_is_eight_byte_aligned() {
    let dir = tempfile::tempdir().unwrap();
    let out = dir.path().join("x.safetensors");
    let mut w = StWriter::new();
    w.add_f32_arr3("a", Array3::<f64>::ones((1, 2, 3)).view());
    w.add_i64("b", &[7], &[1]);
    w.write(&out).unwrap();

    let bytes = std::fs::read(&out).unwrap();
    let n = u64::from_le_bytes(bytes[..8].try_into().unwrap()) as usize;
    assert_eq!(n % 8, 0);
    assert_eq!(bytes.len(), 8 + n + 6 * 4 + 8);

    let tensors = read_safetensors(&out);
    assert_eq!(decode_f32(&tensors["a"].2), vec![1.0; 6]);
    assert_eq!(decode_i64(&tensors["b"].2), vec![7]);
}

#[test]
fn unwritable_path_reports_the_path() {
    let dir = tempfile::tempdir().unwrap();
    let out = dir.path().join("missing").join("x.safetensors");
    let err = StWriter::new().write(&out).unwrap_err();
    assert!(err.to_string().contains("missing"), "{err}");
}
