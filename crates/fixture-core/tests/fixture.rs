use anyhow::{Context, Result};
use fixture_core::{
    encode, read_model, run_fixture, DType, ModelSummary, OpKind, Shape, FIXTURE_FILE_NAME,
};

/// `identity_v8.onnx` as produced by the reference Python `onnx` helpers
/// (fields in tag order, explicit empty opset domain).
const EXPECTED_BYTES: &str = "0808120c6f6e6e782d6578616d706c653a560a190a05696e70757412066f7574707574\
22084964656e74697479120e6964656e746974795f6d6f64656c5a130a05696e707574120a0a080801\
12040a02080162140a066f7574707574120a0a08080112040a02080142040a00100d";

fn hex(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("{b:02x}")).collect()
}

#[test]
fn writes_non_empty_file_in_target_dir() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let written = run_fixture(dir.path())?;

    assert_eq!(written.path, dir.path().join("identity_v8.onnx"));
    let meta = std::fs::metadata(&written.path)?;
    assert!(meta.len() > 0);
    assert_eq!(meta.len() as usize, written.byte_len);
    Ok(())
}

#[test]
fn file_reads_back_as_single_identity_node() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let written = run_fixture(dir.path())?;
    let model = read_model(&written.path)?;

    let summary = ModelSummary::from(&model);
    assert_eq!(summary.nodes, 1);
    assert_eq!(summary.inputs, 1);
    assert_eq!(summary.outputs, 1);
    assert_eq!(summary.ir_version, 8);
    assert_eq!(summary.opset_version, 13);
    assert_eq!(summary.graph_name, "identity_model");

    assert_eq!(model.graph.nodes[0].kind, OpKind::Identity);
    for spec in model.graph.inputs.iter().chain(&model.graph.outputs) {
        assert_eq!(spec.dtype, DType::F32);
        assert_eq!(spec.shape, Shape::from_slice(&[1]));
    }
    assert_eq!(model.graph.inputs[0].name.as_str(), "input");
    assert_eq!(model.graph.outputs[0].name.as_str(), "output");
    assert_eq!(model.metadata.producer_name, "onnx-example");
    Ok(())
}

#[test]
fn only_one_opset_import_is_written() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let written = run_fixture(dir.path())?;
    let bytes = std::fs::read(&written.path)?;
    let proto = fixture_proto::decode_model(&bytes)?;

    assert_eq!(proto.opset_import.len(), 1);
    assert_eq!(proto.opset_import[0].version, Some(13));
    assert_eq!(proto.ir_version, Some(8));
    Ok(())
}

#[test]
fn encoding_matches_reference_bytes() -> Result<()> {
    let bytes = encode(&fixture_core::ModelDescriptor::identity_fixture())?;
    assert_eq!(hex(&bytes), EXPECTED_BYTES);
    Ok(())
}

#[test]
fn rerun_overwrites_with_identical_bytes() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let path = dir.path().join(FIXTURE_FILE_NAME);
    std::fs::write(&path, b"stale contents that are longer than nothing")?;

    let first = run_fixture(dir.path())?;
    let first_bytes = std::fs::read(&first.path)?;
    let second = run_fixture(dir.path())?;
    let second_bytes = std::fs::read(&second.path)?;

    assert_eq!(first_bytes, second_bytes);
    assert_eq!(hex(&first_bytes), EXPECTED_BYTES);

    let entries = std::fs::read_dir(dir.path())?
        .collect::<std::io::Result<Vec<_>>>()
        .context("failed to list output dir")?;
    assert_eq!(entries.len(), 1);
    Ok(())
}
