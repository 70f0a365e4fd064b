use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use bytes::Bytes;
use tempfile::NamedTempFile;

use crate::ModelDescriptor;

pub const FIXTURE_FILE_NAME: &str = "identity_v8.onnx";

#[derive(Clone, Debug)]
pub enum ModelArtifact {
    OnnxPath(PathBuf),
    OnnxBytes(Bytes),
}

impl ModelArtifact {
    pub fn read_bytes(&self) -> Result<Bytes> {
        match self {
            ModelArtifact::OnnxPath(path) => {
                let bytes = std::fs::read(path)
                    .with_context(|| format!("failed to read {}", path.display()))?;
                Ok(Bytes::from(bytes))
            }
            ModelArtifact::OnnxBytes(bytes) => Ok(bytes.clone()),
        }
    }
}

#[derive(Clone, Debug)]
pub struct WrittenModel {
    pub path: PathBuf,
    pub byte_len: usize,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ModelSummary {
    pub graph_name: String,
    pub nodes: usize,
    pub inputs: usize,
    pub outputs: usize,
    pub ir_version: i64,
    pub opset_version: i64,
}

impl From<&ModelDescriptor> for ModelSummary {
    fn from(model: &ModelDescriptor) -> Self {
        Self {
            graph_name: model.graph.name.clone(),
            nodes: model.graph.nodes.len(),
            inputs: model.graph.inputs.len(),
            outputs: model.graph.outputs.len(),
            ir_version: model.metadata.ir_version,
            opset_version: model.metadata.opset_version,
        }
    }
}

pub fn encode(model: &ModelDescriptor) -> Result<Vec<u8>> {
    let proto = model.to_proto()?;
    let bytes = fixture_proto::encode_model(&proto);
    tracing::debug!(byte_len = bytes.len(), graph = %model.graph.name, "encoded model");
    Ok(bytes)
}

pub fn decode(bytes: &[u8]) -> Result<ModelDescriptor> {
    let proto = fixture_proto::decode_model(bytes).context("not an ONNX model")?;
    Ok(ModelDescriptor::from_proto(&proto)?)
}

/// Encodes fully before touching the filesystem, then replaces `path`
/// atomically. An existing file is either left intact or fully replaced.
pub fn write_model(model: &ModelDescriptor, path: &Path) -> Result<WrittenModel> {
    let bytes = encode(model)?;
    replace_file(path, |file| file.write_all(&bytes))?;
    tracing::info!(path = %path.display(), byte_len = bytes.len(), "wrote model");

    Ok(WrittenModel {
        path: path.to_path_buf(),
        byte_len: bytes.len(),
    })
}

/// Fills a temp file next to `path` with `fill`, syncs it, then renames it
/// over `path`. The temp file is removed if any step fails.
fn replace_file<F>(path: &Path, fill: F) -> Result<()>
where
    F: FnOnce(&mut File) -> std::io::Result<()>,
{
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    let write_err = || format!("failed to write {}", path.display());

    let mut tmp = NamedTempFile::new_in(dir).with_context(write_err)?;
    fill(tmp.as_file_mut()).with_context(write_err)?;
    tmp.as_file().sync_all().with_context(write_err)?;
    tmp.persist(path)
        .map_err(|e| e.error)
        .with_context(write_err)?;
    Ok(())
}

pub fn read_model(path: &Path) -> Result<ModelDescriptor> {
    let bytes = ModelArtifact::OnnxPath(path.to_path_buf()).read_bytes()?;
    decode(&bytes).with_context(|| format!("failed to load {}", path.display()))
}

/// Writes the identity fixture as `identity_v8.onnx` inside `dir`.
pub fn run_fixture(dir: &Path) -> Result<WrittenModel> {
    let model = ModelDescriptor::identity_fixture();
    write_model(&model, &dir.join(FIXTURE_FILE_NAME))
}
