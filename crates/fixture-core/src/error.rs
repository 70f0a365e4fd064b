use thiserror::Error;

/// Structural or version problems that make a model unwritable or unreadable
/// as ONNX.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FormatError {
    #[error("graph name must not be empty")]
    EmptyGraphName,

    #[error("value name must not be empty")]
    EmptyValueName,

    #[error("duplicate value name `{0}`")]
    DuplicateName(String),

    #[error("node {node} consumes `{name}`, which is neither a graph input nor an earlier node output")]
    UnresolvedInput { node: usize, name: String },

    #[error("graph output `{0}` is not produced by any node")]
    UnproducedOutput(String),

    #[error("IR version {0} is not supported (expected 3..=11)")]
    UnsupportedIrVersion(i64),

    #[error("opset version {0} is unknown")]
    UnknownOpset(i64),

    #[error("opset {opset} requires IR version >= {required}, but the model declares IR version {ir_version}")]
    IncompatibleVersions {
        ir_version: i64,
        opset: i64,
        required: i64,
    },

    #[error("model has no {0}")]
    Missing(&'static str),

    #[error("value `{0}` is not a tensor")]
    NotATensor(String),

    #[error("value `{0}` has a symbolic or negative dimension")]
    DynamicDimension(String),

    #[error("unsupported element type code {0}")]
    UnsupportedElementType(i32),
}
