pub mod onnx;

use prost::Message;

pub use prost::DecodeError;

/// Canonical protobuf encoding of a model. Fields are emitted in tag order,
/// so equal models always produce identical bytes.
pub fn encode_model(model: &onnx::ModelProto) -> Vec<u8> {
    model.encode_to_vec()
}

pub fn decode_model(bytes: &[u8]) -> Result<onnx::ModelProto, DecodeError> {
    onnx::ModelProto::decode(bytes)
}
