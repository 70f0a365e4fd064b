use anyhow::{ensure, Result};

use crate::{Device, ModelArtifact, ModelSpec, Tensor};

/// Something that can load an ONNX artifact and execute it.
pub trait Engine {
    type Model: EngineModel;

    fn load(&self, artifact: &ModelArtifact, device: Device) -> Result<Self::Model>;
}

pub trait EngineModel {
    fn spec(&self) -> &ModelSpec;

    /// One tensor per declared input, in declaration order.
    fn infer(&mut self, inputs: Vec<Tensor>) -> Result<Vec<Tensor>>;
}

/// Checks count, dtype and static shape of `inputs` against `spec`.
pub fn check_inputs(spec: &ModelSpec, inputs: &[Tensor]) -> Result<()> {
    ensure!(
        inputs.len() == spec.inputs.len(),
        "expected {} inputs, got {}",
        spec.inputs.len(),
        inputs.len()
    );
    for (declared, given) in spec.inputs.iter().zip(inputs) {
        ensure!(
            declared.dtype == given.desc.dtype,
            "input `{}` expects {:?}, got {:?}",
            declared.name,
            declared.dtype,
            given.desc.dtype
        );
        ensure!(
            declared.shape == given.desc.shape,
            "input `{}` expects shape {:?}, got {:?}",
            declared.name,
            declared.shape.dims(),
            given.desc.shape.dims()
        );
    }
    Ok(())
}
