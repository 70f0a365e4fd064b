//! ONNX Runtime engine. Only f32 tensors with static shapes are accepted,
//! which covers the identity fixture and nothing broader.

use anyhow::{bail, ensure, Context, Result};
use fixture_core::{
    check_inputs, DType, Device, Engine, EngineModel, IOName, ModelArtifact, ModelSpec, Shape,
    Tensor, TensorSpec,
};
use ort::{
    session::{builder::SessionBuilder, Session, SessionInputValue},
    tensor::TensorElementType,
    value::ValueType,
};

#[derive(Default)]
pub struct OrtEngine;

impl OrtEngine {
    pub fn new() -> Self {
        Self
    }
}

pub struct OrtModel {
    spec: ModelSpec,
    session: Session,
}

impl Engine for OrtEngine {
    type Model = OrtModel;

    fn load(&self, artifact: &ModelArtifact, device: Device) -> Result<Self::Model> {
        let builder = Session::builder()
            .context("failed to create ORT session builder")?
            .with_optimization_level(ort::session::builder::GraphOptimizationLevel::Level3)
            .context("failed to configure ORT session builder")?;
        let builder = with_device(builder, &device)?;

        let session = match artifact {
            ModelArtifact::OnnxPath(path) => builder
                .commit_from_file(path)
                .with_context(|| format!("failed to load ONNX model {}", path.display()))?,
            ModelArtifact::OnnxBytes(bytes) => builder
                .commit_from_memory(bytes.as_ref())
                .context("failed to load ONNX model from memory")?,
        };

        let inputs = session
            .inputs
            .iter()
            .map(|input| static_f32_spec(&input.name, &input.input_type))
            .collect::<Result<Vec<_>>>()?;
        let outputs = session
            .outputs
            .iter()
            .map(|output| static_f32_spec(&output.name, &output.output_type))
            .collect::<Result<Vec<_>>>()?;
        tracing::debug!(
            inputs = inputs.len(),
            outputs = outputs.len(),
            "onnxruntime session ready"
        );

        Ok(OrtModel {
            spec: ModelSpec { inputs, outputs },
            session,
        })
    }
}

impl EngineModel for OrtModel {
    fn spec(&self) -> &ModelSpec {
        &self.spec
    }

    fn infer(&mut self, inputs: Vec<Tensor>) -> Result<Vec<Tensor>> {
        check_inputs(&self.spec, &inputs)?;

        let mut feeds = Vec::with_capacity(inputs.len());
        for (declared, input) in self.spec.inputs.iter().zip(&inputs) {
            let data = input.to_f32_vec()?;
            let shape = input.desc.shape.dims().to_vec();
            let value = ort::value::Tensor::from_array((shape, data))?.into_dyn();
            feeds.push((declared.name.0.clone(), SessionInputValue::from(value)));
        }

        let outputs = self.session.run(feeds)?;
        let mut results = Vec::with_capacity(outputs.len());
        for (name, value) in outputs.iter() {
            let array = value
                .try_extract_array::<f32>()
                .with_context(|| format!("output `{name}` is not an f32 tensor"))?;
            let dims = array.shape().to_vec();
            let data: Vec<f32> = array.iter().copied().collect();
            results.push(Tensor::from_f32(Shape::from_slice(&dims), &data)?);
        }

        Ok(results)
    }
}

fn with_device(builder: SessionBuilder, device: &Device) -> Result<SessionBuilder> {
    match device {
        Device::Cpu => Ok(builder),
        #[cfg(feature = "cuda")]
        Device::Cuda { device_id } => {
            use ort::execution_providers::cuda::CUDAExecutionProvider;
            let ep = CUDAExecutionProvider::default()
                .with_device_id(*device_id as i32)
                .build();
            builder
                .with_execution_providers([ep])
                .context("failed to enable ORT CUDA execution provider")
        }
        #[cfg(not(feature = "cuda"))]
        Device::Cuda { .. } => {
            bail!("CUDA requested but fixture-backend-ort was built without the `cuda` feature")
        }
    }
}

/// Symbolic (`-1`) dimensions are refused rather than guessed; the signature
/// must match what `check_inputs` compares against.
fn static_f32_spec(name: &str, value_type: &ValueType) -> Result<TensorSpec> {
    let ValueType::Tensor { ty, shape, .. } = value_type else {
        bail!("value `{name}` is not a tensor");
    };
    ensure!(
        *ty == TensorElementType::Float32,
        "value `{name}` has element type {ty}, only f32 is supported"
    );
    ensure!(
        shape.iter().all(|d| *d >= 0),
        "value `{name}` has a dynamic dimension"
    );

    let dims: Vec<usize> = shape.iter().map(|d| *d as usize).collect();
    Ok(TensorSpec {
        name: IOName(name.to_string()),
        dtype: DType::F32,
        shape: Shape::from_slice(&dims),
    })
}
