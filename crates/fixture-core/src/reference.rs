//! Pure-Rust interpreter for small graphs. Knows only `Identity`, which is
//! all the fixture needs to prove that a written file runs.

use std::collections::HashMap;

use anyhow::{bail, Context, Result};

use crate::{
    artifact, check_inputs, Device, Engine, EngineModel, ModelArtifact, ModelDescriptor,
    ModelSpec, OpKind, Tensor,
};

#[derive(Default)]
pub struct ReferenceEngine;

impl ReferenceEngine {
    pub fn new() -> Self {
        Self
    }
}

pub struct ReferenceModel {
    descriptor: ModelDescriptor,
    spec: ModelSpec,
}

impl Engine for ReferenceEngine {
    type Model = ReferenceModel;

    fn load(&self, artifact: &ModelArtifact, device: Device) -> Result<Self::Model> {
        if device != Device::Cpu {
            bail!("reference engine only runs on cpu");
        }
        let bytes = artifact.read_bytes()?;
        let descriptor = artifact::decode(&bytes)?;
        descriptor.validate()?;

        for node in &descriptor.graph.nodes {
            if let OpKind::Other(op) = &node.kind {
                bail!("reference engine does not implement `{op}`");
            }
        }

        let spec = ModelSpec {
            inputs: descriptor.graph.inputs.clone(),
            outputs: descriptor.graph.outputs.clone(),
        };
        tracing::debug!(graph = %descriptor.graph.name, nodes = descriptor.graph.nodes.len(), "reference model loaded");

        Ok(ReferenceModel { descriptor, spec })
    }
}

impl EngineModel for ReferenceModel {
    fn spec(&self) -> &ModelSpec {
        &self.spec
    }

    fn infer(&mut self, inputs: Vec<Tensor>) -> Result<Vec<Tensor>> {
        check_inputs(&self.spec, &inputs)?;

        let graph = &self.descriptor.graph;
        let mut values: HashMap<&str, Tensor> = graph
            .inputs
            .iter()
            .map(|spec| spec.name.as_str())
            .zip(inputs)
            .collect();

        // Validation guarantees nodes are in topological order.
        for node in &graph.nodes {
            match node.kind {
                OpKind::Identity => {
                    let (Some(src), Some(dst)) = (node.inputs.first(), node.outputs.first())
                    else {
                        bail!("Identity takes exactly one input and one output");
                    };
                    let value = values
                        .get(src.as_str())
                        .cloned()
                        .with_context(|| format!("value `{src}` not computed"))?;
                    values.insert(dst.as_str(), value);
                }
                OpKind::Other(ref op) => bail!("unsupported op `{op}`"),
            }
        }

        graph
            .outputs
            .iter()
            .map(|spec| {
                values
                    .remove(spec.name.as_str())
                    .with_context(|| format!("output `{}` not computed", spec.name))
            })
            .collect()
    }
}
