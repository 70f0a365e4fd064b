use std::collections::HashSet;
use std::fmt;

use crate::{check_compatible, DType, FormatError, Shape};

pub const FIXTURE_INPUT: &str = "input";
pub const FIXTURE_OUTPUT: &str = "output";
pub const FIXTURE_GRAPH_NAME: &str = "identity_model";
pub const FIXTURE_PRODUCER: &str = "onnx-example";
/// Pinned instead of taking library defaults; the consuming runtime
/// (ONNX Runtime 1.16) reads IR <= 9.
pub const FIXTURE_IR_VERSION: i64 = 8;
pub const FIXTURE_OPSET_VERSION: i64 = 13;

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct IOName(pub String);

impl IOName {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for IOName {
    fn from(name: &str) -> Self {
        Self(name.to_string())
    }
}

impl fmt::Display for IOName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TensorSpec {
    pub name: IOName,
    pub dtype: DType,
    pub shape: Shape,
}

impl TensorSpec {
    pub fn new(name: &str, dtype: DType, dims: &[usize]) -> Self {
        Self {
            name: name.into(),
            dtype,
            shape: Shape::from_slice(dims),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum OpKind {
    Identity,
    /// Any other `op_type`, kept verbatim when reading a model back.
    Other(String),
}

impl OpKind {
    pub fn from_op_type(op_type: &str) -> Self {
        match op_type {
            "Identity" => OpKind::Identity,
            other => OpKind::Other(other.to_string()),
        }
    }

    pub fn op_type(&self) -> &str {
        match self {
            OpKind::Identity => "Identity",
            OpKind::Other(op) => op,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct OperationNode {
    pub kind: OpKind,
    pub inputs: Vec<IOName>,
    pub outputs: Vec<IOName>,
}

impl OperationNode {
    pub fn identity(input: &str, output: &str) -> Self {
        Self {
            kind: OpKind::Identity,
            inputs: vec![input.into()],
            outputs: vec![output.into()],
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GraphSpec {
    pub name: String,
    pub nodes: Vec<OperationNode>,
    pub inputs: Vec<TensorSpec>,
    pub outputs: Vec<TensorSpec>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ModelMetadata {
    pub producer_name: String,
    pub ir_version: i64,
    /// Version of the default (`ai.onnx`) operator set.
    pub opset_version: i64,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ModelDescriptor {
    pub graph: GraphSpec,
    pub metadata: ModelMetadata,
}

impl ModelDescriptor {
    /// The single-node identity model: `input` (f32, [1]) -> Identity ->
    /// `output` (f32, [1]), IR 8, opset 13.
    pub fn identity_fixture() -> Self {
        let input = TensorSpec::new(FIXTURE_INPUT, DType::F32, &[1]);
        let output = TensorSpec::new(FIXTURE_OUTPUT, DType::F32, &[1]);
        let node = OperationNode::identity(FIXTURE_INPUT, FIXTURE_OUTPUT);

        Self {
            graph: GraphSpec {
                name: FIXTURE_GRAPH_NAME.to_string(),
                nodes: vec![node],
                inputs: vec![input],
                outputs: vec![output],
            },
            metadata: ModelMetadata {
                producer_name: FIXTURE_PRODUCER.to_string(),
                ir_version: FIXTURE_IR_VERSION,
                opset_version: FIXTURE_OPSET_VERSION,
            },
        }
    }

    pub fn validate(&self) -> Result<(), FormatError> {
        check_compatible(self.metadata.ir_version, self.metadata.opset_version)?;

        let graph = &self.graph;
        if graph.name.is_empty() {
            return Err(FormatError::EmptyGraphName);
        }

        // Every value (graph input or node output) is defined exactly once.
        let mut defined: HashSet<&str> = HashSet::new();
        for spec in &graph.inputs {
            define(&mut defined, spec.name.as_str())?;
        }

        for (idx, node) in graph.nodes.iter().enumerate() {
            for name in &node.inputs {
                if !defined.contains(name.as_str()) {
                    return Err(FormatError::UnresolvedInput {
                        node: idx,
                        name: name.0.clone(),
                    });
                }
            }
            for name in &node.outputs {
                define(&mut defined, name.as_str())?;
            }
        }

        let mut declared_outputs: HashSet<&str> = HashSet::new();
        for spec in &graph.outputs {
            let name = spec.name.as_str();
            if name.is_empty() {
                return Err(FormatError::EmptyValueName);
            }
            if !declared_outputs.insert(name) {
                return Err(FormatError::DuplicateName(name.to_string()));
            }
            if !defined.contains(name) {
                return Err(FormatError::UnproducedOutput(name.to_string()));
            }
        }

        Ok(())
    }
}

fn define<'a>(defined: &mut HashSet<&'a str>, name: &'a str) -> Result<(), FormatError> {
    if name.is_empty() {
        return Err(FormatError::EmptyValueName);
    }
    if !defined.insert(name) {
        return Err(FormatError::DuplicateName(name.to_string()));
    }
    Ok(())
}

/// Input/output signature of a loaded model, as reported by an engine.
#[derive(Clone, Debug)]
pub struct ModelSpec {
    pub inputs: Vec<TensorSpec>,
    pub outputs: Vec<TensorSpec>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fixture_literals() {
        let model = ModelDescriptor::identity_fixture();
        assert_eq!(model.graph.name, "identity_model");
        assert_eq!(model.graph.nodes.len(), 1);
        assert_eq!(model.graph.nodes[0].kind.op_type(), "Identity");
        assert_eq!(model.graph.nodes[0].inputs, vec![IOName::from("input")]);
        assert_eq!(model.graph.nodes[0].outputs, vec![IOName::from("output")]);
        assert_eq!(model.graph.inputs, vec![TensorSpec::new("input", DType::F32, &[1])]);
        assert_eq!(model.graph.outputs, vec![TensorSpec::new("output", DType::F32, &[1])]);
        assert_eq!(model.metadata.producer_name, "onnx-example");
        assert_eq!(model.metadata.ir_version, 8);
        assert_eq!(model.metadata.opset_version, 13);
        assert_eq!(model.validate(), Ok(()));
    }

    #[test]
    fn unresolved_node_input() {
        let mut model = ModelDescriptor::identity_fixture();
        model.graph.nodes[0].inputs = vec!["missing".into()];
        assert_eq!(
            model.validate(),
            Err(FormatError::UnresolvedInput {
                node: 0,
                name: "missing".to_string()
            })
        );
    }

    #[test]
    fn output_must_be_produced() {
        let mut model = ModelDescriptor::identity_fixture();
        model.graph.outputs[0].name = "other".into();
        assert_eq!(
            model.validate(),
            Err(FormatError::UnproducedOutput("other".to_string()))
        );
    }

    #[test]
    fn node_cannot_redefine_graph_input() {
        let mut model = ModelDescriptor::identity_fixture();
        model.graph.nodes[0].outputs = vec!["input".into()];
        assert_eq!(
            model.validate(),
            Err(FormatError::DuplicateName("input".to_string()))
        );
    }

    #[test]
    fn chained_identities_resolve() {
        let mut model = ModelDescriptor::identity_fixture();
        model.graph.nodes = vec![
            OperationNode::identity("input", "mid"),
            OperationNode::identity("mid", "output"),
        ];
        assert_eq!(model.validate(), Ok(()));
    }

    #[test]
    fn incompatible_versions_fail_validation() {
        let mut model = ModelDescriptor::identity_fixture();
        model.metadata.ir_version = 6;
        assert!(matches!(
            model.validate(),
            Err(FormatError::IncompatibleVersions { required: 7, .. })
        ));
    }

    #[test]
    fn unknown_op_type_is_preserved() {
        let kind = OpKind::from_op_type("Relu");
        assert_eq!(kind, OpKind::Other("Relu".to_string()));
        assert_eq!(kind.op_type(), "Relu");
        assert_eq!(OpKind::from_op_type("Identity"), OpKind::Identity);
    }
}
