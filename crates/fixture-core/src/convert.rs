use fixture_proto::onnx::{
    tensor_shape_proto::{dimension, Dimension},
    type_proto, GraphProto, ModelProto, NodeProto, OperatorSetIdProto, TensorShapeProto,
    TypeProto, ValueInfoProto,
};

use crate::{
    DType, FormatError, GraphSpec, IOName, ModelDescriptor, ModelMetadata, OpKind,
    OperationNode, Shape, TensorSpec,
};

impl ModelDescriptor {
    /// Validates, then lowers to the ONNX message tree. Unset optional fields
    /// stay absent so the encoding carries only what the descriptor says.
    pub fn to_proto(&self) -> Result<ModelProto, FormatError> {
        self.validate()?;

        let graph = &self.graph;
        let graph_proto = GraphProto {
            node: graph.nodes.iter().map(node_to_proto).collect(),
            name: Some(graph.name.clone()),
            input: graph.inputs.iter().map(value_info_to_proto).collect(),
            output: graph.outputs.iter().map(value_info_to_proto).collect(),
            ..Default::default()
        };

        Ok(ModelProto {
            ir_version: Some(self.metadata.ir_version),
            producer_name: Some(self.metadata.producer_name.clone()),
            graph: Some(graph_proto),
            opset_import: vec![OperatorSetIdProto {
                domain: Some(String::new()),
                version: Some(self.metadata.opset_version),
            }],
            ..Default::default()
        })
    }

    pub fn from_proto(model: &ModelProto) -> Result<Self, FormatError> {
        let graph = model.graph.as_ref().ok_or(FormatError::Missing("graph"))?;
        let ir_version = model.ir_version.ok_or(FormatError::Missing("IR version"))?;
        let opset_version = model
            .opset_import
            .iter()
            .find(|op| op.domain.as_deref().unwrap_or("").is_empty())
            .and_then(|op| op.version)
            .ok_or(FormatError::Missing("default-domain opset import"))?;

        let nodes = graph
            .node
            .iter()
            .map(|node| OperationNode {
                kind: OpKind::from_op_type(node.op_type.as_deref().unwrap_or_default()),
                inputs: node.input.iter().map(|n| IOName(n.clone())).collect(),
                outputs: node.output.iter().map(|n| IOName(n.clone())).collect(),
            })
            .collect();

        let inputs = graph
            .input
            .iter()
            .map(tensor_spec_from_proto)
            .collect::<Result<Vec<_>, _>>()?;
        let outputs = graph
            .output
            .iter()
            .map(tensor_spec_from_proto)
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            graph: GraphSpec {
                name: graph.name.clone().unwrap_or_default(),
                nodes,
                inputs,
                outputs,
            },
            metadata: ModelMetadata {
                producer_name: model.producer_name.clone().unwrap_or_default(),
                ir_version,
                opset_version,
            },
        })
    }
}

fn node_to_proto(node: &OperationNode) -> NodeProto {
    NodeProto {
        input: node.inputs.iter().map(|n| n.0.clone()).collect(),
        output: node.outputs.iter().map(|n| n.0.clone()).collect(),
        op_type: Some(node.kind.op_type().to_string()),
        ..Default::default()
    }
}

fn value_info_to_proto(spec: &TensorSpec) -> ValueInfoProto {
    let dim = spec
        .shape
        .dims()
        .iter()
        .map(|d| Dimension {
            denotation: None,
            value: Some(dimension::Value::DimValue(*d as i64)),
        })
        .collect();

    ValueInfoProto {
        name: Some(spec.name.0.clone()),
        r#type: Some(TypeProto {
            denotation: None,
            value: Some(type_proto::Value::TensorType(type_proto::Tensor {
                elem_type: Some(spec.dtype.onnx_code()),
                shape: Some(TensorShapeProto { dim }),
            })),
        }),
        doc_string: None,
    }
}

fn tensor_spec_from_proto(info: &ValueInfoProto) -> Result<TensorSpec, FormatError> {
    let name = info.name.clone().unwrap_or_default();
    let Some(TypeProto {
        value: Some(type_proto::Value::TensorType(tensor)),
        ..
    }) = info.r#type.as_ref()
    else {
        return Err(FormatError::NotATensor(name));
    };

    let dtype = DType::from_onnx_code(tensor.elem_type.unwrap_or_default())?;
    let dims = tensor
        .shape
        .as_ref()
        .map(|shape| {
            shape
                .dim
                .iter()
                .map(|d| match &d.value {
                    Some(dimension::Value::DimValue(v)) if *v >= 0 => Ok(*v as usize),
                    _ => Err(FormatError::DynamicDimension(name.clone())),
                })
                .collect::<Result<Vec<_>, _>>()
        })
        .transpose()?
        .unwrap_or_default();

    Ok(TensorSpec {
        name: IOName(name),
        dtype,
        shape: Shape::from_slice(&dims),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fixture_lowers_to_single_node_graph() {
        let proto = ModelDescriptor::identity_fixture().to_proto().unwrap();
        assert_eq!(proto.ir_version, Some(8));
        assert_eq!(proto.producer_name.as_deref(), Some("onnx-example"));
        assert_eq!(proto.opset_import.len(), 1);
        assert_eq!(proto.opset_import[0].domain.as_deref(), Some(""));
        assert_eq!(proto.opset_import[0].version, Some(13));

        let graph = proto.graph.unwrap();
        assert_eq!(graph.name.as_deref(), Some("identity_model"));
        assert_eq!(graph.node.len(), 1);
        assert_eq!(graph.node[0].op_type.as_deref(), Some("Identity"));
        assert_eq!(graph.node[0].input, vec!["input".to_string()]);
        assert_eq!(graph.node[0].output, vec!["output".to_string()]);
        assert!(graph.node[0].name.is_none());
        assert!(graph.value_info.is_empty());
    }

    #[test]
    fn invalid_descriptor_is_not_lowered() {
        let mut model = ModelDescriptor::identity_fixture();
        model.metadata.opset_version = 99;
        assert_eq!(model.to_proto(), Err(FormatError::UnknownOpset(99)));
    }

    #[test]
    fn symbolic_dimension_is_rejected() {
        let mut proto = ModelDescriptor::identity_fixture().to_proto().unwrap();
        let graph = proto.graph.as_mut().unwrap();
        if let Some(TypeProto {
            value: Some(type_proto::Value::TensorType(t)),
            ..
        }) = graph.input[0].r#type.as_mut()
        {
            t.shape.as_mut().unwrap().dim[0].value =
                Some(dimension::Value::DimParam("batch".to_string()));
        }
        assert_eq!(
            ModelDescriptor::from_proto(&proto),
            Err(FormatError::DynamicDimension("input".to_string()))
        );
    }

    #[test]
    fn missing_graph_is_rejected() {
        let proto = ModelProto {
            ir_version: Some(8),
            ..Default::default()
        };
        assert_eq!(
            ModelDescriptor::from_proto(&proto),
            Err(FormatError::Missing("graph"))
        );
    }

    #[test]
    fn absent_domain_counts_as_default() {
        let mut proto = ModelDescriptor::identity_fixture().to_proto().unwrap();
        proto.opset_import[0].domain = None;
        let model = ModelDescriptor::from_proto(&proto).unwrap();
        assert_eq!(model.metadata.opset_version, 13);
    }
}
