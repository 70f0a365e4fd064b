use anyhow::{bail, ensure, Result};
use bytes::Bytes;
use fixture_proto::onnx::tensor_proto::DataType;
use smallvec::SmallVec;

use crate::FormatError;

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Device {
    Cpu,
    Cuda { device_id: u32 },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum DType {
    F32,
    F16,
    F64,
    I64,
    I32,
    I8,
    U8,
    Bool,
}

impl DType {
    pub fn byte_size(self) -> usize {
        match self {
            DType::F64 | DType::I64 => 8,
            DType::F32 | DType::I32 => 4,
            DType::F16 => 2,
            DType::I8 | DType::U8 | DType::Bool => 1,
        }
    }

    pub fn onnx_code(self) -> i32 {
        let ty = match self {
            DType::F32 => DataType::Float,
            DType::F16 => DataType::Float16,
            DType::F64 => DataType::Double,
            DType::I64 => DataType::Int64,
            DType::I32 => DataType::Int32,
            DType::I8 => DataType::Int8,
            DType::U8 => DataType::Uint8,
            DType::Bool => DataType::Bool,
        };
        ty as i32
    }

    pub fn from_onnx_code(code: i32) -> Result<Self, FormatError> {
        match DataType::try_from(code) {
            Ok(DataType::Float) => Ok(DType::F32),
            Ok(DataType::Float16) => Ok(DType::F16),
            Ok(DataType::Double) => Ok(DType::F64),
            Ok(DataType::Int64) => Ok(DType::I64),
            Ok(DataType::Int32) => Ok(DType::I32),
            Ok(DataType::Int8) => Ok(DType::I8),
            Ok(DataType::Uint8) => Ok(DType::U8),
            Ok(DataType::Bool) => Ok(DType::Bool),
            _ => Err(FormatError::UnsupportedElementType(code)),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Shape(pub SmallVec<[usize; 6]>);

impl Shape {
    pub fn from_slice(d: &[usize]) -> Self {
        Self(d.iter().copied().collect())
    }
    pub fn dims(&self) -> &[usize] {
        &self.0
    }
    pub fn rank(&self) -> usize {
        self.0.len()
    }
    pub fn numel(&self) -> usize {
        self.0.iter().product::<usize>().max(1)
    }
}

#[derive(Clone, Debug)]
pub struct TensorDesc {
    pub dtype: DType,
    pub shape: Shape,
}

/// Dense host tensor. Element bytes are little-endian.
#[derive(Clone, Debug)]
pub struct Tensor {
    pub desc: TensorDesc,
    pub bytes: Bytes,
}

impl Tensor {
    pub fn from_cpu_bytes(dtype: DType, shape: Shape, bytes: Bytes) -> Result<Self> {
        let expected = shape.numel() * dtype.byte_size();
        ensure!(
            bytes.len() == expected,
            "tensor byte size mismatch: got {}, expected {}",
            bytes.len(),
            expected
        );
        Ok(Self {
            desc: TensorDesc { dtype, shape },
            bytes,
        })
    }

    pub fn from_f32(shape: Shape, data: &[f32]) -> Result<Self> {
        let bytes: Vec<u8> = data.iter().flat_map(|v| v.to_le_bytes()).collect();
        Self::from_cpu_bytes(DType::F32, shape, Bytes::from(bytes))
    }

    pub fn to_f32_vec(&self) -> Result<Vec<f32>> {
        if self.desc.dtype != DType::F32 {
            bail!("expected f32 tensor, got {:?}", self.desc.dtype);
        }
        Ok(self
            .bytes
            .chunks_exact(4)
            .map(|b| f32::from_le_bytes([b[0], b[1], b[2], b[3]]))
            .collect())
    }

    pub fn byte_len(&self) -> usize {
        self.bytes.len()
    }
}
