use std::os::raw::c_void;

/// Status codes returned by all FFI functions.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MMStatus {
    Ok = 0,
    ErrorInvalidArgument = 1,
    ErrorRankOutOfRange = 2,
    ErrorSizeMismatch = 3,
    ErrorBatchSizeMismatch = 4,
    ErrorDTypeMismatch = 5,
    ErrorInternal = 6,
}

/// Element type tag of a caller-provided buffer. Only `F32` is accepted.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MMDType {
    F32 = 0,
    F64 = 1,
    F16 = 2,
    I32 = 3,
}

impl MMDType {
    pub fn name(&self) -> &'static str {
        match self {
            MMDType::F32 => "f32",
            MMDType::F64 => "f64",
            MMDType::F16 => "f16",
            MMDType::I32 => "i32",
        }
    }
}

/// A read-only operand: contiguous row-major data plus its shape.
#[repr(C)]
#[derive(Debug, Clone, Copy)]
pub struct MMArray {
    pub data: *const c_void,
    pub shape: *const usize,
    pub ndim: usize,
    pub dtype: MMDType,
}
