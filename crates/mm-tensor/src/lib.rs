//! `mm-tensor` - Matmul shape resolution and kernel dispatch for rank 1-3 f32 tensors.
//!
//! This crate provides:
//! - `resolve`, which validates two operand shapes and produces a `ResolvedPlan`
//! - `MatmulDispatcher`, which runs a plan on a naive kernel or a BLAS `sgemm`
//! - A `GemmKernel` trait for plugging in other BLAS providers
//! - `DispatchConfig` for the kernel-selection thresholds
//! - A minimal owned `Tensor` that drives the whole flow

pub mod backend;
pub mod config;
pub mod cpu;
pub mod dispatch;
pub mod error;
pub mod plan;
pub mod shape;
pub mod tensor;

// Re-export primary types at the crate root for convenience.
pub use backend::GemmKernel;
pub use config::DispatchConfig;
pub use cpu::{BlasGemm, NaiveGemm};
pub use dispatch::{Kernel, MatmulDispatcher};
pub use error::{MatmulError, Result};
pub use plan::{resolve, MatmulKind, ResolvedPlan};
pub use shape::Shape;
pub use tensor::Tensor;
