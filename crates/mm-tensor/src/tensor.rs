use crate::dispatch::MatmulDispatcher;
use crate::error::{MatmulError, Result};
use crate::plan::resolve;
use crate::shape::Shape;

/// An owned, contiguous, row-major f32 tensor.
///
/// This is the simplest collaborator for the resolver and dispatcher: it owns
/// its buffer, so it is always in the layout the dispatcher expects.
#[derive(Debug, Clone, PartialEq)]
pub struct Tensor {
    data: Vec<f32>,
    shape: Shape,
}

impl Tensor {
    /// Create a new tensor from f32 data and a shape.
    ///
    /// # Panics
    /// Panics if `data.len() != shape.numel()`.
    pub fn new(data: Vec<f32>, shape: impl Into<Shape>) -> Self {
        let shape = shape.into();
        assert_eq!(
            data.len(),
            shape.numel(),
            "data length {} does not match shape {} (numel={})",
            data.len(),
            shape,
            shape.numel()
        );
        Tensor { data, shape }
    }

    /// Fallible version of [`Tensor::new`].
    pub fn from_vec(data: Vec<f32>, shape: impl Into<Shape>) -> Result<Self> {
        let shape = shape.into();
        if data.len() != shape.numel() {
            return Err(MatmulError::BufferLength {
                expected: shape.numel(),
                got: data.len(),
            });
        }
        Ok(Tensor { data, shape })
    }

    /// Create a zero-filled tensor with the given shape.
    pub fn zeros(shape: impl Into<Shape>) -> Self {
        let shape = shape.into();
        Tensor {
            data: vec![0.0; shape.numel()],
            shape,
        }
    }

    /// Create a tensor filled with ones with the given shape.
    pub fn ones(shape: impl Into<Shape>) -> Self {
        let shape = shape.into();
        Tensor {
            data: vec![1.0; shape.numel()],
            shape,
        }
    }

    /// Returns a reference to the tensor's shape.
    pub fn shape(&self) -> &Shape {
        &self.shape
    }

    /// Returns the underlying row-major data.
    pub fn data(&self) -> &[f32] {
        &self.data
    }

    /// Reshape the tensor, returning a new tensor with the same data but
    /// a different shape.
    ///
    /// The total number of elements must remain the same.
    pub fn reshape(&self, new_shape: impl Into<Shape>) -> Result<Tensor> {
        let new_shape = new_shape.into();
        if self.shape.numel() != new_shape.numel() {
            return Err(MatmulError::BufferLength {
                expected: new_shape.numel(),
                got: self.shape.numel(),
            });
        }
        Ok(Tensor {
            data: self.data.clone(),
            shape: new_shape,
        })
    }

    /// Matrix product `self @ other` for rank 1-3 operands.
    ///
    /// The output shape is validated before anything is allocated; on error
    /// nothing is computed.
    pub fn matmul(&self, other: &Tensor, dispatcher: &MatmulDispatcher) -> Result<Tensor> {
        let plan = resolve(&self.shape, &other.shape)?;
        let mut out = Tensor::zeros(plan.out_shape.clone());
        dispatcher.dispatch(&plan, &self.data, &other.data, &mut out.data);
        Ok(out)
    }
}
