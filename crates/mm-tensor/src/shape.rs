use std::fmt;

/// A tensor shape, wrapping a vector of dimension sizes in row-major order.
///
/// An empty shape is a scalar (rank 0), which only ever appears as the
/// output of a vector dot product.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct Shape {
    dims: Vec<usize>,
}

impl Shape {
    /// Create a new shape from a vector of dimensions.
    pub fn new(dims: Vec<usize>) -> Self {
        Shape { dims }
    }

    /// Create a shape from a slice of dimensions.
    pub fn from_slice(dims: &[usize]) -> Self {
        Shape {
            dims: dims.to_vec(),
        }
    }

    /// The rank-0 shape `()`.
    pub fn scalar() -> Self {
        Shape { dims: Vec::new() }
    }

    /// Number of dimensions (rank).
    pub fn ndim(&self) -> usize {
        self.dims.len()
    }

    /// Total number of elements (product of all dimension sizes).
    pub fn numel(&self) -> usize {
        self.dims.iter().product()
    }

    /// Returns the size of dimension `i`.
    ///
    /// # Panics
    /// Panics if `i >= ndim()`.
    pub fn dim(&self, i: usize) -> usize {
        self.dims[i]
    }

    /// Returns the size of the dimension `i` places from the end, so
    /// `dim_from_end(1)` is the last axis.
    ///
    /// # Panics
    /// Panics if `i == 0` or `i > ndim()`.
    pub fn dim_from_end(&self, i: usize) -> usize {
        self.dims[self.dims.len() - i]
    }

    /// Returns a reference to the underlying dimension sizes.
    pub fn dims(&self) -> &[usize] {
        &self.dims
    }

    /// Product of the non-zero dimensions, or `None` if it overflows `usize`.
    ///
    /// When this is `Some`, `numel()` and the product of any run of axes are
    /// representable too.
    pub fn checked_extent(&self) -> Option<usize> {
        self.dims
            .iter()
            .filter(|&&d| d != 0)
            .try_fold(1usize, |acc, &d| acc.checked_mul(d))
    }
}

impl fmt::Display for Shape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[")?;
        for (i, d) in self.dims.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}", d)?;
        }
        write!(f, "]")
    }
}

impl From<Vec<usize>> for Shape {
    fn from(dims: Vec<usize>) -> Self {
        Shape::new(dims)
    }
}

impl From<&[usize]> for Shape {
    fn from(dims: &[usize]) -> Self {
        Shape::from_slice(dims)
    }
}

impl<const N: usize> From<[usize; N]> for Shape {
    fn from(dims: [usize; N]) -> Self {
        Shape::new(dims.to_vec())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_basic_shape() {
        let s = Shape::new(vec![2, 3, 4]);
        assert_eq!(s.ndim(), 3);
        assert_eq!(s.numel(), 24);
        assert_eq!(s.dim(0), 2);
        assert_eq!(s.dim_from_end(1), 4);
        assert_eq!(s.dim_from_end(2), 3);
    }

    #[test]
    fn test_checked_extent() {
        assert_eq!(Shape::from([2, 3, 4]).checked_extent(), Some(24));
        assert_eq!(Shape::from([0, 3, 4]).checked_extent(), Some(12));
        assert_eq!(Shape::from([1 << 62, 4, 4]).checked_extent(), None);
        assert_eq!(Shape::scalar().checked_extent(), Some(1));
    }

    #[test]
    fn test_scalar_shape() {
        let s = Shape::scalar();
        assert_eq!(s.ndim(), 0);
        assert_eq!(s.numel(), 1); // product of empty = 1
        assert_eq!(s.to_string(), "[]");
    }

    #[test]
    fn test_zero_sized_dim() {
        let s = Shape::from([4, 0]);
        assert_eq!(s.numel(), 0);
    }

    #[test]
    fn test_display() {
        assert_eq!(Shape::from([2, 3, 5]).to_string(), "[2, 3, 5]");
    }
}
