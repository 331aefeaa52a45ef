use tracing::trace;

use crate::error::{MatmulError, Result};
use crate::shape::Shape;

/// Smallest and largest operand rank accepted by [`resolve`].
pub const MIN_RANK: usize = 1;
pub const MAX_RANK: usize = 3;

/// How the two operand ranks combine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MatmulKind {
    /// `(n,) @ (n,)` -> scalar.
    VectorDot,
    /// `(k,) @ (k, n)` -> `(n,)`.
    VectorMatrix,
    /// `(m, k) @ (k,)` -> `(m,)`.
    MatrixVector,
    /// Everything else: 2x2, and any pairing with a rank-3 operand.
    Batched,
}

/// The effective 2D multiply `C = A @ B` after rank collapsing, repeated
/// `batch` times.
///
/// Every batch reads `A` at `t * batch_stride_a`, `B` at `t * batch_stride_b`
/// and writes `C` at `t * batch_stride_c`. A batch stride of 0 means that
/// operand is shared by every batch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedPlan {
    pub kind: MatmulKind,
    pub out_shape: Shape,
    pub m: usize,
    pub n: usize,
    pub k: usize,
    pub lda: usize,
    pub ldb: usize,
    pub ldc: usize,
    pub batch: usize,
    pub batch_stride_a: usize,
    pub batch_stride_b: usize,
    pub batch_stride_c: usize,
}

impl ResolvedPlan {
    /// Number of f32 elements the output buffer must hold.
    pub fn out_len(&self) -> usize {
        self.out_shape.numel()
    }

    /// Minimum number of elements the `A` buffer must hold.
    pub fn required_a_len(&self) -> usize {
        Self::required_len(self.batch, self.batch_stride_a, self.m, self.k, self.lda)
    }

    /// Minimum number of elements the `B` buffer must hold.
    pub fn required_b_len(&self) -> usize {
        Self::required_len(self.batch, self.batch_stride_b, self.k, self.n, self.ldb)
    }

    fn required_len(batch: usize, batch_stride: usize, rows: usize, cols: usize, ld: usize) -> usize {
        if batch == 0 || rows == 0 || cols == 0 {
            return 0;
        }
        (batch - 1) * batch_stride + (rows - 1) * ld + cols
    }
}

/// Resolve the output shape of `a @ b` and the parameters of the multiply.
///
/// Ranks are checked before any shape arithmetic. Inner dimensions must
/// agree (`SizeMismatch`), and when both operands are rank 3 their batch
/// axes must agree too (`BatchSizeMismatch`). When the ranks differ, the
/// leading axes of the higher-rank operand become the output's and the
/// lower-rank operand is reused for every batch. Shapes whose element count
/// would overflow `usize` are rejected with `ShapeOverflow`.
pub fn resolve(a: &Shape, b: &Shape) -> Result<ResolvedPlan> {
    let (ra, rb) = (a.ndim(), b.ndim());
    if !(MIN_RANK..=MAX_RANK).contains(&ra) || !(MIN_RANK..=MAX_RANK).contains(&rb) {
        return Err(MatmulError::RankOutOfRange {
            rank_a: ra,
            rank_b: rb,
        });
    }

    check_extent(a)?;
    check_extent(b)?;

    let plan = match (ra, rb) {
        (1, 1) => vector_dot(a, b)?,
        (1, 2) => vector_matrix(a, b)?,
        (2, 1) => matrix_vector(a, b)?,
        _ => batched(a, b)?,
    };
    trace!(a = %a, b = %b, out = %plan.out_shape, kind = ?plan.kind, "resolved matmul plan");
    Ok(plan)
}

fn check_extent(shape: &Shape) -> Result<()> {
    if shape.checked_extent().is_none() {
        return Err(MatmulError::ShapeOverflow {
            shape: shape.dims().to_vec(),
        });
    }
    Ok(())
}

fn check_inner(a: usize, b: usize) -> Result<()> {
    if a != b {
        return Err(MatmulError::SizeMismatch { a, b });
    }
    Ok(())
}

fn vector_dot(a: &Shape, b: &Shape) -> Result<ResolvedPlan> {
    let k = a.dim(0);
    check_inner(k, b.dim(0))?;
    Ok(ResolvedPlan {
        kind: MatmulKind::VectorDot,
        out_shape: Shape::scalar(),
        m: 1,
        n: 1,
        k,
        lda: k,
        ldb: 1,
        ldc: 1,
        batch: 1,
        batch_stride_a: 0,
        batch_stride_b: 0,
        batch_stride_c: 1,
    })
}

fn vector_matrix(a: &Shape, b: &Shape) -> Result<ResolvedPlan> {
    let k = a.dim(0);
    check_inner(k, b.dim(0))?;
    let n = b.dim(1);
    Ok(ResolvedPlan {
        kind: MatmulKind::VectorMatrix,
        out_shape: Shape::new(vec![n]),
        m: 1,
        n,
        k,
        lda: k,
        ldb: n,
        ldc: n,
        batch: 1,
        batch_stride_a: 0,
        batch_stride_b: 0,
        batch_stride_c: n,
    })
}

fn matrix_vector(a: &Shape, b: &Shape) -> Result<ResolvedPlan> {
    let (m, k) = (a.dim(0), a.dim(1));
    check_inner(k, b.dim(0))?;
    Ok(ResolvedPlan {
        kind: MatmulKind::MatrixVector,
        out_shape: Shape::new(vec![m]),
        m,
        n: 1,
        k,
        lda: k,
        ldb: 1,
        ldc: 1,
        batch: 1,
        batch_stride_a: 0,
        batch_stride_b: 0,
        batch_stride_c: m,
    })
}

fn batched(a: &Shape, b: &Shape) -> Result<ResolvedPlan> {
    let (ra, rb) = (a.ndim(), b.ndim());

    let k = a.dim_from_end(1);
    let inner_b = if rb == 1 { b.dim(0) } else { b.dim_from_end(2) };
    check_inner(k, inner_b)?;

    // A rank-1 A is a single row; its "rows" axis is 1.
    let m = if ra == 1 { 1 } else { a.dim_from_end(2) };
    let n = if rb == 1 { 1 } else { b.dim_from_end(1) };

    let out_ndim = ra.max(rb);
    let mut leading = Vec::with_capacity(out_ndim);
    if ra == rb {
        for axis in 0..ra.saturating_sub(2) {
            if a.dim(axis) != b.dim(axis) {
                return Err(MatmulError::BatchSizeMismatch {
                    axis,
                    a: a.dim(axis),
                    b: b.dim(axis),
                });
            }
            leading.push(a.dim(axis));
        }
    } else if ra > rb {
        leading.extend_from_slice(&a.dims()[..ra - 2]);
    } else {
        leading.extend_from_slice(&b.dims()[..rb - 2]);
    }
    let batch: usize = leading.iter().product();

    let mut out = leading;
    out.push(m);
    out.push(n);
    let out = Shape::new(out);
    // m and n come from different operands, so the output can overflow even
    // when both inputs fit.
    check_extent(&out)?;

    // Rank-3 operands read their row stride straight off the trailing axis.
    let lda = if ra == 3 { a.dim(2) } else { k };
    let ldb = if rb == 3 { b.dim(2) } else { n };
    let ldc = n;

    Ok(ResolvedPlan {
        kind: MatmulKind::Batched,
        out_shape: out,
        m,
        n,
        k,
        lda,
        ldb,
        ldc,
        batch,
        batch_stride_a: if ra == 3 { m * lda } else { 0 },
        batch_stride_b: if rb == 3 { k * ldb } else { 0 },
        batch_stride_c: m * ldc,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn plan(a: &[usize], b: &[usize]) -> Result<ResolvedPlan> {
        resolve(&Shape::from(a), &Shape::from(b))
    }

    #[test]
    fn test_vector_dot() {
        let p = plan(&[3], &[3]).unwrap();
        assert_eq!(p.kind, MatmulKind::VectorDot);
        assert_eq!(p.out_shape.ndim(), 0);
        assert_eq!(p.out_len(), 1);
        assert_eq!(p.k, 3);
    }

    #[test]
    fn test_vector_dot_mismatch() {
        assert_eq!(
            plan(&[3], &[4]).unwrap_err(),
            MatmulError::SizeMismatch { a: 3, b: 4 }
        );
    }

    #[test]
    fn test_vector_matrix() {
        let p = plan(&[3], &[3, 4]).unwrap();
        assert_eq!(p.kind, MatmulKind::VectorMatrix);
        assert_eq!(p.out_shape.dims(), &[4]);
        assert_eq!((p.m, p.n, p.k), (1, 4, 3));
        assert_eq!((p.lda, p.ldb, p.ldc), (3, 4, 4));
    }

    #[test]
    fn test_vector_matrix_mismatch() {
        assert!(matches!(
            plan(&[3], &[5, 4]),
            Err(MatmulError::SizeMismatch { a: 3, b: 5 })
        ));
    }

    #[test]
    fn test_matrix_vector() {
        let p = plan(&[2, 3], &[3]).unwrap();
        assert_eq!(p.kind, MatmulKind::MatrixVector);
        assert_eq!(p.out_shape.dims(), &[2]);
        assert_eq!((p.m, p.n, p.k), (2, 1, 3));
        assert_eq!((p.lda, p.ldb, p.ldc), (3, 1, 1));
    }

    #[test]
    fn test_matrix_vector_mismatch() {
        assert!(matches!(
            plan(&[2, 3], &[2]),
            Err(MatmulError::SizeMismatch { .. })
        ));
    }

    #[test]
    fn test_matrix_matrix() {
        let p = plan(&[2, 3], &[3, 4]).unwrap();
        assert_eq!(p.kind, MatmulKind::Batched);
        assert_eq!(p.out_shape.dims(), &[2, 4]);
        assert_eq!((p.m, p.n, p.k), (2, 4, 3));
        assert_eq!((p.lda, p.ldb, p.ldc), (3, 4, 4));
        assert_eq!(p.batch, 1);
    }

    #[test]
    fn test_batched_equal_rank() {
        let p = plan(&[2, 3, 4], &[2, 4, 5]).unwrap();
        assert_eq!(p.out_shape.dims(), &[2, 3, 5]);
        assert_eq!((p.m, p.n, p.k), (3, 5, 4));
        assert_eq!(p.batch, 2);
        assert_eq!(p.batch_stride_a, 12);
        assert_eq!(p.batch_stride_b, 20);
        assert_eq!(p.batch_stride_c, 15);
        assert_eq!(p.required_a_len(), 24);
        assert_eq!(p.required_b_len(), 40);
    }

    #[test]
    fn test_batched_leading_from_b() {
        let p = plan(&[3, 4], &[2, 4, 5]).unwrap();
        assert_eq!(p.out_shape.dims(), &[2, 3, 5]);
        assert_eq!(p.batch_stride_a, 0);
        assert_eq!(p.batch_stride_b, 20);
    }

    #[test]
    fn test_batched_leading_from_a() {
        let p = plan(&[2, 3, 4], &[4, 5]).unwrap();
        assert_eq!(p.out_shape.dims(), &[2, 3, 5]);
        assert_eq!(p.batch_stride_a, 12);
        assert_eq!(p.batch_stride_b, 0);
    }

    #[test]
    fn test_batch_size_mismatch() {
        assert_eq!(
            plan(&[2, 3, 4], &[3, 4, 5]).unwrap_err(),
            MatmulError::BatchSizeMismatch { axis: 0, a: 2, b: 3 }
        );
    }

    #[test]
    fn test_batched_inner_mismatch() {
        assert!(matches!(
            plan(&[2, 3, 4], &[2, 5, 5]),
            Err(MatmulError::SizeMismatch { a: 4, b: 5 })
        ));
    }

    #[test]
    fn test_rank3_leading_strides_use_trailing_axis() {
        let p = plan(&[2, 3, 7], &[2, 7, 6]).unwrap();
        assert_eq!(p.lda, 7);
        assert_eq!(p.ldb, 6);
        assert_eq!(p.ldc, 6);
    }

    #[test]
    fn test_rank3_by_vector() {
        let p = plan(&[2, 3, 4], &[4]).unwrap();
        assert_eq!(p.kind, MatmulKind::Batched);
        assert_eq!(p.out_shape.dims(), &[2, 3, 1]);
        assert_eq!((p.m, p.n, p.k), (3, 1, 4));
        assert_eq!((p.lda, p.ldb, p.ldc), (4, 1, 1));
        assert_eq!(p.batch_stride_b, 0);
    }

    #[test]
    fn test_vector_by_rank3() {
        let p = plan(&[4], &[2, 4, 5]).unwrap();
        assert_eq!(p.out_shape.dims(), &[2, 1, 5]);
        assert_eq!((p.m, p.n, p.k), (1, 5, 4));
        assert_eq!(p.batch_stride_a, 0);
        assert_eq!(p.batch_stride_c, 5);
    }

    #[test]
    fn test_rank_out_of_range() {
        assert_eq!(
            plan(&[2, 2, 3, 4], &[4, 5]).unwrap_err(),
            MatmulError::RankOutOfRange { rank_a: 4, rank_b: 2 }
        );
        assert!(matches!(
            plan(&[], &[3]),
            Err(MatmulError::RankOutOfRange { rank_a: 0, rank_b: 1 })
        ));
    }

    #[test]
    fn test_rank_checked_before_shapes() {
        // The inner dims would also mismatch; the rank error must win.
        assert!(matches!(
            plan(&[2, 3], &[1, 1, 1, 9]),
            Err(MatmulError::RankOutOfRange { .. })
        ));
    }

    #[test]
    fn test_resolve_is_deterministic() {
        let shapes: [(&[usize], &[usize]); 4] = [
            (&[5], &[5]),
            (&[2, 3], &[3]),
            (&[3, 4], &[2, 4, 5]),
            (&[2, 3, 4], &[2, 4, 5]),
        ];
        for (a, b) in shapes {
            assert_eq!(plan(a, b).unwrap(), plan(a, b).unwrap());
        }
    }

    #[test]
    fn test_oversized_operand_rejected() {
        assert_eq!(
            plan(&[1 << 62, 4, 4], &[1 << 62, 4, 4]).unwrap_err(),
            MatmulError::ShapeOverflow {
                shape: vec![1 << 62, 4, 4]
            }
        );
    }

    #[test]
    fn test_oversized_output_rejected() {
        // Each operand fits, but the (2^40, 2^40) product does not.
        assert!(matches!(
            plan(&[1 << 40, 1], &[1, 1 << 40]),
            Err(MatmulError::ShapeOverflow { .. })
        ));
    }

    #[test]
    fn test_zero_sized_batch() {
        let p = plan(&[0, 3, 4], &[0, 4, 5]).unwrap();
        assert_eq!(p.out_shape.dims(), &[0, 3, 5]);
        assert_eq!(p.batch, 0);
        assert_eq!(p.out_len(), 0);
        assert_eq!(p.required_a_len(), 0);
    }
}
