use std::fmt::Debug;

/// A single-precision GEMM primitive: `C = A @ B` on row-major buffers.
///
/// Implementations compute an `m x n` result from an `m x k` matrix `a` with
/// row stride `lda` and a `k x n` matrix `b` with row stride `ldb`, writing
/// rows of `c` at stride `ldc`. The output is overwritten (alpha = 1,
/// beta = 0), never accumulated into.
///
/// Callers guarantee the slices are long enough for the given dimensions and
/// strides; implementations may panic otherwise.
pub trait GemmKernel: Send + Sync + Debug {
    /// Returns the name of this kernel (e.g., "naive", "matrixmultiply").
    fn name(&self) -> &str;

    #[allow(clippy::too_many_arguments)]
    fn sgemm(
        &self,
        m: usize,
        n: usize,
        k: usize,
        a: &[f32],
        lda: usize,
        b: &[f32],
        ldb: usize,
        c: &mut [f32],
        ldc: usize,
    );
}
