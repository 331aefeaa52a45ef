pub mod blas;
pub mod matmul;

use crate::backend::GemmKernel;

/// Pure-Rust triple-loop kernel.
///
/// No blocking or vectorization; intended for operands small enough that
/// setup cost of a tuned kernel dominates.
#[derive(Debug, Clone, Copy, Default)]
pub struct NaiveGemm;

impl GemmKernel for NaiveGemm {
    fn name(&self) -> &str {
        "naive"
    }

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
    ) {
        matmul::naive_sgemm(m, n, k, a, lda, b, ldb, c, ldc);
    }
}

/// Cache-blocked, vectorized sgemm from the `matrixmultiply` crate.
///
/// This is the default provider for the BLAS path of
/// [`crate::MatmulDispatcher`].
#[derive(Debug, Clone, Copy, Default)]
pub struct BlasGemm;

impl GemmKernel for BlasGemm {
    fn name(&self) -> &str {
        "matrixmultiply"
    }

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
    ) {
        blas::sgemm(m, n, k, a, lda, b, ldb, c, ldc);
    }
}
