use std::sync::Arc;

use tracing::debug;

use crate::backend::GemmKernel;
use crate::config::DispatchConfig;
use crate::cpu::{matmul, BlasGemm, NaiveGemm};
use crate::plan::{MatmulKind, ResolvedPlan};

/// Which compute path a plan is routed to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Kernel {
    /// Rank-0 output; a plain dot product.
    Dot,
    /// Triple loop, used when m, n and k are all within the tiny threshold.
    Naive,
    /// The installed BLAS provider.
    Blas,
}

/// Runs a [`ResolvedPlan`] against contiguous row-major f32 buffers.
///
/// Holds no per-call state, so a single dispatcher can be shared across
/// threads as long as each call has its own output buffer.
#[derive(Debug, Clone)]
pub struct MatmulDispatcher {
    config: DispatchConfig,
    naive: NaiveGemm,
    blas: Arc<dyn GemmKernel>,
}

impl Default for MatmulDispatcher {
    fn default() -> Self {
        Self::new(DispatchConfig::default())
    }
}

impl MatmulDispatcher {
    /// Create a dispatcher using `matrixmultiply` for the BLAS path.
    pub fn new(config: DispatchConfig) -> Self {
        Self {
            config,
            naive: NaiveGemm,
            blas: Arc::new(BlasGemm),
        }
    }

    /// Replace the BLAS provider.
    pub fn with_blas(mut self, blas: Arc<dyn GemmKernel>) -> Self {
        self.blas = blas;
        self
    }

    pub fn config(&self) -> &DispatchConfig {
        &self.config
    }

    /// Returns the installed BLAS provider.
    pub fn blas(&self) -> &dyn GemmKernel {
        self.blas.as_ref()
    }

    /// Decide which kernel `plan` will run on.
    pub fn select_kernel(&self, plan: &ResolvedPlan) -> Kernel {
        if plan.kind == MatmulKind::VectorDot {
            return Kernel::Dot;
        }
        let tiny = self.config.tiny;
        if plan.m <= tiny && plan.n <= tiny && plan.k <= tiny {
            Kernel::Naive
        } else {
            Kernel::Blas
        }
    }

    /// Compute `c = a @ b` as described by `plan`.
    ///
    /// Every element of the output is overwritten.
    ///
    /// # Panics
    /// Panics if a buffer is shorter than `plan` requires; callers size
    /// buffers from the same plan, so this indicates a programming error.
    pub fn dispatch(&self, plan: &ResolvedPlan, a: &[f32], b: &[f32], c: &mut [f32]) {
        assert!(
            a.len() >= plan.required_a_len(),
            "a has {} elements, plan needs {}",
            a.len(),
            plan.required_a_len()
        );
        assert!(
            b.len() >= plan.required_b_len(),
            "b has {} elements, plan needs {}",
            b.len(),
            plan.required_b_len()
        );
        assert_eq!(
            c.len(),
            plan.out_len(),
            "output has {} elements but shape {} needs {}",
            c.len(),
            plan.out_shape,
            plan.out_len()
        );

        let kernel = self.select_kernel(plan);
        debug!(
            kind = ?plan.kind,
            m = plan.m,
            n = plan.n,
            k = plan.k,
            batch = plan.batch,
            kernel = ?kernel,
            "dispatching matmul"
        );

        if kernel == Kernel::Dot {
            c[0] = matmul::dot(&a[..plan.k], &b[..plan.k]);
            return;
        }
        if c.is_empty() {
            return;
        }

        let gemm: &dyn GemmKernel = match kernel {
            Kernel::Naive => &self.naive,
            _ => self.blas.as_ref(),
        };
        let c_len = plan.batch_stride_c;
        for t in 0..plan.batch {
            let a_off = t * plan.batch_stride_a;
            let b_off = t * plan.batch_stride_b;
            let c_off = t * c_len;
            gemm.sgemm(
                plan.m,
                plan.n,
                plan.k,
                &a[a_off..],
                plan.lda,
                &b[b_off..],
                plan.ldb,
                &mut c[c_off..c_off + c_len],
                plan.ldc,
            );
        }
    }
}
