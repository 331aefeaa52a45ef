// BLAS-style sgemm backed by the `matrixmultiply` crate.

/// Row-major, no-transpose `C = 1.0 * A @ B + 0.0 * C`.
///
/// # Panics
/// Panics if any slice is too short for the given dimensions and strides.
#[allow(clippy::too_many_arguments)]
pub fn sgemm(
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
    if m == 0 || n == 0 {
        return;
    }
    if k == 0 {
        for row in c.chunks_mut(ldc.max(1)).take(m) {
            row[..n].fill(0.0);
        }
        return;
    }

    assert!(a.len() >= (m - 1) * lda + k, "sgemm: a too short");
    assert!(b.len() >= (k - 1) * ldb + n, "sgemm: b too short");
    assert!(c.len() >= (m - 1) * ldc + n, "sgemm: c too short");

    // SAFETY: the asserts above bound every element the kernel touches, and
    // `c` is uniquely borrowed. With beta = 0 the prior contents of `c` are
    // never read.
    unsafe {
        matrixmultiply::sgemm(
            m,
            k,
            n,
            1.0,
            a.as_ptr(),
            lda as isize,
            1,
            b.as_ptr(),
            ldb as isize,
            1,
            0.0,
            c.as_mut_ptr(),
            ldc as isize,
            1,
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cpu::matmul::naive_sgemm;
    use approx::assert_relative_eq;

    #[test]
    fn test_sgemm_basic() {
        let a = [1.0, 2.0, 3.0, 4.0];
        let b = [5.0, 6.0, 7.0, 8.0];
        let mut c = [f32::NAN; 4];
        sgemm(2, 2, 2, &a, 2, &b, 2, &mut c, 2);
        assert_eq!(c, [19.0, 22.0, 43.0, 50.0]);
    }

    #[test]
    fn test_sgemm_zero_k_clears_output() {
        let mut c = [7.0; 6];
        sgemm(2, 3, 0, &[], 0, &[], 3, &mut c, 3);
        assert_eq!(c, [0.0; 6]);
    }

    #[test]
    fn test_sgemm_matches_naive_rectangular() {
        let (m, n, k) = (5, 7, 3);
        let a: Vec<f32> = (0..m * k).map(|i| i as f32 * 0.25 - 1.0).collect();
        let b: Vec<f32> = (0..k * n).map(|i| (i % 5) as f32 - 2.0).collect();
        let mut expected = vec![0.0; m * n];
        let mut got = vec![0.0; m * n];
        naive_sgemm(m, n, k, &a, k, &b, n, &mut expected, n);
        sgemm(m, n, k, &a, k, &b, n, &mut got, n);
        for (e, g) in expected.iter().zip(got.iter()) {
            assert_relative_eq!(*e, *g, epsilon = 1e-5);
        }
    }

    #[test]
    #[should_panic(expected = "a too short")]
    fn test_sgemm_short_buffer_panics() {
        let mut c = [0.0; 4];
        sgemm(2, 2, 2, &[1.0; 3], 2, &[1.0; 4], 2, &mut c, 2);
    }
}
