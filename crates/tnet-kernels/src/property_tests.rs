//! Property-based tests for the linear-algebra adapter and core kernels

#[cfg(test)]
mod tests {
    use crate::linalg::{qr, rq, truncated_svd, SvdBudget, TruncationAlgorithm};
    use crate::tt_ops::{absorb_left, absorb_right, tt_left_orthogonalize_core};
    use proptest::prelude::*;
    use scirs2_core::ndarray_ext::{Array2, Array3};

    fn proptest_config() -> ProptestConfig {
        ProptestConfig {
            cases: 16,
            ..ProptestConfig::default()
        }
    }

    fn matrix(rows: usize, cols: usize, seed: u64) -> Array2<f64> {
        Array2::from_shape_fn((rows, cols), |(i, j)| {
            let x = (seed as usize + 31 * i + 17 * j) % 97;
            x as f64 / 97.0 - 0.5
        })
    }

    fn max_abs(m: &Array2<f64>) -> f64 {
        m.iter().fold(0.0, |acc, x| acc.max(x.abs()))
    }

    proptest! {
        #![proptest_config(proptest_config())]
        #[test]
        fn qr_reconstructs_any_shape(rows in 1usize..8, cols in 1usize..8, seed in 0u64..1000) {
            let m = matrix(rows, cols, seed);
            let (q, r) = qr(&m.view()).unwrap();
            let k = rows.min(cols);
            prop_assert_eq!(q.dim(), (rows, k));
            prop_assert_eq!(r.dim(), (k, cols));
            prop_assert!(max_abs(&(&q.dot(&r) - &m)) < 1e-10);
            prop_assert!(max_abs(&(&q.t().dot(&q) - &Array2::<f64>::eye(k))) < 1e-10);
        }
    }

    proptest! {
        #![proptest_config(proptest_config())]
        #[test]
        fn rq_reconstructs_any_shape(rows in 1usize..8, cols in 1usize..8, seed in 0u64..1000) {
            let m = matrix(rows, cols, seed);
            let (l, q) = rq(&m.view()).unwrap();
            prop_assert!(max_abs(&(&l.dot(&q) - &m)) < 1e-10);
        }
    }

    // Property: the discarded energy never exceeds the budget
    proptest! {
        #![proptest_config(proptest_config())]
        #[test]
        fn truncation_respects_budget(
            rows in 2usize..9,
            cols in 2usize..9,
            seed in 0u64..1000,
            eps in 0.0f64..0.5,
            left_ortho in any::<bool>(),
        ) {
            let m = matrix(rows, cols, seed);
            let norm = m.iter().map(|x| x * x).sum::<f64>().sqrt();
            let (left, right) = truncated_svd(
                &m.view(),
                SvdBudget::Relative(eps),
                None,
                left_ortho,
                TruncationAlgorithm::Svd,
            ).unwrap();
            let err = &left.dot(&right) - &m;
            let err_norm = err.iter().map(|x| x * x).sum::<f64>().sqrt();
            prop_assert!(err_norm <= eps * norm + 1e-10);
            prop_assert!(left.ncols() >= 1 && left.ncols() <= rows.min(cols));
        }
    }

    proptest! {
        #![proptest_config(proptest_config())]
        #[test]
        fn left_orthogonalization_is_exact(
            r_left in 1usize..4,
            n in 1usize..5,
            r_right in 1usize..4,
            seed in 0u64..1000,
        ) {
            let core = Array3::from_shape_fn((r_left, n, r_right), |(i, j, k)| {
                ((seed as usize + 13 * i + 7 * j + 3 * k) % 23) as f64 - 11.0
            });
            let (q, r) = tt_left_orthogonalize_core(&core).unwrap();
            let back = absorb_right(&q, &r).unwrap();
            let diff = back.iter().zip(core.iter()).fold(0.0f64, |acc, (a, b)| acc.max((a - b).abs()));
            prop_assert!(diff < 1e-9);

            // Moving the remainder back to the left is also exact
            let shifted = absorb_left(&Array2::eye(r_left), &core).unwrap();
            prop_assert_eq!(shifted, core);
        }
    }
}
