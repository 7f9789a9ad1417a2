//! Random tensor creation

use super::types::DenseND;
use scirs2_core::ndarray_ext::{Array, IxDyn};
use scirs2_core::numeric::Num;

impl<T> DenseND<T>
where
    T: Clone + Num,
{
    /// Create a tensor with values drawn uniformly from `[low, high)`.
    ///
    /// ```
    /// use tnet_core::dense::DenseND;
    ///
    /// let tensor = DenseND::<f64>::random_uniform(&[2, 3], 0.0, 1.0);
    /// assert!(tensor.to_vec().iter().all(|&x| (0.0..1.0).contains(&x)));
    /// ```
    pub fn random_uniform(shape: &[usize], low: f64, high: f64) -> Self
    where
        T: From<f64>,
    {
        use scirs2_core::random::quick::random_f64;
        let total: usize = shape.iter().product();
        let data: Vec<T> = (0..total)
            .map(|_| <T as From<f64>>::from(low + (high - low) * random_f64()))
            .collect();
        Self {
            data: Array::from_shape_vec(IxDyn(shape), data)
                .expect("sample count matches the requested shape"),
        }
    }

    /// Create a tensor with values drawn from `N(mean, std²)` (Box-Muller).
    ///
    /// ```
    /// use tnet_core::dense::DenseND;
    ///
    /// let tensor = DenseND::<f64>::random_normal(&[3, 3], 0.0, 1.0);
    /// assert_eq!(tensor.shape(), &[3, 3]);
    /// ```
    pub fn random_normal(shape: &[usize], mean: f64, std: f64) -> Self
    where
        T: From<f64>,
    {
        use scirs2_core::random::quick::random_f64;
        let total: usize = shape.iter().product();
        let data: Vec<T> = (0..total.div_ceil(2))
            .flat_map(|_| {
                // Shift away from zero so ln() stays finite.
                let u1 = 1.0 - random_f64();
                let u2 = random_f64();
                let radius = (-2.0 * u1.ln()).sqrt();
                let angle = 2.0 * std::f64::consts::PI * u2;
                [
                    <T as From<f64>>::from(mean + std * radius * angle.cos()),
                    <T as From<f64>>::from(mean + std * radius * angle.sin()),
                ]
            })
            .take(total)
            .collect();
        Self {
            data: Array::from_shape_vec(IxDyn(shape), data)
                .expect("sample count matches the requested shape"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_random_uniform_bounds() {
        let t = DenseND::<f64>::random_uniform(&[4, 5], -2.0, 3.0);
        assert_eq!(t.shape(), &[4, 5]);
        assert!(t.to_vec().iter().all(|&x| (-2.0..3.0).contains(&x)));
    }

    #[test]
    fn test_random_normal_odd_length() {
        let t = DenseND::<f64>::random_normal(&[3, 3], 1.0, 0.5);
        assert_eq!(t.len(), 9);
        assert!(t.to_vec().iter().all(|x| x.is_finite()));
    }

    #[test]
    fn test_random_normal_moments() {
        let t = DenseND::<f64>::random_normal(&[4000], 2.0, 1.0);
        let values = t.to_vec();
        let mean = values.iter().sum::<f64>() / values.len() as f64;
        assert!((mean - 2.0).abs() < 0.15);
    }
}
