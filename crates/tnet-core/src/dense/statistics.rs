//! Norms and distances

use super::types::DenseND;
use scirs2_core::numeric::{Float, Num};

impl<T> DenseND<T>
where
    T: Clone + Num,
{
    /// Compute the Frobenius norm of the tensor.
    ///
    /// ```
    /// use tnet_core::dense::DenseND;
    ///
    /// let tensor = DenseND::<f64>::ones(&[2, 3]);
    /// assert!((tensor.frobenius_norm() - 6.0_f64.sqrt()).abs() < 1e-12);
    /// ```
    pub fn frobenius_norm(&self) -> T
    where
        T: Float,
    {
        self.data.iter().map(|&x| x * x).fold(T::zero(), |acc, x| acc + x).sqrt()
    }

    /// Largest absolute element-wise difference between two equally shaped tensors.
    ///
    /// # Errors
    ///
    /// Returns an error if the shapes differ.
    pub fn max_abs_diff(&self, other: &Self) -> anyhow::Result<T>
    where
        T: Float,
    {
        if self.shape() != other.shape() {
            anyhow::bail!(
                "Cannot compare tensors of shapes {:?} and {:?}",
                self.shape(),
                other.shape()
            );
        }
        Ok(self
            .data
            .iter()
            .zip(other.data.iter())
            .map(|(&a, &b)| (a - b).abs())
            .fold(T::zero(), |acc, d| if d > acc { d } else { acc }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_frobenius_norm() {
        let t = DenseND::from_vec(vec![3.0, 4.0], &[2]).unwrap();
        assert!((t.frobenius_norm() - 5.0).abs() < 1e-12);
    }

    #[test]
    fn test_max_abs_diff() {
        let a = DenseND::from_vec(vec![1.0, 2.0, 3.0], &[3]).unwrap();
        let b = DenseND::from_vec(vec![1.0, 2.5, 2.0], &[3]).unwrap();
        assert!((a.max_abs_diff(&b).unwrap() - 1.0).abs() < 1e-12);

        let c = DenseND::<f64>::zeros(&[1, 3]);
        assert!(a.max_abs_diff(&c).is_err());
    }
}
