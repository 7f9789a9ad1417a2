//! Dense tensor type definition and basic accessors

use scirs2_core::ndarray_ext::{Array, Array2, ArrayView, IxDyn, Ix2};
use scirs2_core::numeric::Num;

/// Dense N-dimensional tensor backed by scirs2_core's ndarray.
///
/// Used as the ingestion buffer for network construction and as the target of
/// full reconstruction. Layout is row-major.
///
/// # Examples
///
/// ```
/// use tnet_core::dense::DenseND;
///
/// let tensor = DenseND::<f64>::zeros(&[2, 3, 4]);
/// assert_eq!(tensor.shape(), &[2, 3, 4]);
/// assert_eq!(tensor.rank(), 3);
/// ```
#[derive(Clone)]
pub struct DenseND<T> {
    pub(crate) data: Array<T, IxDyn>,
}

impl<T> DenseND<T>
where
    T: Clone + Num,
{
    /// Create a tensor from a vector with given shape
    ///
    /// # Arguments
    ///
    /// * `vec` - Flattened data in row-major order
    /// * `shape` - Target shape
    ///
    /// # Examples
    ///
    /// ```
    /// use tnet_core::dense::DenseND;
    ///
    /// let tensor = DenseND::from_vec(vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0], &[2, 3]).unwrap();
    /// assert_eq!(tensor[&[1, 0]], 4.0);
    /// assert!(DenseND::from_vec(vec![1.0, 2.0], &[3]).is_err());
    /// ```
    pub fn from_vec(vec: Vec<T>, shape: &[usize]) -> anyhow::Result<Self> {
        let total: usize = shape.iter().product();
        if vec.len() != total {
            anyhow::bail!(
                "Shape {:?} requires {} elements, but got {}",
                shape,
                total,
                vec.len()
            );
        }
        let array = Array::from_shape_vec(IxDyn(shape), vec)?;
        Ok(Self { data: array })
    }

    /// Number of dimensions.
    pub fn rank(&self) -> usize {
        self.data.ndim()
    }

    /// Get the shape of this tensor
    pub fn shape(&self) -> &[usize] {
        self.data.shape()
    }

    /// Get the total number of elements
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Check if the tensor is empty (has zero elements)
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Get an immutable view of the tensor
    pub fn view(&self) -> ArrayView<'_, T, IxDyn> {
        self.data.view()
    }

    /// Convert a 2-D tensor into a matrix.
    ///
    /// # Errors
    ///
    /// Returns an error if the tensor is not 2-dimensional.
    pub fn into_matrix(self) -> anyhow::Result<Array2<T>> {
        let rank = self.rank();
        self.data
            .into_dimensionality::<Ix2>()
            .map_err(|e| anyhow::anyhow!("Cannot view rank-{} tensor as a matrix: {}", rank, e))
    }

    /// Elements in row-major order.
    pub fn to_vec(&self) -> Vec<T> {
        self.data.iter().cloned().collect()
    }

    /// Create a tensor filled with a specific value
    pub fn from_elem(shape: &[usize], value: T) -> Self {
        Self {
            data: Array::from_elem(IxDyn(shape), value),
        }
    }

    /// Create a tensor of zeros
    ///
    /// ```
    /// use tnet_core::dense::DenseND;
    ///
    /// let tensor = DenseND::<f64>::zeros(&[2, 3, 4]);
    /// assert_eq!(tensor[&[0, 0, 0]], 0.0);
    /// ```
    pub fn zeros(shape: &[usize]) -> Self {
        Self {
            data: Array::zeros(IxDyn(shape)),
        }
    }

    /// Create a tensor of ones
    pub fn ones(shape: &[usize]) -> Self {
        Self {
            data: Array::ones(IxDyn(shape)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_vec_row_major() {
        let t = DenseND::from_vec(vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0], &[2, 3]).unwrap();
        assert_eq!(t.shape(), &[2, 3]);
        assert_eq!(t[&[0, 2]], 3.0);
        assert_eq!(t[&[1, 1]], 5.0);
        assert_eq!(t.to_vec(), vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0]);
    }

    #[test]
    fn test_from_vec_size_mismatch() {
        let result = DenseND::from_vec(vec![1.0, 2.0, 3.0], &[2, 2]);
        assert!(result.is_err());
    }

    #[test]
    fn test_into_matrix() {
        let t = DenseND::<f64>::ones(&[2, 5]);
        let m = t.into_matrix().unwrap();
        assert_eq!(m.dim(), (2, 5));

        let cube = DenseND::<f64>::ones(&[2, 2, 2]);
        assert!(cube.into_matrix().is_err());
    }

    #[test]
    fn test_constant_constructors() {
        let z = DenseND::<f64>::zeros(&[3, 2]);
        let o = DenseND::<f64>::ones(&[3, 2]);
        let f = DenseND::from_elem(&[3, 2], 7.0);
        assert_eq!(z.len(), 6);
        assert!(z.to_vec().iter().all(|&x| x == 0.0));
        assert!(o.to_vec().iter().all(|&x| x == 1.0));
        assert!(f.to_vec().iter().all(|&x| x == 7.0));
    }
}
