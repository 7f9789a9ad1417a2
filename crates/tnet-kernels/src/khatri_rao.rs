//! Khatri-Rao (column-wise Kronecker) and face-splitting (row-wise Kronecker) products
//!
//! CP-ALS builds the Khatri-Rao product of all factors but one; Tucker factors
//! of a product of two networks combine through the face-splitting product.

use scirs2_core::ndarray_ext::{Array2, ArrayView2};
use scirs2_core::numeric::Num;

/// Compute the Khatri-Rao product (column-wise Kronecker product) of two matrices
///
/// For matrices A (I × K) and B (J × K), the result C = A ⊙ B has size (I*J × K)
/// with `C[i*J + j, k] = A[i, k] · B[j, k]`.
///
/// # Panics
///
/// Panics if the number of columns in A and B don't match
///
/// # Examples
///
/// ```
/// use scirs2_core::ndarray_ext::array;
/// use tnet_kernels::khatri_rao;
///
/// let a = array![[1.0, 2.0], [3.0, 4.0]];
/// let b = array![[5.0, 6.0], [7.0, 8.0]];
/// let c = khatri_rao(&a.view(), &b.view());
/// assert_eq!(c.shape(), &[4, 2]);
/// assert_eq!(c[[1, 0]], 7.0);
/// assert_eq!(c[[2, 0]], 15.0);
/// ```
pub fn khatri_rao<T>(a: &ArrayView2<T>, b: &ArrayView2<T>) -> Array2<T>
where
    T: Clone + Num,
{
    let (i, k1) = a.dim();
    let (j, k2) = b.dim();

    assert_eq!(
        k1, k2,
        "Number of columns must match: A has {} columns, B has {} columns",
        k1, k2
    );

    let mut result = Array2::<T>::zeros((i * j, k1));
    for col_idx in 0..k1 {
        let a_col = a.column(col_idx);
        let b_col = b.column(col_idx);
        for (row_a_idx, a_val) in a_col.iter().enumerate() {
            for (row_b_idx, b_val) in b_col.iter().enumerate() {
                result[[row_a_idx * j + row_b_idx, col_idx]] = a_val.clone() * b_val.clone();
            }
        }
    }

    result
}

/// Face-splitting product (row-wise Kronecker product).
///
/// For A (I × P) and B (I × Q) the result has size (I × P*Q) with
/// `C[i, p*Q + q] = A[i, p] · B[i, q]`.
///
/// # Panics
///
/// Panics if the number of rows differ.
///
/// ```
/// use scirs2_core::ndarray_ext::array;
/// use tnet_kernels::face_splitting;
///
/// let a = array![[1.0, 2.0], [3.0, 4.0]];
/// let b = array![[1.0, 0.0, 2.0], [0.5, 1.0, 0.0]];
/// let c = face_splitting(&a.view(), &b.view());
/// assert_eq!(c.shape(), &[2, 6]);
/// assert_eq!(c[[0, 5]], 4.0);
/// assert_eq!(c[[1, 0]], 1.5);
/// ```
pub fn face_splitting<T>(a: &ArrayView2<T>, b: &ArrayView2<T>) -> Array2<T>
where
    T: Clone + Num,
{
    let (rows, p) = a.dim();
    let (rows_b, q) = b.dim();

    assert_eq!(
        rows, rows_b,
        "Number of rows must match: A has {} rows, B has {} rows",
        rows, rows_b
    );

    Array2::from_shape_fn((rows, p * q), |(i, col)| {
        a[[i, col / q]].clone() * b[[i, col % q]].clone()
    })
}
