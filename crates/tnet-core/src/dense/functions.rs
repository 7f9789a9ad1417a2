//! Element-wise operators on `DenseND`

use super::types::DenseND;
use scirs2_core::ndarray_ext::ScalarOperand;
use scirs2_core::numeric::Num;

impl<'b, T> std::ops::Sub<&'b DenseND<T>> for &DenseND<T>
where
    T: Clone + Num,
{
    type Output = DenseND<T>;
    fn sub(self, rhs: &'b DenseND<T>) -> Self::Output {
        assert_eq!(
            self.shape(),
            rhs.shape(),
            "Shapes must match for subtraction"
        );
        DenseND {
            data: &self.data - &rhs.data,
        }
    }
}

impl<'b, T> std::ops::Add<&'b DenseND<T>> for &DenseND<T>
where
    T: Clone + Num,
{
    type Output = DenseND<T>;
    fn add(self, rhs: &'b DenseND<T>) -> Self::Output {
        assert_eq!(self.shape(), rhs.shape(), "Shapes must match for addition");
        DenseND {
            data: &self.data + &rhs.data,
        }
    }
}

impl<'b, T> std::ops::Mul<&'b DenseND<T>> for &DenseND<T>
where
    T: Clone + Num,
{
    type Output = DenseND<T>;
    fn mul(self, rhs: &'b DenseND<T>) -> Self::Output {
        assert_eq!(
            self.shape(),
            rhs.shape(),
            "Shapes must match for element-wise product"
        );
        DenseND {
            data: &self.data * &rhs.data,
        }
    }
}

impl<T> std::ops::Mul<T> for &DenseND<T>
where
    T: Clone + Num + ScalarOperand,
{
    type Output = DenseND<T>;
    fn mul(self, scalar: T) -> Self::Output {
        DenseND {
            data: &self.data * scalar,
        }
    }
}

impl<T> std::ops::Add<T> for &DenseND<T>
where
    T: Clone + Num + ScalarOperand,
{
    type Output = DenseND<T>;
    fn add(self, scalar: T) -> Self::Output {
        DenseND {
            data: &self.data + scalar,
        }
    }
}
