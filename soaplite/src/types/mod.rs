//! Small fixed-size 3D vector and matrix types used to describe atomic
//! positions and unit cells.

/// Implement the `$Op` binary operator between `$Lhs` and `$Rhs`, for all
/// combinations of values and shared references.
macro_rules! impl_arithmetic {
    ($Lhs:ty, $Rhs:ty, $Op:ident, $op:ident, $Output:ty, $sel:ident, $other:ident, $res:expr) => (
        impl std::ops::$Op<$Rhs> for $Lhs {
            type Output = $Output;
            #[inline] fn $op($sel, $other: $Rhs) -> $Output {
                $res
            }
        }

        impl<'a> std::ops::$Op<$Rhs> for &'a $Lhs {
            type Output = $Output;
            #[inline] fn $op($sel, $other: $Rhs) -> $Output {
                $res
            }
        }

        impl<'a> std::ops::$Op<&'a $Rhs> for $Lhs {
            type Output = $Output;
            #[inline] fn $op($sel, $other: &'a $Rhs) -> $Output {
                $res
            }
        }

        impl<'a, 'b> std::ops::$Op<&'a $Rhs> for &'b $Lhs {
            type Output = $Output;
            #[inline] fn $op($sel, $other: &'a $Rhs) -> $Output {
                $res
            }
        }
    );
}

/// Implement the `$Op` binary operator between `$Lhs` and `f64`, with `$Lhs`
/// on the left-hand side.
macro_rules! impl_scalar_arithmetic {
    ($Lhs:ty, $Op:ident, $op:ident, $sel:ident, $other:ident, $res:expr) => (
        impl std::ops::$Op<f64> for $Lhs {
            type Output = $Lhs;
            #[inline] fn $op($sel, $other: f64) -> $Lhs {
                $res
            }
        }

        impl<'a> std::ops::$Op<f64> for &'a $Lhs {
            type Output = $Lhs;
            #[inline] fn $op($sel, $other: f64) -> $Lhs {
                $res
            }
        }
    );
}

/// Implement the `$Op` compound assignment operator (`+=`, `-=`, ...) for
/// `$Lhs`, taking `$Rhs` by value or by reference.
macro_rules! impl_inplace_arithmetic {
    ($Lhs:ty, $Rhs:ty, $Op:ident, $op:ident, $sel:ident, $other:ident, $res:expr) => (
        impl std::ops::$Op<$Rhs> for $Lhs {
            #[inline] fn $op(&mut $sel, $other: $Rhs) {
                $res
            }
        }

        impl<'a> std::ops::$Op<&'a $Rhs> for $Lhs {
            #[inline] fn $op(&mut $sel, $other: &'a $Rhs) {
                $res
            }
        }
    );
}

mod vectors;
pub use self::vectors::Vector3D;

mod matrix;
pub use self::matrix::Matrix3;
