// Eigen decomposition of symmetric matrix. Adapted from
// https://github.com/xasmx/rust-la, which is a Rust port of the JAMA implementation
// https://en.wikipedia.org/wiki/JAMA_(numerical_linear_algebra_library)

use ndarray::{Array1, Array2};

/// Maximal number of implicit QL shifts per row of the matrix
const MAX_QL_SWEEPS: usize = 30;

/// Eigendecomposition of a real symmetric matrix into eigenvalues and
/// eigenvectors.
#[derive(Debug, Clone)]
pub struct SymmetricEigen {
    /// Eigenvalues of the input matrix, sorted in increasing order
    pub eigenvalues: Array1<f64>,
    /// Eigenvectors of the input matrix, stored as columns
    pub eigenvectors: Array2<f64>,
    /// Did the QL iterations converge? This is `false` if the input
    /// contained non-finite values.
    converged: bool,
}

impl SymmetricEigen {
    /// Compute the eigendecomposition of a symmetric real matrix
    pub fn new(matrix: Array2<f64>) -> SymmetricEigen {
        assert_eq!(matrix.nrows(), matrix.ncols(), "matrix must be square");

        let n = matrix.ncols();
        let mut eigenvectors = matrix;
        let mut eigenvalues = Array1::from_elem(n, 0.0);
        if n == 0 {
            return SymmetricEigen { eigenvalues, eigenvectors, converged: true };
        }

        if !eigenvectors.iter().all(|value| value.is_finite()) {
            eigenvalues.fill(f64::NAN);
            return SymmetricEigen { eigenvalues, eigenvectors, converged: false };
        }

        let mut work = vec![0.0; n];
        householder_tridiagonal(&mut eigenvalues, &mut eigenvectors, &mut work);
        let converged = tridiagonal_ql(&mut eigenvalues, &mut eigenvectors, &mut work);

        SymmetricEigen {
            eigenvalues,
            eigenvectors,
            converged,
        }
    }

    /// Check if the decomposition converged. Eigenvalues and eigenvectors
    /// are meaningless otherwise.
    pub fn converged(&self) -> bool {
        self.converged
    }

    /// Get the smallest eigenvalue of the matrix
    pub fn min_eigenvalue(&self) -> f64 {
        self.eigenvalues.iter().copied().fold(f64::INFINITY, f64::min)
    }

    /// Apply `function` to all eigenvalues, and re-assemble the corresponding
    /// matrix `V f(Λ) V^T`.
    pub fn recompose_with(&self, function: impl Fn(f64) -> f64) -> Array2<f64> {
        let values = self.eigenvalues.mapv(function);
        let scaled = &self.eigenvectors * &values.view().insert_axis(ndarray::Axis(0));
        return scaled.dot(&self.eigenvectors.t());
    }

    /// Compute `M^{-1/2}` for the decomposed matrix `M`, i.e. the Löwdin
    /// orthonormalization matrix when `M` is an overlap matrix.
    ///
    /// This returns `None` if the decomposition did not converge, or if any
    /// eigenvalue is zero or negative, in which case the inverse square root
    /// is not a real matrix. Positive eigenvalues at the rounding noise level
    /// still give a matrix, which callers should check.
    pub fn inverse_sqrt(&self) -> Option<Array2<f64>> {
        if !self.converged || self.eigenvalues.iter().any(|&value| !(value > 0.0 && value.is_finite())) {
            return None;
        }

        return Some(self.recompose_with(|value| 1.0 / f64::sqrt(value)));
    }
}

// Symmetric Householder reduction to tridiagonal form.
//
// This is derived from the Algol procedures tred2 by Bowdler, Martin,
// Reinsch, and Wilkinson, Handbook for Auto. Comp., Vol.ii-Linear
// Algebra, and the corresponding Fortran subroutine in EISPACK.
#[allow(clippy::needless_range_loop)]
fn householder_tridiagonal(diagonal: &mut Array1<f64>, vectors: &mut Array2<f64>, off_diagonal: &mut [f64]) {
    let n = diagonal.len();
    debug_assert_eq!(off_diagonal.len(), n);
    debug_assert_eq!(vectors.len(), n * n);

    for j in 0..n {
        diagonal[j] = vectors[[n - 1, j]];
    }

    for i in (1..n).rev() {
        // scale to avoid under/overflow
        let mut scale = 0.0;
        let mut h = 0.0;
        for k in 0..i {
            scale += f64::abs(diagonal[k]);
        }

        if scale == 0.0 {
            off_diagonal[i] = diagonal[i - 1];
            for j in 0..i {
                diagonal[j] = vectors[[i - 1, j]];
                vectors[[i, j]] = 0.0;
                vectors[[j, i]] = 0.0;
            }
        } else {
            // generate the Householder vector
            for k in 0..i {
                diagonal[k] /= scale;
                h += diagonal[k] * diagonal[k];
            }
            let mut f = diagonal[i - 1];
            let mut g = f64::sqrt(h);
            if f > 0.0 {
                g = -g;
            }
            off_diagonal[i] = scale * g;
            h -= f * g;
            diagonal[i - 1] = f - g;
            for j in 0..i {
                off_diagonal[j] = 0.0;
            }

            // apply similarity transformation to the remaining columns
            for j in 0..i {
                f = diagonal[j];
                vectors[[j, i]] = f;
                g = off_diagonal[j] + vectors[[j, j]] * f;
                for k in (j + 1)..i {
                    g += vectors[[k, j]] * diagonal[k];
                    off_diagonal[k] += vectors[[k, j]] * f;
                }
                off_diagonal[j] = g;
            }

            f = 0.0;
            for j in 0..i {
                off_diagonal[j] /= h;
                f += off_diagonal[j] * diagonal[j];
            }
            let hh = f / (h + h);
            for j in 0..i {
                off_diagonal[j] -= hh * diagonal[j];
            }
            for j in 0..i {
                f = diagonal[j];
                g = off_diagonal[j];
                for k in j..i {
                    vectors[[k, j]] -= f * off_diagonal[k] + g * diagonal[k];
                }
                diagonal[j] = vectors[[i - 1, j]];
                vectors[[i, j]] = 0.0;
            }
        }
        diagonal[i] = h;
    }

    // accumulate transformations
    for i in 0..(n - 1) {
        vectors[[n - 1, i]] = vectors[[i, i]];
        vectors[[i, i]] = 1.0;
        let h = diagonal[i + 1];
        if h != 0.0 {
            for k in 0..=i {
                diagonal[k] = vectors[[k, i + 1]] / h;
            }
            for j in 0..=i {
                let mut g = 0.0;
                for k in 0..=i {
                    g += vectors[[k, i + 1]] * vectors[[k, j]];
                }
                for k in 0..=i {
                    vectors[[k, j]] -= g * diagonal[k];
                }
            }
        }
        for k in 0..=i {
            vectors[[k, i + 1]] = 0.0;
        }
    }

    for j in 0..n {
        diagonal[j] = vectors[[n - 1, j]];
        vectors[[n - 1, j]] = 0.0;
    }
    vectors[[n - 1, n - 1]] = 1.0;
    off_diagonal[0] = 0.0;
}

// Symmetric tridiagonal QL algorithm.
//
// This is derived from the Algol procedures tql2, by Bowdler, Martin,
// Reinsch, and Wilkinson, Handbook for Auto. Comp., Vol.ii-Linear
// Algebra, and the corresponding Fortran subroutine in EISPACK.
//
// Returns `false` if the iterations did not converge after `MAX_QL_SWEEPS * n`
// implicit shifts.
#[allow(clippy::many_single_char_names)]
fn tridiagonal_ql(diagonal: &mut Array1<f64>, vectors: &mut Array2<f64>, off_diagonal: &mut [f64]) -> bool {
    let n = diagonal.len();
    let max_iterations = MAX_QL_SWEEPS * n;
    let mut iterations = 0;

    for i in 1..n {
        off_diagonal[i - 1] = off_diagonal[i];
    }
    off_diagonal[n - 1] = 0.0;

    let mut f = 0.0;
    let mut tst1 = 0.0f64;
    for l in 0..n {
        // find small sub-diagonal element
        tst1 = tst1.max(f64::abs(diagonal[l]) + f64::abs(off_diagonal[l]));
        let mut m = l;
        while m < n {
            if f64::abs(off_diagonal[m]) <= f64::EPSILON * tst1 {
                break;
            }
            m += 1;
        }

        if m == n {
            // only reachable with NaN in the off-diagonal
            return false;
        }

        // if m == l, diagonal[l] is an eigenvalue, otherwise iterate
        if m > l {
            loop {
                iterations += 1;
                if iterations > max_iterations {
                    return false;
                }

                // compute implicit shift
                let mut g = diagonal[l];
                let mut p = (diagonal[l + 1] - g) / (2.0 * off_diagonal[l]);
                let mut r = f64::hypot(p, 1.0);
                if p < 0.0 {
                    r = -r;
                }
                diagonal[l] = off_diagonal[l] / (p + r);
                diagonal[l + 1] = off_diagonal[l] * (p + r);
                let diagonal_l1 = diagonal[l + 1];
                let mut h = g - diagonal[l];
                for i in (l + 2)..n {
                    diagonal[i] -= h;
                }
                f += h;

                // implicit QL transformation
                p = diagonal[m];
                let mut c = 1.0;
                let mut c2 = c;
                let mut c3 = c;
                let off_diagonal_l1 = off_diagonal[l + 1];
                let mut s = 0.0;
                let mut s2 = 0.0;
                for i in (l..m).rev() {
                    c3 = c2;
                    c2 = c;
                    s2 = s;
                    g = c * off_diagonal[i];
                    h = c * p;
                    r = f64::hypot(p, off_diagonal[i]);
                    off_diagonal[i + 1] = s * r;
                    s = off_diagonal[i] / r;
                    c = p / r;
                    p = c * diagonal[i] - s * g;
                    diagonal[i + 1] = h + s * (c * g + s * diagonal[i]);

                    for k in 0..n {
                        h = vectors[[k, i + 1]];
                        vectors[[k, i + 1]] = s * vectors[[k, i]] + c * h;
                        vectors[[k, i]] = c * vectors[[k, i]] - s * h;
                    }
                }
                p = -s * s2 * c3 * off_diagonal_l1 * off_diagonal[l] / diagonal_l1;
                off_diagonal[l] = s * p;
                diagonal[l] = c * p;

                if f64::abs(off_diagonal[l]) <= f64::EPSILON * tst1 {
                    break;
                }
            }
        }
        diagonal[l] += f;
        off_diagonal[l] = 0.0;
    }

    // sort eigenvalues and the corresponding vectors
    for i in 0..(n - 1) {
        let mut k = i;
        let mut p = diagonal[i];
        for j in (i + 1)..n {
            if diagonal[j] < p {
                k = j;
                p = diagonal[j];
            }
        }
        if k != i {
            diagonal[k] = diagonal[i];
            diagonal[i] = p;
            for j in 0..n {
                vectors.swap([j, i], [j, k]);
            }
        }
    }

    return diagonal.iter().all(|value| value.is_finite());
}
