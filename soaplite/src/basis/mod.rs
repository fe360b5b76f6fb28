//! Orthonormal radial basis sets used to expand the atomic density.

mod gto;
pub use self::gto::{GtoBasis, GTO_ANGULAR_CHANNELS};

mod polynomial;
pub use self::polynomial::{PolynomialBasis, HARD_CUTOFF_BUFFER, POLYNOMIAL_MAX_ANGULAR};

use ndarray::{Array2, ArrayView2};

use crate::math::SymmetricEigen;
use crate::Error;

/// Largest deviation of `β^T S β` from the identity accepted when building a
/// radial basis
pub const ORTHONORMALITY_TOLERANCE: f64 = 1e-6;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[derive(serde::Deserialize, serde::Serialize, schemars::JsonSchema)]
/// Family of radial basis functions used by the SOAP descriptor
pub enum RadialBasisKind {
    /// Gaussian-type orbitals `r^l e^{-α r^2}`, with one set of exponents
    /// per angular channel. Supports `max_angular <= 9`.
    #[default]
    Gto,
    /// Polynomials `(r_c - r)^{n + 2}`, shared by all angular channels.
    /// Supports `max_angular <= 20`.
    Polynomial,
}

/// A radial basis, built and orthonormalized once for a given set of
/// hyper-parameters
#[derive(Debug, Clone)]
pub enum RadialBasis {
    Gto(GtoBasis),
    Polynomial(PolynomialBasis),
}

impl RadialBasis {
    /// Build the radial basis of the given `kind`
    pub fn new(kind: RadialBasisKind, cutoff: f64, max_radial: usize) -> Result<RadialBasis, Error> {
        match kind {
            RadialBasisKind::Gto => GtoBasis::new(cutoff, max_radial).map(RadialBasis::Gto),
            RadialBasisKind::Polynomial => PolynomialBasis::new(cutoff, max_radial).map(RadialBasis::Polynomial),
        }
    }

    /// Get the family of this basis
    pub fn kind(&self) -> RadialBasisKind {
        match self {
            RadialBasis::Gto(_) => RadialBasisKind::Gto,
            RadialBasis::Polynomial(_) => RadialBasisKind::Polynomial,
        }
    }

    pub fn cutoff(&self) -> f64 {
        match self {
            RadialBasis::Gto(basis) => basis.cutoff(),
            RadialBasis::Polynomial(basis) => basis.cutoff(),
        }
    }

    pub fn max_radial(&self) -> usize {
        match self {
            RadialBasis::Gto(basis) => basis.max_radial(),
            RadialBasis::Polynomial(basis) => basis.max_radial(),
        }
    }
}

/// Get the largest absolute difference between `β^T S β` and the identity
/// matrix, or infinity if the product is not finite.
pub fn orthonormality_error(betas: ArrayView2<'_, f64>, overlap: ArrayView2<'_, f64>) -> f64 {
    let product = betas.t().dot(&overlap).dot(&betas);

    let mut error = 0.0;
    for ((i, j), &value) in product.indexed_iter() {
        if !value.is_finite() {
            return f64::INFINITY;
        }

        let expected = if i == j { 1.0 } else { 0.0 };
        error = f64::max(error, f64::abs(value - expected));
    }
    return error;
}

/// Löwdin orthonormalization: compute `β = S^{-1/2}` for the given overlap
/// matrix. This returns `None` if the overlap contains non-finite values, is
/// not positive definite, or is too ill-conditioned for `β^T S β` to match
/// the identity up to [`ORTHONORMALITY_TOLERANCE`].
pub(crate) fn lowdin_orthonormalization(overlap: &Array2<f64>) -> Option<Array2<f64>> {
    if !overlap.iter().all(|value| value.is_finite()) {
        return None;
    }

    let betas = SymmetricEigen::new(overlap.clone()).inverse_sqrt()?;
    if orthonormality_error(betas.view(), overlap.view()) > ORTHONORMALITY_TOLERANCE {
        return None;
    }

    return Some(betas);
}

#[cfg(test)]
mod tests {
    use ndarray::array;

    use super::*;

    #[test]
    fn dispatch() {
        let basis = RadialBasis::new(RadialBasisKind::Gto, 4.0, 3).unwrap();
        assert_eq!(basis.kind(), RadialBasisKind::Gto);
        assert_eq!(basis.max_radial(), 3);
        assert_eq!(basis.cutoff(), 4.0);

        let basis = RadialBasis::new(RadialBasisKind::Polynomial, 4.0, 1).unwrap();
        assert_eq!(basis.kind(), RadialBasisKind::Polynomial);

        // a single radial function is only valid for polynomials
        assert!(RadialBasis::new(RadialBasisKind::Gto, 4.0, 1).is_err());
    }

    #[test]
    fn orthonormalization() {
        let overlap = array![
            [2.0, 0.5],
            [0.5, 1.0],
        ];
        let betas = lowdin_orthonormalization(&overlap).unwrap();
        assert!(orthonormality_error(betas.view(), overlap.view()) < 1e-14);

        // numerically singular
        let overlap = array![
            [1.0, 1.0 - 1e-15],
            [1.0 - 1e-15, 1.0],
        ];
        assert!(lowdin_orthonormalization(&overlap).is_none());

        let overlap = array![
            [1.0, f64::INFINITY],
            [f64::INFINITY, 1.0],
        ];
        assert!(lowdin_orthonormalization(&overlap).is_none());
        assert_eq!(orthonormality_error(Array2::<f64>::eye(2).view(), overlap.view()), f64::INFINITY);
    }

    #[test]
    fn serialization() {
        let kind: RadialBasisKind = serde_json::from_str("\"Polynomial\"").unwrap();
        assert_eq!(kind, RadialBasisKind::Polynomial);
        assert_eq!(serde_json::to_string(&RadialBasisKind::default()).unwrap(), "\"Gto\"");
    }
}
