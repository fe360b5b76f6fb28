use ndarray::{Array2, Array3, ArrayView2, s};

use crate::math::gamma_half_integer;
use crate::Error;

use super::lowdin_orthonormalization;

/// Number of angular channels for which the GTO basis is built, i.e. the
/// basis supports `0 <= l <= 9`.
pub const GTO_ANGULAR_CHANNELS: usize = 10;

/// Decay threshold of the Gaussian-type orbitals at their anchor radius
const DECAY_THRESHOLD: f64 = 1e-3;

/// Orthonormalized radial basis built from Gaussian-type orbitals
/// `r^l e^{-α_n r^2}`.
///
/// For each angular channel `l`, the exponents `α_n` are chosen so that the
/// `n`-th orbital decays to `1e-3` at its anchor radius `a_n`, with anchors
/// evenly spaced between 1 and the cutoff. The orbitals are then mixed with
/// Löwdin's symmetric orthonormalization, `β_l = S_l^{-1/2}`.
#[derive(Debug, Clone)]
pub struct GtoBasis {
    cutoff: f64,
    max_radial: usize,
    /// `[l, n]`
    alphas: Array2<f64>,
    /// `[l, n, n']`
    betas: Array3<f64>,
}

impl GtoBasis {
    /// Build the GTO basis with `max_radial` functions per angular channel
    /// and anchors extending up to `cutoff`.
    #[time_graph::instrument(name = "GtoBasis::new")]
    pub fn new(cutoff: f64, max_radial: usize) -> Result<GtoBasis, Error> {
        if !(cutoff > 0.0 && cutoff.is_finite()) {
            return Err(Error::InvalidParameter(format!(
                "expected a positive cutoff for the GTO basis, got {}", cutoff
            )));
        }

        if !(2..=13).contains(&max_radial) {
            return Err(Error::InvalidParameter(format!(
                "max_radial must be between 2 and 13 for the GTO basis, got {}", max_radial
            )));
        }

        let anchors = ndarray::Array1::linspace(1.0, cutoff, max_radial);

        let mut alphas = Array2::zeros((GTO_ANGULAR_CHANNELS, max_radial));
        let mut betas = Array3::zeros((GTO_ANGULAR_CHANNELS, max_radial, max_radial));
        for l in 0..GTO_ANGULAR_CHANNELS {
            for (alpha, &a) in alphas.row_mut(l).iter_mut().zip(&anchors) {
                *alpha = -f64::ln(DECAY_THRESHOLD / a.powi(l as i32)) / (a * a);
            }

            // anchors below 1 do not decay to the threshold for large l
            if !alphas.row(l).iter().all(|&alpha| alpha > 0.0 && alpha.is_finite()) {
                return Err(Error::BasisNotRealizable { cutoff, max_radial });
            }

            let overlap = overlap_matrix(l, &alphas.row(l).to_vec());
            let inverse_sqrt = lowdin_orthonormalization(&overlap).ok_or(
                Error::BasisNotRealizable { cutoff, max_radial }
            )?;

            betas.slice_mut(s![l, .., ..]).assign(&inverse_sqrt);
        }

        return Ok(GtoBasis { cutoff, max_radial, alphas, betas });
    }

    /// Get the cutoff used to build this basis
    pub fn cutoff(&self) -> f64 {
        self.cutoff
    }

    /// Get the number of radial functions per angular channel
    pub fn max_radial(&self) -> usize {
        self.max_radial
    }

    /// Get the Gaussian exponents, with shape `[10, max_radial]`
    pub fn alphas(&self) -> ArrayView2<'_, f64> {
        self.alphas.view()
    }

    /// Get the orthonormalization coefficients, with shape
    /// `[10, max_radial, max_radial]`
    pub fn betas(&self) -> ndarray::ArrayView3<'_, f64> {
        self.betas.view()
    }

    /// Get the overlap matrix of the raw (non-orthonormalized) orbitals for
    /// the angular channel `l`
    pub fn overlap(&self, l: usize) -> Array2<f64> {
        assert!(l < GTO_ANGULAR_CHANNELS, "the GTO basis only supports l <= 9");
        let alphas = self.alphas.row(l).to_vec();
        return overlap_matrix(l, &alphas);
    }
}

/// `S_jk = ∫ r^2 r^{2l} e^{-(α_j + α_k) r^2} dr = Γ(l + 3/2) / 2 (α_j + α_k)^{-(l + 3/2)}`
fn overlap_matrix(l: usize, alphas: &[f64]) -> Array2<f64> {
    let gamma = gamma_half_integer(l + 1);
    let exponent = -(l as f64 + 1.5);

    let n = alphas.len();
    let mut overlap = Array2::zeros((n, n));
    for j in 0..n {
        for k in j..n {
            let value = 0.5 * gamma * f64::powf(alphas[j] + alphas[k], exponent);
            overlap[[j, k]] = value;
            overlap[[k, j]] = value;
        }
    }
    return overlap;
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;
    use ndarray::{Array2, s};

    use super::*;
    use crate::basis::orthonormality_error;

    #[test]
    fn alphas() {
        let basis = GtoBasis::new(5.0, 5).unwrap();
        assert_eq!(basis.alphas().shape(), [10, 5]);
        assert_eq!(basis.betas().shape(), [10, 5, 5]);

        // first anchor is at r = 1
        for l in 0..10 {
            assert_relative_eq!(basis.alphas()[[l, 0]], f64::ln(1000.0), max_relative = 1e-14);
        }

        // last anchor is at the cutoff
        let expected = (f64::ln(1000.0) + 3.0 * f64::ln(5.0)) / 25.0;
        assert_relative_eq!(basis.alphas()[[3, 4]], expected, max_relative = 1e-14);
    }

    #[test]
    fn orthonormal() {
        for &(cutoff, max_radial) in &[(5.0, 5), (3.0, 2), (12.0, 9)] {
            let basis = GtoBasis::new(cutoff, max_radial).unwrap();
            for l in 0..GTO_ANGULAR_CHANNELS {
                let betas = basis.betas().slice(s![l, .., ..]).to_owned();
                let identity = betas.t().dot(&basis.overlap(l)).dot(&betas);

                let expected = Array2::<f64>::eye(max_radial);
                approx::assert_abs_diff_eq!(identity, expected, epsilon = 1e-8);
            }
        }
    }

    #[test]
    fn orthonormal_or_rejected() {
        let mut n_accepted = 0;
        for step in 1..=120 {
            let cutoff = 0.1 * step as f64;
            for max_radial in 2..=13 {
                match GtoBasis::new(cutoff, max_radial) {
                    Ok(basis) => {
                        n_accepted += 1;
                        for l in 0..GTO_ANGULAR_CHANNELS {
                            let betas = basis.betas();
                            let error = orthonormality_error(betas.slice(s![l, .., ..]), basis.overlap(l).view());
                            assert!(error <= 1e-6, "cutoff={}, max_radial={}, l={}: error={}", cutoff, max_radial, l, error);
                        }
                    }
                    Err(error) => {
                        assert!(matches!(error, Error::BasisNotRealizable { .. }), "{}", error);
                    }
                }
            }
        }
        assert!(n_accepted > 0);

        assert!(GtoBasis::new(12.0, 8).is_ok());
        assert!(GtoBasis::new(5.0, 10).is_ok());
    }

    #[test]
    fn small_cutoff() {
        // the exponents for large l are negative below a cutoff of ~0.46
        let error = GtoBasis::new(0.3, 5).unwrap_err();
        assert!(matches!(error, Error::BasisNotRealizable { max_radial: 5, .. }));

        for &cutoff in &[0.01, 0.1, 0.2, 0.45] {
            for max_radial in [2, 5, 13] {
                assert!(GtoBasis::new(cutoff, max_radial).is_err());
            }
        }
    }

    #[test]
    fn ill_conditioned() {
        let error = GtoBasis::new(1.2, 7).unwrap_err();
        assert!(matches!(error, Error::BasisNotRealizable { max_radial: 7, .. }));

        assert!(GtoBasis::new(3.0, 13).is_err());
    }

    #[test]
    fn invalid_parameters() {
        let error = GtoBasis::new(5.0, 1).unwrap_err();
        assert_eq!(error.to_string(), "invalid parameter: max_radial must be between 2 and 13 for the GTO basis, got 1");

        assert!(matches!(GtoBasis::new(5.0, 14), Err(Error::InvalidParameter(_))));
        assert!(matches!(GtoBasis::new(0.0, 5), Err(Error::InvalidParameter(_))));
        assert!(matches!(GtoBasis::new(f64::NAN, 5), Err(Error::InvalidParameter(_))));
    }
}
