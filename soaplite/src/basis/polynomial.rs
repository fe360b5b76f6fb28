use ndarray::{Array1, Array2, ArrayView1, ArrayView2};

use crate::math::{GAUSS_LEGENDRE_NODES, QUADRATURE_POINTS};
use crate::Error;

use super::lowdin_orthonormalization;

/// Distance added to the cutoff to get the hard cutoff, beyond which atoms
/// are ignored by the kernels
pub const HARD_CUTOFF_BUFFER: f64 = 5.0;

/// Largest angular channel supported with the polynomial basis
pub const POLYNOMIAL_MAX_ANGULAR: usize = 20;

/// Orthonormalized polynomial radial basis `g_n(r) = Σ_k β_nk (r_c - r)^{k + 2}`
/// for `r < r_c`, tabulated on the radial quadrature grid.
///
/// The quadrature grid maps the Gauss-Legendre nodes on `[-1, 1]` to
/// `[0, r_c + 5]`, i.e. up to the hard cutoff. The basis functions vanish
/// beyond `r_c`.
#[derive(Debug, Clone)]
pub struct PolynomialBasis {
    cutoff: f64,
    max_radial: usize,
    rx: Array1<f64>,
    betas: Array2<f64>,
    table: Array2<f64>,
}

impl PolynomialBasis {
    /// Build the polynomial basis with `max_radial` functions vanishing at
    /// `cutoff`.
    #[time_graph::instrument(name = "PolynomialBasis::new")]
    pub fn new(cutoff: f64, max_radial: usize) -> Result<PolynomialBasis, Error> {
        if !(cutoff > 0.0 && cutoff.is_finite()) {
            return Err(Error::InvalidParameter(format!(
                "expected a positive cutoff for the polynomial basis, got {}", cutoff
            )));
        }

        if max_radial < 1 {
            return Err(Error::InvalidParameter(
                "max_radial must be at least 1 for the polynomial basis".into()
            ));
        }

        let overlap = overlap_matrix(cutoff, max_radial);
        let betas = lowdin_orthonormalization(&overlap).ok_or(
            Error::BasisNotRealizable { cutoff, max_radial }
        )?;

        let half_hard_cutoff = 0.5 * (cutoff + HARD_CUTOFF_BUFFER);
        let rx = GAUSS_LEGENDRE_NODES.iter()
            .map(|x| half_hard_cutoff * (x + 1.0))
            .collect::<Array1<f64>>();

        let mut raw = Array2::zeros((max_radial, QUADRATURE_POINTS));
        for (k, mut row) in raw.rows_mut().into_iter().enumerate() {
            for (value, &r) in row.iter_mut().zip(&rx) {
                *value = (cutoff - r.clamp(0.0, cutoff)).powi(k as i32 + 3);
            }
        }
        let table = betas.dot(&raw);

        return Ok(PolynomialBasis { cutoff, max_radial, rx, betas, table });
    }

    /// Get the cutoff used to build this basis
    pub fn cutoff(&self) -> f64 {
        self.cutoff
    }

    /// Get the number of radial basis functions
    pub fn max_radial(&self) -> usize {
        self.max_radial
    }

    /// Get the radial quadrature points, in `[0, cutoff + 5]`
    pub fn rx(&self) -> ArrayView1<'_, f64> {
        self.rx.view()
    }

    /// Get the orthonormalization matrix, with shape `[max_radial, max_radial]`
    pub fn betas(&self) -> ArrayView2<'_, f64> {
        self.betas.view()
    }

    /// Get the orthonormalized basis functions evaluated on the quadrature
    /// points, with shape `[max_radial, 100]`
    pub fn table(&self) -> ArrayView2<'_, f64> {
        self.table.view()
    }

    /// Get the overlap matrix of the raw polynomials `(r_c - r)^{n + 2}`
    pub fn overlap(&self) -> Array2<f64> {
        overlap_matrix(self.cutoff, self.max_radial)
    }
}

/// `S_ij = ∫_0^{r_c} r^2 (r_c - r)^{i + 2} (r_c - r)^{j + 2} dr`, for `i, j`
/// starting at 1
fn overlap_matrix(cutoff: f64, max_radial: usize) -> Array2<f64> {
    let mut overlap = Array2::zeros((max_radial, max_radial));
    for i in 1..=max_radial {
        for j in 1..=max_radial {
            let sum = (i + j) as f64;
            overlap[[i - 1, j - 1]] = 2.0 * cutoff.powf(7.0 + sum)
                / ((5.0 + sum) * (6.0 + sum) * (7.0 + sum));
        }
    }
    return overlap;
}
