//! The kernel boundary: the numerical core computing SOAP power spectra from
//! the flat data produced by [`SpeciesPartition`](crate::systems::SpeciesPartition)
//! and the radial basis.

use crate::Error;

mod registry;
pub use self::registry::{KernelRegistry, KernelRegistryBuilder};

mod in_process;
pub use self::in_process::InProcessKernel;

/// The different kernel entry points, selected by the descriptor depending
/// on the radial basis and the species combinations
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum KernelVariant {
    /// GTO basis, structures containing a single species
    SingleSpecies,
    /// GTO basis, multiple species without cross-species terms
    NonCross,
    /// GTO basis, multiple species including cross-species terms
    Cross,
    /// Polynomial basis, always including cross-species terms
    Polynomial,
}

impl KernelVariant {
    /// All the variants, in a fixed order
    pub const ALL: [KernelVariant; 4] = [
        KernelVariant::SingleSpecies,
        KernelVariant::NonCross,
        KernelVariant::Cross,
        KernelVariant::Polynomial,
    ];

    /// Name of the native library historically implementing this variant
    pub fn library_name(self) -> &'static str {
        match self {
            KernelVariant::SingleSpecies | KernelVariant::NonCross => "libsoapPySig",
            KernelVariant::Cross => "libsoapGTO",
            KernelVariant::Polynomial => "libsoapGeneral",
        }
    }

    /// Does this variant include cross-species pairs `(a, b)` with `a != b`?
    pub fn includes_cross_species(self) -> bool {
        match self {
            KernelVariant::SingleSpecies | KernelVariant::NonCross => false,
            KernelVariant::Cross | KernelVariant::Polynomial => true,
        }
    }

    /// Get the number of species pairs `(a, b)` included in the output of
    /// this variant for `n_species` species
    pub fn n_species_pairs(self, n_species: usize) -> usize {
        if self.includes_cross_species() {
            n_species * (n_species + 1) / 2
        } else {
            n_species
        }
    }

    /// Get the number of features per query point produced by this variant
    pub fn n_features(self, max_radial: usize, max_angular: usize, n_species: usize) -> usize {
        let radial_pairs = max_radial * (max_radial + 1) / 2;
        return radial_pairs * (max_angular + 1) * self.n_species_pairs(n_species);
    }
}

impl std::fmt::Display for KernelVariant {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            KernelVariant::SingleSpecies => "single species",
            KernelVariant::NonCross => "non cross-species",
            KernelVariant::Cross => "cross-species",
            KernelVariant::Polynomial => "polynomial",
        };
        write!(f, "{} ({})", name, self.library_name())
    }
}

/// Input of the kernels using the GTO radial basis. All arrays are flat and
/// in row-major order.
#[derive(Debug, Clone, Copy)]
pub struct GtoKernelInput<'a> {
    /// Positions of the atoms grouped by species, `[total_atoms, 3]`
    pub atom_positions: &'a [f64],
    /// Positions of the query points, `[n_queries, 3]`
    pub query_positions: &'a [f64],
    /// Gaussian exponents of the basis, `[10, max_radial]`
    pub alphas: &'a [f64],
    /// Orthonormalization coefficients of the basis, `[10, max_radial, max_radial]`
    pub betas: &'a [f64],
    /// Number of atoms of each species, `[n_species]`
    pub species_counts: &'a [usize],
    /// Atoms further than this from a query point are ignored
    pub cutoff_hard: f64,
    pub total_atoms: usize,
    pub n_species: usize,
    pub max_radial: usize,
    pub max_angular: usize,
    pub n_queries: usize,
    /// Inverse width of the atomic Gaussian densities `e^{-η r^2}`
    pub eta: f64,
}

/// Input of the kernel using the polynomial radial basis. All arrays are
/// flat and in row-major order.
#[derive(Debug, Clone, Copy)]
pub struct PolynomialKernelInput<'a> {
    /// Positions of the atoms grouped by species, `[total_atoms, 3]`
    pub atom_positions: &'a [f64],
    /// Positions of the query points, `[n_queries, 3]`
    pub query_positions: &'a [f64],
    /// Number of atoms of each species, `[n_species]`
    pub species_counts: &'a [usize],
    /// Atoms further than this from a query point are ignored
    pub cutoff_hard: f64,
    pub total_atoms: usize,
    pub n_species: usize,
    pub max_radial: usize,
    pub max_angular: usize,
    pub n_queries: usize,
    /// Inverse width of the atomic Gaussian densities `e^{-η r^2}`
    pub eta: f64,
    /// Radial quadrature points, `[100]`
    pub rx: &'a [f64],
    /// Orthonormalized basis evaluated on `rx`, `[max_radial, 100]`
    pub table: &'a [f64],
}

/// A `SoapKernel` computes SOAP power spectra for a set of query points.
///
/// Each function returns `n_queries * n_features` values in row-major
/// `[query, feature]` order, where `n_features` is given by
/// [`KernelVariant::n_features`]. Features are ordered by species pair
/// `(a, b)` with `a <= b`, then by radial pair `(n, n')` with `n <= n'`, then
/// by angular channel `l`.
///
/// The default implementations report the variant as unavailable.
pub trait SoapKernel: Send + Sync {
    /// Power spectrum for a single species, with the GTO basis
    fn single_species(&self, input: &GtoKernelInput<'_>) -> Result<Vec<f64>, Error> {
        let _ = input;
        Err(unavailable(KernelVariant::SingleSpecies))
    }

    /// Power spectrum for multiple species without cross-species terms, with
    /// the GTO basis
    fn non_cross(&self, input: &GtoKernelInput<'_>) -> Result<Vec<f64>, Error> {
        let _ = input;
        Err(unavailable(KernelVariant::NonCross))
    }

    /// Power spectrum for multiple species including cross-species terms,
    /// with the GTO basis
    fn cross(&self, input: &GtoKernelInput<'_>) -> Result<Vec<f64>, Error> {
        let _ = input;
        Err(unavailable(KernelVariant::Cross))
    }

    /// Power spectrum including cross-species terms, with the polynomial
    /// basis
    fn polynomial(&self, input: &PolynomialKernelInput<'_>) -> Result<Vec<f64>, Error> {
        let _ = input;
        Err(unavailable(KernelVariant::Polynomial))
    }
}

fn unavailable(variant: KernelVariant) -> Error {
    Error::KernelLoad(format!("this kernel does not implement the {} variant", variant))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn n_features() {
        assert_eq!(KernelVariant::SingleSpecies.n_features(5, 5, 1), 90);
        assert_eq!(KernelVariant::Cross.n_features(5, 5, 1), 90);
        assert_eq!(KernelVariant::NonCross.n_features(5, 0, 3), 45);
        assert_eq!(KernelVariant::Cross.n_features(5, 0, 2), 45);
        assert_eq!(KernelVariant::Polynomial.n_features(2, 3, 4), 3 * 4 * 10);
    }

    #[test]
    fn names() {
        assert_eq!(KernelVariant::NonCross.library_name(), "libsoapPySig");
        assert_eq!(KernelVariant::Polynomial.to_string(), "polynomial (libsoapGeneral)");
    }

    #[test]
    fn default_implementations() {
        struct Empty;
        impl SoapKernel for Empty {}

        let input = PolynomialKernelInput {
            atom_positions: &[],
            query_positions: &[],
            species_counts: &[],
            cutoff_hard: 10.0,
            total_atoms: 0,
            n_species: 0,
            max_radial: 1,
            max_angular: 0,
            n_queries: 0,
            eta: 1.0,
            rx: &[],
            table: &[],
        };

        let error = Empty.polynomial(&input).unwrap_err();
        assert_eq!(
            error.to_string(),
            "failed to load kernel: this kernel does not implement the polynomial (libsoapGeneral) variant"
        );
    }
}
