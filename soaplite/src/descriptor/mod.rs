//! The SOAP descriptor: validates the hyper-parameters, builds the radial
//! basis once, and dispatches each evaluation to the right kernel.

use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use ndarray::Array2;

use crate::basis::{RadialBasis, RadialBasisKind};
use crate::kernel::{GtoKernelInput, PolynomialKernelInput};
use crate::systems::SpeciesPartition;
use crate::{Error, KernelRegistry, KernelVariant, System, Vector3D};

mod parameters;
pub use self::parameters::SoapParameters;

mod periodic;
pub use self::periodic::{extend_periodic, extended_cutoff};

/// Radial basis data in the flat layout expected by the kernels
#[derive(Debug, Clone)]
enum FlatBasis {
    Gto {
        alphas: Vec<f64>,
        betas: Vec<f64>,
    },
    Polynomial {
        rx: Vec<f64>,
        table: Vec<f64>,
    },
}

impl FlatBasis {
    fn new(basis: &RadialBasis) -> FlatBasis {
        match basis {
            RadialBasis::Gto(basis) => FlatBasis::Gto {
                alphas: basis.alphas().iter().copied().collect(),
                betas: basis.betas().iter().copied().collect(),
            },
            RadialBasis::Polynomial(basis) => FlatBasis::Polynomial {
                rx: basis.rx().iter().copied().collect(),
                table: basis.table().iter().copied().collect(),
            },
        }
    }
}

/// SOAP power spectrum descriptor, computing one row of features for each
/// query point in a structure.
///
/// The radial basis is built when creating the descriptor, and shared by all
/// subsequent calculations. A `SoapDescriptor` is immutable, and can be used
/// from multiple threads at the same time.
#[derive(Debug, Clone)]
pub struct SoapDescriptor {
    parameters: SoapParameters,
    basis: RadialBasis,
    flat_basis: FlatBasis,
    kernels: Arc<KernelRegistry>,
}

impl SoapDescriptor {
    /// Create a new descriptor with the given `parameters`, using the
    /// process-wide kernel registry.
    pub fn new(parameters: SoapParameters) -> Result<SoapDescriptor, Error> {
        SoapDescriptor::with_kernels(parameters, KernelRegistry::global())
    }

    /// Create a new descriptor with the given `parameters`, using the kernels
    /// from `kernels`.
    pub fn with_kernels(parameters: SoapParameters, kernels: Arc<KernelRegistry>) -> Result<SoapDescriptor, Error> {
        parameters.validate()?;

        let basis = RadialBasis::new(parameters.radial_basis, parameters.cutoff, parameters.max_radial)?;
        let flat_basis = FlatBasis::new(&basis);

        return Ok(SoapDescriptor {
            parameters,
            basis,
            flat_basis,
            kernels,
        });
    }

    /// Create a new descriptor from JSON-formatted parameters, using the
    /// process-wide kernel registry.
    pub fn from_json(parameters: &str) -> Result<SoapDescriptor, Error> {
        let parameters = serde_json::from_str::<SoapParameters>(parameters)?;
        return SoapDescriptor::new(parameters);
    }

    /// Get the parameters used to create this descriptor
    pub fn parameters(&self) -> &SoapParameters {
        &self.parameters
    }

    /// Get the radial basis used by this descriptor
    pub fn basis(&self) -> &RadialBasis {
        &self.basis
    }

    /// Get the kernel variant used for structures with `n_species` species
    pub fn variant(&self, n_species: usize) -> KernelVariant {
        match self.parameters.radial_basis {
            RadialBasisKind::Polynomial => KernelVariant::Polynomial,
            RadialBasisKind::Gto => {
                if n_species == 1 {
                    KernelVariant::SingleSpecies
                } else if self.parameters.cross_over {
                    KernelVariant::Cross
                } else {
                    KernelVariant::NonCross
                }
            }
        }
    }

    /// Get the number of features per query point for structures with
    /// `n_species` species. When the parameters restrict the species, this
    /// is the size of the restriction list.
    pub fn n_features(&self, n_species: usize) -> usize {
        return self.variant(n_species).n_features(
            self.parameters.max_radial,
            self.parameters.max_angular,
            n_species,
        );
    }

    /// Compute the descriptor of `system` at all of its atoms.
    pub fn compute(&self, system: &dyn System) -> Result<Array2<f64>, Error> {
        let positions = system.positions()?;
        return self.compute_local(system, positions);
    }

    /// Compute the descriptor of `system` at the given `points`, which do
    /// not need to be atomic positions. The output contains one row for
    /// each point.
    ///
    /// The cell of `system` is ignored, see
    /// [`SoapDescriptor::compute_periodic_local`] for periodic systems.
    #[time_graph::instrument(name = "SoapDescriptor::compute_local")]
    pub fn compute_local(&self, system: &dyn System, points: &[Vector3D]) -> Result<Array2<f64>, Error> {
        let partition = SpeciesPartition::new(system, self.parameters.species.as_deref())?;

        let n_species = partition.n_species();
        let variant = self.variant(n_species);
        let n_features = self.n_features(n_species);
        if points.is_empty() {
            return Ok(Array2::zeros((0, n_features)));
        }

        let kernel = self.kernels.get(variant)?;
        log::debug!(
            "using the {} kernel for {} points and {} species",
            variant, points.len(), n_species
        );

        let query_positions = points.iter()
            .flat_map(|point| point.as_array().iter().copied())
            .collect::<Vec<_>>();

        let parameters = &self.parameters;
        let result = std::panic::catch_unwind(AssertUnwindSafe(|| {
            match &self.flat_basis {
                FlatBasis::Gto { alphas, betas } => {
                    let input = GtoKernelInput {
                        atom_positions: partition.positions(),
                        query_positions: &query_positions,
                        alphas,
                        betas,
                        species_counts: partition.counts(),
                        cutoff_hard: parameters.hard_cutoff(),
                        total_atoms: partition.total_atoms(),
                        n_species,
                        max_radial: parameters.max_radial,
                        max_angular: parameters.max_angular,
                        n_queries: points.len(),
                        eta: parameters.eta,
                    };

                    match variant {
                        KernelVariant::SingleSpecies => kernel.single_species(&input),
                        KernelVariant::NonCross => kernel.non_cross(&input),
                        _ => kernel.cross(&input),
                    }
                }
                FlatBasis::Polynomial { rx, table } => {
                    let input = PolynomialKernelInput {
                        atom_positions: partition.positions(),
                        query_positions: &query_positions,
                        species_counts: partition.counts(),
                        cutoff_hard: parameters.hard_cutoff(),
                        total_atoms: partition.total_atoms(),
                        n_species,
                        max_radial: parameters.max_radial,
                        max_angular: parameters.max_angular,
                        n_queries: points.len(),
                        eta: parameters.eta,
                        rx,
                        table,
                    };

                    kernel.polynomial(&input)
                }
            }
        }));

        let values = match result {
            Ok(values) => values?,
            Err(payload) => return Err(Error::from(payload)),
        };

        let expected = points.len() * n_features;
        if values.len() != expected {
            return Err(Error::Kernel(format!(
                "the {} kernel returned {} values, expected {} ({} points with {} features)",
                variant, values.len(), expected, points.len(), n_features
            )));
        }

        return Array2::from_shape_vec((points.len(), n_features), values).map_err(|error| {
            Error::Kernel(format!("invalid kernel output: {}", error))
        });
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;

    use crate::kernel::SoapKernel;
    use crate::systems::UnitCell;
    use crate::SimpleSystem;
    use super::*;

    fn water() -> SimpleSystem {
        let mut system = SimpleSystem::new(UnitCell::infinite());
        system.add_atom(8, Vector3D::new(0.0, 0.0, 0.0));
        system.add_atom(1, Vector3D::new(0.0, 0.75545, -0.58895));
        system.add_atom(1, Vector3D::new(0.0, -0.75545, -0.58895));
        return system;
    }

    #[test]
    fn variants() {
        let mut parameters = SoapParameters::new(5.0, 4, 3);
        let descriptor = SoapDescriptor::new(parameters.clone()).unwrap();
        assert_eq!(descriptor.variant(1), KernelVariant::SingleSpecies);
        assert_eq!(descriptor.variant(2), KernelVariant::Cross);

        parameters.cross_over = false;
        let descriptor = SoapDescriptor::new(parameters.clone()).unwrap();
        assert_eq!(descriptor.variant(1), KernelVariant::SingleSpecies);
        assert_eq!(descriptor.variant(3), KernelVariant::NonCross);
        assert_eq!(descriptor.n_features(3), 10 * 4 * 3);

        parameters.radial_basis = RadialBasisKind::Polynomial;
        let descriptor = SoapDescriptor::new(parameters).unwrap();
        assert_eq!(descriptor.variant(1), KernelVariant::Polynomial);
        assert_eq!(descriptor.variant(3), KernelVariant::Polynomial);
        assert_eq!(descriptor.n_features(3), 10 * 4 * 6);
    }

    #[test]
    fn invalid_parameters() {
        let error = SoapDescriptor::new(SoapParameters::new(5.0, 4, 10)).unwrap_err();
        assert!(matches!(error, Error::InvalidParameter(_)));

        let error = SoapDescriptor::from_json(r#"{"cutoff": 5.0}"#).unwrap_err();
        assert!(matches!(error, Error::Json(_)));
    }

    #[test]
    fn no_points() {
        let descriptor = SoapDescriptor::new(SoapParameters::new(5.0, 4, 3)).unwrap();
        let values = descriptor.compute_local(&water(), &[]).unwrap();
        assert_eq!(values.shape(), [0, 10 * 4 * 3]);
    }

    #[test]
    fn empty_structure() {
        let descriptor = SoapDescriptor::new(SoapParameters::new(5.0, 4, 3)).unwrap();
        let system = SimpleSystem::new(UnitCell::infinite());
        let error = descriptor.compute(&system).unwrap_err();
        assert!(matches!(error, Error::InvalidParameter(_)));
    }

    #[test]
    fn restricted_species() {
        let mut parameters = SoapParameters::new(5.0, 4, 3);
        parameters.species = Some(vec![1, 6, 8]);
        let descriptor = SoapDescriptor::new(parameters).unwrap();

        let values = descriptor.compute(&water()).unwrap();
        assert_eq!(values.shape(), [3, descriptor.n_features(3)]);

        // the carbon channels are empty
        let carbon_carbon = KernelVariant::Cross.n_features(4, 3, 1);
        let start = 3 * carbon_carbon;
        for row in values.rows() {
            assert!(row.iter().skip(start).take(carbon_carbon).all(|&v| v == 0.0));
        }
    }

    struct WrongLength;
    impl SoapKernel for WrongLength {
        fn cross(&self, _: &GtoKernelInput<'_>) -> Result<Vec<f64>, Error> {
            Ok(vec![0.0; 3])
        }
    }

    struct Panicking;
    impl SoapKernel for Panicking {
        fn cross(&self, _: &GtoKernelInput<'_>) -> Result<Vec<f64>, Error> {
            panic!("corrupted input buffer")
        }
    }

    #[test]
    fn kernel_failures() {
        let registry = Arc::new(KernelRegistry::builder().register(KernelVariant::Cross, WrongLength).build());
        let descriptor = SoapDescriptor::with_kernels(SoapParameters::new(5.0, 4, 3), registry).unwrap();
        let error = descriptor.compute(&water()).unwrap_err();
        assert!(matches!(error, Error::Kernel(_)));
        assert!(error.to_string().contains("returned 3 values"));

        let registry = Arc::new(KernelRegistry::builder().register(KernelVariant::Cross, Panicking).build());
        let descriptor = SoapDescriptor::with_kernels(SoapParameters::new(5.0, 4, 3), registry).unwrap();
        let error = descriptor.compute(&water()).unwrap_err();
        assert_eq!(error.to_string(), "kernel error: kernel panicked: corrupted input buffer");
    }

    #[test]
    fn equivalent_hydrogens() {
        let descriptor = SoapDescriptor::new(SoapParameters::new(5.0, 4, 3)).unwrap();
        let values = descriptor.compute(&water()).unwrap();
        let scale = values.iter().fold(0.0, |max, value| f64::max(max, value.abs()));
        for (a, b) in values.row(1).iter().zip(values.row(2)) {
            assert_relative_eq!(a, b, max_relative = 1e-10, epsilon = 1e-12 * scale);
        }
    }
}
