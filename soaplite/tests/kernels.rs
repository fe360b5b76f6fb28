use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use soaplite::kernel::{GtoKernelInput, InProcessKernel, PolynomialKernelInput};
use soaplite::{Error, KernelRegistry, KernelVariant, SoapKernel};
use soaplite::{RadialBasisKind, SoapDescriptor, SoapParameters, Vector3D};

mod data;

/// Kernel forwarding to the in-process implementation, and counting how many
/// times each variant is called
#[derive(Default)]
struct CountingKernel {
    gto: AtomicUsize,
    polynomial: AtomicUsize,
}

impl SoapKernel for CountingKernel {
    fn single_species(&self, input: &GtoKernelInput<'_>) -> Result<Vec<f64>, Error> {
        self.gto.fetch_add(1, Ordering::SeqCst);
        InProcessKernel.single_species(input)
    }

    fn cross(&self, input: &GtoKernelInput<'_>) -> Result<Vec<f64>, Error> {
        self.gto.fetch_add(1, Ordering::SeqCst);
        assert_eq!(input.species_counts.iter().sum::<usize>(), input.total_atoms);
        assert_eq!(input.alphas.len(), 10 * input.max_radial);
        assert_eq!(input.betas.len(), 10 * input.max_radial * input.max_radial);
        InProcessKernel.cross(input)
    }

    fn polynomial(&self, input: &PolynomialKernelInput<'_>) -> Result<Vec<f64>, Error> {
        self.polynomial.fetch_add(1, Ordering::SeqCst);
        assert_eq!(input.rx.len(), 100);
        assert_eq!(input.table.len(), 100 * input.max_radial);
        InProcessKernel.polynomial(input)
    }
}

#[test]
fn custom_registry() {
    let kernel = Arc::new(CountingKernel::default());
    let registry = KernelRegistry::builder()
        .register_shared(KernelVariant::SingleSpecies, kernel.clone())
        .register_shared(KernelVariant::Cross, kernel.clone())
        .register_shared(KernelVariant::Polynomial, kernel.clone())
        .build();
    let registry = Arc::new(registry);

    let formamide = data::load_structure("formamide");
    let methane = data::load_structure("methane");

    let parameters = SoapParameters::new(5.0, 4, 3);
    let custom = SoapDescriptor::with_kernels(parameters.clone(), Arc::clone(&registry)).unwrap();
    let global = SoapDescriptor::new(parameters).unwrap();

    assert_eq!(custom.compute(&formamide).unwrap(), global.compute(&formamide).unwrap());
    assert_eq!(kernel.gto.load(Ordering::SeqCst), 1);

    let mut parameters = SoapParameters::new(5.0, 4, 3);
    parameters.radial_basis = RadialBasisKind::Polynomial;
    let custom = SoapDescriptor::with_kernels(parameters.clone(), registry).unwrap();
    let global = SoapDescriptor::new(parameters).unwrap();

    assert_eq!(custom.compute(&methane).unwrap(), global.compute(&methane).unwrap());
    assert_eq!(kernel.polynomial.load(Ordering::SeqCst), 1);
    assert_eq!(kernel.gto.load(Ordering::SeqCst), 1);
}

#[test]
fn missing_variant() {
    let registry = KernelRegistry::builder()
        .register(KernelVariant::Cross, InProcessKernel)
        .build();
    let registry = Arc::new(registry);
    assert!(!registry.contains(KernelVariant::NonCross));

    let mut parameters = SoapParameters::new(5.0, 4, 3);
    parameters.cross_over = false;
    let descriptor = SoapDescriptor::with_kernels(parameters, registry).unwrap();

    let formamide = data::load_structure("formamide");
    let error = descriptor.compute(&formamide).unwrap_err();
    assert!(matches!(error, Error::KernelLoad(_)));
    assert_eq!(
        error.to_string(),
        "failed to load kernel: no kernel registered for the non cross-species (libsoapPySig) variant"
    );

    // the kernel is not needed without query points
    let values = descriptor.compute_local(&formamide, &[]).unwrap();
    assert_eq!(values.shape(), [0, descriptor.n_features(4)]);
}

#[test]
fn unimplemented_variant() {
    struct GtoOnly;
    impl SoapKernel for GtoOnly {
        fn cross(&self, input: &GtoKernelInput<'_>) -> Result<Vec<f64>, Error> {
            InProcessKernel.cross(input)
        }
    }

    let registry = KernelRegistry::builder()
        .register(KernelVariant::Cross, GtoOnly)
        .register(KernelVariant::Polynomial, GtoOnly)
        .build();
    let registry = Arc::new(registry);

    let mut parameters = SoapParameters::new(5.0, 4, 3);
    parameters.radial_basis = RadialBasisKind::Polynomial;
    let descriptor = SoapDescriptor::with_kernels(parameters, registry).unwrap();

    let error = descriptor.compute(&data::load_structure("methane")).unwrap_err();
    assert!(matches!(error, Error::KernelLoad(_)));
}

#[test]
fn kernel_input_validation() {
    let positions = [0.0, 0.0, 0.0, 0.0, 0.0, 1.0];
    let query = Vector3D::new(0.0, 0.0, 0.5);
    let basis = soaplite::GtoBasis::new(5.0, 3).unwrap();
    let alphas = basis.alphas().iter().copied().collect::<Vec<_>>();
    let betas = basis.betas().iter().copied().collect::<Vec<_>>();

    let mut input = GtoKernelInput {
        atom_positions: &positions,
        query_positions: query.as_array(),
        alphas: &alphas,
        betas: &betas,
        species_counts: &[2],
        cutoff_hard: 10.0,
        total_atoms: 2,
        n_species: 1,
        max_radial: 3,
        max_angular: 2,
        n_queries: 1,
        eta: 1.0,
    };
    assert_eq!(InProcessKernel.single_species(&input).unwrap().len(), 6 * 3);

    input.species_counts = &[1];
    let error = InProcessKernel.single_species(&input).unwrap_err();
    assert!(matches!(error, Error::Kernel(_)));

    input.species_counts = &[2];
    input.n_queries = 2;
    assert!(InProcessKernel.single_species(&input).is_err());
}
