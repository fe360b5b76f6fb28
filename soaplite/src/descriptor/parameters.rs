use crate::basis::{RadialBasisKind, GTO_ANGULAR_CHANNELS, HARD_CUTOFF_BUFFER, POLYNOMIAL_MAX_ANGULAR};
use crate::Error;

/// Smallest accepted value for the Gaussian exponent `eta`
const MIN_ETA: f64 = 1e-4;

/// Hard cutoffs (`cutoff + 5`) must lie strictly inside these bounds
const HARD_CUTOFF_RANGE: (f64, f64) = (1.999, 17.0001);

/// Parameters for the SOAP power spectrum descriptor.
///
/// These are usually created from JSON, for example
///
/// ```
/// # use soaplite::SoapParameters;
/// let parameters: SoapParameters = serde_json::from_str(r#"{
///     "cutoff": 5.0,
///     "max_radial": 6,
///     "max_angular": 4,
///     "radial_basis": "Polynomial"
/// }"#).unwrap();
///
/// assert_eq!(parameters.eta, 1.0);
/// assert!(parameters.cross_over);
/// ```
#[derive(Debug, Clone, PartialEq)]
#[derive(serde::Deserialize, serde::Serialize, schemars::JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct SoapParameters {
    /// Spherical cutoff of the atomic environments. Atoms are only ignored
    /// past `cutoff + 5`, where the radial basis functions are negligible.
    pub cutoff: f64,
    /// Number of radial basis functions
    pub max_radial: usize,
    /// Maximal angular channel of the spherical harmonics, included
    pub max_angular: usize,
    /// Exponent of the Gaussian atomic densities `e^{-eta r^2}`
    #[serde(default = "serde_default_eta")]
    pub eta: f64,
    /// Should the power spectrum include cross-species pairs? This is only
    /// used with the GTO basis and multiple species, the polynomial basis
    /// always includes them.
    #[serde(default = "serde_default_cross_over")]
    pub cross_over: bool,
    /// Species to consider in the structures. Atoms of other species are
    /// ignored. By default, all the species present in each structure are
    /// used.
    #[serde(default)]
    pub species: Option<Vec<i32>>,
    /// Family of radial basis functions
    #[serde(default)]
    pub radial_basis: RadialBasisKind,
}

fn serde_default_eta() -> f64 {
    return 1.0;
}

fn serde_default_cross_over() -> bool {
    return true;
}

impl SoapParameters {
    /// Create parameters with the default `eta`, cross-species terms and the
    /// GTO basis
    pub fn new(cutoff: f64, max_radial: usize, max_angular: usize) -> SoapParameters {
        SoapParameters {
            cutoff,
            max_radial,
            max_angular,
            eta: serde_default_eta(),
            cross_over: serde_default_cross_over(),
            species: None,
            radial_basis: RadialBasisKind::default(),
        }
    }

    /// Distance past which atoms do not contribute to the descriptor
    pub fn hard_cutoff(&self) -> f64 {
        self.cutoff + HARD_CUTOFF_BUFFER
    }

    /// Check that these parameters are in the domain supported by the radial
    /// basis and the kernels
    pub fn validate(&self) -> Result<(), Error> {
        let max_angular = match self.radial_basis {
            RadialBasisKind::Gto => GTO_ANGULAR_CHANNELS - 1,
            RadialBasisKind::Polynomial => POLYNOMIAL_MAX_ANGULAR,
        };
        if self.max_angular > max_angular {
            return Err(Error::InvalidParameter(format!(
                "max_angular must be at most {} with the {:?} radial basis, got {}",
                max_angular, self.radial_basis, self.max_angular
            )));
        }

        let hard_cutoff = self.hard_cutoff();
        if !(hard_cutoff > HARD_CUTOFF_RANGE.0 && hard_cutoff < HARD_CUTOFF_RANGE.1) {
            return Err(Error::InvalidParameter(format!(
                "cutoff + {} must be between {} and {}, got cutoff={}",
                HARD_CUTOFF_BUFFER, HARD_CUTOFF_RANGE.0, HARD_CUTOFF_RANGE.1, self.cutoff
            )));
        }

        match self.radial_basis {
            RadialBasisKind::Gto => {
                if self.max_radial < 2 || self.max_radial > 13 {
                    return Err(Error::InvalidParameter(format!(
                        "max_radial must be between 2 and 13 with the GTO radial basis, got {}",
                        self.max_radial
                    )));
                }
            }
            RadialBasisKind::Polynomial => {
                if self.max_radial == 0 {
                    return Err(Error::InvalidParameter(
                        "max_radial must be at least 1 with the polynomial radial basis".into()
                    ));
                }
            }
        }

        // also rejects NaN
        if !(self.eta >= MIN_ETA) {
            return Err(Error::InvalidParameter(format!(
                "eta must be at least {}, got {}", MIN_ETA, self.eta
            )));
        }

        if let Some(species) = &self.species {
            if species.is_empty() {
                return Err(Error::InvalidParameter(
                    "the list of species to consider can not be empty".into()
                ));
            }
        }

        Ok(())
    }
}
