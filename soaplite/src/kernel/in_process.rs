use std::f64::consts::PI;

use rayon::prelude::*;

use crate::math::{SphericalHarmonics, SphericalHarmonicsArray, QUADRATURE_POINTS};
use crate::math::{GAUSS_LEGENDRE_WEIGHTS, scaled_modified_spherical_bessel};
use crate::basis::{GTO_ANGULAR_CHANNELS, POLYNOMIAL_MAX_ANGULAR};
use crate::{Error, Vector3D};

use super::{GtoKernelInput, KernelVariant, PolynomialKernelInput, SoapKernel};

/// Pure Rust implementation of all the kernel variants.
///
/// The density of each species around a query point is a sum of Gaussians
/// `e^{-η |r - r_i|^2}` centered on the atoms closer than the hard cutoff.
/// This density is expanded on the radial basis times real spherical
/// harmonics, and the expansion coefficients `c_{nlm}` are combined into the
/// power spectrum `p^{ab}_{n n' l} = π \sqrt{8 / (2l + 1)} Σ_m c^a_{nlm} c^b_{n'lm}`.
///
/// Query points are processed in parallel, and the output does not depend on
/// the number of threads.
#[derive(Debug, Clone, Copy, Default)]
pub struct InProcessKernel;

impl SoapKernel for InProcessKernel {
    fn single_species(&self, input: &GtoKernelInput<'_>) -> Result<Vec<f64>, Error> {
        if input.n_species != 1 {
            return Err(Error::Kernel(format!(
                "the single species kernel expects exactly one species, got {}", input.n_species
            )));
        }
        gto_power_spectrum(input, KernelVariant::SingleSpecies)
    }

    fn non_cross(&self, input: &GtoKernelInput<'_>) -> Result<Vec<f64>, Error> {
        gto_power_spectrum(input, KernelVariant::NonCross)
    }

    fn cross(&self, input: &GtoKernelInput<'_>) -> Result<Vec<f64>, Error> {
        gto_power_spectrum(input, KernelVariant::Cross)
    }

    fn polynomial(&self, input: &PolynomialKernelInput<'_>) -> Result<Vec<f64>, Error> {
        polynomial_power_spectrum(input)
    }
}

/// Shape information shared by all the kernel inputs
struct Dimensions<'a> {
    atom_positions: &'a [f64],
    query_positions: &'a [f64],
    species_counts: &'a [usize],
    total_atoms: usize,
    n_species: usize,
    max_radial: usize,
    max_angular: usize,
    n_queries: usize,
    cutoff_hard: f64,
    eta: f64,
}

impl Dimensions<'_> {
    fn check(&self) -> Result<(), Error> {
        let mismatch = |name: &str, expected: usize, actual: usize| {
            Err(Error::Kernel(format!(
                "wrong size for {}: expected {} values, got {}", name, expected, actual
            )))
        };

        if self.atom_positions.len() != 3 * self.total_atoms {
            return mismatch("atom positions", 3 * self.total_atoms, self.atom_positions.len());
        }

        if self.query_positions.len() != 3 * self.n_queries {
            return mismatch("query positions", 3 * self.n_queries, self.query_positions.len());
        }

        if self.n_species == 0 || self.species_counts.len() != self.n_species {
            return mismatch("species counts", self.n_species, self.species_counts.len());
        }

        let counted = self.species_counts.iter().sum::<usize>();
        if counted != self.total_atoms {
            return Err(Error::Kernel(format!(
                "species counts add up to {} atoms, but total_atoms is {}", counted, self.total_atoms
            )));
        }

        if self.max_radial == 0 {
            return Err(Error::Kernel("max_radial must be at least 1".into()));
        }

        if !(self.eta > 0.0 && self.cutoff_hard > 0.0) {
            return Err(Error::Kernel(format!(
                "eta and the hard cutoff must be positive, got eta={} and cutoff_hard={}",
                self.eta, self.cutoff_hard
            )));
        }

        Ok(())
    }

    /// Number of `(l, m)` pairs for all `l <= max_angular`
    fn n_lm(&self) -> usize {
        (self.max_angular + 1) * (self.max_angular + 1)
    }

    /// Iterate over the atoms of each species, as `(species index, position)`
    fn atoms(&self) -> impl Iterator<Item = (usize, Vector3D)> + '_ {
        let species = self.species_counts.iter()
            .enumerate()
            .flat_map(|(species, &count)| std::iter::repeat(species).take(count));

        species.zip(self.atom_positions.chunks_exact(3))
            .map(|(species, position)| (species, Vector3D::new(position[0], position[1], position[2])))
    }
}

/// Per-thread scratch memory for the kernels
struct Scratch {
    spherical_harmonics: SphericalHarmonics,
    harmonics: SphericalHarmonicsArray,
    /// expansion coefficients, `[species, n, (l, m)]`
    coefficients: Vec<f64>,
    /// radial part of the expansion for one atom, `[l, n]`
    radial: Vec<f64>,
}

impl Scratch {
    fn new(dimensions: &Dimensions<'_>) -> Scratch {
        Scratch {
            spherical_harmonics: SphericalHarmonics::new(dimensions.max_angular),
            harmonics: SphericalHarmonicsArray::new(dimensions.max_angular),
            coefficients: vec![0.0; dimensions.n_species * dimensions.max_radial * dimensions.n_lm()],
            radial: vec![0.0; (dimensions.max_angular + 1) * dimensions.max_radial],
        }
    }

    /// Accumulate the contribution of one atom to the expansion coefficients,
    /// using the radial part currently stored in `self.radial`. Only `l = 0`
    /// contributes for atoms at the query point.
    fn accumulate(&mut self, dimensions: &Dimensions<'_>, species: usize, direction: Option<Vector3D>) {
        let n_lm = dimensions.n_lm();
        let max_radial = dimensions.max_radial;

        match direction {
            Some(direction) => {
                self.spherical_harmonics.compute(direction, &mut self.harmonics);
                for n in 0..max_radial {
                    let start = (species * max_radial + n) * n_lm;
                    let coefficients = &mut self.coefficients[start..start + n_lm];
                    for l in 0..=dimensions.max_angular {
                        let radial = self.radial[l * max_radial + n];
                        let harmonics = self.harmonics.slice(l);
                        for (coefficient, y_lm) in coefficients[l * l..].iter_mut().zip(harmonics) {
                            *coefficient += radial * y_lm;
                        }
                    }
                }
            }
            None => {
                let y_00 = 0.5 / f64::sqrt(PI);
                for n in 0..max_radial {
                    let start = (species * max_radial + n) * n_lm;
                    self.coefficients[start] += self.radial[n] * y_00;
                }
            }
        }
    }

    /// Combine the expansion coefficients into the power spectrum for one
    /// query point
    fn power_spectrum(&self, dimensions: &Dimensions<'_>, variant: KernelVariant, output: &mut [f64]) {
        let n_lm = dimensions.n_lm();
        let max_radial = dimensions.max_radial;

        let normalization = (0..=dimensions.max_angular)
            .map(|l| PI * f64::sqrt(8.0 / (2 * l + 1) as f64))
            .collect::<Vec<_>>();

        let mut feature = 0;
        for species_a in 0..dimensions.n_species {
            let species_b_range = if variant.includes_cross_species() {
                species_a..dimensions.n_species
            } else {
                species_a..(species_a + 1)
            };

            for species_b in species_b_range {
                for n1 in 0..max_radial {
                    let start_1 = (species_a * max_radial + n1) * n_lm;
                    for n2 in n1..max_radial {
                        let start_2 = (species_b * max_radial + n2) * n_lm;
                        for l in 0..=dimensions.max_angular {
                            let lm_start = l * l;
                            let lm_stop = lm_start + 2 * l + 1;
                            let c_1 = &self.coefficients[(start_1 + lm_start)..(start_1 + lm_stop)];
                            let c_2 = &self.coefficients[(start_2 + lm_start)..(start_2 + lm_stop)];

                            let sum = c_1.iter().zip(c_2).map(|(a, b)| a * b).sum::<f64>();
                            output[feature] = normalization[l] * sum;
                            feature += 1;
                        }
                    }
                }
            }
        }
        debug_assert_eq!(feature, output.len());
    }
}

/// Run `compute_coefficients` for every query point in parallel, and store
/// the corresponding power spectrum in the output
fn power_spectrum_by_query<F>(dimensions: &Dimensions<'_>, variant: KernelVariant, compute_coefficients: F) -> Vec<f64>
    where F: Fn(&mut Scratch, Vector3D) + Sync
{
    let n_features = variant.n_features(dimensions.max_radial, dimensions.max_angular, dimensions.n_species);
    let mut output = vec![0.0; dimensions.n_queries * n_features];
    if output.is_empty() {
        return output;
    }

    output.par_chunks_mut(n_features)
        .zip(dimensions.query_positions.par_chunks(3))
        .for_each_init(
            || Scratch::new(dimensions),
            |scratch, (row, query)| {
                scratch.coefficients.fill(0.0);
                compute_coefficients(scratch, Vector3D::new(query[0], query[1], query[2]));
                scratch.power_spectrum(dimensions, variant, row);
            }
        );

    return output;
}

#[time_graph::instrument(name = "InProcessKernel::gto")]
fn gto_power_spectrum(input: &GtoKernelInput<'_>, variant: KernelVariant) -> Result<Vec<f64>, Error> {
    let dimensions = Dimensions {
        atom_positions: input.atom_positions,
        query_positions: input.query_positions,
        species_counts: input.species_counts,
        total_atoms: input.total_atoms,
        n_species: input.n_species,
        max_radial: input.max_radial,
        max_angular: input.max_angular,
        n_queries: input.n_queries,
        cutoff_hard: input.cutoff_hard,
        eta: input.eta,
    };
    dimensions.check()?;

    if input.max_angular >= GTO_ANGULAR_CHANNELS {
        return Err(Error::Kernel(format!(
            "the GTO kernels support max_angular up to {}, got {}",
            GTO_ANGULAR_CHANNELS - 1, input.max_angular
        )));
    }

    let max_radial = input.max_radial;
    if input.alphas.len() != GTO_ANGULAR_CHANNELS * max_radial {
        return Err(Error::Kernel(format!(
            "wrong size for alphas: expected {} values, got {}",
            GTO_ANGULAR_CHANNELS * max_radial, input.alphas.len()
        )));
    }

    if input.betas.len() != GTO_ANGULAR_CHANNELS * max_radial * max_radial {
        return Err(Error::Kernel(format!(
            "wrong size for betas: expected {} values, got {}",
            GTO_ANGULAR_CHANNELS * max_radial * max_radial, input.betas.len()
        )));
    }

    let eta = input.eta;
    let cutoff2 = input.cutoff_hard * input.cutoff_hard;
    let pi_3_2 = PI * f64::sqrt(PI);

    let output = power_spectrum_by_query(&dimensions, variant, |scratch, query| {
        for (species, position) in dimensions.atoms() {
            let vector = position - query;
            let distance2 = vector.norm2();
            if distance2 >= cutoff2 {
                continue;
            }

            let distance = f64::sqrt(distance2);
            let at_center = distance < 1e-12;
            let max_angular = if at_center { 0 } else { input.max_angular };

            // c_nl = π^{3/2} r^l Σ_k β_nk η^l (α_k + η)^{-(l + 3/2)} e^{-α_k η r^2 / (α_k + η)}
            for l in 0..=max_angular {
                let eta_r_l = (eta * distance).powi(l as i32);
                let alphas = &input.alphas[l * max_radial..(l + 1) * max_radial];
                let betas = &input.betas[l * max_radial * max_radial..(l + 1) * max_radial * max_radial];
                for n in 0..max_radial {
                    let mut sum = 0.0;
                    for (k, &alpha) in alphas.iter().enumerate() {
                        let alpha_eta = alpha + eta;
                        sum += betas[n * max_radial + k]
                            * alpha_eta.powf(-(l as f64 + 1.5))
                            * f64::exp(-alpha * eta * distance2 / alpha_eta);
                    }
                    scratch.radial[l * max_radial + n] = pi_3_2 * eta_r_l * sum;
                }
            }

            let direction = if at_center { None } else { Some(vector / distance) };
            scratch.accumulate(&dimensions, species, direction);
        }
    });

    return Ok(output);
}

#[time_graph::instrument(name = "InProcessKernel::polynomial")]
fn polynomial_power_spectrum(input: &PolynomialKernelInput<'_>) -> Result<Vec<f64>, Error> {
    let dimensions = Dimensions {
        atom_positions: input.atom_positions,
        query_positions: input.query_positions,
        species_counts: input.species_counts,
        total_atoms: input.total_atoms,
        n_species: input.n_species,
        max_radial: input.max_radial,
        max_angular: input.max_angular,
        n_queries: input.n_queries,
        cutoff_hard: input.cutoff_hard,
        eta: input.eta,
    };
    dimensions.check()?;

    if input.max_angular > POLYNOMIAL_MAX_ANGULAR {
        return Err(Error::Kernel(format!(
            "the polynomial kernel supports max_angular up to {}, got {}",
            POLYNOMIAL_MAX_ANGULAR, input.max_angular
        )));
    }

    let max_radial = input.max_radial;
    if input.rx.len() != QUADRATURE_POINTS {
        return Err(Error::Kernel(format!(
            "wrong size for rx: expected {} values, got {}", QUADRATURE_POINTS, input.rx.len()
        )));
    }

    if input.table.len() != max_radial * QUADRATURE_POINTS {
        return Err(Error::Kernel(format!(
            "wrong size for the radial table: expected {} values, got {}",
            max_radial * QUADRATURE_POINTS, input.table.len()
        )));
    }

    let eta = input.eta;
    let cutoff2 = input.cutoff_hard * input.cutoff_hard;
    let half_range = 0.5 * input.cutoff_hard;

    // quadrature weights including the r^2 d^3r factor and the 4π from the
    // angular integration
    let weights = input.rx.iter()
        .zip(GAUSS_LEGENDRE_WEIGHTS.iter())
        .map(|(&r, &w)| 4.0 * PI * w * half_range * r * r)
        .collect::<Vec<_>>();

    let output = power_spectrum_by_query(&dimensions, KernelVariant::Polynomial, |scratch, query| {
        let mut bessel = vec![0.0; input.max_angular + 1];
        for (species, position) in dimensions.atoms() {
            let vector = position - query;
            let distance2 = vector.norm2();
            if distance2 >= cutoff2 {
                continue;
            }

            let distance = f64::sqrt(distance2);
            let at_center = distance < 1e-12;

            // R_nl = Σ_q w_q g_n(r_q) e^{-η (r_q - r)^2} e^{-x} i_l(x), x = 2 η r_q r
            scratch.radial.fill(0.0);
            for (q, (&r, &weight)) in input.rx.iter().zip(&weights).enumerate() {
                let gaussian = f64::exp(-eta * (r - distance) * (r - distance));
                scaled_modified_spherical_bessel(2.0 * eta * r * distance, &mut bessel);
                for (l, &b_l) in bessel.iter().enumerate() {
                    let factor = weight * gaussian * b_l;
                    for n in 0..max_radial {
                        scratch.radial[l * max_radial + n] += factor * input.table[n * QUADRATURE_POINTS + q];
                    }
                }
            }

            let direction = if at_center { None } else { Some(vector / distance) };
            scratch.accumulate(&dimensions, species, direction);
        }
    });

    return Ok(output);
}
