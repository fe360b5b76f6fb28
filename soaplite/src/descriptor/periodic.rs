use ndarray::Array2;

use crate::systems::{extended_system, UnitCell};
use crate::{Error, SimpleSystem, System, Vector3D};

use super::SoapDescriptor;

/// Get the distance around the unit cell in which periodic images must be
/// included, for atomic Gaussian densities `e^{-eta r^2}` and the given
/// `cutoff`. This adds three standard deviations of the Gaussians to the
/// cutoff.
pub fn extended_cutoff(cutoff: f64, eta: f64) -> f64 {
    let sigma = f64::sqrt(1.0 / (2.0 * eta));
    return cutoff + 3.0 * sigma;
}

/// Replicate a periodic `system` into a finite structure, containing the
/// original atoms first and then all periodic images that are close enough
/// to contribute to the descriptor with the given `cutoff` and `eta`.
///
/// Systems without a unit cell are returned unchanged, with a warning.
pub fn extend_periodic(system: &dyn System, cutoff: f64, eta: f64) -> Result<SimpleSystem, Error> {
    if system.cell()?.is_infinite() {
        log::warn!("trying to extend a system without unit cell, the system will be used as is");

        let mut copy = SimpleSystem::try_from(system)?;
        copy.set_cell(UnitCell::infinite());
        return Ok(copy);
    }

    let extended = extended_system(system, extended_cutoff(cutoff, eta))?;
    log::debug!(
        "extended a periodic system from {} to {} atoms",
        system.size()?, extended.system.size()?
    );

    return Ok(extended.system);
}

impl SoapDescriptor {
    /// Compute the descriptor of a periodic `system` at the given `points`.
    ///
    /// The system is extended with the periodic images of its atoms before
    /// the calculation, and the points are used as given: they are not
    /// wrapped inside the unit cell.
    pub fn compute_periodic_local(&self, system: &dyn System, points: &[Vector3D]) -> Result<Array2<f64>, Error> {
        let extended = extend_periodic(system, self.parameters.cutoff, self.parameters.eta)?;
        return self.compute_local(&extended, points);
    }

    /// Compute the descriptor of a periodic `system` at all of its atoms.
    pub fn compute_periodic(&self, system: &dyn System) -> Result<Array2<f64>, Error> {
        let points = system.positions()?.to_vec();
        return self.compute_periodic_local(system, &points);
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;

    use crate::SoapParameters;
    use super::*;

    #[test]
    fn cutoff() {
        assert_relative_eq!(extended_cutoff(5.0, 0.5), 8.0);
        assert_relative_eq!(extended_cutoff(5.0, 2.0), 6.5);
    }

    #[test]
    fn non_periodic() {
        let mut system = SimpleSystem::new(UnitCell::infinite());
        system.add_atom(6, Vector3D::new(0.0, 0.0, 0.0));
        system.add_atom(1, Vector3D::new(1.1, 0.0, 0.0));

        let extended = extend_periodic(&system, 5.0, 1.0).unwrap();
        assert_eq!(extended, system);
    }

    #[test]
    fn cubic_cell() {
        let mut system = SimpleSystem::new(UnitCell::cubic(10.0));
        system.add_atom(6, Vector3D::new(5.0, 5.0, 5.0));

        // 5 + 3 * 0.5 = 6.5 around the cell: the single atom is more than
        // 6.5 away from the cell faces of all of its images except the
        // neighboring cells along each axis
        let extended = extend_periodic(&system, 5.0, 2.0).unwrap();
        assert!(extended.cell().unwrap().is_infinite());
        assert_eq!(extended.size().unwrap(), 27);
        assert_eq!(extended.positions().unwrap()[0], Vector3D::new(5.0, 5.0, 5.0));
    }

    #[test]
    fn periodic_descriptor() {
        // with wide Gaussians, the extended system contains all atoms
        // within the hard cutoff of the original atoms
        let mut parameters = SoapParameters::new(4.0, 4, 3);
        parameters.eta = 0.1;
        assert!(extended_cutoff(parameters.cutoff, parameters.eta) > parameters.hard_cutoff());
        let descriptor = SoapDescriptor::new(parameters).unwrap();

        let mut system = SimpleSystem::new(UnitCell::cubic(6.0));
        system.add_atom(14, Vector3D::new(0.5, 0.5, 0.5));
        system.add_atom(14, Vector3D::new(3.5, 3.5, 3.5));

        let values = descriptor.compute_periodic(&system).unwrap();
        assert_eq!(values.shape(), [2, descriptor.n_features(1)]);

        // both atoms have the same environment in the periodic crystal. Some
        // features vanish by symmetry, and are only compared up to rounding
        // errors
        let scale = values.iter().fold(0.0, |max, value| f64::max(max, value.abs()));
        for (a, b) in values.row(0).iter().zip(values.row(1)) {
            assert_relative_eq!(a, b, max_relative = 1e-8, epsilon = 1e-10 * scale);
        }

        // in the finite structure, the atoms are related by inversion
        let finite = descriptor.compute(&system).unwrap();
        let scale = finite.iter().fold(0.0, |max, value| f64::max(max, value.abs()));
        for (a, b) in finite.row(0).iter().zip(finite.row(1)) {
            assert_relative_eq!(a, b, max_relative = 1e-10, epsilon = 1e-10 * scale);
        }
        assert!(finite.row(0).iter().zip(values.row(0)).any(|(a, b)| (a - b).abs() > 1e-6));
    }
}
