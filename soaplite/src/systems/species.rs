use std::collections::BTreeSet;

use crate::{Error, System};

/// Atoms of a structure grouped by species, in the flat layout consumed by
/// the SOAP kernels.
///
/// Species are sorted in increasing order, and atoms of the same species
/// keep their order from the structure.
#[derive(Debug, Clone, PartialEq)]
pub struct SpeciesPartition {
    species: Vec<i32>,
    counts: Vec<usize>,
    /// x, y, z for each atom, grouped by species
    positions: Vec<f64>,
}

impl SpeciesPartition {
    /// Group the atoms of `system` by species.
    ///
    /// If `restrict_to` is given, only these species are considered: atoms of
    /// other species are dropped, and species absent from the system are
    /// still part of the partition with zero atoms. Otherwise, all the
    /// species present in the system are used.
    #[time_graph::instrument(name = "SpeciesPartition::new")]
    pub fn new(system: &dyn System, restrict_to: Option<&[i32]>) -> Result<SpeciesPartition, Error> {
        let all_species = system.species()?;
        let all_positions = system.positions()?;
        if all_species.is_empty() {
            return Err(Error::InvalidParameter(
                "can not compute SOAP descriptors for a structure without atoms".into()
            ));
        }

        let species = match restrict_to {
            Some(restrict_to) => {
                if restrict_to.is_empty() {
                    return Err(Error::InvalidParameter(
                        "the list of species to consider can not be empty".into()
                    ));
                }
                restrict_to.iter().copied().collect::<BTreeSet<_>>()
            }
            None => all_species.iter().copied().collect::<BTreeSet<_>>(),
        };

        let mut counts = Vec::with_capacity(species.len());
        let mut positions = Vec::with_capacity(3 * all_species.len());
        for &current in &species {
            let mut count = 0;
            for (&atom_species, position) in all_species.iter().zip(all_positions) {
                if atom_species == current {
                    positions.extend_from_slice(position.as_array());
                    count += 1;
                }
            }
            counts.push(count);
        }

        let kept = counts.iter().sum::<usize>();
        if kept != all_species.len() {
            log::debug!(
                "ignoring {} atoms with species outside of {:?}",
                all_species.len() - kept, species
            );
        }

        return Ok(SpeciesPartition {
            species: species.into_iter().collect(),
            counts,
            positions,
        });
    }

    /// Get the sorted list of species in this partition
    pub fn species(&self) -> &[i32] {
        &self.species
    }

    /// Get the number of atoms for each species
    pub fn counts(&self) -> &[usize] {
        &self.counts
    }

    /// Get the positions of all atoms as a flat array of `x, y, z`
    /// coordinates, grouped by species
    pub fn positions(&self) -> &[f64] {
        &self.positions
    }

    /// Get the number of species in this partition
    pub fn n_species(&self) -> usize {
        self.species.len()
    }

    /// Get the total number of atoms in this partition, which can be smaller
    /// than the number of atoms in the system if some species were filtered
    pub fn total_atoms(&self) -> usize {
        self.positions.len() / 3
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::systems::{SimpleSystem, UnitCell};
    use crate::Vector3D;

    fn water_and_methane() -> SimpleSystem {
        let mut system = SimpleSystem::new(UnitCell::infinite());
        system.add_atom(8, Vector3D::new(0.0, 0.0, 0.0));
        system.add_atom(1, Vector3D::new(0.0, 0.75, -0.5));
        system.add_atom(1, Vector3D::new(0.0, -0.75, -0.5));
        system.add_atom(6, Vector3D::new(3.0, 0.0, 0.0));
        system.add_atom(1, Vector3D::new(3.6, 0.6, 0.6));
        system
    }

    #[test]
    fn group_by_species() {
        let system = water_and_methane();
        let partition = SpeciesPartition::new(&system, None).unwrap();

        assert_eq!(partition.species(), [1, 6, 8]);
        assert_eq!(partition.counts(), [3, 1, 1]);
        assert_eq!(partition.n_species(), 3);
        assert_eq!(partition.total_atoms(), 5);
        assert_eq!(partition.positions(), [
            0.0, 0.75, -0.5,
            0.0, -0.75, -0.5,
            3.6, 0.6, 0.6,
            3.0, 0.0, 0.0,
            0.0, 0.0, 0.0,
        ]);
    }

    #[test]
    fn restricted_species() {
        let system = water_and_methane();
        let partition = SpeciesPartition::new(&system, Some(&[8, 1, 29, 1])).unwrap();

        assert_eq!(partition.species(), [1, 8, 29]);
        assert_eq!(partition.counts(), [3, 1, 0]);
        assert_eq!(partition.n_species(), 3);
        // the carbon atom is dropped
        assert_eq!(partition.total_atoms(), 4);
        assert_eq!(partition.counts().iter().sum::<usize>(), partition.total_atoms());
        assert_eq!(partition.positions().len(), 12);
    }

    #[test]
    fn errors() {
        let system = SimpleSystem::new(UnitCell::infinite());
        let error = SpeciesPartition::new(&system, None).unwrap_err();
        assert_eq!(error.to_string(), "invalid parameter: can not compute SOAP descriptors for a structure without atoms");

        let system = water_and_methane();
        assert!(SpeciesPartition::new(&system, Some(&[])).is_err());
    }
}
