use crate::Error;

use super::{UnitCell, System, Vector3D};

/// A simple implementation of `System`, storing atoms in memory
#[derive(Clone, Debug, PartialEq)]
pub struct SimpleSystem {
    cell: UnitCell,
    species: Vec<i32>,
    positions: Vec<Vector3D>,
}

impl SimpleSystem {
    /// Create a new empty system with the given unit cell
    pub fn new(cell: UnitCell) -> SimpleSystem {
        SimpleSystem {
            cell: cell,
            species: Vec::new(),
            positions: Vec::new(),
        }
    }

    /// Add an atom with the given species and position to this system
    pub fn add_atom(&mut self, species: i32, position: Vector3D) {
        self.species.push(species);
        self.positions.push(position);
    }

    /// Change the unit cell of this system
    pub fn set_cell(&mut self, cell: UnitCell) {
        self.cell = cell;
    }
}

impl System for SimpleSystem {
    fn cell(&self) -> Result<UnitCell, Error> {
        Ok(self.cell)
    }

    fn size(&self) -> Result<usize, Error> {
        Ok(self.species.len())
    }

    fn species(&self) -> Result<&[i32], Error> {
        Ok(&self.species)
    }

    fn positions(&self) -> Result<&[Vector3D], Error> {
        Ok(&self.positions)
    }
}

impl std::convert::TryFrom<&dyn System> for SimpleSystem {
    type Error = Error;

    fn try_from(system: &dyn System) -> Result<SimpleSystem, Error> {
        let species = system.species()?;
        let positions = system.positions()?;
        if species.len() != positions.len() {
            return Err(Error::InvalidParameter(format!(
                "system has {} species but {} positions", species.len(), positions.len()
            )));
        }

        Ok(SimpleSystem {
            cell: system.cell()?,
            species: species.to_vec(),
            positions: positions.to_vec(),
        })
    }
}
