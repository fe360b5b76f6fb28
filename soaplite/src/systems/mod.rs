use crate::{Error, Vector3D};

mod cell;
pub use self::cell::{UnitCell, CellShape};

mod simple_system;
pub use self::simple_system::SimpleSystem;

mod species;
pub use self::species::SpeciesPartition;

mod extended;
pub use self::extended::{CellShift, ExtendedSystem, extended_system, MAX_NUMBER_OF_CELLS};

mod chemfiles;
pub use self::chemfiles::read_from_file;

/// A `System` gives access to the atoms of a structure: their atomic species,
/// their positions and the unit cell.
///
/// SOAP descriptors only read from systems, and never modify them.
pub trait System: Send + Sync {
    /// Get the unit cell for this system
    fn cell(&self) -> Result<UnitCell, Error>;

    /// Get the number of atoms in this system
    fn size(&self) -> Result<usize, Error>;

    /// Get the atomic species for all atoms in this system. The returned
    /// value must be a slice of length `self.size()`, where each different
    /// species is identified with a different integer value. These values are
    /// usually the atomic number, but don't have to.
    fn species(&self) -> Result<&[i32], Error>;

    /// Get the positions for all atoms in this system. The returned value must
    /// be a slice of length `self.size()` containing the Cartesian coordinates
    /// of all atoms in the system.
    fn positions(&self) -> Result<&[Vector3D], Error>;
}
