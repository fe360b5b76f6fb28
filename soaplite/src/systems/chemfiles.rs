use std::path::Path;

use super::SimpleSystem;
use crate::Error;

#[cfg(feature = "chemfiles")]
impl From<chemfiles::Error> for Error {
    fn from(error: chemfiles::Error) -> Error {
        Error::Chemfiles(error.message)
    }
}

/// Read all the structures in the file at `path` with
/// [chemfiles](https://chemfiles.org/), using atomic numbers as species.
///
/// Atoms without a known atomic number (e.g. coarse-grained beads) are
/// rejected, since they can not be matched with a species.
#[cfg(feature = "chemfiles")]
pub fn read_from_file(path: impl AsRef<Path>) -> Result<Vec<SimpleSystem>, Error> {
    use crate::Matrix3;
    use super::UnitCell;

    let path = path.as_ref();
    let mut trajectory = chemfiles::Trajectory::open(path, 'r')?;
    let mut frame = chemfiles::Frame::new();

    let mut systems = Vec::new();
    for step in 0..trajectory.nsteps() {
        trajectory.read(&mut frame)?;

        let cell = if frame.cell().shape() == chemfiles::CellShape::Infinite {
            UnitCell::infinite()
        } else {
            // chemfiles stores cell vectors as columns
            UnitCell::new(Matrix3::from(frame.cell().matrix()).transposed())?
        };

        let mut system = SimpleSystem::new(cell);
        for (i, position) in frame.positions().iter().enumerate() {
            let atom = frame.atom(i);
            let atomic_number = atom.atomic_number();
            if atomic_number == 0 {
                return Err(Error::Chemfiles(format!(
                    "atom {} of step {} in '{}' has an unknown type '{}'",
                    i, step, path.display(), atom.atomic_type()
                )));
            }
            system.add_atom(atomic_number as i32, (*position).into());
        }

        systems.push(system);
    }

    log::debug!("read {} structures from '{}'", systems.len(), path.display());
    return Ok(systems);
}

/// Read all the structures in the file at `path` with
/// [chemfiles](https://chemfiles.org/), using atomic numbers as species.
#[cfg(not(feature = "chemfiles"))]
pub fn read_from_file(_: impl AsRef<Path>) -> Result<Vec<SimpleSystem>, Error> {
    Err(Error::Chemfiles(
        "read_from_file is only available with the chemfiles feature enabled".into()
    ))
}
