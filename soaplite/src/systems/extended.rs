use crate::{Error, Matrix3, Vector3D};

use super::{SimpleSystem, System, UnitCell};

/// Maximal number of periodic copies of the unit cell considered when
/// building an extended system
pub const MAX_NUMBER_OF_CELLS: f64 = 1e5;

/// A cell shift represents the displacement along cell vectors between an
/// atom and one of its periodic images.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct CellShift([i32; 3]);

impl CellShift {
    /// Create a new cell shift from the number of cell vectors along each
    /// axis
    pub fn new(shift: [i32; 3]) -> CellShift {
        CellShift(shift)
    }

    /// Check if this is the null shift, i.e. the original cell
    pub fn is_zero(&self) -> bool {
        self.0 == [0, 0, 0]
    }

    /// Compute the shift vector in Cartesian coordinates, using the given
    /// cell matrix (with cell vectors as rows)
    pub fn cartesian(&self, cell: &Matrix3) -> Vector3D {
        let fractional = Vector3D::new(self[0] as f64, self[1] as f64, self[2] as f64);
        return cell.transposed() * fractional;
    }
}

impl std::ops::Index<usize> for CellShift {
    type Output = i32;

    fn index(&self, index: usize) -> &i32 {
        &self.0[index]
    }
}

/// A finite structure containing the atoms of a periodic system, together
/// with all of their periodic images that might be within a given cutoff of
/// the original atoms.
#[derive(Debug, Clone)]
pub struct ExtendedSystem {
    /// Finite system (with an infinite cell) containing the original atoms
    /// first, followed by the periodic images
    pub system: SimpleSystem,
    /// Cell shift of each atom in `system`, relative to the original atom
    pub cell_shifts: Vec<CellShift>,
    /// Index of the original atom for each atom in `system`
    pub atoms: Vec<usize>,
}

/// Build an [`ExtendedSystem`] containing all periodic images of the atoms in
/// `system` which are closer than `radial_cutoff` to the region spanned by
/// the original atoms and the unit cell.
///
/// The region is measured as a slab along each of the three face normals of
/// the cell, so the result is a superset of the images within
/// `radial_cutoff` of any original atom. Non-periodic systems are copied
/// without adding any image.
#[time_graph::instrument(name = "extended_system")]
pub fn extended_system(system: &dyn System, radial_cutoff: f64) -> Result<ExtendedSystem, Error> {
    if !(radial_cutoff >= 0.0 && radial_cutoff.is_finite()) {
        return Err(Error::InvalidParameter(format!(
            "expected a positive radial cutoff to extend the system, got {}", radial_cutoff
        )));
    }

    let cell = system.cell()?;
    let species = system.species()?;
    let positions = system.positions()?;

    let mut extended = ExtendedSystem {
        system: SimpleSystem::new(UnitCell::infinite()),
        cell_shifts: Vec::new(),
        atoms: Vec::new(),
    };

    for (atom, (&atom_species, &position)) in species.iter().zip(positions).enumerate() {
        extended.system.add_atom(atom_species, position);
        extended.cell_shifts.push(CellShift::default());
        extended.atoms.push(atom);
    }

    if cell.is_infinite() || positions.is_empty() {
        return Ok(extended);
    }

    let normals = cell.face_normals();
    let distances = cell.distances_between_faces();

    let mut slabs = [(0.0, 0.0); 3];
    let mut float_ranges = [(0.0, 0.0); 3];
    for axis in 0..3 {
        let (min, max) = positions.iter()
            .map(|&position| position * normals[axis])
            .fold((f64::INFINITY, f64::NEG_INFINITY), |(min, max), t| (f64::min(min, t), f64::max(max, t)));

        let lower = f64::min(0.0, min) - radial_cutoff;
        let upper = f64::max(distances[axis], max) + radial_cutoff;
        slabs[axis] = (lower, upper);

        // shifting by one cell vector moves the projection on the
        // corresponding face normal by the distance between faces
        float_ranges[axis] = (
            f64::floor((lower - max) / distances[axis]),
            f64::ceil((upper - min) / distances[axis]),
        );
    }

    // computed before any conversion to integers, since degenerate cells
    // give arbitrarily large (or NaN) ranges
    let n_cells = float_ranges.iter()
        .map(|(start, stop)| stop - start + 1.0)
        .product::<f64>();
    let fits_i32 = |value: f64| value >= i32::MIN as f64 && value <= i32::MAX as f64;
    let ranges_fit = float_ranges.iter().all(|&(start, stop)| fits_i32(start) && fits_i32(stop));
    if !(n_cells <= MAX_NUMBER_OF_CELLS) || !ranges_fit {
        return Err(Error::InvalidParameter(format!(
            "extending this system would require {} periodic copies of the \
            unit cell, the cutoff is too large compared to the cell", n_cells
        )));
    }

    let mut shift_ranges = [(0, 0); 3];
    for (range, &(start, stop)) in shift_ranges.iter_mut().zip(&float_ranges) {
        *range = (start as i32, stop as i32);
    }

    let matrix = cell.matrix();
    let in_slabs = |position: Vector3D| {
        (0..3).all(|axis| {
            let t = position * normals[axis];
            let (lower, upper) = slabs[axis];
            t >= lower && t <= upper
        })
    };

    for a in shift_ranges[0].0..=shift_ranges[0].1 {
        for b in shift_ranges[1].0..=shift_ranges[1].1 {
            for c in shift_ranges[2].0..=shift_ranges[2].1 {
                let shift = CellShift::new([a, b, c]);
                if shift.is_zero() {
                    continue;
                }

                let displacement = shift.cartesian(&matrix);
                for (atom, (&atom_species, &position)) in species.iter().zip(positions).enumerate() {
                    let image = position + displacement;
                    if in_slabs(image) {
                        extended.system.add_atom(atom_species, image);
                        extended.cell_shifts.push(shift);
                        extended.atoms.push(atom);
                    }
                }
            }
        }
    }

    return Ok(extended);
}
