//! The `UnitCell` type represents the periodic box of a structure.
use crate::{Error, Matrix3, Vector3D};

/// The shape of a cell, which determines how periodic images are generated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CellShape {
    /// Infinite unit cell, for non-periodic structures
    Infinite,
    /// Orthorhombic unit cell, with cuboid shape
    Orthorhombic,
    /// Triclinic unit cell, with arbitrary parallelepiped shape
    Triclinic,
}

/// A `UnitCell` defines the periodic boundaries of a structure. The cell
/// vectors are the rows of the cell matrix.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct UnitCell {
    matrix: Matrix3,
    shape: CellShape,
}

impl UnitCell {
    /// Create a unit cell from the matrix containing the cell vectors as
    /// rows. A matrix full of zeros creates an infinite cell.
    pub fn new(matrix: Matrix3) -> Result<UnitCell, Error> {
        if matrix == Matrix3::zero() {
            return Ok(UnitCell::infinite());
        }

        if !(matrix.determinant() > 1e-6) {
            return Err(Error::InvalidParameter(
                "the cell matrix must have a positive determinant".into()
            ));
        }

        let is_close_0 = |value: f64| value.abs() < 1e-6;
        let is_diagonal = is_close_0(matrix[0][1]) && is_close_0(matrix[0][2])
            && is_close_0(matrix[1][0]) && is_close_0(matrix[1][2])
            && is_close_0(matrix[2][0]) && is_close_0(matrix[2][1]);

        let shape = if is_diagonal {
            CellShape::Orthorhombic
        } else {
            CellShape::Triclinic
        };

        return Ok(UnitCell { matrix, shape });
    }

    /// Create an infinite unit cell
    pub fn infinite() -> UnitCell {
        UnitCell {
            matrix: Matrix3::zero(),
            shape: CellShape::Infinite,
        }
    }

    /// Create an orthorhombic unit cell, with side lengths `a, b, c`.
    pub fn orthorhombic(a: f64, b: f64, c: f64) -> UnitCell {
        assert!(a > 0.0 && b > 0.0 && c > 0.0, "cell lengths must be positive");
        UnitCell {
            matrix: Matrix3::new([
                [a, 0.0, 0.0],
                [0.0, b, 0.0],
                [0.0, 0.0, c],
            ]),
            shape: CellShape::Orthorhombic,
        }
    }

    /// Create a cubic unit cell, with side lengths `length, length, length`.
    pub fn cubic(length: f64) -> UnitCell {
        UnitCell::orthorhombic(length, length, length)
    }

    /// Get the cell shape
    pub fn shape(&self) -> CellShape {
        self.shape
    }

    /// Check if this unit cell is infinite, *i.e.* if it does not have
    /// periodic boundary conditions.
    pub fn is_infinite(&self) -> bool {
        self.shape == CellShape::Infinite
    }

    /// Get the matrix representation of the unit cell, with cell vectors as
    /// rows
    pub fn matrix(&self) -> Matrix3 {
        self.matrix
    }

    /// Get the `i`-th cell vector
    pub fn vector(&self, i: usize) -> Vector3D {
        self.matrix[i].into()
    }

    /// Get the unit vectors normal to the faces of the cell. The `i`-th
    /// normal is orthogonal to the two other cell vectors, and oriented such
    /// that its dot product with the `i`-th cell vector is positive.
    pub fn face_normals(&self) -> [Vector3D; 3] {
        let mut normals = [Vector3D::zero(); 3];
        if self.is_infinite() {
            return normals;
        }

        for (i, normal) in normals.iter_mut().enumerate() {
            let first = self.vector((i + 1) % 3);
            let second = self.vector((i + 2) % 3);
            *normal = (first ^ second).normalized();
            if *normal * self.vector(i) < 0.0 {
                *normal = -*normal;
            }
        }
        return normals;
    }

    /// Get the distances between opposite faces of the unit cell
    pub fn distances_between_faces(&self) -> Vector3D {
        if self.is_infinite() {
            return Vector3D::new(f64::INFINITY, f64::INFINITY, f64::INFINITY);
        }

        let normals = self.face_normals();
        Vector3D::new(
            normals[0] * self.vector(0),
            normals[1] * self.vector(1),
            normals[2] * self.vector(2),
        )
    }

    /// Get the volume of the cell
    pub fn volume(&self) -> f64 {
        match self.shape {
            CellShape::Infinite => 0.0,
            CellShape::Orthorhombic | CellShape::Triclinic => self.matrix.determinant(),
        }
    }

    /// Get the Cartesian position of the point with the given fractional
    /// coordinates in this cell
    pub fn cartesian(&self, fractional: Vector3D) -> Vector3D {
        self.matrix.transposed() * fractional
    }
}
