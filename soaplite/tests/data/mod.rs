#![allow(dead_code)]

use serde_json::Value;

use soaplite::{Matrix3, SimpleSystem, Vector3D};
use soaplite::systems::UnitCell;

/// Load one of the structures defined in `tests/data/structures.json`
pub fn load_structure(name: &str) -> SimpleSystem {
    let json = std::fs::read_to_string("tests/data/structures.json")
        .expect("failed to read structures file");

    let data: Value = serde_json::from_str(&json).expect("failed to parse JSON");
    let structure = &data[name];
    assert!(structure.is_object(), "missing structure '{}'", name);

    let mut system = SimpleSystem::new(read_cell(&structure["cell"]));

    let species = structure["species"].as_array().expect("species must be an array");
    let positions = structure["positions"].as_array().expect("positions must be an array");
    assert_eq!(species.len(), positions.len());

    for (species, position) in species.iter().zip(positions) {
        let species = species.as_i64().expect("species must be an integer") as i32;
        let position = position.as_array().expect("position must be an array");
        let position = Vector3D::new(
            position[0].as_f64().unwrap(),
            position[1].as_f64().unwrap(),
            position[2].as_f64().unwrap(),
        );

        system.add_atom(species, position);
    }

    return system;
}

fn read_cell(cell: &Value) -> UnitCell {
    let cell = cell.as_array().expect("cell must be an array");
    let matrix = Matrix3::new([
        [cell[0].as_f64().unwrap(), cell[1].as_f64().unwrap(), cell[2].as_f64().unwrap()],
        [cell[3].as_f64().unwrap(), cell[4].as_f64().unwrap(), cell[5].as_f64().unwrap()],
        [cell[6].as_f64().unwrap(), cell[7].as_f64().unwrap(), cell[8].as_f64().unwrap()],
    ]);

    UnitCell::new(matrix).expect("invalid cell")
}

/// Rotate all the atoms in `system` by the rotation matrix `rotation`
pub fn rotate(system: &SimpleSystem, rotation: &Matrix3) -> SimpleSystem {
    use soaplite::System;

    let mut rotated = SimpleSystem::new(system.cell().unwrap());
    for (&species, &position) in system.species().unwrap().iter().zip(system.positions().unwrap()) {
        rotated.add_atom(species, rotation * position);
    }
    return rotated;
}

/// Rotation matrix of `angle` radians around the given `axis`
pub fn rotation_matrix(axis: Vector3D, angle: f64) -> Matrix3 {
    let axis = axis.normalized();
    let (sin, cos) = angle.sin_cos();
    let [x, y, z] = *axis.as_array();

    Matrix3::new([
        [cos + x * x * (1.0 - cos), x * y * (1.0 - cos) - z * sin, x * z * (1.0 - cos) + y * sin],
        [y * x * (1.0 - cos) + z * sin, cos + y * y * (1.0 - cos), y * z * (1.0 - cos) - x * sin],
        [z * x * (1.0 - cos) - y * sin, z * y * (1.0 - cos) + x * sin, cos + z * z * (1.0 - cos)],
    ])
}
