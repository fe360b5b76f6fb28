//! Numerical building blocks for the radial basis and the in-process kernels.

mod eigen;
pub use self::eigen::SymmetricEigen;

mod gamma;
pub use self::gamma::{double_factorial, gamma_half_integer};

mod quadrature;
pub use self::quadrature::{GAUSS_LEGENDRE_NODES, GAUSS_LEGENDRE_WEIGHTS, QUADRATURE_POINTS};

mod spherical_bessel;
pub use self::spherical_bessel::scaled_modified_spherical_bessel;

mod spherical_harmonics;
pub use self::spherical_harmonics::{SphericalHarmonics, SphericalHarmonicsArray};
