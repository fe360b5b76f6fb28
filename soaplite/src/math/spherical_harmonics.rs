use std::f64::consts::SQRT_2;

use ndarray::ArrayView1;

use crate::Vector3D;

/// `\sqrt{\frac{1}{2 \pi}}`
const SQRT_1_OVER_2PI: f64 = 0.3989422804014327;
/// `\sqrt{3}`
const SQRT_3: f64 = 1.7320508075688772;
/// `\sqrt{3 / 2}`
const SQRT_3_OVER_2: f64 = 1.224744871391589;

/// Storage for the normalized associated Legendre functions, for
/// `0 <= l <= l_max` and `0 <= m <= l`.
#[derive(Debug, Clone)]
struct LegendreArray {
    max_angular: usize,
    data: Vec<f64>,
}

impl LegendreArray {
    fn new(max_angular: usize) -> LegendreArray {
        LegendreArray {
            max_angular: max_angular,
            data: vec![0.0; (max_angular + 1) * (max_angular + 2) / 2],
        }
    }

    #[inline]
    fn linear_index(&self, [l, m]: [usize; 2]) -> usize {
        debug_assert!(l <= self.max_angular && m <= l);
        return m + l * (l + 1) / 2;
    }
}

impl std::ops::Index<[usize; 2]> for LegendreArray {
    type Output = f64;
    fn index(&self, index: [usize; 2]) -> &f64 {
        &self.data[self.linear_index(index)]
    }
}

impl std::ops::IndexMut<[usize; 2]> for LegendreArray {
    fn index_mut(&mut self, index: [usize; 2]) -> &mut f64 {
        let i = self.linear_index(index);
        &mut self.data[i]
    }
}

/// Array storing real spherical harmonics for `0 <= l <= l_max` and
/// `-l <= m <= l`, indexed with `[l, m]`.
///
/// Values for a given `l` are stored contiguously, from `m = -l` to `m = l`.
#[derive(Debug, Clone)]
pub struct SphericalHarmonicsArray {
    max_angular: isize,
    data: Vec<f64>,
}

impl SphericalHarmonicsArray {
    /// Create a new `SphericalHarmonicsArray` with the given maximal angular
    /// degree, and all elements set to zero.
    pub fn new(max_angular: usize) -> SphericalHarmonicsArray {
        SphericalHarmonicsArray {
            max_angular: max_angular as isize,
            data: vec![0.0; (max_angular + 1) * (max_angular + 1)],
        }
    }

    /// Get the maximal angular degree stored in this array
    pub fn max_angular(&self) -> usize {
        self.max_angular as usize
    }

    #[inline]
    fn linear_index(&self, [l, m]: [isize; 2]) -> usize {
        debug_assert!(l <= self.max_angular && -l <= m && m <= l);
        return (l * l + l + m) as usize;
    }

    /// Get the `2 l + 1` values for angular degree `l`, from `m = -l` to
    /// `m = l`.
    #[inline]
    pub fn slice(&self, l: usize) -> ArrayView1<'_, f64> {
        let start = l * l;
        return ArrayView1::from(&self.data[start..(start + 2 * l + 1)]);
    }
}

impl std::ops::Index<[isize; 2]> for SphericalHarmonicsArray {
    type Output = f64;
    fn index(&self, index: [isize; 2]) -> &f64 {
        &self.data[self.linear_index(index)]
    }
}

impl std::ops::IndexMut<[isize; 2]> for SphericalHarmonicsArray {
    fn index_mut(&mut self, index: [isize; 2]) -> &mut f64 {
        let i = self.linear_index(index);
        &mut self.data[i]
    }
}

/// Evaluate orthonormal real spherical harmonics `Y_l^m` for directions on
/// the unit sphere.
///
/// Follows the algorithm described in <https://arxiv.org/abs/1410.1748>, with
/// the real form convention (no Condon-Shortley phase) documented on
/// <https://en.wikipedia.org/wiki/Spherical_harmonics#Real_form>.
#[derive(Debug, Clone)]
pub struct SphericalHarmonics {
    max_angular: usize,
    legendre: LegendreArray,
    // recurrence coefficients for the Legendre functions
    coefficient_a: LegendreArray,
    coefficient_b: LegendreArray,
}

impl SphericalHarmonics {
    /// Create a new `SphericalHarmonics` for all `l <= max_angular`
    pub fn new(max_angular: usize) -> SphericalHarmonics {
        let mut coefficient_a = LegendreArray::new(max_angular);
        let mut coefficient_b = LegendreArray::new(max_angular);
        for l in 2..=max_angular {
            let l2 = (l * l) as f64;
            let lm1_2 = ((l - 1) * (l - 1)) as f64;
            for m in 0..(l - 1) {
                let m2 = (m * m) as f64;
                coefficient_a[[l, m]] = f64::sqrt((4.0 * l2 - 1.0) / (l2 - m2));
                coefficient_b[[l, m]] = -f64::sqrt((lm1_2 - m2) / (4.0 * lm1_2 - 1.0));
            }
        }

        SphericalHarmonics {
            max_angular,
            legendre: LegendreArray::new(max_angular),
            coefficient_a,
            coefficient_b,
        }
    }

    fn compute_legendre(&mut self, cos_theta: f64, sin_theta: f64) {
        let p = &mut self.legendre;
        let mut diagonal = SQRT_1_OVER_2PI;
        p[[0, 0]] = diagonal;

        if self.max_angular == 0 {
            return;
        }

        p[[1, 0]] = SQRT_3 * cos_theta * diagonal;
        diagonal *= -SQRT_3_OVER_2 * sin_theta;
        p[[1, 1]] = diagonal;

        for l in 2..=self.max_angular {
            for m in 0..(l - 1) {
                let a = self.coefficient_a[[l, m]];
                let b = self.coefficient_b[[l, m]];
                p[[l, m]] = a * (cos_theta * p[[l - 1, m]] + b * p[[l - 2, m]]);
            }

            p[[l, l - 1]] = f64::sqrt(2.0 * l as f64 + 1.0) * cos_theta * diagonal;
            diagonal *= -f64::sqrt(1.0 + 0.5 / l as f64) * sin_theta;
            p[[l, l]] = diagonal;
        }
    }

    /// Evaluate all spherical harmonics in the given `direction`, which must
    /// be normalized, and store them in `values`.
    pub fn compute(&mut self, direction: Vector3D, values: &mut SphericalHarmonicsArray) {
        assert!(
            (direction.norm2() - 1.0).abs() < 1e-9,
            "expected the direction vector to be normalized in spherical harmonics"
        );
        assert_eq!(
            values.max_angular(), self.max_angular,
            "wrong size for the values array, expected max_angular to be {}, got {}",
            self.max_angular, values.max_angular(),
        );

        let sin_theta = f64::hypot(direction[0], direction[1]);
        let cos_theta = direction[2];
        let (cos_phi, sin_phi) = if sin_theta > f64::EPSILON {
            (direction[0] / sin_theta, direction[1] / sin_theta)
        } else {
            (1.0, 0.0)
        };

        self.compute_legendre(cos_theta, sin_theta);

        for l in 0..=self.max_angular {
            values[[l as isize, 0]] = self.legendre[[l, 0]] / SQRT_2;
        }

        // Chebyshev recurrence for cos(m ϕ) and sin(m ϕ), with the sign
        // flipped at each step to cancel the phase of the Legendre functions
        let mut cos_previous = 1.0;
        let mut sin_previous = 0.0;
        let mut cos_before = -cos_phi;
        let mut sin_before = sin_phi;
        let minus_two_cos = -2.0 * cos_phi;
        for m in 1..=self.max_angular {
            let cos_m_phi = minus_two_cos * cos_previous - cos_before;
            let sin_m_phi = minus_two_cos * sin_previous - sin_before;
            cos_before = cos_previous;
            sin_before = sin_previous;
            cos_previous = cos_m_phi;
            sin_previous = sin_m_phi;

            for l in m..=self.max_angular {
                let p_lm = self.legendre[[l, m]];
                values[[l as isize, m as isize]] = p_lm * cos_m_phi;
                values[[l as isize, -(m as isize)]] = p_lm * sin_m_phi;
            }
        }
    }
}
