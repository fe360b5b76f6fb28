use once_cell::sync::Lazy;

/// Number of points in the Gauss-Legendre quadrature used to integrate the
/// polynomial radial basis
pub const QUADRATURE_POINTS: usize = 100;

/// Nodes of the 100-points Gauss-Legendre quadrature on `[-1, 1]`, in
/// increasing order.
#[allow(clippy::excessive_precision)]
pub const GAUSS_LEGENDRE_NODES: [f64; QUADRATURE_POINTS] = [
    -0.999713726773441234, -0.998491950639595818, -0.996295134733125149, -0.99312493703744346,
    -0.98898439524299175, -0.98387754070605702, -0.97780935848691829, -0.97078577576370633,
    -0.962813654255815527, -0.95390078292549174, -0.94405587013625598, -0.933288535043079546,
    -0.921609298145333953, -0.90902957098252969, -0.895561644970726987, -0.881218679385018416,
    -0.86601468849716462, -0.849964527879591284, -0.833083879888400824, -0.815389238339176254,
    -0.79689789239031448, -0.77762790964949548, -0.757598118519707176, -0.736828089802020706,
    -0.715338117573056447, -0.69314919935580197, -0.670283015603141016, -0.64676190851412928,
    -0.622608860203707772, -0.59784747024717872, -0.57250193262138119, -0.546597012065094168,
    -0.520158019881763057, -0.493210789208190934, -0.465781649773358042, -0.437897402172031513,
    -0.409585291678301543, -0.380872981624629957, -0.351788526372421721, -0.322360343900529152,
    -0.292617188038471965, -0.26258812037150348, -0.23230248184497397, -0.201789864095735997,
    -0.171080080538603275, -0.140203137236113973, -0.109189203580061115, -0.0780685828134366367,
    -0.046871682421591632, -0.015628984421543083, 0.0156289844215430829, 0.046871682421591632,
    0.078068582813436637, 0.109189203580061115, 0.140203137236113973, 0.171080080538603275,
    0.201789864095735997, 0.23230248184497397, 0.262588120371503479, 0.292617188038471965,
    0.322360343900529152, 0.351788526372421721, 0.380872981624629957, 0.409585291678301543,
    0.437897402172031513, 0.465781649773358042, 0.49321078920819093, 0.520158019881763057,
    0.546597012065094168, 0.572501932621381191, 0.59784747024717872, 0.622608860203707772,
    0.64676190851412928, 0.670283015603141016, 0.693149199355801966, 0.715338117573056447,
    0.736828089802020706, 0.75759811851970718, 0.77762790964949548, 0.79689789239031448,
    0.81538923833917625, 0.833083879888400824, 0.849964527879591284, 0.866014688497164623,
    0.881218679385018416, 0.89556164497072699, 0.90902957098252969, 0.921609298145333953,
    0.933288535043079546, 0.94405587013625598, 0.953900782925491743, 0.96281365425581553,
    0.970785775763706332, 0.977809358486918289, 0.983877540706057016, 0.98898439524299175,
    0.99312493703744346, 0.99629513473312515, 0.998491950639595818, 0.99971372677344123,
];

/// Weights of the 100-points Gauss-Legendre quadrature, matching
/// [`GAUSS_LEGENDRE_NODES`].
///
/// The weights are computed from the nodes as `w = 2 / ((1 - x^2) P'_n(x)^2)`.
pub static GAUSS_LEGENDRE_WEIGHTS: Lazy<[f64; QUADRATURE_POINTS]> = Lazy::new(|| {
    let mut weights = [0.0; QUADRATURE_POINTS];
    for (weight, &x) in weights.iter_mut().zip(&GAUSS_LEGENDRE_NODES) {
        let (p_n, p_n_minus_1) = legendre_polynomial(QUADRATURE_POINTS, x);
        let n = QUADRATURE_POINTS as f64;
        let derivative = n * (x * p_n - p_n_minus_1) / (x * x - 1.0);
        *weight = 2.0 / ((1.0 - x * x) * derivative * derivative);
    }
    weights
});

/// Evaluate the Legendre polynomials `P_n(x)` and `P_{n-1}(x)` with Bonnet's
/// recursion.
fn legendre_polynomial(n: usize, x: f64) -> (f64, f64) {
    let mut previous = 1.0;
    let mut current = x;
    for k in 1..n {
        let k = k as f64;
        let next = ((2.0 * k + 1.0) * x * current - k * previous) / (k + 1.0);
        previous = current;
        current = next;
    }
    return (current, previous);
}
