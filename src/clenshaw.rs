use num::Complex;

use crate::ThisOrThat;

/// Clenshaw summation of the truncated projection series and its
/// derivative over the complex coordinate `zeta = xi + i*eta`, in one
/// backward pass.
///
/// The series is `sum(sign * coeff[k] * sin(2*k*zeta), k = 1..=order)`,
/// evaluated through the recurrence `b[k] = a*b[k+1] - b[k+2] + c[k]`
/// with `a = 2*cos(2*zeta)`; a second pair of accumulators carries the
/// term-by-term derivative. `sign` is `1.` for the forward (`alp`)
/// coefficients and `-1.` for the reverse (`bet`) ones; negation is
/// exact, so it cannot disturb the rounding of the recurrence.
///
/// Returns `(zeta + series, 1 + dseries/dzeta)`: the corrected coordinate
/// and the complex factor whose argument and modulus are the convergence
/// and scale corrections. The order of operations below matches the
/// stability analysis of the recurrence; do not regroup it.
pub(crate) fn sum_with_derivative(
    coeff: &[f64],
    order: usize,
    sign: f64,
    xi: f64,
    eta: f64,
) -> (Complex<f64>, Complex<f64>) {
    let c0 = (2. * xi).cos();
    let ch0 = (2. * eta).cosh();
    let s0 = (2. * xi).sin();
    let sh0 = (2. * eta).sinh();

    // 2 * cos(2*zeta)
    let mut a = Complex::new(2. * c0 * ch0, -2. * s0 * sh0);
    let mut n = order;

    let mut y0 = Complex::new((n % 2 == 1).ternary(sign * coeff[n], 0.), 0.);
    let mut y1 = Complex::default();
    let mut z0 = Complex::new((n % 2 == 1).ternary(sign * 2. * n as f64 * coeff[n], 0.), 0.);
    let mut z1 = Complex::default();

    if n % 2 == 1 {
        n -= 1;
    }

    while n > 0 {
        y1 = a * y0 - y1 + sign * coeff[n];
        z1 = a * z0 - z1 + sign * 2. * (n as f64) * coeff[n];
        n -= 1;

        y0 = a * y1 - y0 + sign * coeff[n];
        z0 = a * z1 - z0 + sign * 2. * (n as f64) * coeff[n];
        n -= 1;
    }

    a /= 2.; // cos(2*zeta)
    let z1 = 1. - z1 + a * z0;
    let a = Complex::new(s0 * ch0, c0 * sh0); // sin(2*zeta)
    let y1 = Complex::new(xi, eta) + a * y0;

    (y1, z1)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_series_is_the_identity() {
        let coeff = [0_f64; 7];
        let (zeta, deriv) = sum_with_derivative(&coeff, 6, 1., 0.7, -0.2);
        assert!((zeta - Complex::new(0.7, -0.2)).norm() < 1e-15);
        assert!((deriv - Complex::new(1., 0.)).norm() < 1e-15);
    }

    #[test]
    fn matches_the_direct_sum_on_the_real_line() {
        let coeff = [0., 3e-4, -2e-7, 5e-10, 0., 0., 0.];
        for xi in [0., 0.3, 1.1, std::f64::consts::FRAC_PI_2] {
            let (zeta, deriv) = sum_with_derivative(&coeff, 6, 1., xi, 0.);
            let direct: f64 = (1..=6).map(|k| coeff[k] * (2. * k as f64 * xi).sin()).sum();
            let ddirect: f64 =
                (1..=6).map(|k| 2. * k as f64 * coeff[k] * (2. * k as f64 * xi).cos()).sum();
            assert!((zeta.re - (xi + direct)).abs() < 1e-14);
            assert!(zeta.im.abs() < 1e-14);
            assert!((deriv.re - (1. + ddirect)).abs() < 1e-14);
            assert!(deriv.im.abs() < 1e-14);
        }
    }

    #[test]
    fn matches_the_direct_sum_off_the_real_line() {
        let coeff = [0., 8.4e-4, 7.6e-7, 1.2e-9, 2.4e-12, 1e-14, 3e-17];
        let zeta0 = Complex::new(0.9, 0.35);
        let (zeta, deriv) = sum_with_derivative(&coeff, 6, 1., zeta0.re, zeta0.im);

        let mut direct = zeta0;
        let mut ddirect = Complex::new(1., 0.);
        for k in 1..=6 {
            let kf = k as f64;
            direct += coeff[k] * (2. * kf * zeta0).sin();
            ddirect += 2. * kf * coeff[k] * (2. * kf * zeta0).cos();
        }
        assert!((zeta - direct).norm() < 1e-13);
        assert!((deriv - ddirect).norm() < 1e-13);
    }

    #[test]
    fn sign_flips_the_series_exactly() {
        let coeff = [0., 8.4e-4, 7.6e-7, 1.2e-9, 0., 0., 0.];
        let (plus, dplus) = sum_with_derivative(&coeff, 6, 1., 0.4, 0.1);
        let negated: Vec<f64> = coeff.iter().map(|c| -c).collect();
        let (minus, dminus) = sum_with_derivative(&negated, 6, 1., 0.4, 0.1);
        let (signed, dsigned) = sum_with_derivative(&coeff, 6, -1., 0.4, 0.1);
        assert_eq!(minus, signed);
        assert_eq!(dminus, dsigned);
        // And the negated series cancels the displacement
        assert!((plus + minus - 2. * Complex::<f64>::new(0.4, 0.1)).norm() < 1e-15);
        assert!((dplus + dminus - 2. * Complex::<f64>::new(1., 0.)).norm() < 1e-15);
    }
}
