use crate::ThisOrThat;

#[allow(dead_code)]
pub(crate) mod dms {
    /// Degrees per quarter turn
    pub const QD: i32 = 90;
    /// Minutes per degree
    pub const DM: i32 = 60;
    /// Seconds per minute
    pub const MS: i32 = 60;
    /// Degrees per half turn
    pub const HD: i32 = 2 * QD;
    /// Degrees per turn
    pub const TD: i32 = 2 * HD;
    /// Seconds per degree
    pub const DS: i32 = DM * MS;
}

/// Error-free sum of two floats: returns `(s, t)` with `s = round(u + v)`
/// and `t` the exact residual, preserving the sign of a zero sum.
fn special_sum(u: f64, v: f64) -> (f64, f64) {
    let s = u + v;
    let up = s - v;
    let vpp = s - up;

    let up = up - u;
    let vpp = vpp - v;

    let t = (s == 0.).ternary_lazy(|| s, || -(up + vpp));

    (s, t)
}

/// Evaluate a polynomial in Horner form, highest coefficient first
pub fn polyval(p: &[f64], x: f64) -> f64 {
    p
        .iter()
        .fold(0_f64, |acc, val| acc * x + val)
}

/// Simultaneous sine and cosine of an angle in degrees.
///
/// The angle is reduced exactly to `[-45, 45]` before conversion to
/// radians, so the results are exact at every multiple of 90 and a zero
/// sine carries the sign of the argument.
pub fn sincosd(x: f64) -> (f64, f64) {
    let r = x.remainder(f64::from(dms::TD));
    let q = (r / f64::from(dms::QD)).round();
    let r = (r - f64::from(dms::QD) * q).to_radians();

    let s = r.sin();
    let c = r.cos();

    let (mut sinx, cosx) = match (q as i32) & 3 {
        0 => (s, c),
        1 => (c, -s),
        2 => (-s, -c),
        _ => (-c, s),
    };

    if sinx == 0. {
        sinx = sinx.copysign(x);
    }
    // Flush any -0 in the cosine
    (sinx, 0. + cosx)
}

/// Two-argument arctangent in degrees, exact in every quadrant.
///
/// The quotient is reduced into `[-45, 45]` before `atan2` is applied and
/// the quadrant is restored from exact degree constants, so axes map to
/// exactly 0, +/-90 and +/-180 with the sign of `y` deciding +/-180.
pub fn atan2d(y: f64, x: f64) -> f64 {
    let (mut x, mut y) = (x, y);
    let mut q = 0;

    if y.abs() > x.abs() {
        std::mem::swap(&mut x, &mut y);
        q = 2;
    }
    if x.is_sign_negative() {
        x = -x;
        q += 1;
    }

    let ang = y.atan2(x).to_degrees();
    match q {
        1 => f64::from(dms::HD).copysign(y) - ang,
        2 => f64::from(dms::QD) - ang,
        3 => -f64::from(dms::QD) + ang,
        _ => ang,
    }
}

/// Arctangent in degrees
pub fn atand(x: f64) -> f64 {
    atan2d(x, 1.)
}

/// `e * atanh(e * x)` for a signed eccentricity: the `atanh` branch covers
/// oblate ellipsoids, the `atan` branch prolate ones.
pub fn eatanhe(x: f64, es: f64) -> f64 {
    if es > 0. {
        es * (es * x).atanh()
    } else {
        -es * (es * x).atan()
    }
}

/// Tangent of the conformal latitude from the tangent of the geographic
/// latitude. Non-finite arguments are returned unchanged.
pub fn taupf(tau: f64, es: f64) -> f64 {
    if !tau.is_finite() {
        return tau;
    }
    let tau1 = 1_f64.hypot(tau);
    let sig = eatanhe(tau / tau1, es).sinh();

    1_f64.hypot(sig) * tau - sig * tau1
}

/// Tangent of the geographic latitude from the tangent of the conformal
/// latitude, by Newton's method on [`taupf`].
///
/// Seeded with the geocentric-latitude guess `taup / (1 - es^2)`, or the
/// large-`tau` asymptote beyond roughly 89.2 degrees; converges to the
/// fixed point of the forward mapping in at most two iterations.
#[allow(clippy::similar_names)]
pub fn tauf(taup: f64, es: f64) -> f64 {
    const NUMIT: usize = 5;
    let tol = f64::EPSILON.sqrt() / 10.;
    let taumax = 2. / f64::EPSILON.sqrt();

    let e2m = 1. - es * es;
    let mut tau = (taup.abs() > 70.).ternary_lazy(
        || taup * eatanhe(1., es).exp(),
        || taup / e2m,
    );
    let stol = tol * taup.abs().max(1.);
    // The guess is already good enough once sqrt(1 + tau^2) == |tau|;
    // this also passes +/-inf and nan straight through.
    if !(tau.abs() < taumax) {
        return tau;
    }
    for _ in 0..NUMIT {
        let taupa = taupf(tau, es);
        let dtau = (taup - taupa) * (1. + e2m * tau * tau)
            / (e2m * 1_f64.hypot(tau) * 1_f64.hypot(taupa));
        tau += dtau;
        if !(dtau.abs() >= stol) {
            break;
        }
    }
    tau
}

pub(crate) trait GeoMath {
    fn ang_normalize(&self) -> Self;
    fn ang_diff(&self, other: Self) -> Self;
    fn lat_fix(&self) -> Self;
    fn remainder(&self, denom: Self) -> Self;
}

impl GeoMath for f64 {
    fn ang_normalize(&self) -> f64 {
        let value = self.remainder(f64::from(dms::TD));
        let hd = f64::from(dms::HD);

        if value.abs() == hd {
            hd.copysign(*self)
        } else {
            value
        }
    }

    fn ang_diff(&self, other: f64) -> f64 {
        let td = f64::from(dms::TD);
        // Use remainder instead of ang_normalize, since we treat boundary cases
        // later taking account of the error
        let (diff, err) = special_sum((-*self).remainder(td), other.remainder(td));
        // This second sum can only change diff if abs(diff) < 128, so don't need
        // to apply remainder yet again.
        let (diff, err) = special_sum(diff.remainder(td), err);

        let hd = f64::from(dms::HD);
        // Fix the sign if diff = -180, 0, 180.
        if diff == 0. || diff.abs() == hd {
            // If err == 0, take sign from other - self
            // else (err != 0, implies diff = +/-180), diff and err must have opposite signs
            let sign = (err == 0.).ternary_lazy(|| other - *self, || -err);
            diff.copysign(sign)
        } else {
            diff
        }
    }

    fn lat_fix(&self) -> f64 {
        (self.abs() > f64::from(dms::QD)).ternary(f64::NAN, *self)
    }

    fn remainder(&self, denom: Self) -> Self {
        *self - (*self / denom).round() * denom
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::WGS84_F;

    fn wgs84_es() -> f64 {
        (WGS84_F * (2. - WGS84_F)).sqrt()
    }

    #[test]
    fn polyval_is_horner() {
        assert_eq!(polyval(&[2., 3., 4.], 10.), 234.);
        assert_eq!(polyval(&[5.], 3.), 5.);
    }

    #[test]
    fn ang_normalize_canonical_range() {
        assert_eq!(540_f64.ang_normalize(), 180.);
        assert_eq!((-540_f64).ang_normalize(), -180.);
        assert_eq!(360_f64.ang_normalize(), 0.);
        assert_eq!(180_f64.ang_normalize(), 180.);
        assert_eq!((-180_f64).ang_normalize(), -180.);
        assert_eq!(10_f64.ang_normalize(), 10.);
    }

    #[test]
    fn ang_diff_boundaries() {
        assert_eq!(0_f64.ang_diff(90.), 90.);
        assert_eq!(350_f64.ang_diff(10.), 20.);
        assert_eq!(10_f64.ang_diff(350.), -20.);
        assert_eq!(180_f64.ang_diff(0.), -180.);
        assert_eq!(0_f64.ang_diff(180.), 180.);
        // Tiny differences survive the wrap untouched
        assert_eq!(360_f64.ang_diff(1e-10), 1e-10);
        assert!(30_f64.ang_diff(30.) == 0.);
    }

    #[test]
    fn lat_fix_rejects_out_of_range() {
        assert!(91_f64.lat_fix().is_nan());
        assert!((-90.001_f64).lat_fix().is_nan());
        assert_eq!(90_f64.lat_fix(), 90.);
        assert_eq!((-45.5_f64).lat_fix(), -45.5);
    }

    #[test]
    fn sincosd_exact_at_cardinal_angles() {
        assert_eq!(sincosd(0.), (0., 1.));
        assert_eq!(sincosd(90.), (1., 0.));
        assert_eq!(sincosd(-90.), (-1., 0.));

        let (s, c) = sincosd(180.);
        assert!(s == 0. && s.is_sign_positive());
        assert_eq!(c, -1.);

        let (s, c) = sincosd(-180.);
        assert!(s == 0. && s.is_sign_negative());
        assert_eq!(c, -1.);

        let (s, _) = sincosd(-0.);
        assert!(s == 0. && s.is_sign_negative());
    }

    #[test]
    fn sincosd_matches_radian_trig() {
        for deg in [-77.5, -30., 12.25, 45., 61., 89.9] {
            let (s, c) = sincosd(deg);
            assert!((s - deg.to_radians().sin()).abs() < 1e-15);
            assert!((c - deg.to_radians().cos()).abs() < 1e-15);
        }
    }

    #[test]
    fn atan2d_quadrants() {
        assert_eq!(atan2d(0., 1.), 0.);
        assert_eq!(atan2d(0., -1.), 180.);
        assert_eq!(atan2d(-0., -1.), -180.);
        assert_eq!(atan2d(1., 0.), 90.);
        assert_eq!(atan2d(-1., 0.), -90.);
        assert!((atan2d(1., 1.) - 45.).abs() < 1e-13);
        assert!((atand(1.) - 45.).abs() < 1e-13);
        assert!((atand(-1.) + 45.).abs() < 1e-13);
    }

    #[test]
    fn eatanhe_vanishes_on_the_sphere() {
        assert_eq!(eatanhe(1., 0.), 0.);
        assert!(eatanhe(0.5, wgs84_es()) > 0.);
    }

    #[test]
    fn tauf_inverts_taupf() {
        let es = wgs84_es();
        for tau in [0., 1e-3, 0.1, 1., 10., 100., 1e8] {
            for tau in [tau, -tau] {
                let taup = taupf(tau, es);
                let err = (tauf(taup, es) - tau).abs();
                assert!(err <= 1e-12 * tau.abs().max(1.), "tau {tau}: err {err}");
            }
        }
    }
}
