use crate::{constants::{WGS84_A, WGS84_F}, utility::eatanhe, Error, ThisOrThat};

/// Shape parameters of a reference ellipsoid together with the derived
/// eccentricity constants the projection formulas consume. Immutable once
/// constructed.
#[derive(Clone, Copy, Debug)]
pub struct Ellipsoid {
    pub(crate) a: f64,
    pub(crate) f: f64,
    pub(crate) e2: f64,
    pub(crate) es: f64,
    pub(crate) e2m: f64,
    pub(crate) n: f64,
    pub(crate) c: f64,
}

impl Ellipsoid {
    /// Internal-only constructor that doesn't check the shape parameters
    pub(crate) fn new(a: f64, f: f64) -> Ellipsoid {
        let e2 = f * (2. - f);
        let es = (f < 0.).ternary(-1_f64, 1.) * e2.abs().sqrt();
        let e2m = 1. - e2;
        // c = sqrt( (1 + e)^(1 + e) * (1 - e)^(1 - e) ), the polar limit
        // of the scale integrand
        let c = e2m.sqrt() * eatanhe(1., es).exp();
        let n = f / (2. - f);

        Self { a, f, e2, es, e2m, n, c }
    }

    /// Tries to create an ellipsoid from its equatorial radius `a` in
    /// meters and flattening `f`. `f = 0` gives a sphere, `f < 0` a
    /// prolate ellipsoid.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidEllipsoid`] unless `a` is finite and
    /// positive and `f` is finite and less than 1.
    ///
    /// # Usage
    ///
    /// ```
    /// use tmerc::Ellipsoid;
    ///
    /// let sphere = Ellipsoid::create(6_371_000.0, 0.0);
    /// assert!(sphere.is_ok());
    ///
    /// assert!(Ellipsoid::create(0.0, 0.0).is_err());
    /// assert!(Ellipsoid::create(6_371_000.0, 1.0).is_err());
    /// assert!(Ellipsoid::create(f64::NAN, 0.0).is_err());
    /// ```
    pub fn create(a: f64, f: f64) -> Result<Ellipsoid, Error> {
        if !(a.is_finite() && a > 0.) {
            Err(Error::InvalidEllipsoid("Equatorial radius is not positive".to_string()))
        } else if !(f.is_finite() && f < 1.) {
            Err(Error::InvalidEllipsoid("Polar semi-axis is not positive".to_string()))
        } else {
            Ok(Ellipsoid::new(a, f))
        }
    }

    /// The WGS84 reference ellipsoid.
    pub fn wgs84() -> Ellipsoid {
        Ellipsoid::new(WGS84_A, WGS84_F)
    }

    /// Equatorial radius `a` in meters.
    #[inline]
    pub fn equatorial_radius(&self) -> f64 {
        self.a
    }

    /// Flattening `f = (a - b) / a`.
    #[inline]
    pub fn flattening(&self) -> f64 {
        self.f
    }

    /// Third flattening `n = (a - b) / (a + b)`, the expansion parameter
    /// of the projection series.
    #[inline]
    pub fn third_flattening(&self) -> f64 {
        self.n
    }
}
