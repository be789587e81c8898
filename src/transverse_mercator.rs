use std::f64::consts::PI;
use std::fmt::Display;

use lazy_static::lazy_static;
use num::Zero;

use crate::{
    clenshaw,
    coefficients::{SeriesCoefficients, SeriesOrder},
    constants::UTM_K0,
    ellipsoid::Ellipsoid,
    utility::{atan2d, atand, dms, sincosd, tauf, taupf, GeoMath},
    Error, ThisOrThat,
};

/// Contract of an alternative transverse Mercator engine based on elliptic
/// integrals, valid over an extended domain. An implementation is supplied
/// once through [`TransverseMercator::configure`]; every call on the
/// resulting engine is then delegated to it unchanged. This crate does not
/// provide an implementation.
pub trait ExactTransverseMercator {
    /// See [`TransverseMercator::forward`].
    fn forward(&self, lon0: f64, lat: f64, lon: f64) -> Projected;
    /// See [`TransverseMercator::reverse`].
    fn reverse(&self, lon0: f64, x: f64, y: f64) -> Geodetic;
}

/// Result of the forward projection: easting/northing in meters, meridian
/// convergence in degrees, and the point scale (1 means no distortion).
#[derive(Clone, Copy, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Projected {
    #[cfg_attr(feature = "serde", serde(alias = "x"))]
    pub(crate) easting: f64,
    #[cfg_attr(feature = "serde", serde(alias = "y"))]
    pub(crate) northing: f64,
    #[cfg_attr(feature = "serde", serde(alias = "gamma"))]
    pub(crate) convergence: f64,
    #[cfg_attr(feature = "serde", serde(alias = "k"))]
    pub(crate) scale: f64,
}

impl Projected {
    /// Easting relative to the central meridian, in meters (no false
    /// easting applied).
    #[inline]
    pub fn easting(&self) -> f64 {
        self.easting
    }

    /// Northing relative to the equator, in meters (no false northing
    /// applied).
    #[inline]
    pub fn northing(&self) -> f64 {
        self.northing
    }

    /// Meridian convergence at the point, in degrees. Positive when grid
    /// north leans east of true north.
    #[inline]
    pub fn convergence(&self) -> f64 {
        self.convergence
    }

    /// Point scale: local ratio of projected to true distance.
    #[inline]
    pub fn scale(&self) -> f64 {
        self.scale
    }
}

impl Display for Projected {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut buf = ryu::Buffer::new();
        write!(f, "{} ", buf.format(self.easting))?;
        write!(f, "{} ", buf.format(self.northing))?;
        write!(f, "{} ", buf.format(self.convergence))?;
        write!(f, "{}", buf.format(self.scale))
    }
}

/// Result of the reverse projection: geographic coordinates in degrees,
/// plus the meridian convergence and point scale at the recovered point.
#[derive(Clone, Copy, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Geodetic {
    #[cfg_attr(feature = "serde", serde(alias = "lat"))]
    pub(crate) latitude: f64,
    #[cfg_attr(feature = "serde", serde(alias = "lon"))]
    pub(crate) longitude: f64,
    #[cfg_attr(feature = "serde", serde(alias = "gamma"))]
    pub(crate) convergence: f64,
    #[cfg_attr(feature = "serde", serde(alias = "k"))]
    pub(crate) scale: f64,
}

impl Geodetic {
    /// Latitude in degrees, in `[-90, 90]`.
    #[inline]
    pub fn latitude(&self) -> f64 {
        self.latitude
    }

    /// Longitude in degrees, normalized to `[-180, 180]`.
    #[inline]
    pub fn longitude(&self) -> f64 {
        self.longitude
    }

    /// Meridian convergence at the point, in degrees.
    #[inline]
    pub fn convergence(&self) -> f64 {
        self.convergence
    }

    /// Point scale: local ratio of projected to true distance.
    #[inline]
    pub fn scale(&self) -> f64 {
        self.scale
    }
}

impl Display for Geodetic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut buf = ryu::Buffer::new();
        write!(f, "{} ", buf.format(self.latitude))?;
        write!(f, "{} ", buf.format(self.longitude))?;
        write!(f, "{} ", buf.format(self.convergence))?;
        write!(f, "{}", buf.format(self.scale))
    }
}

/// The projection either evaluates its own series or holds the alternate
/// engine; chosen at configuration time and never revisited.
enum Core {
    Series(SeriesCoefficients),
    Exact(Box<dyn ExactTransverseMercator + Send + Sync>),
}

/// Ellipsoidal transverse Mercator projection with constant scale on the
/// central meridian (Gauss-Krüger), after Krüger's series as rearranged
/// for Clenshaw summation.
///
/// All state is fixed at construction; [`forward`](Self::forward) and
/// [`reverse`](Self::reverse) are pure and safe to call concurrently.
pub struct TransverseMercator {
    ellipsoid: Ellipsoid,
    k0: f64,
    core: Core,
}

lazy_static! {
    static ref UTM: TransverseMercator =
        TransverseMercator::new(Ellipsoid::wgs84(), UTM_K0, SeriesOrder::default());
}

impl TransverseMercator {
    /// Internal-only constructor that doesn't check the parameters
    pub(crate) fn new(ellipsoid: Ellipsoid, k0: f64, order: SeriesOrder) -> TransverseMercator {
        let coeff = SeriesCoefficients::generate(&ellipsoid, order);
        Self {
            ellipsoid,
            k0,
            core: Core::Series(coeff),
        }
    }

    /// Tries to create a projection for the ellipsoid `(a, f)` with scale
    /// `k0` on the central meridian, at the default series order (6).
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidEllipsoid`] if `a` is not finite and
    /// positive or `f` is not finite and less than 1, and
    /// [`Error::InvalidProjection`] if `k0` is not finite and positive.
    ///
    /// # Usage
    ///
    /// ```
    /// use tmerc::TransverseMercator;
    ///
    /// let tm = TransverseMercator::create(6_378_137.0, 1.0 / 298.257223563, 0.9996);
    /// assert!(tm.is_ok());
    ///
    /// assert!(TransverseMercator::create(6_378_137.0, 1.5, 0.9996).is_err());
    /// assert!(TransverseMercator::create(6_378_137.0, 0.0, -1.0).is_err());
    /// ```
    pub fn create(a: f64, f: f64, k0: f64) -> Result<TransverseMercator, Error> {
        TransverseMercator::with_order(a, f, k0, SeriesOrder::default())
    }

    /// Like [`create`](Self::create) with an explicit truncation order.
    ///
    /// # Errors
    ///
    /// Same as [`create`](Self::create).
    ///
    /// # Usage
    ///
    /// ```
    /// use tmerc::{SeriesOrder, TransverseMercator};
    ///
    /// let tm = TransverseMercator::with_order(
    ///     6_378_137.0,
    ///     1.0 / 298.257223563,
    ///     0.9996,
    ///     SeriesOrder::Eighth,
    /// );
    /// assert!(tm.is_ok());
    /// ```
    pub fn with_order(
        a: f64,
        f: f64,
        k0: f64,
        order: SeriesOrder,
    ) -> Result<TransverseMercator, Error> {
        let ellipsoid = Ellipsoid::create(a, f)?;
        if !(k0.is_finite() && k0 > 0.) {
            return Err(Error::InvalidProjection("Scale is not positive".to_string()));
        }
        Ok(TransverseMercator::new(ellipsoid, k0, order))
    }

    /// Full configuration entry point. With `exact` set, the parameters
    /// are recorded but every projection call is delegated to the supplied
    /// elliptic-integral engine (which performed its own validation when
    /// it was built); otherwise this is [`create`](Self::create), and the
    /// exact engine's extended-domain option `extendp` is rejected.
    ///
    /// # Errors
    ///
    /// Same as [`create`](Self::create), plus [`Error::InvalidProjection`]
    /// when `extendp` is requested without an exact engine.
    ///
    /// # Usage
    ///
    /// ```
    /// use tmerc::TransverseMercator;
    ///
    /// let tm = TransverseMercator::configure(6_378_137.0, 1.0 / 298.257223563, 0.9996, None, false);
    /// assert!(tm.is_ok());
    ///
    /// let tm = TransverseMercator::configure(6_378_137.0, 1.0 / 298.257223563, 0.9996, None, true);
    /// assert!(tm.is_err());
    /// ```
    pub fn configure(
        a: f64,
        f: f64,
        k0: f64,
        exact: Option<Box<dyn ExactTransverseMercator + Send + Sync>>,
        extendp: bool,
    ) -> Result<TransverseMercator, Error> {
        if let Some(engine) = exact {
            return Ok(Self {
                ellipsoid: Ellipsoid::new(a, f),
                k0,
                core: Core::Exact(engine),
            });
        }
        if extendp {
            return Err(Error::InvalidProjection(
                "Extended domain requires the exact engine".to_string(),
            ));
        }
        TransverseMercator::create(a, f, k0)
    }

    /// The shared projection underlying UTM: WGS84 ellipsoid and central
    /// scale 0.9996, built once on first use.
    ///
    /// # Usage
    ///
    /// ```
    /// use tmerc::TransverseMercator;
    ///
    /// let proj = TransverseMercator::utm().forward(-75.0, 0.0, -75.0);
    ///
    /// assert_eq!(proj.easting(), 0.0);
    /// assert_eq!(proj.northing(), 0.0);
    /// assert_eq!(proj.convergence(), 0.0);
    /// assert!((proj.scale() - 0.9996).abs() < 1e-12);
    /// ```
    pub fn utm() -> &'static TransverseMercator {
        &UTM
    }

    /// Equatorial radius of the configured ellipsoid, in meters.
    #[inline]
    pub fn equatorial_radius(&self) -> f64 {
        self.ellipsoid.a
    }

    /// Flattening of the configured ellipsoid.
    #[inline]
    pub fn flattening(&self) -> f64 {
        self.ellipsoid.f
    }

    /// Scale on the central meridian.
    #[inline]
    pub fn central_scale(&self) -> f64 {
        self.k0
    }

    /// Projects `(lat, lon)` in degrees with respect to the central
    /// meridian `lon0`. Latitudes outside `[-90, 90]` and other
    /// non-finite inputs produce NaN coordinates rather than an error.
    ///
    /// # Usage
    ///
    /// ```
    /// use tmerc::TransverseMercator;
    ///
    /// let proj = TransverseMercator::utm().forward(-75.0, 40.5, -73.5);
    /// assert!(proj.easting() > 0.0 && proj.northing() > 0.0);
    /// ```
    pub fn forward(&self, lon0: f64, lat: f64, lon: f64) -> Projected {
        let coeff = match &self.core {
            Core::Exact(engine) => return engine.forward(lon0, lat, lon),
            Core::Series(coeff) => coeff,
        };

        let mut lat = lat.lat_fix();
        let mut lon = lon0.ang_diff(lon);

        // Explicitly enforce the parity
        let mut lat_sign = lat.is_sign_negative().ternary(-1_f64, 1.);
        let lon_sign = lon.is_sign_negative().ternary(-1_f64, 1.);

        lat *= lat_sign;
        lon *= lon_sign;

        // Beyond 90 degrees from the central meridian work with the
        // reflected longitude and flip back at the end; the equator
        // itself reflects to the southern sheet.
        let backside = lon > f64::from(dms::QD);
        if backside {
            if lat == 0. {
                lat_sign = -1.;
            }
            lon = f64::from(dms::HD) - lon;
        }

        let (sphi, cphi) = sincosd(lat);
        let (slam, clam) = sincosd(lon);

        // [xip, etap] is the point on the Gauss-Schreiber sphere, reached
        // through the conformal latitude: tan(conformal lat) = taup. At
        // the pole the closed forms below degenerate to 0/0, so the exact
        // limits are substituted instead.
        let (xip, etap, mut gamma, mut k) = if lat == f64::from(dms::QD) {
            (PI / 2., 0., lon, self.ellipsoid.c)
        } else {
            let tau = sphi / cphi;
            let taup = taupf(tau, self.ellipsoid.es);
            let xip = taup.atan2(clam);
            let etap = (slam / taup.hypot(clam)).asinh();
            let gamma = atan2d(slam * taup, clam * 1_f64.hypot(taup));
            // This form of the scale has cancelling errors; replacing
            // hypot(taup, clam) by cos terms loses them.
            let k = (self.ellipsoid.e2m + self.ellipsoid.e2 * cphi.powi(2)).sqrt()
                * 1_f64.hypot(tau)
                / taup.hypot(clam);
            (xip, etap, gamma, k)
        };

        let (zeta, deriv) =
            clenshaw::sum_with_derivative(&coeff.alp, coeff.order, 1., xip, etap);

        // Fold in the change in convergence and scale from the
        // Gauss-Schreiber step to Gauss-Krüger
        gamma -= atan2d(deriv.im, deriv.re);
        k *= coeff.b1 * deriv.norm();

        let xi = zeta.re;
        let eta = zeta.im;

        let northing = coeff.a1 * self.k0 * backside.ternary(PI - xi, xi) * lat_sign;
        let easting = coeff.a1 * self.k0 * eta * lon_sign;

        if backside {
            gamma = f64::from(dms::HD) - gamma;
        }
        gamma = (gamma * lat_sign * lon_sign).ang_normalize();
        let scale = k * self.k0;

        Projected {
            easting,
            northing,
            convergence: gamma,
            scale,
        }
    }

    /// Recovers `(lat, lon)` in degrees from projected coordinates
    /// relative to the central meridian `lon0`, undoing
    /// [`forward`](Self::forward) up to the truncation error of the
    /// series.
    ///
    /// # Usage
    ///
    /// ```
    /// use tmerc::TransverseMercator;
    ///
    /// let geo = TransverseMercator::utm().reverse(-75.0, 0.0, 0.0);
    /// assert_eq!(geo.latitude(), 0.0);
    /// assert_eq!(geo.longitude(), -75.0);
    /// ```
    pub fn reverse(&self, lon0: f64, x: f64, y: f64) -> Geodetic {
        let coeff = match &self.core {
            Core::Exact(engine) => return engine.reverse(lon0, x, y),
            Core::Series(coeff) => coeff,
        };

        let mut xi = y / (coeff.a1 * self.k0);
        let mut eta = x / (coeff.a1 * self.k0);

        // Explicitly enforce the parity
        let xi_sign = xi.is_sign_negative().ternary(-1_f64, 1.);
        let eta_sign = eta.is_sign_negative().ternary(-1_f64, 1.);

        xi *= xi_sign;
        eta *= eta_sign;

        let backside = xi > PI / 2.;
        if backside {
            xi = PI - xi;
        }

        // The reverted series carries the bet coefficients negated
        let (zeta, deriv) =
            clenshaw::sum_with_derivative(&coeff.bet, coeff.order, -1., xi, eta);

        let mut gamma = atan2d(deriv.im, deriv.re);
        let mut k = coeff.b1 / deriv.norm();

        let xip = zeta.re;
        let etap = zeta.im;
        let s = etap.sinh();
        let c = 0_f64.max(xip.cos()); // cos(pi/2) may come out negative
        let r = s.hypot(c);

        let (mut lat, mut lon) = if r.is_zero() {
            // Point at a pole of the Gauss-Schreiber sphere
            k *= self.ellipsoid.c;
            (f64::from(dms::QD), 0.)
        } else {
            let lon = atan2d(s, c);
            let sxip = xip.sin();
            // Newton's method recovers tan(lat) from the conformal sphere
            let tau = tauf(sxip / r, self.ellipsoid.es);
            gamma += atan2d(sxip * etap.tanh(), c);
            let lat = atand(tau);
            // cos(conformal lat) * cosh(etap) = r
            k *= (self.ellipsoid.e2m + self.ellipsoid.e2 / (1. + tau.powi(2))).sqrt()
                * 1_f64.hypot(tau)
                * r;
            (lat, lon)
        };

        lat *= xi_sign;
        if backside {
            lon = f64::from(dms::HD) - lon;
        }
        lon *= eta_sign;
        lon = (lon + lon0).ang_normalize();

        if backside {
            gamma = f64::from(dms::HD) - gamma;
        }
        gamma = (gamma * xi_sign * eta_sign).ang_normalize();
        let scale = k * self.k0;

        Geodetic {
            latitude: lat,
            longitude: lon,
            convergence: gamma,
            scale,
        }
    }
}
