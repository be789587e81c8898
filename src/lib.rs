#![warn(clippy::pedantic)]
#![allow(
    clippy::must_use_candidate,
    clippy::return_self_not_must_use
)]

//! Ellipsoidal transverse Mercator (Gauss-Krüger) projection.
//!
//! The forward projection maps geographic coordinates (latitude and
//! longitude relative to a central meridian) to easting/northing plus
//! meridian convergence and point scale; the reverse projection undoes it.
//! Both evaluate Krüger's series with Clenshaw summation in complex
//! arithmetic, at a truncation order selectable between 4 and 8 (default
//! 6, good to a few nanometers over the UTM range of coordinates).
//!
//! ```
//! use tmerc::TransverseMercator;
//!
//! // UTM zone 18 has its central meridian at 75W.
//! let proj = TransverseMercator::utm().forward(-75.0, 40.5, -73.5);
//!
//! assert!((proj.easting() - 127_100.0).abs() < 100.0);
//! assert!((proj.scale() - 0.9996).abs() < 1e-3);
//! ```

use thiserror::Error;

pub mod ellipsoid;
pub mod transverse_mercator;
pub mod utility;

pub use coefficients::SeriesOrder;
pub use ellipsoid::Ellipsoid;
pub use transverse_mercator::{ExactTransverseMercator, Geodetic, Projected, TransverseMercator};

pub(crate) mod clenshaw;
pub(crate) mod coefficients;
pub(crate) mod constants;

#[derive(Debug, Error)]
pub enum Error {
    #[error("Ellipsoid parameters are not valid: {0}")]
    InvalidEllipsoid(String),
    #[error("Projection parameters are not valid: {0}")]
    InvalidProjection(String),
}

trait ThisOrThat {
    fn ternary<T>(&self, r#true: T, r#false: T) -> T;
    fn ternary_lazy<F, E, T>(&self, r#true: F, r#false: E) -> T
    where
        F: Fn() -> T,
        E: Fn() -> T;
}

impl ThisOrThat for bool {
    fn ternary<T>(&self, r#true: T, r#false: T) -> T {
        if *self { r#true } else { r#false }
    }

    fn ternary_lazy<F, E, T>(&self, r#true: F, r#false: E) -> T
    where
        F: Fn() -> T,
        E: Fn() -> T,
    {
        if *self { r#true() } else { r#false() }
    }
}
