//! Typed physical quantities carried by case elements.
//!
//! Bus, branch and generator fields use these newtypes instead of bare `f64`
//! so a loader cannot store Mvar where MW is expected, or degrees where
//! radians are expected. The case model never converts absolute quantities
//! to per-unit itself; consumers do that against [`crate::Case::base_mva`].
//!
//! ```
//! use gridcase_core::units::{Degrees, Megawatts};
//!
//! let total: Megawatts = [Megawatts(40.0), Megawatts(60.0)].iter().sum();
//! assert_eq!(total.value(), 100.0);
//!
//! let shift = Degrees(30.0).to_radians();
//! assert!((shift.to_degrees().value() - 30.0).abs() < 1e-12);
//! ```

use serde::{Deserialize, Serialize};
use std::ops::{Add, Mul, Neg, Sub};

macro_rules! unit_type {
    ($(#[$meta:meta])* $type:ident, $symbol:literal) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
        #[serde(transparent)]
        #[repr(transparent)]
        pub struct $type(pub f64);

        impl $type {
            pub const ZERO: Self = Self(0.0);

            #[inline]
            pub const fn new(value: f64) -> Self {
                Self(value)
            }

            #[inline]
            pub const fn value(self) -> f64 {
                self.0
            }

            #[inline]
            pub fn is_finite(self) -> bool {
                self.0.is_finite()
            }
        }

        impl Add for $type {
            type Output = Self;
            fn add(self, rhs: Self) -> Self {
                Self(self.0 + rhs.0)
            }
        }

        impl Sub for $type {
            type Output = Self;
            fn sub(self, rhs: Self) -> Self {
                Self(self.0 - rhs.0)
            }
        }

        impl Neg for $type {
            type Output = Self;
            fn neg(self) -> Self {
                Self(-self.0)
            }
        }

        impl Mul<f64> for $type {
            type Output = Self;
            fn mul(self, rhs: f64) -> Self {
                Self(self.0 * rhs)
            }
        }

        impl std::fmt::Display for $type {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{:.4} {}", self.0, $symbol)
            }
        }

        impl std::iter::Sum for $type {
            fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
                Self(iter.map(|x| x.0).sum())
            }
        }

        impl<'a> std::iter::Sum<&'a $type> for $type {
            fn sum<I: Iterator<Item = &'a Self>>(iter: I) -> Self {
                Self(iter.map(|x| x.0).sum())
            }
        }
    };
}

unit_type!(
    /// Active power (MW)
    Megawatts,
    "MW"
);

unit_type!(
    /// Reactive power (Mvar)
    Megavars,
    "Mvar"
);

unit_type!(
    /// Apparent power (MVA), used for branch ratings and machine bases
    MegavoltAmperes,
    "MVA"
);

unit_type!(
    /// Nominal voltage level (kV)
    Kilovolts,
    "kV"
);

unit_type!(
    /// Quantity normalized against a base value
    PerUnit,
    "pu"
);

unit_type!(
    /// Angle in radians
    Radians,
    "rad"
);

unit_type!(
    /// Angle in degrees, as most case files store them
    Degrees,
    "°"
);

impl PerUnit {
    pub const ONE: Self = Self(1.0);
}

impl Radians {
    #[inline]
    pub fn to_degrees(self) -> Degrees {
        Degrees(self.0.to_degrees())
    }
}

impl Degrees {
    #[inline]
    pub fn to_radians(self) -> Radians {
        Radians(self.0.to_radians())
    }
}
