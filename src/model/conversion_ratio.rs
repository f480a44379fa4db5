//! Ratios for converting quantities and amounts between units.

use std::fmt;
use std::future::Future;
use std::ops::{Div, Mul};

/// A `multiplier / divisor` pair converting values from one unit to another.
///
/// Keeping the two parts separate lets conversions be chained without
/// losing precision to intermediate division.
///
/// # Example
///
/// ```rust
/// use domain_api::model::ConversionRatio;
///
/// // Pieces are the base unit: a box holds 12 pieces, a piece weighs 2 kg.
/// let boxes_to_pieces = ConversionRatio::new(12.0, 1.0);
/// let kilograms_to_pieces = ConversionRatio::new(1.0, 2.0);
///
/// let boxes_to_kilograms = ConversionRatio::combine_through_base(boxes_to_pieces, kilograms_to_pieces);
/// assert_eq!(boxes_to_kilograms.apply(3.0), 72.0);
/// ```
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ConversionRatio {
    multiplier: f64,
    divisor: f64,
}

impl ConversionRatio {
    /// The ratio returned when no conversion is available.
    pub const ZERO: Self = Self::new(0.0, 1.0);

    /// The identity ratio.
    pub const ONE: Self = Self::new(1.0, 1.0);

    /// A ratio multiplying by `multiplier` and dividing by `divisor`.
    #[must_use]
    pub const fn new(multiplier: f64, divisor: f64) -> Self {
        Self { multiplier, divisor }
    }

    /// The multiplier part.
    #[must_use]
    pub const fn multiplier(&self) -> f64 {
        self.multiplier
    }

    /// The divisor part.
    #[must_use]
    pub const fn divisor(&self) -> f64 {
        self.divisor
    }

    /// Converts `value`. A zero divisor yields zero.
    #[must_use]
    pub fn apply(&self, value: f64) -> f64 {
        if self.divisor == 0.0 {
            return 0.0;
        }
        value * self.multiplier / self.divisor
    }

    /// Combines two ratios against a common base unit into the ratio from
    /// the source unit to the destination unit.
    #[must_use]
    pub fn combine_through_base(source_to_base: Self, destination_to_base: Self) -> Self {
        Self::new(
            source_to_base.multiplier * destination_to_base.divisor,
            source_to_base.divisor * destination_to_base.multiplier,
        )
    }

    /// Ratio from `source` to `destination` computed through the base unit.
    ///
    /// Two missing units convert one to one; a single missing unit or an
    /// unknown ratio to the base yields [`ConversionRatio::ZERO`].
    pub async fn through_base_or_default<U, F, Fut>(
        ratio_to_base: F,
        source: Option<&U>,
        destination: Option<&U>,
    ) -> Self
    where
        U: PartialEq + ?Sized,
        F: Fn(&U) -> Fut,
        Fut: Future<Output = Self>,
    {
        let (source, destination) = match (source, destination) {
            (None, None) => return Self::ONE,
            (Some(source), Some(destination)) => (source, destination),
            _ => return Self::ZERO,
        };
        if source == destination {
            return Self::ONE;
        }

        let source_to_base = ratio_to_base(source).await;
        let destination_to_base = ratio_to_base(destination).await;
        if source_to_base == Self::ZERO || destination_to_base == Self::ZERO {
            return Self::ZERO;
        }
        Self::combine_through_base(source_to_base, destination_to_base)
    }
}

impl Default for ConversionRatio {
    fn default() -> Self {
        Self::ZERO
    }
}

impl fmt::Display for ConversionRatio {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.multiplier, self.divisor)
    }
}

impl Mul for ConversionRatio {
    type Output = Self;

    fn mul(self, rhs: Self) -> Self {
        Self::new(self.multiplier * rhs.multiplier, self.divisor * rhs.divisor)
    }
}

impl Mul<f64> for ConversionRatio {
    type Output = Self;

    fn mul(self, rhs: f64) -> Self {
        Self::new(self.multiplier * rhs, self.divisor)
    }
}

impl Div<f64> for ConversionRatio {
    type Output = Self;

    fn div(self, rhs: f64) -> Self {
        Self::new(self.multiplier, self.divisor * rhs)
    }
}
