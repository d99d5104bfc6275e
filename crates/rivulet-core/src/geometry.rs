//! Geometric primitives for normalized diagram placement.
//!
//! Rivulet never deals in pixels. Every coordinate it produces lives in the
//! unit square and the renderer scales it to whatever canvas it draws on.
//!
//! # Overview
//!
//! - [`Point`] - A 2D coordinate in normalized diagram space
//! - [`Band`] - A closed vertical interval that a stage's nodes are spread across
//!
//! # Coordinate System
//!
//! ```text
//!   (0,0) ────────► +X   (stage 0 ... last stage)
//!     │
//!     │
//!     ▼
//!    +Y   (rank 0 ... last rank)
//! ```
//!
//! - **X-axis**: Stage position, `0.0` for the first stage and `1.0` for the last
//! - **Y-axis**: Rank position inside a stage, increasing downward

use thiserror::Error;

/// A 2D point in normalized diagram coordinate space.
///
/// # Examples
///
/// ```
/// # use rivulet_core::geometry::Point;
/// let p = Point::new(0.5, 0.25);
/// assert_eq!(p.x(), 0.5);
/// assert_eq!(p.y(), 0.25);
/// assert!(p.is_normalized());
///
/// let outside = p.with_x(1.5);
/// assert!(!outside.is_normalized());
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Point {
    x: f32,
    y: f32,
}

impl Point {
    /// Creates a new point with the specified coordinates
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// Returns the x-coordinate of the point
    pub fn x(self) -> f32 {
        self.x
    }

    /// Returns the y-coordinate of the point
    pub fn y(self) -> f32 {
        self.y
    }

    /// Creates a new point with the specified x-coordinate
    pub fn with_x(mut self, x: f32) -> Self {
        self.x = x;
        self
    }

    /// Creates a new point with the specified y-coordinate
    pub fn with_y(mut self, y: f32) -> Self {
        self.y = y;
        self
    }

    /// Checks whether both coordinates lie inside the closed unit interval.
    pub fn is_normalized(self) -> bool {
        (0.0..=1.0).contains(&self.x) && (0.0..=1.0).contains(&self.y)
    }
}

/// Errors raised when constructing a [`Band`].
#[derive(Debug, Clone, PartialEq, Error)]
pub enum BandError {
    #[error("band bounds must lie within [0, 1], got [{lo}, {hi}]")]
    OutOfRange { lo: f32, hi: f32 },

    #[error("band lower bound {lo} is greater than upper bound {hi}")]
    Inverted { lo: f32, hi: f32 },
}

/// A closed vertical interval `[lo, hi]` inside the unit range.
///
/// Nodes of one stage are spread evenly across a band: a single node sits at
/// the centre, `n > 1` nodes run from `lo` to `hi` inclusive.
///
/// # Examples
///
/// ```
/// # use rivulet_core::geometry::Band;
/// let band = Band::new(0.2, 0.8).unwrap();
/// assert_eq!(band.position(0, 1), 0.5);
/// assert_eq!(band.position(0, 3), 0.2);
/// assert_eq!(band.position(2, 3), 0.8);
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Band {
    lo: f32,
    hi: f32,
}

impl Band {
    /// The full unit range `[0, 1]`.
    pub const UNIT: Band = Band { lo: 0.0, hi: 1.0 };

    /// Creates a band, validating that `0 <= lo <= hi <= 1`.
    ///
    /// # Errors
    ///
    /// Returns [`BandError::OutOfRange`] when a bound leaves the unit range
    /// (or is NaN), and [`BandError::Inverted`] when `lo > hi`.
    pub fn new(lo: f32, hi: f32) -> Result<Self, BandError> {
        if !(0.0..=1.0).contains(&lo) || !(0.0..=1.0).contains(&hi) {
            return Err(BandError::OutOfRange { lo, hi });
        }
        if lo > hi {
            return Err(BandError::Inverted { lo, hi });
        }
        Ok(Self { lo, hi })
    }

    /// Builds a band from any two bounds: clamped to `[0, 1]`, put in order,
    /// with `NaN` read as `0`.
    pub fn clamped(a: f32, b: f32) -> Self {
        let clamp = |value: f32| if value.is_nan() { 0.0 } else { value.clamp(0.0, 1.0) };
        let (a, b) = (clamp(a), clamp(b));
        Self {
            lo: a.min(b),
            hi: a.max(b),
        }
    }

    /// Returns the lower bound.
    pub fn lo(self) -> f32 {
        self.lo
    }

    /// Returns the upper bound.
    pub fn hi(self) -> f32 {
        self.hi
    }

    /// Returns `hi - lo`.
    pub fn width(self) -> f32 {
        self.hi - self.lo
    }

    /// Returns the centre of the band.
    pub fn center(self) -> f32 {
        (self.lo + self.hi) / 2.0
    }

    /// Checks whether `value` lies inside the band.
    pub fn contains(self, value: f32) -> bool {
        (self.lo..=self.hi).contains(&value)
    }

    /// Maps `rank` out of `count` evenly spaced slots onto the band.
    ///
    /// Ranks beyond `count - 1` are clamped to the last slot so the result
    /// always stays inside the band.
    pub fn position(self, rank: usize, count: usize) -> f32 {
        if count <= 1 {
            return self.center();
        }
        let rank = rank.min(count - 1);
        let t = rank as f32 / (count - 1) as f32;
        (self.lo + self.width() * t).clamp(self.lo, self.hi)
    }
}

impl Default for Band {
    fn default() -> Self {
        Self::UNIT
    }
}


#[cfg(test)]
mod proptest_tests {
    use proptest::prelude::*;

    use super::*;

    fn band_strategy() -> impl Strategy<Value = Band> {
        (0.0f32..=1.0, 0.0f32..=1.0).prop_map(|(a, b)| {
            let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
            Band::new(lo, hi).expect("ordered bounds inside the unit range")
        })
    }

    /// Every slot position must stay within the band.
    fn check_position_within_band(
        band: Band,
        rank: usize,
        count: usize,
    ) -> Result<(), TestCaseError> {
        let y = band.position(rank, count);
        prop_assert!(band.contains(y), "{y} outside [{}, {}]", band.lo(), band.hi());
        Ok(())
    }

    /// Positions must be non-decreasing in rank.
    fn check_position_is_monotonic(band: Band, count: usize) -> Result<(), TestCaseError> {
        let positions: Vec<f32> = (0..count).map(|rank| band.position(rank, count)).collect();
        for pair in positions.windows(2) {
            prop_assert!(pair[0] <= pair[1]);
        }
        Ok(())
    }

    proptest! {
        #[test]
        fn position_within_band(band in band_strategy(), rank in 0usize..200, count in 0usize..200) {
            check_position_within_band(band, rank, count)?;
        }

        #[test]
        fn position_is_monotonic(band in band_strategy(), count in 0usize..200) {
            check_position_is_monotonic(band, count)?;
        }
    }
}
