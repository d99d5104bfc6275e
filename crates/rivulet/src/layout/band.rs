//! Vertical band selection.

use serde::Deserialize;

use rivulet_core::geometry::{Band, BandError};

/// Rule choosing the vertical band a stage's nodes are spread across.
///
/// Deserialized from a table tagged by `rule`:
///
/// ```
/// use rivulet::layout::BandRule;
/// use rivulet::geometry::Band;
///
/// #[derive(serde::Deserialize)]
/// struct Layout {
///     band: BandRule,
/// }
///
/// let layout: Layout = toml::from_str(r#"band = { rule = "fixed", lo = 0.25, hi = 0.75 }"#).unwrap();
/// assert_eq!(layout.band, BandRule::Fixed(Band::new(0.25, 0.75).unwrap()));
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Deserialize)]
#[serde(try_from = "RawBandRule")]
pub enum BandRule {
    /// Widens with the node count: `[0.3, 0.7]` up to 10 nodes, `[0.2, 0.8]`
    /// up to 20, `[0.1, 0.9]` beyond.
    #[default]
    Stepped,

    /// The full `[0, 1]` range for every stage.
    Unit,

    /// The same caller-chosen band for every stage.
    Fixed(Band),
}

impl BandRule {
    /// Returns the band for a stage holding `count` nodes.
    pub fn band(self, count: usize) -> Band {
        match self {
            BandRule::Stepped => match count {
                0..=10 => Band::clamped(0.3, 0.7),
                11..=20 => Band::clamped(0.2, 0.8),
                _ => Band::clamped(0.1, 0.9),
            },
            BandRule::Unit => Band::UNIT,
            BandRule::Fixed(band) => band,
        }
    }
}

#[derive(Deserialize)]
#[serde(tag = "rule", rename_all = "lowercase", deny_unknown_fields)]
enum RawBandRule {
    Stepped,
    Unit,
    Fixed { lo: f32, hi: f32 },
}

impl TryFrom<RawBandRule> for BandRule {
    type Error = BandError;

    fn try_from(raw: RawBandRule) -> Result<Self, Self::Error> {
        Ok(match raw {
            RawBandRule::Stepped => BandRule::Stepped,
            RawBandRule::Unit => BandRule::Unit,
            RawBandRule::Fixed { lo, hi } => BandRule::Fixed(Band::new(lo, hi)?),
        })
    }
}
