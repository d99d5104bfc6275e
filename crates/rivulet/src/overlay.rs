//! Bubble overlay drawn beside the flow diagram.
//!
//! The overlay is independent of the flow graph: it is driven by a separate
//! tag table whose label frequencies become bubbles laid out along a right
//! half-circle.

use std::f32::consts::FRAC_PI_2;

use indexmap::IndexMap;
use log::debug;

use rivulet_core::{geometry::Point, table::TagTable};

use crate::config::OverlayConfig;

/// Label occurrence counts in first-seen order.
///
/// # Examples
///
/// ```
/// use rivulet::overlay::TagTally;
/// use rivulet::table::TagTable;
///
/// let tags = TagTable::new(vec![
///     vec![Some("B".to_string()), Some("A".to_string())],
///     vec![Some("A".to_string()), None],
/// ]);
/// let tally = TagTally::tally(&tags);
///
/// assert_eq!(tally.iter().collect::<Vec<_>>(), vec![("B", 1), ("A", 2)]);
/// assert_eq!(tally.sorted_by_count().iter().next(), Some(("A", 2)));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TagTally {
    counts: IndexMap<String, usize>,
}

impl TagTally {
    /// Counts every non-empty cell of `tags`, row by row.
    pub fn tally(tags: &TagTable) -> Self {
        let mut counts: IndexMap<String, usize> = IndexMap::new();
        for label in tags.labels() {
            *counts.entry(label.to_string()).or_insert(0) += 1;
        }
        debug!(labels = counts.len(); "Tags tallied");
        Self { counts }
    }

    /// Returns a copy ordered by descending count; ties keep first-seen order.
    pub fn sorted_by_count(&self) -> Self {
        let mut counts = self.counts.clone();
        counts.sort_by(|_, left, _, right| right.cmp(left));
        Self { counts }
    }

    /// Iterates over `(label, count)` pairs.
    pub fn iter(&self) -> impl Iterator<Item = (&str, usize)> {
        self.counts.iter().map(|(label, count)| (label.as_str(), *count))
    }

    pub fn count(&self, label: &str) -> usize {
        self.counts.get(label).copied().unwrap_or(0)
    }

    pub fn len(&self) -> usize {
        self.counts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }
}

/// One overlay marker.
#[derive(Debug, Clone, PartialEq)]
pub struct Bubble {
    label: String,
    count: usize,
    position: Point,
    size: f32,
    color: usize,
}

impl Bubble {
    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn count(&self) -> usize {
        self.count
    }

    /// Position in overlay space, around the configured centre.
    pub fn position(&self) -> Point {
        self.position
    }

    /// Marker size, within the configured size range.
    pub fn size(&self) -> f32 {
        self.size
    }

    /// Palette slot; mapping it to a colour is up to the renderer.
    pub fn color(&self) -> usize {
        self.color
    }
}

/// Places the first `max_bubbles` labels of `tally` along a right half-circle.
///
/// Bubble `i` of `n` sits at angle `-π/2 + π·i/(n-1)` and at a radius
/// interpolated the same way across the radius range. Sizes map counts
/// linearly onto the size range.
pub fn arrange(tally: &TagTally, config: &OverlayConfig) -> Vec<Bubble> {
    let sorted;
    let tally = if config.sort_by_count() {
        sorted = tally.sorted_by_count();
        &sorted
    } else {
        tally
    };

    let count = tally.len().min(config.max_bubbles());
    let entries: Vec<(&str, usize)> = tally.iter().take(count).collect();

    let (cx, cy) = config.center();
    let (r0, r1) = config.radius_range();
    let angles = linspace(-FRAC_PI_2, FRAC_PI_2, count);
    let radii = linspace(r0, r1, count);
    let scale = SizeScale::new(entries.iter().map(|(_, count)| *count), config.size_range());
    let palette = config.palette_size().max(1);

    let bubbles: Vec<Bubble> = entries
        .into_iter()
        .zip(angles.into_iter().zip(radii))
        .enumerate()
        .map(|(index, ((label, count), (angle, radius)))| Bubble {
            label: label.to_string(),
            count,
            position: Point::new(cx + radius * angle.cos(), cy + radius * angle.sin()),
            size: scale.size(count),
            color: index % palette,
        })
        .collect();

    debug!(bubbles = bubbles.len(), dropped = tally.len() - bubbles.len(); "Overlay arranged");
    bubbles
}

/// `count` evenly spaced values from `start` to `end` inclusive.
fn linspace(start: f32, end: f32, count: usize) -> Vec<f32> {
    match count {
        0 => Vec::new(),
        1 => vec![start],
        _ => (0..count)
            .map(|i| start + (end - start) * i as f32 / (count - 1) as f32)
            .collect(),
    }
}

/// Linear map from occurrence counts onto marker sizes.
struct SizeScale {
    min: usize,
    max: usize,
    lo: f32,
    hi: f32,
}

impl SizeScale {
    fn new(counts: impl Iterator<Item = usize>, (lo, hi): (f32, f32)) -> Self {
        let (min, max) = counts.fold((usize::MAX, 0), |(min, max), count| {
            (min.min(count), max.max(count))
        });
        Self { min, max, lo, hi }
    }

    fn size(&self, count: usize) -> f32 {
        if self.max <= self.min {
            return self.hi;
        }
        let t = (count - self.min) as f32 / (self.max - self.min) as f32;
        self.lo + (self.hi - self.lo) * t
    }
}

#[cfg(test)]
mod tests {
    use float_cmp::assert_approx_eq;

    use super::*;

    fn tags(rows: &[&[&str]]) -> TagTable {
        TagTable::new(
            rows.iter()
                .map(|row| row.iter().map(|cell| Some(cell.to_string())).collect())
                .collect(),
        )
    }

    #[test]
    fn test_tally_counts_in_first_seen_order() {
        let tally = TagTally::tally(&tags(&[&["C", "A"], &["A", ""], &["B", "A"]]));
        assert_eq!(tally.iter().collect::<Vec<_>>(), vec![("C", 1), ("A", 3), ("B", 1)]);
        assert_eq!(tally.count("A"), 3);
        assert_eq!(tally.count("Z"), 0);
    }

    #[test]
    fn test_sorted_by_count_is_stable() {
        let tally = TagTally::tally(&tags(&[&["C", "A", "B", "A", "D", "D"]]));
        let sorted = tally.sorted_by_count();
        let labels: Vec<_> = sorted.iter().map(|(label, _)| label).collect();
        assert_eq!(labels, vec!["A", "D", "C", "B"]);
    }

    #[test]
    fn test_linspace() {
        assert!(linspace(0.0, 1.0, 0).is_empty());
        assert_eq!(linspace(0.5, 1.0, 1), vec![0.5]);
        assert_eq!(linspace(0.0, 1.0, 5), vec![0.0, 0.25, 0.5, 0.75, 1.0]);
    }

    #[test]
    fn test_half_circle_placement() {
        let tally = TagTally::tally(&tags(&[&["A", "B", "C"]]));
        let bubbles = arrange(&tally, &OverlayConfig::default());

        let expected = [(1.5, -0.5), (2.75, 0.5), (1.5, 2.0)];
        assert_eq!(bubbles.len(), 3);
        for (bubble, (x, y)) in bubbles.iter().zip(expected) {
            assert_approx_eq!(f32, bubble.position().x(), x, epsilon = 1e-5);
            assert_approx_eq!(f32, bubble.position().y(), y, epsilon = 1e-5);
        }
    }

    #[test]
    fn test_sizes_and_colors() {
        let tally = TagTally::tally(&tags(&[&["A", "B", "B", "C", "C", "C"]]));
        let bubbles = arrange(&tally, &OverlayConfig::default().with_palette_size(2));

        let sizes: Vec<_> = bubbles.iter().map(Bubble::size).collect();
        assert_approx_eq!(f32, sizes[0], 15.0);
        assert_approx_eq!(f32, sizes[1], 32.5);
        assert_approx_eq!(f32, sizes[2], 50.0);

        let colors: Vec<_> = bubbles.iter().map(Bubble::color).collect();
        assert_eq!(colors, vec![0, 1, 0]);
    }

    #[test]
    fn test_equal_counts_take_upper_size() {
        let tally = TagTally::tally(&tags(&[&["A", "B"]]));
        let bubbles = arrange(&tally, &OverlayConfig::default());
        assert!(bubbles.iter().all(|bubble| bubble.size() == 50.0));
    }

    #[test]
    fn test_max_bubbles_and_sorting() {
        let tally = TagTally::tally(&tags(&[&["A", "B", "C", "C"]]));
        let config = OverlayConfig::default()
            .with_max_bubbles(2)
            .with_sort_by_count(true);
        let bubbles = arrange(&tally, &config);

        let labels: Vec<_> = bubbles.iter().map(|bubble| (bubble.label(), bubble.count())).collect();
        assert_eq!(labels, vec![("C", 2), ("A", 1)]);
    }

    #[test]
    fn test_empty_tally_has_no_bubbles() {
        assert!(arrange(&TagTally::default(), &OverlayConfig::default()).is_empty());
    }
}
