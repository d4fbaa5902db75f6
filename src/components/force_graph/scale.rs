//! Value-to-visual mappings used when drawing the graph.

use crate::graph::Key;

/// Fill colors assigned to groups, in order.
pub const PALETTE: &[&str] = &[
	"#f29538", "#e91e63", "#9c27b0", "#673ab7", "#3f51b5", "#2196f3", "#03a9f4", "#00bcd4",
	"#009688", "#4caf50", "#8bc34a", "#cddc39", "#ffeb3b", "#ffc107", "#ff9800", "#ff5722",
	"#795548", "#9e9e9e", "#607d8b",
];

/// Maps a continuous domain onto a continuous range.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LinearScale {
	domain: (f64, f64),
	range: (f64, f64),
}

impl LinearScale {
	/// Creates a scale from `domain` to `range`.
	pub fn new(domain: (f64, f64), range: (f64, f64)) -> Self {
		Self { domain, range }
	}

	/// Scale over the extent of `values`. With no values the domain is `[0, 0]`.
	pub fn from_extent(values: impl IntoIterator<Item = f64>, range: (f64, f64)) -> Self {
		let extent = values
			.into_iter()
			.fold(None, |acc: Option<(f64, f64)>, v| match acc {
				Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
				None => Some((v, v)),
			})
			.unwrap_or((0.0, 0.0));
		Self::new(extent, range)
	}

	/// Maps `value`. A zero-width domain maps everything to the middle of the range.
	pub fn apply(&self, value: f64) -> f64 {
		let (d0, d1) = self.domain;
		let (r0, r1) = self.range;
		let span = d1 - d0;
		let t = if span == 0.0 { 0.5 } else { (value - d0) / span };
		r0 + (r1 - r0) * t
	}
}

/// Assigns palette colors to the sorted distinct groups it was built from.
#[derive(Clone, Debug)]
pub struct GroupColors {
	groups: Vec<Key>,
}

impl GroupColors {
	/// Builds the mapping from a sorted, deduplicated list of groups.
	pub fn new(groups: Vec<Key>) -> Self {
		Self { groups }
	}

	/// Color for `group`, wrapping around the palette. Unknown groups get the next
	/// free slot, as an ordinal scale would.
	pub fn color(&self, group: &Key) -> &'static str {
		let slot = match self.groups.binary_search(group) {
			Ok(i) => i,
			Err(_) => self.groups.len(),
		};
		PALETTE[slot % PALETTE.len()]
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn linear_scale_interpolates_between_extremes() {
		let scale = LinearScale::from_extent([2.0, 10.0, 6.0], (1.0, 6.0));
		assert_eq!(scale.apply(2.0), 1.0);
		assert_eq!(scale.apply(10.0), 6.0);
		assert_eq!(scale.apply(6.0), 3.5);
	}

	#[test]
	fn degenerate_domain_maps_to_range_middle() {
		let scale = LinearScale::from_extent([4.0, 4.0], (1.0, 6.0));
		assert_eq!(scale.apply(4.0), 3.5);
		let empty = LinearScale::from_extent([], (1.0, 6.0));
		assert_eq!(empty.apply(1.0), 3.5);
	}

	#[test]
	fn groups_take_palette_slots_in_sorted_order() {
		let colors = GroupColors::new(vec![Key::Number(1), Key::Number(5), Key::from("a")]);
		assert_eq!(colors.color(&Key::Number(1)), PALETTE[0]);
		assert_eq!(colors.color(&Key::Number(5)), PALETTE[1]);
		assert_eq!(colors.color(&Key::from("a")), PALETTE[2]);
		assert_eq!(colors.color(&Key::from("zz")), PALETTE[3]);
	}

	#[test]
	fn palette_wraps() {
		let groups: Vec<Key> = (0..25).map(Key::Number).collect();
		let colors = GroupColors::new(groups);
		assert_eq!(colors.color(&Key::Number(19)), PALETTE[0]);
		assert_eq!(colors.color(&Key::Number(24)), PALETTE[5]);
	}
}
