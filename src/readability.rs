//! Layout readability scores computed once the simulation settles.
//!
//! Four metrics, each in `[0, 1]` with 1 best: edge crossings, crossing angle, minimum
//! angular resolution and angular resolution deviation.

use std::f64::consts::PI;

use serde::Serialize;

/// Crossing angle considered ideal, in radians (70 degrees).
const IDEAL_CROSSING_ANGLE: f64 = 70.0 * PI / 180.0;

/// Readability of a finished layout.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Readability {
	/// Share of possible edge crossings that did not happen.
	pub crossing: f64,
	/// Closeness of crossing angles to 70 degrees.
	pub crossing_angle: f64,
	/// Closeness of each node's tightest edge angle to an even split.
	pub angular_resolution_min: f64,
	/// Closeness of all of a node's edge angles to an even split.
	pub angular_resolution_dev: f64,
}

type Point = (f64, f64);

fn orient(a: Point, b: Point, c: Point) -> f64 {
	(b.0 - a.0) * (c.1 - a.1) - (b.1 - a.1) * (c.0 - a.0)
}

/// Proper intersection of segments `p1-p2` and `q1-q2` (touching does not count).
fn segments_cross(p1: Point, p2: Point, q1: Point, q2: Point) -> bool {
	let d1 = orient(q1, q2, p1);
	let d2 = orient(q1, q2, p2);
	let d3 = orient(p1, p2, q1);
	let d4 = orient(p1, p2, q2);
	d1 * d2 < 0.0 && d3 * d4 < 0.0
}

/// Acute angle between two segments, in `[0, PI/2]`.
fn acute_angle(p1: Point, p2: Point, q1: Point, q2: Point) -> f64 {
	let a = (p2.1 - p1.1).atan2(p2.0 - p1.0);
	let b = (q2.1 - q1.1).atan2(q2.0 - q1.0);
	let mut diff = (a - b).abs() % PI;
	if diff > PI / 2.0 {
		diff = PI - diff;
	}
	diff
}

/// Scores a layout. `links` index into `positions`; self-loops and out-of-range
/// endpoints are ignored.
pub fn greadability(positions: &[Point], links: &[(usize, usize)]) -> Readability {
	let n = positions.len();
	let links: Vec<(usize, usize)> = links
		.iter()
		.copied()
		.filter(|&(s, t)| s != t && s < n && t < n)
		.collect();

	let mut degree = vec![0usize; n];
	for &(s, t) in &links {
		degree[s] += 1;
		degree[t] += 1;
	}

	let mut crossings = 0usize;
	let mut angle_deviation = 0.0;
	for (i, &(s1, t1)) in links.iter().enumerate() {
		for &(s2, t2) in &links[i + 1..] {
			if s1 == s2 || s1 == t2 || t1 == s2 || t1 == t2 {
				continue;
			}
			let (p1, p2, q1, q2) = (positions[s1], positions[t1], positions[s2], positions[t2]);
			if segments_cross(p1, p2, q1, q2) {
				crossings += 1;
				let angle = acute_angle(p1, p2, q1, q2);
				angle_deviation += (IDEAL_CROSSING_ANGLE - angle).abs() / IDEAL_CROSSING_ANGLE;
			}
		}
	}

	let m = links.len() as f64;
	let impossible: f64 = degree
		.iter()
		.map(|&d| (d * d.saturating_sub(1)) as f64 / 2.0)
		.sum();
	let c_max = m * (m - 1.0) / 2.0 - impossible;
	let crossing = if c_max > 0.0 {
		1.0 - crossings as f64 / c_max
	} else {
		1.0
	};
	let crossing_angle = if crossings > 0 {
		1.0 - angle_deviation / crossings as f64
	} else {
		1.0
	};

	// Incident edge directions per node.
	let mut incident: Vec<Vec<f64>> = vec![Vec::new(); n];
	for &(s, t) in &links {
		let (a, b) = (positions[s], positions[t]);
		incident[s].push((b.1 - a.1).atan2(b.0 - a.0));
		incident[t].push((a.1 - b.1).atan2(a.0 - b.0));
	}

	let mut counted = 0usize;
	let mut min_sum = 0.0;
	let mut dev_sum = 0.0;
	for angles in incident.iter_mut().filter(|a| a.len() > 1) {
		let deg = angles.len();
		let ideal = 2.0 * PI / deg as f64;
		angles.sort_by(f64::total_cmp);
		let gaps: Vec<f64> = (0..deg)
			.map(|i| {
				if i + 1 < deg {
					angles[i + 1] - angles[i]
				} else {
					angles[0] + 2.0 * PI - angles[i]
				}
			})
			.collect();
		let min_gap = gaps.iter().copied().fold(f64::INFINITY, f64::min);
		min_sum += (ideal - min_gap).abs() / ideal;
		dev_sum += gaps.iter().map(|g| (ideal - g).abs() / ideal).sum::<f64>()
			/ (2.0 * deg as f64 - 2.0);
		counted += 1;
	}
	let (angular_resolution_min, angular_resolution_dev) = if counted > 0 {
		(
			1.0 - min_sum / counted as f64,
			1.0 - dev_sum / counted as f64,
		)
	} else {
		(1.0, 1.0)
	};

	Readability {
		crossing,
		crossing_angle,
		angular_resolution_min,
		angular_resolution_dev,
	}
}
