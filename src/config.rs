//! Stimulus parameters: what to keep from the dataset and how to draw it.

use std::str::FromStr;

use serde::Deserialize;

use crate::error::FilterError;
use crate::graph::{FilterParams, Key};

/// Drawing and simulation options. Every field has a default.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct RenderConfig {
	/// Figure title, used as the document title.
	pub title: Option<String>,
	/// Canvas width in pixels.
	pub width: f64,
	/// Canvas height in pixels.
	pub height: f64,
	/// Many-body strength; negative repels, positive attracts.
	#[serde(alias = "ManyBodyStrength")]
	pub many_body_strength: f64,
	/// Preferred link length.
	#[serde(alias = "forceLinkDistance")]
	pub link_distance: f64,
	/// Centering x. Defaults to half the width.
	pub center_x: Option<f64>,
	/// Centering y. Defaults to half the height.
	pub center_y: Option<f64>,
	/// Stroke width of the lightest link.
	#[serde(alias = "minLinkStrokeWidth")]
	pub min_link_stroke_width: f64,
	/// Stroke width of the heaviest link.
	#[serde(alias = "maxLinkStrokeWidth")]
	pub max_link_stroke_width: f64,
}

impl Default for RenderConfig {
	fn default() -> Self {
		Self {
			title: None,
			width: 640.0,
			height: 400.0,
			many_body_strength: 0.0,
			link_distance: 30.0,
			center_x: None,
			center_y: None,
			min_link_stroke_width: 1.0,
			max_link_stroke_width: 6.0,
		}
	}
}

impl RenderConfig {
	/// The point the layout is pulled towards.
	pub fn center(&self) -> (f64, f64) {
		(
			self.center_x.unwrap_or(self.width / 2.0),
			self.center_y.unwrap_or(self.height / 2.0),
		)
	}
}

/// One stimulus: a filter pass followed by a rendering.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct StimulusConfig {
	/// Which nodes and links to keep.
	pub filter: FilterParams,
	/// How to draw them.
	pub render: RenderConfig,
}

fn parse_number<T: FromStr>(key: &str, raw: Option<String>) -> Result<Option<T>, FilterError> {
	raw.filter(|s| !s.trim().is_empty())
		.map(|s| {
			s.trim()
				.parse::<T>()
				.map_err(|_| FilterError::invalid(format!("`{key}` is not a number: {s:?}")))
		})
		.transpose()
}

impl StimulusConfig {
	/// Builds a configuration from string parameters such as a URL query.
	///
	/// Recognized keys: `groups` (comma separated), `centrality`, `top`, `title`,
	/// `width`, `height`, `charge`, `distance`, `cx`, `cy`, `min_stroke`, `max_stroke`.
	pub fn from_lookup(get: impl Fn(&str) -> Option<String>) -> Result<Self, FilterError> {
		let mut config = Self::default();

		if let Some(groups) = get("groups") {
			config.filter.groups = groups
				.split(',')
				.filter(|g| !g.trim().is_empty())
				.map(Key::parse)
				.collect();
		}
		if let Some(limit) = parse_number("centrality", get("centrality"))? {
			config.filter.centrality_limit = limit;
		}
		if let Some(top) = parse_number::<i64>("top", get("top"))? {
			if top < 0 {
				return Err(FilterError::invalid(format!(
					"`top` must be non-negative, got {top}"
				)));
			}
			config.filter.top_n = top;
		}

		let render = &mut config.render;
		render.title = get("title").filter(|t| !t.is_empty());
		if let Some(v) = parse_number("width", get("width"))? {
			render.width = v;
		}
		if let Some(v) = parse_number("height", get("height"))? {
			render.height = v;
		}
		if let Some(v) = parse_number("charge", get("charge"))? {
			render.many_body_strength = v;
		}
		if let Some(v) = parse_number("distance", get("distance"))? {
			render.link_distance = v;
		}
		render.center_x = parse_number("cx", get("cx"))?;
		render.center_y = parse_number("cy", get("cy"))?;
		if let Some(v) = parse_number("min_stroke", get("min_stroke"))? {
			render.min_link_stroke_width = v;
		}
		if let Some(v) = parse_number("max_stroke", get("max_stroke"))? {
			render.max_link_stroke_width = v;
		}

		Ok(config)
	}
}

#[cfg(test)]
mod tests {
	use std::collections::HashMap;

	use super::*;

	fn lookup(pairs: &[(&str, &str)]) -> Result<StimulusConfig, FilterError> {
		let map: HashMap<String, String> = pairs
			.iter()
			.map(|(k, v)| (k.to_string(), v.to_string()))
			.collect();
		StimulusConfig::from_lookup(|key| map.get(key).cloned())
	}

	#[test]
	fn empty_query_gives_defaults() {
		let config = lookup(&[]).unwrap();
		assert_eq!(config, StimulusConfig::default());
		assert_eq!(config.render.center(), (320.0, 200.0));
	}

	#[test]
	fn reads_filter_and_render_keys() {
		let config = lookup(&[
			("groups", "1, 4,x"),
			("centrality", "3"),
			("top", "15"),
			("width", "800"),
			("charge", "-30"),
			("cy", "100"),
			("title", "Stimulus 7"),
		])
		.unwrap();
		assert_eq!(
			config.filter.groups,
			vec![Key::Number(1), Key::Number(4), Key::from("x")]
		);
		assert_eq!(config.filter.centrality_limit, 3);
		assert_eq!(config.filter.top_n, 15);
		assert_eq!(config.render.center(), (400.0, 100.0));
		assert_eq!(config.render.many_body_strength, -30.0);
		assert_eq!(config.render.title.as_deref(), Some("Stimulus 7"));
	}

	#[test]
	fn bad_numbers_are_invalid_input() {
		let err = lookup(&[("top", "ten")]).unwrap_err();
		assert!(err.to_string().contains("`top`"));
		assert!(matches!(
			lookup(&[("top", "-2")]),
			Err(FilterError::InvalidInput(_))
		));
		assert!(lookup(&[("width", "wide")]).is_err());
	}

	#[test]
	fn accepts_camel_case_option_names() {
		let render: RenderConfig = serde_json::from_value(serde_json::json!({
			"width": 500,
			"ManyBodyStrength": -40,
			"forceLinkDistance": 50,
			"maxLinkStrokeWidth": 8
		}))
		.unwrap();
		assert_eq!(render.width, 500.0);
		assert_eq!(render.height, 400.0);
		assert_eq!(render.many_body_strength, -40.0);
		assert_eq!(render.link_distance, 50.0);
		assert_eq!(render.max_link_stroke_width, 8.0);
		assert_eq!(render.center(), (250.0, 200.0));
	}
}
