use leptos::prelude::*;
use leptos_meta::Title;
use leptos_router::hooks::use_query_map;

use crate::components::force_graph::ForceGraphCanvas;
use crate::config::StimulusConfig;
use crate::error::FilterError;
use crate::graph::GraphData;
use crate::readability::Readability;

/// Co-occurrence network shipped with the app.
const DATASET: &str = include_str!("../../data/miserables.json");

/// Loads the bundled dataset and reduces it per `config`.
fn build_stimulus(config: &StimulusConfig) -> Result<GraphData, FilterError> {
	let graph = GraphData::from_json(DATASET)?;
	config.filter.apply(&graph)
}

/// Stimulus page. Parameters come from the query string, e.g.
/// `/?groups=3,4&centrality=2&top=12&charge=-30`.
#[component]
pub fn Home() -> impl IntoView {
	let query = use_query_map();
	let readability = RwSignal::new(None::<Readability>);

	let stimulus = move || {
		let config = query.with(|q| StimulusConfig::from_lookup(|key| q.get(key)))?;
		let graph = build_stimulus(&config)?;
		let title = config
			.render
			.title
			.clone()
			.unwrap_or_else(|| "Stimulus".to_string());
		readability.set(None);

		let figure = if graph.is_empty() {
			view! {
				<p class="empty">"No nodes survive filtering. Relax the group or centrality limits."</p>
			}
			.into_any()
		} else {
			view! { <ForceGraphCanvas data=graph config=config.render readability=readability /> }
				.into_any()
		};
		Ok::<_, FilterError>(view! {
			<Title text=title />
			{figure}
		})
	};

	let scores = move || {
		readability.get().map(|r| {
			view! {
				<dl class="readability">
					<dt>"crossing"</dt>
					<dd>{format!("{:.3}", r.crossing)}</dd>
					<dt>"crossing angle"</dt>
					<dd>{format!("{:.3}", r.crossing_angle)}</dd>
					<dt>"angular resolution (min)"</dt>
					<dd>{format!("{:.3}", r.angular_resolution_min)}</dd>
					<dt>"angular resolution (dev)"</dt>
					<dd>{format!("{:.3}", r.angular_resolution_dev)}</dd>
				</dl>
			}
		})
	};

	view! {
		<ErrorBoundary fallback=|errors| {
			view! {
				<h1>"Uh oh! Something went wrong!"</h1>

				<p>"Errors: "</p>
				<ul>
					{move || {
						errors
							.get()
							.into_iter()
							.map(|(_, e)| view! { <li>{e.to_string()}</li> })
							.collect_view()
					}}
				</ul>
			}
		}>
			<div id="container" class="stimulus">
				{stimulus}
				{scores}
			</div>
		</ErrorBoundary>
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::graph::Key;

	#[test]
	fn bundled_dataset_parses() {
		let graph = GraphData::from_json(DATASET).unwrap();
		assert_eq!(graph.nodes.len(), 30);
		let ids: std::collections::HashSet<&Key> = graph.nodes.iter().map(|n| &n.id).collect();
		assert!(
			graph
				.links
				.iter()
				.all(|l| ids.contains(&l.source) && ids.contains(&l.target))
		);
	}

	#[test]
	fn default_stimulus_keeps_twenty_nodes() {
		let graph = build_stimulus(&StimulusConfig::default()).unwrap();
		assert_eq!(graph.nodes.len(), 20);
	}

	#[test]
	fn central_characters_rank_first() {
		let config = StimulusConfig::from_lookup(|key| match key {
			"centrality" => Some("10".to_string()),
			"top" => Some("3".to_string()),
			_ => None,
		})
		.unwrap();
		let graph = build_stimulus(&config).unwrap();
		let ids: Vec<String> = graph.nodes.iter().map(|n| n.id.to_string()).collect();
		assert_eq!(ids, vec!["Valjean", "Fantine", "Myriel"]);
	}
}
