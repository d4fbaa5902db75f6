use std::collections::HashMap;
use std::f64::consts::PI;

use force_graph::{DefaultNodeIdx, EdgeData, ForceGraph, NodeData, SimulationParameters};
use log::{debug, info};

use super::scale::{GroupColors, LinearScale};
use crate::config::RenderConfig;
use crate::graph::GraphData;
use crate::readability::{Readability, greadability};

pub const NODE_RADIUS: f64 = 5.0;
pub const HIT_RADIUS: f64 = 8.0;
pub const LINK_COLOR: &str = "#C0C0C0";

const ALPHA_MIN: f64 = 0.001;
const ALPHA_DRAG_TARGET: f64 = 0.3;
const CHARGE_SCALE: f64 = 5.0;

/// Per-tick decay that takes alpha from 1 to `ALPHA_MIN` in 300 ticks.
fn alpha_decay() -> f64 {
	1.0 - ALPHA_MIN.powf(1.0 / 300.0)
}

#[derive(Clone, Debug, Default)]
pub struct NodeInfo {
	pub label: String,
	pub color: &'static str,
}

#[derive(Clone, Copy, Debug)]
pub struct EdgeInfo {
	pub source: DefaultNodeIdx,
	pub target: DefaultNodeIdx,
	pub width: f64,
	/// Share of the length correction per tick, `1 / min(degree)` of the endpoints.
	pub strength: f64,
	/// Share of the correction taken by the target, by relative degree.
	pub bias: f64,
}

#[derive(Clone, Debug, Default)]
pub struct DragState {
	pub active: bool,
	pub node_idx: Option<DefaultNodeIdx>,
	pub start_x: f64,
	pub start_y: f64,
	pub node_start_x: f32,
	pub node_start_y: f32,
}

/// Decaying simulation energy. The layout settles when `alpha` falls below `ALPHA_MIN`.
#[derive(Clone, Debug)]
pub struct Cooling {
	pub alpha: f64,
	pub alpha_target: f64,
	pub settled: bool,
}

impl Default for Cooling {
	fn default() -> Self {
		Self {
			alpha: 1.0,
			alpha_target: 0.0,
			settled: false,
		}
	}
}

pub struct ForceGraphState {
	pub graph: ForceGraph<NodeInfo, ()>,
	pub drag: DragState,
	pub cooling: Cooling,
	pub hovered: Option<DefaultNodeIdx>,
	pub width: f64,
	pub height: f64,
	pub readability: Option<Readability>,
	center: (f64, f64),
	link_distance: f64,
	order: Vec<DefaultNodeIdx>,
	edges: Vec<EdgeInfo>,
}

impl ForceGraphState {
	pub fn new(data: &GraphData, config: &RenderConfig) -> Self {
		// Links are held at `link_distance` by `constrain_links`; the engine's own
		// spring has no rest length, so it stays off.
		let mut graph = ForceGraph::new(SimulationParameters {
			force_charge: (-config.many_body_strength * CHARGE_SCALE) as f32,
			force_spring: 0.0,
			force_max: 100.0,
			node_speed: 3000.0,
			damping_factor: 0.9,
		});
		let colors = GroupColors::new(data.groups());
		let widths = LinearScale::from_extent(
			data.links.iter().map(|l| l.value),
			(config.min_link_stroke_width, config.max_link_stroke_width),
		);
		let center = config.center();
		let golden_angle = PI * (3.0 - 5f64.sqrt());
		let mut id_to_idx = HashMap::new();
		let mut order = Vec::with_capacity(data.nodes.len());

		for (i, node) in data.nodes.iter().enumerate() {
			let (radius, angle) = (10.0 * (0.5 + i as f64).sqrt(), i as f64 * golden_angle);
			let idx = graph.add_node(NodeData {
				x: (center.0 + radius * angle.cos()) as f32,
				y: (center.1 + radius * angle.sin()) as f32,
				mass: 10.0,
				is_anchor: false,
				user_data: NodeInfo {
					label: node.id.to_string(),
					color: colors.color(&node.group),
				},
			});
			id_to_idx.insert(&node.id, idx);
			order.push(idx);
		}

		let mut edges = Vec::with_capacity(data.links.len());
		for link in &data.links {
			if let (Some(&source), Some(&target)) =
				(id_to_idx.get(&link.source), id_to_idx.get(&link.target))
			{
				graph.add_edge(source, target, EdgeData::default());
				edges.push(EdgeInfo {
					source,
					target,
					width: widths.apply(link.value),
					strength: 0.0,
					bias: 0.0,
				});
			}
		}
		let mut degree: HashMap<DefaultNodeIdx, f64> = HashMap::new();
		for edge in &edges {
			*degree.entry(edge.source).or_insert(0.0) += 1.0;
			*degree.entry(edge.target).or_insert(0.0) += 1.0;
		}
		for edge in &mut edges {
			let (ds, dt) = (degree[&edge.source], degree[&edge.target]);
			edge.strength = 1.0 / ds.min(dt);
			edge.bias = ds / (ds + dt);
		}
		debug!(
			"simulation: {} nodes, {} edges, center {:?}",
			order.len(),
			edges.len(),
			center
		);

		Self {
			graph,
			drag: DragState::default(),
			cooling: Cooling::default(),
			hovered: None,
			width: config.width,
			height: config.height,
			readability: None,
			center,
			link_distance: config.link_distance.max(0.0),
			order,
			edges,
		}
	}

	pub fn edges(&self) -> &[EdgeInfo] {
		&self.edges
	}

	/// Node positions keyed by simulation index.
	pub fn position_map(&self) -> HashMap<DefaultNodeIdx, (f64, f64)> {
		let mut positions = HashMap::with_capacity(self.order.len());
		self.graph.visit_nodes(|node| {
			positions.insert(node.index(), (node.x() as f64, node.y() as f64));
		});
		positions
	}

	/// Node positions in dataset order.
	pub fn positions(&self) -> Vec<(f64, f64)> {
		let map = self.position_map();
		self.order
			.iter()
			.map(|idx| map.get(idx).copied().unwrap_or(self.center))
			.collect()
	}

	pub fn node_at_position(&self, x: f64, y: f64) -> Option<DefaultNodeIdx> {
		let mut found = None;
		self.graph.visit_nodes(|node| {
			let (dx, dy) = (node.x() as f64 - x, node.y() as f64 - y);
			if (dx * dx + dy * dy).sqrt() < HIT_RADIUS {
				found = Some(node.index());
			}
		});
		found
	}

	pub fn label_of(&self, idx: DefaultNodeIdx) -> Option<String> {
		let mut label = None;
		self.graph.visit_nodes(|node| {
			if node.index() == idx {
				label = Some(node.data.user_data.label.clone());
			}
		});
		label
	}

	/// Advances the layout. Returns the readability scores on the tick it settles.
	pub fn tick(&mut self, dt: f32) -> Option<Readability> {
		if self.cooling.settled {
			return None;
		}
		let cooling = &mut self.cooling;
		cooling.alpha += (cooling.alpha_target - cooling.alpha) * alpha_decay();
		self.graph.update(dt * cooling.alpha as f32);
		self.constrain_links();
		self.recenter();

		if self.cooling.alpha >= ALPHA_MIN {
			return None;
		}
		self.cooling.settled = true;
		let order: HashMap<DefaultNodeIdx, usize> =
			self.order.iter().enumerate().map(|(i, &idx)| (idx, i)).collect();
		let links: Vec<(usize, usize)> = self
			.edges
			.iter()
			.map(|e| (order[&e.source], order[&e.target]))
			.collect();
		let scores = greadability(&self.positions(), &links);
		info!(
			"readability: {}",
			serde_json::to_string(&scores).unwrap_or_else(|_| format!("{scores:?}"))
		);
		self.readability = Some(scores);
		Some(scores)
	}

	/// Moves each link's free endpoints towards `link_distance`, scaled by alpha.
	fn constrain_links(&mut self) {
		let alpha = self.cooling.alpha;
		let mut positions: HashMap<DefaultNodeIdx, (f64, f64, bool)> =
			HashMap::with_capacity(self.order.len());
		self.graph.visit_nodes(|node| {
			positions.insert(
				node.index(),
				(node.x() as f64, node.y() as f64, node.data.is_anchor),
			);
		});

		for edge in &self.edges {
			if edge.source == edge.target {
				continue;
			}
			let (Some(&(sx, sy, s_pinned)), Some(&(tx, ty, t_pinned))) =
				(positions.get(&edge.source), positions.get(&edge.target))
			else {
				continue;
			};
			let (dx, dy) = (tx - sx, ty - sy);
			let len = (dx * dx + dy * dy).sqrt();
			if len < 1e-6 {
				continue;
			}
			let k = alpha * edge.strength * (len - self.link_distance) / len;
			let (mx, my) = (dx * k, dy * k);
			if !t_pinned {
				if let Some(p) = positions.get_mut(&edge.target) {
					p.0 -= mx * edge.bias;
					p.1 -= my * edge.bias;
				}
			}
			if !s_pinned {
				if let Some(p) = positions.get_mut(&edge.source) {
					p.0 += mx * (1.0 - edge.bias);
					p.1 += my * (1.0 - edge.bias);
				}
			}
		}

		self.graph.visit_nodes_mut(|node| {
			if let Some(&(x, y, pinned)) = positions.get(&node.index()) {
				if !pinned {
					node.data.x = x as f32;
					node.data.y = y as f32;
				}
			}
		});
	}

	/// Shifts free nodes so the mean position sits on the center point.
	fn recenter(&mut self) {
		if self.order.is_empty() {
			return;
		}
		let (mut sx, mut sy) = (0.0f64, 0.0f64);
		self.graph.visit_nodes(|node| {
			sx += node.x() as f64;
			sy += node.y() as f64;
		});
		let n = self.order.len() as f64;
		let (dx, dy) = (
			(self.center.0 - sx / n) as f32,
			(self.center.1 - sy / n) as f32,
		);
		self.graph.visit_nodes_mut(|node| {
			if !node.data.is_anchor {
				node.data.x += dx;
				node.data.y += dy;
			}
		});
	}

	/// Pins `idx` where it stands and reheats the layout.
	pub fn start_drag(&mut self, idx: DefaultNodeIdx, x: f64, y: f64) {
		if !self.drag.active {
			self.cooling.alpha_target = ALPHA_DRAG_TARGET;
			self.cooling.settled = false;
		}
		self.drag.active = true;
		self.drag.node_idx = Some(idx);
		self.drag.start_x = x;
		self.drag.start_y = y;
		let drag = &mut self.drag;
		self.graph.visit_nodes_mut(|node| {
			if node.index() == idx {
				drag.node_start_x = node.data.x;
				drag.node_start_y = node.data.y;
				node.data.is_anchor = true;
			}
		});
	}

	/// Moves the pinned node by the pointer's offset since the drag started.
	pub fn drag_to(&mut self, x: f64, y: f64) {
		let Some(idx) = self.drag.node_idx.filter(|_| self.drag.active) else {
			return;
		};
		let (nx, ny) = (
			self.drag.node_start_x + (x - self.drag.start_x) as f32,
			self.drag.node_start_y + (y - self.drag.start_y) as f32,
		);
		self.graph.visit_nodes_mut(|node| {
			if node.index() == idx {
				node.data.x = nx;
				node.data.y = ny;
			}
		});
	}

	/// Releases the pinned node and lets the layout cool down again.
	pub fn end_drag(&mut self) {
		if !self.drag.active {
			return;
		}
		if let Some(idx) = self.drag.node_idx {
			self.graph.visit_nodes_mut(|node| {
				if node.index() == idx {
					node.data.is_anchor = false;
				}
			});
		}
		self.cooling.alpha_target = 0.0;
		self.drag = DragState::default();
	}
}
