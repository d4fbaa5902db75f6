use std::cell::RefCell;
use std::rc::Rc;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use leptos::prelude::*;
use wasm_bindgen::prelude::*;
use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement, MouseEvent};

use super::render;
use super::state::ForceGraphState;
use crate::config::RenderConfig;
use crate::graph::GraphData;
use crate::readability::Readability;

/// Longest step fed to the simulation, so a backgrounded tab does not jump.
const MAX_DT: f64 = 0.05;

/// Cleared when the component unmounts so its frame loop stops.
#[derive(Clone, Debug)]
struct Mounted(Arc<AtomicBool>);

impl Mounted {
	fn new() -> Self {
		Self(Arc::new(AtomicBool::new(true)))
	}

	fn unmount(&self) {
		self.0.store(false, Ordering::Relaxed);
	}

	fn is_mounted(&self) -> bool {
		self.0.load(Ordering::Relaxed)
	}
}

/// One animation frame. Once unmounted the layout is left alone and nothing is
/// published.
fn step(state: &mut ForceGraphState, mounted: &Mounted, dt: f32) -> Option<Readability> {
	if !mounted.is_mounted() {
		return None;
	}
	state.tick(dt)
}

/// Pointer position in canvas pixels, accounting for CSS scaling.
fn canvas_point(canvas: &HtmlCanvasElement, ev: &MouseEvent) -> (f64, f64) {
	let rect = canvas.get_bounding_client_rect();
	let (sx, sy) = (
		if rect.width() > 0.0 { canvas.width() as f64 / rect.width() } else { 1.0 },
		if rect.height() > 0.0 { canvas.height() as f64 / rect.height() } else { 1.0 },
	);
	(
		(ev.client_x() as f64 - rect.left()) * sx,
		(ev.client_y() as f64 - rect.top()) * sy,
	)
}

/// Force-directed node-link diagram with draggable nodes.
///
/// When the layout settles, the readability scores are logged and written to
/// `readability` if given.
#[component]
pub fn ForceGraphCanvas(
	data: GraphData,
	#[prop(default = RenderConfig::default())] config: RenderConfig,
	#[prop(optional)] readability: Option<RwSignal<Option<Readability>>>,
) -> impl IntoView {
	let canvas_ref = NodeRef::<leptos::html::Canvas>::new();
	let state: Rc<RefCell<Option<ForceGraphState>>> = Rc::new(RefCell::new(None));
	let animate: Rc<RefCell<Option<Closure<dyn FnMut()>>>> = Rc::new(RefCell::new(None));
	let (state_init, animate_init) = (state.clone(), animate.clone());
	let (width, height) = (config.width, config.height);
	let mounted = Mounted::new();
	let mounted_cleanup = mounted.clone();
	on_cleanup(move || mounted_cleanup.unmount());

	Effect::new(move |_| {
		let Some(canvas) = canvas_ref.get() else {
			return;
		};
		let canvas: HtmlCanvasElement = canvas.into();
		canvas.set_width(width as u32);
		canvas.set_height(height as u32);

		let ctx: CanvasRenderingContext2d = canvas
			.get_context("2d")
			.unwrap()
			.unwrap()
			.dyn_into()
			.unwrap();
		*state_init.borrow_mut() = Some(ForceGraphState::new(&data, &config));

		let (state_anim, animate_inner) = (state_init.clone(), animate_init.clone());
		let mounted = mounted.clone();
		let mut last = js_sys::Date::now();
		*animate_init.borrow_mut() = Some(Closure::new(move || {
			if !mounted.is_mounted() {
				return;
			}
			let now = js_sys::Date::now();
			let dt = ((now - last) / 1000.0).clamp(0.0, MAX_DT);
			last = now;
			if let Some(ref mut s) = *state_anim.borrow_mut() {
				if let Some(scores) = step(s, &mounted, dt as f32) {
					if let Some(sig) = readability {
						sig.set(Some(scores));
					}
				}
				render::render(s, &ctx);
			}
			if let Some(ref cb) = *animate_inner.borrow() {
				let _ = web_sys::window()
					.unwrap()
					.request_animation_frame(cb.as_ref().unchecked_ref());
			}
		}));
		if let Some(ref cb) = *animate_init.borrow() {
			let _ = web_sys::window()
				.unwrap()
				.request_animation_frame(cb.as_ref().unchecked_ref());
		}
	});

	let state_md = state.clone();
	let on_mousedown = move |ev: MouseEvent| {
		let canvas: HtmlCanvasElement = canvas_ref.get().unwrap().into();
		let (x, y) = canvas_point(&canvas, &ev);
		if let Some(ref mut s) = *state_md.borrow_mut() {
			if let Some(idx) = s.node_at_position(x, y) {
				s.start_drag(idx, x, y);
			}
		}
	};

	let state_mm = state.clone();
	let on_mousemove = move |ev: MouseEvent| {
		let canvas: HtmlCanvasElement = canvas_ref.get().unwrap().into();
		let (x, y) = canvas_point(&canvas, &ev);
		if let Some(ref mut s) = *state_mm.borrow_mut() {
			if s.drag.active {
				s.drag_to(x, y);
				return;
			}
			let hovered = s.node_at_position(x, y);
			if hovered != s.hovered {
				s.hovered = hovered;
				let title = hovered.and_then(|idx| s.label_of(idx)).unwrap_or_default();
				canvas.set_title(&title);
			}
		}
	};

	let state_mu = state.clone();
	let on_mouseup = move |_: MouseEvent| {
		if let Some(ref mut s) = *state_mu.borrow_mut() {
			s.end_drag();
		}
	};

	let state_ml = state.clone();
	let on_mouseleave = move |_: MouseEvent| {
		if let Some(ref mut s) = *state_ml.borrow_mut() {
			s.end_drag();
			s.hovered = None;
		}
	};

	view! {
		<canvas
			node_ref=canvas_ref
			class="force-graph-canvas"
			on:mousedown=on_mousedown
			on:mousemove=on_mousemove
			on:mouseup=on_mouseup
			on:mouseleave=on_mouseleave
			style="display: block; max-width: 100%; height: auto; cursor: grab;"
		/>
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::graph::{GraphLink, GraphNode};

	fn pair() -> ForceGraphState {
		let data = GraphData {
			nodes: vec![GraphNode::new(1, 0), GraphNode::new(2, 0)],
			links: vec![GraphLink::new(1, 2, 1.0)],
		};
		ForceGraphState::new(&data, &RenderConfig::default())
	}

	#[test]
	fn mounted_loop_reports_once() {
		let mut state = pair();
		let mounted = Mounted::new();
		let reports = (0..1000)
			.filter_map(|_| step(&mut state, &mounted, 0.016))
			.count();
		assert_eq!(reports, 1);
	}

	#[test]
	fn unmounted_loop_stops_and_publishes_nothing() {
		let mut state = pair();
		let mounted = Mounted::new();
		step(&mut state, &mounted, 0.016);
		let alpha = state.cooling.alpha;

		mounted.clone().unmount();
		assert!(!mounted.is_mounted());
		assert!((0..1000).all(|_| step(&mut state, &mounted, 0.016).is_none()));
		assert_eq!(state.cooling.alpha, alpha);
		assert!(state.readability.is_none());
	}
}
