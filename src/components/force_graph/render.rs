use std::f64::consts::PI;

use web_sys::CanvasRenderingContext2d;

use super::state::{ForceGraphState, LINK_COLOR, NODE_RADIUS};

pub fn render(state: &ForceGraphState, ctx: &CanvasRenderingContext2d) {
	ctx.set_fill_style_str("#ffffff");
	ctx.fill_rect(0.0, 0.0, state.width, state.height);
	draw_edges(state, ctx);
	draw_nodes(state, ctx);
}

fn draw_edges(state: &ForceGraphState, ctx: &CanvasRenderingContext2d) {
	let positions = state.position_map();
	ctx.set_stroke_style_str(LINK_COLOR);
	for edge in state.edges() {
		let (Some(&(x1, y1)), Some(&(x2, y2))) =
			(positions.get(&edge.source), positions.get(&edge.target))
		else {
			continue;
		};
		ctx.set_line_width(edge.width);
		ctx.begin_path();
		ctx.move_to(x1, y1);
		ctx.line_to(x2, y2);
		ctx.stroke();
	}
}

fn draw_nodes(state: &ForceGraphState, ctx: &CanvasRenderingContext2d) {
	ctx.set_font("10px sans-serif");
	state.graph.visit_nodes(|node| {
		let (x, y) = (node.x() as f64, node.y() as f64);

		ctx.begin_path();
		let _ = ctx.arc(x, y, NODE_RADIUS, 0.0, 2.0 * PI);
		ctx.set_fill_style_str(node.data.user_data.color);
		ctx.fill();

		if state.hovered == Some(node.index()) {
			ctx.set_stroke_style_str("#333333");
			ctx.set_line_width(1.5);
			ctx.stroke();
		}

		ctx.set_fill_style_str("#000000");
		let _ = ctx.fill_text(&node.data.user_data.label, x + 6.0, y + 3.0);
	});
}
