//! Leptos component wrapping the topology canvas.
//!
//! The component creates an HTML canvas element and forwards mouse, wheel and
//! touch input to [`TopologyState`]. A `requestAnimationFrame` loop repaints
//! whenever the state reports a change.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use leptos::prelude::*;
use log::{info, warn};
use wasm_bindgen::prelude::*;
use web_sys::{
	CanvasRenderingContext2d, HtmlCanvasElement, MouseEvent, Touch, TouchEvent, WheelEvent, Window,
};

use super::model::Point;
use super::render;
use super::state::{TopologyConfig, TopologyState};
use super::theme::Theme;
use super::types::TopologySnapshot;

/// Wheel notch zoom factors.
const WHEEL_ZOOM_IN: f64 = 1.1;
const WHEEL_ZOOM_OUT: f64 = 0.9;

/// Session state plus the theme it is drawn with.
struct TopologyContext {
	state: TopologyState,
	theme: Theme,
}

type SharedContext = Rc<RefCell<Option<TopologyContext>>>;

/// Renders an interactive network-group topology on a canvas element.
///
/// Every new value of `snapshot` rebuilds the graph; a snapshot for the same
/// group keeps the current view and selection. `on_select` receives the
/// selected node id (or `None`) on every selection change, and `on_error`
/// receives a message whenever a snapshot is rejected. The component sizes
/// itself to its parent container unless `fullscreen` or explicit
/// `width`/`height` are given.
#[component]
pub fn TopologyGraphCanvas(
	#[prop(into)] snapshot: Signal<Option<TopologySnapshot>>,
	#[prop(optional)] config: Option<TopologyConfig>,
	#[prop(optional, into)] on_select: Option<Callback<Option<String>>>,
	#[prop(optional, into)] on_error: Option<Callback<String>>,
	#[prop(default = false)] fullscreen: bool,
	#[prop(default = None)] width: Option<f64>,
	#[prop(default = None)] height: Option<f64>,
) -> impl IntoView {
	let canvas_ref = NodeRef::<leptos::html::Canvas>::new();
	let context: SharedContext = Rc::new(RefCell::new(None));
	let animate: Rc<RefCell<Option<Closure<dyn FnMut()>>>> = Rc::new(RefCell::new(None));
	let resize_cb: Rc<RefCell<Option<Closure<dyn FnMut()>>>> = Rc::new(RefCell::new(None));
	let (context_init, animate_init, resize_cb_init) =
		(context.clone(), animate.clone(), resize_cb.clone());
	let config = config.unwrap_or_default();

	Effect::new(move |_| {
		let Some(canvas) = canvas_ref.get() else {
			return;
		};
		let canvas: HtmlCanvasElement = canvas.into();
		let next = snapshot.get();

		if context_init.borrow().is_none() {
			let Some(window) = web_sys::window() else {
				return;
			};
			let Some(ctx) = canvas_context(&canvas) else {
				warn!("topology: canvas has no 2d context");
				return;
			};

			let (w, h) = if fullscreen {
				window_size(&window)
			} else {
				(
					width.unwrap_or_else(|| {
						canvas
							.parent_element()
							.map(|p| p.client_width() as f64)
							.unwrap_or(800.0)
					}),
					height.unwrap_or_else(|| {
						canvas
							.parent_element()
							.map(|p| p.client_height() as f64)
							.unwrap_or(600.0)
					}),
				)
			};
			canvas.set_width(w as u32);
			canvas.set_height(h as u32);

			let mut state = TopologyState::new(config.clone(), w, h);
			if let Some(cb) = on_select {
				state.subscribe_selection(move |id| cb.run(id.map(str::to_string)));
			}
			if let Some(cb) = on_error {
				state.on_rebuild_failed(move |err| cb.run(err.to_string()));
			}
			*context_init.borrow_mut() = Some(TopologyContext {
				state,
				theme: Theme::default(),
			});
			info!("topology: canvas ready at {w}x{h}");

			if fullscreen {
				let (context_resize, canvas_resize) = (context_init.clone(), canvas.clone());
				*resize_cb_init.borrow_mut() = Some(Closure::new(move || {
					let Some(win) = web_sys::window() else {
						return;
					};
					let (nw, nh) = window_size(&win);
					canvas_resize.set_width(nw as u32);
					canvas_resize.set_height(nh as u32);
					if let Some(ref mut c) = *context_resize.borrow_mut() {
						c.state.resize(nw, nh);
					}
				}));
				if let Some(ref cb) = *resize_cb_init.borrow() {
					let _ =
						window.add_event_listener_with_callback("resize", cb.as_ref().unchecked_ref());
				}
			}

			let (context_anim, animate_inner) = (context_init.clone(), animate_init.clone());
			*animate_init.borrow_mut() = Some(Closure::new(move || {
				if let Some(ref mut c) = *context_anim.borrow_mut() {
					if c.state.take_redraw() {
						render::render(&c.state, &ctx, &c.theme);
					}
				}
				if let (Some(cb), Some(win)) = (&*animate_inner.borrow(), web_sys::window()) {
					let _ = win.request_animation_frame(cb.as_ref().unchecked_ref());
				}
			}));
			if let Some(ref cb) = *animate_init.borrow() {
				let _ = window.request_animation_frame(cb.as_ref().unchecked_ref());
			}
		}

		if let (Some(snap), Some(c)) = (next, context_init.borrow_mut().as_mut()) {
			// Rejections are logged and reported through `on_error`.
			let _ = c.state.rebuild(snap);
		}
	});

	let context_md = context.clone();
	let on_mousedown = move |ev: MouseEvent| {
		if ev.button() != 0 {
			return;
		}
		let Some(p) = local_point(&canvas_ref, ev.client_x(), ev.client_y()) else {
			return;
		};
		if let Some(ref mut c) = *context_md.borrow_mut() {
			c.state.pointer_down(p);
		}
	};

	let context_mm = context.clone();
	let on_mousemove = move |ev: MouseEvent| {
		let Some(p) = local_point(&canvas_ref, ev.client_x(), ev.client_y()) else {
			return;
		};
		if let Some(ref mut c) = *context_mm.borrow_mut() {
			c.state.pointer_moved(p);
		}
	};

	let context_mu = context.clone();
	let on_mouseup = move |ev: MouseEvent| {
		let Some(p) = local_point(&canvas_ref, ev.client_x(), ev.client_y()) else {
			return;
		};
		if let Some(ref mut c) = *context_mu.borrow_mut() {
			c.state.pointer_up(p);
		}
	};

	let context_ml = context.clone();
	let on_mouseleave = move |_: MouseEvent| {
		if let Some(ref mut c) = *context_ml.borrow_mut() {
			c.state.pointer_cancel();
		}
	};

	let context_dc = context.clone();
	let on_dblclick = move |_: MouseEvent| {
		if let Some(ref mut c) = *context_dc.borrow_mut() {
			c.state.zoom_to_fit();
		}
	};

	let context_wh = context.clone();
	let on_wheel = move |ev: WheelEvent| {
		ev.prevent_default();
		let Some(p) = local_point(&canvas_ref, ev.client_x(), ev.client_y()) else {
			return;
		};
		if let Some(ref mut c) = *context_wh.borrow_mut() {
			let factor = if ev.delta_y() > 0.0 {
				WHEEL_ZOOM_OUT
			} else {
				WHEEL_ZOOM_IN
			};
			c.state.wheel_zoom(factor, p);
		}
	};

	// Touch: one finger drives the pointer gesture, two fingers pinch. The
	// pinch ratio is measured against the finger distance at pinch start.
	let pinch_start: Rc<Cell<Option<f64>>> = Rc::new(Cell::new(None));

	let (context_ts, pinch_ts) = (context.clone(), pinch_start.clone());
	let on_touchstart = move |ev: TouchEvent| {
		ev.prevent_default();
		let touches = ev.touches();
		let mut guard = context_ts.borrow_mut();
		let Some(c) = guard.as_mut() else {
			return;
		};
		match touches.length() {
			1 => {
				if let Some(p) = touches.get(0).and_then(|t| touch_point(&canvas_ref, &t)) {
					c.state.pointer_down(p);
				}
			}
			2 => {
				c.state.pointer_cancel();
				pinch_ts.set(finger_distance(&touches.get(0), &touches.get(1)));
			}
			_ => {}
		}
	};

	let (context_tm, pinch_tm) = (context.clone(), pinch_start.clone());
	let on_touchmove = move |ev: TouchEvent| {
		ev.prevent_default();
		let touches = ev.touches();
		let mut guard = context_tm.borrow_mut();
		let Some(c) = guard.as_mut() else {
			return;
		};
		match (touches.length(), pinch_tm.get()) {
			(1, None) => {
				if let Some(p) = touches.get(0).and_then(|t| touch_point(&canvas_ref, &t)) {
					c.state.pointer_moved(p);
				}
			}
			(2, Some(base)) if base > 0.0 => {
				if let Some(d) = finger_distance(&touches.get(0), &touches.get(1)) {
					c.state.pinch_changed(d / base);
				}
			}
			_ => {}
		}
	};

	let (context_te, pinch_te) = (context.clone(), pinch_start.clone());
	let on_touchend = move |ev: TouchEvent| {
		ev.prevent_default();
		let mut guard = context_te.borrow_mut();
		let Some(c) = guard.as_mut() else {
			return;
		};
		if pinch_te.get().is_some() {
			if ev.touches().length() < 2 {
				pinch_te.set(None);
				c.state.pinch_ended();
			}
			return;
		}
		let lifted = ev
			.changed_touches()
			.get(0)
			.and_then(|t| touch_point(&canvas_ref, &t));
		match lifted {
			Some(p) => c.state.pointer_up(p),
			None => c.state.pointer_cancel(),
		};
	};

	let (context_tc, pinch_tc) = (context.clone(), pinch_start.clone());
	let on_touchcancel = move |_: TouchEvent| {
		if let Some(ref mut c) = *context_tc.borrow_mut() {
			if pinch_tc.take().is_some() {
				c.state.pinch_ended();
			}
			c.state.pointer_cancel();
		}
	};

	view! {
		<canvas
			node_ref=canvas_ref
			class="topology-graph-canvas"
			on:mousedown=on_mousedown
			on:mousemove=on_mousemove
			on:mouseup=on_mouseup
			on:mouseleave=on_mouseleave
			on:dblclick=on_dblclick
			on:wheel=on_wheel
			on:touchstart=on_touchstart
			on:touchmove=on_touchmove
			on:touchend=on_touchend
			on:touchcancel=on_touchcancel
			style="display: block; cursor: grab; touch-action: none;"
		/>
	}
}

fn canvas_context(canvas: &HtmlCanvasElement) -> Option<CanvasRenderingContext2d> {
	canvas.get_context("2d").ok()??.dyn_into().ok()
}

fn window_size(window: &Window) -> (f64, f64) {
	let dim = |v: Result<JsValue, JsValue>, fallback: f64| {
		v.ok().and_then(|v| v.as_f64()).unwrap_or(fallback)
	};
	(dim(window.inner_width(), 800.0), dim(window.inner_height(), 600.0))
}

/// Converts client coordinates to canvas-local screen space.
fn local_point(canvas_ref: &NodeRef<leptos::html::Canvas>, x: i32, y: i32) -> Option<Point> {
	let canvas: HtmlCanvasElement = canvas_ref.get()?.into();
	let rect = canvas.get_bounding_client_rect();
	Some(Point::new(x as f64 - rect.left(), y as f64 - rect.top()))
}

fn touch_point(canvas_ref: &NodeRef<leptos::html::Canvas>, touch: &Touch) -> Option<Point> {
	local_point(canvas_ref, touch.client_x(), touch.client_y())
}

fn finger_distance(a: &Option<Touch>, b: &Option<Touch>) -> Option<f64> {
	let (a, b) = (a.as_ref()?, b.as_ref()?);
	let d = Point::new(
		(a.client_x() - b.client_x()) as f64,
		(a.client_y() - b.client_y()) as f64,
	);
	Some(d.length())
}
