use std::cell::RefCell;
use std::rc::Rc;
use std::time::Duration;

use leptos::ev;
use leptos::prelude::*;
use leptos::task::spawn_local;
use log::{debug, error, info, warn};
use web_sys::{DragEvent, Element, MouseEvent, WheelEvent};

use super::diagram;
use super::render;
use super::shapes;
use super::state::{CLICK_SUPPRESSION_MS, CartographyState};
use super::types::DiagramStatus;
use super::viewport::{INITIAL_SCALE, Size, ViewportState, ZoomDirection, format_zoom};
use crate::config::CartographyConfig;
use crate::error::DiagramError;

/// Lets layout settle before the first centering.
const CENTER_DELAY_MS: u64 = 50;

struct LoadedDiagram {
	size: Size,
	activated: usize,
	mismatch: bool,
}

async fn load_diagram(
	container: &Element,
	config: &CartographyConfig,
) -> Result<LoadedDiagram, DiagramError> {
	let url = config.diagram_url(js_sys::Date::now() as u64);
	info!("[carto] loading diagram from {url}");
	let markup = diagram::load(&url, config.load_timeout_ms).await?;
	info!("[carto] diagram loaded, {} characters", markup.len());

	let declared = diagram::inspect(&markup);
	container.set_inner_html(&markup);
	let svg = container
		.query_selector("svg")
		.ok()
		.flatten()
		.ok_or(DiagramError::MissingRoot)?;

	let (size, source) = diagram::settle_size(declared, render::rect_size(&svg));
	info!(
		"[carto] diagram size {} x {} (from {source:?})",
		size.width, size.height
	);
	render::fix_svg_size(&svg, size);

	let report = shapes::resolve(shapes::dom_elements(&svg), &config.shape_map);
	for activation in &report.activated {
		debug!(
			"[carto] activity shape {:?} -> {}",
			activation.shape_id, activation.entity_id
		);
		render::mark_activated(activation);
	}
	info!(
		"[carto] {} elements scanned, {} shape ids found, {} clickable activities",
		report.scanned,
		report.identifiers_found(),
		report.activated_count()
	);

	let mismatch = report.mismatch(&config.shape_map);
	if let Some(mismatch) = &mismatch {
		warn!(
			"[carto] no clickable activity: none of the {} mapped shape ids occur in the diagram",
			config.shape_map.len()
		);
		warn!("[carto] shape ids in diagram: {:?}", mismatch.found);
		warn!("[carto] shape ids expected: {:?}", mismatch.expected);
	}

	Ok(LoadedDiagram {
		size,
		activated: report.activated_count(),
		mismatch: mismatch.is_some(),
	})
}

/// Pannable, zoomable activity map with clickable activity shapes.
#[component]
pub fn CartographyView(config: CartographyConfig) -> impl IntoView {
	let wrapper_ref = NodeRef::<leptos::html::Div>::new();
	let layer_ref = NodeRef::<leptos::html::Div>::new();
	let svg_ref = NodeRef::<leptos::html::Div>::new();
	let state: Rc<RefCell<CartographyState>> = Rc::new(RefCell::new(CartographyState::default()));
	let config = Rc::new(config);

	let status = RwSignal::new(if config.svg_exists {
		DiagramStatus::Loading
	} else {
		DiagramStatus::Missing
	});
	let zoom_label = RwSignal::new(format_zoom(INITIAL_SCALE));
	let show_mismatch = RwSignal::new(false);

	let apply = move |viewport: ViewportState| {
		if let Some(layer) = layer_ref.get_untracked() {
			render::apply_transform(&layer, &viewport);
		}
		zoom_label.set(viewport.zoom_label());
	};
	let container_size = move || wrapper_ref.get_untracked().map(|w| render::rect_size(&w));
	let dragging_classes = move |on: bool| {
		if let Some(wrapper) = wrapper_ref.get_untracked() {
			let _ = wrapper.class_list().toggle_with_force("panning", on);
		}
		if let Some(layer) = layer_ref.get_untracked() {
			let _ = layer.class_list().toggle_with_force("no-transition", on);
		}
	};

	let (state_load, config_load) = (state.clone(), config.clone());
	Effect::new(move |_| {
		let Some(container) = svg_ref.get() else {
			return;
		};
		if !config_load.svg_exists {
			info!("[carto] no diagram available");
			return;
		}
		let (state, config) = (state_load.clone(), config_load.clone());
		spawn_local(async move {
			let loaded = match load_diagram(&container, &config).await {
				Ok(loaded) => loaded,
				Err(err) => {
					error!("[carto] diagram load failed: {err}");
					container.set_inner_html("");
					status.set(DiagramStatus::Failed(err.to_string()));
					return;
				}
			};

			let viewport = {
				let mut s = state.borrow_mut();
				s.load(loaded.size, container_size().unwrap_or(loaded.size));
				s.viewport
			};
			if let Some(viewport) = viewport {
				info!("[carto] initial zoom {}", viewport.zoom_label());
				apply(viewport);
			}
			show_mismatch.set(loaded.mismatch && config.surface_mismatch);
			status.set(DiagramStatus::Ready {
				activated: loaded.activated,
			});

			set_timeout(
				move || {
					let Some(size) = container_size() else {
						return;
					};
					let viewport = state.borrow_mut().center(size);
					if let Some(viewport) = viewport {
						apply(viewport);
					}
				},
				Duration::from_millis(CENTER_DELAY_MS),
			);
		});
	});

	let state_mm = state.clone();
	let move_handle = window_event_listener(ev::mousemove, move |ev: MouseEvent| {
		let viewport = state_mm
			.borrow_mut()
			.drag_to(ev.client_x() as f64, ev.client_y() as f64);
		if let Some(viewport) = viewport {
			apply(viewport);
		}
	});

	let state_mu = state.clone();
	let up_handle = window_event_listener(ev::mouseup, move |_: MouseEvent| {
		if !state_mu.borrow_mut().end_pan() {
			return;
		}
		dragging_classes(false);
		let state = state_mu.clone();
		set_timeout(
			move || state.borrow_mut().clear_suppression(),
			Duration::from_millis(CLICK_SUPPRESSION_MS),
		);
	});
	on_cleanup(move || {
		move_handle.remove();
		up_handle.remove();
	});

	let state_md = state.clone();
	let on_mousedown = move |ev: MouseEvent| {
		let began = state_md.borrow_mut().begin_pan(
			ev.button(),
			ev.client_x() as f64,
			ev.client_y() as f64,
		);
		if began {
			ev.prevent_default();
			dragging_classes(true);
		}
	};

	let state_wh = state.clone();
	let on_wheel = move |ev: WheelEvent| {
		ev.prevent_default();
		let Some(wrapper) = wrapper_ref.get_untracked() else {
			return;
		};
		let rect = wrapper.get_bounding_client_rect();
		let (x, y) = (
			ev.client_x() as f64 - rect.left(),
			ev.client_y() as f64 - rect.top(),
		);
		let direction = ZoomDirection::from_wheel_delta(ev.delta_y());
		let viewport = state_wh.borrow_mut().zoom_at(direction, x, y);
		if let Some(viewport) = viewport {
			apply(viewport);
		}
	};

	let zoom_with = {
		let state = state.clone();
		move |direction: ZoomDirection| {
			let Some(size) = container_size() else {
				return;
			};
			let viewport = state.borrow_mut().zoom_at_center(direction, size);
			if let Some(viewport) = viewport {
				apply(viewport);
			}
		}
	};
	let (zoom_in, zoom_out) = (zoom_with.clone(), zoom_with);

	let state_rs = state.clone();
	let on_reset = move |_: MouseEvent| {
		let Some(size) = container_size() else {
			return;
		};
		let viewport = state_rs.borrow_mut().reset(size);
		if let Some(viewport) = viewport {
			apply(viewport);
		}
	};

	// Hover and click are delegated from the diagram container to the
	// activated shapes, found through their marker class. Nested shapes each
	// get emphasis while the pointer is anywhere inside them.
	let on_mouseover = move |ev: MouseEvent| {
		let from = render::activity_chain(ev.related_target());
		for shape in render::crossed(render::activity_chain(ev.target()), &from) {
			render::set_emphasis(&shape, true);
		}
	};
	let on_mouseout = move |ev: MouseEvent| {
		let to = render::activity_chain(ev.related_target());
		for shape in render::crossed(render::activity_chain(ev.target()), &to) {
			render::set_emphasis(&shape, false);
		}
	};

	let (state_ck, config_ck) = (state.clone(), config.clone());
	let on_click = move |ev: MouseEvent| {
		if !state_ck.borrow().click_allowed() {
			return;
		}
		let Some((_, entity_id)) = render::activity_for(ev.target()) else {
			return;
		};
		ev.stop_propagation();
		ev.prevent_default();
		let url = config_ck.detail_url(entity_id);
		info!("[carto] navigating to {url}");
		render::navigate_to(&url);
	};

	view! {
		<div class="carto-view">
			<div class="carto-toolbar">
				<button id="carto-zoom-out" title="Zoom out" on:click=move |_| zoom_out(ZoomDirection::Out)>
					"−"
				</button>
				<button id="carto-zoom-reset" title="Reset zoom" on:click=on_reset>
					{move || zoom_label.get()}
				</button>
				<button id="carto-zoom-in" title="Zoom in" on:click=move |_| zoom_in(ZoomDirection::In)>
					"+"
				</button>
				<span class="carto-count">
					{move || match status.get() {
						DiagramStatus::Ready { activated } => format!("{activated} clickable activities"),
						_ => String::new(),
					}}
				</span>
			</div>

			<Show when=move || show_mismatch.get()>
				<div class="carto-mismatch">
					"None of the shapes in this map match a known activity."
				</div>
			</Show>

			<div
				id="carto-pan-wrapper"
				class="carto-pan-wrapper"
				node_ref=wrapper_ref
				on:mousedown=on_mousedown
				on:wheel=on_wheel
				on:dragstart=|ev: DragEvent| ev.prevent_default()
			>
				<div id="pan-inner" class="pan-inner" node_ref=layer_ref>
					<div
						id="svg-container"
						node_ref=svg_ref
						on:mouseover=on_mouseover
						on:mouseout=on_mouseout
						on:click=on_click
					/>
				</div>

				{move || match status.get() {
					DiagramStatus::Loading => view! {
						<div class="svg-loading">
							<p>"Loading the activity map…"</p>
						</div>
					}
					.into_any(),
					DiagramStatus::Missing => view! {
						<div class="svg-placeholder">
							<p>"No activity map available"</p>
							<p>"Import an SVG file from the entity manager to display one."</p>
						</div>
					}
					.into_any(),
					DiagramStatus::Failed(message) => view! {
						<div class="svg-error">
							<p>"Failed to load the activity map"</p>
							<p>{message}</p>
						</div>
					}
					.into_any(),
					DiagramStatus::Ready { .. } => ().into_any(),
				}}
			</div>
		</div>
	}
}
