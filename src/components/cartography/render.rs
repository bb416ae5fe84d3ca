use wasm_bindgen::JsCast;
use web_sys::{Element, EventTarget, HtmlElement};

use super::shapes::Activation;
use super::types::EntityId;
use super::viewport::{Size, ViewportState};

/// Marker class carried by every activated shape.
pub const ACTIVITY_CLASS: &str = "carto-activity";
pub const ACTIVITY_SELECTOR: &str = ".carto-activity";
pub const ENTITY_ATTRIBUTE: &str = "data-activity-id";
pub const SHAPE_ATTRIBUTE: &str = "data-mid";

const HOVER_FILTER: &str = "drop-shadow(0 0 8px #22c55e)";
const HOVER_OPACITY: &str = "0.85";

pub fn apply_transform(layer: &HtmlElement, viewport: &ViewportState) {
	let _ = layer
		.style()
		.set_property("transform", &viewport.css_transform());
}

pub fn rect_size(element: &Element) -> Size {
	let rect = element.get_bounding_client_rect();
	Size::new(rect.width(), rect.height())
}

/// Sizes the inserted `<svg>` explicitly so the pan layer scales it as-is.
pub fn fix_svg_size(svg: &Element, size: Size) {
	set_style(svg, "width", Some(&format!("{}px", size.width)));
	set_style(svg, "height", Some(&format!("{}px", size.height)));
	set_style(svg, "display", Some("block"));
	set_style(svg, "overflow", Some("visible"));
}

/// Stamps the derived attributes and marker class delegated handlers look for.
pub fn mark_activated(activation: &Activation<Element>) {
	let el = &activation.element;
	let _ = el.set_attribute(ENTITY_ATTRIBUTE, &activation.entity_id.to_string());
	let _ = el.set_attribute(SHAPE_ATTRIBUTE, &activation.shape_id);
	let _ = el.class_list().add_1(ACTIVITY_CLASS);
	set_style(el, "cursor", Some("pointer"));
}

pub fn set_emphasis(el: &Element, on: bool) {
	if on {
		set_style(el, "filter", Some(HOVER_FILTER));
		set_style(el, "opacity", Some(HOVER_OPACITY));
	} else {
		set_style(el, "filter", None);
		set_style(el, "opacity", Some("1"));
	}
}

fn set_style(el: &Element, property: &str, value: Option<&str>) {
	let style = match el.dyn_ref::<HtmlElement>() {
		Some(html) => html.style(),
		None => match el.dyn_ref::<web_sys::SvgElement>() {
			Some(svg) => svg.style(),
			None => return,
		},
	};
	let _ = match value {
		Some(value) => style.set_property(property, value),
		None => style.remove_property(property).map(|_| ()),
	};
}

/// Activated shape at or above `target`, with its entity id.
pub fn activity_at(target: &Element) -> Option<(Element, EntityId)> {
	let shape = target.closest(ACTIVITY_SELECTOR).ok().flatten()?;
	let entity_id = shape.get_attribute(ENTITY_ATTRIBUTE)?.parse().ok()?;
	Some((shape, entity_id))
}

/// Activated shape the event `target` belongs to.
pub fn activity_for(target: Option<EventTarget>) -> Option<(Element, EntityId)> {
	let element = target?.dyn_into::<Element>().ok()?;
	activity_at(&element)
}

/// Every activated shape at or above the event `target`, innermost first.
pub fn activity_chain(target: Option<EventTarget>) -> Vec<Element> {
	let mut chain = Vec::new();
	let mut next = target.and_then(|t| t.dyn_into::<Element>().ok());
	while let Some(el) = next {
		let Some(shape) = el.closest(ACTIVITY_SELECTOR).ok().flatten() else {
			break;
		};
		next = shape.parent_element();
		chain.push(shape);
	}
	chain
}

/// Shapes in `chain` that `other` is not inside: the ones a pointer crossing
/// from `other` into `chain[0]` entered, or crossing back out of it left.
pub fn crossed<T: PartialEq>(chain: Vec<T>, other: &[T]) -> Vec<T> {
	chain.into_iter().filter(|el| !other.contains(el)).collect()
}

/// Full-page navigation.
pub fn navigate_to(url: &str) {
	if let Some(window) = web_sys::window() {
		let _ = window.location().set_href(url);
	}
}
