//! Finding the diagram shapes that stand for activities.
//!
//! A shape is joined to an activity through a vendor attribute (Visio writes
//! `v:mID`). Extraction works on anything implementing [`ShapeAttributes`], so
//! the same resolver runs over live DOM elements and over parsed XML.

use std::collections::{BTreeSet, HashSet};

use wasm_bindgen::JsCast;

use super::types::{EntityId, ShapeMap};

pub const VISIO_NS: &str = "http://schemas.microsoft.com/visio/2003/SVGExtensions/";
const VISIO_LOCAL: &str = "mID";
const VISIO_PREFIXED: &str = "v:mID";
const DATA_ATTRIBUTE: &str = "data-mid";
/// Substrings looked for (lowercase) by the last-resort attribute scan.
const FALLBACK_MARKERS: [&str; 2] = ["mid", "shapeid"];
/// Identifiers shown on each side of a mismatch warning.
pub const MISMATCH_SAMPLE: usize = 20;

/// Read access to an element's attributes.
pub trait ShapeAttributes {
	fn attribute_ns(&self, namespace: &str, local_name: &str) -> Option<String>;

	/// Lookup by qualified name as written in the markup (`prefix:local`).
	fn attribute(&self, name: &str) -> Option<String>;

	/// All attributes as `(qualified name, value)` in document order.
	fn attributes(&self) -> Vec<(String, String)>;
}

pub type ExtractionStrategy<E> = fn(&E) -> Option<String>;

fn non_empty(value: Option<String>) -> Option<String> {
	value.filter(|v| !v.is_empty())
}

pub fn visio_namespaced<E: ShapeAttributes>(element: &E) -> Option<String> {
	non_empty(element.attribute_ns(VISIO_NS, VISIO_LOCAL))
}

pub fn visio_prefixed<E: ShapeAttributes>(element: &E) -> Option<String> {
	non_empty(element.attribute(VISIO_PREFIXED))
}

pub fn data_attribute<E: ShapeAttributes>(element: &E) -> Option<String> {
	non_empty(element.attribute(DATA_ATTRIBUTE))
}

/// First attribute whose name mentions `mid` or `shapeid`, in any case.
pub fn name_scan<E: ShapeAttributes>(element: &E) -> Option<String> {
	element
		.attributes()
		.into_iter()
		.find(|(name, _)| {
			let name = name.to_lowercase();
			FALLBACK_MARKERS.iter().any(|marker| name.contains(marker))
		})
		.and_then(|(_, value)| non_empty(Some(value)))
}

/// Strategies in the order they are tried.
pub fn strategies<E: ShapeAttributes>() -> [ExtractionStrategy<E>; 4] {
	[
		visio_namespaced::<E>,
		visio_prefixed::<E>,
		data_attribute::<E>,
		name_scan::<E>,
	]
}

pub fn extract_shape_id<E: ShapeAttributes>(element: &E) -> Option<String> {
	strategies::<E>()
		.into_iter()
		.find_map(|strategy| strategy(element))
}

#[derive(Clone, Debug)]
pub struct Activation<E> {
	pub element: E,
	pub shape_id: String,
	pub entity_id: EntityId,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Mismatch {
	/// Distinct identifiers present in the diagram, first seen first.
	pub found: Vec<String>,
	/// Map keys, sorted.
	pub expected: Vec<String>,
}

#[derive(Clone, Debug)]
pub struct ActivationReport<E> {
	pub scanned: usize,
	pub found_ids: Vec<String>,
	pub activated: Vec<Activation<E>>,
}

impl<E> ActivationReport<E> {
	pub fn identifiers_found(&self) -> usize {
		self.found_ids.len()
	}

	pub fn activated_count(&self) -> usize {
		self.activated.len()
	}

	/// `Some` when the map has entries but none of them matched a shape.
	pub fn mismatch(&self, map: &ShapeMap) -> Option<Mismatch> {
		if map.is_empty() || !self.activated.is_empty() {
			return None;
		}
		let mut seen = HashSet::new();
		let found = self
			.found_ids
			.iter()
			.filter(|id| seen.insert(id.as_str()))
			.take(MISMATCH_SAMPLE)
			.cloned()
			.collect();
		let expected = map
			.keys()
			.collect::<BTreeSet<_>>()
			.into_iter()
			.take(MISMATCH_SAMPLE)
			.cloned()
			.collect();
		Some(Mismatch { found, expected })
	}
}

/// Scans `elements` and keeps those whose shape id resolves through `map`.
pub fn resolve<E, I>(elements: I, map: &ShapeMap) -> ActivationReport<E>
where
	E: ShapeAttributes,
	I: IntoIterator<Item = E>,
{
	let mut report = ActivationReport {
		scanned: 0,
		found_ids: Vec::new(),
		activated: Vec::new(),
	};
	for element in elements {
		report.scanned += 1;
		let Some(shape_id) = extract_shape_id(&element) else {
			continue;
		};
		report.found_ids.push(shape_id.clone());
		// Id 0 is the page's "no activity" placeholder.
		let Some(&entity_id) = map.get(&shape_id).filter(|&&id| id != 0) else {
			continue;
		};
		report.activated.push(Activation {
			element,
			shape_id,
			entity_id,
		});
	}
	report
}

impl ShapeAttributes for web_sys::Element {
	fn attribute_ns(&self, namespace: &str, local_name: &str) -> Option<String> {
		self.get_attribute_ns(Some(namespace), local_name)
	}

	fn attribute(&self, name: &str) -> Option<String> {
		self.get_attribute(name)
	}

	fn attributes(&self) -> Vec<(String, String)> {
		let attrs = web_sys::Element::attributes(self);
		(0..attrs.length())
			.filter_map(|i| attrs.item(i))
			.map(|attr| (attr.name(), attr.value()))
			.collect()
	}
}

impl ShapeAttributes for roxmltree::Node<'_, '_> {
	fn attribute_ns(&self, namespace: &str, local_name: &str) -> Option<String> {
		roxmltree::Node::attribute(self, (namespace, local_name)).map(str::to_owned)
	}

	fn attribute(&self, name: &str) -> Option<String> {
		match name.split_once(':') {
			Some((prefix, local)) => {
				let uri = self.lookup_namespace_uri(Some(prefix))?;
				roxmltree::Node::attribute(self, (uri, local)).map(str::to_owned)
			}
			None => roxmltree::Node::attribute(self, name).map(str::to_owned),
		}
	}

	fn attributes(&self) -> Vec<(String, String)> {
		roxmltree::Node::attributes(self)
			.map(|attr| {
				let name = match attr.namespace().and_then(|uri| self.lookup_prefix(uri)) {
					Some(prefix) => format!("{prefix}:{}", attr.name()),
					None => attr.name().to_owned(),
				};
				(name, attr.value().to_owned())
			})
			.collect()
	}
}

/// Every element below `root`, in document order.
pub fn dom_elements(root: &web_sys::Element) -> Vec<web_sys::Element> {
	let Ok(nodes) = root.query_selector_all("*") else {
		return Vec::new();
	};
	(0..nodes.length())
		.filter_map(|i| nodes.item(i))
		.filter_map(|node| node.dyn_into::<web_sys::Element>().ok())
		.collect()
}
