//! Page-supplied settings for the cartography view.
//!
//! The server renders them into `window.CARTO_CONFIG` before the app starts.
//! Pages that only set the older `CARTO_SHAPE_MAP`, `SVG_EXISTS` and
//! `ALL_ENTITIES` globals are read through those instead.

use serde::Deserialize;
use wasm_bindgen::JsValue;

use crate::components::cartography::{ActivitySummary, EntityId, ShapeMap};
use crate::error::ConfigError;

const CONFIG_GLOBAL: &str = "CARTO_CONFIG";
const SHAPE_MAP_GLOBAL: &str = "CARTO_SHAPE_MAP";
const SVG_EXISTS_GLOBAL: &str = "SVG_EXISTS";
const ENTITIES_GLOBAL: &str = "ALL_ENTITIES";

/// The separate globals set by pages without `CARTO_CONFIG`.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct PageGlobals {
	#[serde(rename = "CARTO_SHAPE_MAP")]
	shape_map: Option<ShapeMap>,
	#[serde(rename = "SVG_EXISTS")]
	svg_exists: Option<bool>,
	#[serde(rename = "ALL_ENTITIES")]
	activities: Option<Vec<ActivitySummary>>,
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct CartographyConfig {
	pub shape_map: ShapeMap,
	pub svg_exists: bool,
	pub svg_endpoint: String,
	pub detail_path: String,
	pub activities: Vec<ActivitySummary>,
	/// Unset means the diagram request may take as long as the browser allows.
	pub load_timeout_ms: Option<u32>,
	/// Show the identifier mismatch notice to the user, not only in the log.
	pub surface_mismatch: bool,
}

impl Default for CartographyConfig {
	fn default() -> Self {
		Self {
			shape_map: ShapeMap::new(),
			svg_exists: false,
			svg_endpoint: "/activities/svg".into(),
			detail_path: "/activities/view".into(),
			activities: Vec::new(),
			load_timeout_ms: None,
			surface_mismatch: false,
		}
	}
}

impl CartographyConfig {
	pub fn from_json(text: &str) -> Result<Self, ConfigError> {
		Ok(serde_json::from_str(text)?)
	}

	/// Builds a config from the separate page globals, serialized as one JSON
	/// object keyed by global name.
	pub fn from_page_globals_json(text: &str) -> Result<Self, ConfigError> {
		let globals: PageGlobals = serde_json::from_str(text)?;
		Ok(Self {
			shape_map: globals.shape_map.unwrap_or_default(),
			svg_exists: globals.svg_exists.unwrap_or_default(),
			activities: globals.activities.unwrap_or_default(),
			..Self::default()
		})
	}

	/// Reads `window.CARTO_CONFIG`, falling back to the separate page globals.
	pub fn from_window() -> Result<Self, ConfigError> {
		let Some(window) = web_sys::window() else {
			return Ok(Self::default());
		};
		let config = global(&window, CONFIG_GLOBAL);
		if !config.is_undefined() && !config.is_null() {
			return Self::from_json(&stringify(&config)?);
		}

		let globals = js_sys::Object::new();
		for name in [SHAPE_MAP_GLOBAL, SVG_EXISTS_GLOBAL, ENTITIES_GLOBAL] {
			let value = global(&window, name);
			if !value.is_undefined() {
				let _ = js_sys::Reflect::set(&globals, &JsValue::from_str(name), &value);
			}
		}
		Self::from_page_globals_json(&stringify(&globals)?)
	}

	/// Diagram URL with a cache-busting timestamp.
	pub fn diagram_url(&self, timestamp_ms: u64) -> String {
		let separator = if self.svg_endpoint.contains('?') { '&' } else { '?' };
		format!("{}{separator}t={timestamp_ms}", self.svg_endpoint)
	}

	pub fn detail_url(&self, entity_id: EntityId) -> String {
		format!("{}?activity_id={entity_id}", self.detail_path)
	}
}

fn global(window: &web_sys::Window, name: &str) -> JsValue {
	js_sys::Reflect::get(window, &JsValue::from_str(name)).unwrap_or(JsValue::UNDEFINED)
}

fn stringify(value: &JsValue) -> Result<String, ConfigError> {
	js_sys::JSON::stringify(value)
		.ok()
		.and_then(|s| s.as_string())
		.ok_or(ConfigError::Unserializable)
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn empty_object_gives_defaults() {
		let config = CartographyConfig::from_json("{}").unwrap();
		assert_eq!(config, CartographyConfig::default());
		assert!(!config.svg_exists);
		assert_eq!(config.load_timeout_ms, None);
	}

	#[test]
	fn parses_page_config() {
		let config = CartographyConfig::from_json(
			r#"{
				"shape_map": {"shape-42": 7, "13": 2},
				"svg_exists": true,
				"activities": [{"id": 7, "name": "Accueil client"}],
				"load_timeout_ms": 15000,
				"surface_mismatch": true
			}"#,
		)
		.unwrap();
		assert_eq!(config.shape_map.get("shape-42"), Some(&7));
		assert_eq!(config.shape_map.get("13"), Some(&2));
		assert!(config.svg_exists);
		assert_eq!(config.activities[0].name, "Accueil client");
		assert_eq!(config.load_timeout_ms, Some(15000));
		assert!(config.surface_mismatch);
		assert_eq!(config.svg_endpoint, "/activities/svg");
	}

	#[test]
	fn rejects_non_numeric_entity_ids() {
		let err = CartographyConfig::from_json(r#"{"shape_map": {"a": "x"}}"#).unwrap_err();
		assert!(matches!(err, ConfigError::Json(_)));
		assert!(err.to_string().starts_with("Invalid cartography config"));
	}

	#[test]
	fn reads_separate_page_globals() {
		let config = CartographyConfig::from_page_globals_json(
			r#"{
				"CARTO_SHAPE_MAP": {"shape-42": 7},
				"SVG_EXISTS": true,
				"ALL_ENTITIES": [
					{"id": 7, "name": "Accueil client", "description": "", "svg_filename": null, "is_active": true}
				]
			}"#,
		)
		.unwrap();
		assert!(config.svg_exists);
		assert_eq!(config.shape_map.get("shape-42"), Some(&7));
		assert_eq!(config.activities.len(), 1);
		assert_eq!(config.activities[0].name, "Accueil client");
		assert_eq!(config.svg_endpoint, "/activities/svg");
		assert_eq!(config.detail_path, "/activities/view");
	}

	#[test]
	fn missing_or_null_page_globals_give_defaults() {
		let config = CartographyConfig::from_page_globals_json("{}").unwrap();
		assert_eq!(config, CartographyConfig::default());
		let config =
			CartographyConfig::from_page_globals_json(r#"{"CARTO_SHAPE_MAP": null, "SVG_EXISTS": false, "ALL_ENTITIES": null}"#)
				.unwrap();
		assert!(config.shape_map.is_empty());
		assert!(config.activities.is_empty());
		assert!(!config.svg_exists);
	}

	#[test]
	fn urls() {
		let mut config = CartographyConfig::default();
		assert_eq!(config.diagram_url(1700), "/activities/svg?t=1700");
		assert_eq!(config.detail_url(7), "/activities/view?activity_id=7");
		config.svg_endpoint = "/carto/svg?entity=3".into();
		assert_eq!(config.diagram_url(5), "/carto/svg?entity=3&t=5");
	}
}
