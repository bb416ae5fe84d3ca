use std::collections::HashMap;

use serde::Deserialize;

pub type EntityId = i64;

/// Shape identifier (as found in the diagram) to activity id.
pub type ShapeMap = HashMap<String, EntityId>;

#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
pub struct ActivitySummary {
	pub id: EntityId,
	pub name: String,
}

/// What the diagram area currently shows.
#[derive(Clone, Debug, Default, PartialEq)]
pub enum DiagramStatus {
	#[default]
	Loading,
	/// The page reported that no diagram has been uploaded.
	Missing,
	Ready {
		activated: usize,
	},
	Failed(String),
}
