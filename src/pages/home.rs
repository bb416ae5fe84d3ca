use leptos::prelude::*;
use log::{error, info};

use crate::components::activity_list::ActivityList;
use crate::components::cartography::CartographyView;
use crate::config::CartographyConfig;

/// Activity map page: the cartography on the left, the activity list beside it.
#[component]
pub fn ActivitiesMap() -> impl IntoView {
	let config = CartographyConfig::from_window().unwrap_or_else(|err| {
		error!("[carto] {err}, falling back to defaults");
		CartographyConfig::default()
	});
	info!(
		"[carto] diagram available: {}, {} mapped shapes, {} activities",
		config.svg_exists,
		config.shape_map.len(),
		config.activities.len()
	);

	let links: Vec<(String, String)> = config
		.activities
		.iter()
		.map(|a| (a.name.clone(), config.detail_url(a.id)))
		.collect();

	view! {
		<div class="carto-page">
			<section class="carto-main">
				<h1>"Activity map"</h1>
				<CartographyView config=config />
			</section>
			<aside class="carto-sidebar">
				<h2>"Activities"</h2>
				<ActivityList links=links />
			</aside>
		</div>
	}
}
