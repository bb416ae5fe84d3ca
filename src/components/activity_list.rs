use leptos::prelude::*;

use super::cartography::navigate_to;

/// Side list of the entity's activities; each entry links to its detail view.
#[component]
pub fn ActivityList(
	/// `(name, detail url)` pairs in display order.
	links: Vec<(String, String)>,
) -> impl IntoView {
	if links.is_empty() {
		return view! { <p class="no-activity">"No activities yet"</p> }.into_any();
	}

	view! {
		<ul class="activity-list">
			{links
				.into_iter()
				.map(|(name, url)| {
					view! {
						<li class="activity-item" on:click=move |_| navigate_to(&url)>
							{name}
						</li>
					}
				})
				.collect_view()}
		</ul>
	}
	.into_any()
}
