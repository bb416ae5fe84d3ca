//! Leptos client-side app for the activity cartography page.

use leptos::prelude::*;
use leptos_meta::*;
use leptos_router::components::*;
use leptos_router::path;
use log::{Level, info};

// Modules
mod components;
mod config;
mod error;
mod pages;

// Top-Level pages
use crate::pages::home::ActivitiesMap;
use crate::pages::not_found::NotFound;

/// Routes `log` output to the browser console and installs the panic hook.
pub fn init_logging() {
	console_error_panic_hook::set_once();
	if console_log::init_with_level(Level::Debug).is_ok() {
		info!("[carto] logging initialized");
	}
}

/// An app router which renders the activity map and handles 404's
#[component]
pub fn App() -> impl IntoView {
	provide_meta_context();

	view! {
		<Html attr:lang="en" attr:dir="ltr" attr:data-theme="light" />

		<Title text="Activity map" />

		<Meta charset="UTF-8" />
		<Meta name="viewport" content="width=device-width, initial-scale=1.0" />

		<Router>
			<Routes fallback=|| view! { <NotFound /> }>
				<Route path=path!("/") view=ActivitiesMap />
				<Route path=path!("/activities/map") view=ActivitiesMap />
			</Routes>
		</Router>
	}
}
