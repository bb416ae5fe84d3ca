//! Fetching the diagram and reading what we need from its markup.

use std::pin::pin;

use futures::future::{Either, select};
use gloo_net::http::Request;
use log::debug;
use wasm_bindgen_futures::JsFuture;

use super::viewport::{DEFAULT_CONTENT, Size};
use crate::error::DiagramError;

/// Where the content size came from, for the load log line.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SizeSource {
	ViewBox,
	Attributes,
	Measured,
	Default,
}

/// Declared size of the first `<svg>` element, or `None` if it declares
/// neither a usable `viewBox` nor both `width` and `height`.
///
/// Markup that does not parse as XML (an undeclared `xlink:` prefix, say) also
/// yields `None`: the browser may still render it, so whether a root exists is
/// left to the inserted DOM.
pub fn inspect(markup: &str) -> Option<(Size, SizeSource)> {
	let options = roxmltree::ParsingOptions {
		allow_dtd: true,
		..Default::default()
	};
	let doc = match roxmltree::Document::parse_with_options(markup, options) {
		Ok(doc) => doc,
		Err(err) => {
			debug!("[carto] diagram markup is not well-formed XML ({err}), measuring instead");
			return None;
		}
	};
	let svg = doc
		.descendants()
		.find(|n| n.is_element() && n.tag_name().name() == "svg")?;

	if let Some(size) = svg.attribute("viewBox").and_then(parse_view_box) {
		return Some((size, SizeSource::ViewBox));
	}
	match (svg.attribute("width"), svg.attribute("height")) {
		(Some(w), Some(h)) if !w.is_empty() && !h.is_empty() => {
			let width = leading_number(w)
				.filter(|v| *v != 0.0)
				.unwrap_or(DEFAULT_CONTENT.width);
			let height = leading_number(h)
				.filter(|v| *v != 0.0)
				.unwrap_or(DEFAULT_CONTENT.height);
			Some((Size::new(width, height), SizeSource::Attributes))
		}
		_ => None,
	}
}

/// Falls back to the rendered size, then to [`DEFAULT_CONTENT`].
pub fn settle_size(declared: Option<(Size, SizeSource)>, measured: Size) -> (Size, SizeSource) {
	if let Some(declared) = declared {
		return declared;
	}
	let width = if measured.width > 0.0 {
		measured.width
	} else {
		DEFAULT_CONTENT.width
	};
	let height = if measured.height > 0.0 {
		measured.height
	} else {
		DEFAULT_CONTENT.height
	};
	let source = if measured.is_positive() {
		SizeSource::Measured
	} else {
		SizeSource::Default
	};
	(Size::new(width, height), source)
}

fn parse_view_box(value: &str) -> Option<Size> {
	let parts: Vec<f64> = value
		.split(|c: char| c.is_whitespace() || c == ',')
		.filter(|s| !s.is_empty())
		.map(|s| s.parse().ok())
		.collect::<Option<_>>()?;
	match parts[..] {
		[_, _, width, height] if width > 0.0 && height > 0.0 => Some(Size::new(width, height)),
		_ => None,
	}
}

/// Longest numeric prefix, so `"800px"` reads as 800.
fn leading_number(value: &str) -> Option<f64> {
	let value = value.trim_start();
	(1..=value.len())
		.rev()
		.filter(|&end| value.is_char_boundary(end))
		.find_map(|end| value[..end].parse::<f64>().ok())
		.filter(|v| v.is_finite())
}

async fn fetch_markup(url: &str) -> Result<String, DiagramError> {
	let resp = Request::get(url)
		.send()
		.await
		.map_err(|e| DiagramError::Network(e.to_string()))?;
	if !resp.ok() {
		return Err(DiagramError::NotFound {
			status: resp.status(),
		});
	}
	resp.text()
		.await
		.map_err(|e| DiagramError::Network(e.to_string()))
}

/// `setTimeout` delay for `ms`, saturating instead of wrapping negative.
fn timer_delay(ms: u32) -> i32 {
	i32::try_from(ms).unwrap_or(i32::MAX)
}

async fn sleep_ms(ms: u32) {
	let promise = js_sys::Promise::new(&mut |resolve, _| {
		if let Some(window) = web_sys::window() {
			let _ = window
				.set_timeout_with_callback_and_timeout_and_arguments_0(&resolve, timer_delay(ms));
		}
	});
	let _ = JsFuture::from(promise).await;
}

/// GETs the diagram markup, giving up after `timeout_ms` when set.
pub async fn load(url: &str, timeout_ms: Option<u32>) -> Result<String, DiagramError> {
	let Some(ms) = timeout_ms else {
		return fetch_markup(url).await;
	};
	let fetch = pin!(fetch_markup(url));
	let timer = pin!(sleep_ms(ms));
	match select(fetch, timer).await {
		Either::Left((result, _)) => result,
		Either::Right(_) => Err(DiagramError::TimedOut(ms)),
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn view_box_wins_over_attributes() {
		let svg = r#"<svg xmlns="http://www.w3.org/2000/svg" width="10" height="10" viewBox="0 0 1200 640"/>"#;
		assert_eq!(
			inspect(svg),
			Some((Size::new(1200.0, 640.0), SizeSource::ViewBox))
		);
	}

	#[test]
	fn view_box_accepts_commas() {
		assert_eq!(parse_view_box("0,0, 30.5 ,20"), Some(Size::new(30.5, 20.0)));
		assert_eq!(parse_view_box("0 0 0 20"), None);
		assert_eq!(parse_view_box("0 0 20"), None);
		assert_eq!(parse_view_box("a b c d"), None);
	}

	#[test]
	fn degenerate_view_box_falls_back_to_attributes() {
		let svg = r#"<svg viewBox="0 0 0 0" width="8.5in" height="600px"><g/></svg>"#;
		assert_eq!(
			inspect(svg),
			Some((Size::new(8.5, 600.0), SizeSource::Attributes))
		);
	}

	#[test]
	fn unparsable_attributes_use_defaults_per_axis() {
		let svg = r#"<svg width="auto" height="450"/>"#;
		assert_eq!(
			inspect(svg),
			Some((Size::new(1000.0, 450.0), SizeSource::Attributes))
		);
	}

	#[test]
	fn missing_size_is_left_to_measurement() {
		assert_eq!(inspect(r#"<svg width="300"/>"#), None);
		assert_eq!(
			settle_size(None, Size::new(640.0, 0.0)),
			(Size::new(640.0, 800.0), SizeSource::Default)
		);
		assert_eq!(
			settle_size(None, Size::new(640.0, 480.0)),
			(Size::new(640.0, 480.0), SizeSource::Measured)
		);
	}

	#[test]
	fn finds_nested_svg_root() {
		let markup = r#"<?xml version="1.0"?><div><svg viewBox="0 0 5 5"/></div>"#;
		assert!(inspect(markup).is_some());
	}

	#[test]
	fn markup_without_svg_has_no_declared_size() {
		assert_eq!(inspect("<html><body/></html>"), None);
		let err = DiagramError::MissingRoot;
		assert_eq!(err.to_string(), "No <svg> element found in the diagram");
	}

	#[test]
	fn malformed_markup_is_left_to_the_browser() {
		assert_eq!(inspect("<svg><g></svg>"), None);
	}

	#[test]
	fn reads_visio_export_with_doctype() {
		let markup = concat!(
			r#"<?xml version="1.0" encoding="UTF-8" standalone="no"?>"#,
			"\n",
			r#"<!DOCTYPE svg PUBLIC "-//W3C//DTD SVG 1.1//EN" "http://www.w3.org/Graphics/SVG/1.1/DTD/svg11.dtd">"#,
			"\n",
			r#"<svg xmlns="http://www.w3.org/2000/svg" xmlns:v="http://schemas.microsoft.com/visio/2003/SVGExtensions/" viewBox="0 0 800 600"><g v:mID="1"/></svg>"#,
		);
		assert_eq!(
			inspect(markup),
			Some((Size::new(800.0, 600.0), SizeSource::ViewBox))
		);
	}

	#[test]
	fn undeclared_prefix_does_not_fail_inspection() {
		let markup = r##"<svg xmlns="http://www.w3.org/2000/svg" viewBox="0 0 10 10"><use xlink:href="#a"/></svg>"##;
		assert_eq!(inspect(markup), None);
	}

	#[test]
	fn timer_delay_saturates() {
		assert_eq!(timer_delay(15_000), 15_000);
		assert_eq!(timer_delay(u32::MAX), i32::MAX);
	}

	#[test]
	fn status_errors_name_the_status() {
		let err = DiagramError::NotFound { status: 404 };
		assert!(err.to_string().contains("404"));
	}

	#[test]
	fn leading_number_parses_like_a_browser() {
		assert_eq!(leading_number("800px"), Some(800.0));
		assert_eq!(leading_number(" 12.5em"), Some(12.5));
		assert_eq!(leading_number("px"), None);
		assert_eq!(leading_number(""), None);
	}
}
