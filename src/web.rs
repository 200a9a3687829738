//! The browser [`Platform`], via [***web-sys***](https://docs.rs/web-sys/).

use crate::{event_slots::EventSlots, platform::Platform, RenderError};
use core::{cell::RefCell, convert::TryFrom};
use std::rc::Rc;
use tracing::{error, instrument, trace, warn};
use wasm_bindgen::{JsCast, JsValue};

/// The attributes through which template markup declares bound elements.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attributes {
	/// The attribute carrying a bound element's logical id. Defaults to `data-id`.
	pub bound_id: String,
	/// The attribute through which a bound element declares the template its nested records or list items use.
	/// Defaults to `data-template`.
	pub nested_template: String,
}

impl Default for Attributes {
	fn default() -> Self {
		Self {
			bound_id: "data-id".to_owned(),
			nested_template: "data-template".to_owned(),
		}
	}
}

impl Attributes {
	#[must_use]
	pub fn bound_id(mut self, attribute: impl Into<String>) -> Self {
		self.bound_id = attribute.into();
		self
	}

	#[must_use]
	pub fn nested_template(mut self, attribute: impl Into<String>) -> Self {
		self.nested_template = attribute.into();
		self
	}
}

/// Renders into a [`web_sys::Document`].
///
/// Templates are `<template id="…">` elements anywhere in the document.
/// Bound elements carry their logical id in the [`Attributes`]' `bound_id` attribute
/// and declare nested templates through its `nested_template` attribute.
///
/// Event handlers stay installed until their element is removed through this platform,
/// its subtree is replaced by text through this platform, or the [`Web`] is dropped.
/// After that, the installed `on…` functions ignore events (or throw into JavaScript, once the [`Web`] is gone).
/// Elements removed by other means keep their handler (and the record it captured) alive until the [`Web`] is dropped.
#[derive(Debug)]
pub struct Web {
	document: web_sys::Document,
	attributes: Attributes,
	event_slots: RefCell<EventSlots>,
}

impl Web {
	#[must_use]
	pub fn new(document: web_sys::Document, attributes: Attributes) -> Self {
		Self {
			document,
			attributes,
			event_slots: RefCell::new(EventSlots::new()),
		}
	}

	/// Binds the current window's document.
	///
	/// # Errors
	///
	/// Iff there is no window or it has no document.
	pub fn global(attributes: Attributes) -> Result<Self, RenderError> {
		Self::from_window(web_sys::window().as_ref(), attributes)
	}

	fn from_window(window: Option<&web_sys::Window>, attributes: Attributes) -> Result<Self, RenderError> {
		let document = window.and_then(web_sys::Window::document).ok_or(RenderError::NoDocument)?;
		Ok(Self::new(document, attributes))
	}

	#[must_use]
	pub fn attributes(&self) -> &Attributes {
		&self.attributes
	}

	#[must_use]
	pub fn document(&self) -> &web_sys::Document {
		&self.document
	}
}

impl Platform for Web {
	type Element = web_sys::Element;
	type Event = web_sys::Event;
	type Fragment = web_sys::Node;

	#[instrument]
	fn clone_template(&self, template_id: &str) -> Option<web_sys::Node> {
		let template = self.document.get_element_by_id(template_id)?.dyn_into::<web_sys::HtmlTemplateElement>().ok()?;
		match template.content().clone_node_with_deep(true) {
			Ok(content) => Some(content),
			Err(error) => {
				error!("Failed to clone template {:?}: {:?}", template_id, error);
				None
			}
		}
	}

	fn append(&self, container: &web_sys::Element, fragment: web_sys::Node) {
		if let Err(error) = container.append_child(&fragment) {
			error!("Failed to append template content: {:?}", error)
		}
	}

	fn child_at(&self, container: &web_sys::Element, index: usize) -> Option<web_sys::Element> {
		container.children().item(u32::try_from(index).ok()?)
	}

	fn find_bound(&self, scope: &web_sys::Element, id: &str, index: Option<usize>) -> Option<web_sys::Element> {
		let selector = format!("[{}=\"{}\"]", self.attributes.bound_id, id.replace('\\', "\\\\").replace('"', "\\\""));
		let matches = match scope.query_selector_all(&selector) {
			Ok(matches) => matches,
			Err(error) => {
				error!("Invalid bound element selector {:?}: {:?}", selector, error);
				return None;
			}
		};
		let position = match index {
			Some(index) => u32::try_from(index).ok()?,
			None => matches.length().checked_sub(1)?,
		};
		matches.get(position)?.dyn_into().ok()
	}

	fn remove(&self, element: &web_sys::Element) {
		self.event_slots.borrow().release(element, true);
		element.remove();
	}

	fn nested_template_id(&self, element: &web_sys::Element) -> Option<String> {
		element.get_attribute(&self.attributes.nested_template)
	}

	fn set_class(&self, element: &web_sys::Element, class: &str) {
		element.set_class_name(class);
	}

	fn set_style(&self, element: &web_sys::Element, property: &str, value: &str) {
		let html_element = match element.dyn_ref::<web_sys::HtmlElement>() {
			Some(html_element) => html_element,
			None => return warn!("Can't style non-HTML element {:?}.", element.tag_name()),
		};
		if let Err(error) = html_element.style().set_property(&css_property_name(property), value) {
			error!("Failed to set style property {:?}: {:?}", property, error)
		}
	}

	fn supports_value(&self, element: &web_sys::Element) -> bool {
		element.is_instance_of::<web_sys::HtmlInputElement>()
			|| element.is_instance_of::<web_sys::HtmlTextAreaElement>()
			|| element.is_instance_of::<web_sys::HtmlSelectElement>()
	}

	fn set_value(&self, element: &web_sys::Element, value: &str) {
		if let Some(input) = element.dyn_ref::<web_sys::HtmlInputElement>() {
			input.set_value(value)
		} else if let Some(text_area) = element.dyn_ref::<web_sys::HtmlTextAreaElement>() {
			text_area.set_value(value)
		} else if let Some(select) = element.dyn_ref::<web_sys::HtmlSelectElement>() {
			select.set_value(value)
		} else {
			warn!("<{}> has no settable value.", element.tag_name())
		}
	}

	fn text(&self, element: &web_sys::Element) -> String {
		match element.dyn_ref::<web_sys::HtmlElement>() {
			Some(html_element) => html_element.inner_text(),
			None => element.text_content().unwrap_or_default(),
		}
	}

	fn set_text(&self, element: &web_sys::Element, text: &str) {
		if element.first_element_child().is_some() {
			self.event_slots.borrow().release(element, false);
		}
		match element.dyn_ref::<web_sys::HtmlElement>() {
			Some(html_element) => html_element.set_inner_text(text),
			None => element.set_text_content(Some(text)),
		}
	}

	#[instrument(skip(handler))]
	fn set_event_handler(&self, element: &web_sys::Element, event: &str, handler: Rc<dyn Fn(web_sys::Event)>) {
		let property = if event.starts_with("on") { event.to_owned() } else { format!("on{}", event) };
		let function = match self.event_slots.borrow_mut().bind(element, &property, handler) {
			Some(function) => function,
			None => return,
		};
		match js_sys::Reflect::set(element, &JsValue::from_str(&property), &function) {
			Ok(true) => trace!("Installed {}.", property),
			Ok(false) => error!("Could not assign {:?} on <{}>.", property, element.tag_name()),
			Err(error) => error!("Failed to assign {:?}: {:?}", property, error),
		}
	}
}

/// Accepts `camelCase` property names too, as used with `element.style[…]`.
fn css_property_name(property: &str) -> String {
	if property.starts_with("--") || !property.chars().any(|c| c.is_ascii_uppercase()) {
		return property.to_owned();
	}
	let mut css = String::with_capacity(property.len() + 4);
	// `ms` is the one vendor prefix that's lowercase in camelCase.
	if property.starts_with("ms") && property[2..].starts_with(|c: char| c.is_ascii_uppercase()) {
		css.push('-');
	}
	for c in property.chars() {
		if c.is_ascii_uppercase() {
			css.push('-');
			css.push(c.to_ascii_lowercase());
		} else {
			css.push(c);
		}
	}
	css
}
