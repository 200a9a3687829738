use crate::{
	config::Config,
	error::RenderError,
	platform::Platform,
	record::{Directive, Entry, Handler, Record, Value},
	snapshot::{self, Plan, Snapshot},
	web::{Attributes, Web},
};
use core::{
	cell::RefCell,
	fmt::{self, Debug, Formatter},
};
use hashbrown::{HashMap, HashSet};
use std::rc::{Rc, Weak};
use tracing::{instrument, trace, trace_span, warn};

/// What a [`Renderer::render`] call did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
	/// The record was the one rendered last, so nothing was touched.
	Skipped,
	Rendered(Report),
}

/// Conditions a render recovered from.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Report {
	/// Directive targets that didn't resolve to a bound element, including those of nested renderers.
	pub unresolved: Vec<Unresolved>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Unresolved {
	pub directive: Directive,
	pub id: String,
}

impl Report {
	fn absorb(&mut self, outcome: Outcome) {
		if let Outcome::Rendered(report) = outcome {
			self.unresolved.extend(report.unresolved)
		}
	}
}

/// What an `@events` handler is called with.
pub struct EventContext<P: Platform = Web> {
	pub event: P::Event,
	/// The record whose render installed the handler.
	pub data: Rc<Record<P>>,
	/// The element the handler is installed on.
	pub element: P::Element,
	/// Renders into the same renderer that installed the handler.
	pub render: RenderHandle<P>,
}

/// Binds one template instance to the records rendered into it.
///
/// Clones share state. Nested records and list items are rendered by child renderers,
/// which are kept per field (and list position) for as long as the field keeps its shape.
pub struct Renderer<P: Platform = Web> {
	state: Rc<RefCell<State<P>>>,
}

impl<P: Platform> Clone for Renderer<P> {
	fn clone(&self) -> Self {
		Self {
			state: Rc::clone(&self.state),
		}
	}
}

impl<P: Platform> Debug for Renderer<P> {
	fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
		match self.state.try_borrow() {
			Ok(state) => f
				.debug_struct("Renderer")
				.field("container", &state.container)
				.field("template_id", &state.template_id)
				.field("index", &state.index)
				.field("children.len()", &state.children.len())
				.finish(),
			Err(_) => f.debug_struct("Renderer").finish_non_exhaustive(),
		}
	}
}

/// A [`Renderer::render`] that doesn't keep the renderer alive.
pub struct RenderHandle<P: Platform = Web> {
	state: Weak<RefCell<State<P>>>,
}

impl<P: Platform> Clone for RenderHandle<P> {
	fn clone(&self) -> Self {
		Self {
			state: Weak::clone(&self.state),
		}
	}
}

impl<P: Platform> Debug for RenderHandle<P> {
	fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
		f.debug_struct("RenderHandle").field("live", &(self.state.strong_count() > 0)).finish()
	}
}

impl<P: Platform> RenderHandle<P> {
	/// # Errors
	///
	/// [`RenderError::Detached`] if the renderer was dropped, otherwise as [`Renderer::render`].
	pub fn render(&self, data: impl Into<Rc<Record<P>>>) -> Result<Outcome, RenderError> {
		let state = self.state.upgrade().ok_or(RenderError::Detached)?;
		Renderer { state }.render(data)
	}
}

type ChildKey = (String, Option<usize>);

struct State<P: Platform> {
	platform: Rc<P>,
	config: Rc<Config>,
	container: P::Element,
	template_id: String,
	index: Option<usize>,
	previous: Option<Snapshot<P>>,
	children: HashMap<ChildKey, Renderer<P>>,
}

/// Attaches `template_id` to `container` in the current document and returns the renderer for it.
///
/// # Errors
///
/// [`RenderError::NoDocument`] outside a browser, or [`RenderError::TemplateNotFound`].
pub fn mount(container: web_sys::Element, template_id: &str) -> Result<Renderer<Web>, RenderError> {
	mount_with_config(container, template_id, Attributes::default(), Config::default())
}

/// Like [`mount`], for templates that mark up bound elements with other `attributes` or renderers with another `config`.
///
/// # Errors
///
/// [`RenderError::NoDocument`] outside a browser, or [`RenderError::TemplateNotFound`].
pub fn mount_with_config(container: web_sys::Element, template_id: &str, attributes: Attributes, config: Config) -> Result<Renderer<Web>, RenderError> {
	let web = Web::global(attributes)?;
	Renderer::with_config(Rc::new(web), Rc::new(config), container, template_id, None)
}

impl<P: Platform> Renderer<P> {
	/// Like [`Renderer::with_config`], with the default [`Config`].
	///
	/// # Errors
	///
	/// [`RenderError::TemplateNotFound`].
	pub fn new(platform: Rc<P>, container: P::Element, template_id: &str, index: Option<usize>) -> Result<Self, RenderError> {
		Self::with_config(platform, Rc::new(Config::default()), container, template_id, index)
	}

	/// Appends a clone of the template `template_id` to `container`,
	/// unless `index` is given and `container` already has an element child there.
	///
	/// # Errors
	///
	/// [`RenderError::TemplateNotFound`] if the template has to be attached but doesn't exist.
	#[instrument(skip(platform, config))]
	pub fn with_config(platform: Rc<P>, config: Rc<Config>, container: P::Element, template_id: &str, index: Option<usize>) -> Result<Self, RenderError> {
		match index {
			Some(index) if platform.child_at(&container, index).is_some() => {
				trace!("Slot {} is already populated. Not attaching.", index);
			}
			_ => {
				let fragment = platform.clone_template(template_id).ok_or_else(|| RenderError::TemplateNotFound {
					template_id: template_id.to_owned(),
				})?;
				platform.append(&container, fragment);
			}
		}

		Ok(Self {
			state: Rc::new(RefCell::new(State {
				platform,
				config,
				container,
				template_id: template_id.to_owned(),
				index,
				previous: None,
				children: HashMap::new(),
			})),
		})
	}

	#[must_use]
	pub fn handle(&self) -> RenderHandle<P> {
		RenderHandle {
			state: Rc::downgrade(&self.state),
		}
	}

	/// Applies `data` to this renderer's template instance.
	///
	/// Rendering the very record (by reference) that was rendered last does nothing.
	/// Otherwise, bound elements of fields that were rendered last time but are now absent are removed,
	/// then `data`'s entries are applied in order.
	///
	/// # Errors
	///
	/// See [`RenderError`]. After an error, the DOM stays partially updated and the next render diffs against the last successful one.
	pub fn render(&self, data: impl Into<Rc<Record<P>>>) -> Result<Outcome, RenderError> {
		let data = data.into();
		let handle = self.handle();
		let mut state = self.state.try_borrow_mut().map_err(|_| RenderError::Reentrant)?;
		state.render(data, &handle)
	}

	fn is_bound_to(&self, container: &P::Element, template_id: &str) -> bool {
		self.state
			.try_borrow()
			.map_or(false, |state| state.container == *container && state.template_id == template_id)
	}
}

impl<P: Platform> State<P> {
	fn render(&mut self, data: Rc<Record<P>>, handle: &RenderHandle<P>) -> Result<Outcome, RenderError> {
		let span = trace_span!("render", template_id = %self.template_id, index = ?self.index);
		let _enter = span.enter();

		let stale: Vec<String> = match snapshot::plan(self.previous.as_ref(), &data) {
			Plan::Skip => {
				trace!("Same record as last time. Skipping.");
				return Ok(Outcome::Skipped);
			}
			Plan::Apply { stale } => stale.into_iter().map(str::to_owned).collect(),
		};
		for id in &stale {
			self.remove_stale(id)?;
		}

		let mut report = Report::default();
		let mut bound = HashSet::new();
		for entry in data.entries() {
			match entry {
				Entry::Classes(classes) => {
					for (id, class) in classes {
						if let Some(element) = self.directive_target(Directive::Classes, id, &mut report)? {
							self.platform.set_class(&element, class)
						}
					}
				}
				Entry::Styles(styles) => {
					for (id, properties) in styles {
						if let Some(element) = self.directive_target(Directive::Styles, id, &mut report)? {
							for (property, value) in properties {
								self.platform.set_style(&element, property, value)
							}
						}
					}
				}
				Entry::Events(events) => {
					for (id, handlers) in events {
						if let Some(element) = self.directive_target(Directive::Events, id, &mut report)? {
							for (event, handler) in handlers {
								self.bind_event(&element, event, handler, &data, handle)
							}
						}
					}
				}
				Entry::Field { id, value } => {
					let element = match self.find(id) {
						Some(element) => element,
						None => {
							trace!("No element bound to {:?}. Passing through.", id);
							continue;
						}
					};
					bound.insert(id.clone());
					self.apply(id, &element, value, &mut report)?;
				}
			}
		}

		self.previous = Some(Snapshot { record: data, bound });
		Ok(Outcome::Rendered(report))
	}

	fn find(&self, id: &str) -> Option<P::Element> {
		self.platform.find_bound(&self.container, id, self.index)
	}

	fn remove_stale(&mut self, id: &str) -> Result<(), RenderError> {
		trace!("Removing stale {:?}.", id);
		let element = self.find(id).ok_or_else(|| RenderError::StaleNodeMissing { id: id.to_owned() })?;
		self.platform.remove(&element);
		self.children.retain(|(child_id, _), _| child_id != id);
		Ok(())
	}

	fn directive_target(&self, directive: Directive, id: &str, report: &mut Report) -> Result<Option<P::Element>, RenderError> {
		match self.find(id) {
			Some(element) => Ok(Some(element)),
			None if self.config.strict_directive_targets => Err(RenderError::MissingDirectiveTarget { directive, id: id.to_owned() }),
			None => {
				warn!("{} target {:?} not found. Skipping.", directive, id);
				report.unresolved.push(Unresolved { directive, id: id.to_owned() });
				Ok(None)
			}
		}
	}

	fn bind_event(&self, element: &P::Element, event: &str, handler: &Handler<P>, data: &Rc<Record<P>>, handle: &RenderHandle<P>) {
		trace!("Binding {:?}.", event);
		let handler = Rc::clone(handler);
		let data = Rc::clone(data);
		let target = element.clone();
		let render = handle.clone();
		self.platform.set_event_handler(
			element,
			event,
			Rc::new(move |event: P::Event| {
				handler(EventContext {
					event,
					data: Rc::clone(&data),
					element: target.clone(),
					render: render.clone(),
				})
			}),
		);
	}

	fn apply(&mut self, id: &str, element: &P::Element, value: &Value<P>, report: &mut Report) -> Result<(), RenderError> {
		match value {
			Value::Text(text) => {
				self.children.retain(|(child_id, _), _| child_id != id);
				self.apply_scalar(id, element, text);
			}
			Value::Number(number) => {
				self.children.retain(|(child_id, _), _| child_id != id);
				self.apply_scalar(id, element, &number_text(*number));
			}
			Value::Record(record) => {
				self.children.retain(|(child_id, index), _| child_id != id || index.is_none());
				let child = self.child(id, element, None)?;
				report.absorb(child.render(Rc::clone(record))?);
			}
			Value::Sequence(items) => {
				self.children.retain(|(child_id, index), _| child_id != id || index.is_some());
				for index in snapshot::excess_items(self.previous.as_ref(), id, items.len()).rev() {
					let item = self.platform.child_at(element, index).ok_or_else(|| RenderError::StaleItemMissing { id: id.to_owned(), index })?;
					trace!("Removing excess item {} of {:?}.", index, id);
					self.platform.remove(&item);
					self.children.remove(&(id.to_owned(), Some(index)));
				}
				for (index, item) in items.iter().enumerate() {
					let child = self.child(id, element, Some(index))?;
					report.absorb(child.render(Rc::clone(item))?);
				}
			}
		}
		Ok(())
	}

	fn apply_scalar(&self, id: &str, element: &P::Element, text: &str) {
		if self.platform.supports_value(element) {
			if cfg!(feature = "dangerous-logging") {
				trace!("Setting value of {:?} to {:?}.", id, text);
			} else {
				trace!("Setting value of {:?}.", id);
			}
			self.platform.set_value(element, text)
		} else if self.platform.text(element) != text {
			if cfg!(feature = "dangerous-logging") {
				trace!("Setting text of {:?} to {:?}.", id, text);
			} else {
				trace!("Setting text of {:?}.", id);
			}
			self.platform.set_text(element, text)
		}
	}

	/// The child renderer for field `id` (at list position `index`), reused if it still renders the same element with the same template.
	fn child(&mut self, id: &str, element: &P::Element, index: Option<usize>) -> Result<Renderer<P>, RenderError> {
		let template_id = self
			.platform
			.nested_template_id(element)
			.ok_or_else(|| RenderError::NestedTemplateUndeclared { id: id.to_owned() })?;
		let key = (id.to_owned(), index);
		if let Some(child) = self.children.get(&key) {
			if child.is_bound_to(element, &template_id) {
				return Ok(child.clone());
			}
		}

		let child = Renderer::with_config(Rc::clone(&self.platform), Rc::clone(&self.config), element.clone(), &template_id, index)?;
		self.children.insert(key, child.clone());
		Ok(child)
	}
}

/// Formats `number` the way JavaScript's `Number.prototype.toString` does.
#[allow(clippy::float_cmp)]
fn number_text(number: f64) -> String {
	if number == 0.0 {
		// Includes `-0`.
		"0".to_owned()
	} else if number.is_infinite() {
		if number > 0.0 {
			"Infinity".to_owned()
		} else {
			"-Infinity".to_owned()
		}
	} else if number.is_nan() || (1e-6..1e21).contains(&number.abs()) {
		number.to_string()
	} else {
		let text = format!("{:e}", number);
		match text.find('e') {
			Some(e) if !text[e + 1..].starts_with('-') => format!("{}e+{}", &text[..e], &text[e + 1..]),
			_ => text,
		}
	}
}
