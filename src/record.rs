use crate::{platform::Platform, renderer::EventContext, web::Web};
use core::fmt::{self, Debug, Display, Formatter};
use std::rc::Rc;

/// An event handler as stored in an `@events` block.
pub type Handler<P = Web> = Rc<dyn Fn(EventContext<P>)>;

/// The reserved record blocks that control presentation and behaviour rather than content.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Directive {
	Classes,
	Styles,
	Events,
}

impl Display for Directive {
	fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
		f.write_str(match self {
			Directive::Classes => "@classes",
			Directive::Styles => "@styles",
			Directive::Events => "@events",
		})
	}
}

/// What a bound field renders.
pub enum Value<P: Platform = Web> {
	/// Set as text content, or as value on form controls.
	Text(String),
	/// Like [`Value::Text`], formatted the way [`f64`] displays.
	Number(f64),
	/// Rendered into the bound element's nested template.
	Record(Rc<Record<P>>),
	/// Each item rendered into its own instance of the bound element's nested template, by position.
	Sequence(Vec<Rc<Record<P>>>),
}

impl<P: Platform> Clone for Value<P> {
	fn clone(&self) -> Self {
		match self {
			Value::Text(text) => Value::Text(text.clone()),
			Value::Number(number) => Value::Number(*number),
			Value::Record(record) => Value::Record(Rc::clone(record)),
			Value::Sequence(items) => Value::Sequence(items.clone()),
		}
	}
}

impl<P: Platform> Debug for Value<P> {
	fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
		match self {
			Value::Text(text) => f.debug_tuple("Text").field(text).finish(),
			Value::Number(number) => f.debug_tuple("Number").field(number).finish(),
			Value::Record(record) => f.debug_tuple("Record").field(record).finish(),
			Value::Sequence(items) => f.debug_tuple("Sequence").field(items).finish(),
		}
	}
}

impl<P: Platform> From<&str> for Value<P> {
	fn from(text: &str) -> Self {
		Value::Text(text.to_owned())
	}
}

impl<P: Platform> From<String> for Value<P> {
	fn from(text: String) -> Self {
		Value::Text(text)
	}
}

impl<P: Platform> From<f64> for Value<P> {
	fn from(number: f64) -> Self {
		Value::Number(number)
	}
}

impl<P: Platform> From<i32> for Value<P> {
	fn from(number: i32) -> Self {
		Value::Number(number.into())
	}
}

impl<P: Platform> From<u32> for Value<P> {
	fn from(number: u32) -> Self {
		Value::Number(number.into())
	}
}

impl<P: Platform> From<Record<P>> for Value<P> {
	fn from(record: Record<P>) -> Self {
		Value::Record(Rc::new(record))
	}
}

impl<P: Platform> From<Rc<Record<P>>> for Value<P> {
	fn from(record: Rc<Record<P>>) -> Self {
		Value::Record(record)
	}
}

impl<P: Platform> From<Vec<Rc<Record<P>>>> for Value<P> {
	fn from(items: Vec<Rc<Record<P>>>) -> Self {
		Value::Sequence(items)
	}
}

impl<P: Platform> From<Vec<Record<P>>> for Value<P> {
	fn from(items: Vec<Record<P>>) -> Self {
		Value::Sequence(items.into_iter().map(Rc::new).collect())
	}
}

/// One entry of a [`Record`], in render order.
pub enum Entry<P: Platform = Web> {
	Field { id: String, value: Value<P> },
	/// `@classes`: bound element id → whole class attribute.
	Classes(Vec<(String, String)>),
	/// `@styles`: bound element id → (style property, value) pairs.
	Styles(Vec<(String, Vec<(String, String)>)>),
	/// `@events`: bound element id → (event name, handler) pairs.
	Events(Vec<(String, Vec<(String, Handler<P>)>)>),
}

impl<P: Platform> Clone for Entry<P> {
	fn clone(&self) -> Self {
		match self {
			Entry::Field { id, value } => Entry::Field {
				id: id.clone(),
				value: value.clone(),
			},
			Entry::Classes(classes) => Entry::Classes(classes.clone()),
			Entry::Styles(styles) => Entry::Styles(styles.clone()),
			Entry::Events(events) => Entry::Events(events.clone()),
		}
	}
}

impl<P: Platform> Debug for Entry<P> {
	fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
		match self {
			Entry::Field { id, value } => f.debug_struct("Field").field("id", id).field("value", value).finish(),
			Entry::Classes(classes) => f.debug_tuple("Classes").field(classes).finish(),
			Entry::Styles(styles) => f.debug_tuple("Styles").field(styles).finish(),
			Entry::Events(events) => f
				.debug_tuple("Events")
				.field(
					&events
						.iter()
						.map(|(id, handlers)| (id, handlers.iter().map(|(event, _)| event).collect::<Vec<_>>()))
						.collect::<Vec<_>>(),
				)
				.finish(),
		}
	}
}

/// A data record: bound element ids mapped to [`Value`]s, plus optional directive blocks.
///
/// Records are immutable once handed to a renderer, which compares them by reference.
/// To change what's displayed, derive a new record (`clone` is shallow) and render that.
pub struct Record<P: Platform = Web> {
	entries: Vec<Entry<P>>,
}

impl<P: Platform> Default for Record<P> {
	fn default() -> Self {
		Self { entries: Vec::new() }
	}
}

impl<P: Platform> Clone for Record<P> {
	fn clone(&self) -> Self {
		Self {
			entries: self.entries.clone(),
		}
	}
}

impl<P: Platform> Debug for Record<P> {
	fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
		f.debug_list().entries(&self.entries).finish()
	}
}

impl<P: Platform> Record<P> {
	#[must_use]
	pub fn new() -> Self {
		Self::default()
	}

	#[must_use]
	pub fn with(mut self, id: impl Into<String>, value: impl Into<Value<P>>) -> Self {
		self.set(id, value);
		self
	}

	/// Sets the field `id`. An existing field keeps its position.
	pub fn set(&mut self, id: impl Into<String>, value: impl Into<Value<P>>) {
		let id = id.into();
		let value = value.into();
		match self.field_mut(&id) {
			Some(existing) => *existing = value,
			None => self.entries.push(Entry::Field { id, value }),
		}
	}

	pub fn remove(&mut self, id: &str) -> Option<Value<P>> {
		let position = self.entries.iter().position(|entry| matches!(entry, Entry::Field { id: field_id, .. } if field_id == id))?;
		match self.entries.remove(position) {
			Entry::Field { value, .. } => Some(value),
			_ => None,
		}
	}

	#[must_use]
	pub fn get(&self, id: &str) -> Option<&Value<P>> {
		self.entries.iter().find_map(|entry| match entry {
			Entry::Field { id: field_id, value } if field_id == id => Some(value),
			_ => None,
		})
	}

	#[must_use]
	pub fn contains(&self, id: &str) -> bool {
		self.get(id).is_some()
	}

	/// The bound field ids, in order. Directive blocks aren't included.
	pub fn ids(&self) -> impl Iterator<Item = &str> {
		self.entries.iter().filter_map(|entry| match entry {
			Entry::Field { id, .. } => Some(id.as_str()),
			_ => None,
		})
	}

	#[must_use]
	pub fn entries(&self) -> &[Entry<P>] {
		&self.entries
	}

	/// Adds `id → class` to the `@classes` block.
	#[must_use]
	pub fn class(mut self, id: impl Into<String>, class: impl Into<String>) -> Self {
		let id = id.into();
		let class = class.into();
		self.update_block(
			|entry| match entry {
				Entry::Classes(classes) => Some(classes),
				_ => None,
			},
			Entry::Classes,
			|classes| match classes.iter_mut().find(|(existing, _)| *existing == id) {
				Some((_, existing)) => *existing = class,
				None => classes.push((id, class)),
			},
		);
		self
	}

	/// Adds `property → value` for `id` to the `@styles` block.
	#[must_use]
	pub fn style(mut self, id: impl Into<String>, property: impl Into<String>, value: impl Into<String>) -> Self {
		let id = id.into();
		let property = property.into();
		let value = value.into();
		self.update_block(
			|entry| match entry {
				Entry::Styles(styles) => Some(styles),
				_ => None,
			},
			Entry::Styles,
			|styles| upsert(element_block(styles, id), property, value),
		);
		self
	}

	/// Adds an `event → handler` binding for `id` to the `@events` block.
	#[must_use]
	pub fn on(mut self, id: impl Into<String>, event: impl Into<String>, handler: impl Fn(EventContext<P>) + 'static) -> Self {
		let id = id.into();
		let event = event.into();
		let handler: Handler<P> = Rc::new(handler);
		self.update_block(
			|entry| match entry {
				Entry::Events(events) => Some(events),
				_ => None,
			},
			Entry::Events,
			|events| upsert(element_block(events, id), event, handler),
		);
		self
	}

	fn field_mut(&mut self, id: &str) -> Option<&mut Value<P>> {
		self.entries.iter_mut().find_map(|entry| match entry {
			Entry::Field { id: field_id, value } if field_id == id => Some(value),
			_ => None,
		})
	}

	/// Updates the directive block `select` finds, or appends a new one made by `wrap`.
	fn update_block<T>(
		&mut self,
		select: impl FnMut(&mut Entry<P>) -> Option<&mut Vec<T>>,
		wrap: impl FnOnce(Vec<T>) -> Entry<P>,
		update: impl FnOnce(&mut Vec<T>),
	) {
		match self.entries.iter_mut().find_map(select) {
			Some(block) => update(block),
			None => {
				let mut block = Vec::new();
				update(&mut block);
				self.entries.push(wrap(block));
			}
		}
	}
}

/// The per-element part of a `@styles` or `@events` block.
fn element_block<T>(block: &mut Vec<(String, Vec<T>)>, id: String) -> &mut Vec<T> {
	let position = match block.iter().position(|(existing, _)| *existing == id) {
		Some(position) => position,
		None => {
			block.push((id, Vec::new()));
			block.len() - 1
		}
	};
	&mut block[position].1
}

fn upsert<V>(pairs: &mut Vec<(String, V)>, key: String, value: V) {
	match pairs.iter_mut().find(|(existing, _)| *existing == key) {
		Some((_, existing)) => *existing = value,
		None => pairs.push((key, value)),
	}
}
