use core::{cell::RefCell, fmt};
use hashbrown::HashMap;
use js_sys::{Function, Map, WeakMap};
use std::rc::Rc;
use tracing::{trace, trace_span};
use wasm_bindgen::{closure::Closure, JsCast, JsValue};

struct Slot {
	element: web_sys::Element,
	event: String,
	handler: Rc<dyn Fn(web_sys::Event)>,
}

/// Rust event handlers installed in `on…` properties.
///
/// All slots share one wasm-bindgen [`Closure`]. Each installed JS function is that closure with the slot number bound as first argument,
/// so swapping a slot's handler never invalidates a function the browser may currently be running.
pub(crate) struct EventSlots {
	slots: Rc<RefCell<HashMap<u32, Slot>>>,
	/// Element → `Map` of `on…` property → slot number.
	index: WeakMap,
	next_slot: u32,
	common_handler: Closure<dyn Fn(JsValue, web_sys::Event)>,
}

impl fmt::Debug for EventSlots {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("EventSlots")
			.field("slots.len()", &self.slots.borrow().len())
			.field("next_slot", &self.next_slot)
			.finish_non_exhaustive()
	}
}

impl EventSlots {
	pub fn new() -> Self {
		let slots = Rc::new(RefCell::new(HashMap::<u32, Slot>::new()));
		let common_handler = {
			let slots = Rc::clone(&slots);
			Closure::wrap(Box::new(move |slot: JsValue, event: web_sys::Event| {
				let span = trace_span!("common_handler", ?slot, event = %event.type_());
				let _enter = span.enter();

				#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
				let handler = slot
					.as_f64()
					.and_then(|slot| slots.borrow().get(&(slot as u32)).map(|slot| Rc::clone(&slot.handler)));
				match handler {
					// The map isn't borrowed here, so the handler may rebind or remove its own slot.
					Some(handler) => handler(event),
					None => trace!("Slot was freed. Ignoring event."),
				}
			}) as Box<dyn Fn(JsValue, web_sys::Event)>)
		};
		Self {
			slots,
			index: WeakMap::new(),
			next_slot: 0,
			common_handler,
		}
	}

	/// Returns the JS function to install if `element` had no slot for `event` yet.
	pub fn bind(&mut self, element: &web_sys::Element, event: &str, handler: Rc<dyn Fn(web_sys::Event)>) -> Option<Function> {
		let events = self.events_of(element);
		let key = JsValue::from_str(event);
		if let Some(id) = events.get(&key).as_f64() {
			#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
			let id = id as u32;
			if let Some(slot) = self.slots.borrow_mut().get_mut(&id) {
				trace!("Replaced handler in slot {}.", id);
				slot.handler = handler;
				return None;
			}
		}

		let id = self.next_slot;
		self.next_slot = self.next_slot.wrapping_add(1);
		self.slots.borrow_mut().insert(
			id,
			Slot {
				element: element.clone(),
				event: event.to_owned(),
				handler,
			},
		);
		let id = JsValue::from_f64(id.into());
		events.set(&key, &id);
		trace!("Created slot {:?}.", id);
		Some(
			self.common_handler
				.as_ref()
				.unchecked_ref::<Function>()
				.bind1(&JsValue::UNDEFINED, &id)
				.unchecked_into::<Function>(),
		)
	}

	/// Frees the slots of `root`'s descendants, and of `root` itself if `inclusive`.
	pub fn release(&self, root: &web_sys::Element, inclusive: bool) {
		let mut slots = self.slots.borrow_mut();
		let before = slots.len();
		slots.retain(|_, slot| {
			let released = (inclusive || slot.element != *root) && root.contains(Some(&*slot.element));
			if released {
				if let Ok(events) = self.index.get(&slot.element).dyn_into::<Map>() {
					events.delete(&JsValue::from_str(&slot.event));
				}
			}
			!released
		});
		trace!("Freed {} event slot(s).", before - slots.len());
	}

	fn events_of(&self, element: &web_sys::Element) -> Map {
		match self.index.get(element).dyn_into::<Map>() {
			Ok(events) => events,
			Err(_) => {
				let events = Map::new();
				self.index.set(element, &events);
				events
			}
		}
	}
}
