use core::fmt::Debug;
use std::rc::Rc;

/// The DOM primitives a [`Renderer`](`crate::Renderer`) is built on.
///
/// [`Web`](`crate::web::Web`) implements this on top of [***web-sys***](https://docs.rs/web-sys/),
/// but any tree that can clone templates and address elements by logical id will do.
///
/// Methods take `&self`, so implementations use interior mutability for their own bookkeeping.
pub trait Platform: 'static {
	/// A handle to a live element. Clones refer to the same element.
	type Element: Clone + PartialEq + Debug + 'static;
	/// What event handlers receive from the platform.
	type Event: 'static;
	/// A detached clone of a template's content.
	type Fragment;

	/// Clones the content of the template named `template_id`, or returns [`None`] if there is no such template.
	fn clone_template(&self, template_id: &str) -> Option<Self::Fragment>;

	/// Appends `fragment`'s nodes as the last children of `container`.
	fn append(&self, container: &Self::Element, fragment: Self::Fragment);

	/// The element child of `container` at `index`, if any.
	fn child_at(&self, container: &Self::Element, index: usize) -> Option<Self::Element>;

	/// Finds the descendant of `scope` bound to the logical `id`.
	///
	/// If several match, `index` picks one in document order. Without `index`, the last match is returned.
	fn find_bound(&self, scope: &Self::Element, id: &str, index: Option<usize>) -> Option<Self::Element>;

	/// Detaches `element` from the document.
	fn remove(&self, element: &Self::Element);

	/// The template id `element` declares for its nested records or list items.
	fn nested_template_id(&self, element: &Self::Element) -> Option<String>;

	/// Replaces the whole class attribute.
	fn set_class(&self, element: &Self::Element, class: &str);

	fn set_style(&self, element: &Self::Element, property: &str, value: &str);

	/// Whether `element` is a form control with a settable value.
	fn supports_value(&self, element: &Self::Element) -> bool;

	fn set_value(&self, element: &Self::Element, value: &str);

	fn text(&self, element: &Self::Element) -> String;

	fn set_text(&self, element: &Self::Element, text: &str);

	/// Installs `handler` in `element`'s slot for `event`, replacing whatever handler was there before.
	fn set_event_handler(&self, element: &Self::Element, event: &str, handler: Rc<dyn Fn(Self::Event)>);
}
