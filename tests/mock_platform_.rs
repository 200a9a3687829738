#![allow(dead_code)]

use std::{
	cell::{Cell, RefCell},
	collections::HashMap,
	rc::Rc,
};
use stencil_dom::Platform;

/// A node handle into a [`Mock`] tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(usize);

/// A template node, cloned into the tree on [`Platform::append`].
#[derive(Debug, Clone)]
pub struct El {
	tag: &'static str,
	bound_id: Option<&'static str>,
	nested_template: Option<&'static str>,
	children: Vec<El>,
}

pub fn el(tag: &'static str) -> El {
	El {
		tag,
		bound_id: None,
		nested_template: None,
		children: Vec::new(),
	}
}

impl El {
	pub fn id(mut self, id: &'static str) -> Self {
		self.bound_id = Some(id);
		self
	}

	pub fn nested(mut self, template_id: &'static str) -> Self {
		self.nested_template = Some(template_id);
		self
	}

	pub fn child(mut self, child: El) -> Self {
		self.children.push(child);
		self
	}
}

struct Node {
	tag: &'static str,
	bound_id: Option<String>,
	nested_template: Option<String>,
	class: String,
	style: Vec<(String, String)>,
	text: String,
	value: String,
	parent: Option<NodeId>,
	children: Vec<NodeId>,
	handlers: HashMap<String, Rc<dyn Fn(())>>,
}

/// An in-memory DOM that counts mutations.
#[derive(Default)]
pub struct Mock {
	nodes: RefCell<Vec<Node>>,
	templates: HashMap<String, Vec<El>>,
	mutations: Cell<usize>,
	fire_on_set_text: RefCell<Option<String>>,
}

impl Mock {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn template(mut self, id: &str, content: Vec<El>) -> Self {
		self.templates.insert(id.to_owned(), content);
		self
	}

	/// A detached container to mount into.
	pub fn root(&self) -> NodeId {
		self.create(&el("main"), None)
	}

	pub fn mutations(&self) -> usize {
		self.mutations.get()
	}

	pub fn find(&self, scope: NodeId, id: &str) -> Option<NodeId> {
		self.find_bound(&scope, id, None)
	}

	pub fn text_of(&self, node: NodeId) -> String {
		self.nodes.borrow()[node.0].text.clone()
	}

	pub fn value_of(&self, node: NodeId) -> String {
		self.nodes.borrow()[node.0].value.clone()
	}

	pub fn class_of(&self, node: NodeId) -> String {
		self.nodes.borrow()[node.0].class.clone()
	}

	pub fn style_of(&self, node: NodeId, property: &str) -> Option<String> {
		self.nodes.borrow()[node.0]
			.style
			.iter()
			.find(|(existing, _)| existing == property)
			.map(|(_, value)| value.clone())
	}

	pub fn tag_of(&self, node: NodeId) -> &'static str {
		self.nodes.borrow()[node.0].tag
	}

	pub fn children_of(&self, node: NodeId) -> Vec<NodeId> {
		self.nodes.borrow()[node.0].children.clone()
	}

	pub fn is_attached(&self, node: NodeId) -> bool {
		self.nodes.borrow()[node.0].parent.is_some()
	}

	/// Calls the handler in `node`'s slot for `event`, if any.
	pub fn fire(&self, node: NodeId, event: &str) -> bool {
		let handler = self.nodes.borrow()[node.0].handlers.get(event).cloned();
		match handler {
			Some(handler) => {
				handler(());
				true
			}
			None => false,
		}
	}

	/// From now on, [`Platform::set_text`] fires `event` on the element it just changed, like a synchronous DOM listener would.
	pub fn fire_on_set_text(&self, event: &str) {
		*self.fire_on_set_text.borrow_mut() = Some(event.to_owned());
	}

	fn mutate(&self) {
		self.mutations.set(self.mutations.get() + 1)
	}

	fn create(&self, template: &El, parent: Option<NodeId>) -> NodeId {
		let id = {
			let mut nodes = self.nodes.borrow_mut();
			nodes.push(Node {
				tag: template.tag,
				bound_id: template.bound_id.map(str::to_owned),
				nested_template: template.nested_template.map(str::to_owned),
				class: String::new(),
				style: Vec::new(),
				text: String::new(),
				value: String::new(),
				parent,
				children: Vec::new(),
				handlers: HashMap::new(),
			});
			NodeId(nodes.len() - 1)
		};
		for child in &template.children {
			let child = self.create(child, Some(id));
			self.nodes.borrow_mut()[id.0].children.push(child);
		}
		id
	}

	fn descendants(&self, scope: NodeId, found: &mut Vec<NodeId>) {
		for child in self.children_of(scope) {
			found.push(child);
			self.descendants(child, found);
		}
	}
}

impl Platform for Mock {
	type Element = NodeId;
	type Event = ();
	type Fragment = Vec<El>;

	fn clone_template(&self, template_id: &str) -> Option<Vec<El>> {
		self.templates.get(template_id).cloned()
	}

	fn append(&self, container: &NodeId, fragment: Vec<El>) {
		self.mutate();
		for template in &fragment {
			let child = self.create(template, Some(*container));
			self.nodes.borrow_mut()[container.0].children.push(child);
		}
	}

	fn child_at(&self, container: &NodeId, index: usize) -> Option<NodeId> {
		self.nodes.borrow()[container.0].children.get(index).copied()
	}

	fn find_bound(&self, scope: &NodeId, id: &str, index: Option<usize>) -> Option<NodeId> {
		let mut descendants = Vec::new();
		self.descendants(*scope, &mut descendants);
		let nodes = self.nodes.borrow();
		let matches: Vec<NodeId> = descendants
			.into_iter()
			.filter(|node| nodes[node.0].bound_id.as_deref() == Some(id))
			.collect();
		match index {
			Some(index) => matches.get(index).copied(),
			None => matches.last().copied(),
		}
	}

	fn remove(&self, element: &NodeId) {
		self.mutate();
		let mut nodes = self.nodes.borrow_mut();
		if let Some(parent) = nodes[element.0].parent.take() {
			nodes[parent.0].children.retain(|child| child != element);
		}
	}

	fn nested_template_id(&self, element: &NodeId) -> Option<String> {
		self.nodes.borrow()[element.0].nested_template.clone()
	}

	fn set_class(&self, element: &NodeId, class: &str) {
		self.mutate();
		self.nodes.borrow_mut()[element.0].class = class.to_owned();
	}

	fn set_style(&self, element: &NodeId, property: &str, value: &str) {
		self.mutate();
		let mut nodes = self.nodes.borrow_mut();
		let style = &mut nodes[element.0].style;
		match style.iter_mut().find(|(existing, _)| existing == property) {
			Some((_, existing)) => *existing = value.to_owned(),
			None => style.push((property.to_owned(), value.to_owned())),
		}
	}

	fn supports_value(&self, element: &NodeId) -> bool {
		matches!(self.nodes.borrow()[element.0].tag, "input" | "textarea" | "select")
	}

	fn set_value(&self, element: &NodeId, value: &str) {
		self.mutate();
		self.nodes.borrow_mut()[element.0].value = value.to_owned();
	}

	fn text(&self, element: &NodeId) -> String {
		self.text_of(*element)
	}

	fn set_text(&self, element: &NodeId, text: &str) {
		self.mutate();
		self.nodes.borrow_mut()[element.0].text = text.to_owned();
		let event = self.fire_on_set_text.borrow().clone();
		if let Some(event) = event {
			self.fire(*element, &event);
		}
	}

	fn set_event_handler(&self, element: &NodeId, event: &str, handler: Rc<dyn Fn(())>) {
		self.mutate();
		self.nodes.borrow_mut()[element.0].handlers.insert(event.to_owned(), handler);
	}
}
