#![cfg(target_arch = "wasm32")]

use std::{cell::RefCell, rc::Rc, sync::Once};
use stencil_dom::{mount, EventContext, Record, Value};
use wasm_bindgen::JsCast;
use wasm_bindgen_test::{wasm_bindgen_test, wasm_bindgen_test_configure};
use web_sys::{window, HtmlElement};

wasm_bindgen_test_configure!(run_in_browser);

static LOG_INITIALIZED: Once = Once::new();

fn fixture(html: &str) -> web_sys::Element {
	LOG_INITIALIZED.call_once(tracing_wasm::set_as_global_default);

	let document = window().unwrap().document().unwrap();
	let container = document.create_element("div").unwrap();
	container.set_inner_html(html);
	document.body().unwrap().append_child(&container).unwrap();
	container
}

fn bound(scope: &web_sys::Element, id: &str) -> HtmlElement {
	scope
		.query_selector(&format!("[data-id=\"{}\"]", id))
		.unwrap()
		.unwrap()
		.dyn_into()
		.unwrap()
}

#[wasm_bindgen_test]
fn click() {
	let root = fixture(r#"<template id="event-click"><button data-id="btn">+</button><span data-id="count"></span></template>"#);
	let renderer = mount(root.clone(), "event-click").unwrap();
	let seen = Rc::new(RefCell::new(Vec::new()));

	renderer
		.render(Record::new().with("count", 0).on("btn", "click", {
			let seen = Rc::clone(&seen);
			move |context: EventContext| {
				assert_eq!(context.event.type_(), "click");
				let count = match context.data.get("count") {
					Some(Value::Number(count)) => *count,
					_ => 0.0,
				};
				seen.borrow_mut().push(count);
				let mut next = (*context.data).clone();
				next.set("count", count + 1.0);
				context.render.render(next).unwrap();
			}
		}))
		.unwrap();

	let button = bound(&root, "btn");
	button.click();
	button.click();

	assert_eq!(*seen.borrow(), [0.0, 1.0]);
	assert_eq!(bound(&root, "count").inner_text(), "2");
}

#[wasm_bindgen_test]
fn rebind() {
	let root = fixture(r#"<template id="event-rebind"><button data-id="btn"></button></template>"#);
	let renderer = mount(root.clone(), "event-rebind").unwrap();
	let fired = Rc::new(RefCell::new(Vec::new()));

	for name in ["h1", "h2"] {
		let fired = Rc::clone(&fired);
		renderer.render(Record::new().on("btn", "onclick", move |_| fired.borrow_mut().push(name))).unwrap();
	}

	bound(&root, "btn").click();
	assert_eq!(*fired.borrow(), ["h2"]);
}

#[wasm_bindgen_test]
fn replaced_subtree_releases_handlers() {
	let root = fixture(r#"<template id="event-release"><div data-id="panel"><button data-id="btn"></button></div></template>"#);
	let renderer = mount(root.clone(), "event-release").unwrap();
	let fired = Rc::new(RefCell::new(0));

	renderer
		.render(Record::new().on("btn", "click", {
			let fired = Rc::clone(&fired);
			move |_| *fired.borrow_mut() += 1
		}))
		.unwrap();
	let button = bound(&root, "btn");
	button.click();
	assert_eq!(*fired.borrow(), 1);

	renderer.render(Record::new().with("panel", "closed")).unwrap();
	assert_eq!(bound(&root, "panel").inner_text(), "closed");
	button.click();
	assert_eq!(*fired.borrow(), 1);
}
