#![doc(html_root_url = "https://docs.rs/stencil-dom/0.0.1")]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

//! Binds plain data [`Record`]s to pre-declared HTML `<template>`s.
//!
//! A [`Renderer`] attaches a template instance to a container once, then applies each record it's given:
//! text and form values for scalar fields, nested templates for nested records and lists,
//! and the `@classes`, `@styles` and `@events` directive blocks.
//! Only records that aren't the very one rendered last are applied, and only what's present in them is touched.

#[cfg(doctest)]
pub mod readme {
	doc_comment::doctest!("../README.md");
}

mod config;
mod error;
mod event_slots;
pub mod platform;
pub mod record;
mod renderer;
mod snapshot;
pub mod web;

pub use config::Config;
pub use error::RenderError;
pub use platform::Platform;
pub use record::{Directive, Entry, Handler, Record, Value};
pub use renderer::{mount, mount_with_config, EventContext, Outcome, RenderHandle, Renderer, Report, Unresolved};
pub use web::{Attributes, Web};
