//! What a renderer remembers between renders, and the decisions derived from it.

use crate::{
	platform::Platform,
	record::{Record, Value},
};
use core::ops::Range;
use hashbrown::HashSet;
use std::rc::Rc;

/// The record of the last successful render, by reference, and which of its fields found a bound element.
pub(crate) struct Snapshot<P: Platform> {
	pub record: Rc<Record<P>>,
	pub bound: HashSet<String>,
}

#[derive(Debug, PartialEq, Eq)]
pub(crate) enum Plan<'a> {
	/// The incoming record is the one rendered last.
	Skip,
	/// Bound elements of fields that disappeared, to remove before applying the incoming record.
	Apply { stale: Vec<&'a str> },
}

pub(crate) fn plan<'a, P: Platform>(previous: Option<&'a Snapshot<P>>, next: &Rc<Record<P>>) -> Plan<'a> {
	match previous {
		None => Plan::Apply { stale: Vec::new() },
		Some(previous) if Rc::ptr_eq(&previous.record, next) => Plan::Skip,
		Some(previous) => Plan::Apply {
			stale: previous.record.ids().filter(|id| previous.bound.contains(*id) && !next.contains(id)).collect(),
		},
	}
}

/// Positions of the list children left over when the sequence in field `id` shrinks to `len` items.
pub(crate) fn excess_items<P: Platform>(previous: Option<&Snapshot<P>>, id: &str, len: usize) -> Range<usize> {
	match previous.and_then(|previous| previous.record.get(id)) {
		Some(Value::Sequence(items)) if items.len() > len => len..items.len(),
		_ => len..len,
	}
}
