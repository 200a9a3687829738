use crate::record::Directive;
use thiserror::Error;

/// Failures that abort a [`Renderer`](`crate::Renderer`) construction or render call.
///
/// A failed render leaves the DOM as far as it got and does not update the renderer's previous record.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RenderError {
	#[error("template {template_id:?} not found")]
	TemplateNotFound { template_id: String },

	#[error("bound element {id:?} holds a record or list but declares no nested template")]
	NestedTemplateUndeclared { id: String },

	#[error("previously rendered element {id:?} is missing and can't be removed")]
	StaleNodeMissing { id: String },

	#[error("item {index} of previously rendered list {id:?} is missing and can't be removed")]
	StaleItemMissing { id: String, index: usize },

	#[error("{directive} target {id:?} not found")]
	MissingDirectiveTarget { directive: Directive, id: String },

	#[error("renderer is already rendering")]
	Reentrant,

	#[error("renderer was dropped")]
	Detached,

	#[error("no document available")]
	NoDocument,
}
