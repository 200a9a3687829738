/// Failure policy, shared by a whole renderer tree.
///
/// How bound elements are recognised is up to the [`Platform`](`crate::Platform`),
/// see [`Attributes`](`crate::web::Attributes`) for the browser's.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Config {
	/// Whether a `@classes`, `@styles` or `@events` target that doesn't resolve fails the render
	/// instead of being reported in the [`Report`](`crate::Report`).
	pub strict_directive_targets: bool,
}

impl Config {
	#[must_use]
	pub fn strict_directive_targets(mut self, strict: bool) -> Self {
		self.strict_directive_targets = strict;
		self
	}
}
