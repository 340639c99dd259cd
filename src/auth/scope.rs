//! Scope list parsing and rendering.

// self
use crate::_prelude::*;

/// Scope requested when no `SCOPE` override is configured.
pub const DEFAULT_SCOPE: &str = "crm.objects.contacts.read";

/// Errors emitted when parsing a scope list.
#[derive(Clone, Debug, PartialEq, Eq, ThisError)]
pub enum ScopeError {
	/// The input contained no scope entries.
	#[error("Scope list cannot be empty.")]
	Empty,
}

/// Ordered, de-duplicated list of OAuth scopes.
///
/// Order is preserved because the provider displays scopes in the order requested. The wire form
/// is space-joined.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct ScopeList(Vec<String>);
impl ScopeList {
	/// Builds a list from individual scopes, dropping blanks and duplicates.
	pub fn new<I, S>(scopes: I) -> Result<Self, ScopeError>
	where
		I: IntoIterator<Item = S>,
		S: AsRef<str>,
	{
		let mut list = Vec::<String>::new();

		for scope in scopes {
			let scope = scope.as_ref().trim();

			if !scope.is_empty() && !list.iter().any(|existing| existing == scope) {
				list.push(scope.to_owned());
			}
		}

		if list.is_empty() {
			return Err(ScopeError::Empty);
		}

		Ok(Self(list))
	}

	/// Parses the configuration syntax: entries separated by a space, a comma (optionally
	/// followed by a space), or a literal `%20`.
	pub fn parse(raw: &str) -> Result<Self, ScopeError> {
		Self::new(raw.replace("%20", " ").split([' ', ',']))
	}

	/// Number of scopes.
	pub fn len(&self) -> usize {
		self.0.len()
	}

	/// Always false for a constructed list; present for API symmetry.
	pub fn is_empty(&self) -> bool {
		self.0.is_empty()
	}

	/// Iterator over scopes in request order.
	pub fn iter(&self) -> impl Iterator<Item = &str> {
		self.0.iter().map(String::as_str)
	}

	/// Space-joined wire representation.
	pub fn joined(&self) -> String {
		self.0.join(" ")
	}
}
impl Default for ScopeList {
	fn default() -> Self {
		Self(vec![DEFAULT_SCOPE.to_owned()])
	}
}
impl FromStr for ScopeList {
	type Err = ScopeError;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		Self::parse(s)
	}
}
impl Debug for ScopeList {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_tuple("ScopeList").field(&self.0).finish()
	}
}
impl Display for ScopeList {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(&self.joined())
	}
}
