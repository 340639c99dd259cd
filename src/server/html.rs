//! Minimal HTML fragments for the demo pages.

const HEADING: &str = "<h2>HubSpot OAuth 2.0 Quickstart App</h2>";
const INSTALL_LINK: &str = "<a href=\"/install\"><h3>Install the app</h3></a>";

/// What the home page shows below the heading.
#[derive(Debug)]
pub enum HomeView {
	/// Visitor has not installed the app.
	Install,
	/// First contact's display name.
	Contact(String),
	/// Portal has no contacts.
	NoContacts,
	/// Fetching the contact failed.
	Failure(String),
}

/// Renders the home page.
pub fn home(view: &HomeView) -> String {
	let body = match view {
		HomeView::Install => INSTALL_LINK.to_owned(),
		HomeView::Contact(name) => format!("<p>Contact name: {}</p>", escape(name)),
		HomeView::NoContacts => "<p>No contacts found.</p>".to_owned(),
		HomeView::Failure(message) =>
			format!("<p>Unable to retrieve contact! Error Message: {}</p>", escape(message)),
	};

	format!("{HEADING}{body}")
}

/// Renders the error page.
pub fn error(message: &str) -> String {
	format!("<h4>Error: {}</h4>", escape(message))
}

/// Escapes text for use in HTML element content and quoted attributes.
pub fn escape(raw: &str) -> String {
	let mut out = String::with_capacity(raw.len());

	for c in raw.chars() {
		match c {
			'&' => out.push_str("&amp;"),
			'<' => out.push_str("&lt;"),
			'>' => out.push_str("&gt;"),
			'"' => out.push_str("&quot;"),
			'\'' => out.push_str("&#x27;"),
			_ => out.push(c),
		}
	}

	out
}
