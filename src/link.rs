//! Public URLs for issued tokens (`/q/<token>`, `/r/<token>`, `/m/<token>`, `/a/<token>`).

// self
use crate::{_prelude::*, error::ConfigError, grant::Capability};

/// Builds and parses capability links under a public base URL.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LinkBuilder {
	base: Url,
}
impl LinkBuilder {
	/// Creates a builder rooted at `base`, which must be an `http` or `https` URL.
	pub fn new(base: Url) -> Result<Self, ConfigError> {
		if !matches!(base.scheme(), "http" | "https") || base.cannot_be_a_base() {
			return Err(ConfigError::InvalidValue {
				key: "base_url",
				reason: format!("`{base}` is not an http(s) base URL"),
			});
		}

		Ok(Self { base })
	}

	/// Parses `base` and creates a builder.
	pub fn parse(base: &str) -> Result<Self, ConfigError> {
		let url = Url::parse(base)
			.map_err(|e| ConfigError::InvalidValue { key: "base_url", reason: e.to_string() })?;

		Self::new(url)
	}

	/// Base URL links are built under.
	pub fn base(&self) -> &Url {
		&self.base
	}

	/// Returns the link for `token` under the capability's prefix.
	pub fn url(&self, capability: Capability, token: &str) -> Url {
		let mut url = self.base.clone();

		url.set_query(None);
		url.set_fragment(None);

		// `new` rejects cannot-be-a-base URLs, so segments are always available.
		if let Ok(mut segments) = url.path_segments_mut() {
			segments.pop_if_empty().push(capability.path_prefix()).push(token);
		}

		url
	}

	/// Splits a request path such as `/q/<token>` into its capability and token.
	///
	/// Only the last two segments are considered, so the builder's base path may be mounted
	/// anywhere.
	pub fn parse_path(path: &str) -> Option<(Capability, &str)> {
		let mut segments = path.trim_end_matches('/').rsplit('/');
		let token = segments.next().filter(|token| !token.is_empty())?;
		let prefix = segments.next()?;
		let capability =
			Capability::ALL.into_iter().find(|capability| capability.path_prefix() == prefix)?;

		Some((capability, token))
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn links_use_capability_prefixes() {
		let links = LinkBuilder::parse("https://portal.example.com/")
			.expect("Base URL fixture should be valid.");

		assert_eq!(
			links.url(Capability::Quote, "abc.def").as_str(),
			"https://portal.example.com/q/abc.def"
		);
		assert_eq!(
			links.url(Capability::Offer, "abc.def").as_str(),
			"https://portal.example.com/m/abc.def"
		);
	}

	#[test]
	fn base_paths_are_preserved() {
		let links = LinkBuilder::parse("https://example.com/portal?ref=mail#top")
			.expect("Base URL fixture should be valid.");

		assert_eq!(
			links.url(Capability::Reorder, "t-_0.s-_1").as_str(),
			"https://example.com/portal/r/t-_0.s-_1"
		);
	}

	#[test]
	fn non_http_bases_are_rejected() {
		assert!(LinkBuilder::parse("mailto:sales@example.com").is_err());
		assert!(LinkBuilder::parse("ftp://example.com/").is_err());
		assert!(LinkBuilder::parse("not a url").is_err());
	}

	#[test]
	fn paths_parse_back_into_capabilities() {
		assert_eq!(LinkBuilder::parse_path("/q/abc.def"), Some((Capability::Quote, "abc.def")));
		assert_eq!(
			LinkBuilder::parse_path("/portal/a/abc.def/"),
			Some((Capability::Action, "abc.def"))
		);
		assert_eq!(LinkBuilder::parse_path("/x/abc.def"), None);
		assert_eq!(LinkBuilder::parse_path("/q/"), None);
		assert_eq!(LinkBuilder::parse_path("abc"), None);
	}
}
