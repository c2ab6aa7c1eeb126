//! Navigation links for paged API responses.
//!
//! Links are absolute URLs built from a base endpoint, the caller's filter
//! parameters, and the limit/offset of the adjacent windows. Query keys are
//! written in sorted order so equal inputs always produce equal links.

mod paged;

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use url::Url;

pub use self::paged::{Page, PagedQuery};
use crate::args::{NamedParams, ParamKeys};
use crate::window::{WindowBounds, WindowState};

/// Links to the windows adjacent to the current one.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NavigationLinks {
    /// Link to the previous window.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub previous: Option<String>,
    /// Link to the next window.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next: Option<String>,
}

impl NavigationLinks {
    /// Returns whether neither link is present.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.previous.is_none() && self.next.is_none()
    }
}

/// Builds navigation links for the windows adjacent to `state`.
///
/// Each link starts from `endpoint` with its query string cleared, carries
/// every filter except the reserved `keys`, and then the window's limit and
/// offset under those keys. A link is absent when the matching window does
/// not exist.
pub fn build_links(
    endpoint: &Url,
    filters: &NamedParams,
    state: &WindowState,
    keys: &ParamKeys,
) -> NavigationLinks {
    let link = |bounds: WindowBounds| window_link(endpoint, filters, bounds, keys);

    NavigationLinks {
        previous: state.previous().map(link),
        next: state.next().map(link),
    }
}

fn window_link(
    endpoint: &Url,
    filters: &NamedParams,
    bounds: WindowBounds,
    keys: &ParamKeys,
) -> String {
    let mut pairs: BTreeMap<String, String> = filters
        .iter()
        .filter(|(name, _)| !keys.is_reserved(name))
        .map(|(name, value)| (name.clone(), value.to_string()))
        .collect();

    pairs.insert(keys.limit.to_string(), bounds.limit.to_string());
    pairs.insert(keys.offset.to_string(), bounds.offset.to_string());

    let mut url = endpoint.clone();
    url.set_query(None);
    url.query_pairs_mut().extend_pairs(&pairs);
    url.into()
}

/// Builds navigation links against a fixed endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkBuilder {
    endpoint: Url,
    keys: ParamKeys,
}

impl LinkBuilder {
    /// Creates a link builder with the default parameter keys.
    pub fn new(endpoint: Url) -> Self {
        Self {
            endpoint,
            keys: ParamKeys::default(),
        }
    }

    /// Parses `endpoint` and creates a link builder.
    pub fn parse(endpoint: &str) -> Result<Self, url::ParseError> {
        Url::parse(endpoint).map(Self::new)
    }

    /// Sets the reserved parameter keys.
    #[must_use]
    pub fn with_keys(mut self, keys: ParamKeys) -> Self {
        self.keys = keys;
        self
    }

    /// Returns the base endpoint.
    #[inline]
    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    /// Returns the reserved parameter keys.
    #[inline]
    pub fn keys(&self) -> &ParamKeys {
        &self.keys
    }

    /// Builds links for the windows adjacent to `state`.
    pub fn build(&self, filters: &NamedParams, state: &WindowState) -> NavigationLinks {
        build_links(&self.endpoint, filters, state, &self.keys)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn endpoint() -> Url {
        Url::parse("https://host/items").unwrap()
    }

    #[test]
    fn next_link_embeds_filters_and_window() {
        let filters = NamedParams::new().with("status", "open");
        let state = WindowState::from_fetch(4, 0, 5);
        let links = build_links(&endpoint(), &filters, &state, &ParamKeys::default());

        assert_eq!(links.previous, None);
        assert_eq!(
            links.next.as_deref(),
            Some("https://host/items?limit=4&offset=4&status=open")
        );
    }

    #[test]
    fn links_do_not_leak_into_each_other() {
        let filters = NamedParams::new().with("q", "a b");
        let state = WindowState::from_fetch(4, 4, 5);
        let links = build_links(&endpoint(), &filters, &state, &ParamKeys::default());

        assert_eq!(
            links.previous.as_deref(),
            Some("https://host/items?limit=4&offset=0&q=a+b")
        );
        assert_eq!(
            links.next.as_deref(),
            Some("https://host/items?limit=4&offset=8&q=a+b")
        );
    }

    #[test]
    fn existing_endpoint_query_is_discarded() {
        let endpoint = Url::parse("https://host/items?stale=1&offset=99").unwrap();
        let state = WindowState::from_fetch(2, 0, 3);
        let links = build_links(&endpoint, &NamedParams::new(), &state, &ParamKeys::default());

        assert_eq!(
            links.next.as_deref(),
            Some("https://host/items?limit=2&offset=2")
        );
    }

    #[test]
    fn reserved_filter_keys_are_overwritten() {
        let filters = NamedParams::new().with("l", 1000).with("o", 7).with("kind", "x");
        let state = WindowState::from_fetch(3, 0, 4);
        let links = build_links(&endpoint(), &filters, &state, &ParamKeys::short());

        assert_eq!(
            links.next.as_deref(),
            Some("https://host/items?kind=x&l=3&o=3")
        );
    }

    #[test]
    fn no_adjacent_windows_means_no_links() {
        let state = WindowState::from_fetch(10, 0, 3);
        let links = LinkBuilder::new(endpoint()).build(&NamedParams::new(), &state);
        assert!(links.is_empty());
    }

    #[test]
    fn null_filters_render_as_empty_values() {
        let filters = NamedParams::new().with("owner", None::<String>);
        let state = WindowState::from_fetch(1, 0, 2);
        let links = LinkBuilder::new(endpoint()).build(&filters, &state);

        assert_eq!(
            links.next.as_deref(),
            Some("https://host/items?limit=1&offset=1&owner=")
        );
    }

    #[test]
    fn serializes_only_present_links() {
        let links = NavigationLinks {
            previous: None,
            next: Some("https://host/items?limit=1&offset=1".to_owned()),
        };
        let json = serde_json::to_string(&links).unwrap();
        assert_eq!(json, r#"{"next":"https://host/items?limit=1&offset=1"}"#);
    }

    #[test]
    fn parse_rejects_relative_endpoints() {
        assert!(LinkBuilder::parse("/items").is_err());
        assert!(LinkBuilder::parse("https://host/items").is_ok());
    }
}
