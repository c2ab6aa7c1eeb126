//! Argument contract between callers and the windowed executor.
//!
//! An argument value carries the caller's requested limit and offset together
//! with any filter fields the query needs. The executor only ever touches the
//! two pagination fields; everything else reaches the statement untouched
//! through [`WindowArgs::params`].

mod params;

use std::borrow::Cow;

use serde::{Deserialize, Serialize};

pub use self::params::{NamedParams, ParamValue};

/// Capability an argument object exposes to the windowed executor.
pub trait WindowArgs {
    /// Returns the requested `(limit, offset)` pair.
    ///
    /// An absent limit means the caller did not ask for a page size.
    fn subset(&self) -> (Option<i32>, i32);

    /// Overwrites the limit.
    fn set_limit(&mut self, limit: i32);

    /// Overwrites the offset.
    fn set_offset(&mut self, offset: i32);

    /// Returns the named parameters the statement is executed with.
    ///
    /// The mapping includes the limit and offset under [`Self::keys`] as well
    /// as any filter fields.
    fn params(&self) -> NamedParams;

    /// Returns the reserved parameter names for limit and offset.
    fn keys(&self) -> ParamKeys {
        ParamKeys::default()
    }
}

/// Reserved parameter names used for limit and offset.
///
/// The same names are used as SQL placeholders and as query-string keys in
/// navigation links.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ParamKeys {
    /// Name of the limit parameter.
    pub limit: Cow<'static, str>,
    /// Name of the offset parameter.
    pub offset: Cow<'static, str>,
}

impl ParamKeys {
    /// Creates parameter keys with custom names.
    pub fn new(limit: impl Into<Cow<'static, str>>, offset: impl Into<Cow<'static, str>>) -> Self {
        Self {
            limit: limit.into(),
            offset: offset.into(),
        }
    }

    /// Short single-letter keys: `l` and `o`.
    pub fn short() -> Self {
        Self::new("l", "o")
    }

    /// Returns whether `name` is one of the reserved keys.
    #[inline]
    pub fn is_reserved(&self, name: &str) -> bool {
        name == self.limit || name == self.offset
    }
}

impl Default for ParamKeys {
    fn default() -> Self {
        Self::new("limit", "offset")
    }
}

/// Plain limit/offset arguments without filters.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListParams {
    /// Requested page size; `None` falls back to the executor default.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub limit: Option<i32>,
    /// Number of rows to skip.
    #[serde(default)]
    pub offset: i32,
    /// Parameter names the values are published under.
    #[serde(skip)]
    pub keys: ParamKeys,
}

impl ListParams {
    /// Creates arguments with an explicit limit and offset.
    pub fn new(limit: i32, offset: i32) -> Self {
        Self {
            limit: Some(limit),
            offset,
            keys: ParamKeys::default(),
        }
    }

    /// Sets the reserved parameter names.
    #[must_use]
    pub fn with_keys(mut self, keys: ParamKeys) -> Self {
        self.keys = keys;
        self
    }

    /// Attaches filters, producing [`FilteredArgs`].
    pub fn with_filters<F: FilterArgs>(self, filters: F) -> FilteredArgs<F> {
        FilteredArgs {
            list: self,
            filters,
        }
    }
}

impl WindowArgs for ListParams {
    fn subset(&self) -> (Option<i32>, i32) {
        (self.limit, self.offset)
    }

    fn set_limit(&mut self, limit: i32) {
        self.limit = Some(limit);
    }

    fn set_offset(&mut self, offset: i32) {
        self.offset = offset;
    }

    fn params(&self) -> NamedParams {
        NamedParams::new()
            .with(self.keys.limit.clone(), self.limit)
            .with(self.keys.offset.clone(), self.offset)
    }

    fn keys(&self) -> ParamKeys {
        self.keys.clone()
    }
}

/// Filter fields carried alongside the pagination arguments.
///
/// Filters are schema specific; the executor never inspects them.
pub trait FilterArgs {
    /// Returns the filter fields as named parameters.
    fn filter_params(&self) -> NamedParams;
}

impl FilterArgs for NamedParams {
    fn filter_params(&self) -> NamedParams {
        self.clone()
    }
}

impl FilterArgs for () {
    fn filter_params(&self) -> NamedParams {
        NamedParams::new()
    }
}

/// Pagination arguments combined with caller-defined filters.
///
/// A filter that reuses a reserved key is shadowed by the pagination value.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FilteredArgs<F> {
    /// Limit and offset.
    pub list: ListParams,
    /// Schema specific filter fields.
    pub filters: F,
}

impl<F: FilterArgs> FilteredArgs<F> {
    /// Creates filtered arguments.
    pub fn new(list: ListParams, filters: F) -> Self {
        Self { list, filters }
    }
}

impl<F: FilterArgs> WindowArgs for FilteredArgs<F> {
    fn subset(&self) -> (Option<i32>, i32) {
        self.list.subset()
    }

    fn set_limit(&mut self, limit: i32) {
        self.list.set_limit(limit);
    }

    fn set_offset(&mut self, offset: i32) {
        self.list.set_offset(offset);
    }

    fn params(&self) -> NamedParams {
        let mut params = self.filters.filter_params();
        params.merge(&self.list.params());
        params
    }

    fn keys(&self) -> ParamKeys {
        self.list.keys()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn list_params_publish_reserved_keys() {
        let params = ListParams::new(10, 20).params();
        assert_eq!(params.get("limit"), Some(&ParamValue::Int(10)));
        assert_eq!(params.get("offset"), Some(&ParamValue::Int(20)));
    }

    #[test]
    fn absent_limit_is_published_as_null() {
        let params = ListParams::default().params();
        assert_eq!(params.get("limit"), Some(&ParamValue::Null));
        assert_eq!(params.get("offset"), Some(&ParamValue::Int(0)));
    }

    #[test]
    fn short_keys_rename_parameters() {
        let args = ListParams::new(5, 0).with_keys(ParamKeys::short());
        let params = args.params();
        assert!(params.contains_key("l"));
        assert!(params.contains_key("o"));
        assert!(args.keys().is_reserved("l"));
        assert!(!args.keys().is_reserved("limit"));
    }

    #[test]
    fn filters_are_shadowed_by_pagination_values() {
        let filters = NamedParams::new().with("status", "open").with("limit", "x");
        let args = ListParams::new(4, 8).with_filters(filters);

        let params = args.params();
        assert_eq!(params.get("status"), Some(&ParamValue::from("open")));
        assert_eq!(params.get("limit"), Some(&ParamValue::Int(4)));
        assert_eq!(params.get("offset"), Some(&ParamValue::Int(8)));
    }

    #[test]
    fn setters_only_touch_pagination_fields() {
        let mut args = ListParams::new(4, 0).with_filters(NamedParams::new().with("q", "rust"));
        args.set_limit(5);
        args.set_offset(12);

        assert_eq!(args.subset(), (Some(5), 12));
        assert_eq!(args.filters.get("q"), Some(&ParamValue::from("rust")));
    }

    #[test]
    fn list_params_deserialize_with_defaults() {
        let args: ListParams = serde_json::from_str(r#"{"offset": 3}"#).unwrap();
        assert_eq!(args.subset(), (None, 3));
        assert_eq!(args.keys, ParamKeys::default());
    }
}
