#![forbid(unsafe_code)]
#![cfg_attr(docsrs, feature(doc_cfg))]
#![doc = include_str!("../README.md")]

pub mod args;
mod error;
pub mod links;
pub mod window;

#[cfg(test)]
pub(crate) mod mock;

pub use crate::args::{
    FilterArgs, FilteredArgs, ListParams, NamedParams, ParamKeys, ParamValue, WindowArgs,
};
pub use crate::error::{WindowError, WindowResult};
pub use crate::links::{LinkBuilder, NavigationLinks, Page, PagedQuery, build_links};
pub use crate::window::{
    DEFAULT_LIMIT, LimitPolicy, MAX_LIMIT, Prepare, PreparedStatement, SelectInto, WindowBounds,
    WindowOptions, WindowState, WindowedQuery,
};
