//! Windowed execution combined with link generation.

use serde::{Deserialize, Serialize};
use url::Url;

use super::{NavigationLinks, build_links};
use crate::args::WindowArgs;
use crate::error::WindowResult;
use crate::window::{PreparedStatement, SelectInto, WindowState, WindowedQuery};

/// A window of items ready to be returned from an API.
///
/// Serializes as `{"items": [...], "previous": "...", "next": "..."}` with
/// absent links omitted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Page<T> {
    /// Items in this window.
    pub items: Vec<T>,
    /// Links to the adjacent windows.
    #[serde(flatten)]
    pub links: NavigationLinks,
}

impl<T> Page<T> {
    /// Creates a page.
    pub fn new(items: Vec<T>, links: NavigationLinks) -> Self {
        Self { items, links }
    }

    /// Creates a page without items or links.
    pub fn empty() -> Self {
        Self::new(Vec::new(), NavigationLinks::default())
    }

    /// Maps the items to a different type, keeping the links.
    pub fn map<U, F>(self, f: F) -> Page<U>
    where
        F: FnMut(T) -> U,
    {
        Page {
            items: self.items.into_iter().map(f).collect(),
            links: self.links,
        }
    }
}

/// A [`WindowedQuery`] that also produces navigation links.
///
/// After every successful select the links are rebuilt from the new window
/// state, the argument's filter parameters, and the argument's reserved keys.
#[derive(Debug)]
pub struct PagedQuery<S: PreparedStatement> {
    window: WindowedQuery<S>,
    endpoint: Url,
    links: NavigationLinks,
}

impl<S: PreparedStatement> PagedQuery<S> {
    /// Creates a paged query over `window` whose links point at `endpoint`.
    pub fn new(window: WindowedQuery<S>, endpoint: Url) -> Self {
        Self {
            window,
            endpoint,
            links: NavigationLinks::default(),
        }
    }

    /// Selects one window and rebuilds the links.
    pub async fn select<T, A>(
        &mut self,
        rows: &mut Vec<T>,
        args: &mut A,
    ) -> WindowResult<&NavigationLinks, S::Error>
    where
        S: SelectInto<T>,
        A: WindowArgs + ?Sized,
    {
        self.window.select(rows, args).await?;
        Ok(self.refresh_links(args))
    }

    /// Selects the previous window and rebuilds the links.
    pub async fn select_previous<T, A>(
        &mut self,
        rows: &mut Vec<T>,
        args: &mut A,
    ) -> WindowResult<&NavigationLinks, S::Error>
    where
        S: SelectInto<T>,
        A: WindowArgs + ?Sized,
    {
        self.window.select_previous(rows, args).await?;
        Ok(self.refresh_links(args))
    }

    /// Selects the next window and rebuilds the links.
    pub async fn select_next<T, A>(
        &mut self,
        rows: &mut Vec<T>,
        args: &mut A,
    ) -> WindowResult<&NavigationLinks, S::Error>
    where
        S: SelectInto<T>,
        A: WindowArgs + ?Sized,
    {
        self.window.select_next(rows, args).await?;
        Ok(self.refresh_links(args))
    }

    fn refresh_links<A>(&mut self, args: &A) -> &NavigationLinks
    where
        A: WindowArgs + ?Sized,
    {
        let filters = args.params();
        self.links = build_links(&self.endpoint, &filters, self.window.state(), &args.keys());
        &self.links
    }

    /// Returns the links built by the most recent select.
    #[inline]
    pub fn links(&self) -> &NavigationLinks {
        &self.links
    }

    /// Returns the window state of the most recent select.
    #[inline]
    pub fn state(&self) -> &WindowState {
        self.window.state()
    }

    /// Returns the wrapped executor.
    #[inline]
    pub fn window(&self) -> &WindowedQuery<S> {
        &self.window
    }

    /// Packages `items` with the current links.
    pub fn page<T>(&self, items: Vec<T>) -> Page<T> {
        Page::new(items, self.links.clone())
    }

    /// Releases the underlying statement.
    pub fn close(&mut self) {
        self.window.close();
    }
}
