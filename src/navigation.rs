//! Routes and navigation requests.
//!
//! Routes mirror the dashboard's URL layout so they can be logged, passed on
//! the command line and remembered between sessions.

use std::fmt;
use std::str::FromStr;

use crate::model::{ColorId, StoreId};

/// Path segment that opens a color form in create mode.
const NEW_SEGMENT: &str = "new";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Route {
    /// Store overview: `/`
    Stores,
    /// Store landing page: `/{store}`
    Store(StoreId),
    /// Color listing: `/{store}/colors`
    Colors(StoreId),
    /// Color form in create mode: `/{store}/colors/new`
    NewColor(StoreId),
    /// Color form in edit mode: `/{store}/colors/{color}`
    EditColor(StoreId, ColorId),
}

impl Route {
    pub fn path(&self) -> String {
        match self {
            Self::Stores => "/".to_string(),
            Self::Store(store) => format!("/{store}"),
            Self::Colors(store) => format!("/{store}/colors"),
            Self::NewColor(store) => format!("/{store}/colors/{NEW_SEGMENT}"),
            Self::EditColor(store, color) => format!("/{store}/colors/{color}"),
        }
    }

    /// The store this route is scoped to, if any.
    pub const fn store(&self) -> Option<&StoreId> {
        match self {
            Self::Stores => None,
            Self::Store(store)
            | Self::Colors(store)
            | Self::NewColor(store)
            | Self::EditColor(store, _) => Some(store),
        }
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.path())
    }
}

impl FromStr for Route {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let segments: Vec<&str> = s
            .trim()
            .split('/')
            .filter(|segment| !segment.is_empty())
            .collect();

        match segments.as_slice() {
            [] => Ok(Self::Stores),
            [store] => Ok(Self::Store(StoreId::new(*store))),
            [store, "colors"] => Ok(Self::Colors(StoreId::new(*store))),
            [store, "colors", NEW_SEGMENT] => Ok(Self::NewColor(StoreId::new(*store))),
            [store, "colors", color] => {
                Ok(Self::EditColor(StoreId::new(*store), ColorId::new(*color)))
            }
            _ => Err(format!("Unknown route: {s}")),
        }
    }
}

/// A navigation request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Navigation {
    /// Client-side transition within the current store.
    Push(Route),
    /// Tear down all screens and rebuild the application for the route.
    Hard(Route),
}

impl Navigation {
    pub const fn route(&self) -> &Route {
        match self {
            Self::Push(route) | Self::Hard(route) => route,
        }
    }
}
