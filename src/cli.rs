use clap::Parser;

use crate::model::StoreId;
use crate::navigation::Route;

#[derive(Parser, Debug)]
#[command(name = "storedash", version, about = "Terminal dashboard for managing store entities")]
pub struct Args {
    /// Backend base URL (e.g., "http://localhost:3000")
    #[arg(short, long)]
    pub api_url: Option<String>,

    /// Store to open on startup
    #[arg(short, long)]
    pub store: Option<String>,

    /// Route to open on startup (e.g., "/s1/colors/new"); takes precedence over --store
    #[arg(short, long)]
    pub route: Option<Route>,
}

impl Args {
    /// Starting route: `--route`, then `--store`, then the store opened last time.
    pub fn initial_route(&self, last_store: Option<&str>) -> Route {
        if let Some(route) = &self.route {
            return route.clone();
        }
        match self.store.as_deref().or(last_store) {
            Some(store) => Route::Store(StoreId::new(store)),
            None => Route::Stores,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::ColorId;

    #[test]
    fn test_route_argument() {
        let args = Args::parse_from(["storedash", "--route", "/s1/colors/c1"]);
        assert_eq!(
            args.initial_route(None),
            Route::EditColor(StoreId::new("s1"), ColorId::new("c1"))
        );
    }

    #[test]
    fn test_store_argument_overrides_last_store() {
        let args = Args::parse_from(["storedash", "--store", "s2"]);
        assert_eq!(args.initial_route(Some("s1")), Route::Store(StoreId::new("s2")));

        let args = Args::parse_from(["storedash"]);
        assert_eq!(args.initial_route(Some("s1")), Route::Store(StoreId::new("s1")));
        assert_eq!(args.initial_route(None), Route::Stores);
    }
}
