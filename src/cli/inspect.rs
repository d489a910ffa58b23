//! `hashpage inspect`: run the router headlessly.
//!
//! Posts, the index and the changelog are read from the site directory the
//! way a static file server would serve them, and the resulting page state
//! is printed as JSON.

use std::cell::RefCell;

use anyhow::{Context, Result};
use serde::Serialize;

use super::InspectArgs;
use crate::config::SiteConfig;
use hashpage::debug;
use hashpage::fetch::{DirFetcher, Fetch};
use hashpage::menu::Menu;
use hashpage::request::Request;
use hashpage::router::{Outcome, Router, navigate};
use hashpage::updates::Updates;
use hashpage::view::MemoryView;

/// Everything a browser would show after routing one fragment.
#[derive(Debug, Serialize)]
pub struct Inspection {
    /// Fragment that was finally routed (after a redirect).
    pub fragment: String,
    pub request: Request,
    pub outcome: Outcome,
    pub view: MemoryView,
}

pub fn inspect(config: &SiteConfig, args: &InspectArgs) -> Result<()> {
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("Failed to start async runtime")?;

    let inspection = runtime.block_on(run(config, &args.fragment))?;

    let json = if args.pretty {
        serde_json::to_string_pretty(&inspection)?
    } else {
        serde_json::to_string(&inspection)?
    };
    println!("{json}");
    Ok(())
}

/// Load the menu and the changelog, then route `fragment`, following one
/// redirect.
pub async fn run(config: &SiteConfig, fragment: &str) -> Result<Inspection> {
    let fetcher = DirFetcher::new(config.root());
    let options = config.router_options();

    let menu = match fetcher.fetch(&options.index).await {
        Ok(json) => Menu::from_json(&json)
            .with_context(|| format!("Invalid post index '{}'", options.index))?,
        Err(e) if e.is_not_found() => {
            debug!("router"; "no post index at {}, menu is empty", options.index);
            Menu::default()
        }
        Err(e) => return Err(e).context("Failed to load post index"),
    };

    let updates = match fetcher.fetch(&options.updates).await {
        Ok(json) => Updates::from_json(&json)
            .with_context(|| format!("Invalid changelog '{}'", options.updates))?,
        Err(e) if e.is_not_found() => {
            debug!("router"; "no changelog at {}", options.updates);
            Updates::default()
        }
        Err(e) => return Err(e).context("Failed to load changelog"),
    };

    let view = RefCell::new(MemoryView::new());
    let mut router = Router::new(options, menu);
    router.set_updates(updates, &mut *view.borrow_mut());
    let router = RefCell::new(router);

    let mut fragment = fragment.to_owned();
    let mut outcome = navigate(&router, &view, &fetcher, &fragment).await;

    if outcome == Outcome::Redirected {
        let redirect = view.borrow().fragment.clone();
        if let Some(next) = redirect {
            debug!("router"; "following redirect to #{}", next);
            fragment = format!("#{next}");
            outcome = navigate(&router, &view, &fetcher, &fragment).await;
        }
    }

    Ok(Inspection {
        request: Request::parse(&fragment),
        fragment,
        outcome,
        view: view.into_inner(),
    })
}
