//! Browser driver.
//!
//! Startup checks the page shell, reads the client options from the body
//! dataset, loads the post index into `#menuList` and the changelog for
//! `#latest`, then routes the current fragment and every later
//! `hashchange`.

mod dom;
mod http;

pub use dom::DomView;
pub use http::HttpFetcher;

use std::cell::RefCell;
use std::rc::Rc;

use thiserror::Error;
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::spawn_local;
use web_sys::{Document, HashChangeEvent, Window};

use crate::fetch::Fetch;
use crate::menu::Menu;
use crate::router::{Router, RouterOptions, navigate};
use crate::updates::Updates;
use crate::view::Container;
use crate::{debug, log};

const MENU_ID: &str = "menuList";
const LATEST_TEMPLATE_ID: &str = "latest-template";

#[derive(Debug, Error)]
enum StartError {
    #[error("no window available")]
    NoWindow,
    #[error("no document available")]
    NoDocument,
    #[error("page shell is missing #{0}")]
    MissingElement(String),
    #[error("failed to listen for hashchange: {0}")]
    Listener(String),
}

type Shared<T> = Rc<RefCell<T>>;

#[wasm_bindgen(start)]
pub fn start() {
    if let Err(e) = run() {
        log!("error"; "{}", e);
    }
}

fn run() -> Result<(), StartError> {
    let window = web_sys::window().ok_or(StartError::NoWindow)?;
    let document = window.document().ok_or(StartError::NoDocument)?;

    let required = Container::ALL
        .iter()
        .map(|c| c.element_id())
        .chain([MENU_ID.to_owned()]);
    for id in required {
        if document.get_element_by_id(&id).is_none() {
            return Err(StartError::MissingElement(id));
        }
    }

    let options = client_options(&document);
    debug!("router"; "posts at {}, index at {}", options.posts, options.index);

    let router: Shared<Router> = Rc::new(RefCell::new(Router::new(options, Menu::default())));
    let view: Shared<DomView> = Rc::new(RefCell::new(DomView::new(
        window.clone(),
        document.clone(),
    )));

    listen_hashchange(&window, &router, &view)?;

    spawn_local(async move {
        load_menu(&router, &view, &document).await;
        load_updates(&router, &view).await;
        let fragment = current_fragment(&window);
        route(&router, &view, &fragment).await;
    });
    Ok(())
}

/// Client defaults, overridden by `<body data-…>` and the latest template.
fn client_options(document: &Document) -> RouterOptions {
    let mut options = RouterOptions::default();

    if let Some(body) = document.body() {
        if let Some(posts) = body.get_attribute("data-posts") {
            options.posts = posts;
        }
        if let Some(index) = body.get_attribute("data-index").filter(|s| !s.is_empty()) {
            options.index = index;
        }
        if let Some(updates) = body.get_attribute("data-updates").filter(|s| !s.is_empty()) {
            options.updates = updates;
        }
    }
    if let Some(template) = document.get_element_by_id(LATEST_TEMPLATE_ID) {
        options.latest_html = template.inner_html();
    }
    options
}

/// Fetch the post index and render the menu. Failures leave it empty.
async fn load_menu(router: &Shared<Router>, view: &Shared<DomView>, document: &Document) {
    let index = router.borrow().options().index.clone();

    let menu = match HttpFetcher.fetch(&index).await {
        Ok(json) => match Menu::from_json(&json) {
            Ok(menu) => menu,
            Err(e) => {
                log!("error"; "invalid post index {}: {}", index, e);
                return;
            }
        },
        Err(e) => {
            log!("error"; "failed to load post index {}: {}", index, e);
            return;
        }
    };

    debug!("router"; "menu loaded with {} entries", menu.len());
    if let Some(list) = document.get_element_by_id(MENU_ID) {
        list.set_inner_html(&menu.to_html());
    }
    router
        .borrow_mut()
        .set_menu(menu, &mut *view.borrow_mut());
}

/// Fetch the changelog. Without it `#latest` shows the template alone.
async fn load_updates(router: &Shared<Router>, view: &Shared<DomView>) {
    let url = router.borrow().options().updates.clone();

    let updates = match HttpFetcher.fetch(&url).await {
        Ok(json) => match Updates::from_json(&json) {
            Ok(updates) => updates,
            Err(e) => {
                log!("error"; "invalid changelog {}: {}", url, e);
                return;
            }
        },
        Err(e) if e.is_not_found() => {
            debug!("router"; "no changelog at {}", url);
            return;
        }
        Err(e) => {
            log!("error"; "failed to load changelog {}: {}", url, e);
            return;
        }
    };

    debug!("router"; "changelog loaded with {} commits", updates.len());
    router
        .borrow_mut()
        .set_updates(updates, &mut *view.borrow_mut());
}

fn listen_hashchange(
    window: &Window,
    router: &Shared<Router>,
    view: &Shared<DomView>,
) -> Result<(), StartError> {
    let on_change = {
        let window = window.clone();
        let router = router.clone();
        let view = view.clone();
        Closure::<dyn FnMut(HashChangeEvent)>::new(move |_event: HashChangeEvent| {
            let fragment = current_fragment(&window);
            let router = router.clone();
            let view = view.clone();
            spawn_local(async move {
                route(&router, &view, &fragment).await;
            });
        })
    };

    window
        .add_event_listener_with_callback("hashchange", on_change.as_ref().unchecked_ref())
        .map_err(|e| StartError::Listener(format!("{e:?}")))?;
    // lives as long as the page
    on_change.forget();
    Ok(())
}

/// `location.hash`, percent-decoded.
fn current_fragment(window: &Window) -> String {
    let hash = window.location().hash().unwrap_or_default();
    percent_encoding::percent_decode_str(&hash)
        .decode_utf8_lossy()
        .into_owned()
}

async fn route(router: &Shared<Router>, view: &Shared<DomView>, fragment: &str) {
    let outcome = navigate(&**router, &**view, &HttpFetcher, fragment).await;
    debug!("router"; "{} -> {:?}", fragment, outcome);
}
