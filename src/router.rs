//! Fragment routing state machine.
//!
//! ```text
//! fragment ─► parse ─┬─ same document ─────────────► scroll to anchor
//!                    ├─ "" ────────────────────────► rewrite to #latest
//!                    ├─ "latest" ──────────────────► MAIN (placeholder + changelog)
//!                    └─ post ─► LOADING ─► fetch ─┬─► MAIN + scroll
//!                                                 ├─► MESSAGE (not found)
//!                                                 └─► MESSAGE (error)
//! ```
//!
//! Routing is split around the only suspension point: [`Router::route`]
//! makes the synchronous decision and hands back a [`Pending`] fetch,
//! [`Router::complete`] applies its result. Every full navigation bumps a
//! generation counter and a result is applied only while its generation is
//! current, so the last navigation always wins.

use std::cell::RefCell;

use serde::Serialize;

use crate::fetch::{Fetch, FetchError};
use crate::markdown;
use crate::menu::Menu;
use crate::request::Request;
use crate::updates::Updates;
use crate::view::{Container, MessageKind, View};
use crate::{debug, log};

/// Route showing the recently-updated placeholder.
pub const LATEST_ROUTE: &str = "latest";

pub const NOT_FOUND_TITLE: &str = "Page not found";
pub const NOT_FOUND_BODY: &str = "The Page could not be found, please try again";
pub const UNKNOWN_ERROR_TITLE: &str = "Unknown error";
pub const UNKNOWN_ERROR_BODY: &str = "Please try reloading the page";

const DEFAULT_LATEST_HTML: &str =
    "<h1>Recently updated</h1>\n<p>Pick a post from the menu to start reading.</p>\n";

/// Commits listed on `#latest`.
pub const LATEST_COMMITS: usize = 20;

/// Where the router finds its content.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouterOptions {
    /// URL prefix of the Markdown posts.
    pub posts: String,
    /// URL of the JSON post index.
    pub index: String,
    /// URL of the JSON changelog.
    pub updates: String,
    /// Markup shown above the changelog on `#latest`.
    pub latest_html: String,
}

impl Default for RouterOptions {
    fn default() -> Self {
        Self {
            posts: "posts".to_owned(),
            index: "post_index.json".to_owned(),
            updates: "updates.json".to_owned(),
            latest_html: DEFAULT_LATEST_HTML.to_owned(),
        }
    }
}

impl RouterOptions {
    /// URL of the Markdown source for `request`.
    pub fn post_url(&self, request: &Request) -> String {
        let posts = self.posts.trim_end_matches('/');
        if posts.is_empty() {
            format!("{}.md", request.build_path())
        } else {
            format!("{posts}/{}.md", request.build_path())
        }
    }
}

/// How a navigation ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
    /// Anchor-only change on the displayed document.
    Scrolled,
    /// Empty route, rewritten to `#latest`.
    Redirected,
    /// Recently-updated page shown.
    Latest,
    /// Post rendered into MAIN.
    Rendered,
    /// Post does not exist.
    NotFound,
    /// Transport or server failure.
    Failed,
    /// A newer navigation started before the fetch finished.
    Superseded,
}

/// A fetch the driver has to perform.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pending {
    pub url: String,
    generation: u64,
    doc_path: String,
}

/// Result of the synchronous routing step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Step {
    Done(Outcome),
    Fetch(Pending),
}

/// Router state for one page session.
#[derive(Debug)]
pub struct Router {
    options: RouterOptions,
    menu: Menu,
    updates: Updates,
    current: Option<Request>,
    generation: u64,
}

impl Router {
    pub fn new(options: RouterOptions, menu: Menu) -> Self {
        Self {
            options,
            menu,
            updates: Updates::default(),
            current: None,
            generation: 0,
        }
    }

    pub fn options(&self) -> &RouterOptions {
        &self.options
    }

    pub fn menu(&self) -> &Menu {
        &self.menu
    }

    pub fn updates(&self) -> &Updates {
        &self.updates
    }

    /// Swap in a menu loaded after startup.
    ///
    /// A navigation may have happened before the menu arrived, so the
    /// current route is highlighted again.
    pub fn set_menu(&mut self, menu: Menu, view: &mut impl View) {
        self.menu = menu;
        if let Some(current) = &self.current {
            view.mark_active(&self.menu.active_ids(&current.path));
        }
    }

    /// Swap in a changelog loaded after startup, refreshing `#latest` if it
    /// is on screen.
    pub fn set_updates(&mut self, updates: Updates, view: &mut impl View) {
        self.updates = updates;
        if self
            .current
            .as_ref()
            .is_some_and(|current| current.first_segment() == LATEST_ROUTE)
        {
            view.set_main_content(&self.latest_html());
        }
    }

    /// Placeholder markup, followed by the changelog when there is one.
    pub fn latest_html(&self) -> String {
        if self.updates.is_empty() {
            return self.options.latest_html.clone();
        }
        format!(
            "{}{}",
            self.options.latest_html,
            self.updates.to_html(LATEST_COMMITS)
        )
    }

    /// The request of the latest navigation.
    pub fn current(&self) -> Option<&Request> {
        self.current.as_ref()
    }

    /// Decide what a fragment change means and update the view accordingly.
    pub fn route(&mut self, fragment: &str, view: &mut impl View) -> Step {
        let request = Request::parse(fragment);

        if self
            .current
            .as_ref()
            .is_some_and(|current| current.same_document(&request))
        {
            debug!("router"; "anchor change within {}", request.build_path());
            if let Some(anchor) = request.anchor() {
                view.scroll_to_anchor(&anchor);
            }
            self.current = Some(request);
            return Step::Done(Outcome::Scrolled);
        }

        self.generation += 1;
        view.mark_active(&self.menu.active_ids(&request.path));

        let step = match request.first_segment() {
            "" => {
                // the rewritten fragment starts the real navigation
                self.current = None;
                view.set_fragment(LATEST_ROUTE);
                return Step::Done(Outcome::Redirected);
            }
            LATEST_ROUTE => {
                view.set_main_content(&self.latest_html());
                view.show_container(Container::Main);
                Step::Done(Outcome::Latest)
            }
            _ => {
                view.show_container(Container::Loading);
                let url = self.options.post_url(&request);
                debug!("router"; "fetching {}", url);
                Step::Fetch(Pending {
                    url,
                    generation: self.generation,
                    doc_path: request.build_path(),
                })
            }
        };

        self.current = Some(request);
        step
    }

    /// Apply the result of a fetch started by [`Router::route`].
    pub fn complete(
        &mut self,
        pending: Pending,
        result: Result<String, FetchError>,
        view: &mut impl View,
    ) -> Outcome {
        if pending.generation != self.generation {
            debug!("router"; "dropping superseded response for {}", pending.url);
            return Outcome::Superseded;
        }

        match result {
            Ok(text) => {
                view.set_main_content(&markdown::render(&text, &pending.doc_path));
                view.show_container(Container::Main);
                // anchors may have changed while the fetch was in flight
                if let Some(anchor) = self.current.as_ref().and_then(Request::anchor) {
                    view.scroll_to_anchor(&anchor);
                }
                Outcome::Rendered
            }
            Err(e) if e.is_not_found() => {
                view.set_message(MessageKind::Warning, NOT_FOUND_TITLE, NOT_FOUND_BODY);
                view.show_container(Container::Message);
                Outcome::NotFound
            }
            Err(e) => {
                log!("error"; "failed to load {}: {}", pending.url, e);
                view.set_message(MessageKind::Danger, UNKNOWN_ERROR_TITLE, UNKNOWN_ERROR_BODY);
                view.show_container(Container::Message);
                Outcome::Failed
            }
        }
    }
}

/// Run one navigation end to end.
///
/// Borrows of the router and the view are released across the fetch, so
/// another navigation may run while this one is waiting.
pub async fn navigate<F, V>(
    router: &RefCell<Router>,
    view: &RefCell<V>,
    fetcher: &F,
    fragment: &str,
) -> Outcome
where
    F: Fetch,
    V: View,
{
    let step = router.borrow_mut().route(fragment, &mut *view.borrow_mut());
    match step {
        Step::Done(outcome) => outcome,
        Step::Fetch(pending) => {
            let result = fetcher.fetch(&pending.url).await;
            router
                .borrow_mut()
                .complete(pending, result, &mut *view.borrow_mut())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::updates::{Change, ChangeKind};
    use crate::view::MemoryView;
    use rustc_hash::FxHashMap;

    /// Serves a fixed set of documents and records every request.
    #[derive(Default)]
    struct FakeFetcher {
        documents: FxHashMap<String, Result<String, FetchError>>,
        requests: RefCell<Vec<String>>,
    }

    impl FakeFetcher {
        fn with(mut self, url: &str, result: Result<&str, FetchError>) -> Self {
            self.documents
                .insert(url.to_owned(), result.map(str::to_owned));
            self
        }

        fn requests(&self) -> Vec<String> {
            self.requests.borrow().clone()
        }
    }

    impl Fetch for FakeFetcher {
        async fn fetch(&self, url: &str) -> Result<String, FetchError> {
            self.requests.borrow_mut().push(url.to_owned());
            self.documents
                .get(url)
                .cloned()
                .unwrap_or(Err(FetchError::Status(404)))
        }
    }

    fn setup() -> (RefCell<Router>, RefCell<MemoryView>, FakeFetcher) {
        let menu = Menu::build(["guides", "guides/setup", "guides/other"]);
        let router = Router::new(RouterOptions::default(), menu);
        let fetcher = FakeFetcher::default()
            .with(
                "posts/guides/setup.md",
                Ok("# Setup\n\n## Installation\n\nRun it[^1].\n\n[^1]: Really.\n"),
            )
            .with("posts/guides/other.md", Ok("# Other\n"))
            .with("posts/broken.md", Err(FetchError::Status(500)))
            .with(
                "posts/offline.md",
                Err(FetchError::Transport("unreachable".into())),
            );
        (RefCell::new(router), RefCell::new(MemoryView::new()), fetcher)
    }

    #[tokio::test]
    async fn test_render_post() {
        let (router, view, fetcher) = setup();

        let outcome = navigate(&router, &view, &fetcher, "#guides/setup").await;

        assert_eq!(outcome, Outcome::Rendered);
        assert_eq!(fetcher.requests(), vec!["posts/guides/setup.md"]);
        let view = view.borrow();
        assert_eq!(view.visible, Some(Container::Main));
        assert!(view.main.contains(r#"id="guides/setup:Installation""#));
        assert_eq!(view.active, vec!["guides", "guides/setup"]);
    }

    #[tokio::test]
    async fn test_anchor_change_scrolls_without_fetch() {
        let (router, view, fetcher) = setup();
        navigate(&router, &view, &fetcher, "#guides/setup").await;

        let outcome = navigate(&router, &view, &fetcher, "#guides/setup:Installation").await;

        assert_eq!(outcome, Outcome::Scrolled);
        assert_eq!(fetcher.requests().len(), 1);
        assert_eq!(view.borrow().scrolls, vec!["guides/setup:Installation"]);
    }

    #[tokio::test]
    async fn test_footnote_navigation_scrolls() {
        let (router, view, fetcher) = setup();
        navigate(&router, &view, &fetcher, "#guides/setup").await;

        navigate(&router, &view, &fetcher, "#guides/setup^1").await;
        navigate(&router, &view, &fetcher, "#guides/setup^ref1").await;

        assert_eq!(fetcher.requests().len(), 1);
        assert_eq!(
            view.borrow().scrolls,
            vec!["guides/setup^1", "guides/setup^ref1"]
        );
    }

    #[tokio::test]
    async fn test_document_change_fetches_once() {
        let (router, view, fetcher) = setup();
        navigate(&router, &view, &fetcher, "#guides/setup").await;

        navigate(&router, &view, &fetcher, "#guides/other").await;

        assert_eq!(
            fetcher.requests(),
            vec!["posts/guides/setup.md", "posts/guides/other.md"]
        );
        assert_eq!(view.borrow().active, vec!["guides", "guides/other"]);
    }

    #[tokio::test]
    async fn test_cold_load_with_anchor_scrolls_after_render() {
        let (router, view, fetcher) = setup();

        navigate(&router, &view, &fetcher, "#guides/setup:Installation").await;

        assert_eq!(view.borrow().scrolls, vec!["guides/setup:Installation"]);
    }

    #[tokio::test]
    async fn test_empty_fragment_redirects_to_latest() {
        let (router, view, fetcher) = setup();

        let outcome = navigate(&router, &view, &fetcher, "#").await;

        assert_eq!(outcome, Outcome::Redirected);
        assert_eq!(view.borrow().fragment.as_deref(), Some(LATEST_ROUTE));
        assert!(fetcher.requests().is_empty());

        let outcome = navigate(&router, &view, &fetcher, "#latest").await;
        assert_eq!(outcome, Outcome::Latest);
        let view = view.borrow();
        assert_eq!(view.visible, Some(Container::Main));
        assert!(view.main.contains("Recently updated"));
    }

    #[test]
    fn test_repeated_empty_fragment_redirects_again() {
        let mut router = Router::new(RouterOptions::default(), Menu::default());
        let mut view = MemoryView::new();

        assert_eq!(router.route("", &mut view), Step::Done(Outcome::Redirected));
        assert_eq!(router.route("#", &mut view), Step::Done(Outcome::Redirected));
        assert!(router.current().is_none());
    }

    #[tokio::test]
    async fn test_not_found_shows_warning() {
        let (router, view, fetcher) = setup();

        let outcome = navigate(&router, &view, &fetcher, "#missing/post").await;

        assert_eq!(outcome, Outcome::NotFound);
        let view = view.borrow();
        assert_eq!(view.visible, Some(Container::Message));
        let message = view.message.as_ref().unwrap();
        assert_eq!(message.kind, MessageKind::Warning);
        assert_eq!(message.title, NOT_FOUND_TITLE);
    }

    #[tokio::test]
    async fn test_other_failures_show_generic_error() {
        for fragment in ["#broken", "#offline"] {
            let (router, view, fetcher) = setup();

            let outcome = navigate(&router, &view, &fetcher, fragment).await;

            assert_eq!(outcome, Outcome::Failed);
            let view = view.borrow();
            assert_eq!(view.visible, Some(Container::Message));
            let message = view.message.as_ref().unwrap();
            assert_eq!(message.kind, MessageKind::Danger);
            assert_eq!(message.title, UNKNOWN_ERROR_TITLE);
        }
    }

    #[test]
    fn test_route_shows_loading_while_fetching() {
        let mut router = Router::new(RouterOptions::default(), Menu::default());
        let mut view = MemoryView::new();

        let step = router.route("#a/b", &mut view);

        assert!(matches!(step, Step::Fetch(ref p) if p.url == "posts/a/b.md"));
        assert_eq!(view.visible, Some(Container::Loading));
    }

    #[test]
    fn test_superseded_fetch_is_ignored() {
        let mut router = Router::new(RouterOptions::default(), Menu::default());
        let mut view = MemoryView::new();

        let Step::Fetch(first) = router.route("#first", &mut view) else {
            panic!("expected fetch");
        };
        let Step::Fetch(second) = router.route("#second", &mut view) else {
            panic!("expected fetch");
        };

        // second answers before first
        let outcome = router.complete(second, Ok("# Second".into()), &mut view);
        assert_eq!(outcome, Outcome::Rendered);
        let outcome = router.complete(first, Ok("# First".into()), &mut view);
        assert_eq!(outcome, Outcome::Superseded);

        assert!(view.main.contains("Second"));
        assert!(!view.main.contains("First"));
    }

    #[test]
    fn test_latest_supersedes_pending_fetch() {
        let mut router = Router::new(RouterOptions::default(), Menu::default());
        let mut view = MemoryView::new();

        let Step::Fetch(pending) = router.route("#slow", &mut view) else {
            panic!("expected fetch");
        };
        router.route("#latest", &mut view);

        let outcome = router.complete(pending, Err(FetchError::Status(500)), &mut view);
        assert_eq!(outcome, Outcome::Superseded);
        assert_eq!(view.visible, Some(Container::Main));
        assert!(view.message.is_none());
    }

    #[test]
    fn test_anchor_change_during_fetch_is_honored() {
        let mut router = Router::new(RouterOptions::default(), Menu::default());
        let mut view = MemoryView::new();

        let Step::Fetch(pending) = router.route("#doc", &mut view) else {
            panic!("expected fetch");
        };
        assert_eq!(
            router.route("#doc:Later", &mut view),
            Step::Done(Outcome::Scrolled)
        );

        router.complete(pending, Ok("# Later".into()), &mut view);
        assert_eq!(view.scrolls, vec!["doc:Later"]);
    }

    #[test]
    fn test_latest_lists_updates() {
        let mut router = Router::new(RouterOptions::default(), Menu::default());
        let mut view = MemoryView::new();

        let mut updates = Updates::default();
        updates.record(1_700_000_000, [Change::new(ChangeKind::New, "guides/setup.md")]);
        router.set_updates(updates, &mut view);
        assert!(view.main.is_empty());

        assert_eq!(router.route("#latest", &mut view), Step::Done(Outcome::Latest));
        assert!(view.main.starts_with("<h1>Recently updated</h1>"));
        assert!(view.main.contains(r##"<a href="#guides/setup">guides/setup</a>"##));
    }

    #[test]
    fn test_latest_falls_back_to_placeholder() {
        let mut router = Router::new(RouterOptions::default(), Menu::default());
        let mut view = MemoryView::new();

        router.route("#latest", &mut view);

        assert_eq!(view.main, DEFAULT_LATEST_HTML);
        assert!(!view.main.contains("updates"));
    }

    #[test]
    fn test_late_updates_refresh_latest() {
        let mut router = Router::new(RouterOptions::default(), Menu::default());
        let mut view = MemoryView::new();
        router.route("#latest", &mut view);

        let mut updates = Updates::default();
        updates.record(1_700_000_000, [Change::new(ChangeKind::Content, "a.md")]);
        router.set_updates(updates, &mut view);

        assert!(view.main.contains(r#"class="update-list""#));
    }

    #[test]
    fn test_late_menu_marks_current_route() {
        let mut router = Router::new(RouterOptions::default(), Menu::default());
        let mut view = MemoryView::new();

        let Step::Fetch(pending) = router.route("#guides/setup", &mut view) else {
            panic!("expected fetch");
        };
        assert!(view.active.is_empty());

        let menu = Menu::build(["guides", "guides/setup", "other"]);
        router.set_menu(menu, &mut view);
        assert_eq!(view.active, vec!["guides", "guides/setup"]);

        router.complete(pending, Ok("# Setup".into()), &mut view);
        assert_eq!(view.active, vec!["guides", "guides/setup"]);
    }

    #[test]
    fn test_menu_before_any_route_marks_nothing() {
        let mut router = Router::new(RouterOptions::default(), Menu::default());
        let mut view = MemoryView::new();

        router.set_menu(Menu::build(["a"]), &mut view);
        assert!(view.active.is_empty());
        assert_eq!(router.menu().len(), 1);
    }

    #[test]
    fn test_post_url_prefix() {
        let request = Request::parse("#a/b");
        let mut options = RouterOptions::default();
        assert_eq!(options.post_url(&request), "posts/a/b.md");

        options.posts = "content/".into();
        assert_eq!(options.post_url(&request), "content/a/b.md");

        options.posts = String::new();
        assert_eq!(options.post_url(&request), "a/b.md");
    }
}
