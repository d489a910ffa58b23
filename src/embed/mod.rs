//! Embedded scaffold files written by `hashpage init`.
//!
//! ```ignore
//! use embed::init::{INDEX_HTML, ShellVars};
//!
//! let html = INDEX_HTML.render(&ShellVars::from_config(&config));
//! ```

mod template;

pub use template::{Template, TemplateVars};

pub mod init {
    use super::{Template, TemplateVars};
    use crate::config::SiteConfig;
    use hashpage::utils::html::{escape, escape_attr};

    /// Variables for the page shell.
    pub struct ShellVars {
        pub title: String,
        pub posts: String,
        pub index: String,
        pub updates: String,
        pub latest: String,
    }

    impl ShellVars {
        pub fn from_config(config: &SiteConfig) -> Self {
            let options = config.router_options();
            Self {
                title: config.site.title.clone(),
                posts: options.posts,
                index: options.index,
                updates: options.updates,
                latest: options.latest_html,
            }
        }
    }

    impl TemplateVars for ShellVars {
        fn apply(&self, content: &str) -> String {
            content
                .replace("__TITLE__", &escape(&self.title))
                .replace("__POSTS__", &escape_attr(&self.posts))
                .replace("__INDEX__", &escape_attr(&self.index))
                .replace("__UPDATES__", &escape_attr(&self.updates))
                .replace("__LATEST__", &self.latest)
        }
    }

    /// Page shell honoring the DOM contract of the browser client.
    pub const INDEX_HTML: Template<ShellVars> = Template::new(include_str!("init/index.html"));

    /// Variables for site.toml.
    pub struct ConfigVars {
        pub title: String,
        pub posts: String,
        pub index: String,
        pub updates: String,
        pub diffs: String,
    }

    impl ConfigVars {
        pub fn from_config(config: &SiteConfig) -> Self {
            Self {
                title: config.site.title.clone(),
                posts: config.build.posts.clone(),
                index: config.build.index.clone(),
                updates: config.build.updates.clone(),
                diffs: config.build.diffs.clone(),
            }
        }
    }

    impl TemplateVars for ConfigVars {
        fn apply(&self, content: &str) -> String {
            content
                .replace("__TITLE__", &toml_string(&self.title))
                .replace("__POSTS__", &toml_string(&self.posts))
                .replace("__INDEX__", &toml_string(&self.index))
                .replace("__UPDATES__", &toml_string(&self.updates))
                .replace("__DIFFS__", &toml_string(&self.diffs))
        }
    }

    fn toml_string(s: &str) -> String {
        toml::Value::String(s.to_owned()).to_string()
    }

    pub const SITE_TOML: Template<ConfigVars> = Template::new(include_str!("init/site.toml"));

    /// Variables for the first post.
    pub struct WelcomeVars {
        pub posts: String,
    }

    impl TemplateVars for WelcomeVars {
        fn apply(&self, content: &str) -> String {
            content.replace("__POSTS__", self.posts.trim_start_matches("./"))
        }
    }

    pub const WELCOME_MD: Template<WelcomeVars> = Template::new(include_str!("init/welcome.md"));
}
