use serde::Serialize;
use tera::Context;

use crate::{errors::AppError, scroll::SCROLL_THRESHOLD_PX, TEMPLATES};

/// When a script tag is emitted relative to page content.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScriptStrategy {
    /// Blocking `<script>` in `<head>`, loaded before the page renders.
    BeforeInteractive,
    /// Deferred `<script>` at the end of `<body>`.
    AfterInteractive,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Script {
    pub src: String,
    pub strategy: ScriptStrategy,
}

#[derive(Serialize)]
struct ScriptTag<'a> {
    src: &'a str,
    defer: bool,
}

/// The page shell every HTML page is rendered inside.
#[derive(Debug, Clone)]
pub struct RootLayout {
    pub title: String,
    pub lang: String,
    pub body_class: String,
    scripts: Vec<Script>,
}

impl Default for RootLayout {
    fn default() -> Self {
        RootLayout::new("RENTALL")
            .with_script(
                "https://code.jquery.com/jquery-3.6.0.min.js",
                ScriptStrategy::BeforeInteractive,
            )
            .with_script(
                "https://cdn.jsdelivr.net/npm/bootstrap@5.3.0/dist/js/bootstrap.bundle.min.js",
                ScriptStrategy::BeforeInteractive,
            )
            .with_script(
                "https://cdn.jsdelivr.net/npm/aos@2.3.4/dist/aos.js",
                ScriptStrategy::AfterInteractive,
            )
            .with_script(
                "https://cdn.jsdelivr.net/npm/swiper@11/swiper-bundle.min.js",
                ScriptStrategy::AfterInteractive,
            )
            .with_script("/static/js/main.js", ScriptStrategy::AfterInteractive)
    }
}

impl RootLayout {
    pub fn new(title: impl Into<String>) -> Self {
        RootLayout {
            title: title.into(),
            lang: "en".to_owned(),
            body_class: "index-page".to_owned(),
            scripts: Vec::new(),
        }
    }

    pub fn with_script(mut self, src: impl Into<String>, strategy: ScriptStrategy) -> Self {
        self.scripts.push(Script {
            src: src.into(),
            strategy,
        });
        self
    }

    /// Scripts with the given strategy, in declaration order.
    pub fn scripts(&self, strategy: ScriptStrategy) -> impl Iterator<Item = &Script> {
        self.scripts.iter().filter(move |s| s.strategy == strategy)
    }

    fn tags(&self, strategy: ScriptStrategy) -> Vec<ScriptTag<'_>> {
        self.scripts(strategy)
            .map(|s| ScriptTag {
                src: &s.src,
                defer: strategy == ScriptStrategy::AfterInteractive,
            })
            .collect()
    }

    pub fn context(&self) -> Context {
        let mut context = Context::new();
        context.insert("site_title", &self.title);
        context.insert("lang", &self.lang);
        context.insert("body_class", &self.body_class);
        context.insert("head_scripts", &self.tags(ScriptStrategy::BeforeInteractive));
        context.insert("body_scripts", &self.tags(ScriptStrategy::AfterInteractive));
        context.insert("scroll_threshold", &SCROLL_THRESHOLD_PX);
        context.insert("version", env!("CARGO_PKG_VERSION"));
        context
    }

    /// Renders `template` with the shell context underneath the page's own.
    pub fn render(&self, template: &str, page: Context) -> Result<String, AppError> {
        let mut context = self.context();
        context.extend(page);
        TEMPLATES.render(template, &context).map_err(|e| {
            log::error!("Failed to render template {}: {}", template, e);
            AppError::TemplateError(e)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_layout_orders_blocking_before_deferred() {
        let layout = RootLayout::default();
        let head: Vec<_> = layout
            .scripts(ScriptStrategy::BeforeInteractive)
            .map(|s| s.src.as_str())
            .collect();
        assert_eq!(head.len(), 2);
        assert!(head[0].contains("jquery"));
        assert!(head[1].contains("bootstrap"));

        let body: Vec<_> = layout
            .scripts(ScriptStrategy::AfterInteractive)
            .map(|s| s.src.as_str())
            .collect();
        assert_eq!(body.last(), Some(&"/static/js/main.js"));
    }

    #[test]
    fn render_wraps_page_in_shell() {
        let layout = RootLayout::new("Test Shell")
            .with_script("/head.js", ScriptStrategy::BeforeInteractive)
            .with_script("/tail.js", ScriptStrategy::AfterInteractive);

        let mut page = Context::new();
        page.insert("title", "Overview");
        page.insert("payments", &Vec::<crate::structs::PaymentSummary>::new());
        page.insert("tenants", &Vec::<crate::structs::Tenant>::new());
        let html = layout.render("home.html", page).unwrap();

        assert!(html.contains("<html lang=\"en\">"));
        assert!(html.contains("<title>Overview | Test Shell</title>"));
        let head = html.find("/head.js").unwrap();
        let body = html.find("<body").unwrap();
        let tail = html.find("/tail.js").unwrap();
        assert!(head < body && body < tail);
        assert!(html.contains("data-threshold=\"300\""));
    }
}
