//! The document the controller renders into.
//!
//! [`Page`] exposes just what the load cycle touches: the filter form, a
//! loading indicator, toast notices, and the article container.
//! [`HtmlPage`] keeps that state in memory and serializes it into a
//! standalone HTML document once the run is done.

use crate::models::FilterState;
use crate::utils::escape_html;
use chrono::Local;
use itertools::Itertools;
use scraper::{ElementRef, Html};
use std::fmt::Write;
use tracing::{debug, error, info};

/// Provider categories offered by the category selector.
pub const CATEGORIES: [&str; 7] = [
    "business",
    "entertainment",
    "general",
    "health",
    "science",
    "sports",
    "technology",
];

/// Country codes offered by the country selector.
pub const COUNTRIES: [&str; 54] = [
    "ae", "ar", "at", "au", "be", "bg", "br", "ca", "ch", "cn", "co", "cu", "cz", "de", "eg", "fr",
    "gb", "gr", "hk", "hu", "id", "ie", "il", "in", "it", "jp", "kr", "lt", "lv", "ma", "mx", "my",
    "ng", "nl", "no", "nz", "ph", "pl", "pt", "ro", "rs", "ru", "sa", "se", "sg", "si", "sk", "th",
    "tr", "tw", "ua", "us", "ve", "za",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToastKind {
    Info,
    Error,
}

impl ToastKind {
    fn class(self) -> &'static str {
        match self {
            ToastKind::Info => "info-msg",
            ToastKind::Error => "error-msg",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Toast {
    pub message: String,
    pub kind: ToastKind,
}

pub trait Page {
    /// Current values of the filter form.
    fn form(&self) -> FilterState;

    /// Overwrite the visible search input.
    fn set_search_text(&mut self, text: &str);

    /// Select the category option equal to `category`. Returns `false` when
    /// no such option exists and the selection is left as is.
    fn select_category(&mut self, category: &str) -> bool;

    fn show_loader(&mut self);

    /// Remove one loading indicator, if any is showing.
    fn remove_loader(&mut self);

    fn show_toast(&mut self, message: &str, kind: ToastKind);

    /// Number of children in the article container.
    fn container_len(&self) -> usize;

    /// Remove the last child of the article container, if any.
    fn remove_last_child(&mut self) -> bool;

    /// Parse `html` and insert its elements before the first child of the
    /// article container, in order.
    fn insert_at_top(&mut self, html: &str);
}

/// In-memory page rendered to an HTML file.
#[derive(Debug, Clone)]
pub struct HtmlPage {
    form: FilterState,
    country_options: Vec<String>,
    category_options: Vec<String>,
    loaders: usize,
    toasts: Vec<Toast>,
    container: Vec<String>,
}

impl HtmlPage {
    /// A page whose form starts with `form`. The selectors offer
    /// [`COUNTRIES`] and [`CATEGORIES`], plus the initial value of each if
    /// it is not one of them.
    pub fn new(form: FilterState) -> Self {
        let country_options = options_with(&COUNTRIES, &form.country);
        let category_options = options_with(&CATEGORIES, &form.category);
        Self {
            form,
            country_options,
            category_options,
            loaders: 0,
            toasts: Vec::new(),
            container: Vec::new(),
        }
    }

    pub fn toasts(&self) -> &[Toast] {
        &self.toasts
    }

    pub fn is_loading(&self) -> bool {
        self.loaders > 0
    }

    /// Serialized children of the article container, top first.
    pub fn container(&self) -> &[String] {
        &self.container
    }

    /// The full page as an HTML document.
    pub fn to_html(&self) -> String {
        let mut html = String::new();
        let generated = Local::now().format("%Y-%m-%d %H:%M:%S").to_string();

        writeln!(html, "<!DOCTYPE html>").unwrap();
        writeln!(html, "<html lang=\"en\">").unwrap();
        writeln!(html, "<head>\n  <meta charset=\"utf-8\">\n  <title>News</title>\n</head>").unwrap();
        writeln!(html, "<body>").unwrap();

        if self.is_loading() {
            writeln!(html, "<div class=\"preloader-wrapper active\"></div>").unwrap();
        }

        writeln!(html, "<form name=\"newsControls\">").unwrap();
        writeln!(
            html,
            "  <select name=\"country\">{}</select>",
            render_options(&self.country_options, &self.form.country)
        )
        .unwrap();
        writeln!(
            html,
            "  <input type=\"text\" name=\"search\" value=\"{}\">",
            escape_html(&self.form.search_text)
        )
        .unwrap();
        writeln!(
            html,
            "  <select name=\"category\">{}</select>",
            render_options(&self.category_options, &self.form.category)
        )
        .unwrap();
        writeln!(html, "</form>").unwrap();

        for toast in &self.toasts {
            writeln!(
                html,
                "<div class=\"toast rounded {}\">{}</div>",
                toast.kind.class(),
                escape_html(&toast.message)
            )
            .unwrap();
        }

        writeln!(html, "<div class=\"news-container\">\n<div class=\"row\">").unwrap();
        for child in &self.container {
            writeln!(html, "{child}").unwrap();
        }
        writeln!(html, "</div>\n</div>").unwrap();
        writeln!(html, "<footer>Generated {generated}</footer>").unwrap();
        writeln!(html, "</body>\n</html>").unwrap();
        html
    }
}

fn options_with(known: &[&str], current: &str) -> Vec<String> {
    let mut options: Vec<String> = known.iter().map(|o| o.to_string()).collect();
    if !current.is_empty() && !options.iter().any(|o| o == current) {
        options.push(current.to_string());
    }
    options
}

fn render_options(options: &[String], selected: &str) -> String {
    options
        .iter()
        .map(|o| {
            let mark = if o == selected { " selected" } else { "" };
            format!("<option value=\"{0}\"{1}>{0}</option>", escape_html(o), mark)
        })
        .join("")
}

impl Page for HtmlPage {
    fn form(&self) -> FilterState {
        self.form.clone()
    }

    fn set_search_text(&mut self, text: &str) {
        self.form.search_text = text.to_string();
    }

    fn select_category(&mut self, category: &str) -> bool {
        if self.category_options.iter().any(|c| c == category) {
            self.form.category = category.to_string();
            true
        } else {
            debug!(category, "No matching category option");
            false
        }
    }

    fn show_loader(&mut self) {
        self.loaders += 1;
    }

    fn remove_loader(&mut self) {
        self.loaders = self.loaders.saturating_sub(1);
    }

    fn show_toast(&mut self, message: &str, kind: ToastKind) {
        match kind {
            ToastKind::Info => info!(toast = message, "Showing notice"),
            ToastKind::Error => error!(toast = message, "Showing alert"),
        }
        self.toasts.push(Toast {
            message: message.to_string(),
            kind,
        });
    }

    fn container_len(&self) -> usize {
        self.container.len()
    }

    fn remove_last_child(&mut self) -> bool {
        self.container.pop().is_some()
    }

    fn insert_at_top(&mut self, html: &str) {
        let fragment = Html::parse_fragment(html);
        let mut children: Vec<String> = fragment
            .root_element()
            .children()
            .filter_map(ElementRef::wrap)
            .map(|element| element.html())
            .collect();
        debug!(inserted = children.len(), "Inserted fragment at top of container");
        children.append(&mut self.container);
        self.container = children;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use scraper::Selector;

    fn page() -> HtmlPage {
        HtmlPage::new(FilterState::new("us", "general", ""))
    }

    #[test]
    fn test_insert_at_top_splits_fragment_into_children() {
        let mut page = page();
        page.insert_at_top("<div class=\"old\">old</div>");
        page.insert_at_top("<div class=\"a\">a</div>\n<div class=\"b\">b</div>");

        assert_eq!(page.container_len(), 3);
        assert!(page.container()[0].contains("class=\"a\""));
        assert!(page.container()[1].contains("class=\"b\""));
        assert!(page.container()[2].contains("class=\"old\""));
    }

    #[test]
    fn test_remove_last_child() {
        let mut page = page();
        page.insert_at_top("<p>1</p><p>2</p>");
        assert!(page.remove_last_child());
        assert_eq!(page.container(), &["<p>1</p>".to_string()]);
        assert!(page.remove_last_child());
        assert!(!page.remove_last_child());
    }

    #[test]
    fn test_select_category_only_matches_options() {
        let mut page = page();
        assert!(page.select_category("science"));
        assert_eq!(page.form().category, "science");
        assert!(!page.select_category("astrology"));
        assert_eq!(page.form().category, "science");
    }

    #[test]
    fn test_loader_show_and_remove() {
        let mut page = page();
        page.remove_loader();
        assert!(!page.is_loading());
        page.show_loader();
        assert!(page.is_loading());
        page.remove_loader();
        assert!(!page.is_loading());
    }

    #[test]
    fn test_to_html_reflects_state() {
        let mut page = page();
        page.set_search_text("rust <lang>");
        page.show_toast("Nothing found", ToastKind::Info);
        page.insert_at_top("<div class=\"col s12\"><div class=\"card\">x</div></div>");

        let document = Html::parse_document(&page.to_html());
        let cards = Selector::parse(".news-container .row .card").unwrap();
        let selected = Selector::parse("select[name=category] option[selected]").unwrap();
        let country = Selector::parse("select[name=country] option[selected]").unwrap();
        let search = Selector::parse("input[name=search]").unwrap();
        let toasts = Selector::parse(".toast.info-msg").unwrap();

        assert_eq!(document.select(&cards).count(), 1);
        assert_eq!(document.select(&selected).next().unwrap().value().attr("value"), Some("general"));
        assert_eq!(document.select(&country).count(), 1);
        assert_eq!(document.select(&country).next().unwrap().value().attr("value"), Some("us"));
        assert_eq!(
            document.select(&search).next().unwrap().value().attr("value"),
            Some("rust <lang>")
        );
        assert_eq!(document.select(&toasts).count(), 1);
    }

    #[test]
    fn test_unknown_country_is_still_offered_and_selected() {
        let page = HtmlPage::new(FilterState::new("xx", "general", ""));
        let document = Html::parse_document(&page.to_html());
        let country = Selector::parse("select[name=country] option[selected]").unwrap();
        let inputs = Selector::parse("input[name=country]").unwrap();

        assert_eq!(document.select(&country).next().unwrap().value().attr("value"), Some("xx"));
        assert_eq!(document.select(&inputs).count(), 0);
    }
}
