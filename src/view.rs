//! Load lifecycle: filter reconciliation, request dispatch, and rendering.
//!
//! [`NewsView`] owns the news service, the settings store, and the page, and
//! drives one load cycle at a time:
//!
//! 1. Show the loader and read the form
//! 2. Reconcile the form with persisted settings ([`plan_load`])
//! 3. Request top headlines or a search through the [`NewsService`]
//! 4. Remove the loader, then toast an error, toast an empty-result notice,
//!    or replace the container contents with article cards
//!
//! # Load decision
//!
//! | Search text | Persisted | Persisted text | Request |
//! |-------------|-----------|----------------|---------|
//! | empty | none | - | top headlines, form country/category |
//! | empty | some | empty | top headlines, persisted country/category |
//! | any | some | non-empty | search, persisted country/category/text |
//! | non-empty | otherwise | | search, form country/category/text |
//!
//! The persisted branches ignore the form's country and category.

use crate::models::{Article, FilterState, NewsResponse, PersistedSettings};
use crate::page::{Page, ToastKind};
use crate::service::NewsService;
use crate::settings::{KeyValueStore, SettingsStore};
use crate::transport::{RequestResult, Transport};
use crate::utils::escape_html;
use itertools::Itertools;
use tracing::{debug, info, instrument, warn};

pub const EMPTY_RESULT_MESSAGE: &str = "No news found for these filters";

/// Which request a load cycle issues.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadPlan {
    TopHeadlines {
        country: String,
        category: String,
    },
    Everything {
        country: String,
        category: String,
        query: String,
        /// Copy `query` into the page's search input before requesting.
        sync_search_input: bool,
    },
}

/// Decide what to request from the current form and the persisted settings.
pub fn plan_load(form: &FilterState, persisted: Option<&PersistedSettings>) -> LoadPlan {
    match persisted {
        None if !form.has_search_text() => LoadPlan::TopHeadlines {
            country: form.country.clone(),
            category: form.category.clone(),
        },
        Some(saved) if !form.has_search_text() && !saved.has_text() => LoadPlan::TopHeadlines {
            country: saved.country.clone(),
            category: saved.category.clone(),
        },
        Some(saved) if saved.has_text() => LoadPlan::Everything {
            country: saved.country.clone(),
            category: saved.category.clone(),
            query: saved.text.clone(),
            sync_search_input: true,
        },
        _ => LoadPlan::Everything {
            country: form.country.clone(),
            category: form.category.clone(),
            query: form.search_text.clone(),
            sync_search_input: false,
        },
    }
}

/// Render one article card.
pub fn news_template(article: &Article, placeholder_image: &str) -> String {
    format!(
        r#"<div class="col s12">
  <div class="card">
    <div class="card-image">
      <img src="{image}">
      <span class="card-title">{title}</span>
    </div>
    <div class="card-content">
      <p>{description}</p>
    </div>
    <div class="card-action">
      <a href="{url}">Read more</a>
    </div>
  </div>
</div>
"#,
        image = escape_html(article.image_or(placeholder_image)),
        title = escape_html(article.title.as_deref().unwrap_or_default()),
        description = escape_html(article.description.as_deref().unwrap_or_default()),
        url = escape_html(article.url.as_deref().unwrap_or_default()),
    )
}

pub struct NewsView<T, S, P> {
    service: NewsService<T>,
    settings: SettingsStore<S>,
    page: P,
    placeholder_image: String,
}

impl<T, S, P> NewsView<T, S, P>
where
    T: Transport,
    S: KeyValueStore,
    P: Page,
{
    pub fn new(
        service: NewsService<T>,
        settings: SettingsStore<S>,
        page: P,
        placeholder_image: impl Into<String>,
    ) -> Self {
        Self {
            service,
            settings,
            page,
            placeholder_image: placeholder_image.into(),
        }
    }

    #[cfg(test)]
    pub fn page(&self) -> &P {
        &self.page
    }

    #[cfg(test)]
    pub fn settings(&self) -> &SettingsStore<S> {
        &self.settings
    }

    pub fn into_page(self) -> P {
        self.page
    }

    /// Page load: restore the persisted category into the form, then load.
    pub async fn start(&mut self) {
        self.restore_on_load();
        self.load_news().await;
    }

    /// Form submit: persist the three form values, then load.
    ///
    /// A failed save is shown to the user; the load still runs.
    #[instrument(level = "info", skip_all)]
    pub async fn submit(&mut self) {
        let form = self.page.form();
        if let Err(e) = self
            .settings
            .save(&form.country, &form.search_text, &form.category)
        {
            warn!(error = %e, "Failed to persist filter settings");
            self.page
                .show_toast(&format!("Could not save filters: {e}"), ToastKind::Error);
        }
        self.load_news().await;
    }

    /// Select the persisted category in the form, if settings exist.
    ///
    /// The persisted country is not applied to the form.
    pub fn restore_on_load(&mut self) {
        if let Some(saved) = self.settings.restore() {
            let selected = self.page.select_category(&saved.category);
            debug!(category = %saved.category, selected, "Restored persisted category");
        }
    }

    /// Run one load cycle.
    #[instrument(level = "info", skip_all)]
    pub async fn load_news(&mut self) {
        self.page.show_loader();

        let form = self.page.form();
        let persisted = self.settings.restore();
        let plan = plan_load(&form, persisted.as_ref());
        info!(?plan, has_persisted = persisted.is_some(), "Loading news");

        let result = match &plan {
            LoadPlan::TopHeadlines { country, category } => {
                self.service.top_headlines(country, category).await
            }
            LoadPlan::Everything {
                country,
                category,
                query,
                sync_search_input,
            } => {
                if *sync_search_input {
                    self.page.set_search_text(query);
                }
                self.service.everything(country, category, query).await
            }
        };

        self.on_response(result);
    }

    fn on_response(&mut self, result: RequestResult) {
        self.page.remove_loader();

        let body = match result {
            Ok(body) => body,
            Err(e) => {
                warn!(error = %e, status = ?e.raw().map(|r| r.status), "News request failed");
                self.page.show_toast(&e.to_string(), ToastKind::Error);
                return;
            }
        };

        let response: NewsResponse = match serde_json::from_value(body) {
            Ok(response) => response,
            Err(e) => {
                warn!(error = %e, "Response is not a news payload");
                self.page.show_toast(
                    &format!("Error. Unexpected response from the news provider: {e}"),
                    ToastKind::Error,
                );
                return;
            }
        };

        debug!(
            status = ?response.status,
            total_results = ?response.total_results,
            articles = response.articles.len(),
            "Decoded news response"
        );

        if response.articles.is_empty() {
            info!("Provider returned no articles");
            self.page.show_toast(EMPTY_RESULT_MESSAGE, ToastKind::Info);
            return;
        }

        self.render_news(&response.articles);
    }

    fn render_news(&mut self, articles: &[Article]) {
        if self.page.container_len() > 0 {
            self.clear_container();
        }

        let fragment = articles
            .iter()
            .map(|article| news_template(article, &self.placeholder_image))
            .join("");
        self.page.insert_at_top(&fragment);
        info!(count = articles.len(), "Rendered articles");
    }

    fn clear_container(&mut self) {
        while self.page.remove_last_child() {}
    }
}
