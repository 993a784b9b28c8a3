//! Data models for filters, persisted settings, and provider payloads.
//!
//! This module defines the core data structures used throughout the application:
//! - [`FilterState`]: The user's current query intent, read from the page form
//! - [`PersistedSettings`]: The durable copy of the last submitted filters
//! - [`NewsResponse`] and [`Article`]: The JSON body returned by the provider
//!
//! Provider payloads use camelCase field names (`urlToImage`, `totalResults`),
//! mapped with `#[serde(rename_all = "camelCase")]`.

use serde::{Deserialize, Serialize};

/// The filter values currently entered in the page form.
///
/// An empty `search_text` means the user is not searching and the
/// top headlines endpoint should be used instead.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterState {
    /// Two-letter country code, e.g. `"us"`.
    pub country: String,
    /// Provider category, e.g. `"technology"`.
    pub category: String,
    /// Free-text search term.
    pub search_text: String,
}

impl FilterState {
    pub fn new(
        country: impl Into<String>,
        category: impl Into<String>,
        search_text: impl Into<String>,
    ) -> Self {
        Self {
            country: country.into(),
            category: category.into(),
            search_text: search_text.into(),
        }
    }

    /// Whether the search input holds a non-empty term.
    pub fn has_search_text(&self) -> bool {
        !self.search_text.is_empty()
    }
}

/// Filters restored from the settings store.
///
/// Keys that were never written read back as empty strings.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PersistedSettings {
    pub country: String,
    pub text: String,
    pub category: String,
}

impl PersistedSettings {
    /// Whether a persisted search term exists.
    pub fn has_text(&self) -> bool {
        !self.text.is_empty()
    }
}

/// A single article as returned by the provider.
///
/// Every field is optional in the payload; rendering substitutes defaults
/// (empty strings, placeholder image) for missing values.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Article {
    pub title: Option<String>,
    pub description: Option<String>,
    pub url: Option<String>,
    pub url_to_image: Option<String>,
}

impl Article {
    /// The image to show for this article, or `placeholder` when the
    /// provider sent none (or an empty string).
    pub fn image_or<'a>(&'a self, placeholder: &'a str) -> &'a str {
        match self.url_to_image.as_deref() {
            Some(src) if !src.trim().is_empty() => src,
            _ => placeholder,
        }
    }
}

/// Body of a top-headlines or everything response.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewsResponse {
    pub status: Option<String>,
    pub total_results: Option<u64>,
    #[serde(default)]
    pub articles: Vec<Article>,
}
