use pulldown_cmark::{html, Event, Options, Parser};
use serde::{Deserialize, Serialize};
use tracing::{error, info};

use crate::api::BackendApi;
use crate::models::{FormRecommendationRequest, RecommendedMovie};
use crate::session::SessionContext;

pub const ANY: &str = "Any";

pub const GENRES: &[&str] = &[
    ANY,
    "Action",
    "Romance",
    "Sci-Fi",
    "Comedy",
    "Mystery",
    "Documentary",
    "Animation",
];
pub const COUNTRIES: &[&str] = &[ANY, "USA", "China", "Japan", "France", "South Korea", "UK"];
pub const LANGUAGES: &[&str] = &[ANY, "English", "Chinese", "Japanese", "Korean", "French"];
pub const YEAR_RANGES: &[&str] = &[ANY, "After 2020", "2010-2020", "2000-2010", "Before 2000"];

pub const FAILED_RECOMMENDATION: &str =
    "❌ Failed to generate recommendation. Please try again later.";

/// Favorites-based recommendations for the stored session.
#[derive(Debug, Clone, PartialEq)]
pub enum RecommendationOutcome {
    /// No session stored; send the user into the login.
    NeedsLogin,
    Ready(Vec<RecommendedMovie>),
}

pub async fn fetch_recommendations(
    api: &dyn BackendApi,
    session: &SessionContext,
) -> RecommendationOutcome {
    let Some(session_id) = session.session_id().await else {
        return RecommendationOutcome::NeedsLogin;
    };
    match api.recommendations(&session_id).await {
        Ok(data) => {
            info!("Received {} recommendations", data.results.len());
            RecommendationOutcome::Ready(data.results)
        }
        Err(e) => {
            error!("Failed to fetch recommendations: {:#}", e);
            RecommendationOutcome::Ready(Vec::new())
        }
    }
}

/// Raw form fields as posted by the browser. Missing selects mean `Any`.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct RecommendForm {
    #[serde(default)]
    pub genre: Option<String>,
    #[serde(default)]
    pub country: Option<String>,
    #[serde(default)]
    pub language: Option<String>,
    #[serde(default)]
    pub year_range: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
}

impl RecommendForm {
    pub fn to_request(&self) -> FormRecommendationRequest {
        FormRecommendationRequest {
            genre: choice(self.genre.as_deref()),
            country: choice(self.country.as_deref()),
            language: choice(self.language.as_deref()),
            year_range: choice(self.year_range.as_deref()),
            description: self
                .description
                .as_deref()
                .map(str::trim)
                .unwrap_or_default()
                .to_string(),
        }
    }
}

fn choice(raw: Option<&str>) -> String {
    raw.map(str::trim)
        .filter(|s| !s.is_empty())
        .unwrap_or(ANY)
        .to_string()
}

/// Ask the backend for a form-based recommendation and return it as HTML.
pub async fn recommend_by_form(api: &dyn BackendApi, request: &FormRecommendationRequest) -> String {
    info!(
        "Requesting form recommendation (genre={}, country={}, language={}, years={})",
        request.genre, request.country, request.language, request.year_range
    );
    let markdown = match api.form_recommendation(request).await {
        Ok(text) => text,
        Err(e) => {
            error!("Error generating recommendation: {:#}", e);
            FAILED_RECOMMENDATION.to_string()
        }
    };
    markdown_to_html(&markdown)
}

/// Render markdown to HTML. Raw HTML in the source is shown as text.
pub fn markdown_to_html(markdown: &str) -> String {
    let parser = Parser::new_ext(markdown, Options::ENABLE_TABLES | Options::ENABLE_STRIKETHROUGH)
        .map(|event| match event {
            Event::Html(raw) | Event::InlineHtml(raw) => Event::Text(raw),
            other => other,
        });
    let mut out = String::with_capacity(markdown.len() * 3 / 2);
    html::push_html(&mut out, parser);
    out
}
