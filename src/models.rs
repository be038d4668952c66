use serde::{Deserialize, Deserializer, Serialize};

/// Something the list pages can sort and filter by its display label.
pub trait Listed {
    fn label(&self) -> &str;
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Movie {
    pub title: String,
    #[serde(default, deserialize_with = "text_or_number")]
    pub year: Option<String>,
    #[serde(default)]
    pub release_date: Option<String>,
    #[serde(default)]
    pub poster_path: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Actor {
    pub name: String,
    #[serde(default)]
    pub date_of_birth: Option<String>,
    #[serde(default)]
    pub gender: Option<String>,
    #[serde(default)]
    pub date_of_death: Option<String>,
    #[serde(default)]
    pub profile_path: Option<String>,
}

/// A movie from the signed-in user's TMDB favorites.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct FavoriteMovie {
    #[serde(default)]
    pub id: Option<i64>,
    pub title: String,
    #[serde(default)]
    pub release_date: Option<String>,
    #[serde(default)]
    pub poster_path: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct RecommendedMovie {
    pub title: String,
    #[serde(default)]
    pub poster_path: Option<String>,
    #[serde(default)]
    pub release_date: Option<String>,
    #[serde(default)]
    pub overview: Option<String>,
}

impl Listed for Movie {
    fn label(&self) -> &str {
        &self.title
    }
}

impl Listed for Actor {
    fn label(&self) -> &str {
        &self.name
    }
}

impl Listed for FavoriteMovie {
    fn label(&self) -> &str {
        &self.title
    }
}

impl Listed for RecommendedMovie {
    fn label(&self) -> &str {
        &self.title
    }
}

#[derive(Debug, Deserialize, Clone, Copy)]
pub struct CountResponse {
    pub total: u64,
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct FavoritesPage {
    #[serde(default)]
    pub results: Vec<FavoriteMovie>,
    #[serde(default)]
    pub total_results: u64,
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct Recommendations {
    #[serde(default)]
    pub results: Vec<RecommendedMovie>,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct FormRecommendationRequest {
    pub genre: String,
    pub country: String,
    pub language: String,
    pub year_range: String,
    pub description: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct FormRecommendation {
    pub recommendation: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct RequestToken {
    pub request_token: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct SessionGrant {
    pub session_id: String,
}

/// TMDB account as returned by the backend's account endpoint.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Default)]
pub struct UserProfile {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub avatar: Avatar,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Default)]
pub struct Avatar {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tmdb: Option<TmdbAvatar>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gravatar: Option<Gravatar>,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct TmdbAvatar {
    #[serde(default)]
    pub avatar_path: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Gravatar {
    #[serde(default)]
    pub hash: Option<String>,
}

/// Search scope for the home page search and autocomplete.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SearchKind {
    #[default]
    Movie,
    Actor,
}

impl SearchKind {
    pub fn as_path(&self) -> &'static str {
        match self {
            SearchKind::Movie => "movie",
            SearchKind::Actor => "actor",
        }
    }

    /// Unknown or missing values fall back to movie search.
    pub fn parse_lenient(raw: Option<&str>) -> Self {
        match raw.map(|s| s.trim().to_ascii_lowercase()).as_deref() {
            Some("actor") => SearchKind::Actor,
            _ => SearchKind::Movie,
        }
    }
}

/// A search hit: the backend returns raw graph nodes, either movies or actors.
#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(untagged)]
pub enum SearchHit {
    Movie(Movie),
    Actor(Actor),
}

impl Listed for SearchHit {
    fn label(&self) -> &str {
        match self {
            SearchHit::Movie(m) => m.label(),
            SearchHit::Actor(a) => a.label(),
        }
    }
}

/// Cast list of one movie; actors arrive sorted by name.
#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct MovieCast {
    pub movie: Movie,
    #[serde(default)]
    pub actors: Vec<Actor>,
}

/// Movies one actor played in, newest first.
#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct ActorFilmography {
    pub actor: Actor,
    #[serde(default)]
    pub movies: Vec<Movie>,
}

fn text_or_number<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(serde_json::Value::String(s)) if !s.trim().is_empty() => Some(s),
        Some(serde_json::Value::Number(n)) => Some(n.to_string()),
        _ => None,
    })
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}
