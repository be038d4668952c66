use tracing::{debug, error};

use crate::api::BackendApi;
use crate::models::{ActorFilmography, Listed, MovieCast, SearchHit, SearchKind};

pub const MAX_SUGGESTIONS: usize = 10;

/// Home page search. A blank query skips the backend and yields nothing.
pub async fn run_search(api: &dyn BackendApi, kind: SearchKind, query: &str) -> Vec<SearchHit> {
    let query = query.trim();
    if query.is_empty() {
        return Vec::new();
    }
    match api.search(kind, query).await {
        Ok(hits) => {
            debug!("Search '{}' ({}) -> {} hits", query, kind.as_path(), hits.len());
            hits
        }
        Err(e) => {
            error!("Search for '{}' failed: {:#}", query, e);
            Vec::new()
        }
    }
}

pub async fn suggest(api: &dyn BackendApi, kind: SearchKind, query: &str) -> Vec<String> {
    let query = query.trim();
    if query.is_empty() {
        return Vec::new();
    }
    match api.autocomplete(kind, query).await {
        Ok(mut names) => {
            names.truncate(MAX_SUGGESTIONS);
            names
        }
        Err(e) => {
            error!("Autocomplete for '{}' failed: {:#}", query, e);
            Vec::new()
        }
    }
}

/// Extra panel under the hits when one of them is exactly what was typed.
/// `None` inside a variant means the backend had nothing for that hit.
#[derive(Debug, Clone, PartialEq)]
pub enum Detail {
    Cast {
        title: String,
        cast: Option<MovieCast>,
    },
    Filmography {
        name: String,
        films: Option<ActorFilmography>,
    },
}

/// Look up the cast or filmography for the hit whose label equals `query`,
/// ignoring case. No exact hit means no call.
pub async fn lookup_detail(
    api: &dyn BackendApi,
    kind: SearchKind,
    query: &str,
    hits: &[SearchHit],
) -> Option<Detail> {
    let query = query.trim();
    let hit = hits.iter().find(|hit| {
        let same_kind = matches!(
            (kind, hit),
            (SearchKind::Movie, SearchHit::Movie(_)) | (SearchKind::Actor, SearchHit::Actor(_))
        );
        same_kind && hit.label().to_lowercase() == query.to_lowercase()
    })?;
    let detail = match hit {
        SearchHit::Movie(movie) => Detail::Cast {
            title: movie.title.clone(),
            cast: api.movie_cast(&movie.title).await.unwrap_or_else(|e| {
                error!("Cast lookup for '{}' failed: {:#}", movie.title, e);
                None
            }),
        },
        SearchHit::Actor(actor) => Detail::Filmography {
            name: actor.name.clone(),
            films: api.actor_filmography(&actor.name).await.unwrap_or_else(|e| {
                error!("Filmography lookup for '{}' failed: {:#}", actor.name, e);
                None
            }),
        },
    };
    Some(detail)
}

/// Home page link that searches for `label`.
pub fn search_href(kind: SearchKind, label: &str) -> String {
    format!("/?q={}&type={}", urlencoding::encode(label), kind.as_path())
}
