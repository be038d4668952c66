//! Paged list state shared by the movies, actors and favorites pages.
//!
//! Items and total arrive either from two independent requests (movies,
//! actors) or from a single one (favorites). Failures are logged and leave the
//! previously held value in place; the loading flag is always cleared.

use anyhow::Result;
use std::future::Future;
use tracing::{debug, error};

use crate::api::BackendApi;
use crate::models::{Actor, FavoriteMovie, FavoritesPage, Listed, Movie};
use crate::pagination::{PageControls, PageState};

pub const MOVIES_PAGE_SIZE: u32 = 33;
pub const ACTORS_PAGE_SIZE: u32 = 33;
pub const FAVORITES_PAGE_SIZE: u32 = 20;

#[derive(Debug, Clone)]
pub struct ListView<T> {
    items: Vec<T>,
    page: u32,
    size: u32,
    total: u64,
    loading: bool,
    query: String,
}

impl<T: Listed> ListView<T> {
    pub fn new(size: u32) -> Self {
        Self {
            items: Vec::new(),
            page: 1,
            size,
            total: 0,
            loading: false,
            query: String::new(),
        }
    }

    pub fn items(&self) -> &[T] {
        &self.items
    }

    pub fn page(&self) -> u32 {
        self.page
    }

    pub fn size(&self) -> u32 {
        self.size
    }

    pub fn total(&self) -> u64 {
        self.total
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    pub fn set_query(&mut self, query: impl Into<String>) {
        self.query = query.into();
    }

    pub fn page_state(&self) -> PageState {
        PageState::new(self.page, self.size, self.total)
    }

    pub fn controls(&self) -> Option<PageControls> {
        self.page_state().controls()
    }

    /// Items of the loaded page whose label contains the query, ignoring case.
    /// Only the visible page is filtered; the total is untouched.
    pub fn visible(&self) -> Vec<&T> {
        filter_by_label(&self.items, &self.query)
    }

    fn begin(&mut self, page: u32) {
        self.loading = true;
        self.page = page;
    }

    /// Load a page whose items and total come from separate requests. Both
    /// requests run concurrently and neither result gates the other.
    pub async fn load_split<I, C>(&mut self, page: u32, what: &str, items: I, count: C)
    where
        I: Future<Output = Result<Vec<T>>>,
        C: Future<Output = Result<u64>>,
    {
        self.begin(page);
        let (items, count) = tokio::join!(items, count);
        match items {
            Ok(mut loaded) => {
                sort_by_label(&mut loaded);
                debug!("Loaded {} {} for page {}", loaded.len(), what, page);
                self.items = loaded;
            }
            Err(e) => error!("Failed to fetch {}: {:#}", what, e),
        }
        match count {
            Ok(total) => self.total = total,
            Err(e) => error!("Failed to fetch {} count: {:#}", what, e),
        }
        self.loading = false;
    }
}

impl ListView<FavoriteMovie> {
    /// Favorites arrive with their total in one response and keep the
    /// backend's order.
    pub async fn load_combined<F>(&mut self, page: u32, fetch: F)
    where
        F: Future<Output = Result<FavoritesPage>>,
    {
        self.begin(page);
        match fetch.await {
            Ok(data) => {
                debug!(
                    "Loaded {} favorites for page {} ({} total)",
                    data.results.len(),
                    page,
                    data.total_results
                );
                self.items = data.results;
                self.total = data.total_results;
            }
            Err(e) => error!("Error loading favorites: {:#}", e),
        }
        self.loading = false;
    }
}

pub async fn load_movies(api: &dyn BackendApi, page: u32) -> ListView<Movie> {
    let mut view = ListView::new(MOVIES_PAGE_SIZE);
    view.load_split(
        page,
        "movies",
        api.list_movies(page, MOVIES_PAGE_SIZE),
        api.movies_count(),
    )
    .await;
    view
}

pub async fn load_actors(api: &dyn BackendApi, page: u32) -> ListView<Actor> {
    let mut view = ListView::new(ACTORS_PAGE_SIZE);
    view.load_split(
        page,
        "actors",
        api.list_actors(page, ACTORS_PAGE_SIZE),
        api.actors_count(),
    )
    .await;
    view
}

pub async fn load_favorites(
    api: &dyn BackendApi,
    session_id: &str,
    page: u32,
) -> ListView<FavoriteMovie> {
    let mut view = ListView::new(FAVORITES_PAGE_SIZE);
    view.load_combined(page, api.favorites(session_id, page)).await;
    view
}

/// Sort by label ignoring case; equal labels fall back to byte order so the
/// result is stable across runs.
pub fn sort_by_label<T: Listed>(items: &mut [T]) {
    items.sort_by(|a, b| {
        a.label()
            .to_lowercase()
            .cmp(&b.label().to_lowercase())
            .then_with(|| a.label().cmp(b.label()))
    });
}

pub fn filter_by_label<'a, T: Listed>(items: &'a [T], query: &str) -> Vec<&'a T> {
    let needle = query.to_lowercase();
    items
        .iter()
        .filter(|item| item.label().to_lowercase().contains(&needle))
        .collect()
}
