use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use reqwest::{Client, Response, StatusCode};
use serde::{de::DeserializeOwned, Serialize};

use crate::config::AppConfig;
use crate::models::{
    Actor, ActorFilmography, CountResponse, FavoritesPage, FormRecommendation,
    FormRecommendationRequest, Movie, MovieCast, Recommendations, RequestToken, SearchHit,
    SearchKind, SessionGrant, UserProfile,
};

/// Thin wrapper over the backend: builds `base_url + path` and hands back the
/// raw response. Status checks and body parsing are the caller's job.
#[derive(Debug, Clone)]
pub struct ApiService {
    client: Client,
    base_url: String,
}

/// Typed view of every backend endpoint the pages consume.
#[async_trait]
pub trait BackendApi: Send + Sync {
    async fn list_movies(&self, page: u32, size: u32) -> Result<Vec<Movie>>;
    async fn movies_count(&self) -> Result<u64>;
    async fn list_actors(&self, page: u32, size: u32) -> Result<Vec<Actor>>;
    async fn actors_count(&self) -> Result<u64>;
    async fn favorites(&self, session_id: &str, page: u32) -> Result<FavoritesPage>;
    async fn recommendations(&self, session_id: &str) -> Result<Recommendations>;
    async fn form_recommendation(&self, input: &FormRecommendationRequest) -> Result<String>;
    async fn request_token(&self) -> Result<String>;
    async fn create_session(&self, request_token: &str) -> Result<String>;
    async fn account(&self, session_id: &str) -> Result<UserProfile>;
    async fn search(&self, kind: SearchKind, query: &str) -> Result<Vec<SearchHit>>;
    async fn autocomplete(&self, kind: SearchKind, query: &str) -> Result<Vec<String>>;
    /// `None` when the backend does not know the movie.
    async fn movie_cast(&self, title: &str) -> Result<Option<MovieCast>>;
    /// `None` when the backend does not know the actor.
    async fn actor_filmography(&self, name: &str) -> Result<Option<ActorFilmography>>;
}

impl ApiService {
    pub fn new(base_url: impl Into<String>) -> Result<Self> {
        let user_agent = format!("reelscout/{}", env!("CARGO_PKG_VERSION"));
        let client = Client::builder()
            .user_agent(user_agent)
            .build()
            .context("Failed to build backend HTTP client")?;
        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    pub fn from_config(config: &AppConfig) -> Result<Self> {
        Self::new(config.api_base_url.clone())
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    pub async fn fetch_data(&self, path: &str) -> Result<Response> {
        self.client
            .get(self.url(path))
            .send()
            .await
            .with_context(|| format!("GET {path} failed"))
    }

    pub async fn post_data<B: Serialize + ?Sized>(&self, path: &str, body: &B) -> Result<Response> {
        self.client
            .post(self.url(path))
            .json(body)
            .send()
            .await
            .with_context(|| format!("POST {path} failed"))
    }

    pub async fn put_data<B: Serialize + ?Sized>(&self, path: &str, body: &B) -> Result<Response> {
        self.client
            .put(self.url(path))
            .json(body)
            .send()
            .await
            .with_context(|| format!("PUT {path} failed"))
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        let res = self.fetch_data(path).await?;
        parse_json(path, res).await
    }

    /// Like `get_json`, but a 404 reads as `None`.
    async fn get_json_opt<T: DeserializeOwned>(&self, path: &str) -> Result<Option<T>> {
        let res = self.fetch_data(path).await?;
        if res.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        parse_json(path, res).await
    }

    async fn post_json<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T> {
        let res = self.post_data(path, body).await?;
        parse_json(path, res).await
    }
}

async fn parse_json<T: DeserializeOwned>(path: &str, res: Response) -> Result<T> {
    let status = res.status();
    let text = res.text().await.context("reading body failed")?;
    if !status.is_success() {
        return Err(anyhow!("{} -> {} {}", path, status, text));
    }
    serde_json::from_str(&text).with_context(|| format!("JSON parse failed for {path}"))
}

#[async_trait]
impl BackendApi for ApiService {
    async fn list_movies(&self, page: u32, size: u32) -> Result<Vec<Movie>> {
        self.get_json(&format!("/movies?page={page}&size={size}"))
            .await
    }

    async fn movies_count(&self) -> Result<u64> {
        let data: CountResponse = self.get_json("/movies_count").await?;
        Ok(data.total)
    }

    async fn list_actors(&self, page: u32, size: u32) -> Result<Vec<Actor>> {
        self.get_json(&format!("/actors?page={page}&size={size}"))
            .await
    }

    async fn actors_count(&self) -> Result<u64> {
        let data: CountResponse = self.get_json("/actors_count").await?;
        Ok(data.total)
    }

    async fn favorites(&self, session_id: &str, page: u32) -> Result<FavoritesPage> {
        self.get_json(&format!(
            "/tmdb/favorites?session_id={}&page={page}",
            urlencoding::encode(session_id)
        ))
        .await
    }

    async fn recommendations(&self, session_id: &str) -> Result<Recommendations> {
        self.get_json(&format!(
            "/recommendations?session_id={}",
            urlencoding::encode(session_id)
        ))
        .await
    }

    async fn form_recommendation(&self, input: &FormRecommendationRequest) -> Result<String> {
        let data: FormRecommendation = self.post_json("/form-recommendations", input).await?;
        Ok(data.recommendation)
    }

    async fn request_token(&self) -> Result<String> {
        let data: RequestToken = self.get_json("/tmdb/request-token").await?;
        Ok(data.request_token)
    }

    async fn create_session(&self, request_token: &str) -> Result<String> {
        let data: SessionGrant = self
            .get_json(&format!(
                "/tmdb/create-session?request_token={}",
                urlencoding::encode(request_token)
            ))
            .await?;
        Ok(data.session_id)
    }

    async fn account(&self, session_id: &str) -> Result<UserProfile> {
        self.get_json(&format!(
            "/tmdb/account?session_id={}",
            urlencoding::encode(session_id)
        ))
        .await
    }

    async fn search(&self, kind: SearchKind, query: &str) -> Result<Vec<SearchHit>> {
        self.get_json(&format!(
            "/search/{}?query={}",
            kind.as_path(),
            urlencoding::encode(query)
        ))
        .await
    }

    async fn autocomplete(&self, kind: SearchKind, query: &str) -> Result<Vec<String>> {
        self.get_json(&format!(
            "/autocomplete/{}?query={}",
            kind.as_path(),
            urlencoding::encode(query)
        ))
        .await
    }

    async fn movie_cast(&self, title: &str) -> Result<Option<MovieCast>> {
        self.get_json_opt(&format!("/movies/{}/cast", urlencoding::encode(title)))
            .await
    }

    async fn actor_filmography(&self, name: &str) -> Result<Option<ActorFilmography>> {
        self.get_json_opt(&format!(
            "/actors/{}/filmography",
            urlencoding::encode(name)
        ))
        .await
    }
}
