use crate::api::{ApiService, BackendApi};
use crate::auth::{self, LoginOutcome};
use crate::config::AppConfig;
use crate::listing;
use crate::models::SearchKind;
use crate::nav::NavBar;
use crate::pagination::parse_page;
use crate::recommend::{self, RecommendForm, RecommendationOutcome};
use crate::search;
use crate::session::SessionContext;
use crate::views::{self, Card, DetailPanel, ListingPage, Pager, SelectField};
use anyhow::Result;
use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{Html, IntoResponse, Redirect, Response},
    routing::{get, post},
    Form, Json, Router,
};
use serde::Deserialize;
use std::sync::Arc;
use tower_http::{limit::RequestBodyLimitLayer, trace::TraceLayer};
use tracing::{error, info};

const MAX_BODY_BYTES: usize = 64 * 1024;

#[derive(Clone)]
pub struct AppState {
    pub api: Arc<dyn BackendApi>,
    pub session: SessionContext,
    /// Origin used to build the TMDB callback URL.
    pub public_url: String,
}

#[derive(Debug, Default, Deserialize)]
pub struct HomeQuery {
    q: Option<String>,
    #[serde(rename = "type")]
    kind: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct ListQuery {
    page: Option<String>,
    q: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct AuthQuery {
    request_token: Option<String>,
}

pub async fn run_server(config: AppConfig) -> Result<()> {
    config.log_summary();
    let api: Arc<dyn BackendApi> = Arc::new(ApiService::from_config(&config)?);
    let session = SessionContext::init(&config.storage_path).await?;

    let state = AppState {
        api,
        session,
        public_url: config.public_url.clone(),
    };

    let app = build_router(state);

    info!("Listening on {}", config.bind_addr);
    let listener = tokio::net::TcpListener::bind(config.bind_addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(home))
        .route("/movies", get(movies))
        .route("/actors", get(actors))
        .route("/favorites", get(favorites))
        .route(
            "/recommendations",
            get(recommendations_intro).post(recommendations_run),
        )
        .route(
            "/form-recommendation",
            get(form_recommendation).post(form_recommendation_submit),
        )
        .route("/suggest", get(suggest))
        .route("/login", get(login))
        .route("/tmdb-auth", get(tmdb_auth))
        .route("/logout", post(logout))
        .route("/health", get(health))
        .layer(RequestBodyLimitLayer::new(MAX_BODY_BYTES))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn health() -> &'static str {
    "OK"
}

fn html_page(rendered: Result<String>) -> Response {
    match rendered {
        Ok(body) => Html(body).into_response(),
        Err(e) => {
            error!("Failed to render page: {:#}", e);
            (StatusCode::INTERNAL_SERVER_ERROR, "Internal error").into_response()
        }
    }
}

async fn home(State(state): State<AppState>, Query(params): Query<HomeQuery>) -> Response {
    let nav = NavBar::for_session(&state.session, "/").await;
    let kind = SearchKind::parse_lenient(params.kind.as_deref());
    let query = params.q.unwrap_or_default();
    let (results, detail) = if query.trim().is_empty() {
        (None, None)
    } else {
        let hits = search::run_search(state.api.as_ref(), kind, &query).await;
        let detail = search::lookup_detail(state.api.as_ref(), kind, &query, &hits)
            .await
            .map(|d| DetailPanel::from_detail(&d));
        (Some(hits.iter().map(Card::hit).collect()), detail)
    };
    html_page(views::home(&nav, &query, kind, results, detail))
}

async fn movies(State(state): State<AppState>, Query(params): Query<ListQuery>) -> Response {
    let page = parse_page(params.page.as_deref());
    let mut view = listing::load_movies(state.api.as_ref(), page).await;
    view.set_query(params.q.unwrap_or_default());
    let nav = NavBar::for_session(&state.session, "/movies").await;
    let items = view.visible().into_iter().map(Card::movie).collect();
    html_page(views::listing(
        &nav,
        ListingPage {
            heading: "🎬 All Movies",
            noun: "movies",
            base_path: "/movies",
            page: view.page(),
            total: view.total(),
            query: view.query(),
            items,
            pager: Pager::from_controls(view.controls(), "/movies", view.query()),
        },
    ))
}

async fn actors(State(state): State<AppState>, Query(params): Query<ListQuery>) -> Response {
    let page = parse_page(params.page.as_deref());
    let mut view = listing::load_actors(state.api.as_ref(), page).await;
    view.set_query(params.q.unwrap_or_default());
    let nav = NavBar::for_session(&state.session, "/actors").await;
    let items = view.visible().into_iter().map(Card::actor).collect();
    html_page(views::listing(
        &nav,
        ListingPage {
            heading: "🎭 All Actors",
            noun: "actors",
            base_path: "/actors",
            page: view.page(),
            total: view.total(),
            query: view.query(),
            items,
            pager: Pager::from_controls(view.controls(), "/actors", view.query()),
        },
    ))
}

async fn favorites(State(state): State<AppState>, Query(params): Query<ListQuery>) -> Response {
    let Some(session_id) = state.session.session_id().await else {
        info!("Favorites requested without a session, starting login");
        return Redirect::to("/login").into_response();
    };
    let page = parse_page(params.page.as_deref());
    let view = listing::load_favorites(state.api.as_ref(), &session_id, page).await;
    let nav = NavBar::for_session(&state.session, "/favorites").await;
    let items = view.items().iter().map(Card::favorite).collect();
    html_page(views::favorites(
        &nav,
        items,
        Pager::from_controls(view.controls(), "/favorites", ""),
    ))
}

async fn recommendations_intro(State(state): State<AppState>) -> Response {
    let nav = NavBar::for_session(&state.session, "/recommendations").await;
    html_page(views::recommendations(&nav, false, Vec::new()))
}

async fn recommendations_run(State(state): State<AppState>) -> Response {
    match recommend::fetch_recommendations(state.api.as_ref(), &state.session).await {
        RecommendationOutcome::NeedsLogin => Redirect::to("/login").into_response(),
        RecommendationOutcome::Ready(movies) => {
            let nav = NavBar::for_session(&state.session, "/recommendations").await;
            let items = movies.iter().map(Card::recommended).collect();
            html_page(views::recommendations(&nav, true, items))
        }
    }
}

fn form_fields(request: &crate::models::FormRecommendationRequest) -> Vec<SelectField> {
    vec![
        SelectField {
            name: "genre",
            label: "Genre",
            options: recommend::GENRES,
            selected: request.genre.clone(),
        },
        SelectField {
            name: "country",
            label: "Country",
            options: recommend::COUNTRIES,
            selected: request.country.clone(),
        },
        SelectField {
            name: "language",
            label: "Language",
            options: recommend::LANGUAGES,
            selected: request.language.clone(),
        },
        SelectField {
            name: "year_range",
            label: "Release period",
            options: recommend::YEAR_RANGES,
            selected: request.year_range.clone(),
        },
    ]
}

async fn form_recommendation(State(state): State<AppState>) -> Response {
    let nav = NavBar::for_session(&state.session, "/form-recommendation").await;
    let request = RecommendForm::default().to_request();
    html_page(views::recommend_form(
        &nav,
        form_fields(&request),
        &request.description,
        None,
    ))
}

async fn form_recommendation_submit(
    State(state): State<AppState>,
    Form(form): Form<RecommendForm>,
) -> Response {
    let request = form.to_request();
    let answer = recommend::recommend_by_form(state.api.as_ref(), &request).await;
    let nav = NavBar::for_session(&state.session, "/form-recommendation").await;
    html_page(views::recommend_form(
        &nav,
        form_fields(&request),
        &request.description,
        Some(answer),
    ))
}

async fn suggest(State(state): State<AppState>, Query(params): Query<HomeQuery>) -> Json<Vec<String>> {
    let kind = SearchKind::parse_lenient(params.kind.as_deref());
    let query = params.q.unwrap_or_default();
    Json(search::suggest(state.api.as_ref(), kind, &query).await)
}

async fn login(State(state): State<AppState>) -> Response {
    match auth::begin_login(state.api.as_ref(), &state.public_url).await {
        Ok(url) => {
            info!("Redirecting to TMDB for authorization");
            Redirect::to(&url).into_response()
        }
        Err(e) => {
            error!("Failed to start TMDB login: {:#}", e);
            auth_failure(&state).await
        }
    }
}

async fn tmdb_auth(State(state): State<AppState>, Query(params): Query<AuthQuery>) -> Response {
    match auth::complete_login(
        state.api.as_ref(),
        &state.session,
        &state.public_url,
        params.request_token.as_deref(),
    )
    .await
    {
        Ok(LoginOutcome::LoggedIn(_)) => Redirect::to("/").into_response(),
        Ok(LoginOutcome::Parked) => {
            let nav = NavBar::for_session(&state.session, "/tmdb-auth").await;
            html_page(views::message(&nav, "pending", "Logging you in..."))
        }
        Err(e) => {
            error!("TMDB login failed: {:#}", e);
            auth_failure(&state).await
        }
    }
}

async fn auth_failure(state: &AppState) -> Response {
    let nav = NavBar::for_session(&state.session, "/tmdb-auth").await;
    let body = html_page(views::message(
        &nav,
        "error",
        "TMDB login failed. Please try again later.",
    ));
    (StatusCode::BAD_GATEWAY, body).into_response()
}

async fn logout(State(state): State<AppState>) -> Response {
    match auth::end_login(&state.session, &state.public_url).await {
        Ok(()) => Redirect::to("/").into_response(),
        Err(e) => {
            error!("Failed to clear stored session: {:#}", e);
            let nav = NavBar::for_session(&state.session, "/logout").await;
            let body = html_page(views::message(
                &nav,
                "error",
                "Logout failed. Please try again.",
            ));
            (StatusCode::INTERNAL_SERVER_ERROR, body).into_response()
        }
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{signal, SignalKind};
        match signal(SignalKind::terminate()) {
            Ok(mut term) => {
                term.recv().await;
            }
            Err(e) => {
                error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Shutdown signal received (Ctrl+C)");
        }
        _ = terminate => {
            info!("Shutdown signal received (SIGTERM)");
        }
    }
}
