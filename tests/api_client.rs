//! Integration tests for the backend HTTP client.

use reelscout::api::{ApiService, BackendApi};
use reelscout::models::{FormRecommendationRequest, SearchHit, SearchKind};
use serde_json::json;
use wiremock::matchers::{body_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

async fn client(server: &MockServer) -> ApiService {
    ApiService::new(format!("{}/", server.uri())).unwrap()
}

#[tokio::test]
async fn fetch_data_returns_raw_response_for_errors() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/movies_count"))
        .respond_with(ResponseTemplate::new(503).set_body_string("down"))
        .mount(&server)
        .await;

    let api = client(&server).await;
    let res = api.fetch_data("/movies_count").await.unwrap();
    assert_eq!(res.status().as_u16(), 503);
    assert_eq!(res.text().await.unwrap(), "down");

    let err = api.movies_count().await.unwrap_err();
    assert!(format!("{err:#}").contains("503"));
}

#[tokio::test]
async fn empty_actor_page_parses_to_nothing() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/actors"))
        .and(query_param("page", "2"))
        .and(query_param("size", "33"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .expect(1)
        .mount(&server)
        .await;

    let api = client(&server).await;
    let actors = api.list_actors(2, 33).await.unwrap();
    assert!(actors.is_empty());
}

#[tokio::test]
async fn counts_and_pages_parse() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/movies"))
        .and(query_param("page", "1"))
        .and(query_param("size", "33"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {"title": "Zeta", "year": "2001"},
            {"title": "Alpha", "year": 1999}
        ])))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/movies_count"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"total": 66})))
        .mount(&server)
        .await;

    let api = client(&server).await;
    let movies = api.list_movies(1, 33).await.unwrap();
    assert_eq!(movies.len(), 2);
    assert_eq!(movies[1].year.as_deref(), Some("1999"));
    assert_eq!(api.movies_count().await.unwrap(), 66);
}

#[tokio::test]
async fn auth_endpoints_pass_tokens_through() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/tmdb/request-token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"request_token": "abc"})))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/tmdb/create-session"))
        .and(query_param("request_token", "abc"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"session_id": "s-1"})))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/tmdb/account"))
        .and(query_param("session_id", "s-1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": 5,
            "name": "Ada",
            "avatar": {"gravatar": {"hash": "h"}, "tmdb": {"avatar_path": null}}
        })))
        .mount(&server)
        .await;

    let api = client(&server).await;
    let token = api.request_token().await.unwrap();
    let session_id = api.create_session(&token).await.unwrap();
    let user = api.account(&session_id).await.unwrap();
    assert_eq!(user.name.as_deref(), Some("Ada"));
    assert_eq!(
        user.avatar.gravatar.and_then(|g| g.hash).as_deref(),
        Some("h")
    );
}

#[tokio::test]
async fn favorites_and_recommendations_use_session() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/tmdb/favorites"))
        .and(query_param("session_id", "s 1"))
        .and(query_param("page", "3"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "page": 3,
            "results": [{"id": 9, "title": "Heat", "poster_path": "/h.jpg"}],
            "total_results": 41
        })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/recommendations"))
        .and(query_param("session_id", "s 1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "results": [{"title": "Ronin"}]
        })))
        .mount(&server)
        .await;

    let api = client(&server).await;
    let page = api.favorites("s 1", 3).await.unwrap();
    assert_eq!(page.total_results, 41);
    assert_eq!(page.results[0].title, "Heat");
    let recs = api.recommendations("s 1").await.unwrap();
    assert_eq!(recs.results[0].title, "Ronin");
}

#[tokio::test]
async fn form_recommendation_posts_json() {
    let server = MockServer::start().await;
    let request = FormRecommendationRequest {
        genre: "Comedy".to_string(),
        country: "France".to_string(),
        language: "French".to_string(),
        year_range: "2000-2010".to_string(),
        description: "Paris".to_string(),
    };
    Mock::given(method("POST"))
        .and(path("/form-recommendations"))
        .and(header("content-type", "application/json"))
        .and(body_json(json!({
            "genre": "Comedy",
            "country": "France",
            "language": "French",
            "year_range": "2000-2010",
            "description": "Paris"
        })))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({"recommendation": "**Amélie**"})),
        )
        .expect(1)
        .mount(&server)
        .await;

    let api = client(&server).await;
    assert_eq!(api.form_recommendation(&request).await.unwrap(), "**Amélie**");
}

#[tokio::test]
async fn put_data_sends_json_body() {
    let server = MockServer::start().await;
    Mock::given(method("PUT"))
        .and(path("/movies/Heat"))
        .and(header("content-type", "application/json"))
        .and(body_json(json!({"title": "Heat", "year": "1995"})))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    let api = client(&server).await;
    let res = api
        .put_data("/movies/Heat", &json!({"title": "Heat", "year": "1995"}))
        .await
        .unwrap();
    assert!(res.status().is_success());
}

#[tokio::test]
async fn search_and_autocomplete_hit_typed_paths() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/search/actor"))
        .and(query_param("query", "tom h"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {"name": "Tom Hanks", "date_of_birth": "1956-07-09"}
        ])))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/autocomplete/movie"))
        .and(query_param("query", "ali"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!(["Alien", "Aliens"])))
        .mount(&server)
        .await;

    let api = client(&server).await;
    let hits = api.search(SearchKind::Actor, "tom h").await.unwrap();
    assert!(matches!(&hits[0], SearchHit::Actor(a) if a.name == "Tom Hanks"));
    let names = api.autocomplete(SearchKind::Movie, "ali").await.unwrap();
    assert_eq!(names, ["Alien", "Aliens"]);
}

#[tokio::test]
async fn transport_failure_is_an_error() {
    // Nothing listens on port 9 on the loopback interface.
    let api = ApiService::new("http://127.0.0.1:9").unwrap();
    assert!(api.fetch_data("/movies_count").await.is_err());
    assert!(api.list_movies(1, 33).await.is_err());
}

#[tokio::test]
async fn cast_lookup_maps_404_to_none() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/movies/Heat/cast"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "movie": {"title": "Heat", "year": "1995"},
            "actors": [{"name": "Al Pacino"}]
        })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/movies/Nope/cast"))
        .respond_with(
            ResponseTemplate::new(404).set_body_json(json!({"detail": "Movie not found"})),
        )
        .mount(&server)
        .await;

    let api = client(&server).await;
    let cast = api.movie_cast("Heat").await.unwrap().unwrap();
    assert_eq!(cast.actors[0].name, "Al Pacino");
    assert!(api.movie_cast("Nope").await.unwrap().is_none());
}

#[tokio::test]
async fn filmography_null_reads_as_none() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/actors/Pacino/filmography"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "actor": {"name": "Pacino"},
            "movies": [{"title": "Heat", "year": "1995"}, {"title": "Serpico"}]
        })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/actors/Nobody/filmography"))
        .respond_with(ResponseTemplate::new(200).set_body_string("null"))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/actors/Broken/filmography"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let api = client(&server).await;
    let films = api.actor_filmography("Pacino").await.unwrap().unwrap();
    assert_eq!(films.movies.len(), 2);
    assert!(api.actor_filmography("Nobody").await.unwrap().is_none());
    assert!(api.actor_filmography("Broken").await.is_err());
}
