//! HTML pages. Templates live here as minijinja sources; `.html` names turn on
//! auto-escaping.

use anyhow::{Context, Result};
use minijinja::{context, Environment};
use once_cell::sync::Lazy;
use serde::Serialize;

use crate::models::{Actor, FavoriteMovie, Movie, RecommendedMovie, SearchHit, SearchKind};
use crate::nav::NavBar;
use crate::pagination::PageControls;
use crate::search::{search_href, Detail};

pub const POSTER_BASE: &str = "https://image.tmdb.org/t/p/w500";

const BASE: &str = r#"<!doctype html>
<html lang="en">
<head>
<meta charset="utf-8">
<title>{% block title %}MovieDB{% endblock %}</title>
</head>
<body>
<nav>
  <a class="brand" href="/">MovieDB</a>
  {% for tab in nav.tabs %}<a href="{{ tab.href }}"{% if tab.active %} class="active"{% endif %}>{{ tab.name }}</a>
  {% endfor %}
  {% if nav.account.kind == "login" %}
  <a class="login" href="{{ nav.account.href }}">Login via TMDB</a>
  {% else %}
  <details class="user-menu">
    <summary><img src="{{ nav.account.avatar_url }}" alt="Avatar" width="40" height="40"></summary>
    <div class="user-name">{{ nav.account.display_name }}</div>
    <a href="{{ nav.account.favorites_href }}">Favorites</a>
    <form method="post" action="{{ nav.account.logout_href }}"><button type="submit">Logout</button></form>
  </details>
  {% endif %}
</nav>
<main>
{% block content %}{% endblock %}
</main>
</body>
</html>
"#;

const CARDS: &str = r#"{% macro cards(items) %}
<ul class="grid">
{% for card in items %}
  <li class="card"><a href="{{ card.href }}">
    {% if card.poster_url %}<img src="{{ card.poster_url }}" alt="{{ card.label }}">{% endif %}
    <h3>{{ card.label }}</h3>
    {% if card.detail %}<span class="detail">{{ card.detail }}</span>{% endif %}
  </a></li>
{% endfor %}
</ul>
{% endmacro %}
{% macro paginator(p) %}
{% if p %}
<div class="pager">
  {% if p.prev_href %}<a href="{{ p.prev_href }}">Previous</a>{% else %}<span class="disabled">Previous</span>{% endif %}
  <span>{{ p.label }}</span>
  {% if p.next_href %}<a href="{{ p.next_href }}">Next</a>{% else %}<span class="disabled">Next</span>{% endif %}
</div>
{% endif %}
{% endmacro %}
"#;

const HOME: &str = r#"{% extends "base.html" %}
{% block content %}
{% from "cards.html" import cards %}
<h1>Search movies and actors</h1>
<form method="get" action="/">
  <input type="search" name="q" value="{{ query }}" placeholder="Search...">
  <select name="type">
    <option value="movie"{% if kind == "movie" %} selected{% endif %}>Movie</option>
    <option value="actor"{% if kind == "actor" %} selected{% endif %}>Actor</option>
  </select>
  <button type="submit">Search</button>
</form>
{% if searched %}
  {% if results %}{{ cards(results) }}{% else %}<p class="empty">No results found.</p>{% endif %}
{% endif %}
{% if detail %}
<section class="detail">
  <h2>{{ detail.heading }}</h2>
  {% if detail.entries %}{{ cards(detail.entries) }}{% else %}<p class="empty">{{ detail.empty }}</p>{% endif %}
</section>
{% endif %}
{% endblock %}
"#;

const LISTING: &str = r#"{% extends "base.html" %}
{% block title %}{{ heading }}{% endblock %}
{% block content %}
{% from "cards.html" import cards, paginator %}
<h1>{{ heading }}</h1>
<p class="count">({{ total }} {{ noun }})</p>
<form method="get" action="{{ base_path }}">
  <input type="hidden" name="page" value="{{ page }}">
  <input type="search" name="q" value="{{ query }}" placeholder="Filter {{ noun }}...">
  <button type="submit">Filter</button>
</form>
{% if items %}{{ cards(items) }}{% else %}<p class="empty">No {{ noun }} on this page.</p>{% endif %}
{{ paginator(pager) }}
{% endblock %}
"#;

const FAVORITES: &str = r#"{% extends "base.html" %}
{% block title %}My Favorites{% endblock %}
{% block content %}
{% from "cards.html" import cards, paginator %}
<h1>My Favorite Movies</h1>
{% if items %}{{ cards(items) }}{% else %}<p class="empty">You have no favorite movies yet.</p>{% endif %}
{{ paginator(pager) }}
{% endblock %}
"#;

const RECOMMENDATIONS: &str = r#"{% extends "base.html" %}
{% block title %}Recommendations{% endblock %}
{% block content %}
{% from "cards.html" import cards %}
<h1>Recommended for you</h1>
{% if not started %}
<p>Click the button below to start your personalized recommendation using your TMDB favorite movies.</p>
<form method="post" action="/recommendations"><button type="submit">Get my recommendation</button></form>
<p>Prefer to describe what you want? <a href="/form-recommendation">Go to form-based recommendation</a></p>
{% elif items %}
<form method="post" action="/recommendations"><button type="submit">Get another set of recommendations</button></form>
{{ cards(items) }}
{% else %}
<p class="empty">No recommendations right now.</p>
{% endif %}
{% endblock %}
"#;

const FORM: &str = r#"{% extends "base.html" %}
{% block title %}Movie Recommendation Assistant{% endblock %}
{% block content %}
<h1>Movie Recommendation Assistant</h1>
<p>Tell us what you like and we will pick a movie just for you.</p>
<form method="post" action="/form-recommendation">
{% for field in fields %}
  <label>{{ field.label }}
    <select name="{{ field.name }}">
    {% for opt in field.options %}<option{% if opt == field.selected %} selected{% endif %}>{{ opt }}</option>{% endfor %}
    </select>
  </label>
{% endfor %}
  <textarea name="description" rows="4" placeholder="Example: A feel-good romantic comedy set in Paris with a twist ending...">{{ description }}</textarea>
  <button type="submit">✨ Recommend a Movie</button>
</form>
{% if recommendation %}<article class="recommendation">{{ recommendation|safe }}</article>{% endif %}
{% endblock %}
"#;

const MESSAGE: &str = r#"{% extends "base.html" %}
{% block content %}<p class="{{ class }}">{{ message }}</p>{% endblock %}
"#;

const TEMPLATE_SOURCES: [(&str, &str); 8] = [
    ("base.html", BASE),
    ("cards.html", CARDS),
    ("home.html", HOME),
    ("listing.html", LISTING),
    ("favorites.html", FAVORITES),
    ("recommendations.html", RECOMMENDATIONS),
    ("form.html", FORM),
    ("message.html", MESSAGE),
];

static TEMPLATES: Lazy<Environment<'static>> = Lazy::new(|| {
    let mut env = Environment::new();
    for (name, source) in TEMPLATE_SOURCES {
        if let Err(e) = env.add_template(name, source) {
            tracing::error!("Template {} failed to compile: {}", name, e);
        }
    }
    env
});

fn render<S: Serialize>(name: &str, ctx: S) -> Result<String> {
    TEMPLATES
        .get_template(name)
        .with_context(|| format!("template {name} missing"))?
        .render(ctx)
        .with_context(|| format!("rendering {name} failed"))
}

#[derive(Debug, Clone, Serialize)]
pub struct Card {
    pub label: String,
    pub detail: Option<String>,
    pub href: String,
    pub poster_url: Option<String>,
}

impl Card {
    pub fn movie(m: &Movie) -> Self {
        Self {
            label: m.title.clone(),
            detail: m.year.clone(),
            href: search_href(SearchKind::Movie, &m.title),
            poster_url: None,
        }
    }

    pub fn actor(a: &Actor) -> Self {
        Self {
            label: a.name.clone(),
            detail: a.date_of_birth.clone(),
            href: search_href(SearchKind::Actor, &a.name),
            poster_url: None,
        }
    }

    pub fn favorite(f: &FavoriteMovie) -> Self {
        Self {
            label: f.title.clone(),
            detail: f.release_date.clone(),
            href: search_href(SearchKind::Movie, &f.title),
            poster_url: poster_url(f.poster_path.as_deref()),
        }
    }

    pub fn recommended(r: &RecommendedMovie) -> Self {
        Self {
            label: r.title.clone(),
            detail: r.release_date.clone(),
            href: search_href(SearchKind::Movie, &r.title),
            poster_url: poster_url(r.poster_path.as_deref()),
        }
    }

    pub fn hit(hit: &SearchHit) -> Self {
        match hit {
            SearchHit::Movie(m) => Self::movie(m),
            SearchHit::Actor(a) => Self::actor(a),
        }
    }
}

fn poster_url(path: Option<&str>) -> Option<String> {
    path.filter(|p| !p.is_empty())
        .map(|p| format!("{POSTER_BASE}{p}"))
}

/// Paginator links; a disabled button has no href.
#[derive(Debug, Clone, Serialize)]
pub struct Pager {
    pub label: String,
    pub prev_href: Option<String>,
    pub next_href: Option<String>,
}

impl Pager {
    pub fn from_controls(controls: Option<PageControls>, base_path: &str, query: &str) -> Option<Self> {
        let controls = controls?;
        let link = |page: u32| {
            if query.is_empty() {
                format!("{base_path}?page={page}")
            } else {
                format!("{base_path}?page={page}&q={}", urlencoding::encode(query))
            }
        };
        Some(Self {
            prev_href: (!controls.prev_disabled).then(|| link(controls.previous())),
            next_href: (!controls.next_disabled).then(|| link(controls.next())),
            label: controls.label,
        })
    }
}

/// Cast or filmography panel on the home page.
#[derive(Debug, Clone, Serialize)]
pub struct DetailPanel {
    pub heading: String,
    pub entries: Vec<Card>,
    pub empty: &'static str,
}

impl DetailPanel {
    pub fn from_detail(detail: &Detail) -> Self {
        match detail {
            Detail::Cast { title, cast: None } => Self {
                heading: format!("Cast of {title}"),
                entries: Vec::new(),
                empty: NO_CAST,
            },
            Detail::Cast {
                cast: Some(cast), ..
            } => Self {
                heading: match cast.movie.year.as_deref() {
                    Some(year) => format!("Cast of {} ({year})", cast.movie.title),
                    None => format!("Cast of {}", cast.movie.title),
                },
                entries: cast.actors.iter().map(Card::actor).collect(),
                empty: NO_CAST,
            },
            Detail::Filmography { name, films: None } => Self {
                heading: format!("Filmography of {name}"),
                entries: Vec::new(),
                empty: NO_FILMS,
            },
            Detail::Filmography {
                films: Some(films), ..
            } => Self {
                heading: format!("Filmography of {}", films.actor.name),
                entries: films.movies.iter().map(Card::movie).collect(),
                empty: NO_FILMS,
            },
        }
    }
}

const NO_CAST: &str = "No cast information found for this movie.";
const NO_FILMS: &str = "No movies found for this actor.";

pub struct ListingPage<'a> {
    pub heading: &'a str,
    pub noun: &'a str,
    pub base_path: &'a str,
    pub page: u32,
    pub total: u64,
    pub query: &'a str,
    pub items: Vec<Card>,
    pub pager: Option<Pager>,
}

#[derive(Debug, Clone, Serialize)]
pub struct SelectField {
    pub name: &'static str,
    pub label: &'static str,
    pub options: &'static [&'static str],
    pub selected: String,
}

pub fn home(
    nav: &NavBar,
    query: &str,
    kind: SearchKind,
    results: Option<Vec<Card>>,
    detail: Option<DetailPanel>,
) -> Result<String> {
    render(
        "home.html",
        context! {
            nav => nav,
            query => query,
            kind => kind.as_path(),
            searched => results.is_some(),
            results => results.unwrap_or_default(),
            detail => detail,
        },
    )
}

pub fn listing(nav: &NavBar, page: ListingPage<'_>) -> Result<String> {
    render(
        "listing.html",
        context! {
            nav => nav,
            heading => page.heading,
            noun => page.noun,
            base_path => page.base_path,
            page => page.page,
            total => page.total,
            query => page.query,
            items => page.items,
            pager => page.pager,
        },
    )
}

pub fn favorites(nav: &NavBar, items: Vec<Card>, pager: Option<Pager>) -> Result<String> {
    render(
        "favorites.html",
        context! { nav => nav, items => items, pager => pager },
    )
}

pub fn recommendations(nav: &NavBar, started: bool, items: Vec<Card>) -> Result<String> {
    render(
        "recommendations.html",
        context! { nav => nav, started => started, items => items },
    )
}

pub fn recommend_form(
    nav: &NavBar,
    fields: Vec<SelectField>,
    description: &str,
    recommendation_html: Option<String>,
) -> Result<String> {
    render(
        "form.html",
        context! {
            nav => nav,
            fields => fields,
            description => description,
            recommendation => recommendation_html,
        },
    )
}

pub fn message(nav: &NavBar, class: &str, message: &str) -> Result<String> {
    render(
        "message.html",
        context! { nav => nav, class => class, message => message },
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ActorFilmography;
    use crate::pagination::controls;

    #[test]
    fn pager_links_follow_disabled_state() {
        let first = Pager::from_controls(controls(1, 100, 33), "/movies", "").unwrap();
        assert!(first.prev_href.is_none());
        assert_eq!(first.next_href.as_deref(), Some("/movies?page=2"));

        let last = Pager::from_controls(controls(4, 100, 33), "/movies", "al pa").unwrap();
        assert_eq!(last.prev_href.as_deref(), Some("/movies?page=3&q=al%20pa"));
        assert!(last.next_href.is_none());

        assert!(Pager::from_controls(controls(1, 10, 33), "/movies", "").is_none());
    }

    #[test]
    fn card_text_is_escaped() {
        let nav = NavBar::build(None, "/");
        let cards = vec![Card {
            label: "<i>Evil</i>".to_string(),
            detail: None,
            href: "/".to_string(),
            poster_url: None,
        }];
        let html = home(&nav, "x", SearchKind::Movie, Some(cards), None).unwrap();
        assert!(html.contains("&lt;i&gt;Evil&lt;"));
        assert!(!html.contains("<i>"));
        assert!(html.contains("Login via TMDB"));
    }

    #[test]
    fn home_without_search_shows_no_empty_state() {
        let nav = NavBar::build(None, "/");
        let html = home(&nav, "", SearchKind::Movie, None, None).unwrap();
        assert!(!html.contains("No results found."));
        let html = home(&nav, "zzz", SearchKind::Movie, Some(Vec::new()), None).unwrap();
        assert!(html.contains("No results found."));
    }

    #[test]
    fn every_template_compiles() {
        let mut env = Environment::new();
        for (name, source) in TEMPLATE_SOURCES {
            if let Err(e) = env.add_template(name, source) {
                panic!("{name} does not compile: {e}");
            }
        }
        for (name, _) in TEMPLATE_SOURCES {
            assert!(TEMPLATES.get_template(name).is_ok(), "{name} not loaded");
        }
    }

    #[test]
    fn detail_panel_headings_and_empty_state() {
        let missing = DetailPanel::from_detail(&Detail::Cast {
            title: "Heat".to_string(),
            cast: None,
        });
        assert_eq!(missing.heading, "Cast of Heat");
        assert!(missing.entries.is_empty());

        let films = DetailPanel::from_detail(&Detail::Filmography {
            name: "Al Pacino".to_string(),
            films: Some(ActorFilmography {
                actor: Actor {
                    name: "Al Pacino".to_string(),
                    date_of_birth: None,
                    gender: None,
                    date_of_death: None,
                    profile_path: None,
                },
                movies: vec![Movie {
                    title: "Heat".to_string(),
                    year: Some("1995".to_string()),
                    release_date: None,
                    poster_path: None,
                }],
            }),
        });
        assert_eq!(films.heading, "Filmography of Al Pacino");
        assert_eq!(films.entries[0].href, "/?q=Heat&type=movie");

        let nav = NavBar::build(None, "/");
        let html = home(&nav, "Heat", SearchKind::Movie, Some(Vec::new()), Some(missing)).unwrap();
        assert!(html.contains("No cast information found for this movie."));
    }

    #[test]
    fn favorites_poster_uses_w500() {
        let card = Card::favorite(&FavoriteMovie {
            id: Some(1),
            title: "Heat".to_string(),
            release_date: None,
            poster_path: Some("/heat.jpg".to_string()),
        });
        assert_eq!(
            card.poster_url.as_deref(),
            Some("https://image.tmdb.org/t/p/w500/heat.jpg")
        );
        assert_eq!(card.href, "/?q=Heat&type=movie");
    }
}
