use serde::Serialize;

use crate::models::UserProfile;
use crate::session::SessionContext;

const TMDB_AVATAR_BASE: &str = "https://www.themoviedb.org/t/p/w64_and_h64_face";
const GRAVATAR_BASE: &str = "https://www.gravatar.com/avatar";

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Tab {
    pub name: &'static str,
    pub href: &'static str,
    pub active: bool,
}

/// Right-hand side of the navigation bar.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum NavAccount {
    Login {
        href: &'static str,
    },
    UserMenu {
        display_name: String,
        avatar_url: String,
        favorites_href: &'static str,
        logout_href: &'static str,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NavBar {
    pub tabs: Vec<Tab>,
    pub account: NavAccount,
}

const TABS: [(&str, &str, Option<&str>); 3] = [
    ("Recommendations", "/recommendations", Some("/form-recommendation")),
    ("Actors", "/actors", None),
    ("Movies", "/movies", None),
];

impl NavBar {
    pub fn build(user: Option<&UserProfile>, current_path: &str) -> Self {
        let tabs = TABS
            .iter()
            .map(|&(name, href, alias)| Tab {
                name,
                href,
                active: current_path == href || Some(current_path) == alias,
            })
            .collect();
        let account = match user {
            None => NavAccount::Login { href: "/login" },
            Some(user) => NavAccount::UserMenu {
                display_name: display_name(user).to_string(),
                avatar_url: avatar_url(user),
                favorites_href: "/favorites",
                logout_href: "/logout",
            },
        };
        Self { tabs, account }
    }

    pub async fn for_session(session: &SessionContext, current_path: &str) -> Self {
        let user = session.user().await;
        Self::build(user.as_ref(), current_path)
    }

    pub fn is_logged_in(&self) -> bool {
        matches!(self.account, NavAccount::UserMenu { .. })
    }
}

pub fn display_name(user: &UserProfile) -> &str {
    user.name
        .as_deref()
        .filter(|n| !n.trim().is_empty())
        .unwrap_or("Unnamed")
}

/// TMDB face thumbnail when the account has one, Gravatar otherwise.
pub fn avatar_url(user: &UserProfile) -> String {
    let tmdb_path = user
        .avatar
        .tmdb
        .as_ref()
        .and_then(|t| t.avatar_path.as_deref())
        .filter(|p| !p.is_empty());
    if let Some(path) = tmdb_path {
        return format!("{TMDB_AVATAR_BASE}{path}");
    }
    let hash = user
        .avatar
        .gravatar
        .as_ref()
        .and_then(|g| g.hash.as_deref())
        .unwrap_or_default();
    format!("{GRAVATAR_BASE}/{hash}?s=64")
}
