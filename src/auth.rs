//! TMDB login handshake.
//!
//! ```text
//! Anonymous -> TokenRequested -> Authorizing -> (redirect to TMDB)
//!           -> TokenReturned -> SessionEstablished -> ProfileLoaded
//! ProfileLoaded -> (logout) -> Anonymous
//! ```
//!
//! The redirect to TMDB leaves the process, so the return leg starts from a
//! fresh flow: `TokenReturned` is reachable from `Anonymous` as well as from
//! `Authorizing`.

use thiserror::Error;
use tracing::{debug, info, warn};

use crate::api::BackendApi;
use crate::models::UserProfile;
use crate::session::SessionContext;

pub const TMDB_AUTHORIZE_BASE: &str = "https://www.themoviedb.org/authenticate";
pub const CALLBACK_PATH: &str = "/tmdb-auth";

#[derive(Debug, Clone, PartialEq)]
pub enum AuthState {
    Anonymous,
    TokenRequested {
        request_token: String,
    },
    Authorizing {
        request_token: String,
        authorize_url: String,
    },
    TokenReturned {
        request_token: String,
    },
    SessionEstablished {
        session_id: String,
    },
    ProfileLoaded {
        session_id: String,
        user: UserProfile,
    },
}

impl AuthState {
    pub fn name(&self) -> &'static str {
        match self {
            AuthState::Anonymous => "anonymous",
            AuthState::TokenRequested { .. } => "token requested",
            AuthState::Authorizing { .. } => "authorizing",
            AuthState::TokenReturned { .. } => "token returned",
            AuthState::SessionEstablished { .. } => "session established",
            AuthState::ProfileLoaded { .. } => "profile loaded",
        }
    }
}

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("cannot {action} while {state}")]
    InvalidTransition {
        action: &'static str,
        state: &'static str,
    },
    #[error("backend returned an empty {0}")]
    EmptyCredential(&'static str),
    #[error(transparent)]
    Backend(#[from] anyhow::Error),
}

/// Result of handling the return from TMDB.
#[derive(Debug, Clone, PartialEq)]
pub enum LoginOutcome {
    /// No `request_token` on the return URL; nothing happens.
    Parked,
    LoggedIn(UserProfile),
}

#[derive(Debug, Clone)]
pub struct AuthFlow {
    state: AuthState,
    callback_url: String,
}

impl AuthFlow {
    /// `public_url` is the origin TMDB sends the user back to.
    pub fn new(public_url: &str) -> Self {
        Self {
            state: AuthState::Anonymous,
            callback_url: format!("{}{}", public_url.trim_end_matches('/'), CALLBACK_PATH),
        }
    }

    pub fn state(&self) -> &AuthState {
        &self.state
    }

    pub fn callback_url(&self) -> &str {
        &self.callback_url
    }

    fn invalid(&self, action: &'static str) -> AuthError {
        AuthError::InvalidTransition {
            action,
            state: self.state.name(),
        }
    }

    pub async fn request_token(&mut self, api: &dyn BackendApi) -> Result<(), AuthError> {
        if self.state != AuthState::Anonymous {
            return Err(self.invalid("request a token"));
        }
        let request_token = api.request_token().await?;
        if request_token.is_empty() {
            return Err(AuthError::EmptyCredential("request token"));
        }
        debug!("Obtained TMDB request token");
        self.state = AuthState::TokenRequested { request_token };
        Ok(())
    }

    /// Build the TMDB authorization URL and move to `Authorizing`.
    pub fn authorize(&mut self) -> Result<String, AuthError> {
        let AuthState::TokenRequested { request_token } = &self.state else {
            return Err(self.invalid("authorize"));
        };
        let authorize_url = authorize_url(request_token, &self.callback_url);
        self.state = AuthState::Authorizing {
            request_token: request_token.clone(),
            authorize_url: authorize_url.clone(),
        };
        Ok(authorize_url)
    }

    /// Record the token from the return URL. Returns `false` and stays put
    /// when the token is missing.
    pub fn token_returned(&mut self, request_token: Option<&str>) -> Result<bool, AuthError> {
        match &self.state {
            AuthState::Anonymous => {}
            AuthState::Authorizing {
                request_token: issued,
                ..
            } => {
                if request_token.is_some_and(|t| t != issued) {
                    warn!("TMDB returned a different request token than the one issued");
                }
            }
            _ => return Err(self.invalid("accept a returned token")),
        }
        let Some(token) = request_token.map(str::trim).filter(|t| !t.is_empty()) else {
            debug!("Return from TMDB without request_token, staying parked");
            return Ok(false);
        };
        self.state = AuthState::TokenReturned {
            request_token: token.to_string(),
        };
        Ok(true)
    }

    /// Exchange the returned token for a session id and persist it.
    pub async fn establish_session(
        &mut self,
        api: &dyn BackendApi,
        session: &SessionContext,
    ) -> Result<(), AuthError> {
        let AuthState::TokenReturned { request_token } = &self.state else {
            return Err(self.invalid("create a session"));
        };
        let session_id = api.create_session(request_token).await?;
        if session_id.is_empty() {
            return Err(AuthError::EmptyCredential("session id"));
        }
        session.save_session_id(&session_id).await?;
        info!("TMDB session established");
        self.state = AuthState::SessionEstablished { session_id };
        Ok(())
    }

    /// Fetch the account for the session and persist it.
    pub async fn load_profile(
        &mut self,
        api: &dyn BackendApi,
        session: &SessionContext,
    ) -> Result<UserProfile, AuthError> {
        let AuthState::SessionEstablished { session_id } = &self.state else {
            return Err(self.invalid("load the profile"));
        };
        let user = api.account(session_id).await?;
        session.save_user(&user).await?;
        info!(
            "Logged in as '{}'",
            user.name.as_deref().unwrap_or("Unnamed")
        );
        self.state = AuthState::ProfileLoaded {
            session_id: session_id.clone(),
            user: user.clone(),
        };
        Ok(user)
    }
}

impl AuthFlow {
    /// Clear the persisted session and return to `Anonymous`. Allowed from
    /// any state; if the store cannot be cleared the state is left as is.
    pub async fn logout(&mut self, session: &SessionContext) -> Result<(), AuthError> {
        session.logout().await?;
        debug!("Auth flow reset from {}", self.state.name());
        self.state = AuthState::Anonymous;
        Ok(())
    }
}

pub fn authorize_url(request_token: &str, callback_url: &str) -> String {
    format!(
        "{TMDB_AUTHORIZE_BASE}/{}?redirect_to={}",
        urlencoding::encode(request_token),
        urlencoding::encode(callback_url)
    )
}

/// Entry point of the login: fetch a request token and return the TMDB URL
/// to send the user to.
pub async fn begin_login(api: &dyn BackendApi, public_url: &str) -> Result<String, AuthError> {
    let mut flow = AuthFlow::new(public_url);
    flow.request_token(api).await?;
    flow.authorize()
}

/// Return leg: exchange the token, then load and persist the profile.
pub async fn complete_login(
    api: &dyn BackendApi,
    session: &SessionContext,
    public_url: &str,
    request_token: Option<&str>,
) -> Result<LoginOutcome, AuthError> {
    let mut flow = AuthFlow::new(public_url);
    if !flow.token_returned(request_token)? {
        return Ok(LoginOutcome::Parked);
    }
    flow.establish_session(api, session).await?;
    let user = flow.load_profile(api, session).await?;
    Ok(LoginOutcome::LoggedIn(user))
}

/// Logout leg: clear both persisted keys.
pub async fn end_login(session: &SessionContext, public_url: &str) -> Result<(), AuthError> {
    let mut flow = AuthFlow::new(public_url);
    flow.logout(session).await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn authorize_url_embeds_token_and_callback() {
        let url = authorize_url("abc", "http://localhost:3000/tmdb-auth");
        assert_eq!(
            url,
            "https://www.themoviedb.org/authenticate/abc?redirect_to=http%3A%2F%2Flocalhost%3A3000%2Ftmdb-auth"
        );
    }

    #[test]
    fn callback_url_uses_public_origin() {
        let flow = AuthFlow::new("https://movies.example.com/");
        assert_eq!(flow.callback_url(), "https://movies.example.com/tmdb-auth");
        assert_eq!(flow.state(), &AuthState::Anonymous);
    }

    #[test]
    fn missing_token_stays_parked() {
        let mut flow = AuthFlow::new("http://localhost:3000");
        assert!(!flow.token_returned(None).unwrap());
        assert!(!flow.token_returned(Some("  ")).unwrap());
        assert_eq!(flow.state(), &AuthState::Anonymous);
    }

    #[test]
    fn authorize_requires_a_token() {
        let mut flow = AuthFlow::new("http://localhost:3000");
        let err = flow.authorize().unwrap_err();
        assert!(matches!(
            err,
            AuthError::InvalidTransition {
                action: "authorize",
                state: "anonymous"
            }
        ));
    }

    #[test]
    fn returned_token_cannot_be_replayed() {
        let mut flow = AuthFlow::new("http://localhost:3000");
        assert!(flow.token_returned(Some("abc")).unwrap());
        assert_eq!(
            flow.state(),
            &AuthState::TokenReturned {
                request_token: "abc".to_string()
            }
        );
        assert!(flow.token_returned(Some("abc")).is_err());
    }

    #[tokio::test]
    async fn logout_returns_to_anonymous() {
        let session = SessionContext::in_memory();
        session.save_session_id("sess-1").await.unwrap();
        session.save_user(&UserProfile::default()).await.unwrap();

        let mut flow = AuthFlow::new("http://localhost:3000");
        assert!(flow.token_returned(Some("abc")).unwrap());
        flow.logout(&session).await.unwrap();
        assert_eq!(flow.state(), &AuthState::Anonymous);
        assert!(session.session_id().await.is_none());
        assert!(session.user().await.is_none());
    }
}
