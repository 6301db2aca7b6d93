//! Deckbox.org fetcher implementation
//!
//! Lists are pulled through the site's CSV export endpoint with an
//! authenticated session cookie. Login is a two-step dance: fetch the login
//! page for a pre-session cookie and the form's authenticity token, then
//! post the credentials and keep the refreshed cookie.

use crate::error::{Error, Result};
use crate::fetch::session::{Authenticator, SessionManager, SessionToken};
use crate::fetch::{FetchedList, RemoteListFetcher};
use crate::model::build_card_map;
use async_trait::async_trait;
use regex::Regex;
use reqwest::header::{HeaderMap, COOKIE, SET_COOKIE};
use reqwest::{Client, StatusCode};
use std::collections::HashMap;
use std::sync::{Arc, OnceLock};

const SESSION_COOKIE_NAME: &str = "_tcg_session";
pub const DEFAULT_BASE_URL: &str = "https://deckbox.org";

/// Credentials and endpoint for the deckbox.org source.
#[derive(Debug, Clone)]
pub struct DeckboxConfig {
    pub base_url: String,
    pub login: String,
    pub password: String,
}

impl DeckboxConfig {
    pub fn new(login: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            login: login.into(),
            password: password.into(),
        }
    }
}

fn token_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r#"name="authenticity_token"[^>]*value="([^"]+)""#)
            .expect("authenticity token pattern is valid")
    })
}

/// Extract the login form's authenticity token from the login page body.
fn parse_authenticity_token(body: &str) -> Option<String> {
    token_pattern()
        .captures(body)
        .map(|caps| caps[1].to_string())
}

/// Extract the session cookie value from response headers.
fn session_cookie(headers: &HeaderMap) -> Option<String> {
    headers.get_all(SET_COOKIE).iter().find_map(|value| {
        let value = value.to_str().ok()?;
        let rest = value.strip_prefix(&format!("{SESSION_COOKIE_NAME}="))?;
        Some(rest.split(';').next().unwrap_or(rest).to_string())
    })
}

/// CSV export bodies start with a header row; an HTML body means the
/// session is dead or the list does not exist.
fn looks_like_html(body: &str) -> bool {
    body.trim_start().starts_with('<')
}

/// Parse the CSV export into a normalized card map.
///
/// Duplicate name rows (different editions, conditions, foils) are summed.
fn parse_export_csv(body: &str) -> Result<HashMap<String, u32>> {
    let mut reader = csv::Reader::from_reader(body.as_bytes());
    let headers = reader
        .headers()
        .map_err(|e| Error::remote_unavailable(format!("malformed export: {e}")))?;
    let name_idx = headers.iter().position(|h| h == "Name");
    let count_idx = headers.iter().position(|h| h == "Count");
    let (Some(name_idx), Some(count_idx)) = (name_idx, count_idx) else {
        return Err(Error::remote_unavailable(
            "export is missing the Name/Count columns",
        ));
    };

    let mut rows: Vec<(String, i64)> = Vec::new();
    for record in reader.records() {
        let record =
            record.map_err(|e| Error::remote_unavailable(format!("malformed export: {e}")))?;
        let name = record.get(name_idx).unwrap_or("").to_string();
        let count = record
            .get(count_idx)
            .and_then(|c| c.trim().parse::<i64>().ok())
            .unwrap_or(0);
        rows.push((name, count));
    }
    Ok(build_card_map(rows))
}

/// Authenticator for deckbox.org.
pub struct DeckboxAuthenticator {
    http: Client,
    config: DeckboxConfig,
}

impl DeckboxAuthenticator {
    pub fn new(http: Client, config: DeckboxConfig) -> Self {
        Self { http, config }
    }
}

#[async_trait]
impl Authenticator for DeckboxAuthenticator {
    async fn login(&self) -> Result<SessionToken> {
        let login_url = format!("{}/accounts/login", self.config.base_url);

        let response = self.http.get(&login_url).send().await?;
        let pre_session = session_cookie(response.headers()).ok_or_else(|| {
            Error::remote_unavailable("login page did not set a session cookie")
        })?;
        let body = response.text().await?;
        let token = parse_authenticity_token(&body).ok_or_else(|| {
            Error::remote_unavailable("login page did not contain an authenticity token")
        })?;

        let response = self
            .http
            .post(&login_url)
            .query(&[
                ("authenticity_token", token.as_str()),
                ("return_to", "/"),
                ("login", self.config.login.as_str()),
                ("password", self.config.password.as_str()),
                ("remember_me", "on"),
            ])
            .header(COOKIE, format!("{SESSION_COOKIE_NAME}={pre_session};"))
            .send()
            .await?;
        let authenticated = session_cookie(response.headers())
            .ok_or_else(|| Error::remote_unavailable("login rejected by remote source"))?;

        log::debug!("authenticated against {}", self.config.base_url);
        Ok(SessionToken::new(authenticated))
    }
}

/// `RemoteListFetcher` over the deckbox.org CSV export.
pub struct DeckboxFetcher {
    http: Client,
    session: Arc<SessionManager>,
    base_url: String,
}

impl DeckboxFetcher {
    /// Build a fetcher with its own session manager.
    pub fn new(config: DeckboxConfig, session_max_age_minutes: i64) -> Result<Self> {
        let http = Client::builder()
            .build()
            .map_err(|e| Error::remote_unavailable(e.to_string()))?;
        let base_url = config.base_url.clone();
        let authenticator = DeckboxAuthenticator::new(http.clone(), config);
        let session = Arc::new(SessionManager::new(
            Arc::new(authenticator),
            session_max_age_minutes,
        ));
        Ok(Self {
            http,
            session,
            base_url,
        })
    }

    async fn download_export(&self, list_id: &str, token: &SessionToken) -> Result<String> {
        let url = format!(
            "{}/sets/export/{}?format=csv&f=&s=&o=&columns=",
            self.base_url, list_id
        );
        let response = self
            .http
            .get(&url)
            .header(
                COOKIE,
                format!("{SESSION_COOKIE_NAME}={};", token.as_str()),
            )
            .send()
            .await?;
        if response.status() == StatusCode::NOT_FOUND {
            return Err(Error::remote_list_not_found(list_id));
        }
        if !response.status().is_success() {
            return Err(Error::remote_unavailable(format!(
                "export returned HTTP {}",
                response.status()
            )));
        }
        Ok(response.text().await?)
    }
}

#[async_trait]
impl RemoteListFetcher for DeckboxFetcher {
    async fn fetch_list(&self, list_id: &str) -> Result<FetchedList> {
        let token = self.session.current().await?;
        let mut body = self.download_export(list_id, &token).await?;

        if looks_like_html(&body) {
            // Either the session died early or the list is gone; a fresh
            // login distinguishes the two.
            log::debug!("export for '{list_id}' returned HTML, re-authenticating");
            self.session.invalidate().await;
            let token = self.session.current().await?;
            body = self.download_export(list_id, &token).await?;
            if looks_like_html(&body) {
                return Err(Error::remote_list_not_found(list_id));
            }
        }

        Ok(FetchedList {
            cards: parse_export_csv(&body)?,
        })
    }
}
