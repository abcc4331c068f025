//! OAuth 2.0 device authorization grant against the Microsoft identity platform.
//!
//! The user is shown a short code and a URL, signs in from any browser, and
//! the CLI polls the token endpoint until the login completes. When the
//! `offline_access` scope is granted the returned refresh token is kept in
//! memory, and later acquisitions (after the API rejected the access token)
//! first try a silent refresh before asking the user again.

use std::sync::{Mutex, PoisonError};
use std::thread;
use std::time::{Duration, Instant};

use reqwest::blocking::Client;
use serde::Deserialize;

use super::{AuthError, TokenSource};

/// Default authority host.
pub const LOGIN_HOST: &str = "https://login.microsoftonline.com";

const DEVICE_CODE_GRANT: &str = "urn:ietf:params:oauth:grant-type:device_code";

/// Extra seconds added to the polling interval on `slow_down`.
const SLOW_DOWN_STEP: u64 = 5;

/// Build the authority URL for a tenant (`common` when none is configured).
#[must_use]
pub fn authority_url(tenant_id: Option<&str>) -> String {
    let tenant = tenant_id
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .unwrap_or("common");
    format!("{LOGIN_HOST}/{tenant}")
}

#[derive(Debug, Deserialize)]
struct DeviceCodeResponse {
    device_code: String,
    user_code: String,
    verification_uri: String,
    expires_in: u64,
    #[serde(default)]
    interval: Option<u64>,
    #[serde(default)]
    message: Option<String>,
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default)]
    refresh_token: Option<String>,
}

#[derive(Debug, Deserialize)]
struct TokenErrorResponse {
    error: String,
    #[serde(default)]
    error_description: Option<String>,
}

/// One answer from the token endpoint while polling.
#[derive(Debug)]
enum PollOutcome {
    Issued(TokenResponse),
    Pending,
    SlowDown,
}

/// Interpret a token endpoint reply.
fn parse_token_reply(success: bool, body: &str) -> Result<PollOutcome, AuthError> {
    if success {
        return serde_json::from_str::<TokenResponse>(body)
            .map(PollOutcome::Issued)
            .map_err(|e| AuthError::Malformed(e.to_string()));
    }

    let reply: TokenErrorResponse =
        serde_json::from_str(body).map_err(|e| AuthError::Malformed(e.to_string()))?;
    match reply.error.as_str() {
        "authorization_pending" => Ok(PollOutcome::Pending),
        "slow_down" => Ok(PollOutcome::SlowDown),
        "expired_token" => Err(AuthError::Expired),
        _ => Err(AuthError::Denied {
            description: reply.error_description.unwrap_or_default(),
            code: reply.error,
        }),
    }
}

/// Device-code login with an in-memory refresh token.
#[derive(Debug)]
pub struct DeviceCodeFlow {
    http: Client,
    authority: String,
    client_id: String,
    scopes: Vec<String>,
    refresh_token: Mutex<Option<String>>,
}

impl DeviceCodeFlow {
    /// Create a flow for an application registration.
    #[must_use]
    pub fn new(http: Client, authority: String, client_id: String, scopes: Vec<String>) -> Self {
        Self {
            http,
            authority,
            client_id,
            scopes,
            refresh_token: Mutex::new(None),
        }
    }

    fn scope(&self) -> String {
        self.scopes.join(" ")
    }

    fn endpoint(&self, name: &str) -> String {
        format!("{}/oauth2/v2.0/{}", self.authority.trim_end_matches('/'), name)
    }

    fn post_form(&self, url: &str, form: &[(&str, &str)]) -> Result<(bool, String), AuthError> {
        let response = self
            .http
            .post(url)
            .form(form)
            .send()
            .map_err(|e| AuthError::Transport(e.to_string()))?;
        let success = response.status().is_success();
        let body = response
            .text()
            .map_err(|e| AuthError::Transport(e.to_string()))?;
        Ok((success, body))
    }

    fn remember(&self, token: TokenResponse) -> String {
        if let Some(refresh) = token.refresh_token {
            *self
                .refresh_token
                .lock()
                .unwrap_or_else(PoisonError::into_inner) = Some(refresh);
        }
        token.access_token
    }

    /// Redeem a refresh token without user interaction.
    fn refresh(&self, refresh_token: &str) -> Result<String, AuthError> {
        let scope = self.scope();
        let (success, body) = self.post_form(
            &self.endpoint("token"),
            &[
                ("grant_type", "refresh_token"),
                ("client_id", self.client_id.as_str()),
                ("refresh_token", refresh_token),
                ("scope", scope.as_str()),
            ],
        )?;

        match parse_token_reply(success, &body)? {
            PollOutcome::Issued(token) => Ok(self.remember(token)),
            PollOutcome::Pending | PollOutcome::SlowDown => Err(AuthError::Malformed(
                "unexpected pending state for refresh grant".to_string(),
            )),
        }
    }

    /// Run the interactive device login.
    fn device_login(&self) -> Result<String, AuthError> {
        let scope = self.scope();
        let (success, body) = self.post_form(
            &self.endpoint("devicecode"),
            &[("client_id", self.client_id.as_str()), ("scope", scope.as_str())],
        )?;
        if !success {
            let reply: TokenErrorResponse =
                serde_json::from_str(&body).map_err(|e| AuthError::Malformed(e.to_string()))?;
            return Err(AuthError::Denied {
                description: reply.error_description.unwrap_or_default(),
                code: reply.error,
            });
        }

        let grant: DeviceCodeResponse =
            serde_json::from_str(&body).map_err(|e| AuthError::Malformed(e.to_string()))?;

        match &grant.message {
            Some(message) => eprintln!("{message}"),
            None => eprintln!(
                "To sign in, open {} and enter the code {}",
                grant.verification_uri, grant.user_code
            ),
        }

        let deadline = Instant::now() + Duration::from_secs(grant.expires_in);
        let mut interval = grant.interval.unwrap_or(5);

        loop {
            thread::sleep(Duration::from_secs(interval));
            if Instant::now() >= deadline {
                return Err(AuthError::Expired);
            }

            let (success, body) = self.post_form(
                &self.endpoint("token"),
                &[
                    ("grant_type", DEVICE_CODE_GRANT),
                    ("client_id", self.client_id.as_str()),
                    ("device_code", grant.device_code.as_str()),
                ],
            )?;

            match parse_token_reply(success, &body)? {
                PollOutcome::Issued(token) => {
                    log::info!("Signed in");
                    return Ok(self.remember(token));
                }
                PollOutcome::Pending => log::trace!("Waiting for device login"),
                PollOutcome::SlowDown => {
                    interval += SLOW_DOWN_STEP;
                    log::debug!("Token endpoint asked to slow down, polling every {interval}s");
                }
            }
        }
    }
}

impl TokenSource for DeviceCodeFlow {
    fn acquire(&self) -> Result<String, AuthError> {
        let refresh = self
            .refresh_token
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();

        if let Some(refresh) = refresh {
            match self.refresh(&refresh) {
                Ok(token) => {
                    log::debug!("Access token renewed silently");
                    return Ok(token);
                }
                Err(e) => log::info!("Silent token renewal failed ({e}), signing in again"),
            }
        }

        self.device_login()
    }
}
