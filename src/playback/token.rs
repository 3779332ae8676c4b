//! Cached streaming-service credentials.
//!
//! The token cache is written once by an external authorization step. This
//! module only reads it, refreshes the access token with the refresh-token
//! grant when it is about to expire, and writes the refreshed token back.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};
use ureq::Agent;

use crate::error::{GameError, Result};

const TOKEN_URL: &str = "https://accounts.spotify.com/api/token";

/// Refresh this many seconds before the recorded expiry.
const EXPIRY_MARGIN_SECS: u64 = 60;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub(crate) struct CachedToken {
    pub access_token: String,
    pub refresh_token: String,
    /// Unix time (seconds) at which `access_token` stops working.
    pub expires_at: u64,
}

impl CachedToken {
    pub fn is_expired(&self, now: u64) -> bool {
        self.expires_at <= now.saturating_add(EXPIRY_MARGIN_SECS)
    }
}

#[derive(Debug, Deserialize)]
struct RefreshResponse {
    access_token: String,
    expires_in: u64,
    /// Only present when the service rotates refresh tokens.
    refresh_token: Option<String>,
}

pub(crate) struct TokenStore {
    path: PathBuf,
    client_id: String,
    client_secret: String,
    token: Option<CachedToken>,
}

impl TokenStore {
    pub fn new(path: PathBuf, client_id: String, client_secret: String) -> Self {
        Self {
            path,
            client_id,
            client_secret,
            token: None,
        }
    }

    /// A valid access token, loading the cache on first use and refreshing
    /// it when expired.
    pub fn access_token(&mut self, agent: &Agent) -> Result<String> {
        if self.token.is_none() {
            self.token = Some(read_cache(&self.path)?);
        }

        let now = unix_now();
        let needs_refresh = self.token.as_ref().is_some_and(|t| t.is_expired(now));
        if needs_refresh {
            self.refresh(agent, now)?;
        }

        self.token
            .as_ref()
            .map(|t| t.access_token.clone())
            .ok_or_else(|| GameError::Backend("no streaming token loaded".to_string()))
    }

    fn refresh(&mut self, agent: &Agent, now: u64) -> Result<()> {
        let Some(current) = self.token.as_ref() else {
            return Err(GameError::Backend("no streaming token loaded".to_string()));
        };

        log::info!("refreshing streaming access token");
        let response: RefreshResponse = agent
            .post(TOKEN_URL)
            .send_form([
                ("grant_type", "refresh_token"),
                ("refresh_token", current.refresh_token.as_str()),
                ("client_id", self.client_id.as_str()),
                ("client_secret", self.client_secret.as_str()),
            ])
            .map_err(|e| GameError::Backend(format!("token refresh failed: {e}")))?
            .body_mut()
            .read_json()
            .map_err(|e| GameError::Backend(format!("token refresh returned bad JSON: {e}")))?;

        let refreshed = apply_refresh(current, response, now);
        if let Err(e) = write_cache(&self.path, &refreshed) {
            log::warn!("could not update token cache {}: {e}", self.path.display());
        }
        self.token = Some(refreshed);
        Ok(())
    }
}

fn apply_refresh(current: &CachedToken, response: RefreshResponse, now: u64) -> CachedToken {
    CachedToken {
        access_token: response.access_token,
        refresh_token: response
            .refresh_token
            .unwrap_or_else(|| current.refresh_token.clone()),
        expires_at: now.saturating_add(response.expires_in),
    }
}

pub(crate) fn read_cache(path: &Path) -> Result<CachedToken> {
    let text = fs::read_to_string(path).map_err(|e| {
        GameError::Backend(format!(
            "no cached streaming token at {} ({e}); authorize the account first",
            path.display()
        ))
    })?;
    serde_json::from_str(&text).map_err(|e| {
        GameError::Backend(format!("token cache {} is malformed: {e}", path.display()))
    })
}

pub(crate) fn write_cache(path: &Path, token: &CachedToken) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    let text = serde_json::to_string_pretty(token)
        .map_err(|e| GameError::Backend(format!("cannot serialize token: {e}")))?;
    fs::write(path, text)?;
    Ok(())
}

fn unix_now() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}
