use anyhow::{Context, Result, anyhow};
use reqwest::StatusCode;
use reqwest::blocking::RequestBuilder;
use reqwest::header::AUTHORIZATION;
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::http_client::http_client;
use crate::state::{Match, NewMatch, NewPhase, Phase, Team};

/// A response the server actually sent. Transport and decoding problems are
/// reported through `Err` instead.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApiReply<T> {
    Success(T),
    Failure { status: StatusCode },
}

impl<T> ApiReply<T> {
    /// Moves 4xx/5xx answers onto the error path with the status attached.
    /// Only 2xx answers the screen does not accept stay a `Failure`.
    pub fn escalate(self) -> Result<Self> {
        match self {
            ApiReply::Failure { status } if status.is_client_error() || status.is_server_error() => {
                Err(anyhow!("request failed with status {}", status.as_u16()))
            }
            other => Ok(other),
        }
    }
}

/// The REST surface the matches screen talks to.
pub trait TournamentBackend: Send + Sync {
    fn list_matches(&self, tournament_id: &str, token: Option<&str>)
    -> Result<ApiReply<Vec<Match>>>;

    fn list_phases(&self, tournament_id: &str, token: Option<&str>)
    -> Result<ApiReply<Vec<Phase>>>;

    fn list_teams(&self, tournament_id: &str, token: Option<&str>) -> Result<ApiReply<Vec<Team>>>;

    fn delete_match(&self, match_id: &str, token: Option<&str>) -> Result<ApiReply<()>>;

    fn create_phase(
        &self,
        tournament_id: &str,
        token: Option<&str>,
        phase: &NewPhase,
    ) -> Result<ApiReply<()>>;

    fn create_match(
        &self,
        tournament_id: &str,
        token: Option<&str>,
        new_match: &NewMatch,
    ) -> Result<ApiReply<()>>;
}

/// `{success, data}` wrapper used by every list endpoint.
#[derive(Debug, Deserialize)]
pub struct Envelope<T> {
    #[serde(default)]
    pub success: bool,
    pub data: Option<Vec<T>>,
}

pub fn parse_list_envelope<T: DeserializeOwned>(raw: &str) -> Result<Envelope<T>> {
    let trimmed = raw.trim();
    if trimmed.is_empty() || trimmed == "null" {
        return Ok(Envelope {
            success: false,
            data: None,
        });
    }
    serde_json::from_str(trimmed).context("invalid list envelope json")
}

pub fn parse_matches_json(raw: &str) -> Result<Envelope<Match>> {
    parse_list_envelope(raw)
}

pub fn parse_phases_json(raw: &str) -> Result<Envelope<Phase>> {
    parse_list_envelope(raw)
}

pub fn parse_teams_json(raw: &str) -> Result<Envelope<Team>> {
    parse_list_envelope(raw)
}

/// A list only counts when the status is exactly 200 and the body says
/// `success: true`.
pub fn interpret_list_response<T: DeserializeOwned>(
    status: StatusCode,
    body: &str,
) -> Result<ApiReply<Vec<T>>> {
    if status != StatusCode::OK {
        return Ok(ApiReply::Failure { status });
    }
    let envelope = parse_list_envelope::<T>(body)?;
    if !envelope.success {
        return Ok(ApiReply::Failure { status });
    }
    Ok(ApiReply::Success(envelope.data.unwrap_or_default()))
}

pub fn interpret_delete_response(status: StatusCode) -> ApiReply<()> {
    if status == StatusCode::OK {
        ApiReply::Success(())
    } else {
        ApiReply::Failure { status }
    }
}

/// Creation endpoints answer 200 or 201; a body with `success: false` still
/// counts as a refusal. Bodies without a success flag are accepted.
pub fn interpret_create_response(status: StatusCode, body: &str) -> ApiReply<()> {
    if status != StatusCode::OK && status != StatusCode::CREATED {
        return ApiReply::Failure { status };
    }
    let refused = serde_json::from_str::<Value>(body.trim())
        .ok()
        .and_then(|value| value.get("success").and_then(Value::as_bool))
        == Some(false);
    if refused {
        ApiReply::Failure { status }
    } else {
        ApiReply::Success(())
    }
}

#[derive(Debug, Clone)]
pub struct HttpBackend {
    base_url: String,
}

impl HttpBackend {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    fn get_list<T: DeserializeOwned>(
        &self,
        path: &str,
        token: Option<&str>,
    ) -> Result<ApiReply<Vec<T>>> {
        let client = http_client()?;
        let resp = with_auth(client.get(self.url(path)), token)
            .send()
            .context("request failed")?;
        let status = resp.status();
        let body = resp.text().context("failed reading body")?;
        interpret_list_response(status, &body)
    }

    fn post_json<B: serde::Serialize>(
        &self,
        path: &str,
        token: Option<&str>,
        body: &B,
    ) -> Result<ApiReply<()>> {
        let client = http_client()?;
        let resp = with_auth(client.post(self.url(path)), token)
            .json(body)
            .send()
            .context("request failed")?;
        let status = resp.status();
        let body = resp.text().context("failed reading body")?;
        Ok(interpret_create_response(status, &body))
    }
}

impl TournamentBackend for HttpBackend {
    fn list_matches(
        &self,
        tournament_id: &str,
        token: Option<&str>,
    ) -> Result<ApiReply<Vec<Match>>> {
        self.get_list(&format!("tournaments/{tournament_id}/matches"), token)
    }

    fn list_phases(
        &self,
        tournament_id: &str,
        token: Option<&str>,
    ) -> Result<ApiReply<Vec<Phase>>> {
        self.get_list(&format!("tournaments/{tournament_id}/phases"), token)
    }

    fn list_teams(&self, tournament_id: &str, token: Option<&str>) -> Result<ApiReply<Vec<Team>>> {
        self.get_list(&format!("tournaments/{tournament_id}/teams"), token)
    }

    fn delete_match(&self, match_id: &str, token: Option<&str>) -> Result<ApiReply<()>> {
        let client = http_client()?;
        let resp = with_auth(client.delete(self.url(&format!("matches/{match_id}"))), token)
            .send()
            .context("request failed")?;
        Ok(interpret_delete_response(resp.status()))
    }

    fn create_phase(
        &self,
        tournament_id: &str,
        token: Option<&str>,
        phase: &NewPhase,
    ) -> Result<ApiReply<()>> {
        self.post_json(&format!("tournaments/{tournament_id}/phases"), token, phase)
    }

    fn create_match(
        &self,
        tournament_id: &str,
        token: Option<&str>,
        new_match: &NewMatch,
    ) -> Result<ApiReply<()>> {
        self.post_json(&format!("tournaments/{tournament_id}/matches"), token, new_match)
    }
}

// The backend expects the raw token, no scheme prefix is added.
fn with_auth(req: RequestBuilder, token: Option<&str>) -> RequestBuilder {
    match token {
        Some(token) => req.header(AUTHORIZATION, token),
        None => req,
    }
}
