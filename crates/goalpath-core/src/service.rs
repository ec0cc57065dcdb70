//! Remote goal service
//!
//! [`GoalService`] is the seam between the store and the network. The HTTP
//! implementation composes an [`AuthGuard`] for bearer tokens and 401
//! handling, and maps every failure to [`GoalError`] with the server's
//! `detail`/`message` text or an operation-specific fallback.

use async_trait::async_trait;
use reqwest::{RequestBuilder, Response};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::json;

use crate::auth::AuthGuard;
use crate::checkin::CheckIn;
use crate::error::{GoalError, Result};
use crate::goal::{Goal, GoalDraft, GoalId, GoalPatch};
use crate::progress::GoalProgress;
use crate::types::ProgressStatus;

/// Fallback messages, used when the server gives no readable reason
pub mod fallback {
    pub const FETCH_GOALS: &str = "Failed to fetch goals";
    pub const FETCH_GOAL: &str = "Failed to fetch goal";
    pub const CREATE_GOAL: &str = "Failed to create goal";
    pub const UPDATE_GOAL: &str = "Failed to update goal";
    pub const DELETE_GOAL: &str = "Failed to delete goal";
    pub const UPDATE_MILESTONE: &str = "Failed to update milestone";
    pub const FETCH_PROGRESS: &str = "Failed to fetch goal progress";
    pub const SUBMIT_CHECKIN: &str = "Failed to submit check-in";
}

/// Remote goal API consumed by the store
#[async_trait]
pub trait GoalService: Send + Sync + std::fmt::Debug {
    /// `GET /goals`
    async fn list_goals(&self) -> Result<Vec<Goal>>;

    /// `GET /goals/{id}`
    async fn fetch_goal(&self, id: &GoalId) -> Result<Goal>;

    /// `POST /goals`
    async fn create_goal(&self, draft: &GoalDraft) -> Result<Goal>;

    /// `PUT /goals/{id}`
    async fn update_goal(&self, id: &GoalId, patch: &GoalPatch) -> Result<Goal>;

    /// `DELETE /goals/{id}`
    async fn delete_goal(&self, id: &GoalId) -> Result<()>;

    /// `PUT /goals/{id}/milestone/{week}`; the response body is not relied on
    async fn update_milestone(&self, id: &GoalId, week: u32, status: ProgressStatus) -> Result<()>;

    /// `GET /goals/{id}/progress`
    async fn goal_progress(&self, id: &GoalId) -> Result<GoalProgress>;

    /// `POST /checkins`
    async fn submit_checkin(&self, checkin: &CheckIn) -> Result<()>;
}

#[derive(Debug, Deserialize)]
struct GoalsEnvelope {
    #[serde(default)]
    goals: Vec<Goal>,
}

#[derive(Debug, Deserialize)]
struct GoalEnvelope {
    goal: Goal,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    detail: Option<serde_json::Value>,
    message: Option<String>,
}

/// Extract a human-readable message from an error body (`detail`, then `message`)
pub fn error_message(body: &str) -> Option<String> {
    let parsed: ErrorBody = serde_json::from_str(body).ok()?;
    let detail = parsed.detail.and_then(|d| match d {
        serde_json::Value::String(s) => Some(s),
        // Validation errors arrive as a list of {msg, ...}
        serde_json::Value::Array(items) => items
            .iter()
            .find_map(|item| item.get("msg").and_then(|m| m.as_str()))
            .map(str::to_string),
        _ => None,
    });
    detail
        .or(parsed.message)
        .filter(|message| !message.trim().is_empty())
}

/// Goal service over HTTP/JSON
#[derive(Debug, Clone)]
pub struct HttpGoalService {
    http: reqwest::Client,
    base_url: String,
    guard: AuthGuard,
}

impl HttpGoalService {
    pub fn new(http: reqwest::Client, base_url: impl Into<String>, guard: AuthGuard) -> Self {
        Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            guard,
        }
    }

    pub fn guard(&self) -> &AuthGuard {
        &self.guard
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path)
    }

    /// Send through the auth guard and turn non-2xx answers into errors
    async fn send(&self, request: RequestBuilder, fallback: &str) -> Result<Response> {
        let response = self.guard.authorize(request).send().await.map_err(|e| {
            tracing::warn!("{}: {}", fallback, e);
            GoalError::remote(None, fallback)
        })?;

        let status = response.status();
        if self.guard.observe(status) {
            return Err(GoalError::Unauthorized);
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let message = error_message(&body).unwrap_or_else(|| fallback.to_string());
            tracing::warn!("{} ({}): {}", fallback, status, message);
            return Err(GoalError::remote(Some(status.as_u16()), message));
        }

        Ok(response)
    }

    async fn decode<T: DeserializeOwned>(response: Response, fallback: &str) -> Result<T> {
        let status = response.status().as_u16();
        let body = response.text().await.map_err(|e| {
            tracing::warn!("{}: could not read body: {}", fallback, e);
            GoalError::remote(Some(status), fallback)
        })?;
        Ok(serde_json::from_str(&body)?)
    }
}

#[async_trait]
impl GoalService for HttpGoalService {
    async fn list_goals(&self) -> Result<Vec<Goal>> {
        let request = self.http.get(self.url("goals"));
        let response = self.send(request, fallback::FETCH_GOALS).await?;
        let envelope: GoalsEnvelope = Self::decode(response, fallback::FETCH_GOALS).await?;
        tracing::debug!("Fetched {} goals", envelope.goals.len());
        Ok(envelope.goals)
    }

    async fn fetch_goal(&self, id: &GoalId) -> Result<Goal> {
        let request = self.http.get(self.url(&format!("goals/{}", id)));
        let response = self.send(request, fallback::FETCH_GOAL).await?;
        let envelope: GoalEnvelope = Self::decode(response, fallback::FETCH_GOAL).await?;
        Ok(envelope.goal)
    }

    async fn create_goal(&self, draft: &GoalDraft) -> Result<Goal> {
        let request = self.http.post(self.url("goals")).json(draft);
        let response = self.send(request, fallback::CREATE_GOAL).await?;
        let envelope: GoalEnvelope = Self::decode(response, fallback::CREATE_GOAL).await?;
        Ok(envelope.goal)
    }

    async fn update_goal(&self, id: &GoalId, patch: &GoalPatch) -> Result<Goal> {
        let request = self.http.put(self.url(&format!("goals/{}", id))).json(patch);
        let response = self.send(request, fallback::UPDATE_GOAL).await?;
        let envelope: GoalEnvelope = Self::decode(response, fallback::UPDATE_GOAL).await?;
        Ok(envelope.goal)
    }

    async fn delete_goal(&self, id: &GoalId) -> Result<()> {
        let request = self.http.delete(self.url(&format!("goals/{}", id)));
        self.send(request, fallback::DELETE_GOAL).await?;
        Ok(())
    }

    async fn update_milestone(&self, id: &GoalId, week: u32, status: ProgressStatus) -> Result<()> {
        let request = self
            .http
            .put(self.url(&format!("goals/{}/milestone/{}", id, week)))
            .json(&json!({ "status": status }));
        self.send(request, fallback::UPDATE_MILESTONE).await?;
        Ok(())
    }

    async fn goal_progress(&self, id: &GoalId) -> Result<GoalProgress> {
        let request = self.http.get(self.url(&format!("goals/{}/progress", id)));
        let response = self.send(request, fallback::FETCH_PROGRESS).await?;
        Self::decode(response, fallback::FETCH_PROGRESS).await
    }

    async fn submit_checkin(&self, checkin: &CheckIn) -> Result<()> {
        let request = self.http.post(self.url("checkins")).json(checkin);
        self.send(request, fallback::SUBMIT_CHECKIN).await?;
        Ok(())
    }
}
