//! Remote Complaint Gateway
//!
//! Thin async client for the complaint endpoints. It knows URLs, verbs, the
//! bearer header and how to turn a response into a typed result; it holds no
//! state of its own. All shape tolerance for list responses happens here via
//! [`ListPayload`].
//!
//! | operation | method | path |
//! |---|---|---|
//! | citizen list | GET | `/complaints/my` |
//! | officer list | GET | `/complaints/officer` |
//! | admin list | GET | `/complaints/all` |
//! | submit | POST | `/complaints/submit` |
//! | status (citizen/admin) | PUT | `/complaints/{id}/status` |
//! | status (officer) | POST | `/complaints/officer/update-status` |
//! | delete | DELETE | `/complaints/{id}` |
//! | assign | POST | `/complaints/assign` |

use crate::client::config::Config;
use crate::shared::complaint::{
    AssignOfficerRequest, Complaint, ComplaintStatus, NewComplaint, OfficerStatusRequest,
    UpdateStatusRequest,
};
use crate::shared::payload::{ListPayload, RecordPayload};
use crate::shared::record_id::RecordId;
use crate::shared::user::UserRole;
use reqwest::{Client, RequestBuilder, Response, StatusCode, Url};
use serde_json::Value;
use thiserror::Error;

/// Why a gateway call did not produce a result
#[derive(Debug, Error)]
pub enum GatewayError {
    /// No credential; the request was never sent
    #[error("Not authenticated")]
    Unauthenticated,

    /// No response was received
    #[error("Network error: {0}")]
    Transport(#[source] reqwest::Error),

    /// The server answered with a non-success status
    #[error("Request failed ({status}): {message}")]
    Http { status: u16, message: String },

    /// The server answered successfully with a body that is not valid JSON
    #[error("Invalid response from server: {0}")]
    InvalidResponse(String),

    /// The configured base URL cannot carry a record path
    #[error("Invalid request URL: {0}")]
    InvalidUrl(String),

    #[error("Failed to build HTTP client: {0}")]
    ClientBuild(#[source] reqwest::Error),
}

impl GatewayError {
    pub fn is_transport(&self) -> bool {
        matches!(self, Self::Transport(_))
    }

    /// Short message for the user
    pub fn user_message(&self) -> String {
        match self {
            Self::Unauthenticated => "Not authenticated".to_string(),
            Self::Transport(_) => "Network error".to_string(),
            Self::Http { message, .. } => message.clone(),
            Self::InvalidResponse(_) => "Invalid response from server".to_string(),
            Self::InvalidUrl(_) | Self::ClientBuild(_) => "Client configuration error".to_string(),
        }
    }
}

/// Path of the complaint list a role is allowed to read
pub fn complaints_path(role: UserRole) -> &'static str {
    match role {
        UserRole::Citizen => "/complaints/my",
        UserRole::Officer => "/complaints/officer",
        UserRole::Admin => "/complaints/all",
    }
}

/// Message for a failed response: the JSON body's `message` (or `error`)
/// field, else the status line.
pub fn error_message(status: StatusCode, body: &str) -> String {
    body_message(body).unwrap_or_else(|| status.to_string())
}

/// Non-empty `message` or `error` string field of a JSON body
pub(crate) fn body_message(body: &str) -> Option<String> {
    let value = serde_json::from_str::<Value>(body).ok()?;
    ["message", "error"]
        .iter()
        .find_map(|field| value.get(*field).and_then(Value::as_str))
        .map(str::trim)
        .filter(|message| !message.is_empty())
        .map(str::to_string)
}

/// HTTP client carrying the configured request timeout
pub(crate) fn http_client(config: &Config) -> Result<Client, reqwest::Error> {
    let mut builder = Client::builder();
    if let Some(timeout) = config.request_timeout() {
        builder = builder.timeout(timeout);
    }
    builder.build()
}

/// Complaint API client
#[derive(Debug, Clone)]
pub struct ComplaintGateway {
    config: Config,
    client: Client,
}

impl ComplaintGateway {
    pub fn new(config: Config) -> Result<Self, GatewayError> {
        let client = http_client(&config).map_err(GatewayError::ClientBuild)?;
        Ok(Self { config, client })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Fetch the complaint list for `role`
    pub async fn fetch_complaints(
        &self,
        role: UserRole,
        token: &str,
    ) -> Result<ListPayload<Complaint>, GatewayError> {
        let url = self.config.api_url(complaints_path(role));
        tracing::debug!("[GATEWAY] GET {} as {}", url, role);

        let request = self.client.get(&url);
        let response = self.send(request, token).await?;
        let body = read_json(response).await?;

        Ok(ListPayload::from_value(body, "complaints"))
    }

    /// Submit a new complaint; returns the server's record when it sent one
    pub async fn submit_complaint(
        &self,
        token: &str,
        data: &NewComplaint,
    ) -> Result<Option<Complaint>, GatewayError> {
        let url = self.config.api_url("/complaints/submit");
        tracing::debug!("[GATEWAY] POST {}", url);

        let request = self.client.post(&url).json(data);
        let response = self.send(request, token).await?;

        let bytes = response.bytes().await.map_err(GatewayError::Transport)?;
        if bytes.iter().all(u8::is_ascii_whitespace) {
            return Ok(None);
        }
        let body: Value = serde_json::from_slice(&bytes)
            .map_err(|e| GatewayError::InvalidResponse(e.to_string()))?;

        Ok(RecordPayload::<Complaint>::from_value(body, "complaint").into_record())
    }

    /// Push a status change. Officers post to their own endpoint with the id
    /// in the body; every other role puts to the complaint's status resource.
    pub async fn update_status(
        &self,
        role: UserRole,
        token: &str,
        id: &RecordId,
        status: ComplaintStatus,
        remarks: Option<String>,
    ) -> Result<(), GatewayError> {
        let request = match role {
            UserRole::Officer => {
                let url = self.config.api_url("/complaints/officer/update-status");
                tracing::debug!("[GATEWAY] POST {} for {}", url, id);
                self.client.post(&url).json(&OfficerStatusRequest {
                    complaint_id: id.clone(),
                    status,
                    remarks,
                })
            }
            UserRole::Citizen | UserRole::Admin => {
                let url = self.complaint_url(id, Some("status"))?;
                tracing::debug!("[GATEWAY] PUT {}", url);
                self.client.put(url).json(&UpdateStatusRequest { status, remarks })
            }
        };

        self.send(request, token).await?;
        Ok(())
    }

    pub async fn delete_complaint(&self, token: &str, id: &RecordId) -> Result<(), GatewayError> {
        let url = self.complaint_url(id, None)?;
        tracing::debug!("[GATEWAY] DELETE {}", url);

        self.send(self.client.delete(url), token).await?;
        Ok(())
    }

    pub async fn assign_officer(
        &self,
        token: &str,
        complaint_id: &RecordId,
        officer_id: &RecordId,
    ) -> Result<(), GatewayError> {
        let url = self.config.api_url("/complaints/assign");
        tracing::debug!("[GATEWAY] POST {} ({} -> {})", url, complaint_id, officer_id);

        let request = self.client.post(&url).json(&AssignOfficerRequest {
            complaint_id: complaint_id.clone(),
            officer_id: officer_id.clone(),
        });
        self.send(request, token).await?;
        Ok(())
    }

    /// `/complaints/{id}[/{suffix}]` with the id escaped as one path segment
    fn complaint_url(&self, id: &RecordId, suffix: Option<&str>) -> Result<Url, GatewayError> {
        let base = self.config.api_base_url();
        let mut url = Url::parse(base).map_err(|e| GatewayError::InvalidUrl(format!("{}: {}", base, e)))?;
        {
            let mut segments = url
                .path_segments_mut()
                .map_err(|_| GatewayError::InvalidUrl(base.to_string()))?;
            segments.pop_if_empty().push("complaints").push(id.as_str());
            if let Some(suffix) = suffix {
                segments.push(suffix);
            }
        }
        Ok(url)
    }

    async fn send(&self, request: RequestBuilder, token: &str) -> Result<Response, GatewayError> {
        if token.trim().is_empty() {
            return Err(GatewayError::Unauthenticated);
        }
        let response = request
            .header("Authorization", format!("Bearer {}", token))
            .send()
            .await
            .map_err(GatewayError::Transport)?;
        check_status(response).await
    }
}

/// Turn a non-success response into `GatewayError::Http`
pub(crate) async fn check_status(response: Response) -> Result<Response, GatewayError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    // A body that cannot be read still yields the status line
    let body = response.text().await.unwrap_or_default();
    Err(GatewayError::Http {
        status: status.as_u16(),
        message: error_message(status, &body),
    })
}

pub(crate) async fn read_json(response: Response) -> Result<Value, GatewayError> {
    let bytes = response.bytes().await.map_err(GatewayError::Transport)?;
    serde_json::from_slice(&bytes).map_err(|e| GatewayError::InvalidResponse(e.to_string()))
}
