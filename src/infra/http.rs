use std::time::Duration;

use async_trait::async_trait;
use reqwest::{
    Client, RequestBuilder, Response, StatusCode,
    header::{ACCEPT, CONTENT_TYPE, COOKIE},
};
use tracing::debug;

use crate::domain::category::{Category, View};
use crate::domain::lifecycle::Transition;
use crate::domain::session::Session;
use crate::domain::ticket::{NewTicket, Ticket, TicketId};
use crate::error::{AppError, AppResult};
use crate::services::TicketService;

pub struct HttpTicketClient {
    http: Client,
    base_url: String,
}

impl HttpTicketClient {
    pub fn new(base_url: &str, timeout: Duration) -> AppResult<Self> {
        let http = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|err| AppError::Configuration(format!("failed to build HTTP client: {err}")))?;
        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    fn create_endpoint(&self, category: Category) -> String {
        format!("{}/{}", self.base_url, category.as_str())
    }

    fn list_endpoint(&self, category: Category, view: View) -> String {
        format!("{}/{}/{}", self.base_url, category.as_str(), view.as_str())
    }

    fn transition_endpoint(&self, category: Category, transition: &Transition) -> String {
        format!(
            "{}/{}/progress/{}",
            self.base_url,
            category.as_str(),
            transition.kind().endpoint()
        )
    }

    fn with_session(request: RequestBuilder, session: &Session) -> RequestBuilder {
        match session.cookie.as_deref() {
            Some(cookie) if session.is_authenticated() => request.header(COOKIE, cookie),
            _ => request,
        }
    }

    async fn send(request: RequestBuilder) -> AppResult<Response> {
        let response = request
            .header(ACCEPT, "application/json")
            .send()
            .await
            .map_err(|err| AppError::Network(err.to_string()))?;

        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        if status == StatusCode::UNAUTHORIZED {
            return Err(AppError::Unauthorized);
        }

        let body = response.text().await.unwrap_or_default();
        Err(AppError::Service {
            status: status.as_u16(),
            message: error_message(&body),
        })
    }

    async fn fetch_list(&self, url: String, session: &Session) -> AppResult<Vec<Ticket>> {
        debug!(%url, "fetching tickets");
        let response = Self::send(Self::with_session(self.http.get(&url), session)).await?;
        response.json::<Vec<Ticket>>().await.map_err(|err| AppError::Service {
            status: 200,
            message: format!("failed to parse ticket list from {url}: {err}"),
        })
    }
}

/// Backends reply with either plain text or `{"message": ...}`/`{"error": ...}`.
fn error_message(body: &str) -> String {
    let trimmed = body.trim();
    if let Ok(value) = serde_json::from_str::<serde_json::Value>(trimmed) {
        for field in ["message", "error"] {
            if let Some(text) = value.get(field).and_then(|v| v.as_str()) {
                return text.to_string();
            }
        }
        if let Some(text) = value.as_str() {
            return text.to_string();
        }
    }
    trimmed.to_string()
}

#[async_trait]
impl TicketService for HttpTicketClient {
    async fn submit(
        &self,
        category: Category,
        ticket: &NewTicket,
        session: &Session,
    ) -> AppResult<Ticket> {
        let url = self.create_endpoint(category);
        debug!(%url, "submitting ticket");
        let request = self
            .http
            .post(&url)
            .header(CONTENT_TYPE, "application/json")
            .json(ticket);
        let response = Self::send(Self::with_session(request, session)).await?;
        response.json::<Ticket>().await.map_err(|err| AppError::Service {
            status: 200,
            message: format!("failed to parse created ticket: {err}"),
        })
    }

    async fn list_all(&self, category: Category, session: &Session) -> AppResult<Vec<Ticket>> {
        self.fetch_list(self.list_endpoint(category, View::All), session)
            .await
    }

    async fn list_progress(
        &self,
        category: Category,
        session: &Session,
    ) -> AppResult<Vec<Ticket>> {
        self.fetch_list(self.list_endpoint(category, View::Progress), session)
            .await
    }

    async fn apply_transition(
        &self,
        category: Category,
        id: TicketId,
        transition: &Transition,
        session: &Session,
    ) -> AppResult<()> {
        let url = self.transition_endpoint(category, transition);
        debug!(%url, %id, "requesting transition");
        let request = self
            .http
            .put(&url)
            .header(CONTENT_TYPE, "application/json")
            .json(&transition.payload(id));
        Self::send(Self::with_session(request, session)).await?;
        Ok(())
    }
}
