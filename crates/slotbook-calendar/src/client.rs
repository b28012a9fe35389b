//! Google Calendar API client.

use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use chrono_tz::Tz;
use tracing::instrument;

use slotbook_engine::interval::Interval;
use slotbook_engine::ports::CalendarProvider;
use slotbook_engine::{EngineError, EventDraft, EventRef};

use crate::error::CalendarError;
use crate::types::*;

const CALENDAR_API_BASE: &str = "https://www.googleapis.com/calendar/v3";

/// Client for one calendar identity.
///
/// Built once at startup and shared; holds no request-scoped state. Every
/// call carries the construction-time deadline, and deadline expiry surfaces
/// as a network error like any other transport failure.
pub struct GoogleCalendar {
    client: reqwest::Client,
    access_token: String,
    calendar_id: String,
    zone: Tz,
    base_url: String,
}

impl GoogleCalendar {
    pub fn new(
        access_token: &str,
        calendar_id: &str,
        zone: Tz,
        timeout: Duration,
    ) -> Result<Self, CalendarError> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            access_token: access_token.to_string(),
            calendar_id: calendar_id.to_string(),
            zone,
            base_url: CALENDAR_API_BASE.to_string(),
        })
    }

    #[cfg(test)]
    pub fn new_with_base_url(
        access_token: &str,
        calendar_id: &str,
        zone: Tz,
        base_url: &str,
    ) -> Self {
        Self {
            client: reqwest::Client::new(),
            access_token: access_token.to_string(),
            calendar_id: calendar_id.to_string(),
            zone,
            base_url: base_url.to_string(),
        }
    }

    fn auth_header(&self) -> String {
        format!("Bearer {}", self.access_token)
    }

    /// Busy periods for the configured identity within `[from, to)`.
    ///
    /// Returned sorted ascending by start. The identity missing from the
    /// response body means no busy data, not an error.
    #[instrument(skip(self), level = "info")]
    pub async fn free_busy(
        &self,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Result<Vec<Interval>, CalendarError> {
        let url = format!("{}/freeBusy", self.base_url);

        let response = self
            .client
            .post(&url)
            .header("Authorization", self.auth_header())
            .json(&FreeBusyQuery::new(&self.calendar_id, from, to))
            .send()
            .await?;

        let mut resp: FreeBusyResponse = self.handle_response(response).await?;

        let mut busy = resp
            .calendars
            .remove(&self.calendar_id)
            .unwrap_or_default()
            .busy
            .into_iter()
            .map(ApiTimePeriod::into_interval)
            .collect::<Result<Vec<_>, _>>()?;

        busy.sort_by_key(|iv| (iv.start, iv.end));
        Ok(busy)
    }

    /// Create an event, requesting attendee update notifications and a
    /// generated conference link.
    #[instrument(skip(self, draft), level = "info")]
    pub async fn insert_event(&self, draft: &EventDraft) -> Result<EventRef, CalendarError> {
        let url = format!(
            "{}/calendars/{}/events?sendUpdates=all&conferenceDataVersion=1",
            self.base_url,
            urlencoding::encode(&self.calendar_id),
        );

        let body = ApiEventInsert::from_draft(draft, self.zone.name());

        let response = self
            .client
            .post(&url)
            .header("Authorization", self.auth_header())
            .json(&body)
            .send()
            .await?;

        let created: ApiCreatedEvent = self.handle_response(response).await?;
        Ok(created.into())
    }

    /// Helper to handle API responses and errors.
    async fn handle_response<T: serde::de::DeserializeOwned>(
        &self,
        response: reqwest::Response,
    ) -> Result<T, CalendarError> {
        let status = response.status();

        if status.is_success() {
            response
                .json()
                .await
                .map_err(|e| CalendarError::InvalidData(format!("JSON parse error: {}", e)))
        } else if status.as_u16() == 401 {
            Err(CalendarError::TokenExpired)
        } else if status.as_u16() == 403 {
            Err(CalendarError::AuthRequired)
        } else if status.as_u16() == 429 {
            let retry_after = response
                .headers()
                .get("Retry-After")
                .and_then(|v| v.to_str().ok())
                .and_then(|s| s.parse().ok())
                .unwrap_or(60);
            Err(CalendarError::RateLimited(retry_after))
        } else {
            let text = response.text().await.unwrap_or_default();
            Err(CalendarError::ApiError(format!("{}: {}", status, text)))
        }
    }
}

#[async_trait]
impl CalendarProvider for GoogleCalendar {
    async fn busy_between(
        &self,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> slotbook_engine::Result<Vec<Interval>> {
        self.free_busy(from, to)
            .await
            .map_err(|e| EngineError::upstream(e.to_string()))
    }

    async fn create_event(&self, draft: &EventDraft) -> slotbook_engine::Result<EventRef> {
        self.insert_event(draft)
            .await
            .map_err(|e| EngineError::upstream(e.to_string()))
    }
}
