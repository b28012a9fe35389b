//! HTTP surface: wire DTOs, input validation, and error-to-status mapping.

use std::sync::Arc;

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::post;
use axum::{Json, Router};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use slotbook_engine::{BookingRequest, Engine, EngineError, FreeSlotSet};

pub fn router(engine: Arc<Engine>) -> Router {
    Router::new()
        .route("/calendar/days", post(handle_days))
        .route("/calendar/book", post(handle_book))
        .with_state(engine)
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DaysRequest {
    pub date_start: String,
    pub date_end: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DaysResponse {
    pub days: Vec<DaySlots>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DaySlots {
    pub date: NaiveDate,
    pub slots: Vec<SlotDto>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SlotDto {
    pub time_start: String,
    pub time_end: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookRequest {
    pub target_start: String,
    pub requester_name: String,
    pub requester_email: String,
    pub description: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BookedResponse {
    pub id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub html_link: Option<String>,
}

/// Failures the HTTP layer reports. Input problems are caught here before
/// any store or calendar call; everything else is a typed engine rejection.
#[derive(Debug)]
pub enum ApiError {
    Input { field: &'static str, message: String },
    Engine(EngineError),
}

impl ApiError {
    fn input(field: &'static str, message: impl Into<String>) -> Self {
        Self::Input {
            field,
            message: message.into(),
        }
    }
}

impl From<EngineError> for ApiError {
    fn from(e: EngineError) -> Self {
        Self::Engine(e)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, body) = match self {
            Self::Input { field, message } => (
                StatusCode::BAD_REQUEST,
                serde_json::json!({ "error": message, "field": field }),
            ),
            Self::Engine(e) => {
                // Terminal rejections are expected traffic; infrastructure
                // failures are not.
                if e.is_terminal() {
                    tracing::info!("request rejected: {}", e);
                } else {
                    tracing::error!("request failed: {}", e);
                }
                let status = match &e {
                    EngineError::SlotNotFound(_) => StatusCode::NOT_FOUND,
                    EngineError::SlotBusy { .. } => StatusCode::CONFLICT,
                    EngineError::Store(_) => StatusCode::SERVICE_UNAVAILABLE,
                    EngineError::Upstream(_) => StatusCode::BAD_GATEWAY,
                };
                (status, serde_json::json!({ "error": e.to_string() }))
            }
        };
        (status, Json(body)).into_response()
    }
}

fn parse_date(field: &'static str, raw: &str) -> Result<NaiveDate, ApiError> {
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .map_err(|_| ApiError::input(field, format!("expected YYYY-MM-DD, got {raw:?}")))
}

fn parse_instant(field: &'static str, raw: &str) -> Result<DateTime<Utc>, ApiError> {
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|_| ApiError::input(field, format!("expected an RFC3339 instant, got {raw:?}")))
}

fn require(field: &'static str, value: &str) -> Result<(), ApiError> {
    if value.trim().is_empty() {
        return Err(ApiError::input(field, "must not be empty"));
    }
    Ok(())
}

/// Render a free-slot set with instants in the engine's configured zone.
fn to_days_response(free: FreeSlotSet, engine: &Engine) -> DaysResponse {
    let zone = engine.zone();
    let days = free
        .into_iter()
        .map(|(date, slots)| DaySlots {
            date,
            slots: slots
                .into_iter()
                .map(|slot| SlotDto {
                    time_start: slot.start.with_timezone(&zone).to_rfc3339(),
                    time_end: slot.end.with_timezone(&zone).to_rfc3339(),
                })
                .collect(),
        })
        .collect();
    DaysResponse { days }
}

async fn handle_days(
    State(engine): State<Arc<Engine>>,
    Json(req): Json<DaysRequest>,
) -> Result<Json<DaysResponse>, ApiError> {
    let from = parse_date("dateStart", &req.date_start)?;
    let to = parse_date("dateEnd", &req.date_end)?;
    if to < from {
        return Err(ApiError::input("dateEnd", "must not precede dateStart"));
    }

    let free = engine.list_free(from, to).await?;
    Ok(Json(to_days_response(free, &engine)))
}

async fn handle_book(
    State(engine): State<Arc<Engine>>,
    Json(req): Json<BookRequest>,
) -> Result<(StatusCode, Json<BookedResponse>), ApiError> {
    let target_start = parse_instant("targetStart", &req.target_start)?;
    require("requesterName", &req.requester_name)?;
    require("requesterEmail", &req.requester_email)?;
    if !req.requester_email.contains('@') {
        return Err(ApiError::input(
            "requesterEmail",
            "must be an email address",
        ));
    }

    let event = engine
        .book(BookingRequest {
            target_start,
            requester_name: req.requester_name.trim().to_string(),
            requester_email: req.requester_email.trim().to_string(),
            description: req.description,
        })
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(BookedResponse {
            id: event.id,
            html_link: event.html_link,
        }),
    ))
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
    use super::*;
    use async_trait::async_trait;
    use chrono::{Duration, NaiveTime, TimeZone, Weekday};
    use slotbook_engine::interval::Interval;
    use slotbook_engine::ports::{CalendarProvider, TemplateStore};
    use slotbook_engine::{EventDraft, EventRef, SlotTemplate};

    struct FixedStore(Vec<SlotTemplate>);

    #[async_trait]
    impl TemplateStore for FixedStore {
        async fn all_templates(&self) -> slotbook_engine::Result<Vec<SlotTemplate>> {
            Ok(self.0.clone())
        }

        async fn templates_for_weekday(
            &self,
            weekday: Weekday,
        ) -> slotbook_engine::Result<Vec<SlotTemplate>> {
            Ok(self.0.iter().filter(|t| t.weekday == weekday).cloned().collect())
        }
    }

    struct QuietCalendar;

    #[async_trait]
    impl CalendarProvider for QuietCalendar {
        async fn busy_between(
            &self,
            _from: DateTime<Utc>,
            _to: DateTime<Utc>,
        ) -> slotbook_engine::Result<Vec<Interval>> {
            Ok(vec![])
        }

        async fn create_event(&self, _draft: &EventDraft) -> slotbook_engine::Result<EventRef> {
            Ok(EventRef {
                id: "evt-1".to_string(),
                html_link: None,
            })
        }
    }

    fn test_engine() -> Arc<Engine> {
        let template = SlotTemplate {
            id: 1,
            weekday: Weekday::Mon,
            start_time: NaiveTime::from_hms_opt(9, 0, 0).unwrap(),
            duration: Duration::minutes(30),
            attendees: vec![],
        };
        Arc::new(Engine::new(
            Arc::new(FixedStore(vec![template])),
            Arc::new(QuietCalendar),
            "Europe/Berlin".parse().unwrap(),
        ))
    }

    #[tokio::test]
    async fn days_renders_in_configured_zone() {
        let engine = test_engine();
        let req = DaysRequest {
            date_start: "2025-06-02".to_string(),
            date_end: "2025-06-02".to_string(),
        };

        let Json(resp) = handle_days(State(engine), Json(req)).await.unwrap();

        assert_eq!(resp.days.len(), 1);
        let slot = &resp.days[0].slots[0];
        // 09:00 CEST carries its +02:00 offset on the wire.
        assert_eq!(slot.time_start, "2025-06-02T09:00:00+02:00");
        assert_eq!(slot.time_end, "2025-06-02T09:30:00+02:00");
    }

    #[tokio::test]
    async fn days_rejects_malformed_date_with_field() {
        let engine = test_engine();
        let req = DaysRequest {
            date_start: "02.06.2025".to_string(),
            date_end: "2025-06-02".to_string(),
        };

        let err = handle_days(State(engine), Json(req)).await.unwrap_err();
        assert!(matches!(err, ApiError::Input { field: "dateStart", .. }));
    }

    #[tokio::test]
    async fn days_rejects_inverted_range() {
        let engine = test_engine();
        let req = DaysRequest {
            date_start: "2025-06-03".to_string(),
            date_end: "2025-06-02".to_string(),
        };

        let err = handle_days(State(engine), Json(req)).await.unwrap_err();
        assert!(matches!(err, ApiError::Input { field: "dateEnd", .. }));
    }

    #[tokio::test]
    async fn book_accepts_offset_instants() {
        let engine = test_engine();
        let req = BookRequest {
            // 09:00 CEST on Monday 2025-06-02.
            target_start: "2025-06-02T09:00:00+02:00".to_string(),
            requester_name: "Ada Lovelace".to_string(),
            requester_email: "ada@example.com".to_string(),
            description: None,
        };

        let (status, Json(resp)) = handle_book(State(engine), Json(req)).await.unwrap();
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(resp.id, "evt-1");
    }

    #[tokio::test]
    async fn book_rejects_blank_requester() {
        let engine = test_engine();
        let req = BookRequest {
            target_start: "2025-06-02T09:00:00+02:00".to_string(),
            requester_name: "   ".to_string(),
            requester_email: "ada@example.com".to_string(),
            description: None,
        };

        let err = handle_book(State(engine), Json(req)).await.unwrap_err();
        assert!(matches!(err, ApiError::Input { field: "requesterName", .. }));
    }

    #[tokio::test]
    async fn book_unknown_slot_is_not_found() {
        let engine = test_engine();
        let req = BookRequest {
            target_start: "2025-06-02T11:00:00+02:00".to_string(),
            requester_name: "Ada Lovelace".to_string(),
            requester_email: "ada@example.com".to_string(),
            description: None,
        };

        let err = handle_book(State(engine), Json(req)).await.unwrap_err();
        assert!(matches!(err, ApiError::Engine(EngineError::SlotNotFound(_))));
    }

    #[test]
    fn engine_errors_map_to_statuses() {
        let busy = EngineError::SlotBusy {
            start: Utc.with_ymd_and_hms(2025, 6, 2, 9, 0, 0).unwrap(),
            end: Utc.with_ymd_and_hms(2025, 6, 2, 9, 30, 0).unwrap(),
        };
        assert_eq!(
            ApiError::from(busy).into_response().status(),
            StatusCode::CONFLICT
        );
        assert_eq!(
            ApiError::from(EngineError::store("down")).into_response().status(),
            StatusCode::SERVICE_UNAVAILABLE
        );
        assert_eq!(
            ApiError::from(EngineError::upstream("quota")).into_response().status(),
            StatusCode::BAD_GATEWAY
        );
    }
}
