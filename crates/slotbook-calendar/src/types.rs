//! Wire types for the Google Calendar v3 API.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use slotbook_engine::interval::Interval;
use slotbook_engine::{EventDraft, EventRef};

use crate::error::CalendarError;

/// Request body for `POST /freeBusy`.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FreeBusyQuery {
    pub time_min: String,
    pub time_max: String,
    pub items: Vec<FreeBusyItem>,
}

#[derive(Debug, Serialize)]
pub struct FreeBusyItem {
    pub id: String,
}

impl FreeBusyQuery {
    pub fn new(calendar_id: &str, from: DateTime<Utc>, to: DateTime<Utc>) -> Self {
        Self {
            time_min: from.to_rfc3339(),
            time_max: to.to_rfc3339(),
            items: vec![FreeBusyItem {
                id: calendar_id.to_string(),
            }],
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct FreeBusyResponse {
    #[serde(default)]
    pub calendars: HashMap<String, FreeBusyCalendar>,
}

#[derive(Debug, Default, Deserialize)]
pub struct FreeBusyCalendar {
    #[serde(default)]
    pub busy: Vec<ApiTimePeriod>,
}

/// One busy period as returned by the API.
#[derive(Debug, Deserialize)]
pub struct ApiTimePeriod {
    pub start: String,
    pub end: String,
}

impl ApiTimePeriod {
    /// Strict conversion into an engine interval.
    ///
    /// Malformed or inverted bounds fail the whole call; a silently dropped
    /// busy period would be offered as free.
    pub fn into_interval(self) -> Result<Interval, CalendarError> {
        let start = parse_instant(&self.start)?;
        let end = parse_instant(&self.end)?;
        if start >= end {
            return Err(CalendarError::InvalidData(format!(
                "busy period with non-positive length: {} >= {}",
                self.start, self.end
            )));
        }
        Ok(Interval::new(start, end))
    }
}

fn parse_instant(raw: &str) -> Result<DateTime<Utc>, CalendarError> {
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| CalendarError::InvalidData(format!("bad timestamp {raw:?}: {e}")))
}

/// Request body for event insertion.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiEventInsert {
    pub summary: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub start: ApiEventTime,
    pub end: ApiEventTime,
    pub attendees: Vec<ApiAttendee>,
    pub status: String,
    pub conference_data: ApiConferenceData,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiEventTime {
    pub date_time: String,
    pub time_zone: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiAttendee {
    pub display_name: String,
    pub email: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiConferenceData {
    pub create_request: ApiConferenceRequest,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiConferenceRequest {
    pub request_id: String,
}

impl ApiEventInsert {
    /// Shape an engine draft for the wire. Events are created tentative; the
    /// attendee order from the draft is preserved.
    pub fn from_draft(draft: &EventDraft, zone_name: &str) -> Self {
        Self {
            summary: draft.summary.clone(),
            description: draft.description.clone(),
            start: ApiEventTime {
                date_time: draft.start.to_rfc3339(),
                time_zone: zone_name.to_string(),
            },
            end: ApiEventTime {
                date_time: draft.end.to_rfc3339(),
                time_zone: zone_name.to_string(),
            },
            attendees: draft
                .attendees
                .iter()
                .map(|a| ApiAttendee {
                    display_name: a.name.clone(),
                    email: a.email.clone(),
                })
                .collect(),
            status: "tentative".to_string(),
            conference_data: ApiConferenceData {
                create_request: ApiConferenceRequest {
                    request_id: draft.request_id.clone(),
                },
            },
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiCreatedEvent {
    pub id: String,
    pub html_link: Option<String>,
}

impl From<ApiCreatedEvent> for EventRef {
    fn from(event: ApiCreatedEvent) -> Self {
        EventRef {
            id: event.id,
            html_link: event.html_link,
        }
    }
}
