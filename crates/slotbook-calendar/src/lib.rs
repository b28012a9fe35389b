//! Google Calendar adapter: free/busy reads and event creation.

pub mod client;
pub mod error;
pub mod types;

pub use client::GoogleCalendar;
pub use error::CalendarError;
