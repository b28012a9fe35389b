//! SQLite-backed slot template store and its async engine-port bridge.

pub mod client;
pub mod store;

pub use client::TemplateDb;
pub use store::{SqliteTemplateStore, StoreError};
