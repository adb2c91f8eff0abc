#![forbid(unsafe_code)]

//! Event ingestion, campaign linking and property-filtered event search.
//!
//! [`EventQueryService`] is the only entry point. It is built from an
//! [`evently_store::Store`] and a campaign [`evently_store::Cache`]:
//!
//! ```ignore
//! let service = EventQueryService::new(MemoryStore::new(), MemoryCache::new());
//!
//! let res = service
//!     .search_events(SearchEventsRequest {
//!         event_name: "purchase".to_owned(),
//!         where_clause: "product&laptop&=&end".to_owned(),
//!     })
//!     .await?;
//! ```

mod campaign;
mod config;
mod dto;
mod error;
mod event;
mod service;

pub use config::*;
pub use dto::*;
pub use error::*;
pub use event::SaveOutcome;
pub use service::EventQueryService;
