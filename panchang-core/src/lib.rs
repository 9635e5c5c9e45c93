//! Core types for Panchang (Hindu lunar calendar) data acquisition.
//!
//! This crate provides everything except the remote provider itself:
//! - `CalendarEntry` and the lunar calendar enums in `tithi`
//! - a durable, TTL-bound `cache` over a pluggable `store`
//! - the offline `fallback` calculator and the `enrich` engine
//! - `PanchangService`, the orchestrator consumers talk to

pub mod cache;
pub mod config;
pub mod constants;
pub mod date_range;
pub mod enrich;
pub mod error;
pub mod fallback;
pub mod location;
pub mod service;
pub mod source;
pub mod store;
pub mod tithi;

pub use date_range::DateRange;
pub use enrich::{Auspiciousness, EnrichedCalendarDay};
pub use error::{PanchangError, PanchangResult};
pub use location::Location;
pub use service::{DataSource, PanchangService, RangeResult};
pub use source::{PanchangSource, SourceTag};
pub use tithi::{CalendarEntry, LunarMonth, Paksha};
