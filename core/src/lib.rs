//! Synchronous client core for the Graph API events resource group.
//!
//! # Overview
//! Builds `HttpRequest` values and parses `HttpResponse` values without
//! touching the network (host-does-IO pattern). The caller executes the
//! actual HTTP round-trip, or hands a `Transport` to `EventOperations` to
//! do it for them.
//!
//! # Design
//! - `EventClient` is stateless: a base URL and a static access token.
//! - Each operation is split into `build_*` (produces request) and
//!   `parse_*` (consumes response), so the I/O boundary is explicit.
//! - Graph timestamps lack an offset; they are read as UTC (see [`time`]).
//! - DTOs are defined independently from the mock-server crate; integration
//!   tests catch schema drift.

pub mod client;
pub mod config;
pub mod error;
pub mod http;
pub mod operations;
pub mod time;
pub mod types;

pub use client::{EventClient, InviteeEdge};
pub use config::ClientConfig;
pub use error::{ApiError, ConfigError};
pub use http::{HttpMethod, HttpRequest, HttpResponse};
pub use operations::{EventOperations, Transport};
#[cfg(feature = "blocking")]
pub use operations::UreqTransport;
pub use types::{Event, EventInvitee, Invitation, NewEvent, Privacy, Reference, RsvpStatus};
