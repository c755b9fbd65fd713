//! Knowledge-base search transport: SSE stream codec and authenticated client.
//!
//! The codec is shared by both sides of the wire. [`stream`] produces the event
//! sequence a search endpoint emits (one metadata event, the answer split into
//! fixed-width response fragments, then numbered citations) and [`sse`] frames
//! and parses it as `data: <JSON>\n\n` records.
//!
//! [`KbApiClient`] issues requests through a [`kb_session::SessionManager`],
//! keeping credential rejection (401) distinct from transport failures so
//! callers can choose between re-authenticating and retrying.

pub mod client;
pub mod config;
pub mod error;
pub mod events;
pub mod headers;
pub mod payload;
pub mod sse;
pub mod stream;
pub mod url;

pub use client::{KbApiClient, LoginSession};
pub use config::KbApiConfig;
pub use error::KbApiError;
pub use events::{SearchAnswer, StreamEvent};
pub use payload::{HealthStatus, LoginResponse, RatingAck, RatingRequest, SearchQuery};
pub use sse::{decode_stream, encode_frame, SseStreamParser};
pub use stream::{search_events, StreamSettings};
