#![forbid(unsafe_code)]
#![deny(warnings)]
#![cfg_attr(not(test), deny(clippy::all))]

//! # Floodgate 🌊
//!
//! Rate-limited client for the CRPT document registration API: fixed-window
//! admission, FIFO queueing, and asynchronous outcome reporting.
//!
//! ## Features
//!
//! - **Fixed-window rate limiting**: at most N dispatches per window, never
//!   more, with unused capacity deliberately not banked
//! - **Unbounded FIFO admission queue**: `submit` never blocks, never drops,
//!   never reorders
//! - **RAII permits** so capacity is released exactly once on every path
//! - **Pluggable transport** (production `reqwest` client or scripted test
//!   doubles) and **pluggable event sink** for observability
//! - **Per-submission completion handles** delivering accepted / rejected /
//!   failed outcomes asynchronously
//!
//! ## Quick Start
//!
//! ```no_run
//! use floodgate::{Client, ClientConfig};
//! # fn document() -> floodgate::Document { unimplemented!() }
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     // At most 3 requests per second; excess submissions queue up.
//!     let client = Client::new(ClientConfig::per_second(3)?)?;
//!
//!     let submission = client.submit(document(), "signature");
//!     match submission.outcome().await {
//!         Some(outcome) if outcome.is_accepted() => println!("created"),
//!         Some(outcome) => println!("not created: {:?}", outcome),
//!         None => println!("client shut down before dispatch"),
//!     }
//!     Ok(())
//! }
//! ```

pub mod client;
pub mod config;
pub mod dispatch;
pub mod document;
pub mod gate;
pub mod prelude;
mod queue;
mod replenisher;
pub mod telemetry;
pub mod transport;

// Re-exports
pub use client::{Client, Submission};
pub use config::{ClientConfig, ConfigError};
pub use dispatch::{DispatchError, Outcome, SUCCESS_STATUS};
pub use document::{Description, DocStatus, DocType, Document, Product, ProductType};
pub use gate::{CapacityGate, Permit};
pub use telemetry::{ClientEvent, CountingSink, EventSink, LogSink, MemorySink, NullSink};
pub use transport::{
    DEFAULT_ENDPOINT, HttpTransport, RecordingTransport, SentRequest, Transport, TransportError,
    TransportResponse,
};
