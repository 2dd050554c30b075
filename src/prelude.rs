//! Convenient re-exports for common Floodgate types.
pub use crate::{
    client::{Client, Submission},
    config::{ClientConfig, ConfigError},
    dispatch::{DispatchError, Outcome},
    document::{Description, DocStatus, DocType, Document, Product, ProductType},
    telemetry::{ClientEvent, EventSink},
    transport::{HttpTransport, Transport, TransportError},
};
