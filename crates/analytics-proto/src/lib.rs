// ABOUTME: Re-exports generated protobuf types for the analytics protocol.
// ABOUTME: Single source of truth for the Analytics gRPC service and message types.

#![allow(clippy::derive_partial_eq_without_eq)]

/// Generated protobuf types for version 1 of the analytics protocol.
pub mod v1 {
    tonic::include_proto!("noelware.analytics.v1");
}

// Re-export v1 as the default protocol version
pub use v1::*;

// Well-known types (Value, Struct, Timestamp) used by the message definitions
pub use prost_types;

/// Generated client stub.
pub mod client {
    pub use super::v1::analytics_client::AnalyticsClient as AnalyticsServiceClient;
}

/// Generated server trait and service wrapper.
pub mod server {
    pub use super::v1::analytics_server::{Analytics, AnalyticsServer};
}
