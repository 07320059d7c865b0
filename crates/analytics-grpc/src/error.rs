// ABOUTME: Error types for the analytics-grpc crate.
// ABOUTME: Provides structured errors for channel construction and service token handling.

use thiserror::Error;

/// Errors that can occur while setting up a gRPC client.
///
/// Failures of individual RPCs are not represented here; they travel as
/// `tonic::Status` inside the client's response wrapper.
#[derive(Error, Debug)]
pub enum GrpcClientError {
    /// Invalid server address format.
    #[error("invalid server address: {0}")]
    InvalidAddress(String),

    /// Failed to connect to the server.
    #[error("connection failed: {0}")]
    ConnectionFailed(String),

    /// Channel option was rejected (user agent, TLS settings).
    #[error("invalid channel configuration: {0}")]
    InvalidConfig(String),

    /// Service token could not be decoded.
    #[error("invalid service token: {0}")]
    InvalidServiceToken(String),

    /// The runtime backing a blocking client could not be started.
    #[error("failed to start runtime: {0}")]
    Runtime(String),
}
