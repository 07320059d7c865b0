// ABOUTME: Client library for the Noelware analytics gRPC protocol.
// ABOUTME: Exposes the async, suspending and blocking clients plus the builder and response types.

//! Analytics client.
//!
//! [`AsyncAnalyticsClient`] wraps the generated stub and returns futures;
//! [`AnalyticsClient`] wraps that in plain `async fn`s and adds the
//! construction shortcuts. [`BlockingAnalyticsClient`] drives the same
//! calls on its own runtime for synchronous callers. All report outcomes
//! as [`ResponseHandler`]s carrying either the response message or the
//! transport `Status`.
//!
//! ```no_run
//! # async fn run() -> Result<(), analytics_grpc::GrpcClientError> {
//! use analytics_client::AnalyticsClient;
//!
//! let client = AnalyticsClient::create_with_port("localhost", 10234)?;
//! let ack = client.connection_ack().await;
//! if let Some(resp) = ack.get() {
//!     println!("connected to {}", resp.instance_uuid);
//! }
//! # Ok(())
//! # }
//! ```

mod async_client;
mod blocking;
mod builder;
mod client;
mod models;
mod response;

pub use async_client::{AsyncAnalyticsClient, ResponseFuture};
pub use blocking::BlockingAnalyticsClient;
pub use builder::{AnalyticsClientBuilder, DEFAULT_USER_AGENT};
pub use client::{AnalyticsApi, AnalyticsClient};
pub use models::StatsSnapshot;
pub use response::ResponseHandler;

// Wire types callers need to read responses
pub use analytics_proto::{BuildFlavour, ConnectionAckResponse, ReceiveStatsResponse};
