// ABOUTME: Blocking analytics client for callers without an async runtime.
// ABOUTME: Owns a small Tokio runtime and drives AsyncAnalyticsClient calls to completion.

use analytics_grpc::{ChannelConfig, GrpcClientError, ManagedChannel};
use analytics_proto::{ConnectionAckResponse, ReceiveStatsResponse};
use tokio::runtime::{Builder, Runtime};

use crate::async_client::AsyncAnalyticsClient;
use crate::response::ResponseHandler;

/// Analytics client whose calls block the current thread.
///
/// Must not be created, used or dropped from inside an async context; use
/// [`AnalyticsClient`](crate::AnalyticsClient) there instead.
pub struct BlockingAnalyticsClient {
    inner: AsyncAnalyticsClient,
    runtime: Runtime,
}

impl BlockingAnalyticsClient {
    /// Connect lazily to `target` (`host:port` or a full URI).
    pub fn create(target: &str) -> Result<Self, GrpcClientError> {
        Self::create_with(target, |config| config)
    }

    pub fn create_with_port(host: &str, port: u16) -> Result<Self, GrpcClientError> {
        let config = ChannelConfig::for_address(host, port);
        Self::with_runtime(|| Ok(AsyncAnalyticsClient::new(ManagedChannel::connect_lazy(&config)?)))
    }

    /// Connect lazily to `target`, letting `configure` adjust the channel first.
    pub fn create_with<F>(target: &str, configure: F) -> Result<Self, GrpcClientError>
    where
        F: FnOnce(ChannelConfig) -> ChannelConfig,
    {
        let config = configure(ChannelConfig::new(target));
        Self::with_runtime(|| Ok(AsyncAnalyticsClient::new(ManagedChannel::connect_lazy(&config)?)))
    }

    /// Wrap an existing channel.
    ///
    /// The channel keeps running on the runtime that created it, which must
    /// outlive this client.
    pub fn from_channel(channel: ManagedChannel) -> Result<Self, GrpcClientError> {
        Self::with_runtime(|| Ok(AsyncAnalyticsClient::new(channel)))
    }

    /// Start a runtime and build the async client inside it.
    pub(crate) fn with_runtime<F>(build: F) -> Result<Self, GrpcClientError>
    where
        F: FnOnce() -> Result<AsyncAnalyticsClient, GrpcClientError>,
    {
        let runtime = Builder::new_multi_thread()
            .worker_threads(1)
            .thread_name("analytics-client")
            .enable_all()
            .build()
            .map_err(|e| GrpcClientError::Runtime(e.to_string()))?;

        let inner = {
            let _guard = runtime.enter();
            build()?
        };

        Ok(Self { inner, runtime })
    }

    pub fn connection_ack(&self) -> ResponseHandler<ConnectionAckResponse> {
        self.runtime.block_on(self.inner.connection_ack())
    }

    pub fn receive_stats(&self) -> ResponseHandler<ReceiveStatsResponse> {
        self.runtime.block_on(self.inner.receive_stats())
    }

    pub fn is_closed(&self) -> bool {
        self.inner.is_closed()
    }

    pub fn calls(&self) -> u64 {
        self.inner.calls()
    }

    /// Shut the channel down. Returns `false` if it was already closed.
    pub fn close(&self) -> bool {
        self.inner.close()
    }

    pub fn channel(&self) -> &ManagedChannel {
        self.inner.channel()
    }

    pub fn as_async(&self) -> &AsyncAnalyticsClient {
        &self.inner
    }
}

impl std::fmt::Debug for BlockingAnalyticsClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BlockingAnalyticsClient")
            .field("inner", &self.inner)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tonic::Code;

    #[test]
    fn test_create_forms_share_target() {
        let a = BlockingAnalyticsClient::create("localhost:10234").unwrap();
        let b = BlockingAnalyticsClient::create_with_port("localhost", 10234).unwrap();
        let c = BlockingAnalyticsClient::create_with("localhost:10234", |c| c).unwrap();

        for client in [&a, &b, &c] {
            assert_eq!(client.channel().target(), "http://localhost:10234");
            assert!(!client.is_closed());
            assert_eq!(client.calls(), 0);
        }
    }

    #[test]
    fn test_create_rejects_empty_target() {
        assert!(matches!(
            BlockingAnalyticsClient::create(""),
            Err(GrpcClientError::InvalidAddress(_))
        ));
    }

    #[test]
    fn test_unreachable_server_fails_and_counts() {
        let client = BlockingAnalyticsClient::create("127.0.0.1:1").unwrap();
        let response = client.connection_ack();

        assert!(!response.is_successful());
        assert_eq!(client.calls(), 1);
    }

    #[test]
    fn test_close_is_one_way() {
        let client = BlockingAnalyticsClient::create("127.0.0.1:1").unwrap();

        assert!(client.close());
        assert!(!client.close());
        assert!(client.is_closed());

        let response = client.receive_stats();
        assert_eq!(response.error().unwrap().code(), Code::Unavailable);
        assert_eq!(client.calls(), 0);
    }
}
