// ABOUTME: Suspending adapter over AsyncAnalyticsClient plus the AnalyticsApi trait.
// ABOUTME: Factories build a lazily-connecting channel from a target, host/port or callback.

use analytics_grpc::{ChannelConfig, GrpcClientError, ManagedChannel};
use analytics_proto::{ConnectionAckResponse, ReceiveStatsResponse};
use async_trait::async_trait;

use crate::async_client::AsyncAnalyticsClient;
use crate::response::ResponseHandler;

/// Operations exposed by an analytics connection.
#[async_trait]
pub trait AnalyticsApi: Send + Sync {
    /// Acknowledge the connection with the server.
    async fn connection_ack(&self) -> ResponseHandler<ConnectionAckResponse>;

    /// Retrieve the server's stats snapshot.
    async fn receive_stats(&self) -> ResponseHandler<ReceiveStatsResponse>;

    /// Whether the underlying channel has been shut down.
    fn is_closed(&self) -> bool;

    /// Number of RPCs issued so far.
    fn calls(&self) -> u64;
}

/// Analytics client whose calls are plain `async fn`s.
///
/// Delegates every call to an [`AsyncAnalyticsClient`] and hands its
/// [`ResponseHandler`] back unchanged.
#[derive(Debug, Clone)]
pub struct AnalyticsClient {
    inner: AsyncAnalyticsClient,
}

impl AnalyticsClient {
    /// Connect lazily to `target` (`host:port` or a full URI).
    pub fn create(target: &str) -> Result<Self, GrpcClientError> {
        Self::create_with(target, |config| config)
    }

    /// Connect lazily to `host` on `port`.
    pub fn create_with_port(host: &str, port: u16) -> Result<Self, GrpcClientError> {
        Self::create_with_port_and(host, port, |config| config)
    }

    /// Connect lazily to `target`, letting `configure` adjust the channel first.
    pub fn create_with<F>(target: &str, configure: F) -> Result<Self, GrpcClientError>
    where
        F: FnOnce(ChannelConfig) -> ChannelConfig,
    {
        Self::from_config(configure(ChannelConfig::new(target)))
    }

    pub fn create_with_port_and<F>(
        host: &str,
        port: u16,
        configure: F,
    ) -> Result<Self, GrpcClientError>
    where
        F: FnOnce(ChannelConfig) -> ChannelConfig,
    {
        Self::from_config(configure(ChannelConfig::for_address(host, port)))
    }

    /// Wrap an existing channel. The caller keeps ownership of its lifecycle.
    pub fn from_channel(channel: ManagedChannel) -> Self {
        Self::from_async(AsyncAnalyticsClient::new(channel))
    }

    pub fn from_async(inner: AsyncAnalyticsClient) -> Self {
        Self { inner }
    }

    fn from_config(config: ChannelConfig) -> Result<Self, GrpcClientError> {
        Ok(Self::from_channel(ManagedChannel::connect_lazy(&config)?))
    }

    pub async fn connection_ack(&self) -> ResponseHandler<ConnectionAckResponse> {
        self.inner.connection_ack().await
    }

    pub async fn receive_stats(&self) -> ResponseHandler<ReceiveStatsResponse> {
        self.inner.receive_stats().await
    }

    pub fn is_closed(&self) -> bool {
        self.inner.is_closed()
    }

    pub fn calls(&self) -> u64 {
        self.inner.calls()
    }

    pub fn channel(&self) -> &ManagedChannel {
        self.inner.channel()
    }

    /// The asynchronous client this adapter delegates to.
    pub fn as_async(&self) -> &AsyncAnalyticsClient {
        &self.inner
    }
}

#[async_trait]
impl AnalyticsApi for AnalyticsClient {
    async fn connection_ack(&self) -> ResponseHandler<ConnectionAckResponse> {
        AnalyticsClient::connection_ack(self).await
    }

    async fn receive_stats(&self) -> ResponseHandler<ReceiveStatsResponse> {
        AnalyticsClient::receive_stats(self).await
    }

    fn is_closed(&self) -> bool {
        AnalyticsClient::is_closed(self)
    }

    fn calls(&self) -> u64 {
        AnalyticsClient::calls(self)
    }
}
