// ABOUTME: Fluent builder for analytics clients.
// ABOUTME: Collects channel options and an optional service token before connecting.

use analytics_grpc::{ChannelConfig, GrpcClientError, ManagedChannel, ServiceToken};

use crate::async_client::AsyncAnalyticsClient;
use crate::blocking::BlockingAnalyticsClient;
use crate::client::AnalyticsClient;

/// Default user agent sent by clients built here.
pub const DEFAULT_USER_AGENT: &str = concat!("analytics-rs/", env!("CARGO_PKG_VERSION"));

/// Builder for [`AsyncAnalyticsClient`] and [`AnalyticsClient`].
///
/// ```no_run
/// # async fn run() -> Result<(), analytics_grpc::GrpcClientError> {
/// use analytics_client::AnalyticsClientBuilder;
///
/// let client = AnalyticsClientBuilder::new("analytics.example.com:10234")
///     .use_plaintext()
///     .build()?;
/// let ack = client.connection_ack().await;
/// # let _ = ack;
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct AnalyticsClientBuilder {
    config: ChannelConfig,
    service_token: Option<String>,
}

impl AnalyticsClientBuilder {
    pub fn new(target: &str) -> Self {
        Self::from_config(ChannelConfig::new(target))
    }

    pub fn for_address(host: &str, port: u16) -> Self {
        Self::from_config(ChannelConfig::for_address(host, port))
    }

    fn from_config(config: ChannelConfig) -> Self {
        Self {
            config: config.with_user_agent(DEFAULT_USER_AGENT),
            service_token: None,
        }
    }

    /// Adjust the channel configuration directly.
    pub fn with_channel<F>(mut self, configure: F) -> Self
    where
        F: FnOnce(ChannelConfig) -> ChannelConfig,
    {
        self.config = configure(self.config);
        self
    }

    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.config = self.config.with_user_agent(user_agent);
        self
    }

    /// Talk to the server without TLS.
    pub fn use_plaintext(mut self) -> Self {
        self.config = self.config.without_tls();
        self
    }

    /// Authenticate calls with a base64 service token (`instanceUUID:token`).
    ///
    /// The token is decoded when the client is built.
    pub fn with_service_token(mut self, token: impl Into<String>) -> Self {
        self.service_token = Some(token.into());
        self
    }

    pub fn config(&self) -> &ChannelConfig {
        &self.config
    }

    /// Build an asynchronous client over a lazily-connecting channel.
    ///
    /// Must be called from within a Tokio runtime.
    pub fn build_async(self) -> Result<AsyncAnalyticsClient, GrpcClientError> {
        let token = self.decode_token()?;
        let channel = ManagedChannel::connect_lazy(&self.config)?;
        Ok(AsyncAnalyticsClient::with_auth(channel, token))
    }

    pub fn build(self) -> Result<AnalyticsClient, GrpcClientError> {
        self.build_async().map(AnalyticsClient::from_async)
    }

    /// Build a client whose calls block; must not be called from async code.
    pub fn build_blocking(self) -> Result<BlockingAnalyticsClient, GrpcClientError> {
        BlockingAnalyticsClient::with_runtime(|| self.build_async())
    }

    /// Connect eagerly, failing here if the server cannot be reached.
    pub async fn connect(self) -> Result<AnalyticsClient, GrpcClientError> {
        let token = self.decode_token()?;
        let channel = ManagedChannel::connect(&self.config).await?;
        Ok(AnalyticsClient::from_async(AsyncAnalyticsClient::with_auth(
            channel, token,
        )))
    }

    fn decode_token(&self) -> Result<Option<ServiceToken>, GrpcClientError> {
        self.service_token
            .as_deref()
            .map(ServiceToken::decode)
            .transpose()
    }
}
