// ABOUTME: gRPC channel creation with keep-alive, TLS and lifecycle tracking.
// ABOUTME: Provides the channel config builder and the shared ManagedChannel handle.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tonic::transport::{Channel, ClientTlsConfig, Endpoint};

use crate::error::GrpcClientError;

/// Target used when nothing else is configured.
pub const DEFAULT_TARGET: &str = "http://localhost:10234";

/// HTTP/2 ping settings for long-lived analytics connections.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeepAliveConfig {
    /// How often to ping an otherwise quiet connection.
    pub interval: Duration,
    /// How long a ping may go unanswered before the connection is dropped.
    pub timeout: Duration,
    /// Keep pinging with no call in flight.
    pub while_idle: bool,
}

impl Default for KeepAliveConfig {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(30),
            timeout: Duration::from_secs(10),
            while_idle: true,
        }
    }
}

/// Everything needed to build a channel to an analytics server.
#[derive(Debug, Clone)]
pub struct ChannelConfig {
    /// Full URI of the server, always carrying a scheme once non-empty.
    pub address: String,
    /// HTTP/2 keep-alive; `None` disables pings.
    pub keep_alive: Option<KeepAliveConfig>,
    pub connect_timeout: Option<Duration>,
    /// Deadline applied to every request on the channel.
    pub request_timeout: Option<Duration>,
    pub user_agent: Option<String>,
    /// Whether the channel speaks TLS. Kept in step with the address scheme.
    pub use_tls: bool,
}

impl ChannelConfig {
    /// Config for `target` with default settings.
    ///
    /// `target` is either `host:port` or a URI; bare targets get `http://`.
    /// An `https://` target turns TLS on.
    pub fn new(target: impl Into<String>) -> Self {
        let target: String = target.into();
        let target = target.trim();
        let address = if target.is_empty() || target.contains("://") {
            target.to_string()
        } else {
            format!("http://{}", target)
        };

        Self {
            use_tls: is_https(&address),
            address,
            keep_alive: Some(KeepAliveConfig::default()),
            connect_timeout: Some(Duration::from_secs(20)),
            request_timeout: None,
            user_agent: None,
        }
    }

    /// Config for `host` on `port`.
    ///
    /// The host may carry a scheme (`https://example.com`) and a port of its
    /// own, which `port` replaces. Bare IPv6 literals are bracketed.
    pub fn for_address(host: &str, port: u16) -> Self {
        let (scheme, rest) = split_scheme(host.trim());
        let host = host_without_port(rest.trim_end_matches('/'));

        let scheme = scheme.map(str::to_lowercase);
        Self::new(format!(
            "{}://{}:{}",
            scheme.as_deref().unwrap_or("http"),
            host,
            port
        ))
    }

    pub fn without_keep_alive(mut self) -> Self {
        self.keep_alive = None;
        self
    }

    pub fn with_keep_alive(mut self, config: KeepAliveConfig) -> Self {
        self.keep_alive = Some(config);
        self
    }

    pub fn with_connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = Some(timeout);
        self
    }

    /// Fail any request that takes longer than `timeout`.
    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = Some(timeout);
        self
    }

    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = Some(user_agent.into());
        self
    }

    /// Switch to TLS, rewriting an `http://` address to `https://`.
    pub fn with_tls(self) -> Self {
        self.set_tls(true)
    }

    /// Switch to plaintext, rewriting an `https://` address to `http://`.
    pub fn without_tls(self) -> Self {
        self.set_tls(false)
    }

    fn set_tls(mut self, enabled: bool) -> Self {
        if let (Some(_), rest) = split_scheme(&self.address) {
            let scheme = if enabled { "https" } else { "http" };
            self.address = format!("{}://{}", scheme, rest);
        }
        self.use_tls = enabled;
        self
    }

    /// Build the tonic endpoint described by this config.
    pub fn endpoint(&self) -> Result<Endpoint, GrpcClientError> {
        let mut endpoint = Endpoint::from_shared(self.address.clone())
            .map_err(|e| GrpcClientError::InvalidAddress(format!("{}: {}", self.address, e)))?;

        if self.use_tls {
            endpoint = endpoint
                .tls_config(ClientTlsConfig::new())
                .map_err(|e| GrpcClientError::InvalidConfig(format!("TLS config error: {}", e)))?;
        }

        if let Some(ka) = &self.keep_alive {
            endpoint = endpoint
                .http2_keep_alive_interval(ka.interval)
                .keep_alive_timeout(ka.timeout)
                .keep_alive_while_idle(ka.while_idle);
        }

        if let Some(timeout) = self.connect_timeout {
            endpoint = endpoint.connect_timeout(timeout);
        }

        if let Some(timeout) = self.request_timeout {
            endpoint = endpoint.timeout(timeout);
        }

        if let Some(user_agent) = &self.user_agent {
            endpoint = endpoint
                .user_agent(user_agent.clone())
                .map_err(|e| GrpcClientError::InvalidConfig(format!("user agent: {}", e)))?;
        }

        Ok(endpoint)
    }
}

/// Split `scheme://rest`. The scheme is returned as written.
fn split_scheme(addr: &str) -> (Option<&str>, &str) {
    match addr.split_once("://") {
        Some((scheme, rest)) => (Some(scheme), rest),
        None => (None, addr),
    }
}

/// Host part of an authority, dropping any `:port`.
fn host_without_port(authority: &str) -> String {
    if authority.starts_with('[') {
        return match authority.find(']') {
            Some(end) => authority[..=end].to_string(),
            None => authority.to_string(),
        };
    }

    match authority.matches(':').count() {
        0 => authority.to_string(),
        1 => authority
            .split_once(':')
            .map(|(host, _)| host.to_string())
            .unwrap_or_default(),
        _ => format!("[{}]", authority),
    }
}

fn is_https(addr: &str) -> bool {
    matches!(split_scheme(addr), (Some(scheme), _) if scheme.eq_ignore_ascii_case("https"))
}

/// Build a channel and connect right away.
///
/// An unreachable server is reported here rather than on the first call.
pub async fn create_channel(config: &ChannelConfig) -> Result<Channel, GrpcClientError> {
    let channel = config.endpoint()?.connect().await.map_err(|e| {
        GrpcClientError::ConnectionFailed(format!("{}: {}", config.address, e))
    })?;

    tracing::debug!(
        address = %config.address,
        use_tls = config.use_tls,
        request_timeout = ?config.request_timeout,
        "Connected to analytics server"
    );

    Ok(channel)
}

/// Create a managed channel that connects on first use.
pub fn create_lazy_channel(config: &ChannelConfig) -> Result<ManagedChannel, GrpcClientError> {
    ManagedChannel::connect_lazy(config)
}

/// Shared handle over a tonic channel that tracks whether it was shut down.
///
/// Clones share the same underlying connection and the same shutdown flag.
/// Shutdown is one-way: once closed, a handle never reports open again.
#[derive(Debug, Clone)]
pub struct ManagedChannel {
    inner: Channel,
    target: Arc<str>,
    shutdown: Arc<AtomicBool>,
}

impl ManagedChannel {
    /// Wrap an already-built tonic channel.
    pub fn new(channel: Channel, target: impl Into<String>) -> Self {
        let target: String = target.into();
        Self {
            inner: channel,
            target: Arc::from(target),
            shutdown: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Build a channel that connects on first use.
    ///
    /// Must be called from within a Tokio runtime.
    pub fn connect_lazy(config: &ChannelConfig) -> Result<Self, GrpcClientError> {
        let channel = config.endpoint()?.connect_lazy();

        tracing::debug!(
            address = %config.address,
            use_tls = config.use_tls,
            "gRPC channel created (lazy)"
        );

        Ok(Self::new(channel, config.address.clone()))
    }

    /// Build a channel and connect immediately.
    pub async fn connect(config: &ChannelConfig) -> Result<Self, GrpcClientError> {
        let channel = create_channel(config).await?;
        Ok(Self::new(channel, config.address.clone()))
    }

    /// The tonic channel to hand to generated clients.
    pub fn channel(&self) -> Channel {
        self.inner.clone()
    }

    /// The address this channel was built for.
    pub fn target(&self) -> &str {
        &self.target
    }

    /// Whether the channel has been shut down.
    pub fn is_shutdown(&self) -> bool {
        self.shutdown.load(Ordering::Acquire)
    }

    /// Shut the channel down for every handle sharing it.
    ///
    /// Returns `true` if this call performed the shutdown, `false` if the
    /// channel was already closed. The connection itself is released once
    /// the last clone is dropped.
    pub fn shutdown(&self) -> bool {
        let closed_now = self
            .shutdown
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_ok();

        if closed_now {
            tracing::warn!(target_address = %self.target, "Shutting down gRPC channel");
        } else {
            tracing::debug!(target_address = %self.target, "gRPC channel already shut down");
        }

        closed_now
    }
}
