// ABOUTME: Future-returning client over the generated Analytics stub.
// ABOUTME: Counts issued RPCs, tracks channel shutdown, and wraps outcomes in ResponseHandler.

use std::fmt;
use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use analytics_grpc::{AuthInterceptor, ManagedChannel, ServiceToken};
use analytics_proto::client::AnalyticsServiceClient;
use analytics_proto::{
    ConnectionAckRequest, ConnectionAckResponse, ReceiveStatsRequest, ReceiveStatsResponse,
};
use futures::future::{BoxFuture, FutureExt};
use tonic::service::interceptor::InterceptedService;
use tonic::transport::Channel;
use tonic::Status;
use tracing::{debug, error};
use uuid::Uuid;

use crate::response::ResponseHandler;

type Stub = AnalyticsServiceClient<InterceptedService<Channel, AuthInterceptor>>;

/// Future resolving to the outcome of one RPC.
pub type ResponseFuture<T> = BoxFuture<'static, ResponseHandler<T>>;

/// Asynchronous analytics client.
///
/// Every call returns a future that does nothing until polled; dropping it
/// cancels the in-flight request. Clones share the channel and the call
/// counter.
#[derive(Clone)]
pub struct AsyncAnalyticsClient {
    stub: Stub,
    channel: ManagedChannel,
    calls: Arc<AtomicU64>,
    instance_uuid: Option<Uuid>,
}

impl AsyncAnalyticsClient {
    /// Client over `channel` that sends no credentials.
    pub fn new(channel: ManagedChannel) -> Self {
        Self::with_auth(channel, None)
    }

    /// Client over `channel` that authenticates every call with `token`.
    pub fn with_auth(channel: ManagedChannel, token: Option<ServiceToken>) -> Self {
        let interceptor = token
            .as_ref()
            .map(AuthInterceptor::from_service_token)
            .unwrap_or_default();

        Self {
            stub: AnalyticsServiceClient::with_interceptor(channel.channel(), interceptor),
            instance_uuid: token.map(|t| t.instance_uuid()),
            calls: Arc::new(AtomicU64::new(0)),
            channel,
        }
    }

    /// Acknowledge the connection with the analytics server.
    pub fn connection_ack(&self) -> ResponseFuture<ConnectionAckResponse> {
        self.issue("ConnectionAck", |mut stub| async move {
            stub.connection_ack(ConnectionAckRequest {}).await
        })
    }

    /// Fetch the current stats snapshot from the server.
    pub fn receive_stats(&self) -> ResponseFuture<ReceiveStatsResponse> {
        self.issue("RetrieveStats", |mut stub| async move {
            stub.retrieve_stats(ReceiveStatsRequest {}).await
        })
    }

    /// Number of RPCs issued through this client and its clones.
    pub fn calls(&self) -> u64 {
        self.calls.load(Ordering::Acquire)
    }

    pub fn is_closed(&self) -> bool {
        self.channel.is_shutdown()
    }

    /// Shut the underlying channel down.
    ///
    /// Returns `false` if it was already closed. Calls made afterwards fail
    /// with `Unavailable` without reaching the server.
    pub fn close(&self) -> bool {
        self.channel.shutdown()
    }

    /// Instance id carried by the service token, when one was configured.
    pub fn instance_uuid(&self) -> Option<Uuid> {
        self.instance_uuid
    }

    pub fn channel(&self) -> &ManagedChannel {
        &self.channel
    }

    fn issue<T, F, Fut>(&self, method: &'static str, call: F) -> ResponseFuture<T>
    where
        T: Send + 'static,
        F: FnOnce(Stub) -> Fut + Send + 'static,
        Fut: Future<Output = Result<tonic::Response<T>, Status>> + Send + 'static,
    {
        let stub = self.stub.clone();
        let channel = self.channel.clone();
        let calls = Arc::clone(&self.calls);

        async move {
            if channel.is_shutdown() {
                debug!(method, target_address = %channel.target(), "Refusing call on closed channel");
                return ResponseHandler::failure(Status::unavailable(
                    "channel has been shut down",
                ));
            }

            let issued = calls.fetch_add(1, Ordering::AcqRel) + 1;
            debug!(method, target_address = %channel.target(), calls = issued, "Issuing RPC");

            match call(stub).await {
                Ok(response) => ResponseHandler::success(response.into_inner()),
                Err(status) => {
                    error!(
                        method,
                        target_address = %channel.target(),
                        code = ?status.code(),
                        message = %status.message(),
                        "RPC failed"
                    );
                    ResponseHandler::failure(status)
                }
            }
        }
        .boxed()
    }
}

impl fmt::Debug for AsyncAnalyticsClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AsyncAnalyticsClient")
            .field("target", &self.channel.target())
            .field("closed", &self.is_closed())
            .field("calls", &self.calls())
            .field("instance_uuid", &self.instance_uuid)
            .finish()
    }
}
