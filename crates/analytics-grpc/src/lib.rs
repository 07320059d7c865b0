// ABOUTME: Shared gRPC utilities for the analytics client and CLI.
// ABOUTME: Provides channel creation, service token auth, and protobuf Value coercion.

pub mod auth;
pub mod channel;
pub mod error;
pub mod value;

// Channel creation
pub use channel::{
    create_channel, create_lazy_channel, ChannelConfig, KeepAliveConfig, ManagedChannel,
    DEFAULT_TARGET,
};

// Error types
pub use error::GrpcClientError;

// Authentication
pub use auth::{AuthInterceptor, ServiceToken};

// Value coercion
pub use value::{null_value, struct_to_json, to_json, to_value, ToGrpcValue, ValueError};

// Re-export proto types for convenience
pub use analytics_proto;
