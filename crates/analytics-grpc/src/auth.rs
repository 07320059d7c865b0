// ABOUTME: Service token decoding and bearer-token injection for analytics requests.
// ABOUTME: Provides ServiceToken and an interceptor that adds the Authorization header.

use std::fmt;

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use tonic::service::Interceptor;
use uuid::Uuid;

use crate::error::GrpcClientError;

/// Credentials handed out by an analytics instance.
///
/// Encoded as base64 of `<instance-uuid>:<token>`. Only the token part is
/// sent over the wire.
#[derive(Clone, PartialEq, Eq)]
pub struct ServiceToken {
    instance_uuid: Uuid,
    token: String,
}

impl ServiceToken {
    /// Decode a base64 service token.
    pub fn decode(encoded: &str) -> Result<Self, GrpcClientError> {
        let bytes = STANDARD
            .decode(encoded.trim())
            .map_err(|e| GrpcClientError::InvalidServiceToken(format!("not base64: {}", e)))?;
        let decoded = String::from_utf8(bytes)
            .map_err(|_| GrpcClientError::InvalidServiceToken("not valid UTF-8".to_string()))?;

        let Some((instance, token)) = decoded.split_once(':') else {
            return Err(GrpcClientError::InvalidServiceToken(
                "expected 'instanceUUID:token'".to_string(),
            ));
        };

        let instance_uuid = Uuid::parse_str(instance).map_err(|e| {
            GrpcClientError::InvalidServiceToken(format!("bad instance UUID: {}", e))
        })?;

        if token.is_empty() {
            return Err(GrpcClientError::InvalidServiceToken(
                "token part is empty".to_string(),
            ));
        }

        Ok(Self {
            instance_uuid,
            token: token.to_string(),
        })
    }

    /// Instance the token was issued by.
    pub fn instance_uuid(&self) -> Uuid {
        self.instance_uuid
    }

    /// Raw token sent as the bearer credential.
    pub fn token(&self) -> &str {
        &self.token
    }
}

impl fmt::Debug for ServiceToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ServiceToken")
            .field("instance_uuid", &self.instance_uuid)
            .field("token", &"<redacted>")
            .finish()
    }
}

/// Interceptor that adds a Bearer token to requests
#[derive(Clone, Default)]
pub struct AuthInterceptor {
    token: Option<String>,
}

impl AuthInterceptor {
    pub fn new(token: Option<String>) -> Self {
        Self { token }
    }

    pub fn from_service_token(token: &ServiceToken) -> Self {
        Self::new(Some(token.token().to_string()))
    }
}

impl Interceptor for AuthInterceptor {
    fn call(&mut self, mut req: tonic::Request<()>) -> Result<tonic::Request<()>, tonic::Status> {
        if let Some(ref token) = self.token {
            let value = format!("Bearer {}", token)
                .parse()
                .map_err(|_| tonic::Status::internal("invalid token format"))?;
            req.metadata_mut().insert("authorization", value);
        }
        Ok(req)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // base64("0e2a7451-2b50-46c3-8481-8c7bd26de7cc:blahblahblah")
    const TOKEN: &str = "MGUyYTc0NTEtMmI1MC00NmMzLTg0ODEtOGM3YmQyNmRlN2NjOmJsYWhibGFoYmxhaA==";

    #[test]
    fn test_decode_service_token() {
        let token = ServiceToken::decode(TOKEN).unwrap();
        assert_eq!(
            token.instance_uuid().to_string(),
            "0e2a7451-2b50-46c3-8481-8c7bd26de7cc"
        );
        assert_eq!(token.token(), "blahblahblah");
    }

    #[test]
    fn test_decode_rejects_non_base64() {
        let err = ServiceToken::decode("!!!not base64!!!").unwrap_err();
        assert!(matches!(err, GrpcClientError::InvalidServiceToken(msg) if msg.contains("base64")));
    }

    #[test]
    fn test_decode_rejects_missing_separator() {
        let encoded = STANDARD.encode("0e2a7451-2b50-46c3-8481-8c7bd26de7cc");
        let err = ServiceToken::decode(&encoded).unwrap_err();
        assert!(matches!(err, GrpcClientError::InvalidServiceToken(_)));
    }

    #[test]
    fn test_decode_rejects_bad_uuid() {
        let encoded = STANDARD.encode("not-a-uuid:secret");
        let err = ServiceToken::decode(&encoded).unwrap_err();
        assert!(matches!(err, GrpcClientError::InvalidServiceToken(msg) if msg.contains("UUID")));
    }

    #[test]
    fn test_decode_rejects_empty_token() {
        let encoded = STANDARD.encode("0e2a7451-2b50-46c3-8481-8c7bd26de7cc:");
        assert!(ServiceToken::decode(&encoded).is_err());
    }

    #[test]
    fn test_token_may_contain_colons() {
        let encoded = STANDARD.encode("0e2a7451-2b50-46c3-8481-8c7bd26de7cc:a:b:c");
        let token = ServiceToken::decode(&encoded).unwrap();
        assert_eq!(token.token(), "a:b:c");
    }

    #[test]
    fn test_debug_redacts_token() {
        let token = ServiceToken::decode(TOKEN).unwrap();
        let debug_str = format!("{:?}", token);
        assert!(debug_str.contains("0e2a7451"));
        assert!(!debug_str.contains("blahblahblah"));
    }

    #[test]
    fn test_interceptor_adds_bearer_header() {
        let token = ServiceToken::decode(TOKEN).unwrap();
        let mut interceptor = AuthInterceptor::from_service_token(&token);

        let req = interceptor.call(tonic::Request::new(())).unwrap();
        let header = req.metadata().get("authorization").unwrap();
        assert_eq!(header.to_str().unwrap(), "Bearer blahblahblah");
    }

    #[test]
    fn test_interceptor_without_token_leaves_request_untouched() {
        let mut interceptor = AuthInterceptor::default();
        let req = interceptor.call(tonic::Request::new(())).unwrap();
        assert!(req.metadata().get("authorization").is_none());
    }

    #[test]
    fn test_interceptor_rejects_unprintable_token() {
        let mut interceptor = AuthInterceptor::new(Some("bad\ntoken".to_string()));
        let status = interceptor.call(tonic::Request::new(())).unwrap_err();
        assert_eq!(status.code(), tonic::Code::Internal);
    }
}
