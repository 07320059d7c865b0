// ABOUTME: Outcome wrapper returned by every analytics RPC.
// ABOUTME: Holds either the decoded response message or the transport Status.

use tonic::Status;

/// Result of a single RPC: the decoded message, or the `Status` the call failed with.
///
/// The status is kept exactly as the transport reported it.
#[derive(Debug)]
pub struct ResponseHandler<T> {
    result: Result<T, Status>,
}

impl<T> ResponseHandler<T> {
    pub fn success(value: T) -> Self {
        Self { result: Ok(value) }
    }

    pub fn failure(status: Status) -> Self {
        Self {
            result: Err(status),
        }
    }

    /// Whether the call produced a response.
    pub fn is_successful(&self) -> bool {
        self.result.is_ok()
    }

    /// The failure status, if the call failed.
    pub fn error(&self) -> Option<&Status> {
        self.result.as_ref().err()
    }

    /// The response message, if the call succeeded.
    pub fn get(&self) -> Option<&T> {
        self.result.as_ref().ok()
    }

    pub fn into_inner(self) -> Option<T> {
        self.result.ok()
    }

    pub fn into_result(self) -> Result<T, Status> {
        self.result
    }

    pub fn map<U, F>(self, f: F) -> ResponseHandler<U>
    where
        F: FnOnce(T) -> U,
    {
        ResponseHandler {
            result: self.result.map(f),
        }
    }
}

impl<T> From<Result<T, Status>> for ResponseHandler<T> {
    fn from(result: Result<T, Status>) -> Self {
        Self { result }
    }
}

impl<T> From<ResponseHandler<T>> for Result<T, Status> {
    fn from(handler: ResponseHandler<T>) -> Self {
        handler.result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tonic::Code;

    #[test]
    fn test_success() {
        let handler = ResponseHandler::success(42);
        assert!(handler.is_successful());
        assert_eq!(handler.get(), Some(&42));
        assert!(handler.error().is_none());
        assert_eq!(handler.into_inner(), Some(42));
    }

    #[test]
    fn test_failure_keeps_status() {
        let handler: ResponseHandler<i32> =
            ResponseHandler::failure(Status::unavailable("server went away"));

        assert!(!handler.is_successful());
        assert!(handler.get().is_none());

        let status = handler.error().unwrap();
        assert_eq!(status.code(), Code::Unavailable);
        assert_eq!(status.message(), "server went away");
    }

    #[test]
    fn test_map_only_touches_success() {
        let ok = ResponseHandler::success(2).map(|v| v * 10);
        assert_eq!(ok.get(), Some(&20));

        let failed: ResponseHandler<i32> = ResponseHandler::failure(Status::internal("boom"));
        let mapped = failed.map(|v| v * 10);
        assert_eq!(mapped.error().unwrap().code(), Code::Internal);
    }

    #[test]
    fn test_result_conversions() {
        let handler: ResponseHandler<&str> = Ok("ack").into();
        let result: Result<&str, Status> = handler.into();
        assert_eq!(result.unwrap(), "ack");

        let handler: ResponseHandler<&str> = Err(Status::not_found("nope")).into();
        assert_eq!(handler.into_result().unwrap_err().code(), Code::NotFound);
    }
}
