//! Reset request submission.
//!
//! One call, no retries. Retrying belongs to the confirmation poller, and
//! only after a request has been accepted.

use crate::observability::metrics;
use crate::service::client::ResetService;
use crate::service::types::{ResetRequest, ServiceResponse, SubmissionError, TransportError};

/// Status the service uses to reject an email it considers invalid.
const VALIDATION_STATUS: u16 = 400;

/// Send a reset request and classify the outcome.
///
/// The email must already have passed [`crate::email::validate`].
pub async fn submit(
    service: &dyn ResetService,
    request: &ResetRequest,
) -> Result<(), SubmissionError> {
    let result = classify(service.request_password_reset(request).await);

    match &result {
        Ok(()) => {
            tracing::info!(email = %request.email, "Password reset request accepted");
            metrics::record_submission("accepted");
        }
        Err(e) => {
            tracing::warn!(email = %request.email, error = %e, "Password reset request failed");
            metrics::record_submission(match e {
                SubmissionError::Network(_) => "network",
                SubmissionError::Validation(_) => "validation",
                SubmissionError::Unknown(..) => "unknown",
            });
        }
    }

    result
}

/// Map a raw service result onto the submission error taxonomy.
pub fn classify(result: Result<ServiceResponse, TransportError>) -> Result<(), SubmissionError> {
    let response = result.map_err(|e| SubmissionError::Network(e.to_string()))?;

    if response.is_success() {
        return Ok(());
    }

    let message = response.message_or_fallback();
    if response.status == VALIDATION_STATUS {
        Err(SubmissionError::Validation(message))
    } else {
        Err(SubmissionError::Unknown(response.status, message))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::service::types::FALLBACK_MESSAGE;

    #[test]
    fn test_success_is_ok() {
        assert_eq!(classify(Ok(ServiceResponse::new(200, None))), Ok(()));
    }

    #[test]
    fn test_other_2xx_is_unknown() {
        assert_eq!(
            classify(Ok(ServiceResponse::new(204, None))),
            Err(SubmissionError::Unknown(204, FALLBACK_MESSAGE.into()))
        );
    }

    #[test]
    fn test_transport_failure_is_network() {
        let result = classify(Err(TransportError::Connect("connection refused".into())));
        assert_eq!(
            result,
            Err(SubmissionError::Network("request failed: connection refused".into()))
        );
    }

    #[test]
    fn test_bad_request_is_validation_with_server_message() {
        let result = classify(Ok(ServiceResponse::new(400, Some("unknown email".into()))));
        assert_eq!(result, Err(SubmissionError::Validation("unknown email".into())));
    }

    #[test]
    fn test_other_status_is_unknown_with_fallback() {
        let result = classify(Ok(ServiceResponse::new(503, None)));
        assert_eq!(
            result,
            Err(SubmissionError::Unknown(503, FALLBACK_MESSAGE.into()))
        );
    }
}
