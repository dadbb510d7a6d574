// API error mapping - the only layer allowed to turn error kinds into HTTP
// statuses and response bodies.
pub mod responses;

use crate::errors::IngestError;
use crate::types::dto::common::{ErrorBody, ErrorDetail, ErrorDetails};

/// Build the standard error envelope for a core error
///
/// Validation failures carry the full field list; rate-limit rejections carry
/// the window reset hint. Everything else is kind + message only.
pub fn error_body(err: &IngestError) -> ErrorBody {
    let details = match err {
        IngestError::Validation(failure) => Some(ErrorDetails {
            fields: Some(failure.violations.clone()),
            retry_after_seconds: None,
        }),
        IngestError::RateLimited { retry_after_secs, .. } => Some(ErrorDetails {
            fields: None,
            retry_after_seconds: Some(*retry_after_secs),
        }),
        _ => None,
    };

    ErrorBody {
        error: ErrorDetail {
            kind: err.kind().to_string(),
            message: err.client_message(),
            details,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::internal::ValidationFailure;

    #[test]
    fn validation_body_lists_every_field() {
        let failure = ValidationFailure::new(vec![
            crate::types::dto::common::FieldViolation {
                path: "title".to_string(),
                message: "required".to_string(),
            },
            crate::types::dto::common::FieldViolation {
                path: "source.service".to_string(),
                message: "required".to_string(),
            },
        ]);
        let body = error_body(&IngestError::Validation(failure));

        assert_eq!(body.error.kind, "invalid_event");
        let fields = body.error.details.unwrap().fields.unwrap();
        assert_eq!(fields.len(), 2);
        assert_eq!(fields[1].path, "source.service");
    }

    #[test]
    fn rate_limited_body_carries_retry_after() {
        let body = error_body(&IngestError::RateLimited {
            limit: 10,
            current: 11,
            retry_after_secs: 37,
        });

        assert_eq!(body.error.kind, "rate_limited");
        assert_eq!(body.error.details.unwrap().retry_after_seconds, Some(37));
    }
}
