use std::collections::BTreeMap;

use chrono::{DateTime, Duration, NaiveDateTime, Utc};

use crate::errors::internal::ValidationFailure;
use crate::types::dto::common::FieldViolation;
use crate::types::dto::ingest::EventSubmission;
use crate::types::internal::event::{ValidatedContext, ValidatedMetrics, ValidatedSource};
use crate::types::internal::{EventKind, Severity, ValidatedEvent};

const MAX_TITLE_LEN: usize = 512;
const MAX_MESSAGE_LEN: usize = 65_536;
const MAX_SERVICE_LEN: usize = 255;
const MAX_ENDPOINT_LEN: usize = 1024;
const MAX_EXTERNAL_ID_LEN: usize = 128;
const MAX_METHOD_LEN: usize = 16;
const MAX_VERSION_LEN: usize = 64;
const MAX_ENVIRONMENT_LEN: usize = 64;

/// Normalizes and rejects malformed event submissions
///
/// One pass collects every violation rather than stopping at the first, so
/// clients can fix a whole submission in one round trip.
pub struct EventValidator {
    clock_skew_tolerance: Duration,
    retention_horizon: Duration,
    max_payload_size_bytes: usize,
}

impl EventValidator {
    pub fn new(
        clock_skew_tolerance_secs: i64,
        retention_horizon_days: i64,
        max_payload_size_bytes: usize,
    ) -> Self {
        Self {
            clock_skew_tolerance: Duration::seconds(clock_skew_tolerance_secs),
            retention_horizon: Duration::days(retention_horizon_days),
            max_payload_size_bytes,
        }
    }

    /// Validate one submission against `now` (the server receipt instant)
    pub fn validate(
        &self,
        submission: &EventSubmission,
        now: DateTime<Utc>,
    ) -> Result<ValidatedEvent, ValidationFailure> {
        let mut violations: Vec<FieldViolation> = Vec::new();

        let kind = self.check_event_type(submission, &mut violations);
        let title = self.check_title(submission, &mut violations);
        let severity = self.check_severity(submission, &mut violations);
        let external_id = self.check_external_id(submission, &mut violations);
        let message = self.check_message(submission, &mut violations);
        let source = self.check_source(submission, &mut violations);
        let occurred_at = self.check_timestamp(submission, now, &mut violations);
        let metrics = self.check_metrics(submission, &mut violations);
        self.check_payload(submission, &mut violations);

        if !violations.is_empty() {
            return Err(ValidationFailure::new(violations));
        }

        let context = submission.context.as_ref().map(|ctx| ValidatedContext {
            user_id: ctx.user_id.clone(),
            session_id: ctx.session_id.clone(),
            request_id: ctx.request_id.clone(),
            ip_address: ctx.ip_address.clone(),
            user_agent: ctx.user_agent.clone(),
            tags: ctx
                .tags
                .clone()
                .map(|tags| tags.into_iter().collect::<BTreeMap<_, _>>())
                .unwrap_or_default(),
        });

        // The checks above recorded a violation for any None here
        let (Some(kind), Some(title), Some(source)) = (kind, title, source) else {
            return Err(ValidationFailure::single("event", "submission is incomplete"));
        };

        Ok(ValidatedEvent {
            external_id,
            kind,
            severity,
            title,
            message,
            occurred_at: occurred_at.unwrap_or(now),
            source,
            context,
            metrics,
            payload: submission.payload.clone(),
        })
    }

    fn check_event_type(
        &self,
        submission: &EventSubmission,
        violations: &mut Vec<FieldViolation>,
    ) -> Option<EventKind> {
        match submission.event_type.as_deref() {
            None => {
                violations.push(violation("event_type", "is required"));
                None
            }
            Some(raw) => match EventKind::parse(raw) {
                Some(kind) => Some(kind),
                None => {
                    violations.push(violation(
                        "event_type",
                        format!("unknown value '{}', expected one of api_call, error, user_action, custom_event, system", raw),
                    ));
                    None
                }
            },
        }
    }

    fn check_title(
        &self,
        submission: &EventSubmission,
        violations: &mut Vec<FieldViolation>,
    ) -> Option<String> {
        match submission.title.as_deref() {
            None => {
                violations.push(violation("title", "is required"));
                None
            }
            Some(raw) if raw.is_empty() => {
                violations.push(violation("title", "must not be empty"));
                None
            }
            Some(raw) if raw.len() > MAX_TITLE_LEN => {
                violations.push(violation(
                    "title",
                    format!("exceeds maximum length of {} characters", MAX_TITLE_LEN),
                ));
                None
            }
            Some(raw) => Some(raw.to_string()),
        }
    }

    fn check_severity(
        &self,
        submission: &EventSubmission,
        violations: &mut Vec<FieldViolation>,
    ) -> Severity {
        match submission.severity.as_deref() {
            // Defaults to info like the rest of the observability surface
            None => Severity::Info,
            Some(raw) => match Severity::parse(raw) {
                Some(severity) => severity,
                None => {
                    violations.push(violation(
                        "severity",
                        format!("unknown value '{}', expected one of debug, info, warning, error, critical", raw),
                    ));
                    Severity::Info
                }
            },
        }
    }

    fn check_external_id(
        &self,
        submission: &EventSubmission,
        violations: &mut Vec<FieldViolation>,
    ) -> Option<String> {
        match submission.event_id.as_deref() {
            None => None,
            Some(raw) if raw.is_empty() => {
                violations.push(violation("event_id", "must not be empty when present"));
                None
            }
            Some(raw) if raw.len() > MAX_EXTERNAL_ID_LEN => {
                violations.push(violation(
                    "event_id",
                    format!("exceeds maximum length of {} characters", MAX_EXTERNAL_ID_LEN),
                ));
                None
            }
            Some(raw) => Some(raw.to_string()),
        }
    }

    fn check_message(
        &self,
        submission: &EventSubmission,
        violations: &mut Vec<FieldViolation>,
    ) -> Option<String> {
        match submission.message.as_deref() {
            Some(raw) if raw.len() > MAX_MESSAGE_LEN => {
                violations.push(violation(
                    "message",
                    format!("exceeds maximum length of {} characters", MAX_MESSAGE_LEN),
                ));
                None
            }
            other => other.map(str::to_string),
        }
    }

    fn check_source(
        &self,
        submission: &EventSubmission,
        violations: &mut Vec<FieldViolation>,
    ) -> Option<ValidatedSource> {
        let Some(source) = &submission.source else {
            violations.push(violation("source.service", "is required"));
            return None;
        };

        let service = match source.service.as_deref() {
            None | Some("") => {
                violations.push(violation("source.service", "is required"));
                return None;
            }
            Some(raw) if raw.len() > MAX_SERVICE_LEN => {
                violations.push(violation(
                    "source.service",
                    format!("exceeds maximum length of {} characters", MAX_SERVICE_LEN),
                ));
                return None;
            }
            Some(raw) => raw.to_string(),
        };

        if let Some(endpoint) = source.endpoint.as_deref() {
            if endpoint.len() > MAX_ENDPOINT_LEN {
                violations.push(violation(
                    "source.endpoint",
                    format!("exceeds maximum length of {} characters", MAX_ENDPOINT_LEN),
                ));
            }
        }
        if let Some(method) = source.method.as_deref() {
            if method.len() > MAX_METHOD_LEN {
                violations.push(violation("source.method", "is too long"));
            }
        }
        if let Some(version) = source.version.as_deref() {
            if version.len() > MAX_VERSION_LEN {
                violations.push(violation("source.version", "is too long"));
            }
        }
        if let Some(environment) = source.environment.as_deref() {
            if environment.len() > MAX_ENVIRONMENT_LEN {
                violations.push(violation("source.environment", "is too long"));
            }
        }

        Some(ValidatedSource {
            service,
            endpoint: source.endpoint.clone(),
            method: source.method.clone(),
            version: source.version.clone(),
            environment: source.environment.clone(),
        })
    }

    fn check_timestamp(
        &self,
        submission: &EventSubmission,
        now: DateTime<Utc>,
        violations: &mut Vec<FieldViolation>,
    ) -> Option<DateTime<Utc>> {
        let raw = submission.timestamp.as_deref()?;

        let Some(occurred_at) = parse_instant(raw) else {
            violations.push(violation(
                "timestamp",
                "is not a valid ISO 8601 instant",
            ));
            return None;
        };

        if occurred_at > now + self.clock_skew_tolerance {
            violations.push(violation(
                "timestamp",
                format!(
                    "is more than {} seconds in the future",
                    self.clock_skew_tolerance.num_seconds()
                ),
            ));
            return None;
        }

        if occurred_at < now - self.retention_horizon {
            violations.push(violation(
                "timestamp",
                format!(
                    "is older than the retention horizon of {} days",
                    self.retention_horizon.num_days()
                ),
            ));
            return None;
        }

        Some(occurred_at)
    }

    fn check_metrics(
        &self,
        submission: &EventSubmission,
        violations: &mut Vec<FieldViolation>,
    ) -> Option<ValidatedMetrics> {
        let metrics = submission.metrics.as_ref()?;

        if let Some(response_time_ms) = metrics.response_time_ms {
            if !response_time_ms.is_finite() || response_time_ms < 0.0 {
                violations.push(violation(
                    "metrics.response_time_ms",
                    "must be a finite, non-negative number",
                ));
            }
        }
        if let Some(status_code) = metrics.status_code {
            if !(100..=599).contains(&status_code) {
                violations.push(violation(
                    "metrics.status_code",
                    "must be between 100 and 599",
                ));
            }
        }
        if let Some(request_size) = metrics.request_size_bytes {
            if request_size < 0 {
                violations.push(violation("metrics.request_size_bytes", "must not be negative"));
            }
        }
        if let Some(response_size) = metrics.response_size_bytes {
            if response_size < 0 {
                violations.push(violation("metrics.response_size_bytes", "must not be negative"));
            }
        }

        Some(ValidatedMetrics {
            response_time_ms: metrics.response_time_ms,
            status_code: metrics.status_code,
            request_size_bytes: metrics.request_size_bytes,
            response_size_bytes: metrics.response_size_bytes,
            cache_hit: metrics.cache_hit,
        })
    }

    fn check_payload(&self, submission: &EventSubmission, violations: &mut Vec<FieldViolation>) {
        let Some(payload) = &submission.payload else {
            return;
        };

        let serialized_len = serde_json::to_vec(payload).map(|v| v.len()).unwrap_or(0);
        if serialized_len > self.max_payload_size_bytes {
            violations.push(violation(
                "payload",
                format!(
                    "serialized size of {} bytes exceeds the maximum of {} bytes",
                    serialized_len, self.max_payload_size_bytes
                ),
            ));
        }
    }
}

/// Parse an ISO 8601 instant; naive timestamps are interpreted as UTC
fn parse_instant(raw: &str) -> Option<DateTime<Utc>> {
    if let Ok(instant) = DateTime::parse_from_rfc3339(raw) {
        return Some(instant.with_timezone(&Utc));
    }
    NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f")
        .ok()
        .map(|naive| naive.and_utc())
}

fn violation(path: &str, message: impl Into<String>) -> FieldViolation {
    FieldViolation {
        path: path.to_string(),
        message: message.into(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::dto::ingest::{EventMetrics, EventSource};

    fn validator() -> EventValidator {
        EventValidator::new(300, 30, 10 * 1024 * 1024)
    }

    fn minimal_submission() -> EventSubmission {
        EventSubmission {
            event_type: Some("api_call".to_string()),
            event_id: None,
            timestamp: None,
            title: Some("GET /users".to_string()),
            message: None,
            severity: None,
            source: Some(EventSource {
                service: Some("user-service".to_string()),
                endpoint: None,
                method: None,
                version: None,
                environment: None,
            }),
            context: None,
            metrics: None,
            payload: None,
        }
    }

    #[test]
    fn minimal_submission_passes_and_defaults_apply() {
        let now = Utc::now();
        let validated = validator().validate(&minimal_submission(), now).unwrap();

        assert_eq!(validated.kind, EventKind::ApiCall);
        assert_eq!(validated.severity, Severity::Info);
        assert_eq!(validated.occurred_at, now);
        assert!(validated.external_id.is_none());
    }

    #[test]
    fn missing_required_fields_are_all_reported() {
        let submission = EventSubmission {
            event_type: None,
            title: None,
            source: None,
            ..minimal_submission()
        };

        let failure = validator().validate(&submission, Utc::now()).unwrap_err();
        let paths: Vec<&str> = failure.violations.iter().map(|v| v.path.as_str()).collect();

        assert!(paths.contains(&"event_type"));
        assert!(paths.contains(&"title"));
        assert!(paths.contains(&"source.service"));
    }

    #[test]
    fn unknown_enum_values_are_rejected() {
        let submission = EventSubmission {
            event_type: Some("telemetry".to_string()),
            severity: Some("fatal".to_string()),
            ..minimal_submission()
        };

        let failure = validator().validate(&submission, Utc::now()).unwrap_err();
        assert_eq!(failure.violations.len(), 2);
    }

    #[test]
    fn title_length_is_bounded() {
        let submission = EventSubmission {
            title: Some("x".repeat(MAX_TITLE_LEN + 1)),
            ..minimal_submission()
        };

        let failure = validator().validate(&submission, Utc::now()).unwrap_err();
        assert_eq!(failure.violations[0].path, "title");

        let at_limit = EventSubmission {
            title: Some("x".repeat(MAX_TITLE_LEN)),
            ..minimal_submission()
        };
        assert!(validator().validate(&at_limit, Utc::now()).is_ok());
    }

    #[test]
    fn future_timestamps_beyond_the_skew_tolerance_are_rejected() {
        let now = Utc::now();

        let six_minutes_ahead = EventSubmission {
            timestamp: Some((now + Duration::minutes(6)).to_rfc3339()),
            ..minimal_submission()
        };
        let failure = validator().validate(&six_minutes_ahead, now).unwrap_err();
        assert_eq!(failure.violations[0].path, "timestamp");

        let four_minutes_ahead = EventSubmission {
            timestamp: Some((now + Duration::minutes(4)).to_rfc3339()),
            ..minimal_submission()
        };
        assert!(validator().validate(&four_minutes_ahead, now).is_ok());
    }

    #[test]
    fn timestamps_older_than_the_retention_horizon_are_rejected() {
        let now = Utc::now();

        let ten_days_old = EventSubmission {
            timestamp: Some((now - Duration::days(10)).to_rfc3339()),
            ..minimal_submission()
        };
        assert!(validator().validate(&ten_days_old, now).is_ok());

        let forty_days_old = EventSubmission {
            timestamp: Some((now - Duration::days(40)).to_rfc3339()),
            ..minimal_submission()
        };
        let failure = validator().validate(&forty_days_old, now).unwrap_err();
        assert_eq!(failure.violations[0].path, "timestamp");
    }

    #[test]
    fn naive_timestamps_are_interpreted_as_utc() {
        let submission = EventSubmission {
            timestamp: Some("2026-03-01T10:15:00".to_string()),
            ..minimal_submission()
        };

        // Fixed "now" close to the naive instant so the window check passes
        let fixed_now = DateTime::parse_from_rfc3339("2026-03-01T10:20:00Z")
            .unwrap()
            .with_timezone(&Utc);
        let validated = validator().validate(&submission, fixed_now).unwrap();

        assert_eq!(validated.occurred_at.to_rfc3339(), "2026-03-01T10:15:00+00:00");
    }

    #[test]
    fn metric_bounds_are_enforced() {
        let submission = EventSubmission {
            metrics: Some(EventMetrics {
                response_time_ms: Some(-1.0),
                status_code: Some(700),
                request_size_bytes: Some(-5),
                response_size_bytes: None,
                cache_hit: Some(true),
            }),
            ..minimal_submission()
        };

        let failure = validator().validate(&submission, Utc::now()).unwrap_err();
        assert_eq!(failure.violations.len(), 3);
    }

    #[test]
    fn payload_size_is_bounded_at_the_serialized_form() {
        let small = EventValidator::new(300, 30, 64);

        let fits = EventSubmission {
            payload: Some(serde_json::json!({"k": "v"})),
            ..minimal_submission()
        };
        assert!(small.validate(&fits, Utc::now()).is_ok());

        let too_big = EventSubmission {
            payload: Some(serde_json::json!({"data": "x".repeat(128)})),
            ..minimal_submission()
        };
        let failure = small.validate(&too_big, Utc::now()).unwrap_err();
        assert_eq!(failure.violations[0].path, "payload");
    }
}
