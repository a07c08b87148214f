//! Error types for dynoscan.
//!
//! This module maps AWS SDK errors to the tool's error taxonomy.
//! Uses typed `SdkError` variant matching, no string parsing of service errors.

use aws_sdk_dynamodb::error::{ProvideErrorMetadata, SdkError};
use std::process::ExitCode;
use thiserror::Error;

pub type Result<T, E = DynoscanError> = std::result::Result<T, E>;

/// Every way an invocation can fail.
///
/// All variants are fatal at the top level; nothing is retried here.
#[derive(Debug, Error)]
pub enum DynoscanError {
    /// Flags that cannot be turned into a run configuration.
    #[error("invalid configuration: {0}")]
    Config(String),

    #[error("invalid {field} pattern: {source}")]
    InvalidPattern {
        field: &'static str,
        #[source]
        source: regex::Error,
    },

    /// Session or credential failure.
    #[error("authentication failed: {0}")]
    Auth(String),

    /// Listing tables failed.
    #[error("failed listing tables: {0}")]
    Discovery(String),

    /// Reading the key schema or items of a table failed.
    #[error("failed scanning table '{table}': {message}")]
    Scan { table: String, message: String },

    #[error("failed writing output: {0}")]
    Output(#[from] std::io::Error),
}

impl DynoscanError {
    /// Process exit status for this error kind.
    pub fn exit_status(&self) -> u8 {
        match self {
            DynoscanError::Output(_) => 1,
            DynoscanError::Config(_) | DynoscanError::InvalidPattern { .. } => 2,
            DynoscanError::Auth(_) => 3,
            DynoscanError::Discovery(_) => 4,
            DynoscanError::Scan { .. } => 5,
        }
    }

    pub fn exit_code(&self) -> ExitCode {
        ExitCode::from(self.exit_status())
    }
}

/// AWS service type for error context.
#[derive(Debug, Clone, Copy)]
pub enum AwsService {
    DynamoDB,
    Sts,
}

impl AwsService {
    fn name(&self) -> &'static str {
        match self {
            AwsService::DynamoDB => "DynamoDB",
            AwsService::Sts => "STS",
        }
    }
}

/// Broad class of an SDK failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    Credentials,
    AccessDenied,
    Throttled,
    NotFound,
    Connection,
    Other,
}

/// A classified SDK failure: what kind it is and a readable message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SdkFailure {
    pub kind: FailureKind,
    pub message: String,
}

impl SdkFailure {
    fn new(kind: FailureKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    /// Turn into a discovery error, unless it is a credential problem.
    pub fn into_discovery(self) -> DynoscanError {
        match self.kind {
            FailureKind::Credentials => DynoscanError::Auth(self.message),
            _ => DynoscanError::Discovery(self.message),
        }
    }

    /// Turn into a scan error for `table`, unless it is a credential problem.
    pub fn into_scan(self, table: &str) -> DynoscanError {
        match self.kind {
            FailureKind::Credentials => DynoscanError::Auth(self.message),
            _ => DynoscanError::Scan {
                table: table.to_string(),
                message: self.message,
            },
        }
    }
}

// ========== TYPED ERROR MAPPING ==========

/// Classify non-service `SdkError` variants (dispatch failures, timeouts, etc.).
///
/// Returns `None` for `ServiceError`.
fn classify_outer_sdk_error<E, R>(err: &SdkError<E, R>, service: AwsService) -> Option<SdkFailure>
where
    E: std::fmt::Debug,
    R: std::fmt::Debug,
{
    match err {
        SdkError::DispatchFailure(dispatch) => {
            let msg = if dispatch.is_timeout() {
                format!(
                    "Connection timed out to {}. Check your network or endpoint.",
                    service.name()
                )
            } else if dispatch.is_io() {
                format!(
                    "Connection failed to {} (I/O error). Check if the endpoint is reachable.",
                    service.name()
                )
            } else {
                format!(
                    "Connection failed to {}. Check if the endpoint is reachable.",
                    service.name()
                )
            };
            Some(SdkFailure::new(FailureKind::Connection, msg))
        }
        SdkError::TimeoutError(_) => Some(SdkFailure::new(
            FailureKind::Connection,
            format!(
                "Connection timed out to {}. Check your network or endpoint.",
                service.name()
            ),
        )),
        SdkError::ConstructionFailure(err) => {
            // Construction failures carry no error code, only a boxed source.
            let msg = format!("{:?}", err);
            if msg.contains("credentials")
                || msg.contains("Credentials")
                || msg.contains("NoCredentialsError")
            {
                Some(SdkFailure::new(
                    FailureKind::Credentials,
                    "No AWS credentials found. Configure credentials via environment variables \
                    (AWS_ACCESS_KEY_ID, AWS_SECRET_ACCESS_KEY), AWS profile, or IAM role.",
                ))
            } else {
                Some(SdkFailure::new(
                    FailureKind::Other,
                    format!("Failed to build request: {}", msg),
                ))
            }
        }
        SdkError::ResponseError(err) => Some(SdkFailure::new(
            FailureKind::Other,
            format!("Invalid response from {}: {:?}", service.name(), err),
        )),
        SdkError::ServiceError(_) => None,
        _ => Some(SdkFailure::new(
            FailureKind::Other,
            format!("Unknown error from {}: {:?}", service.name(), err),
        )),
    }
}

/// Classify a service error code shared across AWS services.
pub(crate) fn classify_service_code(
    code: Option<&str>,
    message: Option<&str>,
    display: &str,
    service: AwsService,
    table: Option<&str>,
) -> SdkFailure {
    match code {
        Some("UnrecognizedClientException") => SdkFailure::new(
            FailureKind::Credentials,
            "Invalid AWS credentials. Check your access key and secret.",
        ),
        Some("InvalidClientTokenId") | Some("InvalidAccessKeyId") => SdkFailure::new(
            FailureKind::Credentials,
            "Invalid AWS access key ID. Check your credentials.",
        ),
        Some("SignatureDoesNotMatch") => SdkFailure::new(
            FailureKind::Credentials,
            "AWS signature mismatch. Check your secret access key.",
        ),
        Some("ExpiredTokenException") | Some("ExpiredToken") => SdkFailure::new(
            FailureKind::Credentials,
            "AWS credentials have expired. Refresh your session token.",
        ),
        Some("AccessDeniedException") | Some("AccessDenied") => SdkFailure::new(
            FailureKind::AccessDenied,
            format!(
                "Access denied to {}: {}",
                service.name(),
                message.unwrap_or("Check your IAM permissions.")
            ),
        ),
        Some("ProvisionedThroughputExceededException")
        | Some("LimitExceededException")
        | Some("RequestLimitExceeded")
        | Some("Throttling")
        | Some("ThrottlingException") => SdkFailure::new(
            FailureKind::Throttled,
            format!(
                "{} request rate too high. Retry later or raise --max-retries.",
                service.name()
            ),
        ),
        Some("ResourceNotFoundException") => {
            let msg = match table {
                Some(t) => format!("Table '{}' not found", t),
                None => "Resource not found".to_string(),
            };
            SdkFailure::new(FailureKind::NotFound, msg)
        }
        _ => SdkFailure::new(FailureKind::Other, message.unwrap_or(display)),
    }
}

/// Classify an SDK error using typed `SdkError` variants.
///
/// For `ServiceError`, uses `ProvideErrorMetadata` to get the error code and message.
pub fn classify_sdk_error<E, R>(
    err: &SdkError<E, R>,
    service: AwsService,
    table: Option<&str>,
) -> SdkFailure
where
    E: ProvideErrorMetadata + std::fmt::Debug + std::fmt::Display,
    R: std::fmt::Debug,
{
    if let Some(failure) = classify_outer_sdk_error(err, service) {
        return failure;
    }

    if let Some(service_err) = err.as_service_error() {
        let display = service_err.to_string();
        return classify_service_code(
            service_err.code(),
            service_err.message(),
            &display,
            service,
            table,
        );
    }

    SdkFailure::new(
        FailureKind::Other,
        format!("Unexpected {} error: {:?}", service.name(), err),
    )
}
