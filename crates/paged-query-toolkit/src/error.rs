use paged_query_schema::Error as ConfigurationError;

/// Result type alias for toolkit operations.
pub type Result<T> = std::result::Result<T, Error>;

/// A request selected something outside the declared capability set.
///
/// Carries the request parameter that was rejected, the submitted value and
/// the values that would have been accepted, so the transport layer can
/// report it as a client input error verbatim.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{parameter} value \"{value}\" not in {allowed:?}")]
pub struct SchemaViolation {
   pub parameter: String,
   pub value: String,
   pub allowed: Vec<String>,
}

impl SchemaViolation {
   pub(crate) fn new(
      parameter: impl Into<String>,
      value: impl Into<String>,
      allowed: Vec<String>,
   ) -> Self {
      Self {
         parameter: parameter.into(),
         value: value.into(),
         allowed,
      }
   }
}

/// Error types for paged query operations.
#[derive(Debug, thiserror::Error)]
pub enum Error {
   /// The schema registry declarations are inconsistent.
   #[error(transparent)]
   Configuration(#[from] ConfigurationError),

   /// The request selected an undeclared field, direction or filter value.
   #[error(transparent)]
   SchemaViolation(#[from] SchemaViolation),
}

impl Error {
   /// Extract a structured error code from the error type.
   ///
   /// This provides machine-readable error codes for error handling.
   pub fn error_code(&self) -> String {
      match self {
         Error::Configuration(e) => match e {
            ConfigurationError::UnknownPatternField { .. } => "UNKNOWN_PATTERN_FIELD",
            ConfigurationError::DuplicateName { .. } => "DUPLICATE_NAME",
            ConfigurationError::EmptyColumns { .. } => "EMPTY_COLUMNS",
            ConfigurationError::EmptyAllowedValues { .. } => "EMPTY_ALLOWED_VALUES",
            ConfigurationError::InvalidColumnName { .. } => "INVALID_COLUMN_NAME",
            ConfigurationError::UnknownDefaultOrderField { .. } => "UNKNOWN_DEFAULT_ORDER_FIELD",
            ConfigurationError::Json(_) => "INVALID_CONFIGURATION",
            ConfigurationError::Io(_) => "IO_ERROR",
         }
         .to_string(),
         Error::SchemaViolation(_) => "SCHEMA_VIOLATION".to_string(),
      }
   }

   /// Whether the error was caused by request input rather than configuration.
   pub fn is_client_error(&self) -> bool {
      matches!(self, Error::SchemaViolation(_))
   }
}
