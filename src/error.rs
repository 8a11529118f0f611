use std::fmt;

/// Body returned to callers for every failure that is not their fault.
pub const GENERIC_SERVER_ERROR: &str
  = "An error occurred on the server while trying to get the AI response.";

pub const METHOD_NOT_ALLOWED: &str = "Method not allowed";

pub const PROMPT_REQUIRED: &str
  = "prompt is required and cannot be empty";

pub const MALFORMED_BODY: &str = "request body must be valid JSON";

pub const PAYLOAD_TOO_LARGE: &str = "request body is too large";

/// Error type for every stage of the proxy
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Error
{   /// Request used a method other than POST
    MethodNotAllowed(String)
  , /// Prompt missing, not a string, or blank
    InvalidInput(String)
  , /// Request body is not JSON
    MalformedBody(String)
  , /// Request body over the size limit
    PayloadTooLarge(String)
  , /// API key is missing from the environment
    MissingApiKey(String)
  , /// Transport failure talking to the upstream
    HttpError(String)
  , /// Upstream returned a non-success status
    ApiError(String)
  , /// Failed to decode the upstream response
    ParseError(String)
  , /// Upstream refused to produce text
    Blocked(String)
  , /// Invalid configuration
    InvalidConfiguration(String)
  , /// Upstream call timed out
    Timeout
  , /// Generic error
    Other(String)
}

impl Error
{   /// HTTP status the caller sees for this error
    pub fn status_code(&self) -> u16
    {   match self
        {   Error::MethodNotAllowed(_) => 405
          , Error::InvalidInput(_)
          | Error::MalformedBody(_) => 400
          , Error::PayloadTooLarge(_) => 413
          , _ => 500
        }
    }

    /// Message safe to hand back to the caller.
    /// Server-side failures all collapse to one generic text.
    pub fn public_message(&self) -> &'static str
    {   match self
        {   Error::MethodNotAllowed(_) => METHOD_NOT_ALLOWED
          , Error::InvalidInput(_) => PROMPT_REQUIRED
          , Error::MalformedBody(_) => MALFORMED_BODY
          , Error::PayloadTooLarge(_) => PAYLOAD_TOO_LARGE
          , _ => GENERIC_SERVER_ERROR
        }
    }

    pub fn is_client_error(&self) -> bool
    {   self.status_code() < 500
    }
}

impl fmt::Display for Error
{   fn fmt(&self, f: &mut fmt::Formatter<'_>)
      -> fmt::Result
    {   match self
        {   Error::MethodNotAllowed(method) => {
              write!(f, "Method not allowed: {}", method)
            }
          , Error::InvalidInput(msg) => {
              write!(f, "Invalid input: {}", msg)
            }
          , Error::MalformedBody(msg) => {
              write!(f, "Malformed request body: {}", msg)
            }
          , Error::PayloadTooLarge(msg) => {
              write!(f, "Payload too large: {}", msg)
            }
          , Error::MissingApiKey(var) => {
              write!(f, "Missing API key: {} is not set", var)
            }
          , Error::HttpError(msg) => {
              write!(f, "HTTP error: {}", msg)
            }
          , Error::ApiError(msg) => {
              write!(f, "API error: {}", msg)
            }
          , Error::ParseError(msg) => {
              write!(f, "Parse error: {}", msg)
            }
          , Error::Blocked(reason) => {
              write!(f, "Response blocked: {}", reason)
            }
          , Error::InvalidConfiguration(msg) => {
              write!(f, "Invalid configuration: {}", msg)
            }
          , Error::Timeout => {
              write!(f, "Upstream request timed out")
            }
          , Error::Other(msg) => {
              write!(f, "Error: {}", msg)
            }
        }
    }
}

impl std::error::Error for Error {}

impl From<String> for Error
{   fn from(s: String) -> Self
    {   Error::Other(s)
    }
}

impl From<&str> for Error
{   fn from(s: &str) -> Self
    {   Error::Other(s.to_string())
    }
}

impl From<reqwest::Error> for Error
{   fn from(e: reqwest::Error) -> Self
    {   if e.is_timeout()
        {   Error::Timeout
        } else if e.is_decode()
        {   Error::ParseError(e.to_string())
        } else
        {   Error::HttpError(e.to_string())
        }
    }
}

impl From<axum::extract::rejection::BytesRejection> for Error
{   fn from(rejection: axum::extract::rejection::BytesRejection) -> Self
    {   if rejection.status() == axum::http::StatusCode::PAYLOAD_TOO_LARGE
        {   Error::PayloadTooLarge(rejection.body_text())
        } else
        {   Error::Other(rejection.body_text())
        }
    }
}
