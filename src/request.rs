//! Inbound request shape and outbound response bodies

use serde::{Deserialize, Serialize};
use serde_json::Value;
use log::debug;

/// Validated prompt request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PromptRequest
{   /// The prompt text, as sent by the caller
    pub prompt: String
}

impl PromptRequest
{   /// Parse a raw body into JSON
    pub fn parse_body(body: &[u8])
      -> Result<Value, crate::error::Error>
    {   serde_json::from_slice(body).map_err(|e| {
          debug!("Request body is not JSON: {}", e);
          crate::error::Error::MalformedBody(e.to_string())
        })
    }

    /// Check the parsed body carries a usable prompt.
    /// The prompt is kept as sent; trimming only decides emptiness.
    pub fn from_value(value: &Value)
      -> Result<Self, crate::error::Error>
    {   let field = match value
        {   Value::Object(map) => map.get("prompt")
          , _ => {
              return Err(crate::error::Error::InvalidInput(
                "body is not a JSON object".to_string()
              ));
            }
        };

        match field
        {   None | Some(Value::Null) => {
              Err(crate::error::Error::InvalidInput(
                "prompt is missing".to_string()
              ))
            }
          , Some(Value::String(s)) if s.trim().is_empty() => {
              Err(crate::error::Error::InvalidInput(
                "prompt is blank".to_string()
              ))
            }
          , Some(Value::String(s)) => {
              Ok(PromptRequest { prompt: s.clone() })
            }
          , Some(other) => {
              Err(crate::error::Error::InvalidInput(
                format!("prompt is not a string: {}", other)
              ))
            }
        }
    }

    /// Parse then validate in one go
    pub fn from_body(body: &[u8])
      -> Result<Self, crate::error::Error>
    {   let value = Self::parse_body(body)?;
        Self::from_value(&value)
    }
}

// ===== Success envelope =====

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TextPart
{   pub text: String
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CandidateContent
{   pub parts: Vec<TextPart>
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Candidate
{   pub content: CandidateContent
}

/// The nested shape the front-end reads generated text from
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Envelope
{   pub candidates: Vec<Candidate>
}

impl Envelope
{   /// Wrap generated text unchanged
    pub fn from_text(text: impl Into<String>) -> Self
    {   Envelope
        {   candidates: vec![
              Candidate
              {   content: CandidateContent
                  {   parts: vec![TextPart { text: text.into() }]
                  }
              }
            ]
        }
    }

    /// First text part, if any
    #[cfg(test)]
    pub fn text(&self) -> Option<&str>
    {   self.candidates.first()
          .and_then(|c| c.content.parts.first())
          .map(|p| p.text.as_str())
    }
}

/// Error body returned with every non-200 status
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorResponse
{   pub error: String
}

impl From<&crate::error::Error> for ErrorResponse
{   fn from(e: &crate::error::Error) -> Self
    {   ErrorResponse
        {   error: e.public_message().to_string()
        }
    }
}
