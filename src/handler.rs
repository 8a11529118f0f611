use std::sync::Arc;
use axum::http::Method;
use log::{debug, error, info};
use crate::providers::TextGenerator;
use crate::request::{Envelope, ErrorResponse, PromptRequest};

pub const CONTENT_TYPE_JSON: &str = "application/json";

/// Status and JSON body produced for one invocation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HandlerResponse
{   pub status: u16
  , pub content_type: &'static str
  , pub body: String
}

impl HandlerResponse
{   fn json<T: serde::Serialize>(status: u16, value: &T) -> Self
    {   // Plain structs of strings always serialize
        let body = serde_json::to_string(value)
          .unwrap_or_else(|_| String::from("{}"));
        HandlerResponse
        {   status
          , content_type: CONTENT_TYPE_JSON
          , body
        }
    }

    /// Response for a successfully generated text
    pub fn success(text: String) -> Self
    {   HandlerResponse::json(200, &Envelope::from_text(text))
    }

    /// Response for any failure; only the public message is exposed
    pub fn failure(e: &crate::error::Error) -> Self
    {   HandlerResponse::json(e.status_code(), &ErrorResponse::from(e))
    }
}

/// Stateless prompt handler around one shared upstream client
#[derive(Clone)]
pub struct RequestHandler
{   generator: Arc<dyn TextGenerator>
}

impl RequestHandler
{   pub fn new(generator: Arc<dyn TextGenerator>) -> Self
    {   debug!(
          "Creating RequestHandler for model: {}",
          generator.model()
        );
        RequestHandler { generator }
    }

    /// Run one request through method check, parse, validate,
    /// upstream call and shaping. Never fails: every error
    /// becomes a JSON error response here.
    pub async fn handle(
      &self
    , method: &Method
    , body: &[u8]
    ) -> HandlerResponse
    {   match self.process(method, body).await
        {   Ok(text) => {
              debug!("Generated {} bytes of text", text.len());
              HandlerResponse::success(text)
            }
          , Err(e) if e.is_client_error() => {
              info!("Rejected request: {}", e);
              HandlerResponse::failure(&e)
            }
          , Err(e) => {
              error!("Error processing AI request: {}", e);
              HandlerResponse::failure(&e)
            }
        }
    }

    /// Answer a request whose body could not be read.
    /// The method check still comes first.
    pub fn reject(
      &self
    , method: &Method
    , e: crate::error::Error
    ) -> HandlerResponse
    {   let e = check_method(method).err().unwrap_or(e);
        info!("Rejected request: {}", e);
        HandlerResponse::failure(&e)
    }

    async fn process(
      &self
    , method: &Method
    , body: &[u8]
    ) -> Result<String, crate::error::Error>
    {   check_method(method)?;
        let request = PromptRequest::from_body(body)?;
        debug!(
          "Forwarding prompt ({} chars) to {}",
          request.prompt.chars().count(),
          self.generator.model()
        );
        self.generator.generate(&request.prompt).await
    }
}

fn check_method(method: &Method) -> Result<(), crate::error::Error>
{   if *method == Method::POST
    {   Ok(())
    } else
    {   Err(crate::error::Error::MethodNotAllowed(
          method.to_string()
        ))
    }
}

#[cfg(test)]
mod tests
{   use super::*;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use crate::error::{Error, GENERIC_SERVER_ERROR};

    struct Canned
    {   reply: Result<String, Error>
      , calls: AtomicUsize
    }

    #[async_trait]
    impl TextGenerator for Canned
    {   async fn generate(&self, _prompt: &str)
          -> Result<String, Error>
        {   self.calls.fetch_add(1, Ordering::SeqCst);
            self.reply.clone()
        }

        fn model(&self) -> &str
        {   "canned"
        }
    }

    fn handler_with(reply: Result<String, Error>)
      -> (RequestHandler, Arc<Canned>)
    {   let canned = Arc::new(Canned
        {   reply
          , calls: AtomicUsize::new(0)
        });
        (RequestHandler::new(canned.clone()), canned)
    }

    #[test]
    fn method_is_checked_before_body()
    {   let (handler, canned) = handler_with(Ok("x".into()));
        let resp = tokio_test::block_on(
          handler.handle(&Method::GET, b"{not json")
        );
        assert_eq!(resp.status, 405);
        assert_eq!(resp.body, r#"{"error":"Method not allowed"}"#);
        assert_eq!(canned.calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn invalid_input_never_reaches_upstream()
    {   let (handler, canned) = handler_with(Ok("x".into()));
        let resp = tokio_test::block_on(
          handler.handle(&Method::POST, br#"{"prompt": "   "}"#)
        );
        assert_eq!(resp.status, 400);
        assert_eq!(canned.calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn upstream_failure_is_generic()
    {   let (handler, _) = handler_with(
          Err(Error::HttpError("dns failure for upstream".into()))
        );
        let resp = tokio_test::block_on(
          handler.handle(&Method::POST, br#"{"prompt": "hi"}"#)
        );
        assert_eq!(resp.status, 500);
        assert_eq!(resp.content_type, CONTENT_TYPE_JSON);
        assert!(resp.body.contains(GENERIC_SERVER_ERROR));
        assert!(!resp.body.contains("dns"));
    }

    #[test]
    fn unreadable_body_keeps_method_check_first()
    {   let (handler, _) = handler_with(Ok("x".into()));
        let too_big = Error::PayloadTooLarge("limit".into());
        let resp = handler.reject(&Method::PUT, too_big.clone());
        assert_eq!(resp.status, 405);
        let resp = handler.reject(&Method::POST, too_big);
        assert_eq!(resp.status, 413);
        assert_eq!(resp.body, r#"{"error":"request body is too large"}"#);
    }

    #[test]
    fn success_wraps_text()
    {   let (handler, canned) = handler_with(Ok("42".into()));
        let resp = tokio_test::block_on(
          handler.handle(&Method::POST, br#"{"prompt": "6*7?"}"#)
        );
        assert_eq!(resp.status, 200);
        let env: Envelope = serde_json::from_str(&resp.body).unwrap();
        assert_eq!(env.text(), Some("42"));
        assert_eq!(canned.calls.load(Ordering::SeqCst), 1);
    }
}
