use serde::{Deserialize, Serialize};
use async_trait::async_trait;
use log::{debug, trace, error};
use std::time::Duration;

/// Finish reasons that mean the candidate text was withheld
const BLOCKING_FINISH_REASONS: &[&str] = &[
  "SAFETY"
, "RECITATION"
, "LANGUAGE"
];

// ===== Wire Types =====

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Part
{   #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Content
{   #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>
  , #[serde(default)]
    pub parts: Vec<Part>
}

#[derive(Debug, Clone, Serialize)]
pub struct GenerateContentRequest
{   pub contents: Vec<Content>
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResponseCandidate
{   #[serde(default)]
    pub content: Option<Content>
  , #[serde(default)]
    pub finish_reason: Option<String>
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PromptFeedback
{   #[serde(default)]
    pub block_reason: Option<String>
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateContentResponse
{   #[serde(default)]
    pub candidates: Vec<ResponseCandidate>
  , #[serde(default)]
    pub prompt_feedback: Option<PromptFeedback>
}

impl GenerateContentRequest
{   /// Single user turn holding the prompt
    pub fn from_prompt(prompt: &str) -> Self
    {   GenerateContentRequest
        {   contents: vec![
              Content
              {   role: Some("user".to_string())
                , parts: vec![
                    Part { text: Some(prompt.to_string()) }
                  ]
              }
            ]
        }
    }
}

impl GenerateContentResponse
{   /// Text of the first candidate, all parts joined.
    /// No candidates and no feedback yields an empty string.
    pub fn text(&self) -> Result<String, crate::error::Error>
    {   if let Some(first) = self.candidates.first()
        {   if let Some(reason) = first.finish_reason.as_deref()
            {   if BLOCKING_FINISH_REASONS.contains(&reason)
                {   return Err(crate::error::Error::Blocked(
                      format!("candidate finished with {}", reason)
                    ));
                }
            }
            let text = first.content
              .iter()
              .flat_map(|c| c.parts.iter())
              .filter_map(|p| p.text.as_deref())
              .collect::<String>();
            return Ok(text);
        }

        if let Some(feedback) = &self.prompt_feedback
        {   return Err(crate::error::Error::Blocked(
              match &feedback.block_reason
              {   Some(reason) => format!("prompt blocked: {}", reason)
                , None => "prompt blocked".to_string()
              }
            ));
        }

        Ok(String::new())
    }
}

// ===== Gemini Client =====

/// Gemini `generateContent` client, built once and shared
pub struct GeminiClient
{   api_key: String
  , model: String
  , api_base: String
  , http_client: reqwest::Client
}

impl GeminiClient
{   /// Create a client from the proxy config
    pub fn new(config: &crate::config::ProxyConfig)
      -> Result<Self, crate::error::Error>
    {   debug!(
          "Creating GeminiClient for model: {}",
          config.model
        );
        let http_client = reqwest::Client::builder()
          .timeout(Duration::from_secs(config.timeout_secs))
          .build()
          .map_err(|e| {
            error!("Failed to build HTTP client: {}", e);
            crate::error::Error::InvalidConfiguration(e.to_string())
          })?;

        Ok(GeminiClient
        {   api_key: config.api_key.clone()
          , model: config.model.clone()
          , api_base: config.api_base.clone()
          , http_client
        })
    }

    fn endpoint(&self) -> String
    {   format!(
          "{}/models/{}:generateContent",
          self.api_base, self.model
        )
    }

    async fn handle_send_prompt(
      &self
    , prompt: &str
    ) -> Result<String, crate::error::Error>
    {   let request = GenerateContentRequest::from_prompt(prompt);
        trace!("Gemini request: {:?}", request);

        let response = self.http_client
          .post(self.endpoint())
          .header("x-goog-api-key", &self.api_key)
          .json(&request)
          .send()
          .await
          .map_err(|e| {
            error!("HTTP error: {}", e);
            crate::error::Error::from(e)
          })?;

        let status = response.status();
        trace!("Gemini response status: {}", status);

        if !status.is_success()
        {   let error_text = response.text().await
              .unwrap_or_else(|_|
                "Unknown error".to_string()
              );
            error!("Gemini API error {}: {}", status, error_text);
            return Err(crate::error::Error::ApiError(
              format!("Gemini error {}: {}", status, error_text)
            ));
        }

        let body: GenerateContentResponse
          = response.json().await.map_err(|e| {
            error!("Parse error: {}", e);
            crate::error::Error::ParseError(e.to_string())
          })?;

        body.text()
    }
}

#[async_trait]
impl crate::providers::TextGenerator for GeminiClient
{   async fn generate(&self, prompt: &str)
      -> Result<String, crate::error::Error>
    {   debug!("Sending prompt to {}", self.model);
        self.handle_send_prompt(prompt).await
    }

    fn model(&self) -> &str
    {   &self.model
    }
}

#[cfg(test)]
mod tests
{   use super::*;
    use serde_json::json;
    use crate::error::Error;

    fn parse(value: serde_json::Value) -> GenerateContentResponse
    {   serde_json::from_value(value).unwrap()
    }

    #[test]
    fn request_wraps_prompt_in_user_turn()
    {   let req = GenerateContentRequest::from_prompt("Tell me a joke");
        assert_eq!(
          serde_json::to_value(&req).unwrap(),
          json!({
            "contents": [
              {"role": "user", "parts": [{"text": "Tell me a joke"}]}
            ]
          })
        );
    }

    #[test]
    fn text_joins_first_candidate_parts()
    {   let resp = parse(json!({
          "candidates": [
            { "content": {"role": "model", "parts": [
                {"text": "Hello, "}, {"text": "world"}
              ]}
            , "finishReason": "STOP"
            }
          , { "content": {"parts": [{"text": "ignored"}]} }
          ]
        }));
        assert_eq!(resp.text().unwrap(), "Hello, world");
    }

    #[test]
    fn candidate_without_parts_is_empty_text()
    {   let resp = parse(json!({
          "candidates": [{"finishReason": "MAX_TOKENS"}]
        }));
        assert_eq!(resp.text().unwrap(), "");
    }

    #[test]
    fn blocking_finish_reason_is_an_error()
    {   let resp = parse(json!({
          "candidates": [
            { "content": {"parts": [{"text": "partial"}]}
            , "finishReason": "SAFETY"
            }
          ]
        }));
        assert!(matches!(resp.text(), Err(Error::Blocked(_))));
    }

    #[test]
    fn only_sdk_finish_reasons_block()
    {   let with_reason = |reason: &str| parse(json!({
          "candidates": [
            { "content": {"parts": [{"text": "kept"}]}
            , "finishReason": reason
            }
          ]
        }));
        assert!(matches!(
          with_reason("LANGUAGE").text(),
          Err(Error::Blocked(_))
        ));
        for reason in ["BLOCKLIST", "PROHIBITED_CONTENT", "SPII", "OTHER"]
        {   assert_eq!(with_reason(reason).text().unwrap(), "kept");
        }
    }

    #[test]
    fn blocked_prompt_is_an_error()
    {   let resp = parse(json!({
          "promptFeedback": {"blockReason": "OTHER"}
        }));
        match resp.text()
        {   Err(Error::Blocked(reason)) => {
              assert!(reason.contains("OTHER"));
            }
          , other => panic!("unexpected: {:?}", other)
        }
    }

    #[test]
    fn empty_response_is_empty_text()
    {   let resp = parse(json!({}));
        assert_eq!(resp.text().unwrap(), "");
    }

    #[test]
    fn endpoint_uses_model_and_base()
    {   let mut config = crate::config::ProxyConfig::new("k");
        config.api_base = "http://localhost:1234/v1beta".to_string();
        let client = GeminiClient::new(&config).unwrap();
        assert_eq!(
          client.endpoint(),
          "http://localhost:1234/v1beta/models/gemini-pro:generateContent"
        );
    }
}
