pub mod error;
pub mod config;
pub mod providers;
pub mod request;
pub mod handler;
pub mod server;

/*

genproxy: one POST endpoint in front of the Gemini text API.

  POST { "prompt": "..." }
    -> 200 { "candidates": [{ "content": { "parts": [{ "text": "..." }] } }] }
    -> 400 / 405 / 500 { "error": "..." }

genproxy/
├── src/
│   ├── lib.rs          # Re-exports
│   ├── main.rs         # Binary: logger, config, serve
│   ├── error.rs        # Error taxonomy and status mapping
│   ├── config.rs       # Environment configuration
│   ├── request.rs      # Request validation, envelope types
│   ├── handler.rs      # The request pipeline
│   ├── server.rs       # axum routes
│   └── providers/
│       ├── mod.rs      # TextGenerator trait
│       └── gemini.rs   # Gemini generateContent client
└── tests/

*/

pub use config::ProxyConfig;
pub use error::Error;
pub use handler::{HandlerResponse, RequestHandler};
pub use providers::{GeminiClient, TextGenerator};
pub use request::{Envelope, ErrorResponse, PromptRequest};

/// Result of one upstream generation
pub type GenerateReply = Result<String, crate::error::Error>;
