//! Errata: error classification and adaptive recovery for generative-AI HTTP APIs.
//!
//! Turns whatever an AI provider fails with (an HTTP status, a vendor error
//! body, a transport error, a bare string) into a canonical [`ErrorCode`] with
//! a severity and a retryable flag, explains it in language safe to show an
//! end user, and drives retries and request throttling from that
//! classification.
//!
//! # Quick Start
//!
//! ```no_run
//! use errata::prelude::*;
//!
//! # async fn example() -> std::result::Result<(), ErrorAnalysis> {
//! let facade = RecoveryFacade::default();
//! let options = RequestOptions::builder()
//!     .endpoint("https://api.openai.com/v1/chat/completions")
//!     .provider(ProviderKey::OpenAi)
//!     .body(serde_json::json!({"model": "gpt-4o", "messages": []}))
//!     .build();
//!
//! match facade.call_json(&options).await {
//!     Ok(body) => println!("{body}"),
//!     Err(analysis) => eprintln!("{}", analysis.user_message()),
//! }
//! # Ok(())
//! # }
//! ```
//!
//! Classification alone needs no runtime:
//!
//! ```
//! use errata::classify::{classify_with_hint, ErrorCode};
//! use serde_json::json;
//!
//! let raw = json!({"statusCode": 529, "message": "Overloaded"});
//! assert_eq!(classify_with_hint(&raw, Some("claude")).code, ErrorCode::ClaudeOverloaded);
//! assert_eq!(classify_with_hint(&raw, None).code, ErrorCode::Unknown);
//! ```
//!
//! [`ErrorCode`]: classify::ErrorCode

pub mod classify;
pub mod config;
pub mod error;
pub mod explain;
pub mod prelude;
pub mod provider;
pub mod recovery;
pub mod util;
