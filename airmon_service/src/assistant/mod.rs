//! Natural-language questions about a station.
//!
//! Submodules:
//! - `client` — one chat-completion exchange per question.
//! - `credentials` — API key sources, tried in order.
//! - `prompts` — system instruction and suggested questions.

pub mod client;
pub mod credentials;
pub mod prompts;

pub use client::AssistantClient;
pub use credentials::{Credential, CredentialChain, CredentialProvider};
