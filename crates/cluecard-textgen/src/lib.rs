//! Clue Card: text-generation service client.
//!
//! [`HttpTextGenerator`] talks to an OpenAI-compatible chat-completions
//! endpoint. Credentials are either a static API key or OAuth2 client
//! credentials; client-credential tokens live in a [`TokenCache`] shared by
//! every request in the process.

pub mod auth;
pub mod client;

pub use auth::{AccessToken, ClientCredentialsFetcher, Credentials, TokenCache, TokenFetcher};
pub use client::{HttpTextGenerator, TextGenSettings};
