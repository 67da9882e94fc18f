mod client;

pub use client::{CompletionClient, GroqClient};
