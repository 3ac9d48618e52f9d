//! Generative capability seam
//!
//! The generators treat the LLM as an opaque capability: submit a prompt,
//! get text back, or fail. Everything behind this trait is best-effort —
//! callers swallow the fault and fall back to baseline content.

use crate::openai::OpenAiClient;
use async_trait::async_trait;
use std::error::Error;

pub type GenerativeFault = Box<dyn Error + Send + Sync>;

#[async_trait]
pub trait GenerativeBackend: Send + Sync {
    /// Submit a single prompt and return the model's text response.
    async fn complete(&self, prompt: &str) -> Result<String, GenerativeFault>;
}

#[async_trait]
impl GenerativeBackend for OpenAiClient {
    async fn complete(&self, prompt: &str) -> Result<String, GenerativeFault> {
        OpenAiClient::complete(self, prompt)
            .await
            .map_err(GenerativeFault::from)
    }
}

#[cfg(test)]
pub(crate) mod test_backends {
    use super::*;

    /// Backend that fails every call, simulating an unreachable capability
    pub struct Unavailable;

    #[async_trait]
    impl GenerativeBackend for Unavailable {
        async fn complete(&self, _prompt: &str) -> Result<String, GenerativeFault> {
            Err("generative capability unavailable".into())
        }
    }

    /// Backend that returns a fixed response for every prompt
    pub struct Canned(pub String);

    #[async_trait]
    impl GenerativeBackend for Canned {
        async fn complete(&self, _prompt: &str) -> Result<String, GenerativeFault> {
            Ok(self.0.clone())
        }
    }
}
