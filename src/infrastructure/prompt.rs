use crate::domain::payment::SecondFactor;
use crate::domain::ports::SecondFactorPrompt;
use crate::error::{FlowError, Result};
use async_trait::async_trait;

/// Answers every prompt with the same secret, or with `None` for wallets
/// without a second password.
#[derive(Debug, Clone, Default)]
pub struct StaticSecondFactor {
    secret: Option<SecondFactor>,
}

impl StaticSecondFactor {
    pub fn new(secret: impl Into<String>) -> Self {
        Self {
            secret: Some(SecondFactor::new(secret)),
        }
    }

    pub fn none() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SecondFactorPrompt for StaticSecondFactor {
    async fn prompt(&self) -> Result<Option<SecondFactor>> {
        Ok(self.secret.clone())
    }
}

/// A prompt the user always dismisses.
#[derive(Debug, Clone, Copy, Default)]
pub struct DismissedPrompt;

#[async_trait]
impl SecondFactorPrompt for DismissedPrompt {
    async fn prompt(&self) -> Result<Option<SecondFactor>> {
        Err(FlowError::SecondFactorCancelled)
    }
}
