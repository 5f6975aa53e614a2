use async_trait::async_trait;

use super::Actor;

/// A read-only query an actor can ask.
#[async_trait]
pub trait Question: Send + Sync {
    type Answer: Send;

    async fn ask(&self, actor: &Actor) -> Self::Answer;
}
