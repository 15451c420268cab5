//! Typed agents on top of the untyped runtime.

use std::sync::Arc;

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;
use tracing::warn;

use super::{
    AgentInput, AgentOutput, AgentRuntime, ExecutionMetadata, TextInput, TextOutput,
    matches_keywords,
};

/// Converts between an agent's typed input/output and the text the execution
/// loop works with.
pub trait AgentCodec: Send + Sync + 'static {
    type Input: AgentInput;
    type Output: AgentOutput;

    fn to_prompt(&self, input: &Self::Input) -> String {
        input.to_prompt()
    }

    /// Builds the output from the final text and the run's metadata. Parse
    /// problems belong in the output (`success == false`), not in a panic.
    fn to_output(&self, final_text: String, metadata: ExecutionMetadata) -> Self::Output;
}

/// Codec for agents that take and return plain text.
#[derive(Debug, Default, Clone, Copy)]
pub struct TextCodec;

impl AgentCodec for TextCodec {
    type Input = TextInput;
    type Output = TextOutput;

    fn to_output(&self, final_text: String, metadata: ExecutionMetadata) -> TextOutput {
        TextOutput::completed(final_text, metadata)
    }
}

/// A runtime paired with its codec.
pub struct Agent<C: AgentCodec> {
    runtime: AgentRuntime,
    codec: C,
}

impl<C: AgentCodec> Agent<C> {
    pub fn new(runtime: AgentRuntime, codec: C) -> Self {
        Self { runtime, codec }
    }

    pub fn runtime(&self) -> &AgentRuntime {
        &self.runtime
    }

    pub fn codec(&self) -> &C {
        &self.codec
    }

    pub fn name(&self) -> &str {
        self.runtime.name()
    }

    /// Never fails: errors escaping the loop come back as a failed output.
    pub async fn execute(&self, input: C::Input, cancel: CancellationToken) -> C::Output {
        let prompt = self.codec.to_prompt(&input);
        self.execute_prompt(&prompt, cancel).await
    }

    async fn execute_prompt(&self, prompt: &str, cancel: CancellationToken) -> C::Output {
        let mut failed = ExecutionMetadata::started(self.runtime.name());
        match self.runtime.run(prompt, &cancel).await {
            Ok(outcome) => self.codec.to_output(outcome.final_text, outcome.metadata),
            Err(e) => {
                warn!(agent = %self.runtime.name(), error = %e, "Agent execution failed");
                failed.finish();
                C::Output::failure(e.to_string(), failed)
            }
        }
    }
}

impl<C: AgentCodec> std::fmt::Debug for Agent<C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Agent")
            .field("runtime", &self.runtime)
            .field("codec", &std::any::type_name::<C>())
            .finish()
    }
}

/// Object-safe view of an agent, used wherever agents of different types
/// live side by side.
#[async_trait]
pub trait DynAgent: Send + Sync {
    fn name(&self) -> &str;

    fn specialty(&self) -> &str;

    fn keywords(&self) -> &[String];

    fn can_handle(&self, task: &str) -> bool {
        matches_keywords(self.keywords(), task)
    }

    /// Uses the codec when `input` is the agent's own input type and the
    /// input's own prompt otherwise.
    async fn execute_dyn(
        &self,
        input: &dyn AgentInput,
        cancel: CancellationToken,
    ) -> Arc<dyn AgentOutput>;
}

#[async_trait]
impl<C: AgentCodec> DynAgent for Agent<C> {
    fn name(&self) -> &str {
        self.runtime.name()
    }

    fn specialty(&self) -> &str {
        self.runtime.specialty()
    }

    fn keywords(&self) -> &[String] {
        self.runtime.keywords()
    }

    async fn execute_dyn(
        &self,
        input: &dyn AgentInput,
        cancel: CancellationToken,
    ) -> Arc<dyn AgentOutput> {
        let prompt = match input.downcast_ref::<C::Input>() {
            Some(typed) => self.codec.to_prompt(typed),
            None => input.to_prompt(),
        };
        Arc::new(self.execute_prompt(&prompt, cancel).await)
    }
}
