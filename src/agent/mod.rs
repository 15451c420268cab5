//! Agents: the untyped execution runtime and the typed pipeline around it.

mod context;
mod execution;
mod io;
mod metadata;
mod runtime;
mod typed;

#[cfg(test)]
pub(crate) mod tests;

pub use context::{AgentContext, DEFAULT_MAX_TURNS};
pub use execution::{QUIET_TURN_LIMIT, RunOutcome};
pub use io::{AgentInput, AgentOutput, TextInput, TextOutput, structured_prompt};
pub use metadata::{ConversationStep, ExecutionMetadata, StepKind, TerminationReason};
pub use runtime::{AgentBuilder, AgentRuntime, ProviderWarning, matches_keywords};
pub use typed::{Agent, AgentCodec, DynAgent, TextCodec};
