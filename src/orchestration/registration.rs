use std::future::Future;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::Result;
use crate::agent::{
    Agent, AgentBuilder, AgentCodec, AgentContext, AgentRuntime, matches_keywords,
};
use crate::tools::Tool;

/// Static description of an agent type, available without building it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AgentRegistration {
    pub name: String,
    pub specialty: String,
    pub keywords: Vec<String>,
    pub goal: String,
    pub input_types: Vec<String>,
    pub output_type: Option<String>,
    pub tools: Vec<String>,
}

impl AgentRegistration {
    /// Keyword pre-filter, the same check a built agent applies.
    pub fn can_handle(&self, task: &str) -> bool {
        matches_keywords(&self.keywords, task)
    }
}

/// An agent type that can be registered with an
/// [`AgentRegistry`](super::AgentRegistry) and built on demand.
///
/// Implementors are codecs; the associated constants describe the agent and
/// [`RegisteredAgent::build`] pairs a fresh runtime with `Self::default()`.
pub trait RegisteredAgent: AgentCodec + Default {
    const NAME: &'static str;
    const SPECIALTY: &'static str;
    const GOAL: &'static str;
    const KEYWORDS: &'static [&'static str] = &[];

    /// Local tools, in the order they are offered to the model.
    fn tools() -> Vec<Arc<dyn Tool>> {
        Vec::new()
    }

    /// Hook for tool providers, MCP servers or a custom turn budget.
    fn configure(builder: AgentBuilder) -> AgentBuilder {
        builder
    }

    fn registration() -> AgentRegistration {
        AgentRegistration {
            name: Self::NAME.to_string(),
            specialty: Self::SPECIALTY.to_string(),
            keywords: Self::KEYWORDS.iter().map(|k| k.to_string()).collect(),
            goal: Self::GOAL.to_string(),
            input_types: vec![short_type_name::<Self::Input>().to_string()],
            output_type: Some(short_type_name::<Self::Output>().to_string()),
            tools: Self::tools().iter().map(|t| t.name().to_string()).collect(),
        }
    }

    fn build(context: &AgentContext) -> impl Future<Output = Result<Agent<Self>>> + Send {
        let builder = Self::configure(
            AgentRuntime::builder(Self::NAME)
                .specialty(Self::SPECIALTY)
                .goal(Self::GOAL)
                .keywords(Self::KEYWORDS.iter().copied())
                .tools(Self::tools()),
        );
        let context = context.clone();
        async move {
            let runtime = builder.build(&context).await?;
            Ok(Agent::new(runtime, Self::default()))
        }
    }
}

/// `monia_agent::agents::FileInput` becomes `FileInput`.
pub(crate) fn short_type_name<T: ?Sized>() -> &'static str {
    let full = std::any::type_name::<T>();
    let base = full.split('<').next().unwrap_or(full);
    base.rsplit("::").next().unwrap_or(base)
}
