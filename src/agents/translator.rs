use serde::{Deserialize, Serialize};

use crate::agent::{AgentCodec, AgentInput, ExecutionMetadata, TextOutput};
use crate::orchestration::RegisteredAgent;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TranslationInput {
    pub content: String,
    pub target_language: String,
}

impl TranslationInput {
    pub fn new(content: impl Into<String>, target_language: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            target_language: target_language.into(),
        }
    }
}

impl AgentInput for TranslationInput {
    fn to_prompt(&self) -> String {
        format!(
            "Translate {} into {}. Return only the translated content.",
            self.content, self.target_language
        )
    }
}

#[derive(Debug, Default, Clone, Copy)]
pub struct TranslatorAgent;

impl AgentCodec for TranslatorAgent {
    type Input = TranslationInput;
    type Output = TextOutput;

    fn to_output(&self, final_text: String, metadata: ExecutionMetadata) -> TextOutput {
        TextOutput::completed(final_text.trim(), metadata)
    }
}

impl RegisteredAgent for TranslatorAgent {
    const NAME: &'static str = "TranslatorAgent";
    const SPECIALTY: &'static str = "Translate content from one language to another";
    const GOAL: &'static str =
        "You are a translation agent. Translate the content into the requested target language.";
    const KEYWORDS: &'static [&'static str] = &["translate", "translating", "translation", "language"];
}
