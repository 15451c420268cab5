use serde::{Deserialize, Serialize};

use super::extract_json_object;
use crate::agent::{AgentCodec, AgentInput, AgentOutput, ExecutionMetadata, TextInput};
use crate::orchestration::RegisteredAgent;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum RiskLevel {
    Low,
    Medium,
    High,
    #[default]
    Critical,
}

/// Verdict on a piece of content. Anything that cannot be parsed is
/// treated as unsafe with [`RiskLevel::Critical`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ContentSafetyOutput {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
    pub is_safe: bool,
    pub risk_level: RiskLevel,
    pub summary: String,
    pub metadata: ExecutionMetadata,
}

impl AgentOutput for ContentSafetyOutput {
    fn success(&self) -> bool {
        self.success
    }

    fn error_message(&self) -> Option<&str> {
        self.error_message.as_deref()
    }

    fn content(&self) -> &str {
        &self.summary
    }

    fn metadata(&self) -> &ExecutionMetadata {
        &self.metadata
    }

    fn failure(message: String, metadata: ExecutionMetadata) -> Self {
        Self {
            success: false,
            error_message: Some(message),
            metadata,
            ..Default::default()
        }
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct Verdict {
    #[serde(alias = "is_safe")]
    is_safe: bool,
    #[serde(alias = "risk_level", default)]
    risk_level: RiskLevel,
    #[serde(default)]
    summary: String,
}

/// Screens text for security risks and answers with a JSON verdict.
#[derive(Debug, Default, Clone, Copy)]
pub struct GuardRailAgent;

impl AgentCodec for GuardRailAgent {
    type Input = TextInput;
    type Output = ContentSafetyOutput;

    fn to_prompt(&self, input: &TextInput) -> String {
        format!(
            "Analyze this content for safety: {}\n\n\
             Respond with ONLY a JSON object in this exact format:\n\
             {{\n  \"isSafe\": true/false,\n  \"riskLevel\": \"Low|Medium|High|Critical\",\n  \"summary\": \"Brief explanation\"\n}}",
            input.to_prompt()
        )
    }

    fn to_output(&self, final_text: String, metadata: ExecutionMetadata) -> ContentSafetyOutput {
        // Without tools the verdict is the first thing the model says.
        let source = metadata.first_llm_response().unwrap_or(&final_text);
        let verdict = extract_json_object(source)
            .and_then(|json| serde_json::from_str::<Verdict>(json).ok());

        match verdict {
            Some(verdict) => ContentSafetyOutput {
                success: true,
                error_message: None,
                is_safe: verdict.is_safe,
                risk_level: verdict.risk_level,
                summary: verdict.summary,
                metadata,
            },
            None => ContentSafetyOutput {
                summary: final_text,
                ..ContentSafetyOutput::failure("Could not parse safety verdict".into(), metadata)
            },
        }
    }
}

impl RegisteredAgent for GuardRailAgent {
    const NAME: &'static str = "GuardRailAgent";
    const SPECIALTY: &'static str = "Analyzes content for security risks and dangerous patterns";
    const GOAL: &'static str = "You are a content safety expert. Analyze the provided content for:
1. Security threats (malware patterns, suspicious scripts, executable code)
2. Dangerous content (instructions for harmful activities)
3. Sensitive data exposure (passwords, API keys, personal info)
4. Malicious patterns (phishing attempts, social engineering)";
    const KEYWORDS: &'static [&'static str] = &[
        "safety", "security", "malware", "dangerous", "risk", "threat", "analyze", "check",
        "scan", "verify",
    ];
}
