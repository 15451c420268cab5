use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::agent::{AgentCodec, AgentInput, AgentOutput, ExecutionMetadata, structured_prompt};
use crate::orchestration::RegisteredAgent;
use crate::tools::{ExecutionContext, SchemaTool, Tool};
use crate::types::ToolResult;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FileOperation {
    #[default]
    Read,
    Write,
    Delete,
    Create,
    Move,
    Copy,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FileInput {
    pub file_path: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(default)]
    pub operation: FileOperation,
}

impl FileInput {
    pub fn read(file_path: impl Into<String>) -> Self {
        Self {
            file_path: file_path.into(),
            content: None,
            operation: FileOperation::Read,
        }
    }
}

impl From<&str> for FileInput {
    fn from(file_path: &str) -> Self {
        Self::read(file_path)
    }
}

impl AgentInput for FileInput {
    fn to_prompt(&self) -> String {
        match self.operation {
            FileOperation::Read => format!(
                "Read the file at {} and return its contents. Use the read_file_content tool with the file path.",
                self.file_path
            ),
            _ => structured_prompt(self),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FileOutput {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
    pub content: String,
    pub file_path: String,
    pub operation: FileOperation,
    pub file_size: Option<u64>,
    pub last_modified: Option<DateTime<Utc>>,
    pub metadata: ExecutionMetadata,
}

impl AgentOutput for FileOutput {
    fn success(&self) -> bool {
        self.success
    }

    fn error_message(&self) -> Option<&str> {
        self.error_message.as_deref()
    }

    fn content(&self) -> &str {
        &self.content
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

/// What `read_file_content` returns on success.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct FileRead {
    file_path: String,
    content: String,
    size: u64,
    last_modified: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct ReadFileContentInput {
    /// Path to the file to read
    pub file_path: String,
}

#[derive(Debug, Default, Clone, Copy)]
pub struct ReadFileContentTool;

#[async_trait]
impl SchemaTool for ReadFileContentTool {
    type Input = ReadFileContentInput;
    const NAME: &'static str = "read_file_content";
    const DESCRIPTION: &'static str = "Reads the content of a text file.";

    async fn handle(&self, input: ReadFileContentInput, _context: &ExecutionContext) -> ToolResult {
        let path = input.file_path;
        let metadata = match tokio::fs::metadata(&path).await {
            Ok(metadata) if metadata.is_file() => metadata,
            Ok(_) => return ToolResult::error(format!("Not a file: {}", path)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return ToolResult::error(format!("File not found: {}", path));
            }
            Err(e) => return ToolResult::error(e.to_string()),
        };

        match tokio::fs::read_to_string(&path).await {
            Ok(content) => ToolResult::structured(&FileRead {
                file_path: path,
                content,
                size: metadata.len(),
                last_modified: metadata.modified().ok().map(DateTime::<Utc>::from),
            }),
            Err(e) => ToolResult::error(e.to_string()),
        }
    }
}

/// Reads files through the `read_file_content` tool.
#[derive(Debug, Default, Clone, Copy)]
pub struct FileReaderAgent;

impl AgentCodec for FileReaderAgent {
    type Input = FileInput;
    type Output = FileOutput;

    fn to_output(&self, final_text: String, metadata: ExecutionMetadata) -> FileOutput {
        let tool_result = metadata.find_tool_result(ReadFileContentTool::NAME);
        let parsed = tool_result.and_then(|raw| serde_json::from_str::<FileRead>(raw).ok());

        match parsed {
            Some(read) => FileOutput {
                success: true,
                error_message: None,
                content: read.content,
                file_path: read.file_path,
                operation: FileOperation::Read,
                file_size: Some(read.size),
                last_modified: read.last_modified,
                metadata,
            },
            None => {
                let message = tool_result
                    .map(String::from)
                    .unwrap_or_else(|| "Could not parse tool result".to_string());
                FileOutput {
                    content: final_text,
                    ..FileOutput::failure(message, metadata)
                }
            }
        }
    }
}

impl RegisteredAgent for FileReaderAgent {
    const NAME: &'static str = "FileReaderAgent";
    const SPECIALTY: &'static str = "Reading files and extracting content";
    const GOAL: &'static str = "You are a file reading specialist. You can read files and \
        extract their content. Use the read_file_content tool to read files when requested.";
    const KEYWORDS: &'static [&'static str] = &["read", "file", "content", "open", "show", "display"];

    fn tools() -> Vec<Arc<dyn Tool>> {
        vec![Arc::new(ReadFileContentTool)]
    }
}
