//! Static workflows over the sample agents.

mod common;

use std::sync::Arc;
use std::time::Duration;

use common::{RoutingGateway, call, complete, context, init_tracing, text};
use monia_agent::agents::{
    ContentSafetyOutput, FileInput, FileOutput, FileReaderAgent, GuardRailAgent, RiskLevel,
    TranslatorAgent,
};
use monia_agent::{
    AgentContext, DynAgent, RegisteredAgent, TextInput, Workflow, WorkflowBuilder,
};
use serde_json::json;
use tokio_util::sync::CancellationToken;

const FILE_READER: &str = "file reading specialist";
const GUARD_RAIL: &str = "content safety expert";
const TRANSLATOR: &str = "translation agent";

const SAFE_VERDICT: &str = r#"{"isSafe": true, "riskLevel": "Low", "summary": "Meeting notes"}"#;

async fn read_then_check(context: &AgentContext, check_retries: u32) -> Workflow {
    let reader: Arc<dyn DynAgent> = Arc::new(FileReaderAgent::build(context).await.unwrap());
    let guard: Arc<dyn DynAgent> = Arc::new(GuardRailAgent::build(context).await.unwrap());

    WorkflowBuilder::new()
        .with_name("read-then-check")
        .register_agent(reader)
        .register_agent(guard)
        .add_step("FileReaderAgent", |step| step.metadata("stage", "ingest"))
        .add_step("GuardRailAgent", move |step| {
            step.max_retries(check_retries)
                .retry_delay(Duration::from_millis(10))
                .transform(|previous| {
                    TextInput::new(previous.map(|output| output.content()).unwrap_or_default())
                })
        })
        .build()
        .unwrap()
}

mod pipeline {
    use super::*;

    #[tokio::test]
    async fn test_file_content_flows_into_guard_rail() {
        init_tracing();
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("notes.txt");
        std::fs::write(&path, "Standup moved to 10am").unwrap();
        let path = path.to_string_lossy().to_string();

        let gateway = Arc::new(
            RoutingGateway::new()
                .route(
                    FILE_READER,
                    vec![
                        call("r1", "read_file_content", json!({"file_path": path})),
                        complete("r2", "Read the notes."),
                    ],
                )
                .route(GUARD_RAIL, vec![complete("g1", SAFE_VERDICT)]),
        );
        let workflow = read_then_check(&context(gateway.clone()), 1).await;

        let result = workflow
            .execute(&FileInput::read(&path), CancellationToken::new())
            .await;

        assert!(result.success, "{:?}", result.error_message);
        assert_eq!(result.step_results.len(), 2);
        assert_eq!(result.step_results[0].metadata["stage"], "ingest");

        let read = result
            .context
            .previous_result("FileReaderAgent")
            .and_then(|output| output.downcast_ref::<FileOutput>())
            .unwrap();
        assert_eq!(read.content, "Standup moved to 10am");
        assert_eq!(read.file_size, Some(21));

        let verdict = result.final_result_as::<ContentSafetyOutput>().unwrap();
        assert!(verdict.is_safe);
        assert_eq!(verdict.risk_level, RiskLevel::Low);
        assert_eq!(verdict.summary, "Meeting notes");

        let check_prompt = &gateway.requests_for(GUARD_RAIL)[0].messages[0].content;
        assert!(check_prompt.contains("Standup moved to 10am"));
        assert_eq!(
            result.context.execution_path,
            vec!["FileReaderAgent:true", "GuardRailAgent:true"]
        );
    }

    #[tokio::test]
    async fn test_unparseable_verdict_is_retried() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("notes.txt");
        std::fs::write(&path, "hello").unwrap();
        let path = path.to_string_lossy().to_string();

        let gateway = Arc::new(
            RoutingGateway::new()
                .route(
                    FILE_READER,
                    vec![
                        call("r1", "read_file_content", json!({"file_path": path})),
                        complete("r2", "done"),
                    ],
                )
                .route(
                    GUARD_RAIL,
                    vec![
                        text("not sure"),
                        text("still not sure"),
                        complete("g1", SAFE_VERDICT),
                    ],
                ),
        );
        let workflow = read_then_check(&context(gateway), 3).await;

        let result = workflow
            .execute(&FileInput::read(&path), CancellationToken::new())
            .await;

        assert!(result.success);
        assert_eq!(result.step_results[1].attempt, 2);
        assert!(result.final_result_as::<ContentSafetyOutput>().unwrap().is_safe);
    }

    #[tokio::test]
    async fn test_missing_file_stops_the_pipeline() {
        let gateway = Arc::new(RoutingGateway::new().route(
            FILE_READER,
            vec![
                call("r1", "read_file_content", json!({"file_path": "/nonexistent/monia.txt"})),
                complete("r2", "The file does not exist."),
            ],
        ));
        let workflow = read_then_check(&context(gateway.clone()), 1).await;

        let result = workflow
            .execute(&FileInput::read("/nonexistent/monia.txt"), CancellationToken::new())
            .await;

        assert!(!result.success);
        assert_eq!(result.step_results.len(), 1);
        assert!(
            result
                .error_message
                .as_ref()
                .unwrap()
                .starts_with("Step 1 failed: Error executing tool: File not found")
        );
        assert!(gateway.requests_for(GUARD_RAIL).is_empty());
        assert!(result.final_result().is_none());
    }
}

mod control {
    use super::*;

    #[tokio::test]
    async fn test_continue_on_error_forwards_failed_output() {
        let gateway = Arc::new(
            RoutingGateway::new()
                .route(GUARD_RAIL, vec![text("no idea"), text("really no idea")])
                .route(TRANSLATOR, vec![complete("t1", "aucune idée")]),
        );
        let context = context(gateway.clone());
        let workflow = WorkflowBuilder::new()
            .with_name("check-then-translate")
            .register_agent(Arc::new(GuardRailAgent::build(&context).await.unwrap()))
            .register_agent(Arc::new(TranslatorAgent::build(&context).await.unwrap()))
            .add_step("GuardRailAgent", |step| step.continue_on_error(true))
            .add_step("TranslatorAgent", |step| step)
            .build()
            .unwrap();

        let result = workflow
            .execute(&TextInput::new("rm -rf /"), CancellationToken::new())
            .await;

        assert!(result.success);
        assert!(!result.step_results[0].success);
        assert_eq!(
            result.step_results[0].error_message.as_deref(),
            Some("Could not parse safety verdict")
        );
        assert_eq!(
            result.context.execution_path,
            vec!["GuardRailAgent:false", "TranslatorAgent:true"]
        );
        assert_eq!(result.final_result().map(|o| o.content()), Some("aucune idée"));
    }

    #[tokio::test]
    async fn test_conditional_step_skipped_for_unsafe_content() {
        let gateway = Arc::new(RoutingGateway::new().route(
            GUARD_RAIL,
            vec![complete(
                "g1",
                r#"{"isSafe": false, "riskLevel": "High", "summary": "Destructive command"}"#,
            )],
        ));
        let context = context(gateway.clone());
        let workflow = WorkflowBuilder::new()
            .with_name("guarded-translation")
            .register_agent(Arc::new(GuardRailAgent::build(&context).await.unwrap()))
            .register_agent(Arc::new(TranslatorAgent::build(&context).await.unwrap()))
            .add_step("GuardRailAgent", |step| step)
            .add_conditional_step(
                "TranslatorAgent",
                |previous| {
                    previous
                        .downcast_ref::<ContentSafetyOutput>()
                        .is_some_and(|verdict| verdict.is_safe)
                },
                |step| step,
            )
            .build()
            .unwrap();

        let result = workflow
            .execute(&TextInput::new("rm -rf /"), CancellationToken::new())
            .await;

        assert!(result.success);
        assert!(result.step_results[1].skipped);
        assert!(gateway.requests_for(TRANSLATOR).is_empty());
        let verdict = result.final_result_as::<ContentSafetyOutput>().unwrap();
        assert_eq!(verdict.risk_level, RiskLevel::High);
    }

    #[tokio::test]
    async fn test_unknown_agent_halts() {
        let workflow = WorkflowBuilder::new()
            .with_name("ghost")
            .add_step("GhostAgent", |step| step.max_retries(3))
            .build()
            .unwrap();

        let result = workflow
            .execute(&TextInput::new("boo"), CancellationToken::new())
            .await;

        assert!(!result.success);
        assert_eq!(
            result.error_message.as_deref(),
            Some("Step 1 failed: Agent 'GhostAgent' not found")
        );
        assert_eq!(result.step_results[0].attempt, 0);
    }

    #[tokio::test]
    async fn test_cancelled_before_start() {
        let gateway = Arc::new(RoutingGateway::new());
        let context = context(gateway.clone());
        let workflow = WorkflowBuilder::new()
            .with_name("cancelled")
            .register_agent(Arc::new(TranslatorAgent::build(&context).await.unwrap()))
            .add_step("TranslatorAgent", |step| step)
            .build()
            .unwrap();

        let cancel = CancellationToken::new();
        cancel.cancel();
        let result = workflow.execute(&TextInput::new("hi"), cancel).await;

        assert!(!result.success);
        assert_eq!(result.error_message.as_deref(), Some("cancelled"));
        assert!(result.step_results.is_empty());
        assert!(gateway.requests().is_empty());
    }
}
