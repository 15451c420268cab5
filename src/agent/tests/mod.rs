//! Execution loop and typed pipeline tests.

pub(crate) mod helpers;

use std::sync::Arc;
use std::sync::atomic::Ordering;
use std::time::Duration;

use tokio_util::sync::CancellationToken;

use self::helpers::{
    DummyTool, FailingTool, ScriptedGateway, StaticProvider, call, complete, context, text_agent,
};
use super::{
    AgentContext, AgentOutput, AgentRuntime, DynAgent, StepKind, TerminationReason, TextInput,
};
use crate::client::ChatResponse;
use crate::tools::ToolOutput;
use crate::types::Role;
use crate::{COMPLETION_TOOL_NAME, Error};

fn lookup_call(id: &str) -> ChatResponse {
    ChatResponse::tool_calls(vec![call(id, "lookup", serde_json::json!({"q": id}))])
}

async fn runtime_with_lookup(gateway: Arc<ScriptedGateway>) -> (AgentRuntime, Arc<std::sync::atomic::AtomicUsize>) {
    let tool = DummyTool::new("lookup", ToolOutput::success("found it"));
    let calls = Arc::clone(&tool.calls);
    let runtime = AgentRuntime::builder("LookupAgent")
        .goal("Look things up.")
        .tool(tool)
        .build(&context(gateway))
        .await
        .unwrap();
    (runtime, calls)
}

#[tokio::test]
async fn test_completion_tool_short_circuits() {
    let gateway = Arc::new(ScriptedGateway::new(vec![
        lookup_call("c1"),
        complete("c2", "the answer"),
        ChatResponse::text("never requested"),
    ]));
    let (runtime, calls) = runtime_with_lookup(Arc::clone(&gateway)).await;

    let outcome = runtime
        .run("find it", &CancellationToken::new())
        .await
        .unwrap();

    assert_eq!(outcome.final_text, "the answer");
    assert_eq!(gateway.request_count(), 2);
    assert_eq!(calls.load(Ordering::SeqCst), 1);

    let metadata = &outcome.metadata;
    assert_eq!(metadata.termination, Some(TerminationReason::CompletionTool));
    assert_eq!(metadata.turns, 2);
    let kinds: Vec<_> = metadata.steps().iter().map(|s| s.kind).collect();
    assert_eq!(
        kinds,
        vec![
            StepKind::ToolCall,
            StepKind::ToolResult,
            StepKind::ToolCall,
            StepKind::ToolResult
        ]
    );
    assert_eq!(metadata.find_tool_result("lookup"), Some("found it"));
    assert_eq!(metadata.find_tool_result(COMPLETION_TOOL_NAME), Some("the answer"));
}

#[tokio::test]
async fn test_tool_results_flow_back_into_history() {
    let gateway = Arc::new(ScriptedGateway::new(vec![
        lookup_call("c1"),
        complete("c2", "done"),
    ]));
    let (runtime, _) = runtime_with_lookup(Arc::clone(&gateway)).await;
    runtime.run("go", &CancellationToken::new()).await.unwrap();

    let requests = gateway.requests();
    assert_eq!(requests[0].system, "Look things up.");
    assert_eq!(requests[0].messages.len(), 1);

    let second = &requests[1].messages;
    assert_eq!(second.len(), 3);
    assert_eq!(second[1].role, Role::Assistant);
    assert!(second[1].has_tool_calls());
    assert_eq!(second[2].role, Role::Tool);
    assert_eq!(second[2].tool_call_id.as_deref(), Some("c1"));
    assert_eq!(second[2].content, "found it");
}

#[tokio::test]
async fn test_two_quiet_turns_end_the_run() {
    let gateway = Arc::new(ScriptedGateway::new(vec![
        ChatResponse::text("thinking"),
        ChatResponse::text("final words"),
        ChatResponse::text("never requested"),
    ]));
    let (runtime, _) = runtime_with_lookup(Arc::clone(&gateway)).await;

    let outcome = runtime.run("hi", &CancellationToken::new()).await.unwrap();

    assert_eq!(outcome.final_text, "final words");
    assert_eq!(gateway.request_count(), 2);
    assert_eq!(outcome.metadata.termination, Some(TerminationReason::QuietTurns));
    assert_eq!(outcome.metadata.first_llm_response(), Some("thinking"));
}

#[tokio::test]
async fn test_tool_turn_resets_quiet_counter() {
    let gateway = Arc::new(ScriptedGateway::new(vec![
        ChatResponse::text("first"),
        lookup_call("c1"),
        ChatResponse::text("second"),
        ChatResponse::text("third"),
    ]));
    let (runtime, _) = runtime_with_lookup(Arc::clone(&gateway)).await;

    let outcome = runtime.run("hi", &CancellationToken::new()).await.unwrap();

    assert_eq!(gateway.request_count(), 4);
    assert_eq!(outcome.final_text, "third");
}

#[tokio::test]
async fn test_turn_budget_bounds_requests() {
    let gateway = Arc::new(ScriptedGateway::repeating(lookup_call("loop")));
    let tool = DummyTool::new("lookup", ToolOutput::success("again"));
    let runtime = AgentRuntime::builder("Looper")
        .goal("Loop forever.")
        .tool(tool)
        .max_turns(3)
        .build(&context(Arc::clone(&gateway)))
        .await
        .unwrap();

    let outcome = runtime.run("go", &CancellationToken::new()).await.unwrap();

    assert_eq!(gateway.request_count(), 3);
    assert_eq!(outcome.final_text, "");
    assert_eq!(outcome.metadata.turns, 3);
    assert_eq!(outcome.metadata.termination, Some(TerminationReason::TurnBudget));
}

#[tokio::test]
async fn test_default_turn_budget_is_ten() {
    let gateway = Arc::new(ScriptedGateway::repeating(lookup_call("loop")));
    let (runtime, calls) = runtime_with_lookup(Arc::clone(&gateway)).await;

    runtime.run("go", &CancellationToken::new()).await.unwrap();

    assert_eq!(runtime.max_turns(), 10);
    assert_eq!(gateway.request_count(), 10);
    assert_eq!(calls.load(Ordering::SeqCst), 10);
}

#[tokio::test]
async fn test_unknown_tool_is_reported_to_model() {
    let gateway = Arc::new(ScriptedGateway::new(vec![
        ChatResponse::tool_calls(vec![call("c1", "teleport", serde_json::json!({}))]),
        complete("c2", "ok"),
    ]));
    let (runtime, _) = runtime_with_lookup(Arc::clone(&gateway)).await;

    let outcome = runtime.run("go", &CancellationToken::new()).await.unwrap();

    assert_eq!(
        outcome.metadata.find_tool_result("teleport"),
        Some("Error: Tool 'teleport' not found")
    );
    assert_eq!(outcome.final_text, "ok");
}

#[tokio::test]
async fn test_tool_errors_and_panics_become_text() {
    let gateway = Arc::new(ScriptedGateway::new(vec![
        ChatResponse::tool_calls(vec![
            call("c1", "broken", serde_json::json!({})),
            call("c2", "explode", serde_json::json!({})),
        ]),
        complete("c3", "recovered"),
    ]));
    let runtime = AgentRuntime::builder("Fragile")
        .goal("Try tools.")
        .tool(DummyTool::new("broken", ToolOutput::error("disk full")))
        .tool(FailingTool)
        .build(&context(Arc::clone(&gateway)))
        .await
        .unwrap();

    let outcome = runtime.run("go", &CancellationToken::new()).await.unwrap();

    assert_eq!(
        outcome.metadata.find_tool_result("broken"),
        Some("Error executing tool: disk full")
    );
    assert_eq!(
        outcome.metadata.find_tool_result("explode"),
        Some("Error executing tool: kaboom")
    );
    assert_eq!(outcome.final_text, "recovered");
}

#[tokio::test]
async fn test_gateway_failure_is_wrapped() {
    let gateway = Arc::new(ScriptedGateway::failing(503));
    let (runtime, _) = runtime_with_lookup(gateway).await;

    let err = runtime
        .run("go", &CancellationToken::new())
        .await
        .unwrap_err();

    assert!(matches!(err, Error::Gateway { ref agent, .. } if agent == "LookupAgent"));
    assert!(err.to_string().starts_with("Error communicating with API"));
    assert_eq!(err.status_code(), Some(503));
}

#[tokio::test]
async fn test_cancelled_before_first_turn() {
    let gateway = Arc::new(ScriptedGateway::new(vec![ChatResponse::text("hi")]));
    let (runtime, _) = runtime_with_lookup(Arc::clone(&gateway)).await;
    let cancel = CancellationToken::new();
    cancel.cancel();

    let err = runtime.run("go", &cancel).await.unwrap_err();

    assert!(err.is_cancelled());
    assert_eq!(gateway.request_count(), 0);
}

#[tokio::test]
async fn test_builder_validation() {
    let ctx = context(Arc::new(ScriptedGateway::default()));

    let err = AgentRuntime::builder("NoGoal").build(&ctx).await.unwrap_err();
    assert!(err.is_configuration_error());

    let err = AgentRuntime::builder(" ").goal("x").build(&ctx).await.unwrap_err();
    assert!(err.is_configuration_error());

    let err = AgentRuntime::builder("Dup")
        .goal("x")
        .tool(DummyTool::new("same", ToolOutput::empty()))
        .tool(DummyTool::new("same", ToolOutput::empty()))
        .build(&ctx)
        .await
        .unwrap_err();
    assert!(err.to_string().contains("Duplicate tool name"));

    let err = AgentRuntime::builder("Reserved")
        .goal("x")
        .tool(DummyTool::new(COMPLETION_TOOL_NAME, ToolOutput::empty()))
        .build(&ctx)
        .await
        .unwrap_err();
    assert!(err.is_configuration_error());
}

#[tokio::test]
async fn test_completion_tool_always_offered() {
    let ctx = context(Arc::new(ScriptedGateway::default()));
    let runtime = AgentRuntime::builder("Bare")
        .goal("Nothing else.")
        .build(&ctx)
        .await
        .unwrap();

    assert_eq!(runtime.local_tool_names(), vec![COMPLETION_TOOL_NAME]);
    assert_eq!(runtime.offered_tools().len(), 1);
}

#[tokio::test]
async fn test_provider_tools_take_precedence() {
    let gateway = Arc::new(ScriptedGateway::new(vec![
        lookup_call("c1"),
        complete("c2", "done"),
    ]));
    let local = DummyTool::new("lookup", ToolOutput::success("local"));
    let local_calls = Arc::clone(&local.calls);
    let runtime = AgentRuntime::builder("Shadowed")
        .goal("Look up.")
        .tool(local)
        .tool_provider(Arc::new(StaticProvider::new("remote", &["lookup", "search"])))
        .build(&context(Arc::clone(&gateway)))
        .await
        .unwrap();

    let offered: Vec<_> = runtime
        .offered_tools()
        .iter()
        .map(|t| t.name.as_str())
        .collect();
    assert_eq!(offered, vec!["lookup", "search", COMPLETION_TOOL_NAME]);

    let outcome = runtime.run("go", &CancellationToken::new()).await.unwrap();
    assert_eq!(outcome.metadata.find_tool_result("lookup"), Some("reply from remote"));
    assert_eq!(local_calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_slow_provider_is_skipped_with_warning() {
    let ctx = context(Arc::new(ScriptedGateway::default()))
        .with_provider_timeout(Duration::from_millis(50));
    let runtime = AgentRuntime::builder("Patient")
        .goal("Wait.")
        .tool_provider(Arc::new(
            StaticProvider::new("sluggish", &["slow_tool"]).slow(Duration::from_secs(5)),
        ))
        .tool_provider(Arc::new(StaticProvider::new("quick", &["fast_tool"])))
        .build(&ctx)
        .await
        .unwrap();

    let warnings = runtime.provider_warnings();
    assert_eq!(warnings.len(), 1);
    assert_eq!(warnings[0].provider, "sluggish");
    assert!(warnings[0].message.contains("did not register"));

    let offered: Vec<_> = runtime
        .offered_tools()
        .iter()
        .map(|t| t.name.as_str())
        .collect();
    assert_eq!(offered, vec!["fast_tool", COMPLETION_TOOL_NAME]);
}

#[tokio::test]
async fn test_unconfigured_mcp_server_is_rejected() {
    let ctx = context(Arc::new(ScriptedGateway::default()));
    let err = AgentRuntime::builder("Missing")
        .goal("x")
        .configured_mcp_server("filesystem")
        .build(&ctx)
        .await
        .unwrap_err();
    assert!(err.to_string().contains("filesystem"));
}

#[tokio::test]
async fn test_can_handle_keywords() {
    let ctx = AgentContext::new(Arc::new(ScriptedGateway::default()));
    let runtime = AgentRuntime::builder("Reader")
        .goal("Read.")
        .keywords(["Read", "file"])
        .build(&ctx)
        .await
        .unwrap();
    assert!(runtime.can_handle("please READ this"));
    assert!(runtime.can_handle("open the FILE"));
    assert!(!runtime.can_handle("translate this"));

    let anything = AgentRuntime::builder("Generalist")
        .goal("Anything.")
        .build(&ctx)
        .await
        .unwrap();
    assert!(anything.can_handle("whatever"));
}

#[tokio::test]
async fn test_typed_execute_turns_errors_into_failed_output() {
    let agent = text_agent("Broken", Arc::new(ScriptedGateway::failing(500))).await;

    let output = agent
        .execute(TextInput::new("hello"), CancellationToken::new())
        .await;

    assert!(!output.success);
    assert!(output.content.is_empty());
    let message = output.error_message.as_deref().unwrap();
    assert!(message.starts_with("Error communicating with API"));
    assert!(output.metadata.steps().is_empty());
    assert_eq!(output.metadata.agent_name, "Broken");
    assert!(output.metadata.end_time >= output.metadata.start_time);
}

#[tokio::test]
async fn test_execute_dyn_uses_foreign_input_prompt() {
    struct Ticket(u32);
    impl super::AgentInput for Ticket {
        fn to_prompt(&self) -> String {
            format!("ticket #{}", self.0)
        }
    }

    let gateway = Arc::new(ScriptedGateway::new(vec![complete("c1", "closed")]));
    let agent = text_agent("Support", Arc::clone(&gateway)).await;

    let output = agent.execute_dyn(&Ticket(7), CancellationToken::new()).await;

    assert!(output.success());
    assert_eq!(output.content(), "closed");
    assert_eq!(gateway.requests()[0].messages[0].content, "ticket #7");
}
