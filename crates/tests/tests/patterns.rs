use std::sync::Arc;

use futures::future::join_all;
use serde_json::{json, Value};
use switchboard_agents::{ParallelSynthesizer, PatternError, PromptChain, SearchInformationTool, ToolAgent};
use switchboard_llm::{LlmClient, LlmConfig, Provider};
use switchboard_observability::PatternMetrics;
use switchboard_tests::{
    gemini_function_call, gemini_system_text, gemini_text, gemini_tool_outputs, gemini_user_text,
    openai_function_call, openai_message_text, openai_text, openai_tool_outputs, MockLlmServer,
};

fn openai_client(server: &MockLlmServer) -> Arc<LlmClient> {
    let config = LlmConfig::new(Provider::OpenAi)
        .with_api_key("sk-test")
        .with_base_url(server.openai_base_url());
    Arc::new(LlmClient::from_config(&config).unwrap())
}

fn gemini_client(server: &MockLlmServer) -> Arc<LlmClient> {
    let config = LlmConfig::new(Provider::Gemini)
        .with_api_key("test-key")
        .with_base_url(server.gemini_base_url());
    Arc::new(LlmClient::from_config(&config).unwrap())
}

#[tokio::test]
async fn parallel_synthesis_over_openai() {
    let server = MockLlmServer::start(|body: &Value| {
        let system = openai_message_text(body, "system");
        if system.starts_with("Summarize") {
            openai_text("Humans left Earth orbit in 1961.")
        } else if system.starts_with("Generate three") {
            openai_text("1. Who? 2. When? 3. Why?")
        } else if system.starts_with("Identify") {
            openai_text("Sputnik, Apollo, ISS")
        } else {
            openai_text("A synthesized overview.")
        }
    })
    .await;
    let metrics = PatternMetrics::shared();

    let report = ParallelSynthesizer::new(openai_client(&server), metrics.clone())
        .run("The history of space exploration")
        .await
        .unwrap();

    assert_eq!(report.answer, "A synthesized overview.");
    assert_eq!(report.key_terms, "Sputnik, Apollo, ISS");

    let requests = server.requests();
    assert_eq!(requests.len(), 4);
    let synthesis = requests
        .iter()
        .find(|body| openai_message_text(body, "user").starts_with("Original topic:"))
        .expect("synthesis request should be sent");
    let system = openai_message_text(synthesis, "system");
    assert!(system.contains("Summary: Humans left Earth orbit in 1961."));
    assert!(system.contains("Key Terms: Sputnik, Apollo, ISS"));
    assert_eq!(metrics.snapshot().model_calls_total, 4);
}

fn openai_agent_responder(body: &Value) -> switchboard_tests::Reply {
    let outputs = openai_tool_outputs(body);
    if let Some(observation) = outputs.last() {
        return openai_text(&format!("Based on the search: {observation}"));
    }
    let user = openai_message_text(body, "user").to_lowercase();
    let query = if user.contains("france") {
        "capital of france"
    } else if user.contains("london") {
        "weather in london"
    } else {
        "dogs"
    };
    openai_function_call("call_1", "search_information", json!({ "query": query }))
}

#[tokio::test]
async fn tool_agent_over_openai_feeds_observation_back() {
    let server = MockLlmServer::start(openai_agent_responder).await;

    let run = ToolAgent::new(openai_client(&server), PatternMetrics::shared())
        .with_tool(SearchInformationTool)
        .run("What is the capital of France?")
        .await
        .unwrap();

    assert_eq!(
        run.output,
        "Based on the search: The capital of France is Paris."
    );
    assert_eq!(run.steps.len(), 1);
    assert_eq!(run.steps[0].arguments["query"], "capital of france");

    let requests = server.requests();
    assert_eq!(requests.len(), 2);
    assert_eq!(requests[0]["tools"][0]["name"], "search_information");
    assert_eq!(requests[1]["input"][2]["type"], "function_call");
    assert_eq!(requests[1]["input"][2]["call_id"], "call_1");
}

#[tokio::test]
async fn agent_queries_run_concurrently() {
    let server = MockLlmServer::start(openai_agent_responder).await;
    let metrics = PatternMetrics::shared();
    let agent = ToolAgent::new(openai_client(&server), metrics.clone()).with_tool(SearchInformationTool);

    let queries = [
        "What is the capital of France?",
        "What's the weather like in London?",
        "Tell me something about dogs.",
    ];
    let runs = join_all(queries.iter().map(|query| agent.run(query))).await;

    let outputs = runs
        .into_iter()
        .map(|run| run.unwrap().output)
        .collect::<Vec<_>>();
    assert!(outputs[0].contains("Paris"));
    assert!(outputs[1].contains("cloudy"));
    assert!(outputs[2].contains("No specific information found"));
    assert_eq!(metrics.snapshot().tool_calls_total, 3);
    assert_eq!(server.requests().len(), 6);
}

#[tokio::test]
async fn tool_agent_over_gemini() {
    let server = MockLlmServer::start(|body: &Value| {
        match gemini_tool_outputs(body).last() {
            Some(observation) => gemini_text(observation),
            None => gemini_function_call("search_information", json!({ "query": "tallest mountain" })),
        }
    })
    .await;

    let run = ToolAgent::new(gemini_client(&server), PatternMetrics::shared())
        .with_tool(SearchInformationTool)
        .run("Which mountain is the tallest?")
        .await
        .unwrap();

    assert_eq!(run.output, "Mount Everest is the tallest mountain above sea level.");
    let requests = server.requests();
    assert_eq!(gemini_system_text(&requests[0]), "You are a helpful assistant.");
    assert_eq!(
        requests[0]["tools"][0]["functionDeclarations"][0]["name"],
        "search_information"
    );
}

#[tokio::test]
async fn agent_stops_at_iteration_limit() {
    let server = MockLlmServer::start(|_: &Value| {
        openai_function_call("loop", "search_information", json!({ "query": "population of earth" }))
    })
    .await;

    let err = ToolAgent::new(openai_client(&server), PatternMetrics::shared())
        .with_tool(SearchInformationTool)
        .with_max_iterations(2)
        .run("How many people live on Earth?")
        .await
        .unwrap_err();

    assert!(matches!(err, PatternError::IterationLimit(2)));
    assert_eq!(server.requests().len(), 2);
}

#[tokio::test]
async fn prompt_chain_over_gemini() {
    let server = MockLlmServer::start(|body: &Value| {
        let user = gemini_user_text(body);
        if user.starts_with("Extract") {
            gemini_text("CPU: 3.5 GHz octa-core; RAM: 16GB; SSD: 1TB NVMe")
        } else {
            gemini_text(r#"{"CPU":"3.5 GHz octa-core","Memory":"16GB","Storage":"1TB NVMe"}"#)
        }
    })
    .await;

    let output = PromptChain::new(gemini_client(&server), PatternMetrics::shared())
        .run("The new laptop model features a 3.5 GHz octa-core processor, 16GB of RAM, and a 1TB NVMe SSD.")
        .await
        .unwrap();

    let parsed: Value = serde_json::from_str(&output.json).unwrap();
    assert_eq!(parsed["Storage"], "1TB NVMe");

    let requests = server.requests();
    assert_eq!(requests.len(), 2);
    assert!(gemini_user_text(&requests[1]).contains("CPU: 3.5 GHz octa-core; RAM: 16GB"));
}
