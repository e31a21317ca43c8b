use serde::Deserialize;
use serde_json::{json, Value};
use switchboard_llm::ToolSpec;
use tracing::info;

use crate::error::ToolError;

pub trait Tool: Send + Sync {
    fn name(&self) -> &str;
    fn description(&self) -> &str;
    /// JSON schema of the arguments object.
    fn parameters(&self) -> Value;
    fn call(&self, arguments: &Value) -> Result<String, ToolError>;

    fn spec(&self) -> ToolSpec {
        ToolSpec {
            name: self.name().to_string(),
            description: self.description().to_string(),
            parameters: self.parameters(),
        }
    }
}

/// Simulated factual lookup over a small fixed table.
#[derive(Debug, Clone, Copy, Default)]
pub struct SearchInformationTool;

#[derive(Debug, Deserialize)]
struct SearchArgs {
    query: String,
}

impl SearchInformationTool {
    pub fn lookup(query: &str) -> String {
        match query.to_lowercase().as_str() {
            "weather in london" => {
                "The weather in London is currently cloudy with a temperature of 15°C.".to_string()
            }
            "capital of france" => "The capital of France is Paris.".to_string(),
            "population of earth" => {
                "The estimated population of Earth is around 8 billion people.".to_string()
            }
            "tallest mountain" => "Mount Everest is the tallest mountain above sea level.".to_string(),
            _ => format!(
                "Simulated search result for '{query}': No specific information found, but the topic seems interesting."
            ),
        }
    }
}

impl Tool for SearchInformationTool {
    fn name(&self) -> &str {
        "search_information"
    }

    fn description(&self) -> &str {
        "Provides factual information on a given topic. Use this tool to find answers to questions like 'What is the capital of France?' or 'What is the weather in London?'."
    }

    fn parameters(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "query": {
                    "type": "string",
                    "description": "The topic or question to look up."
                }
            },
            "required": ["query"]
        })
    }

    fn call(&self, arguments: &Value) -> Result<String, ToolError> {
        let args = SearchArgs::deserialize(arguments)
            .map_err(|err| ToolError::InvalidArguments(err.to_string()))?;
        let result = Self::lookup(&args.query);
        info!(tool = self.name(), query = %args.query, result = %result, "tool called");
        Ok(result)
    }
}
