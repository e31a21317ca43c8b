use std::collections::HashMap;

use once_cell::sync::Lazy;
use regex::{Captures, Regex};

use crate::error::TemplateError;
use crate::models::ChatMessage;

static PLACEHOLDER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\{([A-Za-z_][A-Za-z0-9_]*)\}").expect("valid placeholder regex"));

pub const ROUTER_INSTRUCTIONS: &str = "Analyze the user's request and determine which specialist handler should process it.
- If the request is related to booking flights or hotels, output 'booking'.
- For all other general information questions, output 'info'.
- If the request is unclear or doesn't fit either category, output 'unclear'.
ONLY output one word: 'booking', 'info', or 'unclear'.";

pub const SUMMARY_INSTRUCTIONS: &str = "Summarize the following topic concisely:";
pub const QUESTIONS_INSTRUCTIONS: &str =
    "Generate three interesting questions about the following topic:";
pub const KEY_TERMS_INSTRUCTIONS: &str =
    "Identify 5-10 key terms from the following topic, separated by commas:";

pub const SYNTHESIS_INSTRUCTIONS: &str = "Based on the following information:
Summary: {summary}
Related Questions: {questions}
Key Terms: {key_terms}
Synthesize a comprehensive answer.";

pub const AGENT_INSTRUCTIONS: &str = "You are a helpful assistant.";

pub const EXTRACT_SPECIFICATIONS: &str =
    "Extract the technical specifications from the following text:\n\n{text_input}";
pub const SPECIFICATIONS_TO_JSON: &str = "Transform the following specifications into a JSON object.
Use 'CPU', 'Memory', and 'Storage' as keys.

{specifications}";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PromptTemplate {
    template: String,
    variables: Vec<String>,
}

impl PromptTemplate {
    pub fn new(template: impl Into<String>) -> Self {
        let template = template.into();
        let mut variables = Vec::new();
        for caps in PLACEHOLDER.captures_iter(&template) {
            let name = caps[1].to_string();
            if !variables.contains(&name) {
                variables.push(name);
            }
        }
        Self {
            template,
            variables,
        }
    }

    pub fn variables(&self) -> &[String] {
        &self.variables
    }

    /// Substitutes `{name}` placeholders. Substituted values are not scanned
    /// again, so braces inside user text survive untouched.
    pub fn render(&self, vars: &[(&str, &str)]) -> Result<String, TemplateError> {
        let lookup = vars.iter().copied().collect::<HashMap<_, _>>();

        if let Some(missing) = self
            .variables
            .iter()
            .find(|name| !lookup.contains_key(name.as_str()))
        {
            return Err(TemplateError::MissingVariable(missing.clone()));
        }

        let rendered = PLACEHOLDER.replace_all(&self.template, |caps: &Captures<'_>| {
            lookup.get(&caps[1]).copied().unwrap_or_default().to_string()
        });
        Ok(rendered.into_owned())
    }
}

/// A system instruction paired with a user message template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatPrompt {
    system: PromptTemplate,
    user: PromptTemplate,
}

impl ChatPrompt {
    pub fn new(system: impl Into<String>, user: impl Into<String>) -> Self {
        Self {
            system: PromptTemplate::new(system),
            user: PromptTemplate::new(user),
        }
    }

    pub fn render(&self, vars: &[(&str, &str)]) -> Result<Vec<ChatMessage>, TemplateError> {
        Ok(vec![
            ChatMessage::system(self.system.render(vars)?),
            ChatMessage::user(self.user.render(vars)?),
        ])
    }

    pub fn router() -> Self {
        Self::new(ROUTER_INSTRUCTIONS, "{request}")
    }

    pub fn summary() -> Self {
        Self::new(SUMMARY_INSTRUCTIONS, "{topic}")
    }

    pub fn questions() -> Self {
        Self::new(QUESTIONS_INSTRUCTIONS, "{topic}")
    }

    pub fn key_terms() -> Self {
        Self::new(KEY_TERMS_INSTRUCTIONS, "{topic}")
    }

    pub fn synthesis() -> Self {
        Self::new(SYNTHESIS_INSTRUCTIONS, "Original topic: {topic}")
    }

    pub fn agent() -> Self {
        Self::new(AGENT_INSTRUCTIONS, "{input}")
    }
}
