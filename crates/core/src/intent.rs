use crate::models::{Decision, Label};

pub fn is_blank_request(input: &str) -> bool {
    input.trim().is_empty()
}

/// Maps raw classifier text onto a label. Anything that is not exactly a
/// known label after trimming lands on `unclear`.
pub fn parse_decision(raw: &str) -> Decision {
    let label = Label::parse(raw.trim()).unwrap_or(Label::Unclear);
    Decision::new(label, raw)
}
