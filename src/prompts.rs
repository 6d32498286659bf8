//! System instructions sent to the completion service.
//!
//! The caller's instruction is used verbatim as the system message; the
//! constant here is used only when the caller supplies none (or an empty one).

/// Instruction used when the caller does not supply one.
pub const DEFAULT_INSTRUCTION: &str = "Summarize the content.";

/// Pick the caller-supplied instruction if present and non-empty, else the default.
pub fn resolve_instruction(instruction: Option<&str>) -> &str {
    match instruction {
        Some(s) if !s.is_empty() => s,
        _ => DEFAULT_INSTRUCTION,
    }
}
