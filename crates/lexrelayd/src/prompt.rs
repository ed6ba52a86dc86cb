//! Prompt assembly.
//!
//! Builds the final upstream prompt from persona, prior-turn context, the
//! user's query, and extracted document text. Assembly is deterministic;
//! every request gets a freshly built prompt.

use crate::personas::{self, Tool, REASONING_OVERLAY};
use lexrelay_common::AskRequest;

/// Marker preceding the live query when no context is supplied.
pub const QUESTION_MARKER: &str = "User question:";

/// Marker preceding the live query when prior context is supplied.
pub const FOLLOWUP_MARKER: &str = "User follow-up:";

/// Delimiters around extracted document text, so the model can tell
/// attachment content apart from the live query.
pub const DOCUMENTS_OPEN: &str = "--- UPLOADED DOCUMENTS ---";
pub const DOCUMENTS_CLOSE: &str = "--- END DOCUMENTS ---";

/// Closing directive appended to every persona-mode prompt.
const INSTRUCTION_SUFFIX: &str = "Answer the question directly. Do not restate these \
instructions or describe your role in the reply.";

/// Build the upstream prompt for a request.
///
/// The caller guarantees a non-empty query; the request handler rejects
/// blank input before assembly. Mode priority: optimizer, then followup,
/// then the general persona template. The reasoning overlay, when enabled,
/// precedes the persona text. Context precedes the document block.
pub fn assemble(req: &AskRequest, extracted_text: Option<&str>) -> String {
    match Tool::parse(req.tool.as_deref()) {
        // Meta-prompt: ask the model to rewrite the query. Persona,
        // context, and reasoning are ignored in this mode.
        Tool::Optimizer => {
            format!(
                "You are a prompt engineer. Rewrite the following user query into a clearer, \
more specific, and well-structured legal question. Preserve the user's intent and every fact \
they mention. Return only the rewritten query, without commentary.\n\nOriginal query: {}",
                req.prompt.trim()
            )
        }
        // Raw passthrough: the query is the entire prompt, byte for byte.
        Tool::Followup => req.prompt.clone(),
        tool => assemble_general(tool, req, extracted_text),
    }
}

fn assemble_general(tool: Tool, req: &AskRequest, extracted_text: Option<&str>) -> String {
    let query = req.prompt.trim();

    let persona_text = personas::persona_for(tool);
    let persona = if req.reasoning {
        format!("{}\n\n{}", REASONING_OVERLAY, persona_text)
    } else {
        persona_text.to_string()
    };

    let context = req
        .context
        .as_deref()
        .map(str::trim)
        .filter(|c| !c.is_empty());

    // The document block sits directly between the query marker and the
    // query itself. Built at the marker's position, never located by
    // searching the prompt text (the query or context may contain the
    // marker strings themselves).
    let documents = match extracted_text.map(str::trim).filter(|t| !t.is_empty()) {
        Some(text) => format!("\n{DOCUMENTS_OPEN}\n{text}\n{DOCUMENTS_CLOSE}\n"),
        None => String::new(),
    };

    match context {
        Some(context) => format!(
            "{persona}\n\nPrevious context: {context}\n{FOLLOWUP_MARKER}{documents} {query}\n\n{INSTRUCTION_SUFFIX}"
        ),
        None => format!(
            "{persona}\n\n{QUESTION_MARKER}{documents} {query}\n\n{INSTRUCTION_SUFFIX}"
        ),
    }
}
