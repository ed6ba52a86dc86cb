//! Persona registry: a fixed, read-only table mapping tool identifiers to
//! instruction text.
//!
//! The table is constant for the life of the process; concurrent readers
//! need no synchronization. Unknown or absent tool identifiers resolve to
//! the default (case summary) persona instead of failing.

/// Named persona selector sent by the browser client.
///
/// `Optimizer` and `Followup` are not personas: they bypass the registry
/// and are handled by the prompt assembler as distinct modes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tool {
    CaseSummary,
    LegalDefinitions,
    DraftPetition,
    CaseLaw,
    Optimizer,
    Followup,
}

impl Tool {
    /// Resolve a raw tool string. Anything unrecognized falls back to the
    /// default persona rather than erroring.
    pub fn parse(raw: Option<&str>) -> Self {
        match raw.map(str::trim) {
            Some("aiCaseSummary") => Tool::CaseSummary,
            Some("legalDefinitions") => Tool::LegalDefinitions,
            Some("draftPetition") => Tool::DraftPetition,
            Some("caseLaw") => Tool::CaseLaw,
            Some("optimizer") => Tool::Optimizer,
            Some("followup") => Tool::Followup,
            _ => Tool::CaseSummary,
        }
    }
}

/// Default persona: case summarization for lay readers.
pub const CASE_SUMMARY_PERSONA: &str = "You are an experienced legal assistant specializing in \
case analysis. Summarize legal cases, orders, and judgments in plain language that a person \
without legal training can follow. Identify the parties, the dispute, the key issues, the \
holding, and the practical consequences. Flag any deadlines or obligations the documents \
mention. Do not give advice on how to act; describe what the material says.";

pub const LEGAL_DEFINITIONS_PERSONA: &str = "You are a legal dictionary assistant. Explain \
legal terms, doctrines, and procedural concepts precisely but in plain language. Give the \
definition first, then a short illustration of how the concept is used in practice, and note \
common points of confusion with related terms. If a term has different meanings in different \
jurisdictions, say so briefly.";

pub const DRAFT_PETITION_PERSONA: &str = "You are a legal drafting assistant. Draft petitions, \
applications, and notices in conventional legal structure: caption, parties, jurisdiction, \
facts in numbered paragraphs, grounds, and prayer for relief. Use formal register and leave \
clearly marked placeholders like [PARTY NAME] or [DATE] wherever the user has not supplied a \
fact. Remind the user at the end that a qualified lawyer must review the draft before filing.";

pub const CASE_LAW_PERSONA: &str = "You are a legal research assistant. When asked about case \
law, describe the leading authorities on the point, what each held, and how later decisions \
have treated them. Be explicit about the jurisdiction each authority belongs to, and clearly \
separate settled positions from areas where courts disagree. Never invent citations; if you \
are not confident a case exists, say so instead of naming one.";

/// Additive overlay requesting deeper analytical style. Never replaces the
/// tool persona; the assembler prepends it when reasoning is enabled.
pub const REASONING_OVERLAY: &str = "Reason through the question step by step before \
answering: lay out the relevant rules, apply them to the facts given, consider \
counterarguments, and only then state your conclusion. Keep the final answer clearly \
separated from the reasoning.";

/// Look up the persona text for a tool.
///
/// `Optimizer` and `Followup` never reach this function in normal flow;
/// they resolve to the default persona so the lookup stays total.
pub fn persona_for(tool: Tool) -> &'static str {
    match tool {
        Tool::CaseSummary => CASE_SUMMARY_PERSONA,
        Tool::LegalDefinitions => LEGAL_DEFINITIONS_PERSONA,
        Tool::DraftPetition => DRAFT_PETITION_PERSONA,
        Tool::CaseLaw => CASE_LAW_PERSONA,
        Tool::Optimizer | Tool::Followup => CASE_SUMMARY_PERSONA,
    }
}
