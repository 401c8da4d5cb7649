//! Streaming delimiter protocol
//!
//! The model streams an investigation as plain text carrying delimited
//! blocks:
//!
//! ```text
//! stream        := (step-block detail-text)* report-block?
//! step-block    := "§STEP_START§" json-object "§STEP_END§"
//! report-block  := "§REPORT_START§" json-object "§REPORT_END§"
//!                | "§PREMIUM_REPORT_START§" json-object "§PREMIUM_REPORT_END§"
//! ```
//!
//! Detail text between blocks is markdown narrative belonging to the step
//! whose block precedes it. Text before the first step block is
//! conversational preamble and is dropped.
//!
//! [`StreamParser`] decodes this protocol incrementally: fragments may split
//! tags and payloads at any byte, and the parser never loses or duplicates
//! content across fragment boundaries.

mod json;
mod parser;

pub use parser::{StreamEvent, StreamParser};

/// Opens a step block. Reserved; must not appear in payload text.
pub const STEP_START: &str = "§STEP_START§";
/// Closes a step block.
pub const STEP_END: &str = "§STEP_END§";

/// Which terminal report tag pair the stream uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportTag {
    /// `§REPORT_START§` / `§REPORT_END§` — URL and file investigations
    Basic,
    /// `§PREMIUM_REPORT_START§` / `§PREMIUM_REPORT_END§` — premium scans
    Premium,
}

impl ReportTag {
    pub fn start(&self) -> &'static str {
        match self {
            ReportTag::Basic => "§REPORT_START§",
            ReportTag::Premium => "§PREMIUM_REPORT_START§",
        }
    }

    pub fn end(&self) -> &'static str {
        match self {
            ReportTag::Basic => "§REPORT_END§",
            ReportTag::Premium => "§PREMIUM_REPORT_END§",
        }
    }
}

impl From<crate::types::InvestigationKind> for ReportTag {
    fn from(kind: crate::types::InvestigationKind) -> Self {
        match kind {
            crate::types::InvestigationKind::Premium => ReportTag::Premium,
            _ => ReportTag::Basic,
        }
    }
}
