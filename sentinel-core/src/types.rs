//! Core domain types for sentinel
//!
//! These types model one end-to-end investigation: the user-submitted target,
//! the ordered list of simulated investigative steps streamed back by the
//! model, and the terminal structured report that ends the investigation.
//!
//! ## Terminology
//!
//! | Term | Definition |
//! |------|------------|
//! | **Investigation** | One user-submitted analysis request and its streamed response |
//! | **Step** | One discrete simulated investigative action with narrative detail text |
//! | **Report** | The terminal structured verdict object ending an investigation |
//! | **Fragment** | One chunk of text delivered by the streaming producer |

use serde::{Deserialize, Serialize};

// ============================================
// Investigation kinds
// ============================================

/// The kind of investigation being run.
///
/// The kind selects the step tool vocabulary used in the prompt, the report
/// delimiter tag on the wire, and the shape of the final report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InvestigationKind {
    /// Website / URL scam investigation
    Url,
    /// Uploaded file malware investigation
    File,
    /// Premium deep-scan investigation
    Premium,
}

impl InvestigationKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            InvestigationKind::Url => "url",
            InvestigationKind::File => "file",
            InvestigationKind::Premium => "premium",
        }
    }

    /// The fixed tool vocabulary the model is told to choose step names from.
    ///
    /// The stream parser does not enforce this list; it exists for prompt
    /// construction and for display-layer validation.
    pub fn tool_names(&self) -> &'static [&'static str] {
        match self {
            InvestigationKind::Url => &[
                "WHOIS Lookup",
                "DNS Record Scan",
                "SSL Certificate Validation",
                "Technology Stack ID",
                "Corporate Background Check",
                "Malware & Phishing Scan",
                "Public Breach Check",
                "Social Media Scan",
                "Historical Archive Scan",
                "Web Search Simulation",
                "Content & Policy Scan",
                "Synthesizing Findings",
            ],
            InvestigationKind::File => &[
                "File Metadata Extraction",
                "Static Signature Scan",
                "Heuristic Code Analysis",
                "Frontend Code Review",
                "Backend Access Scan",
                "Behavioral Sandbox Simulation",
                "Dependency Vulnerability Check",
                "Evidence Extraction",
                "Synthesizing Findings",
            ],
            InvestigationKind::Premium => &[
                "Initiating Deep Scan",
                "Reputation Cross-Check",
                "Historical WHOIS Lookup",
                "IP & ASN Analysis",
                "Content & Language Analysis",
                "Synthesizing Findings",
            ],
        }
    }

    /// Icon names the model may pick from for this kind.
    pub fn icon_names(&self) -> &'static [&'static str] {
        match self {
            InvestigationKind::Url => &[
                "GlobeAltIcon",
                "ServerIcon",
                "LockClosedIcon",
                "CodeBracketIcon",
                "BuildingOfficeIcon",
                "BugAntIcon",
                "ArchiveBoxIcon",
                "UsersIcon",
                "MagnifyingGlassIcon",
                "DocumentTextIcon",
                "ShieldCheckIcon",
            ],
            InvestigationKind::File => &[
                "FingerprintIcon",
                "BugAntIcon",
                "CodeBracketIcon",
                "ServerIcon",
                "BeakerIcon",
                "ArchiveBoxIcon",
                "MagnifyingGlassIcon",
                "ShieldCheckIcon",
            ],
            InvestigationKind::Premium => &[
                "SparklesIcon",
                "ShieldCheckIcon",
                "MagnifyingGlassIcon",
                "ServerIcon",
                "CodeBracketIcon",
                "GlobeAltIcon",
            ],
        }
    }
}

impl std::fmt::Display for InvestigationKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for InvestigationKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "url" => Ok(InvestigationKind::Url),
            "file" => Ok(InvestigationKind::File),
            "premium" => Ok(InvestigationKind::Premium),
            _ => Err(format!("unknown investigation kind: {}", s)),
        }
    }
}

// ============================================
// Steps
// ============================================

/// The JSON payload embedded in a step delimiter block.
///
/// All three keys are required; a block missing any of them is treated as
/// malformed and skipped by the parser.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StepHeader {
    /// Short tool/action name, drawn from the kind's fixed vocabulary
    pub tool: String,
    /// Symbolic icon name; presentational only, not validated here
    pub icon: String,
    /// Brief user-facing sentence describing the current action
    pub thought: String,
}

/// Status of a single investigation step
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StepStatus {
    /// Most recently opened step; no later step or report has appeared
    Running,
    /// Superseded by a later step or by the final report
    Complete,
}

impl StepStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            StepStatus::Running => "running",
            StepStatus::Complete => "complete",
        }
    }
}

/// One investigative action in the ordered step history.
///
/// `details` accumulates the markdown text emitted between the end of this
/// step's delimiter block and the start of the next block.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgentStep {
    pub tool: String,
    pub icon: String,
    pub thought: String,
    pub details: String,
    pub status: StepStatus,
}

impl AgentStep {
    /// Create a freshly opened step from its parsed header.
    pub fn from_header(header: StepHeader) -> Self {
        Self {
            tool: header.tool,
            icon: header.icon,
            thought: header.thought,
            details: String::new(),
            status: StepStatus::Running,
        }
    }
}

// ============================================
// Basic report (URL / file investigations)
// ============================================

/// Terminal verdict labels for basic reports
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Recommendation {
    #[serde(rename = "Safe to Proceed")]
    Safe,
    #[serde(rename = "Use with Caution")]
    Caution,
    #[serde(rename = "Avoid this Site")]
    Avoid,
}

impl Recommendation {
    pub fn as_str(&self) -> &'static str {
        match self {
            Recommendation::Safe => "Safe to Proceed",
            Recommendation::Caution => "Use with Caution",
            Recommendation::Avoid => "Avoid this Site",
        }
    }
}

impl std::fmt::Display for Recommendation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// An extracted piece of visual evidence embedded in a file report
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EvidenceItem {
    /// What the evidence shows
    pub description: String,
    /// Full data URL, e.g. "data:image/png;base64,..."
    pub base64_image: String,
}

/// Final report for URL and file investigations.
///
/// The analysis fields are all optional because the model fills in a
/// different subset per investigation kind.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisReport {
    /// Overall safety score, 0 (dangerous) to 100 (safe)
    pub safety_score: u8,
    pub summary: String,
    pub recommendation: Recommendation,

    // URL investigation fields
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub domain_analysis: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content_analysis: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub policy_analysis: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub corporate_analysis: Option<String>,

    // File investigation fields
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub static_analysis: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub behavioral_analysis: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dependency_analysis: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub origin_analysis: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub frontend_code_analysis: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub backend_access_analysis: Option<String>,

    /// Embedded images extracted during file forensics
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub evidence: Option<Vec<EvidenceItem>>,
}

// ============================================
// Premium report
// ============================================

/// Traffic-light verdict for premium reports
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RecommendationColor {
    Green,
    Orange,
    Red,
}

impl RecommendationColor {
    pub fn as_str(&self) -> &'static str {
        match self {
            RecommendationColor::Green => "Green",
            RecommendationColor::Orange => "Orange",
            RecommendationColor::Red => "Red",
        }
    }
}

impl std::fmt::Display for RecommendationColor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One titled markdown section of a premium report
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportSection {
    pub title: String,
    pub details: String,
}

/// Final report for premium deep-scan investigations
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PremiumReport {
    /// Overall risk score, 0 (safe) to 100 (dangerous)
    pub risk_score: u8,
    pub recommendation_color: RecommendationColor,
    /// AI-generated markdown summary with the final recommendation
    pub ai_summary: String,
    pub reputation_check: ReportSection,
    pub domain_info: ReportSection,
    pub ip_info: ReportSection,
    pub content_analysis: ReportSection,
}

// ============================================
// Report envelope
// ============================================

/// The terminal structured verdict of an investigation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Report {
    Basic(AnalysisReport),
    Premium(PremiumReport),
}

impl Report {
    /// One-line summary text for display, regardless of report shape.
    pub fn summary(&self) -> &str {
        match self {
            Report::Basic(r) => &r.summary,
            Report::Premium(r) => &r.ai_summary,
        }
    }

    /// The 0-100 headline score. Basic reports score safety, premium reports
    /// score risk; callers that compare across kinds must account for that.
    pub fn score(&self) -> u8 {
        match self {
            Report::Basic(r) => r.safety_score,
            Report::Premium(r) => r.risk_score,
        }
    }
}

// ============================================
// Session status
// ============================================

/// Overall status of an investigation session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionStatus {
    /// Stream is (or may still be) producing fragments
    Running,
    /// A valid report arrived and closed the investigation
    Complete,
    /// Producer failure, malformed report, or truncated stream
    Error,
}

impl SessionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            SessionStatus::Running => "running",
            SessionStatus::Complete => "complete",
            SessionStatus::Error => "error",
        }
    }
}
