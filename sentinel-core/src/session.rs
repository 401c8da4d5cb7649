//! Investigation session state
//!
//! An [`InvestigationSession`] owns the ordered step history and the terminal
//! report of one investigation. It is the sink half of the parser/sink split:
//! the parser emits [`StreamEvent`]s from text, and `apply` folds them into
//! session state. Nothing else mutates a session, and observers only ever see
//! snapshots.

use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::protocol::StreamEvent;
use crate::types::{AgentStep, InvestigationKind, Report, SessionStatus, StepStatus};

/// One end-to-end investigation: target, step history, terminal outcome.
#[derive(Debug, Clone, Serialize)]
pub struct InvestigationSession {
    /// Unique session identifier
    pub id: Uuid,
    pub kind: InvestigationKind,
    /// URL, file name, or premium scan target
    pub subject: String,
    pub started_at: DateTime<Utc>,
    pub finished_at: Option<DateTime<Utc>>,
    /// Ordered step history; steps are appended, never removed
    pub steps: Vec<AgentStep>,
    pub report: Option<Report>,
    pub status: SessionStatus,
    /// Terminal error message when `status` is `Error`
    pub error: Option<String>,
}

impl InvestigationSession {
    pub fn new(kind: InvestigationKind, subject: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            kind,
            subject: subject.into(),
            started_at: Utc::now(),
            finished_at: None,
            steps: Vec::new(),
            report: None,
            status: SessionStatus::Running,
            error: None,
        }
    }

    /// Fold one decoded stream event into the session.
    pub fn apply(&mut self, event: StreamEvent) {
        match event {
            StreamEvent::StepStarted(header) => {
                self.steps.push(AgentStep::from_header(header));
            }
            StreamEvent::StepDetail(text) => {
                if let Some(step) = self.steps.last_mut() {
                    step.details.push_str(&text);
                }
            }
            StreamEvent::StepCompleted => {
                if let Some(step) = self.steps.last_mut() {
                    step.status = StepStatus::Complete;
                }
            }
            StreamEvent::ReportReady(report) => {
                self.report = Some(report);
                self.status = SessionStatus::Complete;
                self.finished_at = Some(Utc::now());
            }
        }
    }

    /// Terminate the session with an error. The step history accumulated so
    /// far stays visible; no partial report is synthesized.
    pub fn fail(&mut self, message: impl Into<String>) {
        self.status = SessionStatus::Error;
        self.error = Some(message.into());
        self.finished_at = Some(Utc::now());
    }

    /// The currently running step, if any.
    pub fn running_step(&self) -> Option<&AgentStep> {
        self.steps
            .last()
            .filter(|s| s.status == StepStatus::Running)
    }

    pub fn is_running(&self) -> bool {
        self.status == SessionStatus::Running
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::StepHeader;

    fn header(tool: &str) -> StepHeader {
        StepHeader {
            tool: tool.to_string(),
            icon: "GlobeAltIcon".to_string(),
            thought: "thinking".to_string(),
        }
    }

    #[test]
    fn test_apply_step_lifecycle() {
        let mut session = InvestigationSession::new(InvestigationKind::Url, "https://example.com");
        assert!(session.is_running());

        session.apply(StreamEvent::StepStarted(header("WHOIS Lookup")));
        assert_eq!(session.running_step().unwrap().tool, "WHOIS Lookup");

        session.apply(StreamEvent::StepDetail("part one ".into()));
        session.apply(StreamEvent::StepDetail("part two".into()));
        session.apply(StreamEvent::StepCompleted);
        session.apply(StreamEvent::StepStarted(header("DNS Record Scan")));

        assert_eq!(session.steps.len(), 2);
        assert_eq!(session.steps[0].details, "part one part two");
        assert_eq!(session.steps[0].status, StepStatus::Complete);
        assert_eq!(session.running_step().unwrap().tool, "DNS Record Scan");
    }

    #[test]
    fn test_detail_without_open_step_is_ignored() {
        let mut session = InvestigationSession::new(InvestigationKind::Url, "https://example.com");
        session.apply(StreamEvent::StepDetail("orphan".into()));
        assert!(session.steps.is_empty());
    }

    #[test]
    fn test_fail_keeps_partial_steps() {
        let mut session = InvestigationSession::new(InvestigationKind::File, "invoice.pdf");
        session.apply(StreamEvent::StepStarted(header("Static Signature Scan")));
        session.fail("producer error: connection reset");

        assert_eq!(session.status, SessionStatus::Error);
        assert_eq!(session.steps.len(), 1);
        assert!(session.report.is_none());
        assert!(session.finished_at.is_some());
        assert_eq!(
            session.error.as_deref(),
            Some("producer error: connection reset")
        );
    }
}
