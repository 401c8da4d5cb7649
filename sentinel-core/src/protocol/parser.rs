//! Incremental decoder for the investigation stream protocol.
//!
//! # Error handling
//!
//! - **Malformed step block** (no JSON object, bad JSON, missing keys):
//!   logged as a warning and skipped; the stream keeps going.
//! - **Malformed report block**: fatal. The parser fails permanently and
//!   [`StreamParser::consume`] returns [`Error::MalformedReport`].
//! - **Incomplete trailing delimiters**: never an error. The tail of the
//!   buffer simply waits for more fragments.
//!
//! # Performance
//!
//! Each `consume` call re-scans the retained buffer from the start. Consumed
//! blocks and attributed detail text are drained immediately, so the buffer
//! only ever holds one in-progress block plus unattributed trailing text;
//! the quadratic worst case over a single pathological block is accepted.

use super::json::extract_object;
use super::{ReportTag, STEP_END, STEP_START};
use crate::error::{Error, Result};
use crate::types::{AnalysisReport, PremiumReport, Report, StepHeader};

/// A decoded protocol event, in stream order.
///
/// Events are pure data: the parser never touches session state, and a sink
/// (e.g. [`crate::session::InvestigationSession::apply`]) folds them into the
/// step history.
#[derive(Debug, Clone, PartialEq)]
pub enum StreamEvent {
    /// A step block was fully assembled and parsed
    StepStarted(StepHeader),
    /// Narrative text belonging to the currently open step
    StepDetail(String),
    /// The currently open step was superseded by a later block
    StepCompleted,
    /// The terminal report arrived; no further events follow
    ReportReady(Report),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ParserState {
    /// Still expecting step blocks and/or the report
    Streaming,
    /// A valid report was emitted; all further input is ignored
    Complete,
    /// The report block was malformed; all further input is ignored
    Failed,
}

/// Incremental parser for one investigation stream.
///
/// Feed producer fragments through [`consume`](Self::consume) in delivery
/// order; events are handed to the `emit` sink as soon as their blocks are
/// fully assembled, regardless of how the text was split across fragments.
/// When the producer signals completion, call [`finish`](Self::finish) to
/// detect a truncated stream.
#[derive(Debug)]
pub struct StreamParser {
    /// Unconsumed stream text; holds at most one in-progress block
    buffer: String,
    report_tag: ReportTag,
    /// True while the most recent event was a successful step open
    step_open: bool,
    state: ParserState,
}

impl StreamParser {
    pub fn new(report_tag: ReportTag) -> Self {
        Self {
            buffer: String::new(),
            report_tag,
            step_open: false,
            state: ParserState::Streaming,
        }
    }

    /// True once a valid report has been emitted.
    pub fn is_complete(&self) -> bool {
        self.state == ParserState::Complete
    }

    /// Consume one producer fragment, emitting every event that becomes
    /// complete as a result.
    ///
    /// Events already assembled before a malformed report are still emitted;
    /// only then does the call return [`Error::MalformedReport`]. After a
    /// report (valid or not) the parser is terminal and further calls are
    /// no-ops.
    pub fn consume<F>(&mut self, fragment: &str, emit: &mut F) -> Result<()>
    where
        F: FnMut(StreamEvent),
    {
        if self.state != ParserState::Streaming {
            return Ok(());
        }
        self.buffer.push_str(fragment);

        // Drain every complete step block currently in the buffer.
        while let Some((start, end)) = find_block(&self.buffer, STEP_START, STEP_END) {
            if self.step_open {
                if start > 0 {
                    emit(StreamEvent::StepDetail(self.buffer[..start].to_string()));
                }
                emit(StreamEvent::StepCompleted);
                self.step_open = false;
            }
            // With no step open, text before the block is producer preamble
            // and is dropped.

            let body = &self.buffer[start + STEP_START.len()..end];
            match parse_step(body) {
                Ok(header) => {
                    emit(StreamEvent::StepStarted(header));
                    self.step_open = true;
                }
                Err(reason) => {
                    tracing::warn!(%reason, "skipping malformed step block");
                }
            }
            self.buffer.drain(..end + STEP_END.len());
        }

        // Then check for the terminal report block.
        let (tag_start, tag_end) = (self.report_tag.start(), self.report_tag.end());
        if let Some((start, end)) = find_block(&self.buffer, tag_start, tag_end) {
            if self.step_open {
                if start > 0 {
                    emit(StreamEvent::StepDetail(self.buffer[..start].to_string()));
                }
                emit(StreamEvent::StepCompleted);
                self.step_open = false;
            }

            let body = &self.buffer[start + tag_start.len()..end];
            let parsed = parse_report(body, self.report_tag);
            self.buffer.clear();
            match parsed {
                Ok(report) => {
                    emit(StreamEvent::ReportReady(report));
                    self.state = ParserState::Complete;
                }
                Err(reason) => {
                    self.state = ParserState::Failed;
                    return Err(Error::MalformedReport(reason));
                }
            }
        }

        Ok(())
    }

    /// Call when the producer's fragment sequence ends naturally.
    ///
    /// A stream that completes without a report block is an incomplete
    /// investigation, not a success.
    pub fn finish(&self) -> Result<()> {
        match self.state {
            ParserState::Complete => Ok(()),
            _ => Err(Error::ReportMissing),
        }
    }
}

/// Find a complete `start_tag ... end_tag` block.
///
/// Returns the byte index of the start tag and of the end tag. A start tag
/// without its end tag (or a bare partial tag) yields `None`: the block is
/// incomplete and waits for more fragments.
fn find_block(buffer: &str, start_tag: &str, end_tag: &str) -> Option<(usize, usize)> {
    let start = buffer.find(start_tag)?;
    let body_start = start + start_tag.len();
    let end = buffer[body_start..].find(end_tag)? + body_start;
    Some((start, end))
}

fn parse_step(body: &str) -> std::result::Result<StepHeader, String> {
    let json = extract_object(body).ok_or("no JSON object found in step block")?;
    serde_json::from_str(json).map_err(|e| format!("invalid step payload: {}", e))
}

fn parse_report(body: &str, tag: ReportTag) -> std::result::Result<Report, String> {
    let json = extract_object(body).ok_or("no JSON object found in report block")?;
    match tag {
        ReportTag::Basic => {
            let report: AnalysisReport =
                serde_json::from_str(json).map_err(|e| format!("invalid report payload: {}", e))?;
            if report.safety_score > 100 {
                return Err(format!("safetyScore out of range: {}", report.safety_score));
            }
            Ok(Report::Basic(report))
        }
        ReportTag::Premium => {
            let report: PremiumReport =
                serde_json::from_str(json).map_err(|e| format!("invalid report payload: {}", e))?;
            if report.risk_score > 100 {
                return Err(format!("riskScore out of range: {}", report.risk_score));
            }
            Ok(Report::Premium(report))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Recommendation;

    const STEP_WHOIS: &str = "§STEP_START§\n{\"tool\": \"WHOIS Lookup\", \"icon\": \"GlobeAltIcon\", \"thought\": \"Checking domain registration.\"}\n§STEP_END§";
    const STEP_DNS: &str = "§STEP_START§\n{\"tool\": \"DNS Record Scan\", \"icon\": \"ServerIcon\", \"thought\": \"Enumerating records.\"}\n§STEP_END§";
    const REPORT_BASIC: &str = "§REPORT_START§\n{\"safetyScore\": 35, \"summary\": \"Risky\", \"recommendation\": \"Avoid this Site\"}\n§REPORT_END§";

    fn feed(parser: &mut StreamParser, fragment: &str) -> Vec<StreamEvent> {
        let mut events = Vec::new();
        parser
            .consume(fragment, &mut |ev| events.push(ev))
            .expect("consume should succeed");
        events
    }

    fn feed_all(tag: ReportTag, fragments: &[&str]) -> Vec<StreamEvent> {
        let mut parser = StreamParser::new(tag);
        let mut events = Vec::new();
        for fragment in fragments {
            parser
                .consume(fragment, &mut |ev| events.push(ev))
                .expect("consume should succeed");
        }
        events
    }

    fn step_tool(ev: &StreamEvent) -> Option<&str> {
        match ev {
            StreamEvent::StepStarted(h) => Some(&h.tool),
            _ => None,
        }
    }

    #[test]
    fn test_single_step_then_report() {
        // The two-fragment scenario with a tag split mid-way.
        let events = feed_all(
            ReportTag::Basic,
            &[
                "§STEP_",
                "START§{\"tool\":\"WHOIS Lookup\",\"icon\":\"GlobeAltIcon\",\"thought\":\"Checking...\"}§STEP_END§Found registrar info.\n",
                "§REPORT_START§{\"safetyScore\":35,\"summary\":\"Risky\",\"recommendation\":\"Avoid this Site\"}§REPORT_END§",
            ],
        );

        assert_eq!(events.len(), 4);
        assert_eq!(step_tool(&events[0]), Some("WHOIS Lookup"));
        assert_eq!(
            events[1],
            StreamEvent::StepDetail("Found registrar info.\n".to_string())
        );
        assert_eq!(events[2], StreamEvent::StepCompleted);
        match &events[3] {
            StreamEvent::ReportReady(Report::Basic(r)) => {
                assert_eq!(r.safety_score, 35);
                assert_eq!(r.recommendation, Recommendation::Avoid);
            }
            other => panic!("expected report, got {:?}", other),
        }
    }

    #[test]
    fn test_fragmentation_is_invisible() {
        // Any split of the stream yields the same events as one big fragment.
        let stream = format!(
            "Let me investigate.\n{}Registrar found.\n{}* No anomalies.\n{}",
            STEP_WHOIS, STEP_DNS, REPORT_BASIC
        );

        let whole = feed_all(ReportTag::Basic, &[&stream]);

        // Single-character fragments, the most hostile split.
        let chars: Vec<String> = stream.chars().map(|c| c.to_string()).collect();
        let char_refs: Vec<&str> = chars.iter().map(|s| s.as_str()).collect();
        let tiny = feed_all(ReportTag::Basic, &char_refs);
        assert_eq!(whole, tiny);

        // A mid-sized split.
        let mid: Vec<&str> = vec![&stream[..17], &stream[17..90], &stream[90..]];
        assert_eq!(whole, feed_all(ReportTag::Basic, &mid));
    }

    #[test]
    fn test_details_attributed_to_preceding_step() {
        let stream = format!("{}alpha beta\n{}gamma{}", STEP_WHOIS, STEP_DNS, REPORT_BASIC);
        let events = feed_all(ReportTag::Basic, &[&stream]);

        assert_eq!(events.len(), 7);
        assert_eq!(step_tool(&events[0]), Some("WHOIS Lookup"));
        assert_eq!(events[1], StreamEvent::StepDetail("alpha beta\n".into()));
        assert_eq!(events[2], StreamEvent::StepCompleted);
        assert_eq!(step_tool(&events[3]), Some("DNS Record Scan"));
        assert_eq!(events[4], StreamEvent::StepDetail("gamma".into()));
        assert_eq!(events[5], StreamEvent::StepCompleted);
        assert!(matches!(events[6], StreamEvent::ReportReady(_)));
    }

    #[test]
    fn test_details_accumulate_across_fragments() {
        let mut parser = StreamParser::new(ReportTag::Basic);
        feed(&mut parser, STEP_WHOIS);
        // Detail text is held until the next block proves where it ends.
        assert!(feed(&mut parser, "first ").is_empty());
        assert!(feed(&mut parser, "second ").is_empty());
        let events = feed(&mut parser, &format!("third{}", STEP_DNS));
        assert_eq!(
            events[0],
            StreamEvent::StepDetail("first second third".into())
        );
        assert_eq!(events[1], StreamEvent::StepCompleted);
    }

    #[test]
    fn test_preamble_before_first_step_is_dropped() {
        let stream = format!("Certainly! Starting the investigation now.\n{}", STEP_WHOIS);
        let events = feed_all(ReportTag::Basic, &[&stream]);
        assert_eq!(events.len(), 1);
        assert_eq!(step_tool(&events[0]), Some("WHOIS Lookup"));
    }

    #[test]
    fn test_empty_details_between_adjacent_steps() {
        let stream = format!("{}{}", STEP_WHOIS, STEP_DNS);
        let events = feed_all(ReportTag::Basic, &[&stream]);
        assert_eq!(
            events,
            vec![
                StreamEvent::StepStarted(StepHeader {
                    tool: "WHOIS Lookup".into(),
                    icon: "GlobeAltIcon".into(),
                    thought: "Checking domain registration.".into(),
                }),
                StreamEvent::StepCompleted,
                StreamEvent::StepStarted(StepHeader {
                    tool: "DNS Record Scan".into(),
                    icon: "ServerIcon".into(),
                    thought: "Enumerating records.".into(),
                }),
            ]
        );
    }

    #[test]
    fn test_malformed_step_is_skipped() {
        let bad = "§STEP_START§{\"tool\": \"Broken\", not json}§STEP_END§";
        let stream = format!("{}details one\n{}{}", STEP_WHOIS, bad, STEP_DNS);
        let events = feed_all(ReportTag::Basic, &[&stream]);

        // Previous step still gets its details and completes; the malformed
        // block produces no StepStarted; parsing resumes on the next block.
        assert_eq!(
            events
                .iter()
                .filter_map(step_tool)
                .collect::<Vec<_>>(),
            vec!["WHOIS Lookup", "DNS Record Scan"]
        );
        assert_eq!(
            events[1],
            StreamEvent::StepDetail("details one\n".into())
        );
        assert_eq!(events[2], StreamEvent::StepCompleted);
    }

    #[test]
    fn test_step_missing_required_key_is_skipped() {
        let bad = "§STEP_START§{\"tool\": \"WHOIS Lookup\"}§STEP_END§";
        let events = feed_all(ReportTag::Basic, &[bad, STEP_DNS]);
        assert_eq!(
            events.iter().filter_map(step_tool).collect::<Vec<_>>(),
            vec!["DNS Record Scan"]
        );
    }

    #[test]
    fn test_braces_inside_payload_strings() {
        let step = "§STEP_START§{\"tool\": \"Heuristic Code Analysis\", \"icon\": \"CodeBracketIcon\", \"thought\": \"Found eval({}) and a stray } in source\"}§STEP_END§";
        let report = "§REPORT_START§{\"safetyScore\": 10, \"summary\": \"Contains `obj = {a: {b: 1}}` patterns\", \"recommendation\": \"Avoid this Site\"}§REPORT_END§";
        let events = feed_all(ReportTag::Basic, &[step, report]);

        match &events[0] {
            StreamEvent::StepStarted(h) => {
                assert_eq!(h.thought, "Found eval({}) and a stray } in source");
            }
            other => panic!("expected step, got {:?}", other),
        }
        match events.last().unwrap() {
            StreamEvent::ReportReady(Report::Basic(r)) => {
                assert_eq!(r.summary, "Contains `obj = {a: {b: 1}}` patterns");
            }
            other => panic!("expected report, got {:?}", other),
        }
    }

    #[test]
    fn test_fragments_after_report_are_ignored() {
        let mut parser = StreamParser::new(ReportTag::Basic);
        let events = feed(&mut parser, &format!("{}{}", STEP_WHOIS, REPORT_BASIC));
        assert!(matches!(
            events.last(),
            Some(StreamEvent::ReportReady(_))
        ));
        assert!(parser.is_complete());

        assert!(feed(&mut parser, "trailing chatter").is_empty());
        assert!(feed(&mut parser, STEP_DNS).is_empty());
        assert!(parser.finish().is_ok());
    }

    #[test]
    fn test_partial_trailing_tag_waits() {
        let mut parser = StreamParser::new(ReportTag::Basic);
        feed(&mut parser, STEP_WHOIS);
        assert!(feed(&mut parser, "details §STEP_ST").is_empty());
        // Not an error, just incomplete. The rest of the tag resolves it.
        let events = feed(
            &mut parser,
            "ART§{\"tool\": \"DNS Record Scan\", \"icon\": \"ServerIcon\", \"thought\": \"Enumerating records.\"}§STEP_END§",
        );
        assert_eq!(events[0], StreamEvent::StepDetail("details ".into()));
        assert_eq!(events[1], StreamEvent::StepCompleted);
        assert_eq!(step_tool(&events[2]), Some("DNS Record Scan"));
    }

    #[test]
    fn test_malformed_report_is_fatal() {
        let mut parser = StreamParser::new(ReportTag::Basic);
        feed(&mut parser, STEP_WHOIS);

        let mut events = Vec::new();
        let err = parser
            .consume(
                "closing details§REPORT_START§{\"safetyScore\": \"not a number\"}§REPORT_END§",
                &mut |ev| events.push(ev),
            )
            .unwrap_err();
        assert!(matches!(err, Error::MalformedReport(_)));

        // Events assembled before the failure were still emitted: the open
        // step received its trailing details and was closed.
        assert_eq!(
            events,
            vec![
                StreamEvent::StepDetail("closing details".into()),
                StreamEvent::StepCompleted,
            ]
        );

        // Parser is terminal now.
        assert!(feed(&mut parser, REPORT_BASIC).is_empty());
        assert!(parser.finish().is_err());
    }

    #[test]
    fn test_report_score_out_of_range_is_malformed() {
        let mut parser = StreamParser::new(ReportTag::Basic);
        let err = parser
            .consume(
                "§REPORT_START§{\"safetyScore\": 150, \"summary\": \"x\", \"recommendation\": \"Safe to Proceed\"}§REPORT_END§",
                &mut |_| {},
            )
            .unwrap_err();
        assert!(matches!(err, Error::MalformedReport(_)));
    }

    #[test]
    fn test_stream_without_report_is_incomplete() {
        let mut parser = StreamParser::new(ReportTag::Basic);
        feed(&mut parser, STEP_WHOIS);
        feed(&mut parser, "some findings");
        assert!(matches!(parser.finish(), Err(Error::ReportMissing)));
    }

    #[test]
    fn test_premium_report_tags() {
        let report = "§PREMIUM_REPORT_START§{\
            \"riskScore\": 82, \"recommendationColor\": \"Red\", \"aiSummary\": \"Do not use.\",\
            \"reputationCheck\": {\"title\": \"Reputation\", \"details\": \"3 reports\"},\
            \"domainInfo\": {\"title\": \"Domain\", \"details\": \"12 days old\"},\
            \"ipInfo\": {\"title\": \"IP\", \"details\": \"High-risk ASN\"},\
            \"contentAnalysis\": {\"title\": \"Content\", \"details\": \"Urgency language\"}\
            }§PREMIUM_REPORT_END§";
        let stream = format!(
            "§STEP_START§{{\"tool\": \"Reputation Cross-Check\", \"icon\": \"ShieldCheckIcon\", \"thought\": \"Cross-referencing databases.\"}}§STEP_END§findings\n{}",
            report
        );
        let events = feed_all(ReportTag::Premium, &[&stream]);
        match events.last().unwrap() {
            StreamEvent::ReportReady(Report::Premium(r)) => {
                assert_eq!(r.risk_score, 82);
                assert_eq!(r.reputation_check.details, "3 reports");
            }
            other => panic!("expected premium report, got {:?}", other),
        }

        // A basic parser never matches premium tags.
        let basic_events = feed_all(ReportTag::Basic, &[report]);
        assert!(basic_events.is_empty());
    }

    #[test]
    fn test_report_split_across_many_fragments() {
        let stream = format!("{}details\n{}", STEP_WHOIS, REPORT_BASIC);
        let mut parser = StreamParser::new(ReportTag::Basic);
        let mut events = Vec::new();
        // Chunk on char boundaries; the § tags are multi-byte.
        let chars: Vec<char> = stream.chars().collect();
        for piece in chars.chunks(7) {
            let piece: String = piece.iter().collect();
            parser
                .consume(&piece, &mut |ev| events.push(ev))
                .expect("consume should succeed");
        }
        assert!(matches!(events.last(), Some(StreamEvent::ReportReady(_))));
        assert!(parser.finish().is_ok());
    }
}
