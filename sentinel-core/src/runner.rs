//! Drives one investigation: producer fragments in, session state out.
//!
//! The runner is the only place the parser and the session meet. It drains a
//! fragment channel strictly in delivery order with exactly one `consume` in
//! flight, so the parser's ordering guarantees hold by construction.
//!
//! Teardown is cooperative: dropping the receiver closes the channel, a
//! producer task's next send fails, and it stops on its own. Fragments sent
//! after teardown therefore never reach a session. The runner enforces no
//! timeout of its own; a stalled producer leaves the session `Running` and
//! timeout policy belongs to the caller.

use tokio::sync::mpsc::Receiver;

use crate::error::Result;
use crate::protocol::{StreamEvent, StreamParser};
use crate::session::InvestigationSession;

/// One item of the producer's fragment sequence.
///
/// `Ok` carries a chunk of stream text (possibly empty); `Err` is a terminal
/// producer failure. Natural completion is the channel closing.
pub type FragmentResult = Result<String>;

/// Drain `fragments` into `session` until the stream terminates.
///
/// `on_event` observes each decoded event before it is applied, which lets a
/// UI render progress live without ever touching parser-owned state.
///
/// On return the session is terminal unless the channel closed abnormally:
/// - valid report → `Complete`
/// - producer `Err` item, malformed report, or stream end without a report
///   → `Error` with the step history retained.
pub async fn run_session<F>(
    mut fragments: Receiver<FragmentResult>,
    session: &mut InvestigationSession,
    mut on_event: F,
) where
    F: FnMut(&StreamEvent),
{
    let mut parser = StreamParser::new(session.kind.into());

    while let Some(item) = fragments.recv().await {
        let fragment = match item {
            Ok(fragment) => fragment,
            Err(err) => {
                session.fail(err.to_string());
                return;
            }
        };

        let mut pending = Vec::new();
        let outcome = parser.consume(&fragment, &mut |ev| pending.push(ev));
        for event in pending {
            on_event(&event);
            session.apply(event);
        }
        if let Err(err) = outcome {
            session.fail(err.to_string());
            return;
        }
        if parser.is_complete() {
            // Report seen; stop reading. Dropping the receiver tells the
            // producer to wind down.
            return;
        }
    }

    // Channel closed without a report.
    if session.is_running() {
        if let Err(err) = parser.finish() {
            session.fail(err.to_string());
        }
    }
}
