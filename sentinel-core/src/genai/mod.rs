//! Generative AI producer
//!
//! The investigation producer is a Gemini-style streaming endpoint: one POST
//! to `models/{model}:streamGenerateContent?alt=sse` answers with an SSE
//! stream whose `data:` payloads carry incremental text parts. This module
//! turns that HTTP stream into the plain fragment sequence the
//! [`runner`](crate::runner) consumes.
//!
//! The core treats the producer as opaque: everything protocol-shaped about
//! the investigation (delimiter tags, tool vocabulary, report schema) lives
//! in the prompt, and the client only relays text.

mod client;
mod prompt;
mod sse;

pub use client::{GenAiClient, InlineData, InvestigationRequest};
pub use prompt::{build_prompt, build_system_instruction};
pub use sse::SseDecoder;
