//! Prompt construction for investigation streams.
//!
//! The prompt is where the wire protocol is specified to the model: the
//! delimiter tags, the per-kind tool vocabulary, and the report schema. The
//! builders reproduce the original Sentinel service instructions; they are
//! fixtures, not a tuning surface.

use crate::protocol::{ReportTag, STEP_END, STEP_START};
use crate::types::InvestigationKind;

use super::client::InvestigationRequest;

const SIMPLE_LANGUAGE_INSTRUCTION: &str = "\nIMPORTANT: You MUST explain everything in very simple, non-technical terms, as if talking to a complete beginner. Use simple analogies and avoid all technical jargon.";

/// System instruction establishing the investigator persona.
pub fn build_system_instruction(kind: InvestigationKind, simple_language: bool) -> String {
    let persona = match kind {
        InvestigationKind::Url => {
            "You are \"Sentinel,\" a world-class cybersecurity analysis AI agent. Your purpose is to conduct deep, exhaustive investigations of website URLs to protect users from scams, fraud, and malicious activities. You operate within a chat interface and must communicate your actions and findings clearly and sequentially."
        }
        InvestigationKind::File => {
            "You are \"Sentinel,\" a world-class cybersecurity analysis AI agent. Your purpose is to conduct deep, exhaustive investigations of files to protect users from malware, viruses, and malicious code. You are an expert in reverse-engineering, code analysis, and digital forensics. You operate within a chat interface and must communicate your actions and findings clearly and sequentially."
        }
        InvestigationKind::Premium => {
            "You are \"Sentinel Prime,\" an advanced AI investigator providing a premium, in-depth analysis service. You are meticulous, thorough, and your goal is to deliver a comprehensive, actionable intelligence report. You communicate your process clearly and sequentially before delivering the final, structured report."
        }
    };

    let mut instruction = persona.to_string();
    if simple_language {
        instruction.push_str(SIMPLE_LANGUAGE_INSTRUCTION);
    }
    instruction
}

/// The user-turn prompt: target, streaming format, and report schema.
pub fn build_prompt(request: &InvestigationRequest) -> String {
    let kind = request.kind;
    let mut prompt = String::new();

    match kind {
        InvestigationKind::Url => {
            prompt.push_str(&format!(
                "A user has requested an investigation of the URL: {}\n\n",
                request.subject
            ));
        }
        InvestigationKind::File => {
            let mime = request
                .attachment
                .as_ref()
                .map(|a| a.mime_type.as_str())
                .unwrap_or("application/octet-stream");
            prompt.push_str(&format!(
                "A user has uploaded a file for investigation:\n- File Name: {}\n- Mime Type: {}\n\n",
                request.subject, mime
            ));
        }
        InvestigationKind::Premium => {
            prompt.push_str(&format!(
                "A user has initiated a PREMIUM AI-SCAN for the following target: {}\n\n",
                request.subject
            ));
        }
    }

    prompt.push_str(
        "You must conduct the investigation step-by-step. For each step, you must stream your process using a specific format. After all steps are complete, you will stream the final JSON report.\n\n",
    );

    // Step streaming format
    prompt.push_str(&format!(
        "**STEP-BY-STEP STREAMING FORMAT:**\n\
         For each step of your investigation, you MUST stream a block of text starting with \"{start}\", followed by a single-line JSON object, and ending with \"{end}\". You must then stream your detailed findings for that step in Markdown format immediately after the block.\n\n\
         The JSON object for a step MUST have these keys:\n\
         - \"tool\": A short name for the tool/action. YOU MUST choose one name from this exact list: [{tools}]\n\
         - \"icon\": The name of an icon to represent the tool. Choose from: {icons}\n\
         - \"thought\": A brief, user-facing sentence describing what you are currently doing.\n\n\
         Example of a single step's stream output:\n\
         {start}\n\
         {{\"tool\": \"{example_tool}\", \"icon\": \"{example_icon}\", \"thought\": \"Working on this step.\"}}\n\
         {end}\n\
         *   **Finding:** A concrete, bulleted finding for this step.\n\n",
        start = STEP_START,
        end = STEP_END,
        tools = quote_list(kind.tool_names()),
        icons = kind.icon_names().join(", "),
        example_tool = kind.tool_names()[0],
        example_icon = kind.icon_names()[0],
    ));

    // Report format
    let tag = ReportTag::from(kind);
    prompt.push_str(&format!(
        "**FINAL REPORT STREAMING FORMAT:**\n\
         After all investigation steps are complete and streamed, you MUST stream the final report. The report is a single JSON object enclosed between {start} and {end} tags.\n\n",
        start = tag.start(),
        end = tag.end(),
    ));
    prompt.push_str(report_schema(kind));
    prompt.push_str(&format!(
        "\nThere must be no text after the final {} tag.\nBegin the investigation now. Stream your first step.\n",
        tag.end()
    ));

    prompt
}

fn quote_list(items: &[&str]) -> String {
    items
        .iter()
        .map(|i| format!("\"{}\"", i))
        .collect::<Vec<_>>()
        .join(", ")
}

fn report_schema(kind: InvestigationKind) -> &'static str {
    match kind {
        InvestigationKind::Url => {
            "The final report JSON object must have these keys: \"safetyScore\" (integer 0-100), \"summary\", \"domainAnalysis\", \"contentAnalysis\", \"policyAnalysis\", \"corporateAnalysis\", and \"recommendation\" (exactly one of \"Safe to Proceed\", \"Use with Caution\", \"Avoid this Site\").\n"
        }
        InvestigationKind::File => {
            "The final report JSON object must have these keys: \"safetyScore\" (integer 0-100), \"summary\", \"staticAnalysis\", \"behavioralAnalysis\", \"dependencyAnalysis\", \"originAnalysis\", \"recommendation\" (exactly one of \"Safe to Proceed\", \"Use with Caution\", \"Avoid this Site\"), and optionally \"frontendCodeAnalysis\", \"backendAccessAnalysis\", and \"evidence\".\n\
             The \"evidence\" key MUST be an array of objects, each with \"description\" (what the evidence shows) and \"base64Image\" (the full data URL of an image extracted from the file).\n"
        }
        InvestigationKind::Premium => {
            "The final report JSON object MUST have this exact structure:\n\
             {\n\
               \"riskScore\": number (0-100; this is a RISK score, high means dangerous),\n\
               \"recommendationColor\": \"Green\" | \"Orange\" | \"Red\",\n\
               \"aiSummary\": markdown summary string with a final recommendation,\n\
               \"reputationCheck\": { \"title\": string, \"details\": markdown string },\n\
               \"domainInfo\": { \"title\": string, \"details\": markdown string },\n\
               \"ipInfo\": { \"title\": string, \"details\": markdown string },\n\
               \"contentAnalysis\": { \"title\": string, \"details\": markdown string }\n\
             }\n"
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(kind: InvestigationKind) -> InvestigationRequest {
        InvestigationRequest {
            kind,
            subject: "https://example-shop.test".to_string(),
            simple_language: false,
            attachment: None,
        }
    }

    #[test]
    fn test_prompt_carries_protocol_tags() {
        let prompt = build_prompt(&request(InvestigationKind::Url));
        assert!(prompt.contains(STEP_START));
        assert!(prompt.contains(STEP_END));
        assert!(prompt.contains("§REPORT_START§"));
        assert!(prompt.contains("§REPORT_END§"));
        assert!(!prompt.contains("PREMIUM_REPORT"));
    }

    #[test]
    fn test_premium_prompt_uses_premium_tags() {
        let prompt = build_prompt(&request(InvestigationKind::Premium));
        assert!(prompt.contains("§PREMIUM_REPORT_START§"));
        assert!(prompt.contains("riskScore"));
        assert!(prompt.contains("\"Reputation Cross-Check\""));
    }

    #[test]
    fn test_prompt_lists_kind_vocabulary() {
        let prompt = build_prompt(&request(InvestigationKind::File));
        for tool in InvestigationKind::File.tool_names() {
            assert!(prompt.contains(tool), "missing tool {}", tool);
        }
    }

    #[test]
    fn test_simple_language_mode() {
        let plain = build_system_instruction(InvestigationKind::Url, false);
        let simple = build_system_instruction(InvestigationKind::Url, true);
        assert!(!plain.contains("non-technical"));
        assert!(simple.contains("non-technical"));
    }
}
