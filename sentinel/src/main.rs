//! sentinel - scam defense assistant
//!
//! Streams an AI-driven investigation of a URL or file and prints the step
//! history and final safety report.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use clap::{Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};
use tokio::sync::mpsc;

use sentinel_core::genai::{GenAiClient, InlineData, InvestigationRequest};
use sentinel_core::protocol::StreamEvent;
use sentinel_core::types::{InvestigationKind, Report, SessionStatus};
use sentinel_core::{Config, InvestigationSession};

#[derive(Parser)]
#[command(name = "sentinel")]
#[command(about = "Investigate URLs and files for scams and malware")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Explain findings in simple, non-technical language
    #[arg(long, global = true)]
    simple: bool,

    /// Override the configured model
    #[arg(long, global = true)]
    model: Option<String>,

    /// Print the full session as JSON instead of rendering steps live
    #[arg(long, global = true)]
    json: bool,
}

#[derive(Subcommand)]
enum Command {
    /// Investigate a website URL
    Scan {
        /// URL to investigate
        url: String,
    },
    /// Investigate a local file
    ScanFile {
        /// Path to the file to investigate
        path: PathBuf,
    },
    /// Run an in-depth premium scan of a target
    Premium {
        /// URL, domain, or other target
        target: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = Config::load().context("failed to load configuration")?;
    if let Some(model) = &cli.model {
        config.genai.model = model.clone();
    }

    let _log_guard =
        sentinel_core::logging::init(&config.logging).context("failed to initialize logging")?;

    let request = build_request(&cli)?;
    tracing::info!(kind = %request.kind, subject = %request.subject, "starting investigation");

    let client = GenAiClient::new(config.genai).context("failed to create AI client")?;
    let mut session = InvestigationSession::new(request.kind, request.subject.clone());

    let (tx, rx) = mpsc::channel(32);
    tokio::spawn(async move { client.stream_investigation(request, tx).await });

    if cli.json {
        sentinel_core::runner::run_session(rx, &mut session, |_| {}).await;
        println!("{}", serde_json::to_string_pretty(&session)?);
    } else {
        let mut spinner: Option<ProgressBar> = None;
        sentinel_core::runner::run_session(rx, &mut session, |event| {
            render_event(event, &mut spinner);
        })
        .await;
        if let Some(bar) = spinner.take() {
            bar.finish();
        }

        if let Some(report) = &session.report {
            print_report(report);
        }
    }

    if session.status == SessionStatus::Error {
        let message = session.error.as_deref().unwrap_or("unknown error");
        anyhow::bail!("investigation failed: {}", message);
    }

    Ok(())
}

/// Translate CLI arguments into an investigation request.
fn build_request(cli: &Cli) -> Result<InvestigationRequest> {
    let (kind, subject, attachment) = match &cli.command {
        Command::Scan { url } => (InvestigationKind::Url, url.clone(), None),
        Command::ScanFile { path } => {
            let bytes = std::fs::read(path)
                .with_context(|| format!("failed to read file: {}", path.display()))?;
            let name = path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_else(|| path.display().to_string());
            let attachment = InlineData {
                mime_type: mime_for_path(path).to_string(),
                data: BASE64.encode(&bytes),
            };
            (InvestigationKind::File, name, Some(attachment))
        }
        Command::Premium { target } => (InvestigationKind::Premium, target.clone(), None),
    };

    Ok(InvestigationRequest {
        kind,
        subject,
        simple_language: cli.simple,
        attachment,
    })
}

/// Guess a mime type from the file extension.
fn mime_for_path(path: &Path) -> &'static str {
    let ext = path
        .extension()
        .map(|e| e.to_ascii_lowercase())
        .unwrap_or_default();
    match ext.to_str().unwrap_or("") {
        "pdf" => "application/pdf",
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "gif" => "image/gif",
        "webp" => "image/webp",
        "html" | "htm" => "text/html",
        "js" => "text/javascript",
        "txt" | "md" => "text/plain",
        "zip" => "application/zip",
        _ => "application/octet-stream",
    }
}

/// Render one parser event as live terminal output.
fn render_event(event: &StreamEvent, spinner: &mut Option<ProgressBar>) {
    match event {
        StreamEvent::StepStarted(header) => {
            let bar = ProgressBar::new_spinner();
            bar.set_style(
                ProgressStyle::with_template("{spinner} {msg}")
                    .unwrap_or_else(|_| ProgressStyle::default_spinner()),
            );
            bar.enable_steady_tick(std::time::Duration::from_millis(100));
            bar.set_message(format!("{}: {}", header.tool, header.thought));
            *spinner = Some(bar);
        }
        StreamEvent::StepCompleted => {
            if let Some(bar) = spinner.take() {
                let message = bar.message();
                bar.finish_and_clear();
                println!("[done] {}", message);
            }
        }
        StreamEvent::StepDetail(_) | StreamEvent::ReportReady(_) => {}
    }
}

fn print_report(report: &Report) {
    println!();
    match report {
        Report::Basic(report) => {
            println!("Safety score:   {}/100", report.safety_score);
            println!("Recommendation: {}", report.recommendation);
            println!();
            println!("{}", report.summary);

            let sections = [
                ("Domain analysis", &report.domain_analysis),
                ("Content analysis", &report.content_analysis),
                ("Policy analysis", &report.policy_analysis),
                ("Corporate analysis", &report.corporate_analysis),
                ("Static analysis", &report.static_analysis),
                ("Behavioral analysis", &report.behavioral_analysis),
                ("Dependency analysis", &report.dependency_analysis),
                ("Origin analysis", &report.origin_analysis),
                ("Frontend code analysis", &report.frontend_code_analysis),
                ("Backend access analysis", &report.backend_access_analysis),
            ];
            for (title, body) in sections {
                if let Some(body) = body {
                    println!("\n## {}\n{}", title, body);
                }
            }
            if let Some(evidence) = &report.evidence {
                if !evidence.is_empty() {
                    println!("\n## Evidence");
                    for item in evidence {
                        println!("- {}", item.description);
                    }
                }
            }
        }
        Report::Premium(report) => {
            println!(
                "Risk score:     {}/100 ({})",
                report.risk_score, report.recommendation_color
            );
            println!();
            println!("{}", report.ai_summary);
            for section in [
                &report.reputation_check,
                &report.domain_info,
                &report.ip_info,
                &report.content_analysis,
            ] {
                println!("\n## {}\n{}", section.title, section.details);
            }
        }
    }
}
