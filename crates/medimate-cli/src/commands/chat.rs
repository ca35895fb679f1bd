use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use colored::Colorize;
use medimate_ai::AudioPayload;
use medimate_core::{
    AudioRef, ConsultationSession, FileAttachment, GREETING, PatientProfile, TurnInput,
    TurnOutcome,
};
use serde_json::json;
use tokio::io::{AsyncBufReadExt, BufReader};

use crate::cli::ChatArgs;
use crate::commands::status;
use crate::config::CliConfig;
use crate::output::{OutputFormat, json::print_json};

const ASSISTANT_LABEL: &str = "Dr. MediMate";

pub async fn run(
    session: &ConsultationSession,
    config: &CliConfig,
    args: ChatArgs,
    format: OutputFormat,
) -> Result<()> {
    let profile = args
        .profile
        .as_deref()
        .map(PatientProfile::from)
        .unwrap_or_else(|| config.chat.patient_profile.clone());
    session.set_profile(profile);

    if args.is_one_shot() {
        return one_shot(session, args, format).await;
    }

    interactive(session, config.chat.greeting).await
}

async fn one_shot(session: &ConsultationSession, args: ChatArgs, format: OutputFormat) -> Result<()> {
    let input = build_input(
        args.message.as_deref().unwrap_or_default(),
        args.audio.as_deref(),
        args.attach.as_deref(),
    )
    .await?;

    let outcome = run_turn(session, input, !format.is_json()).await?;
    if let TurnOutcome::Failed { reason, .. } = &outcome {
        bail!("{reason}");
    }

    let exported = match &args.export {
        Some(dir) => Some(session.export_transcript(dir).await?),
        None => None,
    };

    if format.is_json() {
        let reply = outcome.message();
        return print_json(&json!({
            "reply": reply.content,
            "urgent": reply.is_flagged_urgent,
            "profile": session.store().read().selected_profile().as_tag(),
            "export": exported.map(|path| path.display().to_string()),
        }));
    }

    if let Some(path) = exported {
        println!("Transcript saved to {}", path.display());
    }
    Ok(())
}

/// Run one turn, optionally echoing tokens to stdout as they arrive.
async fn run_turn(
    session: &ConsultationSession,
    input: TurnInput,
    echo: bool,
) -> Result<TurnOutcome> {
    let mut started = false;
    let outcome = session
        .send_with(input, |token| {
            if !echo {
                return;
            }
            let mut stdout = std::io::stdout();
            if !started {
                started = true;
                let _ = write!(stdout, "{} ", format!("{ASSISTANT_LABEL}:").cyan().bold());
            }
            let _ = write!(stdout, "{token}");
            let _ = stdout.flush();
        })
        .await?;

    if echo {
        match &outcome {
            TurnOutcome::Answered(message) => {
                if !started {
                    print_assistant(&message.content);
                } else {
                    println!();
                }
                if message.is_flagged_urgent {
                    println!(
                        "{}",
                        "This reply was flagged as urgent. If this is an emergency, contact emergency services now."
                            .red()
                            .bold()
                    );
                }
            }
            TurnOutcome::Failed { message, .. } => {
                if started {
                    println!();
                }
                eprintln!("{}", message.content.yellow());
            }
        }
    }

    Ok(outcome)
}

async fn build_input(text: &str, audio: Option<&Path>, attach: Option<&Path>) -> Result<TurnInput> {
    let mut input = TurnInput::text(text);

    if let Some(path) = audio {
        let bytes = tokio::fs::read(path)
            .await
            .with_context(|| format!("Failed to read audio file {}", path.display()))?;
        let payload = AudioPayload {
            bytes,
            file_name: file_name(path),
            mime_type: mime_type(path),
        };
        input = input.with_audio(payload, AudioRef(path.display().to_string()));
    }

    if let Some(path) = attach {
        if !path.is_file() {
            bail!("Attachment not found: {}", path.display());
        }
        input = input.with_attachment(FileAttachment {
            handle: path.display().to_string(),
            name: file_name(path),
            mime_type: mime_type(path),
        });
    }

    Ok(input)
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

fn mime_type(path: &Path) -> String {
    mime_guess::from_path(path)
        .first_or_octet_stream()
        .to_string()
}

fn print_assistant(text: &str) {
    println!("{} {text}", format!("{ASSISTANT_LABEL}:").cyan().bold());
}

/// Commands available inside an interactive consultation.
#[derive(Debug, PartialEq)]
enum SlashCommand {
    Help,
    Profile(Option<String>),
    Export(Option<PathBuf>),
    Clear,
    Status,
    Exit,
    Unknown(String),
}

impl SlashCommand {
    /// Parse the text after the leading `/`.
    fn parse(input: &str) -> Self {
        let mut parts = input.trim().splitn(2, char::is_whitespace);
        let name = parts.next().unwrap_or_default().to_lowercase();
        let arg = parts
            .next()
            .map(str::trim)
            .filter(|arg| !arg.is_empty())
            .map(str::to_string);

        match name.as_str() {
            "help" | "?" => SlashCommand::Help,
            "profile" => SlashCommand::Profile(arg),
            "export" => SlashCommand::Export(arg.map(PathBuf::from)),
            "clear" => SlashCommand::Clear,
            "status" => SlashCommand::Status,
            "exit" | "quit" => SlashCommand::Exit,
            _ => SlashCommand::Unknown(name),
        }
    }
}

fn print_help() {
    println!("{}", "Commands:".bold());
    println!("  /profile [tag]  Show or change the patient profile");
    println!("  /export [dir]   Save the consultation as PDF (default: current directory)");
    println!("  /clear          Start over");
    println!("  /status         Check the backend");
    println!("  /exit           Leave the consultation");
}

async fn interactive(session: &ConsultationSession, greeting: bool) -> Result<()> {
    println!(
        "{}",
        "MediMate consultation. Type /help for commands, /exit to leave.".dimmed()
    );
    if greeting && session.seed_greeting() {
        print_assistant(GREETING);
    }

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        print!("{} ", ">".green().bold());
        std::io::stdout().flush()?;

        let Some(line) = lines.next_line().await? else {
            println!();
            break;
        };
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        if let Some(command) = line.strip_prefix('/') {
            match SlashCommand::parse(command) {
                SlashCommand::Help => print_help(),
                SlashCommand::Profile(None) => {
                    let current = session.store().read().selected_profile().clone();
                    let known: Vec<_> = PatientProfile::known()
                        .iter()
                        .map(|profile| profile.as_tag().to_string())
                        .collect();
                    println!("Profile: {current} (known: {})", known.join(", "));
                }
                SlashCommand::Profile(Some(tag)) => {
                    let profile = PatientProfile::from(tag.as_str());
                    println!("Profile set to {profile}");
                    session.set_profile(profile);
                }
                SlashCommand::Export(dir) => {
                    let dir = dir.unwrap_or_else(|| PathBuf::from("."));
                    match session.export_transcript(&dir).await {
                        Ok(path) => println!("Transcript saved to {}", path.display()),
                        Err(err) => eprintln!("{} {err}", "Export failed:".red().bold()),
                    }
                }
                SlashCommand::Clear => {
                    session.clear_history();
                    println!("{}", "Conversation cleared.".dimmed());
                    if greeting && session.seed_greeting() {
                        print_assistant(GREETING);
                    }
                }
                SlashCommand::Status => status::run(session, OutputFormat::Text).await?,
                SlashCommand::Exit => break,
                SlashCommand::Unknown(name) => {
                    eprintln!("Unknown command /{name}. Type /help for commands.");
                }
            }
            continue;
        }

        if let Err(err) = run_turn(session, TurnInput::text(line), true).await {
            eprintln!("{} {err}", "Error:".red().bold());
        }
    }

    Ok(())
}
