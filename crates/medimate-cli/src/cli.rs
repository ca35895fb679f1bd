use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use clap_complete::Shell;

use crate::output::OutputFormat;

#[derive(Parser)]
#[command(name = "medimate")]
#[command(version, about = "MediMate - AI medical consultation assistant")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Backend base URL (defaults to server.base_url from the config file)
    #[arg(long, global = true, env = "MEDIMATE_API_URL")]
    pub api_url: Option<String>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Output format
    #[arg(long, global = true, default_value = "text")]
    pub format: OutputFormat,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Generate shell completions
    Completions {
        #[arg(value_enum)]
        shell: Shell,
    },

    /// Start a consultation (interactive unless a message or recording is given)
    Chat(ChatArgs),

    /// Check whether the consultation backend is online
    Status,
}

#[derive(Args, Default)]
pub struct ChatArgs {
    /// Send a single message and exit
    #[arg(short, long)]
    pub message: Option<String>,

    /// Voice recording to send with the message
    #[arg(long, value_name = "FILE")]
    pub audio: Option<PathBuf>,

    /// File to note on the message
    #[arg(long, value_name = "FILE")]
    pub attach: Option<PathBuf>,

    /// Patient profile (auto, pediatric, chronic, or any backend tag)
    #[arg(short, long)]
    pub profile: Option<String>,

    /// Export the consultation as PDF into this directory afterwards
    #[arg(long, value_name = "DIR")]
    pub export: Option<PathBuf>,
}

impl ChatArgs {
    /// Whether the arguments describe a single non-interactive turn.
    pub fn is_one_shot(&self) -> bool {
        self.message.is_some() || self.audio.is_some() || self.attach.is_some()
    }
}
