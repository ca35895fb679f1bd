use anyhow::Result;
use colored::Colorize;
use medimate_core::{ConsultationSession, ServiceAvailability};
use serde_json::json;

use crate::output::table::{key_value_table, print_table};
use crate::output::{OutputFormat, json::print_json};

pub async fn run(session: &ConsultationSession, format: OutputFormat) -> Result<()> {
    let availability = session.check_status().await;
    let base_url = session.client().base_url();

    if format.is_json() {
        return print_json(&match &availability {
            ServiceAvailability::Online(status) => json!({
                "online": true,
                "base_url": base_url,
                "service_status": status.service_status,
                "active_chat_method": status.active_chat_method,
                "local_transcription_model": status.local_transcription_model,
            }),
            ServiceAvailability::Offline(reason) => json!({
                "online": false,
                "base_url": base_url,
                "reason": reason,
            }),
        });
    }

    println!("MediMate Status");
    match availability {
        ServiceAvailability::Online(status) => {
            println!("Backend: {} ({base_url})", "online".green().bold());
            print_table(key_value_table([
                ("Service", status.service_status),
                (
                    "Chat method",
                    status.active_chat_method.unwrap_or_else(|| "-".to_string()),
                ),
                (
                    "Transcription model",
                    status
                        .local_transcription_model
                        .unwrap_or_else(|| "-".to_string()),
                ),
            ]))?;
        }
        ServiceAvailability::Offline(reason) => {
            println!("Backend: {} ({base_url})", "offline".red().bold());
            println!("Reason: {reason}");
        }
    }

    Ok(())
}
