use colored::Colorize;

pub fn handle_error(err: anyhow::Error) -> ! {
    eprintln!("{} {}", "Error:".red().bold(), err);

    let msg = err.to_string().to_lowercase();

    if msg.contains("network error")
        || msg.contains("connection refused")
        || msg.contains("error sending request")
    {
        eprintln!("\n{}", "Suggestion:".yellow().bold());
        eprintln!("  Make sure the MediMate backend is running, then check it with:");
        eprintln!("  {} medimate status", "$".dimmed());
        eprintln!("  Point to another backend with --api-url or MEDIMATE_API_URL.");
    }

    if msg.contains("invalid base url") {
        eprintln!("\n{}", "Suggestion:".yellow().bold());
        eprintln!("  Use a full URL such as http://localhost:7861");
    }

    if msg.contains("no conversation to export") {
        eprintln!("\n{}", "Suggestion:".yellow().bold());
        eprintln!("  Ask at least one question before exporting.");
    }

    std::process::exit(1);
}
