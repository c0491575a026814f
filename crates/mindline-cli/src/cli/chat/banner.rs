//! Welcome banner display for chat sessions.
//!
//! Prints a styled banner when a chat session starts, showing the model
//! and session identifier, the topics the companion covers, and the
//! educational-use disclaimer.

use console::style;

/// Print the welcome banner at the start of a chat session.
pub fn print_welcome_banner(model: &str, session_id: &str, stored_messages: usize) {
    println!();
    println!("  * {}", style("Mindline").cyan().bold());
    println!(
        "  {}",
        style("A psychology-focused chat companion").dim()
    );
    println!();
    println!("  {}  {}", style("Model:").bold(), style(model).dim());
    println!("  {}  {}", style("Session:").bold(), style(session_id).dim());
    if stored_messages > 0 {
        println!(
            "  {}  {}",
            style("History:").bold(),
            style(format!("{stored_messages} stored messages")).dim()
        );
    }
    println!();
    println!(
        "  {}",
        style("Topics: mental health, stress and anxiety, self-care, relationships, therapy").dim()
    );
    println!(
        "  {}",
        style("Educational information only -- not a substitute for a licensed professional.")
            .yellow()
            .dim()
    );
    println!();
    println!(
        "  {}",
        style("Type /help for commands, Ctrl+D to exit").dim()
    );
    println!("  {}", style("---").dim());
    println!();
}
