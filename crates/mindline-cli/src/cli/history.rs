//! `mindline history` -- print a session's stored transcript.

use console::style;

use mindline_types::message::MessageRole;

use crate::state::AppState;

/// Print the stored transcript for a session, oldest first.
pub async fn show_history(state: &AppState, session_id: &str) -> anyhow::Result<()> {
    let stored = state.relay.history(session_id).await?;

    if stored.is_empty() {
        println!(
            "\n  {}\n",
            style(format!("No messages stored for session '{session_id}'.")).dim()
        );
        return Ok(());
    }

    println!();
    for message in &stored {
        let label = match message.role {
            MessageRole::User => style("You").green().bold(),
            MessageRole::Assistant => style("Mindline").cyan().bold(),
        };
        println!("  {} {}", label, message.content);
        println!();
    }

    Ok(())
}
