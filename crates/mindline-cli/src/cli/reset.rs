//! `mindline reset` -- clear a session's stored history.

use console::style;

use crate::state::AppState;

/// Delete all stored messages for a session. Safe to repeat.
pub async fn reset_session(state: &AppState, session_id: &str) -> anyhow::Result<()> {
    let removed = state.relay.reset(session_id).await?;

    if removed == 0 {
        println!(
            "\n  {}\n",
            style(format!("Session '{session_id}' was already empty.")).dim()
        );
    } else {
        println!(
            "\n  {} Cleared {} stored messages from session '{}'.\n",
            style("*").cyan().bold(),
            removed,
            session_id
        );
    }

    Ok(())
}
