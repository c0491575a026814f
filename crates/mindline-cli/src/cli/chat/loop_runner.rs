//! Main chat loop orchestration.
//!
//! Coordinates the complete conversation lifecycle: transcript replay from
//! the durable store, the welcome banner, the input loop with streaming
//! relay turns, slash commands, and per-turn error reporting. The loop
//! that consumes the reply stream is also the rendering loop: each
//! fragment is printed as it arrives.

use std::io::Write;
use std::time::Instant;

use console::style;
use futures_util::StreamExt;
use indicatif::{ProgressBar, ProgressStyle};
use tracing::warn;

use mindline_core::relay::{Transcript, TurnError};
use mindline_types::message::MessageRole;

use crate::state::AppState;

use super::banner::print_welcome_banner;
use super::commands::{self, ChatCommand};
use super::input::{ChatInput, InputEvent};
use super::renderer::ChatRenderer;

/// Print a transcript with role labels, assistant replies rendered as
/// markdown.
fn print_transcript(renderer: &ChatRenderer, transcript: &Transcript) {
    println!();
    for message in transcript.messages() {
        match message.role {
            MessageRole::User => {
                println!("  {} {}", style("You >").green().bold(), message.content);
            }
            MessageRole::Assistant => {
                println!(
                    "  {} {}",
                    style("Mindline >").cyan().bold(),
                    renderer.render_final(&message.content).trim_end()
                );
            }
        }
        println!();
    }
}

fn thinking_spinner() -> ProgressBar {
    let spinner = ProgressBar::new_spinner();
    spinner.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.cyan} {msg}")
            .unwrap(),
    );
    spinner.set_message("thinking...");
    spinner.enable_steady_tick(std::time::Duration::from_millis(80));
    spinner
}

/// Run the interactive chat loop for a session.
pub async fn run_chat_loop(state: &AppState, session_id: &str) -> anyhow::Result<()> {
    let stored = state.relay.history(session_id).await?;
    let mut transcript = Transcript::from_stored(stored);

    print_welcome_banner(&state.settings.model, session_id, transcript.len());

    let renderer = ChatRenderer::new();

    // Replay the stored conversation so the view starts in sync with the
    // durable log.
    if !transcript.is_empty() {
        print_transcript(&renderer, &transcript);
    }

    let prompt = format!("  {} ", style("You >").green().bold());
    let (mut chat_input, _writer) = ChatInput::new(prompt)
        .map_err(|e| anyhow::anyhow!("failed to initialize input: {e}"))?;

    loop {
        let event = chat_input.read_line().await;
        match event {
            InputEvent::Eof => {
                println!("\n  {}", style("Session ended.").dim());
                break;
            }
            InputEvent::Interrupted => {
                println!(
                    "\n  {}",
                    style("Press Ctrl+D to exit, or keep chatting.").dim()
                );
                continue;
            }
            InputEvent::Message(text) => {
                if text.is_empty() {
                    continue;
                }

                // Slash commands
                if let Some(cmd) = commands::parse(&text) {
                    match cmd {
                        ChatCommand::Help => {
                            commands::print_help();
                        }
                        ChatCommand::Clear => {
                            chat_input.clear();
                        }
                        ChatCommand::History => {
                            if transcript.is_empty() {
                                println!("\n  {}\n", style("No messages yet.").dim());
                            } else {
                                print_transcript(&renderer, &transcript);
                            }
                        }
                        ChatCommand::Reset => match state.relay.reset(session_id).await {
                            Ok(removed) => {
                                transcript.clear();
                                println!(
                                    "\n  {} Started a new conversation ({removed} stored messages cleared).\n",
                                    style("*").cyan().bold()
                                );
                            }
                            Err(e) => {
                                println!(
                                    "\n  {} Failed to reset the session: {e}\n",
                                    style("!").red().bold()
                                );
                            }
                        },
                        ChatCommand::Exit => {
                            println!("\n  {}", style("Session ended.").dim());
                            break;
                        }
                        ChatCommand::Unknown(name) => {
                            println!(
                                "\n  {} Unknown command: {}. Type /help for available commands.\n",
                                style("?").yellow().bold(),
                                style(name).dim()
                            );
                        }
                    }
                    continue;
                }

                // One relay turn
                let spinner = thinking_spinner();
                let started = Instant::now();

                let mut stream = match state.relay.send(session_id, &text).await {
                    Ok(Some(stream)) => stream,
                    Ok(None) => {
                        spinner.finish_and_clear();
                        continue;
                    }
                    Err(e) => {
                        spinner.finish_and_clear();
                        eprintln!("\n  {} Could not start the turn: {e}", style("!").red().bold());
                        eprintln!("  {}", style("Your history is unchanged; try again.").dim());
                        continue;
                    }
                };

                let mut reply = String::new();
                let mut first_fragment_seen = false;
                let mut turn_error: Option<TurnError> = None;

                while let Some(item) = stream.next().await {
                    match item {
                        Ok(fragment) => {
                            if !first_fragment_seen {
                                spinner.finish_and_clear();
                                first_fragment_seen = true;
                                print!("\n  {} ", style("Mindline >").cyan().bold());
                                let _ = std::io::stdout().flush();
                            }
                            renderer.print_streaming_fragment(&fragment);
                            reply.push_str(&fragment);
                        }
                        Err(e) => {
                            turn_error = Some(e);
                            break;
                        }
                    }
                }
                if !first_fragment_seen {
                    spinner.finish_and_clear();
                }

                match turn_error {
                    None => {
                        println!();
                        renderer.print_stats_footer(
                            started.elapsed().as_millis() as u64,
                            &state.settings.model,
                        );
                        println!();
                        transcript.push_turn(text, reply);
                    }
                    Some(TurnError::Completion(e)) => {
                        eprintln!("\n  {} Reply failed: {e}", style("!").red().bold());
                        eprintln!(
                            "  {}",
                            style("Nothing was saved; type a message to retry.").dim()
                        );
                        warn!(error = %e, "turn aborted, history unchanged");
                    }
                    Some(TurnError::Persistence(e)) => {
                        // Reply already rendered but not recorded: the
                        // on-screen conversation is ahead of the store.
                        println!();
                        eprintln!(
                            "\n  {} This exchange could not be saved: {e}",
                            style("!").red().bold()
                        );
                        eprintln!(
                            "  {}",
                            style("The conversation on screen is ahead of the stored history.")
                                .dim()
                        );
                        warn!(error = %e, "turn not persisted, transcript diverges from store");
                        transcript.push_turn(text, reply);
                    }
                }
            }
        }
    }

    Ok(())
}
