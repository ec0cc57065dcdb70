//! Interactive tutor chat

use anyhow::{bail, Result};
use colored::Colorize;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::broadcast::error::RecvError;

use goalpath_core::{AuthEvent, AuthGuard, ClientConfig};
use goalpath_tutor::{ChatMessage, MessageOrigin, TutorChannel, TutorConfig};

const QUIT: &str = "/quit";

fn print_message(message: &ChatMessage) {
    let time = message
        .timestamp
        .with_timezone(&chrono::Local)
        .format("%H:%M");
    let who = match message.origin {
        MessageOrigin::User => message.origin.to_string().cyan(),
        MessageOrigin::Assistant => message.origin.to_string().green(),
        MessageOrigin::System => message.origin.to_string().dimmed(),
    };
    println!("{} {}: {}", time.to_string().dimmed(), who, message.text);
}

/// Read lines from stdin and send them until `/quit` or end of input
pub(crate) async fn run(config: &ClientConfig, guard: &AuthGuard) -> Result<()> {
    let Some(user_id) = guard.user_id() else {
        bail!("Not signed in. Run `goalpath login` first.");
    };

    let channel = TutorChannel::websocket(TutorConfig::from(config));
    let mut messages = channel.subscribe_messages();
    let mut states = channel.subscribe_state();
    let mut auth_events = guard.subscribe();
    let mut watching_auth = true;
    channel.open(&user_id);
    println!("Type a message and press Enter. {} exits.", QUIT.bold());

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        tokio::select! {
            line = lines.next_line() => {
                let Some(line) = line? else { break };
                if line.trim() == QUIT {
                    break;
                }
                if !line.trim().is_empty() && !channel.send(&line) {
                    println!("{}", "Not connected to the tutor yet, message not sent.".yellow());
                }
            }
            received = messages.recv() => match received {
                // Own messages were typed on this terminal already
                Ok(message) if message.origin == MessageOrigin::User => {}
                Ok(message) => print_message(&message),
                Err(RecvError::Lagged(skipped)) => {
                    tracing::warn!("Skipped {} chat messages", skipped);
                }
                Err(RecvError::Closed) => break,
            },
            event = auth_events.recv(), if watching_auth => match event {
                Ok(AuthEvent::SessionExpired { .. } | AuthEvent::SignedOut) => {
                    channel.forget_identity();
                    println!(
                        "{}",
                        "Session ended. Run `goalpath login` to chat again.".yellow()
                    );
                }
                Ok(AuthEvent::SignedIn { .. }) | Err(RecvError::Lagged(_)) => {}
                Err(RecvError::Closed) => watching_auth = false,
            },
            changed = states.changed() => {
                if changed.is_err() {
                    break;
                }
                let state = *states.borrow_and_update();
                tracing::debug!("Tutor channel {}", state);
            }
        }
    }

    channel.close();
    Ok(())
}
