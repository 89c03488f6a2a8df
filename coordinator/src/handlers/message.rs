use super::Ctx;
use crate::config::SendMessageScope;
use crate::errors::RequestError;
use protocol::{PlayerId, ServerEvent};

const MAX_MESSAGE_LEN: usize = 2048;

/// `SEND_MESSAGE` fans out to the named handles. Whether "named handles" may
/// reach across the whole server or only within the sender's own game is a
/// config switch (`send_message_scope`) rather than a fixed wire rule.
pub fn send(ctx: &mut Ctx, player_id: PlayerId, recipient_handles: Vec<String>, message: String) -> Result<(), RequestError> {
    let Some(sender) = ctx.store.players.get(&player_id) else {
        return Err(RequestError::InvalidPlayer);
    };
    if message.len() > MAX_MESSAGE_LEN {
        return Err(RequestError::MessageTooLarge);
    }
    let sender_handle = sender.handle.clone();
    let sender_game = sender.current_game;

    let mut recipients = Vec::new();
    for handle in &recipient_handles {
        let Some(recipient) = ctx.store.player_by_handle(handle) else {
            continue;
        };
        let in_scope = match ctx.config.send_message_scope {
            SendMessageScope::Server => true,
            SendMessageScope::Game => sender_game.is_some() && recipient.current_game == sender_game,
        };
        if in_scope {
            recipients.push(recipient.player_id);
        }
    }
    if recipients.is_empty() {
        return Ok(());
    }

    ctx.outbox.to_players(recipients, ServerEvent::PlayerMessageReceived { sender_handle, message });
    Ok(())
}
