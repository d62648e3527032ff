use crate::domain::{ChatId, ParticipantId};
use crate::error::{AppError, GameError};
use crate::gateway::Authorizer;
use serde::Deserialize;

/// Who is issuing a command, and from which chat.
#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Caller {
    pub chat_id: ChatId,
    pub user_id: ParticipantId,
}

/// Refuse unless the authorizer says yes. An authorizer failure also refuses.
pub async fn require_privileged(
    authorizer: &dyn Authorizer,
    caller: Caller,
) -> Result<(), AppError> {
    let (chat, user) = (caller.chat_id, caller.user_id);
    match authorizer.is_privileged(chat, user).await {
        Ok(true) => Ok(()),
        Ok(false) => {
            tracing::info!(chat = %chat, user = %user, "Privileged command refused");
            Err(GameError::Unauthorized("only chat admins may do this".to_string()).into())
        }
        Err(e) => {
            tracing::warn!(chat = %chat, user = %user, error = %e, "Privilege check failed");
            Err(GameError::Unauthorized("could not verify admin status".to_string()).into())
        }
    }
}
