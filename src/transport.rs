//! Boundary between the dialogue core and a chat service.

pub(crate) mod telegram;

use std::path::Path;

use async_trait::async_trait;

use crate::dialog::event::Attachment;
use crate::dialog::reply::{Artifact, Reply};
use crate::foundation::core::SessionId;
use crate::foundation::error::BotResult;

/// Delivers messages to a session.
#[async_trait]
pub trait Outbound: Send + Sync {
    /// Send a text message, optionally replacing the reply keyboard.
    async fn send_reply(&self, session: SessionId, reply: &Reply) -> BotResult<()>;

    /// Send a finished video note.
    async fn send_artifact(&self, session: SessionId, artifact: &Artifact) -> BotResult<()>;
}

/// Retrieves attachment content.
#[async_trait]
pub trait FileFetcher: Send + Sync {
    /// Write the attachment's bytes to `dest`. Failures are `DownloadFailed`.
    async fn download(&self, attachment: &Attachment, dest: &Path) -> BotResult<()>;
}
