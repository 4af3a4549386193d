use std::sync::Arc;

use tracing::{info, warn};

use crate::compose::compositor::NoteInfo;
use crate::dialog::event::{Attachment, Event};
use crate::dialog::handlers::reprompt;
use crate::dialog::machine::Collaborators;
use crate::dialog::reply::{Artifact, Keyboard, Reply};
use crate::dialog::session::{Session, Transition};
use crate::dialog::state::DialogState;
use crate::foundation::error::{BotError, BotResult};
use crate::media::asset::{AssetKind, MediaAsset, extension_hint};

/// Declared size above which uploads are refused before download.
pub const MAX_UPLOAD_BYTES: u64 = 50 * 1024 * 1024;

/// `true` when `attachment` declares a size over [`MAX_UPLOAD_BYTES`].
pub fn is_oversized(attachment: &Attachment) -> bool {
    attachment.size_bytes.is_some_and(|s| s > MAX_UPLOAD_BYTES)
}

fn video_attachment(event: &Event) -> Option<&Attachment> {
    match event {
        Event::Video(att) => Some(att),
        Event::Document(att) if att.mime_is("video") => Some(att),
        _ => None,
    }
}

pub(crate) async fn on_video(deps: &Collaborators, session: &Session, event: &Event) -> Transition {
    let Some(attachment) = video_attachment(event) else {
        return reprompt(session);
    };
    if is_oversized(attachment) {
        let e = BotError::invalid_input("video is larger than 50MB");
        info!(session_id = %session.id, error = %e, "rejected upload");
        return Transition::to(session.state).reply(Reply::text(
            "The video is too large (max 50MB). Please send a smaller one.",
        ));
    }

    let back = Transition::to(DialogState::Choosing);
    match render(deps, session, attachment).await {
        Ok((output, note)) => back
            .artifact(Artifact {
                asset: output,
                duration_secs: note.whole_seconds(),
                side: note.side,
            })
            .reply(
                Reply::text("Video note ready! Forward it to your channel.")
                    .with_keyboard(Keyboard::Main),
            ),
        Err(e) => {
            warn!(session_id = %session.id, error = %e, "video note failed");
            back.reply(Reply::text(format!("Processing failed: {e}")).with_keyboard(Keyboard::Main))
        }
    }
}

/// Download, then render off the async executor. The input file is removed before returning.
async fn render(
    deps: &Collaborators,
    session: &Session,
    attachment: &Attachment,
) -> BotResult<(MediaAsset, NoteInfo)> {
    let input = deps.workspace.reserve(
        session.id,
        AssetKind::Video,
        extension_hint(attachment.file_name.as_deref(), attachment.mime.as_deref()),
        attachment.mime.clone(),
    );
    deps.fetcher.download(attachment, input.path()).await?;
    info!(session_id = %session.id, path = %input.path().display(), bytes = input.size_bytes(), "video downloaded");

    let output = deps
        .workspace
        .reserve(session.id, AssetKind::Output, Some("mp4"), None);
    let renderer = Arc::clone(&deps.renderer);
    let (in_path, out_path) = (input.path().to_path_buf(), output.path().to_path_buf());
    let note = tokio::task::spawn_blocking(move || renderer.render_video_note(&in_path, &out_path))
        .await
        .map_err(|e| BotError::encode_failed(format!("render task failed: {e}")))??;
    Ok((output, note))
}
