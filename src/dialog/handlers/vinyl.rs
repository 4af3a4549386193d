use tracing::{info, warn};

use crate::dialog::event::{Attachment, Event};
use crate::dialog::handlers::{reprompt, what_next};
use crate::dialog::machine::Collaborators;
use crate::dialog::reply::{Keyboard, Reply};
use crate::dialog::session::{Effect, ScratchUpdate, Session, Transition};
use crate::dialog::state::{DialogState, Flow};
use crate::foundation::error::BotResult;
use crate::media::asset::{AssetKind, MediaAsset, extension_hint};
use crate::media::source::StillImage;

fn image_attachment(event: &Event) -> Option<&Attachment> {
    match event {
        Event::Photo(att) => Some(att),
        Event::Document(att) if att.mime_is("image") => Some(att),
        _ => None,
    }
}

fn audio_attachment(event: &Event) -> Option<&Attachment> {
    match event {
        Event::Audio(att) | Event::Voice(att) => Some(att),
        Event::Document(att) if att.mime_is("audio") => Some(att),
        _ => None,
    }
}

async fn fetch(
    deps: &Collaborators,
    session: &Session,
    kind: AssetKind,
    attachment: &Attachment,
) -> BotResult<MediaAsset> {
    let asset = deps.workspace.reserve(
        session.id,
        kind,
        extension_hint(attachment.file_name.as_deref(), attachment.mime.as_deref()),
        attachment.mime.clone(),
    );
    deps.fetcher.download(attachment, asset.path()).await?;
    Ok(asset)
}

pub(crate) async fn on_image(deps: &Collaborators, session: &Session, event: &Event) -> Transition {
    let Some(attachment) = image_attachment(event) else {
        return reprompt(session);
    };

    let checked = match fetch(deps, session, AssetKind::Image, attachment).await {
        Ok(image) => StillImage::probe_dimensions(image.path()).map(|dims| (image, dims)),
        Err(e) => Err(e),
    };
    match checked {
        Ok((image, (width, height))) => {
            info!(session_id = %session.id, width, height, "vinyl cover received");
            Transition::to(DialogState::AwaitingVinylAudio)
                .update(ScratchUpdate::VinylImage(image))
                .reply(Reply::text(
                    "✅ Image received! Now send an audio file (MP3, WAV, etc.):",
                ))
        }
        Err(e) => {
            warn!(session_id = %session.id, error = %e, "vinyl cover rejected");
            what_next(
                Transition::to(DialogState::Choosing)
                    .update(ScratchUpdate::ClearFlow(Flow::Vinyl))
                    .reply(Reply::text(format!("Error processing image: {e}"))),
            )
        }
    }
}

pub(crate) async fn on_audio(deps: &Collaborators, session: &Session, event: &Event) -> Transition {
    let Some(attachment) = audio_attachment(event) else {
        return reprompt(session);
    };

    // Acknowledge before the download so large uploads are not met with silence.
    let notice =
        Reply::text("🎵 Processing vinyl... This may take a moment!").with_keyboard(Keyboard::Main);
    if let Err(e) = deps.outbound.send_reply(session.id, &notice).await {
        warn!(session_id = %session.id, error = %e, "failed to send vinyl notice");
    }

    match fetch(deps, session, AssetKind::Audio, attachment).await {
        Ok(audio) => Transition::to(DialogState::Choosing).effect(Effect::EnqueueVinyl { audio }),
        Err(e) => {
            warn!(session_id = %session.id, error = %e, "vinyl audio download failed");
            what_next(
                Transition::to(DialogState::Choosing)
                    .update(ScratchUpdate::ClearFlow(Flow::Vinyl))
                    .reply(Reply::text(format!("Error processing audio: {e}"))),
            )
        }
    }
}
