//! Telegram Bot API transport (long polling) built on teloxide.

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use teloxide::net::Download;
use teloxide::prelude::*;
use teloxide::types::{
    InputFile, KeyboardButton, KeyboardMarkup, KeyboardRemove, MediaKind, MessageKind, ReplyMarkup,
};
use tracing::{debug, info};

use crate::compose::notes::{FfmpegNoteRenderer, NoteRenderer};
use crate::config::BotConfig;
use crate::dialog::event::{Attachment, Event};
use crate::dialog::machine::{Collaborators, SessionStateMachine};
use crate::dialog::reply::{Artifact, Keyboard, Reply};
use crate::foundation::core::SessionId;
use crate::foundation::error::{BotError, BotResult};
use crate::links::shorten::TinyUrlShortener;
use crate::media::asset::Workspace;
use crate::transport::{FileFetcher, Outbound};
use crate::worker::JobQueue;

/// [`Outbound`] and [`FileFetcher`] over one bot handle.
#[derive(Clone)]
pub struct TelegramTransport {
    bot: Bot,
}

impl TelegramTransport {
    pub fn new(bot: Bot) -> Self {
        Self { bot }
    }
}

fn reply_markup(keyboard: &Keyboard) -> ReplyMarkup {
    match keyboard.rows() {
        Some(rows) => ReplyMarkup::Keyboard(KeyboardMarkup::new(
            rows.into_iter()
                .map(|row| row.into_iter().map(KeyboardButton::new).collect::<Vec<_>>())
                .collect::<Vec<_>>(),
        )),
        None => ReplyMarkup::KeyboardRemove(KeyboardRemove::new()),
    }
}

#[async_trait]
impl Outbound for TelegramTransport {
    async fn send_reply(&self, session: SessionId, reply: &Reply) -> BotResult<()> {
        let mut request = self.bot.send_message(ChatId(session.0), reply.text.clone());
        if let Some(keyboard) = &reply.keyboard {
            request = request.reply_markup(reply_markup(keyboard));
        }
        request
            .await
            .map_err(|e| BotError::transport(format!("send_message failed: {e}")))?;
        Ok(())
    }

    async fn send_artifact(&self, session: SessionId, artifact: &Artifact) -> BotResult<()> {
        self.bot
            .send_video_note(
                ChatId(session.0),
                InputFile::file(artifact.asset.path().to_path_buf()),
            )
            .duration(artifact.duration_secs)
            .length(artifact.side)
            .await
            .map_err(|e| BotError::transport(format!("send_video_note failed: {e}")))?;
        Ok(())
    }
}

#[async_trait]
impl FileFetcher for TelegramTransport {
    async fn download(&self, attachment: &Attachment, dest: &Path) -> BotResult<()> {
        let file = self
            .bot
            .get_file(attachment.file_ref.clone())
            .await
            .map_err(|e| BotError::download_failed(format!("get_file failed: {e}")))?;
        let mut dst = tokio::fs::File::create(dest).await.map_err(|e| {
            BotError::download_failed(format!("failed to create '{}': {e}", dest.display()))
        })?;
        self.bot
            .download_file(&file.path, &mut dst)
            .await
            .map_err(|e| BotError::download_failed(format!("download failed: {e}")))?;
        debug!(path = %dest.display(), "attachment downloaded");
        Ok(())
    }
}

fn mime_of<M: std::fmt::Display>(mime: Option<&M>) -> Option<String> {
    mime.map(|m| m.to_string())
}

/// Decode a Telegram message into a dialogue event.
pub fn event_from_message(msg: &Message) -> Event {
    let MessageKind::Common(common) = &msg.kind else {
        return Event::Unsupported;
    };
    match &common.media_kind {
        MediaKind::Text(text) => Event::from_text(text.text.clone()),
        MediaKind::Photo(photo) => photo
            .photo
            .iter()
            .max_by_key(|p| u64::from(p.width) * u64::from(p.height))
            .map(|p| {
                Event::Photo(
                    Attachment::new(p.file.id.to_string())
                        .with_mime("image/jpeg")
                        .with_size(u64::from(p.file.size)),
                )
            })
            .unwrap_or(Event::Unsupported),
        MediaKind::Document(doc) => {
            let d = &doc.document;
            let mut att = Attachment::new(d.file.id.to_string()).with_size(u64::from(d.file.size));
            att.mime = mime_of(d.mime_type.as_ref());
            att.file_name = d.file_name.clone();
            Event::Document(att)
        }
        MediaKind::Audio(audio) => {
            let a = &audio.audio;
            let mut att = Attachment::new(a.file.id.to_string()).with_size(u64::from(a.file.size));
            att.mime = mime_of(a.mime_type.as_ref());
            att.file_name = a.file_name.clone();
            Event::Audio(att)
        }
        MediaKind::Voice(voice) => {
            let v = &voice.voice;
            let mut att = Attachment::new(v.file.id.to_string()).with_size(u64::from(v.file.size));
            att.mime = mime_of(v.mime_type.as_ref());
            Event::Voice(att)
        }
        MediaKind::Video(video) => {
            let v = &video.video;
            let mut att = Attachment::new(v.file.id.to_string()).with_size(u64::from(v.file.size));
            att.mime = mime_of(v.mime_type.as_ref());
            att.file_name = v.file_name.clone();
            Event::Video(att)
        }
        _ => Event::Unsupported,
    }
}

/// Wire the dialogue core to Telegram and poll until Ctrl-C.
pub async fn serve(config: BotConfig) -> BotResult<()> {
    let workspace = Workspace::new(&config.work_dir)?;

    let client = teloxide::net::default_reqwest_settings()
        .timeout(Duration::from_secs(60))
        .connect_timeout(Duration::from_secs(10))
        .build()
        .map_err(|e| BotError::transport(format!("failed to build http client: {e}")))?;
    let bot = Bot::with_client(&config.token, client);
    let transport = Arc::new(TelegramTransport::new(bot.clone()));

    let renderer: Arc<dyn NoteRenderer> =
        Arc::new(FfmpegNoteRenderer::new(config.overlay_path.clone()));
    let outbound: Arc<dyn Outbound> = transport.clone();
    let jobs = JobQueue::start(config.workers, Arc::clone(&renderer), Arc::clone(&outbound))?;
    let machine = Arc::new(SessionStateMachine::new(Collaborators {
        outbound,
        fetcher: transport,
        shortener: Arc::new(TinyUrlShortener::new(&config.shortener_endpoint)?),
        renderer,
        workspace,
        jobs: jobs.clone(),
    }));

    info!(
        work_dir = %config.work_dir.display(),
        workers = config.workers,
        "telegram transport starting"
    );

    let handler = Update::filter_message().endpoint(
        |msg: Message, machine: Arc<SessionStateMachine>| async move {
            let session_id = SessionId(msg.chat.id.0);
            let event = event_from_message(&msg);
            machine.dispatch(session_id, event).await;
            respond(())
        },
    );

    Dispatcher::builder(bot, handler)
        .dependencies(dptree::deps![machine])
        .enable_ctrlc_handler()
        .build()
        .dispatch()
        .await;

    if jobs.in_flight() > 0 {
        info!(in_flight = jobs.in_flight(), "waiting for vinyl jobs");
        jobs.wait_idle(Duration::from_secs(120)).await;
    }
    info!("telegram transport stopped");
    Ok(())
}
