//! roundnote is a chat bot that guides each user through a few short tasks and, for two of them,
//! turns uploads into square "video notes".
//!
//! # Overview
//!
//! - **Dialogue**: a per-session state machine ([`SessionStateMachine`]) routes decoded
//!   [`Event`]s to task handlers and applies the [`Transition`] they return.
//! - **Media**: a [`VisualSource`] is streamed through a [`FramePipeline`] (crop, resize, overlay
//!   blend, rotation) and a [`Compositor`] pushes the frames plus audio into a [`FrameSink`].
//!   [`FfmpegSink`] encodes through the system `ffmpeg` binary.
//! - **Links**: URL shortening through a [`Shortener`] and UTM tagging with [`UtmParameters`].
//! - **Transport**: [`Outbound`] and [`FileFetcher`] abstract the chat service; the Telegram
//!   implementation lives behind [`serve`].
#![forbid(unsafe_code)]

mod compose;
mod config;
mod dialog;
mod encode;
mod foundation;
mod links;
mod media;
mod transform;
mod transport;
mod worker;

pub use crate::foundation::core::{Fps, FrameIndex, FrameRGBA, SessionId};
pub use crate::foundation::error::{BotError, BotResult};

pub use crate::media::asset::{AssetKind, MediaAsset, Workspace, extension_hint};
pub use crate::media::audio::{AudioPcm, MIX_SAMPLE_RATE, decode_audio_f32_stereo};
pub use crate::media::probe::{VideoInfo, is_ffmpeg_on_path, is_ffprobe_on_path, probe_video};
pub use crate::media::source::{StillImage, VideoStream, VisualSource};

pub use crate::transform::crop::CenterCropSquare;
pub use crate::transform::overlay::{OVERLAY_CONTRAST, OVERLAY_STRENGTH, OverlayBlend};
pub use crate::transform::resize::{ResizeSquare, VINYL_SIDE, video_note_side};
pub use crate::transform::rotate::{DEGREES_PER_SECOND, Spin, rotate_nearest, rotation_angle_deg};
pub use crate::transform::{FramePipeline, FrameStage, PreparedFrame};

pub use crate::encode::ffmpeg::{EncodeProfile, FfmpegSink};
pub use crate::encode::sink::{AudioInputConfig, FrameSink, InMemorySink, SinkConfig};

pub use crate::compose::compositor::{Compositor, MAX_NOTE_DURATION_SECS, NoteInfo};
pub use crate::compose::notes::{FfmpegNoteRenderer, NoteRenderer};

pub use crate::links::shorten::{Shortener, TINYURL_ENDPOINT, TinyUrlShortener};
pub use crate::links::utm::{
    UTM_MEDIUM, UtmParameters, build_utm_url, has_supported_scheme, suggest_campaign,
};

pub use crate::dialog::event::{
    Attachment, CUSTOM_VALUE, CampaignChoice, Command, Event, MenuChoice, SourceChoice,
};
pub use crate::dialog::handlers::video::MAX_UPLOAD_BYTES;
pub use crate::dialog::machine::{Collaborators, SessionStateMachine};
pub use crate::dialog::reply::{Artifact, Keyboard, Outgoing, Reply};
pub use crate::dialog::session::{Scratch, Session, Transition};
pub use crate::dialog::state::{DialogState, Flow};

pub use crate::config::{BotConfig, DEFAULT_OVERLAY, DEFAULT_WORKERS, default_work_dir};
pub use crate::transport::telegram::{TelegramTransport, event_from_message, serve};
pub use crate::transport::{FileFetcher, Outbound};
pub use crate::worker::{JobQueue, VinylJob};
