use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;

use super::*;
use crate::compose::compositor::NoteInfo;
use crate::compose::notes::NoteRenderer;
use crate::dialog::event::{Attachment, CUSTOM_VALUE};
use crate::dialog::reply::{Artifact, Outgoing};
use crate::foundation::core::SessionId;
use crate::foundation::error::{BotError, BotResult};
use crate::links::shorten::Shortener;
use crate::media::asset::Workspace;
use crate::transport::{FileFetcher, Outbound};
use crate::worker::JobQueue;

#[derive(Default)]
struct Inbox {
    replies: std::sync::Mutex<Vec<String>>,
}

#[async_trait]
impl Outbound for Inbox {
    async fn send_reply(&self, _: SessionId, reply: &Reply) -> BotResult<()> {
        self.replies.lock().unwrap().push(reply.text.clone());
        Ok(())
    }

    async fn send_artifact(&self, _: SessionId, _: &Artifact) -> BotResult<()> {
        Ok(())
    }
}

#[derive(Default)]
struct CountingFetcher {
    calls: AtomicUsize,
}

#[async_trait]
impl FileFetcher for CountingFetcher {
    async fn download(&self, _: &Attachment, _: &Path) -> BotResult<()> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Err(BotError::download_failed("offline"))
    }
}

struct FixedShortener(Option<&'static str>);

#[async_trait]
impl Shortener for FixedShortener {
    async fn shorten(&self, _: &str) -> BotResult<String> {
        match self.0 {
            Some(short) => Ok(short.to_string()),
            None => Err(BotError::shorten_failed("quota exceeded")),
        }
    }
}

struct NoRenderer;

impl NoteRenderer for NoRenderer {
    fn render_video_note(&self, _: &Path, _: &Path) -> BotResult<NoteInfo> {
        Err(BotError::encode_failed("not in tests"))
    }

    fn render_vinyl(&self, _: &Path, _: &Path, _: &Path) -> BotResult<NoteInfo> {
        Err(BotError::encode_failed("not in tests"))
    }
}

struct Harness {
    deps: Collaborators,
    fetcher: Arc<CountingFetcher>,
    inbox: Arc<Inbox>,
    _dir: tempfile::TempDir,
}

fn harness(short: Option<&'static str>) -> Harness {
    let dir = tempfile::tempdir().unwrap();
    let inbox = Arc::new(Inbox::default());
    let outbound: Arc<dyn Outbound> = inbox.clone();
    let renderer: Arc<dyn NoteRenderer> = Arc::new(NoRenderer);
    let fetcher = Arc::new(CountingFetcher::default());
    let deps = Collaborators {
        outbound: Arc::clone(&outbound),
        fetcher: fetcher.clone(),
        shortener: Arc::new(FixedShortener(short)),
        renderer: Arc::clone(&renderer),
        workspace: Workspace::new(dir.path()).unwrap(),
        jobs: JobQueue::start(1, renderer, outbound).unwrap(),
    };
    Harness {
        deps,
        fetcher,
        inbox,
        _dir: dir,
    }
}

fn session_in(state: DialogState) -> Session {
    let mut session = Session::new(SessionId(42));
    session.state = state;
    session
}

const ALL_STATES: [DialogState; 11] = [
    DialogState::Choosing,
    DialogState::AwaitingUrl,
    DialogState::AwaitingVideo,
    DialogState::AwaitingVinylImage,
    DialogState::AwaitingVinylAudio,
    DialogState::AwaitingUtmUrl,
    DialogState::AwaitingUtmSourceChoice,
    DialogState::AwaitingUtmSource,
    DialogState::AwaitingUtmCampaignChoice,
    DialogState::AwaitingUtmCampaign,
    DialogState::Stopped,
];

#[test]
fn reprompt_keeps_state_with_exactly_one_reply() {
    for state in ALL_STATES {
        let t = reprompt(&session_in(state));
        assert_eq!(t.next(), state);
        assert_eq!(t.reply_texts().len(), 1, "{state:?}");
        assert!(t.updates.is_empty());
    }
}

#[test]
fn campaign_reprompt_shows_the_suggestion_again() {
    let mut session = session_in(DialogState::AwaitingUtmCampaignChoice);
    session.scratch.suggested_campaign = Some("spring".into());
    let t = reprompt(&session);
    let Outgoing::Reply(reply) = &t.outgoing[0] else {
        panic!("expected a text reply");
    };
    assert_eq!(reply.keyboard, Some(Keyboard::Campaign("spring".into())));
}

#[tokio::test]
async fn unrecognized_input_reprompts_in_every_state() {
    let h = harness(Some("https://t.co/x"));
    for state in ALL_STATES {
        for event in [Event::Unsupported, Event::Command(Command::Unknown("x".into()))] {
            let t = route(&h.deps, &session_in(state), event).await;
            assert_eq!(t.next(), state);
            assert_eq!(t.reply_texts().len(), 1);
        }
    }
    assert_eq!(h.fetcher.calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn start_resets_from_any_state() {
    let h = harness(None);
    for state in ALL_STATES {
        let t = route(&h.deps, &session_in(state), Event::Command(Command::Start)).await;
        assert_eq!(t.next(), DialogState::Choosing);
        assert_eq!(t.reply_texts(), vec!["Welcome! Choose an option:"]);
    }
}

#[tokio::test]
async fn stopped_session_only_answers_start() {
    let h = harness(None);
    let stopped = session_in(DialogState::Stopped);
    for event in [
        Event::Text("🔗".into()),
        Event::Command(Command::Menu),
        Event::Command(Command::Cancel),
    ] {
        let t = route(&h.deps, &stopped, event).await;
        assert_eq!(t.next(), DialogState::Stopped);
        assert_eq!(t.reply_texts(), vec![STOPPED_TEXT]);
    }
}

#[tokio::test]
async fn menu_reports_state_without_moving() {
    let h = harness(None);
    let t = route(
        &h.deps,
        &session_in(DialogState::AwaitingUtmSource),
        Event::Command(Command::Menu),
    )
    .await;
    assert_eq!(t.next(), DialogState::AwaitingUtmSource);
    let text = t.reply_texts()[0];
    assert!(text.contains("Current State: Waiting for UTM Source"));
    assert!(text.contains("/cancel - Cancel current operation"));
}

#[tokio::test]
async fn cancel_clears_only_the_current_flow() {
    let h = harness(None);
    let t = route(
        &h.deps,
        &session_in(DialogState::AwaitingVinylAudio),
        Event::Command(Command::Cancel),
    )
    .await;
    assert_eq!(t.next(), DialogState::Choosing);
    assert!(matches!(
        t.updates.as_slice(),
        [ScratchUpdate::ClearFlow(Flow::Vinyl)]
    ));
}

#[tokio::test]
async fn stop_button_behaves_like_stop_command() {
    let h = harness(None);
    let by_button = route(&h.deps, &session_in(DialogState::Choosing), Event::Text("🛑".into())).await;
    let by_command = route(
        &h.deps,
        &session_in(DialogState::AwaitingUrl),
        Event::Command(Command::Stop),
    )
    .await;
    assert_eq!(by_button.next(), DialogState::Stopped);
    assert_eq!(by_command.next(), DialogState::Stopped);
    assert_eq!(by_button.reply_texts(), by_command.reply_texts());
}

#[tokio::test]
async fn menu_selection_enters_flow_and_clears_stale_scratch() {
    let h = harness(None);
    let t = route(&h.deps, &session_in(DialogState::Choosing), Event::Text("🔗 UTM".into())).await;
    assert_eq!(t.next(), DialogState::AwaitingUtmUrl);
    assert!(matches!(
        t.updates.as_slice(),
        [ScratchUpdate::ClearFlow(Flow::Utm)]
    ));
}

#[tokio::test]
async fn shortening_failure_is_reported_and_returns_to_menu() {
    let h = harness(None);
    let t = route(
        &h.deps,
        &session_in(DialogState::AwaitingUrl),
        Event::Text("https://example.com/long".into()),
    )
    .await;
    assert_eq!(t.next(), DialogState::Choosing);
    assert_eq!(
        t.reply_texts(),
        vec!["Error: shorten failed: quota exceeded", "What next?"]
    );
}

#[tokio::test]
async fn utm_url_without_scheme_is_rejected() {
    let h = harness(None);
    let t = route(
        &h.deps,
        &session_in(DialogState::AwaitingUtmUrl),
        Event::Text("example.com/p".into()),
    )
    .await;
    assert_eq!(t.next(), DialogState::AwaitingUtmUrl);
    assert!(t.updates.is_empty());
}

#[tokio::test]
async fn custom_source_is_lowercased_and_offers_campaign_from_path() {
    let h = harness(None);
    let mut session = session_in(DialogState::AwaitingUtmSourceChoice);
    session.scratch.utm_url = Some("https://x.com/blog/spring-sale/".into());

    let t = route(&h.deps, &session, Event::Text(CUSTOM_VALUE.into())).await;
    assert_eq!(t.next(), DialogState::AwaitingUtmSource);

    session.state = DialogState::AwaitingUtmSource;
    let t = route(&h.deps, &session, Event::Text("Newsletter".into())).await;
    assert_eq!(t.next(), DialogState::AwaitingUtmCampaignChoice);
    assert!(matches!(
        t.updates.as_slice(),
        [
            ScratchUpdate::UtmSource(source),
            ScratchUpdate::SuggestedCampaign(Some(campaign)),
        ] if source == "newsletter" && campaign == "spring-sale"
    ));
}

#[tokio::test]
async fn url_without_path_skips_the_campaign_choice() {
    let h = harness(None);
    let mut session = session_in(DialogState::AwaitingUtmSourceChoice);
    session.scratch.utm_url = Some("https://x.com".into());
    let t = route(&h.deps, &session, Event::Text("Google".into())).await;
    assert_eq!(t.next(), DialogState::AwaitingUtmCampaign);
}

#[tokio::test]
async fn finished_utm_flow_reports_both_urls() {
    let h = harness(Some("https://tinyurl.com/abc"));
    let mut session = session_in(DialogState::AwaitingUtmCampaign);
    session.scratch.utm_url = Some("https://x.com/p?a=1".into());
    session.scratch.utm_source = Some("google".into());

    let t = route(&h.deps, &session, Event::Text("spring".into())).await;
    assert_eq!(t.next(), DialogState::Choosing);
    let texts = t.reply_texts();
    assert!(texts[0].contains("https://x.com/p?a=1&utm_source=google&utm_campaign=spring&utm_medium=smm"));
    assert!(texts[0].contains("https://tinyurl.com/abc"));
    assert_eq!(texts[1], "What next?");
    assert!(matches!(
        t.updates.as_slice(),
        [ScratchUpdate::ClearFlow(Flow::Utm)]
    ));
}

#[tokio::test]
async fn non_audio_document_is_reprompted_without_download() {
    let h = harness(None);
    let doc = Attachment::new("doc").with_mime("application/pdf");
    let t = route(
        &h.deps,
        &session_in(DialogState::AwaitingVinylAudio),
        Event::Document(doc),
    )
    .await;
    assert_eq!(t.next(), DialogState::AwaitingVinylAudio);
    assert_eq!(
        t.reply_texts(),
        vec!["Please send a valid audio file (MP3, WAV, etc.)"]
    );
    assert_eq!(h.fetcher.calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn oversized_video_is_refused_before_download() {
    let h = harness(None);
    let video = Attachment::new("v").with_size(video::MAX_UPLOAD_BYTES + 1);
    let t = route(&h.deps, &session_in(DialogState::AwaitingVideo), Event::Video(video)).await;
    assert_eq!(t.next(), DialogState::AwaitingVideo);
    assert_eq!(t.reply_texts().len(), 1);
    assert_eq!(h.fetcher.calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn failed_download_returns_to_menu() {
    let h = harness(None);
    let video = Attachment::new("v").with_mime("video/mp4").with_size(1024);
    let t = route(
        &h.deps,
        &session_in(DialogState::AwaitingVideo),
        Event::Document(video),
    )
    .await;
    assert_eq!(t.next(), DialogState::Choosing);
    assert_eq!(
        t.reply_texts(),
        vec!["Processing failed: download failed: offline"]
    );
    assert_eq!(h.fetcher.calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn vinyl_notice_goes_out_before_the_audio_download() {
    let h = harness(None);
    let audio = Attachment::new("song").with_mime("audio/mpeg").with_size(4096);
    let t = route(
        &h.deps,
        &session_in(DialogState::AwaitingVinylAudio),
        Event::Audio(audio),
    )
    .await;
    assert_eq!(h.fetcher.calls.load(Ordering::SeqCst), 1);
    assert_eq!(
        *h.inbox.replies.lock().unwrap(),
        vec!["🎵 Processing vinyl... This may take a moment!".to_string()]
    );
    assert_eq!(t.next(), DialogState::Choosing);
    assert_eq!(
        t.reply_texts().first().copied(),
        Some("Error processing audio: download failed: offline")
    );
}
