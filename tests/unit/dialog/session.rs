use super::*;
use crate::dialog::reply::Keyboard;
use crate::media::asset::{AssetKind, Workspace};

#[test]
fn new_session_starts_at_menu_with_empty_scratch() {
    let session = Session::new(SessionId(7));
    assert_eq!(session.state, DialogState::Choosing);
    assert!(session.scratch.is_empty());
}

#[test]
fn clear_flow_only_touches_that_flow() {
    let dir = tempfile::tempdir().unwrap();
    let ws = Workspace::new(dir.path()).unwrap();
    let mut scratch = Scratch::default();
    scratch.apply(ScratchUpdate::UtmUrl("https://x.com/p".into()));
    scratch.apply(ScratchUpdate::UtmSource("google".into()));
    scratch.apply(ScratchUpdate::SuggestedCampaign(Some("p".into())));
    scratch.apply(ScratchUpdate::VinylImage(ws.reserve(
        SessionId(1),
        AssetKind::Image,
        None,
        None,
    )));
    assert_eq!(
        scratch.keys(),
        vec!["utm_url", "utm_source", "suggested_campaign", "vinyl_image"]
    );

    scratch.apply(ScratchUpdate::ClearFlow(Flow::Utm));
    assert_eq!(scratch.keys(), vec!["vinyl_image"]);
    scratch.clear_flow(Flow::Shorten);
    assert_eq!(scratch.keys(), vec!["vinyl_image"]);
    scratch.clear_flow(Flow::Vinyl);
    assert!(scratch.is_empty());
}

#[test]
fn dropping_scratch_image_removes_its_file() {
    let dir = tempfile::tempdir().unwrap();
    let ws = Workspace::new(dir.path()).unwrap();
    let image = ws.reserve(SessionId(1), AssetKind::Image, Some("png"), None);
    std::fs::write(image.path(), b"png").unwrap();
    let path = image.path().to_path_buf();

    let mut scratch = Scratch::default();
    scratch.apply(ScratchUpdate::VinylImage(image));
    assert!(path.exists());
    scratch.clear();
    assert!(!path.exists());
}

#[test]
fn suggested_campaign_update_can_clear_the_value() {
    let mut scratch = Scratch::default();
    scratch.apply(ScratchUpdate::SuggestedCampaign(Some("spring".into())));
    scratch.apply(ScratchUpdate::SuggestedCampaign(None));
    assert!(scratch.suggested_campaign.is_none());
}

#[test]
fn transition_keeps_outgoing_order() {
    let t = Transition::to(DialogState::Choosing)
        .reply(Reply::text("one"))
        .reply(Reply::text("two").with_keyboard(Keyboard::Main));
    assert_eq!(t.next(), DialogState::Choosing);
    assert_eq!(t.reply_texts(), vec!["one", "two"]);
    assert!(t.updates.is_empty());
    assert!(t.effects.is_empty());
}
