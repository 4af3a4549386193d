use super::*;

#[test]
fn display_prefixes_are_stable() {
    assert!(
        BotError::invalid_input("x")
            .to_string()
            .contains("invalid input:")
    );
    assert!(
        BotError::download_failed("x")
            .to_string()
            .contains("download failed:")
    );
    assert!(
        BotError::unreadable_media("x")
            .to_string()
            .contains("unreadable media:")
    );
    assert!(BotError::empty_media("x").to_string().contains("empty media:"));
    assert!(
        BotError::encode_failed("x")
            .to_string()
            .contains("encode failed:")
    );
    assert!(
        BotError::shorten_failed("x")
            .to_string()
            .contains("shorten failed:")
    );
    assert!(
        BotError::url_build_failed("x")
            .to_string()
            .contains("url build failed:")
    );
    assert!(
        BotError::validation("x")
            .to_string()
            .contains("validation error:")
    );
}

#[test]
fn other_preserves_source() {
    let base = std::io::Error::other("boom");
    let err = BotError::Other(anyhow::Error::new(base));
    assert!(err.to_string().contains("boom"));
}

#[test]
fn only_missing_configuration_is_fatal() {
    assert!(!BotError::configuration_missing("TELEGRAM_BOT_TOKEN").is_recoverable());
    assert!(BotError::encode_failed("x").is_recoverable());
    assert!(BotError::download_failed("x").is_recoverable());
    assert!(BotError::invalid_input("x").is_recoverable());
}
