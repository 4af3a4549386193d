use super::*;

#[test]
fn blank_or_absent_token_is_configuration_missing() {
    for token in [None, Some(String::new()), Some("   ".to_string())] {
        let err = BotConfig::resolve(token, None, None, 2, None).unwrap_err();
        assert!(matches!(err, BotError::ConfigurationMissing(_)));
        assert!(!err.is_recoverable());
    }
}

#[test]
fn defaults_fill_in() {
    let cfg = BotConfig::resolve(Some(" 123:abc ".into()), None, None, 2, Some(" ".into())).unwrap();
    assert_eq!(cfg.token, "123:abc");
    assert_eq!(cfg.work_dir, default_work_dir());
    assert_eq!(cfg.overlay_path.as_deref(), Some(std::path::Path::new(DEFAULT_OVERLAY)));
    assert_eq!(cfg.shortener_endpoint, TINYURL_ENDPOINT);
}

#[test]
fn zero_workers_is_rejected() {
    let err = BotConfig::resolve(Some("t".into()), None, None, 0, None).unwrap_err();
    assert!(matches!(err, BotError::Validation(_)));
}
