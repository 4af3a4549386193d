use super::*;

fn pairs(url: &str) -> Vec<(String, String)> {
    Url::parse(url)
        .unwrap()
        .query_pairs()
        .map(|(k, v)| (k.into_owned(), v.into_owned()))
        .collect()
}

#[test]
fn utm_tags_are_appended_after_existing_pairs() {
    let built = build_utm_url("https://x.com/p?a=1", "google", "spring").unwrap();
    assert!(built.contains("a=1"));
    assert!(built.contains("utm_source=google"));
    assert!(built.contains("utm_campaign=spring"));
    assert!(built.contains("utm_medium=smm"));

    let expected: Vec<(String, String)> = [
        ("a", "1"),
        ("utm_source", "google"),
        ("utm_campaign", "spring"),
        ("utm_medium", "smm"),
    ]
    .iter()
    .map(|(k, v)| (k.to_string(), v.to_string()))
    .collect();
    assert_eq!(pairs(&built), expected);
}

#[test]
fn earlier_utm_tags_are_overridden_not_duplicated() {
    let built = build_utm_url(
        "https://x.com/p?utm_source=old&b=2&utm_medium=email",
        "vk",
        "launch",
    )
    .unwrap();
    let got = pairs(&built);
    assert_eq!(got.iter().filter(|(k, _)| k == "utm_source").count(), 1);
    assert_eq!(got.iter().filter(|(k, _)| k == "utm_medium").count(), 1);
    assert!(got.contains(&("b".to_string(), "2".to_string())));
    assert!(got.contains(&("utm_source".to_string(), "vk".to_string())));
    assert!(got.contains(&("utm_medium".to_string(), "smm".to_string())));
}

#[test]
fn values_are_percent_encoded() {
    let built = build_utm_url("https://x.com/", "news letter", "a&b").unwrap();
    let got = pairs(&built);
    assert!(got.contains(&("utm_source".to_string(), "news letter".to_string())));
    assert!(got.contains(&("utm_campaign".to_string(), "a&b".to_string())));
}

#[test]
fn path_and_fragment_survive() {
    let built = build_utm_url("https://x.com/a/b#top", "google", "c").unwrap();
    let url = Url::parse(&built).unwrap();
    assert_eq!(url.path(), "/a/b");
    assert_eq!(url.fragment(), Some("top"));
}

#[test]
fn unparseable_base_is_a_build_failure() {
    assert!(matches!(
        build_utm_url("http://", "google", "c"),
        Err(BotError::UrlBuildFailed(_))
    ));
    assert!(matches!(
        build_utm_url("not a url", "google", "c"),
        Err(BotError::UrlBuildFailed(_))
    ));
}

#[test]
fn campaign_suggestion_uses_last_path_segment() {
    assert_eq!(
        suggest_campaign("https://shop.com/sales/spring/").as_deref(),
        Some("spring")
    );
    assert_eq!(
        suggest_campaign("https://shop.com/p?x=1").as_deref(),
        Some("p")
    );
    assert_eq!(suggest_campaign("https://shop.com/"), None);
    assert_eq!(suggest_campaign("https://shop.com"), None);
    assert_eq!(suggest_campaign("https://"), None);
}

#[test]
fn only_http_schemes_are_accepted() {
    assert!(has_supported_scheme("https://x.com"));
    assert!(has_supported_scheme("http://x.com"));
    assert!(!has_supported_scheme("ftp://x.com"));
    assert!(!has_supported_scheme("x.com"));
}
