use super::*;

const PROBE_800X600: &str = r#"{
  "streams": [
    {"codec_type": "video", "width": 800, "height": 600, "r_frame_rate": "30000/1001"},
    {"codec_type": "audio"}
  ],
  "format": {"duration": "75.250000"}
}"#;

#[test]
fn parses_dimensions_rate_duration_and_audio() {
    let info = parse_probe_json(Path::new("in.mp4"), PROBE_800X600.as_bytes()).unwrap();
    assert_eq!((info.width, info.height), (800, 600));
    assert_eq!(info.square_side(), 600);
    assert!((info.source_fps() - 29.97).abs() < 0.01);
    assert!((info.duration_sec - 75.25).abs() < 1e-9);
    assert!(info.has_audio);
}

#[test]
fn falls_back_to_stream_duration() {
    let json = r#"{"streams":[{"codec_type":"video","width":4,"height":4,"duration":"2.5"}]}"#;
    let info = parse_probe_json(Path::new("in.mp4"), json.as_bytes()).unwrap();
    assert!((info.duration_sec - 2.5).abs() < 1e-9);
    assert!(!info.has_audio);
    assert_eq!(info.source_fps(), 0.0);
}

#[test]
fn missing_video_stream_is_unreadable() {
    let json = r#"{"streams":[{"codec_type":"audio"}],"format":{"duration":"3"}}"#;
    let err = parse_probe_json(Path::new("a.mp3"), json.as_bytes()).unwrap_err();
    assert!(matches!(err, BotError::UnreadableMedia(_)));

    let err = parse_probe_json(Path::new("x"), b"not json").unwrap_err();
    assert!(matches!(err, BotError::UnreadableMedia(_)));
}

#[test]
fn zero_duration_or_dimensions_is_empty() {
    let json = r#"{"streams":[{"codec_type":"video","width":0,"height":10}],"format":{"duration":"3"}}"#;
    let err = parse_probe_json(Path::new("x"), json.as_bytes()).unwrap_err();
    assert!(matches!(err, BotError::EmptyMedia(_)));

    let json = r#"{"streams":[{"codec_type":"video","width":10,"height":10}],"format":{"duration":"0.0"}}"#;
    let err = parse_probe_json(Path::new("x"), json.as_bytes()).unwrap_err();
    assert!(matches!(err, BotError::EmptyMedia(_)));
}

#[test]
fn ratio_parsing_rejects_zero_denominator() {
    assert_eq!(parse_ff_ratio("24/1"), Some((24, 1)));
    assert_eq!(parse_ff_ratio("24/0"), None);
    assert_eq!(parse_ff_ratio("abc"), None);
}

#[test]
fn quarter_turn_rotation_swaps_display_dimensions() {
    let json = r#"{"streams":[{"codec_type":"video","width":1920,"height":1080,
        "side_data_list":[{"rotation":-90}]}],"format":{"duration":"4"}}"#;
    let info = parse_probe_json(Path::new("x"), json.as_bytes()).unwrap();
    assert_eq!((info.width, info.height), (1080, 1920));

    let json = r#"{"streams":[{"codec_type":"video","width":1920,"height":1080,
        "tags":{"rotate":"180"}}],"format":{"duration":"4"}}"#;
    let info = parse_probe_json(Path::new("x"), json.as_bytes()).unwrap();
    assert_eq!((info.width, info.height), (1920, 1080));
}
