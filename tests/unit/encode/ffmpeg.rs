use super::*;

fn cfg(width: u32, height: u32) -> SinkConfig {
    SinkConfig {
        width,
        height,
        fps: Fps::whole(24),
        audio: None,
    }
}

#[test]
fn default_profile_is_24fps_h264_aac_500k() {
    let profile = EncodeProfile::default();
    assert_eq!(profile.fps, Fps::whole(24));
    assert_eq!(profile.video_codec, "libx264");
    assert_eq!(profile.audio_codec, "aac");
    assert_eq!(profile.video_bitrate_kbps, 500);
}

#[test]
fn partial_path_sits_next_to_output() {
    assert_eq!(
        partial_path_for(Path::new("/w/1-note-ab.mp4")),
        PathBuf::from("/w/1-note-ab.mp4.partial")
    );
}

#[test]
fn begin_rejects_odd_or_zero_dimensions() {
    let dir = tempfile::tempdir().unwrap();
    let out = dir.path().join("out.mp4");

    let mut sink = FfmpegSink::new(&out, EncodeProfile::default());
    assert!(matches!(sink.begin(cfg(241, 240)), Err(BotError::Validation(_))));
    assert!(matches!(sink.begin(cfg(0, 240)), Err(BotError::Validation(_))));
    drop(sink);
    assert!(!out.exists());
}

#[test]
fn push_before_begin_is_an_encode_failure() {
    let mut sink = FfmpegSink::new("unused.mp4", EncodeProfile::default());
    let frame = FrameRGBA::solid(2, 2, [0, 0, 0, 255]);
    assert!(matches!(
        sink.push_frame(FrameIndex(0), &frame),
        Err(BotError::EncodeFailed(_))
    ));
    assert!(matches!(sink.end(), Err(BotError::EncodeFailed(_))));
}

#[test]
fn flatten_straight_over_black_produces_expected_rgb() {
    let src = vec![255u8, 0, 0, 128];
    let mut dst = vec![0u8; 4];
    flatten_to_opaque_rgba8(&mut dst, &src, [0, 0, 0, 255]).unwrap();
    assert_eq!(dst, vec![128, 0, 0, 255]);
}

#[test]
fn flatten_opaque_is_identity() {
    let src = vec![1u8, 2, 3, 255];
    let mut dst = vec![0u8; 4];
    flatten_to_opaque_rgba8(&mut dst, &src, [10, 20, 30, 255]).unwrap();
    assert_eq!(dst, src);
}
