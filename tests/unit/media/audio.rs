use super::*;

fn stereo(frames: usize, sample_rate: u32) -> AudioPcm {
    AudioPcm {
        sample_rate,
        channels: 2,
        interleaved_f32: (0..frames * 2).map(|i| i as f32 * 0.001).collect(),
    }
}

#[test]
fn duration_follows_frame_count() {
    let pcm = stereo(96, 48);
    assert_eq!(pcm.frames(), 96);
    assert!((pcm.duration_secs() - 2.0).abs() < 1e-12);
    assert!(!pcm.is_empty());
}

#[test]
fn truncate_caps_duration() {
    let mut pcm = stereo(48 * 90, 48);
    pcm.truncate_secs(60.0);
    assert_eq!(pcm.frames(), 48 * 60);
    assert!(pcm.duration_secs() <= 60.0);

    let mut short = stereo(10, 48);
    short.truncate_secs(60.0);
    assert_eq!(short.frames(), 10);
}

#[test]
fn f32le_round_trips_through_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("a.f32le");
    let pcm = stereo(4, 4);
    write_pcm_f32le(&pcm, &path).unwrap();
    let bytes = std::fs::read(&path).unwrap();
    assert_eq!(bytes.len(), 8 * 4);
    assert_eq!(f32le_bytes_to_samples(&bytes).unwrap(), pcm.interleaved_f32);
}

#[test]
fn misaligned_pcm_is_unreadable() {
    assert!(matches!(
        f32le_bytes_to_samples(&[0, 1, 2]),
        Err(BotError::UnreadableMedia(_))
    ));
}

#[test]
fn pad_extends_short_tracks_with_silence() {
    let mut pcm = stereo(48, 48);
    pcm.pad_to_secs(4.0);
    assert_eq!(pcm.frames(), 48 * 4);
    assert!((pcm.duration_secs() - 4.0).abs() < 1e-12);
    assert_eq!(pcm.interleaved_f32[95], 95.0 * 0.001);
    assert!(pcm.interleaved_f32[96..].iter().all(|s| *s == 0.0));

    let mut long = stereo(48 * 5, 48);
    long.pad_to_secs(4.0);
    assert_eq!(long.frames(), 48 * 5);
}
