use super::*;

#[test]
fn missing_video_is_unreadable() {
    let dir = tempfile::tempdir().unwrap();
    let renderer = FfmpegNoteRenderer::new(None);
    let out = dir.path().join("out.mp4");
    let err = renderer
        .render_video_note(&dir.path().join("missing.mp4"), &out)
        .unwrap_err();
    assert!(matches!(err, BotError::UnreadableMedia(_)));
    assert!(!out.exists());
}

#[test]
fn missing_audio_is_unreadable() {
    let dir = tempfile::tempdir().unwrap();
    let image = dir.path().join("cover.png");
    image::RgbaImage::from_pixel(8, 8, image::Rgba([1, 2, 3, 255]))
        .save(&image)
        .unwrap();
    let out = dir.path().join("vinyl.mp4");

    let err = FfmpegNoteRenderer::new(None)
        .render_vinyl(&image, &dir.path().join("missing.mp3"), &out)
        .unwrap_err();
    assert!(matches!(err, BotError::UnreadableMedia(_)));
    assert!(!out.exists());
}

#[test]
fn pcm_file_lives_next_to_output_and_is_removed_on_drop() {
    let dir = tempfile::tempdir().unwrap();
    let out = dir.path().join("note.mp4");
    let pcm = AudioPcm {
        sample_rate: 48_000,
        channels: 2,
        interleaved_f32: vec![0.0; 96],
    };

    let file = PcmFile::write(&out, Some(&pcm)).unwrap();
    let input = file.input().unwrap();
    assert_eq!(input.path, dir.path().join("note.mp4.f32le"));
    assert_eq!((input.sample_rate, input.channels), (48_000, 2));
    assert!(input.path.exists());
    drop(file);
    assert!(!input.path.exists());
}

#[test]
fn silent_tracks_are_not_muxed() {
    let out = Path::new("note.mp4");
    let empty = AudioPcm {
        sample_rate: 48_000,
        channels: 2,
        interleaved_f32: Vec::new(),
    };
    assert!(PcmFile::write(out, Some(&empty)).unwrap().input().is_none());
    assert!(PcmFile::write(out, None).unwrap().input().is_none());
}
