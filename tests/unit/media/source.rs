use super::*;

fn write_png(dir: &Path, name: &str, w: u32, h: u32, rgba: [u8; 4]) -> std::path::PathBuf {
    let path = dir.join(name);
    let img = image::RgbaImage::from_pixel(w, h, image::Rgba(rgba));
    img.save(&path).unwrap();
    path
}

#[test]
fn still_image_is_static_and_opaque() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_png(dir.path(), "half.png", 6, 4, [10, 20, 30, 40]);

    let mut still = StillImage::open(&path, 2.0).unwrap();
    assert!(still.is_static());
    assert_eq!((still.width(), still.height()), (6, 4));

    let frame = still.frame_at(0.0).unwrap().unwrap();
    assert_eq!(frame.pixel(3, 2), [10, 20, 30, 255]);
    assert_eq!(still.frame_at(1.9).unwrap().unwrap(), frame);
    assert!(still.frame_at(2.0).unwrap().is_none());
}

#[test]
fn format_is_sniffed_from_content() {
    let dir = tempfile::tempdir().unwrap();
    let png = write_png(dir.path(), "cover.png", 3, 5, [0, 0, 0, 255]);
    let misnamed = dir.path().join("cover.jpg");
    std::fs::rename(&png, &misnamed).unwrap();

    assert_eq!(StillImage::probe_dimensions(&misnamed).unwrap(), (3, 5));
    assert!(StillImage::open(&misnamed, 1.0).is_ok());
}

#[test]
fn garbage_image_is_unreadable() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("broken.jpg");
    std::fs::write(&path, b"definitely not an image").unwrap();

    assert!(matches!(
        StillImage::open(&path, 1.0),
        Err(BotError::UnreadableMedia(_))
    ));
    assert!(matches!(
        StillImage::probe_dimensions(&path),
        Err(BotError::UnreadableMedia(_))
    ));
    assert!(matches!(
        StillImage::open(&dir.path().join("missing.png"), 1.0),
        Err(BotError::UnreadableMedia(_))
    ));
}

#[test]
fn video_stream_rejects_zero_duration() {
    let info = VideoInfo {
        source_path: "in.mp4".into(),
        width: 4,
        height: 4,
        fps_num: 24,
        fps_den: 1,
        duration_sec: 5.0,
        has_audio: false,
    };
    assert!(matches!(
        VideoStream::open(info, Fps::whole(24), 0.0),
        Err(BotError::EmptyMedia(_))
    ));
}
