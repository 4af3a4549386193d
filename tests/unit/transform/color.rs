use super::*;

#[test]
fn primaries_and_grays_round_trip() {
    assert_eq!(rgb_to_hsv(255, 0, 0), [0, 255, 255]);
    assert_eq!(hsv_to_rgb(0, 255, 255), [255, 0, 0]);
    assert_eq!(rgb_to_hsv(100, 100, 100), [0, 0, 100]);
    assert_eq!(hsv_to_rgb(0, 0, 100), [100, 100, 100]);
}

#[test]
fn value_is_the_max_channel() {
    let [_, s, v] = rgb_to_hsv(10, 200, 40);
    assert_eq!(v, 200);
    assert!(s > 200);
}

#[test]
fn round_trip_stays_close() {
    for &(r, g, b) in &[(12u8, 200u8, 40u8), (250, 120, 3), (33, 44, 180), (90, 10, 200)] {
        let [h, s, v] = rgb_to_hsv(r, g, b);
        let back = hsv_to_rgb(h, s, v);
        for (got, want) in back.iter().zip([r, g, b]) {
            assert!(
                (i32::from(*got) - i32::from(want)).abs() <= 6,
                "{back:?} vs {:?}",
                (r, g, b)
            );
        }
    }
}

#[test]
fn luma_uses_fixed_point_weights() {
    assert_eq!(luma(0, 0, 0), 0);
    assert_eq!(luma(255, 255, 255), 255);
    assert_eq!(luma(200, 200, 200), 200);
    assert_eq!(luma(255, 0, 0), 76);
}

#[test]
fn contrast_leaves_uniform_images_alone() {
    let mut px = [90u8, 90, 90, 255].repeat(4);
    enhance_contrast(&mut px, 1.02);
    assert_eq!(px, [90u8, 90, 90, 255].repeat(4));
}

#[test]
fn contrast_pushes_away_from_mean() {
    let mut px = vec![0u8, 0, 0, 255, 200, 200, 200, 17];
    enhance_contrast(&mut px, 1.02);
    assert_eq!(&px[..4], &[0, 0, 0, 255]);
    assert!((201..=202).contains(&px[4]));
    assert_eq!(px[7], 17);
}
