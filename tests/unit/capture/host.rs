use super::*;

#[test]
fn normalize_view_path_rejects_escapes() {
    assert_eq!(normalize_view_path("./a//b.png").unwrap(), "a/b.png");
    assert_eq!(normalize_view_path("a\\b.png").unwrap(), "a/b.png");
    assert!(normalize_view_path("/etc/passwd").is_err());
    assert!(normalize_view_path("../x.png").is_err());
    assert!(normalize_view_path("   ").is_err());
    assert!(normalize_view_path("./.").is_err());
}

#[tokio::test]
async fn still_image_host_loads_and_captures() {
    let dir = PathBuf::from("target").join("unit_still_image_host");
    std::fs::create_dir_all(&dir).unwrap();
    image::RgbaImage::from_pixel(6, 4, image::Rgba([1, 2, 3, 255]))
        .save(dir.join("view.png"))
        .unwrap();

    let mut host = StillImageHost::new(&dir);
    assert!(host.capture().await.is_err());

    host.load("view.png").await.unwrap();
    let img = host.capture().await.unwrap();
    assert_eq!(img.dimensions(), (6, 4));
    assert_eq!(img.get_pixel(0, 0).0, [1, 2, 3, 255]);
}

#[tokio::test]
async fn still_image_host_drops_signal_for_missing_view() {
    let dir = PathBuf::from("target").join("unit_still_image_host_missing");
    std::fs::create_dir_all(&dir).unwrap();
    let mut host = StillImageHost::new(&dir);
    assert!(host.load("nope.png").await.is_err());
    assert!(host.load("../escape.png").await.is_err());
    assert!(host.capture().await.is_err());
}

#[test]
fn superseded_completion_is_ignored() {
    let mut slot = ViewSlot::default();
    let first = slot.begin();
    let second = slot.begin();

    let red = image::RgbaImage::from_pixel(1, 1, image::Rgba([255, 0, 0, 255]));
    assert!(!slot.complete(first, red));
    assert!(slot.image.is_none());

    let blue = image::RgbaImage::from_pixel(1, 1, image::Rgba([0, 0, 255, 255]));
    assert!(slot.complete(second, blue.clone()));
    let red = image::RgbaImage::from_pixel(1, 1, image::Rgba([255, 0, 0, 255]));
    assert!(!slot.complete(first, red));
    assert_eq!(slot.image, Some(blue));
}

#[tokio::test]
async fn later_load_wins_over_slow_earlier_decode() {
    let dir = PathBuf::from("target").join("unit_still_image_host_reload");
    std::fs::create_dir_all(&dir).unwrap();
    image::RgbaImage::from_pixel(1200, 900, image::Rgba([200, 0, 0, 255]))
        .save(dir.join("large.png"))
        .unwrap();
    image::RgbaImage::from_pixel(2, 2, image::Rgba([0, 0, 200, 255]))
        .save(dir.join("small.png"))
        .unwrap();

    let mut host = StillImageHost::new(&dir);
    let earlier = host.load("large.png");
    let later = host.load("small.png");
    later.await.unwrap();
    // Resolves once the earlier decode finished, whether it was superseded or not.
    let _ = earlier.await;

    let img = host.capture().await.unwrap();
    assert_eq!(img.dimensions(), (2, 2));
    assert_eq!(img.get_pixel(0, 0).0, [0, 0, 200, 255]);
}
