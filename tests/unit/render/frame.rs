use super::*;

#[test]
fn snapshot_is_resampled_to_canvas() {
    let img = image::RgbaImage::from_pixel(10, 7, image::Rgba([10, 20, 30, 255]));
    let canvas = Canvas::new(32, 18).unwrap();
    let snap = Snapshot::from_rgba_image(&img, canvas).unwrap();
    assert_eq!((snap.width(), snap.height()), (32, 18));
}

#[test]
fn snapshot_rejects_empty_image() {
    let img = image::RgbaImage::new(0, 0);
    assert!(Snapshot::from_rgba_image(&img, Canvas::new(4, 4).unwrap()).is_err());
}

#[test]
fn pixmap_len_must_match_dimensions() {
    assert!(pixmap_from_premul_bytes(&[0u8; 15], 2, 2).is_err());
    assert!(pixmap_from_premul_bytes(&[0u8; 16], 2, 2).is_ok());
}

#[test]
fn frame_pixel_reads_row_major() {
    let frame = Frame {
        width: 2,
        height: 2,
        data: (0u8..16).collect(),
        premultiplied: true,
    };
    assert_eq!(frame.pixel(0, 0), [0, 1, 2, 3]);
    assert_eq!(frame.pixel(1, 1), [12, 13, 14, 15]);
}
