use super::*;

fn canvas() -> Canvas {
    Canvas::new(64, 36).unwrap()
}

#[test]
fn template_requires_out_placeholder() {
    let dir = PathBuf::from("target").join("unit_command_host_template");
    assert!(CommandHost::new("", &dir, canvas()).is_err());
    assert!(CommandHost::new("shot {view}", &dir, canvas()).is_err());
    assert!(CommandHost::new("shot {view} {out}", &dir, canvas()).is_ok());
}

#[test]
fn expands_placeholders() {
    let dir = PathBuf::from("target").join("unit_command_host_expand");
    let host = CommandHost::new(
        "browser --size={width},{height} --shot={out} {view}",
        &dir,
        canvas(),
    )
    .unwrap();
    let args = host.expand("https://app.local/#/reports", std::path::Path::new("o.png"));
    assert_eq!(
        args,
        vec![
            "--size=64,36".to_string(),
            "--shot=o.png".to_string(),
            "https://app.local/#/reports".to_string(),
        ]
    );
}

#[cfg(unix)]
#[tokio::test]
async fn copies_screenshot_and_signals_ready() {
    let dir = PathBuf::from("target").join("unit_command_host_cp");
    std::fs::create_dir_all(&dir).unwrap();
    let src = dir.join("source.png");
    image::RgbaImage::from_pixel(5, 5, image::Rgba([9, 8, 7, 255]))
        .save(&src)
        .unwrap();

    let mut host = CommandHost::new("cp {view} {out}", dir.join("work"), canvas()).unwrap();
    host.load(&src.to_string_lossy()).await.unwrap();
    let img = host.capture().await.unwrap();
    assert_eq!(img.get_pixel(2, 2).0, [9, 8, 7, 255]);

    // A failing command drops the readiness sender.
    assert!(host.load("/no/such/file.png").await.is_err());
    assert!(host.capture().await.is_err());
}
