use super::*;

#[test]
fn rect_edges_and_center() {
    let r = PixelRect::new(10, 20, 100, 50);
    assert_eq!(r.right(), 110);
    assert_eq!(r.bottom(), 70);
    assert_eq!(r.center_x(), 60.0);
    assert_eq!(r.center_y(), 45.0);
}

#[test]
fn rect_clamp_and_inflate() {
    let r = PixelRect::new(-5, 90, 30, 30).clamp_to(100, 100);
    assert_eq!(r, PixelRect::new(0, 90, 25, 10));

    let r = PixelRect::new(10, 10, 5, 5).inflate(3);
    assert_eq!(r, PixelRect::new(7, 7, 11, 11));

    assert!(PixelRect::new(200, 200, 10, 10).clamp_to(100, 100).is_empty());
}

#[test]
fn hex_parse_variants() {
    assert_eq!(Rgba8::parse_hex("#ffffff").unwrap(), Rgba8::WHITE);
    assert_eq!(
        Rgba8::parse_hex("00FF0080").unwrap(),
        Rgba8::rgba(0, 255, 0, 128)
    );
    assert!(Rgba8::parse_hex("#fff").is_err());
    assert!(Rgba8::parse_hex("#gg0000").is_err());
}

#[test]
fn color_serde_accepts_hex_and_arrays() {
    let c: Rgba8 = serde_json::from_str("\"#102030\"").unwrap();
    assert_eq!(c, Rgba8::rgb(0x10, 0x20, 0x30));
    let c: Rgba8 = serde_json::from_str("[1, 2, 3, 4]").unwrap();
    assert_eq!(c, Rgba8::rgba(1, 2, 3, 4));
    assert!(serde_json::from_str::<Rgba8>("[1, 2]").is_err());
    assert_eq!(serde_json::to_string(&Rgba8::BLACK).unwrap(), "\"#000000ff\"");
}

#[test]
fn luminance_extremes() {
    assert_eq!(Rgba8::BLACK.luminance(), 0.0);
    assert!((Rgba8::WHITE.luminance() - 1.0).abs() < 1e-9);
    assert!(Rgba8::rgb(0, 255, 0).luminance() > Rgba8::rgb(0, 0, 255).luminance());
}

#[test]
fn with_opacity_scales_alpha_only() {
    let c = Rgba8::WHITE.with_opacity(0.5);
    assert_eq!((c.r, c.g, c.b), (255, 255, 255));
    assert_eq!(c.a, 128);
}
