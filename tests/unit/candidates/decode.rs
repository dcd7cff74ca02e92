use std::io::Cursor;

use super::*;

fn png_bytes(img: image::RgbaImage) -> Vec<u8> {
    let mut buf = Vec::new();
    image::DynamicImage::ImageRgba8(img)
        .write_to(&mut Cursor::new(&mut buf), image::ImageFormat::Png)
        .unwrap();
    buf
}

#[test]
fn decode_png_dimensions_and_channels() {
    let img = image::RgbaImage::from_raw(2, 1, vec![100, 50, 200, 255, 1, 2, 3, 128]).unwrap();
    let bytes = png_bytes(img);

    let rgb = decode_rgb(&bytes).unwrap();
    assert_eq!(rgb.dimensions(), (2, 1));
    assert_eq!(rgb.get_pixel(0, 0).0, [100, 50, 200]);

    let rgba = decode_rgba(&bytes).unwrap();
    assert_eq!(rgba.get_pixel(1, 0).0, [1, 2, 3, 128]);
}

#[test]
fn garbage_and_empty_payloads_are_fetch_errors() {
    let err = decode_rgb(b"<html>not an image</html>").unwrap_err();
    assert!(matches!(err, QuoteframeError::Fetch(_)));
    let err = decode_rgb(&[]).unwrap_err();
    assert!(matches!(err, QuoteframeError::Fetch(_)));
    assert!(decode_rgba(&[]).is_err());
}
