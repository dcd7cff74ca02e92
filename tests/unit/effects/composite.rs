use super::*;
use crate::foundation::core::PixelRect;

#[test]
fn over_opacity_0_is_noop() {
    let dst = [1, 2, 3, 4];
    let src = [200, 200, 200, 200];
    assert_eq!(over(dst, src, 0.0), dst);
}

#[test]
fn over_src_alpha_0_is_noop() {
    let dst = [10, 20, 30, 40];
    let src = [255, 255, 255, 0];
    assert_eq!(over(dst, src, 1.0), dst);
}

#[test]
fn over_src_opaque_replaces_dst() {
    let dst = [0, 0, 0, 255];
    let src = [255, 0, 0, 255];
    assert_eq!(over(dst, src, 1.0), src);
}

#[test]
fn black_fill_darkens_proportionally() {
    let mut buf = vec![200u8, 100, 50, 255, 0, 0, 0, 255];
    fill_over_in_place(&mut buf, [0, 0, 0, 255], 0.5).unwrap();
    // 0.5 opacity rounds to 128/255 coverage; channels keep 127/255 of their value.
    assert_eq!(&buf[0..4], &[100, 50, 25, 255]);
    assert_eq!(&buf[4..8], &[0, 0, 0, 255]);
}

#[test]
fn fill_rejects_partial_pixels() {
    let mut buf = vec![0u8; 6];
    assert!(fill_over_in_place(&mut buf, [0, 0, 0, 255], 0.3).is_err());
}

#[test]
fn mean_luminance_of_region() {
    // 2x1: left white, right black.
    let buf = vec![255u8, 255, 255, 255, 0, 0, 0, 255];
    let all = mean_luminance(&buf, 2, 1, PixelRect::new(0, 0, 2, 1)).unwrap();
    assert!((all - 0.5).abs() < 1e-9);
    let left = mean_luminance(&buf, 2, 1, PixelRect::new(0, 0, 1, 1)).unwrap();
    assert!((left - 1.0).abs() < 1e-9);
    assert!(mean_luminance(&buf, 2, 1, PixelRect::new(5, 5, 1, 1)).is_none());
}
