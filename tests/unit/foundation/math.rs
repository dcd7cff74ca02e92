use super::*;

#[test]
fn fnv_hash_is_stable_and_incremental() {
    let mut a = Fnv1a64::new_default();
    a.write_bytes(b"https://img.example/a.jpg");
    let mut b = Fnv1a64::new_default();
    b.write_bytes(b"https://img.example/");
    b.write_bytes(b"a.jpg");
    assert_eq!(a.finish(), b.finish());
    assert_eq!(a.finish(), fnv1a64(b"https://img.example/a.jpg"));
    assert_ne!(fnv1a64(b"a"), fnv1a64(b"b"));
}

#[test]
fn fnv_empty_input_is_offset_basis() {
    assert_eq!(fnv1a64(b""), Fnv1a64::OFFSET_BASIS);
}

#[test]
fn mul_div255_rounds() {
    assert_eq!(mul_div255(255, 255), 255);
    assert_eq!(mul_div255(0, 255), 0);
    assert_eq!(mul_div255(128, 255), 128);
    assert_eq!(mul_div255(255, 128), 128);
}

#[test]
fn opacity_u8_clamps() {
    assert_eq!(opacity_u8(-1.0), 0);
    assert_eq!(opacity_u8(0.5), 128);
    assert_eq!(opacity_u8(7.0), 255);
}
