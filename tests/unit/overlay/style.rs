use super::*;

#[test]
fn defaults_validate_and_match_documented_values() {
    let s = OverlayStyle::default();
    s.validate().unwrap();
    assert_eq!(s.canvas_size, 1080);
    assert_eq!(s.position, Position::Center);
    assert_eq!(s.backdrop, Backdrop::Blurred);
    assert_eq!(s.text_color, Rgba8::WHITE);
    assert!((s.base_size() - 64.8).abs() < 1e-3);
    assert!(s.active_footer().is_none());
}

#[test]
fn partial_json_merges_over_defaults() {
    let s: OverlayStyle = serde_json::from_str(
        r##"{
            "font_size": 46,
            "max_width_pct": 0.8,
            "position": "bottom",
            "text_color": "#ffcc00",
            "backdrop": { "solid": "#101010" },
            "footer": { "text": "@daily.quotes" }
        }"##,
    )
    .unwrap();
    assert_eq!(s.base_font_size, Some(46.0));
    assert_eq!(s.max_width_fraction, 0.8);
    assert_eq!(s.position, Position::Bottom);
    assert_eq!(s.text_color, Rgba8::rgb(0xff, 0xcc, 0x00));
    assert_eq!(s.backdrop, Backdrop::Solid(Rgba8::rgb(0x10, 0x10, 0x10)));
    let footer = s.active_footer().unwrap();
    assert_eq!(footer.corner, FooterCorner::BottomRight);
    assert_eq!(footer.margin, 28);
    assert_eq!(s.padding, 40);
    s.validate().unwrap();
}

#[test]
fn blank_footer_text_is_inactive() {
    let s = OverlayStyle {
        footer: Some(FooterStyle {
            text: "   ".to_string(),
            ..FooterStyle::default()
        }),
        ..OverlayStyle::default()
    };
    assert!(s.active_footer().is_none());
}

#[test]
fn validation_rejects_out_of_range_values() {
    let bad = [
        OverlayStyle {
            canvas_size: 0,
            ..OverlayStyle::default()
        },
        OverlayStyle {
            min_font_size: 130.0,
            ..OverlayStyle::default()
        },
        OverlayStyle {
            font_step: 0.0,
            ..OverlayStyle::default()
        },
        OverlayStyle {
            box_opacity: 1.5,
            ..OverlayStyle::default()
        },
        OverlayStyle {
            max_width_fraction: f64::NAN,
            ..OverlayStyle::default()
        },
        OverlayStyle {
            min_height_fraction: 0.9,
            ..OverlayStyle::default()
        },
        OverlayStyle {
            base_font_size: Some(-3.0),
            ..OverlayStyle::default()
        },
        OverlayStyle {
            canvas_size: 70_000,
            ..OverlayStyle::default()
        },
    ];
    for s in bad {
        assert!(matches!(s.validate().unwrap_err(), QuoteframeError::Validation(_)));
    }
}

#[test]
fn unknown_fields_are_rejected() {
    assert!(serde_json::from_str::<OverlayStyle>(r##"{"colour": "#fff"}"##).is_err());
}
