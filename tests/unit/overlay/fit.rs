use super::*;

fn search() -> FitSearch {
    FitSearch::new(24.0, 120.0, 2.0).unwrap()
}

// Block height grows linearly with size: h = size * k.
fn linear(k: f64, limits: FitLimits) -> (impl FnMut(f32) -> QuoteframeResult<f64>, impl Fn(&f64) -> FitClass) {
    (
        move |s: f32| Ok(f64::from(s) * k),
        move |h: &f64| limits.classify(0.0, *h),
    )
}

fn limits(min_height: f64, max_height: f64) -> FitLimits {
    FitLimits {
        max_width: f64::INFINITY,
        max_height,
        min_height,
    }
}

#[test]
fn word_count_factor_tiers() {
    assert_eq!(word_count_factor(0), 1.25);
    assert_eq!(word_count_factor(8), 1.25);
    assert_eq!(word_count_factor(9), 1.1);
    assert_eq!(word_count_factor(16), 1.1);
    assert_eq!(word_count_factor(30), 1.0);
    assert_eq!(word_count_factor(31), 0.9);
}

#[test]
fn seed_is_snapped_and_clamped() {
    let s = search();
    // 64.8 * 1.25 = 81 -> grid point 80 or 82 from 24 with step 2.
    let seed = s.seed(64.8, 8);
    assert!(seed == 80.0 || seed == 82.0);
    assert_eq!((seed - 24.0) % 2.0, 0.0);
    assert_eq!(s.seed(500.0, 3), 120.0);
    assert_eq!(s.seed(1.0, 100), 24.0);
}

#[test]
fn fitting_seed_is_kept() {
    let (layout, classify) = linear(2.0, limits(50.0, 300.0));
    let r = search().run(60.0, layout, classify).unwrap();
    assert_eq!(r.size, 60.0);
    assert_eq!(r.outcome, FitOutcome::Fitted);
    assert_eq!(r.iterations, 1);
}

#[test]
fn overflow_shrinks_until_it_fits() {
    let (layout, classify) = linear(10.0, limits(0.0, 500.0));
    let r = search().run(80.0, layout, classify).unwrap();
    assert_eq!(r.size, 50.0);
    assert_eq!(r.outcome, FitOutcome::Fitted);
    assert_eq!(r.iterations, 16);
}

#[test]
fn overflow_at_floor_is_reported() {
    let (layout, classify) = linear(100.0, limits(0.0, 500.0));
    let r = search().run(40.0, layout, classify).unwrap();
    assert_eq!(r.size, 24.0);
    assert_eq!(r.outcome, FitOutcome::AtFloor);
}

#[test]
fn shrinking_into_the_under_band_is_not_fitted() {
    // Rewrap at 60px: above it the block is too wide, below it the block is too short.
    let limits = FitLimits {
        max_width: 100.0,
        max_height: 1000.0,
        min_height: 200.0,
    };
    let layout = |s: f32| Ok((if s > 60.0 { 150.0 } else { 90.0 }, f64::from(s)));
    let classify = move |b: &(f64, f64)| limits.classify(b.0, b.1);
    let r = search().run(80.0, layout, classify).unwrap();
    assert_eq!(r.size, 60.0);
    assert_eq!(r.outcome, FitOutcome::ShrunkUnder);
    assert!(!r.outcome.is_fitted());
    assert_eq!(r.iterations, 11);
}

#[test]
fn under_grows_until_it_fits() {
    let (layout, classify) = linear(1.0, limits(70.0, 500.0));
    let r = search().run(40.0, layout, classify).unwrap();
    assert_eq!(r.size, 70.0);
    assert_eq!(r.outcome, FitOutcome::Fitted);
}

#[test]
fn under_at_ceiling_is_reported() {
    let (layout, classify) = linear(0.1, limits(70.0, 500.0));
    let r = search().run(100.0, layout, classify).unwrap();
    assert_eq!(r.size, 120.0);
    assert_eq!(r.outcome, FitOutcome::AtCeiling);
}

#[test]
fn growth_stops_before_overflow() {
    // Width jumps past the limit at 50px (a rewrap), height never reaches the minimum.
    let limits = FitLimits {
        max_width: 100.0,
        max_height: 1000.0,
        min_height: 900.0,
    };
    let layout = |s: f32| Ok((if s >= 50.0 { 150.0 } else { 90.0 }, f64::from(s)));
    let classify = move |b: &(f64, f64)| limits.classify(b.0, b.1);
    let r = search().run(40.0, layout, classify).unwrap();
    assert_eq!(r.size, 48.0);
    assert_eq!(r.outcome, FitOutcome::GrowthCapped);
    assert_eq!(r.layout.0, 90.0);
}

#[test]
fn never_exceeds_the_iteration_bound() {
    let s = search();
    assert_eq!(s.max_iterations(), 50);
    for k in [0.01, 0.5, 1.0, 3.0, 50.0, 1000.0] {
        for seed in [24.0, 37.0, 80.0, 120.0] {
            let (layout, classify) = linear(k, limits(100.0, 200.0));
            let r = s.run(seed, layout, classify).unwrap();
            assert!(r.iterations <= s.max_iterations());
            assert!((24.0..=120.0).contains(&r.size));
        }
    }
}

#[test]
fn layout_errors_propagate() {
    let r = search().run(
        40.0,
        |_| Err::<f64, _>(QuoteframeError::validation("boom")),
        |_| FitClass::Fits,
    );
    assert!(r.is_err());
}

#[test]
fn invalid_search_parameters() {
    assert!(FitSearch::new(0.0, 10.0, 1.0).is_err());
    assert!(FitSearch::new(20.0, 10.0, 1.0).is_err());
    assert!(FitSearch::new(10.0, 20.0, 0.0).is_err());
}

#[test]
fn wrap_is_greedy_and_splits_long_words() {
    assert_eq!(
        wrap_words("the quick brown fox jumps over", 10),
        vec!["the quick", "brown fox", "jumps over"]
    );
    assert_eq!(wrap_words("  spaced\t\nout  ", 20), vec!["spaced out"]);
    assert_eq!(wrap_words("abcdefghij k", 4), vec!["abcd", "efgh", "ij k"]);
    assert!(wrap_words("   ", 10).is_empty());
}

#[test]
fn wrap_lines_respect_width() {
    let text = "Every morning is a fresh page waiting for the ink of your courage and patience";
    for width in [5, 12, 20, 40] {
        for line in wrap_words(text, width) {
            assert!(line.chars().count() <= width, "{line:?} > {width}");
        }
    }
}
