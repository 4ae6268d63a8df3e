//! Property-based tests for color parsing, contrast math and the manager
//!
//! These check invariants that must hold for any input rather than for a
//! handful of hand-picked colors.

use std::sync::Arc;

use proptest::prelude::*;

use contrastsync_core::{
    contrast_ratio, is_valid_color, Color, ColorConfig, ColorManager, Host, MemoryLocation,
    MemoryStore, WcagStatus,
};

// ============================================================================
// Strategies
// ============================================================================

fn arb_color() -> impl Strategy<Value = Color> {
    (any::<u8>(), any::<u8>(), any::<u8>()).prop_map(|(r, g, b)| Color::from_rgb(r, g, b))
}

/// Hex spellings of a color, in either case, with or without alpha
fn arb_hex_input() -> impl Strategy<Value = (Color, String)> {
    (arb_color(), any::<bool>(), any::<bool>()).prop_map(|(color, upper, alpha)| {
        let mut text = color.to_hex();
        if alpha {
            text.push_str("ff");
        }
        if upper {
            text = text.to_uppercase();
        }
        (color, text)
    })
}

/// Non-hex spellings the parser accepts: functional notation and names
fn arb_css_input() -> impl Strategy<Value = String> {
    prop_oneof![
        (any::<u8>(), any::<u8>(), any::<u8>())
            .prop_map(|(r, g, b)| format!("rgb({r}, {g}, {b})")),
        (any::<u8>(), any::<u8>(), any::<u8>(), 0.0f64..=1.0)
            .prop_map(|(r, g, b, a)| format!("rgba({r},{g},{b},{a:.2})")),
        prop::sample::select(vec![
            "red", "navy", "ivory", "gold", "rebeccapurple", "slategray", "WHITE", "Teal",
        ])
        .prop_map(String::from),
    ]
}

/// Strings made only of punctuation, which no color syntax accepts
fn arb_garbage() -> impl Strategy<Value = String> {
    "[!@$%^&*~|;:<>?]{0,12}"
}

fn headless_manager() -> ColorManager {
    let host = Host::headless()
        .with_storage(Arc::new(MemoryStore::new()))
        .with_location(Arc::new(MemoryLocation::new()));
    ColorManager::new(host, ColorConfig::default())
}

// ============================================================================
// Contrast Properties
// ============================================================================

proptest! {
    /// Contrast does not depend on which color is the foreground
    #[test]
    fn prop_contrast_is_symmetric(a in arb_color(), b in arb_color()) {
        let forward = contrast_ratio(&a, &b);
        let backward = contrast_ratio(&b, &a);
        prop_assert!((forward - backward).abs() < 1e-12);
    }

    /// Ratios live in [1, 21], and a color against itself is exactly 1
    #[test]
    fn prop_contrast_is_bounded(a in arb_color(), b in arb_color()) {
        let ratio = contrast_ratio(&a, &b);
        prop_assert!((1.0..=21.0 + 1e-9).contains(&ratio));
        prop_assert!((contrast_ratio(&a, &a) - 1.0).abs() < 1e-12);
    }

    /// Reported ratio is the true ratio rounded to one decimal
    #[test]
    fn prop_status_ratio_is_rounded(a in arb_color(), b in arb_color()) {
        let ratio = contrast_ratio(&a, &b);
        let status = WcagStatus::from_ratio(ratio);

        prop_assert!((status.ratio - ratio).abs() <= 0.05 + 1e-9);
        prop_assert!(((status.ratio * 10.0).round() - status.ratio * 10.0).abs() < 1e-9);
    }

    /// Stricter levels imply the looser ones
    #[test]
    fn prop_status_levels_are_nested(ratio in 1.0f64..21.0) {
        let status = WcagStatus::from_ratio(ratio);

        prop_assert_eq!(status.normal_aa, ratio >= 4.5);
        prop_assert_eq!(status.normal_aaa, ratio >= 7.0);
        prop_assert_eq!(status.large_aa, ratio >= 3.0);
        prop_assert_eq!(status.large_aaa, ratio >= 4.5);

        if status.normal_aaa {
            prop_assert!(status.normal_aa);
        }
        if status.normal_aa {
            prop_assert!(status.large_aa && status.large_aaa);
        }
    }
}

// ============================================================================
// Manager Properties
// ============================================================================

proptest! {
    /// Any hex spelling is accepted and stored normalized
    #[test]
    fn prop_setter_normalizes_hex((color, text) in arb_hex_input()) {
        let manager = headless_manager();

        prop_assert!(is_valid_color(&text));
        prop_assert!(manager.set_foreground_color(&text));
        prop_assert_eq!(manager.foreground_color(), color);
        prop_assert_eq!(manager.foreground_color().to_hex(), color.to_hex());
    }

    /// Any accepted spelling is stored exactly as the parser normalizes it
    #[test]
    fn prop_setter_normalizes_css_input(text in arb_css_input()) {
        let manager = headless_manager();
        let expected = Color::parse(&text).unwrap();

        prop_assert!(is_valid_color(&text));
        prop_assert!(manager.set_background_color(&text));
        prop_assert_eq!(manager.background_color().to_hex(), expected.to_hex());
    }

    /// Rejected input never disturbs the pair
    #[test]
    fn prop_invalid_input_changes_nothing(
        (_, fg) in arb_hex_input(),
        garbage in arb_garbage(),
    ) {
        let manager = headless_manager();
        prop_assert!(manager.set_foreground_color(&fg));
        let before = manager.pair();

        prop_assert!(!manager.set_foreground_color(&garbage));
        prop_assert!(!manager.set_background_color(&garbage));
        prop_assert_eq!(manager.pair(), before);
    }

    /// Swapping twice restores the pair and keeps the ratio throughout
    #[test]
    fn prop_swap_is_an_involution(fg in arb_color(), bg in arb_color()) {
        let manager = headless_manager();
        manager.set_foreground_color(&fg.to_hex());
        manager.set_background_color(&bg.to_hex());
        let before = manager.state();

        let swapped = manager.swap_colors();
        prop_assert_eq!(swapped.foreground_color, bg);
        prop_assert_eq!(swapped.background_color, fg);
        prop_assert!((swapped.contrast_ratio - before.contrast_ratio).abs() < 1e-12);

        let restored = manager.swap_colors();
        prop_assert_eq!(restored, before);
    }

    /// State snapshots always agree with the contrast math
    #[test]
    fn prop_state_matches_pair(fg in arb_color(), bg in arb_color()) {
        let manager = headless_manager();
        manager.set_foreground_color(&fg.to_hex());
        manager.set_background_color(&bg.to_hex());

        let state = manager.state();
        prop_assert_eq!(state.contrast_ratio, contrast_ratio(&fg, &bg));
        prop_assert_eq!(state.wcag_status, WcagStatus::from_ratio(state.contrast_ratio));
    }
}
