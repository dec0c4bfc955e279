//! Property tests for row text fitting.

use proptest::prelude::*;
use unicode_width::UnicodeWidthStr;

use cloudscope::ui::render::truncate;

proptest! {
    /// PROPERTY: Truncated text never exceeds the requested width.
    #[test]
    fn property_truncate_fits_width(
        text in "[a-zA-Z0-9 ._/äöü漢字日本語]{0,80}",
        max in 1usize..60,
    ) {
        let out = truncate(&text, max);
        prop_assert!(out.width() <= max, "{:?} is wider than {}", out, max);
    }

    /// PROPERTY: Text that already fits is returned unchanged.
    #[test]
    fn property_truncate_keeps_short_text(text in "[a-z0-9 ]{0,20}") {
        prop_assert_eq!(truncate(&text, 20), text);
    }
}
