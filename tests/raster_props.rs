//! Property tests for the bar rasterizer.

use progline::raster::{percent_text, Cells, PLAIN_END, PLAIN_START};
use progline::render_bar;
use proptest::prelude::*;

proptest! {
    #[test]
    fn visual_width_is_constant(width in 1usize..200, percent in 0.0f64..=100.0) {
        let cells = Cells::compute(percent, width).unwrap();
        prop_assert_eq!(cells.full + usize::from(cells.remainder > 0) + cells.spaces, width);

        let bar = render_bar(percent, width, false);
        let inner = bar
            .strip_prefix(PLAIN_START)
            .and_then(|b| b.strip_suffix(PLAIN_END))
            .unwrap();
        prop_assert_eq!(inner.chars().count(), width);
    }

    #[test]
    fn filling_is_monotonic(width in 1usize..100, a in 0.0f64..=100.0, b in 0.0f64..=100.0) {
        let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
        let lo = Cells::compute(lo, width).unwrap();
        let hi = Cells::compute(hi, width).unwrap();
        prop_assert!(lo.full * 8 + lo.remainder <= hi.full * 8 + hi.remainder);
    }

    #[test]
    fn out_of_range_renders_nothing(percent in prop_oneof![-1e9f64..-1e-9, 100.000_001f64..1e9]) {
        prop_assert_eq!(render_bar(percent, 10, true), "");
        prop_assert_eq!(percent_text(percent), "");
    }
}

#[test]
fn bounds() {
    for width in 1..=64 {
        let empty = Cells::compute(0.0, width).unwrap();
        assert_eq!((empty.full, empty.remainder), (0, 0));
        let full = Cells::compute(100.0, width).unwrap();
        assert_eq!((full.full, full.remainder, full.spaces), (width, 0, 0));
    }
}
