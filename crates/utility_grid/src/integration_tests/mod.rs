//! Integration tests driving both networks through the `TestGrid` harness:
//! placement, ticking, component write-back and published events together.

mod pool_event_tests;

use crate::test_harness::TestGrid;

/// 64x64 map with four player slots.
pub(crate) fn small_grid() -> TestGrid {
    TestGrid::with_size(64, 64, 4)
}
