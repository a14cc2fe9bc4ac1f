//! # Page Break Decisions
//!
//! Whether a finished row still fits on the current page. Rows are
//! unbreakable: a row either lands whole on this page or moves whole to the
//! next one.

/// What to do with a row that has just been built.
#[derive(Debug, Clone, PartialEq)]
pub enum RowDecision {
    /// Commit the row to the current page.
    Place,
    /// Close the current page; the row becomes the first row of the next.
    MoveToNextPage,
}

/// Decide whether a row of height `row_extent` fits below the rows already
/// on the page.
///
/// `used` is the extent already consumed by `rows_on_page` rows. A page's
/// first row is always placed, even if it is taller than the page, so an
/// over-tall tag cannot stall pagination.
pub fn decide_row(
    used: f64,
    rows_on_page: usize,
    row_extent: f64,
    gap: f64,
    available: f64,
) -> RowDecision {
    if rows_on_page == 0 {
        return RowDecision::Place;
    }

    if used + gap + row_extent > available {
        return RowDecision::MoveToNextPage;
    }

    RowDecision::Place
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn row_that_fits_is_placed() {
        assert_eq!(decide_row(7.5, 1, 7.5, 0.6, 27.7), RowDecision::Place);
    }

    #[test]
    fn row_past_the_bottom_moves() {
        // 23.7 + 0.6 + 7.5 = 31.8 > 27.7
        assert_eq!(
            decide_row(23.7, 3, 7.5, 0.6, 27.7),
            RowDecision::MoveToNextPage
        );
    }

    #[test]
    fn gap_counts_against_the_page() {
        // Fits without the gap, not with it.
        assert_eq!(
            decide_row(10.0, 1, 10.0, 0.5, 20.0),
            RowDecision::MoveToNextPage
        );
    }

    #[test]
    fn first_row_is_always_placed() {
        assert_eq!(decide_row(0.0, 0, 500.0, 0.6, 27.7), RowDecision::Place);
    }
}
