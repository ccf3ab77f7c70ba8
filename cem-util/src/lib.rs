#![warn(clippy::todo, unused_qualifications)]

pub mod io;

use std::ops::{
    Bound,
    Range,
    RangeBounds,
};

pub fn format_size<T>(value: T) -> humansize::SizeFormatter<T, humansize::FormatSizeOptions>
where
    T: humansize::ToF64 + humansize::Unsigned,
{
    humansize::SizeFormatter::new(value, humansize::BINARY)
}

/// Turns any range over indices into a half-open range clamped to `len`.
///
/// The returned range is never reversed: if the end would be before the start,
/// it's empty.
pub fn normalize_index_bounds(range: impl RangeBounds<usize>, len: usize) -> Range<usize> {
    let start = match range.start_bound() {
        Bound::Included(start) => *start,
        Bound::Excluded(start) => start + 1,
        Bound::Unbounded => 0,
    };

    let end = match range.end_bound() {
        Bound::Included(end) => end + 1,
        Bound::Excluded(end) => *end,
        Bound::Unbounded => len,
    };

    let start = start.min(len);
    let end = end.min(len).max(start);

    Range { start, end }
}
