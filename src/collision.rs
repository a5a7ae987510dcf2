use crate::{Cell, SIZE};

/// Whether `a` lies inside the `SIZE`-sided square anchored at `b`.
///
/// Half-open on both axes and deliberately asymmetric: `overlaps(a, b)` is not
/// always `overlaps(b, a)` for cells that are not grid-aligned.
pub fn overlaps(a: Cell, b: Cell) -> bool {
    a.0 >= b.0 && a.0 < b.0 + SIZE && a.1 >= b.1 && a.1 < b.1 + SIZE
}
