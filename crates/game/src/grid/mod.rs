mod board;
mod lines;
mod tier;

pub use board::{Grid, GridHit, MAX_EXTRA_CELLS};
pub use lines::{shares_row_or_column, Line, LineKind, LineMask, CELLS, LINES};
pub use tier::{cell_for_shot, cell_points, triangular, MAX_TIER};
