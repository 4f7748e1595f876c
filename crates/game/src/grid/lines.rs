use bitflags::bitflags;

pub const CELLS: usize = 9;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineKind {
    Row,
    Column,
    Diagonal,
}

impl LineKind {
    pub fn tier_offset(self) -> u32 {
        match self {
            LineKind::Row => 2,
            LineKind::Column => 3,
            LineKind::Diagonal => 4,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Line {
    pub cells: [usize; 3],
    pub kind: LineKind,
    pub flag: LineMask,
}

pub const LINES: [Line; 8] = [
    Line { cells: [0, 1, 2], kind: LineKind::Row, flag: LineMask::ROW_0 },
    Line { cells: [3, 4, 5], kind: LineKind::Row, flag: LineMask::ROW_1 },
    Line { cells: [6, 7, 8], kind: LineKind::Row, flag: LineMask::ROW_2 },
    Line { cells: [0, 3, 6], kind: LineKind::Column, flag: LineMask::COL_0 },
    Line { cells: [1, 4, 7], kind: LineKind::Column, flag: LineMask::COL_1 },
    Line { cells: [2, 5, 8], kind: LineKind::Column, flag: LineMask::COL_2 },
    Line { cells: [0, 4, 8], kind: LineKind::Diagonal, flag: LineMask::DIAG_MAIN },
    Line { cells: [2, 4, 6], kind: LineKind::Diagonal, flag: LineMask::DIAG_ANTI },
];

bitflags! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct LineMask: u8 {
        const ROW_0 = 1 << 0;
        const ROW_1 = 1 << 1;
        const ROW_2 = 1 << 2;
        const COL_0 = 1 << 3;
        const COL_1 = 1 << 4;
        const COL_2 = 1 << 5;
        const DIAG_MAIN = 1 << 6;
        const DIAG_ANTI = 1 << 7;
        const DIAGONALS = Self::DIAG_MAIN.bits() | Self::DIAG_ANTI.bits();
    }
}

impl LineMask {
    pub fn line_count(self) -> u32 {
        self.bits().count_ones()
    }

    pub fn is_x_clear(self) -> bool {
        self.contains(LineMask::DIAGONALS)
    }

    pub fn lines(self) -> impl Iterator<Item = &'static Line> {
        LINES.iter().filter(move |line| self.contains(line.flag))
    }

    pub fn touches(self, cell: usize) -> bool {
        self.lines().any(|line| line.cells.contains(&cell))
    }
}

pub fn shares_row_or_column(a: usize, b: usize) -> bool {
    a / 3 == b / 3 || a % 3 == b % 3
}
