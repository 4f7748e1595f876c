use rand::seq::SliceRandom;
use rand::Rng;

use super::lines::{LineMask, CELLS, LINES};
use super::tier::{triangular, MAX_TIER};

pub const MAX_EXTRA_CELLS: usize = 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Grid {
    marked: u16,
    tiers: [u8; CELLS],
    lines: LineMask,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct GridHit {
    pub cell: usize,
    pub cell_tier: u8,
    pub cleared: LineMask,
    pub line_points: u32,
    pub extra_cells: [Option<usize>; MAX_EXTRA_CELLS],
    pub tier_up: Option<u8>,
}

impl GridHit {
    pub fn x_clear(&self) -> bool {
        self.cleared.is_x_clear()
    }
}

impl Grid {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn at_tier(tier: u8) -> Self {
        Self {
            marked: 0,
            tiers: [tier.min(MAX_TIER); CELLS],
            lines: LineMask::empty(),
        }
    }

    pub fn from_bits(marked: u16, tiers: u32, lines: u8) -> Self {
        let mut grid = Self {
            marked: marked & 0x01FF,
            tiers: [0; CELLS],
            lines: LineMask::from_bits_truncate(lines),
        };
        for (i, tier) in grid.tiers.iter_mut().enumerate() {
            *tier = ((tiers >> (i * 3)) & 0b111) as u8;
        }
        grid
    }

    pub fn marked_bits(&self) -> u16 {
        self.marked
    }

    pub fn tier_bits(&self) -> u32 {
        self.tiers
            .iter()
            .enumerate()
            .fold(0u32, |acc, (i, &tier)| acc | ((tier as u32 & 0b111) << (i * 3)))
    }

    pub fn completed_lines(&self) -> LineMask {
        self.lines
    }

    pub fn is_marked(&self, cell: usize) -> bool {
        self.marked & (1 << cell) != 0
    }

    pub fn tier(&self, cell: usize) -> u8 {
        self.tiers[cell]
    }

    pub fn tiers(&self) -> &[u8; CELLS] {
        &self.tiers
    }

    pub fn min_tier(&self) -> u8 {
        self.tiers.iter().copied().min().unwrap_or(0)
    }

    pub fn marked_count(&self) -> u32 {
        self.marked.count_ones()
    }

    fn mark(&mut self, cell: usize) {
        self.marked |= 1 << cell;
    }

    fn unmark(&mut self, cell: usize) {
        self.marked &= !(1 << cell);
    }

    fn upgrade_to(&mut self, cell: usize, tier: u8) {
        let tier = tier.min(MAX_TIER);
        if self.tiers[cell] < tier {
            self.tiers[cell] = tier;
        }
    }

    fn full_lines(&self) -> LineMask {
        LINES
            .iter()
            .filter(|line| line.cells.iter().all(|&c| self.is_marked(c)))
            .fold(LineMask::empty(), |acc, line| acc | line.flag)
    }

    pub fn resolve_hit<R: Rng>(&self, cell: usize, rng: &mut R) -> (Grid, GridHit) {
        let mut next = *self;
        let mut hit = GridHit {
            cell,
            cell_tier: self.tiers[cell],
            ..Default::default()
        };

        next.mark(cell);
        let cleared = next.full_lines();
        if cleared.is_empty() {
            return (next, hit);
        }

        let min = self.min_tier();
        let target = min.saturating_add(1);
        hit.cleared = cleared;

        for line in cleared.lines() {
            hit.line_points += triangular(min as u32 + line.kind.tier_offset());
            for &c in &line.cells {
                next.unmark(c);
                if next.tiers[c] == min {
                    next.upgrade_to(c, target);
                }
            }
        }
        next.lines |= cleared;

        if cleared.line_count() >= 2 {
            let candidates: Vec<usize> = (0..CELLS)
                .filter(|&c| !next.is_marked(c) && next.tiers[c] == min)
                .collect();
            for (slot, &c) in hit
                .extra_cells
                .iter_mut()
                .zip(candidates.choose_multiple(rng, MAX_EXTRA_CELLS))
            {
                next.upgrade_to(c, target);
                *slot = Some(c);
            }
        }

        if cleared.is_x_clear() {
            for c in 0..CELLS {
                next.upgrade_to(c, target);
            }
        }

        let new_min = next.min_tier();
        if new_min > min {
            next = Grid::at_tier(new_min);
            hit.tier_up = Some(new_min);
        }

        (next, hit)
    }
}
