//! Red/black coloring of workers for deadlock-free neighbor exchange.
//!
//! Workers form a chain `0 - 1 - ... - (p-1)`, which is two-colorable by
//! rank parity. Red workers talk to their left neighbor first, black
//! workers to their right neighbor first, so adjacent workers always reach
//! the shared exchange in the same step.

use crate::domain::Side;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Color {
    /// Even rank.
    Red,
    /// Odd rank.
    Black,
}

impl Color {
    pub fn of_rank(rank: usize) -> Self {
        if rank % 2 == 0 { Color::Red } else { Color::Black }
    }

    /// Order in which a worker of this color visits its two neighbors.
    pub fn exchange_order(self) -> [Side; 2] {
        match self {
            Color::Red => [Side::Left, Side::Right],
            Color::Black => [Side::Right, Side::Left],
        }
    }
}
