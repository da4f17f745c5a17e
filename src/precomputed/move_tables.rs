use crate::prelude::*;

/// Per-square attack masks. Built at compile time and never mutated.
#[derive(Debug)]
pub struct MoveTables {
    pub knight_moves: [BitBoard; 64],
    pub king_moves: [BitBoard; 64],
    pub white_pawn_attacks: [BitBoard; 64],
    pub black_pawn_attacks: [BitBoard; 64],

    /// Rays on an empty board, indexed by [`Direction::index`] then origin square.
    /// The origin itself is never part of its ray.
    pub rays: [[BitBoard; 64]; 8],
}

pub const MOVE_TABLES: MoveTables = MoveTables::new();

impl Default for MoveTables {
    fn default() -> Self {
        Self::new()
    }
}

impl MoveTables {
    pub const fn new() -> Self {
        let mut tables = Self {
            knight_moves: [BitBoard(0); 64],
            king_moves: [BitBoard(0); 64],
            white_pawn_attacks: [BitBoard(0); 64],
            black_pawn_attacks: [BitBoard(0); 64],
            rays: [[BitBoard(0); 64]; 8],
        };

        tables.init_knight_moves();
        tables.init_king_moves();
        tables.init_pawn_tables();
        tables.init_ray_attacks();

        tables
    }

    const fn init_knight_moves(&mut self) {
        let knight_offsets: [(i8, i8); 8] = [
            (2, 1),
            (2, -1),
            (-2, 1),
            (-2, -1),
            (1, 2),
            (1, -2),
            (-1, 2),
            (-1, -2),
        ];

        let mut index = 0;
        while index < 64 {
            self.knight_moves[index] = Self::offsets_mask(index, &knight_offsets);
            index += 1;
        }
    }

    const fn init_king_moves(&mut self) {
        let king_offsets: [(i8, i8); 8] = [
            (1, 0),
            (-1, 0),
            (0, 1),
            (0, -1),
            (1, 1),
            (1, -1),
            (-1, 1),
            (-1, -1),
        ];

        let mut index = 0;
        while index < 64 {
            self.king_moves[index] = Self::offsets_mask(index, &king_offsets);
            index += 1;
        }
    }

    const fn init_pawn_tables(&mut self) {
        let white: [(i8, i8); 2] = [(1, -1), (1, 1)];
        let black: [(i8, i8); 2] = [(-1, -1), (-1, 1)];

        let mut index = 0;
        while index < 64 {
            self.white_pawn_attacks[index] = Self::offsets_mask(index, &white);
            self.black_pawn_attacks[index] = Self::offsets_mask(index, &black);
            index += 1;
        }
    }

    const fn init_ray_attacks(&mut self) {
        let mut index = 0;
        while index < 64 {
            let rank = index / 8;
            let file = index % 8;

            let mut d = 0;
            while d < 8 {
                let direction = Direction::ALL[d];
                self.rays[direction.index()][index] = Self::generate_ray(rank, file, direction);
                d += 1;
            }

            index += 1
        }
    }

    /// Mask of the on-board squares reached by each (rank, file) offset
    const fn offsets_mask(index: usize, offsets: &[(i8, i8)]) -> BitBoard {
        let rank = (index / 8) as i8;
        let file = (index % 8) as i8;
        let mut mask = BitBoard(0);

        let mut i = 0;
        while i < offsets.len() {
            let (dr, df) = offsets[i];
            let target_rank = rank + dr;
            let target_file = file + df;
            if target_rank >= 0 && target_rank < 8 && target_file >= 0 && target_file < 8 {
                mask.set((target_rank * 8 + target_file) as usize);
            }
            i += 1;
        }
        mask
    }

    const fn generate_ray(start_rank: usize, start_file: usize, direction: Direction) -> BitBoard {
        let mut ray = BitBoard(0);

        let (dr, df) = direction.deltas();

        let mut rank = start_rank as i8;
        let mut file = start_file as i8;

        loop {
            rank += dr;
            file += df;

            if rank < 0 || rank >= 8 || file < 0 || file >= 8 {
                break;
            }

            ray.set((rank as usize) * 8 + (file as usize));
        }

        ray
    }

    #[inline(always)]
    pub const fn get_ray(&self, from: usize, dir: Direction) -> BitBoard {
        self.rays[dir.index()][from]
    }

    /// Ray from `from` cut after its first occupied square. The blocker is included,
    /// callers decide whether it is a capture.
    pub fn ray_until_blocker(&self, from: usize, dir: Direction, occupied: BitBoard) -> BitBoard {
        let ray = self.get_ray(from, dir);
        let blockers = ray & occupied;

        match blockers.get_closest_bit(dir.is_forward()) {
            Some(first_blocker) => ray & !self.get_ray(first_blocker as usize, dir),
            None => ray,
        }
    }

    /// Union of blocked rays in every given direction
    pub fn sliding_attacks(&self, from: usize, dirs: &[Direction], occupied: BitBoard) -> BitBoard {
        dirs.iter().fold(BitBoard::EMPTY, |acc, &dir| {
            acc | self.ray_until_blocker(from, dir, occupied)
        })
    }

    #[inline(always)]
    pub const fn get_pawn_attacks(&self, from: usize, side: Side) -> BitBoard {
        match side {
            Side::White => self.white_pawn_attacks[from],
            Side::Black => self.black_pawn_attacks[from],
        }
    }
}
