pub mod attack;
pub mod castling;
pub mod en_passant;
pub mod legality;
pub mod move_gen;
pub mod promotion;


/// Offset of one step on the 0..63 index, paired with its (rank, file) delta.
/// Positive values walk towards h8, negative towards a1.
#[derive(Debug, Hash, PartialEq, Eq, Clone, Copy)]
pub struct Direction(i8);

impl Direction {
    pub const NORTH: Direction = Direction(8);
    pub const SOUTH: Direction = Direction(-8);
    pub const EAST: Direction = Direction(1);
    pub const WEST: Direction = Direction(-1);
    pub const NORTHEAST: Direction = Direction(9);
    pub const NORTHWEST: Direction = Direction(7);
    pub const SOUTHEAST: Direction = Direction(-7);
    pub const SOUTHWEST: Direction = Direction(-9);

    pub const ORTHO: [Direction; 4] = [Self::NORTH, Self::SOUTH, Self::EAST, Self::WEST];
    pub const DIAG: [Direction; 4] = [
        Self::NORTHEAST,
        Self::NORTHWEST,
        Self::SOUTHEAST,
        Self::SOUTHWEST,
    ];
    pub const ALL: [Direction; 8] = [
        Self::NORTH,
        Self::SOUTH,
        Self::EAST,
        Self::WEST,
        Self::NORTHEAST,
        Self::NORTHWEST,
        Self::SOUTHEAST,
        Self::SOUTHWEST,
    ];

    /// (rank delta, file delta)
    pub const fn deltas(&self) -> (i8, i8) {
        match self.0 {
            8 => (1, 0),
            -8 => (-1, 0),
            1 => (0, 1),
            -1 => (0, -1),
            9 => (1, 1),
            7 => (1, -1),
            -7 => (-1, 1),
            -9 => (-1, -1),
            _ => (0, 0),
        }
    }

    /// Slot of this direction in the ray tables
    pub const fn index(&self) -> usize {
        match self.0 {
            8 => 0,
            -8 => 1,
            1 => 2,
            -1 => 3,
            9 => 4,
            7 => 5,
            -7 => 6,
            _ => 7,
        }
    }

    /// Whether squares along the ray have increasing indices
    #[inline(always)]
    pub const fn is_forward(&self) -> bool {
        self.0 > 0
    }
}
