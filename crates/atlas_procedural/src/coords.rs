//! # Coordinate System
//!
//! Three nested grids over one absolute tile plane.
//!
//! ```text
//!   World sector   16 x 16 blocks   = 16384 x 16384 tiles   (finite grid)
//!   Regional block 32 x 32 chunks   =  1024 x  1024 tiles   (unbounded)
//!   Local chunk    32 x 32 tiles                            (unbounded)
//! ```
//!
//! Every conversion from tiles to a coarser cell uses floor division
//! (`div_euclid`), so tile -1 belongs to chunk -1, not chunk 0.

use std::fmt::Debug;
use std::hash::Hash;

/// Chunk width/height in tiles.
pub const CHUNK_SIZE: i64 = 32;

/// Tiles per chunk.
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub const TILES_PER_CHUNK: usize = (CHUNK_SIZE * CHUNK_SIZE) as usize;

/// Block width/height in chunks.
pub const CHUNKS_PER_BLOCK: i64 = 32;

/// Sector width/height in blocks.
pub const BLOCKS_PER_SECTOR: i64 = 16;

/// Block width/height in tiles.
pub const BLOCK_TILES: i64 = CHUNK_SIZE * CHUNKS_PER_BLOCK;

/// Sector width/height in tiles.
pub const SECTOR_TILES: i64 = BLOCK_TILES * BLOCKS_PER_SECTOR;

/// One of the three generation scales, coarsest first.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Scale {
    /// Continental sectors.
    World,
    /// Regional blocks.
    Regional,
    /// Local chunks of tiles.
    Local,
}

impl Scale {
    /// All scales, coarsest first.
    pub const ALL: [Self; 3] = [Self::World, Self::Regional, Self::Local];

    /// Side length of one cell at this scale, in tiles.
    #[must_use]
    pub const fn tile_extent(self) -> i64 {
        match self {
            Self::World => SECTOR_TILES,
            Self::Regional => BLOCK_TILES,
            Self::Local => CHUNK_SIZE,
        }
    }

    /// Lower-case name used in logs and cache tier names.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::World => "world",
            Self::Regional => "regional",
            Self::Local => "local",
        }
    }
}

/// A tile position on the absolute plane.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct AbsoluteCoord {
    /// Tile X.
    pub x: i64,
    /// Tile Y.
    pub y: i64,
}

impl AbsoluteCoord {
    /// Creates an absolute coordinate.
    #[inline]
    #[must_use]
    pub const fn new(x: i64, y: i64) -> Self {
        Self { x, y }
    }

    /// Returns the coordinate shifted by `(dx, dy)` tiles.
    #[inline]
    #[must_use]
    pub const fn offset(self, dx: i64, dy: i64) -> Self {
        Self::new(self.x + dx, self.y + dy)
    }

    /// Squared euclidean distance in tiles.
    #[inline]
    #[must_use]
    pub const fn distance_squared(self, other: Self) -> i64 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        dx * dx + dy * dy
    }

    /// Returns the position as floats for noise sampling.
    #[inline]
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn as_f64(self) -> (f64, f64) {
        (self.x as f64, self.y as f64)
    }
}

/// Shared behaviour of the three grid coordinate types.
pub trait GridCoord: Copy + Eq + Hash + Debug + Send + Sync + 'static {
    /// Scale this grid belongs to.
    const SCALE: Scale;

    /// Builds a coordinate from grid indices.
    fn from_xy(x: i64, y: i64) -> Self;

    /// Grid indices of this cell.
    fn xy(self) -> (i64, i64);

    /// Tile at the cell's minimum corner.
    #[must_use]
    fn origin(self) -> AbsoluteCoord {
        let (x, y) = self.xy();
        let extent = Self::SCALE.tile_extent();
        AbsoluteCoord::new(x * extent, y * extent)
    }

    /// Representative tile used for noise sampling.
    #[must_use]
    fn center(self) -> AbsoluteCoord {
        let half = Self::SCALE.tile_extent() / 2;
        self.origin().offset(half, half)
    }

    /// Cell containing `abs`, using floor semantics.
    #[must_use]
    fn containing(abs: AbsoluteCoord) -> Self {
        let extent = Self::SCALE.tile_extent();
        Self::from_xy(abs.x.div_euclid(extent), abs.y.div_euclid(extent))
    }

    /// Returns true if `abs` lies inside this cell.
    #[must_use]
    fn contains(self, abs: AbsoluteCoord) -> bool {
        Self::containing(abs) == self
    }

    /// Cell shifted by `(dx, dy)` cells.
    #[must_use]
    fn offset(self, dx: i64, dy: i64) -> Self {
        let (x, y) = self.xy();
        Self::from_xy(x + dx, y + dy)
    }

    /// Chebyshev distance to `other`, in cells.
    #[must_use]
    fn chebyshev(self, other: Self) -> i64 {
        let (ax, ay) = self.xy();
        let (bx, by) = other.xy();
        (ax - bx).abs().max((ay - by).abs())
    }

    /// Cells within `radius` (Chebyshev), row-major, including `self`.
    #[must_use]
    fn neighborhood(self, radius: i64) -> Vec<Self> {
        let radius = radius.max(0);
        let side = usize::try_from(2 * radius + 1).unwrap_or(0);
        let mut cells = Vec::with_capacity(side * side);
        for dy in -radius..=radius {
            for dx in -radius..=radius {
                cells.push(self.offset(dx, dy));
            }
        }
        cells
    }
}

macro_rules! grid_coord {
    ($name:ident, $scale:expr, $doc:literal) => {
        #[doc = $doc]
        #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
        pub struct $name {
            /// Grid X.
            pub x: i64,
            /// Grid Y.
            pub y: i64,
        }

        impl $name {
            /// Creates a coordinate from grid indices.
            #[inline]
            #[must_use]
            pub const fn new(x: i64, y: i64) -> Self {
                Self { x, y }
            }
        }

        impl GridCoord for $name {
            const SCALE: Scale = $scale;

            #[inline]
            fn from_xy(x: i64, y: i64) -> Self {
                Self::new(x, y)
            }

            #[inline]
            fn xy(self) -> (i64, i64) {
                (self.x, self.y)
            }
        }
    };
}

grid_coord!(SectorCoord, Scale::World, "Cell of the finite World grid.");
grid_coord!(BlockCoord, Scale::Regional, "Cell of the unbounded Regional grid.");
grid_coord!(ChunkCoord, Scale::Local, "Cell of the unbounded Local grid.");

impl BlockCoord {
    /// Sector containing this block.
    #[inline]
    #[must_use]
    pub const fn sector(self) -> SectorCoord {
        SectorCoord::new(
            self.x.div_euclid(BLOCKS_PER_SECTOR),
            self.y.div_euclid(BLOCKS_PER_SECTOR),
        )
    }

    /// Position of this block inside its sector, each in `0..BLOCKS_PER_SECTOR`.
    #[inline]
    #[must_use]
    pub const fn index_in_sector(self) -> (i64, i64) {
        (self.x.rem_euclid(BLOCKS_PER_SECTOR), self.y.rem_euclid(BLOCKS_PER_SECTOR))
    }
}

impl ChunkCoord {
    /// Block containing this chunk.
    #[inline]
    #[must_use]
    pub const fn block(self) -> BlockCoord {
        BlockCoord::new(
            self.x.div_euclid(CHUNKS_PER_BLOCK),
            self.y.div_euclid(CHUNKS_PER_BLOCK),
        )
    }

    /// Sector containing this chunk.
    #[inline]
    #[must_use]
    pub const fn sector(self) -> SectorCoord {
        self.block().sector()
    }

    /// Position of this chunk inside its block, each in `0..CHUNKS_PER_BLOCK`.
    #[inline]
    #[must_use]
    pub const fn index_in_block(self) -> (i64, i64) {
        (self.x.rem_euclid(CHUNKS_PER_BLOCK), self.y.rem_euclid(CHUNKS_PER_BLOCK))
    }
}

/// A cell at any of the three scales.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ScaleCoord {
    /// A World sector.
    World(SectorCoord),
    /// A Regional block.
    Regional(BlockCoord),
    /// A Local chunk.
    Local(ChunkCoord),
}

impl ScaleCoord {
    /// Scale of this cell.
    #[inline]
    #[must_use]
    pub const fn scale(self) -> Scale {
        match self {
            Self::World(_) => Scale::World,
            Self::Regional(_) => Scale::Regional,
            Self::Local(_) => Scale::Local,
        }
    }

    /// Grid indices of this cell at its own scale.
    #[must_use]
    pub fn xy(self) -> (i64, i64) {
        match self {
            Self::World(c) => c.xy(),
            Self::Regional(c) => c.xy(),
            Self::Local(c) => c.xy(),
        }
    }

    /// Cell at `scale` with the given grid indices.
    #[must_use]
    pub const fn at(scale: Scale, x: i64, y: i64) -> Self {
        match scale {
            Scale::World => Self::World(SectorCoord::new(x, y)),
            Scale::Regional => Self::Regional(BlockCoord::new(x, y)),
            Scale::Local => Self::Local(ChunkCoord::new(x, y)),
        }
    }

    /// Minimum-corner tile of this cell.
    #[must_use]
    pub fn to_absolute(self) -> AbsoluteCoord {
        match self {
            Self::World(c) => c.origin(),
            Self::Regional(c) => c.origin(),
            Self::Local(c) => c.origin(),
        }
    }

    /// Cell at `scale` containing `abs`.
    #[must_use]
    pub fn from_absolute(abs: AbsoluteCoord, scale: Scale) -> Self {
        match scale {
            Scale::World => Self::World(SectorCoord::containing(abs)),
            Scale::Regional => Self::Regional(BlockCoord::containing(abs)),
            Scale::Local => Self::Local(ChunkCoord::containing(abs)),
        }
    }

    /// Representative tile used for noise sampling and distance ordering.
    #[must_use]
    pub fn center(self) -> AbsoluteCoord {
        match self {
            Self::World(c) => c.center(),
            Self::Regional(c) => c.center(),
            Self::Local(c) => c.center(),
        }
    }

    /// Enclosing cell one scale coarser; `None` for a World sector.
    #[must_use]
    pub const fn parent(self) -> Option<Self> {
        match self {
            Self::World(_) => None,
            Self::Regional(c) => Some(Self::World(c.sector())),
            Self::Local(c) => Some(Self::Regional(c.block())),
        }
    }

    /// Converts to a coarser (or equal) scale.
    ///
    /// Asking for a finer scale is a contract violation: debug builds
    /// assert, release builds return the finer cell at this cell's origin.
    #[must_use]
    pub fn at_scale(self, target: Scale) -> Self {
        debug_assert!(
            target <= self.scale(),
            "cannot refine {:?} to the finer {:?} scale",
            self,
            target
        );
        Self::from_absolute(self.to_absolute(), target)
    }

    /// Sector that contains this cell.
    #[must_use]
    pub const fn sector(self) -> SectorCoord {
        match self {
            Self::World(c) => c,
            Self::Regional(c) => c.sector(),
            Self::Local(c) => c.sector(),
        }
    }
}

impl From<SectorCoord> for ScaleCoord {
    fn from(c: SectorCoord) -> Self {
        Self::World(c)
    }
}

impl From<BlockCoord> for ScaleCoord {
    fn from(c: BlockCoord) -> Self {
        Self::Regional(c)
    }
}

impl From<ChunkCoord> for ScaleCoord {
    fn from(c: ChunkCoord) -> Self {
        Self::Local(c)
    }
}

/// Minimum-corner tile of `coord`.
#[inline]
#[must_use]
pub fn to_absolute(coord: ScaleCoord) -> AbsoluteCoord {
    coord.to_absolute()
}

/// Cell at `scale` containing `abs`.
#[inline]
#[must_use]
pub fn from_absolute(abs: AbsoluteCoord, scale: Scale) -> ScaleCoord {
    ScaleCoord::from_absolute(abs, scale)
}

/// Scale of `coord`.
#[inline]
#[must_use]
pub const fn scale_of(coord: ScaleCoord) -> Scale {
    coord.scale()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extents_nest() {
        assert_eq!(BLOCK_TILES, 1024);
        assert_eq!(SECTOR_TILES, 16_384);
        assert_eq!(TILES_PER_CHUNK, 1024);
        assert_eq!(Scale::World.tile_extent() % Scale::Regional.tile_extent(), 0);
        assert_eq!(Scale::Regional.tile_extent() % Scale::Local.tile_extent(), 0);
    }

    #[test]
    fn test_round_trip_all_scales_including_negative() {
        for scale in Scale::ALL {
            for x in -40..=40 {
                for y in -40..=40 {
                    let c = ScaleCoord::at(scale, x, y);
                    assert_eq!(from_absolute(to_absolute(c), scale_of(c)), c);
                }
            }
        }
    }

    #[test]
    fn test_negative_tiles_floor() {
        let abs = AbsoluteCoord::new(-1, -1);
        assert_eq!(ChunkCoord::containing(abs), ChunkCoord::new(-1, -1));
        assert_eq!(BlockCoord::containing(abs), BlockCoord::new(-1, -1));
        assert_eq!(SectorCoord::containing(abs), SectorCoord::new(-1, -1));

        let abs = AbsoluteCoord::new(-CHUNK_SIZE, 0);
        assert_eq!(ChunkCoord::containing(abs), ChunkCoord::new(-1, 0));
        let abs = AbsoluteCoord::new(-CHUNK_SIZE - 1, 0);
        assert_eq!(ChunkCoord::containing(abs), ChunkCoord::new(-2, 0));
    }

    #[test]
    fn test_every_tile_of_a_chunk_maps_back() {
        for c in [ChunkCoord::new(0, 0), ChunkCoord::new(-1, 3), ChunkCoord::new(-33, -65)] {
            let origin = c.origin();
            for dy in 0..CHUNK_SIZE {
                for dx in 0..CHUNK_SIZE {
                    assert!(c.contains(origin.offset(dx, dy)));
                }
            }
            assert!(!c.contains(origin.offset(-1, 0)));
            assert!(!c.contains(origin.offset(CHUNK_SIZE, 0)));
        }
    }

    #[test]
    fn test_parent_chain_matches_absolute() {
        for x in -70..70 {
            for y in [-1025, -1, 0, 31, 32, 1023, 1024] {
                let chunk = ChunkCoord::new(x, y);
                let abs = chunk.origin();
                assert_eq!(chunk.block(), BlockCoord::containing(abs));
                assert_eq!(chunk.sector(), SectorCoord::containing(abs));
                assert_eq!(chunk.block().sector(), chunk.sector());
            }
        }
    }

    #[test]
    fn test_index_in_parent_is_non_negative() {
        let block = BlockCoord::new(-1, -17);
        assert_eq!(block.index_in_sector(), (15, 15));
        assert_eq!(block.sector(), SectorCoord::new(-1, -2));

        let chunk = ChunkCoord::new(-1, 32);
        assert_eq!(chunk.index_in_block(), (31, 0));
    }

    #[test]
    fn test_coarsening() {
        let chunk = ScaleCoord::Local(ChunkCoord::new(-1, 40));
        assert_eq!(chunk.at_scale(Scale::Regional), ScaleCoord::Regional(BlockCoord::new(-1, 1)));
        assert_eq!(chunk.at_scale(Scale::World), ScaleCoord::World(SectorCoord::new(-1, 0)));
        assert_eq!(chunk.at_scale(Scale::Local), chunk);
        assert_eq!(chunk.parent(), Some(ScaleCoord::Regional(BlockCoord::new(-1, 1))));
        assert_eq!(ScaleCoord::World(SectorCoord::new(0, 0)).parent(), None);
    }

    #[test]
    #[cfg(debug_assertions)]
    #[should_panic(expected = "cannot refine")]
    fn test_refining_is_a_contract_violation() {
        let _ = ScaleCoord::World(SectorCoord::new(1, 1)).at_scale(Scale::Local);
    }

    #[test]
    fn test_center_is_inside() {
        for scale in Scale::ALL {
            let c = ScaleCoord::at(scale, -3, 5);
            assert_eq!(from_absolute(c.center(), scale), c);
        }
    }

    #[test]
    fn test_neighborhood() {
        let cells = ChunkCoord::new(0, 0).neighborhood(1);
        assert_eq!(cells.len(), 9);
        assert_eq!(cells[0], ChunkCoord::new(-1, -1));
        assert!(cells.iter().all(|c| c.chebyshev(ChunkCoord::new(0, 0)) <= 1));
        assert_eq!(ChunkCoord::new(2, 2).neighborhood(0), vec![ChunkCoord::new(2, 2)]);
    }
}
