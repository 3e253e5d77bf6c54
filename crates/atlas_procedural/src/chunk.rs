//! # Local-Scale Generation
//!
//! Produces the 32×32 tile grid of a chunk from its parent block.
//!
//! Generation runs in two phases. The terrain phase fills every tile from
//! the parent subtype's palette, leaning toward its wet end in moist
//! blocks, cuts stream courses where the parent carries a river, and derives
//! elevation and passability. The cluster phase then places resources on the
//! finished grid (see [`crate::cluster`]); resource-area blocks spawn denser.

use std::sync::Arc;

use crate::block::BlockData;
use crate::cluster::{tile_position, ClusterField, ResourceCluster, ResourceNode};
use crate::config::GenerationConfig;
use crate::coords::{AbsoluteCoord, BlockCoord, ChunkCoord, GridCoord, CHUNK_SIZE, TILES_PER_CHUNK};
use crate::error::{GenError, GenResult};
use crate::noise::{NoiseChannel, SimplexNoise, WorldSeed};
use crate::terrain::{TerrainSubtype, TileTerrain};
use crate::verify::verify_chunk;

/// One tile of a chunk.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Tile {
    /// Surface terrain.
    pub terrain: TileTerrain,
    /// Elevation in meters.
    pub elevation: f64,
    /// Movement can cross this tile.
    pub passable: bool,
    /// Resource node, if a cluster placed one here.
    pub resource: Option<ResourceNode>,
}

impl Tile {
    /// A bare tile of `terrain` at `elevation`.
    #[must_use]
    pub const fn new(terrain: TileTerrain, elevation: f64) -> Self {
        Self {
            terrain,
            elevation,
            passable: terrain.is_passable(),
            resource: None,
        }
    }

    /// Returns true if this tile blocks line of sight.
    #[must_use]
    pub const fn blocks_sight(&self) -> bool {
        self.terrain.blocks_sight()
    }
}

/// Local description of one chunk.
#[derive(Clone, Debug, PartialEq)]
pub struct ChunkData {
    /// Chunk this record describes.
    pub coord: ChunkCoord,
    /// Key of the parent block. Its data lives in the Regional cache.
    pub block: BlockCoord,
    /// Subtype inherited from the parent block.
    pub subtype: TerrainSubtype,
    tiles: Box<[Tile]>,
    clusters: Vec<ResourceCluster>,
}

impl ChunkData {
    /// Tile at local position `(lx, ly)`, both in `0..32`.
    #[must_use]
    #[allow(clippy::cast_sign_loss, clippy::cast_possible_truncation)]
    pub fn tile(&self, lx: i64, ly: i64) -> Option<&Tile> {
        if !(0..CHUNK_SIZE).contains(&lx) || !(0..CHUNK_SIZE).contains(&ly) {
            return None;
        }
        self.tiles.get((ly * CHUNK_SIZE + lx) as usize)
    }

    /// Tile at an absolute position, if it lies in this chunk.
    #[must_use]
    pub fn tile_at(&self, abs: AbsoluteCoord) -> Option<&Tile> {
        let origin = self.coord.origin();
        self.tile(abs.x - origin.x, abs.y - origin.y)
    }

    /// All tiles in row-major order.
    #[must_use]
    pub fn tiles(&self) -> &[Tile] {
        &self.tiles
    }

    /// Tiles paired with their absolute positions.
    pub fn iter(&self) -> impl Iterator<Item = (AbsoluteCoord, &Tile)> + '_ {
        let origin = self.coord.origin();
        self.tiles
            .iter()
            .enumerate()
            .map(move |(index, tile)| (tile_position(origin, index), tile))
    }

    /// Clusters that placed or could have placed nodes in this chunk.
    #[must_use]
    pub fn clusters(&self) -> &[ResourceCluster] {
        &self.clusters
    }

    /// Number of tiles carrying a resource node.
    #[must_use]
    pub fn resource_count(&self) -> usize {
        self.tiles.iter().filter(|t| t.resource.is_some()).count()
    }
}

/// Generator for Local chunks.
#[derive(Clone, Debug)]
pub struct LocalGenerator {
    config: Arc<GenerationConfig>,
    terrain: SimplexNoise,
    elevation: SimplexNoise,
    stream: SimplexNoise,
    clusters: ClusterField,
}

impl LocalGenerator {
    /// Creates a local generator.
    #[must_use]
    pub fn new(seed: WorldSeed, config: Arc<GenerationConfig>) -> Self {
        Self {
            terrain: SimplexNoise::new(seed.channel(NoiseChannel::LocalTerrain)),
            elevation: SimplexNoise::new(seed.channel(NoiseChannel::LocalElevation)),
            stream: SimplexNoise::new(seed.channel(NoiseChannel::LocalRiver)),
            clusters: ClusterField::new(seed, Arc::clone(&config)),
            config,
        }
    }

    /// Cluster field used by the resource phase.
    #[must_use]
    pub const fn cluster_field(&self) -> &ClusterField {
        &self.clusters
    }

    /// Generates the chunk at `coord` inside `parent`.
    ///
    /// # Errors
    ///
    /// Returns [`GenError::ChunkParentMismatch`] if `parent` is not the
    /// block containing `coord`.
    pub fn generate_chunk(&self, parent: &BlockData, coord: ChunkCoord) -> GenResult<ChunkData> {
        let expected = coord.block();
        if parent.coord != expected {
            return Err(GenError::ChunkParentMismatch {
                chunk: coord,
                expected,
                actual: parent.coord,
            });
        }

        let mut tiles = self.terrain_phase(parent, coord);

        let mut plan = self.clusters.detect(coord);
        plan.filter_by_terrain(&tiles);
        let placed = self.clusters.populate(&plan, parent, &mut tiles);

        let chunk = ChunkData {
            coord,
            block: parent.coord,
            subtype: parent.subtype,
            tiles: tiles.into_boxed_slice(),
            clusters: plan.into_accepted(),
        };
        debug_assert_eq!(verify_chunk(parent, &chunk), Vec::new());
        tracing::trace!(x = coord.x, y = coord.y, clusters = chunk.clusters.len(), nodes = placed, "generated chunk");
        Ok(chunk)
    }

    fn terrain_phase(&self, parent: &BlockData, coord: ChunkCoord) -> Vec<Tile> {
        let origin = coord.origin();
        let streams = parent.has_river && parent.subtype.carries_streams();

        (0..TILES_PER_CHUNK)
            .map(|index| {
                let abs = tile_position(origin, index);
                let terrain = self.tile_terrain(parent, streams, abs);
                let (x, y) = abs.as_f64();
                let relief = self.elevation.layer(&self.config.noise.local_elevation, x, y) * terrain.relief();
                Tile::new(terrain, parent.elevation + relief)
            })
            .collect()
    }

    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss, clippy::cast_precision_loss)]
    fn tile_terrain(&self, parent: &BlockData, streams: bool, abs: AbsoluteCoord) -> TileTerrain {
        let noise = &self.config.noise;
        let (x, y) = abs.as_f64();

        if streams {
            let band = self.config.local.stream_band;
            let course = self.stream.layer(&noise.local_stream, x, y).abs();
            if course < band * 0.5 {
                return TileTerrain::ShallowWater;
            }
            if course < band {
                return TileTerrain::WaterEdge;
            }
        }

        let palette = parent.subtype.palette();
        // Moisture 0.5 is neutral; wetter blocks lean toward the wet end.
        let shift = (parent.moisture - 0.5) * 2.0 * self.config.local.moisture_bias;
        let v = (self.terrain.layer(&noise.local_terrain, x, y) + shift).clamp(-1.0, 1.0);
        let slot = ((v + 1.0) * 0.5 * palette.len() as f64).floor().max(0.0) as usize;
        palette[slot.min(palette.len() - 1)]
    }
}
