//! Hierarchical consistency checks.
//!
//! A child record is consistent with its parent when it is keyed to the
//! parent that geometrically contains it and every value it carries is one
//! the parent's rules permit. The generators assert these in debug builds.

use thiserror::Error;

use crate::block::BlockData;
use crate::chunk::ChunkData;
use crate::coords::{AbsoluteCoord, BlockCoord, ChunkCoord, SectorCoord};
use crate::sector::SectorData;
use crate::terrain::{ResourceKind, TerrainClass, TerrainSubtype, TileTerrain};

/// One broken parent/child rule.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConsistencyViolation {
    /// The block is keyed to a sector other than the one containing it.
    #[error("block {block:?} keyed to sector {keyed:?}, contained by {containing:?}")]
    BlockParent {
        /// Block checked.
        block: BlockCoord,
        /// Sector recorded on the block.
        keyed: SectorCoord,
        /// Sector that contains the block.
        containing: SectorCoord,
    },

    /// The block's subtype is not permitted by its sector's class.
    #[error("block {block:?} has subtype {subtype:?}, forbidden in {terrain:?}")]
    ForbiddenSubtype {
        /// Block checked.
        block: BlockCoord,
        /// Parent terrain class.
        terrain: TerrainClass,
        /// Offending subtype.
        subtype: TerrainSubtype,
    },

    /// The chunk is keyed to a block other than the one containing it.
    #[error("chunk {chunk:?} keyed to block {keyed:?}, contained by {containing:?}")]
    ChunkParent {
        /// Chunk checked.
        chunk: ChunkCoord,
        /// Block recorded on the chunk.
        keyed: BlockCoord,
        /// Block that contains the chunk.
        containing: BlockCoord,
    },

    /// The chunk's subtype differs from its parent block's.
    #[error("chunk {chunk:?} carries subtype {chunk_subtype:?}, parent has {block_subtype:?}")]
    SubtypeDrift {
        /// Chunk checked.
        chunk: ChunkCoord,
        /// Subtype recorded on the chunk.
        chunk_subtype: TerrainSubtype,
        /// Subtype of the parent block.
        block_subtype: TerrainSubtype,
    },

    /// A tile's terrain is not permitted by the parent subtype.
    #[error("tile {at:?} is {tile:?}, forbidden in {subtype:?}")]
    ForbiddenTile {
        /// Tile position.
        at: AbsoluteCoord,
        /// Parent subtype.
        subtype: TerrainSubtype,
        /// Offending terrain.
        tile: TileTerrain,
    },

    /// A resource node sits on terrain its kind cannot occupy.
    #[error("{kind:?} node at {at:?} sits on {tile:?}")]
    MisplacedResource {
        /// Tile position.
        at: AbsoluteCoord,
        /// Node kind.
        kind: ResourceKind,
        /// Terrain under the node.
        tile: TileTerrain,
    },

    /// A tile's passability disagrees with its terrain.
    #[error("tile {at:?} passability disagrees with {tile:?}")]
    Passability {
        /// Tile position.
        at: AbsoluteCoord,
        /// Terrain of the tile.
        tile: TileTerrain,
    },
}

/// Checks a block against its parent sector.
#[must_use]
pub fn verify_block(sector: &SectorData, block: &BlockData) -> Vec<ConsistencyViolation> {
    let mut violations = Vec::new();

    let containing = block.coord.sector();
    if block.sector != containing || sector.coord != containing {
        violations.push(ConsistencyViolation::BlockParent {
            block: block.coord,
            keyed: block.sector,
            containing,
        });
    }
    if !sector.terrain.permits(block.subtype) {
        violations.push(ConsistencyViolation::ForbiddenSubtype {
            block: block.coord,
            terrain: sector.terrain,
            subtype: block.subtype,
        });
    }
    violations
}

/// Checks a chunk and every one of its tiles against the parent block.
#[must_use]
pub fn verify_chunk(block: &BlockData, chunk: &ChunkData) -> Vec<ConsistencyViolation> {
    let mut violations = Vec::new();

    let containing = chunk.coord.block();
    if chunk.block != containing || block.coord != containing {
        violations.push(ConsistencyViolation::ChunkParent {
            chunk: chunk.coord,
            keyed: chunk.block,
            containing,
        });
    }
    if chunk.subtype != block.subtype {
        violations.push(ConsistencyViolation::SubtypeDrift {
            chunk: chunk.coord,
            chunk_subtype: chunk.subtype,
            block_subtype: block.subtype,
        });
    }

    for (at, tile) in chunk.iter() {
        if !block.subtype.permits(tile.terrain) {
            violations.push(ConsistencyViolation::ForbiddenTile {
                at,
                subtype: block.subtype,
                tile: tile.terrain,
            });
        }
        if tile.passable != tile.terrain.is_passable() {
            violations.push(ConsistencyViolation::Passability { at, tile: tile.terrain });
        }
        if let Some(node) = tile.resource {
            if !node.kind.fits(tile.terrain) {
                violations.push(ConsistencyViolation::MisplacedResource {
                    at,
                    kind: node.kind,
                    tile: tile.terrain,
                });
            }
        }
    }
    violations
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chunk::LocalGenerator;
    use crate::config::GenerationConfig;
    use crate::noise::WorldSeed;
    use crate::terrain::ClimateZone;
    use crate::test_support::{block_with, sector_with};
    use std::sync::Arc;

    #[test]
    fn test_consistent_block_passes() {
        let sector = sector_with(SectorCoord::new(0, 0), TerrainClass::Desert, ClimateZone::Temperate);
        let block = block_with(BlockCoord::new(3, 4), TerrainSubtype::Barren, false);
        assert!(verify_block(&sector, &block).is_empty());
    }

    #[test]
    fn test_land_block_under_ocean_flagged() {
        let sector = sector_with(SectorCoord::new(0, 0), TerrainClass::ShallowOcean, ClimateZone::Temperate);
        let block = block_with(BlockCoord::new(3, 4), TerrainSubtype::Forest, false);
        assert_eq!(
            verify_block(&sector, &block),
            vec![ConsistencyViolation::ForbiddenSubtype {
                block: BlockCoord::new(3, 4),
                terrain: TerrainClass::ShallowOcean,
                subtype: TerrainSubtype::Forest,
            }]
        );
    }

    #[test]
    fn test_foreign_parent_flagged() {
        let sector = sector_with(SectorCoord::new(1, 0), TerrainClass::Desert, ClimateZone::Temperate);
        let block = block_with(BlockCoord::new(3, 4), TerrainSubtype::Barren, false);
        let violations = verify_block(&sector, &block);
        assert!(matches!(violations[0], ConsistencyViolation::BlockParent { .. }));
    }

    #[test]
    fn test_generated_chunk_passes_and_swapped_parent_fails() {
        let gen = LocalGenerator::new(WorldSeed::new(9), Arc::new(GenerationConfig::default()));
        let forest = block_with(BlockCoord::new(0, 0), TerrainSubtype::Forest, true);
        let chunk = gen.generate_chunk(&forest, ChunkCoord::new(3, 3)).unwrap();
        assert!(verify_chunk(&forest, &chunk).is_empty());

        let water = block_with(BlockCoord::new(0, 0), TerrainSubtype::Water, false);
        let violations = verify_chunk(&water, &chunk);
        assert!(violations
            .iter()
            .any(|v| matches!(v, ConsistencyViolation::SubtypeDrift { .. })));
        assert!(violations
            .iter()
            .any(|v| matches!(v, ConsistencyViolation::ForbiddenTile { .. })));
    }

    #[test]
    fn test_violation_messages_name_the_coordinates() {
        let v = ConsistencyViolation::Passability {
            at: AbsoluteCoord::new(-5, 7),
            tile: TileTerrain::DeepWater,
        };
        let text = v.to_string();
        assert!(text.contains("-5") && text.contains("DeepWater"));
    }
}
