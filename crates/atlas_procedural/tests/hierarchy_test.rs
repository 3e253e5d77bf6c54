//! # Hierarchical Generation Tests
//!
//! Drives the generators end to end: sector → block → chunk.

use std::collections::HashMap;

use atlas_procedural::{
    from_absolute, scale_of, to_absolute, verify_block, verify_chunk, AbsoluteCoord, BlockCoord, ChunkCoord,
    GenError, Generators, GridCoord, Scale, ScaleCoord, SectorCoord, TerrainClass, WorldSeed, CHUNKS_PER_BLOCK,
};

fn generators() -> Generators {
    Generators::with_seed(WorldSeed::new(42))
}

/// Same seed, same sector: identical data from independent generators.
#[test]
fn test_sector_is_reproducible() {
    let a = generators().sector(SectorCoord::new(0, 0)).unwrap();
    let b = generators().sector(SectorCoord::new(0, 0)).unwrap();
    assert_eq!(a, b);
}

/// The World grid is 16×16; column 16 is outside it.
#[test]
fn test_sector_outside_grid_is_bounds_error() {
    let err = generators().sector(SectorCoord::new(16, 0)).unwrap_err();
    assert_eq!(
        err,
        GenError::OutOfBounds {
            x: 16,
            y: 0,
            width: 16,
            height: 16,
        }
    );
    assert!(generators().sector(SectorCoord::new(15, 15)).is_ok());
    assert!(generators().sector(SectorCoord::new(0, -1)).is_err());
}

/// An ocean sector yields only water, all the way down to the tiles.
#[test]
fn test_ocean_sector_yields_no_land_tiles() {
    let gens = generators();
    let mut sector = gens.sector(SectorCoord::new(4, 4)).unwrap();
    sector.terrain = TerrainClass::DeepOcean;

    let block_coord = BlockCoord::new(4 * 16 + 7, 4 * 16 + 9);
    let block = gens.regional().generate_block(&sector, block_coord).unwrap();
    assert!(!block.subtype.is_land());

    let origin = block_coord.origin();
    let first = ChunkCoord::containing(origin);
    for dy in 0..CHUNKS_PER_BLOCK {
        for dx in 0..CHUNKS_PER_BLOCK {
            let chunk = gens.local().generate_chunk(&block, first.offset(dx, dy)).unwrap();
            assert!(
                chunk.tiles().iter().all(|t| t.terrain.is_water()),
                "land tile in chunk {:?}",
                chunk.coord
            );
        }
    }
}

/// Every block and chunk in a sweep over several sectors obeys its parent.
#[test]
fn test_consistency_sweep() {
    let gens = generators();
    let mut sectors = HashMap::new();

    for sy in [0, 5, 15] {
        for sx in [0, 8, 15] {
            let coord = SectorCoord::new(sx, sy);
            sectors.insert(coord, gens.sector(coord).unwrap());
        }
    }

    for (coord, sector) in &sectors {
        for (bx, by) in [(0, 0), (7, 3), (15, 15)] {
            let block_coord = BlockCoord::new(coord.x * 16 + bx, coord.y * 16 + by);
            let block = gens.regional().generate_block(sector, block_coord).unwrap();
            assert!(verify_block(sector, &block).is_empty());

            let first = ChunkCoord::containing(block_coord.origin());
            for (cx, cy) in [(0, 0), (31, 0), (16, 16), (0, 31)] {
                let chunk = gens.local().generate_chunk(&block, first.offset(cx, cy)).unwrap();
                let violations = verify_chunk(&block, &chunk);
                assert!(violations.is_empty(), "{violations:?}");
            }
        }
    }
}

/// Adjacent chunks agree on every cluster they share.
#[test]
fn test_clusters_agree_across_chunk_seams() {
    let gens = generators();
    let block = gens.block(BlockCoord::new(100, 100)).unwrap();
    let first = ChunkCoord::containing(BlockCoord::new(100, 100).origin());

    for i in 0..8 {
        let left = gens.local().generate_chunk(&block, first.offset(i, i)).unwrap();
        let right = gens.local().generate_chunk(&block, first.offset(i + 1, i)).unwrap();
        let below = gens.local().generate_chunk(&block, first.offset(i, i + 1)).unwrap();

        for neighbor in [&right, &below] {
            for cluster in left.clusters() {
                if let Some(other) = neighbor.clusters().iter().find(|c| c.center == cluster.center) {
                    assert_eq!(cluster, other);
                }
            }
        }
    }
}

/// A node's cluster is listed on the chunk it sits in.
#[test]
fn test_nodes_trace_back_to_clusters() {
    let gens = generators();
    for i in 0..16 {
        let chunk = gens.chunk(ChunkCoord::new(2_000 + i * 3, 2_500 - i * 5)).unwrap();
        for (at, tile) in chunk.iter() {
            if let Some(node) = tile.resource {
                let cluster = chunk.clusters().iter().find(|c| c.center == node.cluster).unwrap();
                assert!(cluster.covers(at));
            }
        }
        assert_eq!(chunk.resource_count(), chunk.iter().filter(|(_, t)| t.resource.is_some()).count());
    }
}

/// Different seeds give different worlds.
#[test]
fn test_seeds_diverge() {
    let a = Generators::with_seed(WorldSeed::new(1));
    let b = Generators::with_seed(WorldSeed::new(2));
    let differs = a
        .world()
        .sectors()
        .any(|c| a.sector(c).unwrap().elevation != b.sector(c).unwrap().elevation);
    assert!(differs);
}

/// Round trip through absolute coordinates at every scale.
#[test]
fn test_coordinate_round_trip() {
    for scale in Scale::ALL {
        for y in -20..=20 {
            for x in -20..=20 {
                let c = ScaleCoord::at(scale, x * 7, y * 13);
                assert_eq!(from_absolute(to_absolute(c), scale_of(c)), c);
            }
        }
    }
    let tile = AbsoluteCoord::new(-1, -16_385);
    assert_eq!(from_absolute(tile, Scale::World), ScaleCoord::World(SectorCoord::new(-1, -2)));
}

/// Summary counts add up to the grid.
#[test]
fn test_world_summary() {
    let gens = generators();
    let summary = gens.world().summarize();
    assert_eq!(summary.sectors, 256);
    assert_eq!(summary.terrain.values().sum::<usize>(), 256);
    assert_eq!(summary.climate.values().sum::<usize>(), 256);
    assert!((0.0..=1.0).contains(&summary.land_fraction()));
}
