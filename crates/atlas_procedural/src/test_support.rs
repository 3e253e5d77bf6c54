//! Hand-built parent records for unit tests.

use crate::block::{BlockData, BoundaryMarkers};
use crate::coords::{BlockCoord, SectorCoord};
use crate::sector::SectorData;
use crate::terrain::{ClimateZone, TerrainClass, TerrainSubtype};

pub(crate) fn sector_with(coord: SectorCoord, terrain: TerrainClass, climate: ClimateZone) -> SectorData {
    SectorData {
        coord,
        terrain,
        elevation: if terrain.is_ocean() { -1200.0 } else { 300.0 },
        climate,
        has_mountains: false,
        has_rivers: false,
        plate_id: 0,
        continental: 0.0,
        tectonic: 0.0,
        climate_variation: 0.0,
    }
}

pub(crate) fn block_with(coord: BlockCoord, subtype: TerrainSubtype, has_river: bool) -> BlockData {
    BlockData {
        coord,
        sector: coord.sector(),
        subtype,
        elevation: if subtype.is_land() { 300.0 } else { -40.0 },
        elevation_variation: 0.0,
        moisture: 0.5,
        temperature_variation: 0.0,
        has_river,
        has_resource_area: false,
        has_settlement: false,
        boundary: BoundaryMarkers::for_block(coord),
    }
}
