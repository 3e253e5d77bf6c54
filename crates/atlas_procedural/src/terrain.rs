//! # Terrain Vocabulary
//!
//! Closed enumerations for every scale plus the static tables that tie
//! them together. A child scale may only emit what its parent permits:
//!
//! ```text
//!   TerrainClass ──permitted_subtypes()──► TerrainSubtype ──permitted_tiles()──► TileTerrain
//! ```
//!
//! The tables are `match` expressions, so adding a variant without
//! classifying it is a compile error.

/// Continental terrain class of a World sector.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(u8)]
pub enum TerrainClass {
    /// Abyssal ocean.
    DeepOcean = 0,
    /// Continental shelf.
    ShallowOcean = 1,
    /// Low land near sea level.
    CoastalPlains = 2,
    /// Ordinary temperate land.
    TemperateLand = 3,
    /// Warm lowland.
    Tropical = 4,
    /// Arid land.
    Desert = 5,
    /// Cold land.
    Tundra = 6,
    /// Mountain range.
    Mountains = 7,
    /// High peaks.
    HighMountains = 8,
}

impl TerrainClass {
    /// All classes in declaration order.
    pub const ALL: [Self; 9] = [
        Self::DeepOcean,
        Self::ShallowOcean,
        Self::CoastalPlains,
        Self::TemperateLand,
        Self::Tropical,
        Self::Desert,
        Self::Tundra,
        Self::Mountains,
        Self::HighMountains,
    ];

    /// Returns true for the ocean classes.
    #[must_use]
    pub const fn is_ocean(self) -> bool {
        matches!(self, Self::DeepOcean | Self::ShallowOcean)
    }

    /// Regional subtypes a block inside a sector of this class may take.
    #[must_use]
    pub const fn permitted_subtypes(self) -> &'static [TerrainSubtype] {
        use TerrainSubtype as S;
        match self {
            Self::DeepOcean | Self::ShallowOcean => &[S::Water],
            Self::Desert => &[S::Fertile, S::Plains, S::Barren],
            Self::Mountains | Self::HighMountains => &[S::Rocky, S::Hills, S::Barren],
            Self::Tropical => &[S::Forest, S::Plains],
            Self::CoastalPlains | Self::TemperateLand | Self::Tundra => {
                &[S::Hills, S::Marsh, S::Forest, S::Barren, S::Fertile, S::Plains]
            }
        }
    }

    /// Returns true if `subtype` may appear inside a sector of this class.
    #[must_use]
    pub fn permits(self, subtype: TerrainSubtype) -> bool {
        self.permitted_subtypes().contains(&subtype)
    }
}

/// Climate band of a World sector.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(u8)]
pub enum ClimateZone {
    /// Near the equator.
    Tropical = 0,
    /// Mid latitudes.
    Temperate = 1,
    /// Near the poles.
    Polar = 2,
}

impl ClimateZone {
    /// All zones, equator to pole.
    pub const ALL: [Self; 3] = [Self::Tropical, Self::Temperate, Self::Polar];
}

/// Terrain subtype of a Regional block.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(u8)]
pub enum TerrainSubtype {
    /// Open water.
    Water = 0,
    /// Grassland.
    Plains = 1,
    /// Rolling hills.
    Hills = 2,
    /// Woodland.
    Forest = 3,
    /// Wetland.
    Marsh = 4,
    /// Exposed rock.
    Rocky = 5,
    /// Rich soil.
    Fertile = 6,
    /// Poor, dry ground.
    Barren = 7,
}

impl TerrainSubtype {
    /// All subtypes in declaration order.
    pub const ALL: [Self; 8] = [
        Self::Water,
        Self::Plains,
        Self::Hills,
        Self::Forest,
        Self::Marsh,
        Self::Rocky,
        Self::Fertile,
        Self::Barren,
    ];

    /// Returns true for subtypes that are not open water.
    #[must_use]
    pub const fn is_land(self) -> bool {
        !matches!(self, Self::Water)
    }

    /// Tiles the terrain phase chooses from, ordered from the dry end to the
    /// wet end. Block moisture shifts selection along this order.
    #[must_use]
    pub const fn palette(self) -> &'static [TileTerrain] {
        use TileTerrain as T;
        match self {
            Self::Water => &[T::DeepWater, T::DeepWater, T::ShallowWater],
            Self::Plains => &[T::DirtPath, T::BareEarth, T::ShortGrass, T::GrassPatch, T::Wildflowers, T::TallGrass],
            Self::Hills => &[T::LargeBoulder, T::SmallBoulder, T::LooseStones, T::RockyGround, T::ShortGrass, T::GrassPatch],
            Self::Forest => &[T::FallenLog, T::LeafLitter, T::YoungTrees, T::BerryBushes, T::MatureTrees, T::MossCovered],
            Self::Marsh => &[T::TallGrass, T::MossCovered, T::MuddyGround, T::ReedBeds, T::WaterEdge, T::ShallowWater],
            Self::Rocky => &[T::RockOutcrop, T::LargeBoulder, T::SmallBoulder, T::LooseStones, T::RockyGround, T::Pebbles],
            Self::Fertile => &[T::ShortGrass, T::GrassPatch, T::Wildflowers, T::BerryBushes, T::TallGrass, T::YoungTrees],
            Self::Barren => &[T::SandySoil, T::Pebbles, T::BareEarth, T::RockyGround, T::LooseStones, T::ThornyBushes],
        }
    }

    /// Returns true if stream courses may cut through this subtype.
    #[must_use]
    pub const fn carries_streams(self) -> bool {
        self.is_land()
    }

    /// Every tile a chunk inside a block of this subtype may contain:
    /// the palette plus stream tiles where streams are allowed.
    #[must_use]
    pub const fn permitted_tiles(self) -> &'static [TileTerrain] {
        use TileTerrain as T;
        match self {
            Self::Water => &[T::DeepWater, T::ShallowWater],
            Self::Plains => &[
                T::BareEarth, T::ShortGrass, T::GrassPatch, T::TallGrass, T::Wildflowers, T::DirtPath,
                T::ShallowWater, T::WaterEdge,
            ],
            Self::Hills => &[
                T::GrassPatch, T::ShortGrass, T::RockyGround, T::LooseStones, T::SmallBoulder, T::LargeBoulder,
                T::ShallowWater, T::WaterEdge,
            ],
            Self::Forest => &[
                T::LeafLitter, T::MossCovered, T::YoungTrees, T::MatureTrees, T::FallenLog, T::BerryBushes,
                T::ShallowWater, T::WaterEdge,
            ],
            Self::Marsh => &[
                T::ShallowWater, T::ReedBeds, T::MuddyGround, T::MossCovered, T::TallGrass, T::WaterEdge,
            ],
            Self::Rocky => &[
                T::Pebbles, T::RockyGround, T::LooseStones, T::SmallBoulder, T::LargeBoulder, T::RockOutcrop,
                T::ShallowWater, T::WaterEdge,
            ],
            Self::Fertile => &[
                T::ShortGrass, T::GrassPatch, T::TallGrass, T::Wildflowers, T::BerryBushes, T::YoungTrees,
                T::ShallowWater, T::WaterEdge,
            ],
            Self::Barren => &[
                T::SandySoil, T::BareEarth, T::Pebbles, T::ThornyBushes, T::RockyGround, T::LooseStones,
                T::ShallowWater, T::WaterEdge,
            ],
        }
    }

    /// Returns true if `tile` may appear inside a block of this subtype.
    #[must_use]
    pub fn permits(self, tile: TileTerrain) -> bool {
        self.permitted_tiles().contains(&tile)
    }
}

/// Terrain of one Local tile.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(u8)]
pub enum TileTerrain {
    /// Patchy grass.
    GrassPatch = 0,
    /// Short grass.
    ShortGrass = 1,
    /// Tall grass.
    TallGrass = 2,
    /// Wildflower meadow.
    Wildflowers = 3,
    /// Bare earth.
    BareEarth = 4,
    /// Worn path.
    DirtPath = 5,
    /// Rocky ground.
    RockyGround = 6,
    /// Loose stones.
    LooseStones = 7,
    /// Small boulder.
    SmallBoulder = 8,
    /// Large boulder.
    LargeBoulder = 9,
    /// Rock outcrop.
    RockOutcrop = 10,
    /// Sandy soil.
    SandySoil = 11,
    /// Pebbles.
    Pebbles = 12,
    /// Mud.
    MuddyGround = 13,
    /// Moss.
    MossCovered = 14,
    /// Leaf litter.
    LeafLitter = 15,
    /// Young trees.
    YoungTrees = 16,
    /// Mature trees.
    MatureTrees = 17,
    /// Fallen log.
    FallenLog = 18,
    /// Thorny bushes.
    ThornyBushes = 19,
    /// Berry bushes.
    BerryBushes = 20,
    /// Reed beds.
    ReedBeds = 21,
    /// Shallow water.
    ShallowWater = 22,
    /// Deep water.
    DeepWater = 23,
    /// Shoreline.
    WaterEdge = 24,
}

impl TileTerrain {
    /// Returns true for tiles that are water rather than ground.
    #[must_use]
    pub const fn is_water(self) -> bool {
        matches!(self, Self::ShallowWater | Self::DeepWater | Self::WaterEdge)
    }

    /// Returns true for tiles that only occur on land.
    #[must_use]
    pub const fn is_land(self) -> bool {
        !self.is_water()
    }

    /// Returns true if movement can cross this tile.
    #[must_use]
    pub const fn is_passable(self) -> bool {
        !matches!(
            self,
            Self::LargeBoulder | Self::RockOutcrop | Self::DeepWater | Self::MatureTrees
        )
    }

    /// Returns true if this tile blocks line of sight.
    #[must_use]
    pub const fn blocks_sight(self) -> bool {
        matches!(
            self,
            Self::SmallBoulder | Self::LargeBoulder | Self::RockOutcrop | Self::YoungTrees | Self::MatureTrees
        )
    }

    /// Peak deviation in meters this tile adds to its block's base elevation.
    #[must_use]
    pub fn relief(self) -> f64 {
        match self {
            Self::DeepWater => -4.0,
            Self::ShallowWater => -1.0,
            Self::WaterEdge | Self::MuddyGround | Self::ReedBeds => 0.5,
            Self::DirtPath | Self::BareEarth | Self::SandySoil | Self::Pebbles => 1.0,
            Self::GrassPatch | Self::ShortGrass | Self::TallGrass | Self::Wildflowers => 1.5,
            Self::MossCovered | Self::LeafLitter | Self::FallenLog => 2.0,
            Self::ThornyBushes | Self::BerryBushes | Self::YoungTrees | Self::MatureTrees => 2.5,
            Self::RockyGround | Self::LooseStones => 3.0,
            Self::SmallBoulder => 4.0,
            Self::LargeBoulder => 6.0,
            Self::RockOutcrop => 8.0,
        }
    }
}

/// Kind of a resource node.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(u8)]
pub enum ResourceKind {
    /// Harvestable wood.
    Timber = 0,
    /// Edible plants.
    Forage = 1,
    /// Building stone.
    Stone = 2,
    /// Metal ore.
    Ore = 3,
    /// Clay deposits.
    Clay = 4,
    /// Reeds and fibre.
    Reeds = 5,
    /// Fishing ground.
    Fish = 6,
}

impl ResourceKind {
    /// All kinds in declaration order.
    pub const ALL: [Self; 7] = [
        Self::Timber,
        Self::Forage,
        Self::Stone,
        Self::Ore,
        Self::Clay,
        Self::Reeds,
        Self::Fish,
    ];

    /// Tiles a node of this kind may sit on.
    #[must_use]
    pub const fn compatible_tiles(self) -> &'static [TileTerrain] {
        use TileTerrain as T;
        match self {
            Self::Timber => &[T::YoungTrees, T::MatureTrees, T::FallenLog],
            Self::Forage => &[T::BerryBushes, T::Wildflowers, T::TallGrass, T::ThornyBushes],
            Self::Stone => &[T::RockyGround, T::LooseStones, T::SmallBoulder, T::LargeBoulder, T::RockOutcrop, T::Pebbles],
            Self::Ore => &[T::RockOutcrop, T::LargeBoulder, T::RockyGround],
            Self::Clay => &[T::MuddyGround, T::WaterEdge, T::BareEarth, T::SandySoil],
            Self::Reeds => &[T::ReedBeds, T::MuddyGround, T::WaterEdge, T::ShallowWater],
            Self::Fish => &[T::ShallowWater, T::DeepWater, T::WaterEdge],
        }
    }

    /// Returns true if a node of this kind may sit on `tile`.
    #[must_use]
    pub fn fits(self, tile: TileTerrain) -> bool {
        self.compatible_tiles().contains(&tile)
    }
}

/// Rarity grade of a resource node.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(u8)]
pub enum Rarity {
    /// Ordinary.
    Common = 0,
    /// Uncommon.
    Rare = 1,
    /// Exceptional.
    Epic = 2,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ocean_permits_only_water() {
        for class in [TerrainClass::DeepOcean, TerrainClass::ShallowOcean] {
            assert_eq!(class.permitted_subtypes(), &[TerrainSubtype::Water]);
            assert!(!class.permits(TerrainSubtype::Forest));
        }
    }

    #[test]
    fn test_land_classes_never_permit_water() {
        for class in TerrainClass::ALL.into_iter().filter(|c| !c.is_ocean()) {
            assert!(!class.permitted_subtypes().is_empty());
            assert!(!class.permits(TerrainSubtype::Water), "{class:?}");
        }
    }

    #[test]
    fn test_palette_within_permitted_tiles() {
        for subtype in TerrainSubtype::ALL {
            for tile in subtype.palette() {
                assert!(subtype.permits(*tile), "{subtype:?} palette has forbidden {tile:?}");
            }
        }
    }

    #[test]
    fn test_water_subtype_has_no_land_tiles() {
        assert!(TerrainSubtype::Water.permitted_tiles().iter().all(|t| t.is_water()));
        assert!(!TerrainSubtype::Water.permits(TileTerrain::MatureTrees));
    }

    #[test]
    fn test_streams_add_water_tiles_to_land() {
        for subtype in TerrainSubtype::ALL.into_iter().filter(|s| s.carries_streams()) {
            assert!(subtype.permits(TileTerrain::ShallowWater));
            assert!(subtype.permits(TileTerrain::WaterEdge));
        }
    }

    #[test]
    fn test_blockers() {
        assert!(!TileTerrain::DeepWater.is_passable());
        assert!(!TileTerrain::MatureTrees.is_passable());
        assert!(TileTerrain::ShallowWater.is_passable());
        assert!(TileTerrain::MatureTrees.blocks_sight());
        assert!(!TileTerrain::TallGrass.blocks_sight());
    }

    #[test]
    fn test_every_resource_kind_has_a_home() {
        for kind in ResourceKind::ALL {
            let reachable = TerrainSubtype::ALL
                .iter()
                .any(|s| s.palette().iter().any(|t| kind.fits(*t)));
            assert!(reachable, "{kind:?} can never be placed");
        }
    }
}
