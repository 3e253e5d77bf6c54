//! # Resource Clusters
//!
//! Resources appear in spatially coherent clusters, not as independent
//! per-tile rolls. Placement is a plan carried between passes:
//!
//! 1. **Detect**: sweep a lattice anchored to absolute tile coordinates
//!    around the chunk; strong detection noise marks a candidate center
//! 2. **Filter**: keep candidates that reach at least one tile of the
//!    finished terrain grid their resource can sit on
//! 3. **Populate**: walk accepted clusters in lattice order, spawning nodes
//!    with a probability that decays with distance from the center
//!
//! The lattice extends one maximum cluster radius past every chunk edge,
//! so a cluster centered in a neighbor is seen identically from both sides.

use std::sync::Arc;

use crate::block::BlockData;
use crate::chunk::Tile;
use crate::config::GenerationConfig;
use crate::coords::{AbsoluteCoord, ChunkCoord, GridCoord, CHUNK_SIZE};
use crate::noise::{NoiseChannel, SimplexNoise, WorldSeed};
use crate::terrain::{Rarity, ResourceKind};

/// A detected resource cluster.
#[derive(Clone, Debug, PartialEq)]
pub struct ResourceCluster {
    /// Center tile on the detection lattice.
    pub center: AbsoluteCoord,
    /// Resource this cluster spawns.
    pub kind: ResourceKind,
    /// Radius in tiles.
    pub radius: f64,
    /// Spawn density at the center.
    pub density: f64,
    /// Detection strength in (threshold, 1].
    pub intensity: f64,
}

impl ResourceCluster {
    /// Euclidean distance from the center to `abs`, in tiles.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn distance(&self, abs: AbsoluteCoord) -> f64 {
        (self.center.distance_squared(abs) as f64).sqrt()
    }

    /// Returns true if `abs` lies within the radius.
    #[must_use]
    pub fn covers(&self, abs: AbsoluteCoord) -> bool {
        self.distance(abs) <= self.radius
    }

    /// Returns true if any tile of `chunk` lies within the radius.
    #[must_use]
    pub fn reaches(&self, chunk: ChunkCoord) -> bool {
        let origin = chunk.origin();
        let nearest = AbsoluteCoord::new(
            self.center.x.clamp(origin.x, origin.x + CHUNK_SIZE - 1),
            self.center.y.clamp(origin.y, origin.y + CHUNK_SIZE - 1),
        );
        self.covers(nearest)
    }
}

/// A single resource node on a tile.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ResourceNode {
    /// Resource kind.
    pub kind: ResourceKind,
    /// Rarity grade.
    pub rarity: Rarity,
    /// Center of the cluster that spawned this node.
    pub cluster: AbsoluteCoord,
}

/// Cluster state carried from detection to population.
#[derive(Clone, Debug, PartialEq)]
pub struct ClusterPlan {
    chunk: ChunkCoord,
    candidates: Vec<ResourceCluster>,
    accepted: Vec<ResourceCluster>,
}

impl ClusterPlan {
    /// Chunk this plan was built for.
    #[must_use]
    pub const fn chunk(&self) -> ChunkCoord {
        self.chunk
    }

    /// Every detected candidate reaching the chunk, in lattice order.
    #[must_use]
    pub fn candidates(&self) -> &[ResourceCluster] {
        &self.candidates
    }

    /// Candidates that survived the terrain filter, in lattice order.
    #[must_use]
    pub fn accepted(&self) -> &[ResourceCluster] {
        &self.accepted
    }

    /// Keeps candidates that cover at least one compatible tile of `tiles`.
    pub fn filter_by_terrain(&mut self, tiles: &[Tile]) {
        let origin = self.chunk.origin();
        self.accepted = self
            .candidates
            .iter()
            .filter(|cluster| {
                tiles.iter().enumerate().any(|(index, tile)| {
                    cluster.kind.fits(tile.terrain) && cluster.covers(tile_position(origin, index))
                })
            })
            .cloned()
            .collect();
    }

    /// Consumes the plan, returning the accepted clusters.
    #[must_use]
    pub fn into_accepted(self) -> Vec<ResourceCluster> {
        self.accepted
    }
}

/// Noise channels and rules for cluster placement.
#[derive(Clone, Debug)]
pub struct ClusterField {
    config: Arc<GenerationConfig>,
    detect: SimplexNoise,
    kind: SimplexNoise,
    density: SimplexNoise,
    rarity: SimplexNoise,
}

impl ClusterField {
    /// Creates the cluster field for a world.
    #[must_use]
    pub fn new(seed: WorldSeed, config: Arc<GenerationConfig>) -> Self {
        Self {
            config,
            detect: SimplexNoise::new(seed.channel(NoiseChannel::ClusterDetect)),
            kind: SimplexNoise::new(seed.channel(NoiseChannel::ClusterKind)),
            density: SimplexNoise::new(seed.channel(NoiseChannel::ClusterDensity)),
            rarity: SimplexNoise::new(seed.channel(NoiseChannel::ClusterRarity)),
        }
    }

    /// Sweeps the detection lattice around `chunk`.
    #[must_use]
    #[allow(clippy::cast_possible_truncation)]
    pub fn detect(&self, chunk: ChunkCoord) -> ClusterPlan {
        let rules = &self.config.local;
        let step = i64::from(rules.cluster_step);
        let stride = rules.cluster_step as usize;
        let margin = rules.max_cluster_radius();
        let origin = chunk.origin();

        let first = |min: i64| (min + step - 1).div_euclid(step) * step;
        let (min_x, max_x) = (origin.x - margin, origin.x + CHUNK_SIZE - 1 + margin);
        let (min_y, max_y) = (origin.y - margin, origin.y + CHUNK_SIZE - 1 + margin);

        let mut candidates = Vec::new();
        for y in (first(min_y)..=max_y).step_by(stride) {
            for x in (first(min_x)..=max_x).step_by(stride) {
                if let Some(cluster) = self.candidate_at(AbsoluteCoord::new(x, y)) {
                    if cluster.reaches(chunk) {
                        candidates.push(cluster);
                    }
                }
            }
        }

        ClusterPlan {
            chunk,
            candidates,
            accepted: Vec::new(),
        }
    }

    /// Places nodes for every accepted cluster. The first cluster in
    /// lattice order to claim a tile keeps it.
    ///
    /// Tiles of a resource-area block get a flat spawn boost. The boost is
    /// per tile, so a cluster straddling two blocks stays the same cluster on
    /// both sides and only its node density differs.
    ///
    /// # Returns
    ///
    /// Number of nodes placed.
    pub fn populate(&self, plan: &ClusterPlan, parent: &BlockData, tiles: &mut [Tile]) -> usize {
        let origin = plan.chunk.origin();
        let boost = if parent.has_resource_area {
            self.config.local.resource_area_boost
        } else {
            0.0
        };
        let mut placed = 0;

        for cluster in &plan.accepted {
            for (index, tile) in tiles.iter_mut().enumerate() {
                if tile.resource.is_some() || !cluster.kind.fits(tile.terrain) {
                    continue;
                }
                let abs = tile_position(origin, index);
                if !cluster.covers(abs) {
                    continue;
                }
                if let Some(rarity) = self.spawn(cluster, abs, boost) {
                    tile.resource = Some(ResourceNode {
                        kind: cluster.kind,
                        rarity,
                        cluster: cluster.center,
                    });
                    placed += 1;
                }
            }
        }
        placed
    }

    #[allow(clippy::cast_possible_truncation)]
    fn candidate_at(&self, point: AbsoluteCoord) -> Option<ResourceCluster> {
        let noise = &self.config.noise;
        let rules = &self.config.local;
        let (x, y) = point.as_f64();

        let intensity = self.detect.layer(&noise.cluster_detect, x, y).abs();
        if intensity <= rules.detect_above {
            return None;
        }

        let kinds = ResourceKind::ALL.len() as u32;
        let pick = self
            .kind
            .sample_discrete(x * noise.cluster_kind.frequency, y * noise.cluster_kind.frequency, kinds);

        Some(ResourceCluster {
            center: point,
            kind: ResourceKind::ALL[pick as usize],
            radius: rules.radius_base + intensity * rules.radius_scale,
            density: rules.density_base + intensity * rules.density_scale,
            intensity,
        })
    }

    /// Rolls one tile of `cluster`; `Some` carries the rarity of a spawned node.
    fn spawn(&self, cluster: &ResourceCluster, abs: AbsoluteCoord, boost: f64) -> Option<Rarity> {
        let noise = &self.config.noise;
        let rules = &self.config.local;
        let (x, y) = abs.as_f64();

        let falloff = 1.0 - cluster.distance(abs) / cluster.radius;
        let chance =
            cluster.density * falloff + self.density.layer(&noise.cluster_density, x, y) * rules.density_jitter + boost;
        if chance <= rules.spawn_above {
            return None;
        }

        let score = cluster.intensity * falloff + self.rarity.layer(&noise.cluster_rarity, x, y) * rules.rarity_jitter;
        Some(if score > rules.epic_above {
            Rarity::Epic
        } else if score > rules.rare_above {
            Rarity::Rare
        } else {
            Rarity::Common
        })
    }
}

/// Absolute position of the tile at row-major `index` in a chunk.
#[allow(clippy::cast_possible_wrap)]
pub(crate) fn tile_position(origin: AbsoluteCoord, index: usize) -> AbsoluteCoord {
    let index = index as i64;
    origin.offset(index % CHUNK_SIZE, index / CHUNK_SIZE)
}
