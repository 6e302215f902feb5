//! Coarse uniform bucket grid used to prune collision candidates.

use skirmish_core::{EntityId, Footprint, WorldPoint};

/// Spatial hash over a fixed, tile-size-independent bucket partition.
///
/// Agents are hashed into the bucket under each of their four corners, so a
/// large body can occupy up to four buckets. The index is an owned component
/// of the zone, fully rebuilt by one explicit call per tick; positions drift
/// every tick, so nothing is carried over between rebuilds.
#[derive(Clone, Debug)]
pub struct SpatialIndex {
    columns: u32,
    rows: u32,
    zone_width: f32,
    zone_height: f32,
    buckets: Vec<Vec<EntityId>>,
}

impl SpatialIndex {
    /// Creates an empty index partitioning the zone into `columns x rows`
    /// buckets.
    #[must_use]
    pub fn new(columns: u32, rows: u32, zone_width: f32, zone_height: f32) -> Self {
        let columns = columns.max(1);
        let rows = rows.max(1);
        Self {
            columns,
            rows,
            zone_width,
            zone_height,
            buckets: vec![Vec::new(); columns as usize * rows as usize],
        }
    }

    /// Number of buckets in the partition.
    #[must_use]
    pub fn bucket_count(&self) -> usize {
        self.buckets.len()
    }

    /// Entity ids currently hashed into the bucket, for inspection.
    #[must_use]
    pub fn bucket(&self, index: usize) -> &[EntityId] {
        self.buckets.get(index).map_or(&[], Vec::as_slice)
    }

    /// Removes every entry, keeping the allocated buckets.
    pub fn clear(&mut self) {
        for bucket in &mut self.buckets {
            bucket.clear();
        }
    }

    /// Rebuilds the index from scratch out of the provided agent bodies.
    pub fn rebuild_with(&mut self, agents: impl Iterator<Item = (EntityId, Footprint)>) {
        self.clear();
        let mut count = 0_usize;
        for (id, footprint) in agents {
            self.insert(id, &footprint);
            count += 1;
        }
        log::debug!(
            "spatial index rebuilt: {} agents over {} buckets",
            count,
            self.buckets.len()
        );
    }

    /// Hashes a single agent into the bucket under each of its corners.
    pub fn insert(&mut self, id: EntityId, footprint: &Footprint) {
        for corner in footprint.corners() {
            let index = self.bucket_of(corner);
            let bucket = &mut self.buckets[index];
            if !bucket.contains(&id) {
                bucket.push(id);
            }
        }
    }

    /// Deduplicated candidate ids from the buckets under the body's corners.
    ///
    /// Corner hashing can place the same pair of bodies in several shared
    /// buckets, so the union is deduplicated before any candidate testing;
    /// without this a single collision would be reported once per shared
    /// bucket.
    #[must_use]
    pub fn candidates(&self, footprint: &Footprint) -> Vec<EntityId> {
        let mut found = Vec::new();
        for corner in footprint.corners() {
            found.extend_from_slice(&self.buckets[self.bucket_of(corner)]);
        }
        found.sort_unstable();
        found.dedup();
        found
    }

    /// Bucket index containing the provided point; points outside the zone
    /// clamp to the nearest edge bucket.
    fn bucket_of(&self, point: WorldPoint) -> usize {
        let cell_width = self.zone_width / self.columns as f32;
        let cell_height = self.zone_height / self.rows as f32;
        let column = ((point.x() / cell_width).floor() as i64).clamp(0, i64::from(self.columns) - 1);
        let row = ((point.y() / cell_height).floor() as i64).clamp(0, i64::from(self.rows) - 1);
        row as usize * self.columns as usize + column as usize
    }
}
