//! Cache statistics for tuning and diagnostics.

/// Snapshot of one tier's counters.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct CacheStats {
    /// Requests answered from a resident entry.
    pub hits: u64,
    /// Requests that had to generate the value.
    pub misses: u64,
    /// Requests that waited on another caller's in-flight generation.
    pub collapsed: u64,
    /// Entries removed to stay under capacity.
    pub evictions: u64,
    /// Entries currently resident.
    pub resident: usize,
    /// Maximum number of resident entries.
    pub capacity: usize,
}

impl CacheStats {
    /// Fraction of lookups served without generating (0.0 to 1.0).
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn hit_rate(&self) -> f64 {
        let served = self.hits + self.collapsed;
        let total = served + self.misses;
        if total == 0 {
            0.0
        } else {
            served as f64 / total as f64
        }
    }

    /// Fraction of capacity in use (0.0 to 1.0).
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn fill_ratio(&self) -> f64 {
        if self.capacity == 0 {
            0.0
        } else {
            self.resident as f64 / self.capacity as f64
        }
    }

    /// Formats the counters as a single human-readable line.
    #[must_use]
    pub fn summary(&self) -> String {
        format!(
            "Hits: {} | Misses: {} | Collapsed: {} | Rate: {:.1}% | Resident: {}/{} | Evicted: {}",
            self.hits,
            self.misses,
            self.collapsed,
            self.hit_rate() * 100.0,
            self.resident,
            self.capacity,
            self.evictions
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hit_rate_empty() {
        assert!(CacheStats::default().hit_rate().abs() < f64::EPSILON);
    }

    #[test]
    fn test_hit_rate_counts_collapsed_as_served() {
        let stats = CacheStats {
            hits: 2,
            misses: 1,
            collapsed: 1,
            ..CacheStats::default()
        };
        assert!((stats.hit_rate() - 0.75).abs() < 1e-9);
    }

    #[test]
    fn test_summary_mentions_residency() {
        let stats = CacheStats {
            resident: 3,
            capacity: 8,
            ..CacheStats::default()
        };
        assert!(stats.summary().contains("Resident: 3/8"));
        assert!((stats.fill_ratio() - 0.375).abs() < 1e-9);
    }
}
