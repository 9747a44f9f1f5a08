//! Shard assignment: maps a vendor code onto the CDN's basket partitions.
//!
//! The marketplace redraws its numeric ranges every so often, so the
//! breakpoint table is data (replaceable via config.toml), not code.

/// Shard used when a vendor code does not parse as a number.
pub const FALLBACK_SHARD: u32 = 1;

/// Placement of one vendor code on the CDN: basket host number plus the
/// `vol`/`part` directory buckets used in the image path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ShardAssignment {
    pub shard: u32,
    pub vol: u64,
    pub part: u64,
}

/// Ordered `(upper_bound, shard)` breakpoints with a catch-all shard for
/// codes above the highest bound. Bounds must be strictly ascending.
#[derive(Debug, Clone)]
pub struct ShardTable {
    ranges: Vec<(u64, u32)>,
    catch_all: u32,
}

impl ShardTable {
    pub fn new(ranges: Vec<(u64, u32)>, catch_all: u32) -> Self {
        debug_assert!(
            ranges.windows(2).all(|w| w[0].0 < w[1].0),
            "shard table bounds must be strictly ascending"
        );
        Self { ranges, catch_all }
    }

    /// Shard for a parsed numeric code: first breakpoint the code falls under,
    /// else the catch-all.
    pub fn shard_for(&self, nm_id: u64) -> u32 {
        self.ranges
            .iter()
            .find(|(upper, _)| nm_id < *upper)
            .map(|(_, shard)| *shard)
            .unwrap_or(self.catch_all)
    }

    /// Total assignment for a raw vendor code. Codes that do not parse as a
    /// non-negative integer map to shard 1 with zero buckets; that is the
    /// documented fallback, not an error.
    pub fn assign(&self, vendor_code: &str) -> ShardAssignment {
        match vendor_code.parse::<u64>() {
            Ok(nm_id) => ShardAssignment {
                shard: self.shard_for(nm_id),
                vol: nm_id / 100_000,
                part: nm_id / 1_000,
            },
            Err(_) => ShardAssignment {
                shard: FALLBACK_SHARD,
                vol: 0,
                part: 0,
            },
        }
    }
}

impl Default for ShardTable {
    /// Basket ranges as observed in 2025.
    fn default() -> Self {
        Self::new(
            vec![
                (14_400_000, 1),
                (28_800_000, 2),
                (43_200_000, 3),
                (72_000_000, 4),
                (100_800_000, 5),
                (106_200_000, 6),
                (111_600_000, 7),
                (117_000_000, 8),
                (131_400_000, 9),
                (160_200_000, 10),
                (165_600_000, 11),
                (185_400_000, 12),
                (214_200_000, 13),
                (243_000_000, 14),
                (280_800_000, 15),
                (318_600_000, 16),
                (360_000_000, 17),
                (405_000_000, 18),
                (450_000_000, 19),
                (495_000_000, 20),
                (540_000_000, 21),
                (585_000_000, 22),
                (630_000_000, 23),
                (675_000_000, 24),
                (720_000_000, 25),
                (765_000_000, 26),
                (810_000_000, 27),
                (855_000_000, 28),
                (900_000_000, 29),
                (945_000_000, 30),
            ],
            31,
        )
    }
}
