//! Image URL construction for the basket CDN.
//!
//! Pure templating over the shard assignment: the builder never validates
//! the image number or touches the network.

use crate::shard::{ShardAssignment, ShardTable};

/// Requested resolution class; each maps to a fixed pixel-dimension path token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Tier {
    /// 100x100 thumbnail.
    Thumb,
    /// 246x328, the list-view size.
    #[default]
    Small,
    /// 516x688, the detail-view size.
    Big,
}

impl Tier {
    pub fn path_token(self) -> &'static str {
        match self {
            Tier::Thumb => "c100x100",
            Tier::Small => "c246x328",
            Tier::Big => "c516x688",
        }
    }

    /// Parse a user-facing size name ("thumb", "small", "big").
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "thumb" => Some(Tier::Thumb),
            "small" => Some(Tier::Small),
            "big" => Some(Tier::Big),
            _ => None,
        }
    }
}

/// Builds primary and fallback image URLs from a host pattern, the number of
/// known basket hosts, and a shard table.
#[derive(Debug, Clone)]
pub struct UrlBuilder {
    host_pattern: String,
    host_count: u32,
    table: ShardTable,
}

impl UrlBuilder {
    /// `host_pattern` must contain a `{shard}` placeholder; it is replaced by
    /// the zero-padded two-digit host number.
    pub fn new(host_pattern: impl Into<String>, host_count: u32, table: ShardTable) -> Self {
        Self {
            host_pattern: host_pattern.into(),
            host_count,
            table,
        }
    }

    pub fn host_count(&self) -> u32 {
        self.host_count
    }

    pub fn assign(&self, vendor_code: &str) -> ShardAssignment {
        self.table.assign(vendor_code)
    }

    fn base_for(&self, shard: u32) -> String {
        self.host_pattern.replace("{shard}", &format!("{shard:02}"))
    }

    fn image_path(&self, assignment: &ShardAssignment, vendor_code: &str, num: u32, tier: Tier) -> String {
        format!(
            "vol{}/part{}/{}/images/{}/{}.webp",
            assignment.vol,
            assignment.part,
            vendor_code,
            tier.path_token(),
            num
        )
    }

    /// URL on the host the shard table predicts for this code.
    pub fn primary_url(&self, vendor_code: &str, num: u32, tier: Tier) -> String {
        let assignment = self.table.assign(vendor_code);
        format!(
            "{}/{}",
            self.base_for(assignment.shard),
            self.image_path(&assignment, vendor_code, num, tier)
        )
    }

    /// Same path on every known host, lowest-numbered first. Used as the
    /// fallback sweep when the primary guess fails; always `host_count` long
    /// and always contains the primary URL.
    pub fn candidate_urls(&self, vendor_code: &str, num: u32, tier: Tier) -> Vec<String> {
        let assignment = self.table.assign(vendor_code);
        let path = self.image_path(&assignment, vendor_code, num, tier);
        (1..=self.host_count)
            .map(|shard| format!("{}/{}", self.base_for(shard), path))
            .collect()
    }
}
