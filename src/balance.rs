//! Group balancing
//!
//! The one real algorithm in the system: partition a registrant pool into
//! fixed-size groups so that interest categories are spread across groups
//! instead of clumping. Pure function of its inputs plus the injected random
//! source, no I/O; callers decide which cohort (real or synthetic) goes in.

use rand::seq::{IndexedRandom, SliceRandom};
use rand::Rng;

use crate::error::{Error, Result};
use crate::store::{Interest, Registrant};

/// Theme names cycled through when naming generated groups.
pub const GROUP_THEMES: [&str; 15] = [
    "Tech Titans",
    "Innovation Squad",
    "Digital Dynamos",
    "Code Crusaders",
    "Marketing Mavericks",
    "Growth Hackers",
    "Creative Collective",
    "Data Drivers",
    "Future Founders",
    "Startup Stars",
    "Solution Seekers",
    "Impact Makers",
    "Vision Team",
    "Success Squad",
    "Dream Team",
];

/// A proposed group: a name and its member subset. Nothing is persisted here.
#[derive(Debug, Clone)]
pub struct ProposedGroup {
    pub name: String,
    pub members: Vec<Registrant>,
}

/// Pick a random theme name, used when naming self-registered groups.
pub fn random_theme(rng: &mut impl Rng) -> &'static str {
    GROUP_THEMES
        .choose(rng)
        .copied()
        .unwrap_or(GROUP_THEMES[0])
}

/// Partition `pool` into groups of `group_size` (the last may be smaller),
/// interleaving interest categories round-robin so no category monopolizes a
/// group until the smaller categories run out.
///
/// An empty pool yields an empty list. `group_size` of zero is a contract
/// violation and fails with `InvalidArgument`.
pub fn build_balanced_groups(
    pool: &[Registrant],
    group_size: usize,
    prefix: &str,
    rng: &mut impl Rng,
) -> Result<Vec<ProposedGroup>> {
    if group_size == 0 {
        return Err(Error::InvalidArgument(
            "group size must be at least 1".into(),
        ));
    }
    if pool.is_empty() {
        return Ok(Vec::new());
    }

    let mut shuffled: Vec<&Registrant> = pool.iter().collect();
    shuffled.shuffle(rng);

    let merged = interleave_by_interest(&shuffled);

    let mut groups = Vec::with_capacity(merged.len().div_ceil(group_size));
    for (index, chunk) in merged.chunks(group_size).enumerate() {
        let theme = GROUP_THEMES[index % GROUP_THEMES.len()];
        groups.push(ProposedGroup {
            name: format!("{prefix} {theme} #{}", index + 1),
            members: chunk.iter().map(|r| (*r).clone()).collect(),
        });
    }
    Ok(groups)
}

/// Bucket by interest (preserving shuffled order within each bucket), then
/// merge round-robin in the fixed [`Interest::ALL`] order. An exhausted
/// category is simply skipped at that round.
fn interleave_by_interest<'a>(shuffled: &[&'a Registrant]) -> Vec<&'a Registrant> {
    let buckets: Vec<Vec<&Registrant>> = Interest::ALL
        .iter()
        .map(|interest| {
            shuffled
                .iter()
                .filter(|r| r.interest == *interest)
                .copied()
                .collect()
        })
        .collect();

    let max_len = buckets.iter().map(Vec::len).max().unwrap_or(0);
    let mut merged = Vec::with_capacity(shuffled.len());
    for round in 0..max_len {
        for bucket in &buckets {
            if let Some(registrant) = bucket.get(round) {
                merged.push(*registrant);
            }
        }
    }
    merged
}
