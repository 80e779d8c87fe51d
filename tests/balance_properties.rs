//! Property-based tests for the balancer

use chrono::Utc;
use proptest::prelude::*;
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::collections::HashSet;
use teamup::balance::build_balanced_groups;
use teamup::store::{Interest, Registrant};
use uuid::Uuid;

fn pool(marketing: usize, software: usize, other: usize) -> Vec<Registrant> {
    let make = |interest: Interest, n: usize| {
        (0..n).map(move |_| Registrant {
            id: Uuid::new_v4(),
            name: "Student".into(),
            college: None,
            phone: Uuid::new_v4().to_string(),
            interest,
            assigned: false,
            group_id: None,
            is_dummy: false,
            created_at: Utc::now(),
        })
    };
    make(Interest::Marketing, marketing)
        .chain(make(Interest::Software, software))
        .chain(make(Interest::Other, other))
        .collect()
}

proptest! {
    #[test]
    fn membership_is_conserved(
        marketing in 0usize..40,
        software in 0usize..40,
        other in 0usize..40,
        group_size in 1usize..10,
        seed in any::<u64>(),
    ) {
        let input = pool(marketing, software, other);
        let mut rng = StdRng::seed_from_u64(seed);
        let groups = build_balanced_groups(&input, group_size, "🎯", &mut rng).unwrap();

        let total: usize = groups.iter().map(|g| g.members.len()).sum();
        prop_assert_eq!(total, input.len());

        let ids: HashSet<Uuid> = groups
            .iter()
            .flat_map(|g| g.members.iter().map(|m| m.id))
            .collect();
        prop_assert_eq!(ids.len(), input.len());
    }

    #[test]
    fn at_most_the_last_group_is_short(
        marketing in 0usize..40,
        software in 0usize..40,
        other in 0usize..40,
        group_size in 1usize..10,
        seed in any::<u64>(),
    ) {
        let input = pool(marketing, software, other);
        let mut rng = StdRng::seed_from_u64(seed);
        let groups = build_balanced_groups(&input, group_size, "🎯", &mut rng).unwrap();

        for group in &groups {
            prop_assert!(group.members.len() <= group_size);
        }
        if let Some((last, full)) = groups.split_last() {
            for group in full {
                prop_assert_eq!(group.members.len(), group_size);
            }
            prop_assert!(!last.members.is_empty());
        }
    }

    #[test]
    fn no_adjacent_repeats_unless_a_category_dominates(
        marketing in 1usize..30,
        software in 1usize..30,
        other in 1usize..30,
        seed in any::<u64>(),
    ) {
        let input = pool(marketing, software, other);
        let mut rng = StdRng::seed_from_u64(seed);
        // Group size of the whole pool keeps the merged order in one chunk.
        let groups = build_balanced_groups(&input, input.len(), "🎯", &mut rng).unwrap();
        prop_assert_eq!(groups.len(), 1);
        let merged = &groups[0].members;

        // A category may only repeat adjacently once the others are exhausted:
        // counting remaining members at each position, a repeat requires the
        // repeating category to outnumber the rest combined.
        let mut remaining = [marketing, software, other];
        let index = |i: Interest| Interest::ALL.iter().position(|x| *x == i).unwrap();
        for window in merged.windows(2) {
            let current = index(window[0].interest);
            remaining[current] -= 1;
            if window[1].interest == window[0].interest {
                let others: usize = remaining
                    .iter()
                    .enumerate()
                    .filter(|(i, _)| *i != current)
                    .map(|(_, n)| *n)
                    .sum();
                prop_assert!(
                    remaining[current] > others,
                    "category repeated while others still had members"
                );
            }
        }
    }
}
