//! Property tests for batch partitioning and priority filtering

use proptest::prelude::*;
use reachable::config::ProbeConfig;
use reachable::service::{filter_by_priority, partition, sort_by_priority};
use reachable::Server;

fn servers_strategy() -> impl Strategy<Value = Vec<Server>> {
    prop::collection::vec((0u32..50, -3i64..6), 0..300).prop_map(|pairs| {
        pairs
            .into_iter()
            .map(|(id, priority)| Server::new(format!("https://s{id}.example"), priority))
            .collect()
    })
}

proptest! {
    #[test]
    fn partition_never_drops_or_duplicates(
        servers in servers_strategy(),
        batch_size in -5i64..64,
    ) {
        let limit = ProbeConfig::new(batch_size, 1000).batch_limit();
        let batches = partition(&servers, limit);

        let expected_batches = match limit {
            Some(size) => servers.len().div_ceil(size),
            None => 1,
        };
        prop_assert_eq!(batches.len(), expected_batches);

        if let Some(size) = limit {
            prop_assert!(batches.iter().all(|batch| batch.len() <= size && !batch.is_empty()));
        }

        let flattened: Vec<Server> = batches.concat();
        prop_assert_eq!(flattened, servers);
    }

    #[test]
    fn filter_keeps_only_requested_tier(
        servers in servers_strategy(),
        priority in prop::option::of(-3i64..6),
    ) {
        let filtered = filter_by_priority(servers.clone(), priority);

        match priority {
            Some(p) => {
                prop_assert!(filtered.iter().all(|s| s.priority == p));
                prop_assert_eq!(
                    filtered.len(),
                    servers.iter().filter(|s| s.priority == p).count()
                );
            }
            None => prop_assert_eq!(filtered, servers),
        }
    }

    #[test]
    fn sort_is_ascending_and_stable(mut servers in servers_strategy()) {
        let original = servers.clone();
        sort_by_priority(&mut servers);

        prop_assert!(servers.windows(2).all(|pair| pair[0].priority <= pair[1].priority));

        // within one tier, order matches the input
        for tier in -3i64..6 {
            let before: Vec<_> = original.iter().filter(|s| s.priority == tier).collect();
            let after: Vec<_> = servers.iter().filter(|s| s.priority == tier).collect();
            prop_assert_eq!(before, after);
        }
    }
}
