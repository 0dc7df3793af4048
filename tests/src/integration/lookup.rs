//! # Lookups
//!
//! `FindSuccessor` from any member returns the owner of the key, and with
//! settled fingers it gets there in a logarithmic number of hops.

#[cfg(test)]
mod tests {
    use crate::harness::TestRing;
    use chord_ring::{Key, KeySpace};

    fn probe_keys(space: KeySpace, count: usize) -> Vec<Key> {
        (0..count)
            .map(|i| space.hash(&format!("probe-{i}")))
            .collect()
    }

    // =============================================================================
    // CORRECTNESS
    // =============================================================================

    #[tokio::test]
    async fn test_every_member_resolves_every_key_to_its_owner() {
        let ring = TestRing::build(8).await;
        assert!(
            ring.settle_until(120, |r| r.is_converged() && r.fingers_correct())
                .await
        );

        for node in ring.live() {
            for key in probe_keys(ring.space(), 40) {
                let owner = node.find_successor(key).await.expect("lookup");
                assert_eq!(owner, ring.expected_owner(key), "key {key} from {}", node.local());
            }
        }
    }

    #[tokio::test]
    async fn test_node_keys_resolve_to_the_node_itself() {
        let ring = TestRing::build(6).await;
        assert!(ring.settle_until(50, TestRing::is_converged).await);

        let entry = ring.node(0);
        for member in ring.ring_order() {
            let owner = entry.find_successor(member.key).await.expect("lookup");
            assert_eq!(owner, member);
        }
    }

    #[tokio::test]
    async fn test_lookups_correct_before_fingers_settle() {
        let ring = TestRing::build(8).await;
        assert!(ring.settle_until(50, TestRing::is_converged).await);

        let entry = ring.node(5);
        for key in probe_keys(ring.space(), 40) {
            let owner = entry.find_successor(key).await.expect("lookup");
            assert_eq!(owner, ring.expected_owner(key));
        }
    }

    // =============================================================================
    // HOP COUNT
    // =============================================================================

    #[tokio::test]
    async fn test_lookups_take_logarithmic_hops() {
        let ring = TestRing::build(32).await;
        let settled = ring
            .settle_until(200, |r| r.is_converged() && r.fingers_correct())
            .await;
        assert!(settled, "ring never settled");

        let keys = probe_keys(ring.space(), 64);
        let mut total_hops = 0;
        let mut lookups = 0;
        for node in ring.live().iter().step_by(4) {
            for &key in &keys {
                let before = ring.network.delivered();
                let owner = node.find_successor(key).await.expect("lookup");
                total_hops += ring.network.delivered() - before;
                lookups += 1;
                assert_eq!(owner, ring.expected_owner(key));
            }
        }

        let average = total_hops as f64 / lookups as f64;
        assert!(average <= 5.0, "average hops {average:.2} over {lookups} lookups");
    }
}
