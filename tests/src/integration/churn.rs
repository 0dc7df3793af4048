//! # Churn
//!
//! Crashed nodes stop answering without warning. Survivors detect this
//! through failed calls and liveness probes and repair the ring around them.

#[cfg(test)]
mod tests {
    use crate::harness::TestRing;

    async fn settled_ring(count: usize) -> TestRing {
        let ring = TestRing::build(count).await;
        let settled = ring
            .settle_until(150, |r| r.is_converged() && r.fingers_correct())
            .await;
        assert!(settled, "ring never settled");
        ring
    }

    // =============================================================================
    // DETECTION
    // =============================================================================

    #[tokio::test]
    async fn test_dead_predecessor_cleared_in_one_check() {
        let ring = settled_ring(5).await;
        let order = ring.ring_order();
        let victim = ring.service(&order[2]);
        let successor = ring.service(&order[3]);

        ring.kill(&victim);
        assert_eq!(successor.predecessor(), Some(order[2].clone()));

        successor.check_predecessor().await;
        assert_eq!(successor.predecessor(), None);
    }

    #[tokio::test]
    async fn test_live_predecessor_kept() {
        let ring = settled_ring(4).await;
        for node in ring.live() {
            let before = node.predecessor();
            node.check_predecessor().await;
            assert_eq!(node.predecessor(), before);
        }
    }

    #[tokio::test]
    async fn test_stabilize_moves_off_dead_successor() {
        let ring = settled_ring(6).await;
        let order = ring.ring_order();
        let predecessor = ring.service(&order[1]);
        let victim = ring.service(&order[2]);

        ring.kill(&victim);
        predecessor.stabilize().await;

        assert_ne!(predecessor.successor(), order[2]);
    }

    // =============================================================================
    // REPAIR
    // =============================================================================

    #[tokio::test]
    async fn test_ring_heals_around_single_failure() {
        let ring = settled_ring(6).await;
        let victim = ring.service(&ring.ring_order()[4]);
        ring.kill(&victim);

        let healed = ring
            .settle_until(200, |r| r.is_converged() && r.references_only_live_nodes())
            .await;
        assert!(healed, "ring never healed");
        assert_eq!(ring.ring_order().len(), 5);
    }

    #[tokio::test]
    async fn test_ring_heals_around_two_separate_failures() {
        let ring = settled_ring(8).await;
        let order = ring.ring_order();
        ring.kill(&ring.service(&order[1]));
        ring.kill(&ring.service(&order[5]));

        let healed = ring
            .settle_until(200, |r| r.is_converged() && r.references_only_live_nodes())
            .await;
        assert!(healed, "ring never healed");
    }

    #[tokio::test]
    async fn test_lookups_reach_live_owners_after_failure() {
        let ring = settled_ring(8).await;
        ring.kill(&ring.service(&ring.ring_order()[3]));
        assert!(
            ring.settle_until(200, |r| r.is_converged() && r.references_only_live_nodes())
                .await
        );

        for node in ring.live() {
            for i in 0..20 {
                let key = ring.space().hash(&format!("after-{i}"));
                let owner = node.find_successor(key).await.expect("lookup");
                assert_eq!(owner, ring.expected_owner(key));
            }
        }
    }

    #[tokio::test]
    async fn test_last_survivor_becomes_solo() {
        let ring = settled_ring(2).await;
        let survivor = ring.node(0);
        ring.kill(&ring.node(1));

        assert!(ring.settle_until(20, TestRing::is_converged).await);
        assert_eq!(survivor.successor(), survivor.local());
        assert_eq!(survivor.predecessor(), Some(survivor.local()));
    }
}
