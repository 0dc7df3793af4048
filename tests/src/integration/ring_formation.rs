//! # Ring Formation
//!
//! Nodes joining one at a time through an introducer settle into a single
//! ring ordered by key, then fill in their finger tables.

#[cfg(test)]
mod tests {
    use crate::harness::TestRing;
    use chord_ring::ChordConfig;

    // =============================================================================
    // SOLO AND PAIR
    // =============================================================================

    #[tokio::test]
    async fn test_solo_node_is_its_own_neighbour() {
        let ring = TestRing::build(1).await;
        ring.tick().await;

        let node = ring.node(0);
        assert_eq!(node.successor(), node.local());
        assert_eq!(node.predecessor(), Some(node.local()));
        assert!(node.snapshot().is_solo());
        assert!(ring.is_converged());
    }

    #[tokio::test]
    async fn test_pair_points_at_each_other() {
        let ring = TestRing::build(2).await;
        assert!(ring.settle_until(10, TestRing::is_converged).await);

        let (a, b) = (ring.node(0), ring.node(1));
        assert_eq!(a.successor(), b.local());
        assert_eq!(a.predecessor(), Some(b.local()));
        assert_eq!(b.successor(), a.local());
        assert_eq!(b.predecessor(), Some(a.local()));
    }

    // =============================================================================
    // LARGER RINGS
    // =============================================================================

    #[tokio::test]
    async fn test_eight_nodes_converge_in_key_order() {
        let ring = TestRing::build(8).await;
        assert!(ring.settle_until(50, TestRing::is_converged).await);
        assert_eq!(ring.ring_order().len(), 8);
    }

    #[tokio::test]
    async fn test_fingers_point_at_owners_of_their_starts() {
        let ring = TestRing::build(8).await;
        let settled = ring
            .settle_until(120, |r| r.is_converged() && r.fingers_correct())
            .await;
        assert!(settled, "fingers never settled");
    }

    #[tokio::test]
    async fn test_join_through_any_member() {
        let mut ring = TestRing::build(4).await;
        assert!(ring.settle_until(30, TestRing::is_converged).await);

        let introducer = ring.node(3).local().address;
        let newcomer = ring.add_fresh_node("late");
        newcomer.join(&introducer).await.expect("join");

        assert!(ring.settle_until(30, TestRing::is_converged).await);
        assert_eq!(ring.ring_order().len(), 5);
    }

    #[tokio::test]
    async fn test_small_key_space_ring() {
        let mut ring = TestRing::new(ChordConfig::for_testing().with_bits(8));
        let first = ring.add_fresh_node("alpha");
        let second = ring.add_fresh_node("beta");
        let third = ring.add_fresh_node("gamma");

        second.join(&first.local().address).await.expect("join");
        ring.settle(2).await;
        third.join(&second.local().address).await.expect("join");

        assert!(ring.settle_until(30, TestRing::is_converged).await);
    }
}
