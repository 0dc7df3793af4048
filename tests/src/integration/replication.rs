//! # Replication
//!
//! Every write is mirrored on the owner's successor, which takes over the
//! owner's range when it fails.

#[cfg(test)]
mod tests {
    use crate::harness::TestRing;
    use chord_ring::{KeyLookup, PutOutcome};

    async fn settled_ring(count: usize) -> TestRing {
        let ring = TestRing::build(count).await;
        let settled = ring
            .settle_until(150, |r| r.is_converged() && r.fingers_correct())
            .await;
        assert!(settled, "ring never settled");
        ring
    }

    async fn store(ring: &TestRing, keys: &[String]) {
        let entry = ring.node(0);
        for key in keys {
            let owner = ring.route(&entry, key).await;
            let outcome = owner.put_key(key.clone(), key.as_bytes().to_vec()).await;
            assert_eq!(outcome, PutOutcome::Stored, "{key} on {}", owner.local());
        }
    }

    // =============================================================================
    // WRITES
    // =============================================================================

    #[tokio::test]
    async fn test_write_mirrored_on_successor() {
        let ring = settled_ring(4).await;
        let owner = ring.route(&ring.node(0), "alpha").await;
        owner.put_key("alpha".into(), b"one".to_vec()).await;

        let successor = ring.service(&owner.successor());
        let everything = successor
            .get_key_range(successor.local().key, successor.local().key)
            .expect("range");
        assert!(everything.contains(&("alpha".to_string(), b"one".to_vec())));
        assert_eq!(successor.get_key("alpha"), KeyLookup::NotMine);
    }

    #[tokio::test]
    async fn test_non_owner_rejects_write() {
        let ring = settled_ring(4).await;
        let owner = ring.route(&ring.node(0), "beta").await;
        let other = ring
            .live()
            .into_iter()
            .find(|n| n.local() != owner.local())
            .expect("another node");

        assert_eq!(
            other.put_key("beta".into(), b"x".to_vec()).await,
            PutOutcome::NotMine
        );
        assert_eq!(owner.get_key("beta"), KeyLookup::Missing);
    }

    // =============================================================================
    // FAILOVER
    // =============================================================================

    #[tokio::test]
    async fn test_values_survive_owner_failure() {
        let ring = settled_ring(6).await;
        let keys: Vec<String> = (0..30).map(|i| format!("key-{i}")).collect();
        store(&ring, &keys).await;

        let victim = ring.service(&ring.ring_order()[2]);
        ring.kill(&victim);
        let healed = ring
            .settle_until(200, |r| r.is_converged() && r.references_only_live_nodes())
            .await;
        assert!(healed, "ring never healed");

        let entry = ring.node(0);
        let entry = if entry.local() == victim.local() {
            ring.node(1)
        } else {
            entry
        };
        for key in &keys {
            let owner = ring.route(&entry, key).await;
            assert_eq!(
                owner.get_key(key),
                KeyLookup::Found(key.as_bytes().to_vec()),
                "{key} lost from {}",
                owner.local()
            );
        }
    }

    #[tokio::test]
    async fn test_accepted_predecessor_shares_its_entries() {
        let ring = settled_ring(3).await;
        let order = ring.ring_order();
        let predecessor = ring.service(&order[0]);
        let successor = ring.service(&order[1]);

        let space = ring.space();
        let (s_key, p_key) = (successor.local().key, predecessor.local().key);
        let key = (0..)
            .map(|i| format!("gamma-{i}"))
            .find(|k| space.between_end_inclusive(space.hash(k), s_key, p_key))
            .expect("some key outside the successor's range");
        predecessor.put_key_backup(key.clone(), b"three".to_vec());

        ring.kill(&predecessor);
        successor.check_predecessor().await;
        ring.network.bring_up(&predecessor.local().address);
        successor.notify(predecessor.local()).await;

        let everything = successor
            .get_key_range(successor.local().key, successor.local().key)
            .expect("range");
        assert!(everything.contains(&(key, b"three".to_vec())));
    }
}
