//! Coordinator Tests
//!
//! Exercises the reorder/deletion coordinators against an in-memory fake
//! store with failure injection, plus one pass over the real SQLite store.

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
    use std::sync::Arc;

    use async_trait::async_trait;
    use tokio::sync::{Mutex, Notify};

    use crate::coordinator::{DeletionSync, ReorderSync, SyncOutcome, TripView};
    use crate::domain::{
        DomainError, DomainResult, ItemKind, ItineraryItem, PositionChange, Trip,
    };
    use crate::repository::{
        init_db, BatchOutcome, ItineraryRepository, ItineraryStore, Repository, TripRepository,
    };

    const TRIP: u32 = 1;

    fn item(id: u32, position: f64) -> ItineraryItem {
        ItineraryItem::new(id, TRIP, format!("Stop {}", id), ItemKind::Tour, position)
    }

    fn ids(items: &[ItineraryItem]) -> Vec<u32> {
        items.iter().map(|i| i.id).collect()
    }

    /// In-memory store with injectable failures
    #[derive(Default)]
    struct FakeStore {
        items: Mutex<Vec<ItineraryItem>>,
        /// Ids whose position writes are rejected (partial batch failure)
        reject_ids: Mutex<Vec<u32>>,
        /// Whole-request failures
        fail_updates: AtomicBool,
        fail_deletes: AtomicBool,
        /// Blocks the next update until notified
        update_gate: Mutex<Option<Arc<Notify>>>,
        update_calls: AtomicUsize,
        delete_calls: AtomicUsize,
        last_batch_size: AtomicUsize,
    }

    impl FakeStore {
        fn with_items(items: Vec<ItineraryItem>) -> Arc<Self> {
            Arc::new(Self {
                items: Mutex::new(items),
                ..Default::default()
            })
        }

    }

    async fn view_over(store: &Arc<FakeStore>) -> TripView {
        let store: Arc<dyn ItineraryStore> = store.clone();
        TripView::load(TRIP, store).await.expect("load failed")
    }

    #[async_trait]
    impl ItineraryStore for FakeStore {
        async fn update_item_position(
            &self,
            trip_id: u32,
            id: u32,
            position: f64,
        ) -> DomainResult<()> {
            let change = PositionChange { id, position };
            let outcome = self.update_positions(trip_id, &[change]).await?;
            if outcome.all_succeeded() {
                Ok(())
            } else {
                Err(DomainError::NotFound(format!("Item {} not found", id)))
            }
        }

        async fn update_positions(
            &self,
            _trip_id: u32,
            changes: &[PositionChange],
        ) -> DomainResult<BatchOutcome> {
            self.update_calls.fetch_add(1, Ordering::SeqCst);
            self.last_batch_size.store(changes.len(), Ordering::SeqCst);

            let gate = self.update_gate.lock().await.take();
            if let Some(gate) = gate {
                gate.notified().await;
            }
            if self.fail_updates.load(Ordering::SeqCst) {
                return Err(DomainError::Internal("network down".to_string()));
            }

            let reject = self.reject_ids.lock().await.clone();
            let mut items = self.items.lock().await;
            let mut outcome = BatchOutcome::default();
            for change in changes {
                if reject.contains(&change.id) {
                    outcome.failed.push(change.id);
                    continue;
                }
                match items.iter_mut().find(|i| i.id == change.id) {
                    Some(item) => item.position = change.position,
                    None => outcome.failed.push(change.id),
                }
            }
            items.sort_by(|a, b| a.position.partial_cmp(&b.position).unwrap());
            Ok(outcome)
        }

        async fn delete_item(&self, id: u32) -> DomainResult<()> {
            self.delete_calls.fetch_add(1, Ordering::SeqCst);
            if self.fail_deletes.load(Ordering::SeqCst) {
                return Err(DomainError::Internal("network down".to_string()));
            }
            let mut items = self.items.lock().await;
            let before = items.len();
            items.retain(|i| i.id != id);
            if items.len() == before {
                return Err(DomainError::NotFound(format!("Item {} not found", id)));
            }
            Ok(())
        }

        async fn fetch_ordered_items(&self, _trip_id: u32) -> DomainResult<Vec<ItineraryItem>> {
            let mut items = self.items.lock().await.clone();
            items.sort_by(|a, b| a.position.partial_cmp(&b.position).unwrap());
            Ok(items)
        }
    }

    #[tokio::test]
    async fn test_move_persists_single_change() {
        let store = FakeStore::with_items(vec![item(1, 1000.0), item(2, 2000.0), item(3, 3000.0)]);
        let view = view_over(&store).await;

        let outcome = view.move_item(3, 0).await.expect("Move failed");
        assert_eq!(outcome, SyncOutcome::Persisted);

        assert_eq!(ids(&view.items().await), vec![3, 1, 2]);
        assert_eq!(ids(&store.fetch_ordered_items(TRIP).await.unwrap()), vec![3, 1, 2]);
        // Single-item move, single-entry batch
        assert_eq!(store.last_batch_size.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_noop_move_sends_nothing() {
        let store = FakeStore::with_items(vec![item(1, 1000.0), item(2, 2000.0)]);
        let view = view_over(&store).await;

        let outcome = view.move_item(2, 1).await.expect("Move failed");
        assert_eq!(outcome, SyncOutcome::Unchanged);
        assert_eq!(store.update_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_invalid_move_leaves_state_untouched() {
        let store = FakeStore::with_items(vec![item(1, 1000.0), item(2, 2000.0)]);
        let view = view_over(&store).await;

        assert!(view.move_item(99, 0).await.is_err());
        assert!(view.move_item(1, 5).await.is_err());

        assert_eq!(ids(&view.items().await), vec![1, 2]);
        assert_eq!(store.update_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_failed_persistence_recovers_authoritative_order() {
        let store = FakeStore::with_items(vec![item(1, 1000.0), item(2, 2000.0), item(3, 3000.0)]);
        store.fail_updates.store(true, Ordering::SeqCst);
        let view = view_over(&store).await;

        let outcome = view.move_item(3, 0).await.expect("Move failed");
        assert_eq!(outcome, SyncOutcome::Recovered);

        // The optimistic guess is gone, local equals the store's list
        let authoritative = store.fetch_ordered_items(TRIP).await.unwrap();
        assert_eq!(ids(&view.items().await), ids(&authoritative));
        assert_eq!(ids(&authoritative), vec![1, 2, 3]);
    }

    #[tokio::test]
    async fn test_partial_batch_failure_treated_as_full() {
        // Collapsed gap forces a whole-list renumber batch
        let store = FakeStore::with_items(vec![
            item(1, 1.0),
            item(2, 1.0000000001),
            item(3, 5000.0),
        ]);
        store.reject_ids.lock().await.push(2);
        let view = view_over(&store).await;

        let outcome = view.move_item(3, 1).await.expect("Move failed");
        assert_eq!(outcome, SyncOutcome::Recovered);
        assert!(store.last_batch_size.load(Ordering::SeqCst) > 1);

        // Local state must mirror whatever the store actually holds now
        let authoritative = store.fetch_ordered_items(TRIP).await.unwrap();
        assert_eq!(ids(&view.items().await), ids(&authoritative));
    }

    #[tokio::test]
    async fn test_superseded_response_is_dropped() {
        let store = FakeStore::with_items(vec![item(1, 1000.0), item(2, 2000.0), item(3, 3000.0)]);
        let view = view_over(&store).await;

        // First move blocks inside the store until released
        let gate = Arc::new(Notify::new());
        *store.update_gate.lock().await = Some(gate.clone());

        let first = {
            let view = view.clone();
            tokio::spawn(async move { view.move_item(3, 0).await })
        };
        while store.update_calls.load(Ordering::SeqCst) == 0 {
            tokio::task::yield_now().await;
        }

        // Second drag starts before the first settles: it applies
        // optimistically right away, its send queues behind the first
        let second = {
            let view = view.clone();
            tokio::spawn(async move { view.move_item(2, 0).await })
        };
        while ids(&view.items().await) != vec![2, 3, 1] {
            tokio::task::yield_now().await;
        }

        gate.notify_one();
        let first = first.await.expect("Join failed").expect("Move failed");
        let second = second.await.expect("Join failed").expect("Move failed");
        assert_eq!(first, SyncOutcome::Superseded);
        assert_eq!(second, SyncOutcome::Persisted);

        // The newer move owns the list, and storage agrees
        assert_eq!(ids(&view.items().await), vec![2, 3, 1]);
        assert_eq!(ids(&store.fetch_ordered_items(TRIP).await.unwrap()), vec![2, 3, 1]);
    }

    #[tokio::test]
    async fn test_overlapping_moves_of_same_item_converge() {
        let store = FakeStore::with_items(vec![item(1, 1000.0), item(2, 2000.0), item(3, 3000.0)]);
        let view = view_over(&store).await;

        let gate = Arc::new(Notify::new());
        *store.update_gate.lock().await = Some(gate.clone());

        // Drag item 3 to the front, then drag it to the end before the
        // first write settles
        let first = {
            let view = view.clone();
            tokio::spawn(async move { view.move_item(3, 0).await })
        };
        while store.update_calls.load(Ordering::SeqCst) == 0 {
            tokio::task::yield_now().await;
        }
        let second = {
            let view = view.clone();
            tokio::spawn(async move { view.move_item(3, 2).await })
        };
        while ids(&view.items().await) != vec![1, 2, 3] {
            tokio::task::yield_now().await;
        }

        gate.notify_one();
        let first = first.await.expect("Join failed").expect("Move failed");
        let second = second.await.expect("Join failed").expect("Move failed");
        assert_eq!(first, SyncOutcome::Superseded);
        assert_eq!(second, SyncOutcome::Persisted);

        // The stale write landed first, the later move's key last:
        // storage and the local list hold the same order
        let authoritative = store.fetch_ordered_items(TRIP).await.unwrap();
        assert_eq!(ids(&authoritative), vec![1, 2, 3]);
        assert_eq!(ids(&view.items().await), ids(&authoritative));
    }

    #[tokio::test]
    async fn test_refresh_replaces_local_state() {
        let store = FakeStore::with_items(vec![item(1, 1000.0), item(2, 2000.0)]);
        let view = view_over(&store).await;

        // Another session reorders behind our back
        store.items.lock().await[0].position = 9000.0;
        view.refresh().await.expect("Refresh failed");

        assert_eq!(ids(&view.items().await), vec![2, 1]);
    }

    #[tokio::test]
    async fn test_delete_persists() {
        let store = FakeStore::with_items(vec![item(1, 1000.0), item(2, 2000.0)]);
        let view = view_over(&store).await;

        view.delete_item(1).await.expect("Delete failed");

        assert_eq!(ids(&view.items().await), vec![2]);
        assert_eq!(ids(&store.fetch_ordered_items(TRIP).await.unwrap()), vec![2]);
    }

    #[tokio::test]
    async fn test_delete_preserves_survivor_keys() {
        let store = FakeStore::with_items(vec![
            item(1, 100.0),
            item(2, 200.0),
            item(3, 300.0),
            item(4, 400.0),
            item(5, 500.0),
        ]);
        let view = view_over(&store).await;

        view.delete_item(3).await.expect("Delete failed");

        let remaining = view.items().await;
        assert_eq!(ids(&remaining), vec![1, 2, 4, 5]);
        let positions: Vec<f64> = remaining.iter().map(|i| i.position).collect();
        assert_eq!(positions, vec![100.0, 200.0, 400.0, 500.0]);
    }

    #[tokio::test]
    async fn test_failed_delete_restores_item() {
        let store = FakeStore::with_items(vec![item(1, 1000.0), item(2, 2000.0), item(3, 3000.0)]);
        store.fail_deletes.store(true, Ordering::SeqCst);
        let view = view_over(&store).await;

        assert!(view.delete_item(2).await.is_err());

        // Restored in key order, not appended
        assert_eq!(ids(&view.items().await), vec![1, 2, 3]);
    }

    #[tokio::test]
    async fn test_delete_unknown_item_is_rejected() {
        let store = FakeStore::with_items(vec![item(1, 1000.0)]);
        let view = view_over(&store).await;

        assert!(matches!(
            view.delete_item(42).await,
            Err(DomainError::NotFound(_))
        ));
        assert_eq!(store.delete_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_view_over_sqlite_store() {
        let conn = init_db(&std::path::PathBuf::from(":memory:"))
            .await
            .expect("Failed to init test DB");
        let trips = TripRepository::new(conn.clone());
        let repo = Arc::new(ItineraryRepository::new(conn));

        let trip = trips.create(&Trip::new(0, "Iceland".to_string())).await.unwrap();
        for name in ["Flight in", "Blue Lagoon", "Flight home"] {
            repo.create(&ItineraryItem::new(0, trip.id, name.to_string(), ItemKind::Tour, 0.0))
                .await
                .unwrap();
        }

        let store: Arc<dyn ItineraryStore> = repo.clone();
        let view = TripView::load(trip.id, store).await.expect("Load failed");

        let last = view.items().await[2].id;
        let outcome = view.move_item(last, 0).await.expect("Move failed");
        assert_eq!(outcome, SyncOutcome::Persisted);

        let names: Vec<String> = repo
            .fetch_ordered_items(trip.id)
            .await
            .unwrap()
            .iter()
            .map(|i| i.name.clone())
            .collect();
        assert_eq!(names, vec!["Flight home", "Flight in", "Blue Lagoon"]);
    }
}
