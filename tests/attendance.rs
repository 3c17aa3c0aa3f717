#[cfg(test)]
mod tests {
    use chrono::NaiveDate;
    use nounou::db::store::SqliteStore;
    use nounou::libs::attendance::{AttendanceSession, AttendanceState};
    use nounou::libs::error::WorkflowError;
    use nounou::libs::notify::{Change, ChangeAction};
    use nounou::store::{
        Addressing, ChildId, Collection, Query, RecordId, RecordKind, RecordStore, Row, StoreError, StoreResult,
    };
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::{Arc, Mutex};
    use tokio::sync::Notify;

    const DATE: &str = "2024-01-01";

    fn caly() -> ChildId {
        ChildId::parse("caly").unwrap()
    }

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, 1).unwrap()
    }

    fn session(addressing: Addressing) -> AttendanceSession<SqliteStore> {
        AttendanceSession::new(SqliteStore::open_in_memory().unwrap(), addressing)
    }

    /// Store that never reports existing rows, so only the storage constraint can catch duplicates.
    struct BlindStore(SqliteStore);

    impl RecordStore for BlindStore {
        async fn find(&self, _collection: &Collection, _query: &Query) -> StoreResult<Vec<Row>> {
            Ok(Vec::new())
        }

        async fn insert(&self, collection: &Collection, row: Row) -> StoreResult<Row> {
            self.0.insert(collection, row).await
        }

        async fn update(&self, collection: &Collection, id: &RecordId, patch: Row) -> StoreResult<()> {
            self.0.update(collection, id, patch).await
        }

        async fn delete(&self, collection: &Collection, id: &RecordId) -> StoreResult<()> {
            self.0.delete(collection, id).await
        }
    }

    /// Store whose reads wait until the test opens the gate.
    struct GatedStore {
        inner: SqliteStore,
        gate: Arc<Notify>,
    }

    impl RecordStore for GatedStore {
        async fn find(&self, collection: &Collection, query: &Query) -> StoreResult<Vec<Row>> {
            self.gate.notified().await;
            self.inner.find(collection, query).await
        }

        async fn insert(&self, collection: &Collection, row: Row) -> StoreResult<Row> {
            self.inner.insert(collection, row).await
        }

        async fn update(&self, collection: &Collection, id: &RecordId, patch: Row) -> StoreResult<()> {
            self.inner.update(collection, id, patch).await
        }

        async fn delete(&self, collection: &Collection, id: &RecordId) -> StoreResult<()> {
            self.inner.delete(collection, id).await
        }
    }

    /// Store whose record vanishes right after the departure lookup.
    struct VanishingStore(SqliteStore);

    impl RecordStore for VanishingStore {
        async fn find(&self, collection: &Collection, query: &Query) -> StoreResult<Vec<Row>> {
            let rows = self.0.find(collection, query).await?;
            for row in &rows {
                let id: RecordId = serde_json::from_value(row["id"].clone()).unwrap();
                self.0.delete(collection, &id).await?;
            }
            Ok(rows)
        }

        async fn insert(&self, collection: &Collection, row: Row) -> StoreResult<Row> {
            self.0.insert(collection, row).await
        }

        async fn update(&self, collection: &Collection, id: &RecordId, patch: Row) -> StoreResult<()> {
            self.0.update(collection, id, patch).await
        }

        async fn delete(&self, collection: &Collection, id: &RecordId) -> StoreResult<()> {
            self.0.delete(collection, id).await
        }
    }

    /// Store that fails every call until it is switched back on.
    struct OfflineStore {
        inner: SqliteStore,
        offline: AtomicBool,
    }

    impl OfflineStore {
        fn check(&self) -> StoreResult<()> {
            if self.offline.load(Ordering::SeqCst) {
                return Err(StoreError::Unavailable("connection refused".to_string()));
            }
            Ok(())
        }
    }

    impl RecordStore for OfflineStore {
        async fn find(&self, collection: &Collection, query: &Query) -> StoreResult<Vec<Row>> {
            self.check()?;
            self.inner.find(collection, query).await
        }

        async fn insert(&self, collection: &Collection, row: Row) -> StoreResult<Row> {
            self.check()?;
            self.inner.insert(collection, row).await
        }

        async fn update(&self, collection: &Collection, id: &RecordId, patch: Row) -> StoreResult<()> {
            self.check()?;
            self.inner.update(collection, id, patch).await
        }

        async fn delete(&self, collection: &Collection, id: &RecordId) -> StoreResult<()> {
            self.check()?;
            self.inner.delete(collection, id).await
        }
    }

    #[tokio::test]
    async fn test_arrival_then_departure() {
        for addressing in [Addressing::Shared, Addressing::PerChild] {
            let session = session(addressing);

            let arrival = session.record_arrival("caly", DATE, "09:00").await.unwrap();
            assert!(arrival.is_open());
            assert_eq!(arrival.duration, None);
            assert!(matches!(session.state(), AttendanceState::AwaitingDeparture(_)));

            let done = session.record_departure("10:30").await.unwrap();
            assert_eq!(done.departure.map(|d| d.to_string()), Some("10:30".to_string()));
            assert_eq!(done.duration.as_deref(), Some("01:30"));
            assert_eq!(session.state(), AttendanceState::AwaitingArrival);

            let records = session.list(&caly(), date()).await.unwrap();
            assert_eq!(records.len(), 1, "{}", addressing);
            assert_eq!(records[0].id, arrival.id);
            assert_eq!(records[0].duration.as_deref(), Some("01:30"));
        }
    }

    #[tokio::test]
    async fn test_same_arrival_and_departure_is_zero() {
        let session = session(Addressing::Shared);
        session.record_arrival("caly", DATE, "09:00").await.unwrap();

        let done = session.record_departure("09:00").await.unwrap();
        assert_eq!(done.duration.as_deref(), Some("00:00"));
    }

    #[tokio::test]
    async fn test_duplicate_arrival_is_rejected() {
        let session = session(Addressing::Shared);
        session.record_arrival("caly", DATE, "08:15").await.unwrap();
        session.cancel_departure();

        let err = session.record_arrival("caly", DATE, "08:15").await.unwrap_err();
        assert!(matches!(err, WorkflowError::DuplicateEntry { .. }), "{:?}", err);
        assert_eq!(session.state(), AttendanceState::AwaitingArrival);

        // Same time for another child or another day is fine
        session.record_arrival("nate", DATE, "08:15").await.unwrap();
        session.record_arrival("caly", "2024-01-02", "08:15").await.unwrap();
    }

    #[tokio::test]
    async fn test_storage_constraint_reports_duplicate() {
        for addressing in [Addressing::Shared, Addressing::PerChild] {
            let session = AttendanceSession::new(BlindStore(SqliteStore::open_in_memory().unwrap()), addressing);
            session.record_arrival("caly", DATE, "08:15").await.unwrap();

            let err = session.record_arrival("caly", DATE, "08:15").await.unwrap_err();
            assert!(matches!(err, WorkflowError::DuplicateEntry { .. }), "{:?}", err);
        }
    }

    #[tokio::test]
    async fn test_departure_without_arrival() {
        let session = session(Addressing::Shared);

        let err = session.record_departure("17:00").await.unwrap_err();
        assert_eq!(err, WorkflowError::RecordNotFound);
    }

    #[tokio::test]
    async fn test_resume_of_unknown_arrival_is_not_found() {
        let session = session(Addressing::PerChild);
        session.resume("caly", DATE, "07:45").unwrap();

        let err = session.record_departure("17:00").await.unwrap_err();
        assert_eq!(err, WorkflowError::RecordNotFound);
    }

    #[tokio::test]
    async fn test_resume_completes_earlier_arrival() {
        let store = SqliteStore::open_in_memory().unwrap();
        let first = AttendanceSession::new(&store, Addressing::Shared);
        first.record_arrival("caly", DATE, "08:00").await.unwrap();

        let second = AttendanceSession::new(&store, Addressing::Shared);
        second.resume("caly", DATE, "08:00:00").unwrap();
        let done = second.record_departure("16:45").await.unwrap();
        assert_eq!(done.duration.as_deref(), Some("08:45"));
    }

    #[tokio::test]
    async fn test_departure_before_arrival_is_rejected() {
        let session = session(Addressing::Shared);
        session.record_arrival("caly", DATE, "10:00").await.unwrap();

        let err = session.record_departure("09:30").await.unwrap_err();
        assert!(matches!(err, WorkflowError::InvalidDeparture { .. }), "{:?}", err);
        assert!(matches!(session.state(), AttendanceState::AwaitingDeparture(_)));

        let records = session.list(&caly(), date()).await.unwrap();
        assert_eq!(records[0].departure, None);
        assert_eq!(records[0].duration, None);

        // The caregiver can correct the time
        let done = session.record_departure("11:00").await.unwrap();
        assert_eq!(done.duration.as_deref(), Some("01:00"));
    }

    #[tokio::test]
    async fn test_missing_and_invalid_fields() {
        let session = session(Addressing::Shared);

        assert_eq!(
            session.record_arrival("", DATE, "09:00").await.unwrap_err(),
            WorkflowError::MissingField("enfant")
        );
        assert_eq!(
            session.record_arrival("caly", "", "09:00").await.unwrap_err(),
            WorkflowError::MissingField("date")
        );
        assert_eq!(
            session.record_arrival("caly", DATE, " ").await.unwrap_err(),
            WorkflowError::MissingField("heure_arrive")
        );
        assert!(matches!(
            session.record_arrival("caly", DATE, "9h").await.unwrap_err(),
            WorkflowError::InvalidField { field: "heure_arrive", .. }
        ));

        session.record_arrival("caly", DATE, "09:00").await.unwrap();
        assert_eq!(
            session.record_departure("").await.unwrap_err(),
            WorkflowError::MissingField("heure_depart")
        );
        assert!(matches!(session.state(), AttendanceState::AwaitingDeparture(_)));
    }

    #[tokio::test]
    async fn test_duration_set_only_with_departure() {
        let session = session(Addressing::Shared);
        session.record_arrival("caly", DATE, "08:00").await.unwrap();
        session.record_departure("12:00").await.unwrap();
        session.record_arrival("caly", DATE, "13:30").await.unwrap();

        let records = session.list(&caly(), date()).await.unwrap();
        assert_eq!(records.len(), 2);
        for record in records {
            assert_eq!(record.departure.is_some(), record.duration.is_some());
        }
    }

    #[tokio::test]
    async fn test_cancel_keeps_record() {
        let session = session(Addressing::Shared);
        session.record_arrival("caly", DATE, "08:00").await.unwrap();

        session.cancel_departure();
        assert_eq!(session.state(), AttendanceState::AwaitingArrival);

        let records = session.list(&caly(), date()).await.unwrap();
        assert_eq!(records.len(), 1);
        assert!(records[0].is_open());
    }

    #[tokio::test]
    async fn test_departure_resets_prefill() {
        let session = session(Addressing::Shared);
        session.record_arrival("caly", DATE, "00:00").await.unwrap();
        let before = session.arrival_prefill();

        session.record_departure("23:59").await.unwrap();
        assert!(session.arrival_prefill() >= before);
    }

    #[tokio::test]
    async fn test_delete_needs_confirmation() {
        let session = session(Addressing::PerChild);
        let record = session.record_arrival("caly", DATE, "08:00").await.unwrap();

        assert!(!session.delete_record("caly", &record.id, || false).await.unwrap());
        assert_eq!(session.list(&caly(), date()).await.unwrap().len(), 1);

        assert!(session.delete_record("caly", &record.id, || true).await.unwrap());
        assert!(session.list(&caly(), date()).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_list_is_latest_arrival_first() {
        let session = session(Addressing::Shared);
        for time in ["07:30", "13:00", "09:15"] {
            session.record_arrival("caly", DATE, time).await.unwrap();
        }
        session.record_arrival("nate", DATE, "10:00").await.unwrap();

        let arrivals: Vec<String> = session
            .list(&caly(), date())
            .await
            .unwrap()
            .iter()
            .map(|r| r.arrival.to_string())
            .collect();
        assert_eq!(arrivals, vec!["13:00", "09:15", "07:30"]);
    }

    #[tokio::test]
    async fn test_hook_sees_every_write() {
        let seen: Arc<Mutex<Vec<ChangeAction>>> = Arc::new(Mutex::new(Vec::new()));
        let sink = seen.clone();
        let session = session(Addressing::Shared).with_hook(Box::new(move |change: &Change| {
            assert_eq!(change.kind, RecordKind::Attendance);
            sink.lock().unwrap().push(change.action);
        }));

        let record = session.record_arrival("caly", DATE, "08:00").await.unwrap();
        session.record_departure("09:00").await.unwrap();
        session.delete_record("caly", &record.id, || true).await.unwrap();
        let _ = session.record_departure("10:00").await;

        assert_eq!(
            *seen.lock().unwrap(),
            vec![ChangeAction::Inserted, ChangeAction::Updated, ChangeAction::Deleted]
        );
    }

    #[tokio::test]
    async fn test_overlapping_submission_is_busy() {
        let gate = Arc::new(Notify::new());
        let session = AttendanceSession::new(
            GatedStore {
                inner: SqliteStore::open_in_memory().unwrap(),
                gate: gate.clone(),
            },
            Addressing::Shared,
        );

        let first = session.record_arrival("caly", DATE, "08:00");
        let second = async {
            tokio::task::yield_now().await;
            assert!(session.is_busy());
            let result = session.record_arrival("caly", DATE, "08:05").await;
            gate.notify_one();
            result
        };
        let (first, second) = tokio::join!(first, second);

        assert!(first.is_ok());
        assert_eq!(second.unwrap_err(), WorkflowError::Busy);
        assert!(!session.is_busy());
    }

    #[tokio::test]
    async fn test_departure_for_vanished_record_is_not_found() {
        let changes = Arc::new(Mutex::new(Vec::new()));
        let seen = Arc::clone(&changes);
        let store = SqliteStore::open_in_memory().unwrap();
        store
            .insert(
                &Addressing::Shared.resolve(RecordKind::Attendance, &caly()),
                serde_json::from_value(serde_json::json!({"enfant": "caly", "date": DATE, "heure_arrive": "09:00"})).unwrap(),
            )
            .await
            .unwrap();
        let session = AttendanceSession::new(VanishingStore(store), Addressing::Shared)
            .with_hook(Box::new(move |change: &Change| seen.lock().unwrap().push(change.action)));
        session.resume("caly", DATE, "09:00").unwrap();

        let err = session.record_departure("10:30").await.unwrap_err();
        assert_eq!(err, WorkflowError::RecordNotFound);
        assert!(matches!(session.state(), AttendanceState::AwaitingDeparture(_)));
        assert!(changes.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_unavailable_store_keeps_session() {
        let store = OfflineStore {
            inner: SqliteStore::open_in_memory().unwrap(),
            offline: AtomicBool::new(true),
        };
        let session = AttendanceSession::new(store, Addressing::PerChild);

        let err = session.record_arrival("caly", DATE, "08:00").await.unwrap_err();
        assert!(matches!(err, WorkflowError::StoreUnavailable(_)), "{:?}", err);
        assert_eq!(session.state(), AttendanceState::AwaitingArrival);

        session.store().offline.store(false, Ordering::SeqCst);
        session.record_arrival("caly", DATE, "08:00").await.unwrap();
        let pending = session.state();

        session.store().offline.store(true, Ordering::SeqCst);
        let err = session.record_departure("12:00").await.unwrap_err();
        assert!(matches!(err, WorkflowError::StoreUnavailable(_)), "{:?}", err);
        assert_eq!(session.state(), pending);
        assert!(!session.is_busy());

        session.store().offline.store(false, Ordering::SeqCst);
        let record = session.record_departure("12:00").await.unwrap();
        assert_eq!(record.duration.as_deref(), Some("04:00"));
    }
}
