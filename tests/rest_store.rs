#[cfg(test)]
mod tests {
    use nounou::api::rest::{RestConfig, RestStore};
    use nounou::libs::attendance::AttendanceSession;
    use nounou::libs::error::WorkflowError;
    use nounou::store::{Addressing, ChildId, Direction, RecordId, RecordKind, RecordStore, StoreError};
    use serde_json::json;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;
    use tokio::task::JoinHandle;

    /// Answers each connection with the next canned response and returns the raw requests.
    async fn serve(responses: Vec<(u16, &'static str)>) -> (String, JoinHandle<Vec<String>>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let url = format!("http://{}", listener.local_addr().unwrap());

        let handle = tokio::spawn(async move {
            let mut requests = Vec::new();
            for (status, body) in responses {
                let (mut socket, _) = listener.accept().await.unwrap();
                let mut raw = Vec::new();
                let mut buf = [0u8; 4096];
                loop {
                    let n = socket.read(&mut buf).await.unwrap();
                    raw.extend_from_slice(&buf[..n]);
                    let text = String::from_utf8_lossy(&raw).to_string();
                    if let Some(end) = text.find("\r\n\r\n") {
                        let length = text
                            .lines()
                            .find_map(|l| l.to_lowercase().strip_prefix("content-length:").map(|v| v.trim().parse::<usize>().unwrap()))
                            .unwrap_or(0);
                        if raw.len() >= end + 4 + length {
                            break;
                        }
                    }
                    if n == 0 {
                        break;
                    }
                }
                requests.push(String::from_utf8_lossy(&raw).to_string());

                let response = format!(
                    "HTTP/1.1 {} X\r\ncontent-type: application/json\r\ncontent-length: {}\r\nconnection: close\r\n\r\n{}",
                    status,
                    body.len(),
                    body
                );
                socket.write_all(response.as_bytes()).await.unwrap();
                socket.shutdown().await.unwrap();
            }
            requests
        });

        (url, handle)
    }

    fn store(url: &str) -> RestStore {
        RestStore::new(&RestConfig {
            api_url: format!("{}/", url),
            api_key: "anon-key".to_string(),
        })
    }

    fn caly() -> ChildId {
        ChildId::parse("caly").unwrap()
    }

    #[tokio::test]
    async fn test_find_sends_filters_and_key() {
        let (url, server) = serve(vec![(200, r#"[{"id": 1, "heure": "09:00:00"}]"#)]).await;
        let collection = Addressing::PerChild.resolve(RecordKind::Activity, &caly());
        let query = collection.query().eq("date", "2024-01-01").order_by("heure", Direction::Descending);

        let rows = store(&url).find(&collection, &query).await.unwrap();
        assert_eq!(rows[0]["heure"], json!("09:00:00"));

        let requests = server.await.unwrap();
        let request = &requests[0];
        assert!(request.starts_with("GET /rest/v1/suivi_caly?select=*&date=eq.2024-01-01&order=heure.desc "), "{}", request);
        assert!(request.contains("apikey: anon-key"));
        assert!(request.to_lowercase().contains("authorization: bearer anon-key"));
    }

    #[tokio::test]
    async fn test_insert_asks_for_representation() {
        let (url, server) = serve(vec![(201, r#"[{"id": "5f1c", "enfant": "caly"}]"#)]).await;
        let collection = Addressing::Shared.resolve(RecordKind::Activity, &caly());

        let created = store(&url).insert(&collection, collection.row()).await.unwrap();
        assert_eq!(created["id"], json!("5f1c"));

        let request = &server.await.unwrap()[0];
        assert!(request.starts_with("POST /rest/v1/suivi "));
        assert!(request.to_lowercase().contains("prefer: return=representation"));
        assert!(request.ends_with(r#"{"enfant":"caly"}"#));
    }

    #[tokio::test]
    async fn test_update_and_delete_target_the_id() {
        let (url, server) = serve(vec![(200, r#"[{"id": 7, "duree": "01:30"}]"#), (204, "")]).await;
        let collection = Addressing::Shared.resolve(RecordKind::Attendance, &caly());
        let store = store(&url);
        let id = RecordId::from(7);

        let mut patch = nounou::store::Row::new();
        patch.insert("duree".to_string(), json!("01:30"));
        store.update(&collection, &id, patch).await.unwrap();
        store.delete(&collection, &id).await.unwrap();

        let requests = server.await.unwrap();
        assert!(requests[0].starts_with("PATCH /rest/v1/presence?id=eq.7 "));
        assert!(requests[0].to_lowercase().contains("prefer: return=representation"));
        assert!(requests[1].starts_with("DELETE /rest/v1/presence?id=eq.7 "));
    }

    #[tokio::test]
    async fn test_update_of_missing_row_is_not_found() {
        let (url, server) = serve(vec![(200, "[]")]).await;
        let collection = Addressing::Shared.resolve(RecordKind::Attendance, &caly());

        let mut patch = nounou::store::Row::new();
        patch.insert("duree".to_string(), json!("01:30"));
        let err = store(&url).update(&collection, &RecordId::from(7), patch).await.unwrap_err();
        assert!(matches!(err, StoreError::NotFound { .. }), "{:?}", err);
        server.await.unwrap();
    }

    #[tokio::test]
    async fn test_errors_are_mapped() {
        let (url, server) = serve(vec![
            (409, r#"{"message": "duplicate key value violates unique constraint"}"#),
            (401, r#"{"message": "Invalid API key"}"#),
        ])
        .await;
        let collection = Addressing::Shared.resolve(RecordKind::Attendance, &caly());
        let store = store(&url);

        let err = store.insert(&collection, collection.row()).await.unwrap_err();
        assert_eq!(err, StoreError::Conflict("duplicate key value violates unique constraint".to_string()));

        let err = store.find(&collection, &collection.query()).await.unwrap_err();
        assert_eq!(err, StoreError::Unavailable("Invalid API key".to_string()));
        server.await.unwrap();
    }

    #[tokio::test]
    async fn test_conflict_on_arrival_is_a_duplicate() {
        let (url, server) = serve(vec![(200, "[]"), (409, r#"{"message": "duplicate key"}"#)]).await;
        let session = AttendanceSession::new(store(&url), Addressing::Shared);

        let err = session.record_arrival("caly", "2024-01-01", "08:00").await.unwrap_err();
        assert!(matches!(err, WorkflowError::DuplicateEntry { .. }), "{:?}", err);
        server.await.unwrap();
    }

    #[tokio::test]
    async fn test_unreachable_backend() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let url = format!("http://{}", listener.local_addr().unwrap());
        drop(listener);

        let collection = Addressing::Shared.resolve(RecordKind::Activity, &caly());
        let err = store(&url).find(&collection, &collection.query()).await.unwrap_err();
        assert!(matches!(err, StoreError::Unavailable(_)));
    }
}
