use std::sync::Arc;

use bytes::Bytes;

use audioscribe::application::ports::{SessionStore, SessionStoreError};
use audioscribe::domain::{ChunkUpload, SessionId};
use audioscribe::infrastructure::session::InMemorySessionStore;

fn chunk(session: &SessionId, index: usize, total: usize, data: &'static [u8]) -> ChunkUpload {
    ChunkUpload {
        session_id: session.clone(),
        index,
        total_chunks: total,
        data: Bytes::from_static(data),
        file_name: "voice.webm".to_string(),
        mime_type: "audio/webm".to_string(),
    }
}

#[tokio::test]
async fn given_first_chunk_when_stored_then_session_created_with_metadata() {
    let store = InMemorySessionStore::new();
    let id = SessionId::new();

    store.put_chunk(chunk(&id, 1, 2, b"tail")).await.unwrap();

    let session = store.get(&id).await.unwrap().unwrap();
    assert_eq!(session.total_chunks, 2);
    assert_eq!(session.file_name, "voice.webm");
    assert_eq!(session.mime_type, "audio/webm");
    assert_eq!(session.received(), 1);
    assert!(!session.is_complete());
}

#[tokio::test]
async fn given_merged_session_when_chunk_arrives_again_then_session_restarts() {
    let store = InMemorySessionStore::new();
    let id = SessionId::new();
    store.put_chunk(chunk(&id, 0, 1, b"old")).await.unwrap();

    let receipt = store.put_chunk(chunk(&id, 0, 2, b"new")).await.unwrap();

    assert_eq!(receipt.total, 2);
    assert_eq!(receipt.received, 1);
    assert!(!receipt.complete);
}

#[tokio::test]
async fn given_zero_total_when_storing_then_invalid_chunk() {
    let store = InMemorySessionStore::new();

    let err = store
        .put_chunk(chunk(&SessionId::new(), 0, 0, b"x"))
        .await
        .unwrap_err();

    assert!(matches!(err, SessionStoreError::InvalidChunk(_)));
    assert_eq!(store.len().await.unwrap(), 0);
}

#[tokio::test]
async fn given_concurrent_uploads_when_all_chunks_stored_then_every_session_merges() {
    let store = Arc::new(InMemorySessionStore::new());
    let ids: Vec<SessionId> = (0..8).map(|_| SessionId::new()).collect();

    let mut handles = Vec::new();
    for id in &ids {
        for index in (0..4).rev() {
            let store = Arc::clone(&store);
            let id = id.clone();
            handles.push(tokio::spawn(async move {
                store.put_chunk(chunk(&id, index, 4, b"ab")).await.unwrap();
            }));
        }
    }
    for handle in handles {
        handle.await.unwrap();
    }

    for id in &ids {
        let session = store.get(id).await.unwrap().unwrap();
        assert_eq!(session.merged().unwrap().as_ref(), b"abababab");
    }
    assert_eq!(store.len().await.unwrap(), 8);
}

#[tokio::test]
async fn given_sessions_when_removed_and_cleared_then_store_empties() {
    let store = InMemorySessionStore::new();
    let first = SessionId::new();
    let second = SessionId::new();
    store.put_chunk(chunk(&first, 0, 2, b"a")).await.unwrap();
    store.put_chunk(chunk(&second, 0, 2, b"b")).await.unwrap();

    assert!(store.remove(&first).await.unwrap());
    assert!(!store.remove(&first).await.unwrap());
    assert_eq!(store.clear().await.unwrap(), 1);
    assert_eq!(store.len().await.unwrap(), 0);
}
