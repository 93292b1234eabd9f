use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use deepmemory_core::errors::EmbeddingError;
use deepmemory_core::traits::IEmbeddingProvider;
use deepmemory_embeddings::HttpProvider;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;

/// Serve canned responses in order, one per connection.
async fn serve(responses: Vec<(u16, String)>) -> (String, Arc<AtomicUsize>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let hits = Arc::new(AtomicUsize::new(0));
    let counter = hits.clone();

    tokio::spawn(async move {
        for (status, body) in responses {
            let (mut socket, _) = listener.accept().await.unwrap();
            read_request(&mut socket).await;
            counter.fetch_add(1, Ordering::SeqCst);
            let reply = format!(
                "HTTP/1.1 {status} X\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
                body.len()
            );
            socket.write_all(reply.as_bytes()).await.unwrap();
            socket.shutdown().await.ok();
        }
    });

    (format!("http://{addr}/v1/embeddings"), hits)
}

/// Read headers, then as many body bytes as Content-Length announces.
async fn read_request(socket: &mut tokio::net::TcpStream) {
    let mut buf = Vec::new();
    let mut chunk = [0u8; 4096];
    loop {
        let n = socket.read(&mut chunk).await.unwrap();
        if n == 0 {
            return;
        }
        buf.extend_from_slice(&chunk[..n]);
        if let Some(end) = find(&buf, b"\r\n\r\n") {
            let headers = String::from_utf8_lossy(&buf[..end]).to_lowercase();
            let len = headers
                .lines()
                .find_map(|l| l.strip_prefix("content-length:"))
                .and_then(|v| v.trim().parse::<usize>().ok())
                .unwrap_or(0);
            if buf.len() >= end + 4 + len {
                return;
            }
        }
    }
}

fn find(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    haystack.windows(needle.len()).position(|w| w == needle)
}

fn ok_body(vectors: &[(usize, Vec<f32>)]) -> String {
    let data: Vec<_> = vectors
        .iter()
        .map(|(i, v)| serde_json::json!({ "index": i, "embedding": v }))
        .collect();
    serde_json::json!({ "data": data }).to_string()
}

#[tokio::test]
async fn parses_embeddings_in_index_order() {
    let body = ok_body(&[(1, vec![0.0, 1.0]), (0, vec![1.0, 0.0])]);
    let (endpoint, _) = serve(vec![(200, body)]).await;
    let provider = HttpProvider::new(endpoint, "bge-large", 2).unwrap();

    let out = provider
        .embed_batch(&["a".to_string(), "b".to_string()])
        .await
        .unwrap();
    assert_eq!(out, vec![vec![1.0, 0.0], vec![0.0, 1.0]]);
}

#[tokio::test]
async fn retries_server_errors_then_succeeds() {
    let (endpoint, hits) = serve(vec![
        (503, "{}".to_string()),
        (200, ok_body(&[(0, vec![0.5, 0.5])])),
    ])
    .await;
    let provider = HttpProvider::new(endpoint, "bge-large", 2)
        .unwrap()
        .with_max_retries(2);

    let v = provider.embed("hello").await.unwrap();
    assert_eq!(v, vec![0.5, 0.5]);
    assert_eq!(hits.load(Ordering::SeqCst), 2);
    assert!(provider.is_available());
}

#[tokio::test]
async fn client_error_is_not_retried() {
    let (endpoint, hits) = serve(vec![(401, r#"{"error":"bad key"}"#.to_string())]).await;
    let provider = HttpProvider::new(endpoint, "bge-large", 2)
        .unwrap()
        .with_max_retries(3);

    let err = provider.embed("hello").await.unwrap_err();
    assert!(err.to_string().contains("401"));
    assert_eq!(hits.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn wrong_length_is_dimension_mismatch() {
    let (endpoint, _) = serve(vec![(200, ok_body(&[(0, vec![1.0, 2.0, 3.0])]))]).await;
    let provider = HttpProvider::new(endpoint, "bge-large", 2).unwrap();

    assert!(matches!(
        provider.embed("hello").await,
        Err(EmbeddingError::DimensionMismatch {
            expected: 2,
            actual: 3
        })
    ));
}

#[tokio::test]
async fn exhausted_retries_mark_provider_unavailable() {
    let (endpoint, _) = serve(vec![
        (500, "{}".to_string()),
        (500, "{}".to_string()),
    ])
    .await;
    let provider = HttpProvider::new(endpoint, "bge-large", 2)
        .unwrap()
        .with_max_retries(1);

    assert!(provider.embed("hello").await.is_err());
    assert!(!provider.is_available());
    assert!(matches!(
        provider.embed("again").await,
        Err(EmbeddingError::ProviderUnavailable { .. })
    ));

    provider.reset_availability();
    assert!(provider.is_available());
}
