//! Plain-text chunked responses fed by a completion stream.

use std::io;

use ai_llm_service::CompletionStream;
use axum::{
    body::{Body, Bytes},
    http::{HeaderValue, header},
    response::Response,
};
use futures::StreamExt;
use tokio::sync::mpsc;
use tokio_stream::wrappers::ReceiverStream;
use tracing::{debug, error};

const CHANNEL_CAPACITY: usize = 32;

/// Turns completion fragments into a `text/plain` streaming response.
///
/// A background task forwards each fragment unmodified and in order. When
/// the client goes away the task drops the upstream stream, which closes the
/// provider connection. A failure after the first byte ends the body with an
/// error so the client sees an aborted transfer instead of a short answer.
pub fn text_stream_response(mut fragments: CompletionStream) -> Response {
    let (tx, rx) = mpsc::channel::<Result<Bytes, io::Error>>(CHANNEL_CAPACITY);

    tokio::spawn(async move {
        let mut forwarded = 0usize;
        loop {
            let next = tokio::select! {
                _ = tx.closed() => {
                    debug!(forwarded, "client disconnected; cancelling completion");
                    return;
                }
                next = fragments.next() => next,
            };

            match next {
                Some(Ok(text)) => {
                    if tx.send(Ok(Bytes::from(text))).await.is_err() {
                        debug!(forwarded, "client disconnected; cancelling completion");
                        return;
                    }
                    forwarded += 1;
                }
                Some(Err(e)) => {
                    error!(forwarded, error = %e, "completion stream failed mid-response");
                    let _ = tx.send(Err(io::Error::other(e.to_string()))).await;
                    return;
                }
                None => {
                    debug!(forwarded, "completion stream finished");
                    return;
                }
            }
        }
    });

    let mut response = Response::new(Body::from_stream(ReceiverStream::new(rx)));
    let headers = response.headers_mut();
    headers.insert(
        header::CONTENT_TYPE,
        HeaderValue::from_static("text/plain; charset=utf-8"),
    );
    headers.insert(header::CACHE_CONTROL, HeaderValue::from_static("no-cache"));
    response
}

#[cfg(test)]
mod tests {
    use std::{
        sync::{
            Arc,
            atomic::{AtomicBool, Ordering},
        },
        time::Duration,
    };

    use ai_llm_service::{AiLlmError, ProviderError};
    use futures::stream;

    use super::*;

    #[tokio::test]
    async fn fragments_are_concatenated_in_order() {
        let fragments: CompletionStream = Box::pin(stream::iter(
            ["Dr. ", "Lee ", "is ", "rated ", "4.2."]
                .into_iter()
                .map(|s| Ok(s.to_string())),
        ));
        let res = text_stream_response(fragments);
        assert_eq!(
            res.headers()[header::CONTENT_TYPE],
            "text/plain; charset=utf-8"
        );

        let body = axum::body::to_bytes(res.into_body(), usize::MAX)
            .await
            .unwrap();
        assert_eq!(&body[..], b"Dr. Lee is rated 4.2.");
    }

    #[tokio::test]
    async fn mid_stream_error_aborts_the_body() {
        let fragments: CompletionStream = Box::pin(stream::iter(vec![
            Ok("partial".to_string()),
            Err(AiLlmError::Provider(ProviderError::Upstream("boom".into()))),
        ]));
        let res = text_stream_response(fragments);
        assert!(axum::body::to_bytes(res.into_body(), usize::MAX).await.is_err());
    }

    /// Sets the flag when the upstream stream is dropped.
    struct DropFlag(Arc<AtomicBool>);

    impl Drop for DropFlag {
        fn drop(&mut self) {
            self.0.store(true, Ordering::SeqCst);
        }
    }

    #[tokio::test]
    async fn client_disconnect_drops_the_upstream_stream() {
        let dropped = Arc::new(AtomicBool::new(false));
        let guard = DropFlag(dropped.clone());

        // One fragment, then an upstream that never answers again.
        let upstream = stream::unfold((guard, false), |(guard, sent)| async move {
            if sent {
                std::future::pending::<()>().await;
            }
            Some((Ok::<_, AiLlmError>("first".to_string()), (guard, true)))
        });
        let fragments: CompletionStream = Box::pin(upstream);

        let res = text_stream_response(fragments);
        drop(res);

        for _ in 0..100 {
            if dropped.load(Ordering::SeqCst) {
                break;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        assert!(dropped.load(Ordering::SeqCst));
    }
}
