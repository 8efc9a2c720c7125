//! Bounded retry around a single-attempt transport.

use async_trait::async_trait;

use crate::config::RetryPolicy;
use crate::traits::{ImagePart, ModelGateway, ModelRequest, Transport, TransportError};

/// A [`ModelGateway`] that retries transient transport failures.
///
/// Makes at most `policy.attempts` transport calls per invocation. Permanent
/// errors return immediately; transient ones are retried after a backoff and,
/// once the budget is spent, wrapped in [`TransportError::Exhausted`].
#[derive(Debug)]
pub struct RetryingGateway<T> {
    transport: T,
    policy: RetryPolicy,
}

impl<T: Transport> RetryingGateway<T> {
    pub fn new(transport: T, policy: RetryPolicy) -> Self {
        Self { transport, policy }
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }
}

#[async_trait]
impl<T: Transport> ModelGateway for RetryingGateway<T> {
    async fn invoke(
        &self,
        prompt: &str,
        system_instruction: Option<&str>,
    ) -> Result<String, TransportError> {
        self.invoke_with_images(prompt, system_instruction, &[]).await
    }

    async fn invoke_with_images(
        &self,
        prompt: &str,
        system_instruction: Option<&str>,
        images: &[ImagePart],
    ) -> Result<String, TransportError> {
        let request = ModelRequest {
            prompt: prompt.to_string(),
            system_instruction: system_instruction.map(str::to_string),
            images: images.to_vec(),
        };
        let attempts = self.policy.attempts.max(1);
        let mut attempt = 1;

        loop {
            match self.transport.send(&request).await {
                Ok(text) => {
                    tracing::debug!("Model call succeeded on attempt {}", attempt);
                    return Ok(text);
                }
                Err(e) if !e.is_retryable() => return Err(e),
                Err(e) if attempt >= attempts => {
                    tracing::warn!("Model call failed after {} attempts: {}", attempts, e);
                    return Err(TransportError::Exhausted {
                        attempts,
                        last: Box::new(e),
                    });
                }
                Err(e) => {
                    let delay = self.policy.backoff(attempt);
                    tracing::warn!(
                        "Model call failed (attempt {}/{}): {}. Retrying in {:?}",
                        attempt,
                        attempts,
                        e,
                        delay
                    );
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Mutex;

    /// Fails transiently `failures` times, then answers.
    struct FlakyTransport {
        failures: u32,
        calls: AtomicU32,
    }

    #[async_trait]
    impl Transport for FlakyTransport {
        async fn send(&self, _request: &ModelRequest) -> Result<String, TransportError> {
            let call = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
            if call <= self.failures {
                Err(TransportError::Request("connection reset".into()))
            } else {
                Ok(format!("answer on call {}", call))
            }
        }
    }

    struct RecordingTransport {
        seen: Mutex<Vec<ModelRequest>>,
        error: TransportError,
    }

    #[async_trait]
    impl Transport for RecordingTransport {
        async fn send(&self, request: &ModelRequest) -> Result<String, TransportError> {
            self.seen.lock().unwrap().push(request.clone());
            Err(self.error.clone())
        }
    }

    fn flaky(failures: u32) -> FlakyTransport {
        FlakyTransport {
            failures,
            calls: AtomicU32::new(0),
        }
    }

    #[tokio::test]
    async fn recovers_within_budget() {
        let gateway = RetryingGateway::new(flaky(1), RetryPolicy::immediate(2));

        let text = gateway.invoke("hello", None).await.unwrap();

        assert_eq!(text, "answer on call 2");
        assert_eq!(gateway.transport().calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn makes_exactly_the_configured_number_of_calls() {
        for attempts in 1..=4 {
            let gateway = RetryingGateway::new(flaky(u32::MAX), RetryPolicy::immediate(attempts));

            let err = gateway.invoke("hello", None).await.unwrap_err();

            assert_eq!(gateway.transport().calls.load(Ordering::SeqCst), attempts);
            match err {
                TransportError::Exhausted { attempts: n, last } => {
                    assert_eq!(n, attempts);
                    assert!(matches!(*last, TransportError::Request(_)));
                }
                other => panic!("expected Exhausted, got {:?}", other),
            }
        }
    }

    #[tokio::test]
    async fn does_not_retry_permanent_errors() {
        let gateway = RetryingGateway::new(
            RecordingTransport {
                seen: Mutex::new(Vec::new()),
                error: TransportError::Unauthorized { status: 401 },
            },
            RetryPolicy::immediate(3),
        );

        let err = gateway.invoke("hello", Some("be brief")).await.unwrap_err();

        assert_eq!(err, TransportError::Unauthorized { status: 401 });
        let seen = gateway.transport().seen.lock().unwrap();
        assert_eq!(seen.len(), 1);
        assert_eq!(seen[0].prompt, "hello");
        assert_eq!(seen[0].system_instruction.as_deref(), Some("be brief"));
        assert!(seen[0].images.is_empty());
    }

    #[tokio::test]
    async fn forwards_images_on_every_attempt() {
        let gateway = RetryingGateway::new(
            RecordingTransport {
                seen: Mutex::new(Vec::new()),
                error: TransportError::EmptyResponse,
            },
            RetryPolicy::immediate(2),
        );
        let photo = ImagePart::new("image/png", vec![1, 2, 3]);

        gateway
            .invoke_with_images("describe", None, &[photo.clone()])
            .await
            .unwrap_err();

        let seen = gateway.transport().seen.lock().unwrap();
        assert_eq!(seen.len(), 2);
        assert!(seen.iter().all(|request| request.images == vec![photo.clone()]));
    }

    #[tokio::test]
    async fn zero_attempts_still_calls_once() {
        let gateway = RetryingGateway::new(flaky(0), RetryPolicy::immediate(0));
        assert!(gateway.invoke("hello", None).await.is_ok());
        assert_eq!(gateway.transport().calls.load(Ordering::SeqCst), 1);
    }
}
