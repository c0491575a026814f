//! CompletionProvider trait definition.
//!
//! This is the abstraction over hosted text-generation backends. Uses
//! RPITIT for `complete` and `Pin<Box<dyn Stream>>` for `stream` (streams
//! need to be object-safe for the BoxCompletionProvider wrapper).

use std::pin::Pin;

use futures_util::Stream;

use mindline_types::llm::{CompletionError, CompletionRequest, CompletionResponse, StreamEvent};

/// Trait for completion provider backends.
///
/// Uses native async fn in traits (RPITIT, Rust 2024 edition) for
/// `complete`. The `stream` method returns a boxed stream because streams
/// need to be object-safe for `BoxCompletionProvider`.
///
/// Implementations live in mindline-infra (e.g., `GroqProvider`).
pub trait CompletionProvider: Send + Sync {
    /// Human-readable provider name (e.g., "groq").
    fn name(&self) -> &str;

    /// Send a completion request and receive the full response.
    fn complete(
        &self,
        request: &CompletionRequest,
    ) -> impl std::future::Future<Output = Result<CompletionResponse, CompletionError>> + Send;

    /// Send a streaming completion request. Returns a stream of events.
    ///
    /// The stream is finite and non-restartable: it terminates after
    /// [`StreamEvent::Done`] or the first error.
    fn stream(
        &self,
        request: CompletionRequest,
    ) -> Pin<Box<dyn Stream<Item = Result<StreamEvent, CompletionError>> + Send + 'static>>;
}
