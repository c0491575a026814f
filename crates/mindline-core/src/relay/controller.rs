//! ChatRelay -- the relay/session controller.
//!
//! One `send` call is one turn: load the session's prior messages, build a
//! single completion request (fixed instruction + prior messages + new
//! input), open the provider stream, and hand back a lazy [`ReplyStream`]
//! of text fragments. Only when the upstream completes is the (user,
//! assistant) pair written to the store, as one atomic operation; a
//! provider error mid-stream persists nothing.
//!
//! The returned stream is finite and non-restartable. Dropping it before
//! completion abandons the turn without persisting anything.

use std::pin::Pin;

use async_stream::try_stream;
use futures_util::{Stream, StreamExt};
use thiserror::Error;
use tracing::debug;

use mindline_types::config::ChatSettings;
use mindline_types::error::HistoryError;
use mindline_types::llm::{CompletionError, CompletionRequest, StreamEvent};
use mindline_types::message::{Message, StoredMessage};

use crate::history::repository::HistoryRepository;
use crate::llm::box_provider::BoxCompletionProvider;

use super::prompt::SYSTEM_PROMPT;

/// Errors that fail a single turn.
///
/// Both variants leave all previously committed history intact; only
/// `Persistence` can leave a rendered reply unrecorded, and the caller is
/// expected to report that divergence.
#[derive(Debug, Error)]
pub enum TurnError {
    #[error("completion failed: {0}")]
    Completion(#[from] CompletionError),

    #[error("history store failed: {0}")]
    Persistence(#[from] HistoryError),
}

/// Lazy, finite, non-restartable sequence of assistant text fragments.
///
/// Concatenating every `Ok` item yields exactly the assistant content
/// persisted for the turn. An `Err` item terminates the stream.
pub type ReplyStream = Pin<Box<dyn Stream<Item = Result<String, TurnError>> + Send + 'static>>;

/// Phase of an in-flight turn, traced as the stream is driven.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TurnPhase {
    AwaitingFirstFragment,
    Streaming,
    Persisting,
}

/// The relay/session controller.
///
/// Generic over the history store so tests can substitute an in-memory
/// fake; the completion backend is type-erased behind
/// [`BoxCompletionProvider`].
pub struct ChatRelay<H> {
    provider: BoxCompletionProvider,
    history: H,
    settings: ChatSettings,
}

impl<H> ChatRelay<H>
where
    H: HistoryRepository + Clone + 'static,
{
    pub fn new(provider: BoxCompletionProvider, history: H, settings: ChatSettings) -> Self {
        Self {
            provider,
            history,
            settings,
        }
    }

    /// The stored transcript for a session, in submission order.
    pub async fn history(&self, session_id: &str) -> Result<Vec<StoredMessage>, HistoryError> {
        self.history.history(session_id).await
    }

    /// Delete all messages for a session from the durable store.
    ///
    /// Idempotent: resetting an empty or unknown session returns `Ok(0)`.
    pub async fn reset(&self, session_id: &str) -> Result<u64, HistoryError> {
        let removed = self.history.clear(session_id).await?;
        debug!(session = %session_id, removed, "session reset");
        Ok(removed)
    }

    /// Run one turn: stream the assistant reply for `input` in the context
    /// of the session's history.
    ///
    /// Empty (or whitespace-only) input is a caller error and a no-op:
    /// `Ok(None)` is returned and neither the store nor the provider is
    /// touched. Otherwise the returned [`ReplyStream`] yields fragments as
    /// they arrive and, on upstream completion, atomically appends the
    /// user and assistant messages to the store before terminating.
    pub async fn send(
        &self,
        session_id: &str,
        input: &str,
    ) -> Result<Option<ReplyStream>, TurnError> {
        let input = input.trim();
        if input.is_empty() {
            debug!(session = %session_id, "empty input, no turn");
            return Ok(None);
        }

        let prior = self.history.history(session_id).await?;
        let mut messages: Vec<Message> = prior.into_iter().map(Message::from).collect();
        messages.push(Message::user(input));

        let request = CompletionRequest {
            model: self.settings.model.clone(),
            messages,
            system: Some(SYSTEM_PROMPT.to_string()),
            max_tokens: self.settings.max_tokens,
            temperature: Some(self.settings.temperature),
            stream: true,
        };

        let mut upstream = self.provider.stream(request);
        let history = self.history.clone();
        let session_id = session_id.to_string();
        let user_content = input.to_string();

        Ok(Some(Box::pin(try_stream! {
            let mut phase = TurnPhase::AwaitingFirstFragment;
            debug!(session = %session_id, ?phase, "turn opened");
            let mut assembled = String::new();

            while let Some(event) = upstream.next().await {
                match event? {
                    StreamEvent::TextDelta { text } => {
                        if phase == TurnPhase::AwaitingFirstFragment {
                            phase = TurnPhase::Streaming;
                            debug!(session = %session_id, ?phase, "first fragment received");
                        }
                        assembled.push_str(&text);
                        yield text;
                    }
                    StreamEvent::MessageDelta { stop_reason } => {
                        debug!(session = %session_id, %stop_reason, "message finishing");
                    }
                    StreamEvent::Usage(usage) => {
                        debug!(
                            session = %session_id,
                            input_tokens = usage.input_tokens,
                            output_tokens = usage.output_tokens,
                            "usage reported"
                        );
                    }
                    StreamEvent::Done => break,
                    StreamEvent::Connected => {}
                }
            }

            phase = TurnPhase::Persisting;
            debug!(session = %session_id, ?phase, reply_chars = assembled.len(), "persisting turn");
            history
                .append_turn(&session_id, &user_content, &assembled)
                .await?;
            debug!(session = %session_id, "turn committed");
        })))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::collections::HashMap;
    use std::sync::{Arc, Mutex};

    use chrono::Utc;
    use futures_util::stream;

    use mindline_types::llm::{CompletionResponse, StopReason, Usage};
    use mindline_types::message::MessageRole;

    use crate::llm::provider::CompletionProvider;

    /// Provider that replays scripted event sequences and records every
    /// request it receives.
    struct ScriptedProvider {
        scripts: Mutex<Vec<Vec<Result<StreamEvent, CompletionError>>>>,
        requests: Arc<Mutex<Vec<CompletionRequest>>>,
    }

    impl ScriptedProvider {
        fn new(
            scripts: Vec<Vec<Result<StreamEvent, CompletionError>>>,
        ) -> (Self, Arc<Mutex<Vec<CompletionRequest>>>) {
            let requests = Arc::new(Mutex::new(Vec::new()));
            (
                Self {
                    scripts: Mutex::new(scripts),
                    requests: Arc::clone(&requests),
                },
                requests,
            )
        }

        fn reply(fragments: &[&str]) -> Vec<Result<StreamEvent, CompletionError>> {
            let mut events = vec![Ok(StreamEvent::Connected)];
            events.extend(fragments.iter().map(|f| {
                Ok(StreamEvent::TextDelta {
                    text: (*f).to_string(),
                })
            }));
            events.push(Ok(StreamEvent::MessageDelta {
                stop_reason: StopReason::EndTurn,
            }));
            events.push(Ok(StreamEvent::Usage(Usage {
                input_tokens: 12,
                output_tokens: 34,
            })));
            events.push(Ok(StreamEvent::Done));
            events
        }
    }

    impl CompletionProvider for ScriptedProvider {
        fn name(&self) -> &str {
            "scripted"
        }

        async fn complete(
            &self,
            _request: &CompletionRequest,
        ) -> Result<CompletionResponse, CompletionError> {
            Err(CompletionError::InvalidRequest(
                "complete() not scripted".to_string(),
            ))
        }

        fn stream(
            &self,
            request: CompletionRequest,
        ) -> Pin<Box<dyn Stream<Item = Result<StreamEvent, CompletionError>> + Send + 'static>>
        {
            self.requests.lock().unwrap().push(request);
            let script = self.scripts.lock().unwrap().remove(0);
            Box::pin(stream::iter(script))
        }
    }

    /// HashMap-backed history store with optional append failure injection.
    #[derive(Clone, Default)]
    struct InMemoryHistory {
        log: Arc<Mutex<HashMap<String, Vec<StoredMessage>>>>,
        next_seq: Arc<Mutex<i64>>,
        fail_appends: Arc<Mutex<bool>>,
    }

    impl InMemoryHistory {
        fn fail_appends(&self, fail: bool) {
            *self.fail_appends.lock().unwrap() = fail;
        }
    }

    impl HistoryRepository for InMemoryHistory {
        async fn history(&self, session_id: &str) -> Result<Vec<StoredMessage>, HistoryError> {
            Ok(self
                .log
                .lock()
                .unwrap()
                .get(session_id)
                .cloned()
                .unwrap_or_default())
        }

        async fn append(
            &self,
            session_id: &str,
            role: MessageRole,
            content: &str,
        ) -> Result<(), HistoryError> {
            if *self.fail_appends.lock().unwrap() {
                return Err(HistoryError::Connection);
            }
            let seq = {
                let mut next = self.next_seq.lock().unwrap();
                *next += 1;
                *next
            };
            self.log
                .lock()
                .unwrap()
                .entry(session_id.to_string())
                .or_default()
                .push(StoredMessage {
                    seq,
                    session_id: session_id.to_string(),
                    role,
                    content: content.to_string(),
                    created_at: Utc::now(),
                });
            Ok(())
        }

        async fn clear(&self, session_id: &str) -> Result<u64, HistoryError> {
            Ok(self
                .log
                .lock()
                .unwrap()
                .remove(session_id)
                .map(|messages| messages.len() as u64)
                .unwrap_or(0))
        }
    }

    fn relay(
        provider: ScriptedProvider,
        history: InMemoryHistory,
    ) -> ChatRelay<InMemoryHistory> {
        ChatRelay::new(
            BoxCompletionProvider::new(provider),
            history,
            ChatSettings::default(),
        )
    }

    /// Drain a reply stream, returning the concatenated fragments and the
    /// terminating error, if any.
    async fn drain(mut stream: ReplyStream) -> (String, Option<TurnError>) {
        let mut text = String::new();
        while let Some(item) = stream.next().await {
            match item {
                Ok(fragment) => text.push_str(&fragment),
                Err(e) => return (text, Some(e)),
            }
        }
        (text, None)
    }

    #[tokio::test]
    async fn test_empty_input_is_a_noop() {
        let (provider, requests) = ScriptedProvider::new(vec![]);
        let history = InMemoryHistory::default();
        let relay = relay(provider, history.clone());

        assert!(relay.send("u1", "").await.unwrap().is_none());
        assert!(relay.send("u1", "   \n").await.unwrap().is_none());

        assert!(requests.lock().unwrap().is_empty());
        assert!(relay.history("u1").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_fragments_concatenate_to_persisted_reply() {
        let (provider, _) =
            ScriptedProvider::new(vec![ScriptedProvider::reply(&["Anx", "iety ", "is..."])]);
        let history = InMemoryHistory::default();
        let relay = relay(provider, history);

        let stream = relay.send("u1", "What is anxiety?").await.unwrap().unwrap();
        let (text, error) = drain(stream).await;
        assert!(error.is_none());
        assert_eq!(text, "Anxiety is...");

        let stored = relay.history("u1").await.unwrap();
        assert_eq!(stored.len(), 2);
        assert_eq!(stored[0].role, MessageRole::User);
        assert_eq!(stored[0].content, "What is anxiety?");
        assert_eq!(stored[1].role, MessageRole::Assistant);
        assert_eq!(stored[1].content, text);
    }

    #[tokio::test]
    async fn test_prior_history_is_sent_as_context() {
        let (provider, requests) = ScriptedProvider::new(vec![
            ScriptedProvider::reply(&["First reply."]),
            ScriptedProvider::reply(&["Second reply."]),
        ]);
        let history = InMemoryHistory::default();
        let relay = relay(provider, history);

        let stream = relay.send("u1", "What is anxiety?").await.unwrap().unwrap();
        drain(stream).await;

        let stream = relay.send("u1", "And depression?").await.unwrap().unwrap();
        drain(stream).await;

        let requests = requests.lock().unwrap();
        assert_eq!(requests.len(), 2);

        // First request: just the new input on top of the fixed instruction.
        assert_eq!(requests[0].messages.len(), 1);
        assert_eq!(requests[0].system.as_deref(), Some(SYSTEM_PROMPT));
        assert!(requests[0].stream);

        // Second request: both messages of the first turn as prior context.
        assert_eq!(requests[1].messages.len(), 3);
        assert_eq!(requests[1].messages[0].role, MessageRole::User);
        assert_eq!(requests[1].messages[0].content, "What is anxiety?");
        assert_eq!(requests[1].messages[1].role, MessageRole::Assistant);
        assert_eq!(requests[1].messages[1].content, "First reply.");
        assert_eq!(requests[1].messages[2].content, "And depression?");
    }

    #[tokio::test]
    async fn test_history_alternates_after_n_turns() {
        let (provider, _) = ScriptedProvider::new(vec![
            ScriptedProvider::reply(&["one"]),
            ScriptedProvider::reply(&["two"]),
            ScriptedProvider::reply(&["three"]),
        ]);
        let history = InMemoryHistory::default();
        let relay = relay(provider, history);

        for input in ["a", "b", "c"] {
            let stream = relay.send("u1", input).await.unwrap().unwrap();
            let (_, error) = drain(stream).await;
            assert!(error.is_none());
        }

        let stored = relay.history("u1").await.unwrap();
        assert_eq!(stored.len(), 6);
        for (i, message) in stored.iter().enumerate() {
            let expected = if i % 2 == 0 {
                MessageRole::User
            } else {
                MessageRole::Assistant
            };
            assert_eq!(message.role, expected);
        }
        assert!(stored.windows(2).all(|w| w[0].seq < w[1].seq));
    }

    #[tokio::test]
    async fn test_midstream_error_persists_nothing() {
        let script = vec![
            Ok(StreamEvent::Connected),
            Ok(StreamEvent::TextDelta {
                text: "partial".to_string(),
            }),
            Err(CompletionError::Overloaded("upstream busy".to_string())),
        ];
        let (provider, _) = ScriptedProvider::new(vec![script]);
        let history = InMemoryHistory::default();
        let relay = relay(provider, history);

        let stream = relay.send("u1", "hello").await.unwrap().unwrap();
        let (text, error) = drain(stream).await;
        assert_eq!(text, "partial");
        assert!(matches!(error, Some(TurnError::Completion(_))));

        assert!(relay.history("u1").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_persistence_failure_is_reported_and_atomic() {
        let (provider, _) = ScriptedProvider::new(vec![ScriptedProvider::reply(&["full reply"])]);
        let history = InMemoryHistory::default();
        let relay = relay(provider, history.clone());
        history.fail_appends(true);

        let stream = relay.send("u1", "hello").await.unwrap().unwrap();
        let (text, error) = drain(stream).await;

        // All fragments were rendered before the failure surfaced.
        assert_eq!(text, "full reply");
        assert!(matches!(error, Some(TurnError::Persistence(_))));

        // Nothing was committed: no user row without its assistant row.
        history.fail_appends(false);
        assert!(relay.history("u1").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_reset_is_idempotent() {
        let (provider, _) = ScriptedProvider::new(vec![ScriptedProvider::reply(&["reply"])]);
        let history = InMemoryHistory::default();
        let relay = relay(provider, history);

        let stream = relay.send("u1", "hello").await.unwrap().unwrap();
        drain(stream).await;
        assert_eq!(relay.history("u1").await.unwrap().len(), 2);

        assert_eq!(relay.reset("u1").await.unwrap(), 2);
        assert!(relay.history("u1").await.unwrap().is_empty());
        assert_eq!(relay.reset("u1").await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_sessions_are_isolated() {
        let (provider, _) = ScriptedProvider::new(vec![
            ScriptedProvider::reply(&["for u1"]),
            ScriptedProvider::reply(&["for u2"]),
        ]);
        let history = InMemoryHistory::default();
        let relay = relay(provider, history);

        drain(relay.send("u1", "hi").await.unwrap().unwrap()).await;
        drain(relay.send("u2", "hi").await.unwrap().unwrap()).await;

        assert_eq!(relay.history("u1").await.unwrap().len(), 2);
        assert_eq!(relay.history("u2").await.unwrap().len(), 2);

        relay.reset("u1").await.unwrap();
        assert!(relay.history("u1").await.unwrap().is_empty());
        assert_eq!(relay.history("u2").await.unwrap().len(), 2);
    }
}
