//! Response pipeline: relay first, rule-based fallback second.
//!
//! One `respond` call handles one utterance end to end: validate, wait
//! out the simulated latency, resolve a reply, then append the utterance
//! and the reply together. Calls are serialised so the log always
//! alternates utterance/reply per turn.

use std::sync::Arc;

use tracing::{debug, info, warn};

use parley_core::config::ParleyConfig;
use parley_core::log::ConversationStore;
use parley_core::types::{HistoryTurn, Message, Role};

use crate::dispatcher::{Intent, IntentDispatcher};
use crate::error::{ChatError, RelayError};
use crate::latency::SimulatedLatency;
use crate::relay::{HttpRelayClient, OfflineRelay, RelayReply, RemoteReplyClient};

pub const LOADING_REPLY: &str = "[Model is loading, try again shortly.]";

pub const ONLINE_WELCOME: &str =
    "Welcome. I’m online-capable now. If the server dies, I fall back offline.";

pub const OFFLINE_WELCOME: &str =
    "Welcome. I’m an offline demo bot. Ask about time/date, simple math, or say hi.";

const DEFAULT_AUTHOR: &str = "You";

/// Where a reply came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReplySource {
    Relay,
    /// The relay reported its model is still loading.
    Loading,
    /// The local dispatcher answered with this intent.
    Fallback(Intent),
}

impl ReplySource {
    pub fn name(&self) -> &'static str {
        match self {
            ReplySource::Relay => "relay",
            ReplySource::Loading => "loading",
            ReplySource::Fallback(_) => "fallback",
        }
    }
}

/// A resolved reply and its origin.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolution {
    pub reply: String,
    pub source: ReplySource,
}

/// The two messages appended for one accepted utterance.
#[derive(Debug, Clone)]
pub struct Exchange {
    pub user: Message,
    pub reply: Message,
    pub source: ReplySource,
}

// =============================================================================
// ResponsePipeline
// =============================================================================

pub struct ResponsePipeline {
    relay: Arc<dyn RemoteReplyClient>,
    dispatcher: IntentDispatcher,
    latency: SimulatedLatency,
    history_window: usize,
    max_message_length: usize,
    assistant_name: String,
    relay_enabled: bool,
    seed_welcome: bool,
    turn: tokio::sync::Mutex<()>,
}

impl ResponsePipeline {
    /// Build a pipeline around an existing relay client.
    pub fn new(relay: Arc<dyn RemoteReplyClient>, config: &ParleyConfig) -> Self {
        Self {
            relay,
            dispatcher: IntentDispatcher::new(config.chat.search_limit),
            latency: SimulatedLatency::new(config.latency.clone()),
            history_window: config.relay.history_window,
            max_message_length: config.chat.max_message_length,
            assistant_name: config.chat.assistant_name.clone(),
            relay_enabled: config.relay.enabled,
            seed_welcome: config.chat.seed_welcome,
            turn: tokio::sync::Mutex::new(()),
        }
    }

    /// Build a pipeline with an HTTP relay client, or an offline one when
    /// the relay is disabled.
    pub fn from_config(config: &ParleyConfig) -> Result<Self, RelayError> {
        let relay: Arc<dyn RemoteReplyClient> = if config.relay.enabled {
            Arc::new(HttpRelayClient::from_config(&config.relay, &config.upstream)?)
        } else {
            Arc::new(OfflineRelay)
        };
        Ok(Self::new(relay, config))
    }

    pub fn with_dispatcher(mut self, dispatcher: IntentDispatcher) -> Self {
        self.dispatcher = dispatcher;
        self
    }

    pub fn with_latency(mut self, latency: SimulatedLatency) -> Self {
        self.latency = latency;
        self
    }

    pub fn relay_enabled(&self) -> bool {
        self.relay_enabled
    }

    /// The relay context: trailing history plus the utterance as the final
    /// user turn, at most `history_window` turns in all.
    pub fn build_window(&self, user_text: &str, history: &[Message]) -> Vec<HistoryTurn> {
        let keep = self.history_window.saturating_sub(1);
        let start = history.len().saturating_sub(keep);
        let mut window: Vec<HistoryTurn> = history[start..].iter().map(HistoryTurn::from).collect();
        window.push(HistoryTurn::new(Role::User, user_text));
        window
    }

    /// Resolve a reply for `user_text`. `history` excludes the utterance.
    ///
    /// Exactly one relay attempt is made; every failure falls back to the
    /// dispatcher, so the result is never empty.
    pub async fn resolution(&self, user_text: &str, history: &[Message]) -> Resolution {
        let window = self.build_window(user_text, history);

        match self.relay.resolve(&window).await {
            Ok(RelayReply::Text(reply)) => {
                debug!(len = reply.len(), "Relay replied");
                return Resolution {
                    reply,
                    source: ReplySource::Relay,
                };
            }
            Ok(RelayReply::Loading) => {
                info!("Relay model is loading");
                return Resolution {
                    reply: LOADING_REPLY.to_string(),
                    source: ReplySource::Loading,
                };
            }
            Err(RelayError::Disabled) => {}
            Err(e) => warn!(error = %e, "Relay failed, using local responder"),
        }

        let (intent, reply) = self.dispatcher.dispatch(user_text, history);
        debug!(intent = intent.name(), "Local responder matched");
        Resolution {
            reply,
            source: ReplySource::Fallback(intent),
        }
    }

    /// Reply text only.
    pub async fn resolve(&self, user_text: &str, history: &[Message]) -> String {
        self.resolution(user_text, history).await.reply
    }

    /// Accept an utterance from `author`, append it and the reply to
    /// `store`, and return both.
    pub async fn respond(
        &self,
        store: &dyn ConversationStore,
        author: &str,
        text: &str,
    ) -> Result<Exchange, ChatError> {
        let text = text.trim();
        if text.is_empty() {
            return Err(ChatError::EmptyMessage);
        }
        if text.chars().count() > self.max_message_length {
            return Err(ChatError::MessageTooLong(self.max_message_length));
        }

        let _turn = self.turn.lock().await;

        let author = match author.trim() {
            "" => DEFAULT_AUTHOR,
            name => name,
        };

        let history = store.all()?;
        let user = Message::user(author, text);

        self.latency.wait(text).await;
        let resolution = self.resolution(text, &history).await;

        // No await between the appends; a dropped turn leaves the log unchanged.
        let reply = Message::assistant(self.assistant_name.clone(), &resolution.reply);
        store.append(user.clone())?;
        store.append(reply.clone())?;

        Ok(Exchange {
            user,
            reply,
            source: resolution.source,
        })
    }

    /// Seed an empty conversation with a welcome message, if enabled.
    pub fn start_session(&self, store: &dyn ConversationStore) -> Result<Option<Message>, ChatError> {
        if !self.seed_welcome || !store.is_empty()? {
            return Ok(None);
        }
        let text = if self.relay_enabled {
            ONLINE_WELCOME
        } else {
            OFFLINE_WELCOME
        };
        let welcome = Message::assistant(self.assistant_name.clone(), text);
        store.append(welcome.clone())?;
        info!("Seeded conversation with welcome message");
        Ok(Some(welcome))
    }
}
