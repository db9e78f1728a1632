//! Rule-based fallback responder.
//!
//! An ordered, first-match-wins table of intent rules. Each rule is a
//! pure predicate that either yields an [`Intent`] or passes; the
//! dispatcher then renders the reply for the chosen intent. Which rule
//! fires is deterministic; randomness only picks among canned replies.

use std::sync::LazyLock;

use chrono::{DateTime, Local};
use rand::Rng;
use regex::Regex;

use parley_core::types::Message;

use crate::evaluator::{evaluate, format_number};
use crate::search::HistorySearch;

pub const ARITHMETIC_REJECTION: &str = "That expression didn’t compute. Try something simpler.";

pub const LINK_REPLY: &str =
    "I don’t have browsing here. Drop a URL and I’ll at least recognize it.";

const GREETINGS: &[&str] = &[
    "Hey. What do you need?",
    "Hello. Ask your question like you mean it.",
    "Hi. I’m here, unfortunately.",
];

const DEFAULT_REPLIES: &[&str] = &[
    "Got it. If you want something smarter, wire this to a real API. For now, ask about time, date, or basic math.",
    "Message received. I can handle greetings, time, dates, tiny math, and lazy search.",
    "Cool. Sadly, my offline brain is small. Ask me to compute something or search recent messages.",
];

// =============================================================================
// Compiled patterns
// =============================================================================

static GREETING_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\b(?:hi|hello|hey|yo|sup)\b").expect("Invalid intent regex"));

static CLOCK_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\b(?:time|clock)\b").expect("Invalid intent regex"));

static CALENDAR_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\b(?:date|day|today)\b").expect("Invalid intent regex"));

// The captured tail must open like an expression and may span lines;
// the evaluator's whitelist decides whether the rest is acceptable.
static ARITHMETIC_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?is)(?:^|\b)(?:what\s+is|calculate|calc|=)\s*([0-9.(+\-].*?)\s*\?*$")
        .expect("Invalid intent regex")
});

static LINK_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\b(?:link|url|website)\b").expect("Invalid intent regex"));

static SEARCH_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(?:search|find|look\s*for)\s+(\S.*)").expect("Invalid intent regex")
});

// =============================================================================
// Intents
// =============================================================================

/// The outcome of classifying an utterance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Intent {
    Greeting,
    Clock,
    Calendar,
    /// Candidate expression text, as typed.
    Arithmetic { expression: String },
    LinkMention,
    /// Lowercased search term.
    HistorySearch { term: String },
    Default,
}

impl Intent {
    pub fn name(&self) -> &'static str {
        match self {
            Intent::Greeting => "greeting",
            Intent::Clock => "clock",
            Intent::Calendar => "calendar",
            Intent::Arithmetic { .. } => "arithmetic",
            Intent::LinkMention => "link_mention",
            Intent::HistorySearch { .. } => "history_search",
            Intent::Default => "default",
        }
    }
}

type IntentRule = fn(&str) -> Option<Intent>;

/// Rules in priority order.
const RULES: &[IntentRule] = &[
    greeting_rule,
    clock_rule,
    calendar_rule,
    arithmetic_rule,
    link_rule,
    search_rule,
];

fn greeting_rule(text: &str) -> Option<Intent> {
    GREETING_RE.is_match(text).then_some(Intent::Greeting)
}

fn clock_rule(text: &str) -> Option<Intent> {
    CLOCK_RE.is_match(text).then_some(Intent::Clock)
}

fn calendar_rule(text: &str) -> Option<Intent> {
    CALENDAR_RE.is_match(text).then_some(Intent::Calendar)
}

fn arithmetic_rule(text: &str) -> Option<Intent> {
    let caps = ARITHMETIC_RE.captures(text)?;
    let expression = caps.get(1)?.as_str().trim();
    if reads_as_prose(expression) {
        return None;
    }
    Some(Intent::Arithmetic {
        expression: expression.to_string(),
    })
}

/// Words mixed with numbers and ordinary punctuation ("401k", "5 apples,
/// search apples") are a sentence, not a bad expression. Anything with
/// code-like symbols stays arithmetic so the evaluator rejects it.
fn reads_as_prose(expression: &str) -> bool {
    expression.chars().any(|c| c.is_alphabetic())
        && expression.chars().all(|c| {
            c.is_alphanumeric()
                || c.is_whitespace()
                || "+-*/%^().".contains(c)
                || ",'’!?:\"".contains(c)
        })
}

fn link_rule(text: &str) -> Option<Intent> {
    LINK_RE.is_match(text).then_some(Intent::LinkMention)
}

fn search_rule(text: &str) -> Option<Intent> {
    let caps = SEARCH_RE.captures(text)?;
    Some(Intent::HistorySearch {
        term: caps.get(1)?.as_str().trim().to_lowercase(),
    })
}

// =============================================================================
// IntentDispatcher
// =============================================================================

/// Ordered intent chain with reply rendering.
pub struct IntentDispatcher {
    search: HistorySearch,
    clock: fn() -> DateTime<Local>,
}

impl Default for IntentDispatcher {
    fn default() -> Self {
        Self::new(HistorySearch::default().limit)
    }
}

impl IntentDispatcher {
    /// Create a dispatcher whose history search lists at most `search_limit` hits.
    pub fn new(search_limit: usize) -> Self {
        Self {
            search: HistorySearch::new(search_limit),
            clock: Local::now,
        }
    }

    /// Replace the wall clock used by the clock and calendar rules.
    pub fn with_clock(mut self, clock: fn() -> DateTime<Local>) -> Self {
        self.clock = clock;
        self
    }

    /// Classify an utterance. The first matching rule wins.
    pub fn classify(&self, text: &str) -> Intent {
        let text = text.trim();
        RULES
            .iter()
            .find_map(|rule| rule(text))
            .unwrap_or(Intent::Default)
    }

    /// Classify and reply in one step.
    pub fn dispatch(&self, text: &str, history: &[Message]) -> (Intent, String) {
        let intent = self.classify(text);
        let reply = self.respond(&intent, history);
        (intent, reply)
    }

    /// Render the reply for an already classified intent.
    pub fn respond(&self, intent: &Intent, history: &[Message]) -> String {
        match intent {
            Intent::Greeting => pick(GREETINGS).to_string(),
            Intent::Clock => format!("Current time: {}", (self.clock)().format("%-I:%M %p")),
            Intent::Calendar => format!("Today is {}", (self.clock)().format("%A, %B %-d, %Y")),
            Intent::Arithmetic { expression } => match evaluate(expression) {
                Ok(value) => format!("{} = {}", expression, format_number(value)),
                Err(e) => {
                    tracing::debug!(expression = %expression, error = %e, "Arithmetic rejected");
                    ARITHMETIC_REJECTION.to_string()
                }
            },
            Intent::LinkMention => LINK_REPLY.to_string(),
            Intent::HistorySearch { term } => self.search.reply(term, history),
            Intent::Default => pick(DEFAULT_REPLIES).to_string(),
        }
    }
}

fn pick(options: &[&'static str]) -> &'static str {
    options[rand::rng().random_range(0..options.len())]
}
