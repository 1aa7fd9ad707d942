//! Feedback bridges: haptics and motivational text
//!
//! Both are cosmetic. Haptics are best-effort and silently do nothing when
//! the host has no support. Phrase requests are asynchronous; the tick loop
//! never waits on them, and a failed or slow request settles on a fixed
//! fallback phrase.

use std::future::Future;
use std::pin::Pin;

use crate::error::FeedbackError;

/// Strength of an impact pulse
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImpactStrength {
    Light,
    Medium,
    Heavy,
}

impl ImpactStrength {
    /// Style name understood by the host
    pub fn as_str(&self) -> &'static str {
        match self {
            ImpactStrength::Light => "light",
            ImpactStrength::Medium => "medium",
            ImpactStrength::Heavy => "heavy",
        }
    }
}

/// Haptic/audible feedback capability, injected into the session
pub trait HapticNotifier {
    /// Short pulse on collection
    fn impact(&self, strength: ImpactStrength);
    /// Success notification (turbo activation)
    fn success(&self);
    /// Celebration when a new level starts
    fn level_up(&self) {}
}

/// Used when the host has no feedback integration
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopHaptics;

impl HapticNotifier for NoopHaptics {
    fn impact(&self, _strength: ImpactStrength) {}
    fn success(&self) {}
}

/// Shown when a phrase request fails or times out
pub const FALLBACK_PHRASE: &str = "Excellent!";

/// Built-in phrases for local suggestions and random cheers
pub const LOCAL_PHRASES: [&str; 10] = [
    "Wow!",
    "Spotless!",
    "Master of order!",
    "Flawless!",
    "Not a speck!",
    "Suction power!",
    "Brilliant!",
    "Keep it up!",
    "Order restored!",
    "Ultra sweep!",
];

pub type PhraseFuture = Pin<Box<dyn Future<Output = Result<String, FeedbackError>>>>;

/// Asynchronous supplier of a celebratory phrase for a milestone count
pub trait PhraseSource {
    fn phrase_for(&self, milestone: u64) -> PhraseFuture;
}

/// Offline supplier that resolves immediately from [`LOCAL_PHRASES`]
#[derive(Debug, Default, Clone, Copy)]
pub struct LocalPhrases;

impl LocalPhrases {
    pub fn pick(index: u64) -> &'static str {
        LOCAL_PHRASES[(index % LOCAL_PHRASES.len() as u64) as usize]
    }
}

impl PhraseSource for LocalPhrases {
    fn phrase_for(&self, milestone: u64) -> PhraseFuture {
        Box::pin(std::future::ready(Ok(Self::pick(milestone).to_string())))
    }
}

/// Highest multiple of `interval` crossed when a counter moved from
/// `before` to `after`, if any
pub fn milestone_crossed(before: u64, after: u64, interval: u64) -> Option<u64> {
    if interval == 0 || after <= before {
        return None;
    }
    let milestone = after / interval * interval;
    (milestone > before && milestone > 0).then_some(milestone)
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct PendingPhrase {
    milestone: u64,
    since: f64,
}

/// The single motivational message line shown to the player
#[derive(Debug, Clone)]
pub struct MotivationBoard {
    message: String,
    pending: Option<PendingPhrase>,
    timeout_ms: f64,
}

impl MotivationBoard {
    pub fn new(timeout_ms: f64) -> Self {
        Self {
            message: String::new(),
            pending: None,
            timeout_ms,
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn set(&mut self, message: impl Into<String>) {
        self.message = message.into();
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// Record that a phrase request for `milestone` went out at `now`
    pub fn begin(&mut self, milestone: u64, now: f64) {
        self.pending = Some(PendingPhrase {
            milestone,
            since: now,
        });
    }

    /// Apply a phrase result. Late results still overwrite the message.
    pub fn deliver(&mut self, result: Result<String, FeedbackError>) {
        let phrase = result.and_then(|text| {
            let text = text.trim();
            if text.is_empty() {
                Err(FeedbackError::Empty)
            } else {
                Ok(text.to_string())
            }
        });

        self.message = match phrase {
            Ok(text) => text,
            Err(e) => {
                log::warn!("Phrase request failed, using fallback: {}", e);
                FALLBACK_PHRASE.to_string()
            }
        };
        self.pending = None;
    }

    /// Give up on a request that has been pending too long
    pub fn expire(&mut self, now: f64) {
        if let Some(pending) = self.pending {
            if now - pending.since > self.timeout_ms {
                log::warn!("Phrase for milestone {} timed out", pending.milestone);
                self.deliver(Err(FeedbackError::Timeout));
            }
        }
    }
}
