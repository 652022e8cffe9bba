//! Recognises typed phrases and gesture shortcuts that start celebrations.

use crate::celebration::CelebrationKind;
use crate::input::SwipeDirection;
use tracing::debug;

/// Prefix matcher for a single phrase
#[derive(Clone, Debug)]
pub struct PhraseTracker {
    kind: CelebrationKind,
    matched: usize,
}

impl PhraseTracker {
    pub fn new(kind: CelebrationKind) -> Self {
        Self { kind, matched: 0 }
    }

    pub fn kind(&self) -> CelebrationKind {
        self.kind
    }

    /// Letters matched so far; always a strict prefix of the phrase
    #[cfg(test)]
    pub fn matched(&self) -> &'static str {
        &self.kind.phrase()[..self.matched]
    }

    pub fn is_relevant(&self, key: char) -> bool {
        self.kind.phrase().contains(key)
    }

    pub fn clear(&mut self) {
        self.matched = 0;
    }

    /// Feed an uppercased key. Returns true when it completes the phrase.
    pub fn feed(&mut self, key: char) -> bool {
        let phrase = self.kind.phrase();
        if phrase[self.matched..].starts_with(key) {
            self.matched += key.len_utf8();
            if self.matched == phrase.len() {
                self.matched = 0;
                return true;
            }
        } else if phrase.starts_with(key) {
            self.matched = key.len_utf8();
        } else {
            self.matched = 0;
        }
        false
    }
}

/// One tracker per celebration phrase, fed in lockstep
#[derive(Clone, Debug)]
pub struct SequenceDetector {
    trackers: Vec<PhraseTracker>,
}

impl Default for SequenceDetector {
    fn default() -> Self {
        Self {
            trackers: CelebrationKind::ALL.iter().map(|k| PhraseTracker::new(*k)).collect(),
        }
    }
}

impl SequenceDetector {
    /// Feed one key press and collect the phrases it completes.
    ///
    /// A tracker only sees keys that belong to its own phrase. A key that
    /// belongs to no phrase at all clears every tracker; a key that belongs
    /// only to other phrases leaves this one alone.
    pub fn feed(&mut self, key: char) -> Vec<CelebrationKind> {
        let key = key.to_uppercase().next().unwrap_or(key);
        let mut fired = Vec::new();

        if !self.trackers.iter().any(|t| t.is_relevant(key)) {
            self.clear();
            return fired;
        }

        for tracker in self.trackers.iter_mut().filter(|t| t.is_relevant(key)) {
            if tracker.feed(key) {
                debug!(kind = ?tracker.kind(), "phrase complete");
                fired.push(tracker.kind());
            }
        }
        fired
    }

    #[cfg(test)]
    pub fn progress(&self, kind: CelebrationKind) -> &'static str {
        self.trackers
            .iter()
            .find(|t| t.kind() == kind)
            .map_or("", PhraseTracker::matched)
    }

    pub fn clear(&mut self) {
        for tracker in &mut self.trackers {
            tracker.clear();
        }
    }
}

/// Gesture shortcuts, bypassing letter tracking
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Gesture {
    Swipe(SwipeDirection),
    TripleTap,
}

/// Celebration a gesture starts directly, if any
pub fn gesture_trigger(gesture: Gesture) -> Option<CelebrationKind> {
    match gesture {
        Gesture::Swipe(SwipeDirection::Down) => Some(CelebrationKind::Mama),
        Gesture::Swipe(SwipeDirection::Left | SwipeDirection::Right) => Some(CelebrationKind::Roomba),
        Gesture::Swipe(SwipeDirection::Up) => None,
        Gesture::TripleTap => Some(CelebrationKind::Emi),
    }
}
