use crate::types::{EventRecord, MatchCriterion};

impl MatchCriterion {
    pub fn new(reason: impl Into<String>, message_substring: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
            message_substring: message_substring.into(),
        }
    }

    /// Exact reason, case-sensitive substring of the message.
    pub fn is_match(&self, event: &EventRecord) -> bool {
        event.reason == self.reason && event.message.contains(&self.message_substring)
    }
}

/// The first qualifying Event, if any. Stops scanning at the first hit.
pub fn first_match<'a>(events: &'a [EventRecord], criterion: &MatchCriterion) -> Option<&'a EventRecord> {
    events.iter().find(|ev| criterion.is_match(ev))
}

pub fn matches(events: &[EventRecord], criterion: &MatchCriterion) -> bool {
    first_match(events, criterion).is_some()
}
