use std::collections::VecDeque;

use async_trait::async_trait;
use meetbell_core::EventSource;
use meetbell_domain::{EventRecord, MeetbellError, Result as DomainResult};
use parking_lot::Mutex;

/// Event source that replays a script of fetch outcomes.
///
/// Once the script runs out every fetch returns `fallback`.
pub struct ScriptedSource {
    script: Mutex<VecDeque<DomainResult<Vec<EventRecord>>>>,
    fallback: DomainResult<Vec<EventRecord>>,
    fetches: Mutex<usize>,
}

impl ScriptedSource {
    pub fn new(script: Vec<DomainResult<Vec<EventRecord>>>) -> Self {
        Self { script: Mutex::new(script.into()), fallback: Ok(Vec::new()), fetches: Mutex::new(0) }
    }

    /// Source that returns the same events on every fetch.
    pub fn repeating(events: Vec<EventRecord>) -> Self {
        Self { script: Mutex::new(VecDeque::new()), fallback: Ok(events), fetches: Mutex::new(0) }
    }

    /// Source whose every fetch fails with a network error.
    pub fn failing() -> Self {
        Self {
            script: Mutex::new(VecDeque::new()),
            fallback: Err(MeetbellError::Network("calendar unreachable".into())),
            fetches: Mutex::new(0),
        }
    }

    pub fn fetches(&self) -> usize {
        *self.fetches.lock()
    }
}

#[async_trait]
impl EventSource for ScriptedSource {
    async fn fetch(&self) -> DomainResult<Vec<EventRecord>> {
        *self.fetches.lock() += 1;
        let next = self.script.lock().pop_front();
        next.unwrap_or_else(|| self.fallback.clone())
    }

    fn name(&self) -> &str {
        "scripted"
    }
}
