//! Per-conversation selection state, in process memory only.
//!
//! Entries live until `reset` or restart. Reads hand back clones so no shard
//! lock is ever held across a fixture fetch.

use crate::models::{ConversationId, League, Phase, SessionState};
use dashmap::DashMap;
use tracing::debug;

#[derive(Default)]
pub struct SessionStore {
    states: DashMap<ConversationId, SessionState>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, conv: ConversationId) -> Option<SessionState> {
        self.states.get(&conv).map(|entry| entry.value().clone())
    }

    /// Remember `league` and wait for a date.
    pub fn set_league(&self, conv: ConversationId, league: &League) {
        debug!(conversation = %conv, league = league.source_ref, "league selected");
        self.states.insert(
            conv,
            SessionState {
                conversation_id: conv,
                selected_league: Some(league.clone()),
                phase: Phase::AwaitingDate,
            },
        );
    }

    /// Back to the league menu; an existing selection is kept so a date can be re-picked.
    pub fn mark_awaiting_league(&self, conv: ConversationId) {
        self.states
            .entry(conv)
            .or_insert_with(|| SessionState::new(conv))
            .phase = Phase::AwaitingLeague;
    }

    /// Forget everything about `conv`, leaving a fresh entry behind.
    pub fn reset(&self, conv: ConversationId) {
        debug!(conversation = %conv, "session reset");
        self.states.insert(conv, SessionState::new(conv));
    }

    pub fn len(&self) -> usize {
        self.states.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::LEAGUES;
    use std::sync::Arc;

    #[test]
    fn test_unknown_conversation_has_no_state() {
        let store = SessionStore::new();
        assert!(store.get(ConversationId(1)).is_none());
    }

    #[test]
    fn test_set_league_then_get_for_every_league() {
        let store = SessionStore::new();
        for (i, league) in LEAGUES.iter().enumerate() {
            let conv = ConversationId(i as i64 - 5);
            store.set_league(conv, league);
            let state = store.get(conv).unwrap();
            assert_eq!(state.selected_league.as_ref(), Some(league));
            assert_eq!(state.conversation_id, conv);
            assert_eq!(state.phase, Phase::AwaitingDate);
        }
        assert_eq!(store.len(), LEAGUES.len());
    }

    #[test]
    fn test_set_league_overwrites() {
        let store = SessionStore::new();
        let conv = ConversationId(7);
        store.set_league(conv, &LEAGUES[0]);
        store.set_league(conv, &LEAGUES[3]);
        assert_eq!(store.get(conv).unwrap().selected_league, Some(LEAGUES[3].clone()));
    }

    #[test]
    fn test_reset_clears_selection() {
        let store = SessionStore::new();
        let conv = ConversationId(7);
        store.set_league(conv, &LEAGUES[0]);
        store.reset(conv);
        let state = store.get(conv).unwrap();
        assert_eq!(state.selected_league, None);
        assert_eq!(state.phase, Phase::AwaitingLeague);
    }

    #[test]
    fn test_mark_awaiting_league_keeps_selection() {
        let store = SessionStore::new();
        let conv = ConversationId(9);
        store.set_league(conv, &LEAGUES[1]);
        store.mark_awaiting_league(conv);
        let state = store.get(conv).unwrap();
        assert_eq!(state.phase, Phase::AwaitingLeague);
        assert_eq!(state.selected_league, Some(LEAGUES[1].clone()));
    }

    #[test]
    fn test_conversations_are_isolated() {
        let store = SessionStore::new();
        store.set_league(ConversationId(1), &LEAGUES[0]);
        assert!(store.get(ConversationId(2)).is_none());
        store.reset(ConversationId(2));
        assert_eq!(store.get(ConversationId(1)).unwrap().selected_league, Some(LEAGUES[0].clone()));
    }

    #[test]
    fn test_concurrent_writers() {
        let store = Arc::new(SessionStore::new());
        let handles: Vec<_> = (0..8)
            .map(|t| {
                let store = Arc::clone(&store);
                std::thread::spawn(move || {
                    for i in 0..100 {
                        let conv = ConversationId(t * 1000 + i);
                        store.set_league(conv, &LEAGUES[(i as usize) % LEAGUES.len()]);
                        assert!(store.get(conv).unwrap().selected_league.is_some());
                    }
                })
            })
            .collect();
        for h in handles {
            h.join().unwrap();
        }
        assert_eq!(store.len(), 800);
    }
}
