//! Per-server session credential holder.
//!
//! One `SessionManager` is owned by each server instance and shared (behind
//! `Arc`) with every transport session of that instance. The only mutation
//! after construction is the one-time token injection from the SSE handshake
//! header; concurrent handshakes race on that transition, so the check and
//! the set happen under a single lock.

use std::sync::Mutex;

use tracing::debug;

#[derive(Default)]
pub struct SessionManager {
    token: Mutex<Option<String>>,
}

impl std::fmt::Debug for SessionManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionManager")
            .field("is_authenticated", &self.is_authenticated())
            .finish()
    }
}

impl SessionManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Install a session credential. Returns `true` when the credential was
    /// adopted, `false` when the session was already authenticated: a late
    /// injection never overwrites a credential established at startup (or by
    /// an earlier injection).
    pub fn set_token(&self, token: impl Into<String>) -> bool {
        let mut slot = self.token.lock().unwrap_or_else(|e| e.into_inner());
        if slot.is_some() {
            debug!("session token already set; ignoring late injection");
            return false;
        }
        *slot = Some(token.into());
        true
    }

    pub fn is_authenticated(&self) -> bool {
        self.token.lock().unwrap_or_else(|e| e.into_inner()).is_some()
    }

    /// Current bearer token, if any. Clones so no lock is held across awaits.
    pub fn bearer_token(&self) -> Option<String> {
        self.token.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn injection_transitions_to_authenticated_once() {
        let session = SessionManager::new();
        assert!(!session.is_authenticated());

        assert!(session.set_token("first"));
        assert!(session.is_authenticated());
        assert_eq!(session.bearer_token().as_deref(), Some("first"));
    }

    /// A second, different token must leave the original credential intact.
    #[test]
    fn second_injection_is_ignored() {
        let session = SessionManager::new();
        assert!(session.set_token("first"));
        assert!(!session.set_token("second"));
        assert_eq!(session.bearer_token().as_deref(), Some("first"));
        assert!(session.is_authenticated());
    }

    #[test]
    fn queries_have_no_side_effects() {
        let session = SessionManager::new();
        assert!(!session.is_authenticated());
        assert!(session.bearer_token().is_none());
        assert!(!session.is_authenticated());
    }

    /// Concurrent first injections: exactly one wins, state stays coherent.
    #[test]
    fn racing_injections_produce_one_winner() {
        use std::sync::Arc;

        let session = Arc::new(SessionManager::new());
        let handles: Vec<_> = (0..8)
            .map(|i| {
                let session = Arc::clone(&session);
                std::thread::spawn(move || session.set_token(format!("token-{i}")))
            })
            .collect();

        let wins = handles
            .into_iter()
            .map(|h| h.join().unwrap())
            .filter(|&won| won)
            .count();
        assert_eq!(wins, 1);
        assert!(session.is_authenticated());
    }
}
