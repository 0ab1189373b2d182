//! Registry of open editor sessions keyed by note id
//!
//! Replaces ad hoc global window maps with one owned object. A saved title
//! change rebinds the note id, so the registry supports re-keying without
//! dropping the session.

use std::collections::HashMap;

use super::session::EditorSession;

/// Open editors, in the order they were opened
#[derive(Default)]
pub struct EditorRegistry {
    sessions: HashMap<String, EditorSession>,
    order: Vec<String>,
}

impl EditorRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, id: &str) -> Option<&EditorSession> {
        self.sessions.get(id)
    }

    pub fn get_mut(&mut self, id: &str) -> Option<&mut EditorSession> {
        self.sessions.get_mut(id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.sessions.contains_key(id)
    }

    /// Register a session under its note id
    pub fn insert(&mut self, session: EditorSession) {
        let id = session.note.id.clone();
        if !self.sessions.contains_key(&id) {
            self.order.push(id.clone());
        }
        self.sessions.insert(id, session);
    }

    pub fn remove(&mut self, id: &str) -> Option<EditorSession> {
        self.order.retain(|k| k != id);
        self.sessions.remove(id)
    }

    /// Move a session to a new id after a save rebound it
    pub fn rekey(&mut self, old_id: &str, new_id: &str) {
        if old_id == new_id {
            return;
        }
        if let Some(session) = self.sessions.remove(old_id) {
            for key in &mut self.order {
                if key == old_id {
                    *key = new_id.to_string();
                }
            }
            self.sessions.insert(new_id.to_string(), session);
        }
    }

    /// Note ids in opening order
    pub fn ids(&self) -> Vec<String> {
        self.order.clone()
    }

    pub fn for_each_mut(&mut self, mut f: impl FnMut(&mut EditorSession)) {
        for id in &self.order {
            if let Some(session) = self.sessions.get_mut(id) {
                f(session);
            }
        }
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::note::Note;
    use std::time::Duration;

    fn session(id: &str) -> EditorSession {
        let mut note = Note::new();
        note.id = id.to_string();
        EditorSession::open(note, Duration::from_secs(5))
    }

    #[test]
    fn insert_and_lookup() {
        let mut reg = EditorRegistry::new();
        assert!(reg.is_empty());
        reg.insert(session("a"));
        reg.insert(session("b"));

        assert_eq!(reg.len(), 2);
        assert!(!reg.is_empty());
        assert!(reg.contains("a"));
        assert_eq!(reg.ids(), vec!["a".to_string(), "b".to_string()]);
    }

    #[test]
    fn rekey_preserves_order_and_session() {
        let mut reg = EditorRegistry::new();
        reg.insert(session("new-abc"));
        reg.insert(session("other"));

        reg.rekey("new-abc", "groceries");

        assert!(!reg.contains("new-abc"));
        assert!(reg.contains("groceries"));
        assert_eq!(reg.ids(), vec!["groceries".to_string(), "other".to_string()]);
    }

    #[test]
    fn remove_drops_from_order() {
        let mut reg = EditorRegistry::new();
        reg.insert(session("a"));
        reg.insert(session("b"));
        assert!(reg.remove("a").is_some());
        assert_eq!(reg.ids(), vec!["b".to_string()]);
        assert!(reg.remove("a").is_none());
    }

    #[test]
    fn for_each_visits_in_order() {
        let mut reg = EditorRegistry::new();
        reg.insert(session("a"));
        reg.insert(session("b"));

        let mut seen = Vec::new();
        reg.for_each_mut(|s| seen.push(s.note.id.clone()));
        assert_eq!(seen, vec!["a".to_string(), "b".to_string()]);
    }
}
