//! The note entity and filename derivation rules

use std::time::{SystemTime, UNIX_EPOCH};

use rand::Rng;

/// Default title for notes the user has not named yet
pub const DEFAULT_TITLE: &str = "Untitled Note";

/// A sticky note
#[derive(Debug, Clone, PartialEq)]
pub struct Note {
    /// Opaque identifier; doubles as the file base name once saved
    pub id: String,
    /// Display title
    pub title: String,
    /// Rich-text body as an HTML-like markup string
    pub content: String,
    /// File creation time, when known
    pub created_at: Option<SystemTime>,
    /// Last save time, when known
    pub updated_at: Option<SystemTime>,
    /// "Always on top" flag
    pub pinned: Option<bool>,
    /// CSS color string for the note background
    pub color: Option<String>,
    /// True until the first successful save; never persisted
    pub is_new: bool,
}

impl Note {
    /// Create an in-memory note that has no file yet
    pub fn new() -> Self {
        Self {
            id: format!("new-{}", to_base36(now_millis())),
            title: DEFAULT_TITLE.to_string(),
            content: "<p></p>".to_string(),
            created_at: Some(SystemTime::now()),
            updated_at: Some(SystemTime::now()),
            pinned: None,
            color: None,
            is_new: true,
        }
    }
}

impl Default for Note {
    fn default() -> Self {
        Self::new()
    }
}

/// Generate a durable note id: millisecond timestamp plus random tail,
/// both base36
pub fn generate_id() -> String {
    let mut rng = rand::thread_rng();
    const ALPHABET: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";
    let tail: String = (0..8)
        .map(|_| ALPHABET[rng.gen_range(0..ALPHABET.len())] as char)
        .collect();
    format!("{}{}", to_base36(now_millis()), tail)
}

/// Filesystem-safe slug: lowercase, trimmed, every byte outside `[a-z0-9]`
/// replaced with `_`
pub fn safe_title(title: &str) -> String {
    title
        .trim()
        .to_lowercase()
        .chars()
        .map(|c| if c.is_ascii_lowercase() || c.is_ascii_digit() { c } else { '_' })
        .collect()
}

/// Derive the file base name for a note: the safe title, or an id-based
/// fallback when the title is empty
pub fn file_stem(id: &str, title: &str) -> String {
    let slug = safe_title(title);
    if slug.is_empty() {
        let prefix: String = id.chars().take(8).collect();
        format!("untitled_note_{prefix}")
    } else {
        slug
    }
}

fn now_millis() -> u128 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis())
        .unwrap_or(0)
}

fn to_base36(mut n: u128) -> String {
    const DIGITS: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";
    if n == 0 {
        return "0".to_string();
    }
    let mut out = Vec::new();
    while n > 0 {
        out.push(DIGITS[(n % 36) as usize]);
        n /= 36;
    }
    out.reverse();
    String::from_utf8(out).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn safe_title_replaces_non_alphanumerics() {
        assert_eq!(safe_title("Meeting Notes"), "meeting_notes");
        assert_eq!(safe_title("  Groceries!  "), "groceries_");
        assert_eq!(safe_title("Déjà vu"), "d_j__vu");
    }

    #[test]
    fn safe_title_is_idempotent() {
        for t in ["Meeting Notes", "a-b-c", "UPPER case 42", "---", "ünïcödé"] {
            let once = safe_title(t);
            assert_eq!(safe_title(&once), once);
        }
    }

    #[test]
    fn file_stem_falls_back_for_empty_titles() {
        let stem = file_stem("abcdef123456", "   ");
        assert_eq!(stem, "untitled_note_abcdef12");
        assert_eq!(file_stem("xyz", ""), "untitled_note_xyz");
    }

    #[test]
    fn new_notes_are_marked_transient() {
        let note = Note::new();
        assert!(note.is_new);
        assert!(note.id.starts_with("new-"));
        assert_eq!(note.title, DEFAULT_TITLE);
    }

    #[test]
    fn generated_ids_are_distinct() {
        let a = generate_id();
        let b = generate_id();
        assert_ne!(a, b);
        assert!(a.chars().all(|c| c.is_ascii_lowercase() || c.is_ascii_digit()));
    }

    #[test]
    fn base36_round_values() {
        assert_eq!(to_base36(0), "0");
        assert_eq!(to_base36(35), "z");
        assert_eq!(to_base36(36), "10");
    }
}
