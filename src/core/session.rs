//! Debounced auto-save state machine for one open editor
//!
//! `Clean -> Dirty -> (deadline elapsed and title not focused) -> Saving -> Clean`
//!
//! Edits re-arm the deadline. Title-field focus gates the trigger so a save
//! does not fire (and rename the file) while the user is still typing the
//! name. A failed save re-arms Dirty; the only retry is the next debounce
//! cycle or a manual save.

use std::time::{Duration, Instant};

use super::codec;
use super::note::Note;

/// Where the session is in the save cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Clean,
    Dirty,
    Saving,
}

/// One open note editor: the note plus its edit buffers and save state
pub struct EditorSession {
    /// Last saved (or freshly created) state of the note
    pub note: Note,
    /// Markdown text being edited
    pub buffer: String,
    /// Title field contents
    pub title_buffer: String,
    /// True while the title field has keyboard focus
    pub title_focused: bool,
    state: SessionState,
    deadline: Option<Instant>,
    interval: Duration,
}

impl EditorSession {
    /// Open an editor over a note, rendering its rich text to markdown
    pub fn open(note: Note, interval: Duration) -> Self {
        let buffer = codec::rich_text_to_markdown(&note.content);
        let title_buffer = note.title.clone();
        Self {
            note,
            buffer,
            title_buffer,
            title_focused: false,
            state: SessionState::Clean,
            deadline: None,
            interval,
        }
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn is_dirty(&self) -> bool {
        self.state != SessionState::Clean
    }

    /// Change the debounce interval; an armed deadline keeps its old value
    pub fn set_interval(&mut self, interval: Duration) {
        self.interval = interval;
    }

    /// Record an edit: arm (or re-arm) the debounce deadline
    pub fn mark_dirty_at(&mut self, now: Instant) {
        if self.state != SessionState::Saving {
            self.state = SessionState::Dirty;
        }
        self.deadline = Some(now + self.interval);
    }

    pub fn mark_dirty(&mut self) {
        self.mark_dirty_at(Instant::now());
    }

    /// Whether the debounce timer has elapsed and a save may fire
    pub fn should_auto_save(&self, now: Instant) -> bool {
        self.state == SessionState::Dirty
            && !self.title_focused
            && self.deadline.map(|d| now >= d).unwrap_or(false)
    }

    /// Snapshot the note with the edit buffers applied and enter Saving
    pub fn begin_save(&mut self) -> Note {
        self.state = SessionState::Saving;
        let mut note = self.note.clone();
        note.title = self.title_buffer.trim().to_string();
        if note.title.is_empty() {
            note.title = super::note::DEFAULT_TITLE.to_string();
        }
        note.content = codec::markdown_to_rich_text(&self.buffer);
        note
    }

    /// Accept the repository's saved note and return to Clean
    pub fn finish_save(&mut self, saved: Note) {
        self.title_buffer = saved.title.clone();
        self.note = saved;
        self.state = SessionState::Clean;
        self.deadline = None;
    }

    /// A failed save re-arms Dirty for the next cycle
    pub fn save_failed_at(&mut self, now: Instant) {
        self.state = SessionState::Dirty;
        self.deadline = Some(now + self.interval);
    }

    pub fn save_failed(&mut self) {
        self.save_failed_at(Instant::now());
    }
}
