//! Note repository: the note-to-file mapping
//!
//! The filename is the identity key, so every title edit is a potential
//! rename. Before a subsequent save the repository re-scans the directory to
//! reconstruct what the file was called before, rather than trusting a cached
//! path; another window may have renamed it in the meantime.

use std::path::{Path, PathBuf};
use std::time::SystemTime;

use anyhow::{Context, Result};

use super::codec::{self, NoteMetadata};
use super::gateway::{FileEntry, FileGateway};
use super::note::{generate_id, safe_title, Note};

/// Maps [`Note`] entities to markdown files in the configured save directory
pub struct NoteRepository<G: FileGateway> {
    gateway: G,
    dir: PathBuf,
}

impl<G: FileGateway> NoteRepository<G> {
    pub fn new(gateway: G, dir: PathBuf) -> Self {
        Self { gateway, dir }
    }

    /// The configured save directory
    pub fn directory(&self) -> &Path {
        &self.dir
    }

    /// Point the repository at a different save directory
    pub fn set_directory(&mut self, dir: PathBuf) {
        self.dir = dir;
    }

    /// Load every note in the save directory
    ///
    /// Files that fail to read or parse are skipped individually; the rest
    /// of the listing still comes back.
    pub fn list(&self) -> Result<Vec<Note>> {
        let entries = self
            .gateway
            .list_files(&self.dir)
            .with_context(|| format!("Failed to list notes in {}", self.dir.display()))?;

        let mut notes = Vec::new();
        for entry in entries {
            match self.load_entry(&entry) {
                Ok(note) => notes.push(note),
                Err(e) => tracing::warn!("Skipping unreadable note {}: {e:#}", entry.name),
            }
        }
        Ok(notes)
    }

    /// Create an in-memory note; no file is written until the first save
    pub fn create(&self) -> Note {
        Note::new()
    }

    /// Persist a note, renaming its file when the title changed
    ///
    /// Returns the saved note with `updated_at` set and `id` rebound to the
    /// file's base name.
    pub fn save(&self, note: &Note) -> Result<Note> {
        let mut note = note.clone();
        note.updated_at = Some(SystemTime::now());
        if note.is_new {
            // Swap the transient placeholder id for a durable one; it also
            // seeds the filename fallback for empty titles
            note.id = generate_id();
        }

        // First save has no prior file, so no rename can apply
        let old_stem = if note.is_new {
            None
        } else {
            self.resolve_existing(&note)?
        };
        let title_changed = old_stem
            .as_deref()
            .map(|old| safe_title(old) != safe_title(&note.title))
            .unwrap_or(false);

        let content = compose_content(&note);
        let path = self
            .gateway
            .save_file(
                &note.id,
                &note.title,
                &content,
                &self.dir,
                if title_changed { old_stem.as_deref() } else { None },
            )
            .with_context(|| format!("Failed to save note '{}'", note.title))?;

        note.is_new = false;
        if let Some(stem) = path.file_stem() {
            note.id = stem.to_string_lossy().to_string();
        }
        Ok(note)
    }

    /// Delete the file belonging to `id`; a miss is a silent no-op
    pub fn remove(&self, id: &str) -> Result<()> {
        let notes = self.list()?;
        let Some(note) = notes.into_iter().find(|n| n.id == id) else {
            tracing::warn!("remove: no note matching id {id}");
            return Ok(());
        };
        self.gateway
            .delete_file(&note.id, &note.title, &self.dir)
            .with_context(|| format!("Failed to delete note '{}'", note.title))?;
        Ok(())
    }

    /// Find a note by id: exact match, then safe-title form, then substring
    /// containment as a best-effort fallback
    pub fn get_by_id(&self, id: &str) -> Result<Option<Note>> {
        let notes = self.list()?;
        if let Some(note) = notes.iter().find(|n| n.id == id) {
            return Ok(Some(note.clone()));
        }
        let safe_id = safe_title(id);
        if let Some(note) = notes.iter().find(|n| n.id == safe_id) {
            return Ok(Some(note.clone()));
        }
        if safe_id.is_empty() {
            return Ok(None);
        }
        Ok(notes.into_iter().find(|n| {
            let slug = safe_title(&n.title);
            !slug.is_empty() && (slug.contains(&safe_id) || safe_id.contains(&slug))
        }))
    }

    /// Locate the existing file for a note being re-saved
    ///
    /// Resolution order, first match wins: exact id, safe form of the id,
    /// safe form of the current title. A miss means "write as a new file".
    fn resolve_existing(&self, note: &Note) -> Result<Option<String>> {
        let entries = self
            .gateway
            .list_files(&self.dir)
            .with_context(|| format!("Failed to list notes in {}", self.dir.display()))?;

        let found = entries
            .iter()
            .find(|e| e.id == note.id)
            .or_else(|| entries.iter().find(|e| e.id == safe_title(&note.id)))
            .or_else(|| entries.iter().find(|e| e.id == safe_title(&note.title)));
        Ok(found.map(|e| e.id.clone()))
    }

    fn load_entry(&self, entry: &FileEntry) -> Result<Note> {
        let raw = self.gateway.read_file(&entry.path)?;
        let (metadata, body) = codec::extract_metadata(&raw);
        let (title, body) = split_leading_heading(&body);

        Ok(Note {
            id: entry.id.clone(),
            title: title
                .filter(|t| !t.is_empty())
                .unwrap_or_else(|| entry.id.clone()),
            content: codec::markdown_to_rich_text(&body),
            created_at: entry.created_at,
            updated_at: entry.modified_at,
            pinned: metadata.pinned,
            color: metadata.color,
            is_new: false,
        })
    }
}

/// Build the on-disk text: title heading, markdown body, metadata comment
fn compose_content(note: &Note) -> String {
    let body = codec::rich_text_to_markdown(&note.content);
    let text = format!("# {}\n\n{}", note.title, body);
    codec::embed_metadata(
        &text,
        &NoteMetadata {
            color: note.color.clone(),
            pinned: note.pinned,
        },
    )
}

/// Split an optional leading `# Title` heading off a markdown body
fn split_leading_heading(markdown: &str) -> (Option<String>, String) {
    let trimmed = markdown.trim_start();
    if let Some(rest) = trimmed.strip_prefix("# ") {
        return match rest.split_once('\n') {
            Some((first, body)) => (
                Some(first.trim().to_string()),
                body.trim_start_matches('\n').to_string(),
            ),
            None => (Some(rest.trim().to_string()), String::new()),
        };
    }
    (None, markdown.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::gateway::LocalFileGateway;
    use std::fs;
    use tempfile::TempDir;

    fn repo(tmp: &TempDir) -> NoteRepository<LocalFileGateway> {
        NoteRepository::new(LocalFileGateway, tmp.path().to_path_buf())
    }

    #[test]
    fn create_does_not_touch_disk() {
        let tmp = TempDir::new().unwrap();
        let repo = repo(&tmp);
        let note = repo.create();
        assert!(note.is_new);
        assert!(repo.list().unwrap().is_empty());
    }

    #[test]
    fn save_and_reload_round_trips_title_and_bold() {
        let tmp = TempDir::new().unwrap();
        let repo = repo(&tmp);

        let mut note = repo.create();
        note.title = "Meeting Notes".to_string();
        note.content = "<p>Hello <strong>world</strong></p>".to_string();
        let saved = repo.save(&note).unwrap();
        assert_eq!(saved.id, "meeting_notes");
        assert!(!saved.is_new);

        let notes = repo.list().unwrap();
        assert_eq!(notes.len(), 1);
        assert_eq!(notes[0].title, "Meeting Notes");
        assert_eq!(notes[0].content, "<p>Hello <strong>world</strong></p>");
    }

    #[test]
    fn title_change_renames_instead_of_duplicating() {
        let tmp = TempDir::new().unwrap();
        let repo = repo(&tmp);

        let mut note = repo.create();
        note.title = "Old Title".to_string();
        let mut saved = repo.save(&note).unwrap();
        assert!(tmp.path().join("old_title.md").exists());

        saved.title = "New Title".to_string();
        let renamed = repo.save(&saved).unwrap();

        assert_eq!(renamed.id, "new_title");
        assert!(tmp.path().join("new_title.md").exists());
        assert!(!tmp.path().join("old_title.md").exists());
        assert_eq!(repo.list().unwrap().len(), 1);
    }

    #[test]
    fn metadata_round_trips_and_is_absent_when_unset() {
        let tmp = TempDir::new().unwrap();
        let repo = repo(&tmp);

        let mut note = repo.create();
        note.title = "Colored".to_string();
        note.color = Some("#fff9c4".to_string());
        note.pinned = Some(true);
        repo.save(&note).unwrap();

        let loaded = repo.get_by_id("colored").unwrap().unwrap();
        assert_eq!(loaded.color.as_deref(), Some("#fff9c4"));
        assert_eq!(loaded.pinned, Some(true));

        let mut plain = repo.create();
        plain.title = "Plain".to_string();
        repo.save(&plain).unwrap();
        let text = fs::read_to_string(tmp.path().join("plain.md")).unwrap();
        assert!(!text.contains("scribble-metadata"));
    }

    #[test]
    fn empty_title_uses_the_id_fallback_stem() {
        let tmp = TempDir::new().unwrap();
        let repo = repo(&tmp);

        let mut note = repo.create();
        note.title = String::new();
        let saved = repo.save(&note).unwrap();

        assert!(saved.id.starts_with("untitled_note_"));
        assert!(tmp.path().join(format!("{}.md", saved.id)).exists());
    }

    #[test]
    fn remove_deletes_the_file() {
        let tmp = TempDir::new().unwrap();
        let repo = repo(&tmp);

        let mut note = repo.create();
        note.title = "Doomed".to_string();
        let saved = repo.save(&note).unwrap();

        repo.remove(&saved.id).unwrap();
        assert!(!tmp.path().join("doomed.md").exists());
        assert!(repo.list().unwrap().is_empty());
    }

    #[test]
    fn remove_of_unknown_id_is_a_no_op() {
        let tmp = TempDir::new().unwrap();
        let repo = repo(&tmp);
        repo.remove("does-not-exist").unwrap();
    }

    #[test]
    fn get_by_id_falls_back_to_safe_title_form() {
        let tmp = TempDir::new().unwrap();
        let repo = repo(&tmp);

        let mut note = repo.create();
        note.title = "Meeting Notes".to_string();
        repo.save(&note).unwrap();

        let found = repo.get_by_id("Meeting Notes").unwrap();
        assert_eq!(found.map(|n| n.id), Some("meeting_notes".to_string()));
    }

    #[test]
    fn get_by_id_substring_fallback() {
        let tmp = TempDir::new().unwrap();
        let repo = repo(&tmp);

        let mut note = repo.create();
        note.title = "Quarterly Planning 2026".to_string();
        repo.save(&note).unwrap();

        let found = repo.get_by_id("quarterly_planning").unwrap();
        assert!(found.is_some());
        assert_eq!(repo.get_by_id("nothing_like_it").unwrap(), None);
    }

    #[test]
    fn unreadable_file_is_skipped_not_fatal() {
        let tmp = TempDir::new().unwrap();
        let repo = repo(&tmp);

        let mut note = repo.create();
        note.title = "Good".to_string();
        repo.save(&note).unwrap();
        fs::write(tmp.path().join("bad.md"), [0xff, 0xfe, 0xfd]).unwrap();

        let notes = repo.list().unwrap();
        assert_eq!(notes.len(), 1);
        assert_eq!(notes[0].title, "Good");
    }

    #[test]
    fn malformed_metadata_comment_is_tolerated() {
        let tmp = TempDir::new().unwrap();
        let repo = repo(&tmp);
        fs::write(
            tmp.path().join("broken.md"),
            "# Broken\n\nbody\n\n<!-- scribble-metadata: {bad json -->",
        )
        .unwrap();

        let notes = repo.list().unwrap();
        assert_eq!(notes.len(), 1);
        assert_eq!(notes[0].title, "Broken");
        assert_eq!(notes[0].color, None);
        assert_eq!(notes[0].pinned, None);
    }

    #[test]
    fn heading_free_file_takes_title_from_filename() {
        let tmp = TempDir::new().unwrap();
        let repo = repo(&tmp);
        fs::write(tmp.path().join("imported_note.md"), "just some text").unwrap();

        let notes = repo.list().unwrap();
        assert_eq!(notes[0].title, "imported_note");
        assert_eq!(notes[0].id, "imported_note");
    }

    #[test]
    fn racing_renames_leave_no_orphaned_old_file() {
        let tmp = TempDir::new().unwrap();
        let repo = repo(&tmp);

        let mut note = repo.create();
        note.title = "Shared".to_string();
        let saved = repo.save(&note).unwrap();

        // Two windows loaded the same note, then rename it differently
        let mut first = saved.clone();
        first.title = "Alpha".to_string();
        let mut second = saved;
        second.title = "Beta".to_string();

        repo.save(&first).unwrap();
        repo.save(&second).unwrap();

        // The final title is unspecified; the invariant is only that the
        // old name is gone
        assert!(!tmp.path().join("shared.md").exists());
    }
}
