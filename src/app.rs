//! Main application state and UI coordination

use std::sync::mpsc::Receiver;
use std::time::{Duration, Instant};

use eframe::egui;

use crate::core::events::{AppEvent, EventBus};
use crate::core::gateway::{self, LocalFileGateway};
use crate::core::note::Note;
use crate::core::registry::EditorRegistry;
use crate::core::repository::NoteRepository;
use crate::core::session::EditorSession;
use crate::core::settings::{Settings, SettingsStore, Theme};
use crate::ui::{editor::EditorPanel, note_list::NoteListPanel, settings_panel::SettingsWindow};

/// Main application state
pub struct ScribbleApp {
    /// Note-to-file mapping over the configured save directory
    pub repository: NoteRepository<LocalFileGateway>,
    /// Persistent settings, the single source of truth in this process
    pub settings: SettingsStore,
    /// Cached directory listing shown in the note list
    pub notes: Vec<Note>,
    /// Open editor sessions keyed by note id
    pub editors: EditorRegistry,
    /// Id of the editor tab currently shown
    pub active_editor: Option<String>,
    /// Broadcast channel between UI surfaces
    pub bus: EventBus,
    events: Receiver<AppEvent>,
    settings_events: Receiver<Settings>,
    /// Whether the settings window is open
    pub settings_open: bool,
    /// Form model while the settings window is open
    pub settings_draft: Settings,
    /// Last user-visible status or error line
    pub status: Option<String>,
    applied_theme: Option<Theme>,
}

impl ScribbleApp {
    /// Create a new application instance
    pub fn new(_cc: &eframe::CreationContext<'_>) -> Self {
        let mut settings = SettingsStore::load();
        let settings_events = settings.subscribe();

        let save_dir = settings
            .get()
            .save_directory
            .clone()
            .or_else(|| match gateway::default_save_location() {
                Ok(dir) => Some(dir),
                Err(e) => {
                    tracing::error!("Could not prepare default save location: {e}");
                    None
                }
            })
            .unwrap_or_else(|| std::path::PathBuf::from("notes"));

        let repository = NoteRepository::new(LocalFileGateway, save_dir);
        let bus = EventBus::new();
        let events = bus.subscribe();
        let settings_draft = settings.get().clone();

        let mut app = Self {
            repository,
            settings,
            notes: Vec::new(),
            editors: EditorRegistry::new(),
            active_editor: None,
            bus,
            events,
            settings_events,
            settings_open: false,
            settings_draft,
            status: None,
            applied_theme: None,
        };
        app.refresh_notes();
        app
    }

    /// Debounce interval from the current settings
    pub fn auto_save_interval(&self) -> Duration {
        Duration::from_secs(self.settings.get().auto_save_interval_secs.max(1))
    }

    /// Re-read the note listing from disk
    pub fn refresh_notes(&mut self) {
        match self.repository.list() {
            Ok(mut notes) => {
                notes.sort_by(|a, b| {
                    let pin = b.pinned.unwrap_or(false).cmp(&a.pinned.unwrap_or(false));
                    pin.then(b.updated_at.cmp(&a.updated_at))
                });
                self.notes = notes;
            }
            Err(e) => {
                tracing::error!("Failed to list notes: {e:#}");
                self.status = Some(format!("Failed to list notes: {e:#}"));
            }
        }
    }

    /// Open (or focus) an editor for a note
    pub fn open_note(&mut self, note: Note) {
        let id = note.id.clone();
        if !self.editors.contains(&id) {
            self.editors
                .insert(EditorSession::open(note, self.auto_save_interval()));
        }
        self.active_editor = Some(id);
    }

    /// Start a brand-new note; nothing touches disk until the first save
    pub fn new_note(&mut self) {
        let note = self.repository.create();
        self.open_note(note);
    }

    /// Close an editor tab, discarding unsaved edits
    pub fn close_editor(&mut self, id: &str) {
        self.editors.remove(id);
        if self.active_editor.as_deref() == Some(id) {
            self.active_editor = self.editors.ids().into_iter().next_back();
        }
    }

    /// Save one editor session through the repository
    pub fn save_editor(&mut self, id: &str) {
        let draft = match self.editors.get_mut(id) {
            Some(session) => session.begin_save(),
            None => return,
        };

        match self.repository.save(&draft) {
            Ok(saved) => {
                let new_id = saved.id.clone();
                if let Some(session) = self.editors.get_mut(id) {
                    session.finish_save(saved);
                }
                if new_id != id {
                    self.editors.rekey(id, &new_id);
                    if self.active_editor.as_deref() == Some(id) {
                        self.active_editor = Some(new_id.clone());
                    }
                }
                self.status = None;
                self.bus.publish(AppEvent::NoteUpdated(new_id));
            }
            Err(e) => {
                tracing::error!("Failed to save note: {e:#}");
                self.status = Some(format!("Save failed: {e:#}"));
                if let Some(session) = self.editors.get_mut(id) {
                    session.save_failed();
                }
            }
        }
    }

    /// Delete a note's file and close its editor if open
    pub fn delete_note(&mut self, id: &str) {
        if let Err(e) = self.repository.remove(id) {
            tracing::error!("Failed to delete note: {e:#}");
            self.status = Some(format!("Delete failed: {e:#}"));
            return;
        }
        self.close_editor(id);
        self.bus.publish(AppEvent::NoteDeleted(id.to_string()));
    }

    /// Persist the settings draft; the store notifies its subscribers
    pub fn apply_settings_draft(&mut self) {
        let draft = self.settings_draft.clone();
        if let Err(e) = self.settings.update(draft) {
            tracing::error!("Failed to save settings: {e:#}");
            self.status = Some(format!("Settings not saved: {e:#}"));
        }
    }

    /// React to a settings change from any surface
    fn on_settings_changed(&mut self, settings: &Settings) {
        if let Some(dir) = &settings.save_directory {
            if dir != self.repository.directory() {
                self.repository.set_directory(dir.clone());
            }
        }
        let interval = Duration::from_secs(settings.auto_save_interval_secs.max(1));
        self.editors.for_each_mut(|s| s.set_interval(interval));
        self.refresh_notes();
    }

    /// Drain the broadcast channel; receivers re-list rather than patch
    fn drain_events(&mut self) {
        // Fan settings-store notifications out to every surface on the bus
        let changed: Vec<Settings> = self.settings_events.try_iter().collect();
        for settings in changed {
            self.bus.publish(AppEvent::SettingsChanged(settings));
        }

        let events: Vec<AppEvent> = self.events.try_iter().collect();
        for event in events {
            match event {
                AppEvent::NoteUpdated(_) | AppEvent::NoteDeleted(_) => self.refresh_notes(),
                AppEvent::SettingsChanged(settings) => self.on_settings_changed(&settings),
            }
        }
    }

    /// Fire auto-save for every session whose debounce elapsed
    fn run_auto_save(&mut self) {
        if !self.settings.get().auto_save {
            return;
        }
        let now = Instant::now();
        let due: Vec<String> = self
            .editors
            .ids()
            .into_iter()
            .filter(|id| {
                self.editors
                    .get(id)
                    .map(|s| s.should_auto_save(now))
                    .unwrap_or(false)
            })
            .collect();
        for id in due {
            self.save_editor(&id);
        }
    }

    fn apply_theme(&mut self, ctx: &egui::Context) {
        let theme = self.settings.get().theme;
        if self.applied_theme == Some(theme) {
            return;
        }
        match theme {
            Theme::Light => ctx.set_visuals(egui::Visuals::light()),
            Theme::Dark | Theme::System => ctx.set_visuals(egui::Visuals::dark()),
        }
        self.applied_theme = Some(theme);
    }

    /// Render the top menu bar
    fn render_menu_bar(&mut self, ctx: &egui::Context) {
        egui::TopBottomPanel::top("menu_bar").show(ctx, |ui| {
            egui::menu::bar(ui, |ui| {
                ui.menu_button("File", |ui| {
                    if ui.button("New Note").clicked() {
                        self.new_note();
                        ui.close();
                    }
                    if ui.button("Save").clicked() {
                        if let Some(id) = self.active_editor.clone() {
                            self.save_editor(&id);
                        }
                        ui.close();
                    }
                    ui.separator();
                    if ui.button("Settings...").clicked() {
                        self.settings_draft = self.settings.get().clone();
                        self.settings_open = true;
                        ui.close();
                    }
                    ui.separator();
                    if ui.button("Exit").clicked() {
                        ctx.send_viewport_cmd(egui::ViewportCommand::Close);
                    }
                });
            });
        });
    }
}

impl eframe::App for ScribbleApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.apply_theme(ctx);
        self.drain_events();

        // Background tabs are not rendered, so their focus flag would
        // otherwise stay stale and gate auto-save forever
        let active = self.active_editor.clone();
        self.editors.for_each_mut(|s| {
            if active.as_deref() != Some(s.note.id.as_str()) {
                s.title_focused = false;
            }
        });
        self.run_auto_save();

        // Keyboard shortcuts
        ctx.input(|i| {
            if i.modifiers.command && i.key_pressed(egui::Key::S) {
                if let Some(id) = self.active_editor.clone() {
                    self.save_editor(&id);
                }
            }
            if i.modifiers.command && i.key_pressed(egui::Key::N) {
                self.new_note();
            }
        });

        self.render_menu_bar(ctx);

        egui::SidePanel::left("note_list")
            .resizable(true)
            .default_width(220.0)
            .min_width(150.0)
            .show(ctx, |ui| {
                NoteListPanel::show(ui, self);
            });

        if let Some(status) = self.status.clone() {
            egui::TopBottomPanel::bottom("status_bar").show(ctx, |ui| {
                ui.horizontal(|ui| {
                    ui.label(status);
                    if ui.small_button("dismiss").clicked() {
                        self.status = None;
                    }
                });
            });
        }

        egui::CentralPanel::default().show(ctx, |ui| {
            EditorPanel::show(ui, self);
        });

        SettingsWindow::show(ctx, self);

        // Keep ticking so debounce deadlines fire without input
        ctx.request_repaint_after(Duration::from_millis(500));
    }
}
