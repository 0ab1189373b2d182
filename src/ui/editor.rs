//! Note editor panel: title field, markdown body, pin and color controls

use eframe::egui;

use crate::app::ScribbleApp;
use crate::core::session::SessionState;

/// Preset sticky-note colors offered in the editor toolbar
const PALETTE: [&str; 6] = [
    "#fff9c4", "#ffe0b2", "#ffcdd2", "#c8e6c9", "#bbdefb", "#e1bee7",
];

/// Markdown editor panel over the active session
pub struct EditorPanel;

impl EditorPanel {
    /// Show the editor panel
    pub fn show(ui: &mut egui::Ui, app: &mut ScribbleApp) {
        if app.editors.len() > 1 {
            Self::show_tabs(ui, app);
            ui.separator();
        }

        let Some(id) = app.active_editor.clone() else {
            Self::show_welcome(ui);
            return;
        };

        let mut save_clicked = false;
        let mut close_clicked = false;

        if let Some(session) = app.editors.get_mut(&id) {
            ui.horizontal(|ui| {
                let response = ui.add(
                    egui::TextEdit::singleline(&mut session.title_buffer)
                        .hint_text("Untitled Note")
                        .desired_width(240.0),
                );
                // Saving mid-keystroke would rename the file under the
                // user's cursor, so focus gates the debounce
                session.title_focused = response.has_focus();
                if response.changed() {
                    session.mark_dirty();
                }

                let pinned = session.note.pinned.unwrap_or(false);
                if ui
                    .selectable_label(pinned, "\u{1F4CC}")
                    .on_hover_text("Always on top")
                    .clicked()
                {
                    session.note.pinned = if pinned { None } else { Some(true) };
                    session.mark_dirty();
                }

                for hex in PALETTE {
                    if let Some(color) = super::note_list::parse_color(hex) {
                        let selected = session.note.color.as_deref() == Some(hex);
                        let button = egui::Button::new(" ").fill(color).selected(selected);
                        if ui.add(button).clicked() {
                            session.note.color = Some(hex.to_string());
                            session.mark_dirty();
                        }
                    }
                }
                if ui.small_button("\u{2715}").on_hover_text("Clear color").clicked() {
                    session.note.color = None;
                    session.mark_dirty();
                }

                ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                    let saving = session.state() == SessionState::Saving;
                    if ui.add_enabled(!saving, egui::Button::new("Save")).clicked() {
                        save_clicked = true;
                    }
                    if ui.button("Close").clicked() {
                        close_clicked = true;
                    }
                });
            });

            ui.separator();

            egui::ScrollArea::vertical()
                .id_salt("editor_scroll")
                .show(ui, |ui| {
                    let response = egui::TextEdit::multiline(&mut session.buffer)
                        .font(egui::TextStyle::Monospace)
                        .code_editor()
                        .desired_width(f32::INFINITY)
                        .desired_rows(24)
                        .show(ui);
                    if response.response.changed() {
                        session.mark_dirty();
                    }
                });
        }

        if save_clicked {
            app.save_editor(&id);
        }
        if close_clicked {
            app.close_editor(&id);
        }
    }

    /// Show editor tabs when several notes are open
    fn show_tabs(ui: &mut egui::Ui, app: &mut ScribbleApp) {
        ui.horizontal(|ui| {
            for id in app.editors.ids() {
                let Some(session) = app.editors.get(&id) else { continue };
                let mut label = session.title_buffer.clone();
                if session.is_dirty() {
                    label.push('*');
                }
                let is_active = app.active_editor.as_deref() == Some(id.as_str());
                if ui.selectable_label(is_active, label).clicked() {
                    app.active_editor = Some(id.clone());
                }
            }
        });
    }

    /// Show the welcome screen when no note is open
    fn show_welcome(ui: &mut egui::Ui) {
        ui.vertical_centered(|ui| {
            ui.add_space(100.0);

            ui.heading("Scribble");
            ui.add_space(20.0);

            ui.label("Select a note on the left or create a new one.");
            ui.add_space(10.0);

            ui.label("Keyboard shortcuts:");
            ui.label("  Ctrl+N - New note");
            ui.label("  Ctrl+S - Save");
        });
    }
}
