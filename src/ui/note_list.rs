//! Note list panel: every note in the save directory

use eframe::egui;

use crate::app::ScribbleApp;

/// Sidebar listing of notes, pinned first
pub struct NoteListPanel;

impl NoteListPanel {
    /// Show the note list panel
    pub fn show(ui: &mut egui::Ui, app: &mut ScribbleApp) {
        ui.vertical(|ui| {
            ui.horizontal(|ui| {
                ui.heading("Notes");
                ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                    if ui.button("+").on_hover_text("New note").clicked() {
                        app.new_note();
                    }
                    if ui.button("\u{21BB}").on_hover_text("Refresh").clicked() {
                        app.refresh_notes();
                    }
                    if ui.button("\u{1F4C1}").on_hover_text("Reveal notes folder").clicked() {
                        if let Err(e) = open::that(app.repository.directory()) {
                            tracing::warn!("Could not open notes folder: {e}");
                        }
                    }
                });
            });

            ui.separator();

            egui::ScrollArea::vertical()
                .id_salt("note_list_scroll")
                .show(ui, |ui| {
                    let notes = app.notes.clone();
                    if notes.is_empty() {
                        ui.label("No notes yet");
                        ui.add_space(10.0);
                        if ui.button("Create one").clicked() {
                            app.new_note();
                        }
                        return;
                    }
                    for note in notes {
                        Self::show_row(ui, app, &note);
                    }
                });
        });
    }

    fn show_row(ui: &mut egui::Ui, app: &mut ScribbleApp, note: &crate::core::note::Note) {
        let is_active = app.active_editor.as_deref() == Some(note.id.as_str());
        let dirty = app.editors.get(&note.id).map(|s| s.is_dirty()).unwrap_or(false);

        ui.horizontal(|ui| {
            if let Some(color) = note.color.as_deref().and_then(parse_color) {
                let (rect, _) = ui.allocate_exact_size(egui::vec2(10.0, 10.0), egui::Sense::hover());
                ui.painter().circle_filled(rect.center(), 4.0, color);
            }

            let mut label = note.title.clone();
            if note.pinned.unwrap_or(false) {
                label = format!("\u{1F4CC} {label}");
            }
            if dirty {
                label.push('*');
            }

            if ui.selectable_label(is_active, label).clicked() {
                app.open_note(note.clone());
            }

            ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                if ui.small_button("\u{1F5D1}").on_hover_text("Delete").clicked() {
                    app.delete_note(&note.id);
                }
            });
        });
    }
}

/// Parse a `#rrggbb` CSS color; anything else renders without a dot
pub(crate) fn parse_color(css: &str) -> Option<egui::Color32> {
    let hex = css.strip_prefix('#')?;
    if hex.len() != 6 {
        return None;
    }
    let r = u8::from_str_radix(&hex[0..2], 16).ok()?;
    let g = u8::from_str_radix(&hex[2..4], 16).ok()?;
    let b = u8::from_str_radix(&hex[4..6], 16).ok()?;
    Some(egui::Color32::from_rgb(r, g, b))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_six_digit_hex_colors() {
        assert_eq!(parse_color("#fff9c4"), Some(egui::Color32::from_rgb(0xff, 0xf9, 0xc4)));
        assert_eq!(parse_color("fff9c4"), None);
        assert_eq!(parse_color("#fff"), None);
        assert_eq!(parse_color("#zzzzzz"), None);
    }
}
