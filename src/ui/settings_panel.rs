//! Settings window: save directory, auto-save, theme, hotkeys

use eframe::egui;

use crate::app::ScribbleApp;
use crate::core::settings::Theme;

/// Modal-ish settings window over the main view
pub struct SettingsWindow;

impl SettingsWindow {
    /// Show the settings window when open
    pub fn show(ctx: &egui::Context, app: &mut ScribbleApp) {
        if !app.settings_open {
            return;
        }

        let mut open = true;
        let mut save_clicked = false;
        let mut cancel_clicked = false;

        egui::Window::new("Settings")
            .open(&mut open)
            .collapsible(false)
            .resizable(false)
            .show(ctx, |ui| {
                let draft = &mut app.settings_draft;

                ui.heading("Storage");
                ui.horizontal(|ui| {
                    let shown = draft
                        .save_directory
                        .as_ref()
                        .map(|p| p.display().to_string())
                        .unwrap_or_else(|| "(default)".to_string());
                    ui.label(shown);
                    if ui.button("Change...").clicked() {
                        if let Some(dir) = rfd::FileDialog::new().pick_folder() {
                            draft.save_directory = Some(dir);
                        }
                    }
                });

                ui.separator();
                ui.heading("Auto-save");
                ui.checkbox(&mut draft.auto_save, "Save automatically");
                ui.horizontal(|ui| {
                    ui.label("Interval (seconds)");
                    ui.add(
                        egui::DragValue::new(&mut draft.auto_save_interval_secs).range(1..=120),
                    );
                });

                ui.separator();
                ui.heading("Appearance");
                egui::ComboBox::from_label("Theme")
                    .selected_text(match draft.theme {
                        Theme::Light => "Light",
                        Theme::Dark => "Dark",
                        Theme::System => "System",
                    })
                    .show_ui(ui, |ui| {
                        ui.selectable_value(&mut draft.theme, Theme::Light, "Light");
                        ui.selectable_value(&mut draft.theme, Theme::Dark, "Dark");
                        ui.selectable_value(&mut draft.theme, Theme::System, "System");
                    });

                ui.separator();
                ui.heading("Hotkeys");
                egui::Grid::new("hotkeys_grid").num_columns(2).show(ui, |ui| {
                    ui.label("New note");
                    ui.text_edit_singleline(&mut draft.hotkeys.new_note);
                    ui.end_row();
                    ui.label("Save note");
                    ui.text_edit_singleline(&mut draft.hotkeys.save_note);
                    ui.end_row();
                    ui.label("Close window");
                    ui.text_edit_singleline(&mut draft.hotkeys.close_window);
                    ui.end_row();
                    ui.label("Open settings");
                    ui.text_edit_singleline(&mut draft.hotkeys.open_settings);
                    ui.end_row();
                });

                ui.heading("Global hotkeys");
                egui::Grid::new("global_hotkeys_grid").num_columns(2).show(ui, |ui| {
                    ui.label("Show/hide app");
                    ui.text_edit_singleline(&mut draft.global_hotkeys.toggle_app);
                    ui.end_row();
                    ui.label("New note anywhere");
                    ui.text_edit_singleline(&mut draft.global_hotkeys.new_note);
                    ui.end_row();
                });

                ui.separator();
                ui.checkbox(&mut draft.auto_launch, "Start at login");

                ui.separator();
                ui.horizontal(|ui| {
                    if ui.button("Save").clicked() {
                        save_clicked = true;
                    }
                    if ui.button("Cancel").clicked() {
                        cancel_clicked = true;
                    }
                });
            });

        if save_clicked {
            // Keep the legacy alias coherent with the edited binding
            app.settings_draft.global_hotkeys.show_app =
                Some(app.settings_draft.global_hotkeys.toggle_app.clone());
            app.apply_settings_draft();
            app.settings_open = false;
        } else if cancel_clicked || !open {
            app.settings_draft = app.settings.get().clone();
            app.settings_open = false;
        }
    }
}
