use eframe::egui;

use super::app::{EditForm, StatsApp};
use crate::engine::protocol::EngineCommand;
use crate::engine::store::DEFAULT_STATS;
use crate::model::preferences::InjectRole;
use crate::model::scope::GLOBAL_SCOPE;

pub fn draw_right_panel(ctx: &egui::Context, app: &mut StatsApp) {
    egui::SidePanel::right("right")
        .resizable(true)
        .default_width(320.0)
        .min_width(260.0)
        .show(ctx, |ui| {
            egui::ScrollArea::vertical().show(ui, |ui| {
                draw_header(ui, app);
                ui.separator();
                draw_stats(ui, app);
                ui.separator();
                draw_tools(ui, app);
                ui.separator();
                draw_preferences(ui, app);
            });
        });
}

fn draw_header(ui: &mut egui::Ui, app: &mut StatsApp) {
    ui.heading("📊 Character Stats");

    let scope = if app.ui.scope == GLOBAL_SCOPE || app.ui.scope.is_empty() {
        "Global".to_string()
    } else {
        app.ui
            .scope
            .strip_prefix("char_")
            .unwrap_or(&app.ui.scope)
            .to_string()
    };
    ui.small(format!("Scope: {scope}"));

    if let Some(status) = &app.ui.status {
        ui.label(egui::RichText::new(status).italics());
    }
}

/* =========================
   Stat list
   ========================= */

fn draw_stats(ui: &mut egui::Ui, app: &mut StatsApp) {
    if app.ui.records.is_empty() {
        ui.label("No stats yet. Add one below or let the chat create them.");
    }

    let mut start_edit: Option<EditForm> = None;
    let mut delete: Option<String> = None;

    for (key, record) in &app.ui.records {
        let editing = app.ui.edit.as_ref().is_some_and(|e| &e.key == key);
        if editing {
            continue;
        }

        ui.horizontal(|ui| {
            ui.strong(record.name.as_str());
            ui.label(record.display_value());
            ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                if ui.small_button("❌").clicked() {
                    delete = Some(key.clone());
                }
                if ui.small_button("✏").clicked() {
                    start_edit = Some(EditForm::from_record(key, record));
                }
            });
        });
    }

    if let Some(form) = start_edit {
        app.ui.edit = Some(form);
    }
    if let Some(key) = delete {
        app.send_command(EngineCommand::DeleteStat(key));
    }

    draw_edit_form(ui, app);
}

fn draw_edit_form(ui: &mut egui::Ui, app: &mut StatsApp) {
    let Some(form) = app.ui.edit.as_mut() else {
        return;
    };

    let mut save = false;
    let mut cancel = false;

    ui.group(|ui| {
        ui.label(format!("Editing '{}'", form.key));
        stat_fields(ui, &mut form.name, &mut form.value, &mut form.unit);
        ui.horizontal(|ui| {
            save = ui.button("Save").clicked();
            cancel = ui.button("Cancel").clicked();
        });
    });

    if save {
        if let Some(form) = app.ui.edit.take() {
            app.send_command(EngineCommand::EditStat {
                key: form.key,
                name: form.name,
                value: form.value,
                unit: form.unit,
            });
        }
    } else if cancel {
        app.ui.edit = None;
    }
}

fn stat_fields(ui: &mut egui::Ui, name: &mut String, value: &mut String, unit: &mut String) {
    egui::Grid::new(ui.next_auto_id())
        .num_columns(2)
        .show(ui, |ui| {
            ui.label("Name");
            ui.text_edit_singleline(name);
            ui.end_row();
            ui.label("Value");
            ui.text_edit_singleline(value);
            ui.end_row();
            ui.label("Unit");
            ui.add(egui::TextEdit::singleline(unit).hint_text("optional"));
            ui.end_row();
        });
}

/* =========================
   Add / grow / compare
   ========================= */

fn draw_tools(ui: &mut egui::Ui, app: &mut StatsApp) {
    ui.horizontal_wrapped(|ui| {
        if ui.button("➕ Add").clicked() {
            app.ui.show_add_form = !app.ui.show_add_form;
        }
        if ui.button("📈 Grow").clicked() {
            app.ui.show_grow = !app.ui.show_grow;
        }
        if ui.button("📏 Compare").clicked() {
            app.send_command(EngineCommand::CompareStats);
        }
        if ui.button("📋 Copy").clicked() {
            app.send_command(EngineCommand::CopySummary);
        }
        if ui.button("🗑 Reset").clicked() {
            app.ui.confirm_reset = true;
        }
    });

    ui.horizontal(|ui| {
        ui.label("Default stat");
        let mut chosen: Option<&str> = None;
        egui::ComboBox::from_id_salt("default_stat")
            .selected_text("Add…")
            .show_ui(ui, |ui| {
                for (name, _) in DEFAULT_STATS {
                    if ui.selectable_label(false, *name).clicked() {
                        chosen = Some(*name);
                    }
                }
            });
        if let Some(name) = chosen {
            app.send_command(EngineCommand::AddDefaultStat(name.to_string()));
        }
    });

    if app.ui.show_add_form {
        let mut add = false;
        ui.group(|ui| {
            ui.label("New stat");
            stat_fields(
                ui,
                &mut app.ui.new_stat_name,
                &mut app.ui.new_stat_value,
                &mut app.ui.new_stat_unit,
            );
            add = ui.button("Add stat").clicked();
        });
        if add {
            let cmd = EngineCommand::AddStat {
                name: std::mem::take(&mut app.ui.new_stat_name),
                value: std::mem::take(&mut app.ui.new_stat_value),
                unit: std::mem::take(&mut app.ui.new_stat_unit),
            };
            app.send_command(cmd);
        }
    }

    if app.ui.show_grow {
        let mut grow = false;
        ui.horizontal(|ui| {
            ui.label("Grow by %");
            ui.add(egui::TextEdit::singleline(&mut app.ui.grow_percent).desired_width(60.0));
            grow = ui.button("Apply").clicked();
        });
        if grow {
            app.send_command(EngineCommand::GrowStats(app.ui.grow_percent.clone()));
        }
    }

    if app.ui.confirm_reset {
        let mut confirmed = false;
        ui.group(|ui| {
            ui.label("Reset all stats for this character?");
            ui.horizontal(|ui| {
                confirmed = ui.button("Yes, reset").clicked();
                if ui.button("Cancel").clicked() {
                    app.ui.confirm_reset = false;
                }
            });
        });
        if confirmed {
            app.ui.confirm_reset = false;
            app.ui.edit = None;
            app.send_command(EngineCommand::ResetStats);
        }
    }
}

/* =========================
   Preferences
   ========================= */

fn draw_preferences(ui: &mut egui::Ui, app: &mut StatsApp) {
    ui.heading("Injection");

    let mut prefs = app.ui.prefs.clone();
    let mut changed = false;

    changed |= ui.checkbox(&mut prefs.enabled, "Enabled").changed();
    changed |= ui
        .checkbox(&mut prefs.auto_inject, "Inject stats into requests")
        .changed();

    ui.horizontal(|ui| {
        ui.label("Role");
        changed |= ui
            .radio_value(&mut prefs.inject_role, InjectRole::System, "system")
            .changed();
        changed |= ui
            .radio_value(&mut prefs.inject_role, InjectRole::User, "user")
            .changed();
    });

    if changed {
        app.ui.prefs = prefs.clone();
        app.send_command(EngineCommand::SetPreferences(prefs));
    }
}
