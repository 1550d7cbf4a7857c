use eframe::egui;

use super::app::{LeftTab, StatsApp};
use crate::engine::protocol::EngineCommand;

pub fn draw_left_panel(ctx: &egui::Context, app: &mut StatsApp) {
    egui::SidePanel::left("left")
        .resizable(false)
        .default_width(200.0)
        .show(ctx, |ui| {
            ui.horizontal(|ui| {
                ui.selectable_value(&mut app.ui.left_tab, LeftTab::Character, "Character");
                ui.selectable_value(&mut app.ui.left_tab, LeftTab::Settings, "Settings");
            });

            ui.separator();

            egui::ScrollArea::vertical().show(ui, |ui| match app.ui.left_tab {
                LeftTab::Character => draw_character(ui, app),
                LeftTab::Settings => draw_settings(ui, app),
            });
        });
}

/* =========================
   Character
   ========================= */

fn draw_character(ui: &mut egui::Ui, app: &mut StatsApp) {
    ui.heading("Active Character");

    match app.host.active_card() {
        Some(card) => ui.label(format!("🎭 {}", card.name)),
        None => ui.label("No character selected (global stats)"),
    };

    ui.add_space(6.0);
    ui.label("Name");
    ui.text_edit_singleline(&mut app.ui.character_name);
    ui.label("Avatar");
    ui.text_edit_singleline(&mut app.ui.character_avatar);

    ui.horizontal(|ui| {
        if ui.button("Select").clicked() {
            app.host
                .select(&app.ui.character_name, &app.ui.character_avatar);
            app.send_command(EngineCommand::Refresh);
        }
        if ui.button("Clear").clicked() {
            app.ui.character_name.clear();
            app.ui.character_avatar.clear();
            app.host.select("", "");
            app.send_command(EngineCommand::Refresh);
        }
    });

    ui.separator();
    ui.heading("Cards");

    let cards = app.host.cards();
    if cards.is_empty() {
        ui.label("No cards yet.");
    }

    let mut picked: Option<(String, String)> = None;
    for (i, card) in cards.iter().enumerate() {
        ui.group(|ui| {
            ui.horizontal(|ui| {
                ui.strong(card.name.as_str());
                if ui.small_button("Use").clicked() {
                    picked = Some((card.name.clone(), card.avatar.clone()));
                }
            });
            if !card.avatar.is_empty() {
                ui.small(card.avatar.as_str());
            }
            if !card.stats.is_empty() {
                egui::CollapsingHeader::new("Stats")
                    .id_salt(("card_stats", i))
                    .show(ui, |ui| {
                        ui.monospace(card.stats.trim_end());
                    });
            }
        });
    }

    if let Some((name, avatar)) = picked {
        app.host.select(&name, &avatar);
        app.ui.character_name = name;
        app.ui.character_avatar = avatar;
        app.send_command(EngineCommand::Refresh);
    }
}

/* =========================
   Settings
   ========================= */

fn draw_settings(ui: &mut egui::Ui, app: &mut StatsApp) {
    ui.heading("Connection");

    ui.label("Endpoint");
    ui.text_edit_singleline(&mut app.config.endpoint);
    ui.label("Models endpoint");
    ui.text_edit_singleline(&mut app.config.models_endpoint);
    ui.label("Model");
    ui.text_edit_singleline(&mut app.config.model);
    ui.add(egui::Slider::new(&mut app.config.temperature, 0.0..=2.0).text("Temperature"));
    ui.small("Connection changes apply on restart.");

    ui.horizontal(|ui| {
        if ui.button("💾 Save").clicked() {
            app.config.ui_scale = app.ui.ui_scale;
            app.config.save();
            app.ui.status = Some("Settings saved".into());
        }
        if ui.button("Test connection").clicked() {
            app.send_command(EngineCommand::TestConnection);
        }
    });

    ui.separator();
    ui.heading("Display");
    ui.add(egui::Slider::new(&mut app.ui.ui_scale, 0.75..=2.0).text("UI scale"));
}
