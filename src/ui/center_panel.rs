use eframe::egui;

use super::app::StatsApp;
use crate::engine::protocol::EngineCommand;

pub fn draw_center_panel(ctx: &egui::Context, app: &mut StatsApp) {
    let input_id = egui::Id::new("chat_input_box");

    // ---------- Input bar ----------
    egui::TopBottomPanel::bottom("chat_input").show(ctx, |ui| {
        let mut send_now = false;

        ui.horizontal(|ui| {
            let response = ui.add_sized(
                [ui.available_width() - 60.0, 60.0],
                egui::TextEdit::multiline(&mut app.ui.input_text)
                    .id(input_id)
                    .hint_text("Say something…")
                    .lock_focus(true),
            );

            if response.has_focus()
                && ui.input(|i| i.key_pressed(egui::Key::Enter) && !i.modifiers.shift)
            {
                send_now = true;
            }

            ui.vertical(|ui| {
                if ui.button("Send").clicked() {
                    send_now = true;
                }
                let (icon, hint) = if app.ui.prefs.injection_active() {
                    ("📊", "Stats are added to requests")
                } else {
                    ("⏸", "Stat injection is off")
                };
                ui.label(icon).on_hover_text(hint);
            });
        });

        if send_now {
            let text = app.ui.input_text.trim().to_string();

            if !text.is_empty() {
                app.send_command(EngineCommand::UserInput(text));
                app.ui.input_text.clear();
            }

            ui.memory_mut(|m| m.request_focus(input_id));
        }
    });

    // ---------- Chat history ----------
    egui::CentralPanel::default().show(ctx, |ui| {
        if app.ui.rendered_messages.is_empty() {
            ui.centered_and_justified(|ui| {
                ui.weak("Chat about your character. Lines like \"Strength is now 12\" update the stats.");
            });
            return;
        }

        egui::ScrollArea::vertical()
            .stick_to_bottom(app.ui.should_auto_scroll)
            .show(ui, |ui| {
                for msg in &app.ui.rendered_messages {
                    app.draw_message(ui, msg);
                }
            });
    });
}
