use eframe::egui;
use egui::Layout;
use std::sync::mpsc::{self, Receiver, Sender};
use std::thread::JoinHandle;
use std::time::{Duration, Instant};

use crate::config::{self, AppConfig};
use crate::engine::engine::Engine;
use crate::engine::host::SharedHost;
use crate::engine::llm_client::LlmClient;
use crate::engine::persistence::JsonFileStore;
use crate::engine::protocol::{EngineCommand, EngineResponse};
use crate::engine::transport::HttpTransport;
use crate::engine::StatsContext;
use crate::model::message::{Message, Speaker};
use crate::model::preferences::Preferences;
use crate::model::stat::StatRecord;

use super::center_panel::draw_center_panel;
use super::left_panel::draw_left_panel;
use super::right_panel::draw_right_panel;

/* =========================
   Tabs
   ========================= */

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LeftTab {
    #[default]
    Character,
    Settings,
}

/* =========================
   UI State
   ========================= */

/// Edit form for one record; `key` never changes while editing.
#[derive(Debug, Clone, Default)]
pub struct EditForm {
    pub key: String,
    pub name: String,
    pub value: String,
    pub unit: String,
}

impl EditForm {
    pub fn from_record(key: &str, record: &StatRecord) -> Self {
        Self {
            key: key.to_string(),
            name: record.name.clone(),
            value: record.value.to_input(),
            unit: record.unit.trim().to_string(),
        }
    }
}

#[derive(Default)]
pub struct UiState {
    pub input_text: String,
    pub rendered_messages: Vec<Message>,
    pub should_auto_scroll: bool,

    pub scope: String,
    pub records: Vec<(String, StatRecord)>,
    pub prefs: Preferences,

    pub character_name: String,
    pub character_avatar: String,

    pub show_add_form: bool,
    pub new_stat_name: String,
    pub new_stat_value: String,
    pub new_stat_unit: String,

    pub edit: Option<EditForm>,

    pub show_grow: bool,
    pub grow_percent: String,

    pub confirm_reset: bool,
    pub comparison: Option<String>,
    pub status: Option<String>,

    pub ui_scale: f32,
    pub left_tab: LeftTab,
}

/* =========================
   Theme
   ========================= */

#[derive(Clone)]
struct Theme {
    user: egui::Color32,
    character: egui::Color32,
    system: egui::Color32,
}

impl Default for Theme {
    fn default() -> Self {
        Self {
            user: egui::Color32::from_rgb(40, 70, 120),
            character: egui::Color32::from_rgb(40, 90, 60),
            system: egui::Color32::from_rgb(80, 80, 80),
        }
    }
}

/* =========================
   App
   ========================= */

pub struct StatsApp {
    pub ui: UiState,
    pub config: AppConfig,
    pub host: SharedHost,
    theme: Theme,

    cmd_tx: Sender<EngineCommand>,
    resp_rx: Receiver<EngineResponse>,
    engine_thread: Option<JoinHandle<()>>,
}

impl StatsApp {
    pub fn new() -> Self {
        let config = AppConfig::load();
        let host = SharedHost::new();

        let (cmd_tx, cmd_rx) = mpsc::channel();
        let (resp_tx, resp_rx) = mpsc::channel();

        let storage = JsonFileStore::new(config::data_dir());
        let stats = StatsContext::load(Box::new(storage), Box::new(host.clone()));
        let llm = LlmClient::new(HttpTransport::new(), &config);
        let poll_interval = config.poll_interval();

        let engine_thread = std::thread::spawn(move || {
            let mut engine = Engine::new(cmd_rx, resp_tx, stats, llm, poll_interval);
            engine.run();
        });

        Self {
            ui: UiState {
                ui_scale: config.ui_scale,
                grow_percent: "5".into(),
                ..Default::default()
            },
            config,
            host,
            theme: Theme::default(),
            cmd_tx,
            resp_rx,
            engine_thread: Some(engine_thread),
        }
    }

    pub fn send_command(&self, cmd: EngineCommand) {
        if self.cmd_tx.send(cmd).is_err() {
            log::error!("Stat engine is not running");
        }
    }

    fn drain_responses(&mut self, ctx: &egui::Context) {
        while let Ok(resp) = self.resp_rx.try_recv() {
            match resp {
                EngineResponse::FullMessageHistory(msgs) => {
                    self.ui.rendered_messages = msgs;
                    self.ui.should_auto_scroll = true;
                }
                EngineResponse::StatsUpdated { scope, records } => {
                    if scope != self.ui.scope {
                        self.ui.edit = None;
                    }
                    self.ui.scope = scope;
                    self.ui.records = records;
                }
                EngineResponse::PreferencesUpdated(prefs) => self.ui.prefs = prefs,
                EngineResponse::Comparison(text) => self.ui.comparison = Some(text),
                EngineResponse::Clipboard(text) => {
                    ctx.copy_text(text);
                    self.ui.status = Some("✅ Copied!".into());
                }
                EngineResponse::Notice(text) => self.ui.status = Some(text),
            }
        }
    }

    pub fn draw_message(&self, ui: &mut egui::Ui, msg: &Message) {
        let (bg, right, text) = match msg.speaker {
            Speaker::User => (self.theme.user, true, format!("You: {}", msg.text)),
            Speaker::Character => (self.theme.character, false, msg.text.clone()),
            Speaker::System => (self.theme.system, false, msg.text.clone()),
        };

        ui.add_space(6.0);

        if right {
            ui.with_layout(Layout::right_to_left(egui::Align::TOP), |ui| {
                bubble(ui, bg, &text);
            });
        } else {
            bubble(ui, bg, &text);
        }
    }
}

impl Default for StatsApp {
    fn default() -> Self {
        Self::new()
    }
}

/// How long closing the window waits for the engine to stop.
const SHUTDOWN_GRACE: Duration = Duration::from_millis(500);

impl Drop for StatsApp {
    fn drop(&mut self) {
        if let Some(handle) = self.engine_thread.take() {
            if !stop_engine(&self.cmd_tx, handle, SHUTDOWN_GRACE) {
                log::warn!("Stat engine still busy, leaving it to process exit");
            }
        }
        self.config.ui_scale = self.ui.ui_scale;
        self.config.save();
    }
}

/* =========================
   egui App
   ========================= */

impl eframe::App for StatsApp {
    fn update(&mut self, ctx: &egui::Context, _: &mut eframe::Frame) {
        ctx.set_pixels_per_point(self.ui.ui_scale);

        self.drain_responses(ctx);

        draw_left_panel(ctx, self);
        draw_right_panel(ctx, self);
        draw_center_panel(ctx, self);

        if let Some(text) = self.ui.comparison.clone() {
            let mut open = true;
            egui::Window::new("Comparisons")
                .open(&mut open)
                .collapsible(false)
                .show(ctx, |ui| {
                    ui.label(text);
                });
            if !open {
                self.ui.comparison = None;
            }
        }

        self.ui.should_auto_scroll = false;
        ctx.request_repaint_after(Duration::from_millis(250));
    }
}

/* =========================
   UI Helpers
   ========================= */

/// Asks the engine to stop and waits at most `grace` for it. A thread stuck
/// in a request is detached instead of joined. Returns true when it stopped.
fn stop_engine(tx: &Sender<EngineCommand>, handle: JoinHandle<()>, grace: Duration) -> bool {
    let _ = tx.send(EngineCommand::Shutdown);

    let deadline = Instant::now() + grace;
    while !handle.is_finished() {
        if Instant::now() >= deadline {
            return false;
        }
        std::thread::sleep(Duration::from_millis(10));
    }
    let _ = handle.join();
    true
}

fn bubble(ui: &mut egui::Ui, color: egui::Color32, text: &str) {
    egui::Frame::new()
        .fill(color)
        .corner_radius(8.0)
        .inner_margin(egui::Margin::symmetric(10, 6))
        .show(ui, |ui| {
            ui.label(egui::RichText::new(text).color(egui::Color32::WHITE));
        });
}
