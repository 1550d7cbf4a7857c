use std::sync::mpsc::{Receiver, RecvTimeoutError, Sender};
use std::time::{Duration, Instant};

use crate::engine::context::{StatsContext, StatsEvent};
use crate::engine::extractor::TranscriptObserver;
use crate::engine::llm_client::LlmClient;
use crate::engine::protocol::{EngineCommand, EngineResponse};
use crate::engine::transport::Transport;
use crate::model::message::Message;

/// Single owner of the stat state. Commands are handled one at a time, each
/// to completion, so the store needs no locking.
pub struct Engine<T> {
    rx: Receiver<EngineCommand>,
    tx: Sender<EngineResponse>,
    messages: Vec<Message>,
    observer: TranscriptObserver,
    stats: StatsContext,
    llm: LlmClient<T>,
    poll_interval: Duration,
}

impl<T: Transport> Engine<T> {
    pub fn new(
        rx: Receiver<EngineCommand>,
        tx: Sender<EngineResponse>,
        stats: StatsContext,
        llm: LlmClient<T>,
        poll_interval: Duration,
    ) -> Self {
        Self {
            rx,
            tx,
            messages: Vec::new(),
            observer: TranscriptObserver::new(),
            stats,
            llm,
            poll_interval,
        }
    }

    /// Runs until `Shutdown` or until the UI side hangs up. Between commands
    /// the active character is polled every `poll_interval`.
    pub fn run(&mut self) {
        log::info!("Stat engine ready");
        self.send_stats();
        self.send_preferences();

        let mut next_poll = Instant::now() + self.poll_interval;
        loop {
            let wait = next_poll.saturating_duration_since(Instant::now());
            match self.rx.recv_timeout(wait) {
                Ok(EngineCommand::Shutdown) => break,
                Ok(cmd) => self.handle(cmd),
                Err(RecvTimeoutError::Timeout) => {
                    self.stats.poll();
                    next_poll = Instant::now() + self.poll_interval;
                }
                Err(RecvTimeoutError::Disconnected) => break,
            }
            self.flush_events();
        }
        log::info!("Stat engine stopped");
    }

    pub fn handle(&mut self, cmd: EngineCommand) {
        match cmd {
            EngineCommand::UserInput(text) => self.chat(text),

            EngineCommand::AddStat { name, value, unit } => {
                if let Err(e) = self.stats.add_record(&name, &value, &unit) {
                    self.notice(format!("❌ {}", e));
                }
            }

            EngineCommand::EditStat {
                key,
                name,
                value,
                unit,
            } => {
                if let Err(e) = self.stats.edit_record(&key, &name, &value, &unit) {
                    self.notice(format!("❌ {}", e));
                }
            }

            EngineCommand::DeleteStat(key) => {
                self.stats.delete_record(&key);
            }

            EngineCommand::ResetStats => self.stats.reset_scope(),

            EngineCommand::GrowStats(percent) => match self.stats.grow(&percent) {
                Ok(count) => self.notice(format!("📈 Grew {} stats by {}%", count, percent.trim())),
                Err(e) => self.notice(format!("❌ {}", e)),
            },

            EngineCommand::AddDefaultStat(name) => {
                self.stats.add_default(&name);
            }

            EngineCommand::SetPreferences(prefs) => self.stats.set_preferences(prefs),

            EngineCommand::CompareStats => match self.stats.compare() {
                Ok(report) => self.respond(EngineResponse::Comparison(report.render())),
                Err(e) => self.notice(format!("⚠️ {}", e)),
            },

            EngineCommand::CopySummary => match self.stats.summary() {
                Some(text) => self.respond(EngineResponse::Clipboard(text)),
                None => self.notice("⚠️ No stats to copy!".to_string()),
            },

            EngineCommand::TestConnection => {
                let snapshot = self.stats.injection_snapshot();
                match self.llm.test_connection(&snapshot) {
                    Ok(status) => self.notice(status),
                    Err(e) => self.notice(format!("❌ Connection failed: {:#}", e)),
                }
            }

            EngineCommand::Refresh => {
                self.stats.poll();
                self.send_stats();
                self.send_preferences();
            }

            EngineCommand::Shutdown => {}
        }
    }

    fn chat(&mut self, text: String) {
        self.messages.push(Message::user(text));
        self.observe_transcript();
        self.send_history();

        let snapshot = self.stats.injection_snapshot();
        match self.llm.chat(&self.messages, &snapshot) {
            Ok(reply) => self.messages.push(Message::character(reply)),
            Err(e) => {
                log::error!("Generation failed: {:#}", e);
                self.messages
                    .push(Message::system(format!("Request failed: {:#}", e)));
            }
        }
        self.observe_transcript();
        self.send_history();
    }

    /// Feeds messages appended since the last call to the extractor.
    fn observe_transcript(&mut self) {
        let fresh: Vec<String> = self
            .observer
            .take_new(&self.messages)
            .into_iter()
            .map(str::to_string)
            .collect();
        for text in fresh {
            self.stats.observe_text(&text);
        }
    }

    pub fn flush_events(&mut self) {
        let events = self.stats.take_events();
        let mut refresh = false;
        for event in events {
            match event {
                StatsEvent::Refresh { .. } => refresh = true,
                StatsEvent::PreferencesChanged => self.send_preferences(),
            }
        }
        if refresh {
            self.send_stats();
        }
    }

    fn send_stats(&mut self) {
        let scope = self.stats.active_scope();
        let records = self.stats.snapshot_of(&scope);
        self.respond(EngineResponse::StatsUpdated { scope, records });
    }

    fn send_preferences(&self) {
        self.respond(EngineResponse::PreferencesUpdated(
            self.stats.preferences().clone(),
        ));
    }

    fn send_history(&self) {
        self.respond(EngineResponse::FullMessageHistory(self.messages.clone()));
    }

    fn notice(&self, text: String) {
        self.respond(EngineResponse::Notice(text));
    }

    fn respond(&self, response: EngineResponse) {
        let _ = self.tx.send(response);
    }
}
