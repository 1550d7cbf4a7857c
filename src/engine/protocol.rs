use crate::model::message::Message;
use crate::model::preferences::Preferences;
use crate::model::stat::StatRecord;

pub enum EngineCommand {
    UserInput(String),

    AddStat {
        name: String,
        value: String,
        unit: String,
    },
    EditStat {
        key: String,
        name: String,
        value: String,
        unit: String,
    },
    DeleteStat(String),
    ResetStats,
    GrowStats(String),
    AddDefaultStat(String),

    SetPreferences(Preferences),
    CompareStats,
    CopySummary,
    TestConnection,

    /// Re-send the current stats and preferences
    Refresh,
    /// Stops the engine loop and its poll tick
    Shutdown,
}

pub enum EngineResponse {
    FullMessageHistory(Vec<Message>),

    StatsUpdated {
        scope: String,
        records: Vec<(String, StatRecord)>,
    },

    PreferencesUpdated(Preferences),

    /// Rendered comparison report
    Comparison(String),

    /// Text to put on the clipboard
    Clipboard(String),

    /// Short status line for the user
    Notice(String),
}
