//! Record type tags understood by the log decoder.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Categories of log row consumed by a comparison.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RecordType {
    /// Attitude: `Pitch`, `DesPitch`, `Roll`, `DesRoll`, `Yaw`, `DesYaw`.
    Attitude,
    /// Control tuning: altitude `Alt`, `DAlt` and friends.
    ControlTuning,
    /// Parameter rows: `Name`, `Value`.
    Parameter,
    /// Text messages: `Message`.
    Message,
}

impl RecordType {
    pub const ALL: [RecordType; 4] = [
        RecordType::Attitude,
        RecordType::ControlTuning,
        RecordType::Parameter,
        RecordType::Message,
    ];

    /// Tag used by ArduPilot dataflash logs.
    pub fn default_tag(self) -> &'static str {
        match self {
            Self::Attitude => "ATT",
            Self::ControlTuning => "CTUN",
            Self::Parameter => "PARM",
            Self::Message => "MSG",
        }
    }
}

impl fmt::Display for RecordType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Attitude => "attitude",
            Self::ControlTuning => "control tuning",
            Self::Parameter => "parameter",
            Self::Message => "message",
        })
    }
}

/// Decoder tag for each record type; overridable from config.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RecordTags {
    pub attitude: String,
    pub control_tuning: String,
    pub parameter: String,
    pub message: String,
}

impl Default for RecordTags {
    fn default() -> Self {
        Self {
            attitude: RecordType::Attitude.default_tag().to_string(),
            control_tuning: RecordType::ControlTuning.default_tag().to_string(),
            parameter: RecordType::Parameter.default_tag().to_string(),
            message: RecordType::Message.default_tag().to_string(),
        }
    }
}

impl RecordTags {
    pub fn tag(&self, record_type: RecordType) -> &str {
        match record_type {
            RecordType::Attitude => &self.attitude,
            RecordType::ControlTuning => &self.control_tuning,
            RecordType::Parameter => &self.parameter,
            RecordType::Message => &self.message,
        }
    }
}
