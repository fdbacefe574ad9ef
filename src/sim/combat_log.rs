use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LogKind {
    Damage,
    Death,
    Heal,
    Info,
}

/// One line of the battle chronicle
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CombatLogEntry {
    pub round: u32,
    pub message: String,
    pub kind: LogKind,
}

impl CombatLogEntry {
    pub fn new(round: u32, kind: LogKind, message: impl Into<String>) -> Self {
        Self {
            round,
            message: message.into(),
            kind,
        }
    }

    pub fn info(round: u32, message: impl Into<String>) -> Self {
        Self::new(round, LogKind::Info, message)
    }
}
