//! Wire messages. One JSON object per line, discriminated by `event`.

use mathboard_core::{Step, StepRecord};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum Inbound {
    RequestMath {
        session: String,
        /// Generated when the client sends none.
        #[serde(rename = "requestId", default)]
        request_id: Option<String>,
        steps: Vec<Step>,
    },
    Disconnect {
        session: String,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum Outbound {
    DisplayStep {
        session: String,
        #[serde(flatten)]
        record: StepRecord,
    },
    RequestComplete {
        session: String,
        #[serde(rename = "requestId")]
        request_id: String,
        emitted: usize,
    },
    RequestSuperseded {
        session: String,
        #[serde(rename = "requestId")]
        request_id: String,
        emitted: usize,
    },
    Error {
        #[serde(skip_serializing_if = "Option::is_none")]
        session: Option<String>,
        message: String,
    },
}

impl Outbound {
    pub fn error(session: Option<String>, message: impl Into<String>) -> Self {
        Outbound::Error {
            session,
            message: message.into(),
        }
    }
}
