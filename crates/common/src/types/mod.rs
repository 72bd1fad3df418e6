use serde::{Deserialize, Serialize};

/// Body of `GET /monitoring/ping`.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct Ping {
    pub status: String,
}

impl Ping {
    pub fn ok() -> Self {
        Self { status: "ok".into() }
    }
}
