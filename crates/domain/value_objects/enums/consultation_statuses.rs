use std::fmt::Display;

use serde::{Deserialize, Serialize};

/// Derived on read from an interest entry; never stored.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ConsultationStatus {
    Interested,
    Pending,
    Active,
    Expired,
}

impl ConsultationStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ConsultationStatus::Interested => "interested",
            ConsultationStatus::Pending => "pending",
            ConsultationStatus::Active => "active",
            ConsultationStatus::Expired => "expired",
        }
    }
}

impl Display for ConsultationStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
