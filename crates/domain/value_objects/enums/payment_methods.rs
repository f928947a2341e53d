use std::fmt::Display;

use serde::{Deserialize, Serialize};

/// Provenance of a paid consultation. `Dummy` entries never went through the
/// gateway's intent/confirm exchange.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum PaymentMethod {
    Gateway,
    Dummy,
}

impl PaymentMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentMethod::Gateway => "gateway",
            PaymentMethod::Dummy => "dummy",
        }
    }

    pub fn from_str(value: &str) -> Option<Self> {
        match value {
            "gateway" => Some(PaymentMethod::Gateway),
            "dummy" => Some(PaymentMethod::Dummy),
            _ => None,
        }
    }
}

impl Display for PaymentMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
