//! Gateway region selection.

use std::fmt;
use std::str::FromStr;

use crate::error::BridgeError;

/// Fleet region; selects which remote gateway host commands are sent to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Region {
    /// Europe, Middle East and Africa.
    #[default]
    Eu,
    /// North America and Asia-Pacific.
    Na,
    /// Mainland China.
    Cn,
}

impl Region {
    /// Returns the gateway host for this region.
    #[must_use]
    pub const fn gateway_host(self) -> &'static str {
        match self {
            Self::Eu => "fleet-api.prd.eu.vn.cloud.tesla.com",
            Self::Na => "fleet-api.prd.na.vn.cloud.tesla.com",
            Self::Cn => "fleet-api.prd.cn.vn.cloud.tesla.cn",
        }
    }

    /// Returns the WebSocket endpoint for this region.
    #[must_use]
    pub fn gateway_url(self) -> String {
        format!("wss://{}/v1", self.gateway_host())
    }

    /// Returns the short region code.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Eu => "eu",
            Self::Na => "na",
            Self::Cn => "cn",
        }
    }
}

impl fmt::Display for Region {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Region {
    type Err = BridgeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "eu" => Ok(Self::Eu),
            "na" => Ok(Self::Na),
            "cn" => Ok(Self::Cn),
            other => Err(BridgeError::Config(format!("unknown region: {other}"))),
        }
    }
}
