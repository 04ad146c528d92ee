//! Connector record
//!
//! A connector is one integration to a vendor backend. The pipeline reads
//! connectors to resolve which organization an event belongs to; connector
//! lifecycle (credentials, polling) lives in the driver layer.

use serde::{Deserialize, Serialize};

/// Supported vendor backends
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConnectorKind {
    YoLink,
    Piko,
    NetBox,
    Genea,
}

impl ConnectorKind {
    /// Stable string form, used as the SQLite column value
    pub fn as_str(&self) -> &'static str {
        match self {
            ConnectorKind::YoLink => "yolink",
            ConnectorKind::Piko => "piko",
            ConnectorKind::NetBox => "netbox",
            ConnectorKind::Genea => "genea",
        }
    }

    /// Parse the stable string form
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "yolink" => Some(ConnectorKind::YoLink),
            "piko" => Some(ConnectorKind::Piko),
            "netbox" => Some(ConnectorKind::NetBox),
            "genea" => Some(ConnectorKind::Genea),
            _ => None,
        }
    }
}

/// An integration to one vendor backend
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Connector {
    /// Internal id
    pub id: String,

    /// Owning organization (tenant)
    pub organization_id: String,

    /// Vendor backend
    pub kind: ConnectorKind,

    /// Display name
    pub name: String,
}

impl Connector {
    /// Create a connector with a fresh ULID
    pub fn new(
        organization_id: impl Into<String>,
        kind: ConnectorKind,
        name: impl Into<String>,
    ) -> Self {
        Self {
            id: ulid::Ulid::new().to_string().to_lowercase(),
            organization_id: organization_id.into(),
            kind,
            name: name.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_string_round_trip() {
        for kind in [
            ConnectorKind::YoLink,
            ConnectorKind::Piko,
            ConnectorKind::NetBox,
            ConnectorKind::Genea,
        ] {
            assert_eq!(ConnectorKind::parse(kind.as_str()), Some(kind));
        }
    }
}
