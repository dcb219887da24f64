use std::collections::HashSet;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::codec;
use crate::errors::{LedgerError, LedgerResult};
use crate::types::TicketTx;

/// Ticket set installed into the live map before the first block.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct GenesisConfig {
    pub tickets: Vec<TicketTx>,
}

impl GenesisConfig {
    /// Check that genesis tickets carry unique ids, owner addresses, and
    /// decodable hex fields.
    pub fn validate(&self) -> LedgerResult<()> {
        let mut seen = HashSet::new();
        for ticket in &self.tickets {
            if !seen.insert(ticket.id) {
                return Err(LedgerError::Config(format!(
                    "duplicate genesis ticket id {}",
                    ticket.id
                )));
            }
            if ticket.owner_addr.is_empty() {
                return Err(LedgerError::Config(format!(
                    "genesis ticket {} has no owner address",
                    ticket.id
                )));
            }
            codec::decode_address(&ticket.owner_addr)
                .map_err(|err| LedgerError::Config(err.to_string()))?;
            codec::decode_proof(&ticket.prev_owner_proof)
                .map_err(|err| LedgerError::Config(err.to_string()))?;
        }
        Ok(())
    }
}

/// Application configuration loaded by the node embedding the ledger.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct LedgerConfig {
    pub genesis: GenesisConfig,
}

impl LedgerConfig {
    pub fn load(path: &Path) -> LedgerResult<Self> {
        let content = fs::read_to_string(path)?;
        toml::from_str(&content)
            .map_err(|err| LedgerError::Config(format!("unable to parse config: {err}")))
    }

    pub fn save(&self, path: &Path) -> LedgerResult<()> {
        let parent = path.parent().unwrap_or_else(|| Path::new("."));
        fs::create_dir_all(parent)?;
        let encoded = toml::to_string_pretty(self)
            .map_err(|err| LedgerError::Config(format!("unable to encode config: {err}")))?;
        fs::write(path, encoded)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn genesis_ticket() -> TicketTx {
        TicketTx {
            id: 1,
            nonce: 1,
            details: "box seat".to_string(),
            owner_addr: "0x91ea39a24165a3c1e2212e669f00eec3f0d25f7f".to_string(),
            prev_owner_proof: "0x".to_string(),
        }
    }

    #[test]
    fn save_and_load_roundtrip() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config").join("ledger.toml");

        let config = LedgerConfig {
            genesis: GenesisConfig {
                tickets: vec![genesis_ticket()],
            },
        };
        config.save(&path).unwrap();

        let loaded = LedgerConfig::load(&path).unwrap();
        assert_eq!(loaded.genesis.tickets, config.genesis.tickets);
    }

    #[test]
    fn missing_sections_default() {
        let config: LedgerConfig = toml::from_str("").unwrap();
        assert!(config.genesis.tickets.is_empty());
    }

    #[test]
    fn validate_rejects_bad_genesis() {
        let mut duplicate = GenesisConfig {
            tickets: vec![genesis_ticket(), genesis_ticket()],
        };
        assert!(matches!(
            duplicate.validate(),
            Err(LedgerError::Config(_))
        ));

        duplicate.tickets[1].id = 2;
        duplicate.tickets[1].owner_addr = String::new();
        assert!(matches!(
            duplicate.validate(),
            Err(LedgerError::Config(_))
        ));

        duplicate.tickets[1].owner_addr = "0xabcd".to_string();
        assert!(matches!(
            duplicate.validate(),
            Err(LedgerError::Config(_))
        ));
    }
}
