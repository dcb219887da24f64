use parking_lot::RwLock;
use tracing::{debug, info, warn};

use crate::codec;
use crate::config::LedgerConfig;
use crate::errors::{LedgerError, LedgerResult, CODE_OK};
use crate::interfaces::{
    Application, RequestQuery, ResponseCheckTx, ResponseCommit, ResponseDeliverTx, ResponseInfo,
    ResponseQuery,
};
use crate::state::LedgerState;
use crate::types::TicketProofResponse;

/// Consensus-facing handler for the ticket ledger.
///
/// One writer lock covers the whole state: deliver and commit take the
/// write side, while info, admission checks, and queries take the read
/// side. The engine never interleaves deliver/commit with each other, so
/// the lock only arbitrates between the query path and the block path.
#[derive(Default)]
pub struct TicketApp {
    state: RwLock<LedgerState>,
}

impl TicketApp {
    pub fn new() -> Self {
        Self {
            state: RwLock::new(LedgerState::new()),
        }
    }

    /// Bootstrap from configuration, installing the genesis ticket set.
    pub fn from_config(config: &LedgerConfig) -> LedgerResult<Self> {
        config.genesis.validate()?;
        Ok(Self {
            state: RwLock::new(LedgerState::load(config.genesis.tickets.clone())),
        })
    }

    fn admit(&self, raw: &[u8]) -> LedgerResult<()> {
        let tx = codec::parse_tx(raw)?;
        self.state.read().check(&tx)
    }

    fn deliver(&self, raw: &[u8]) -> LedgerResult<u64> {
        let tx = codec::parse_tx(raw)?;
        let id = tx.id;
        self.state.write().apply(tx)?;
        Ok(id)
    }

    fn ticket_response(&self, state: &LedgerState, data: &str) -> LedgerResult<Vec<u8>> {
        let (ticket, proof) = state.ticket_with_proof(data)?;
        let response = TicketProofResponse {
            ticket,
            merkle_proof: proof.siblings,
            index: proof.positions,
        };
        serde_json::to_vec(&response).map_err(|err| LedgerError::Encoding(err.to_string()))
    }
}

impl Application for TicketApp {
    fn info(&self) -> ResponseInfo {
        let state = self.state.read();
        ResponseInfo {
            data: format!(
                "{{\"hashes\":{},\"tickets\":{}}}",
                state.height(),
                state.size()
            ),
            last_block_height: state.height(),
            last_block_app_hash: state.root_hash().to_vec(),
        }
    }

    fn check_tx(&self, tx: &[u8]) -> ResponseCheckTx {
        match self.admit(tx) {
            Ok(()) => ResponseCheckTx {
                code: CODE_OK,
                log: String::new(),
            },
            Err(err) => {
                debug!(%err, "rejecting transaction at admission");
                ResponseCheckTx {
                    code: err.code(),
                    log: err.to_string(),
                }
            }
        }
    }

    fn deliver_tx(&self, tx: &[u8]) -> ResponseDeliverTx {
        match self.deliver(tx) {
            Ok(id) => {
                debug!(id, "delivered ticket transaction");
                ResponseDeliverTx {
                    code: CODE_OK,
                    log: String::new(),
                }
            }
            Err(err) => {
                warn!(%err, "dropping invalid transaction");
                ResponseDeliverTx {
                    code: err.code(),
                    log: err.to_string(),
                }
            }
        }
    }

    fn commit(&self) -> ResponseCommit {
        let mut state = self.state.write();
        let root = state.commit();
        info!(height = state.height(), "committed block");
        ResponseCommit { data: root }
    }

    fn query(&self, request: RequestQuery) -> ResponseQuery {
        let data = String::from_utf8_lossy(&request.data).into_owned();
        let state = self.state.read();
        match request.path.as_str() {
            "hash" => ResponseQuery {
                value: state.height().to_string().into_bytes(),
                ..Default::default()
            },
            "tx" => ResponseQuery {
                value: state.size().to_string().into_bytes(),
                ..Default::default()
            },
            "ticket" => match self.ticket_response(&state, &data) {
                Ok(value) => ResponseQuery {
                    value,
                    ..Default::default()
                },
                Err(err) => {
                    debug!(%err, data = %data, "ticket query failed");
                    ResponseQuery {
                        code: err.code(),
                        log: format!("{data} is not a valid ticket id"),
                        ..Default::default()
                    }
                }
            },
            other => {
                warn!(path = %other, "invalid query path");
                ResponseQuery {
                    log: format!("Invalid query path. Expected hash, tx or ticket, got {other}"),
                    ..Default::default()
                }
            }
        }
    }
}
