use serde::{Deserialize, Serialize};

pub use crate::errors::{CODE_ENCODING_ERROR, CODE_OK, CODE_TICKET_ERROR};

/// Chain metadata returned to the consensus engine on `info`.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct ResponseInfo {
    pub data: String,
    pub last_block_height: u64,
    pub last_block_app_hash: Vec<u8>,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct ResponseCheckTx {
    pub code: u32,
    pub log: String,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct ResponseDeliverTx {
    pub code: u32,
    pub log: String,
}

/// Commit response carrying the app-hash for the sealed block.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct ResponseCommit {
    pub data: Vec<u8>,
}

/// Query request: a dispatch path plus path-specific data bytes.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct RequestQuery {
    pub path: String,
    pub data: Vec<u8>,
}

impl RequestQuery {
    pub fn new(path: impl Into<String>, data: impl Into<Vec<u8>>) -> Self {
        Self {
            path: path.into(),
            data: data.into(),
        }
    }
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct ResponseQuery {
    pub code: u32,
    pub value: Vec<u8>,
    pub log: String,
}

/// Callback surface a consensus engine drives once per block lifecycle:
/// admission checks at any point between blocks, an ordered run of
/// delivers, one commit, and read-only queries in between.
pub trait Application {
    fn info(&self) -> ResponseInfo;
    fn check_tx(&self, tx: &[u8]) -> ResponseCheckTx;
    fn deliver_tx(&self, tx: &[u8]) -> ResponseDeliverTx;
    fn commit(&self) -> ResponseCommit;
    fn query(&self, request: RequestQuery) -> ResponseQuery;
}
