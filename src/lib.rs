//! Deterministic application core of a replicated ticket-ownership ledger.
//!
//! An external Byzantine-fault-tolerant consensus engine drives the crate
//! through the [`interfaces::Application`] callbacks. Admission checks and
//! delivery feed validated ticket transfers into [`state::LedgerState`],
//! each commit seals the delivered block behind a Merkle tree whose root
//! becomes the app-hash, and historical queries answer `(id, height)`
//! lookups with inclusion proofs rooted in that block's tree. Every resale
//! is bound to its previous owner through an Ethereum-style recoverable
//! secp256k1 signature over the previous ticket's canonical hash.
//!
//! Embedders typically build a [`TicketApp`] (optionally from a
//! [`config::LedgerConfig`] carrying a genesis ticket set) and hand it to
//! their engine binding; the transport, mempool, and client tooling live
//! outside this crate.

pub mod app;
pub mod codec;
pub mod config;
pub mod crypto;
pub mod errors;
pub mod interfaces;
pub mod merkle;
pub mod state;
pub mod types;
pub mod validation;

pub use app::TicketApp;
pub use errors::{LedgerError, LedgerResult};
pub use interfaces::Application;
