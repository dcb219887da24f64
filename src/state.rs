use std::collections::HashMap;

use crate::codec;
use crate::errors::{LedgerError, LedgerResult};
use crate::merkle::{MerkleProof, MerkleTree};
use crate::types::{Ticket, TicketTx};
use crate::validation;

/// Ticket map and block tree captured when a non-empty block committed.
#[derive(Clone, Debug)]
pub struct Snapshot {
    pub tickets: HashMap<u64, Ticket>,
    pub tree: MerkleTree,
}

/// Live application state between consensus callbacks.
///
/// `staging` collects the leaf hashes of the block under construction in
/// delivery order; `history` keeps one snapshot per committed non-empty
/// block so historical queries can be answered with inclusion proofs.
#[derive(Default)]
pub struct LedgerState {
    size: u64,
    height: u64,
    root_hash: Vec<u8>,
    tickets: HashMap<u64, Ticket>,
    history: HashMap<u64, Snapshot>,
    staging: Vec<[u8; 32]>,
}

impl LedgerState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Install a genesis ticket set before the first block. Genesis records
    /// start with empty change histories: they validate resales right away
    /// and become historically queryable at their first on-chain change.
    pub fn load(initial: Vec<TicketTx>) -> Self {
        let mut state = Self::new();
        for tx in initial {
            state.tickets.insert(
                tx.id,
                Ticket {
                    tx,
                    change_heights: Vec::new(),
                },
            );
        }
        state
    }

    /// Last committed block height; 0 before the first commit.
    pub fn height(&self) -> u64 {
        self.height
    }

    /// Total accepted transactions since genesis, staged ones included.
    pub fn size(&self) -> u64 {
        self.size
    }

    /// Merkle root of the most recent non-empty block; empty before the
    /// first.
    pub fn root_hash(&self) -> &[u8] {
        &self.root_hash
    }

    pub fn ticket(&self, id: u64) -> Option<Ticket> {
        self.tickets.get(&id).cloned()
    }

    /// Validate a transaction without mutating anything; the
    /// admission-check path used for mempool filtering.
    pub fn check(&self, tx: &TicketTx) -> LedgerResult<()> {
        let previous = self.previous_tx(tx.id);
        validation::validate(tx, &previous)
    }

    /// Validate a delivered transaction and stage it for the block under
    /// construction. Rejections leave the state untouched.
    pub fn apply(&mut self, tx: TicketTx) -> LedgerResult<()> {
        let previous = self.tickets.get(&tx.id).cloned().unwrap_or_default();
        validation::validate(&tx, &previous.tx)?;
        let leaf = codec::canonical_hash(&tx)?;

        self.size += 1;
        let mut change_heights = previous.change_heights;
        change_heights.push(self.height + 1);
        self.tickets.insert(tx.id, Ticket { tx, change_heights });
        self.staging.push(leaf);
        Ok(())
    }

    /// Advance to the next height, sealing the staged block if any.
    ///
    /// A non-empty block gets a Merkle tree over its staged leaves, a
    /// snapshot of the full ticket map at the new height, and becomes the
    /// new app-hash. An empty block advances the height only. Returns the
    /// current app-hash either way.
    pub fn commit(&mut self) -> Vec<u8> {
        self.height += 1;
        if let Some(tree) = MerkleTree::build(std::mem::take(&mut self.staging)) {
            self.root_hash = tree.root().to_vec();
            self.history.insert(
                self.height,
                Snapshot {
                    tickets: self.tickets.clone(),
                    tree,
                },
            );
        }
        self.root_hash.clone()
    }

    /// Answer a historical ticket query of the form `"<id>[:<height>]"`.
    ///
    /// The ticket is resolved as of the last change at or before the
    /// requested height and returned with its inclusion proof in that
    /// block's tree. Unknown ids and ids queried before their first change
    /// are indistinguishable.
    pub fn ticket_with_proof(&self, query: &str) -> LedgerResult<(Ticket, MerkleProof)> {
        let (id, height) = parse_ticket_query(query, self.height)?;
        let record = self.tickets.get(&id).ok_or(LedgerError::TicketNotFound)?;
        let changed_at = last_change_at_or_before(&record.change_heights, height)?;
        let snapshot = self
            .history
            .get(&changed_at)
            .ok_or(LedgerError::TicketNotFound)?;
        let ticket = snapshot
            .tickets
            .get(&id)
            .cloned()
            .ok_or(LedgerError::TicketNotFound)?;
        let leaf = codec::canonical_hash(&ticket.tx)?;
        let proof = snapshot
            .tree
            .proof_for_leaf(&leaf)
            .ok_or(LedgerError::TicketNotFound)?;
        Ok((ticket, proof))
    }

    fn previous_tx(&self, id: u64) -> TicketTx {
        self.tickets
            .get(&id)
            .map(|ticket| ticket.tx.clone())
            .unwrap_or_default()
    }
}

fn parse_ticket_query(data: &str, current_height: u64) -> LedgerResult<(u64, u64)> {
    let mut parts = data.splitn(2, ':');
    let id = parts
        .next()
        .unwrap_or("")
        .parse::<u64>()
        .map_err(|err| LedgerError::Encoding(format!("invalid ticket id: {err}")))?;
    let height = match parts.next() {
        Some(raw) => raw
            .parse::<u64>()
            .map_err(|err| LedgerError::Encoding(format!("invalid query height: {err}")))?,
        None => current_height,
    };
    Ok((id, height))
}

fn last_change_at_or_before(change_heights: &[u64], height: u64) -> LedgerResult<u64> {
    change_heights
        .iter()
        .rev()
        .find(|&&changed| changed <= height)
        .copied()
        .ok_or(LedgerError::TicketNotFound)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sale(id: u64, nonce: u64, owner: &str) -> TicketTx {
        TicketTx {
            id,
            nonce,
            details: format!("seat {id}"),
            owner_addr: owner.to_string(),
            prev_owner_proof: "0x".to_string(),
        }
    }

    const OWNER: &str = "0x91ea39a24165a3c1e2212e669f00eec3f0d25f7f";

    #[test]
    fn apply_stages_and_records_change_height() {
        let mut state = LedgerState::new();
        state.apply(sale(1, 1, OWNER)).unwrap();

        assert_eq!(state.size(), 1);
        assert_eq!(state.height(), 0);
        let ticket = state.ticket(1).unwrap();
        assert_eq!(ticket.change_heights, vec![1]);
    }

    #[test]
    fn rejection_leaves_state_untouched() {
        let mut state = LedgerState::new();
        state.apply(sale(1, 1, OWNER)).unwrap();
        let err = state.apply(sale(1, 1, OWNER)).unwrap_err();
        assert!(matches!(err, LedgerError::BadNonce));

        assert_eq!(state.size(), 1);
        assert_eq!(state.ticket(1).unwrap().tx.nonce, 1);
    }

    #[test]
    fn commit_seals_non_empty_blocks_only() {
        let mut state = LedgerState::new();
        state.apply(sale(1, 1, OWNER)).unwrap();
        let root = state.commit();
        assert_eq!(root.len(), 32);
        assert_eq!(state.height(), 1);

        // empty block: height advances, app-hash stays
        let unchanged = state.commit();
        assert_eq!(unchanged, root);
        assert_eq!(state.height(), 2);
        assert!(state.history.get(&2).is_none());
    }

    #[test]
    fn app_hash_empty_before_first_non_empty_block() {
        let mut state = LedgerState::new();
        assert!(state.commit().is_empty());
        assert_eq!(state.height(), 1);
    }

    #[test]
    fn historical_lookup_resolves_last_change() {
        let mut state = LedgerState::new();
        state.apply(sale(1, 1, OWNER)).unwrap();
        state.commit();
        state.apply(sale(2, 1, OWNER)).unwrap();
        state.commit();

        let (ticket, proof) = state.ticket_with_proof("1:2").unwrap();
        assert_eq!(ticket.tx.nonce, 1);
        assert_eq!(ticket.change_heights, vec![1]);
        let leaf = codec::canonical_hash(&ticket.tx).unwrap();
        let root = state.history.get(&1).unwrap().tree.root();
        assert_eq!(proof.compute_root(leaf).unwrap(), root);
    }

    #[test]
    fn height_defaults_to_current() {
        let mut state = LedgerState::new();
        state.apply(sale(1, 1, OWNER)).unwrap();
        state.commit();

        let (with_default, _) = state.ticket_with_proof("1").unwrap();
        let (explicit, _) = state.ticket_with_proof("1:1").unwrap();
        assert_eq!(with_default, explicit);
    }

    #[test]
    fn unknown_and_too_early_queries_are_not_found() {
        let mut state = LedgerState::new();
        state.commit();
        state.apply(sale(1, 1, OWNER)).unwrap();
        state.commit();

        assert!(matches!(
            state.ticket_with_proof("9"),
            Err(LedgerError::TicketNotFound)
        ));
        // ticket 1 first changed at height 2
        assert!(matches!(
            state.ticket_with_proof("1:1"),
            Err(LedgerError::TicketNotFound)
        ));
        assert!(matches!(
            state.ticket_with_proof("not-a-number"),
            Err(LedgerError::Encoding(_))
        ));
        assert!(matches!(
            state.ticket_with_proof("1:xyz"),
            Err(LedgerError::Encoding(_))
        ));
    }

    #[test]
    fn genesis_records_validate_resales_but_have_no_history() {
        let state = LedgerState::load(vec![sale(1, 1, OWNER)]);
        assert_eq!(state.ticket(1).unwrap().change_heights, Vec::<u64>::new());
        assert!(matches!(
            state.ticket_with_proof("1"),
            Err(LedgerError::TicketNotFound)
        ));
        // a fresh sale with the same id must outbid the genesis nonce
        assert!(matches!(
            state.check(&sale(1, 1, OWNER)),
            Err(LedgerError::BadNonce)
        ));
    }
}
