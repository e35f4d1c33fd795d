use std::collections::BTreeSet;

use crate::ledger::types::PlayerId;

/// Gate on dealing, community cards and showdown.
pub trait AccessControl {
    fn is_privileged(&self, caller: PlayerId) -> bool;
}

/// Allow-list of dealer identities.
#[derive(Clone, Debug, Default)]
pub struct DealerGate {
    dealers: BTreeSet<PlayerId>,
}

impl DealerGate {
    pub fn new(dealer: PlayerId) -> Self {
        Self {
            dealers: BTreeSet::from([dealer]),
        }
    }

    pub fn grant(&mut self, dealer: PlayerId) {
        self.dealers.insert(dealer);
    }

    pub fn revoke(&mut self, dealer: PlayerId) -> bool {
        self.dealers.remove(&dealer)
    }
}

impl AccessControl for DealerGate {
    fn is_privileged(&self, caller: PlayerId) -> bool {
        self.dealers.contains(&caller)
    }
}
