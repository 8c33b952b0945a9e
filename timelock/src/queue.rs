//! Queued transaction records and their identifying hash.

use blake2::digest::consts::U32;
use blake2::{Blake2b, Digest};
use covenant_types::{CallDescriptor, Timestamp, TxHash};
use serde::{Deserialize, Serialize};

type Blake2b256 = Blake2b<U32>;

/// A transaction waiting in the timelock. Presence in the queue is what
/// "queued" means; executing or canceling removes the record.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueuedTransaction {
    pub hash: TxHash,
    pub call: CallDescriptor,
    pub eta: Timestamp,
    pub queued_at: Timestamp,
}

impl QueuedTransaction {
    /// Last second at which the transaction may still execute.
    pub fn expires_at(&self, grace_period: u64) -> Timestamp {
        self.eta.saturating_add(grace_period)
    }
}

/// Hash of `(target, value, signature, data, eta)`.
///
/// Each field is length-prefixed, so distinct tuples never share an
/// encoding.
pub fn transaction_hash(call: &CallDescriptor, eta: Timestamp) -> TxHash {
    let mut hasher = Blake2b256::new();
    let target = call.target.as_str().as_bytes();
    hasher.update((target.len() as u64).to_be_bytes());
    hasher.update(target);
    hasher.update(call.value.to_be_bytes());
    hasher.update((call.signature.len() as u64).to_be_bytes());
    hasher.update(call.signature.as_bytes());
    hasher.update((call.data.len() as u64).to_be_bytes());
    hasher.update(&call.data);
    hasher.update(eta.as_secs().to_be_bytes());
    let mut output = [0u8; 32];
    output.copy_from_slice(&hasher.finalize());
    TxHash::new(output)
}

#[cfg(test)]
mod tests {
    use super::*;
    use covenant_types::AccountId;

    fn call(signature: &str, data: Vec<u8>) -> CallDescriptor {
        CallDescriptor::new(AccountId::new("timelock"), 0, signature, data)
    }

    #[test]
    fn hash_is_deterministic() {
        let c = call("setDelay(uint256)", vec![1, 2, 3]);
        assert_eq!(
            transaction_hash(&c, Timestamp::new(10)),
            transaction_hash(&c, Timestamp::new(10))
        );
    }

    #[test]
    fn every_field_changes_the_hash() {
        let base = call("setDelay(uint256)", vec![1]);
        let h = transaction_hash(&base, Timestamp::new(10));

        assert_ne!(h, transaction_hash(&base, Timestamp::new(11)));

        let mut other = base.clone();
        other.value = 1;
        assert_ne!(h, transaction_hash(&other, Timestamp::new(10)));

        let mut other = base.clone();
        other.target = AccountId::new("governor");
        assert_ne!(h, transaction_hash(&other, Timestamp::new(10)));

        assert_ne!(h, transaction_hash(&call("setDelay(uint64)", vec![1]), Timestamp::new(10)));
        assert_ne!(h, transaction_hash(&call("setDelay(uint256)", vec![2]), Timestamp::new(10)));
    }

    #[test]
    fn field_boundaries_are_unambiguous() {
        let a = call("ab", vec![b'c']);
        let b = call("a", vec![b'b', b'c']);
        assert_ne!(
            transaction_hash(&a, Timestamp::new(1)),
            transaction_hash(&b, Timestamp::new(1))
        );
    }
}
