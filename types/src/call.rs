//! Call descriptors: the generic "invoke by signature" action format.
//!
//! Proposals and queued timelock transactions never interpret the calls they
//! carry; they store `(target, value, signature, data)` and hand them to the
//! execution environment. Arguments are encoded with `bincode`.

use crate::address::AccountId;
use crate::error::TypeError;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A single call to be dispatched against a target account.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CallDescriptor {
    pub target: AccountId,
    pub value: u128,
    /// Method signature, e.g. `setPendingAdmin(address)`.
    pub signature: String,
    /// Encoded arguments.
    pub data: Vec<u8>,
}

impl CallDescriptor {
    pub fn new(
        target: AccountId,
        value: u128,
        signature: impl Into<String>,
        data: Vec<u8>,
    ) -> Self {
        Self {
            target,
            value,
            signature: signature.into(),
            data,
        }
    }

    /// Build a call whose arguments are encoded from `args`.
    pub fn with_args<T: Serialize>(
        target: AccountId,
        value: u128,
        signature: impl Into<String>,
        args: &T,
    ) -> Result<Self, TypeError> {
        Ok(Self::new(target, value, signature, encode_args(args)?))
    }

    /// The method name: everything before the opening parenthesis.
    pub fn method_name(&self) -> &str {
        self.signature
            .split_once('(')
            .map(|(name, _)| name)
            .unwrap_or(&self.signature)
    }

    /// Decode the call's arguments.
    pub fn decode_args<T: DeserializeOwned>(&self) -> Result<T, TypeError> {
        decode_args(&self.data)
    }
}

impl fmt::Display for CallDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}.{} value={} data=0x{}",
            self.target,
            self.signature,
            self.value,
            hex::encode(&self.data)
        )
    }
}

/// Encode call arguments.
pub fn encode_args<T: Serialize>(args: &T) -> Result<Vec<u8>, TypeError> {
    bincode::serialize(args).map_err(|e| TypeError::Encoding(e.to_string()))
}

/// Decode call arguments.
pub fn decode_args<T: DeserializeOwned>(data: &[u8]) -> Result<T, TypeError> {
    bincode::deserialize(data).map_err(|e| TypeError::Encoding(e.to_string()))
}
