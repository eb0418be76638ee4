//! LACChain gas model.
//!
//! LACChain does not charge gas. Instead every transaction names the writer
//! node it is submitted through and an expiration time, ABI encoded and
//! appended to the transaction data. Contracts ignore the trailing bytes.

use alloy::{
    primitives::{Address, Bytes, U256},
    sol_types::SolValue,
};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Envelope {
    pub node_address: Address,
    /// Unix timestamp in seconds.
    pub expiration: u64,
}

impl Envelope {
    pub fn wrap(&self, data: &[u8]) -> Bytes {
        let suffix = (self.node_address, U256::from(self.expiration)).abi_encode_params();
        [data, &suffix].concat().into()
    }
}
