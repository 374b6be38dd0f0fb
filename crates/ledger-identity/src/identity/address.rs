//! Account and contract addresses.

use crate::crypto::hash;
use crate::hexbytes::hex_newtype;

hex_newtype!(
    /// A 20-byte address naming a signer account or a deployed contract.
    ///
    /// An identity is addressed by the contract address it was deployed at;
    /// that address is the identity handle passed to registries and the
    /// directory.
    Address,
    20,
    "address"
);

impl Address {
    /// The all-zero address.
    pub const ZERO: Address = Address([0u8; 20]);

    /// Address of the contract created by `deployer` with the given nonce:
    /// the last 20 bytes of `keccak256(deployer ‖ nonce)`.
    pub fn derive_contract(deployer: &Address, nonce: u64) -> Self {
        let digest = hash::keccak256_concat(&[deployer.as_bytes(), &nonce.to_be_bytes()]);
        let mut out = [0u8; 20];
        out.copy_from_slice(&digest[12..]);
        Address(out)
    }

    /// True for the all-zero address.
    pub fn is_zero(&self) -> bool {
        self.0 == [0u8; 20]
    }
}
