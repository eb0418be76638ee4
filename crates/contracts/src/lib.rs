//! Bindings for the contracts of the Eco-Carbon San Martín project.
//!
//! Every contract inherits from `BaseRelayRecipient` and therefore takes the
//! trusted forwarder as its only constructor argument. The bindings only
//! describe the ABI surface the tooling uses; the creation bytecode is read
//! from the compiled hardhat artifacts at runtime (see [`artifact`]).
pub mod artifact;

#[macro_export]
macro_rules! bindings {
    ($contract:ident { $($body:tt)* }) => {
        paste::paste! {
            // Generate the main bindings in a private module. That allows
            // us to re-export all items in our own module while also adding
            // some items ourselves.
            #[allow(non_snake_case)]
            mod [<$contract Private>] {
                alloy::sol!(
                    #[allow(missing_docs)]
                    #[sol(rpc)]
                    contract $contract {
                        $($body)*
                    }
                );
            }

            #[allow(non_snake_case)]
            pub mod $contract {
                use alloy::providers::DynProvider;

                pub use super::[<$contract Private>]::$contract::*;
                pub type Instance = [<$contract Instance>]<DynProvider>;

                /// Name of the contract as it appears in the hardhat artifacts.
                pub const NAME: &str = stringify!($contract);
            }
        }
    };
}

bindings!(SimpleGreeting {
    constructor(address trustedForwarder);

    function getGreeting() external view returns (string memory);
    function updateGreeting(string memory newGreeting) external;
    function isTrustedForwarder(address forwarder) external view returns (bool);
});

bindings!(SimpleStorage {
    constructor(address trustedForwarder);

    function storeCarbonData(string memory key, uint256 value) external;
    function getCarbonData(string memory key) external view returns (uint256);
    function isTrustedForwarder(address forwarder) external view returns (bool);
});

bindings!(EcoCarbonToken {
    constructor(address trustedForwarder);

    function name() external view returns (string memory);
    function symbol() external view returns (string memory);
    function decimals() external view returns (uint8);
    function totalSupply() external view returns (uint256);
    function isTrustedForwarder(address forwarder) external view returns (bool);
});

#[cfg(test)]
mod tests {
    use {
        super::*,
        alloy::{
            primitives::{U256, keccak256},
            sol_types::SolCall,
        },
    };

    fn selector(signature: &str) -> [u8; 4] {
        keccak256(signature.as_bytes())[..4].try_into().unwrap()
    }

    #[test]
    fn selectors_match_solidity_signatures() {
        assert_eq!(
            SimpleGreeting::updateGreetingCall::SELECTOR,
            selector("updateGreeting(string)")
        );
        assert_eq!(
            SimpleStorage::storeCarbonDataCall::SELECTOR,
            selector("storeCarbonData(string,uint256)")
        );
        assert_eq!(
            SimpleStorage::getCarbonDataCall::SELECTOR,
            selector("getCarbonData(string)")
        );
        assert_eq!(
            EcoCarbonToken::isTrustedForwarderCall::SELECTOR,
            selector("isTrustedForwarder(address)")
        );
    }

    #[test]
    fn store_call_encodes_key_and_value() {
        let calldata = SimpleStorage::storeCarbonDataCall {
            key: "tons_processed".to_string(),
            value: U256::from(1000),
        }
        .abi_encode();

        // selector, string offset, value, string length, padded string
        assert_eq!(calldata.len(), 4 + 32 * 4);
        assert_eq!(U256::from_be_slice(&calldata[36..68]), U256::from(1000));
        assert_eq!(&calldata[100..114], b"tons_processed");
    }

    #[test]
    fn contract_names() {
        assert_eq!(SimpleGreeting::NAME, "SimpleGreeting");
        assert_eq!(SimpleStorage::NAME, "SimpleStorage");
        assert_eq!(EcoCarbonToken::NAME, "EcoCarbonToken");
    }
}
