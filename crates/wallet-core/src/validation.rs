use once_cell::sync::Lazy;
use regex::Regex;

use crate::error::WalletError;
use crate::types::Network;

static EVM_ADDRESS_FMT: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^0x[0-9a-fA-F]{40}$").unwrap_or_else(|e| panic!("invalid EVM address regex: {e}"))
});

static TRON_ADDRESS_FMT: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[Tt][0-9a-zA-Z]{33}$").unwrap_or_else(|e| panic!("invalid TRON address regex: {e}"))
});

/// Shape check only; checksums are verified by the chain codecs.
pub fn is_address_shape(network: Network, address: &str) -> bool {
    match network {
        Network::Eth => EVM_ADDRESS_FMT.is_match(address),
        Network::Tron => TRON_ADDRESS_FMT.is_match(address),
    }
}

pub fn check_address(network: Network, address: &str) -> Result<(), WalletError> {
    if is_address_shape(network, address) {
        Ok(())
    } else {
        Err(WalletError::Validation(format!(
            "malformed {} address: {address}",
            network.display_name()
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn evm_shapes() {
        assert!(is_address_shape(Network::Eth, "0x9858EfFD232B4033E47d90003D41EC34EcaEda94"));
        assert!(is_address_shape(Network::Eth, "0x9858effd232b4033e47d90003d41ec34ecaeda94"));
        assert!(!is_address_shape(Network::Eth, "9858EfFD232B4033E47d90003D41EC34EcaEda94"));
        assert!(!is_address_shape(Network::Eth, "0x9858EfFD232B4033E47d90003D41EC34EcaEda9"));
        assert!(!is_address_shape(Network::Eth, "0x9858EfFD232B4033E47d90003D41EC34EcaEda94a"));
        assert!(!is_address_shape(Network::Eth, "0xZZ58EfFD232B4033E47d90003D41EC34EcaEda94"));
        assert!(!is_address_shape(Network::Eth, ""));
    }

    #[test]
    fn tron_shapes() {
        assert!(is_address_shape(Network::Tron, "TR7NHqjeKQxGTCi8q8ZY4pL8otSzgjLj6t"));
        assert!(is_address_shape(Network::Tron, "tR7NHqjeKQxGTCi8q8ZY4pL8otSzgjLj6t"));
        assert!(!is_address_shape(Network::Tron, "R7NHqjeKQxGTCi8q8ZY4pL8otSzgjLj6t"));
        assert!(!is_address_shape(Network::Tron, "TR7NHqjeKQxGTCi8q8ZY4pL8otSzgjLj6"));
        assert!(!is_address_shape(Network::Tron, "TR7NHqjeKQxGTCi8q8ZY4pL8otSzgjLj6t_"));
        assert!(!is_address_shape(Network::Tron, "0x9858EfFD232B4033E47d90003D41EC34EcaEda94"));
    }

    #[test]
    fn check_address_reports_network() {
        let err = check_address(Network::Tron, "bogus").unwrap_err();
        assert!(err.to_string().contains("TRON"));
        assert!(check_address(Network::Eth, "0x000000000000000000000000000000000000dEaD").is_ok());
    }
}
