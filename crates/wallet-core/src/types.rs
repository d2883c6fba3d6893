use serde::{Deserialize, Serialize};

use crate::error::WalletError;

/// USDT uses 6 decimals on both chains.
pub const USDT_DECIMALS: u32 = 6;

/// Wei per ether.
pub const ETH_DECIMALS: u32 = 18;

/// Sun per TRX.
pub const TRX_DECIMALS: u32 = 6;

/// Supported networks, with the numeric codes callers send.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Network {
    Tron,
    Eth,
}

impl Network {
    /// BIP-44 coin type for this network
    pub fn coin_type(&self) -> u32 {
        match self {
            Network::Tron => 195,
            Network::Eth => 60,
        }
    }

    pub fn code(&self) -> i64 {
        match self {
            Network::Tron => 1,
            Network::Eth => 2,
        }
    }

    /// Decimals of the native coin
    pub fn native_decimals(&self) -> u32 {
        match self {
            Network::Tron => TRX_DECIMALS,
            Network::Eth => ETH_DECIMALS,
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            Network::Tron => "TRON",
            Network::Eth => "Ethereum",
        }
    }
}

impl TryFrom<i64> for Network {
    type Error = WalletError;

    fn try_from(code: i64) -> Result<Self, Self::Error> {
        match code {
            1 => Ok(Network::Tron),
            2 => Ok(Network::Eth),
            other => Err(WalletError::Validation(format!(
                "unsupported network code {other}"
            ))),
        }
    }
}
