//! Derivation path parameters

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// BIP-44 purpose level
pub const PURPOSE: u32 = 44;

/// Registered coin type for the network
pub const COIN_TYPE: u32 = 784;

/// Offset marking a hardened child index
pub const HARDENED_OFFSET: u32 = 0x8000_0000;

/// Structured address into the account key tree.
///
/// Maps onto `m/44'/784'/{account_index}'/{change}'/{address_index}'` where
/// `change` is 0 for external chains and 1 for internal ones. Every level is
/// hardened, so both indices must stay below 2^31.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DerivePathParams {
    pub account_index: u32,
    pub is_external: bool,
    pub address_index: u32,
}

impl Default for DerivePathParams {
    fn default() -> Self {
        Self {
            account_index: 0,
            is_external: true,
            address_index: 0,
        }
    }
}

impl DerivePathParams {
    /// Create path params for an external-chain address
    pub fn new(account_index: u32, address_index: u32) -> Self {
        Self {
            account_index,
            is_external: true,
            address_index,
        }
    }

    /// Build from signed indices, rejecting anything outside the hardened u32 range
    pub fn try_from_signed(account_index: i64, is_external: bool, address_index: i64) -> Result<Self> {
        let params = Self {
            account_index: index_from_signed("accountIndex", account_index)?,
            is_external,
            address_index: index_from_signed("addressIndex", address_index)?,
        };
        params.validate()?;
        Ok(params)
    }

    /// Check that both indices can be hardened without overflowing
    pub fn validate(&self) -> Result<()> {
        check_hardenable("accountIndex", self.account_index)?;
        check_hardenable("addressIndex", self.address_index)
    }

    /// The change level: 0 for external, 1 for internal
    pub fn change(&self) -> u32 {
        if self.is_external {
            0
        } else {
            1
        }
    }

    /// Raw child indices for each level, without the hardened offset applied
    pub fn indices(&self) -> [u32; 5] {
        [
            PURPOSE,
            COIN_TYPE,
            self.account_index,
            self.change(),
            self.address_index,
        ]
    }
}

fn index_from_signed(field: &str, value: i64) -> Result<u32> {
    u32::try_from(value).map_err(|_| {
        Error::InvalidPath(format!(
            "{} must be a non-negative 32-bit integer, got {}",
            field, value
        ))
    })
}

fn check_hardenable(field: &str, value: u32) -> Result<()> {
    if value >= HARDENED_OFFSET {
        return Err(Error::InvalidPath(format!(
            "{} {} is outside the hardened index range",
            field, value
        )));
    }
    Ok(())
}

impl fmt::Display for DerivePathParams {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "m/{}'/{}'/{}'/{}'/{}'",
            PURPOSE,
            COIN_TYPE,
            self.account_index,
            self.change(),
            self.address_index
        )
    }
}

impl FromStr for DerivePathParams {
    type Err = Error;

    fn from_str(path: &str) -> Result<Self> {
        let rest = path
            .strip_prefix("m/")
            .ok_or_else(|| Error::InvalidPath(format!("path must start with m/: {}", path)))?;

        let mut components = Vec::with_capacity(5);
        for component in rest.split('/') {
            let index = component
                .strip_suffix('\'')
                .or_else(|| component.strip_suffix('h'))
                .ok_or_else(|| {
                    Error::InvalidPath(format!("component {} must be hardened", component))
                })?;
            let index = index.parse::<u32>().map_err(|_| {
                Error::InvalidPath(format!("invalid path component: {}", component))
            })?;
            components.push(index);
        }

        let [purpose, coin, account_index, change, address_index] = components[..] else {
            return Err(Error::InvalidPath(format!(
                "expected 5 levels, got {}: {}",
                components.len(),
                path
            )));
        };

        if purpose != PURPOSE || coin != COIN_TYPE {
            return Err(Error::InvalidPath(format!(
                "expected m/{}'/{}' prefix: {}",
                PURPOSE, COIN_TYPE, path
            )));
        }

        let is_external = match change {
            0 => true,
            1 => false,
            other => {
                return Err(Error::InvalidPath(format!("change level must be 0 or 1, got {}", other)))
            }
        };

        let params = Self {
            account_index,
            is_external,
            address_index,
        };
        params.validate()?;
        Ok(params)
    }
}

/// Conversion into validated path params at an operation boundary
pub trait IntoDerivePath {
    fn into_derive_path(self) -> Result<DerivePathParams>;
}

impl IntoDerivePath for DerivePathParams {
    fn into_derive_path(self) -> Result<DerivePathParams> {
        self.validate()?;
        Ok(self)
    }
}

impl IntoDerivePath for &DerivePathParams {
    fn into_derive_path(self) -> Result<DerivePathParams> {
        (*self).into_derive_path()
    }
}

impl IntoDerivePath for (i64, bool, i64) {
    fn into_derive_path(self) -> Result<DerivePathParams> {
        DerivePathParams::try_from_signed(self.0, self.1, self.2)
    }
}

impl IntoDerivePath for &str {
    fn into_derive_path(self) -> Result<DerivePathParams> {
        self.parse()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_path() {
        let path = DerivePathParams::default();
        assert_eq!(path.to_string(), "m/44'/784'/0'/0'/0'");
    }

    #[test]
    fn test_internal_chain() {
        let path = DerivePathParams {
            account_index: 3,
            is_external: false,
            address_index: 7,
        };
        assert_eq!(path.to_string(), "m/44'/784'/3'/1'/7'");
        assert_eq!(path.indices(), [44, 784, 3, 1, 7]);
    }

    #[test]
    fn test_parse_round_trip() {
        let path: DerivePathParams = "m/44'/784'/2'/1'/5'".parse().unwrap();
        assert_eq!(path.account_index, 2);
        assert!(!path.is_external);
        assert_eq!(path.address_index, 5);

        let alt: DerivePathParams = "m/44h/784h/2h/1h/5h".parse().unwrap();
        assert_eq!(path, alt);
    }

    #[test]
    fn test_parse_rejects_bad_paths() {
        for bad in [
            "44'/784'/0'/0'/0'",
            "m/44'/784'/0'/0/0",
            "m/44'/60'/0'/0'/0'",
            "m/44'/784'/0'/2'/0'",
            "m/44'/784'/0'/0'",
            "m/44'/784'/x'/0'/0'",
        ] {
            assert!(matches!(bad.parse::<DerivePathParams>(), Err(Error::InvalidPath(_))), "{}", bad);
        }
    }

    #[test]
    fn test_signed_indices() {
        assert!(matches!((-1i64, true, 0i64).into_derive_path(), Err(Error::InvalidPath(_))));
        assert!(matches!((0i64, true, -5i64).into_derive_path(), Err(Error::InvalidPath(_))));
        assert!(matches!((0i64, true, 1i64 << 32).into_derive_path(), Err(Error::InvalidPath(_))));
        assert_eq!((1i64, false, 2i64).into_derive_path().unwrap(), DerivePathParams {
            account_index: 1,
            is_external: false,
            address_index: 2,
        });
    }

    #[test]
    fn test_hardened_range() {
        let path = DerivePathParams::new(HARDENED_OFFSET, 0);
        assert!(matches!(path.validate(), Err(Error::InvalidPath(_))));
        assert!(DerivePathParams::new(HARDENED_OFFSET - 1, 0).validate().is_ok());
    }

    #[test]
    fn test_serde_defaults() {
        let path: DerivePathParams = serde_json::from_str(r#"{"accountIndex": 4}"#).unwrap();
        assert_eq!(path, DerivePathParams::new(4, 0));
    }
}
