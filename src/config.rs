//! Pool configuration
//!
//! A pool is identified by its [`PoolId`] and describes its two assets. The
//! fee rate is fixed and not configurable.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::path::Path;

/// Largest decimals value whose scale (10^decimals) fits in u128
pub const MAX_DECIMALS: u8 = 38;

/// Pool identifier
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PoolId(pub String);

impl PoolId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for PoolId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl fmt::Display for PoolId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssetConfig {
    /// Ticker, unique within the pool
    pub symbol: String,

    /// Decimal places of the smallest unit
    #[serde(default = "default_decimals")]
    pub decimals: u8,
}

fn default_decimals() -> u8 {
    18
}

impl AssetConfig {
    pub fn new(symbol: &str, decimals: u8) -> Self {
        Self {
            symbol: symbol.to_string(),
            decimals,
        }
    }

    /// Render a smallest-unit amount with this asset's decimals
    ///
    /// Trailing fractional zeros are dropped: 1500000000000000000 with 18
    /// decimals renders as "1.5".
    pub fn format_amount(&self, raw: u128) -> String {
        if self.decimals == 0 || self.decimals > MAX_DECIMALS {
            return raw.to_string();
        }
        let scale = 10u128.pow(self.decimals as u32);
        let whole = raw / scale;
        let frac = raw % scale;
        if frac == 0 {
            return whole.to_string();
        }
        let frac = format!("{:0width$}", frac, width = self.decimals as usize);
        format!("{}.{}", whole, frac.trim_end_matches('0'))
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PoolConfig {
    pub id: PoolId,
    pub asset_a: AssetConfig,
    pub asset_b: AssetConfig,
}

impl PoolConfig {
    /// Config with 18-decimal assets
    pub fn new(id: &str, symbol_a: &str, symbol_b: &str) -> Self {
        Self {
            id: PoolId::from(id),
            asset_a: AssetConfig::new(symbol_a, default_decimals()),
            asset_b: AssetConfig::new(symbol_b, default_decimals()),
        }
    }

    /// Parse and validate a TOML pool description
    pub fn from_toml_str(s: &str) -> Result<Self> {
        let config: Self = toml::from_str(s).context("Failed to parse pool config")?;
        config.validate()?;
        Ok(config)
    }

    /// Load and validate a TOML pool description from disk
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            anyhow::bail!("Pool config file not found: {}", path.display());
        }
        let data = fs::read_to_string(path)
            .with_context(|| format!("Failed to read pool config: {}", path.display()))?;
        Self::from_toml_str(&data)
            .with_context(|| format!("Invalid pool config in: {}", path.display()))
    }

    pub fn validate(&self) -> Result<()> {
        if self.id.0.trim().is_empty() {
            anyhow::bail!("Pool id must not be empty");
        }
        for asset in [&self.asset_a, &self.asset_b] {
            if asset.symbol.trim().is_empty() {
                anyhow::bail!("Asset symbol must not be empty in pool {}", self.id);
            }
            if asset.decimals > MAX_DECIMALS {
                anyhow::bail!(
                    "Asset {} has {} decimals, maximum is {}",
                    asset.symbol,
                    asset.decimals,
                    MAX_DECIMALS
                );
            }
        }
        if self.asset_a.symbol == self.asset_b.symbol {
            anyhow::bail!(
                "Pool {} pairs {} with itself",
                self.id,
                self.asset_a.symbol
            );
        }
        Ok(())
    }
}
