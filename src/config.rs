use crate::domain::{Address, Decimal, Lamports};
use std::collections::HashMap;
use std::time::Duration;
use thiserror::Error;

pub const DEFAULT_SWAP_API_URL: &str = "https://quote-api.jup.ag/v6";

#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub rpc_endpoint: String,
    pub watched_address: Address,
    pub token_mint: Address,
    pub fee_source_address: Option<Address>,
    pub swap_api_url: String,
    pub total_supply: Decimal,
    pub eligible_percent: Decimal,
    pub min_balance: Lamports,
    pub reserve: Lamports,
    pub slippage_bps: u16,
    pub poll_interval: Duration,
    pub fetch: FetchConfig,
}

/// Pacing and bounds for history collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FetchConfig {
    /// Delay between sequential transaction fetches.
    pub delay: Duration,
    /// Transactions fetched at once. 1 means strictly sequential.
    pub concurrency: usize,
    /// Signatures scanned for the ledger.
    pub signature_limit: usize,
    /// Signatures scanned for the donation feed.
    pub feed_limit: usize,
    /// Wall-clock budget for one collection; partial results after that.
    pub deadline: Duration,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            delay: Duration::from_millis(100),
            concurrency: 1,
            signature_limit: 100,
            feed_limit: 25,
            deadline: Duration::from_secs(60),
        }
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    MissingEnv(String),
    #[error("Invalid value for {0}: {1}")]
    InvalidValue(String, String),
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_env_map(std::env::vars().collect())
    }

    pub fn from_env_map(env_map: HashMap<String, String>) -> Result<Self, ConfigError> {
        let port = parse_or(&env_map, "PORT", "8080", "must be a valid u16")?;

        let rpc_endpoint = required(&env_map, "RPC_ENDPOINT")?;
        let watched_address = parse_address(&env_map, "WATCHED_ADDRESS")?;
        let token_mint = parse_address(&env_map, "TOKEN_MINT")?;
        let fee_source_address = match env_map.get("FEE_SOURCE_ADDRESS").map(|s| s.trim()) {
            Some(s) if !s.is_empty() => Some(parse_address(&env_map, "FEE_SOURCE_ADDRESS")?),
            _ => None,
        };

        let swap_api_url = env_map
            .get("SWAP_API_URL")
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| DEFAULT_SWAP_API_URL.to_string());

        let total_supply = parse_decimal(&env_map, "TOTAL_SUPPLY", "1000000000")?;
        if total_supply.is_zero() {
            return Err(ConfigError::InvalidValue(
                "TOTAL_SUPPLY".to_string(),
                "must be greater than zero".to_string(),
            ));
        }
        let eligible_percent = parse_decimal(&env_map, "ELIGIBLE_PERCENT", "0.5")?;
        let min_balance = parse_sol(&env_map, "MIN_BALANCE_SOL", "0.1")?;
        let reserve = parse_sol(&env_map, "RESERVE_SOL", "0.02")?;
        let slippage_bps = parse_or(&env_map, "SLIPPAGE_BPS", "50", "must be a valid u16")?;

        let poll_secs: u64 =
            parse_or(&env_map, "POLL_INTERVAL_SECS", "900", "must be a valid u64")?;
        if poll_secs == 0 {
            return Err(ConfigError::InvalidValue(
                "POLL_INTERVAL_SECS".to_string(),
                "must be greater than zero".to_string(),
            ));
        }

        let fetch = parse_fetch_config(&env_map)?;

        Ok(Config {
            port,
            rpc_endpoint,
            watched_address,
            token_mint,
            fee_source_address,
            swap_api_url,
            total_supply,
            eligible_percent,
            min_balance,
            reserve,
            slippage_bps,
            poll_interval: Duration::from_secs(poll_secs),
            fetch,
        })
    }
}

fn parse_fetch_config(env_map: &HashMap<String, String>) -> Result<FetchConfig, ConfigError> {
    let delay_ms: u64 = parse_or(env_map, "FETCH_DELAY_MS", "100", "must be a valid u64")?;
    let concurrency: usize =
        parse_or(env_map, "FETCH_CONCURRENCY", "1", "must be a valid usize")?;
    if concurrency == 0 {
        return Err(ConfigError::InvalidValue(
            "FETCH_CONCURRENCY".to_string(),
            "must be at least 1".to_string(),
        ));
    }
    let signature_limit = parse_limit(env_map, "SIGNATURE_LIMIT", "100")?;
    let feed_limit = parse_limit(env_map, "FEED_LIMIT", "25")?;
    let deadline_secs: u64 =
        parse_or(env_map, "SCAN_DEADLINE_SECS", "60", "must be a valid u64")?;
    if deadline_secs == 0 {
        return Err(ConfigError::InvalidValue(
            "SCAN_DEADLINE_SECS".to_string(),
            "must be greater than zero".to_string(),
        ));
    }

    Ok(FetchConfig {
        delay: Duration::from_millis(delay_ms),
        concurrency,
        signature_limit,
        feed_limit,
        deadline: Duration::from_secs(deadline_secs),
    })
}

fn required(env_map: &HashMap<String, String>, key: &str) -> Result<String, ConfigError> {
    env_map
        .get(key)
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .ok_or_else(|| ConfigError::MissingEnv(key.to_string()))
}

fn parse_or<T: std::str::FromStr>(
    env_map: &HashMap<String, String>,
    key: &str,
    default: &str,
    expectation: &str,
) -> Result<T, ConfigError> {
    env_map
        .get(key)
        .map(|s| s.trim())
        .unwrap_or(default)
        .parse::<T>()
        .map_err(|_| ConfigError::InvalidValue(key.to_string(), expectation.to_string()))
}

fn parse_address(env_map: &HashMap<String, String>, key: &str) -> Result<Address, ConfigError> {
    let raw = required(env_map, key)?;
    Address::parse(&raw).map_err(|e| ConfigError::InvalidValue(key.to_string(), e.to_string()))
}

fn parse_decimal(
    env_map: &HashMap<String, String>,
    key: &str,
    default: &str,
) -> Result<Decimal, ConfigError> {
    let value: Decimal = parse_or(env_map, key, default, "must be a decimal number")?;
    if value.is_negative() {
        return Err(ConfigError::InvalidValue(
            key.to_string(),
            "must not be negative".to_string(),
        ));
    }
    Ok(value)
}

fn parse_sol(
    env_map: &HashMap<String, String>,
    key: &str,
    default: &str,
) -> Result<Lamports, ConfigError> {
    let sol = parse_decimal(env_map, key, default)?;
    Lamports::from_sol_floor(sol)
        .ok_or_else(|| ConfigError::InvalidValue(key.to_string(), "out of range".to_string()))
}

fn parse_limit(
    env_map: &HashMap<String, String>,
    key: &str,
    default: &str,
) -> Result<usize, ConfigError> {
    let limit: usize = parse_or(env_map, key, default, "must be a valid usize")?;
    if !(1..=1000).contains(&limit) {
        return Err(ConfigError::InvalidValue(
            key.to_string(),
            "must be between 1 and 1000".to_string(),
        ));
    }
    Ok(limit)
}

#[cfg(test)]
mod tests {
    use super::*;

    const WATCHED: &str = "3K2bFxQp5s7FgmXHbFvzgunLRzDnUL7vTVbwQAAWX3yr";
    const MINT: &str = "BgLBeZz9SnHgLVHobQWsgdrjTSnW2mbtqJfMokEvpump";

    fn setup_required_env() -> HashMap<String, String> {
        let mut map = HashMap::new();
        map.insert(
            "RPC_ENDPOINT".to_string(),
            "https://api.mainnet-beta.solana.com".to_string(),
        );
        map.insert("WATCHED_ADDRESS".to_string(), WATCHED.to_string());
        map.insert("TOKEN_MINT".to_string(), MINT.to_string());
        map
    }

    #[test]
    fn test_defaults() {
        let config = Config::from_env_map(setup_required_env()).unwrap();
        assert_eq!(config.port, 8080);
        assert_eq!(config.watched_address.as_str(), WATCHED);
        assert_eq!(config.fee_source_address, None);
        assert_eq!(config.swap_api_url, DEFAULT_SWAP_API_URL);
        assert_eq!(config.total_supply, Decimal::from(1_000_000_000u64));
        assert_eq!(config.min_balance, Lamports::new(100_000_000));
        assert_eq!(config.reserve, Lamports::new(20_000_000));
        assert_eq!(config.slippage_bps, 50);
        assert_eq!(config.poll_interval, Duration::from_secs(900));
        assert_eq!(config.fetch, FetchConfig::default());
    }

    #[test]
    fn test_missing_rpc_endpoint() {
        let mut env_map = setup_required_env();
        env_map.remove("RPC_ENDPOINT");
        match Config::from_env_map(env_map) {
            Err(ConfigError::MissingEnv(s)) => assert_eq!(s, "RPC_ENDPOINT"),
            _ => panic!("Expected MissingEnv error"),
        }
    }

    #[test]
    fn test_missing_watched_address() {
        let mut env_map = setup_required_env();
        env_map.insert("WATCHED_ADDRESS".to_string(), "  ".to_string());
        match Config::from_env_map(env_map) {
            Err(ConfigError::MissingEnv(s)) => assert_eq!(s, "WATCHED_ADDRESS"),
            _ => panic!("Expected MissingEnv error"),
        }
    }

    #[test]
    fn test_invalid_token_mint() {
        let mut env_map = setup_required_env();
        env_map.insert("TOKEN_MINT".to_string(), "not-an-address".to_string());
        match Config::from_env_map(env_map) {
            Err(ConfigError::InvalidValue(k, _)) => assert_eq!(k, "TOKEN_MINT"),
            _ => panic!("Expected InvalidValue error"),
        }
    }

    #[test]
    fn test_fee_source_parsed_when_present() {
        let mut env_map = setup_required_env();
        env_map.insert(
            "FEE_SOURCE_ADDRESS".to_string(),
            "62qc2CNXwrYqQScmEdiZFFAnJR262PxWEuNQtxfafNgV".to_string(),
        );
        let config = Config::from_env_map(env_map).unwrap();
        assert_eq!(
            config.fee_source_address.map(|a| a.to_string()).as_deref(),
            Some("62qc2CNXwrYqQScmEdiZFFAnJR262PxWEuNQtxfafNgV")
        );
    }

    #[test]
    fn test_zero_total_supply_rejected() {
        let mut env_map = setup_required_env();
        env_map.insert("TOTAL_SUPPLY".to_string(), "0".to_string());
        match Config::from_env_map(env_map) {
            Err(ConfigError::InvalidValue(k, _)) => assert_eq!(k, "TOTAL_SUPPLY"),
            _ => panic!("Expected InvalidValue error"),
        }
    }

    #[test]
    fn test_negative_reserve_rejected() {
        let mut env_map = setup_required_env();
        env_map.insert("RESERVE_SOL".to_string(), "-0.5".to_string());
        match Config::from_env_map(env_map) {
            Err(ConfigError::InvalidValue(k, _)) => assert_eq!(k, "RESERVE_SOL"),
            _ => panic!("Expected InvalidValue error"),
        }
    }

    #[test]
    fn test_invalid_port() {
        let mut env_map = setup_required_env();
        env_map.insert("PORT".to_string(), "not_a_number".to_string());
        match Config::from_env_map(env_map) {
            Err(ConfigError::InvalidValue(k, _)) => assert_eq!(k, "PORT"),
            _ => panic!("Expected InvalidValue error"),
        }
    }

    #[test]
    fn test_zero_concurrency_rejected() {
        let mut env_map = setup_required_env();
        env_map.insert("FETCH_CONCURRENCY".to_string(), "0".to_string());
        match Config::from_env_map(env_map) {
            Err(ConfigError::InvalidValue(k, _)) => assert_eq!(k, "FETCH_CONCURRENCY"),
            _ => panic!("Expected InvalidValue error"),
        }
    }

    #[test]
    fn test_signature_limit_bounds() {
        let mut env_map = setup_required_env();
        env_map.insert("SIGNATURE_LIMIT".to_string(), "1001".to_string());
        match Config::from_env_map(env_map) {
            Err(ConfigError::InvalidValue(k, _)) => assert_eq!(k, "SIGNATURE_LIMIT"),
            _ => panic!("Expected InvalidValue error"),
        }
    }
}
