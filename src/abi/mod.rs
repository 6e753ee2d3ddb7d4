use ethers_core::types::U256;
use thiserror::Error;

/// Precomputed 4-byte function selectors for every contract read the
/// dashboard issues. These must match the deployed vault/router bytecode
/// byte-for-byte; there is no runtime ABI, the selectors are the interface.
pub mod sel {
    pub const BALANCE_OF: &str = "0x70a08231";
    pub const USERS: &str = "0xa87430ba";
    pub const PENDING_YIELD: &str = "0xc7bf1980";
    pub const GET_PRICE: &str = "0x41976e09";
    pub const AGENT_WALLET: &str = "0x3f6dfdbc";
    pub const MANAGEMENT_FEE_BPS: &str = "0x3813c35a";
    pub const ANNUAL_YIELD_BPS: &str = "0xf3a75db9";
}

const WORD_HEX_LEN: usize = 64;
const ADDRESS_HEX_LEN: usize = 40;

#[derive(Debug, Error)]
pub enum AbiError {
    #[error("invalid address `{0}`")]
    InvalidAddress(String),
    #[error("malformed response: {0}")]
    MalformedResponse(String),
}

/// One row of the vault's `users` mapping, decoded from a 96-byte
/// fixed-layout return payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserRecord {
    pub deposits: U256,
    pub pending_yield: U256,
    pub last_drip_timestamp: U256,
}

/// Encodes an address argument as one 32-byte calldata word: strip the
/// optional `0x`, lowercase, left-pad with zeros to 64 hex chars.
pub fn encode_address_arg(addr: &str) -> Result<String, AbiError> {
    let trimmed = addr.strip_prefix("0x").unwrap_or(addr).to_lowercase();
    if trimmed.len() > ADDRESS_HEX_LEN || !trimmed.bytes().all(|b| b.is_ascii_hexdigit()) {
        return Err(AbiError::InvalidAddress(addr.to_string()));
    }
    Ok(format!("{:0>64}", trimmed))
}

/// Concatenates a selector with already-encoded 32-byte argument words.
/// All calldata the crate sends is built here.
pub fn build_calldata(selector: &str, words: &[String]) -> String {
    let mut data = String::with_capacity(selector.len() + words.len() * WORD_HEX_LEN);
    data.push_str(selector);
    for word in words {
        data.push_str(word);
    }
    data
}

/// Decodes a hex return value into an unsigned 256-bit integer. Contracts
/// return empty data for zero-valued reads, so `""` and `"0x"` decode to
/// zero rather than failing.
pub fn decode_uint(hex: &str) -> Result<U256, AbiError> {
    let digits = hex.strip_prefix("0x").unwrap_or(hex);
    if digits.is_empty() {
        return Ok(U256::zero());
    }
    let significant = digits.trim_start_matches('0');
    if significant.len() > WORD_HEX_LEN {
        return Err(AbiError::MalformedResponse(format!(
            "integer wider than one word: {} hex digits",
            significant.len()
        )));
    }
    if significant.is_empty() {
        return Ok(U256::zero());
    }
    U256::from_str_radix(significant, 16)
        .map_err(|_| AbiError::MalformedResponse(format!("not a hex integer: `{hex}`")))
}

/// Decodes the vault's `users(address)` return payload: three words at
/// fixed byte offsets 0, 32 and 64.
pub fn decode_user_record(hex: &str) -> Result<UserRecord, AbiError> {
    let digits = hex.strip_prefix("0x").unwrap_or(hex);
    if digits.len() < 3 * WORD_HEX_LEN {
        return Err(AbiError::MalformedResponse(format!(
            "user record needs {} hex chars, got {}",
            3 * WORD_HEX_LEN,
            digits.len()
        )));
    }
    Ok(UserRecord {
        deposits: decode_uint(&digits[..WORD_HEX_LEN])?,
        pending_yield: decode_uint(&digits[WORD_HEX_LEN..2 * WORD_HEX_LEN])?,
        last_drip_timestamp: decode_uint(&digits[2 * WORD_HEX_LEN..3 * WORD_HEX_LEN])?,
    })
}

/// Extracts an address from a 32-byte return word: the low 20 bytes,
/// re-prefixed with `0x`.
pub fn decode_address_return(hex: &str) -> Result<String, AbiError> {
    let digits = hex.strip_prefix("0x").unwrap_or(hex);
    if digits.len() < ADDRESS_HEX_LEN {
        return Err(AbiError::MalformedResponse(format!(
            "address return needs {} hex chars, got {}",
            ADDRESS_HEX_LEN,
            digits.len()
        )));
    }
    Ok(format!(
        "0x{}",
        digits[digits.len() - ADDRESS_HEX_LEN..].to_lowercase()
    ))
}
