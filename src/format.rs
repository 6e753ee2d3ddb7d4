//! Display formatting for raw snapshot fields. Everything here is
//! presentation only; no derived value flows back into the pipeline.

use ethers_core::types::U256;

/// 6-decimal USDC amount rendered with two fraction digits and
/// thousands-grouping, e.g. `1,234,567.89`.
pub fn format_usdc(raw: U256) -> String {
    format_rounded(raw, 6, 2)
}

/// 18-decimal native balance, fraction truncated to six digits.
pub fn format_eth(wei: U256) -> String {
    let scale = U256::exp10(18);
    let whole = wei / scale;
    // the remainder is below 10^18, so it fits a u64
    let frac = format!("{:018}", (wei % scale).low_u64());
    format!("{}.{}", whole, &frac[..6])
}

/// 18-decimal hedge-token amount with four fraction digits and grouping.
pub fn format_hedge(raw: U256) -> String {
    format_rounded(raw, 18, 4)
}

/// `0x1234...abcd` address shortening; `--` when there is nothing to show.
pub fn trunc_addr(addr: &str) -> String {
    if addr.is_empty() {
        return "--".to_string();
    }
    if addr.len() < 12 {
        return addr.to_string();
    }
    format!("{}...{}", &addr[..6], &addr[addr.len() - 4..])
}

/// Rounds a fixed-point integer half-up to `frac_digits` and renders it
/// with a grouped whole part.
fn format_rounded(raw: U256, decimals: u32, frac_digits: u32) -> String {
    let scale = U256::exp10(decimals as usize);
    let unit = U256::exp10((decimals - frac_digits) as usize);
    let rounded = raw.checked_add(unit / 2u64).unwrap_or(raw);
    let whole = rounded / scale;
    // below 10^frac_digits by construction
    let frac = ((rounded % scale) / unit).low_u64();
    format!(
        "{}.{:0width$}",
        group_thousands(&whole.to_string()),
        frac,
        width = frac_digits as usize
    )
}

fn group_thousands(digits: &str) -> String {
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(c);
    }
    grouped
}
