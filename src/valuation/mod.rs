use ethers_core::types::{U256, U512};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ValuationError {
    #[error("arithmetic overflow computing {0}")]
    Overflow(&'static str),
}

/// 18-decimal fixed-point scale shared by hedge balances and router prices.
pub fn wad() -> U256 {
    U256::exp10(18)
}

/// Value of one hedge position in stable-coin units:
/// `balance * price / 10^18`, integer division truncating toward zero.
/// Truncation is the documented rounding policy; sub-unit dust is dropped,
/// never rounded up. The multiply widens to 512 bits so it cannot overflow.
pub fn hedge_value(balance: U256, price: U256) -> Result<U256, ValuationError> {
    let scaled = balance.full_mul(price) / U512::from(wad());
    U256::try_from(scaled).map_err(|_| ValuationError::Overflow("hedge value"))
}

/// Sum of the per-token hedge values.
pub fn total_hedge_value(values: &[U256]) -> Result<U256, ValuationError> {
    values.iter().try_fold(U256::zero(), |acc, v| {
        acc.checked_add(*v)
            .ok_or(ValuationError::Overflow("total hedge value"))
    })
}

/// Total portfolio figure: vault deposits + accrued yield + hedge value +
/// idle stable-coin balance, all already in stable-coin units.
pub fn total_portfolio(
    deposits: U256,
    pending_yield: U256,
    total_hedge: U256,
    stable_balance: U256,
) -> Result<U256, ValuationError> {
    deposits
        .checked_add(pending_yield)
        .and_then(|sum| sum.checked_add(total_hedge))
        .and_then(|sum| sum.checked_add(stable_balance))
        .ok_or(ValuationError::Overflow("total portfolio"))
}
