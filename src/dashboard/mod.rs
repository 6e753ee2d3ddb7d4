use ethers_core::types::U256;
use log::info;
use std::future::Future;
use thiserror::Error;

use crate::abi;
use crate::rpc::{RpcClient, RpcError};
use crate::valuation::{self, ValuationError};

/// Everything the snapshot fetch needs to know about one deployment: the
/// wallet under inspection plus the contract addresses. All externally
/// supplied; the transport endpoint lives on the `RpcClient`.
#[derive(Debug, Clone)]
pub struct DashboardParams {
    pub wallet: String,
    pub usdc: String,
    pub vault: String,
    pub router: String,
    pub rehedge: String,
    pub sphedge: String,
    pub bondhedge: String,
}

/// One complete, internally consistent set of on-chain reads and their
/// derived valuations. Built fresh per fetch cycle, immutable afterwards.
///
/// Balances and prices are 18-decimal fixed point except the USDC fields,
/// which are 6-decimal. The `*_value_usdc` and total fields are in
/// stable-coin units.
#[derive(Debug, Clone)]
pub struct DashboardSnapshot {
    pub eth_balance: U256,
    pub usdc_balance: U256,
    pub deposits: U256,
    pub pending_yield: U256,
    pub re_balance: U256,
    pub sp_balance: U256,
    pub bond_balance: U256,
    pub re_price: U256,
    pub sp_price: U256,
    pub bond_price: U256,
    pub re_value_usdc: U256,
    pub sp_value_usdc: U256,
    pub bond_value_usdc: U256,
    pub total_hedge_usdc: U256,
    pub total_portfolio: U256,
    pub agent_addr: String,
    pub fee_bps: u32,
    pub yield_bps: u32,
    pub vault_usdc_balance: U256,
}

#[derive(Debug, Error)]
pub enum SnapshotError {
    /// One of the 14 logical reads failed; `field` names which one. The
    /// whole snapshot is abandoned, there is no partial mode.
    #[error("dashboard read `{field}` failed: {source}")]
    Read {
        field: &'static str,
        #[source]
        source: RpcError,
    },
    #[error(transparent)]
    Valuation(#[from] ValuationError),
}

/// Attaches the logical field name to a read's failure so the aggregate
/// error identifies which sub-call sank the snapshot.
async fn tag<T>(
    field: &'static str,
    read: impl Future<Output = Result<T, RpcError>>,
) -> Result<T, SnapshotError> {
    read.await.map_err(|source| SnapshotError::Read { field, source })
}

/// Fetches one dashboard snapshot: 14 independent reads issued concurrently
/// against the same `latest` tag, then the valuation pass.
///
/// The reads have no ordering dependency; results are correlated back to
/// their fields positionally by the `try_join!` destructuring, never by
/// arrival order. The first failed read aborts the batch.
pub async fn fetch_snapshot(
    client: &RpcClient,
    params: &DashboardParams,
) -> Result<DashboardSnapshot, SnapshotError> {
    let wallet = params.wallet.as_str();

    let (
        eth_balance,
        usdc_balance,
        user,
        pending_yield,
        re_balance,
        sp_balance,
        bond_balance,
        re_price,
        sp_price,
        bond_price,
        agent_word,
        fee_word,
        yield_word,
        vault_usdc_balance,
    ) = tokio::try_join!(
        tag("eth_balance", client.eth_get_balance(wallet)),
        tag("usdc_balance", client.balance_of(&params.usdc, wallet)),
        tag("user_record", client.users(&params.vault, wallet)),
        tag("pending_yield", client.pending_yield(&params.vault, wallet)),
        tag("re_balance", client.balance_of(&params.rehedge, wallet)),
        tag("sp_balance", client.balance_of(&params.sphedge, wallet)),
        tag("bond_balance", client.balance_of(&params.bondhedge, wallet)),
        tag("re_price", client.get_price(&params.router, &params.rehedge)),
        tag("sp_price", client.get_price(&params.router, &params.sphedge)),
        tag("bond_price", client.get_price(&params.router, &params.bondhedge)),
        tag(
            "agent_wallet",
            client.read_no_args(&params.vault, abi::sel::AGENT_WALLET)
        ),
        tag(
            "management_fee_bps",
            client.read_no_args(&params.vault, abi::sel::MANAGEMENT_FEE_BPS)
        ),
        tag(
            "annual_yield_bps",
            client.read_no_args(&params.vault, abi::sel::ANNUAL_YIELD_BPS)
        ),
        tag("vault_usdc_balance", client.balance_of(&params.usdc, &params.vault)),
    )?;

    let agent_addr = abi::decode_address_return(&agent_word)
        .map_err(|e| SnapshotError::Read { field: "agent_wallet", source: e.into() })?;
    let fee_bps = abi::decode_uint(&fee_word)
        .map_err(|e| SnapshotError::Read { field: "management_fee_bps", source: e.into() })?
        .low_u32();
    let yield_bps = abi::decode_uint(&yield_word)
        .map_err(|e| SnapshotError::Read { field: "annual_yield_bps", source: e.into() })?
        .low_u32();

    let re_value_usdc = valuation::hedge_value(re_balance, re_price)?;
    let sp_value_usdc = valuation::hedge_value(sp_balance, sp_price)?;
    let bond_value_usdc = valuation::hedge_value(bond_balance, bond_price)?;
    let total_hedge_usdc =
        valuation::total_hedge_value(&[re_value_usdc, sp_value_usdc, bond_value_usdc])?;
    let total_portfolio = valuation::total_portfolio(
        user.deposits,
        pending_yield,
        total_hedge_usdc,
        usdc_balance,
    )?;

    info!("snapshot complete: portfolio {total_portfolio} USDC units");

    Ok(DashboardSnapshot {
        eth_balance,
        usdc_balance,
        deposits: user.deposits,
        pending_yield,
        re_balance,
        sp_balance,
        bond_balance,
        re_price,
        sp_price,
        bond_price,
        re_value_usdc,
        sp_value_usdc,
        bond_value_usdc,
        total_hedge_usdc,
        total_portfolio,
        agent_addr,
        fee_bps,
        yield_bps,
        vault_usdc_balance,
    })
}
