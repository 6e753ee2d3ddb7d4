use anyhow::{anyhow, Result};
use log::info;

use clawvault::{
    constants::Env,
    dashboard::fetch_snapshot,
    format::{format_eth, format_hedge, format_usdc, trunc_addr},
    plan::generate_plan,
    rpc::RpcClient,
    stats::fetch_bot_stats,
    utils::setup_logger,
};

#[tokio::main]
async fn main() -> Result<()> {
    dotenv::dotenv().ok();
    setup_logger()?;

    let env = Env::new();
    if env.wallet.is_empty() {
        return Err(anyhow!("WALLET_ADDRESS is not set"));
    }

    let client = RpcClient::new(&env.rpc_url);
    let params = env.dashboard_params();

    info!(
        "fetching dashboard snapshot for {} via {}",
        trunc_addr(&env.wallet),
        client.endpoint()
    );
    let snapshot = fetch_snapshot(&client, &params).await?;

    println!("wallet            {}", trunc_addr(&params.wallet));
    println!("ETH balance       {}", format_eth(snapshot.eth_balance));
    println!("USDC balance      {}", format_usdc(snapshot.usdc_balance));
    println!("vault deposits    {}", format_usdc(snapshot.deposits));
    println!("pending yield     {}", format_usdc(snapshot.pending_yield));
    println!(
        "RE hedge          {} @ {} = {} USDC",
        format_hedge(snapshot.re_balance),
        format_hedge(snapshot.re_price),
        format_usdc(snapshot.re_value_usdc)
    );
    println!(
        "S&P hedge         {} @ {} = {} USDC",
        format_hedge(snapshot.sp_balance),
        format_hedge(snapshot.sp_price),
        format_usdc(snapshot.sp_value_usdc)
    );
    println!(
        "bond hedge        {} @ {} = {} USDC",
        format_hedge(snapshot.bond_balance),
        format_hedge(snapshot.bond_price),
        format_usdc(snapshot.bond_value_usdc)
    );
    println!("total hedge       {} USDC", format_usdc(snapshot.total_hedge_usdc));
    println!("total portfolio   {} USDC", format_usdc(snapshot.total_portfolio));
    println!("vault USDC        {}", format_usdc(snapshot.vault_usdc_balance));
    println!("agent wallet      {}", trunc_addr(&snapshot.agent_addr));
    println!("management fee    {} bps", snapshot.fee_bps);
    println!("annual yield      {} bps", snapshot.yield_bps);

    if let (Some(url), Some(key)) = (&env.supabase_url, &env.supabase_anon_key) {
        let http = reqwest::Client::new();
        match fetch_bot_stats(&http, url, key, &snapshot.agent_addr).await {
            Some(stats) => {
                println!("agent actions     {}", stats.autonomous_actions);
                println!("agent txs         {}", stats.transactions_executed);
                println!("agent net balance {:.6}", stats.net_balance);
                println!(
                    "self-sustaining   {}",
                    if stats.is_self_sustaining { "yes" } else { "no" }
                );
            }
            None => info!("agent stats unavailable"),
        }
    }

    if let Some(goal) = std::env::args().nth(1) {
        let plan = generate_plan(&goal);
        println!("{}", serde_json::to_string_pretty(&plan)?);
    }

    Ok(())
}
