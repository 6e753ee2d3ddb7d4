//! Optional agent analytics lookup against the Supabase REST store.
//!
//! This collaborator is fail-open by contract: the dashboard renders fine
//! without it, so every transport, status or decode failure collapses to
//! `None` instead of surfacing an error.

use log::debug;
use serde::Deserialize;
use url::Url;

#[derive(Debug, Clone, Deserialize)]
pub struct BotStats {
    pub total_compute_cost: f64,
    pub total_gas_cost: f64,
    pub total_revenue: f64,
    pub net_balance: f64,
    pub is_self_sustaining: bool,
    pub autonomous_actions: u64,
    pub transactions_executed: u64,
}

pub async fn fetch_bot_stats(
    http: &reqwest::Client,
    base_url: &str,
    anon_key: &str,
    agent_address: &str,
) -> Option<BotStats> {
    if base_url.is_empty() || anon_key.is_empty() || agent_address.is_empty() {
        return None;
    }

    let mut url = Url::parse(base_url).ok()?.join("/rest/v1/bot_stats").ok()?;
    url.query_pairs_mut()
        .append_pair("agent_address", &format!("eq.{agent_address}"))
        .append_pair("select", "*");

    let response = http
        .get(url)
        .header("apikey", anon_key)
        .header("Authorization", format!("Bearer {anon_key}"))
        .send()
        .await
        .ok()?;

    if !response.status().is_success() {
        debug!("bot stats lookup returned {}", response.status());
        return None;
    }

    let rows: Vec<BotStats> = response.json().await.ok()?;
    rows.into_iter().next()
}
