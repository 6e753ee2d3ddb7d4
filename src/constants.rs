use crate::dashboard::DashboardParams;

// Sepolia deployment the dashboard ships against. Every value can be
// overridden from the environment.
pub const DEFAULT_RPC_URL: &str = "https://ethereum-sepolia-rpc.publicnode.com";
pub const DEFAULT_USDC: &str = "0x0e233cb8b535de5fb9af47516df02f5b0db46ebd";
pub const DEFAULT_VAULT: &str = "0xfa448bc02f6001ec3c0433f29ed55d04d994bd76";
pub const DEFAULT_ROUTER: &str = "0x349c43fff432059c968ae81f297136faa0e2e342";
pub const DEFAULT_REHEDGE: &str = "0x14a47990a725e5bfdb56773af5650bd4cf6613fd";
pub const DEFAULT_SPHEDGE: &str = "0xfec612566550f6908a20bc39cb548181470bfb2a";
pub const DEFAULT_BONDHEDGE: &str = "0xa312664238ea24bee9289629bb231d6dd1fc982f";

fn get_env(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

#[derive(Debug, Clone)]
pub struct Env {
    pub rpc_url: String,
    pub wallet: String,
    pub usdc: String,
    pub vault: String,
    pub router: String,
    pub rehedge: String,
    pub sphedge: String,
    pub bondhedge: String,
    pub supabase_url: Option<String>,
    pub supabase_anon_key: Option<String>,
}

impl Env {
    pub fn new() -> Self {
        Env {
            rpc_url: get_env("RPC_URL", DEFAULT_RPC_URL),
            wallet: get_env("WALLET_ADDRESS", ""),
            usdc: get_env("USDC_ADDRESS", DEFAULT_USDC),
            vault: get_env("VAULT_ADDRESS", DEFAULT_VAULT),
            router: get_env("ROUTER_ADDRESS", DEFAULT_ROUTER),
            rehedge: get_env("REHEDGE_ADDRESS", DEFAULT_REHEDGE),
            sphedge: get_env("SPHEDGE_ADDRESS", DEFAULT_SPHEDGE),
            bondhedge: get_env("BONDHEDGE_ADDRESS", DEFAULT_BONDHEDGE),
            supabase_url: std::env::var("SUPABASE_URL").ok(),
            supabase_anon_key: std::env::var("SUPABASE_ANON_KEY").ok(),
        }
    }

    pub fn dashboard_params(&self) -> DashboardParams {
        DashboardParams {
            wallet: self.wallet.clone(),
            usdc: self.usdc.clone(),
            vault: self.vault.clone(),
            router: self.router.clone(),
            rehedge: self.rehedge.clone(),
            sphedge: self.sphedge.clone(),
            bondhedge: self.bondhedge.clone(),
        }
    }
}

impl Default for Env {
    fn default() -> Self {
        Self::new()
    }
}
