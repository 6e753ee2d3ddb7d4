use ethers_core::types::U256;
use serde_json::{json, Value};
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};

use clawvault::abi::{self, sel};
use clawvault::dashboard::{fetch_snapshot, DashboardParams, SnapshotError};
use clawvault::rpc::{RpcClient, RpcError};

const WALLET: &str = "0x1111111111111111111111111111111111111111";
const USDC: &str = "0x0e233cb8b535de5fb9af47516df02f5b0db46ebd";
const VAULT: &str = "0xfa448bc02f6001ec3c0433f29ed55d04d994bd76";
const ROUTER: &str = "0x349c43fff432059c968ae81f297136faa0e2e342";
const REHEDGE: &str = "0x14a47990a725e5bfdb56773af5650bd4cf6613fd";
const SPHEDGE: &str = "0xfec612566550f6908a20bc39cb548181470bfb2a";
const BONDHEDGE: &str = "0xa312664238ea24bee9289629bb231d6dd1fc982f";
const AGENT: &str = "0x2222222222222222222222222222222222222222";

const ONE_ETH: u64 = 1_000_000_000_000_000_000;
const TWO_ETH: u64 = 2_000_000_000_000_000_000;

fn params() -> DashboardParams {
    DashboardParams {
        wallet: WALLET.into(),
        usdc: USDC.into(),
        vault: VAULT.into(),
        router: ROUTER.into(),
        rehedge: REHEDGE.into(),
        sphedge: SPHEDGE.into(),
        bondhedge: BONDHEDGE.into(),
    }
}

fn word(value: u64) -> String {
    format!("0x{value:064x}")
}

// ---------------------------------------------------------------------------
// Minimal HTTP/1.1 JSON-RPC server for exercising the real transport.
// One request per connection; the responder maps a parsed request envelope
// to a full response body.
// ---------------------------------------------------------------------------

type Responder = Arc<dyn Fn(&Value) -> Value + Send + Sync>;

async fn spawn_rpc_server(responder: Responder) -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        loop {
            let (stream, _) = match listener.accept().await {
                Ok(conn) => conn,
                Err(_) => break,
            };
            let responder = responder.clone();
            tokio::spawn(async move {
                serve_one(stream, responder).await;
            });
        }
    });
    addr
}

async fn serve_one(mut stream: TcpStream, responder: Responder) {
    let Some(request) = read_http_request(&mut stream).await else {
        return;
    };
    let body = responder(&request).to_string();
    let response = format!(
        "HTTP/1.1 200 OK\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
        body.len(),
        body
    );
    let _ = stream.write_all(response.as_bytes()).await;
    let _ = stream.shutdown().await;
}

/// A server that answers every request with the same raw body, for
/// simulating endpoints that return something other than JSON.
async fn spawn_raw_server(body: &'static str) -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        loop {
            let (mut stream, _) = match listener.accept().await {
                Ok(conn) => conn,
                Err(_) => break,
            };
            tokio::spawn(async move {
                if read_http_request(&mut stream).await.is_some() {
                    let response = format!(
                        "HTTP/1.1 200 OK\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                        body.len(),
                        body
                    );
                    let _ = stream.write_all(response.as_bytes()).await;
                    let _ = stream.shutdown().await;
                }
            });
        }
    });
    addr
}

async fn read_http_request(stream: &mut TcpStream) -> Option<Value> {
    let mut buf = Vec::new();
    let mut chunk = [0u8; 1024];
    let header_end = loop {
        let n = stream.read(&mut chunk).await.ok()?;
        if n == 0 {
            return None;
        }
        buf.extend_from_slice(&chunk[..n]);
        if let Some(pos) = find_subslice(&buf, b"\r\n\r\n") {
            break pos + 4;
        }
    };

    let headers = String::from_utf8_lossy(&buf[..header_end]).to_lowercase();
    let content_length = headers
        .lines()
        .find_map(|line| line.strip_prefix("content-length:"))
        .and_then(|v| v.trim().parse::<usize>().ok())?;

    while buf.len() < header_end + content_length {
        let n = stream.read(&mut chunk).await.ok()?;
        if n == 0 {
            return None;
        }
        buf.extend_from_slice(&chunk[..n]);
    }
    serde_json::from_slice(&buf[header_end..header_end + content_length]).ok()
}

fn find_subslice(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    haystack
        .windows(needle.len())
        .position(|window| window == needle)
}

// ---------------------------------------------------------------------------
// The happy-path chain state: every read the snapshot issues has an answer.
// ---------------------------------------------------------------------------

fn scenario_result(to: &str, data: &str) -> String {
    let wallet_word = abi::encode_address_arg(WALLET).unwrap();
    let vault_word = abi::encode_address_arg(VAULT).unwrap();

    if to == USDC && data == abi::build_calldata(sel::BALANCE_OF, &[wallet_word]) {
        return word(1_000_000); // 1.00 USDC
    }
    if to == USDC && data == abi::build_calldata(sel::BALANCE_OF, &[vault_word]) {
        return word(1_000_000);
    }
    if to == VAULT && data.starts_with(sel::USERS) {
        return format!("0x{:064x}{:064x}{:064x}", 1_000_000u64, 5_000u64, 0u64);
    }
    if to == VAULT && data.starts_with(sel::PENDING_YIELD) {
        return word(5_000);
    }
    if to == VAULT && data == sel::AGENT_WALLET {
        return format!("0x{}", abi::encode_address_arg(AGENT).unwrap());
    }
    if to == VAULT && data == sel::MANAGEMENT_FEE_BPS {
        return word(100);
    }
    if to == VAULT && data == sel::ANNUAL_YIELD_BPS {
        return word(500);
    }
    if to == ROUTER && data.starts_with(sel::GET_PRICE) {
        return word(TWO_ETH);
    }
    if (to == REHEDGE || to == SPHEDGE || to == BONDHEDGE)
        && data.starts_with(sel::BALANCE_OF)
    {
        return word(ONE_ETH);
    }
    "0x".to_string()
}

fn scenario_responder(req: &Value) -> Value {
    let result = match req["method"].as_str().unwrap_or_default() {
        "eth_getBalance" => json!("0x0de0b6b3a7640000"), // 1 ETH
        "eth_call" => {
            let to = req["params"][0]["to"].as_str().unwrap_or_default();
            let data = req["params"][0]["data"].as_str().unwrap_or_default();
            json!(scenario_result(to, data))
        }
        _ => Value::Null,
    };
    json!({ "jsonrpc": "2.0", "id": req["id"], "result": result })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[test_log::test(tokio::test)]
async fn snapshot_aggregates_all_fourteen_reads() {
    let addr = spawn_rpc_server(Arc::new(scenario_responder)).await;
    let client = RpcClient::new(format!("http://{addr}"));

    let snapshot = fetch_snapshot(&client, &params()).await.unwrap();

    assert_eq!(snapshot.eth_balance, U256::from(ONE_ETH));
    assert_eq!(snapshot.usdc_balance, U256::from(1_000_000u64));
    assert_eq!(snapshot.deposits, U256::from(1_000_000u64));
    assert_eq!(snapshot.pending_yield, U256::from(5_000u64));
    assert_eq!(snapshot.re_balance, U256::from(ONE_ETH));
    assert_eq!(snapshot.re_price, U256::from(TWO_ETH));

    // each hedge position: 1e18 * 2e18 / 1e18 = 2e18
    assert_eq!(snapshot.re_value_usdc, U256::from(TWO_ETH));
    assert_eq!(snapshot.total_hedge_usdc, U256::exp10(18) * 6u64);
    assert_eq!(
        snapshot.total_portfolio,
        U256::exp10(18) * 6u64 + U256::from(2_005_000u64)
    );

    assert_eq!(snapshot.agent_addr, AGENT);
    assert_eq!(snapshot.fee_bps, 100);
    assert_eq!(snapshot.yield_bps, 500);
    assert_eq!(snapshot.vault_usdc_balance, U256::from(1_000_000u64));
}

#[test_log::test(tokio::test)]
async fn one_reverted_read_fails_the_whole_snapshot() {
    let sphedge_price_call =
        abi::build_calldata(sel::GET_PRICE, &[abi::encode_address_arg(SPHEDGE).unwrap()]);
    let responder = Arc::new(move |req: &Value| {
        if req["method"] == "eth_call"
            && req["params"][0]["data"].as_str() == Some(sphedge_price_call.as_str())
        {
            return json!({
                "jsonrpc": "2.0",
                "id": req["id"],
                "error": { "code": 3, "message": "execution reverted" },
            });
        }
        scenario_responder(req)
    });

    let addr = spawn_rpc_server(responder).await;
    let client = RpcClient::new(format!("http://{addr}"));

    match fetch_snapshot(&client, &params()).await {
        Err(SnapshotError::Read { field, source }) => {
            assert_eq!(field, "sp_price");
            match source {
                RpcError::Rpc(message) => assert_eq!(message, "execution reverted"),
                other => panic!("expected RpcError::Rpc, got {other:?}"),
            }
        }
        other => panic!("expected failed snapshot, got {other:?}"),
    }
}

#[test_log::test(tokio::test)]
async fn unreachable_endpoint_is_a_transport_error() {
    // Bind and immediately drop to get a port nothing is listening on.
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let client = RpcClient::new(format!("http://{addr}"));
    let err = client.eth_get_balance(WALLET).await.unwrap_err();
    assert!(matches!(err, RpcError::Transport(_)));

    // The orchestrator surfaces the same failure as a failed snapshot.
    assert!(matches!(
        fetch_snapshot(&client, &params()).await,
        Err(SnapshotError::Read { .. })
    ));
}

#[test_log::test(tokio::test)]
async fn non_json_body_is_a_transport_error() {
    let addr = spawn_raw_server("this is not json").await;
    let client = RpcClient::new(format!("http://{addr}"));
    let err = client.eth_get_balance(WALLET).await.unwrap_err();
    assert!(matches!(err, RpcError::Transport(_)));
}

#[test_log::test(tokio::test)]
async fn concurrent_requests_get_distinct_monotone_ids() {
    let seen_ids: Arc<Mutex<Vec<u64>>> = Arc::new(Mutex::new(Vec::new()));
    let recorder = seen_ids.clone();
    let responder = Arc::new(move |req: &Value| {
        recorder.lock().unwrap().push(req["id"].as_u64().unwrap());
        json!({ "jsonrpc": "2.0", "id": req["id"], "result": "0x0" })
    });

    let addr = spawn_rpc_server(responder).await;
    let client = RpcClient::new(format!("http://{addr}"));

    let calls: Vec<_> = (0..20).map(|_| client.eth_get_balance(WALLET)).collect();
    let results = futures::future::join_all(calls).await;
    for result in results {
        assert_eq!(result.unwrap(), U256::zero());
    }

    let mut ids = seen_ids.lock().unwrap().clone();
    ids.sort_unstable();
    // Ids start at 1 and are never shared or skipped, however the batch
    // interleaved on the wire.
    assert_eq!(ids, (1..=20).collect::<Vec<u64>>());
}

#[test_log::test(tokio::test)]
async fn rpc_error_without_message_still_fails_closed() {
    let responder = Arc::new(|req: &Value| {
        json!({ "jsonrpc": "2.0", "id": req["id"], "error": { "code": -32000 } })
    });
    let addr = spawn_rpc_server(responder).await;
    let client = RpcClient::new(format!("http://{addr}"));

    let err = client.eth_get_balance(WALLET).await.unwrap_err();
    assert!(matches!(err, RpcError::Rpc(_)));
}
