//! Shared utilities for integration testing.

#![allow(dead_code)]

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};

use clb::provider::{
    Balancer, BalancerDescriptor, LoadBalancerProvider, Member, NewMember, ProviderError,
    ProviderResult, Region,
};

// ---------------------------------------------------------------------------
// In-memory provider
// ---------------------------------------------------------------------------

/// A provider call, as recorded by [`RecordingProvider`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    List(Region),
    Get(String),
    Members(String),
    Attach(String, NewMember),
    Detach(String, String),
}

impl Call {
    pub fn is_mutation(&self) -> bool {
        matches!(self, Call::Attach(..) | Call::Detach(..))
    }
}

/// In-memory provider that records every call.
#[derive(Default)]
pub struct RecordingProvider {
    balancers: Vec<BalancerDescriptor>,
    pools: Mutex<HashMap<String, Vec<Member>>>,
    calls: Mutex<Vec<Call>>,
    next_node_id: Mutex<u32>,
    /// Error returned by the next attach instead of mutating.
    pub attach_error: Mutex<Option<ProviderError>>,
}

impl RecordingProvider {
    pub fn new() -> Self {
        Self {
            next_node_id: Mutex::new(1000),
            ..Default::default()
        }
    }

    /// Register a balancer with its initial pool of `(ip, port)` members.
    pub fn with_balancer(
        mut self,
        id: &str,
        name: &str,
        region: Region,
        members: &[(&str, u16)],
    ) -> Self {
        self.balancers.push(BalancerDescriptor {
            id: id.to_string(),
            name: name.to_string(),
            region,
        });
        let pool = members
            .iter()
            .enumerate()
            .map(|(i, (ip, port))| Member {
                id: format!("{}-{}", id, i),
                ip: ip.to_string(),
                port: *port,
                condition: Some("ENABLED".to_string()),
            })
            .collect();
        self.pools.lock().unwrap().insert(id.to_string(), pool);
        self
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    pub fn mutations(&self) -> Vec<Call> {
        self.calls().into_iter().filter(Call::is_mutation).collect()
    }

    pub fn pool(&self, id: &str) -> Vec<Member> {
        self.pools.lock().unwrap().get(id).cloned().unwrap_or_default()
    }

    fn record(&self, call: Call) {
        self.calls.lock().unwrap().push(call);
    }
}

#[async_trait]
impl LoadBalancerProvider for RecordingProvider {
    async fn list_balancers(&self, region: Region) -> ProviderResult<Vec<BalancerDescriptor>> {
        self.record(Call::List(region));
        Ok(self
            .balancers
            .iter()
            .filter(|b| b.region == region)
            .cloned()
            .collect())
    }

    async fn get_balancer(&self, region: Region, balancer_id: &str) -> ProviderResult<Balancer> {
        self.record(Call::Get(balancer_id.to_string()));
        self.balancers
            .iter()
            .find(|b| b.id == balancer_id && b.region == region)
            .map(|b| Balancer {
                id: b.id.clone(),
                name: b.name.clone(),
                region: b.region,
                status: "ACTIVE".to_string(),
            })
            .ok_or_else(|| ProviderError::NotFound(format!("load balancer {}", balancer_id)))
    }

    async fn list_members(
        &self,
        _region: Region,
        balancer_id: &str,
    ) -> ProviderResult<Vec<Member>> {
        self.record(Call::Members(balancer_id.to_string()));
        Ok(self.pool(balancer_id))
    }

    async fn attach_member(
        &self,
        _region: Region,
        balancer_id: &str,
        member: &NewMember,
    ) -> ProviderResult<Option<Member>> {
        self.record(Call::Attach(balancer_id.to_string(), member.clone()));
        if let Some(err) = self.attach_error.lock().unwrap().take() {
            return Err(err);
        }

        let mut next = self.next_node_id.lock().unwrap();
        *next += 1;
        let created = Member {
            id: next.to_string(),
            ip: member.ip.clone(),
            port: member.port,
            condition: Some("ENABLED".to_string()),
        };
        self.pools
            .lock()
            .unwrap()
            .entry(balancer_id.to_string())
            .or_default()
            .push(created.clone());
        Ok(Some(created))
    }

    async fn detach_member(
        &self,
        _region: Region,
        balancer_id: &str,
        member: &Member,
    ) -> ProviderResult<()> {
        self.record(Call::Detach(balancer_id.to_string(), member.id.clone()));
        let mut pools = self.pools.lock().unwrap();
        let pool = pools.entry(balancer_id.to_string()).or_default();
        let before = pool.len();
        pool.retain(|m| m.id != member.id);
        if pool.len() == before {
            return Err(ProviderError::Conflict {
                balancer_id: balancer_id.to_string(),
                message: format!("node {} is no longer in the pool", member.id),
            });
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Mock HTTP API
// ---------------------------------------------------------------------------

/// An HTTP request received by the mock API.
#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub method: String,
    pub path: String,
    pub query: Option<String>,
    pub headers: HashMap<String, String>,
    pub body: String,
}

impl RecordedRequest {
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(&name.to_ascii_lowercase()).map(String::as_str)
    }

    pub fn json(&self) -> serde_json::Value {
        serde_json::from_str(&self.body).unwrap()
    }
}

/// Handle to a running mock API.
pub struct MockApi {
    pub addr: SocketAddr,
    requests: Arc<Mutex<Vec<RecordedRequest>>>,
}

impl MockApi {
    pub fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }

    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub fn requests_matching(&self, method: &str, path: &str) -> Vec<RecordedRequest> {
        self.requests()
            .into_iter()
            .filter(|r| r.method == method && r.path == path)
            .collect()
    }
}

/// Start a programmable mock API on an ephemeral port.
///
/// The handler sees each request plus the server's own address (for building
/// catalog URLs) and returns `(status, json body)`.
pub async fn start_mock_api<F>(handler: F) -> MockApi
where
    F: Fn(&RecordedRequest, SocketAddr) -> (u16, String) + Send + Sync + 'static,
{
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let requests = Arc::new(Mutex::new(Vec::new()));
    let handler = Arc::new(handler);

    let recorded = requests.clone();
    tokio::spawn(async move {
        loop {
            match listener.accept().await {
                Ok((socket, _)) => {
                    let handler = handler.clone();
                    let recorded = recorded.clone();
                    tokio::spawn(async move {
                        serve_connection(socket, addr, handler, recorded).await;
                    });
                }
                Err(_) => break,
            }
        }
    });

    MockApi { addr, requests }
}

async fn serve_connection<F>(
    mut socket: TcpStream,
    addr: SocketAddr,
    handler: Arc<F>,
    recorded: Arc<Mutex<Vec<RecordedRequest>>>,
) where
    F: Fn(&RecordedRequest, SocketAddr) -> (u16, String) + Send + Sync + 'static,
{
    let Some(request) = read_request(&mut socket).await else {
        return;
    };
    recorded.lock().unwrap().push(request.clone());

    let (status, body) = handler(&request, addr);
    let response = format!(
        "HTTP/1.1 {} {}\r\n\
         Content-Type: application/json\r\n\
         Content-Length: {}\r\n\
         Connection: close\r\n\r\n{}",
        status,
        reason(status),
        body.len(),
        body
    );
    let _ = socket.write_all(response.as_bytes()).await;
    let _ = socket.shutdown().await;
}

async fn read_request(socket: &mut TcpStream) -> Option<RecordedRequest> {
    let mut buf = Vec::new();
    let mut chunk = [0u8; 4096];

    let header_end = loop {
        let n = socket.read(&mut chunk).await.ok()?;
        if n == 0 {
            return None;
        }
        buf.extend_from_slice(&chunk[..n]);
        if let Some(pos) = buf.windows(4).position(|w| w == b"\r\n\r\n") {
            break pos;
        }
    };

    let head = String::from_utf8_lossy(&buf[..header_end]).to_string();
    let mut lines = head.split("\r\n");
    let mut request_line = lines.next()?.split_whitespace();
    let method = request_line.next()?.to_string();
    let target = request_line.next()?.to_string();

    let headers: HashMap<String, String> = lines
        .filter_map(|line| line.split_once(':'))
        .map(|(k, v)| (k.trim().to_ascii_lowercase(), v.trim().to_string()))
        .collect();

    let content_length: usize = headers
        .get("content-length")
        .and_then(|v| v.parse().ok())
        .unwrap_or(0);
    let mut body = buf[header_end + 4..].to_vec();
    while body.len() < content_length {
        let n = socket.read(&mut chunk).await.ok()?;
        if n == 0 {
            break;
        }
        body.extend_from_slice(&chunk[..n]);
    }

    let (path, query) = match target.split_once('?') {
        Some((p, q)) => (p.to_string(), Some(q.to_string())),
        None => (target, None),
    };

    Some(RecordedRequest {
        method,
        path,
        query,
        headers,
        body: String::from_utf8_lossy(&body).to_string(),
    })
}

fn reason(status: u16) -> &'static str {
    match status {
        200 => "OK",
        202 => "Accepted",
        400 => "Bad Request",
        401 => "Unauthorized",
        404 => "Not Found",
        413 => "Request Entity Too Large",
        422 => "Unprocessable Entity",
        500 => "Internal Server Error",
        503 => "Service Unavailable",
        _ => "Unknown",
    }
}

/// Tenant id used in every catalog URL served by the mock.
pub const TENANT: &str = "123456";

/// Identity response whose load balancer catalog points back at `addr`.
pub fn identity_response(addr: SocketAddr, regions: &[&str]) -> String {
    let endpoints: Vec<serde_json::Value> = regions
        .iter()
        .map(|r| {
            serde_json::json!({
                "region": r.to_uppercase(),
                "tenantId": TENANT,
                "publicURL": format!("http://{}/{}/v1.0/{}", addr, r, TENANT),
            })
        })
        .collect();

    serde_json::json!({
        "access": {
            "token": { "id": "test-token", "expires": "2030-01-01T00:00:00Z" },
            "serviceCatalog": [
                {
                    "name": "cloudLoadBalancers",
                    "type": "rax:load-balancer",
                    "endpoints": endpoints
                }
            ]
        }
    })
    .to_string()
}

/// Base path of the mock load balancer API for `region`.
pub fn lb_base(region: &str) -> String {
    format!("/{}/v1.0/{}", region, TENANT)
}

/// Listing body for `(id, name)` balancers.
pub fn balancer_list_json(balancers: &[(u32, &str)]) -> String {
    let items: Vec<serde_json::Value> = balancers
        .iter()
        .map(|(id, name)| {
            serde_json::json!({ "id": id, "name": name, "status": "ACTIVE" })
        })
        .collect();
    serde_json::json!({ "loadBalancers": items }).to_string()
}

/// Detail body for one balancer.
pub fn balancer_json(id: u32, name: &str, status: &str) -> String {
    serde_json::json!({
        "loadBalancer": { "id": id, "name": name, "status": status, "nodes": [] }
    })
    .to_string()
}

/// Node listing body for `(id, address, port)` nodes.
pub fn nodes_json(nodes: &[(u32, &str, u16)]) -> String {
    let items: Vec<serde_json::Value> = nodes
        .iter()
        .map(|(id, address, port)| {
            serde_json::json!({
                "id": id,
                "address": address,
                "port": port,
                "condition": "ENABLED",
            })
        })
        .collect();
    serde_json::json!({ "nodes": items }).to_string()
}
