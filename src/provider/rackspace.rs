//! Rackspace Cloud Load Balancers client.
//!
//! # Responsibilities
//! - Authenticate once against Identity v2.0 and keep the token
//! - Resolve regional API endpoints from the service catalog
//! - Page through balancer listings (`limit` / `marker`)
//! - Map HTTP failures onto `ProviderError`
//! - Retry idempotent reads with backoff

use std::collections::BTreeMap;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::ACCEPT;
use reqwest::{Client, Method, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use url::Url;

use crate::config::ClbConfig;
use crate::credentials::Credentials;
use crate::provider::types::{
    Balancer, BalancerDescriptor, Member, NewMember, ProviderError, ProviderResult, Region,
};
use crate::provider::LoadBalancerProvider;
use crate::resilience::retries::{is_retryable_error, is_retryable_status, RetryPolicy};

/// Catalog entry that carries the load balancer endpoints.
const SERVICE_NAME: &str = "cloudLoadBalancers";
const AUTH_TOKEN_HEADER: &str = "X-Auth-Token";
/// Largest page the listing API hands out.
const PAGE_LIMIT: usize = 100;

#[derive(Deserialize)]
struct AuthResponse {
    access: Access,
}

#[derive(Deserialize)]
struct Access {
    token: Token,
    #[serde(rename = "serviceCatalog", default)]
    service_catalog: Vec<CatalogService>,
}

#[derive(Deserialize)]
struct Token {
    id: String,
}

#[derive(Deserialize)]
struct CatalogService {
    name: String,
    #[serde(default)]
    endpoints: Vec<CatalogEndpoint>,
}

#[derive(Deserialize)]
struct CatalogEndpoint {
    #[serde(default)]
    region: Option<String>,
    #[serde(rename = "publicURL")]
    public_url: String,
}

#[derive(Deserialize)]
struct BalancerList {
    #[serde(rename = "loadBalancers", default)]
    load_balancers: Vec<BalancerRecord>,
}

#[derive(Deserialize)]
struct BalancerEnvelope {
    #[serde(rename = "loadBalancer")]
    load_balancer: BalancerRecord,
}

#[derive(Deserialize)]
struct BalancerRecord {
    #[serde(deserialize_with = "opaque_id")]
    id: String,
    name: String,
    #[serde(default)]
    status: Option<String>,
}

#[derive(Deserialize)]
struct NodeList {
    #[serde(default)]
    nodes: Vec<NodeRecord>,
}

#[derive(Deserialize)]
struct NodeRecord {
    #[serde(deserialize_with = "opaque_id")]
    id: String,
    address: String,
    port: u16,
    #[serde(default)]
    condition: Option<String>,
}

impl From<NodeRecord> for Member {
    fn from(node: NodeRecord) -> Self {
        Member {
            id: node.id,
            ip: node.address,
            port: node.port,
            condition: node.condition,
        }
    }
}

#[derive(Serialize)]
struct NewNodes<'a> {
    nodes: Vec<NewNode<'a>>,
}

#[derive(Serialize)]
struct NewNode<'a> {
    address: &'a str,
    port: u16,
    condition: &'a str,
}

/// Ids arrive as JSON numbers; keep them as opaque strings.
fn opaque_id<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    match Value::deserialize(deserializer)? {
        Value::String(s) => Ok(s),
        Value::Number(n) => Ok(n.to_string()),
        other => Err(serde::de::Error::custom(format!(
            "expected a string or number id, got {}",
            other
        ))),
    }
}

/// Rackspace implementation of [`LoadBalancerProvider`].
pub struct RackspaceProvider {
    client: Client,
    token: String,
    endpoints: BTreeMap<Region, Url>,
    retry: RetryPolicy,
}

impl RackspaceProvider {
    /// Authenticate and build a client for every region in the catalog.
    pub async fn connect(config: &ClbConfig, credentials: &Credentials) -> ProviderResult<Self> {
        let client = Client::builder()
            .connect_timeout(Duration::from_secs(config.timeouts.connect_secs))
            .timeout(Duration::from_secs(config.timeouts.request_secs))
            .user_agent(concat!("clb/", env!("CARGO_PKG_VERSION")))
            .build()?;

        let tokens_url = tokens_url(&config.provider.identity_url)?;
        let access = authenticate(&client, tokens_url, credentials).await?;
        let endpoints = regional_endpoints(&access.service_catalog);

        tracing::info!(
            username = credentials.username(),
            regions = ?endpoints.keys().map(Region::as_str).collect::<Vec<_>>(),
            "Authenticated with identity service"
        );

        Ok(Self {
            client,
            token: access.token.id,
            endpoints,
            retry: RetryPolicy::from_config(&config.retries),
        })
    }

    /// Regions the catalog offers a load balancer endpoint for.
    pub fn regions(&self) -> impl Iterator<Item = Region> + '_ {
        self.endpoints.keys().copied()
    }

    fn url(&self, region: Region, segments: &[&str]) -> ProviderResult<Url> {
        let mut url = self
            .endpoints
            .get(&region)
            .cloned()
            .ok_or(ProviderError::RegionUnavailable(region))?;
        url.path_segments_mut()
            .map_err(|_| ProviderError::RegionUnavailable(region))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    fn request(&self, method: Method, url: Url) -> RequestBuilder {
        self.client
            .request(method, url)
            .header(AUTH_TOKEN_HEADER, self.token.as_str())
            .header(ACCEPT, "application/json")
    }

    /// GET with retries on transient failures.
    async fn get_json<T: DeserializeOwned>(&self, url: Url) -> ProviderResult<T> {
        let mut attempt = 0;
        loop {
            attempt += 1;
            let result = self.request(Method::GET, url.clone()).send().await;

            let retryable = match &result {
                Ok(response) => is_retryable_status(response.status()),
                Err(e) => is_retryable_error(e),
            };
            if retryable && self.retry.should_retry(attempt) {
                let delay = self.retry.delay(attempt);
                tracing::warn!(
                    url = %url,
                    attempt,
                    delay_ms = delay.as_millis() as u64,
                    "Provider read failed, retrying"
                );
                tokio::time::sleep(delay).await;
                continue;
            }

            let response = ensure_success(result?).await?;
            return decode(response).await;
        }
    }
}

impl std::fmt::Debug for RackspaceProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RackspaceProvider")
            .field("regions", &self.endpoints.keys().collect::<Vec<_>>())
            .field("retry", &self.retry)
            .finish()
    }
}

#[async_trait]
impl LoadBalancerProvider for RackspaceProvider {
    async fn list_balancers(&self, region: Region) -> ProviderResult<Vec<BalancerDescriptor>> {
        let mut balancers = Vec::new();
        let mut marker: Option<String> = None;

        loop {
            let mut url = self.url(region, &["loadbalancers"])?;
            {
                let mut query = url.query_pairs_mut();
                query.append_pair("limit", &PAGE_LIMIT.to_string());
                if let Some(marker) = &marker {
                    query.append_pair("marker", marker);
                }
            }

            let page: BalancerList = self.get_json(url).await?;
            let page_len = page.load_balancers.len();
            let next_marker = page.load_balancers.last().map(|b| b.id.clone());
            balancers.extend(page.load_balancers.into_iter().map(|b| BalancerDescriptor {
                id: b.id,
                name: b.name,
                region,
            }));

            if page_len < PAGE_LIMIT || next_marker == marker {
                break;
            }
            marker = next_marker;
        }

        tracing::debug!(region = %region, count = balancers.len(), "Listed load balancers");
        Ok(balancers)
    }

    async fn get_balancer(&self, region: Region, balancer_id: &str) -> ProviderResult<Balancer> {
        let url = self.url(region, &["loadbalancers", balancer_id])?;
        let envelope: BalancerEnvelope = self.get_json(url).await?;
        let record = envelope.load_balancer;

        Ok(Balancer {
            id: record.id,
            name: record.name,
            region,
            status: record.status.unwrap_or_default(),
        })
    }

    async fn list_members(&self, region: Region, balancer_id: &str) -> ProviderResult<Vec<Member>> {
        let url = self.url(region, &["loadbalancers", balancer_id, "nodes"])?;
        let list: NodeList = self.get_json(url).await?;
        Ok(list.nodes.into_iter().map(Member::from).collect())
    }

    async fn attach_member(
        &self,
        region: Region,
        balancer_id: &str,
        member: &NewMember,
    ) -> ProviderResult<Option<Member>> {
        let url = self.url(region, &["loadbalancers", balancer_id, "nodes"])?;
        let body = NewNodes {
            nodes: vec![NewNode {
                address: &member.ip,
                port: member.port,
                condition: "ENABLED",
            }],
        };

        let response = self.request(Method::POST, url).json(&body).send().await?;
        let response = match ensure_success(response).await {
            Ok(response) => response,
            Err(ProviderError::Api {
                status: 400 | 422,
                message,
            }) if is_duplicate_node(&message) => {
                return Err(ProviderError::Conflict {
                    balancer_id: balancer_id.to_string(),
                    message,
                });
            }
            Err(e) => return Err(e),
        };

        // The node is in the pool once the POST is accepted; the body only
        // tells us its id.
        match decode::<NodeList>(response).await {
            Ok(created) => Ok(created.nodes.into_iter().next().map(Member::from)),
            Err(e) => {
                tracing::debug!(
                    balancer_id,
                    error = %e,
                    "Attach accepted without a readable node listing"
                );
                Ok(None)
            }
        }
    }

    async fn detach_member(
        &self,
        region: Region,
        balancer_id: &str,
        member: &Member,
    ) -> ProviderResult<()> {
        let url = self.url(region, &["loadbalancers", balancer_id, "nodes", member.id.as_str()])?;
        let response = self.request(Method::DELETE, url).send().await?;

        match ensure_success(response).await {
            Ok(_) => Ok(()),
            Err(ProviderError::NotFound(message)) => Err(ProviderError::Conflict {
                balancer_id: balancer_id.to_string(),
                message: format!(
                    "node {} ({}:{}) is no longer in the pool: {}",
                    member.id, member.ip, member.port, message
                ),
            }),
            Err(e) => Err(e),
        }
    }
}

fn tokens_url(identity_url: &str) -> ProviderResult<Url> {
    let mut url = Url::parse(identity_url).map_err(|e| {
        ProviderError::Decode(format!("invalid identity URL '{}': {}", identity_url, e))
    })?;
    url.path_segments_mut()
        .map_err(|_| ProviderError::Decode(format!("invalid identity URL '{}'", identity_url)))?
        .pop_if_empty()
        .push("tokens");
    Ok(url)
}

async fn authenticate(
    client: &Client,
    url: Url,
    credentials: &Credentials,
) -> ProviderResult<Access> {
    let body = serde_json::json!({
        "auth": {
            "RAX-KSKEY:apiKeyCredentials": {
                "username": credentials.username(),
                "apiKey": credentials.api_key(),
            }
        }
    });

    tracing::debug!(url = %url, "Requesting identity token");
    let response = client
        .post(url)
        .header(ACCEPT, "application/json")
        .json(&body)
        .send()
        .await?;
    let response = ensure_success(response).await?;
    let auth: AuthResponse = decode(response).await?;
    Ok(auth.access)
}

fn regional_endpoints(catalog: &[CatalogService]) -> BTreeMap<Region, Url> {
    let mut endpoints = BTreeMap::new();

    let entries = catalog
        .iter()
        .filter(|service| service.name == SERVICE_NAME)
        .flat_map(|service| service.endpoints.iter());

    for entry in entries {
        let Some(code) = entry.region.as_deref() else {
            continue;
        };
        let Ok(region) = code.parse::<Region>() else {
            tracing::debug!(region = code, "Ignoring catalog endpoint for unknown region");
            continue;
        };
        match Url::parse(&entry.public_url) {
            Ok(url) if !url.cannot_be_a_base() => {
                endpoints.insert(region, url);
            }
            _ => {
                tracing::warn!(
                    region = %region,
                    url = %entry.public_url,
                    "Ignoring malformed catalog endpoint"
                );
            }
        }
    }

    endpoints
}

async fn ensure_success(response: Response) -> ProviderResult<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    Err(status_error(status, &body))
}

async fn decode<T: DeserializeOwned>(response: Response) -> ProviderResult<T> {
    let body = response.text().await?;
    serde_json::from_str(&body).map_err(|e| ProviderError::Decode(e.to_string()))
}

fn status_error(status: StatusCode, body: &str) -> ProviderError {
    let mut message = fault_message(body);
    if message.is_empty() {
        message = status.canonical_reason().unwrap_or("no message").to_string();
    }

    match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => ProviderError::Unauthorized(message),
        StatusCode::NOT_FOUND => ProviderError::NotFound(message),
        // Rackspace signals "over limit" with 413.
        StatusCode::PAYLOAD_TOO_LARGE | StatusCode::TOO_MANY_REQUESTS => {
            ProviderError::RateLimited(message)
        }
        _ => ProviderError::Api {
            status: status.as_u16(),
            message,
        },
    }
}

/// Pull a human-readable message out of a fault body.
///
/// Faults come either flat (`{"message": ..}`) or wrapped in a named
/// object (`{"itemNotFound": {"message": ..}}`).
fn fault_message(body: &str) -> String {
    let Ok(value) = serde_json::from_str::<Value>(body) else {
        return body.trim().to_string();
    };

    let direct = value.get("message").and_then(Value::as_str);
    let nested = || {
        value
            .as_object()?
            .values()
            .find_map(|v| v.get("message").and_then(Value::as_str))
    };

    match direct.or_else(nested) {
        Some(message) => message.to_string(),
        None => body.trim().to_string(),
    }
}

fn is_duplicate_node(message: &str) -> bool {
    message.to_ascii_lowercase().contains("duplicate")
}
