use std::convert::Infallible;
use std::net::SocketAddr;

use axum::{
    async_trait,
    extract::{ConnectInfo, FromRequestParts},
    http::{request::Parts, HeaderMap},
};

const FALLBACK_IP: &str = "127.0.0.1";

/// Who sent the request, as far as the proxy chain tells us.
#[derive(Debug, Clone)]
pub struct ClientMeta {
    /// Rate-limit key: first `X-Forwarded-For` hop, else the peer address.
    pub ip: String,
    /// Raw `X-Forwarded-For` header, if any.
    pub forwarded_for: Option<String>,
    pub user_agent: Option<String>,
}

impl ClientMeta {
    pub fn from_headers(headers: &HeaderMap, peer: Option<SocketAddr>) -> Self {
        let header_str = |name: &'static str| {
            headers
                .get(name)
                .and_then(|v| v.to_str().ok())
                .map(str::trim)
                .filter(|v| !v.is_empty())
                .map(str::to_string)
        };

        let forwarded_for = header_str("x-forwarded-for");
        let ip = forwarded_for
            .as_deref()
            .and_then(|v| v.split(',').next())
            .map(str::trim)
            .filter(|v| !v.is_empty())
            .map(str::to_string)
            .or_else(|| peer.map(|addr| addr.ip().to_string()))
            .unwrap_or_else(|| FALLBACK_IP.to_string());

        Self {
            ip,
            forwarded_for,
            user_agent: header_str("user-agent"),
        }
    }

    pub fn forwarded_for_display(&self) -> &str {
        self.forwarded_for.as_deref().unwrap_or("Unknown IP")
    }

    pub fn user_agent_display(&self) -> &str {
        self.user_agent.as_deref().unwrap_or("Unknown Browser")
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for ClientMeta
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let peer = parts
            .extensions
            .get::<ConnectInfo<SocketAddr>>()
            .map(|ConnectInfo(addr)| *addr);
        Ok(Self::from_headers(&parts.headers, peer))
    }
}
