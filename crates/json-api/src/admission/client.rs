//! Client address resolution.

use std::net::IpAddr;

use salvo::{
    Request,
    conn::SocketAddr,
    http::HeaderMap,
};

use greenlight_app::rate_limit::ClientKey;

const X_FORWARDED_FOR: &str = "x-forwarded-for";
const X_REAL_IP: &str = "x-real-ip";

/// Rate limiting key for the client behind `req`: the first `X-Forwarded-For` hop,
/// then `X-Real-IP`, then the peer address.
pub(crate) fn client_key(req: &Request) -> ClientKey {
    forwarded_ip(req.headers())
        .or_else(|| peer_ip(req.remote_addr()))
        .map_or_else(|| ClientKey::new(req.remote_addr().to_string()), ClientKey::from)
}

fn forwarded_ip(headers: &HeaderMap) -> Option<IpAddr> {
    let header_ip = |name| {
        headers
            .get(name)
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.split(',').next())
            .and_then(|first| first.trim().parse::<IpAddr>().ok())
    };

    header_ip(X_FORWARDED_FOR).or_else(|| header_ip(X_REAL_IP))
}

fn peer_ip(addr: &SocketAddr) -> Option<IpAddr> {
    addr.as_ipv4()
        .map(|v4| IpAddr::V4(*v4.ip()))
        .or_else(|| addr.as_ipv6().map(|v6| IpAddr::V6(*v6.ip())))
}
