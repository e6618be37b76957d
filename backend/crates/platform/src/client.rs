//! Client identification from request headers.

use std::net::IpAddr;

use axum::http::{HeaderMap, header};

use crate::crypto::sha256;

/// What the server knows about the calling client.
///
/// Sessions are bound to `ua_hash`; a cookie replayed from a different
/// browser does not validate.
#[derive(Debug, Clone)]
pub struct ClientFingerprint {
    /// SHA-256 of the User-Agent header (empty string when absent)
    pub ua_hash: [u8; 32],
    pub ip: Option<IpAddr>,
    pub user_agent: Option<String>,
}

impl ClientFingerprint {
    /// Build from request headers. A missing User-Agent is not an error:
    /// plain HTTP clients (curl, the portal crate) often omit it.
    pub fn from_headers(headers: &HeaderMap, direct_ip: Option<IpAddr>) -> Self {
        let user_agent = headers
            .get(header::USER_AGENT)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);

        Self {
            ua_hash: sha256(user_agent.as_deref().unwrap_or_default().as_bytes()),
            ip: extract_client_ip(headers, direct_ip),
            user_agent,
        }
    }

    pub fn ip_string(&self) -> Option<String> {
        self.ip.map(|ip| ip.to_string())
    }

    /// Key used for per-IP rate limiting.
    pub fn ip_key(&self) -> String {
        self.ip_string().unwrap_or_else(|| "unknown".to_string())
    }
}

/// Client IP: first entry of `X-Forwarded-For`, then `X-Real-IP`, then the
/// socket address.
pub fn extract_client_ip(headers: &HeaderMap, direct_ip: Option<IpAddr>) -> Option<IpAddr> {
    let forwarded = headers
        .get("x-forwarded-for")
        .and_then(|v| v.to_str().ok())
        .and_then(|xff| xff.split(',').next())
        .and_then(|first| first.trim().parse::<IpAddr>().ok());

    let real_ip = || {
        headers
            .get("x-real-ip")
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.trim().parse::<IpAddr>().ok())
    };

    forwarded.or_else(real_ip).or(direct_ip)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn test_fingerprint_hashes_user_agent() {
        let mut headers = HeaderMap::new();
        headers.insert(
            header::USER_AGENT,
            HeaderValue::from_static("Mozilla/5.0 Test Browser"),
        );

        let fp = ClientFingerprint::from_headers(&headers, None);
        assert_eq!(fp.ua_hash, sha256(b"Mozilla/5.0 Test Browser"));
        assert_eq!(fp.user_agent.as_deref(), Some("Mozilla/5.0 Test Browser"));
    }

    #[test]
    fn test_fingerprint_without_user_agent() {
        let fp = ClientFingerprint::from_headers(&HeaderMap::new(), None);
        assert_eq!(fp.ua_hash, sha256(b""));
        assert_eq!(fp.user_agent, None);
        assert_eq!(fp.ip_key(), "unknown");
    }

    #[test]
    fn test_extract_client_ip_xff() {
        let mut headers = HeaderMap::new();
        headers.insert(
            "x-forwarded-for",
            HeaderValue::from_static("192.168.1.1, 10.0.0.1"),
        );

        let ip = extract_client_ip(&headers, None);
        assert_eq!(ip, Some("192.168.1.1".parse().unwrap()));
    }

    #[test]
    fn test_extract_client_ip_real_ip_then_direct() {
        let direct: IpAddr = "127.0.0.1".parse().unwrap();
        let mut headers = HeaderMap::new();
        assert_eq!(extract_client_ip(&headers, Some(direct)), Some(direct));

        headers.insert("x-real-ip", HeaderValue::from_static("10.1.2.3"));
        assert_eq!(
            extract_client_ip(&headers, Some(direct)),
            Some("10.1.2.3".parse().unwrap())
        );
    }
}
