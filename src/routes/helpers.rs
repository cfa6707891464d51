use actix_web::HttpRequest;

pub const FORWARDED_FOR_HEADER: &str = "X-Forwarded-For";

/// Client address, preferring the first `X-Forwarded-For` hop over the peer.
pub fn client_ip(request: &HttpRequest) -> Option<String> {
    request
        .headers()
        .get(FORWARDED_FOR_HEADER)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(',').next())
        .map(str::trim)
        .filter(|ip| !ip.is_empty())
        .map(str::to_owned)
        .or_else(|| request.peer_addr().map(|addr| addr.ip().to_string()))
}
