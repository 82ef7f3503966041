use std::net::IpAddr;
use thiserror::Error;
use url::Url;

/// Errors that can occur during endpoint URL validation.
#[derive(Error, Debug)]
pub enum UrlValidationError {
    /// The URL string could not be parsed.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),
    /// The URL uses a scheme other than http or https.
    #[error("Unsupported scheme: {0} (only http/https allowed)")]
    UnsupportedScheme(String),
    /// Plain HTTP to a remote host would expose requests and the signer token.
    #[error("Insecure endpoint: HTTPS required (except localhost for testing)")]
    InsecureEndpoint,
}

/// Validates an RPC or signer endpoint URL.
///
/// Accepts `https://` for any host and `http://` only for loopback hosts
/// (`localhost`, `127.0.0.1`, `::1`), which local nodes and tests use.
///
/// # Examples
///
/// ```
/// use guestbook::util::validate_endpoint;
///
/// assert!(validate_endpoint("https://rpc.testnet.near.org").is_ok());
/// assert!(validate_endpoint("http://127.0.0.1:3030").is_ok());
/// assert!(validate_endpoint("http://rpc.example.com").is_err());
/// assert!(validate_endpoint("file:///etc/passwd").is_err());
/// ```
pub fn validate_endpoint(url_str: &str) -> Result<Url, UrlValidationError> {
    let url = Url::parse(url_str)?;

    match url.scheme() {
        "https" => Ok(url),
        "http" if is_loopback_host(&url) => {
            tracing::warn!(url = %url, "Using non-HTTPS endpoint (localhost only)");
            Ok(url)
        }
        "http" => Err(UrlValidationError::InsecureEndpoint),
        scheme => Err(UrlValidationError::UnsupportedScheme(scheme.to_owned())),
    }
}

fn is_loopback_host(url: &Url) -> bool {
    let Some(host) = url.host_str() else {
        return false;
    };
    if host == "localhost" {
        return true;
    }

    // Strip brackets from IPv6 addresses for parsing
    let host_for_parse = host
        .strip_prefix('[')
        .and_then(|h| h.strip_suffix(']'))
        .unwrap_or(host);

    host_for_parse
        .parse::<IpAddr>()
        .is_ok_and(|ip| ip.is_loopback())
}
