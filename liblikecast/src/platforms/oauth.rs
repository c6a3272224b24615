//! OAuth 1.0a request signing (HMAC-SHA1)
//!
//! User-context endpoints (identity lookup, liking) require every request to
//! carry an `Authorization: OAuth ...` header signed with the consumer and
//! access-token secrets, as described in RFC 5849 section 3.4.

use base64::{engine::general_purpose::STANDARD, Engine as _};
use hmac::{Hmac, Mac};
use rand::{distributions::Alphanumeric, Rng};
use secrecy::ExposeSecret;
use sha1::Sha1;

use crate::credentials::Credentials;
use crate::platforms::ApiError;

type HmacSha1 = Hmac<Sha1>;

const SIGNATURE_METHOD: &str = "HMAC-SHA1";
const OAUTH_VERSION: &str = "1.0";

/// RFC 3986 percent-encoding (everything but unreserved characters)
pub fn percent_encode(value: &str) -> String {
    urlencoding::encode(value).into_owned()
}

/// Per-request values that must be unique for every signed call
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Nonce {
    pub value: String,
    pub timestamp: i64,
}

impl Nonce {
    /// Random 32-character nonce stamped with the current time
    pub fn generate() -> Self {
        let value = rand::thread_rng()
            .sample_iter(&Alphanumeric)
            .take(32)
            .map(char::from)
            .collect();
        Self {
            value,
            timestamp: chrono::Utc::now().timestamp(),
        }
    }
}

/// Build the signature base string from the method, base URL and all
/// request parameters (query and `oauth_*`)
pub fn signature_base_string(method: &str, url: &str, params: &[(String, String)]) -> String {
    let mut encoded: Vec<(String, String)> = params
        .iter()
        .map(|(k, v)| (percent_encode(k), percent_encode(v)))
        .collect();
    encoded.sort();

    let param_string = encoded
        .iter()
        .map(|(k, v)| format!("{}={}", k, v))
        .collect::<Vec<_>>()
        .join("&");

    format!(
        "{}&{}&{}",
        method.to_uppercase(),
        percent_encode(url),
        percent_encode(&param_string)
    )
}

/// Sign a base string with `consumer_secret&token_secret`
pub fn sign(base_string: &str, consumer_secret: &str, token_secret: &str) -> Result<String, ApiError> {
    let key = format!(
        "{}&{}",
        percent_encode(consumer_secret),
        percent_encode(token_secret)
    );
    let mut mac = HmacSha1::new_from_slice(key.as_bytes())
        .map_err(|e| ApiError::network(format!("Failed to initialise request signer: {}", e)))?;
    mac.update(base_string.as_bytes());
    Ok(STANDARD.encode(mac.finalize().into_bytes()))
}

/// Produce the `Authorization` header value for a user-context request
///
/// `query` holds the URL query parameters; JSON bodies are not part of the
/// signature.
pub fn authorization_header(
    method: &str,
    url: &str,
    query: &[(&str, &str)],
    credentials: &Credentials,
    nonce: &Nonce,
) -> Result<String, ApiError> {
    let timestamp = nonce.timestamp.to_string();
    let oauth_params: Vec<(&str, &str)> = vec![
        ("oauth_consumer_key", credentials.api_key().expose_secret()),
        ("oauth_nonce", nonce.value.as_str()),
        ("oauth_signature_method", SIGNATURE_METHOD),
        ("oauth_timestamp", timestamp.as_str()),
        ("oauth_token", credentials.access_token().expose_secret()),
        ("oauth_version", OAUTH_VERSION),
    ];

    let all_params: Vec<(String, String)> = oauth_params
        .iter()
        .chain(query.iter())
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();

    let base = signature_base_string(method, url, &all_params);
    let signature = sign(
        &base,
        credentials.api_secret().expose_secret(),
        credentials.access_secret().expose_secret(),
    )?;

    let mut header_params = oauth_params;
    header_params.push(("oauth_signature", signature.as_str()));
    header_params.sort();

    let fields = header_params
        .iter()
        .map(|(k, v)| format!("{}=\"{}\"", percent_encode(k), percent_encode(v)))
        .collect::<Vec<_>>()
        .join(", ");

    Ok(format!("OAuth {}", fields))
}
