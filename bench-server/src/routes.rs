//! Fixture route handlers
//!
//! Each handler reproduces one template of the source corpus: extract a
//! request value, run the secret processor, write the derived form to the
//! response and the shared password file. GET on a pipeline route runs the
//! same pipeline as POST; the cookie-flavored crypto route instead serves a
//! companion page and a demonstration cookie on GET.

use axum::body::Bytes;
use axum::extract::{Path, RawQuery, State};
use axum::http::{header, HeaderMap, HeaderValue, StatusCode, Uri};
use axum::response::{Html, IntoResponse, Json, Response};
use tracing::{debug, error};

use bench_core::crypto::{self, CipherInput, CipherSpec};
use bench_core::db::print_results;
use bench_core::error::BenchError;
use bench_core::extract::{self, RequestValue};
use bench_core::session::{self, SESSION_COOKIE};
use bench_core::sink::sensitive_value_line;
use bench_core::token::{self, REMEMBERED_USER};

use crate::AppState;

/// Cookie the cookie-flavored crypto fixture reads (and demonstrates on GET).
pub const CRYPTO_COOKIE_NAME: &str = "cryptoCookie";

/// Marker value the parameter-name fixture scans for: the *name* of the
/// parameter carrying this value becomes the captured request value.
pub const PARAM_MARKER: &str = "cryptoParamMarker";

/// Transformation hardcoded by the cookie-flavored fixture. The other crypto
/// fixtures read theirs from configuration.
const COOKIE_ROUTE_ALG: &str = "DES/CBC/PKCS5Padding";

/// Closing line every completed crypto fixture prints.
const CRYPTO_TRAILER: &str = "Crypto fixture executed<br/>";

/// Error wrapper converting pipeline failures into HTTP 500 responses with
/// the fixed diagnostic in the body, the way the original surfaces fatal
/// crypto and SQL failures.
pub struct AppError(BenchError);

impl<E: Into<BenchError>> From<E> for AppError {
    fn from(err: E) -> Self {
        Self(err.into())
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        error!(error = %self.0, "fixture request failed");
        let body = format!("{}<br/><pre>{:?}</pre>", self.0, self.0);
        (StatusCode::INTERNAL_SERVER_ERROR, Html(body)).into_response()
    }
}

// --- INDEX & HEALTH ---

pub async fn index_handler(State(state): State<AppState>) -> Html<String> {
    let logged = state.sink.secret_line_count().await.unwrap_or(0);
    Html(format!(
        "<html><body><h1>Scanner-bait fixture server</h1>\
         <p>Secrets logged so far: {logged}</p>\
         <ul>\
         <li>POST /crypto/cookie &mdash; DES/CBC over a cookie value</li>\
         <li>GET/POST /crypto/param &mdash; configured cipher over a parameter name</li>\
         <li>POST /crypto/stream &mdash; configured cipher over the raw body</li>\
         <li>GET/POST /weakrand/remember-me/:id &mdash; predictable remember-me token</li>\
         <li>GET/POST /sqli/user-lookup &mdash; injectable user lookup</li>\
         </ul></body></html>"
    ))
}

pub async fn health_handler() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "status": "healthy",
        "timestamp": chrono::Utc::now().timestamp(),
    }))
}

// --- WEAK CRYPTOGRAPHY FIXTURES ---

/// GET serves the companion page and plants a demonstration cookie: fixed
/// name/value, three-minute lifetime, secure, scoped to the request.
pub async fn cookie_crypto_get(uri: Uri, headers: HeaderMap) -> Response {
    let mut response_headers = HeaderMap::new();
    let cookie = format!(
        "{CRYPTO_COOKIE_NAME}=someSecret; Max-Age=180; Secure; Path={}{}",
        uri.path(),
        host_domain_attr(&headers)
    );
    if let Ok(value) = HeaderValue::from_str(&cookie) {
        response_headers.insert(header::SET_COOKIE, value);
    }

    let page = format!(
        "<html><body><h1>Cookie crypto fixture</h1>\
         <p>A demonstration cookie named '{CRYPTO_COOKIE_NAME}' has been set.</p>\
         <form action=\"{}\" method=\"POST\">\
         <input type=\"submit\" value=\"Encrypt cookie value\"/>\
         </form></body></html>",
        uri.path()
    );
    (response_headers, Html(page)).into_response()
}

/// POST: cookie-mode extraction into the hardcoded DES/CBC transformation.
pub async fn cookie_crypto_post(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Response, AppError> {
    let param = extract::cookie_value(&headers, CRYPTO_COOKIE_NAME);
    let spec: CipherSpec = COOKIE_ROUTE_ALG.parse().map_err(BenchError::Crypto)?;
    run_cipher_pipeline(&state, spec, RequestValue::Text(param)).await
}

/// Parameter-name-mode extraction into the configured transformation. The
/// captured value is the *name* of the first parameter whose value equals
/// the marker; no match leaves the empty string.
pub async fn param_crypto_handler(
    State(state): State<AppState>,
    RawQuery(query): RawQuery,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Response, AppError> {
    let content_type = headers
        .get(header::CONTENT_TYPE)
        .and_then(|value| value.to_str().ok());
    let pairs = extract::request_pairs(query.as_deref(), content_type, &body);
    let param = extract::parameter_name(&pairs, PARAM_MARKER);

    let spec: CipherSpec = state.config.crypto_alg1.parse().map_err(BenchError::Crypto)?;
    run_cipher_pipeline(&state, spec, RequestValue::Text(param)).await
}

/// Stream-mode extraction: the raw body feeds the configured transformation.
/// An empty body is the wrong-verb short-circuit, not an error.
pub async fn stream_crypto_handler(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Response, AppError> {
    let spec: CipherSpec = state.config.crypto_alg1.parse().map_err(BenchError::Crypto)?;
    run_cipher_pipeline(&state, spec, RequestValue::Stream(body.to_vec())).await
}

/// The shared extract → encrypt → sink pipeline.
async fn run_cipher_pipeline(
    state: &AppState,
    spec: CipherSpec,
    value: RequestValue,
) -> Result<Response, AppError> {
    let input = match crypto::derive_cipher_input(Some(&value)) {
        CipherInput::Ready(input) => input,
        CipherInput::RequiresPost => {
            debug!("empty stream input, advisory short-circuit");
            return Ok(Html(crypto::STREAM_REQUIRES_POST.to_string()).into_response());
        }
    };

    // Fresh key and IV on every invocation; both die with this request.
    let material = crypto::generate_key_material(&spec);
    let ciphertext = crypto::encrypt(&spec, &material.key, material.iv_slice(), &input)
        .map_err(BenchError::Crypto)?;
    let encoded = state.sink.append_secret(&ciphertext).await.map_err(BenchError::Io)?;
    debug!(ciphertext_b64_len = encoded.len(), "secret value stored");

    let body = format!("{}\n{CRYPTO_TRAILER}", sensitive_value_line(&input));
    Ok(Html(body).into_response())
}

// --- WEAK RANDOMNESS FIXTURES ---

/// Remember-me fixture: recognize a returning caller by comparing the
/// presented `rememberMe<id>` cookie against the session store, or mint a
/// fresh (predictable) token and remember it in both places.
pub async fn remember_me_handler(
    State(state): State<AppState>,
    Path(test_case): Path<String>,
    uri: Uri,
    headers: HeaderMap,
) -> Result<Response, AppError> {
    let cookie_name = token::remember_me_cookie_name(&test_case);

    let (session_id, fresh_session) = match extract::find_cookie(&headers, SESSION_COOKIE) {
        Some(existing) => (existing, false),
        None => (session::mint_session_id(), true),
    };

    let found = match extract::find_cookie(&headers, &cookie_name) {
        Some(presented) => {
            state.sessions.get(&session_id, &cookie_name).as_deref() == Some(presented.as_str())
        }
        None => false,
    };

    let mut response_headers = HeaderMap::new();
    if fresh_session {
        append_cookie(
            &mut response_headers,
            &format!("{SESSION_COOKIE}={session_id}; Path=/; HttpOnly"),
        );
    }

    let body = if found {
        debug!(cookie = %cookie_name, "returning user recognized");
        format!("Welcome back: {REMEMBERED_USER}<br/>")
    } else {
        let minted = token::mint_token();
        state
            .sessions
            .put(&session_id, &cookie_name, minted.clone());
        append_cookie(
            &mut response_headers,
            &format!(
                "{cookie_name}={minted}; Secure; HttpOnly; Path={}{}",
                uri.path(),
                host_domain_attr(&headers)
            ),
        );
        debug!(cookie = %cookie_name, "remember-me token minted");
        format!(
            "{REMEMBERED_USER} has been remembered with cookie: {cookie_name} \
             whose value is: {minted}<br/>"
        )
    };

    Ok((response_headers, Html(body)).into_response())
}

// --- SQL INJECTION FIXTURE ---

/// Injectable user lookup: the `username` parameter is spliced verbatim into
/// the statement by the SQL helper. Error visibility follows the configured
/// `hide_sql_errors` policy.
pub async fn user_lookup_handler(
    State(state): State<AppState>,
    RawQuery(query): RawQuery,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Response, AppError> {
    let content_type = headers
        .get(header::CONTENT_TYPE)
        .and_then(|value| value.to_str().ok());
    let pairs = extract::request_pairs(query.as_deref(), content_type, &body);
    let username = pairs
        .iter()
        .find(|(name, _)| name == "username")
        .map(|(_, value)| value.clone())
        .unwrap_or_default();

    let outcome = state.sql.lookup_user(&username).await?;
    Ok(Html(print_results(&outcome)).into_response())
}

// --- helpers ---

/// `; Domain=<host>` attribute derived from the Host header, empty when the
/// header is absent or unusable. Bracketed IPv6 hosts get no Domain
/// attribute; a naive split at `:` would truncate the address.
fn host_domain_attr(headers: &HeaderMap) -> String {
    headers
        .get(header::HOST)
        .and_then(|value| value.to_str().ok())
        .filter(|host| !host.starts_with('['))
        .map(|host| host.split(':').next().unwrap_or(host))
        .map(|host| format!("; Domain={host}"))
        .unwrap_or_default()
}

fn append_cookie(headers: &mut HeaderMap, cookie: &str) {
    if let Ok(value) = HeaderValue::from_str(cookie) {
        headers.append(header::SET_COOKIE, value);
    }
}
