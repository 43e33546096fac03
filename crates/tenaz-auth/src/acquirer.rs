//! Silent-then-fresh token acquisition
//!
//! Implements both grant flows against a tenant authority:
//!
//! - [`TokenAcquirer::acquire`] first tries the on-disk cache (silent),
//!   then a refresh-token grant, and only then a fresh grant.
//! - Interactive logins run the Authorization Code flow with PKCE
//!   (RFC 7636) through the user's browser and a one-shot loopback
//!   redirect listener, using the well-known first-party public
//!   client id.
//! - Confidential logins run the client-credentials grant.

use chrono::{DateTime, Duration, Utc};
use oauth2::{
    basic::BasicClient, AuthUrl, AuthorizationCode, ClientId, ClientSecret, CsrfToken,
    EndpointNotSet, EndpointSet, PkceCodeChallenge, PkceCodeVerifier, RedirectUrl, RefreshToken,
    Scope, TokenResponse, TokenUrl,
};
use std::path::Path;
use tracing::{debug, info};

use tenaz_core::config::{Credentials, LoginMethod};
use tenaz_core::{Error, Result};

use crate::store::{TokenRecord, TokenStore};

/// Well-known first-party public client id used for interactive login.
pub const PUBLIC_CLIENT_ID: &str = "1950a258-227b-4e31-a9cf-717495945fc2";

/// Redirect URI served by the loopback callback server.
const REDIRECT_URI: &str = "http://127.0.0.1:8400/callback";

/// A cached token is considered expired this close to its expiry.
const EXPIRY_MARGIN_SECS: i64 = 300;

/// Fallback token lifetime when the provider omits `expires_in`.
const DEFAULT_TOKEN_LIFETIME_SECS: i64 = 3600;

/// A bearer token with its absolute expiry.
#[derive(Debug, Clone)]
pub struct AccessToken {
    pub token: String,
    pub expires_at: DateTime<Utc>,
}

type PublicClient =
    BasicClient<EndpointSet, EndpointNotSet, EndpointNotSet, EndpointNotSet, EndpointSet>;
type ConfidentialClient =
    BasicClient<EndpointNotSet, EndpointNotSet, EndpointNotSet, EndpointNotSet, EndpointSet>;

/// Acquires access tokens for named resource scopes.
pub struct TokenAcquirer {
    authority_url: String,
    method: LoginMethod,
    store: TokenStore,
}

impl TokenAcquirer {
    pub fn new(creds: &Credentials, conf_dir: &Path) -> Self {
        Self {
            authority_url: creds.authority_url(),
            method: creds.method.clone(),
            store: TokenStore::new(conf_dir),
        }
    }

    /// Obtain a bearer token for `resource` (e.g. `https://graph.microsoft.com`).
    ///
    /// The actual OAuth scope requested is `<resource>/.default`, which
    /// carries every static and consented permission of the identity.
    pub async fn acquire(&self, resource: &str) -> Result<AccessToken> {
        let scope = format!("{resource}/.default");
        let client_id = self.client_id();
        let account = self.account();

        // Silent path: cached token, then refresh grant.
        if let Some(cached) = self.store.find(resource, &client_id, account.as_deref()) {
            if cached.is_fresh(Duration::seconds(EXPIRY_MARGIN_SECS)) {
                debug!(resource, "serving cached access token");
                return Ok(AccessToken {
                    token: cached.access_token,
                    expires_at: cached.expires_at,
                });
            }
            if let Some(refresh_token) = cached.refresh_token.clone() {
                match self.refresh(resource, &scope, &refresh_token).await {
                    Ok(token) => return Ok(token),
                    Err(e) => debug!(resource, error = %e, "silent refresh failed"),
                }
            }
        }

        // Fresh path.
        match &self.method {
            LoginMethod::Interactive { .. } => self.acquire_interactive(resource, &scope).await,
            LoginMethod::ClientSecret { .. } => {
                self.acquire_client_credentials(resource, &scope).await
            }
        }
    }

    fn client_id(&self) -> String {
        match &self.method {
            LoginMethod::Interactive { .. } => PUBLIC_CLIENT_ID.to_string(),
            LoginMethod::ClientSecret { client_id, .. } => client_id.to_string(),
        }
    }

    fn account(&self) -> Option<String> {
        match &self.method {
            LoginMethod::Interactive { username } => Some(username.to_lowercase()),
            LoginMethod::ClientSecret { .. } => None,
        }
    }

    fn auth_endpoint(&self) -> String {
        format!("{}/oauth2/v2.0/authorize", self.authority_url)
    }

    fn token_endpoint(&self) -> String {
        format!("{}/oauth2/v2.0/token", self.authority_url)
    }

    fn public_client(&self) -> Result<PublicClient> {
        let client = BasicClient::new(ClientId::new(PUBLIC_CLIENT_ID.to_string()))
            .set_auth_uri(
                AuthUrl::new(self.auth_endpoint())
                    .map_err(|e| Error::Auth(format!("invalid authorization URL: {e}")))?,
            )
            .set_token_uri(
                TokenUrl::new(self.token_endpoint())
                    .map_err(|e| Error::Auth(format!("invalid token URL: {e}")))?,
            )
            .set_redirect_uri(
                RedirectUrl::new(REDIRECT_URI.to_string())
                    .map_err(|e| Error::Auth(format!("invalid redirect URI: {e}")))?,
            );
        Ok(client)
    }

    fn confidential_client(&self) -> Result<ConfidentialClient> {
        let LoginMethod::ClientSecret {
            client_id,
            client_secret,
        } = &self.method
        else {
            return Err(Error::Auth(
                "confidential flow requires a client id and secret".to_string(),
            ));
        };
        let client = BasicClient::new(ClientId::new(client_id.to_string()))
            .set_client_secret(ClientSecret::new(client_secret.clone()))
            .set_token_uri(
                TokenUrl::new(self.token_endpoint())
                    .map_err(|e| Error::Auth(format!("invalid token URL: {e}")))?,
            );
        Ok(client)
    }

    /// Browser-driven authorization-code + PKCE flow.
    async fn acquire_interactive(&self, resource: &str, scope: &str) -> Result<AccessToken> {
        let client = self.public_client()?;

        let (pkce_challenge, pkce_verifier) = PkceCodeChallenge::new_random_sha256();
        let (auth_url, _csrf_token) = client
            .authorize_url(CsrfToken::new_random)
            .add_scope(Scope::new(scope.to_string()))
            .add_scope(Scope::new("offline_access".to_string()))
            .set_pkce_challenge(pkce_challenge)
            .url();

        info!("opening browser for interactive sign-in");
        webbrowser::open(auth_url.as_str())
            .map_err(|e| Error::Auth(format!("failed to open browser: {e}")))?;

        let code = redirect_listener::wait_for_code().await?;
        let tokens = self.exchange_code(&client, code, pkce_verifier).await?;

        self.persist(resource, tokens.clone())?;
        Ok(AccessToken {
            token: tokens.access_token,
            expires_at: tokens.expires_at,
        })
    }

    async fn exchange_code(
        &self,
        client: &PublicClient,
        code: String,
        pkce_verifier: PkceCodeVerifier,
    ) -> Result<TokenRecord> {
        let http_client = reqwest::Client::new();
        let result = client
            .exchange_code(AuthorizationCode::new(code))
            .set_pkce_verifier(pkce_verifier)
            .request_async(&http_client)
            .await
            .map_err(|e| Error::Auth(format!("authorization code exchange failed: {e}")))?;

        Ok(self.record_from_response(
            result.access_token().secret().to_string(),
            result.refresh_token().map(|t| t.secret().to_string()),
            result.expires_in(),
        ))
    }

    /// Client-credentials grant for confidential clients.
    async fn acquire_client_credentials(&self, resource: &str, scope: &str) -> Result<AccessToken> {
        let client = self.confidential_client()?;
        let http_client = reqwest::Client::new();

        info!(resource, "acquiring token with client credentials");
        let result = client
            .exchange_client_credentials()
            .add_scope(Scope::new(scope.to_string()))
            .request_async(&http_client)
            .await
            .map_err(|e| Error::Auth(format!("client credentials grant failed: {e}")))?;

        let record = self.record_from_response(
            result.access_token().secret().to_string(),
            None,
            result.expires_in(),
        );
        self.persist(resource, record.clone())?;
        Ok(AccessToken {
            token: record.access_token,
            expires_at: record.expires_at,
        })
    }

    /// Refresh-token grant (interactive logins only issue refresh tokens).
    async fn refresh(
        &self,
        resource: &str,
        _scope: &str,
        refresh_token: &str,
    ) -> Result<AccessToken> {
        let client = self.public_client()?;
        let http_client = reqwest::Client::new();

        debug!(resource, "refreshing access token");
        let result = client
            .exchange_refresh_token(&RefreshToken::new(refresh_token.to_string()))
            .request_async(&http_client)
            .await
            .map_err(|e| Error::Auth(format!("token refresh failed: {e}")))?;

        let record = self.record_from_response(
            result.access_token().secret().to_string(),
            result
                .refresh_token()
                .map(|t| t.secret().to_string())
                .or_else(|| Some(refresh_token.to_string())),
            result.expires_in(),
        );
        self.persist(resource, record.clone())?;
        Ok(AccessToken {
            token: record.access_token,
            expires_at: record.expires_at,
        })
    }

    fn record_from_response(
        &self,
        access_token: String,
        refresh_token: Option<String>,
        expires_in: Option<std::time::Duration>,
    ) -> TokenRecord {
        let expires_at = expires_in
            .map(|d| Utc::now() + Duration::seconds(d.as_secs() as i64))
            .unwrap_or_else(|| Utc::now() + Duration::seconds(DEFAULT_TOKEN_LIFETIME_SECS));
        TokenRecord {
            resource: String::new(),
            client_id: self.client_id(),
            account: self.account(),
            access_token,
            refresh_token,
            expires_at,
        }
    }

    fn persist(&self, resource: &str, mut record: TokenRecord) -> Result<()> {
        record.resource = resource.to_string();
        self.store.upsert(record)
    }
}

// ============================================================================
// Loopback redirect listener
// ============================================================================

mod redirect_listener {
    //! One-shot loopback listener for the sign-in redirect.
    //!
    //! The interactive flow needs exactly one HTTP exchange: the identity
    //! provider redirects the browser to 127.0.0.1:8400 with the
    //! authorization code in the query string. A general-purpose HTTP
    //! server is not needed for that, so the listener reads the request
    //! head straight off the socket, answers with a static page, and
    //! returns the code.

    use tokio::io::{AsyncBufReadExt, AsyncRead, AsyncWrite, AsyncWriteExt, BufReader};
    use tokio::net::TcpListener;
    use tracing::{debug, info};

    use tenaz_core::{Error, Result};

    const LISTEN_ADDR: &str = "127.0.0.1:8400";

    /// Block until the browser delivers an authorization code.
    ///
    /// Browsers may open speculative connections or ask for a favicon
    /// before the redirect itself lands; every connection gets answered
    /// and listening continues until a code arrives.
    pub async fn wait_for_code() -> Result<String> {
        let listener = TcpListener::bind(LISTEN_ADDR)
            .await
            .map_err(|e| Error::Auth(format!("cannot listen on {LISTEN_ADDR}: {e}")))?;
        info!("waiting for the sign-in redirect on {LISTEN_ADDR}");

        loop {
            let (stream, peer) = listener
                .accept()
                .await
                .map_err(|e| Error::Auth(format!("accept on {LISTEN_ADDR} failed: {e}")))?;
            match answer(stream).await {
                Ok(Some(code)) => {
                    info!("authorization code received");
                    return Ok(code);
                }
                Ok(None) => debug!(%peer, "connection without a code, still waiting"),
                Err(e) => debug!(%peer, error = %e, "dropping redirect connection"),
            }
        }
    }

    /// Read one request head, reply with a static page, and pull the
    /// authorization code out of the target if it is there.
    async fn answer<S>(stream: S) -> std::io::Result<Option<String>>
    where
        S: AsyncRead + AsyncWrite + Unpin,
    {
        let mut reader = BufReader::new(stream);
        let mut request_line = String::new();
        reader.read_line(&mut request_line).await?;

        // Drain the header block; nothing in it matters here.
        let mut header = String::new();
        loop {
            header.clear();
            let n = reader.read_line(&mut header).await?;
            if n == 0 || header.trim_end().is_empty() {
                break;
            }
        }

        let code = request_target(&request_line).and_then(code_from_target);
        let (status, page) = match &code {
            Some(_) => ("200 OK", DONE_PAGE),
            None => ("404 Not Found", MISSED_PAGE),
        };
        let response = format!(
            "HTTP/1.1 {status}\r\n\
             Content-Type: text/html; charset=utf-8\r\n\
             Content-Length: {}\r\n\
             Connection: close\r\n\r\n{page}",
            page.len(),
        );

        let mut stream = reader.into_inner();
        stream.write_all(response.as_bytes()).await?;
        stream.shutdown().await?;
        Ok(code)
    }

    /// The request target of a `GET <target> HTTP/1.x` request line.
    fn request_target(request_line: &str) -> Option<&str> {
        let mut words = request_line.split_whitespace();
        match (words.next(), words.next()) {
            (Some("GET"), Some(target)) => Some(target),
            _ => None,
        }
    }

    /// The `code` query parameter of a `/callback` target, decoded.
    fn code_from_target(target: &str) -> Option<String> {
        let (path, query) = target.split_once('?')?;
        if path != "/callback" {
            return None;
        }
        url::form_urlencoded::parse(query.as_bytes())
            .find(|(key, _)| key == "code")
            .map(|(_, value)| value.into_owned())
            .filter(|code| !code.is_empty())
    }

    const DONE_PAGE: &str = "<!DOCTYPE html>\n<html><head><title>tenaz</title></head><body>\
<p>Signed in. You can close this window and return to the terminal.</p>\
</body></html>\n";

    const MISSED_PAGE: &str = "<!DOCTYPE html>\n<html><head><title>tenaz</title></head><body>\
<p>No authorization code here. Close this window and retry the sign-in.</p>\
</body></html>\n";

}
