//! OAuth2 access-token refresh
//!
//! One token exchange at run start: the configured refresh token is traded
//! for a short-lived access token which the engine then sends with every
//! request. A failed exchange aborts the run before any extraction, as a
//! configuration error.

use crate::config::AuthParams;
use crate::error::{Error, Result};
use serde::Deserialize;
use tracing::debug;

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
}

/// Resolve the access token for this run
///
/// A configured `access_token` is used as-is; OAuth2 parameters are
/// exchanged at the token endpoint via the `refresh_token` grant.
pub async fn resolve_access_token(client: &reqwest::Client, auth: &AuthParams) -> Result<String> {
    match auth {
        AuthParams::AccessToken { access_token } => Ok(access_token.clone()),
        AuthParams::Oauth {
            client_id,
            client_secret,
            refresh_token,
            token_url,
        } => {
            debug!("Refreshing access token at {token_url}");

            let form = [
                ("grant_type", "refresh_token"),
                ("client_id", client_id.as_str()),
                ("client_secret", client_secret.as_str()),
                ("refresh_token", refresh_token.as_str()),
            ];

            let response = client
                .post(token_url)
                .form(&form)
                .send()
                .await
                .map_err(|e| Error::token_refresh(format!("token request failed: {e}")))?;

            if !response.status().is_success() {
                let status = response.status().as_u16();
                return Err(Error::token_refresh(format!(
                    "token endpoint answered HTTP {status}, please reset the account authorization"
                )));
            }

            let token: TokenResponse = response
                .json()
                .await
                .map_err(|e| Error::token_refresh(format!("invalid token response: {e}")))?;

            Ok(token.access_token)
        }
    }
}
