/*
 * @file credentials.rs
 * @brief OAuth2 credentials loading
 * @author Kevin Thomas
 * @date 2025
 *
 * MIT License
 *
 * Copyright (c) 2025 Kevin Thomas
 *
 * Permission is hereby granted, free of charge, to any person obtaining a copy
 * of this software and associated documentation files (the "Software"), to deal
 * in the Software without restriction, including without limitation the rights
 * to use, copy, modify, merge, publish, distribute, sublicense, and/or sell
 * copies of the Software, and to permit persons to whom the Software is
 * furnished to do so, subject to the following conditions:
 *
 * The above copyright notice and this permission notice shall be included in all
 * copies or substantial portions of the Software.
 *
 * THE SOFTWARE IS PROVIDED "AS IS", WITHOUT WARRANTY OF ANY KIND, EXPRESS OR
 * IMPLIED, INCLUDING BUT NOT LIMITED TO THE WARRANTIES OF MERCHANTABILITY,
 * FITNESS FOR A PARTICULAR PURPOSE AND NONINFRINGEMENT. IN NO EVENT SHALL THE
 * AUTHORS OR COPYRIGHT HOLDERS BE LIABLE FOR ANY CLAIM, DAMAGES OR OTHER
 * LIABILITY, WHETHER IN AN ACTION OF CONTRACT, TORT OR OTHERWISE, ARISING FROM,
 * OUT OF OR IN CONNECTION WITH THE SOFTWARE OR THE USE OR OTHER DEALINGS IN THE
 * SOFTWARE.
 */

//! OAuth2 credentials for the assistant session.
//!
//! The file is the one written by `google-oauthlib-tool --save`. The daemon
//! only validates and forwards it; token refresh happens in the bridge.

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Location of the credentials file relative to the user's config directory.
const CREDENTIALS_SUBPATH: [&str; 2] = ["google-oauthlib-tool", "credentials.json"];

/// Authorized-user OAuth2 credentials.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Credentials {
    /// Long-lived token exchanged for access tokens.
    pub refresh_token: String,
    /// OAuth2 token endpoint.
    pub token_uri: String,
    /// OAuth2 client identifier.
    pub client_id: String,
    /// OAuth2 client secret.
    pub client_secret: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    /// Granted scopes.
    pub scopes: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    /// OpenID Connect ID token, if one was issued.
    pub id_token: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    /// Project billed for API quota.
    pub quota_project_id: Option<String>,
}

/// Keeps secrets out of logs.
impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("token_uri", &self.token_uri)
            .field("client_id", &self.client_id)
            .field("scopes", &self.scopes)
            .finish_non_exhaustive()
    }
}

impl Credentials {
    /// Loads and validates the credentials file at `path`.
    ///
    /// # Errors
    /// * [`Error::CredentialsMissing`] - No file at `path`.
    /// * [`Error::CredentialsRead`] - The file could not be read.
    /// * [`Error::CredentialsParse`] - The content is not a credentials object.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.is_file() {
            return Err(Error::CredentialsMissing {
                path: path.to_path_buf(),
            });
        }
        let raw = fs::read_to_string(path).map_err(|source| Error::CredentialsRead {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_str(&raw).map_err(|source| Error::CredentialsParse {
            path: path.to_path_buf(),
            source,
        })
    }
}

/// Default credentials path, `~/.config/google-oauthlib-tool/credentials.json`.
///
/// Falls back to a path relative to the working directory when no home
/// directory is known.
pub fn default_credentials_path() -> PathBuf {
    let mut path = dirs::home_dir()
        .map(|home| home.join(".config"))
        .unwrap_or_else(|| PathBuf::from(".config"));
    path.extend(CREDENTIALS_SUBPATH);
    path
}
