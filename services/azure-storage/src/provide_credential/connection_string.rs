// Licensed to the Apache Software Foundation (ASF) under one
// or more contributor license agreements.  See the NOTICE file
// distributed with this work for additional information
// regarding copyright ownership.  The ASF licenses this file
// to you under the Apache License, Version 2.0 (the
// "License"); you may not use this file except in compliance
// with the License.  You may obtain a copy of the License at
//
//   http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing,
// software distributed under the License is distributed on an
// "AS IS" BASIS, WITHOUT WARRANTIES OR CONDITIONS OF ANY
// KIND, either express or implied.  See the License for the
// specific language governing permissions and limitations
// under the License.

use async_trait::async_trait;
use sharedkey_core::{Context, ProvideCredential, Result};

use crate::constants::AZURE_STORAGE_CONNECTION_STRING;
use crate::credential::Credential;
use crate::{Config, Service};

/// Loads the credential from a connection string.
///
/// The connection string comes from
/// [`ConnectionStringCredentialProvider::with_connection_string`] or else from
/// `AZURE_STORAGE_CONNECTION_STRING`. `UseDevelopmentStorage=true` yields the
/// well-known emulator account.
#[derive(Clone, Default)]
pub struct ConnectionStringCredentialProvider {
    connection_string: Option<String>,
}

impl std::fmt::Debug for ConnectionStringCredentialProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConnectionStringCredentialProvider")
            .field(
                "connection_string",
                &sharedkey_core::utils::Redact::from(&self.connection_string),
            )
            .finish()
    }
}

impl ConnectionStringCredentialProvider {
    /// Create a new provider.
    pub fn new() -> Self {
        Self::default()
    }

    /// Use the given connection string instead of the one in env.
    pub fn with_connection_string(mut self, connection_string: impl Into<String>) -> Self {
        self.connection_string = Some(connection_string.into());
        self
    }
}

#[async_trait]
impl ProvideCredential for ConnectionStringCredentialProvider {
    type Credential = Credential;

    async fn provide_credential(&self, ctx: &Context) -> Result<Option<Self::Credential>> {
        let Some(conn_str) = self
            .connection_string
            .clone()
            .or_else(|| ctx.env_var(AZURE_STORAGE_CONNECTION_STRING))
        else {
            return Ok(None);
        };

        // Endpoints are irrelevant here, the credential is the same for all
        // services.
        let config = Config::try_from_connection_string(&conn_str, Service::Blob)?;
        if config.account.is_none() || config.primary_key.is_none() {
            return Ok(None);
        }

        Ok(Some(config.credential()?))
    }
}
