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
use log::debug;
use sharedkey_core::{Context, ProvideCredential, Result};

use crate::constants::AZURE_STORAGE_CONFIG_FILE;
use crate::credential::Credential;
use crate::Config;

/// Loads the credential from the `account` and `primaryKey` fields of a JSON
/// config file.
///
/// The path comes from [`ConfigFileCredentialProvider::with_path`] or else
/// from `AZURE_STORAGE_CONFIG_FILE`. Without a path the provider returns
/// `None`. A path that can't be read or parsed is an error.
#[derive(Clone, Debug, Default)]
pub struct ConfigFileCredentialProvider {
    path: Option<String>,
}

impl ConfigFileCredentialProvider {
    /// Create a new provider.
    pub fn new() -> Self {
        Self::default()
    }

    /// Read the given file instead of the one named in env.
    pub fn with_path(mut self, path: impl Into<String>) -> Self {
        self.path = Some(path.into());
        self
    }
}

#[async_trait]
impl ProvideCredential for ConfigFileCredentialProvider {
    type Credential = Credential;

    async fn provide_credential(&self, ctx: &Context) -> Result<Option<Self::Credential>> {
        let Some(path) = self
            .path
            .clone()
            .or_else(|| ctx.env_var(AZURE_STORAGE_CONFIG_FILE))
        else {
            return Ok(None);
        };

        let config = Config::from_file(ctx, &path).await?;
        if config.account.is_none() || config.primary_key.is_none() {
            debug!("config file {path} carries no shared key");
            return Ok(None);
        }

        Ok(Some(config.credential()?))
    }
}
