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
use sharedkey_core::{Context, ProvideCredential, ProvideCredentialChain, Result};

use crate::provide_credential::{
    ConfigFileCredentialProvider, ConnectionStringCredentialProvider, EnvCredentialProvider,
};
use crate::Credential;

/// Default loader that tries multiple credential sources in order.
///
/// 1. Env: `AZURE_STORAGE_ACCOUNT_NAME` and `AZURE_STORAGE_ACCOUNT_KEY`
/// 2. Connection string: `AZURE_STORAGE_CONNECTION_STRING`
/// 3. Config file: [`DefaultCredentialProvider::with_config_file`] or
///    `AZURE_STORAGE_CONFIG_FILE`
///
/// The first source yielding a credential wins. An error, such as a malformed
/// key, stops the search.
#[derive(Debug)]
pub struct DefaultCredentialProvider {
    chain: ProvideCredentialChain<Credential>,
}

impl Default for DefaultCredentialProvider {
    fn default() -> Self {
        Self::with_config_file_provider(ConfigFileCredentialProvider::new())
    }
}

impl DefaultCredentialProvider {
    /// Create a new default loader.
    pub fn new() -> Self {
        Self::default()
    }

    /// Read the config file at `path` as the last source.
    pub fn with_config_file(path: impl Into<String>) -> Self {
        Self::with_config_file_provider(ConfigFileCredentialProvider::new().with_path(path))
    }

    fn with_config_file_provider(config_file: ConfigFileCredentialProvider) -> Self {
        let chain = ProvideCredentialChain::new()
            .push(EnvCredentialProvider::new())
            .push(ConnectionStringCredentialProvider::new())
            .push(config_file);

        Self { chain }
    }
}

#[async_trait]
impl ProvideCredential for DefaultCredentialProvider {
    type Credential = Credential;

    async fn provide_credential(&self, ctx: &Context) -> Result<Option<Self::Credential>> {
        self.chain.provide_credential(ctx).await
    }
}
