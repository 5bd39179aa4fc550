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

use std::fmt::{Debug, Formatter};

use serde::Deserialize;
use sharedkey_core::utils::Redact;
use sharedkey_core::{Context, Error, Result};

use crate::constants::*;
use crate::{connection_string, Credential, Service, SigningContext};

/// Config carries all the configuration for Azure Storage services.
///
/// Deserializes from the camelCase JSON layout:
///
/// ```json
/// {
///   "account": "mystorageaccount",
///   "primaryKey": "<base64 key>",
///   "version": "2019-12-12",
///   "dataServiceVersion": "3.0;NetFx",
///   "maxDataServiceVersion": "3.0;NetFx",
///   "blobHost": "mystorageaccount.blob.core.windows.net",
///   "tableHost": "mystorageaccount.table.core.windows.net"
/// }
/// ```
///
/// Unknown fields are ignored.
#[derive(Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Config {
    /// Storage account name.
    ///
    /// - env value: [`AZURE_STORAGE_ACCOUNT_NAME`], then [`AZBLOB_ACCOUNT_NAME`]
    pub account: Option<String>,
    /// Base64 encoded account key.
    ///
    /// - env value: [`AZURE_STORAGE_ACCOUNT_KEY`], then [`AZBLOB_ACCOUNT_KEY`]
    pub primary_key: Option<String>,
    /// Value of `x-ms-version`, defaults to [`AZURE_VERSION`].
    pub version: Option<String>,
    /// Value of `DataServiceVersion` on table requests.
    pub data_service_version: Option<String>,
    /// Value of `MaxDataServiceVersion` on table requests.
    pub max_data_service_version: Option<String>,
    /// Host of the blob endpoint.
    pub blob_host: Option<String>,
    /// Host of the table endpoint.
    pub table_host: Option<String>,
    /// Host of the queue endpoint.
    pub queue_host: Option<String>,
    /// Host used by any service without a dedicated one.
    pub host: Option<String>,
    /// Path every request path starts with, such as `/devstoreaccount1` for
    /// path-style emulator endpoints.
    pub path_prefix: Option<String>,
    /// Value of `x-ms-client-request-id`.
    ///
    /// - env value: [`WEBJOBS_NAME`]
    pub client_request_id: Option<String>,
    /// `http` or `https`, defaults to `https`.
    pub protocol: Option<String>,
}

impl Debug for Config {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("account", &self.account)
            .field("primary_key", &Redact::from(&self.primary_key))
            .field("version", &self.version)
            .field("data_service_version", &self.data_service_version)
            .field("max_data_service_version", &self.max_data_service_version)
            .field("blob_host", &self.blob_host)
            .field("table_host", &self.table_host)
            .field("queue_host", &self.queue_host)
            .field("host", &self.host)
            .field("path_prefix", &self.path_prefix)
            .field("client_request_id", &self.client_request_id)
            .field("protocol", &self.protocol)
            .finish()
    }
}

impl Config {
    /// Load config from env.
    ///
    /// Values found in env override the ones already set.
    pub fn from_env(mut self, ctx: &Context) -> Self {
        let first = |keys: &[&str]| keys.iter().find_map(|k| ctx.env_var(k));

        if let Some(v) = first(&[AZURE_STORAGE_ACCOUNT_NAME, AZBLOB_ACCOUNT_NAME]) {
            self.account = Some(v);
        }
        if let Some(v) = first(&[AZURE_STORAGE_ACCOUNT_KEY, AZBLOB_ACCOUNT_KEY]) {
            self.primary_key = Some(v);
        }
        if let Some(v) = ctx.env_var(AZURE_STORAGE_VERSION) {
            self.version = Some(v);
        }
        if let Some(v) = ctx.env_var(AZURE_STORAGE_HOST) {
            self.host = Some(v);
        }
        if let Some(v) = ctx.env_var(AZURE_STORAGE_BLOB_HOST) {
            self.blob_host = Some(v);
        }
        if let Some(v) = ctx.env_var(AZURE_STORAGE_TABLE_HOST) {
            self.table_host = Some(v);
        }
        if let Some(v) = ctx.env_var(AZURE_STORAGE_QUEUE_HOST) {
            self.queue_host = Some(v);
        }
        if let Some(v) = ctx.env_var(WEBJOBS_NAME) {
            self.client_request_id = Some(v);
        }

        self
    }

    /// Load config from a JSON file.
    pub async fn from_file(ctx: &Context, path: &str) -> Result<Self> {
        let content = ctx.file_read(path).await.map_err(|e| {
            Error::config_invalid(format!("failed to read config file {path}")).with_source(e)
        })?;

        serde_json::from_slice(&content).map_err(|e| {
            Error::config_invalid(format!("failed to parse config file {path}")).with_source(e)
        })
    }

    /// Parses an [Azure connection string][1] into a configuration object.
    ///
    /// Hosts are set for every service the string addresses. `service`
    /// decides the protocol and path prefix when endpoints disagree.
    ///
    /// ```txt
    /// AccountName=mystorageaccount;
    /// AccountKey=Eby8vdM02xNOcqFlqUwJPLlmEtlCDXJ1OUzFT50uSRZ6IFsuFq2UVErCz4I6tq/K1SZFPTOtr/KBHBeksoGMGw==;
    /// BlobEndpoint=https://mystorageaccount.blob.core.windows.net
    /// ```
    ///
    /// [1]: https://learn.microsoft.com/en-us/azure/storage/common/storage-configure-connection-string
    pub fn try_from_connection_string(conn_str: &str, service: Service) -> Result<Self> {
        connection_string::parse(conn_str, service)
    }

    /// Host requests to `service` are sent to.
    ///
    /// Falls back to [`Config::host`], then to
    /// `<account>.<service>.core.windows.net`.
    pub fn endpoint_host(&self, service: Service) -> Result<String> {
        let specific = match service {
            Service::Blob => &self.blob_host,
            Service::Table => &self.table_host,
            Service::Queue => &self.queue_host,
        };

        if let Some(host) = specific.as_ref().or(self.host.as_ref()) {
            return Ok(host.clone());
        }

        match &self.account {
            Some(account) if !account.is_empty() => Ok(format!(
                "{account}.{}.{DEFAULT_ENDPOINT_SUFFIX}",
                service.endpoint_name()
            )),
            _ => Err(Error::config_invalid(format!(
                "no host configured for {service} and no account to derive it from"
            ))),
        }
    }

    /// Scheme requests are sent with.
    pub fn protocol(&self) -> &str {
        self.protocol.as_deref().unwrap_or("https")
    }

    /// Value of `x-ms-version`.
    pub fn version(&self) -> &str {
        self.version.as_deref().unwrap_or(AZURE_VERSION)
    }

    /// Value of `x-ms-client-request-id`.
    pub fn client_request_id(&self) -> &str {
        self.client_request_id
            .as_deref()
            .unwrap_or(DEFAULT_CLIENT_REQUEST_ID)
    }

    /// Path prefix without a trailing `/`, empty when unset.
    pub fn path_prefix(&self) -> &str {
        self.path_prefix
            .as_deref()
            .map(|p| p.trim_end_matches('/'))
            .unwrap_or_default()
    }

    /// Build the shared key credential.
    pub fn credential(&self) -> Result<Credential> {
        let account = self
            .account
            .as_deref()
            .ok_or_else(|| Error::config_invalid("storage account name is not configured"))?;
        let key = self.primary_key.as_deref().ok_or_else(|| {
            Error::config_invalid(format!(
                "account key of storage account {account} is not configured"
            ))
        })?;

        Credential::from_base64_key(account, key)
    }

    /// Build the signing context for `service`.
    pub fn signing_context(&self, service: Service) -> Result<SigningContext> {
        Ok(SigningContext::new(self.credential()?, service))
    }
}
