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

use bytes::Bytes;
use http::{HeaderMap, HeaderValue, Method, Request, Response, StatusCode};
use log::{debug, warn};
use percent_encoding::utf8_percent_encode;
use sharedkey_core::{Context, Error, Result, Signer};

use crate::constants::*;
use crate::model::{parse_entities, ListBlobsResponse, ListContainersResponse};
use crate::{
    BlobItem, Config, ContainerItem, Credential, RequestSigner, Service,
    StaticCredentialProvider,
};

/// Client for the blob and table operations of one storage account.
///
/// Every request is signed with the account's shared key. Deletes and blob
/// properties report the outcome through their return value; listings and
/// queries fail with [`ErrorKind::Unexpected`](sharedkey_core::ErrorKind::Unexpected)
/// on any non-success status.
#[derive(Debug, Clone)]
pub struct StorageClient {
    ctx: Context,
    config: Config,
    blob: Signer<Credential>,
    table: Signer<Credential>,
}

impl StorageClient {
    /// Create a client with the credential found in `config`.
    pub fn new(ctx: Context, config: Config) -> Result<Self> {
        let credential = config.credential()?;
        Ok(Self::with_credential(ctx, config, credential))
    }

    /// Create a client signing with `credential`.
    ///
    /// Hosts, versions and the client request id still come from `config`.
    pub fn with_credential(ctx: Context, config: Config, credential: Credential) -> Self {
        let signer = |service| {
            Signer::new(
                ctx.clone(),
                StaticCredentialProvider::new(credential.clone()),
                RequestSigner::from_config(&config, service),
            )
        };
        let blob = signer(Service::Blob);
        let table = signer(Service::Table);

        Self {
            ctx,
            config,
            blob,
            table,
        }
    }

    /// Configuration in use.
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// [List Containers](https://learn.microsoft.com/en-us/rest/api/storageservices/list-containers2)
    ///
    /// `params` are appended to `?comp=list`, for example `prefix` or
    /// `maxresults`.
    pub async fn list_containers(&self, params: &[(&str, &str)]) -> Result<Vec<ContainerItem>> {
        let mut path = "/?comp=list".to_string();
        push_params(&mut path, params);

        let resp = self
            .send(Service::Blob, Method::GET, &path, HeaderMap::new())
            .await?;
        let body = expect_status(resp, StatusCode::OK, "list containers")?;

        let resp = ListContainersResponse::from_xml(&body)?;
        if let Some(marker) = resp.next_marker.filter(|m| !m.is_empty()) {
            debug!("more containers available after marker {marker}");
        }
        Ok(resp.containers.containers)
    }

    /// [Delete Container](https://learn.microsoft.com/en-us/rest/api/storageservices/delete-container)
    ///
    /// Returns whether the service accepted the deletion.
    pub async fn delete_container(&self, name: &str, timeout: Option<u64>) -> Result<bool> {
        let path = format!(
            "/{}?restype=container&timeout={}",
            encode_component(name),
            timeout.unwrap_or(DEFAULT_TIMEOUT)
        );

        let resp = self
            .send(Service::Blob, Method::DELETE, &path, HeaderMap::new())
            .await?;
        Ok(resp.status() == StatusCode::ACCEPTED)
    }

    /// [List Blobs](https://learn.microsoft.com/en-us/rest/api/storageservices/list-blobs)
    ///
    /// `params` are appended to `?restype=container&comp=list`.
    pub async fn list_blobs(
        &self,
        container: &str,
        params: &[(&str, &str)],
    ) -> Result<Vec<BlobItem>> {
        let mut path = format!("/{}?restype=container&comp=list", encode_component(container));
        push_params(&mut path, params);

        let resp = self
            .send(Service::Blob, Method::GET, &path, HeaderMap::new())
            .await?;
        let body = expect_status(resp, StatusCode::OK, "list blobs")?;

        let resp = ListBlobsResponse::from_xml(&body)?;
        if let Some(marker) = resp.next_marker.filter(|m| !m.is_empty()) {
            debug!("more blobs in {container} available after marker {marker}");
        }
        Ok(resp.blobs.blobs)
    }

    /// [Delete Blob](https://learn.microsoft.com/en-us/rest/api/storageservices/delete-blob)
    ///
    /// Returns whether the service accepted the deletion.
    pub async fn delete_blob(
        &self,
        container: &str,
        blob: &str,
        timeout: Option<u64>,
    ) -> Result<bool> {
        let path = blob_path(container, blob, timeout);

        let resp = self
            .send(Service::Blob, Method::DELETE, &path, HeaderMap::new())
            .await?;
        Ok(resp.status() == StatusCode::ACCEPTED)
    }

    /// [Get Blob Properties](https://learn.microsoft.com/en-us/rest/api/storageservices/get-blob-properties)
    ///
    /// Returns the response headers, or `None` when the blob can't be read.
    pub async fn get_blob_properties(
        &self,
        container: &str,
        blob: &str,
        timeout: Option<u64>,
    ) -> Result<Option<HeaderMap>> {
        let path = blob_path(container, blob, timeout);

        let resp = self
            .send(Service::Blob, Method::HEAD, &path, HeaderMap::new())
            .await?;
        if resp.status() != StatusCode::OK {
            return Ok(None);
        }
        Ok(Some(resp.into_parts().0.headers))
    }

    /// [Query Entities](https://learn.microsoft.com/en-us/rest/api/storageservices/query-entities)
    ///
    /// With `keys` set to `(PartitionKey, RowKey)` a single entity is
    /// fetched. `query` holds OData options such as `$filter` or `$top`.
    pub async fn query_entities(
        &self,
        table: &str,
        keys: Option<(&str, &str)>,
        query: &[(&str, &str)],
    ) -> Result<Vec<serde_json::Value>> {
        let mut path = match keys {
            Some((partition_key, row_key)) => entity_path(table, partition_key, row_key),
            None => format!("/{table}()"),
        };
        for (i, (k, v)) in query.iter().enumerate() {
            path.push(if i == 0 { '?' } else { '&' });
            path.push_str(k);
            path.push('=');
            path.push_str(&encode_component(v));
        }

        let resp = self
            .send(Service::Table, Method::GET, &path, HeaderMap::new())
            .await?;
        let body = expect_status(resp, StatusCode::OK, "query entities")?;

        parse_entities(&body)
    }

    /// [Delete Entity](https://learn.microsoft.com/en-us/rest/api/storageservices/delete-entity1)
    ///
    /// Deletes unconditionally. Returns whether the entity was deleted.
    pub async fn delete_entity(
        &self,
        table: &str,
        partition_key: &str,
        row_key: &str,
    ) -> Result<bool> {
        let path = entity_path(table, partition_key, row_key);
        let mut headers = HeaderMap::new();
        headers.insert(http::header::IF_MATCH, HeaderValue::from_static("*"));

        let resp = self
            .send(Service::Table, Method::DELETE, &path, headers)
            .await?;
        Ok(resp.status() == StatusCode::NO_CONTENT)
    }

    async fn send(
        &self,
        service: Service,
        method: Method,
        path_with_query: &str,
        headers: HeaderMap,
    ) -> Result<Response<Bytes>> {
        let host = self.config.endpoint_host(service)?;
        let uri = format!(
            "{}://{host}{}{path_with_query}",
            self.config.protocol(),
            self.config.path_prefix()
        );

        let mut req = Request::builder()
            .method(method)
            .uri(&uri)
            .body(Bytes::new())?;
        req.headers_mut().extend(headers);

        let (mut parts, body) = req.into_parts();
        let signer = match service {
            Service::Table => &self.table,
            Service::Blob | Service::Queue => &self.blob,
        };
        signer.sign(&mut parts).await?;

        let resp = self.ctx.http_send(Request::from_parts(parts, body)).await?;
        debug!("{} {uri}: {}", service, resp.status());
        Ok(resp)
    }
}

fn encode_component(s: &str) -> String {
    utf8_percent_encode(s, &URI_COMPONENT_ENCODE_SET).to_string()
}

fn push_params(path: &mut String, params: &[(&str, &str)]) {
    for (k, v) in params {
        path.push('&');
        path.push_str(&encode_component(k));
        path.push('=');
        path.push_str(&encode_component(v));
    }
}

fn blob_path(container: &str, blob: &str, timeout: Option<u64>) -> String {
    format!(
        "/{}/{}?timeout={}",
        encode_component(container),
        utf8_percent_encode(blob, &BLOB_PATH_ENCODE_SET),
        timeout.unwrap_or(DEFAULT_TIMEOUT)
    )
}

fn entity_path(table: &str, partition_key: &str, row_key: &str) -> String {
    format!(
        "/{table}(PartitionKey='{}',RowKey='{}')",
        encode_component(partition_key),
        encode_component(row_key)
    )
}

/// Return the body when the status matches, an error carrying both
/// otherwise.
fn expect_status(resp: Response<Bytes>, expected: StatusCode, operation: &str) -> Result<Bytes> {
    let (parts, body) = resp.into_parts();
    if parts.status == expected {
        return Ok(body);
    }

    let body = String::from_utf8_lossy(&body);
    warn!("{operation} failed with {}: {body}", parts.status);
    Err(Error::unexpected(format!(
        "{operation} failed with status {}: {body}",
        parts.status
    )))
}
