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

//! Response bodies of the blob and table operations.

use serde::{Deserialize, Deserializer};
use sharedkey_core::time::{parse_http_date, DateTime};
use sharedkey_core::{Error, Result};

fn deserialize_http_date<'de, D>(deserializer: D) -> std::result::Result<DateTime, D::Error>
where
    D: Deserializer<'de>,
{
    let s = String::deserialize(deserializer)?;
    parse_http_date(&s).map_err(serde::de::Error::custom)
}

/// `EnumerationResults` of [List Containers](https://learn.microsoft.com/en-us/rest/api/storageservices/list-containers2).
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, rename_all = "PascalCase")]
pub(crate) struct ListContainersResponse {
    pub containers: Containers,
    pub next_marker: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub(crate) struct Containers {
    #[serde(rename = "Container", default)]
    pub containers: Vec<ContainerItem>,
}

/// One container of a listing.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ContainerItem {
    /// Container name.
    pub name: String,
    /// System properties.
    pub properties: ContainerProperties,
}

/// Properties of a listed container.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ContainerProperties {
    /// Last time the container or its properties changed.
    #[serde(deserialize_with = "deserialize_http_date", rename = "Last-Modified")]
    pub last_modified: DateTime,
    /// Entity tag.
    pub etag: Option<String>,
    /// `unlocked` or `locked`.
    pub lease_status: Option<String>,
    /// Lease state, `available` when not leased.
    pub lease_state: Option<String>,
}

/// `EnumerationResults` of [List Blobs](https://learn.microsoft.com/en-us/rest/api/storageservices/list-blobs).
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, rename_all = "PascalCase")]
pub(crate) struct ListBlobsResponse {
    pub blobs: Blobs,
    pub next_marker: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub(crate) struct Blobs {
    #[serde(rename = "Blob", default)]
    pub blobs: Vec<BlobItem>,
}

/// One blob of a listing.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct BlobItem {
    /// Blob name, relative to the container.
    pub name: String,
    /// System properties.
    pub properties: BlobProperties,
}

/// Properties of a listed blob.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct BlobProperties {
    /// Last time the blob or its properties changed.
    #[serde(deserialize_with = "deserialize_http_date", rename = "Last-Modified")]
    pub last_modified: DateTime,
    /// Entity tag.
    pub etag: Option<String>,
    /// Size in bytes.
    #[serde(rename = "Content-Length")]
    pub content_length: Option<u64>,
    /// MIME type.
    #[serde(rename = "Content-Type")]
    pub content_type: Option<String>,
    /// `BlockBlob`, `PageBlob` or `AppendBlob`.
    pub blob_type: Option<String>,
}

impl ListContainersResponse {
    pub fn from_xml(bs: &[u8]) -> Result<Self> {
        quick_xml::de::from_reader(bs)
            .map_err(|e| Error::unexpected("failed to parse container listing").with_source(e))
    }
}

impl ListBlobsResponse {
    pub fn from_xml(bs: &[u8]) -> Result<Self> {
        quick_xml::de::from_reader(bs)
            .map_err(|e| Error::unexpected("failed to parse blob listing").with_source(e))
    }
}

/// Entities of a table query.
///
/// A query on a collection answers `{"value": [...]}`, a point query on one
/// `PartitionKey` and `RowKey` answers the entity itself.
pub(crate) fn parse_entities(bs: &[u8]) -> Result<Vec<serde_json::Value>> {
    let value: serde_json::Value = serde_json::from_slice(bs)
        .map_err(|e| Error::unexpected("failed to parse table entities").with_source(e))?;

    match value {
        serde_json::Value::Object(mut map) => match map.remove("value") {
            Some(serde_json::Value::Array(entities)) => Ok(entities),
            Some(other) => {
                map.insert("value".to_string(), other);
                Ok(vec![serde_json::Value::Object(map)])
            }
            None => Ok(vec![serde_json::Value::Object(map)]),
        },
        serde_json::Value::Array(entities) => Ok(entities),
        other => Err(Error::unexpected(format!(
            "table query returned neither entities nor an entity: {other}"
        ))),
    }
}
