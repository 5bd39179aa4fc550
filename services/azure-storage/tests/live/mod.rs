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

//! Tests against a real storage account, or Azurite.
//!
//! Enabled by `SHAREDKEY_AZURE_STORAGE_TEST=on`. The account comes from
//! `AZURE_STORAGE_CONNECTION_STRING` when set, from `AZURE_STORAGE_ACCOUNT_NAME`
//! and `AZURE_STORAGE_ACCOUNT_KEY` otherwise. A `.env` file is honored.

use std::env;

use anyhow::Result;
use log::{debug, warn};
use sharedkey_azure_storage::{Config, Service, StorageClient};
use sharedkey_core::{Context, OsEnv};
use sharedkey_file_read_tokio::TokioFileRead;
use sharedkey_http_send_reqwest::ReqwestHttpSend;

fn init_client(service: Service) -> Option<StorageClient> {
    let _ = env_logger::builder().is_test(true).try_init();
    let _ = dotenv::dotenv();

    if env::var("SHAREDKEY_AZURE_STORAGE_TEST").unwrap_or_default() != "on" {
        return None;
    }

    let ctx = Context::new()
        .with_file_read(TokioFileRead)
        .with_http_send(ReqwestHttpSend::default())
        .with_env(OsEnv);

    let config = match env::var("AZURE_STORAGE_CONNECTION_STRING") {
        Ok(conn_str) => Config::try_from_connection_string(&conn_str, service)
            .expect("connection string must be valid"),
        Err(_) => Config::default().from_env(&ctx),
    };

    Some(StorageClient::new(ctx, config).expect("storage account must be configured"))
}

#[tokio::test]
async fn test_list_containers() -> Result<()> {
    let Some(client) = init_client(Service::Blob) else {
        warn!("SHAREDKEY_AZURE_STORAGE_TEST is not set, skipped");
        return Ok(());
    };

    let containers = client.list_containers(&[("maxresults", "5")]).await?;
    debug!("got containers: {containers:?}");
    assert!(containers.len() <= 5);

    Ok(())
}

#[tokio::test]
async fn test_get_properties_of_missing_blob() -> Result<()> {
    let Some(client) = init_client(Service::Blob) else {
        warn!("SHAREDKEY_AZURE_STORAGE_TEST is not set, skipped");
        return Ok(());
    };

    let container = env::var("SHAREDKEY_AZURE_STORAGE_CONTAINER").unwrap_or_else(|_| "test".into());
    let headers = client
        .get_blob_properties(&container, "not_exist_file !@#$%^&*()_+-=;:'><,?.txt", None)
        .await?;
    assert!(headers.is_none());

    Ok(())
}

#[tokio::test]
async fn test_list_blobs_with_prefix() -> Result<()> {
    let Some(client) = init_client(Service::Blob) else {
        warn!("SHAREDKEY_AZURE_STORAGE_TEST is not set, skipped");
        return Ok(());
    };

    let container = env::var("SHAREDKEY_AZURE_STORAGE_CONTAINER").unwrap_or_else(|_| "test".into());
    for prefix in ["", "test/path/to/dir", "test dir/é"] {
        let blobs = client.list_blobs(&container, &[("prefix", prefix)]).await?;
        debug!("got {} blobs under {prefix:?}", blobs.len());
    }

    Ok(())
}

#[tokio::test]
async fn test_query_entities() -> Result<()> {
    let Some(client) = init_client(Service::Table) else {
        warn!("SHAREDKEY_AZURE_STORAGE_TEST is not set, skipped");
        return Ok(());
    };

    let Ok(table) = env::var("SHAREDKEY_AZURE_STORAGE_TABLE") else {
        warn!("SHAREDKEY_AZURE_STORAGE_TABLE is not set, skipped");
        return Ok(());
    };

    let entities = client
        .query_entities(&table, None, &[("$top", "5")])
        .await?;
    assert!(entities.len() <= 5);

    // Deleting an entity that doesn't exist is reported, not raised.
    assert!(!client.delete_entity(&table, "missing", "missing").await?);

    Ok(())
}
