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

//! List every container of an account with the age of its blobs.
//!
//! ```shell
//! AZURE_STORAGE_CONNECTION_STRING="UseDevelopmentStorage=true" cargo run --example list_blobs
//! ```

use anyhow::Result;
use log::info;
use sharedkey_azure_storage::{Config, Service, StorageClient};
use sharedkey_core::time::now;
use sharedkey_core::{Context, OsEnv};
use sharedkey_file_read_tokio::TokioFileRead;
use sharedkey_http_send_reqwest::ReqwestHttpSend;

#[tokio::main]
async fn main() -> Result<()> {
    let _ = env_logger::builder().try_init();

    let ctx = Context::new()
        .with_file_read(TokioFileRead)
        .with_http_send(ReqwestHttpSend::default())
        .with_env(OsEnv);

    let config = match ctx.env_var("AZURE_STORAGE_CONNECTION_STRING") {
        Some(conn_str) => Config::try_from_connection_string(&conn_str, Service::Blob)?,
        None => Config::default().from_env(&ctx),
    };
    let client = StorageClient::new(ctx, config)?;

    let containers = client.list_containers(&[]).await?;
    info!("total {} containers", containers.len());

    for container in containers {
        let blobs = client.list_blobs(&container.name, &[]).await?;
        for blob in &blobs {
            let age = now() - blob.properties.last_modified;
            println!(
                "{}/{}: {}h{}m old",
                container.name,
                blob.name,
                age.num_hours(),
                age.num_minutes() % 60
            );
        }
        info!("{} blobs in container {}", blobs.len(), container.name);
    }

    Ok(())
}
