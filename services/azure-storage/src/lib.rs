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

//! Azure Storage Shared Key signing.
//!
//! This crate signs Blob, Queue and Table REST requests with the storage
//! account key, using either the `SharedKey` or the `SharedKeyLite` scheme,
//! and ships a small client for the blob and table operations built on it.
//!
//! # Signing a request
//!
//! ```rust,no_run
//! use anyhow::Result;
//! use sharedkey_azure_storage::{DefaultCredentialProvider, RequestSigner, Service};
//! use sharedkey_core::{Context, OsEnv, Signer};
//! use sharedkey_file_read_tokio::TokioFileRead;
//! use sharedkey_http_send_reqwest::ReqwestHttpSend;
//!
//! #[tokio::main]
//! async fn main() -> Result<()> {
//!     let ctx = Context::new()
//!         .with_file_read(TokioFileRead)
//!         .with_http_send(ReqwestHttpSend::default())
//!         .with_env(OsEnv);
//!
//!     // Env, then AZURE_STORAGE_CONNECTION_STRING, then AZURE_STORAGE_CONFIG_FILE.
//!     let loader = DefaultCredentialProvider::new();
//!     let builder = RequestSigner::new(Service::Blob);
//!     let signer = Signer::new(ctx, loader, builder);
//!
//!     let req = http::Request::get("https://account.blob.core.windows.net/container?restype=container&comp=list")
//!         .body(())?;
//!     let (mut parts, _) = req.into_parts();
//!     signer.sign(&mut parts).await?;
//!
//!     println!("{:?}", parts.headers);
//!     Ok(())
//! }
//! ```
//!
//! # Computing a signature only
//!
//! ```rust
//! use http::{HeaderMap, HeaderValue, Method};
//! use sharedkey_azure_storage::{Credential, KeyVariant, Service, SigningContext};
//!
//! let credential = Credential::from_base64_key("acct", "c2VjcmV0").unwrap();
//! let ctx = SigningContext::new(credential, Service::Blob).with_variant(KeyVariant::SharedKeyLite);
//!
//! let mut headers = HeaderMap::new();
//! headers.insert("x-ms-date", HeaderValue::from_static("Tue, 01 Mar 2022 08:12:34 GMT"));
//! headers.insert("x-ms-version", HeaderValue::from_static("2021-08-06"));
//!
//! let authorization = ctx.sign(&Method::GET, "acct.blob.core.windows.net", "/?comp=list", &headers);
//! assert!(authorization.starts_with("SharedKeyLite acct:"));
//! ```

#![warn(missing_docs)]

mod constants;

mod service;
pub use service::{KeyVariant, Service};

pub mod canonicalize;
pub use canonicalize::{canonicalize_headers, canonicalize_resource, locale_cmp, split_key_value};

pub mod string_to_sign;
pub use string_to_sign::{
    build_string_to_sign, format_authorization_header, generate_signature,
    generate_signature_with_key, StringToSignLayout,
};

mod signing_context;
pub use signing_context::{sign, SigningContext};

mod credential;
pub use credential::Credential;

mod config;
pub use config::Config;

mod connection_string;

mod sign_request;
pub use sign_request::RequestSigner;

mod provide_credential;
pub use provide_credential::*;

mod model;
pub use model::{BlobItem, BlobProperties, ContainerItem, ContainerProperties};

mod client;
pub use client::StorageClient;
