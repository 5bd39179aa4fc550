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

//! String-to-sign assembly, signature and `Authorization` header.
//!
//! ## Reference
//!
//! - [Blob, Queue, and File services (Shared Key authorization)](https://learn.microsoft.com/en-us/rest/api/storageservices/authorize-with-shared-key#blob-queue-and-file-services-shared-key-authorization)
//! - [Table service (Shared Key authorization)](https://learn.microsoft.com/en-us/rest/api/storageservices/authorize-with-shared-key#table-service-shared-key-authorization)

use http::HeaderMap;
use log::debug;
use sharedkey_core::hash::{base64_decode, base64_hmac_sha256};
use sharedkey_core::{Error, Result};

use crate::constants::X_MS_DATE;
use crate::{KeyVariant, Service};

/// One line of the string-to-sign.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Slot {
    /// The HTTP verb.
    Verb,
    /// The value of the named header, or empty when absent.
    Header(&'static str),
}

/// Which lines make up the string-to-sign, and whether the canonicalized
/// `x-ms-*` headers follow them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StringToSignLayout {
    /// Lines in signing order.
    pub slots: &'static [Slot],
    /// Whether the canonicalized headers block is part of the string.
    pub canonicalized_headers: bool,
}

/// ```text
/// VERB + "\n" +
/// Content-Encoding + "\n" +
/// Content-Language + "\n" +
/// Content-Length + "\n" +
/// Content-MD5 + "\n" +
/// Content-Type + "\n" +
/// Date + "\n" +
/// If-Modified-Since + "\n" +
/// If-Match + "\n" +
/// If-None-Match + "\n" +
/// If-Unmodified-Since + "\n" +
/// Range + "\n" +
/// CanonicalizedHeaders +
/// CanonicalizedResource;
/// ```
pub const BLOB_QUEUE_SHARED_KEY: StringToSignLayout = StringToSignLayout {
    slots: &[
        Slot::Verb,
        Slot::Header("content-encoding"),
        Slot::Header("content-language"),
        Slot::Header("content-length"),
        Slot::Header("content-md5"),
        Slot::Header("content-type"),
        Slot::Header("date"),
        Slot::Header("if-modified-since"),
        Slot::Header("if-match"),
        Slot::Header("if-none-match"),
        Slot::Header("if-unmodified-since"),
        Slot::Header("range"),
    ],
    canonicalized_headers: true,
};

/// ```text
/// VERB + "\n" +
/// Content-MD5 + "\n" +
/// Content-Type + "\n" +
/// Date + "\n" +
/// CanonicalizedHeaders +
/// CanonicalizedResource;
/// ```
pub const BLOB_QUEUE_SHARED_KEY_LITE: StringToSignLayout = StringToSignLayout {
    slots: &[
        Slot::Verb,
        Slot::Header("content-md5"),
        Slot::Header("content-type"),
        Slot::Header("date"),
    ],
    canonicalized_headers: true,
};

/// ```text
/// VERB + "\n" +
/// Content-MD5 + "\n" +
/// Content-Type + "\n" +
/// x-ms-date + "\n" +
/// CanonicalizedResource;
/// ```
pub const TABLE_SHARED_KEY: StringToSignLayout = StringToSignLayout {
    slots: &[
        Slot::Verb,
        Slot::Header("content-md5"),
        Slot::Header("content-type"),
        Slot::Header(X_MS_DATE),
    ],
    canonicalized_headers: false,
};

/// ```text
/// x-ms-date + "\n" +
/// CanonicalizedResource;
/// ```
pub const TABLE_SHARED_KEY_LITE: StringToSignLayout = StringToSignLayout {
    slots: &[Slot::Header(X_MS_DATE)],
    canonicalized_headers: false,
};

impl StringToSignLayout {
    /// Pick the layout for a service and key variant.
    pub fn select(service: Service, variant: KeyVariant) -> &'static StringToSignLayout {
        match (service.is_table(), variant) {
            (false, KeyVariant::SharedKey) => &BLOB_QUEUE_SHARED_KEY,
            (false, KeyVariant::SharedKeyLite) => &BLOB_QUEUE_SHARED_KEY_LITE,
            (true, KeyVariant::SharedKey) => &TABLE_SHARED_KEY,
            (true, KeyVariant::SharedKeyLite) => &TABLE_SHARED_KEY_LITE,
        }
    }
}

/// Construct the string to sign.
///
/// Every slot of `layout` becomes one line terminated by `\n`. Then, if the
/// layout carries them and they are not empty, the canonicalized headers
/// followed by `\n`. The canonicalized resource comes last, without a
/// trailing newline.
pub fn build_string_to_sign(
    layout: &StringToSignLayout,
    verb: &str,
    headers: &HeaderMap,
    canonicalized_headers: &str,
    canonicalized_resource: &str,
) -> String {
    let mut s = String::with_capacity(128);

    for slot in layout.slots {
        match slot {
            Slot::Verb => s.push_str(verb),
            Slot::Header(name) => {
                if let Some(v) = headers.get(*name) {
                    s.push_str(&String::from_utf8_lossy(v.as_bytes()));
                }
            }
        }
        s.push('\n');
    }

    if layout.canonicalized_headers && !canonicalized_headers.is_empty() {
        s.push_str(canonicalized_headers);
        s.push('\n');
    }

    s.push_str(canonicalized_resource);

    debug!("string to sign: {:?}", &s);

    s
}

/// `Base64(HMAC-SHA256(Base64Decode(key), UTF8(string_to_sign)))`
///
/// Surrounding whitespace of the key is ignored, as in
/// [`Credential::from_base64_key`](crate::Credential::from_base64_key).
pub fn generate_signature(account_key: &str, string_to_sign: &str) -> Result<String> {
    let account_key = account_key.trim();
    if account_key.is_empty() {
        return Err(Error::config_invalid("account key is empty"));
    }

    let key = base64_decode(account_key).map_err(|e| {
        Error::config_invalid("account key is not valid base64").with_source(e)
    })?;

    Ok(generate_signature_with_key(&key, string_to_sign))
}

/// Same as [`generate_signature`] with a key that is already decoded.
pub fn generate_signature_with_key(key: &[u8], string_to_sign: &str) -> String {
    base64_hmac_sha256(key, string_to_sign.as_bytes())
}

/// Format `"<SharedKey|SharedKeyLite> <account>:<signature>"`.
pub fn format_authorization_header(variant: KeyVariant, account: &str, signature: &str) -> String {
    format!("{} {account}:{signature}", variant.scheme())
}
