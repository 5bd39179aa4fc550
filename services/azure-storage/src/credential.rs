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

use sharedkey_core::hash::base64_decode;
use sharedkey_core::utils::Redact;
use sharedkey_core::{Error, Result, SigningCredential};

/// Shared key credential: the storage account name and its decoded key.
///
/// The key is decoded once, when the credential is built, so signing a
/// request can no longer fail on a malformed key.
#[derive(Clone, PartialEq, Eq)]
pub struct Credential {
    /// Azure storage account name.
    pub account_name: String,
    /// Azure storage account key, base64-decoded.
    pub account_key: Vec<u8>,
}

impl Debug for Credential {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credential")
            .field("account_name", &self.account_name)
            .field("account_key", &Redact::from(&self.account_key))
            .finish()
    }
}

impl SigningCredential for Credential {
    fn is_valid(&self) -> bool {
        !self.account_name.is_empty() && !self.account_key.is_empty()
    }
}

impl Credential {
    /// Create a credential from an already decoded key.
    pub fn new(account_name: impl Into<String>, account_key: impl Into<Vec<u8>>) -> Self {
        Self {
            account_name: account_name.into(),
            account_key: account_key.into(),
        }
    }

    /// Create a credential from the base64 key shown in the Azure portal.
    ///
    /// Fails with [`ErrorKind::ConfigInvalid`](sharedkey_core::ErrorKind::ConfigInvalid)
    /// when the account name or key is empty or the key is not valid base64.
    pub fn from_base64_key(account_name: &str, account_key: &str) -> Result<Self> {
        if account_name.is_empty() {
            return Err(Error::config_invalid("storage account name is empty"));
        }

        let account_key = account_key.trim();
        if account_key.is_empty() {
            return Err(Error::config_invalid(format!(
                "account key of storage account {account_name} is empty"
            )));
        }

        let key = base64_decode(account_key).map_err(|e| {
            Error::config_invalid(format!(
                "account key of storage account {account_name} is not valid base64"
            ))
            .with_source(e)
        })?;
        if key.is_empty() {
            return Err(Error::config_invalid(format!(
                "account key of storage account {account_name} decodes to nothing"
            )));
        }

        Ok(Self::new(account_name, key))
    }
}
