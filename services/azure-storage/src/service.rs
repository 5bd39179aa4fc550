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

use std::fmt;
use std::str::FromStr;

use sharedkey_core::Error;

/// Storage service a request targets.
///
/// Blob and Queue share one set of signing rules, Table has its own.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Service {
    /// Blob service, `<account>.blob.<suffix>`.
    Blob,
    /// Queue service, `<account>.queue.<suffix>`.
    Queue,
    /// Table service, `<account>.table.<suffix>`.
    Table,
}

impl Service {
    /// The DNS label naming this service in endpoint hosts.
    pub fn endpoint_name(&self) -> &'static str {
        match self {
            Service::Blob => "blob",
            Service::Queue => "queue",
            Service::Table => "table",
        }
    }

    /// Whether requests to this service use the Table signing rules.
    pub fn is_table(&self) -> bool {
        matches!(self, Service::Table)
    }

    /// Guess the service from the second DNS label of `host`.
    ///
    /// `acct.blob.core.windows.net` is [`Service::Blob`]. Returns `None` for
    /// hosts that don't carry a known label in that position, such as IP
    /// addresses or custom domains; callers must then pick a service
    /// explicitly.
    pub fn from_host(host: &str) -> Option<Service> {
        let mut labels = host.split('.');
        let _account = labels.next()?;
        let label = labels.next()?;
        // A bare `acct.blob` has no suffix and is not an endpoint.
        labels.next()?;

        match label.to_ascii_lowercase().as_str() {
            "blob" => Some(Service::Blob),
            "queue" => Some(Service::Queue),
            "table" => Some(Service::Table),
            _ => None,
        }
    }
}

impl fmt::Display for Service {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.endpoint_name())
    }
}

impl FromStr for Service {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "blob" => Ok(Service::Blob),
            "queue" => Ok(Service::Queue),
            "table" => Ok(Service::Table),
            _ => Err(Error::config_invalid(format!(
                "unknown storage service: {s}"
            ))),
        }
    }
}

/// Authorization scheme variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeyVariant {
    /// `SharedKey`, signs the full set of standard headers.
    SharedKey,
    /// `SharedKeyLite`, signs a reduced set of standard headers.
    SharedKeyLite,
}

impl KeyVariant {
    /// Scheme name used in the `Authorization` header.
    pub fn scheme(&self) -> &'static str {
        match self {
            KeyVariant::SharedKey => "SharedKey",
            KeyVariant::SharedKeyLite => "SharedKeyLite",
        }
    }

    /// Variant used by default for `service`.
    ///
    /// Table requests go out with `SharedKeyLite`, Blob and Queue requests
    /// with the full `SharedKey`.
    pub fn default_for(service: Service) -> KeyVariant {
        if service.is_table() {
            KeyVariant::SharedKeyLite
        } else {
            KeyVariant::SharedKey
        }
    }
}

impl fmt::Display for KeyVariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.scheme())
    }
}

impl FromStr for KeyVariant {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "SharedKey" => Ok(KeyVariant::SharedKey),
            "SharedKeyLite" => Ok(KeyVariant::SharedKeyLite),
            _ => Err(Error::config_invalid(format!("unknown key variant: {s}"))),
        }
    }
}
