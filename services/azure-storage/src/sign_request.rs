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
use http::header::{self, HeaderName};
use http::request::Parts;
use http::HeaderValue;
use log::debug;
use sharedkey_core::time::{format_http_date, now, DateTime};
use sharedkey_core::{Context, Error, Result, SignRequest, SigningRequest};

use crate::constants::*;
use crate::{sign, Config, Credential, KeyVariant, Service};

/// RequestSigner that implement Azure Storage Shared Key Authorization.
///
/// Every request gets a fresh `x-ms-date`. `x-ms-version`,
/// `x-ms-client-request-id`, `Accept` and `Accept-Charset` are added unless
/// the request already carries them, plus `DataServiceVersion` and
/// `MaxDataServiceVersion` for the table service. The signature covers all of
/// them.
///
/// - [Authorize with Shared Key](https://docs.microsoft.com/en-us/rest/api/storageservices/authorize-with-shared-key)
#[derive(Debug, Clone)]
pub struct RequestSigner {
    service: Service,
    variant: KeyVariant,
    version: String,
    client_request_id: Option<String>,
    data_service_version: String,
    max_data_service_version: String,
    time: Option<DateTime>,
}

impl RequestSigner {
    /// Create a new signer for `service` with default settings.
    pub fn new(service: Service) -> Self {
        Self {
            service,
            variant: KeyVariant::default_for(service),
            version: AZURE_VERSION.to_string(),
            client_request_id: None,
            data_service_version: DEFAULT_DATA_SERVICE_VERSION.to_string(),
            max_data_service_version: DEFAULT_MAX_DATA_SERVICE_VERSION.to_string(),
            time: None,
        }
    }

    /// Create a signer for `service` with the versions and client request id
    /// from `config`.
    pub fn from_config(config: &Config, service: Service) -> Self {
        let mut signer = Self::new(service)
            .with_version(config.version())
            .with_client_request_id(config.client_request_id());

        if let Some(v) = &config.data_service_version {
            signer.data_service_version = v.clone();
        }
        if let Some(v) = &config.max_data_service_version {
            signer.max_data_service_version = v.clone();
        }

        signer
    }

    /// Sign with `variant` instead of the service default.
    pub fn with_variant(mut self, variant: KeyVariant) -> Self {
        self.variant = variant;
        self
    }

    /// Set the `x-ms-version` added to requests without one.
    pub fn with_version(mut self, version: impl Into<String>) -> Self {
        self.version = version.into();
        self
    }

    /// Set the `x-ms-client-request-id` added to requests without one.
    pub fn with_client_request_id(mut self, id: impl Into<String>) -> Self {
        self.client_request_id = Some(id.into());
        self
    }

    /// Set `DataServiceVersion` and `MaxDataServiceVersion` for table requests.
    pub fn with_data_service_versions(
        mut self,
        data_service_version: impl Into<String>,
        max_data_service_version: impl Into<String>,
    ) -> Self {
        self.data_service_version = data_service_version.into();
        self.max_data_service_version = max_data_service_version.into();
        self
    }

    /// Specify the signing time.
    ///
    /// # Note
    ///
    /// We should always take current time to sign requests.
    /// Only use this function for testing.
    pub fn with_time(mut self, time: DateTime) -> Self {
        self.time = Some(time);
        self
    }

    /// Service this signer signs for.
    pub fn service(&self) -> Service {
        self.service
    }

    fn insert_default_headers(&self, req: &mut SigningRequest) -> Result<()> {
        let now_time = self.time.unwrap_or_else(now);
        req.headers.insert(
            HeaderName::from_static(X_MS_DATE),
            HeaderValue::from_str(&format_http_date(now_time))?,
        );

        req.header_insert_if_absent(
            HeaderName::from_static(X_MS_VERSION),
            HeaderValue::from_str(&self.version)?,
        );
        if let Some(id) = &self.client_request_id {
            req.header_insert_if_absent(
                HeaderName::from_static(X_MS_CLIENT_REQUEST_ID),
                HeaderValue::from_str(id)?,
            );
        }
        req.header_insert_if_absent(header::ACCEPT, HeaderValue::from_static(DEFAULT_ACCEPT));
        req.header_insert_if_absent(
            header::ACCEPT_CHARSET,
            HeaderValue::from_static(DEFAULT_ACCEPT_CHARSET),
        );

        if self.service.is_table() {
            req.header_insert_if_absent(
                HeaderName::from_static(DATA_SERVICE_VERSION),
                HeaderValue::from_str(&self.data_service_version)?,
            );
            req.header_insert_if_absent(
                HeaderName::from_static(MAX_DATA_SERVICE_VERSION),
                HeaderValue::from_str(&self.max_data_service_version)?,
            );
        }

        Ok(())
    }
}

#[async_trait]
impl SignRequest for RequestSigner {
    type Credential = Credential;

    async fn sign_request(
        &self,
        _: &Context,
        parts: &mut Parts,
        credential: Option<&Self::Credential>,
    ) -> Result<()> {
        let Some(cred) = credential else {
            return Err(Error::credential_invalid("credential is required"));
        };

        let mut req = SigningRequest::build(parts)?;
        self.insert_default_headers(&mut req)?;

        let authorization = sign(
            self.service,
            self.variant,
            cred,
            &req.method,
            req.host(),
            &req.path,
            &req.headers,
        );
        debug!(
            "signed {} {} as {} for {}",
            req.method, req.path, self.variant, cred.account_name
        );

        let mut value = HeaderValue::from_str(&authorization)?;
        value.set_sensitive(true);
        req.headers.insert(header::AUTHORIZATION, value);

        req.apply(parts)
    }
}
