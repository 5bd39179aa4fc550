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

use http::{HeaderMap, Method};
use log::debug;
use sharedkey_core::SigningRequest;

use crate::canonicalize::{canonicalize_headers, canonicalize_resource};
use crate::string_to_sign::{
    build_string_to_sign, format_authorization_header, generate_signature_with_key,
    StringToSignLayout,
};
use crate::{Credential, KeyVariant, Service};

/// Everything needed to sign requests for one account and service.
///
/// Built once from the configuration and shared freely afterwards: signing
/// only reads it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SigningContext {
    credential: Credential,
    service: Service,
    variant: KeyVariant,
}

impl SigningContext {
    /// Create a context using the default key variant of `service`.
    pub fn new(credential: Credential, service: Service) -> Self {
        Self {
            credential,
            service,
            variant: KeyVariant::default_for(service),
        }
    }

    /// Use `variant` instead of the service default.
    pub fn with_variant(mut self, variant: KeyVariant) -> Self {
        self.variant = variant;
        self
    }

    /// Credential used to sign.
    pub fn credential(&self) -> &Credential {
        &self.credential
    }

    /// Service whose rules are applied.
    pub fn service(&self) -> Service {
        self.service
    }

    /// Key variant in use.
    pub fn variant(&self) -> KeyVariant {
        self.variant
    }

    /// Compute the `Authorization` header value for a request.
    ///
    /// `path_with_query` must be the exact path and query sent on the wire and
    /// `headers` must hold every header the request will carry, `x-ms-date`
    /// included. The same inputs always produce the same value.
    pub fn sign(
        &self,
        method: &Method,
        host: &str,
        path_with_query: &str,
        headers: &HeaderMap,
    ) -> String {
        sign(
            self.service,
            self.variant,
            &self.credential,
            method,
            host,
            path_with_query,
            headers,
        )
    }

    /// Same as [`SigningContext::sign`] for a [`SigningRequest`].
    pub fn sign_request(&self, req: &SigningRequest) -> String {
        self.sign(&req.method, req.host(), &req.path, &req.headers)
    }
}

/// Compute the `Authorization` header value without building a context.
///
/// `host` only shows up in logs: the canonicalized resource is built from the
/// account name, never from the host.
pub fn sign(
    service: Service,
    variant: KeyVariant,
    credential: &Credential,
    method: &Method,
    host: &str,
    path_with_query: &str,
    headers: &HeaderMap,
) -> String {
    debug!("signing {method} {host}{path_with_query} for {service} with {variant}");

    let canonicalized_headers = canonicalize_headers(headers);
    let canonicalized_resource = canonicalize_resource(&credential.account_name, path_with_query);

    let string_to_sign = build_string_to_sign(
        StringToSignLayout::select(service, variant),
        method.as_str(),
        headers,
        &canonicalized_headers,
        &canonicalized_resource,
    );
    let signature = generate_signature_with_key(&credential.account_key, &string_to_sign);

    format_authorization_header(variant, &credential.account_name, &signature)
}

#[cfg(test)]
mod tests {
    use super::*;
    use http::HeaderValue;
    use pretty_assertions::assert_eq;

    const DATE: &str = "Tue, 01 Mar 2022 08:12:34 GMT";

    fn scenario_headers() -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert("x-ms-version", HeaderValue::from_static("2021-08-06"));
        headers.insert("x-ms-date", HeaderValue::from_static(DATE));
        headers.insert("x-ms-client-request-id", HeaderValue::from_static("abc"));
        headers
    }

    fn context(variant: KeyVariant) -> SigningContext {
        let cred = Credential::from_base64_key("acct", "c2VjcmV0").unwrap();
        SigningContext::new(cred, Service::Blob).with_variant(variant)
    }

    #[test]
    fn test_list_containers_shared_key_lite() {
        let ctx = context(KeyVariant::SharedKeyLite);
        let auth = ctx.sign(
            &Method::GET,
            "acct.blob.core.example.com",
            "/mycontainer?restype=container&comp=list",
            &scenario_headers(),
        );

        assert!(auth.starts_with("SharedKeyLite acct:"));
        assert_eq!(
            auth,
            "SharedKeyLite acct:UJmDTyPbIlXp6b981y7ZeykPWvJpcI1sfxJmuU9BUek="
        );
    }

    #[test]
    fn test_list_containers_shared_key() {
        let ctx = context(KeyVariant::SharedKey);
        let auth = ctx.sign(
            &Method::GET,
            "acct.blob.core.example.com",
            "/mycontainer?restype=container&comp=list",
            &scenario_headers(),
        );
        assert_eq!(
            auth,
            "SharedKey acct:ESxbxNjtYcJYEvQnPeN56D7fTbQb0qVTbkDpUdxkXFc="
        );
    }

    #[test]
    fn test_sign_is_reproducible() {
        let ctx = context(KeyVariant::SharedKeyLite);
        let first = ctx.sign(
            &Method::GET,
            "acct.blob.core.example.com",
            "/mycontainer?restype=container&comp=list",
            &scenario_headers(),
        );
        // Parameter order on the wire doesn't matter.
        let second = ctx.sign(
            &Method::GET,
            "acct.blob.core.example.com",
            "/mycontainer?comp=list&restype=container",
            &scenario_headers(),
        );
        assert_eq!(first, second);
    }

    #[test]
    fn test_sign_request_matches_sign() {
        let ctx = context(KeyVariant::SharedKeyLite);
        let req = SigningRequest::new(
            Method::GET,
            "acct.blob.core.example.com",
            "/mycontainer?restype=container&comp=list",
        )
        .unwrap()
        .with_headers(scenario_headers());

        assert_eq!(
            ctx.sign_request(&req),
            "SharedKeyLite acct:UJmDTyPbIlXp6b981y7ZeykPWvJpcI1sfxJmuU9BUek="
        );
    }

    #[test]
    fn test_free_sign() {
        let cred = Credential::from_base64_key("acct", "c2VjcmV0").unwrap();
        let auth = sign(
            Service::Blob,
            KeyVariant::SharedKeyLite,
            &cred,
            &Method::GET,
            "acct.blob.core.example.com",
            "/mycontainer?restype=container&comp=list",
            &scenario_headers(),
        );
        assert_eq!(
            auth,
            "SharedKeyLite acct:UJmDTyPbIlXp6b981y7ZeykPWvJpcI1sfxJmuU9BUek="
        );
    }

    #[test]
    fn test_default_variant_follows_service() {
        let cred = Credential::new("acct", b"secret".to_vec());
        let table = SigningContext::new(cred.clone(), Service::Table);
        assert_eq!(table.variant(), KeyVariant::SharedKeyLite);
        let queue = SigningContext::new(cred, Service::Queue);
        assert_eq!(queue.variant(), KeyVariant::SharedKey);
    }

    #[test]
    fn test_debug_does_not_leak_key() {
        let ctx = context(KeyVariant::SharedKey);
        assert!(!format!("{ctx:?}").contains("secret"));
    }
}
