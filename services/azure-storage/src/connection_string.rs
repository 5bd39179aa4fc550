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

use std::collections::HashMap;

use http::Uri;
use log::warn;
use sharedkey_core::{Error, Result};

use crate::{Config, Service};

// Azurite defaults.
const AZURITE_DEFAULT_STORAGE_ACCOUNT_NAME: &str = "devstoreaccount1";
const AZURITE_DEFAULT_STORAGE_ACCOUNT_KEY: &str =
    "Eby8vdM02xNOcqFlqUwJPLlmEtlCDXJ1OUzFT50uSRZ6IFsuFq2UVErCz4I6tq/K1SZFPTOtr/KBHBeksoGMGw==";
const AZURITE_DEFAULT_HOST: &str = "127.0.0.1";

/// Parses an [Azure connection string][1].
///
/// Hosts are filled in for every service the connection string addresses.
/// When endpoints disagree on protocol or path prefix, the one of `service`
/// wins.
///
/// [1]: https://learn.microsoft.com/en-us/azure/storage/common/storage-configure-connection-string
pub(crate) fn parse(conn_str: &str, service: Service) -> Result<Config> {
    let key_values = parse_into_key_values(conn_str)?;

    if let Some(config) = collect_development_config(&key_values, service)? {
        return Ok(config);
    }

    let mut config = Config {
        account: key_values.get("AccountName").cloned(),
        primary_key: key_values.get("AccountKey").cloned(),
        ..Default::default()
    };

    for svc in services_ending_with(service) {
        if let Some(endpoint) = collect_endpoint(&key_values, svc)? {
            apply_endpoint(&mut config, svc, &endpoint)?;
        }
    }

    Ok(config)
}

/// Every service, `preferred` last so that its endpoint decides the protocol
/// and path prefix.
fn services_ending_with(preferred: Service) -> impl Iterator<Item = Service> {
    [Service::Blob, Service::Queue, Service::Table]
        .into_iter()
        .filter(move |s| *s != preferred)
        .chain(Some(preferred))
}

const KNOWN_KEYS: &[&str] = &[
    "AccountName",
    "AccountKey",
    "BlobEndpoint",
    "TableEndpoint",
    "QueueEndpoint",
    "FileEndpoint",
    "DefaultEndpointsProtocol",
    "EndpointSuffix",
    "UseDevelopmentStorage",
    "DevelopmentStorageProxyUri",
    "SharedAccessSignature",
];

fn parse_into_key_values(conn_str: &str) -> Result<HashMap<String, String>> {
    let key_values: HashMap<String, String> = conn_str
        .trim()
        .replace('\n', "")
        .split(';')
        .map(str::trim)
        .filter(|field| !field.is_empty())
        .map(|field| {
            let (key, value) = field.split_once('=').ok_or_else(|| {
                Error::config_invalid(format!(
                    "invalid connection string, expected '=' in field: {field}"
                ))
            })?;
            Ok((key.to_string(), value.to_string()))
        })
        .collect::<Result<_>>()?;

    for key in key_values.keys() {
        if !KNOWN_KEYS.contains(&key.as_str()) {
            warn!("ignored unknown connection string key: {key}");
        }
    }

    Ok(key_values)
}

/// Azurite serves every account under a path prefix, one port per service.
fn collect_development_config(
    key_values: &HashMap<String, String>,
    service: Service,
) -> Result<Option<Config>> {
    if key_values.get("UseDevelopmentStorage").map(String::as_str) != Some("true") {
        return Ok(None);
    }

    let account = key_values
        .get("AccountName")
        .cloned()
        .unwrap_or_else(|| AZURITE_DEFAULT_STORAGE_ACCOUNT_NAME.to_string());
    let account_key = key_values
        .get("AccountKey")
        .cloned()
        .unwrap_or_else(|| AZURITE_DEFAULT_STORAGE_ACCOUNT_KEY.to_string());
    let proxy_uri = key_values.get("DevelopmentStorageProxyUri");

    let mut config = Config {
        primary_key: Some(account_key),
        path_prefix: Some(format!("/{account}")),
        account: Some(account),
        ..Default::default()
    };
    for svc in services_ending_with(service) {
        let endpoint = match proxy_uri {
            Some(uri) => uri.clone(),
            None => format!("http://{AZURITE_DEFAULT_HOST}:{}", azurite_port(svc)),
        };
        apply_endpoint(&mut config, svc, &endpoint)?;
    }

    Ok(Some(config))
}

fn azurite_port(service: Service) -> u16 {
    match service {
        Service::Blob => 10000,
        Service::Queue => 10001,
        Service::Table => 10002,
    }
}

/// Parses an endpoint from the key-value pairs if possible.
///
/// Users are still able to later supplement configuration with a host,
/// so endpoint-related fields aren't enforced.
fn collect_endpoint(
    key_values: &HashMap<String, String>,
    service: Service,
) -> Result<Option<String>> {
    if let Some(endpoint) = key_values.get(endpoint_key(service)) {
        return Ok(Some(endpoint.clone()));
    }

    let (account_name, endpoint_suffix) = match (
        key_values.get("AccountName"),
        key_values.get("EndpointSuffix"),
    ) {
        (Some(name), Some(suffix)) => (name, suffix),
        _ => return Ok(None),
    };

    let protocol = key_values
        .get("DefaultEndpointsProtocol")
        .map(String::as_str)
        .unwrap_or("https");
    if protocol != "http" && protocol != "https" {
        return Err(Error::config_invalid(format!(
            "invalid DefaultEndpointsProtocol: {protocol}"
        )));
    }

    Ok(Some(format!(
        "{protocol}://{account_name}.{}.{endpoint_suffix}",
        service.endpoint_name()
    )))
}

fn endpoint_key(service: Service) -> &'static str {
    match service {
        Service::Blob => "BlobEndpoint",
        Service::Table => "TableEndpoint",
        Service::Queue => "QueueEndpoint",
    }
}

/// Split an endpoint URL into protocol, host and path prefix.
fn apply_endpoint(config: &mut Config, service: Service, endpoint: &str) -> Result<()> {
    let uri: Uri = endpoint.parse().map_err(|e| {
        Error::config_invalid(format!("invalid endpoint: {endpoint}")).with_source(e)
    })?;

    let host = uri
        .authority()
        .ok_or_else(|| Error::config_invalid(format!("endpoint without host: {endpoint}")))?
        .to_string();

    config.protocol = uri.scheme_str().map(str::to_string);
    match service {
        Service::Blob => config.blob_host = Some(host),
        Service::Table => config.table_host = Some(host),
        Service::Queue => config.queue_host = Some(host),
    }

    let path = uri.path().trim_end_matches('/');
    if !path.is_empty() {
        config.path_prefix = Some(path.to_string());
    }

    Ok(())
}
