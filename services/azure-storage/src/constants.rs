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

use percent_encoding::{AsciiSet, NON_ALPHANUMERIC};

// Headers used in azure storage services.
pub const X_MS_DATE: &str = "x-ms-date";
pub const X_MS_VERSION: &str = "x-ms-version";
pub const X_MS_CLIENT_REQUEST_ID: &str = "x-ms-client-request-id";
pub const DATA_SERVICE_VERSION: &str = "dataserviceversion";
pub const MAX_DATA_SERVICE_VERSION: &str = "maxdataserviceversion";

/// Prefix of the vendor headers that take part in the canonicalized headers.
pub const X_MS_PREFIX: &str = "x-ms-";

// Default header values sent with every request.
pub const DEFAULT_ACCEPT: &str = "application/json;odata=nometadata";
pub const DEFAULT_ACCEPT_CHARSET: &str = "UTF-8";
pub const DEFAULT_CLIENT_REQUEST_ID: &str = "wxfileservice";
pub const AZURE_VERSION: &str = "2019-12-12";
pub const DEFAULT_DATA_SERVICE_VERSION: &str = "3.0;NetFx";
pub const DEFAULT_MAX_DATA_SERVICE_VERSION: &str = "3.0;NetFx";
pub const DEFAULT_ENDPOINT_SUFFIX: &str = "core.windows.net";

// Env values used in azure storage services.
pub const AZURE_STORAGE_ACCOUNT_NAME: &str = "AZURE_STORAGE_ACCOUNT_NAME";
pub const AZURE_STORAGE_ACCOUNT_KEY: &str = "AZURE_STORAGE_ACCOUNT_KEY";
pub const AZBLOB_ACCOUNT_NAME: &str = "AZBLOB_ACCOUNT_NAME";
pub const AZBLOB_ACCOUNT_KEY: &str = "AZBLOB_ACCOUNT_KEY";
pub const AZURE_STORAGE_CONNECTION_STRING: &str = "AZURE_STORAGE_CONNECTION_STRING";
pub const AZURE_STORAGE_CONFIG_FILE: &str = "AZURE_STORAGE_CONFIG_FILE";
pub const AZURE_STORAGE_VERSION: &str = "AZURE_STORAGE_VERSION";
pub const AZURE_STORAGE_HOST: &str = "AZURE_STORAGE_HOST";
pub const AZURE_STORAGE_BLOB_HOST: &str = "AZURE_STORAGE_BLOB_HOST";
pub const AZURE_STORAGE_TABLE_HOST: &str = "AZURE_STORAGE_TABLE_HOST";
pub const AZURE_STORAGE_QUEUE_HOST: &str = "AZURE_STORAGE_QUEUE_HOST";
pub const WEBJOBS_NAME: &str = "WEBJOBS_NAME";

/// AsciiSet matching `encodeURIComponent`: everything but alphanumerics and
/// `-_.!~*'()` is escaped.
pub const URI_COMPONENT_ENCODE_SET: AsciiSet = NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'!')
    .remove(b'~')
    .remove(b'*')
    .remove(b'\'')
    .remove(b'(')
    .remove(b')');

/// [`URI_COMPONENT_ENCODE_SET`] keeping `/`, for blob names.
pub const BLOB_PATH_ENCODE_SET: AsciiSet = URI_COMPONENT_ENCODE_SET.remove(b'/');

/// Seconds the service may spend on a blob or container operation.
pub const DEFAULT_TIMEOUT: u64 = 60;
