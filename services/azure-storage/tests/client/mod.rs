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

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use bytes::Bytes;
use http::{Method, Request, Response, StatusCode};
use pretty_assertions::assert_eq;
use sharedkey_azure_storage::{Config, Credential, KeyVariant, Service, SigningContext, StorageClient};
use sharedkey_core::{Context, ErrorKind, HttpSend, Result};

/// Replies with a canned response and keeps every request it receives.
#[derive(Debug, Clone)]
struct MockHttpSend {
    status: StatusCode,
    body: &'static str,
    requests: Arc<Mutex<Vec<Request<Bytes>>>>,
}

impl MockHttpSend {
    fn new(status: StatusCode, body: &'static str) -> Self {
        Self {
            status,
            body,
            requests: Arc::default(),
        }
    }

    fn last_request(&self) -> Request<Bytes> {
        self.requests
            .lock()
            .unwrap()
            .pop()
            .expect("a request must have been sent")
    }
}

#[async_trait]
impl HttpSend for MockHttpSend {
    async fn http_send(&self, req: Request<Bytes>) -> Result<Response<Bytes>> {
        self.requests.lock().unwrap().push(req);
        Ok(Response::builder()
            .status(self.status)
            .header("etag", "\"0x8D9FB5E57F6B1E2\"")
            .body(Bytes::from_static(self.body.as_bytes()))?)
    }
}

fn config() -> Config {
    Config {
        account: Some("acct".to_string()),
        primary_key: Some("c2VjcmV0".to_string()),
        version: Some("2021-08-06".to_string()),
        blob_host: Some("acct.blob.core.windows.net".to_string()),
        table_host: Some("acct.table.core.windows.net".to_string()),
        ..Default::default()
    }
}

fn client(http: &MockHttpSend) -> StorageClient {
    StorageClient::new(Context::new().with_http_send(http.clone()), config()).unwrap()
}

/// Recompute the signature from what went on the wire.
fn assert_signed(req: &Request<Bytes>, service: Service, variant: KeyVariant) {
    let ctx = SigningContext::new(Credential::new("acct", b"secret".to_vec()), service)
        .with_variant(variant);
    let mut headers = req.headers().clone();
    let authorization = headers
        .remove("authorization")
        .expect("request must be signed");

    let path = req.uri().path_and_query().unwrap().as_str();
    let expected = ctx.sign(req.method(), req.uri().host().unwrap(), path, &headers);
    assert_eq!(authorization, expected.as_str());
}

#[tokio::test]
async fn test_list_containers() {
    let http = MockHttpSend::new(
        StatusCode::OK,
        r#"<?xml version="1.0" encoding="utf-8"?>
<EnumerationResults ServiceEndpoint="https://acct.blob.core.windows.net/">
  <Containers>
    <Container>
      <Name>uploads</Name>
      <Properties><Last-Modified>Tue, 01 Mar 2022 08:12:34 GMT</Last-Modified></Properties>
    </Container>
  </Containers>
  <NextMarker />
</EnumerationResults>"#,
    );

    let containers = client(&http)
        .list_containers(&[("prefix", "up loads")])
        .await
        .unwrap();
    assert_eq!(containers.len(), 1);
    assert_eq!(containers[0].name, "uploads");

    let req = http.last_request();
    assert_eq!(req.method(), Method::GET);
    assert_eq!(
        req.uri(),
        "https://acct.blob.core.windows.net/?comp=list&prefix=up%20loads"
    );
    assert_eq!(req.headers()["x-ms-version"], "2021-08-06");
    assert_eq!(req.headers()["x-ms-client-request-id"], "wxfileservice");
    assert!(req.headers().contains_key("x-ms-date"));
    assert!(req.headers()["authorization"]
        .to_str()
        .unwrap()
        .starts_with("SharedKey acct:"));
    assert_signed(&req, Service::Blob, KeyVariant::SharedKey);
}

#[tokio::test]
async fn test_list_containers_failure_carries_status_and_body() {
    let http = MockHttpSend::new(
        StatusCode::FORBIDDEN,
        "<Error><Code>AuthenticationFailed</Code></Error>",
    );

    let err = client(&http).list_containers(&[]).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Unexpected);
    assert!(err.message().contains("403"));
    assert!(err.message().contains("AuthenticationFailed"));
}

#[tokio::test]
async fn test_list_blobs() {
    let http = MockHttpSend::new(
        StatusCode::OK,
        r#"<?xml version="1.0" encoding="utf-8"?>
<EnumerationResults ContainerName="uploads">
  <Blobs>
    <Blob>
      <Name>1652881126</Name>
      <Properties>
        <Last-Modified>Thu, 01 Jul 2021 10:45:02 GMT</Last-Modified>
        <Content-Length>8</Content-Length>
      </Properties>
    </Blob>
    <Blob>
      <Name>1652881127</Name>
      <Properties>
        <Last-Modified>Thu, 01 Jul 2021 10:45:03 GMT</Last-Modified>
      </Properties>
    </Blob>
  </Blobs>
</EnumerationResults>"#,
    );

    let blobs = client(&http)
        .list_blobs("uploads", &[("maxresults", "2")])
        .await
        .unwrap();
    assert_eq!(
        blobs.iter().map(|b| b.name.as_str()).collect::<Vec<_>>(),
        vec!["1652881126", "1652881127"]
    );

    let req = http.last_request();
    assert_eq!(
        req.uri(),
        "https://acct.blob.core.windows.net/uploads?restype=container&comp=list&maxresults=2"
    );
    assert_signed(&req, Service::Blob, KeyVariant::SharedKey);
}

#[tokio::test]
async fn test_delete_container() {
    let http = MockHttpSend::new(StatusCode::ACCEPTED, "");
    assert!(client(&http).delete_container("uploads", None).await.unwrap());

    let req = http.last_request();
    assert_eq!(req.method(), Method::DELETE);
    assert_eq!(
        req.uri(),
        "https://acct.blob.core.windows.net/uploads?restype=container&timeout=60"
    );

    let http = MockHttpSend::new(StatusCode::NOT_FOUND, "");
    assert!(!client(&http)
        .delete_container("uploads", Some(5))
        .await
        .unwrap());
}

#[tokio::test]
async fn test_delete_blob() {
    let http = MockHttpSend::new(StatusCode::ACCEPTED, "");
    assert!(client(&http)
        .delete_blob("uploads", "1652881126", Some(30))
        .await
        .unwrap());

    let req = http.last_request();
    assert_eq!(
        req.uri(),
        "https://acct.blob.core.windows.net/uploads/1652881126?timeout=30"
    );
    assert_signed(&req, Service::Blob, KeyVariant::SharedKey);
}

#[tokio::test]
async fn test_get_blob_properties() {
    let http = MockHttpSend::new(StatusCode::OK, "");
    let headers = client(&http)
        .get_blob_properties("uploads", "1652881126", None)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(headers["etag"], "\"0x8D9FB5E57F6B1E2\"");

    let req = http.last_request();
    assert_eq!(req.method(), Method::HEAD);

    let http = MockHttpSend::new(StatusCode::NOT_FOUND, "");
    let headers = client(&http)
        .get_blob_properties("uploads", "missing", None)
        .await
        .unwrap();
    assert!(headers.is_none());
}

#[tokio::test]
async fn test_query_entities() {
    let http = MockHttpSend::new(
        StatusCode::OK,
        r#"{"value":[{"PartitionKey":"files","RowKey":"1652881126","FilePath":"uploads"}]}"#,
    );

    let entities = client(&http)
        .query_entities("files", None, &[("$filter", "PartitionKey eq 'files'")])
        .await
        .unwrap();
    assert_eq!(entities.len(), 1);
    assert_eq!(entities[0]["FilePath"], "uploads");

    let req = http.last_request();
    assert_eq!(
        req.uri(),
        "https://acct.table.core.windows.net/files()?$filter=PartitionKey%20eq%20'files'"
    );
    assert_eq!(req.headers()["dataserviceversion"], "3.0;NetFx");
    assert_eq!(req.headers()["maxdataserviceversion"], "3.0;NetFx");
    assert_eq!(req.headers()["accept"], "application/json;odata=nometadata");
    assert!(req.headers()["authorization"]
        .to_str()
        .unwrap()
        .starts_with("SharedKeyLite acct:"));
    assert_signed(&req, Service::Table, KeyVariant::SharedKeyLite);
}

#[tokio::test]
async fn test_query_single_entity() {
    let http = MockHttpSend::new(
        StatusCode::OK,
        r#"{"PartitionKey":"files","RowKey":"1652881126"}"#,
    );

    let entities = client(&http)
        .query_entities("files", Some(("files", "1652881126")), &[])
        .await
        .unwrap();
    assert_eq!(entities.len(), 1);

    let req = http.last_request();
    assert_eq!(
        req.uri(),
        "https://acct.table.core.windows.net/files(PartitionKey='files',RowKey='1652881126')"
    );
}

#[tokio::test]
async fn test_delete_entity() {
    let http = MockHttpSend::new(StatusCode::NO_CONTENT, "");
    assert!(client(&http)
        .delete_entity("files", "files", "1652881126")
        .await
        .unwrap());

    let req = http.last_request();
    assert_eq!(req.method(), Method::DELETE);
    assert_eq!(req.headers()["if-match"], "*");
    assert_eq!(
        req.uri(),
        "https://acct.table.core.windows.net/files(PartitionKey='files',RowKey='1652881126')"
    );
    assert_signed(&req, Service::Table, KeyVariant::SharedKeyLite);

    let http = MockHttpSend::new(StatusCode::NOT_FOUND, "");
    assert!(!client(&http)
        .delete_entity("files", "files", "missing")
        .await
        .unwrap());
}

#[tokio::test]
async fn test_development_storage_paths() {
    let http = MockHttpSend::new(StatusCode::ACCEPTED, "");
    let config = Config::try_from_connection_string("UseDevelopmentStorage=true", Service::Blob)
        .unwrap();
    let client = StorageClient::new(Context::new().with_http_send(http.clone()), config).unwrap();

    assert!(client.delete_blob("uploads", "a", None).await.unwrap());

    let req = http.last_request();
    assert_eq!(
        req.uri(),
        "http://127.0.0.1:10000/devstoreaccount1/uploads/a?timeout=60"
    );
    // The emulator signs the account-prefixed path.
    let auth = req.headers()["authorization"].to_str().unwrap().to_string();
    assert!(auth.starts_with("SharedKey devstoreaccount1:"));
}

#[tokio::test]
async fn test_development_storage_table_calls_use_table_endpoint() {
    let http = MockHttpSend::new(StatusCode::OK, r#"{"value":[]}"#);
    let config = Config::try_from_connection_string("UseDevelopmentStorage=true", Service::Blob)
        .unwrap();
    let client = StorageClient::new(Context::new().with_http_send(http.clone()), config).unwrap();

    let entities = client.query_entities("files", None, &[]).await.unwrap();
    assert!(entities.is_empty());

    let req = http.last_request();
    assert_eq!(
        req.uri(),
        "http://127.0.0.1:10002/devstoreaccount1/files()"
    );
    assert!(req.headers()["authorization"]
        .to_str()
        .unwrap()
        .starts_with("SharedKeyLite devstoreaccount1:"));
}

#[test]
fn test_missing_key_is_rejected() {
    let config = Config {
        account: Some("acct".to_string()),
        ..Default::default()
    };
    let err = StorageClient::new(Context::new(), config).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::ConfigInvalid);
}
