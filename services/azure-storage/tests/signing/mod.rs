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

use http::{HeaderMap, HeaderValue, Method, Request};
use pretty_assertions::assert_eq;
use sharedkey_azure_storage::{
    canonicalize_headers, canonicalize_resource, sign, Credential, KeyVariant, RequestSigner,
    Service, SigningContext, StaticCredentialProvider,
};
use sharedkey_core::time::parse_http_date;
use sharedkey_core::{Context, Signer};
use test_case::test_case;

const DATE: &str = "Tue, 01 Mar 2022 08:12:34 GMT";
const AZURITE_KEY: &str =
    "Eby8vdM02xNOcqFlqUwJPLlmEtlCDXJ1OUzFT50uSRZ6IFsuFq2UVErCz4I6tq/K1SZFPTOtr/KBHBeksoGMGw==";

fn azurite_credential() -> Credential {
    Credential::from_base64_key("devstoreaccount1", AZURITE_KEY).unwrap()
}

fn headers(pairs: &[(&str, &str)]) -> HeaderMap {
    let mut headers = HeaderMap::new();
    for (k, v) in pairs {
        headers.append(
            http::HeaderName::from_bytes(k.as_bytes()).unwrap(),
            HeaderValue::from_str(v).unwrap(),
        );
    }
    headers
}

#[test_case(
    Service::Blob, KeyVariant::SharedKey, "/mycontainer?restype=container&comp=list",
    "SharedKey devstoreaccount1:cNqFidqQZyYiBJCAByCRDFAyY1wqjo89EgAKkZabr6I=";
    "blob shared key"
)]
#[test_case(
    Service::Blob, KeyVariant::SharedKeyLite, "/mycontainer?restype=container&comp=list",
    "SharedKeyLite devstoreaccount1:36EBo/GTqqmV9Akp785Z0cPGV89kHoEE7BNWCUpxaFM=";
    "blob shared key lite"
)]
#[test_case(
    Service::Queue, KeyVariant::SharedKey, "/mycontainer?comp=list&restype=container",
    "SharedKey devstoreaccount1:cNqFidqQZyYiBJCAByCRDFAyY1wqjo89EgAKkZabr6I=";
    "queue follows blob rules"
)]
#[test_case(
    Service::Table, KeyVariant::SharedKeyLite, "/mytable()",
    "SharedKeyLite devstoreaccount1:ZZNlRVbZW1P+A2igA9oI4F9YWnHdgd2yuzmcbq2IVQc=";
    "table shared key lite"
)]
fn test_reference_signatures(
    service: Service,
    variant: KeyVariant,
    path: &str,
    expected: &str,
) {
    let headers = headers(&[("x-ms-date", DATE), ("x-ms-version", "2021-08-06")]);

    let actual = sign(
        service,
        variant,
        &azurite_credential(),
        &Method::GET,
        "devstoreaccount1.blob.core.windows.net",
        path,
        &headers,
    );
    assert_eq!(actual, expected);
}

#[test]
fn test_table_shared_key_signature() {
    let headers = headers(&[("x-ms-date", DATE), ("content-type", "application/json")]);
    let ctx = SigningContext::new(azurite_credential(), Service::Table)
        .with_variant(KeyVariant::SharedKey);

    assert_eq!(
        ctx.sign(
            &Method::GET,
            "devstoreaccount1.table.core.windows.net",
            "/mytable()",
            &headers
        ),
        "SharedKey devstoreaccount1:Z29XxS1aNH/1o8d9yrZ3zRZHGAiVran6L/3Fl+H9Rvc="
    );
}

#[test]
fn test_header_order_and_case_do_not_matter() {
    let ctx = SigningContext::new(azurite_credential(), Service::Blob);
    let a = headers(&[
        ("x-ms-version", "2021-08-06"),
        ("X-MS-Date", DATE),
        ("x-ms-meta-Owner", "  cleanup   job "),
    ]);
    let b = headers(&[
        ("x-ms-meta-owner", "cleanup job"),
        ("x-ms-date", DATE),
        ("x-ms-version", "2021-08-06"),
    ]);

    assert_eq!(
        ctx.sign(&Method::PUT, "h", "/c/b", &a),
        ctx.sign(&Method::PUT, "h", "/c/b", &b)
    );
}

#[test]
fn test_signature_changes_with_every_signed_part() {
    let ctx = SigningContext::new(azurite_credential(), Service::Blob);
    let base_headers = headers(&[("x-ms-date", DATE), ("x-ms-version", "2021-08-06")]);
    let base = ctx.sign(&Method::GET, "h", "/c?comp=list", &base_headers);

    assert_ne!(base, ctx.sign(&Method::HEAD, "h", "/c?comp=list", &base_headers));
    assert_ne!(base, ctx.sign(&Method::GET, "h", "/d?comp=list", &base_headers));
    assert_ne!(base, ctx.sign(&Method::GET, "h", "/c?comp=lisT", &base_headers));
    assert_ne!(
        base,
        ctx.sign(
            &Method::GET,
            "h",
            "/c?comp=list",
            &headers(&[("x-ms-date", DATE), ("x-ms-version", "2021-08-07")])
        )
    );
    // Headers outside the layout and the vendor prefix are not signed.
    assert_eq!(
        base,
        ctx.sign(
            &Method::GET,
            "h",
            "/c?comp=list",
            &headers(&[
                ("x-ms-date", DATE),
                ("x-ms-version", "2021-08-06"),
                ("accept", "application/json;odata=nometadata"),
            ])
        )
    );
}

#[test]
fn test_canonical_strings() {
    let headers = headers(&[
        ("x-ms-version", "2021-08-06"),
        ("x-ms-date", DATE),
        ("x-ms-client-request-id", "abc"),
        ("content-type", "text/plain"),
    ]);
    assert_eq!(
        canonicalize_headers(&headers),
        "x-ms-client-request-id:abc\nx-ms-date:Tue, 01 Mar 2022 08:12:34 GMT\nx-ms-version:2021-08-06"
    );
    assert_eq!(
        canonicalize_resource("acct", "/mytable()?$filter=PartitionKey%20eq%20'p'&NextRowKey=1"),
        "/acct/mytable()\n$filter:PartitionKey eq 'p'\nnextrowkey:1"
    );
}

#[tokio::test]
async fn test_signer_with_request_signer() {
    let _ = env_logger::builder().is_test(true).try_init();

    let ctx = Context::new();
    let signer = Signer::new(
        ctx,
        StaticCredentialProvider::new(azurite_credential()),
        RequestSigner::new(Service::Blob)
            .with_version("2021-08-06")
            .with_time(parse_http_date(DATE).unwrap()),
    );

    let (mut parts, _) = Request::get(
        "https://devstoreaccount1.blob.core.windows.net/mycontainer?restype=container&comp=list",
    )
    .body(())
    .unwrap()
    .into_parts();
    signer.sign(&mut parts).await.unwrap();

    assert_eq!(
        parts.headers["authorization"],
        "SharedKey devstoreaccount1:cNqFidqQZyYiBJCAByCRDFAyY1wqjo89EgAKkZabr6I="
    );
}

#[test]
fn test_concurrent_signing_matches_serial() {
    let ctx = SigningContext::new(azurite_credential(), Service::Blob);
    let headers = headers(&[("x-ms-date", DATE), ("x-ms-version", "2021-08-06")]);
    let expected = ctx.sign(
        &Method::GET,
        "h",
        "/mycontainer?restype=container&comp=list",
        &headers,
    );

    std::thread::scope(|s| {
        let handles: Vec<_> = (0..8)
            .map(|_| {
                s.spawn(|| {
                    ctx.sign(
                        &Method::GET,
                        "h",
                        "/mycontainer?restype=container&comp=list",
                        &headers,
                    )
                })
            })
            .collect();
        for handle in handles {
            assert_eq!(handle.join().unwrap(), expected);
        }
    });
}
