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

//! Canonicalized headers and canonicalized resource strings.
//!
//! ## Reference
//!
//! - [Constructing the canonicalized headers string](https://learn.microsoft.com/en-us/rest/api/storageservices/authorize-with-shared-key#constructing-the-canonicalized-headers-string)
//! - [Constructing the canonicalized resource string](https://learn.microsoft.com/en-us/rest/api/storageservices/authorize-with-shared-key#constructing-the-canonicalized-resource-string)

use std::cmp::Ordering;

use http::HeaderMap;
use percent_encoding::percent_decode_str;
use sharedkey_core::SigningRequest;

use crate::constants::X_MS_PREFIX;

/// The two canonical strings derived from a request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CanonicalStrings {
    /// Canonicalized `x-ms-*` headers, possibly empty.
    pub headers: String,
    /// Canonicalized resource.
    pub resource: String,
}

impl CanonicalStrings {
    /// Derive both canonical strings for `req` signed by `account`.
    pub fn build(account: &str, req: &SigningRequest) -> Self {
        Self {
            headers: canonicalize_headers(&req.headers),
            resource: canonicalize_resource(account, &req.path),
        }
    }
}

/// Build the canonicalized headers string.
///
/// Only headers whose lower-cased name starts with `x-ms-` are kept. Each one
/// becomes `name:value` with the value trimmed and every run of two or more
/// whitespace characters collapsed into one space. Repeated headers are
/// joined with `,`. Lines are sorted by name with [`locale_cmp`] and joined
/// with `\n`.
pub fn canonicalize_headers(headers: &HeaderMap) -> String {
    let mut entries: Vec<(String, String)> = Vec::new();

    for name in headers.keys() {
        let name = name.as_str().trim().to_lowercase();
        if !name.starts_with(X_MS_PREFIX) {
            continue;
        }

        let value = headers
            .get_all(name.as_str())
            .iter()
            .map(|v| collapse_whitespace(String::from_utf8_lossy(v.as_bytes()).trim()))
            .collect::<Vec<_>>()
            .join(",");
        entries.push((name, value));
    }

    entries.sort_by(|(a, _), (b, _)| locale_cmp(a, b));

    entries
        .into_iter()
        .map(|(k, v)| format!("{k}:{v}"))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Build the canonicalized resource string.
///
/// `path_with_query` must be exactly what goes on the wire. The result is
/// `/{account}{path}` followed, when a query is present, by one
/// `\nkey:value` line per parameter: keys lower-cased, sorted with
/// [`locale_cmp`], then key and value percent-decoded.
pub fn canonicalize_resource(account: &str, path_with_query: &str) -> String {
    let (path, query) = match path_with_query.split_once('?') {
        Some((path, query)) => (path, Some(query)),
        None => (path_with_query, None),
    };

    let mut s = format!("/{account}{path}");

    let Some(query) = query else {
        return s;
    };

    let mut params: Vec<(String, &str)> = query
        .split('&')
        .map(|param| {
            let (k, v) = split_key_value(param, '=');
            (k.to_lowercase(), v)
        })
        .collect();

    // Sort on the still-encoded keys, decode afterwards.
    params.sort_by(|(a, _), (b, _)| locale_cmp(a, b));

    for (k, v) in params {
        s.push('\n');
        s.push_str(&percent_decode_str(&k).decode_utf8_lossy());
        s.push(':');
        s.push_str(&percent_decode_str(v).decode_utf8_lossy());
    }

    s
}

/// Split `s` on the first `sep`.
///
/// Without `sep` the whole input is the key and the value is empty.
pub fn split_key_value(s: &str, sep: char) -> (&str, &str) {
    s.split_once(sep).unwrap_or((s, ""))
}

/// Replace every run of two or more whitespace characters with one space.
///
/// A lone whitespace character is kept as is.
fn collapse_whitespace(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut run: Option<char> = None;
    let mut run_len = 0;

    for c in s.chars() {
        if c.is_whitespace() {
            run.get_or_insert(c);
            run_len += 1;
            continue;
        }

        flush_whitespace(&mut out, run.take(), run_len);
        run_len = 0;
        out.push(c);
    }
    flush_whitespace(&mut out, run, run_len);

    out
}

fn flush_whitespace(out: &mut String, first: Option<char>, len: usize) {
    match (first, len) {
        (Some(c), 1) => out.push(c),
        (Some(_), _) => out.push(' '),
        (None, _) => {}
    }
}

/// ASCII punctuation and symbols in collation order.
const PUNCTUATION_ORDER: &str = "_-,;:!?.'\"()[]{}@*/\\&#%`^+<=>|~$";

/// Compare two strings the way a locale-aware collator does for the root
/// locale.
///
/// Primary level first: whitespace sorts before punctuation, punctuation
/// before digits, digits before letters, and letters ignore case and accents.
/// Latin-1 letters with a diacritic share the weight of their base letter.
/// Ties are broken by accent, unaccented first, then by case with lower case
/// first. Other characters outside ASCII sort after all letters by code point.
pub fn locale_cmp(a: &str, b: &str) -> Ordering {
    let weighted = |s: &str| {
        s.chars()
            .filter_map(|c| primary_weight(c).map(|w| (w, c)))
            .collect::<Vec<_>>()
    };
    let (a, b) = (weighted(a), weighted(b));

    let primary = |v: &[(u32, char)]| v.iter().map(|(w, _)| *w).collect::<Vec<_>>();
    let secondary = |v: &[(u32, char)]| {
        v.iter()
            .map(|(_, c)| accent_weight(*c))
            .collect::<Vec<_>>()
    };
    let tertiary = |v: &[(u32, char)]| {
        v.iter()
            .map(|(_, c)| c.is_uppercase())
            .collect::<Vec<_>>()
    };

    primary(&a)
        .cmp(&primary(&b))
        .then_with(|| secondary(&a).cmp(&secondary(&b)))
        .then_with(|| tertiary(&a).cmp(&tertiary(&b)))
}

/// Primary collation weight, `None` for ignorable control characters.
fn primary_weight(c: char) -> Option<u32> {
    match c {
        '\t' => Some(1),
        '\n' => Some(2),
        '\u{b}' => Some(3),
        '\u{c}' => Some(4),
        '\r' => Some(5),
        ' ' => Some(6),
        '0'..='9' => Some(100 + (c as u32 - '0' as u32)),
        'a'..='z' => Some(200 + (c as u32 - 'a' as u32)),
        'A'..='Z' => Some(200 + (c as u32 - 'A' as u32)),
        c if c.is_ascii_control() => None,
        c if c.is_ascii() => PUNCTUATION_ORDER
            .find(c)
            .map(|idx| 10 + idx as u32),
        c => match base_letter(c) {
            Some(base) => primary_weight(base),
            None => Some(1000 + c as u32),
        },
    }
}

/// Zero for characters without a diacritic.
fn accent_weight(c: char) -> u32 {
    match base_letter(c) {
        Some(_) => c.to_lowercase().next().map_or(0, |l| l as u32),
        None => 0,
    }
}

/// Base letter of a Latin-1 letter carrying a diacritic.
fn base_letter(c: char) -> Option<char> {
    let base = match c {
        'à'..='å' | 'À'..='Å' => 'a',
        'ç' | 'Ç' => 'c',
        'è'..='ë' | 'È'..='Ë' => 'e',
        'ì'..='ï' | 'Ì'..='Ï' => 'i',
        'ñ' | 'Ñ' => 'n',
        'ò'..='ö' | 'ø' | 'Ò'..='Ö' | 'Ø' => 'o',
        'ù'..='ü' | 'Ù'..='Ü' => 'u',
        'ý' | 'ÿ' | 'Ý' => 'y',
        _ => return None,
    };
    Some(base)
}
