use std::collections::BTreeMap;

use hmac::{Hmac, Mac};
use reqwest::{header::HeaderMap, Method, Url};
use sha2::Sha256;

use crate::queues::errors::QueueError;

type HmacSha256 = Hmac<Sha256>;

static STANDARD_HEADERS: [&str; 10] = [
    "content-encoding",
    "content-language",
    "content-length",
    "content-md5",
    "content-type",
    "date",
    "if-modified-since",
    "if-match",
    "if-none-match",
    "if-unmodified-since",
];

/// Builds the Shared Key string-to-sign for the queue service.
///
/// `content_length` is passed separately because reqwest only fills in the
/// header when the request is sent; a zero length signs as an empty string.
pub fn string_to_sign(
    method: &Method,
    url: &Url,
    headers: &HeaderMap,
    content_length: usize,
    account_name: &str,
) -> String {
    let mut parts = vec![method.as_str().to_string()];

    for name in STANDARD_HEADERS {
        let value = match name {
            "content-length" if content_length > 0 => content_length.to_string(),
            "content-length" => String::new(),
            _ => header_value(headers, name),
        };
        parts.push(value);
    }
    parts.push(header_value(headers, "range"));

    let mut sts = parts.join("\n");
    sts.push('\n');
    sts.push_str(&canonicalized_headers(headers));
    sts.push_str(&canonicalized_resource(url, account_name));

    sts
}

pub fn sign(account_key: &[u8], string_to_sign: &str) -> Result<String, QueueError> {
    let mut mac = HmacSha256::new_from_slice(account_key)
        .map_err(|e| QueueError::Signing(e.to_string()))?;
    mac.update(string_to_sign.as_bytes());

    Ok(base64::encode(mac.finalize().into_bytes()))
}

fn header_value(headers: &HeaderMap, name: &str) -> String {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_string()
}

fn canonicalized_headers(headers: &HeaderMap) -> String {
    let mut ms_headers: BTreeMap<&str, String> = BTreeMap::new();

    for (name, value) in headers {
        let name = name.as_str();
        if !name.starts_with("x-ms-") {
            continue;
        }
        if let Ok(value) = value.to_str() {
            ms_headers.insert(name, value.trim().to_string());
        }
    }

    ms_headers
        .into_iter()
        .map(|(name, value)| format!("{}:{}\n", name, value))
        .collect()
}

fn canonicalized_resource(url: &Url, account_name: &str) -> String {
    let mut resource = format!("/{}{}", account_name, url.path());

    let mut params: BTreeMap<String, Vec<String>> = BTreeMap::new();
    for (name, value) in url.query_pairs() {
        params
            .entry(name.to_lowercase())
            .or_default()
            .push(value.into_owned());
    }

    for (name, mut values) in params {
        values.sort();
        resource.push_str(&format!("\n{}:{}", name, values.join(",")));
    }

    resource
}

#[cfg(test)]
mod tests {
    use reqwest::header::HeaderValue;

    use super::*;

    fn ms_headers() -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert("x-ms-version", HeaderValue::from_static("2021-12-02"));
        headers.insert(
            "x-ms-date",
            HeaderValue::from_static("Mon, 01 Jan 2024 00:00:00 GMT"),
        );
        headers
    }

    #[test]
    fn signs_queue_metadata_request() {
        let url = Url::parse("https://abcretail.queue.core.windows.net/transactions?comp=metadata")
            .unwrap();

        let sts = string_to_sign(&Method::GET, &url, &ms_headers(), 0, "abcretail");

        assert_eq!(
            sts,
            "GET\n\n\n\n\n\n\n\n\n\n\n\n\
             x-ms-date:Mon, 01 Jan 2024 00:00:00 GMT\n\
             x-ms-version:2021-12-02\n\
             /abcretail/transactions\n\
             comp:metadata"
        );
    }

    #[test]
    fn includes_length_and_content_type_for_message_post() {
        let url = Url::parse("http://127.0.0.1:10001/devstoreaccount1/transactions/messages")
            .unwrap();
        let mut headers = ms_headers();
        headers.insert(
            "content-type",
            HeaderValue::from_static("application/xml; charset=utf-8"),
        );

        let sts = string_to_sign(&Method::POST, &url, &headers, 42, "devstoreaccount1");

        assert!(sts.starts_with("POST\n\n\n42\n\napplication/xml; charset=utf-8\n"));
        assert!(sts.ends_with("/devstoreaccount1/devstoreaccount1/transactions/messages"));
    }

    #[test]
    fn signature_is_deterministic_base64() {
        let first = sign(b"secret", "GET\n").unwrap();
        let second = sign(b"secret", "GET\n").unwrap();
        let other = sign(b"other", "GET\n").unwrap();

        assert_eq!(first, second);
        assert_ne!(first, other);
        assert_eq!(base64::decode(&first).unwrap().len(), 32);
    }
}
