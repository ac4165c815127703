use async_trait::async_trait;
use chrono::Utc;
use reqwest::{
    header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE},
    Method, StatusCode, Url,
};
use uuid::Uuid;

use crate::queues::{errors::QueueError, queue_service::QueueService};

use super::{
    connection_string::{ConnectionString, Credential},
    shared_key, API_VERSION,
};

/// Azure Queue Storage over its REST API.
#[derive(Debug, Clone)]
pub struct AzureQueueClient {
    pub http_client: reqwest::Client,
    pub connection: ConnectionString,
}

impl AzureQueueClient {
    pub fn new(connection: ConnectionString, http_client: Option<reqwest::Client>) -> Self {
        AzureQueueClient {
            connection,
            http_client: http_client.unwrap_or_default(),
        }
    }

    pub fn from_connection_string(connection_string: &str) -> Result<Self, QueueError> {
        Ok(Self::new(ConnectionString::parse(connection_string)?, None))
    }

    fn queue_url(
        &self,
        queue_name: &str,
        sub_path: Option<&str>,
        query: Option<&str>,
    ) -> Result<Url, QueueError> {
        let mut url = self.connection.queue_endpoint.clone();

        {
            let mut segments = url.path_segments_mut().map_err(|_| {
                QueueError::InvalidConnectionString("queue endpoint cannot be a base".to_string())
            })?;
            segments.pop_if_empty().push(queue_name);
            if let Some(sub_path) = sub_path {
                segments.push(sub_path);
            }
        }

        let sas = match &self.connection.credential {
            Credential::SharedAccessSignature(sas) => Some(sas.as_str()),
            Credential::SharedKey { .. } => None,
        };

        match (query, sas) {
            (Some(query), Some(sas)) => url.set_query(Some(&format!("{}&{}", query, sas))),
            (Some(query), None) => url.set_query(Some(query)),
            (None, Some(sas)) => url.set_query(Some(sas)),
            (None, None) => {}
        }

        Ok(url)
    }

    async fn execute(
        &self,
        method: Method,
        url: Url,
        body: Option<String>,
    ) -> Result<reqwest::Response, QueueError> {
        let mut headers = HeaderMap::new();
        headers.insert(
            "x-ms-date",
            header_value(&Utc::now().format("%a, %d %b %Y %H:%M:%S GMT").to_string())?,
        );
        headers.insert("x-ms-version", HeaderValue::from_static(API_VERSION));
        headers.insert(
            "x-ms-client-request-id",
            header_value(&Uuid::new_v4().to_string())?,
        );
        if body.is_some() {
            headers.insert(
                CONTENT_TYPE,
                HeaderValue::from_static("application/xml; charset=utf-8"),
            );
        }

        if let Credential::SharedKey {
            account_name,
            account_key,
        } = &self.connection.credential
        {
            let content_length = body.as_ref().map_or(0, String::len);
            let sts =
                shared_key::string_to_sign(&method, &url, &headers, content_length, account_name);
            let signature = shared_key::sign(account_key, &sts)?;

            headers.insert(
                AUTHORIZATION,
                header_value(&format!("SharedKey {}:{}", account_name, signature))?,
            );
        }

        tracing::debug!("{} {}", method, url.path());

        let mut request = self.http_client.request(method, url).headers(headers);
        if let Some(body) = body {
            request = request.body(body);
        }

        Ok(request.send().await?)
    }
}

#[async_trait]
impl QueueService for AzureQueueClient {
    async fn create_queue_if_not_exists(&self, queue_name: &str) -> Result<(), QueueError> {
        let url = self.queue_url(queue_name, None, None)?;
        let res = self.execute(Method::PUT, url, None).await?;

        match res.status() {
            StatusCode::CREATED => {
                tracing::info!("created queue {}", queue_name);
                Ok(())
            }
            StatusCode::NO_CONTENT => Ok(()),
            StatusCode::CONFLICT if error_code(&res) == Some("QueueAlreadyExists") => Ok(()),
            _ => Err(unexpected_status(res).await),
        }
    }

    async fn queue_exists(&self, queue_name: &str) -> Result<bool, QueueError> {
        let url = self.queue_url(queue_name, None, Some("comp=metadata"))?;
        let res = self.execute(Method::GET, url, None).await?;

        match res.status() {
            StatusCode::OK => Ok(true),
            StatusCode::NOT_FOUND => Ok(false),
            _ => Err(unexpected_status(res).await),
        }
    }

    async fn send_message(&self, queue_name: &str, message: &str) -> Result<(), QueueError> {
        let url = self.queue_url(queue_name, Some("messages"), None)?;
        let body = format!(
            "<QueueMessage><MessageText>{}</MessageText></QueueMessage>",
            escape_xml(message)
        );
        let res = self.execute(Method::POST, url, Some(body)).await?;

        match res.status() {
            StatusCode::CREATED => Ok(()),
            _ => Err(unexpected_status(res).await),
        }
    }
}

fn header_value(value: &str) -> Result<HeaderValue, QueueError> {
    HeaderValue::from_str(value).map_err(|e| QueueError::Signing(e.to_string()))
}

fn error_code(res: &reqwest::Response) -> Option<&str> {
    res.headers()
        .get("x-ms-error-code")
        .and_then(|v| v.to_str().ok())
}

async fn unexpected_status(res: reqwest::Response) -> QueueError {
    let status = res.status().as_u16();
    let body = res.text().await.unwrap_or_default();

    QueueError::UnexpectedStatus { status, body }
}

fn escape_xml(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());

    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&apos;"),
            _ => escaped.push(c),
        }
    }

    escaped
}
