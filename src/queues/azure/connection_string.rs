use std::collections::HashMap;

use reqwest::Url;

use crate::queues::errors::QueueError;

static DEVELOPMENT_ACCOUNT_NAME: &str = "devstoreaccount1";
static DEVELOPMENT_ACCOUNT_KEY: &str =
    "Eby8vdM02xNOcqFlqUwJPLlmEtlCDXJ1OUzFT50uSRZ6IFsuFq2UVErCz4I6tq/K1SZFPTOtr/KBHBeksoGMGw==";
static DEVELOPMENT_QUEUE_ENDPOINT: &str = "http://127.0.0.1:10001/devstoreaccount1";

#[derive(Clone)]
pub enum Credential {
    SharedKey {
        account_name: String,
        account_key: Vec<u8>,
    },
    SharedAccessSignature(String),
}

// Keeps the account key out of logs.
impl std::fmt::Debug for Credential {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::SharedKey { account_name, .. } => f
                .debug_struct("SharedKey")
                .field("account_name", account_name)
                .finish_non_exhaustive(),
            Self::SharedAccessSignature(_) => f.write_str("SharedAccessSignature(..)"),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ConnectionString {
    /// Base url of the queue service, queue names are appended as path segments.
    pub queue_endpoint: Url,
    pub credential: Credential,
}

impl ConnectionString {
    pub fn parse(connection_string: &str) -> Result<ConnectionString, QueueError> {
        let mut settings = HashMap::new();

        for segment in connection_string.split(';') {
            let segment = segment.trim();
            if segment.is_empty() {
                continue;
            }

            let Some((key, value)) = segment.split_once('=') else {
                return Err(QueueError::InvalidConnectionString(
                    "segment without a value".to_string(),
                ));
            };

            settings.insert(key.trim().to_lowercase(), value.trim().to_string());
        }

        if settings
            .get("usedevelopmentstorage")
            .map_or(false, |v| v.eq_ignore_ascii_case("true"))
        {
            return ConnectionString::development_storage();
        }

        let protocol = settings
            .get("defaultendpointsprotocol")
            .map(String::as_str)
            .unwrap_or("https");
        let endpoint_suffix = settings
            .get("endpointsuffix")
            .map(String::as_str)
            .unwrap_or("core.windows.net");
        let account_name = settings.get("accountname").filter(|v| !v.is_empty());

        let queue_endpoint = match (settings.get("queueendpoint"), account_name) {
            (Some(endpoint), _) => endpoint.to_string(),
            (None, Some(account_name)) => {
                format!("{}://{}.queue.{}", protocol, account_name, endpoint_suffix)
            }
            (None, None) => {
                return Err(QueueError::InvalidConnectionString(
                    "missing AccountName or QueueEndpoint".to_string(),
                ))
            }
        };

        let credential = match (settings.get("accountkey"), settings.get("sharedaccesssignature")) {
            (Some(account_key), _) => {
                let Some(account_name) = account_name else {
                    return Err(QueueError::InvalidConnectionString(
                        "AccountKey requires AccountName".to_string(),
                    ));
                };

                let account_key = base64::decode(account_key).map_err(|_| {
                    QueueError::InvalidConnectionString("AccountKey is not base64".to_string())
                })?;

                Credential::SharedKey {
                    account_name: account_name.to_string(),
                    account_key,
                }
            }
            (None, Some(sas)) => {
                Credential::SharedAccessSignature(sas.trim_start_matches('?').to_string())
            }
            (None, None) => {
                return Err(QueueError::InvalidConnectionString(
                    "missing AccountKey or SharedAccessSignature".to_string(),
                ))
            }
        };

        Ok(ConnectionString {
            queue_endpoint: parse_endpoint(&queue_endpoint)?,
            credential,
        })
    }

    fn development_storage() -> Result<ConnectionString, QueueError> {
        let account_key = base64::decode(DEVELOPMENT_ACCOUNT_KEY).map_err(|_| {
            QueueError::InvalidConnectionString("AccountKey is not base64".to_string())
        })?;

        Ok(ConnectionString {
            queue_endpoint: parse_endpoint(DEVELOPMENT_QUEUE_ENDPOINT)?,
            credential: Credential::SharedKey {
                account_name: DEVELOPMENT_ACCOUNT_NAME.to_string(),
                account_key,
            },
        })
    }
}

fn parse_endpoint(endpoint: &str) -> Result<Url, QueueError> {
    Url::parse(endpoint.trim_end_matches('/')).map_err(|e| {
        QueueError::InvalidConnectionString(format!("invalid queue endpoint: {}", e))
    })
}
