use serde::Deserialize;

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Envy {
    pub port: Option<u16>,

    // envy lowercases keys, so this matches `AzureWebJobsStorage`.
    #[serde(rename = "azurewebjobsstorage")]
    pub azure_web_jobs_storage: Option<String>,

    pub function_key: Option<String>,
    pub auth_disabled: Option<bool>,
    pub strict_validation: Option<bool>,
    pub rate_limit_per_sec: Option<u64>,
}

impl Envy {
    pub fn queue_connection_string(&self) -> Option<&str> {
        self.azure_web_jobs_storage
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
    }

    pub fn function_key(&self) -> Option<&str> {
        self.function_key.as_deref().filter(|s| !s.is_empty())
    }

    pub fn auth_disabled(&self) -> bool {
        self.auth_disabled.unwrap_or(false)
    }

    pub fn strict_validation(&self) -> bool {
        self.strict_validation.unwrap_or(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reads_storage_connection_string_case_insensitively() {
        let vars = vec![
            (
                "AzureWebJobsStorage".to_string(),
                "UseDevelopmentStorage=true".to_string(),
            ),
            ("PORT".to_string(), "8080".to_string()),
            ("STRICT_VALIDATION".to_string(), "true".to_string()),
        ];

        let envy: Envy = envy::from_iter(vars).unwrap();

        assert_eq!(
            envy.queue_connection_string(),
            Some("UseDevelopmentStorage=true")
        );
        assert_eq!(envy.port, Some(8080));
        assert!(envy.strict_validation());
        assert_eq!(envy.function_key(), None);
    }

    #[test]
    fn blank_values_count_as_unset() {
        let envy = Envy {
            azure_web_jobs_storage: Some("   ".to_string()),
            function_key: Some(String::new()),
            ..Default::default()
        };

        assert_eq!(envy.queue_connection_string(), None);
        assert_eq!(envy.function_key(), None);
    }
}
