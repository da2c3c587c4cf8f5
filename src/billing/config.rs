use aws_config::{BehaviorVersion, Region, SdkConfig};
use aws_credential_types::Credentials;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AwsConfig {
    pub region: String,
    pub access_key_id: Option<String>,
    pub secret_access_key: Option<String>,
    pub profile: Option<String>,
}

impl Default for AwsConfig {
    fn default() -> Self {
        Self {
            region: "us-east-1".to_string(),
            access_key_id: None,
            secret_access_key: None,
            profile: None,
        }
    }
}

impl AwsConfig {
    /// Static credentials, when both halves are configured
    pub fn explicit_credentials(&self) -> Option<Credentials> {
        match (&self.access_key_id, &self.secret_access_key) {
            (Some(access_key), Some(secret_key)) => Some(Credentials::new(
                access_key,
                secret_key,
                None,
                None,
                "cost-dashboard",
            )),
            _ => None,
        }
    }

    /// How credentials will be resolved, for health reporting
    pub fn auth_source(&self) -> &'static str {
        if self.explicit_credentials().is_some() {
            "explicit"
        } else if self.profile.is_some() {
            "profile"
        } else {
            "credential_chain"
        }
    }

    /// Load the shared SDK config: explicit keys win, then the named
    /// profile, then the default credential chain.
    pub async fn build_sdk_config(&self) -> SdkConfig {
        let mut loader = aws_config::defaults(BehaviorVersion::latest())
            .region(Region::new(self.region.clone()));

        if let Some(credentials) = self.explicit_credentials() {
            loader = loader.credentials_provider(credentials);
        } else if let Some(profile) = &self.profile {
            loader = loader.profile_name(profile);
        }

        loader.load().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_explicit_credentials_require_both_keys() {
        let mut config = AwsConfig {
            access_key_id: Some("AKIDEXAMPLE".to_string()),
            ..Default::default()
        };
        assert!(config.explicit_credentials().is_none());
        assert_eq!(config.auth_source(), "credential_chain");

        config.secret_access_key = Some("secret".to_string());
        assert!(config.explicit_credentials().is_some());
        assert_eq!(config.auth_source(), "explicit");
    }

    #[test]
    fn test_profile_auth_source() {
        let config = AwsConfig {
            profile: Some("billing".to_string()),
            ..Default::default()
        };
        assert_eq!(config.auth_source(), "profile");
    }
}
