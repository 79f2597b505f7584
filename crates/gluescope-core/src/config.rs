use std::env;

pub const DEFAULT_REGION: &str = "us-east-1";

/// How the Glue provider should authenticate against AWS.
///
/// Resolution order mirrors the AWS CLI conventions: explicit keys win over
/// a named profile, which wins over environment variables, which win over
/// the SDK default credential chain.
#[derive(Debug, Clone, Default)]
pub struct AwsAuth {
    pub access_key_id: Option<String>,
    pub secret_access_key: Option<String>,
    pub session_token: Option<String>,
    pub profile: Option<String>,
    pub region: Option<String>,
}

impl AwsAuth {
    /// Read credentials from the standard AWS environment variables.
    pub fn from_env() -> Self {
        Self {
            access_key_id: env::var("AWS_ACCESS_KEY_ID").ok(),
            secret_access_key: env::var("AWS_SECRET_ACCESS_KEY").ok(),
            session_token: env::var("AWS_SESSION_TOKEN").ok(),
            profile: None,
            region: env::var("AWS_DEFAULT_REGION").ok(),
        }
    }

    pub fn from_profile(profile: impl Into<String>, region: Option<String>) -> Self {
        Self {
            profile: Some(profile.into()),
            region,
            ..Self::default()
        }
    }

    /// Combine CLI-provided values with the environment, CLI taking priority.
    pub fn resolve(
        access_key_id: Option<String>,
        secret_access_key: Option<String>,
        session_token: Option<String>,
        profile: Option<String>,
        region: Option<String>,
    ) -> Self {
        if access_key_id.is_some() && secret_access_key.is_some() {
            return Self {
                access_key_id,
                secret_access_key,
                session_token,
                profile: None,
                region,
            };
        }
        if let Some(profile) = profile {
            return Self::from_profile(profile, region);
        }
        let mut auth = Self::from_env();
        if region.is_some() {
            auth.region = region;
        }
        auth
    }

    pub fn has_static_keys(&self) -> bool {
        self.access_key_id.is_some() && self.secret_access_key.is_some()
    }

    pub fn region(&self) -> String {
        self.region
            .clone()
            .unwrap_or_else(|| DEFAULT_REGION.to_string())
    }
}
