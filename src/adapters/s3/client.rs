//! S3 client construction
//!
//! The artifact sink and an S3 checkpoint store each build their own client
//! from the same `[storage]` settings (endpoint, region, credentials).

use crate::config::StorageConfig;
use crate::domain::{HighwaterError, Result};
use aws_config::BehaviorVersion;
use aws_sdk_s3::config::{Credentials, Region};
use secrecy::ExposeSecret;

/// Build an S3 client from storage settings
///
/// Static credentials are used when both keys are configured; otherwise the
/// default AWS provider chain applies (environment, profile, instance role).
///
/// # Errors
///
/// Returns a configuration error if the endpoint is not a valid URL.
pub async fn build_s3_client(config: &StorageConfig) -> Result<aws_sdk_s3::Client> {
    let endpoint = config
        .endpoint_url()
        .map_err(HighwaterError::Configuration)?;

    let mut loader = aws_config::defaults(BehaviorVersion::latest())
        .region(Region::new(config.region.clone()));

    if let Some(endpoint) = &endpoint {
        loader = loader.endpoint_url(endpoint.as_str());
    }

    if let (Some(key_id), Some(secret)) = (&config.access_key_id, &config.secret_access_key) {
        loader = loader.credentials_provider(Credentials::new(
            key_id.clone(),
            secret.expose_secret().as_ref().to_string(),
            None,
            None,
            "highwater-config",
        ));
    }

    let sdk_config = loader.load().await;
    let s3_config = aws_sdk_s3::config::Builder::from(&sdk_config)
        .force_path_style(config.path_style)
        .build();

    tracing::debug!(
        region = %config.region,
        endpoint = endpoint.as_deref().unwrap_or("aws default"),
        path_style = config.path_style,
        "S3 client configured"
    );

    Ok(aws_sdk_s3::Client::from_conf(s3_config))
}

/// Join a key prefix and a name with exactly one `/` between them
pub fn join_key(prefix: &str, name: &str) -> String {
    let prefix = prefix.trim_matches('/');
    if prefix.is_empty() {
        name.to_string()
    } else {
        format!("{prefix}/{name}")
    }
}
