//! Campaign briefs: validation and persistence

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::debug;

use crate::constants::REQUIRED_BRIEF_FIELDS;
use crate::error::CampaignError;

/// A campaign brief as posted by the client.
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
pub struct CampaignBrief {
    /// product identifier, also the output folder name
    pub product_name: String,
    /// region the campaign targets
    pub target_region: String,
    /// audience, used in the image generation prompt
    pub target_audience: String,
    /// text overlaid on every asset
    pub campaign_message: String,
    /// anything else the client sent, kept when the brief is saved
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl CampaignBrief {
    /// Parses a request body, reporting the first missing required field.
    pub fn from_slice(body: &[u8]) -> Result<Self, CampaignError> {
        let value: Value = serde_json::from_slice(body)
            .map_err(|_| CampaignError::BadRequest("No campaign brief provided".to_string()))?;
        Self::from_value(value)
    }

    /// Validates a decoded JSON document.
    pub fn from_value(value: Value) -> Result<Self, CampaignError> {
        let Value::Object(fields) = &value else {
            return Err(CampaignError::BadRequest(
                "No campaign brief provided".to_string(),
            ));
        };
        if fields.is_empty() {
            return Err(CampaignError::BadRequest(
                "No campaign brief provided".to_string(),
            ));
        }
        if let Some(missing) = REQUIRED_BRIEF_FIELDS
            .iter()
            .find(|field| !fields.contains_key(**field))
        {
            return Err(CampaignError::MissingField(missing.to_string()));
        }
        serde_json::from_value(value).map_err(|err| CampaignError::BadRequest(err.to_string()))
    }

    /// `brief_<product>.json`, spaces in the product name become underscores.
    pub fn file_name(&self) -> String {
        format!("brief_{}.json", self.product_name.replace(' ', "_"))
    }

    /// Writes the brief as pretty JSON into `upload_dir`.
    pub async fn save(&self, upload_dir: &Path) -> Result<PathBuf, CampaignError> {
        validate_product_name(&self.product_name)?;
        tokio::fs::create_dir_all(upload_dir).await?;
        let path = upload_dir.join(self.file_name());
        let body = serde_json::to_vec_pretty(self)?;
        tokio::fs::write(&path, body).await?;
        debug!("Saved brief to {}", path.display());
        Ok(path)
    }
}

/// Product names become path segments, so they must be a single plain one.
pub fn validate_product_name(name: &str) -> Result<(), CampaignError> {
    let trimmed = name.trim();
    let valid = !trimmed.is_empty()
        && trimmed == name
        && !name.starts_with('.')
        && !name.contains(['/', '\\', '\0']);
    if valid {
        Ok(())
    } else {
        Err(CampaignError::BadRequest(format!(
            "Invalid product name: {name:?}"
        )))
    }
}
