//! FHIR Bundle wire models
//!
//! Search responses arrive as `searchset` Bundles. Entries are decoded one by
//! one so that a single malformed resource does not cost the whole page.

use crate::domain::resources::Resource;
use serde::{Deserialize, Serialize};

/// Link relation that carries the continuation URL
pub const NEXT_RELATION: &str = "next";

/// A FHIR Bundle as returned by search
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Bundle {
    #[serde(default)]
    pub resource_type: Option<String>,

    #[serde(default, rename = "type")]
    pub bundle_type: Option<String>,

    #[serde(default)]
    pub total: Option<u64>,

    #[serde(default)]
    pub link: Vec<BundleLink>,

    #[serde(default)]
    pub entry: Vec<BundleEntry>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BundleLink {
    pub relation: String,
    pub url: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BundleEntry {
    #[serde(default)]
    pub full_url: Option<String>,

    /// Kept as raw JSON and decoded per entry
    #[serde(default)]
    pub resource: Option<serde_json::Value>,
}

impl Bundle {
    /// True if the body declared itself a Bundle (or declared nothing)
    pub fn is_bundle(&self) -> bool {
        self.resource_type
            .as_deref()
            .map(|t| t == "Bundle")
            .unwrap_or(true)
    }

    /// URL of the `next` link, if present and non-empty
    pub fn next_link(&self) -> Option<&str> {
        self.link
            .iter()
            .find(|l| l.relation == NEXT_RELATION)
            .map(|l| l.url.as_str())
            .filter(|url| !url.trim().is_empty())
    }

    /// Decodes every entry resource, skipping those that fail to decode
    pub fn into_resources(self) -> Vec<Resource> {
        let mut resources = Vec::with_capacity(self.entry.len());
        for entry in self.entry {
            let Some(value) = entry.resource else {
                continue;
            };
            match serde_json::from_value::<Resource>(value) {
                Ok(resource) => resources.push(resource),
                Err(e) => {
                    tracing::warn!(
                        full_url = entry.full_url.as_deref().unwrap_or("<none>"),
                        error = %e,
                        "Skipping bundle entry that could not be decoded"
                    );
                }
            }
        }
        resources
    }
}
