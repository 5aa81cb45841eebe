use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::model::{IdCategory, SpotifyImage};

/// A user's profile. `email`, `country` and `product` are only present for the
/// current user and only with the matching scopes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpotifyUser {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    pub uri: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub href: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub country: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub product: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub images: Option<Vec<SpotifyImage>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub external_urls: Option<HashMap<String, String>>,
    #[serde(rename = "type")]
    pub object_type: IdCategory,
}
