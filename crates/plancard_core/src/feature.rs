use std::convert::Infallible;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

pub const FEATURE_VIDEO_HOSTING_JETPACK: &str = "video-hosting-jetpack";
pub const FEATURE_SECURITY_SCANNING_JETPACK: &str = "security-scanning-jetpack";
pub const FEATURE_SEO_TOOLS_JETPACK: &str = "seo-tools-jetpack";

/// Protected functionality a settings card can be gated on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FeatureKey {
    VideoHosting,
    SecurityScanning,
    SeoTools,
    Other,
}

impl FeatureKey {
    pub const ALL: [FeatureKey; 4] = [
        Self::VideoHosting,
        Self::SecurityScanning,
        Self::SeoTools,
        Self::Other,
    ];

    /// Map a feature identifier to a key. Unrecognized identifiers become `Other`.
    pub fn from_key(key: &str) -> Self {
        match key.trim() {
            "video-hosting" | FEATURE_VIDEO_HOSTING_JETPACK => Self::VideoHosting,
            "security-scanning" | FEATURE_SECURITY_SCANNING_JETPACK => Self::SecurityScanning,
            "seo-tools" | FEATURE_SEO_TOOLS_JETPACK => Self::SeoTools,
            _ => Self::Other,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::VideoHosting => "video-hosting",
            Self::SecurityScanning => "security-scanning",
            Self::SeoTools => "seo-tools",
            Self::Other => "other",
        }
    }
}

impl FromStr for FeatureKey {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::from_key(s))
    }
}

impl fmt::Display for FeatureKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
