use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const PLAN_JETPACK_FREE: &str = "jetpack_free";
pub const PLAN_JETPACK_PERSONAL: &str = "jetpack_personal";
pub const PLAN_JETPACK_PERSONAL_MONTHLY: &str = "jetpack_personal_monthly";
pub const PLAN_JETPACK_PREMIUM: &str = "jetpack_premium";
pub const PLAN_JETPACK_PREMIUM_MONTHLY: &str = "jetpack_premium_monthly";
pub const PLAN_JETPACK_BUSINESS: &str = "jetpack_business";
pub const PLAN_JETPACK_BUSINESS_MONTHLY: &str = "jetpack_business_monthly";
pub const PLAN_PERSONAL: &str = "personal-bundle";
pub const PLAN_PREMIUM: &str = "value_bundle";
pub const PLAN_BUSINESS: &str = "business-bundle";

const PREMIUM_SLUGS: [&str; 3] = [PLAN_JETPACK_PREMIUM, PLAN_JETPACK_PREMIUM_MONTHLY, PLAN_PREMIUM];
const BUSINESS_SLUGS: [&str; 3] = [
    PLAN_JETPACK_BUSINESS,
    PLAN_JETPACK_BUSINESS_MONTHLY,
    PLAN_BUSINESS,
];

/// Subscription level of a site. Variants are declared in upgrade order so the
/// derived `Ord` matches `free < premium < business`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum PlanTier {
    #[default]
    Free,
    Premium,
    Business,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown plan tier `{0}` (expected free, premium or business)")]
pub struct UnknownTier(pub String);

impl PlanTier {
    pub const ALL: [PlanTier; 3] = [Self::Free, Self::Premium, Self::Business];

    /// Classify a raw plan product slug. Anything that is not a known premium or
    /// business product (personal plans included) lands on `Free`.
    pub fn from_product_slug(slug: &str) -> Self {
        let normalized = slug.trim().to_ascii_lowercase();
        let tier = if PREMIUM_SLUGS.contains(&normalized.as_str()) {
            Self::Premium
        } else if BUSINESS_SLUGS.contains(&normalized.as_str()) {
            Self::Business
        } else {
            Self::Free
        };
        tracing::trace!(slug, tier = tier.as_str(), "classified plan product slug");
        tier
    }

    /// Parse a tier name. Returns `None` for anything unrecognized.
    pub fn parse(name: &str) -> Option<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "free" => Some(Self::Free),
            "premium" => Some(Self::Premium),
            "business" => Some(Self::Business),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Free => "free",
            Self::Premium => "premium",
            Self::Business => "business",
        }
    }

    /// Product slug used when linking to an upgrade for this tier.
    pub fn product_slug(self) -> &'static str {
        match self {
            Self::Free => PLAN_JETPACK_FREE,
            Self::Premium => PLAN_JETPACK_PREMIUM,
            Self::Business => PLAN_JETPACK_BUSINESS,
        }
    }

    pub fn plan_class(self) -> &'static str {
        match self {
            Self::Free => "is-free-plan",
            Self::Premium => "is-premium-plan",
            Self::Business => "is-business-plan",
        }
    }
}

impl FromStr for PlanTier {
    type Err = UnknownTier;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s).ok_or_else(|| UnknownTier(s.to_string()))
    }
}

impl fmt::Display for PlanTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Plan record as reported by site data.
#[derive(Debug, Clone, Deserialize, Serialize, Default, PartialEq, Eq)]
pub struct SitePlan {
    #[serde(default)]
    pub product_slug: String,
}

impl SitePlan {
    pub fn new(product_slug: impl Into<String>) -> Self {
        Self {
            product_slug: product_slug.into(),
        }
    }

    pub fn tier(&self) -> PlanTier {
        PlanTier::from_product_slug(&self.product_slug)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tiers_are_ordered_by_upgrade_path() {
        assert!(PlanTier::Free < PlanTier::Premium);
        assert!(PlanTier::Premium < PlanTier::Business);
        assert_eq!(PlanTier::ALL.iter().max(), Some(&PlanTier::Business));
    }

    #[test]
    fn premium_and_business_products_classify() {
        assert_eq!(PlanTier::from_product_slug("jetpack_premium"), PlanTier::Premium);
        assert_eq!(
            PlanTier::from_product_slug("jetpack_premium_monthly"),
            PlanTier::Premium
        );
        assert_eq!(PlanTier::from_product_slug("value_bundle"), PlanTier::Premium);
        assert_eq!(PlanTier::from_product_slug("jetpack_business"), PlanTier::Business);
        assert_eq!(
            PlanTier::from_product_slug("jetpack_business_monthly"),
            PlanTier::Business
        );
        assert_eq!(PlanTier::from_product_slug("business-bundle"), PlanTier::Business);
    }

    #[test]
    fn personal_and_unknown_products_fall_back_to_free() {
        for slug in [
            "jetpack_free",
            "jetpack_personal",
            "jetpack_personal_monthly",
            "personal-bundle",
            "",
            "enterprise_plan",
        ] {
            assert_eq!(PlanTier::from_product_slug(slug), PlanTier::Free, "{slug}");
        }
    }

    #[test]
    fn product_slug_matching_ignores_case_and_padding() {
        assert_eq!(
            PlanTier::from_product_slug("  Jetpack_Business \n"),
            PlanTier::Business
        );
    }

    #[test]
    fn parse_tier_names() {
        assert_eq!(PlanTier::parse("free"), Some(PlanTier::Free));
        assert_eq!(PlanTier::parse(" Premium "), Some(PlanTier::Premium));
        assert_eq!(PlanTier::parse("BUSINESS"), Some(PlanTier::Business));
        assert_eq!(PlanTier::parse("personal"), None);
        assert_eq!(PlanTier::parse(""), None);
    }

    #[test]
    fn from_str_reports_unknown_tier() {
        let error = "gold".parse::<PlanTier>().expect_err("must fail");
        assert_eq!(error, UnknownTier("gold".to_string()));
        assert!(error.to_string().contains("gold"));
    }

    #[test]
    fn site_plan_deserializes_with_missing_slug() {
        let plan: SitePlan = serde_json::from_str("{}").expect("parse site plan");
        assert_eq!(plan.tier(), PlanTier::Free);

        let plan: SitePlan =
            serde_json::from_str(r#"{"product_slug":"jetpack_premium","product_id":2000}"#)
                .expect("parse site plan");
        assert_eq!(plan.tier(), PlanTier::Premium);
    }

    #[test]
    fn tier_serializes_lowercase() {
        assert_eq!(
            serde_json::to_string(&PlanTier::Business).expect("serialize"),
            "\"business\""
        );
        assert_eq!(PlanTier::Premium.plan_class(), "is-premium-plan");
        assert_eq!(PlanTier::Premium.product_slug(), "jetpack_premium");
    }
}
