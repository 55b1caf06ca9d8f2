//! Upsell banner selection for settings cards.
//!
//! The banner shown under a card depends only on the gated feature, the
//! site's current plan tier and the site URL used to build the upgrade link.
//! Selection is pure: the same inputs always produce the same banner, and
//! combinations without an upgrade path produce no banner at all.

use serde::Serialize;

use crate::feature::FeatureKey;
use crate::plan::{PlanTier, SitePlan};

pub const DEFAULT_REDIRECT_BASE: &str = "https://jetpack.com/redirect/";
pub const LINK_SOURCE: &str = "plans-compare-personal";

pub const VIDEO_TITLE: &str = "Add premium video";
pub const VIDEO_DESCRIPTION: &str = "Upgrade to the Premium plan to easily upload videos to your website and display them using a fast, unbranded, customizable player.";
pub const SECURITY_TITLE: &str = "Upgrade to further protect your site";
pub const SEO_TITLE: &str = "Upgrade to monetize your site and unlock more tools";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum BannerBullet {
    SpamDefense,
    Backups,
    SecurityScanning,
    Ads,
    SeoTools,
    Analytics,
}

impl BannerBullet {
    pub fn key(self) -> &'static str {
        match self {
            Self::SpamDefense => "spam-defense",
            Self::Backups => "backups",
            Self::SecurityScanning => "security-scanning",
            Self::Ads => "ads",
            Self::SeoTools => "seo-tools",
            Self::Analytics => "analytics",
        }
    }

    pub fn text(self) -> &'static str {
        match self {
            Self::SpamDefense => "State-of-the-art spam defence powered by Akismet",
            Self::Backups => "Automatic backups of every single aspect of your site",
            Self::SecurityScanning => {
                "Comprehensive and automated scanning for any security vulnerabilites or threats"
            }
            Self::Ads => "Enable advertisements on your site to earn money from impressions",
            Self::SeoTools => {
                "SEO tools to optimize your site for search engines and social media sharing"
            }
            Self::Analytics => {
                "Google Analytics tracking settings to complement WordPress.com stats"
            }
        }
    }
}

/// A banner ready to hand to a renderer. Built fresh for every selection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BannerSpec {
    pub feature: FeatureKey,
    pub title: String,
    pub description: Option<String>,
    pub bullets: Vec<BannerBullet>,
    pub target_plan: PlanTier,
    pub link_url: String,
}

impl BannerSpec {
    pub fn bullet_texts(&self) -> Vec<&'static str> {
        self.bullets.iter().map(|bullet| bullet.text()).collect()
    }

    pub fn target_product_slug(&self) -> &'static str {
        self.target_plan.product_slug()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BannerSelector {
    redirect_base: String,
}

impl Default for BannerSelector {
    fn default() -> Self {
        Self::new(DEFAULT_REDIRECT_BASE)
    }
}

impl BannerSelector {
    pub fn new(redirect_base: impl Into<String>) -> Self {
        Self {
            redirect_base: redirect_base.into(),
        }
    }

    pub fn redirect_base(&self) -> &str {
        &self.redirect_base
    }

    /// Upgrade link for a site. `site_url` is inserted as given, without escaping.
    pub fn link_url(&self, site_url: &str) -> String {
        format!(
            "{}?source={LINK_SOURCE}&site={site_url}",
            self.redirect_base
        )
    }

    pub fn select(&self, feature: FeatureKey, tier: PlanTier, site_url: &str) -> Option<BannerSpec> {
        let banner = match feature {
            FeatureKey::VideoHosting => {
                if tier >= PlanTier::Premium {
                    None
                } else {
                    Some(BannerSpec {
                        feature,
                        title: VIDEO_TITLE.to_string(),
                        description: Some(VIDEO_DESCRIPTION.to_string()),
                        bullets: Vec::new(),
                        target_plan: PlanTier::Premium,
                        link_url: self.link_url(site_url),
                    })
                }
            }
            FeatureKey::SecurityScanning => self.tiered_banner(
                feature,
                tier,
                site_url,
                SECURITY_TITLE,
                BannerBullet::SpamDefense,
                [BannerBullet::Backups, BannerBullet::SecurityScanning],
            ),
            FeatureKey::SeoTools => self.tiered_banner(
                feature,
                tier,
                site_url,
                SEO_TITLE,
                BannerBullet::Ads,
                [BannerBullet::SeoTools, BannerBullet::Analytics],
            ),
            FeatureKey::Other => None,
        };

        match &banner {
            Some(spec) => tracing::debug!(
                feature = feature.as_str(),
                tier = tier.as_str(),
                target_plan = spec.target_plan.as_str(),
                bullets = spec.bullets.len(),
                "selected upsell banner"
            ),
            None => tracing::debug!(
                feature = feature.as_str(),
                tier = tier.as_str(),
                "no upsell banner"
            ),
        }
        banner
    }

    /// Banners with a two-step upgrade path. Below premium, the premium-only
    /// bullet goes first and the target is premium; on premium the target is
    /// business; on business there is nothing left to sell.
    fn tiered_banner(
        &self,
        feature: FeatureKey,
        tier: PlanTier,
        site_url: &str,
        title: &str,
        premium_bullet: BannerBullet,
        base_bullets: [BannerBullet; 2],
    ) -> Option<BannerSpec> {
        if tier >= PlanTier::Business {
            return None;
        }

        let mut bullets = base_bullets.to_vec();
        let target_plan = if tier < PlanTier::Premium {
            bullets.insert(0, premium_bullet);
            PlanTier::Premium
        } else {
            PlanTier::Business
        };

        Some(BannerSpec {
            feature,
            title: title.to_string(),
            description: None,
            bullets,
            target_plan,
            link_url: self.link_url(site_url),
        })
    }

    /// String entry point. An unknown feature or tier name yields no banner.
    pub fn select_for_keys(&self, feature: &str, tier: &str, site_url: &str) -> Option<BannerSpec> {
        let Some(tier) = PlanTier::parse(tier) else {
            tracing::debug!(feature, tier, "unrecognized tier name, no upsell banner");
            return None;
        };
        self.select(FeatureKey::from_key(feature), tier, site_url)
    }

    pub fn select_for_plan(
        &self,
        feature: FeatureKey,
        plan: &SitePlan,
        site_url: &str,
    ) -> Option<BannerSpec> {
        self.select(feature, plan.tier(), site_url)
    }
}

/// Select a banner using the default redirect base.
pub fn select_banner(feature: FeatureKey, tier: PlanTier, site_url: &str) -> Option<BannerSpec> {
    BannerSelector::default().select(feature, tier, site_url)
}

pub fn select_banner_for_keys(feature: &str, tier: &str, site_url: &str) -> Option<BannerSpec> {
    BannerSelector::default().select_for_keys(feature, tier, site_url)
}

pub fn select_banner_for_plan(
    feature: FeatureKey,
    plan: &SitePlan,
    site_url: &str,
) -> Option<BannerSpec> {
    BannerSelector::default().select_for_plan(feature, plan, site_url)
}
