pub mod banner;
pub mod card;
pub mod config;
pub mod feature;
pub mod plan;

pub use banner::{BannerBullet, BannerSelector, BannerSpec, select_banner};
pub use feature::FeatureKey;
pub use plan::{PlanTier, SitePlan};
