use serde::Serialize;

use crate::banner::{BannerSelector, BannerSpec};
use crate::feature::FeatureKey;
use crate::plan::PlanTier;

pub const SAVE_LABEL: &str = "Save settings";
pub const SAVING_LABEL: &str = "Saving…";

/// Inputs a settings form card is rendered from.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SettingsCardProps {
    pub header: Option<String>,
    pub module_name: Option<String>,
    pub feature: Option<FeatureKey>,
    pub hide_button: bool,
    pub saving: bool,
    pub dirty: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SaveButton {
    pub label: &'static str,
    pub disabled: bool,
    pub submitting: bool,
}

impl SaveButton {
    pub fn new(saving: bool, dirty: bool) -> Self {
        Self {
            label: if saving { SAVING_LABEL } else { SAVE_LABEL },
            disabled: saving || !dirty,
            submitting: saving,
        }
    }

    /// Clicks are swallowed while a save is in flight.
    pub fn accepts_submit(&self) -> bool {
        !self.submitting
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CardView {
    pub header: String,
    pub save_button: Option<SaveButton>,
    pub banner: Option<BannerSpec>,
}

pub struct SettingsCard;

impl SettingsCard {
    pub fn resolve_header(props: &SettingsCardProps) -> String {
        match props.header.as_deref() {
            Some(header) if !header.is_empty() => header.to_string(),
            _ => props.module_name.clone().unwrap_or_default(),
        }
    }

    pub fn render(
        props: &SettingsCardProps,
        tier: PlanTier,
        site_url: &str,
        selector: &BannerSelector,
    ) -> CardView {
        let save_button = (!props.hide_button).then(|| SaveButton::new(props.saving, props.dirty));
        let banner = props
            .feature
            .and_then(|feature| selector.select(feature, tier, site_url));

        CardView {
            header: Self::resolve_header(props),
            save_button,
            banner,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn props() -> SettingsCardProps {
        SettingsCardProps {
            header: Some("Security".to_string()),
            ..SettingsCardProps::default()
        }
    }

    #[test]
    fn save_button_reflects_saving_and_dirty_state() {
        let idle_clean = SaveButton::new(false, false);
        assert_eq!(idle_clean.label, SAVE_LABEL);
        assert!(idle_clean.disabled);
        assert!(idle_clean.accepts_submit());

        let idle_dirty = SaveButton::new(false, true);
        assert!(!idle_dirty.disabled);

        let saving = SaveButton::new(true, true);
        assert_eq!(saving.label, SAVING_LABEL);
        assert!(saving.disabled);
        assert!(saving.submitting);
        assert!(!saving.accepts_submit());
    }

    #[test]
    fn header_falls_back_to_module_name() {
        let mut card = SettingsCardProps {
            module_name: Some("Protect".to_string()),
            ..SettingsCardProps::default()
        };
        assert_eq!(SettingsCard::resolve_header(&card), "Protect");

        card.header = Some(String::new());
        assert_eq!(SettingsCard::resolve_header(&card), "Protect");

        card.header = Some("Brute force protection".to_string());
        assert_eq!(SettingsCard::resolve_header(&card), "Brute force protection");

        assert_eq!(SettingsCard::resolve_header(&SettingsCardProps::default()), "");
    }

    #[test]
    fn hidden_button_is_omitted() {
        let card = SettingsCardProps {
            hide_button: true,
            ..props()
        };
        let view = SettingsCard::render(&card, PlanTier::Free, "a.example", &BannerSelector::default());
        assert_eq!(view.save_button, None);
    }

    #[test]
    fn card_without_feature_has_no_banner() {
        let view = SettingsCard::render(&props(), PlanTier::Free, "a.example", &BannerSelector::default());
        assert_eq!(view.header, "Security");
        assert!(view.save_button.is_some());
        assert_eq!(view.banner, None);
    }

    #[test]
    fn card_with_feature_embeds_selected_banner() {
        let card = SettingsCardProps {
            feature: Some(FeatureKey::SecurityScanning),
            dirty: true,
            ..props()
        };
        let view = SettingsCard::render(&card, PlanTier::Premium, "a.example", &BannerSelector::default());
        let banner = view.banner.expect("banner");
        assert_eq!(banner.target_plan, PlanTier::Business);
        assert_eq!(view.save_button.map(|button| button.disabled), Some(false));

        let view = SettingsCard::render(&card, PlanTier::Business, "a.example", &BannerSelector::default());
        assert_eq!(view.banner, None);
    }
}
