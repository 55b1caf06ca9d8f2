use std::env;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use clap::{Args, CommandFactory, Parser, Subcommand};
use plancard_core::banner::BannerSpec;
use plancard_core::card::{CardView, SettingsCard, SettingsCardProps};
use plancard_core::config::{
    ConfigPatch, ResolvedSettings, load_config, patch_config, resolve_config_path,
};
use plancard_core::{FeatureKey, PlanTier, SitePlan};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(
    name = "plancard",
    version,
    about = "Preview plan-aware settings cards and upsell banners"
)]
struct Cli {
    #[arg(long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,
    #[arg(long, global = true, help = "Print resolved runtime diagnostics")]
    diagnostics: bool,
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Debug, Clone)]
struct RuntimeOptions {
    config: Option<PathBuf>,
    diagnostics: bool,
}

impl RuntimeOptions {
    fn from_cli(cli: &Cli) -> Self {
        Self {
            config: cli.config.clone(),
            diagnostics: cli.diagnostics,
        }
    }
}

#[derive(Debug, Subcommand)]
enum Commands {
    #[command(about = "Select the upsell banner for a feature")]
    Banner(BannerArgs),
    #[command(about = "Render a settings card with its save button and banner")]
    Card(CardArgs),
    #[command(about = "Print the banner decision for every feature and tier")]
    Matrix(MatrixArgs),
    Config(ConfigArgs),
}

#[derive(Debug, Args)]
struct PlanArgs {
    #[arg(long, value_name = "SLUG", help = "Plan product slug, e.g. jetpack_premium")]
    plan: Option<String>,
    #[arg(
        long,
        value_name = "NAME",
        conflicts_with = "plan",
        help = "Tier name: free, premium or business"
    )]
    tier: Option<String>,
}

#[derive(Debug, Args)]
struct BannerArgs {
    #[arg(long, value_name = "KEY")]
    feature: String,
    #[command(flatten)]
    plan: PlanArgs,
    #[arg(long, value_name = "URL")]
    site: Option<String>,
    #[arg(long, help = "Print JSON instead of key/value lines")]
    json: bool,
}

#[derive(Debug, Args)]
struct CardArgs {
    #[arg(long, value_name = "KEY")]
    feature: Option<String>,
    #[arg(long)]
    header: Option<String>,
    #[arg(long)]
    module_name: Option<String>,
    #[arg(long, help = "A save is in progress")]
    saving: bool,
    #[arg(long, help = "The form has unsaved changes")]
    dirty: bool,
    #[arg(long)]
    hide_button: bool,
    #[command(flatten)]
    plan: PlanArgs,
    #[arg(long, value_name = "URL")]
    site: Option<String>,
    #[arg(long, help = "Print JSON instead of key/value lines")]
    json: bool,
}

#[derive(Debug, Args)]
struct MatrixArgs {
    #[arg(long, value_name = "URL")]
    site: Option<String>,
}

#[derive(Debug, Args)]
struct ConfigArgs {
    #[command(subcommand)]
    command: ConfigSubcommand,
}

#[derive(Debug, Subcommand)]
enum ConfigSubcommand {
    Show,
    Set {
        #[arg(long, value_name = "URL")]
        site: Option<String>,
        #[arg(long, value_name = "SLUG")]
        plan: Option<String>,
        #[arg(long, value_name = "URL")]
        redirect_base: Option<String>,
    },
}

fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();
    let runtime = RuntimeOptions::from_cli(&cli);

    match cli.command {
        Some(Commands::Banner(args)) => run_banner(&runtime, args),
        Some(Commands::Card(args)) => run_card(&runtime, args),
        Some(Commands::Matrix(args)) => run_matrix(&runtime, args),
        Some(Commands::Config(ConfigArgs { command })) => match command {
            ConfigSubcommand::Show => run_config_show(&runtime),
            ConfigSubcommand::Set {
                site,
                plan,
                redirect_base,
            } => run_config_set(
                &runtime,
                ConfigPatch {
                    set_site_url: site,
                    set_plan: plan,
                    set_redirect_base: redirect_base,
                },
            ),
        },
        None => {
            let mut command = Cli::command();
            command.print_help()?;
            println!();
            Ok(())
        }
    }
}

fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();
}

struct Runtime {
    config_path: PathBuf,
    settings: ResolvedSettings,
}

impl Runtime {
    fn diagnostics(&self) -> String {
        format!(
            "config_path={} ({})\nsite_url={}\nplan_slug={}\nredirect_base={}",
            normalize_path(&self.config_path),
            if self.config_path.exists() {
                "found"
            } else {
                "missing"
            },
            self.settings.site_url.as_deref().unwrap_or("<unset>"),
            self.settings.plan_slug,
            self.settings.redirect_base
        )
    }

    fn site_url(&self, flag: Option<String>) -> Result<String> {
        match flag.or_else(|| self.settings.site_url.clone()) {
            Some(url) if !url.trim().is_empty() => Ok(url),
            _ => bail!(
                "no site URL: pass --site, set PLANCARD_SITE_URL, or run `plancard config set --site <URL>`"
            ),
        }
    }

    /// Tier from `--tier`, `--plan`, or the configured plan. An unrecognized
    /// tier name yields `None`, which suppresses the banner.
    fn tier(&self, args: &PlanArgs) -> Option<PlanTier> {
        if let Some(name) = &args.tier {
            return PlanTier::parse(name);
        }
        let plan = match &args.plan {
            Some(slug) => SitePlan::new(slug.clone()),
            None => self.settings.site_plan(),
        };
        Some(plan.tier())
    }
}

fn resolve_runtime(runtime: &RuntimeOptions) -> Result<Runtime> {
    dotenvy::dotenv().ok();

    let cwd = env::current_dir().context("failed to read current directory")?;
    let config_path = resolve_config_path(&cwd, runtime.config.as_deref());
    let config = load_config(&config_path)?;
    tracing::debug!(path = %config_path.display(), "loaded config");
    let resolved = Runtime {
        settings: config.resolve(),
        config_path,
    };
    if runtime.diagnostics {
        println!("[diagnostics]\n{}\n", resolved.diagnostics());
    }
    Ok(resolved)
}

fn run_banner(runtime: &RuntimeOptions, args: BannerArgs) -> Result<()> {
    let resolved = resolve_runtime(runtime)?;
    let site_url = resolved.site_url(args.site)?;
    let feature = FeatureKey::from_key(&args.feature);
    let banner = resolved
        .tier(&args.plan)
        .and_then(|tier| resolved.settings.selector().select(feature, tier, &site_url));

    if args.json {
        println!("{}", serde_json::to_string_pretty(&banner)?);
        return Ok(());
    }
    print_banner("banner", banner.as_ref());
    Ok(())
}

fn run_card(runtime: &RuntimeOptions, args: CardArgs) -> Result<()> {
    let resolved = resolve_runtime(runtime)?;
    let site_url = resolved.site_url(args.site)?;
    let tier = resolved.tier(&args.plan);
    let props = SettingsCardProps {
        header: args.header,
        module_name: args.module_name,
        feature: tier.and(args.feature.as_deref().map(FeatureKey::from_key)),
        hide_button: args.hide_button,
        saving: args.saving,
        dirty: args.dirty,
    };
    let view = SettingsCard::render(
        &props,
        tier.unwrap_or_default(),
        &site_url,
        &resolved.settings.selector(),
    );

    if args.json {
        println!("{}", serde_json::to_string_pretty(&view)?);
        return Ok(());
    }
    print_card(&view);
    Ok(())
}

fn run_matrix(runtime: &RuntimeOptions, args: MatrixArgs) -> Result<()> {
    let resolved = resolve_runtime(runtime)?;
    let site_url = resolved.site_url(args.site)?;
    let selector = resolved.settings.selector();

    println!("banner matrix");
    println!("site: {site_url}");
    for feature in FeatureKey::ALL {
        for tier in PlanTier::ALL {
            let cell = match selector.select(feature, tier, &site_url) {
                Some(banner) => format!(
                    "{} [{}]",
                    banner.target_plan,
                    banner
                        .bullets
                        .iter()
                        .map(|bullet| bullet.key())
                        .collect::<Vec<_>>()
                        .join(", ")
                ),
                None => "<none>".to_string(),
            };
            println!("{feature}.{tier}: {cell}");
        }
    }
    Ok(())
}

fn run_config_show(runtime: &RuntimeOptions) -> Result<()> {
    let resolved = resolve_runtime(runtime)?;
    let settings = &resolved.settings;

    println!("config");
    println!("config_path: {}", normalize_path(&resolved.config_path));
    println!(
        "config_exists: {}",
        format_flag(resolved.config_path.exists())
    );
    println!(
        "site_url: {}",
        settings.site_url.as_deref().unwrap_or("<unset>")
    );
    println!("plan: {}", settings.plan_slug);
    println!("tier: {}", settings.site_plan().tier());
    println!("redirect_base: {}", settings.redirect_base);
    Ok(())
}

fn run_config_set(runtime: &RuntimeOptions, patch: ConfigPatch) -> Result<()> {
    if patch.is_empty() {
        bail!("config set requires at least one of --site, --plan, --redirect-base");
    }
    let resolved = resolve_runtime(runtime)?;
    let wrote = patch_config(&resolved.config_path, &patch)?;
    println!("config_path: {}", normalize_path(&resolved.config_path));
    println!("updated: {}", format_flag(wrote));
    Ok(())
}

fn print_banner(prefix: &str, banner: Option<&BannerSpec>) {
    let Some(banner) = banner else {
        println!("{prefix}: <none>");
        return;
    };
    println!("{prefix}.feature: {}", banner.feature);
    println!("{prefix}.title: {}", banner.title);
    if let Some(description) = &banner.description {
        println!("{prefix}.description: {description}");
    }
    for text in banner.bullet_texts() {
        println!("{prefix}.bullet: {text}");
    }
    println!("{prefix}.target_plan: {}", banner.target_plan);
    println!("{prefix}.target_product: {}", banner.target_product_slug());
    println!("{prefix}.link: {}", banner.link_url);
}

fn print_card(view: &CardView) {
    println!("card");
    println!(
        "header: {}",
        if view.header.is_empty() {
            "<none>"
        } else {
            view.header.as_str()
        }
    );
    match &view.save_button {
        Some(button) => {
            println!("button.label: {}", button.label);
            println!("button.disabled: {}", format_flag(button.disabled));
            println!("button.submitting: {}", format_flag(button.submitting));
        }
        None => println!("button: <hidden>"),
    }
    print_banner("banner", view.banner.as_ref());
}

fn normalize_path(path: &Path) -> String {
    path.to_string_lossy().replace('\\', "/")
}

fn format_flag(value: bool) -> &'static str {
    if value { "yes" } else { "no" }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn plan_and_tier_flags_conflict() {
        let parsed = Cli::try_parse_from([
            "plancard",
            "banner",
            "--feature",
            "seo-tools",
            "--plan",
            "jetpack_premium",
            "--tier",
            "free",
        ]);
        assert!(parsed.is_err());
    }

    #[test]
    fn card_flags_parse() {
        let cli = Cli::try_parse_from([
            "plancard",
            "--config",
            "custom.toml",
            "card",
            "--feature",
            "video-hosting",
            "--module-name",
            "VideoPress",
            "--saving",
        ])
        .expect("parse");
        assert_eq!(cli.config, Some(PathBuf::from("custom.toml")));
        match cli.command {
            Some(Commands::Card(args)) => {
                assert_eq!(args.feature.as_deref(), Some("video-hosting"));
                assert!(args.saving);
                assert!(!args.dirty);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn unknown_tier_name_suppresses_banner() {
        let runtime = Runtime {
            config_path: PathBuf::from("/nonexistent/config.toml"),
            settings: plancard_core::config::PlancardConfig::default()
                .resolve_with_lookup(|_| None),
        };
        let args = PlanArgs {
            plan: None,
            tier: Some("platinum".to_string()),
        };
        assert_eq!(runtime.tier(&args), None);

        let args = PlanArgs {
            plan: Some("value_bundle".to_string()),
            tier: None,
        };
        assert_eq!(runtime.tier(&args), Some(PlanTier::Premium));

        let args = PlanArgs {
            plan: None,
            tier: None,
        };
        assert_eq!(runtime.tier(&args), Some(PlanTier::Free));
    }

    #[test]
    fn missing_site_url_is_an_error() {
        let runtime = Runtime {
            config_path: PathBuf::from("/nonexistent/config.toml"),
            settings: plancard_core::config::PlancardConfig::default()
                .resolve_with_lookup(|_| None),
        };
        assert!(runtime.site_url(None).is_err());
        assert_eq!(
            runtime.site_url(Some("example.com".to_string())).expect("site"),
            "example.com"
        );
    }
}
