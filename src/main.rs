use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;

use browser::{LinkResolver, LinkTarget, ShellApp};
use clap::Parser;
use config::BurrowserConfig;
use html::ExtractOptions;
use net::NetOptions;
use platform::PlatformOptions;

#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

#[derive(Parser, Debug)]
#[command(name = "burrowser")]
#[command(about = "Browse a wiki as a tree of nested documents", long_about = None)]
struct Args {
    /// Article title, site path or URL to open first
    url: Option<String>,

    /// Config file (defaults to $BURROWSER_CONFIG, then ./burrowser.toml)
    #[arg(short, long)]
    config: Option<PathBuf>,
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Args::parse();

    let config = match BurrowserConfig::discover(args.config.as_deref()) {
        Ok(config) => config,
        Err(err) => {
            log::error!("{err}");
            return ExitCode::FAILURE;
        }
    };

    let resolver = match LinkResolver::new(&config.site) {
        Ok(resolver) => resolver,
        Err(err) => {
            log::error!("{err}");
            return ExitCode::FAILURE;
        }
    };
    let start = args.url.unwrap_or_else(|| config.site.start_url());
    match resolver.classify_address(&start) {
        LinkTarget::Blocked(url) => {
            log::info!("`{url}` is on the ignore list; not opening it");
            return ExitCode::SUCCESS;
        }
        LinkTarget::External(url) => {
            log::info!("`{url}` is not on {}; not opening it", resolver.origin());
            return ExitCode::SUCCESS;
        }
        LinkTarget::Ignore | LinkTarget::Anchor(_) => {
            log::error!("nothing to open for `{start}`");
            return ExitCode::FAILURE;
        }
        LinkTarget::Internal { .. } => {}
    }

    let app = match ShellApp::new(&config, Some(&start)) {
        Ok(app) => app,
        Err(err) => {
            log::error!("{err}");
            return ExitCode::FAILURE;
        }
    };

    let opts = PlatformOptions {
        net: NetOptions {
            timeout: Duration::from_secs(config.net.timeout_secs),
            user_agent: config.net.user_agent.clone(),
            max_body_bytes: config.net.max_body_bytes,
        },
        extract: ExtractOptions {
            content_id: config.extract.content_id.clone(),
            title_class: config.extract.title_class.clone(),
            strip_class: config.extract.strip_class.clone(),
        },
    };

    match platform::run(app, opts) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            log::error!("{err}");
            ExitCode::FAILURE
        }
    }
}
