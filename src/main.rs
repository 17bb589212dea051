use chrono::NaiveDate;
use clap::error::ErrorKind;
use clap::{CommandFactory, Parser, Subcommand};
use post_stager::abbrlink::Abbrlink;
use post_stager::config::{self, ConfigError, StagerConfig};
use post_stager::fs::RealFs;
use post_stager::layout::SiteLayout;
use post_stager::prompt::{AssumeYes, Confirm, TerminalConfirm};
use post_stager::{check, cleanup, output, stage};
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "post-stager")]
#[command(about = "Stage Markdown drafts into a static blog")]
#[command(long_about = "\
Stage Markdown drafts into a static blog

A draft gets an abbrlink (a short content-derived identifier), a front matter
header, normalized inline markup, and its local images copied into a per-post
image directory with the references rewritten to public URLs.

Blog layout (relative to --root, configurable in stager.toml):

  stager.toml                       # optional, see 'post-stager gen-config'
  src/content/posts/                # staged posts
  │   └── 2024/05/my-post.md
  src/assets/images/posts/          # one directory per abbrlink
      └── 1a2b3c4d/
          └── 1a2b3c4d-9f86d081.png # <abbrlink>-<digest of original name>

Markup normalized on first staging:
  ==mark==  !!!kbd!!!  ~~strike~~  ^sup^  ~sub~  ++ins++")]
#[command(version)]
struct Cli {
    /// Blog root directory
    #[arg(long, default_value = ".", global = true)]
    root: PathBuf,

    /// Log per-document detail
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Stage a draft: front matter, markup, images, placement
    Add(AddArgs),
    /// Change a staged post's abbrlink and move its images along
    Update(UpdateArgs),
    /// Find image links under the wrong abbrlink and stale updated dates
    Check(CheckArgs),
    /// Delete images no post references
    Cleanup(CleanupArgs),
    /// Print a stock stager.toml with all options documented
    GenConfig,
}

#[derive(clap::Args)]
struct AddArgs {
    /// Draft to stage
    #[arg(value_name = "SOURCE")]
    source_pos: Option<PathBuf>,
    /// Destination under the posts directory [default: YYYY/MM]
    #[arg(value_name = "DIR")]
    dir_pos: Option<PathBuf>,
    /// Comma-separated tags
    #[arg(value_name = "TAGS")]
    tags_pos: Option<String>,

    #[arg(short, long, visible_alias = "file")]
    source: Option<PathBuf>,
    #[arg(short, long)]
    dir: Option<PathBuf>,
    #[arg(short, long, value_delimiter = ',')]
    tags: Vec<String>,
    #[arg(long)]
    title: Option<String>,
    /// Publication date, YYYY-MM-DD [default: file creation date]
    #[arg(long, visible_alias = "date")]
    published: Option<NaiveDate>,
    #[arg(long)]
    toc: Option<bool>,
    #[arg(long)]
    lang: Option<String>,
    #[arg(short, long, visible_alias = "link")]
    abbrlink: Option<Abbrlink>,
    /// Abbrlink the image links currently use
    #[arg(short, long = "old-abbrlink", visible_alias = "old")]
    old_abbrlink: Option<String>,
    /// Move image links and files to the new abbrlink
    #[arg(long)]
    update_image_links: bool,
    /// Leave ==mark==, ~sub~ and friends as written
    #[arg(long)]
    skip_formatting: bool,
}

#[derive(clap::Args)]
struct UpdateArgs {
    #[arg(value_name = "SOURCE")]
    source_pos: Option<PathBuf>,
    #[arg(short, long)]
    source: Option<PathBuf>,
    #[arg(short, long, visible_alias = "link")]
    abbrlink: Option<Abbrlink>,
    #[arg(short, long = "old-abbrlink", visible_alias = "old")]
    old_abbrlink: Option<String>,
    /// Write to this directory under the posts directory instead of in place
    #[arg(short, long)]
    dir: Option<PathBuf>,
}

#[derive(clap::Args)]
struct CheckArgs {
    /// Check one post instead of the whole posts directory
    #[arg(value_name = "SOURCE")]
    source_pos: Option<PathBuf>,
    #[arg(short, long)]
    source: Option<PathBuf>,
    /// Fix everything without asking
    #[arg(short, long)]
    force: bool,
}

#[derive(clap::Args)]
struct CleanupArgs {
    /// Delete without asking
    #[arg(short, long)]
    force: bool,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let fs = RealFs;

    match cli.command {
        Command::Add(args) => {
            let (stager_config, layout) = load_layout(&cli.root)?;
            let source = required_source(args.source.or(args.source_pos));
            let mut tags = args.tags;
            if tags.is_empty()
                && let Some(positional) = &args.tags_pos
            {
                tags = positional.split(',').map(|t| t.trim().to_string()).collect();
            }
            let opts = stage::AddOptions {
                source,
                subdir: args.dir.or(args.dir_pos),
                tags,
                title: args.title,
                published: args.published,
                toc: args.toc,
                lang: args.lang,
                update_image_links: args.update_image_links
                    || (args.old_abbrlink.is_some() && args.abbrlink.is_some()),
                abbrlink: args.abbrlink,
                old_abbrlink: args.old_abbrlink,
                skip_formatting: args.skip_formatting,
            };
            let report = stage::add(&fs, &layout, &stager_config.defaults, &opts)?;
            output::print_stage_report(&report, &cli.root);
        }
        Command::Update(args) => {
            let (_, layout) = load_layout(&cli.root)?;
            let opts = stage::UpdateOptions {
                source: required_source(args.source.or(args.source_pos)),
                abbrlink: args.abbrlink,
                old_abbrlink: args.old_abbrlink,
                subdir: args.dir,
            };
            let report = stage::update(&fs, &layout, &opts)?;
            output::print_stage_report(&report, &cli.root);
        }
        Command::Check(args) => {
            let (_, layout) = load_layout(&cli.root)?;
            let target = args.source.or(args.source_pos);
            let mut confirm = confirmer(args.force);
            let report = check::check(&fs, &layout, target.as_deref(), confirm.as_mut())?;
            output::print_check_report(&report, &cli.root);
        }
        Command::Cleanup(args) => {
            let (_, layout) = load_layout(&cli.root)?;
            let plan = cleanup::plan(&fs, &layout)?;
            if args.force {
                output::print_cleanup_summary(&plan);
            } else {
                output::print_cleanup_plan(&plan, &cli.root);
            }
            if !plan.unreferenced.is_empty() {
                let mut confirm = confirmer(args.force);
                let report = cleanup::apply(&fs, &layout, &plan, confirm.as_mut());
                output::print_cleanup_report(&report, &cli.root);
            }
        }
        Command::GenConfig => {
            print!("{}", config::stock_config_toml());
        }
    }

    Ok(())
}

/// Config from `<root>/stager.toml` and the layout it describes.
fn load_layout(root: &Path) -> Result<(StagerConfig, SiteLayout), ConfigError> {
    let config = config::load_config(root)?;
    let layout = SiteLayout::new(root, &config);
    Ok((config, layout))
}

/// Log to stderr, filtered by `RUST_LOG` when set.
fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("post_stager={default_level}")));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .without_time()
        .init();
}

/// Exit with a usage error when no source was given.
fn required_source(source: Option<PathBuf>) -> PathBuf {
    match source {
        Some(path) => path,
        None => Cli::command()
            .error(
                ErrorKind::MissingRequiredArgument,
                "a source file is required (SOURCE or --source)",
            )
            .exit(),
    }
}

fn confirmer(force: bool) -> Box<dyn Confirm> {
    if force {
        Box::new(AssumeYes)
    } else {
        Box::new(TerminalConfirm)
    }
}
