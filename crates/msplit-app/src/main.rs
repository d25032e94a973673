// ABOUTME: Command-line driver for the multisplit pane engine.
// ABOUTME: Builds, shows, and validates layouts against a headless host and prints the geometry.

mod trace_host;

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use msplit_bridge::MultiSplit;
use msplit_core::{Config, Rect, WidgetId};
use msplit_layout::{
    LayoutDocument, LayoutGeometry, NavDirection, SerializationError, WherePosition,
};
use trace_host::{LabelProvider, TraceHost};

/// multisplit - recursive split-pane layout engine
#[derive(Parser, Debug)]
#[command(name = "msplit")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Config file path
    #[arg(short = 'c', long, global = true)]
    config: Option<PathBuf>,

    /// Enable debug logging
    #[arg(long, global = true)]
    debug: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Build a sample layout and print its geometry
    Demo {
        #[arg(long)]
        width: Option<u32>,
        #[arg(long)]
        height: Option<u32>,
        /// Also write the resulting layout to this file
        #[arg(long)]
        save: Option<PathBuf>,
    },
    /// Load a saved layout and print its geometry
    Show {
        layout: PathBuf,
        #[arg(long)]
        width: Option<u32>,
        #[arg(long)]
        height: Option<u32>,
    },
    /// Check a saved layout for structural problems
    Validate { layout: PathBuf },
}

fn load_config(path: Option<&Path>) -> Result<Config> {
    match path {
        Some(path) => Config::load(path).with_context(|| format!("loading config {:?}", path)),
        None => Ok(Config::load_or_default()),
    }
}

fn viewport(config: &Config, width: Option<u32>, height: Option<u32>) -> Rect {
    Rect::new(
        0,
        0,
        width.unwrap_or(config.viewport_width) as i32,
        height.unwrap_or(config.viewport_height) as i32,
    )
}

fn print_geometry(geometry: &LayoutGeometry, host: &TraceHost) {
    let v = geometry.viewport;
    println!("viewport {}x{}", v.width, v.height);
    for (pane_id, rect) in &geometry.panes {
        println!(
            "  pane    {:<36} x={:<5} y={:<5} w={:<5} h={:<5}",
            pane_id.as_str(), rect.x, rect.y, rect.width, rect.height
        );
    }
    for divider in geometry.all_dividers() {
        let r = divider.rect;
        println!(
            "  divider {:<34}{:>2} x={:<5} y={:<5} w={:<5} h={:<5}",
            divider.node_id.as_str(), divider.index, r.x, r.y, r.width, r.height
        );
    }
    for violation in &geometry.violations {
        println!("  violation {:?}", violation);
    }
    for (surface, rect) in host.placed() {
        println!("  surface {:<36} {:?}", surface, rect);
    }
    if let Some(focus) = host.focus_indicator() {
        println!("  focus   {:?}", focus);
    }
}

fn demo(config: &Config, viewport: Rect, save: Option<&Path>) -> Result<()> {
    let mut ms = MultiSplit::new(config, TraceHost::default(), LabelProvider);
    ms.set_viewport(viewport);

    let editor = ms.initialize(WidgetId::from("editor"))?;
    let terminal = ms.split(&editor, WidgetId::from("terminal"), WherePosition::Right, 0.35)?;
    ms.split(&terminal, WidgetId::from("logs"), WherePosition::Bottom, 0.4)?;
    ms.navigate(NavDirection::Left)?;
    tracing::info!("Demo layout has {} panes", ms.pane_ids().len());

    print_geometry(&ms.geometry(), ms.host());
    if let Some(path) = save {
        ms.save_to_path(path)?;
        println!("saved to {:?}", path);
    }
    Ok(())
}

fn show(config: &Config, viewport: Rect, layout: &Path) -> Result<()> {
    let mut ms = MultiSplit::new(config, TraceHost::default(), LabelProvider);
    ms.set_viewport(viewport);
    ms.load_from_path(layout)
        .with_context(|| format!("loading layout {:?}", layout))?;
    print_geometry(&ms.geometry(), ms.host());
    Ok(())
}

fn validate(layout: &Path) -> Result<()> {
    let document = LayoutDocument::load(layout)
        .with_context(|| format!("reading layout {:?}", layout))?;
    let version = document.version.clone();
    let model = match document.into_model() {
        Ok(model) => model,
        Err(SerializationError::InvalidTree(errors)) => {
            for error in &errors {
                println!("error: {}", error);
            }
            anyhow::bail!("{} problems in {:?}", errors.len(), layout);
        }
        Err(e) => return Err(e.into()),
    };
    println!(
        "{:?}: ok (version {}, {} panes, depth {})",
        layout,
        version,
        model.pane_count(),
        model.depth()
    );
    Ok(())
}

fn main() -> Result<()> {
    let args = Args::parse();

    let log_level = if args.debug { "debug" } else { "info" };
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| {
                format!(
                    "msplit={0},msplit_layout={0},msplit_bridge={0}",
                    log_level
                )
            }),
        ))
        .init();

    let config = load_config(args.config.as_deref())?;

    match args.command {
        Command::Demo {
            width,
            height,
            save,
        } => demo(&config, viewport(&config, width, height), save.as_deref()),
        Command::Show {
            layout,
            width,
            height,
        } => show(&config, viewport(&config, width, height), &layout),
        Command::Validate { layout } => validate(&layout),
    }
}
