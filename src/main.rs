use anyhow::{Context, Result};
use arch_navigator::export::{ExportFormat, render_html, render_svg};
use arch_navigator::{ArchitectureNavigator, InputConfig, NavigatorOptions, ResNetDepth};
use clap::Parser;
use std::path::PathBuf;

#[derive(Parser)]
#[command(author, version, about = "Render a drill-down view of a ResNet", long_about = None)]
struct Cli {
    /// JSON navigator options
    #[arg(long)]
    config: Option<PathBuf>,

    /// Network depth (resnet50, resnet101, resnet152)
    #[arg(long)]
    depth: Option<ResNetDepth>,

    /// Batch size N
    #[arg(long)]
    batch: Option<u64>,

    /// Input channels C
    #[arg(long)]
    channels: Option<u64>,

    /// Input height H
    #[arg(long)]
    height: Option<u64>,

    /// Input width W
    #[arg(long)]
    width: Option<u64>,

    /// Node to click, in order. Repeat to drill further down,
    /// e.g. --click Backbone --click "Stage 2"
    #[arg(long = "click", value_name = "LABEL")]
    clicks: Vec<String>,

    /// Output format (svg, html, json)
    #[arg(long, default_value = "svg")]
    format: ExportFormat,

    /// Write to this file instead of stdout
    #[arg(short, long)]
    output: Option<PathBuf>,
}

impl Cli {
    fn options(&self) -> Result<NavigatorOptions> {
        let mut options = match &self.config {
            Some(path) => NavigatorOptions::load(path)
                .with_context(|| format!("Loading {}", path.display()))?,
            None => NavigatorOptions::default(),
        };
        if let Some(depth) = self.depth {
            options.depth = depth;
        }
        let base = options.input;
        options.input = InputConfig::new(
            self.batch.unwrap_or(base.n()),
            self.channels.unwrap_or(base.c()),
            self.height.unwrap_or(base.h()),
            self.width.unwrap_or(base.w()),
        )?;
        Ok(options)
    }
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    let mut navigator = ArchitectureNavigator::new(cli.options()?)?;
    navigator.navigate_labels(&cli.clicks)?;
    log::info!("Rendering {} as {}", navigator.breadcrumb(), cli.format);

    let rendered = match cli.format {
        ExportFormat::Svg => render_svg(navigator.scene(), navigator.camera(), navigator.surface()),
        ExportFormat::Html => render_html(&navigator),
        ExportFormat::Json => serde_json::to_string_pretty(&navigator.snapshot())?,
    };

    match &cli.output {
        Some(path) => std::fs::write(path, rendered)
            .with_context(|| format!("Writing {}", path.display()))?,
        None => println!("{rendered}"),
    }
    Ok(())
}
