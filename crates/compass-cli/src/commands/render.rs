use std::path::PathBuf;

use chrono::{DateTime, Utc};
use clap::Args;

use compass_core::render::{dial_svg, postcard_svg};

use super::open_compass;

#[derive(Args)]
pub struct RenderArgs {
    /// Render the shareable postcard instead of the bare dial
    #[arg(long)]
    postcard: bool,
    /// Write the SVG here instead of stdout
    #[arg(long)]
    out: Option<PathBuf>,
}

pub fn run(now: DateTime<Utc>, args: RenderArgs) -> Result<(), Box<dyn std::error::Error>> {
    let compass = open_compass()?;
    let view = compass.view(now)?;
    let svg = if args.postcard {
        postcard_svg(&view)
    } else {
        dial_svg(&view)
    };

    match args.out {
        Some(path) => {
            std::fs::write(&path, svg)?;
            tracing::info!(path = %path.display(), "svg written");
            println!("{}", path.display());
        }
        None => print!("{svg}"),
    }
    Ok(())
}
