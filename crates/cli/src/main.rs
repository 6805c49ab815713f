use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing::Level;
use tracing_subscriber::fmt::SubscriberBuilder;

mod commands;
mod io;
mod provenance;

use commands::{parse_point, GamutArgs};

#[derive(Parser)]
#[command(name = "gamut")]
#[command(about = "Build colour gamuts and map points against them")]
struct Cmd {
    /// Colour space label of all tables
    #[arg(long, global = true, default_value = "srgb")]
    space: String,

    /// Log at debug level
    #[arg(long, short, global = true)]
    verbose: bool,

    #[command(subcommand)]
    action: Action,
}

#[derive(Subcommand)]
enum Action {
    /// Build the hull and report vertices, facets and centre as JSON
    Hull {
        #[command(flatten)]
        gamut: GamutArgs,
        /// Write the report here instead of stdout
        #[arg(long)]
        out: Option<PathBuf>,
    },
    /// Mark which query points lie inside the gamut
    Inside {
        #[command(flatten)]
        gamut: GamutArgs,
        #[arg(long)]
        query: PathBuf,
        #[arg(long)]
        out: PathBuf,
        /// Half-space test instead of the winding number (plain hulls only)
        #[arg(long)]
        convex: bool,
    },
    /// Move points to the surface along the line from a centre
    Project {
        #[command(flatten)]
        gamut: GamutArgs,
        #[arg(long)]
        query: PathBuf,
        #[arg(long)]
        out: PathBuf,
        /// Projection centre as x,y,z (default: the hull centre)
        #[arg(long, value_parser = parse_point)]
        centre: Option<[f64; 3]>,
    },
    /// Move points to the nearest surface point
    Clip {
        #[command(flatten)]
        gamut: GamutArgs,
        #[arg(long)]
        query: PathBuf,
        #[arg(long)]
        out: PathBuf,
        /// Leave points inside the gamut untouched
        #[arg(long)]
        only_outside: bool,
    },
    /// Rescale one axis of the query onto the gamut's extent
    Compress {
        #[command(flatten)]
        gamut: GamutArgs,
        #[arg(long)]
        query: PathBuf,
        #[arg(long)]
        axis: usize,
        #[arg(long)]
        out: PathBuf,
    },
    /// Print a small provenance JSON block
    Report,
}

fn main() -> Result<()> {
    let cmd = Cmd::parse();
    let level = if cmd.verbose {
        Level::DEBUG
    } else {
        Level::INFO
    };
    SubscriberBuilder::default()
        .with_target(false)
        .with_max_level(level)
        .init();

    let space = cmd.space.as_str();
    match cmd.action {
        Action::Hull { gamut, out } => commands::hull(&gamut, out.as_deref(), space).map(|_| ()),
        Action::Inside {
            gamut,
            query,
            out,
            convex,
        } => commands::inside(&gamut, &query, &out, convex, space).map(|_| ()),
        Action::Project {
            gamut,
            query,
            out,
            centre,
        } => commands::project(&gamut, &query, &out, centre, space),
        Action::Clip {
            gamut,
            query,
            out,
            only_outside,
        } => commands::clip(&gamut, &query, &out, only_outside, space),
        Action::Compress {
            gamut,
            query,
            axis,
            out,
        } => commands::compress(&gamut, &query, axis, &out, space),
        Action::Report => report(space),
    }
}

fn report(space: &str) -> Result<()> {
    let obj = serde_json::json!({
        "code_rev": provenance::current_git_rev(),
        "gamut_version": gamut::VERSION,
        "space": space,
        "params": {},
        "outputs": []
    });
    println!("{}", serde_json::to_string_pretty(&obj)?);
    Ok(())
}
