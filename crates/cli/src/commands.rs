//! Subcommand bodies. Each reads its tables, runs one gamut query, writes the
//! result and a provenance sidecar.

use anyhow::{Context, Result};
use clap::Args;
use gamut::{Gamut, HullCfg, InclusionMethod, Point3, PointBatch, Space};
use serde::Serialize;
use serde_json::json;
use std::path::{Path, PathBuf};

use crate::io::{read_points, write_mask, write_points};
use crate::provenance::Provenance;

/// Parse `x,y,z`.
pub fn parse_point(s: &str) -> std::result::Result<[f64; 3], String> {
    let parts: Vec<&str> = s.split(',').map(str::trim).collect();
    let [x, y, z] = parts[..] else {
        return Err(format!("expected x,y,z, got {s:?}"));
    };
    let num = |v: &str| v.parse::<f64>().map_err(|e| format!("{v:?}: {e}"));
    Ok([num(x)?, num(y)?, num(z)?])
}

fn to_point(p: [f64; 3]) -> Point3 {
    Point3::new(p[0], p[1], p[2])
}

/// Where the gamut comes from and how its hull is built.
#[derive(Args, Clone, Debug)]
pub struct GamutArgs {
    /// Table of gamut points (x,y,z columns)
    #[arg(long)]
    pub gamut: PathBuf,
    /// Radial exponent of the modified hull; 1 builds the plain convex hull
    #[arg(long, default_value_t = 1.0)]
    pub gamma: f64,
    /// Expansion centre of the hull as x,y,z
    #[arg(long, value_parser = parse_point)]
    pub hull_centre: Option<[f64; 3]>,
}

impl GamutArgs {
    pub fn build(&self, space: &str) -> Result<Gamut> {
        let points = read_points(&self.gamut)?;
        let cfg = HullCfg {
            gamma: self.gamma,
            centre: self.hull_centre.map(to_point),
        };
        Gamut::construct(Space::new(space), PointBatch::from_points(points), cfg)
            .with_context(|| format!("building gamut from {}", self.gamut.display()))
    }

    fn params(&self) -> serde_json::Value {
        json!({
            "gamut": self.gamut,
            "gamma": self.gamma,
            "hull_centre": self.hull_centre,
        })
    }
}

/// JSON summary of a constructed hull.
#[derive(Serialize, Debug)]
pub struct HullReport {
    pub space: String,
    pub gamma: f64,
    pub centre: [f64; 3],
    pub points: usize,
    pub vertices: Vec<usize>,
    pub facets: Vec<[usize; 3]>,
    pub neighbors: Vec<[usize; 3]>,
}

impl HullReport {
    pub fn from_gamut(g: &Gamut) -> Self {
        let c = g.centre();
        Self {
            space: g.space().to_string(),
            gamma: g.hull().gamma(),
            centre: [c.x, c.y, c.z],
            points: g.points().len(),
            vertices: g.vertices().to_vec(),
            facets: g.facets().to_vec(),
            neighbors: g.neighbors().to_vec(),
        }
    }
}

pub fn hull(gamut: &GamutArgs, out: Option<&Path>, space: &str) -> Result<HullReport> {
    let g = gamut.build(space)?;
    let report = HullReport::from_gamut(&g);
    tracing::info!(
        vertices = report.vertices.len(),
        facets = report.facets.len(),
        "hull"
    );
    let text = serde_json::to_string_pretty(&report)?;
    match out {
        Some(path) => {
            if let Some(parent) = path.parent() {
                if !parent.as_os_str().is_empty() {
                    std::fs::create_dir_all(parent)?;
                }
            }
            std::fs::write(path, text).with_context(|| format!("writing {}", path.display()))?;
            Provenance::new(gamut.params())
                .inputs(&[&gamut.gamut])
                .write_next_to(path)?;
        }
        None => println!("{text}"),
    }
    Ok(report)
}

fn query_batch(query: &Path) -> Result<PointBatch> {
    Ok(PointBatch::from_points(read_points(query)?))
}

pub fn inside(
    gamut: &GamutArgs,
    query: &Path,
    out: &Path,
    convex: bool,
    space: &str,
) -> Result<usize> {
    let g = gamut.build(space)?;
    let q = query_batch(query)?;
    let method = if convex {
        InclusionMethod::Convex
    } else {
        InclusionMethod::Winding
    };
    let mask = g.is_inside(&q, method)?;
    tracing::info!(queries = q.len(), inside = mask.count(), ?method, "inside");
    write_mask(out, q.points(), mask.values())?;
    let mut params = gamut.params();
    params["method"] = json!(format!("{method:?}").to_lowercase());
    Provenance::new(params)
        .inputs(&[gamut.gamut.as_path(), query])
        .write_next_to(out)?;
    Ok(mask.count())
}

pub fn project(
    gamut: &GamutArgs,
    query: &Path,
    out: &Path,
    centre: Option<[f64; 3]>,
    space: &str,
) -> Result<()> {
    let g = gamut.build(space)?;
    let q = query_batch(query)?;
    let mapped = g.nearest_on_line(&q, centre.map(to_point))?;
    tracing::info!(queries = q.len(), "project");
    write_points(out, mapped.points())?;
    let mut params = gamut.params();
    params["centre"] = json!(centre);
    Provenance::new(params)
        .inputs(&[gamut.gamut.as_path(), query])
        .write_next_to(out)?;
    Ok(())
}

pub fn clip(
    gamut: &GamutArgs,
    query: &Path,
    out: &Path,
    only_outside: bool,
    space: &str,
) -> Result<()> {
    let g = gamut.build(space)?;
    let q = query_batch(query)?;
    let mapped = if only_outside {
        g.clip_out_of_gamut(&q)?
    } else {
        g.clip_nearest(&q)?
    };
    tracing::info!(queries = q.len(), only_outside, "clip");
    write_points(out, mapped.points())?;
    let mut params = gamut.params();
    params["only_outside"] = json!(only_outside);
    Provenance::new(params)
        .inputs(&[gamut.gamut.as_path(), query])
        .write_next_to(out)?;
    Ok(())
}

pub fn compress(
    gamut: &GamutArgs,
    query: &Path,
    axis: usize,
    out: &Path,
    space: &str,
) -> Result<()> {
    let g = gamut.build(space)?;
    let q = query_batch(query)?;
    let mapped = g.compress_axis(&q, axis)?;
    tracing::info!(queries = q.len(), axis, "compress");
    write_points(out, mapped.points())?;
    let mut params = gamut.params();
    params["axis"] = json!(axis);
    Provenance::new(params)
        .inputs(&[gamut.gamut.as_path(), query])
        .write_next_to(out)?;
    Ok(())
}
