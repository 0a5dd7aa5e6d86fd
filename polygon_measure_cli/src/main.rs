use std::fs::File;

use clap::{Parser, Subcommand};
use polygon_measure::{
    geometry::Point,
    io::{
        read_points3_csv, read_points_csv, read_ring_csv, read_ring_geojson, read_terrain_csv,
        write_measurement_json,
    },
    measure,
    mesh::recover_edges,
    plane::{centroid_frame, fit_plane},
    profile::{elevation_profile, DEFAULT_PROFILE_SAMPLES},
    Diagram, FlatTerrain, HeightField, LngLat, MeasureConfig, MeasureStatus, TinTerrain,
};

#[derive(Parser)]
#[command(name = "polygon_measure_cli", version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Measure area and cut/fill volume inside a lng,lat ring (CSV or GeoJSON).
    Measure {
        ring: String,
        /// Sphere radius in metres.
        #[arg(long, default_value_t = 6_371_000.0)]
        radius: f64,
        /// CSV of lng,lat,height terrain samples.
        #[arg(long)]
        terrain: Option<String>,
        /// JSON file with measurement settings.
        #[arg(long)]
        config: Option<String>,
        /// Write the full measurement as JSON.
        #[arg(long)]
        output: Option<String>,
    },
    /// Terrain profile along a lng,lat path (CSV or GeoJSON).
    Profile {
        path: String,
        /// Sphere radius in metres.
        #[arg(long, default_value_t = 6_371_000.0)]
        radius: f64,
        /// CSV of lng,lat,height terrain samples.
        #[arg(long)]
        terrain: Option<String>,
        /// Samples per path segment.
        #[arg(long, default_value_t = DEFAULT_PROFILE_SAMPLES)]
        samples: usize,
    },
    /// Delaunay triangulation of a CSV file of x,y points.
    Triangulate { path: String },
    /// Recover the boundary edges of a ring of x,y points.
    Recover {
        path: String,
        #[arg(long, default_value_t = 5)]
        attempts: usize,
    },
    /// Least-squares plane through a CSV file of x,y,z points.
    Plane { path: String },
    /// Write the default measurement settings to a JSON file.
    InitConfig { path: String },
}

fn init_logging() {
    if let Ok(path) = std::env::var("POLYGON_MEASURE_LOG") {
        match File::create(&path) {
            Ok(file) => {
                env_logger::Builder::from_default_env()
                    .target(env_logger::Target::Pipe(Box::new(file)))
                    .init();
            }
            Err(e) => {
                eprintln!("Failed to create log file {}: {}", path, e);
                env_logger::Builder::from_default_env().init();
            }
        }
    } else {
        env_logger::Builder::from_default_env().init();
    }
}

fn read_ring(path: &str) -> std::io::Result<Vec<LngLat>> {
    let lower = path.to_ascii_lowercase();
    if lower.ends_with(".geojson") || lower.ends_with(".json") {
        read_ring_geojson(path)
    } else {
        read_ring_csv(path)
    }
}

fn read_terrain(path: Option<&str>) -> Result<Option<TinTerrain>, ()> {
    match path {
        Some(path) => match read_terrain_csv(path) {
            Ok(tin) => Ok(Some(tin)),
            Err(e) => {
                eprintln!("Error reading {}: {}", path, e);
                Err(())
            }
        },
        None => Ok(None),
    }
}

fn run_profile(path: &str, radius: f64, terrain_path: Option<&str>, samples: usize) {
    let line = match read_ring(path) {
        Ok(line) => line,
        Err(e) => {
            eprintln!("Error reading {}: {}", path, e);
            return;
        }
    };
    let tin = match read_terrain(terrain_path) {
        Ok(tin) => tin,
        Err(()) => return,
    };
    let terrain: &dyn HeightField = match &tin {
        Some(tin) => tin,
        None => &FlatTerrain,
    };
    let profile = elevation_profile(&line, radius, terrain, samples);
    println!("Samples: {}", profile.len());
    if let Some(last) = profile.last() {
        println!("Length: {:.3}", last.distance);
    }
    for sample in &profile {
        println!("{:.3},{:.3}", sample.distance, sample.height);
    }
}

fn run_measure(
    ring_path: &str,
    radius: f64,
    terrain_path: Option<&str>,
    config_path: Option<&str>,
    output: Option<&str>,
) {
    let ring = match read_ring(ring_path) {
        Ok(ring) => ring,
        Err(e) => {
            eprintln!("Error reading {}: {}", ring_path, e);
            return;
        }
    };
    log::debug!("read {} ring vertices from {}", ring.len(), ring_path);
    let config = match config_path {
        Some(path) => match MeasureConfig::load(path) {
            Ok(config) => config,
            Err(e) => {
                eprintln!("Error reading {}: {}", path, e);
                return;
            }
        },
        None => MeasureConfig::default(),
    };
    let tin = match read_terrain(terrain_path) {
        Ok(tin) => tin,
        Err(()) => return,
    };
    let terrain: &dyn HeightField = match &tin {
        Some(tin) => tin,
        None => &FlatTerrain,
    };

    let m = measure(&ring, radius, terrain, &config);
    println!("Area: {:.3}", m.area);
    // terrain above the reference plane is cut, terrain below it is fill
    println!("Cut volume: {:.3}", m.positive_volume);
    println!("Fill volume: {:.3}", m.negative_volume.abs());
    if let Some(bbox) = m.bounding_box {
        println!(
            "Bounding box: {:.6},{:.6} to {:.6},{:.6}",
            bbox.min().x.to_degrees(),
            bbox.min().y.to_degrees(),
            bbox.max().x.to_degrees(),
            bbox.max().y.to_degrees()
        );
    }
    if let Some((dip, strike)) = m.dip_and_strike() {
        println!("Dip: {:.3}", dip);
        println!("Strike: {:.3}", strike);
    }
    println!("Triangles: {}", m.triangles.len());
    println!("Points: {} after {} pass(es)", m.point_count, m.attempts);
    match m.status {
        MeasureStatus::Complete => println!("Status: complete"),
        MeasureStatus::Approximate { missing_edges } => {
            println!("Status: approximate ({} boundary edges missing)", missing_edges)
        }
        MeasureStatus::Degenerate(reason) => println!("Status: degenerate ({:?})", reason),
    }
    if let Some(path) = output {
        match write_measurement_json(path, &m) {
            Ok(()) => println!("Wrote {}", path),
            Err(e) => eprintln!("Error writing {}: {}", path, e),
        }
    }
}

fn main() {
    init_logging();
    let cli = Cli::parse();
    match cli.command {
        Commands::Measure {
            ring,
            radius,
            terrain,
            config,
            output,
        } => run_measure(
            &ring,
            radius,
            terrain.as_deref(),
            config.as_deref(),
            output.as_deref(),
        ),
        Commands::Profile {
            path,
            radius,
            terrain,
            samples,
        } => run_profile(&path, radius, terrain.as_deref(), samples),
        Commands::Triangulate { path } => match read_points_csv(&path) {
            Ok(pts) => {
                let diagram = Diagram::from_points(&pts);
                println!("Triangles: {}", diagram.triangles.len());
                println!("Edges: {}", diagram.edges.len());
                for tri in &diagram.triangles {
                    let [a, b, c] = tri.sites;
                    println!("{} {} {}", a.addr, b.addr, c.addr);
                }
            }
            Err(e) => eprintln!("Error reading {}: {}", path, e),
        },
        Commands::Recover { path, attempts } => match read_points_csv(&path) {
            Ok(pts) => {
                let config = MeasureConfig {
                    recovery_attempts: attempts,
                    ..MeasureConfig::default()
                };
                let rec = recover_edges(&pts, &config);
                println!("Boundary points: {}", rec.ring.len());
                println!("Attempts: {}", rec.attempts);
                println!("Missing edges: {}", rec.missing.len());
                for site in &rec.ring {
                    let p: Point = site.point();
                    println!("{},{}", p.x, p.y);
                }
            }
            Err(e) => eprintln!("Error reading {}: {}", path, e),
        },
        Commands::Plane { path } => match read_points3_csv(&path) {
            Ok(pts) => match fit_plane(&pts) {
                Some(plane) => {
                    let n = plane.normal;
                    println!("Normal: ({:.6}, {:.6}, {:.6})", n.x, n.y, n.z);
                    println!("Offset: {:.3}", plane.offset);
                    if let Some(frame) = centroid_frame(&pts) {
                        let (dip, strike) = plane.dip_and_strike(&frame);
                        println!("Dip: {:.3}", dip);
                        println!("Strike: {:.3}", strike);
                    }
                }
                None => eprintln!("Points in {} do not define a unique plane", path),
            },
            Err(e) => eprintln!("Error reading {}: {}", path, e),
        },
        Commands::InitConfig { path } => match MeasureConfig::default().save(&path) {
            Ok(()) => println!("Wrote {}", path),
            Err(e) => eprintln!("Error writing {}: {}", path, e),
        },
    }
}
