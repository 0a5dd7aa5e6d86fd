//! File input and output helpers for rings, terrain samples and results.

use std::fs::File;
use std::io::{self, BufRead, BufReader, Read, Write};

use geojson::{GeoJson, Value};

use crate::geometry::{Point, Point3};
use crate::local_grid::LngLat;
use crate::measure::Measurement;
use crate::terrain::TinTerrain;

/// Reads a file to string.
pub fn read_to_string(path: &str) -> io::Result<String> {
    let mut buffer = String::new();
    File::open(path)?.read_to_string(&mut buffer)?;
    Ok(buffer)
}

/// Reads all lines of a file.
pub fn read_lines(path: &str) -> io::Result<Vec<String>> {
    BufReader::new(File::open(path)?).lines().collect()
}

/// Writes `contents` to a file, replacing it.
pub fn write_string(path: &str, contents: &str) -> io::Result<()> {
    File::create(path)?.write_all(contents.as_bytes())
}

/// Parses the first `n` comma-separated numbers of every non-empty line.
///
/// Lines starting with `#` are comments. Errors carry the 1-based line
/// number.
fn read_csv_rows(path: &str, n: usize) -> io::Result<Vec<Vec<f64>>> {
    let lines = read_lines(path)?;
    let mut rows = Vec::new();
    for (idx, line) in lines.iter().enumerate() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let parts: Vec<&str> = line.split(',').collect();
        if parts.len() < n {
            return Err(io::Error::new(
                io::ErrorKind::InvalidData,
                format!("line {}: expected {} comma-separated values", idx + 1, n),
            ));
        }
        let row = parts[..n]
            .iter()
            .map(|v| {
                v.trim().parse::<f64>().map_err(|e| {
                    io::Error::new(
                        io::ErrorKind::InvalidData,
                        format!("line {}: {}", idx + 1, e),
                    )
                })
            })
            .collect::<io::Result<Vec<f64>>>()?;
        rows.push(row);
    }
    Ok(rows)
}

/// Reads a boundary ring of `lng,lat` pairs in degrees.
pub fn read_ring_csv(path: &str) -> io::Result<Vec<LngLat>> {
    Ok(read_csv_rows(path, 2)?
        .into_iter()
        .map(|r| LngLat::from_degrees(r[0], r[1]))
        .collect())
}

/// Reads plain `x,y` points.
pub fn read_points_csv(path: &str) -> io::Result<Vec<Point>> {
    Ok(read_csv_rows(path, 2)?
        .into_iter()
        .map(|r| Point::new(r[0], r[1]))
        .collect())
}

/// Reads plain `x,y,z` points.
pub fn read_points3_csv(path: &str) -> io::Result<Vec<Point3>> {
    Ok(read_csv_rows(path, 3)?
        .into_iter()
        .map(|r| Point3::new(r[0], r[1], r[2]))
        .collect())
}

/// Reads `lng,lat,height` samples, angles in degrees, into a TIN.
pub fn read_terrain_csv(path: &str) -> io::Result<TinTerrain> {
    let samples: Vec<Point3> = read_csv_rows(path, 3)?
        .into_iter()
        .map(|r| Point3::new(r[0].to_radians(), r[1].to_radians(), r[2]))
        .collect();
    if samples.is_empty() {
        return Err(io::Error::new(
            io::ErrorKind::InvalidData,
            "terrain file holds no samples",
        ));
    }
    Ok(TinTerrain::from_samples(samples))
}

fn to_lng_lat(position: &[f64]) -> io::Result<LngLat> {
    match position {
        [lng, lat, ..] => Ok(LngLat::from_degrees(*lng, *lat)),
        _ => Err(io::Error::new(
            io::ErrorKind::InvalidData,
            "position needs longitude and latitude",
        )),
    }
}

fn ring_positions(value: &Value) -> Option<&Vec<Vec<f64>>> {
    match value {
        Value::Polygon(rings) => rings.first(),
        Value::MultiPolygon(polygons) => polygons.first().and_then(|p| p.first()),
        Value::LineString(line) => Some(line),
        _ => None,
    }
}

/// Reads a boundary ring from GeoJSON.
///
/// Uses the exterior ring of the first polygon or the first line string.
/// Without either, the Point features in document order form the ring. A
/// closing position equal to the first is dropped.
pub fn read_ring_geojson(path: &str) -> io::Result<Vec<LngLat>> {
    let data = read_to_string(path)?;
    let geojson: GeoJson = data
        .parse()
        .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
    let values: Vec<Value> = match geojson {
        GeoJson::Geometry(g) => vec![g.value],
        GeoJson::Feature(f) => f.geometry.into_iter().map(|g| g.value).collect(),
        GeoJson::FeatureCollection(fc) => fc
            .features
            .into_iter()
            .filter_map(|f| f.geometry)
            .map(|g| g.value)
            .collect(),
    };

    let mut ring = match values.iter().find_map(ring_positions) {
        Some(positions) => positions
            .iter()
            .map(|p| to_lng_lat(p))
            .collect::<io::Result<Vec<_>>>()?,
        None => values
            .iter()
            .filter_map(|v| match v {
                Value::Point(p) => Some(to_lng_lat(p)),
                _ => None,
            })
            .collect::<io::Result<Vec<_>>>()?,
    };
    if ring.len() > 1 && ring.first() == ring.last() {
        ring.pop();
    }
    Ok(ring)
}

/// Writes a measurement as pretty-printed JSON.
pub fn write_measurement_json(path: &str, measurement: &Measurement) -> io::Result<()> {
    let json = serde_json::to_string_pretty(measurement)
        .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
    write_string(path, &json)
}
