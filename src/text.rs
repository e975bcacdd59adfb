//! Plain-text exchange format with the assignment phase.
//!
//! One record per line, fields separated by whitespace:
//!
//! ```text
//! # assignment: <centroid id> <label or -> <v1,v2,...>
//! 3   17  0.5,1.25
//! # centroid:   <centroid id> <v1,v2,...>
//! 3   0.5,1.25
//! ```
//!
//! Blank lines and lines starting with `#` are skipped.

use std::io::{BufRead, Write};

use crate::error::{Error, Result};
use crate::point::{Centroid, ClusterId, DataPoint};
use crate::vector::Vector;

fn parse_error(line: usize, message: impl Into<String>) -> Error {
    Error::Parse {
        line,
        message: message.into(),
    }
}

fn parse_id(field: &str, line: usize) -> Result<ClusterId> {
    field
        .parse()
        .map_err(|_| parse_error(line, format!("invalid centroid id {:?}", field)))
}

fn parse_vector(field: &str, line: usize) -> Result<Vector> {
    field
        .split(',')
        .map(|v| {
            v.trim()
                .parse::<f32>()
                .map_err(|_| parse_error(line, format!("invalid number {:?}", v)))
        })
        .collect::<Result<Vec<f32>>>()
        .map(Vector::new)
}

fn format_vector(vector: &Vector) -> String {
    vector
        .as_slice()
        .iter()
        .map(f32::to_string)
        .collect::<Vec<_>>()
        .join(",")
}

/// Yield `(line number, fields)` for every record line.
fn records<R: BufRead>(reader: R) -> impl Iterator<Item = Result<(usize, Vec<String>)>> {
    reader
        .lines()
        .enumerate()
        .filter_map(|(i, line)| match line {
            Err(err) => Some(Err(Error::from(err))),
            Ok(line) => {
                let line = line.trim();
                if line.is_empty() || line.starts_with('#') {
                    None
                } else {
                    Some(Ok((
                        i + 1,
                        line.split_whitespace().map(str::to_string).collect::<Vec<_>>(),
                    )))
                }
            }
        })
}

/// Read `(centroid id, point)` pairs emitted by the assignment phase.
pub fn read_assignments<R: BufRead>(reader: R) -> Result<Vec<(ClusterId, DataPoint)>> {
    records(reader)
        .map(|record| {
            let (line, fields) = record?;
            let [id, label, vector] = fields.as_slice() else {
                return Err(parse_error(line, "expected <id> <label> <vector>"));
            };
            let id = parse_id(id, line)?;
            let vector = parse_vector(vector, line)?;
            let point = match label.as_str() {
                "-" => DataPoint::new(vector),
                label => DataPoint::with_label(
                    vector,
                    label
                        .parse()
                        .map_err(|_| parse_error(line, format!("invalid label {:?}", label)))?,
                ),
            };
            Ok((id, point))
        })
        .collect()
}

/// Read a centroid list.
pub fn read_centroids<R: BufRead>(reader: R) -> Result<Vec<Centroid>> {
    records(reader)
        .map(|record| {
            let (line, fields) = record?;
            let [id, vector] = fields.as_slice() else {
                return Err(parse_error(line, "expected <id> <vector>"));
            };
            Ok(Centroid::new(parse_id(id, line)?, parse_vector(vector, line)?))
        })
        .collect()
}

/// Write `(centroid, point)` pairs in the assignment format.
pub fn write_pairs<W: Write>(out: &mut W, pairs: &[(Centroid, DataPoint)]) -> Result<()> {
    for (centroid, point) in pairs {
        let label = point
            .label()
            .map_or_else(|| "-".to_string(), |l| l.to_string());
        writeln!(
            out,
            "{}\t{}\t{}",
            centroid.id(),
            label,
            format_vector(point.vector())
        )?;
    }
    Ok(())
}

/// Write centroids in the centroid format.
pub fn write_centroids<W: Write>(out: &mut W, centroids: &[Centroid]) -> Result<()> {
    for centroid in centroids {
        writeln!(
            out,
            "{}\t{}",
            centroid.id(),
            format_vector(centroid.position())
        )?;
    }
    Ok(())
}
