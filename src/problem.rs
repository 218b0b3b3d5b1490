//! Problem definition for symmetric Euclidean TSP instances (TSPLIB EUC_2D).

use crate::error::{Error, Result};
use itertools::Itertools;
use serde::{Deserialize, Serialize};
use std::fmt::Write as _;
use std::fs;
use std::path::Path;
use std::str::FromStr;
use std::sync::OnceLock;

/// Integer tour and edge lengths, as produced by EUC_2D rounding.
pub type Distance = i64;

/// Above this many nodes the full distance matrix is not cached by default.
pub const MATRIX_CACHE_THRESHOLD: usize = 1500;

/// A city location in the plane.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    /// Create a new point.
    pub fn new(x: f64, y: f64) -> Self {
        Point { x, y }
    }

    /// TSPLIB EUC_2D distance: Euclidean distance rounded to the nearest integer.
    pub fn distance(&self, other: &Point) -> Distance {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        (dx.hypot(dy) + 0.5).floor() as Distance
    }
}

impl From<(f64, f64)> for Point {
    fn from((x, y): (f64, f64)) -> Self {
        Point::new(x, y)
    }
}

/// Dense symmetric n×n distance table stored row-major.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DistanceMatrix {
    n: usize,
    data: Vec<Distance>,
}

impl DistanceMatrix {
    fn from_points(points: &[Point]) -> Self {
        let n = points.len();
        let mut data = vec![0; n * n];

        for i in 0..n {
            for j in (i + 1)..n {
                let d = points[i].distance(&points[j]);
                data[i * n + j] = d;
                data[j * n + i] = d;
            }
        }

        DistanceMatrix { n, data }
    }

    /// Number of rows (and columns).
    pub fn size(&self) -> usize {
        self.n
    }

    /// Distance between `i` and `j`. Panics when either index is out of range.
    #[inline]
    pub fn get(&self, i: usize, j: usize) -> Distance {
        self.row(i)[j]
    }

    /// Distances from `i` to every node.
    pub fn row(&self, i: usize) -> &[Distance] {
        &self.data[i * self.n..(i + 1) * self.n]
    }
}

/// Represents an immutable TSP instance.
///
/// The distance matrix is built at most once, on first use, and only when the
/// instance is no larger than its cache threshold (or when explicitly asked for
/// through [`Instance::distance_matrix`]).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(try_from = "InstanceData")]
pub struct Instance {
    pub name: String,
    pub comment: Option<String>,
    points: Vec<Point>,
    #[serde(skip)]
    matrix_threshold: usize,
    #[serde(skip)]
    matrix: OnceLock<DistanceMatrix>,
}

#[derive(Deserialize)]
struct InstanceData {
    name: String,
    #[serde(default)]
    comment: Option<String>,
    points: Vec<Point>,
}

impl TryFrom<InstanceData> for Instance {
    type Error = Error;

    fn try_from(data: InstanceData) -> Result<Self> {
        let mut instance = Instance::new(data.name, data.points)?;
        instance.comment = data.comment;
        Ok(instance)
    }
}

impl Instance {
    /// Create a new instance from an ordered coordinate list.
    pub fn new<P: Into<Point>>(name: impl Into<String>, coords: Vec<P>) -> Result<Self> {
        let points: Vec<Point> = coords.into_iter().map(Into::into).collect();

        if points.is_empty() {
            return Err(Error::invalid_instance("at least one coordinate is required"));
        }

        if let Some(idx) = points
            .iter()
            .position(|p| !p.x.is_finite() || !p.y.is_finite())
        {
            return Err(Error::invalid_instance(format!(
                "coordinate of node {idx} is not finite"
            )));
        }

        Ok(Instance {
            name: name.into(),
            comment: None,
            points,
            matrix_threshold: MATRIX_CACHE_THRESHOLD,
            matrix: OnceLock::new(),
        })
    }

    /// Attach a free-text comment.
    pub fn with_comment(mut self, comment: impl Into<String>) -> Self {
        self.comment = Some(comment.into());
        self
    }

    /// Set the node count up to which the distance matrix is cached.
    pub fn with_matrix_threshold(mut self, threshold: usize) -> Self {
        self.matrix_threshold = threshold;
        self.matrix = OnceLock::new();
        self
    }

    /// Number of nodes.
    pub fn size(&self) -> usize {
        self.points.len()
    }

    /// Node coordinates, indexed by node id.
    pub fn points(&self) -> &[Point] {
        &self.points
    }

    /// Checked distance between two nodes.
    pub fn distance(&self, i: usize, j: usize) -> Result<Distance> {
        let n = self.size();
        for index in [i, j] {
            if index >= n {
                return Err(Error::OutOfRange { index, n });
            }
        }
        Ok(self.get_distance(i, j))
    }

    /// Distance between two valid node indices.
    ///
    /// Reads the cached matrix for small instances and falls back to the
    /// pairwise formula above the cache threshold. Panics on invalid indices.
    #[inline]
    pub fn get_distance(&self, i: usize, j: usize) -> Distance {
        if i == j {
            return 0;
        }
        match self.cached_matrix() {
            Some(matrix) => matrix.get(i, j),
            None => self.points[i].distance(&self.points[j]),
        }
    }

    /// Full distance matrix, built on first call and cached afterwards.
    ///
    /// This always materialises the O(n²) table; callers working on large
    /// instances should prefer [`Instance::get_distance`].
    pub fn distance_matrix(&self) -> &DistanceMatrix {
        self.matrix
            .get_or_init(|| DistanceMatrix::from_points(&self.points))
    }

    /// Whether the distance matrix has been materialised.
    pub fn has_cached_matrix(&self) -> bool {
        self.matrix.get().is_some()
    }

    fn cached_matrix(&self) -> Option<&DistanceMatrix> {
        if let Some(matrix) = self.matrix.get() {
            return Some(matrix);
        }
        if self.size() <= self.matrix_threshold {
            Some(self.distance_matrix())
        } else {
            None
        }
    }

    /// Closed tour length: consecutive edges plus the edge back to the start.
    ///
    /// Panics when a node index is out of range. Use [`crate::tour_length`]
    /// for tours that have not been validated.
    pub fn tour_length(&self, tour: &[usize]) -> Distance {
        self.path_length(tour, true)
    }

    /// Length of a node sequence, optionally closing the loop.
    ///
    /// Empty and single-node sequences have length 0. Panics when a node
    /// index is out of range.
    pub fn path_length(&self, tour: &[usize], close_loop: bool) -> Distance {
        if tour.len() < 2 {
            return 0;
        }

        let open: Distance = tour
            .iter()
            .tuple_windows()
            .map(|(&a, &b)| self.get_distance(a, b))
            .sum();

        if close_loop {
            open + self.get_distance(tour[tour.len() - 1], tour[0])
        } else {
            open
        }
    }

    /// Check that `tour` is a permutation of `0..n`.
    pub fn validate_tour(&self, tour: &[usize]) -> Result<()> {
        let n = self.size();
        if tour.len() != n {
            return Err(Error::invalid_tour(format!(
                "expected {n} nodes, got {}",
                tour.len()
            )));
        }
        validate_permutation(tour)
    }

    /// Load an instance from a TSPLIB file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let text = fs::read_to_string(path)?;
        Self::from_tsplib_str(&text)
    }

    /// Parse TSPLIB EUC_2D text.
    pub fn from_tsplib_str(text: &str) -> Result<Self> {
        let mut lines = text
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty() && *line != "EOF");

        let mut name = None;
        let mut comment = None;
        let mut dimension = None;
        let mut edge_weight_type = None;
        let mut found_section = false;

        for line in lines.by_ref() {
            if line.starts_with("NODE_COORD_SECTION") {
                found_section = true;
                break;
            }
            let Some((key, value)) = line.split_once(':') else {
                continue;
            };
            let value = value.trim();
            match key.trim().to_ascii_uppercase().as_str() {
                "NAME" => name = Some(value.to_string()),
                "COMMENT" => comment = Some(value.to_string()),
                "DIMENSION" => {
                    let parsed = value
                        .parse::<usize>()
                        .map_err(|_| Error::parse(format!("invalid DIMENSION '{value}'")))?;
                    dimension = Some(parsed);
                }
                "EDGE_WEIGHT_TYPE" => edge_weight_type = Some(value.to_ascii_uppercase()),
                _ => {}
            }
        }

        if !found_section {
            return Err(Error::parse("missing NODE_COORD_SECTION"));
        }

        match edge_weight_type.as_deref() {
            Some("EUC_2D") => {}
            other => {
                return Err(Error::invalid_instance(format!(
                    "unsupported EDGE_WEIGHT_TYPE {:?}, only EUC_2D is supported",
                    other.unwrap_or("")
                )))
            }
        }

        let mut coords = Vec::with_capacity(dimension.unwrap_or(0));
        for line in lines {
            if line.ends_with(':') || line.ends_with("SECTION") {
                break;
            }
            let parts: Vec<&str> = line.split_whitespace().collect();
            if parts.len() < 3 {
                break;
            }
            // The node id in column one is ignored; nodes are reindexed in file order.
            let x = parse_coordinate(parts[1], line)?;
            let y = parse_coordinate(parts[2], line)?;
            coords.push(Point::new(x, y));
        }

        if let Some(dim) = dimension {
            if dim != coords.len() {
                return Err(Error::invalid_instance(format!(
                    "DIMENSION is {dim} but {} coordinates were parsed",
                    coords.len()
                )));
            }
        }

        let mut instance = Instance::new(name.unwrap_or_else(|| "unnamed".to_string()), coords)?;
        instance.comment = comment;
        Ok(instance)
    }

    /// Render the instance as TSPLIB EUC_2D text.
    pub fn to_tsplib_string(&self) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "NAME : {}", self.name);
        if let Some(comment) = &self.comment {
            let _ = writeln!(out, "COMMENT : {comment}");
        }
        let _ = writeln!(out, "TYPE : TSP");
        let _ = writeln!(out, "DIMENSION : {}", self.size());
        let _ = writeln!(out, "EDGE_WEIGHT_TYPE : EUC_2D");
        let _ = writeln!(out, "NODE_COORD_SECTION");
        for (idx, p) in self.points.iter().enumerate() {
            let _ = writeln!(out, "{} {} {}", idx + 1, p.x, p.y);
        }
        out.push_str("EOF\n");
        out
    }

    /// Serialize name, comment and coordinates as JSON.
    pub fn to_json_string(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    /// Deserialize an instance from JSON, re-validating the coordinates.
    pub fn from_json_str(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }
}

impl FromStr for Instance {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::from_tsplib_str(s)
    }
}

fn parse_coordinate(token: &str, line: &str) -> Result<f64> {
    token
        .parse::<f64>()
        .map_err(|_| Error::parse(format!("bad coordinate {token:?} in line {line:?}")))
}

/// Check that `tour` contains every value of `0..tour.len()` exactly once.
pub fn validate_permutation(tour: &[usize]) -> Result<()> {
    let n = tour.len();
    let mut seen = vec![false; n];
    for &node in tour {
        if node >= n {
            return Err(Error::OutOfRange { index: node, n });
        }
        if seen[node] {
            return Err(Error::invalid_tour(format!("node {node} appears more than once")));
        }
        seen[node] = true;
    }
    Ok(())
}
