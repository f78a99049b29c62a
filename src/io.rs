//! Grid file reading and report writing.
//!
//! Input files are whitespace-delimited text: a header line, then one row per
//! point of the form `<lon> <lat> <time_step> <v1> ... <vk>`. Outputs are
//! fixed-width text with a configurable number of decimals.

use std::fs::{self, File};
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use crate::config::RegridConfig;
use crate::diagnostics::{Diagnostic, DiagnosticSink};
use crate::error::{RegridError, Result};
use crate::geodesy::adjust_longitude;
use crate::types::{IdwMapping, NnMapping, SpatialData};

const NN_SEPARATOR_WIDTH: usize = 68;
const IDW_SEPARATOR_WIDTH: usize = 80;

/// Header tokens and points of one grid file
#[derive(Debug, Clone, PartialEq)]
pub struct GridFile {
    pub headers: Vec<String>,
    pub points: Vec<SpatialData>,
}

/// Reads source or target grid files
pub struct InputReader<'a> {
    path: PathBuf,
    config: &'a RegridConfig,
    sink: &'a dyn DiagnosticSink,
}

impl<'a> InputReader<'a> {
    pub fn new(
        path: impl Into<PathBuf>,
        config: &'a RegridConfig,
        sink: &'a dyn DiagnosticSink,
    ) -> Self {
        Self {
            path: path.into(),
            config,
            sink,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the whitespace-separated tokens of the header line
    pub fn read_headers(&self) -> Result<Vec<String>> {
        let mut reader = self.open()?;
        let mut line = String::new();
        reader.read_line(&mut line)?;
        Ok(split_headers(&line))
    }

    /// Read every point of the file
    pub fn read_grid(&self) -> Result<Vec<SpatialData>> {
        Ok(self.read()?.points)
    }

    /// Read headers and points in a single pass
    pub fn read(&self) -> Result<GridFile> {
        let reader = self.open()?;
        let mut lines = reader.lines();

        let headers = match lines.next() {
            Some(line) => split_headers(&line?),
            None => Vec::new(),
        };

        let mut points = Vec::new();
        for (offset, line) in lines.enumerate() {
            // Line numbers are 1-based and the header is line 1
            let line_num = offset + 2;
            let line = line?;
            if line.trim().is_empty() {
                continue;
            }

            if let Some(point) = self.parse_line(&line, line_num)? {
                if let Some(first) = points.first() {
                    self.check_uniform(first, &point, line_num)?;
                }
                points.push(point);
            }
        }

        if points.is_empty() {
            return Err(RegridError::EmptyInput {
                message: format!("Empty input file: {}", self.path.display()),
            });
        }

        debug!(
            file = %self.path.display(),
            points = points.len(),
            columns = headers.len(),
            "Grid file read"
        );

        Ok(GridFile { headers, points })
    }

    fn open(&self) -> Result<BufReader<File>> {
        let file = File::open(&self.path).map_err(|e| {
            RegridError::Io(std::io::Error::new(
                e.kind(),
                format!("Cannot open input file {}: {}", self.path.display(), e),
            ))
        })?;
        Ok(BufReader::new(file))
    }

    /// Parse one data row; `None` when the coordinates or time step are malformed
    fn parse_line(&self, line: &str, line_num: usize) -> Result<Option<SpatialData>> {
        let mut tokens = line.split_whitespace();

        let lon = tokens.next().and_then(|t| t.parse::<f64>().ok());
        let lat = tokens.next().and_then(|t| t.parse::<f64>().ok());
        let time_step = tokens.next().and_then(|t| t.parse::<i32>().ok());

        let (Some(mut lon), Some(lat), Some(time_step)) = (lon, lat, time_step) else {
            if self.config.verbose {
                self.sink.report(Diagnostic::MalformedLine {
                    path: self.path.display().to_string(),
                    line: line_num,
                });
            }
            return Ok(None);
        };

        if !(lat.abs() <= 90.0) || !(lon.abs() <= 360.0) {
            return Err(RegridError::invalid(
                "coordinates",
                format!(
                    "Invalid coordinates ({}, {}) at line {} in file: {}",
                    lon,
                    lat,
                    line_num,
                    self.path.display()
                ),
            ));
        }
        if self.config.adjust_longitude {
            lon = adjust_longitude(lon);
        }

        let values = tokens
            .map(|t| {
                t.parse::<f64>()
                    .map_err(|_| self.parse_error(line_num, format!("Invalid value '{}'", t)))
            })
            .collect::<Result<Vec<f64>>>()?;

        match self.config.data_layout.fixed_value_count() {
            Some(expected) if values.len() < expected => {
                return Err(self.parse_error(
                    line_num,
                    format!(
                        "Missing values: expected {}, found {}",
                        expected,
                        values.len()
                    ),
                ));
            }
            Some(expected) if values.len() > expected => {
                return Err(self.parse_error(
                    line_num,
                    format!(
                        "Too many values: expected {}, found {}",
                        expected,
                        values.len()
                    ),
                ));
            }
            None if values.is_empty() => {
                return Err(self.parse_error(line_num, "No values found".to_string()));
            }
            _ => {}
        }

        Ok(Some(SpatialData::new(lon, lat, time_step, values)))
    }

    fn check_uniform(&self, first: &SpatialData, point: &SpatialData, line_num: usize) -> Result<()> {
        if first.values.len() != point.values.len() {
            return Err(RegridError::LayoutMismatch {
                message: format!(
                    "Expected {} values at line {} in file {}, found {}",
                    first.values.len(),
                    line_num,
                    self.path.display(),
                    point.values.len()
                ),
            });
        }
        Ok(())
    }

    fn parse_error(&self, line: usize, message: String) -> RegridError {
        RegridError::Parse {
            path: self.path.display().to_string(),
            line,
            message,
        }
    }
}

fn split_headers(line: &str) -> Vec<String> {
    line.split_whitespace().map(str::to_string).collect()
}

/// Writes regridded data, mapping reports and gridlists under the output path
pub struct OutputWriter {
    output_path: PathBuf,
    precision: usize,
    chunk_size: usize,
}

impl OutputWriter {
    /// Create the writer, creating the output directory if needed
    pub fn new(config: &RegridConfig) -> Result<Self> {
        let output_path = if config.output_path.as_os_str().is_empty() {
            PathBuf::from("./")
        } else {
            config.output_path.clone()
        };

        fs::create_dir_all(&output_path).map_err(|e| {
            RegridError::Io(std::io::Error::new(
                e.kind(),
                format!(
                    "Cannot create output directory {}: {}",
                    output_path.display(),
                    e
                ),
            ))
        })?;

        Ok(Self {
            output_path,
            precision: config.precision,
            chunk_size: config.chunk_size.max(1),
        })
    }

    pub fn output_path(&self) -> &Path {
        &self.output_path
    }

    /// Write the regridded records in the column order of `headers`
    pub fn write_regridded_data(
        &self,
        points: &[SpatialData],
        filename: &str,
        headers: &[String],
    ) -> Result<PathBuf> {
        let header = headers
            .iter()
            .enumerate()
            .map(|(i, h)| {
                if i < 3 {
                    format!("{:>10}", h)
                } else {
                    format!("{:>12}", h)
                }
            })
            .collect::<String>();

        let p = self.precision;
        let rows = points.iter().map(|point| {
            let mut row = format!(
                "{:>10.p$}{:>10.p$}{:>10}",
                point.longitude(),
                point.latitude(),
                point.time_step,
                p = p
            );
            for value in &point.values {
                row.push_str(&format!("{:>12.p$}", value, p = p));
            }
            row.push('\n');
            row
        });

        self.write_records(filename, header, rows)
    }

    /// Write one record per target, each followed by a separator line
    pub fn write_nn_mappings(&self, mappings: &[NnMapping], filename: &str) -> Result<PathBuf> {
        let separator = "-".repeat(NN_SEPARATOR_WIDTH);
        let header = format!(
            "Target_Lon Target_Lat Source_Lon Source_Lat Distance(km) Target_Index\n{}",
            separator
        );

        let p = self.precision;
        let rows = mappings.iter().map(|m| {
            format!(
                "{:>10.p$}{:>10.p$}{:>10.p$}{:>10.p$}{:>12.p$}{:>12}\n{}\n",
                m.target_lon,
                m.target_lat,
                m.source_lon,
                m.source_lat,
                m.distance_km,
                m.target_index,
                separator,
                p = p
            )
        });

        self.write_records(filename, header, rows)
    }

    /// Write one row per (target, neighbor) pair, records separated by dashes
    pub fn write_idw_mappings(&self, mappings: &[IdwMapping], filename: &str) -> Result<PathBuf> {
        let separator = "-".repeat(IDW_SEPARATOR_WIDTH);
        let header = format!(
            "Target_Lon Target_Lat Source_Lon Source_Lat Distance(km) Target_Index Fallback\n{}",
            separator
        );

        let p = self.precision;
        let rows = mappings.iter().map(|m| {
            let fallback = if m.is_fallback { "NN" } else { "" };
            let mut record = String::new();
            for n in &m.neighbors {
                record.push_str(&format!(
                    "{:>10.p$}{:>10.p$}{:>10.p$}{:>10.p$}{:>12.p$}{:>12}{:>8}\n",
                    m.target_lon,
                    m.target_lat,
                    n.source_lon,
                    n.source_lat,
                    n.distance_km,
                    m.target_index,
                    fallback,
                    p = p
                ));
            }
            record.push_str(&separator);
            record.push('\n');
            record
        });

        self.write_records(filename, header, rows)
    }

    /// Write the sorted unique (lon, lat) pairs of `points`
    pub fn write_gridlist(&self, points: &[SpatialData], filename: &str) -> Result<PathBuf> {
        let mut unique: Vec<(f64, f64)> = points
            .iter()
            .map(|p| (p.longitude(), p.latitude()))
            .collect();
        unique.sort_by(|a, b| a.0.total_cmp(&b.0).then(a.1.total_cmp(&b.1)));
        unique.dedup();

        let p = self.precision;
        let rows = unique
            .into_iter()
            .map(|(lon, lat)| format!("{:>10.p$}{:>10.p$}\n", lon, lat, p = p));

        self.write_records(filename, "Lon\t Lat".to_string(), rows)
    }

    /// Write a header line then records, flushing every `chunk_size` records
    fn write_records<I>(&self, filename: &str, header: String, records: I) -> Result<PathBuf>
    where
        I: IntoIterator<Item = String>,
    {
        let path = self.output_path.join(filename);
        let file = File::create(&path).map_err(|e| {
            RegridError::Io(std::io::Error::new(
                e.kind(),
                format!("Cannot open output file {}: {}", path.display(), e),
            ))
        })?;
        let mut writer = BufWriter::new(file);

        writeln!(writer, "{}", header)?;
        let mut count = 0usize;
        for record in records {
            writer.write_all(record.as_bytes())?;
            count += 1;
            if count % self.chunk_size == 0 {
                writer.flush()?;
            }
        }
        writer.flush()?;

        info!(file = %path.display(), records = count, "Wrote output file");
        Ok(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diagnostics::CollectingSink;
    use crate::types::{DataLayout, IdwNeighbor};
    use pretty_assertions::assert_eq;

    fn write_file(dir: &Path, name: &str, content: &str) -> PathBuf {
        let path = dir.join(name);
        let mut file = File::create(&path).unwrap();
        file.write_all(content.as_bytes()).unwrap();
        path
    }

    fn annual_config() -> RegridConfig {
        RegridConfig::builder()
            .data_layout(DataLayout::YearByYear)
            .verbose(true)
            .build()
    }

    #[test]
    fn test_read_year_by_year() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_file(
            dir.path(),
            "annual.txt",
            "Lon Lat Year Total\n10.5 20.25 2000 1.5\n\n350.0 -5.0 2001 2.5\n",
        );
        let config = annual_config();
        let sink = CollectingSink::new();

        let grid = InputReader::new(&path, &config, &sink).read().unwrap();
        assert_eq!(grid.headers, vec!["Lon", "Lat", "Year", "Total"]);
        assert_eq!(
            grid.points,
            vec![
                SpatialData::new(10.5, 20.25, 2000, vec![1.5]),
                SpatialData::new(-10.0, -5.0, 2001, vec![2.5]),
            ]
        );
        assert!(sink.is_empty());
    }

    #[test]
    fn test_read_keeps_longitude_when_not_adjusting() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_file(dir.path(), "annual.txt", "Lon Lat Year V\n270.0 0.0 1 1.0\n");
        let mut config = annual_config();
        config.adjust_longitude = false;
        let sink = CollectingSink::new();

        let points = InputReader::new(&path, &config, &sink).read_grid().unwrap();
        assert_eq!(points[0].longitude(), 270.0);
    }

    #[test]
    fn test_read_skips_malformed_lines() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_file(
            dir.path(),
            "annual.txt",
            "Lon Lat Year V\nabc 1.0 2000 1.0\n1.0 2.0 2000 3.0\n",
        );
        let config = annual_config();
        let sink = CollectingSink::new();

        let points = InputReader::new(&path, &config, &sink).read_grid().unwrap();
        assert_eq!(points.len(), 1);
        assert_eq!(
            sink.diagnostics(),
            vec![Diagnostic::MalformedLine {
                path: path.display().to_string(),
                line: 2,
            }]
        );
    }

    #[test]
    fn test_read_rejects_out_of_range_coordinates() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_file(dir.path(), "annual.txt", "Lon Lat Year V\n0.0 95.0 2000 1.0\n");
        let config = annual_config();
        let sink = CollectingSink::new();

        let result = InputReader::new(&path, &config, &sink).read();
        assert!(matches!(result, Err(RegridError::InvalidArgument { .. })));
    }

    #[test]
    fn test_read_rejects_longitude_beyond_360() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_file(
            dir.path(),
            "annual.txt",
            "Lon Lat Year V\n10.0 0.0 2000 1.0\n370.0 -5.0 2001 2.5\n",
        );
        let config = annual_config();
        let sink = CollectingSink::new();

        let result = InputReader::new(&path, &config, &sink).read();
        assert!(matches!(
            result,
            Err(RegridError::InvalidArgument { ref param, .. }) if param == "coordinates"
        ));
    }

    #[test]
    fn test_read_grid_by_time_rejects_extra_values() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_file(
            dir.path(),
            "monthly.txt",
            "Lon Lat Year Jan Feb Mar Apr May Jun Jul Aug Sep Oct Nov Dec\n0 0 2000 1 2 3 4 5 6 7 8 9 10 11 12 13\n",
        );
        let config = RegridConfig::default();
        let sink = CollectingSink::new();

        let result = InputReader::new(&path, &config, &sink).read();
        assert!(matches!(result, Err(RegridError::Parse { line: 2, .. })));
    }

    #[test]
    fn test_read_grid_by_time_requires_twelve_values() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_file(
            dir.path(),
            "monthly.txt",
            "Lon Lat Year Jan Feb Mar Apr May Jun Jul Aug Sep Oct Nov Dec\n0 0 2000 1 2 3\n",
        );
        let config = RegridConfig::default();
        let sink = CollectingSink::new();

        let result = InputReader::new(&path, &config, &sink).read();
        assert!(matches!(result, Err(RegridError::Parse { line: 2, .. })));
    }

    #[test]
    fn test_read_non_uniform_values() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_file(
            dir.path(),
            "annual.txt",
            "Lon Lat Year A B\n0 0 2000 1 2\n1 0 2000 1\n",
        );
        let config = annual_config();
        let sink = CollectingSink::new();

        let result = InputReader::new(&path, &config, &sink).read();
        assert!(matches!(result, Err(RegridError::LayoutMismatch { .. })));
    }

    #[test]
    fn test_read_invalid_value_is_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_file(dir.path(), "annual.txt", "Lon Lat Year A\n0 0 2000 x\n");
        let config = annual_config();
        let sink = CollectingSink::new();

        let result = InputReader::new(&path, &config, &sink).read();
        assert!(matches!(result, Err(RegridError::Parse { .. })));
    }

    #[test]
    fn test_read_empty_and_missing_files() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_file(dir.path(), "empty.txt", "Lon Lat Year A\n");
        let config = annual_config();
        let sink = CollectingSink::new();

        assert!(matches!(
            InputReader::new(&path, &config, &sink).read(),
            Err(RegridError::EmptyInput { .. })
        ));
        assert!(matches!(
            InputReader::new(dir.path().join("missing.txt"), &config, &sink).read_headers(),
            Err(RegridError::Io(_))
        ));
    }

    #[test]
    fn test_write_regridded_data_format() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = RegridConfig::default();
        config.output_path = dir.path().join("out");
        config.precision = 2;
        let writer = OutputWriter::new(&config).unwrap();

        let headers: Vec<String> = ["Lon", "Lat", "Year", "V1", "V2"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        let points = vec![SpatialData::new(1.5, -2.25, 2000, vec![3.0, 10.126])];
        let path = writer
            .write_regridded_data(&points, "regridded.txt", &headers)
            .unwrap();

        let content = fs::read_to_string(path).unwrap();
        assert_eq!(
            content,
            "       Lon       Lat      Year          V1          V2\n      1.50     -2.25      2000        3.00       10.13\n"
        );
    }

    #[test]
    fn test_write_nn_mappings_format() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = RegridConfig::default();
        config.output_path = dir.path().to_path_buf();
        config.precision = 1;
        let writer = OutputWriter::new(&config).unwrap();

        let mappings = vec![NnMapping {
            target_lon: 0.4,
            target_lat: 0.0,
            source_lon: 0.0,
            source_lat: 0.0,
            distance_km: 44.48,
            target_index: 0,
        }];
        let path = writer.write_nn_mappings(&mappings, "nn.txt").unwrap();
        let content = fs::read_to_string(path).unwrap();
        let lines: Vec<&str> = content.lines().collect();

        assert_eq!(
            lines[0],
            "Target_Lon Target_Lat Source_Lon Source_Lat Distance(km) Target_Index"
        );
        assert_eq!(lines[1], "-".repeat(68));
        assert_eq!(
            lines[2],
            "       0.4       0.0       0.0       0.0        44.5           0"
        );
        assert_eq!(lines[3], "-".repeat(68));
        assert_eq!(lines.len(), 4);
    }

    #[test]
    fn test_write_idw_mappings_format() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = RegridConfig::default();
        config.output_path = dir.path().to_path_buf();
        config.precision = 1;
        config.chunk_size = 1;
        let writer = OutputWriter::new(&config).unwrap();

        let mappings = vec![
            IdwMapping {
                target_lon: 1.0,
                target_lat: 0.0,
                neighbors: vec![
                    IdwNeighbor {
                        source_lon: 0.0,
                        source_lat: 0.0,
                        distance_km: 111.2,
                    },
                    IdwNeighbor {
                        source_lon: 2.0,
                        source_lat: 0.0,
                        distance_km: 111.2,
                    },
                ],
                target_index: 0,
                is_fallback: false,
            },
            IdwMapping {
                target_lon: 5.0,
                target_lat: 0.0,
                neighbors: vec![IdwNeighbor {
                    source_lon: 2.0,
                    source_lat: 0.0,
                    distance_km: 333.6,
                }],
                target_index: 1,
                is_fallback: true,
            },
        ];
        let path = writer.write_idw_mappings(&mappings, "idw.txt").unwrap();
        let content = fs::read_to_string(path).unwrap();
        let lines: Vec<&str> = content.lines().collect();

        assert_eq!(lines.len(), 7);
        assert!(lines[0].ends_with("Target_Index Fallback"));
        assert_eq!(lines[1], "-".repeat(80));
        assert_eq!(
            lines[2],
            "       1.0       0.0       0.0       0.0       111.2           0        "
        );
        assert_eq!(lines[4], "-".repeat(80));
        assert_eq!(
            lines[5],
            "       5.0       0.0       2.0       0.0       333.6           1      NN"
        );
    }

    #[test]
    fn test_write_gridlist_sorted_unique() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = RegridConfig::default();
        config.output_path = dir.path().to_path_buf();
        config.precision = 1;
        let writer = OutputWriter::new(&config).unwrap();

        let points = vec![
            SpatialData::new(2.0, 1.0, 2000, vec![]),
            SpatialData::new(1.0, 5.0, 2000, vec![]),
            SpatialData::new(2.0, 1.0, 2001, vec![]),
            SpatialData::new(1.0, -5.0, 2000, vec![]),
        ];
        let path = writer.write_gridlist(&points, "gridlist.txt").unwrap();
        let content = fs::read_to_string(path).unwrap();

        assert_eq!(
            content,
            "Lon\t Lat\n       1.0      -5.0\n       1.0       5.0\n       2.0       1.0\n"
        );
    }
}
