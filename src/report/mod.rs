//! Candidates table: writing search output and reading it back.
//!
//! The table has a `Multiplier,Spectral score` header followed by one row per
//! candidate, multiplier in lowercase hexadecimal and score in the shortest
//! `%g` form with six significant digits.

pub mod select;

use std::fmt;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use crate::error::SearchError;
use crate::search::candidate::Candidate;

pub const HEADER: &str = "Multiplier,Spectral score";

/// Significant digits used for scores.
pub const SCORE_PRECISION: usize = 6;

/// Parse error with location information
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseError {
    pub line_number: usize,
    pub message: String,
    pub line_content: String,
}

impl ParseError {
    pub fn new(
        line_number: usize,
        message: impl Into<String>,
        line_content: impl Into<String>,
    ) -> Self {
        Self {
            line_number,
            message: message.into(),
            line_content: line_content.into(),
        }
    }
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "line {}: {}\n  | {}",
            self.line_number, self.message, self.line_content
        )
    }
}

impl std::error::Error for ParseError {}

/// Lowercase hexadecimal without prefix.
pub fn format_multiplier(multiplier: u64) -> String {
    format!("{:x}", multiplier)
}

/// Format like `%g`: six significant digits, trailing zeros removed,
/// scientific notation for exponents below -4 or from 6 up.
pub fn format_score(score: f64) -> String {
    if score.is_nan() {
        return "nan".to_string();
    }
    if score.is_infinite() {
        return if score > 0.0 { "inf" } else { "-inf" }.to_string();
    }
    if score == 0.0 {
        return "0".to_string();
    }

    // Rounding to the target precision first fixes the exponent.
    let scientific = format!("{:.*e}", SCORE_PRECISION - 1, score);
    let (mantissa, exponent) = match scientific.split_once('e') {
        Some((m, e)) => (m, e.parse::<i32>().unwrap_or(0)),
        None => (scientific.as_str(), 0),
    };

    if exponent < -4 || exponent >= SCORE_PRECISION as i32 {
        let sign = if exponent < 0 { '-' } else { '+' };
        format!(
            "{}e{}{:02}",
            trim_fraction(mantissa),
            sign,
            exponent.unsigned_abs()
        )
    } else {
        let decimals = (SCORE_PRECISION as i32 - 1 - exponent) as usize;
        trim_fraction(&format!("{:.*}", decimals, score)).to_string()
    }
}

fn trim_fraction(s: &str) -> &str {
    if s.contains('.') {
        s.trim_end_matches('0').trim_end_matches('.')
    } else {
        s
    }
}

/// Render one table row, without line terminator.
pub fn format_row(candidate: &Candidate) -> String {
    format!(
        "{},{}",
        format_multiplier(candidate.multiplier),
        format_score(candidate.spectral_score)
    )
}

/// Output sink for the candidates table.
///
/// The file is created and the header written on construction, so an
/// unwritable destination is reported before any search work starts.
pub struct CandidateWriter {
    path: PathBuf,
    writer: BufWriter<File>,
}

impl CandidateWriter {
    pub fn create(path: impl AsRef<Path>) -> Result<Self, SearchError> {
        let path = path.as_ref().to_path_buf();
        let file = File::create(&path).map_err(|source| SearchError::Output {
            path: path.clone(),
            source,
        })?;
        let mut writer = Self {
            path,
            writer: BufWriter::new(file),
        };
        writer.write_line(HEADER)?;
        writer.flush()?;
        Ok(writer)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Append rows in the given order.
    pub fn write_candidates(&mut self, candidates: &[Candidate]) -> Result<(), SearchError> {
        for candidate in candidates {
            self.write_line(&format_row(candidate))?;
        }
        Ok(())
    }

    pub fn finish(mut self) -> Result<(), SearchError> {
        self.flush()
    }

    fn write_line(&mut self, line: &str) -> Result<(), SearchError> {
        writeln!(self.writer, "{}", line).map_err(|source| self.output_error(source))
    }

    fn flush(&mut self) -> Result<(), SearchError> {
        self.writer.flush().map_err(|source| self.output_error(source))
    }

    fn output_error(&self, source: std::io::Error) -> SearchError {
        SearchError::Output {
            path: self.path.clone(),
            source,
        }
    }
}

/// Parse a candidates table. Blank lines are skipped.
pub fn parse_candidates(source: &str) -> Result<Vec<Candidate>, ParseError> {
    let mut lines = source
        .lines()
        .enumerate()
        .map(|(idx, line)| (idx + 1, line.trim()))
        .filter(|(_, line)| !line.is_empty());

    match lines.next() {
        Some((_, line)) if line == HEADER => {}
        Some((line_number, line)) => {
            return Err(ParseError::new(
                line_number,
                format!("expected header '{}'", HEADER),
                line,
            ));
        }
        None => return Ok(Vec::new()),
    }

    lines
        .map(|(line_number, line)| parse_row(line_number, line))
        .collect()
}

fn parse_row(line_number: usize, line: &str) -> Result<Candidate, ParseError> {
    let fields: Vec<&str> = line.split(',').map(str::trim).collect();
    if fields.len() != 2 {
        return Err(ParseError::new(
            line_number,
            format!("expected 2 fields, found {}", fields.len()),
            line,
        ));
    }

    let digits = fields[0]
        .strip_prefix("0x")
        .or_else(|| fields[0].strip_prefix("0X"))
        .unwrap_or(fields[0]);
    let multiplier = u64::from_str_radix(digits, 16).map_err(|e| {
        ParseError::new(line_number, format!("invalid multiplier: {}", e), line)
    })?;
    let spectral_score = fields[1]
        .parse::<f64>()
        .map_err(|e| ParseError::new(line_number, format!("invalid score: {}", e), line))?;

    Ok(Candidate {
        multiplier,
        spectral_score,
    })
}

/// Read and parse a candidates file.
pub fn read_candidates(path: impl AsRef<Path>) -> Result<Vec<Candidate>, SearchError> {
    let source = std::fs::read_to_string(path)?;
    Ok(parse_candidates(&source)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_path(name: &str) -> PathBuf {
        std::env::temp_dir().join(format!("spectral-search-{}-{}", std::process::id(), name))
    }

    #[test]
    fn test_format_score_fixed() {
        assert_eq!(format_score(0.7576416708050400), "0.757642");
        assert_eq!(format_score(0.7343581481514461), "0.734358");
        assert_eq!(format_score(0.5), "0.5");
        assert_eq!(format_score(1.0), "1");
        assert_eq!(format_score(123456.4), "123456");
        assert_eq!(format_score(0.0001234567), "0.000123457");
        assert_eq!(format_score(0.0), "0");
    }

    #[test]
    fn test_format_score_rounding_carries() {
        assert_eq!(format_score(0.9999996), "1");
        assert_eq!(format_score(9.9999996), "10");
    }

    #[test]
    fn test_format_score_scientific() {
        assert_eq!(format_score(1234567.0), "1.23457e+06");
        assert_eq!(format_score(0.00001), "1e-05");
        assert_eq!(format_score(-2.5e-7), "-2.5e-07");
        assert_eq!(format_score(f64::INFINITY), "inf");
    }

    #[test]
    fn test_format_row() {
        let candidate = Candidate {
            multiplier: 0xcba2723cca35d642,
            spectral_score: 0.7343581481514461,
        };
        assert_eq!(format_row(&candidate), "cba2723cca35d642,0.734358");
    }

    #[test]
    fn test_parse_candidates() {
        let source = "Multiplier,Spectral score\n\
                      cba2723cca35d642,0.734358\n\n\
                      d1342543de82ef95,0.825718\n";
        let candidates = parse_candidates(source).unwrap();
        assert_eq!(candidates.len(), 2);
        assert_eq!(candidates[0].multiplier, 0xcba2723cca35d642);
        assert_eq!(candidates[1].spectral_score, 0.825718);
    }

    #[test]
    fn test_parse_empty_and_header_only() {
        assert!(parse_candidates("").unwrap().is_empty());
        assert!(parse_candidates("Multiplier,Spectral score\n").unwrap().is_empty());
    }

    #[test]
    fn test_parse_errors() {
        let err = parse_candidates("a,b\n").unwrap_err();
        assert_eq!(err.line_number, 1);

        let err = parse_candidates("Multiplier,Spectral score\nzz,0.5\n").unwrap_err();
        assert_eq!(err.line_number, 2);
        assert!(err.message.contains("multiplier"));
        assert_eq!(err.line_content, "zz,0.5");

        let err = parse_candidates("Multiplier,Spectral score\nc0,0.5\nc1\n").unwrap_err();
        assert_eq!(err.line_number, 3);
        assert!(err.to_string().starts_with("line 3: expected 2 fields"));
    }

    #[test]
    fn test_writer_round_trip() {
        let path = temp_path("writer.csv");
        let candidates = vec![
            Candidate {
                multiplier: 0xcba2723cca35d642,
                spectral_score: 0.7343581481514461,
            },
            Candidate {
                multiplier: 0xd1342543de82ef95,
                spectral_score: 0.8257179325719203,
            },
        ];

        let mut writer = CandidateWriter::create(&path).unwrap();
        writer.write_candidates(&candidates).unwrap();
        writer.finish().unwrap();

        let text = std::fs::read_to_string(&path).unwrap();
        assert_eq!(
            text,
            "Multiplier,Spectral score\ncba2723cca35d642,0.734358\nd1342543de82ef95,0.825718\n"
        );
        let read = read_candidates(&path).unwrap();
        assert_eq!(read[1].multiplier, 0xd1342543de82ef95);
        std::fs::remove_file(&path).unwrap();
    }

    #[test]
    fn test_header_written_on_create() {
        let path = temp_path("header.csv");
        let writer = CandidateWriter::create(&path).unwrap();
        assert_eq!(
            std::fs::read_to_string(writer.path()).unwrap(),
            "Multiplier,Spectral score\n"
        );
        drop(writer);
        std::fs::remove_file(&path).unwrap();
    }

    #[test]
    fn test_unopenable_output() {
        let path = temp_path("missing-dir").join("candidates.csv");
        match CandidateWriter::create(&path) {
            Err(SearchError::Output { path: p, .. }) => assert_eq!(p, path),
            Err(other) => panic!("Unexpected error: {}", other),
            Ok(_) => panic!("Expected output error"),
        }
    }
}
