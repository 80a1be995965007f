//! Player report reader: turns the game's text export into player records.
//!
//! A line of the export is a player row iff it contains a run of at least
//! seven digits (the player UID). Rows are pipe-delimited; field 2 is the
//! primary nationality, field 3 the secondary, field 7 the numeric ethnic
//! value the game assigned to the newgen.

use std::fmt;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;
use std::sync::LazyLock;

use log::debug;
use regex::Regex;
use thiserror::Error;

use crate::ethnic::{EthnicCategory, NationEthnicTable};

static UID_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"[0-9]{7,}").expect("uid pattern")
});

/// Opaque numeric player identifier (at least seven digits).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PlayerId(pub String);

impl fmt::Display for PlayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// One parsed player row: identifier plus resolved ethnic category.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlayerRecord {
    pub id: PlayerId,
    pub ethnic: EthnicCategory,
}

#[derive(Error, Debug)]
pub enum ReportError {
    #[error("cannot read report file: {0}")]
    Io(#[from] std::io::Error),
    #[error("bad report format: not enough fields in line: {0}")]
    BadFormat(String),
    #[error("bad report format: ethnic value is not an integer: {0:?}")]
    BadEthnicValue(String),
    #[error("ethnic not found for nation code: {0}")]
    EthnicNotFound(String),
    #[error("ethnic value out of bounds: {0}")]
    EthnicValueOutOfBounds(i64),
    #[error("classification failed for {} player row(s):\n{}", .0.len(), join_failures(.0))]
    Classification(Vec<ReportError>),
}

fn join_failures(failures: &[ReportError]) -> String {
    failures
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("\n")
}

/// Resolves the ethnic category for a nation pair and ethnic value.
///
/// Pure decision table: the same inputs always produce the same category.
/// An unknown primary nation is an error; an unknown secondary nation is
/// tolerated and simply contributes nothing to the pair checks.
pub fn resolve_ethnic(
    table: &NationEthnicTable,
    primary_nation: &str,
    secondary_nation: &str,
    ethnic_value: i64,
) -> Result<EthnicCategory, ReportError> {
    use EthnicCategory::*;

    let primary = table
        .resolve(primary_nation)
        .ok_or_else(|| ReportError::EthnicNotFound(primary_nation.to_string()))?;
    let secondary = table.resolve(secondary_nation);

    let has = |category: EthnicCategory| primary == category || secondary == Some(category);

    match ethnic_value {
        0 => {
            if has(Scandinavian) {
                Ok(Scandinavian)
            } else if has(Caucasian) {
                Ok(Caucasian)
            } else {
                Ok(CentralEuropean)
            }
        }
        1 => {
            const MIXED: [EthnicCategory; 9] = [
                Scandinavian,
                SouthEastAsian,
                CentralEuropean,
                Caucasian,
                African,
                Asian,
                MiddleEastNorthAfrican,
                MiddleEastSouthAsian,
                EasternEuropeanCentralAsian,
            ];
            if MIXED.iter().any(|&category| has(category)) {
                Ok(SouthAmerican)
            } else {
                // Primary resolved above, so it always wins over the secondary.
                Ok(primary)
            }
        }
        2 => {
            if has(MiddleEastSouthAsian) {
                Ok(MiddleEastSouthAsian)
            } else {
                Ok(MiddleEastNorthAfrican)
            }
        }
        3 | 6 | 8 | 9 => Ok(African),
        7 => {
            if primary == SouthAmericanMediterranean {
                Ok(SouthAmericanMediterranean)
            } else if primary == SouthAmerican {
                Ok(SouthAmerican)
            } else {
                Ok(African)
            }
        }
        4 => Ok(MiddleEastSouthAsian),
        5 => Ok(SouthEastAsian),
        10 => {
            if primary == SouthAmerican {
                Ok(SouthAmerican)
            } else {
                Ok(Asian)
            }
        }
        value => Err(ReportError::EthnicValueOutOfBounds(value)),
    }
}

/// Reads and classifies every player row in the report file at `path`.
pub fn read_players(
    path: impl AsRef<Path>,
    table: &NationEthnicTable,
) -> Result<Vec<PlayerRecord>, ReportError> {
    let file = File::open(path)?;
    parse_players(BufReader::new(file), table)
}

/// Parses player rows out of a report.
///
/// Structural problems (too few fields, non-integer ethnic value) abort the
/// parse immediately. Classification failures are collected across the whole
/// input and reported together in one [`ReportError::Classification`] so a
/// single run surfaces every bad row.
pub fn parse_players<R: BufRead>(
    reader: R,
    table: &NationEthnicTable,
) -> Result<Vec<PlayerRecord>, ReportError> {
    let mut players = Vec::new();
    let mut failures = Vec::new();

    for line in reader.lines() {
        let line = line?;

        let Some(uid) = UID_RE.find(&line) else {
            debug!("skipping non-player line: {line}");
            continue;
        };

        let fields: Vec<&str> = line.split('|').map(str::trim).collect();
        if fields.len() < 8 {
            return Err(ReportError::BadFormat(line.clone()));
        }

        let ethnic_value: i64 = fields[7]
            .parse()
            .map_err(|_| ReportError::BadEthnicValue(fields[7].to_string()))?;

        match resolve_ethnic(table, fields[2], fields[3], ethnic_value) {
            Ok(ethnic) => players.push(PlayerRecord {
                id: PlayerId(uid.as_str().to_string()),
                ethnic,
            }),
            Err(err) => failures.push(err),
        }
    }

    if !failures.is_empty() {
        return Err(ReportError::Classification(failures));
    }

    Ok(players)
}
