use std::io::Cursor;

use fm_core::ethnic::{EthnicCategory, NationEthnicTable};
use fm_core::report::{ReportError, parse_players, resolve_ethnic};

fn table() -> NationEthnicTable {
    NationEthnicTable::default()
}

#[test]
fn test_decision_table() {
    use EthnicCategory::*;

    // (primary, secondary, ethnic value, expected)
    let cases = [
        ("FIN", "CAN", 0, Scandinavian),
        ("BHU", "CAN", 0, Caucasian),
        ("AUT", "", 0, CentralEuropean),
        ("ALB", "", 1, YugoslavGreek),
        ("GER", "", 1, SouthAmerican),
        ("PAK", "ITA", 2, MiddleEastSouthAsian),
        ("ENG", "ITA", 2, MiddleEastNorthAfrican),
        ("ENG", "", 3, African),
        ("ENG", "", 6, African),
        ("ENG", "", 8, African),
        ("ENG", "", 9, African),
        ("ARG", "", 7, SouthAmericanMediterranean),
        ("COL", "", 7, SouthAmerican),
        ("ENG", "", 7, African),
        ("BAN", "", 4, MiddleEastSouthAsian),
        ("CAM", "", 5, SouthEastAsian),
        ("CAM", "", 10, Asian),
        ("COL", "", 10, SouthAmerican),
    ];

    let table = table();
    for (primary, secondary, value, expected) in cases {
        let got = resolve_ethnic(&table, primary, secondary, value)
            .unwrap_or_else(|err| panic!("{primary}/{secondary}/{value}: {err}"));
        assert_eq!(got, expected, "{primary}/{secondary}/{value}");
    }
}

#[test]
fn test_secondary_nation_drives_pair_rules() {
    let table = table();
    // Primary resolves to Asian, secondary to Scandinavian: value 0 prefers
    // Scandinavian from either side of the pair.
    assert_eq!(
        resolve_ethnic(&table, "BHU", "SWE", 0).unwrap(),
        EthnicCategory::Scandinavian
    );
    // MESA on the secondary side wins the value-2 rule.
    assert_eq!(
        resolve_ethnic(&table, "ITA", "PAK", 2).unwrap(),
        EthnicCategory::MiddleEastSouthAsian
    );
}

#[test]
fn test_unknown_primary_nation_is_an_error() {
    let err = resolve_ethnic(&table(), "XXX", "CAN", 0).unwrap_err();
    assert!(matches!(err, ReportError::EthnicNotFound(ref nation) if nation == "XXX"));
}

#[test]
fn test_unknown_secondary_nation_is_tolerated() {
    assert_eq!(
        resolve_ethnic(&table(), "CAN", "XXX", 0).unwrap(),
        EthnicCategory::Caucasian
    );
}

#[test]
fn test_out_of_bounds_values() {
    let table = table();
    for value in [11, 999, -1, i64::MIN] {
        let err = resolve_ethnic(&table, "CAN", "NZL", value).unwrap_err();
        assert!(
            matches!(err, ReportError::EthnicValueOutOfBounds(v) if v == value),
            "value {value}"
        );
    }
}

const REPORT: &str = "\
| UID       | Nat       | 2nd Nat   | Name                       |           |           |           |
| ---------------------------------------------------------------------------------------------------|
| 2000133469| GER       | RSA       | Tebogo Maluleke            | 1         | 16        | 3         |
| ---------------------------------------------------------------------------------------------------|
| 2000133381| FRA       | MTQ       | Anthony Marlet             | 1         | 5         | 1         |
| ---------------------------------------------------------------------------------------------------|
";

#[test]
fn test_parse_report() {
    let players = parse_players(Cursor::new(REPORT), &table()).unwrap();

    assert_eq!(players.len(), 2);
    assert_eq!(players[0].id.0, "2000133469");
    // Ethnic value 3 maps to African whatever the nations.
    assert_eq!(players[0].ethnic, EthnicCategory::African);
    assert_eq!(players[1].id.0, "2000133381");
    assert_eq!(players[1].ethnic, EthnicCategory::SouthAmerican);
}

#[test]
fn test_lines_without_long_digit_run_are_skipped() {
    let input = "| 123456| GER | RSA | short uid |\nno digits at all\n";
    let players = parse_players(Cursor::new(input), &table()).unwrap();
    assert!(players.is_empty());
}

#[test]
fn test_too_few_fields_is_fatal() {
    let input = "| 2000133469| XXX       | RSA       | Tebogo Maluleke            |\n";
    let err = parse_players(Cursor::new(input), &table()).unwrap_err();
    assert!(matches!(err, ReportError::BadFormat(_)));
    assert!(err.to_string().contains("not enough fields"));
}

#[test]
fn test_non_integer_ethnic_value_is_fatal() {
    let input = "1234567|Player One|FIN|CAN|Data|Data|Data|NaN\n";
    let err = parse_players(Cursor::new(input), &table()).unwrap_err();
    assert!(matches!(err, ReportError::BadEthnicValue(ref value) if value == "NaN"));
}

#[test]
fn test_classification_failures_are_aggregated() {
    let input = "\
| 2000133469| XXX       | RSA       | Unknown Primary            | 1         | 16        | 3         |
| 2000133470| GER       | RSA       | Bad Value                  | 1         | 16        | 42        |
| 2000133471| FRA       | MTQ       | Fine                       | 1         | 5         | 1         |
";
    let err = parse_players(Cursor::new(input), &table()).unwrap_err();

    let ReportError::Classification(failures) = err else {
        panic!("expected aggregated classification error, got {err}");
    };
    assert_eq!(failures.len(), 2);
    assert!(matches!(failures[0], ReportError::EthnicNotFound(_)));
    assert!(matches!(
        failures[1],
        ReportError::EthnicValueOutOfBounds(42)
    ));
}

#[test]
fn test_classification_is_deterministic() {
    let table = table();
    for _ in 0..3 {
        assert_eq!(
            resolve_ethnic(&table, "GER", "RSA", 3).unwrap(),
            EthnicCategory::African
        );
    }
}
