/******************************************************************************
 * Copyright ContinuousC. Licensed under the "Elastic License 2.0".           *
 ******************************************************************************/

use snmp_client::{Error, Oid};

fn oid(s: &str) -> Oid {
    s.parse().unwrap()
}

#[test]
fn parse_format_roundtrip() {
    for s in [
        "1",
        "1.2",
        "1.3.6.1.2.1.1.1.0",
        "1.3.6.1.4.1.8072.3.2.10",
        "2.999.4294967295",
    ] {
        assert_eq!(oid(s).to_string(), s);
    }
}

#[test]
fn parse_rejects_invalid() {
    for s in ["", ".1.2", "1..2", "1.2.", "1.a", "1.-2", "1.4294967296"] {
        assert!(
            matches!(s.parse::<Oid>(), Err(Error::ParseOid(_))),
            "accepted {:?}",
            s
        );
    }
}

#[test]
fn ordering_is_lexicographic() {
    assert!(oid("1.2.3") < oid("1.2.4"));
    assert!(oid("1.2") < oid("1.2.0"));
    assert!(oid("1.2.3") < oid("1.10"));
    assert!(oid("2.1") > oid("1.9.9.9"));
    assert_eq!(oid("1.2.3"), oid("1.2.3"));
}

#[test]
fn containment_is_strict_prefix() {
    assert!(oid("1.2").contains(&oid("1.2.3")));
    assert!(oid("1.2").contains(&oid("1.2.3.4")));
    assert!(!oid("1.2").contains(&oid("1.2")));
    assert!(!oid("1.2").contains(&oid("1.3.2")));
    assert!(!oid("1.2.3").contains(&oid("1.2")));
}

#[test]
fn in_table_returns_the_index() {
    assert_eq!(oid("1.2.3.4.5").in_table(&oid("1.2.3")), oid("4.5"));
    assert_eq!(oid("1.2.3").in_table(&oid("4.5")), Oid::empty());
}
