/******************************************************************************
 * Copyright ContinuousC. Licensed under the "Elastic License 2.0".           *
 ******************************************************************************/

mod common;

use std::collections::HashMap;

use common::{oid, response_frame, Replay};
use snmp_client::{
    tablify, Client, ErrorHandling, RequestIds, Value, VarBind,
};

fn row_key(key: &str) -> Value {
    Value::OctetString(key.as_bytes().to_vec())
}

#[test]
fn tablify_inverts_column_major_walks() {
    let varbinds = vec![
        VarBind::new(oid("1.2.1.1"), Value::Integer(11)),
        VarBind::new(oid("1.2.1.2"), Value::Integer(12)),
        VarBind::new(oid("1.2.2.1"), Value::Integer(21)),
        VarBind::new(oid("1.2.2.2"), Value::Integer(22)),
    ];
    assert_eq!(
        tablify(&varbinds, 0),
        vec![
            HashMap::from([
                (String::from("0"), row_key("1")),
                (String::from("1"), Value::Integer(11)),
                (String::from("2"), Value::Integer(21)),
            ]),
            HashMap::from([
                (String::from("0"), row_key("2")),
                (String::from("1"), Value::Integer(12)),
                (String::from("2"), Value::Integer(22)),
            ]),
        ]
    );
}

#[test]
fn tablify_with_compound_row_ids() {
    let varbinds = vec![
        VarBind::new(oid("1.2.3.4.1.10.1"), Value::Integer(1)),
        VarBind::new(oid("1.2.3.4.2.10.1"), Value::OctetString(b"a".to_vec())),
        VarBind::new(oid("1.2.3.4.1.10.2"), Value::Integer(2)),
        VarBind::new(oid("1.2.3.4.2.10.2"), Value::OctetString(b"b".to_vec())),
    ];
    assert_eq!(
        tablify(&varbinds, 4),
        vec![
            HashMap::from([
                (String::from("0"), row_key("10.1")),
                (String::from("1"), Value::Integer(1)),
                (String::from("2"), Value::OctetString(b"a".to_vec())),
            ]),
            HashMap::from([
                (String::from("0"), row_key("10.2")),
                (String::from("1"), Value::Integer(2)),
                (String::from("2"), Value::OctetString(b"b".to_vec())),
            ]),
        ]
    );
}

#[test]
fn tablify_rows_keep_first_seen_order() {
    let varbinds = vec![
        VarBind::new(oid("1.2.1.9"), Value::Integer(19)),
        VarBind::new(oid("1.2.1.2"), Value::Integer(12)),
        VarBind::new(oid("1.2.2.9"), Value::Integer(29)),
    ];
    let rows = tablify(&varbinds, 0);
    assert_eq!(rows[0].get("0"), Some(&row_key("9")));
    assert_eq!(rows[1].get("0"), Some(&row_key("2")));
}

#[tokio::test]
async fn table_walks_and_folds() {
    let transport = Replay::new(vec![
        response_frame(
            b"public",
            101,
            vec![VarBind::new(oid("1.2.1.1"), Value::Integer(11))],
        ),
        response_frame(
            b"public",
            102,
            vec![VarBind::new(oid("1.2.2.1"), Value::Integer(21))],
        ),
        response_frame(
            b"public",
            103,
            vec![VarBind::new(oid("1.3"), Value::Integer(0))],
        ),
    ]);
    let client = Client::with_transport("::1", b"public", transport)
        .set_request_ids(RequestIds::fixed(vec![101, 102, 103]));
    assert_eq!(client.config().errors, ErrorHandling::Strict);
    let rows = client.table(&oid("1.2"), 0).await.unwrap();
    assert_eq!(
        rows,
        vec![HashMap::from([
            (String::from("0"), row_key("1")),
            (String::from("1"), Value::Integer(11)),
            (String::from("2"), Value::Integer(21)),
        ])]
    );
}
