/******************************************************************************
 * Copyright ContinuousC. Licensed under the "Elastic License 2.0".           *
 ******************************************************************************/

use snmp_client::{BulkBody, Message, Oid, Pdu, PduBody, Value, VarBind};

fn oid(s: &str) -> Oid {
    s.parse().unwrap()
}

#[test]
fn integer_encoding() {
    assert_eq!(Value::Integer(0).to_bytes(), [0x02, 0x01, 0x00]);
    assert_eq!(Value::Integer(127).to_bytes(), [0x02, 0x01, 0x7f]);
    assert_eq!(Value::Integer(128).to_bytes(), [0x02, 0x02, 0x00, 0x80]);
    assert_eq!(Value::Integer(-1).to_bytes(), [0x02, 0x01, 0xff]);
    assert_eq!(Value::Integer(-129).to_bytes(), [0x02, 0x02, 0xff, 0x7f]);
    assert_eq!(
        Value::Integer(2_147_483_647).to_bytes(),
        [0x02, 0x04, 0x7f, 0xff, 0xff, 0xff]
    );
}

#[test]
fn unsigned_encoding_keeps_the_sign_bit_clear() {
    assert_eq!(
        Value::Counter32(u32::MAX).to_bytes(),
        [0x41, 0x05, 0x00, 0xff, 0xff, 0xff, 0xff]
    );
    assert_eq!(Value::Gauge32(0).to_bytes(), [0x42, 0x01, 0x00]);
    assert_eq!(
        Value::Counter64(u64::MAX).to_bytes(),
        [0x46, 0x09, 0x00, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff]
    );
}

#[test]
fn oid_encoding_packs_the_first_two_arcs() {
    assert_eq!(
        Value::ObjectIdentifier(oid("1.3.6.1.2.1")).to_bytes(),
        [0x06, 0x05, 0x2b, 0x06, 0x01, 0x02, 0x01]
    );
    // multi-byte sub-identifier: 8072 = 0x3f * 128 + 0x08
    assert_eq!(
        Value::ObjectIdentifier(oid("1.3.6.1.4.1.8072")).to_bytes(),
        [0x06, 0x07, 0x2b, 0x06, 0x01, 0x04, 0x01, 0xbf, 0x08]
    );
}

#[test]
fn exception_markers_carry_empty_content() {
    assert_eq!(Value::NoSuchObject.to_bytes(), [0x80, 0x00]);
    assert_eq!(Value::NoSuchInstance.to_bytes(), [0x81, 0x00]);
    assert_eq!(Value::EndOfMibView.to_bytes(), [0x82, 0x00]);
}

#[test]
fn long_form_length() {
    let value = Value::OctetString(vec![0xab; 200]);
    let bytes = value.to_bytes();
    assert_eq!(&bytes[..3], [0x04, 0x81, 0xc8]);
    assert_eq!(Value::from_bytes(&bytes).unwrap(), value);
}

#[test]
fn value_roundtrip() {
    let values = [
        Value::Integer(-123456789),
        Value::Integer(354522558),
        Value::OctetString(b"Linux d24cf7f36138 4.4.0-28-generic".to_vec()),
        Value::OctetString(Vec::new()),
        Value::Null,
        Value::ObjectIdentifier(oid("1.3.6.1.4.1.8072.3.2.10")),
        Value::ObjectIdentifier(oid("2.999.1")),
        Value::Sequence(vec![
            Value::Integer(1),
            Value::OctetString(b"public".to_vec()),
            Value::Null,
        ]),
        Value::IpAddress([172, 17, 0, 1]),
        Value::Counter32(57),
        Value::Gauge32(4_294_967_295),
        Value::TimeTicks(0),
        Value::Counter64(18_446_744_073_709_551_615),
        Value::NoSuchObject,
        Value::NoSuchInstance,
        Value::EndOfMibView,
    ];
    for value in values {
        assert_eq!(
            Value::from_bytes(&value.to_bytes()).unwrap(),
            value,
            "roundtrip failed for {:?}",
            value
        );
    }
}

#[test]
fn message_roundtrip() {
    let messages = [
        Message::v2c(
            b"public",
            Pdu::get(1001613222, &[oid("1.3.6.1.2.1.1.1.0")]),
        ),
        Message::v2c(
            b"private",
            Pdu::get_next(-5, &[oid("1.2.3"), oid("1.2.4")]),
        ),
        Message::v2c(
            b"private",
            Pdu::set(
                42,
                vec![VarBind::new(
                    oid("1.3.6.1.2.1.1.4.0"),
                    Value::OctetString(b"hello@world.com".to_vec()),
                )],
            ),
        ),
        Message::v2c(
            b"public",
            Pdu::bulk_get(7, 1, 5, &[oid("1.3.6.1.2.1.1.1"), oid("1.3.6.1.2.1.3.1")]),
        ),
        Message::v2c(
            b"public",
            Pdu::Response(PduBody {
                request_id: 234,
                error_status: 2,
                error_index: 1,
                varbinds: vec![
                    VarBind::new(oid("1.2.3"), Value::Gauge32(10_000_000)),
                    VarBind::new(oid("1.2.4"), Value::EndOfMibView),
                ],
            }),
        ),
    ];
    for message in messages {
        assert_eq!(
            Message::from_bytes(&message.to_bytes()).unwrap(),
            message,
            "roundtrip failed for {:?}",
            message
        );
    }
}

#[test]
fn bulk_request_keeps_its_parameters() {
    let message = Message::v2c(
        b"public",
        Pdu::bulk_get(9, 2, 20, &[oid("1.2.3"), oid("1.2.4"), oid("1.2.5")]),
    );
    match Message::from_bytes(&message.to_bytes()).unwrap().pdu {
        Pdu::BulkGetRequest(BulkBody {
            non_repeaters,
            max_repetitions,
            varbinds,
            ..
        }) => {
            assert_eq!(non_repeaters, 2);
            assert_eq!(max_repetitions, 20);
            assert_eq!(varbinds.len(), 3);
        }
        pdu => panic!("unexpected PDU: {:?}", pdu),
    }
}

#[test]
fn malformed_input_is_rejected() {
    assert!(Message::from_bytes(&[]).is_err());
    assert!(Message::from_bytes(&[0x30, 0x03, 0x02, 0x01, 0x01]).is_err());
    // truncated length
    assert!(Value::from_bytes(&[0x04, 0x82, 0x01]).is_err());
    // content shorter than announced
    assert!(Value::from_bytes(&[0x04, 0x05, 0x01]).is_err());
    // trailing data
    assert!(Value::from_bytes(&[0x05, 0x00, 0x00]).is_err());
}
