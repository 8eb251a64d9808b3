//! Wire-level tests for both packet families.
//!
//! Every vector is a complete packet as it appears on the wire. Decoding must
//! produce the expected value and re-encoding must reproduce the same bytes.
//!
//! ## Running Tests
//!
//! ```bash
//! cargo test -p mqtt-packet
//!
//! # With codec logs
//! RUST_LOG=mqtt_packet=trace cargo test -p mqtt-packet -- --nocapture
//! ```

use std::sync::Once;

use crate::error::Error;
use crate::{mqtt, sn};

fn init_tracing() {
    static INIT: Once = Once::new();
    INIT.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .with_test_writer()
            .try_init();
    });
}

fn assert_mqtt_wire(bytes: &[u8], expected: &mqtt::Packet) {
    init_tracing();
    let parsed = mqtt::Packet::parse(bytes).unwrap();
    assert_eq!(&parsed, expected);
    assert_eq!(&expected.to_bytes().unwrap()[..], bytes);
}

fn assert_sn_wire(bytes: &[u8], expected: &sn::Packet) {
    init_tracing();
    let parsed = sn::Packet::parse(bytes).unwrap();
    assert_eq!(&parsed, expected);
    assert_eq!(&expected.to_bytes().unwrap()[..], bytes);
}

// ============================================================================
// Tests: MQTT CONNECT / CONNACK
// ============================================================================

mod mqtt_connect_tests {
    use super::*;
    use crate::mqtt::{ConnAck, Connect, Packet, ProtocolVersion, QoS, Will};

    #[test]
    fn test_connect_310() {
        let bytes = b"\x10\x16\x00\x06MQIsdp\x03\x02\x00\x0f\x00\x08myclient";
        assert_mqtt_wire(bytes, &Packet::Connect(Connect::new("myclient")));

        let Packet::Connect(connect) = Packet::parse(bytes).unwrap() else {
            panic!("expected Connect");
        };
        assert_eq!(connect.version, ProtocolVersion::V310);
        assert_eq!(connect.version.to_string(), "3.1.0");
        assert_eq!(connect.protocol_name(), "MQIsdp");
        assert_eq!(connect.protocol_level(), 3);
    }

    #[test]
    fn test_connect_311() {
        let bytes = b"\x10\x14\x00\x04MQTT\x04\x02\x00\x0f\x00\x08myclient";
        let connect = Connect::new("myclient").with_version(ProtocolVersion::V311);
        assert_mqtt_wire(bytes, &Packet::Connect(connect));
    }

    #[test]
    fn test_connect_311_empty_client_id() {
        let bytes = b"\x10\x0c\x00\x04MQTT\x04\x02\x00\x0f\x00\x00";
        let connect = Connect::new("").with_version(ProtocolVersion::V311);
        assert_mqtt_wire(bytes, &Packet::Connect(connect));
    }

    #[test]
    fn test_connect_310_client_id_length() {
        let err = Packet::Connect(Connect::new("")).to_bytes().unwrap_err();
        assert!(matches!(err, Error::ClientIdLength { len: 0, min: 1, max: 23 }));

        let err = Packet::Connect(Connect::new("x".repeat(24))).to_bytes().unwrap_err();
        assert!(matches!(err, Error::ClientIdLength { len: 24, .. }));
    }

    #[test]
    fn test_connect_with_will() {
        let bytes = b"\x10\x24\x00\x06MQIsdp\x03\x2e\x00\x0f\x00\x08myclient\x00\x05topic\x00\x05hello";
        let will = Will::new("topic", "hello")
            .with_qos(QoS::AtLeastOnce)
            .with_retain(true);
        let connect = Connect::new("myclient").with_will(will);
        assert_mqtt_wire(bytes, &Packet::Connect(connect));
    }

    #[test]
    fn test_connect_will_qos_3() {
        let bytes = b"\x10\x24\x00\x06MQIsdp\x03\x1e\x00\x0f\x00\x08myclient\x00\x05topic\x00\x05hello";
        assert!(matches!(Packet::parse(bytes), Err(Error::InvalidQoS(3))));
    }

    #[test]
    fn test_connect_with_credentials() {
        let bytes = b"\x10\x2a\x00\x06MQIsdp\x03\xc2\x00\x0f\x00\x08myclient\x00\x08username\x00\x08password";
        let connect = Connect::new("myclient").with_credentials("username", "password");
        assert_mqtt_wire(bytes, &Packet::Connect(connect.clone()));
        assert_eq!(
            connect.to_string(),
            "Connect: keep_alive=15, clean, client_id='myclient', username='username', password=..."
        );
    }

    #[test]
    fn test_connect_flag_without_credentials() {
        let bytes = b"\x10\x16\x00\x06MQIsdp\x03\xc2\x00\x0f\x00\x08myclient";
        let Packet::Connect(connect) = Packet::parse(bytes).unwrap() else {
            panic!("expected Connect");
        };
        assert_eq!(connect.username, None);
        assert_eq!(connect.password, None);
    }

    #[test]
    fn test_connect_not_clean_with_keep_alive() {
        let bytes = b"\x10\x16\x00\x06MQIsdp\x03\x00\x00\x0a\x00\x08myclient";
        let connect = Connect::new("myclient")
            .with_clean_session(false)
            .with_keep_alive(10);
        assert_mqtt_wire(bytes, &Packet::Connect(connect));
    }

    #[test]
    fn test_connect_unsupported_protocol() {
        let bytes = b"\x10\x16\x00\x06MQIsdp\x04\x02\x00\x0f\x00\x08myclient";
        let err = Packet::parse(bytes).unwrap_err();
        assert_eq!(err.to_string(), "unsupported protocol: MQIsdp/4");

        let bytes = b"\x10\x14\x00\x04MQTT\x03\x02\x00\x0f\x00\x08myclient";
        assert!(matches!(
            Packet::parse(bytes),
            Err(Error::UnsupportedProtocol { level: 3, .. })
        ));
    }

    #[test]
    fn test_connack() {
        assert_mqtt_wire(b"\x20\x02\x00\x00", &Packet::ConnAck(ConnAck::new(0, false)));
        assert_mqtt_wire(b"\x20\x02\x01\x00", &Packet::ConnAck(ConnAck::new(0, true)));

        let Packet::ConnAck(connack) = Packet::parse(b"\x20\x02\x00\x05").unwrap() else {
            panic!("expected ConnAck");
        };
        assert_eq!(connack.return_message(), "Connection refused: not authorised");
        assert_eq!(connack.to_string(), "Connack: 0x05");
    }

    #[test]
    fn test_connack_reserved_bits() {
        assert!(matches!(
            Packet::parse(b"\x20\x02\xff\x05"),
            Err(Error::InvalidConnAckFlags)
        ));
    }

    #[test]
    fn test_connack_extra_bytes() {
        assert!(matches!(
            Packet::parse(b"\x20\x03\x00\x00\x00"),
            Err(Error::ExtraBytes("CONNACK"))
        ));
    }
}

// ============================================================================
// Tests: MQTT PUBLISH and acknowledgements
// ============================================================================

mod mqtt_publish_tests {
    use super::*;
    use crate::mqtt::{Packet, PubAck, PubComp, PubRec, PubRel, Publish, QoS};

    #[test]
    fn test_publish_qos0() {
        let bytes = b"\x30\x11\x00\x04testhello world";
        let publish = Publish::new("test", "hello world");
        assert_mqtt_wire(bytes, &Packet::Publish(publish.clone()));
        assert_eq!(
            publish.to_string(),
            "Publish: d0, q0, r0, m0, 'test', 'hello world'"
        );
    }

    #[test]
    fn test_publish_qos1() {
        let bytes = b"\x32\x13\x00\x04test\x00\x10hello world";
        let publish = Publish::new("test", "hello world").with_qos(QoS::AtLeastOnce, 0x10);
        assert_mqtt_wire(bytes, &Packet::Publish(publish));
    }

    #[test]
    fn test_publish_qos2_dup_retain() {
        let bytes = b"\x3d\x13\x00\x04test\x00\x05hello world";
        let publish = Publish::new("test", "hello world")
            .with_qos(QoS::ExactlyOnce, 5)
            .with_dup(true)
            .with_retain(true);
        assert_mqtt_wire(bytes, &Packet::Publish(publish));
    }

    #[test]
    fn test_publish_empty_payload() {
        let bytes = b"\x30\x06\x00\x04test";
        assert_mqtt_wire(bytes, &Packet::Publish(Publish::new("test", "")));
    }

    #[test]
    fn test_publish_multibyte_length() {
        let publish = Publish::new("test", vec![0u8; 200]);
        let bytes = Packet::Publish(publish.clone()).to_bytes().unwrap();
        assert_eq!(&bytes[..3], b"\x30\xce\x01");
        assert_eq!(bytes.len(), 3 + 206);
        assert_eq!(Packet::parse(&bytes).unwrap(), Packet::Publish(publish.clone()));
        assert_eq!(
            publish.to_string(),
            "Publish: d0, q0, r0, m0, 'test', ... (200 bytes)"
        );
    }

    #[test]
    fn test_publish_qos3_rejected() {
        let bytes = b"\x36\x11\x00\x04testhello world";
        assert!(matches!(Packet::parse(bytes), Err(Error::InvalidQoS(3))));
    }

    #[test]
    fn test_publish_dup_qos0_rejected() {
        let bytes = b"\x38\x11\x00\x04testhello world";
        assert!(matches!(Packet::parse(bytes), Err(Error::DupWithoutQoS)));
    }

    #[test]
    fn test_publish_length_mismatch() {
        let err = Packet::parse(b"\x30\x15\x00\x04testhello world").unwrap_err();
        assert!(matches!(
            err,
            Error::BodyLengthMismatch { actual: 17, declared: 21 }
        ));
        let message = err.to_string();
        assert!(message.contains("(17)"));
        assert!(message.contains("(21)"));

        assert!(matches!(
            Packet::parse(b"\x30\x0f\x00\x04testhello world"),
            Err(Error::BodyLengthMismatch { actual: 17, declared: 15 })
        ));
    }

    #[test]
    fn test_publish_without_topic() {
        let err = Packet::Publish(Publish::new("", "x")).to_bytes().unwrap_err();
        assert_eq!(err.to_string(), "no topic specified");
    }

    #[test]
    fn test_acks() {
        assert_mqtt_wire(b"\x40\x02\x00\x12", &Packet::PubAck(PubAck::new(0x12)));
        assert_mqtt_wire(b"\x50\x02\x00\x12", &Packet::PubRec(PubRec::new(0x12)));
        assert_mqtt_wire(b"\x62\x02\x00\x12", &Packet::PubRel(PubRel::new(0x12)));
        assert_mqtt_wire(b"\x70\x02\x00\x12", &Packet::PubComp(PubComp::new(0x12)));
        assert_eq!(PubAck::new(0x12).to_string(), "Puback: 0x12");
    }

    #[test]
    fn test_pubrel_flags() {
        assert!(matches!(
            Packet::parse(b"\x60\x02\x00\x12"),
            Err(Error::InvalidFlags("PUBREL"))
        ));
    }

    #[test]
    fn test_puback_extra_bytes() {
        assert!(matches!(
            Packet::parse(b"\x40\x03\x00\x12\x00"),
            Err(Error::ExtraBytes("PUBACK"))
        ));
    }

    #[test]
    fn test_puback_flags_must_be_zero() {
        assert!(matches!(
            Packet::parse(b"\x41\x02\x00\x12"),
            Err(Error::InvalidFlags("PUBACK"))
        ));
    }
}

// ============================================================================
// Tests: MQTT SUBSCRIBE / UNSUBSCRIBE
// ============================================================================

mod mqtt_subscribe_tests {
    use super::*;
    use crate::mqtt::{Packet, QoS, SubAck, Subscribe, UnsubAck, Unsubscribe};

    #[test]
    fn test_subscribe_single() {
        let bytes = b"\x82\x08\x00\x01\x00\x03a/b\x00";
        assert_mqtt_wire(bytes, &Packet::Subscribe(Subscribe::from_topic(1, "a/b")));
    }

    #[test]
    fn test_subscribe_pairs_keep_order() {
        let bytes = b"\x82\x0e\x00\x01\x00\x03c/d\x01\x00\x03a/b\x00";
        let subscribe =
            Subscribe::from_pairs(1, [("c/d", QoS::AtLeastOnce), ("a/b", QoS::AtMostOnce)]);
        assert_mqtt_wire(bytes, &Packet::Subscribe(subscribe));
    }

    #[test]
    fn test_subscribe_map_sorted() {
        let bytes = b"\x82\x0e\x00\x01\x00\x03a/b\x00\x00\x03c/d\x01";
        let map = std::collections::HashMap::from([
            ("c/d".to_string(), QoS::AtLeastOnce),
            ("a/b".to_string(), QoS::AtMostOnce),
        ]);
        let subscribe = Subscribe::from_map(1, map);
        assert_mqtt_wire(bytes, &Packet::Subscribe(subscribe.clone()));
        assert_eq!(subscribe.to_string(), "Subscribe: 0x01, 'a/b':0, 'c/d':1");
    }

    #[test]
    fn test_subscribe_flags() {
        assert!(matches!(
            Packet::parse(b"\x80\x08\x00\x01\x00\x03a/b\x00"),
            Err(Error::InvalidFlags("SUBSCRIBE"))
        ));
    }

    #[test]
    fn test_subscribe_without_topics() {
        let err = Packet::Subscribe(Subscribe::new(1, vec![])).to_bytes().unwrap_err();
        assert_eq!(err.to_string(), "no topics specified");
    }

    #[test]
    fn test_suback() {
        let bytes = b"\x90\x04\x12\x34\x00\x01";
        let suback = SubAck::new(0x1234, vec![0, 1]);
        assert_mqtt_wire(bytes, &Packet::SubAck(suback.clone()));
        assert_eq!(suback.to_string(), "Suback: 0x1234, rc=0x00,0x01");
    }

    #[test]
    fn test_unsubscribe() {
        let bytes = b"\xa2\x07\x00\x05\x00\x03a/b";
        assert_mqtt_wire(bytes, &Packet::Unsubscribe(Unsubscribe::new(5, ["a/b"])));

        assert!(matches!(
            Packet::parse(b"\xa0\x07\x00\x05\x00\x03a/b"),
            Err(Error::InvalidFlags("UNSUBSCRIBE"))
        ));
    }

    #[test]
    fn test_unsuback() {
        assert_mqtt_wire(b"\xb0\x02\x00\x05", &Packet::UnsubAck(UnsubAck::new(5)));
    }
}

// ============================================================================
// Tests: MQTT framing
// ============================================================================

mod mqtt_framing_tests {
    use super::*;
    use crate::mqtt::{Packet, PacketType, Publish};

    #[test]
    fn test_empty_body_packets() {
        assert_mqtt_wire(b"\xc0\x00", &Packet::PingReq);
        assert_mqtt_wire(b"\xd0\x00", &Packet::PingResp);
        assert_mqtt_wire(b"\xe0\x00", &Packet::Disconnect);

        assert!(matches!(
            Packet::parse(b"\xc0\x01\x00"),
            Err(Error::ExtraBytes("PINGREQ"))
        ));
    }

    #[test]
    fn test_invalid_packet_type() {
        let err = Packet::parse(b"\x00\x00").unwrap_err();
        assert_eq!(err.to_string(), "invalid packet type identifier: 0");
        assert!(matches!(
            Packet::parse(b"\xf0\x00"),
            Err(Error::InvalidPacketType(15))
        ));
    }

    #[test]
    fn test_too_short() {
        assert!(matches!(Packet::parse(b"\x30"), Err(Error::TooShort)));
        assert!(matches!(Packet::parse(b""), Err(Error::TooShort)));
    }

    #[test]
    fn test_length_header_errors() {
        assert!(matches!(
            Packet::parse(b"\x30\xff"),
            Err(Error::IncompleteLength)
        ));
        assert!(matches!(
            Packet::parse(b"\x30\xff\xff\xff\xff\x01"),
            Err(Error::MalformedLength)
        ));
    }

    #[test]
    fn test_read_from_stream() {
        let bytes = b"\x30\x11\x00\x04testhello world\xc0\x00";
        let mut reader = &bytes[..];
        let packet = Packet::read(&mut reader).unwrap();
        assert_eq!(packet, Packet::Publish(Publish::new("test", "hello world")));
        assert_eq!(Packet::read(&mut reader).unwrap(), Packet::PingReq);
        assert!(matches!(Packet::read(&mut reader), Err(Error::UnexpectedEof)));
    }

    #[test]
    fn test_read_truncated() {
        let mut reader = &b"\x30\x11\x00\x04test"[..];
        assert!(matches!(
            Packet::read(&mut reader),
            Err(Error::BodyLengthMismatch { actual: 6, declared: 17 })
        ));

        let mut reader = &b"\x30\x80"[..];
        assert!(matches!(Packet::read(&mut reader), Err(Error::UnexpectedEof)));
    }

    #[test]
    fn test_size_limit() {
        let config = crate::CodecConfig::new().with_max_packet_size(8);
        let bytes = b"\x30\x11\x00\x04testhello world";
        assert!(matches!(
            Packet::parse_with(bytes, &config),
            Err(Error::PacketTooLarge { size: 19, max: 8 })
        ));
        assert!(matches!(
            Packet::read_with(&mut &bytes[..], &config),
            Err(Error::PacketTooLarge { size: 19, max: 8 })
        ));
        assert!(Packet::parse_with(b"\xc0\x00", &config).is_ok());
    }

    #[test]
    fn test_write_to_sink() {
        let mut out = Vec::new();
        Packet::PingReq.write(&mut out).unwrap();
        Packet::Disconnect.write(&mut out).unwrap();
        assert_eq!(out, b"\xc0\x00\xe0\x00");
    }

    #[test]
    fn test_type_accessors() {
        let packet = Packet::Publish(Publish::new("t", "p"));
        assert_eq!(packet.packet_type(), PacketType::Publish);
        assert_eq!(packet.type_id(), 3);
        assert_eq!(packet.type_name(), "PUBLISH");
        assert_eq!(Packet::PingResp.type_name(), "PINGRESP");
    }
}

// ============================================================================
// Tests: MQTT-SN packets
// ============================================================================

mod sn_packet_tests {
    use super::*;
    use crate::sn::{
        Advertise, ConnAck, Connect, Disconnect, Flags, GwInfo, Packet, PingReq, PubAck, Publish,
        QoS, RegAck, Register, SearchGw, SubAck, Subscribe, TopicId, TopicIdType, UnsubAck,
        Unsubscribe, WillMsg, WillMsgResp, WillMsgUpd, WillTopic, WillTopicResp, WillTopicUpd,
    };

    #[test]
    fn test_connect() {
        let bytes = b"\x0e\x04\x04\x01\x00\x0fmyclient";
        assert_sn_wire(bytes, &Packet::Connect(Connect::new("myclient")));
    }

    #[test]
    fn test_connect_unsupported_protocol_id() {
        let err = Packet::parse(b"\x0e\x04\x04\x02\x00\x0fmyclient").unwrap_err();
        assert!(matches!(err, Error::UnsupportedProtocolId(2)));
    }

    #[test]
    fn test_connack() {
        assert_sn_wire(b"\x03\x05\x00", &Packet::ConnAck(ConnAck::new(0)));
        let Packet::ConnAck(connack) = Packet::parse(b"\x03\x05\x01").unwrap() else {
            panic!("expected ConnAck");
        };
        assert_eq!(connack.return_message(), "Rejected: congestion");
    }

    #[test]
    fn test_publish_normal_topic_id() {
        let bytes = b"\x12\x0C\x00\x00\x01\x00\x00Hello World";
        assert_sn_wire(bytes, &Packet::Publish(Publish::new(TopicId::Id(1), "Hello World")));
    }

    #[test]
    fn test_publish_short_topic() {
        let bytes = b"\x0c\x0c\x22tt\x00\x02Hello";
        let publish = Publish {
            flags: Flags::default()
                .with_qos(QoS::AtLeastOnce)
                .with_topic_id_type(TopicIdType::Short),
            topic_id: TopicId::short("tt").unwrap(),
            msg_id: 2,
            data: "Hello".into(),
        };
        assert_sn_wire(bytes, &Packet::Publish(publish));
    }

    #[test]
    fn test_short_topic_integer_equivalence() {
        let by_name = TopicId::short("tt").unwrap();
        let by_value = TopicId::decode(0x7474, TopicIdType::Short);
        assert_eq!(by_name, by_value);
        assert_eq!(by_value.as_u16(), 0x7474);
        assert_eq!(by_value.to_string(), "'tt'");
    }

    #[test]
    fn test_publish_qos_no_connection() {
        let bytes = b"\x0c\x0c\x61\x00\x01\x00\x00Hello";
        let Packet::Publish(publish) = Packet::parse(bytes).unwrap() else {
            panic!("expected Publish");
        };
        assert_eq!(publish.flags.qos, QoS::NoConnection);
        assert_eq!(publish.flags.qos.as_i8(), -1);
        assert_eq!(publish.flags.topic_id_type, TopicIdType::Predefined);
        assert_eq!(&Packet::Publish(publish).to_bytes().unwrap()[..], bytes);
    }

    #[test]
    fn test_publish_reserved_topic_id_type_round_trip() {
        let bytes = b"\x12\x0C\x03\x00\x10\x55\xccHello World";
        let packet = Packet::parse(bytes).unwrap();
        assert_eq!(&packet.to_bytes().unwrap()[..], bytes);
    }

    #[test]
    fn test_publish_topic_id_type_mismatch() {
        let publish = Publish {
            flags: Flags::default().with_topic_id_type(TopicIdType::Predefined),
            topic_id: TopicId::short("tt").unwrap(),
            ..Default::default()
        };
        let err = Packet::Publish(publish).to_bytes().unwrap_err();
        assert_eq!(err.to_string(), "topic_id must be an Integer for type predefined");

        let publish = Publish {
            flags: Flags::default().with_topic_id_type(TopicIdType::Short),
            topic_id: TopicId::Id(1),
            ..Default::default()
        };
        let err = Packet::Publish(publish).to_bytes().unwrap_err();
        assert_eq!(err.to_string(), "topic_id must be a String for type short");
    }

    #[test]
    fn test_puback() {
        let bytes = b"\x07\x0d\x00\x01\x00\x02\x00";
        assert_sn_wire(bytes, &Packet::PubAck(PubAck::new(1, 2, 0)));
    }

    #[test]
    fn test_register_and_regack() {
        assert_sn_wire(
            b"\x0a\x0a\x00\x00\x00\x01test",
            &Packet::Register(Register::new(0, 1, "test")),
        );
        assert_sn_wire(
            b"\x07\x0b\x00\x01\x00\x01\x00",
            &Packet::RegAck(RegAck::new(1, 1, 0)),
        );
    }

    #[test]
    fn test_subscribe_topic_forms() {
        assert_sn_wire(
            b"\x09\x12\x00\x00\x01test",
            &Packet::Subscribe(Subscribe::new(1, "test")),
        );
        assert_sn_wire(
            b"\x07\x12\x01\x00\x01\x00\x10",
            &Packet::Subscribe(Subscribe::predefined(1, 0x10)),
        );
        assert_sn_wire(
            b"\x07\x12\x02\x00\x04TT",
            &Packet::Subscribe(Subscribe::short(4, "TT").unwrap()),
        );
    }

    #[test]
    fn test_suback() {
        let bytes = b"\x08\x13\x20\x00\x01\x00\x02\x00";
        let suback = SubAck {
            flags: Flags::default().with_qos(QoS::AtLeastOnce),
            topic_id: TopicId::Id(1),
            msg_id: 2,
            return_code: 0,
        };
        assert_sn_wire(bytes, &Packet::SubAck(suback));
    }

    #[test]
    fn test_unsubscribe_and_unsuback() {
        assert_sn_wire(
            b"\x09\x14\x00\x00\x02test",
            &Packet::Unsubscribe(Unsubscribe::new(2, "test")),
        );
        assert_sn_wire(b"\x04\x15\x00\x02", &Packet::UnsubAck(UnsubAck::new(2)));
    }

    #[test]
    fn test_ping_and_disconnect() {
        assert_sn_wire(b"\x02\x16", &Packet::PingReq(PingReq::default()));
        assert_sn_wire(
            b"\x08\x16sleepy",
            &Packet::PingReq(PingReq {
                client_id: Some("sleepy".into()),
            }),
        );
        assert_sn_wire(b"\x02\x17", &Packet::PingResp);
        assert_sn_wire(b"\x02\x18", &Packet::Disconnect(Disconnect::default()));
        assert_sn_wire(
            b"\x04\x18\x00\x0a",
            &Packet::Disconnect(Disconnect { duration: Some(10) }),
        );
    }

    #[test]
    fn test_will_packets() {
        assert_sn_wire(b"\x02\x06", &Packet::WillTopicReq);
        assert_sn_wire(b"\x02\x08", &Packet::WillMsgReq);
        assert_sn_wire(
            b"\x07\x07\x30test",
            &Packet::WillTopic(WillTopic {
                flags: Flags::default().with_qos(QoS::AtLeastOnce).with_retain(true),
                topic_name: Some("test".into()),
            }),
        );
        assert_sn_wire(b"\x02\x07", &Packet::WillTopic(WillTopic::default()));
        assert_sn_wire(b"\x05\x09msg", &Packet::WillMsg(WillMsg::new("msg")));
        assert_sn_wire(
            b"\x07\x1a\x40test",
            &Packet::WillTopicUpd(WillTopicUpd {
                flags: Flags::default().with_qos(QoS::ExactlyOnce),
                topic_name: Some("test".into()),
            }),
        );
        assert_sn_wire(b"\x05\x1cmsg", &Packet::WillMsgUpd(WillMsgUpd::new("msg")));
        assert_sn_wire(b"\x03\x1b\x00", &Packet::WillTopicResp(WillTopicResp::new(0)));
        assert_sn_wire(b"\x03\x1d\x00", &Packet::WillMsgResp(WillMsgResp::new(0)));
    }

    #[test]
    fn test_gateway_discovery() {
        assert_sn_wire(
            b"\x05\x00\x05\x00\x3c",
            &Packet::Advertise(Advertise {
                gateway_id: 5,
                duration: 60,
            }),
        );
        assert_sn_wire(b"\x03\x01\x01", &Packet::SearchGw(SearchGw::default()));
        assert_sn_wire(b"\x03\x02\x05", &Packet::GwInfo(GwInfo {
            gateway_id: 5,
            gateway_address: None,
        }));
        assert_sn_wire(
            b"\x07\x02\x05\x7f\x00\x00\x01",
            &Packet::GwInfo(GwInfo {
                gateway_id: 5,
                gateway_address: Some(vec![127, 0, 0, 1].into()),
            }),
        );
    }
}

// ============================================================================
// Tests: MQTT-SN framing
// ============================================================================

mod sn_framing_tests {
    use super::*;
    use crate::sn::{Packet, PacketType, Publish, TopicId};

    #[test]
    fn test_names_must_be_utf8() {
        assert!(matches!(Packet::parse(b"\x04\x16\xff\xfe"), Err(Error::InvalidUtf8)));
        assert!(matches!(
            Packet::parse(b"\x07\x12\x00\x00\x01\xc3\x28"),
            Err(Error::InvalidUtf8)
        ));
    }

    #[test]
    fn test_length_mismatch() {
        let err = Packet::parse(b"\x13\x0C\x00\x00\x01\x00\x00Hello World").unwrap_err();
        assert!(matches!(err, Error::LengthMismatch { actual: 18, declared: 19 }));
        assert_eq!(
            err.to_string(),
            "length of packet (18) is not the same as the length header (19)"
        );
    }

    #[test]
    fn test_invalid_packet_type() {
        assert!(matches!(
            Packet::parse(b"\x02\x03"),
            Err(Error::InvalidPacketType(3))
        ));
        assert!(matches!(
            Packet::parse(b"\x02\xff"),
            Err(Error::InvalidPacketType(0xff))
        ));
    }

    #[test]
    fn test_long_length_header() {
        let publish = Publish::new(TopicId::Id(1), vec![b'x'; 1104]);
        let bytes = Packet::Publish(publish.clone()).to_bytes().unwrap();
        assert_eq!(&bytes[..4], b"\x01\x04\x59\x0c");
        assert_eq!(bytes.len(), 1113);
        assert_eq!(Packet::parse(&bytes).unwrap(), Packet::Publish(publish));
    }

    #[test]
    fn test_long_length_header_mismatch() {
        let mut bytes = b"\x01\x00\x10\x0c".to_vec();
        bytes.extend_from_slice(b"\x00\x00\x01\x00\x00");
        assert!(matches!(
            Packet::parse(&bytes),
            Err(Error::LengthMismatch { actual: 9, declared: 16 })
        ));
    }

    #[test]
    fn test_body_too_large() {
        let data = "Hello World".repeat(6553);
        let publish = Publish::new(TopicId::Id(1), data);
        let err = Packet::Publish(publish).to_bytes().unwrap_err();
        assert!(matches!(err, Error::BodyTooLarge { max: 65_531, .. }));
    }

    #[test]
    fn test_read_from_stream() {
        let bytes = b"\x12\x0C\x00\x00\x01\x00\x00Hello World\x02\x17";
        let mut reader = &bytes[..];
        let packet = Packet::read(&mut reader).unwrap();
        assert_eq!(packet.type_name(), "PUBLISH");
        assert_eq!(Packet::read(&mut reader).unwrap(), Packet::PingResp);
        assert!(matches!(Packet::read(&mut reader), Err(Error::UnexpectedEof)));
    }

    #[test]
    fn test_read_truncated() {
        let mut reader = &b"\x12\x0C\x00\x00\x01\x00\x00Hello"[..];
        assert!(matches!(
            Packet::read(&mut reader),
            Err(Error::LengthMismatch { actual: 12, declared: 18 })
        ));
    }

    #[test]
    fn test_type_accessors() {
        let packet = Packet::Publish(Publish::new(TopicId::Id(1), "x"));
        assert_eq!(packet.packet_type(), PacketType::Publish);
        assert_eq!(packet.type_id(), 0x0C);
        assert_eq!(Packet::WillMsgReq.type_name(), "WILLMSGREQ");
        assert_eq!(Packet::WillMsgReq.to_string(), "Willmsgreq");
    }
}
