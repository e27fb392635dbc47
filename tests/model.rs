use flowagg::model::{Flow, FlowKey, FlowUsage};

#[test]
fn deserializes_flattened_json() -> anyhow::Result<()> {
    let got: Flow = serde_json::from_str(
        r#"{
            "src_app": "foo",
            "dest_app": "bar",
            "vpc_id": "vpc-0",
            "bytes_tx": 100,
            "bytes_rx": 500,
            "hour": 1
        }"#,
    )?;
    assert_eq!(got, Flow::new("vpc-0", "foo", "bar", 1, 100, 500));
    Ok(())
}

#[test]
fn serializes_with_wire_names() -> anyhow::Result<()> {
    let value = serde_json::to_value(Flow::new("vpc-0", "foo", "bar", 1, 300, 900))?;
    let want = serde_json::json!({
        "vpc_id": "vpc-0",
        "src_app": "foo",
        "dest_app": "bar",
        "hour": 1,
        "bytes_tx": 300,
        "bytes_rx": 900,
    });
    assert_eq!(value, want);
    Ok(())
}

#[test]
fn survives_the_wire() -> anyhow::Result<()> {
    let flow = Flow::new("vpc-7", "", "sink", u64::MAX, 0, u64::MAX);
    let bytes = serde_json::to_vec(&flow)?;
    let back: Flow = serde_json::from_slice(&bytes)?;
    assert_eq!(back, flow);
    Ok(())
}

#[test]
fn rejects_missing_and_mistyped_fields() {
    let bodies = [
        r#"{"vpc_id":"vpc-0","src_app":"foo","dest_app":"bar","hour":1,"bytes_tx":1}"#,
        r#"{"vpc_id":"vpc-0","src_app":"foo","dest_app":"bar","hour":"1","bytes_tx":1,"bytes_rx":1}"#,
        r#"{"vpc_id":"vpc-0","src_app":"foo","dest_app":"bar","hour":1,"bytes_tx":-1,"bytes_rx":1}"#,
        r#"{"vpc_id":null,"src_app":"foo","dest_app":"bar","hour":1,"bytes_tx":1,"bytes_rx":1}"#,
    ];
    for body in bodies {
        assert!(serde_json::from_str::<Flow>(body).is_err(), "{body}");
    }
}

#[test]
fn keeps_the_given_receive_count() {
    let flow = Flow::new("vpc-0", "foo", "bar", 1, 100, 42);
    assert_eq!(flow.usage(), FlowUsage { bytes_transmitted: 100, bytes_received: 42 });
}

#[test]
fn key_projects_identity() {
    let flow = Flow::new("vpc-0", "foo", "bar", 3, 1, 2);
    let key = FlowKey { network_id: "vpc-0".into(), source_app: "foo".into(), dest_app: "bar".into(), hour: 3 };
    assert_eq!(flow.key(), &key);

    let (k, usage) = flow.clone().into_parts();
    assert_eq!(Flow::from_parts(k, usage), flow);
}

#[test]
fn absorb_adds_and_saturates() {
    let mut usage = FlowUsage { bytes_transmitted: 100, bytes_received: 500 };
    usage.absorb(FlowUsage { bytes_transmitted: 100, bytes_received: 500 });
    assert_eq!(usage, FlowUsage { bytes_transmitted: 200, bytes_received: 1000 });

    usage.absorb(FlowUsage { bytes_transmitted: u64::MAX, bytes_received: 0 });
    assert_eq!(usage, FlowUsage { bytes_transmitted: u64::MAX, bytes_received: 1000 });
}
