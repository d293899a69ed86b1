mod support;

use serde_json::json;

#[tokio::test]
async fn malformed_snapshot_is_dropped_without_breaking_the_session() {
    let addr = support::spawn_server().await;
    let mut client = support::connect_client(&addr).await;
    let mut peer = support::connect_peer(&addr, "rogue").await;

    support::send_json(&mut client, json!({ "type": "Start" })).await;
    support::send_json(
        &mut client,
        json!({
            "type": "Pose",
            "data": {
                "position": { "x": 0.0, "y": 0.0, "z": 0.0 },
                "forward": { "x": 0.0, "y": 0.0, "z": 1.0 }
            }
        }),
    )
    .await;

    // Garbage in: dropped with a log, never a crash or a state change.
    support::send_json(&mut peer, json!("not a snapshot")).await;

    // The world keeps running and never resets from the bad payload.
    support::send_json(&mut client, json!({ "type": "Fire" })).await;
    let spawned = support::wait_for_event(&mut client, |event| {
        event["event"] == "Spawned" && event["data"]["kind"] == "Bullet"
    })
    .await;
    assert!(spawned["data"]["id"].is_string());
}

#[tokio::test]
async fn valid_snapshot_resets_the_world() {
    let addr = support::spawn_server().await;
    let mut client = support::connect_client(&addr).await;
    let mut peer = support::connect_peer(&addr, "buddy").await;

    support::send_json(&mut client, json!({ "type": "Start" })).await;
    support::send_json(
        &mut client,
        json!({
            "type": "Pose",
            "data": {
                "position": { "x": 0.0, "y": 0.0, "z": 0.0 },
                "forward": { "x": 0.0, "y": 0.0, "z": 1.0 }
            }
        }),
    )
    .await;
    // Let some entities exist before the reset.
    support::send_json(&mut client, json!({ "type": "Fire" })).await;
    support::wait_for_event(&mut client, |event| event["event"] == "Spawned").await;

    let snapshot = json!({
        "anchor": {
            "origin": { "x": 1.0, "y": 2.0, "z": 3.0 },
            "orientation": { "x": 0.0, "y": 0.0, "z": 1.0 }
        }
    });
    support::send_json(&mut peer, snapshot).await;

    support::wait_for_event(&mut client, |event| event["event"] == "WorldReset").await;
}

#[tokio::test]
async fn shared_snapshot_reaches_connected_peers() {
    let addr = support::spawn_server().await;
    let mut client = support::connect_client(&addr).await;
    let mut peer = support::connect_peer(&addr, "receiver").await;
    // Give the peer task a moment to register and subscribe.
    tokio::time::sleep(std::time::Duration::from_millis(100)).await;

    support::send_json(&mut client, json!({ "type": "Start" })).await;
    support::send_json(&mut client, json!({ "type": "ShareWorld" })).await;

    // The peer receives the serialized anchor as an opaque blob that decodes
    // to a snapshot.
    let blob = support::next_json(&mut peer).await;
    assert!(blob["anchor"]["origin"]["x"].is_number());
}

#[tokio::test]
async fn share_with_no_peers_is_a_noop() {
    let addr = support::spawn_server().await;
    let mut client = support::connect_client(&addr).await;

    support::send_json(&mut client, json!({ "type": "Start" })).await;
    support::send_json(&mut client, json!({ "type": "ShareWorld" })).await;

    // Server stays healthy; reports keep flowing.
    support::send_json(
        &mut client,
        json!({
            "type": "Pose",
            "data": {
                "position": { "x": 0.0, "y": 0.0, "z": 0.0 },
                "forward": { "x": 0.0, "y": 0.0, "z": 1.0 }
            }
        }),
    )
    .await;
    support::send_json(&mut client, json!({ "type": "Fire" })).await;
    support::wait_for_event(&mut client, |event| {
        event["event"] == "Spawned" && event["data"]["kind"] == "Bullet"
    })
    .await;
}
