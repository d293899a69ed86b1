mod support;

use serde_json::json;

#[tokio::test]
async fn join_handshake_assigns_identity() {
    let addr = support::spawn_server().await;
    // connect_client asserts the Identity and Session messages arrive.
    let _ws = support::connect_client(&addr).await;
}

#[tokio::test]
async fn fired_bullet_spawns_along_view_direction() {
    let addr = support::spawn_server().await;
    let mut ws = support::connect_client(&addr).await;

    support::send_json(&mut ws, json!({ "type": "Start" })).await;
    support::send_json(
        &mut ws,
        json!({
            "type": "Pose",
            "data": {
                "position": { "x": 0.0, "y": 0.0, "z": 0.0 },
                "forward": { "x": 0.0, "y": 0.0, "z": 1.0 }
            }
        }),
    )
    .await;
    support::send_json(&mut ws, json!({ "type": "Fire" })).await;

    let spawned = support::wait_for_event(&mut ws, |event| {
        event["event"] == "Spawned" && event["data"]["kind"] == "Bullet"
    })
    .await;

    // Muzzle offset of 0.4 along the +z view direction.
    let position = &spawned["data"]["position"];
    assert!((position["x"].as_f64().unwrap()).abs() < 1e-5);
    assert!((position["y"].as_f64().unwrap()).abs() < 1e-5);
    assert!((position["z"].as_f64().unwrap() - 0.4).abs() < 1e-5);
}

#[tokio::test]
async fn first_base_spawns_in_front_of_player() {
    let addr = support::spawn_server().await;
    let mut ws = support::connect_client(&addr).await;

    support::send_json(&mut ws, json!({ "type": "Start" })).await;
    support::send_json(
        &mut ws,
        json!({
            "type": "Pose",
            "data": {
                "position": { "x": 0.0, "y": 0.0, "z": 0.0 },
                "forward": { "x": 0.0, "y": 0.0, "z": 1.0 }
            }
        }),
    )
    .await;

    let spawned = support::wait_for_event(&mut ws, |event| {
        event["event"] == "Spawned" && event["data"]["kind"] == "Base"
    })
    .await;

    let position = &spawned["data"]["position"];
    assert!((position["z"].as_f64().unwrap() - 3.0).abs() < 1e-5);
}

#[tokio::test]
async fn invalid_pose_values_are_dropped() {
    let addr = support::spawn_server().await;
    let mut ws = support::connect_client(&addr).await;

    support::send_json(&mut ws, json!({ "type": "Start" })).await;
    // JSON has no NaN literal; a null component fails to parse as f32 and
    // counts as an invalid message rather than reaching the simulation.
    support::send_json(
        &mut ws,
        json!({
            "type": "Pose",
            "data": {
                "position": { "x": null, "y": 0.0, "z": 0.0 },
                "forward": { "x": 0.0, "y": 0.0, "z": 1.0 }
            }
        }),
    )
    .await;
    // No pose established: firing stays a silent no-op and the connection
    // keeps receiving tick reports.
    support::send_json(&mut ws, json!({ "type": "Fire" })).await;

    let mut saw_tick = false;
    for _ in 0..20 {
        let msg = support::next_json(&mut ws).await;
        if msg["type"] == "Tick" {
            saw_tick = true;
            break;
        }
    }
    assert!(saw_tick, "tick reports should keep flowing");
}
