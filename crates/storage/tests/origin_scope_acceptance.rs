use storage::{origin_of, Storage};

#[tokio::test]
async fn last_callsign_per_origin_survives_restart_acceptance() {
    let temp_root = tempfile::tempdir().expect("temp dir");
    let db_path = temp_root.path().join("data").join("admit.db");
    let database_url = format!("sqlite://{}", db_path.to_string_lossy().replace('\\', "/"));

    let guide = origin_of("http://127.0.0.1:80/guide/").expect("guide origin");
    let mirror = origin_of("http://127.0.0.1:8080").expect("mirror origin");
    assert_ne!(guide, mirror);

    {
        let storage = Storage::new(&database_url).await.expect("db");
        storage.set_item(&guide, "name", "DL1ABC").await.expect("guide first");
        storage.set_item(&mirror, "name", "OK2XYZ").await.expect("mirror");
        storage.set_item(&guide, "name", "SM5XY").await.expect("guide second");
        storage.pool().close().await;
    }

    let storage = Storage::new(&database_url).await.expect("reopen");
    storage.health_check().await.expect("health");

    let same_origin = origin_of("http://127.0.0.1/morse?name=SM5XY").expect("origin");
    assert_eq!(
        storage.get_item(&same_origin, "name").await.expect("guide").as_deref(),
        Some("SM5XY")
    );
    assert_eq!(
        storage.get_item(&mirror, "name").await.expect("mirror").as_deref(),
        Some("OK2XYZ")
    );
    assert_eq!(storage.keys(&guide).await.expect("keys"), vec!["name"]);
}
