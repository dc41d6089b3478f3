use std::sync::Mutex;

use tempfile::NamedTempFile;

use viewfinder_core::config::ViewfinderConfig;

static ENV_LOCK: Mutex<()> = Mutex::new(());

fn clear_env() {
    for key in [
        "VIEWFINDER_CONFIG",
        "VIEWFINDER_LISTEN_ADDR",
        "VIEWFINDER_SOURCE_URL",
        "VIEWFINDER_TARGET_FPS",
    ] {
        std::env::remove_var(key);
    }
}

#[test]
fn defaults_match_wire_contract() {
    let _guard = ENV_LOCK.lock().unwrap();
    clear_env();

    let cfg = ViewfinderConfig::load().expect("load config");
    assert_eq!(cfg.listen_addr, "0.0.0.0:8080");
    assert_eq!(cfg.source.url, "stub://viewfinder");
    assert_eq!(cfg.source.target_fps, 10);
    assert_eq!(cfg.source.width, 640);
    assert_eq!(cfg.source.height, 480);
}

#[test]
fn loads_config_from_file_and_env_overrides() {
    let _guard = ENV_LOCK.lock().unwrap();
    clear_env();

    let mut file = NamedTempFile::new().expect("temp config");
    let json = r#"{
        "listen_addr": "0.0.0.0:9000",
        "source": {
            "url": "stub://bench",
            "target_fps": 12,
            "width": 800,
            "height": 600
        }
    }"#;
    std::io::Write::write_all(&mut file, json.as_bytes()).expect("write config");

    std::env::set_var("VIEWFINDER_CONFIG", file.path());
    std::env::set_var("VIEWFINDER_TARGET_FPS", "24");

    let cfg = ViewfinderConfig::load().expect("load config");
    assert_eq!(cfg.listen_addr, "0.0.0.0:9000");
    assert_eq!(cfg.source.url, "stub://bench");
    // Env wins over the file.
    assert_eq!(cfg.source.target_fps, 24);
    assert_eq!(cfg.source.width, 800);
    assert_eq!(cfg.source.height, 600);

    clear_env();
}

#[test]
fn rejects_zero_fps() {
    let _guard = ENV_LOCK.lock().unwrap();
    clear_env();

    std::env::set_var("VIEWFINDER_TARGET_FPS", "0");
    assert!(ViewfinderConfig::load().is_err());
    clear_env();
}

#[test]
fn rejects_unparseable_fps() {
    let _guard = ENV_LOCK.lock().unwrap();
    clear_env();

    std::env::set_var("VIEWFINDER_TARGET_FPS", "fast");
    assert!(ViewfinderConfig::load().is_err());
    clear_env();
}

#[test]
fn rejects_invalid_listen_addr() {
    let _guard = ENV_LOCK.lock().unwrap();
    clear_env();

    std::env::set_var("VIEWFINDER_LISTEN_ADDR", "not-an-address");
    assert!(ViewfinderConfig::load().is_err());
    clear_env();
}
