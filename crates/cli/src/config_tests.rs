use std::io::Write;

use super::*;

fn no_machine_id() -> Result<String> {
    bail!("machine-id must not be read")
}

#[test]
fn test_flags_override_file() {
    let overrides = Overrides {
        url: Some("http://flag.example".to_string()),
        group: Some("flag-group".to_string()),
        ..Overrides::default()
    };
    let file = FileConfig {
        url: Some("http://file.example".to_string()),
        group: Some("file-group".to_string()),
        id: Some("file-node".to_string()),
        timeout_secs: Some(5),
    };

    let settings = Settings::merge(overrides, file, no_machine_id).unwrap();

    assert_eq!(settings.url, "http://flag.example");
    assert_eq!(settings.group, "flag-group");
    assert_eq!(settings.id, "file-node");
    assert_eq!(settings.timeout, Some(Duration::from_secs(5)));
}

#[test]
fn test_defaults_apply_when_unset() {
    let overrides = Overrides {
        url: Some("http://lock.example".to_string()),
        id: Some("node-1".to_string()),
        ..Overrides::default()
    };

    let settings = Settings::merge(overrides, FileConfig::default(), no_machine_id).unwrap();

    assert_eq!(settings.group, DEFAULT_GROUP);
    assert_eq!(settings.timeout, Some(DEFAULT_TIMEOUT));
}

#[test]
fn test_zero_timeout_disables_it() {
    let overrides = Overrides {
        url: Some("http://lock.example".to_string()),
        id: Some("node-1".to_string()),
        timeout_secs: Some(0),
        ..Overrides::default()
    };

    let settings = Settings::merge(overrides, FileConfig::default(), no_machine_id).unwrap();
    assert_eq!(settings.timeout, None);
}

#[test]
fn test_missing_url_is_an_error() {
    let overrides = Overrides {
        id: Some("node-1".to_string()),
        ..Overrides::default()
    };

    let err = Settings::merge(overrides, FileConfig::default(), no_machine_id).unwrap_err();
    assert!(err.to_string().contains("URL"));
}

#[test]
fn test_machine_id_fallback() {
    let overrides = Overrides {
        url: Some("http://lock.example".to_string()),
        ..Overrides::default()
    };

    let settings = Settings::merge(overrides, FileConfig::default(), || {
        Ok("4c4c4544004e".to_string())
    })
    .unwrap();
    assert_eq!(settings.id, "4c4c4544004e");
}

#[test]
fn test_read_machine_id_trims_newline() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(file, "0123456789abcdef0123456789abcdef").unwrap();

    let id = read_machine_id(file.path()).unwrap();
    assert_eq!(id, "0123456789abcdef0123456789abcdef");
}

#[test]
fn test_read_machine_id_rejects_empty_file() {
    let file = tempfile::NamedTempFile::new().unwrap();
    assert!(read_machine_id(file.path()).is_err());
}

#[test]
fn test_file_config_loads_toml() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    write!(
        file,
        r#"
url = "https://fleetlock.example/"
group = "workers"
timeout_secs = 12
"#
    )
    .unwrap();

    let config = FileConfig::load(file.path()).unwrap();
    assert_eq!(
        config,
        FileConfig {
            url: Some("https://fleetlock.example/".to_string()),
            group: Some("workers".to_string()),
            id: None,
            timeout_secs: Some(12),
        }
    );
}

#[test]
fn test_file_config_rejects_unknown_keys() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    write!(file, "server = \"http://typo.example\"\n").unwrap();

    assert!(FileConfig::load(file.path()).is_err());
}

#[test]
fn test_resolve_reads_config_file() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    write!(file, "url = \"http://file.example\"\nid = \"node-9\"\n").unwrap();

    let settings = Settings::resolve(Overrides {
        config: Some(file.path().to_path_buf()),
        ..Overrides::default()
    })
    .unwrap();

    assert_eq!(settings.url, "http://file.example");
    assert_eq!(settings.id, "node-9");
}
