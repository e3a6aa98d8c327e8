use std::error::Error;
use std::fs;

use dirmirror::config::{load_and_validate, load_from_path};
use dirmirror::errors::DirmirrorError;

type TestResult = Result<(), Box<dyn Error>>;

#[test]
fn toml_config_parses_groups_and_overrides() -> TestResult {
    let tmp = tempfile::tempdir()?;
    let path = tmp.path().join("Dirmirror.toml");
    fs::write(
        &path,
        r#"
        watch = false
        sync_timeout = 2500

        [dirs.components]
        src = "./components"
        dest = ["../web/components", "../admin/components"]
        "#,
    )?;

    let cfg = load_and_validate(&path)?;

    assert_eq!(cfg.watch, Some(false));
    assert_eq!(cfg.sync_timeout, Some(2500));

    let (name, group) = cfg.groups().next().expect("one group");
    assert_eq!(name, "components");
    assert_eq!(group.src, "./components");
    assert_eq!(group.dest.paths().len(), 2);

    Ok(())
}

#[test]
fn json_config_is_selected_by_extension() -> TestResult {
    let tmp = tempfile::tempdir()?;
    let path = tmp.path().join("sync.config.json");
    fs::write(
        &path,
        r#"{
            "dirs": {
                "components": { "src": "./components", "dest": "../web/components" }
            },
            "syncTimeout": 500
        }"#,
    )?;

    let cfg = load_and_validate(&path)?;

    assert_eq!(cfg.sync_timeout, Some(500));
    assert_eq!(cfg.groups().count(), 1);

    Ok(())
}

#[test]
fn missing_config_file_is_config_not_found() {
    let err = load_from_path("/definitely/not/here/Dirmirror.toml").unwrap_err();
    assert!(matches!(err, DirmirrorError::ConfigNotFound(_)));
}

#[test]
fn malformed_group_entry_is_config_invalid() -> TestResult {
    let tmp = tempfile::tempdir()?;
    let path = tmp.path().join("bad.json");
    fs::write(&path, r#"{ "dirs": { "components": "not a group" } }"#)?;

    let err = load_and_validate(&path).unwrap_err();
    assert!(matches!(err, DirmirrorError::ConfigInvalid(_)));

    Ok(())
}

#[test]
fn unparseable_toml_surfaces_a_parse_error() -> TestResult {
    let tmp = tempfile::tempdir()?;
    let path = tmp.path().join("broken.toml");
    fs::write(&path, "this is not toml [")?;

    let err = load_from_path(&path).unwrap_err();
    assert!(matches!(err, DirmirrorError::Toml(_)));

    Ok(())
}
