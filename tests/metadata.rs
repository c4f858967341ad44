//! Metadata inference against the Python fixtures.

use pyrelease::config::ReleaseConfig;
use pyrelease::metadata::{License, PyPackage, SAVE_FILE_NAME};
use pyrelease::source::TargetKind;
use pyrelease::userdata::UserInfo;
use pyrelease::ReleaseError;
use std::path::{Path, PathBuf};

fn fixture(name: &str) -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(name)
}

fn inspect(name: &str) -> PyPackage {
    PyPackage::inspect(&fixture(name), &ReleaseConfig::default(), UserInfo::default()).unwrap()
}

#[test]
fn base_test_metadata() {
    let package = inspect("base_test.py");

    assert_eq!(package.name, "base_test");
    assert_eq!(package.module_name, "base_test");
    assert_eq!(package.version.as_deref(), Some("0.1.1"));
    assert_eq!(package.license.as_deref(), Some("BSD-2"));
    assert_eq!(package.resolved_license(), License::Bsd2);
    assert_eq!(package.description, "Greeter says hello from the command line");
    assert_eq!(package.requirements, vec!["click", "requests"]);
    assert!(package.is_script);
    assert!(package.is_single_file());
    assert_eq!(package.url(), "https://pypi.org/project/base_test/");
}

#[test]
fn missing_meta_is_left_unset() {
    let package = inspect("no_meta.py");

    assert_eq!(package.version, None);
    assert_eq!(package.license, None);
    assert_eq!(package.resolved_license(), License::Mit);
    assert_eq!(package.description, "");
    assert!(package.requirements.is_empty());
    assert!(package.is_script);
    assert_eq!(package.author, None);
}

#[test]
fn no_main_is_not_a_script() {
    let package = inspect("no_main.py");
    assert!(!package.is_script);
    assert_eq!(package.version.as_deref(), Some("0.1.1"));
}

#[test]
fn directory_target_with_data_folder() {
    let package = inspect("helloworld");

    assert_eq!(package.target_file, fixture("helloworld").join("helloworld.py"));
    assert_eq!(package.description, "My hello world application");
    assert_eq!(package.requirements, vec!["pyyaml"]);
    assert_eq!(package.author.as_deref(), Some("Hello Author"));
    assert_eq!(package.author_email.as_deref(), Some("hello@example.com"));
    assert!(package.is_data_files());
    assert!(!package.is_docs());
}

#[test]
fn init_file_is_a_package() {
    let package = inspect("pkg_example");
    assert_eq!(package.kind, TargetKind::Package);
    assert_eq!(package.module_name, "pkg_example");
    assert!(!package.is_single_file());
}

#[test]
fn missing_target_is_invalid() {
    let err = PyPackage::inspect(
        &fixture("does_not_exist.py"),
        &ReleaseConfig::default(),
        UserInfo::default(),
    )
    .unwrap_err();
    assert!(matches!(err, ReleaseError::InvalidPackage { .. }));
}

#[test]
fn author_falls_back_to_user_config() {
    let home = tempfile::tempdir().unwrap();
    std::fs::write(
        home.path().join(".gitconfig"),
        "[user]\n\tname = Git User\n\temail = git@example.com\n",
    )
    .unwrap();

    let package = PyPackage::inspect(
        &fixture("base_test.py"),
        &ReleaseConfig::default(),
        UserInfo::from_home(home.path()),
    )
    .unwrap();
    assert_eq!(package.author.as_deref(), Some("Git User"));
    assert_eq!(package.author_email.as_deref(), Some("git@example.com"));
}

#[test]
fn ignored_and_converted_dependencies_follow_config() {
    let config = ReleaseConfig::from_toml(
        "[dependencies]\nignore = [\"click\"]\nconversions = { requests = \"requests[socks]\" }\n",
    )
    .unwrap();
    let package =
        PyPackage::inspect(&fixture("base_test.py"), &config, UserInfo::default()).unwrap();
    assert_eq!(package.requirements, vec!["requests[socks]"]);
}

#[test]
fn edits_are_validated() {
    let mut package = inspect("base_test.py");

    assert!(matches!(
        package.set_version("0.1.0"),
        Err(ReleaseError::InvalidVersion { .. })
    ));
    assert_eq!(package.set_version("0.2").unwrap(), "0.2");

    assert_eq!(package.set_name(" base test!").unwrap(), "basetest");
    assert!(package.set_name("!!!").is_err());

    package.set_license(Some("apache-2.0")).unwrap();
    assert_eq!(package.license.as_deref(), Some("APACHE-2"));
    assert!(package.set_license(Some("WTFPL")).is_err());
    package.set_license(Some("None")).unwrap();
    assert_eq!(package.license, None);
}

#[test]
fn release_info_round_trip() {
    let dir = tempfile::tempdir().unwrap();
    let save = dir.path().join(SAVE_FILE_NAME);

    let mut edited = inspect("base_test.py");
    edited.set_version("1.0.0").unwrap();
    edited.author = Some("Saved Author".to_string());
    edited.add_requirements(["rich"]);
    edited.save(&save).unwrap();

    let mut fresh = inspect("base_test.py");
    assert!(fresh.load(&save).unwrap());
    assert_eq!(fresh.version.as_deref(), Some("1.0.0"));
    assert_eq!(fresh.author.as_deref(), Some("Saved Author"));
    assert_eq!(fresh.requirements, vec!["click", "requests", "rich"]);

    std::fs::write(&save, "{ not json").unwrap();
    let mut untouched = inspect("base_test.py");
    assert!(!untouched.load(&save).unwrap());
    assert_eq!(untouched.version.as_deref(), Some("0.1.1"));
}
