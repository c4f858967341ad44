//! Release directory rendering and upload guards.

use pyrelease::builder::{Builder, Repository};
use pyrelease::config::ReleaseConfig;
use pyrelease::metadata::PyPackage;
use pyrelease::userdata::UserInfo;
use pyrelease::ReleaseError;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

fn fixtures() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("tests").join("fixtures")
}

/// Copy a fixture file or directory into a fresh temp dir.
fn staged(name: &str) -> (TempDir, PathBuf) {
    let dir = tempfile::tempdir().unwrap();
    let from = fixtures().join(name);
    let to = dir.path().join(name);
    if from.is_dir() {
        for entry in walkdir::WalkDir::new(&from) {
            let entry = entry.unwrap();
            let dest = to.join(entry.path().strip_prefix(&from).unwrap());
            if entry.file_type().is_dir() {
                std::fs::create_dir_all(&dest).unwrap();
            } else {
                std::fs::copy(entry.path(), &dest).unwrap();
            }
        }
    } else {
        std::fs::copy(&from, &to).unwrap();
    }
    (dir, to)
}

fn builder_for(name: &str) -> (TempDir, Builder) {
    let (dir, target) = staged(name);
    let package =
        PyPackage::inspect(&target, &ReleaseConfig::default(), UserInfo::default()).unwrap();
    let out = dir.path().join("release");
    let builder = Builder::new(package, Some(&out), ReleaseConfig::default()).unwrap();
    (dir, builder)
}

#[tokio::test]
async fn make_all_writes_every_file() {
    let (_dir, builder) = builder_for("base_test.py");

    let written = builder.make_all().await.unwrap();
    let names: Vec<_> = written
        .iter()
        .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
        .collect();
    assert_eq!(
        names,
        vec!["README.rst", "LICENSE.md", "MANIFEST.in", "requirements.txt", "setup.py", "base_test.py"]
    );
    for path in &written {
        assert!(path.is_file(), "{} missing", path.display());
    }

    let build_dir = builder.build_dir();
    let setup = std::fs::read_to_string(build_dir.join("setup.py")).unwrap();
    assert!(setup.contains("name='base_test',"));
    assert!(setup.contains("version='0.1.1',"));
    assert!(setup.contains("description='Greeter says hello from the command line',"));
    assert!(setup.contains("py_modules=['base_test'],"));
    assert!(setup.contains("install_requires=['click', 'requests'],"));
    assert!(setup.contains("'base_test=base_test:main',"));
    assert!(setup.contains("'License :: OSI Approved :: BSD License',"));

    let requirements = std::fs::read_to_string(build_dir.join("requirements.txt")).unwrap();
    assert_eq!(requirements, "click\nrequests\n");

    let manifest = std::fs::read_to_string(build_dir.join("MANIFEST.in")).unwrap();
    assert!(manifest.contains("include README.rst"));
    assert!(!manifest.contains("recursive-include data"));

    let license = std::fs::read_to_string(build_dir.join("LICENSE.md")).unwrap();
    assert!(license.contains("BSD"));

    let readme = std::fs::read_to_string(build_dir.join("README.rst")).unwrap();
    assert!(readme.starts_with("base_test\n========="));
    assert!(readme.contains("pip install base_test"));
}

#[tokio::test]
async fn library_module_has_no_console_script() {
    let (_dir, builder) = builder_for("no_main.py");
    let setup = builder.build_setup().await.unwrap();
    assert!(!setup.contains("entry_points"));
    assert!(builder.build_dir().join("setup.py").is_file());
}

#[tokio::test]
async fn data_folder_is_shipped() {
    let (_dir, builder) = builder_for("helloworld");
    builder.make_all().await.unwrap();

    let build_dir = builder.build_dir();
    assert!(build_dir.join("data").join("greeting.yaml").is_file());
    let manifest = std::fs::read_to_string(build_dir.join("MANIFEST.in")).unwrap();
    assert!(manifest.contains("recursive-include data *"));
    let requirements = std::fs::read_to_string(build_dir.join("requirements.txt")).unwrap();
    assert_eq!(requirements, "pyyaml\n");
}

#[tokio::test]
async fn confirmed_metadata_is_written_to_the_copy() {
    let (_dir, mut builder) = builder_for("helloworld");
    builder.package_mut().set_version("0.2.0").unwrap();
    builder.package_mut().set_license(Some("gpl-3")).unwrap();
    let source = builder.package().target_file.clone();

    builder.create_build_dir().await.unwrap();
    let copy = builder.build_package().await.unwrap();

    let text = std::fs::read_to_string(copy).unwrap();
    assert!(text.contains("__version__ = \"0.2.0\"  # bump me"));
    assert!(text.contains("__license__ = \"GPL-3\""));
    assert!(text.contains("__author__ = \"Hello Author\""));

    let original = std::fs::read_to_string(source).unwrap();
    assert!(original.contains("__version__ = \"0.1.1\""));
}

#[tokio::test]
async fn packages_are_rejected() {
    let (_dir, builder) = builder_for("pkg_example");
    let err = builder.make_all().await.unwrap_err();
    assert!(matches!(err, ReleaseError::Unsupported(_)));
}

#[test]
fn default_build_dir_is_name_and_version() {
    let (_dir, target) = staged("base_test.py");
    let package =
        PyPackage::inspect(&target, &ReleaseConfig::default(), UserInfo::default()).unwrap();
    let builder = Builder::new(package, None, ReleaseConfig::default()).unwrap();

    assert!(builder.build_dir().is_absolute());
    assert!(builder.build_dir().ends_with("base_test.0.1.1"));
}

#[tokio::test]
async fn upload_without_pypirc_is_blocked() {
    let (_dir, mut builder) = builder_for("base_test.py");
    assert_eq!(builder.repository(), Repository::PyPi);

    let code = builder.upload(Repository::PyPi).await.unwrap();
    assert_eq!(code, None);
    assert!(!builder.success());
    assert!(builder.errors()[0].contains(".pypirc"));
}

#[tokio::test]
async fn test_upload_needs_distributions() {
    let (_dir, mut builder) = builder_for("base_test.py");
    builder.set_use_test_server(true);
    builder.make_all().await.unwrap();

    let code = builder.upload(builder.repository()).await.unwrap();
    assert_eq!(code, None);
    assert!(builder.errors()[0].contains("No distributions"));
    assert!(builder.artifacts().await.unwrap().is_empty());
}

#[test]
fn exit_codes_are_explained() {
    let (_dir, mut builder) = builder_for("base_test.py");
    builder.parse_response(0);
    assert!(builder.success());

    for code in [127, 400, 401, 2] {
        builder.parse_response(code);
    }
    let errors = builder.errors();
    assert_eq!(errors.len(), 4);
    assert!(errors[0].contains("Twine not installed"));
    assert!(errors[1].contains("upgrade version"));
    assert!(errors[2].contains("Invalid login"));
}

#[test]
fn configured_commands_resolve_python() {
    let (dir, target) = staged("base_test.py");
    let package =
        PyPackage::inspect(&target, &ReleaseConfig::default(), UserInfo::default()).unwrap();
    let config = ReleaseConfig::from_toml("[build]\ncommands = [\"python -m build\"]\n").unwrap();
    let builder = Builder::new(package, Some(dir.path()), config).unwrap();

    let commands = builder.commands().unwrap();
    assert_eq!(commands.len(), 1);
    assert_eq!(commands[0].args, vec!["-m", "build"]);
    assert_ne!(commands[0].program, "");
}

#[cfg(unix)]
#[tokio::test]
async fn failing_build_command_is_recorded() {
    let (dir, target) = staged("base_test.py");
    let package =
        PyPackage::inspect(&target, &ReleaseConfig::default(), UserInfo::default()).unwrap();
    let config = ReleaseConfig::from_toml("[build]\ncommands = [\"false\"]\n").unwrap();
    let mut builder = Builder::new(package, Some(&dir.path().join("release")), config).unwrap();
    builder.create_build_dir().await.unwrap();

    builder.build_distros().await.unwrap();
    assert!(!builder.success());
    assert_eq!(builder.errors().len(), 1);
    assert!(builder.errors()[0].contains("Build command failed: false"));
}
