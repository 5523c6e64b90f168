use stlamf_core::error::ConfigError;
use stlamf_core::mesh::MeshSource;
use stlamf_core::profile::{resolve, Profile, ProfileConfig, ProfileValue, ResolveOptions};

fn tokens(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

fn config() -> ProfileConfig {
    [
        Profile::new("dense").with_setting("infill", ProfileValue::Integer(80)),
        Profile::new("sparse").with_setting("infill", ProfileValue::Integer(10)),
    ]
    .into_iter()
    .collect()
}

fn custom() -> ResolveOptions {
    ResolveOptions {
        custom_config: true,
        global_profile: None,
    }
}

#[test]
fn flat_files_without_config_get_no_profile() {
    let assignment = resolve(&tokens(&["a.stl", "b.stl"]), &ResolveOptions::default(), None)
        .expect("assignment");
    assert_eq!(2, assignment.len());
    let sources: Vec<&MeshSource> = assignment.sources().collect();
    assert_eq!(&MeshSource::new(1, "b.stl"), sources[1]);
    assert!(assignment.entries().iter().all(|e| e.profile.is_none()));
}

#[test]
fn interleaved_tokens_pair_files_with_profiles() {
    let cfg = config();
    let assignment = resolve(
        &tokens(&["cube.stl", "dense", "pyramid.stl", "sparse"]),
        &custom(),
        Some(&cfg),
    )
    .expect("assignment");

    let pairs: Vec<(String, String)> = assignment
        .entries()
        .iter()
        .map(|e| {
            (
                e.source.path.display().to_string(),
                e.profile.as_ref().map(|p| p.name.clone()).unwrap_or_default(),
            )
        })
        .collect();
    assert_eq!(
        vec![
            ("cube.stl".to_string(), "dense".to_string()),
            ("pyramid.stl".to_string(), "sparse".to_string()),
        ],
        pairs
    );
    assert_eq!(
        Some(&ProfileValue::Integer(10)),
        assignment
            .profile_for(&MeshSource::new(1, "pyramid.stl"))
            .and_then(|p| p.get("infill"))
    );
}

#[test]
fn odd_token_count_names_the_dangling_file() {
    let cfg = config();
    let err = resolve(
        &tokens(&["cube.stl", "dense", "pyramid.stl"]),
        &custom(),
        Some(&cfg),
    )
    .expect_err("dangling file");
    match err {
        ConfigError::DanglingFileWithoutProfile { file } => assert_eq!("pyramid.stl", file),
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn unknown_profile_is_an_error() {
    let cfg = config();
    let err = resolve(&tokens(&["cube.stl", "Dense"]), &custom(), Some(&cfg))
        .expect_err("lookup is exact");
    assert!(matches!(
        err,
        ConfigError::UnknownProfile { ref profile, ref file } if profile == "Dense" && file == "cube.stl"
    ));
}

#[test]
fn profile_tokens_without_config_are_rejected() {
    let err = resolve(&tokens(&["cube.stl", "dense"]), &custom(), None).expect_err("no config");
    assert!(matches!(err, ConfigError::MissingConfig { .. }));
}

#[test]
fn single_profile_config_applies_to_every_file() {
    let cfg: ProfileConfig = std::iter::once(Profile::new("only")).collect();
    let assignment = resolve(&tokens(&["a.stl", "b.stl"]), &ResolveOptions::default(), Some(&cfg))
        .expect("assignment");
    assert!(assignment
        .entries()
        .iter()
        .all(|e| e.profile.as_ref().map(|p| p.name.as_str()) == Some("only")));
}

#[test]
fn several_profiles_without_selection_apply_none() {
    let cfg = config();
    let assignment = resolve(&tokens(&["a.stl"]), &ResolveOptions::default(), Some(&cfg))
        .expect("assignment");
    assert!(assignment.entries()[0].profile.is_none());
}

#[test]
fn global_profile_applies_to_every_file() {
    let cfg = config();
    let options = ResolveOptions {
        custom_config: false,
        global_profile: Some("sparse".to_string()),
    };
    let assignment =
        resolve(&tokens(&["a.stl", "b.stl"]), &options, Some(&cfg)).expect("assignment");
    assert!(assignment
        .entries()
        .iter()
        .all(|e| e.profile.as_ref().map(|p| p.name.as_str()) == Some("sparse")));

    let missing = ResolveOptions {
        custom_config: false,
        global_profile: Some("medium".to_string()),
    };
    assert!(matches!(
        resolve(&tokens(&["a.stl"]), &missing, Some(&cfg)),
        Err(ConfigError::UnknownProfile { .. })
    ));
}

#[test]
fn no_tokens_is_an_error() {
    let err = resolve(&[], &ResolveOptions::default(), None).expect_err("empty");
    assert!(matches!(err, ConfigError::NoInputFiles));
}
