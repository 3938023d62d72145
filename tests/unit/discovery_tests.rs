/*!
 * Tests for work discovery
 */

use anyhow::Result;
use std::path::PathBuf;
use doctran::discovery::{self, EligibilityRules};
use doctran::errors::DiscoveryError;
use doctran::paths::LanguagePathMapper;
use crate::common;

/// Test that only eligible files are collected
#[test]
fn test_discover_withMixedFiles_shouldReturnOnlyEligible() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let root = temp_dir.path().join("units").join("en");
    common::create_test_file(&root, "x.mdx", "x")?;
    common::create_test_file(&root, "y.txt", "y")?;
    common::create_test_file(&root, "_toctree.yml", "- title: X")?;

    let files = discovery::discover(&root, &EligibilityRules::default())?;

    assert_eq!(files.len(), 2);
    assert!(files.contains(&root.join("x.mdx")));
    assert!(files.contains(&root.join("_toctree.yml")));

    Ok(())
}

/// Test that nested directories are walked and siblings come out sorted
#[test]
fn test_discover_withNestedTree_shouldWalkRecursivelyInNameOrder() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let root = common::create_test_tree(temp_dir.path())?;

    let files = discovery::discover(&root, &EligibilityRules::default())?;

    assert_eq!(
        files,
        vec![
            root.join("_toctree.yml"),
            root.join("introduction.mdx"),
            root.join("unit1").join("what-are-agents.mdx"),
        ]
    );

    Ok(())
}

/// Test that other yml files are not picked up by the exact-name rule
#[test]
fn test_discover_withOtherYamlFile_shouldIgnoreIt() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let root = temp_dir.path().join("en");
    common::create_test_file(&root, "config.yml", "a: 1")?;
    common::create_test_file(&root, "nested/_toctree.yml", "- title: Nested")?;

    let files = discovery::discover(&root, &EligibilityRules::default())?;

    assert_eq!(files, vec![root.join("nested").join("_toctree.yml")]);

    Ok(())
}

/// Test that an empty root yields no work
#[test]
fn test_discover_withEmptyRoot_shouldReturnEmptyList() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;

    let files = discovery::discover(temp_dir.path(), &EligibilityRules::default())?;

    assert!(files.is_empty());

    Ok(())
}

/// Test that a missing root is a fatal error
#[test]
fn test_discover_withMissingRoot_shouldFail() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let missing = temp_dir.path().join("does-not-exist");

    let result = discovery::discover(&missing, &EligibilityRules::default());

    assert!(matches!(result, Err(DiscoveryError::RootNotFound(path)) if path == missing));

    Ok(())
}

/// Test that extensions differing only in case are not picked up
#[test]
fn test_discover_withUppercaseExtension_shouldSkipFile() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let root = temp_dir.path().join("en");
    common::create_test_file(&root, "intro.mdx", "a")?;
    common::create_test_file(&root, "OUTRO.MDX", "b")?;

    let files = discovery::discover(&root, &EligibilityRules::default())?;

    assert_eq!(files, vec![root.join("intro.mdx")]);

    Ok(())
}

/// Test that custom rules replace the defaults
#[test]
fn test_discover_withCustomRules_shouldUseThem() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let root = temp_dir.path().join("en");
    common::create_test_file(&root, "a.md", "a")?;
    common::create_test_file(&root, "b.MDX", "b")?;
    let rules = EligibilityRules {
        extensions: vec![".md".to_string()],
        file_names: Vec::new(),
    };

    let files = discovery::discover(&root, &rules)?;

    assert_eq!(files, vec![root.join("a.md")]);

    Ok(())
}

/// Test that every discovered file is paired with its mapped destination
#[test]
fn test_discoverWorkItems_withTree_shouldMapDestinations() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let root = common::create_test_tree(temp_dir.path())?;
    let mapper = LanguagePathMapper::new("en", "vi");

    let items = discovery::discover_work_items(&root, &EligibilityRules::default(), &mapper)?;

    let vi_root = temp_dir.path().join("units").join("vi");
    let destinations: Vec<PathBuf> = items.iter().map(|i| i.destination_path.clone()).collect();
    assert_eq!(
        destinations,
        vec![
            vi_root.join("_toctree.yml"),
            vi_root.join("introduction.mdx"),
            vi_root.join("unit1").join("what-are-agents.mdx"),
        ]
    );

    Ok(())
}

/// Test that a source without the language segment aborts discovery
#[test]
fn test_discoverWorkItems_withoutLanguageSegment_shouldFail() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let root = temp_dir.path().join("docs");
    common::create_test_file(&root, "intro.mdx", "x")?;
    let mapper = LanguagePathMapper::new("en", "vi");

    let result = discovery::discover_work_items(&root, &EligibilityRules::default(), &mapper);

    assert!(matches!(result, Err(DiscoveryError::PathMap(_))));

    Ok(())
}

/// Test that two sources claiming one destination are reported
#[test]
fn test_discoverWorkItems_withCollidingDestinations_shouldFail() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let root = temp_dir.path().join("site");
    // en/vi/a.mdx and vi/en/a.mdx both map to vi/vi/a.mdx
    common::create_test_file(&root, "en/vi/a.mdx", "first")?;
    common::create_test_file(&root, "vi/en/a.mdx", "second")?;
    let mapper = LanguagePathMapper::new("en", "vi");

    let result = discovery::discover_work_items(&root, &EligibilityRules::default(), &mapper);

    match result {
        Err(DiscoveryError::DestinationCollision { first, second, destination }) => {
            assert_eq!(first, root.join("en").join("vi").join("a.mdx"));
            assert_eq!(second, root.join("vi").join("en").join("a.mdx"));
            assert_eq!(destination, root.join("vi").join("vi").join("a.mdx"));
        }
        other => panic!("Expected DestinationCollision, got {:?}", other.map(|items| items.len())),
    }

    Ok(())
}
