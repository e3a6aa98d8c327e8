use std::error::Error;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use dirmirror::sync::{build_group, classify, propagate, ChangeKind, Registry};

type TestResult = Result<(), Box<dyn Error>>;

/// Build one group `a -> [b, c]` under `root`, with `x.txt` in the source.
async fn mirror_fixture(root: &Path) -> Result<(Registry, PathBuf, PathBuf, PathBuf), Box<dyn Error>> {
    let src = root.join("a");
    fs::create_dir_all(&src)?;
    fs::write(src.join("x.txt"), "hello")?;

    let dest_b = root.join("b");
    let dest_c = root.join("c");
    let dests = vec![
        dest_b.to_string_lossy().into_owned(),
        dest_c.to_string_lossy().into_owned(),
    ];

    let mut registry = Registry::new();
    build_group(&mut registry, root, &src.to_string_lossy(), &dests).await?;
    Ok((registry, src, dest_b, dest_c))
}

#[tokio::test]
async fn debounce_window_suppresses_all_operations() -> TestResult {
    let tmp = tempfile::tempdir()?;
    let (registry, src, dest_b, _) = mirror_fixture(tmp.path()).await?;

    // The build just marked the group synced, so a large window must swallow
    // this event without touching the filesystem or the timestamp.
    fs::write(src.join("fresh.txt"), "new content")?;
    let change = classify(&registry, &src.join("fresh.txt"), ChangeKind::Updated).unwrap();

    let group = registry.group(&src).unwrap();
    let stamp_before = group.last_synced_ms();
    propagate(group, &change, 60_000).await?;

    assert!(!dest_b.join("fresh.txt").exists());
    assert_eq!(group.last_synced_ms(), stamp_before);

    Ok(())
}

#[tokio::test]
async fn remove_fans_out_and_leaves_trigger_untouched() -> TestResult {
    let tmp = tempfile::tempdir()?;
    let (registry, src, dest_b, dest_c) = mirror_fixture(tmp.path()).await?;

    // Change observed under destination b: its copy is already gone, and the
    // removal must reach the anchor and the other destination.
    fs::remove_file(dest_b.join("x.txt"))?;
    let change = classify(&registry, &dest_b.join("x.txt"), ChangeKind::Removed).unwrap();

    let group = registry.group(&src).unwrap();
    group.mark_synced(0);
    propagate(group, &change, 1000).await?;

    assert!(!src.join("x.txt").exists());
    assert!(!dest_c.join("x.txt").exists());
    assert!(dest_b.exists());

    Ok(())
}

#[tokio::test]
async fn update_from_destination_reaches_anchor_and_other_destinations() -> TestResult {
    let tmp = tempfile::tempdir()?;
    let (registry, src, dest_b, dest_c) = mirror_fixture(tmp.path()).await?;

    fs::write(dest_b.join("x.txt"), "edited in b")?;
    let change = classify(&registry, &dest_b.join("x.txt"), ChangeKind::Updated).unwrap();

    let group = registry.group(&src).unwrap();
    group.mark_synced(0);
    propagate(group, &change, 1000).await?;

    assert_eq!(fs::read_to_string(src.join("x.txt"))?, "edited in b");
    assert_eq!(fs::read_to_string(dest_c.join("x.txt"))?, "edited in b");
    assert_eq!(fs::read_to_string(dest_b.join("x.txt"))?, "edited in b");

    Ok(())
}

#[tokio::test]
async fn full_resync_copies_entire_member_tree() -> TestResult {
    let tmp = tempfile::tempdir()?;
    let (registry, src, dest_b, dest_c) = mirror_fixture(tmp.path()).await?;

    fs::create_dir_all(src.join("sub"))?;
    fs::write(src.join("sub/deep.txt"), "deep")?;
    fs::write(src.join("x.txt"), "rewritten")?;

    let change = classify(&registry, &src, ChangeKind::FullResync).unwrap();

    let group = registry.group(&src).unwrap();
    group.mark_synced(0);
    propagate(group, &change, 1000).await?;

    for dest in [&dest_b, &dest_c] {
        assert_eq!(fs::read_to_string(dest.join("x.txt"))?, "rewritten");
        assert_eq!(fs::read_to_string(dest.join("sub/deep.txt"))?, "deep");
    }

    Ok(())
}

#[tokio::test]
async fn delete_propagates_after_debounce_window_expires() -> TestResult {
    let tmp = tempfile::tempdir()?;
    let (registry, src, dest_b, dest_c) = mirror_fixture(tmp.path()).await?;

    assert!(dest_b.join("x.txt").exists());
    assert!(dest_c.join("x.txt").exists());

    // Wait past the window armed by the initial build, then delete and
    // propagate.
    tokio::time::sleep(Duration::from_millis(60)).await;
    fs::remove_file(src.join("x.txt"))?;
    let change = classify(&registry, &src.join("x.txt"), ChangeKind::Removed).unwrap();

    let group = registry.group(&src).unwrap();
    propagate(group, &change, 50).await?;

    assert!(!dest_b.join("x.txt").exists());
    assert!(!dest_c.join("x.txt").exists());

    Ok(())
}

#[tokio::test]
async fn second_rapid_change_within_window_is_debounced() -> TestResult {
    let tmp = tempfile::tempdir()?;
    let (registry, src, dest_b, dest_c) = mirror_fixture(tmp.path()).await?;

    let group = registry.group(&src).unwrap();
    group.mark_synced(0);

    fs::write(src.join("y.txt"), "one")?;
    let change = classify(&registry, &src.join("y.txt"), ChangeKind::Updated).unwrap();
    propagate(group, &change, 60_000).await?;

    assert_eq!(fs::read_to_string(dest_b.join("y.txt"))?, "one");

    // Second change lands inside the window: only the first cycle's effects
    // remain observable.
    fs::write(src.join("y.txt"), "two")?;
    propagate(group, &change, 60_000).await?;

    assert_eq!(fs::read_to_string(dest_b.join("y.txt"))?, "one");
    assert_eq!(fs::read_to_string(dest_c.join("y.txt"))?, "one");

    Ok(())
}

#[tokio::test]
async fn removing_already_missing_path_is_not_an_error() -> TestResult {
    let tmp = tempfile::tempdir()?;
    let (registry, src, _, _) = mirror_fixture(tmp.path()).await?;

    let change = classify(&registry, &src.join("never-existed.txt"), ChangeKind::Removed).unwrap();

    let group = registry.group(&src).unwrap();
    group.mark_synced(0);
    propagate(group, &change, 1000).await?;

    Ok(())
}
