//! Scanner integration tests against real trees on disk

mod common;

use common::TestTree;
use std::sync::Arc;
use todoscan::scanner::api::{
    FetcherKind, FilePolicy, ScanError, TemplateUrlResolver, TodoScanner,
};

fn fs_scanner() -> TodoScanner {
    TodoScanner::builder()
        .with_fetcher_kind(FetcherKind::Filesystem)
        .build()
}

#[tokio::test]
async fn test_filesystem_scan_finds_markers_in_order() {
    let tree = TestTree::with_files(&[
        ("src/main.rs", "fn main() {}\n// TODO(ana): parse args\n"),
        ("src/util.py", "# FIXME: slow\nx = 1\n# TODO second\n"),
        ("README.md", "no markers here\n"),
    ]);
    let scanner = fs_scanner();

    let result = scanner.request_scan(&tree.location()).await.unwrap();

    let found: Vec<(&str, usize, &str)> = result
        .items
        .iter()
        .map(|m| (m.file_path.as_str(), m.line_number, m.text.as_str()))
        .collect();
    assert_eq!(
        found,
        vec![
            ("src/main.rs", 2, "parse args"),
            ("src/util.py", 1, "slow"),
            ("src/util.py", 3, "second"),
        ]
    );
    assert_eq!(result.items[0].author.as_deref(), Some("ana"));
}

#[tokio::test]
async fn test_unchanged_tree_reuses_cached_result() {
    let tree = TestTree::with_files(&[("lib.rs", "// TODO stay\n")]);
    let scanner = fs_scanner();
    let location = tree.location();

    let first = scanner.request_scan(&location).await.unwrap();
    let tag = scanner.cached(&location).unwrap().version_tag;
    let second = scanner.request_scan(&location).await.unwrap();

    assert!(Arc::ptr_eq(&first, &second));
    assert_eq!(scanner.cached(&location).unwrap().version_tag, tag);
}

#[tokio::test]
async fn test_modified_tree_is_rescanned() {
    let tree = TestTree::with_files(&[("lib.rs", "// TODO one\n")]);
    let scanner = fs_scanner();
    let location = tree.location();

    let first = scanner.request_scan(&location).await.unwrap();
    tree.write("lib.rs", "// TODO one\n// TODO two\n");
    tree.write("extra.rs", "// FIXME three\n");
    let second = scanner.request_scan(&location).await.unwrap();

    assert_eq!(first.len(), 1);
    assert_eq!(second.len(), 3);
    assert!(!Arc::ptr_eq(&first, &second));

    tree.remove("extra.rs");
    let third = scanner.request_scan(&location).await.unwrap();
    assert_eq!(third.len(), 2);
}

#[tokio::test]
async fn test_policy_applies_to_real_tree() {
    let tree = TestTree::with_files(&[
        ("src/keep.rs", "// TODO keep\n"),
        ("vendor/dep.rs", "// TODO vendored\n"),
        (".hidden/secret.rs", "// TODO hidden\n"),
        ("Cargo.lock", "# TODO lock\n"),
    ]);
    tree.write("big.rs", &format!("// TODO big\n{}", "y".repeat(300_000)));

    let scanner = TodoScanner::builder()
        .with_fetcher_kind(FetcherKind::Filesystem)
        .with_policy(FilePolicy::new().with_exclude_patterns(["vendor/**"]).unwrap())
        .build();

    let result = scanner.request_scan(&tree.location()).await.unwrap();
    let paths: Vec<&str> = result.items.iter().map(|m| m.file_path.as_str()).collect();
    assert_eq!(paths, vec!["src/keep.rs"]);
}

#[tokio::test]
async fn test_concurrent_requests_for_real_tree_share_result() {
    let tree = TestTree::with_files(&[("a.rs", "// TODO a\n"), ("b.rs", "// TODO b\n")]);
    let scanner = fs_scanner();
    let location = tree.location();

    let (a, b, c) = tokio::join!(
        scanner.request_scan(&location),
        scanner.request_scan(&location),
        scanner.request_scan(&location)
    );

    let (a, b, c) = (a.unwrap(), b.unwrap(), c.unwrap());
    assert!(Arc::ptr_eq(&a, &b));
    assert!(Arc::ptr_eq(&b, &c));
    assert_eq!(scanner.in_flight_count(), 0);
}

#[tokio::test]
async fn test_missing_location_is_fetch_error() {
    let tree = TestTree::new();
    let missing = tree.path().join("nope").to_string_lossy().to_string();
    let scanner = fs_scanner();

    let error = scanner.request_scan(&missing).await.unwrap_err();
    assert!(matches!(error, ScanError::Fetch { .. }));
    assert!(scanner.cached(&missing).is_none());
}

#[tokio::test]
async fn test_custom_view_url_template() {
    let tree = TestTree::with_files(&[("src/a.rs", "\n\n// TODO here\n")]);
    let scanner = TodoScanner::builder()
        .with_fetcher_kind(FetcherKind::Filesystem)
        .with_resolver(Arc::new(TemplateUrlResolver::new(
            "https://code.example.com/blob/main/{path}?line={line}",
        )))
        .build();

    let result = scanner.request_scan(&tree.location()).await.unwrap();
    assert_eq!(
        result.items[0].view_url,
        "https://code.example.com/blob/main/src/a.rs?line=3"
    );
}

#[tokio::test]
async fn test_git_fetcher_follows_commits() {
    let tree = TestTree::with_files(&[("main.rs", "// TODO first\n")]);
    if !tree.git_init() || !tree.git_commit_all("initial") {
        eprintln!("git not available; skipping");
        return;
    }
    // Uncommitted content is invisible to the git fetcher
    tree.write("draft.rs", "// TODO draft\n");

    let scanner = TodoScanner::builder()
        .with_fetcher_kind(FetcherKind::Auto)
        .build();
    let location = tree.location();

    let first = scanner.request_scan(&location).await.unwrap();
    assert_eq!(first.len(), 1);
    assert_eq!(first.items[0].text, "first");
    let commit = scanner.cached(&location).unwrap().version_tag;
    assert_eq!(commit.len(), 40);

    let again = scanner.request_scan(&location).await.unwrap();
    assert!(Arc::ptr_eq(&first, &again));

    assert!(tree.git_commit_all("add draft"));
    let after_commit = scanner.request_scan(&location).await.unwrap();
    assert_eq!(after_commit.len(), 2);
    assert_ne!(scanner.cached(&location).unwrap().version_tag, commit);
}
