use hidewall::{is_blocked, plan, BlockedSiteSet, Options, Strategy, TargetRequest};
use std::io::Write;

#[test]
fn load_reads_entries_from_file() {
    let mut file = tempfile::NamedTempFile::new().expect("temp file");
    writeln!(file, "# paywalled news").expect("write");
    writeln!(file, "nytimes.com").expect("write");
    writeln!(file).expect("write");
    writeln!(file, "  wsj.com  ").expect("write");

    let set = BlockedSiteSet::load(file.path());

    assert_eq!(set.len(), 2);
    assert_eq!(set.entries(), ["nytimes.com", "wsj.com"]);
}

#[test]
fn load_of_missing_file_blocks_nothing() {
    let dir = tempfile::tempdir().expect("temp dir");
    let set = BlockedSiteSet::load(dir.path().join("absent.txt"));

    assert!(set.is_empty());
    assert!(!is_blocked("https://www.nytimes.com/x", &set));
}

#[test]
fn blocked_iff_some_entry_is_substring() {
    let set = BlockedSiteSet::parse("nytimes.com\nwsj.com\nft.com/content");

    assert!(is_blocked("https://www.nytimes.com/x", &set));
    assert!(is_blocked("https://www.wsj.com/articles/a", &set));
    assert!(is_blocked("https://www.ft.com/content/123", &set));
    assert!(!is_blocked("https://www.ft.com/markets", &set));
    assert!(!is_blocked("https://example.com/", &set));
}

#[test]
fn matching_is_not_domain_aware() {
    // Literal containment: the entry also hits unrelated hosts and paths.
    let set = BlockedSiteSet::new(["wsj.com"]);
    assert!(is_blocked("https://notwsj.com/", &set));
    assert!(is_blocked("https://example.com/about-wsj.com", &set));
}

#[test]
fn empty_set_never_blocks() {
    let set = BlockedSiteSet::parse("\n\n# nothing here\n");
    for url in ["https://www.nytimes.com/x", "https://example.com/", ""] {
        assert!(!is_blocked(url, &set));
    }
}

#[test]
fn nytimes_scenario_selects_blocked_plan() {
    let set = BlockedSiteSet::new(["nytimes.com"]);
    let request = TargetRequest::new("https://www.nytimes.com/x?y=1").expect("valid url");

    assert_eq!(request.clean_url(), "https://www.nytimes.com/x");
    assert!(is_blocked(request.clean_url(), &set));

    let plan = plan(&request, true, &Options::default(), None);
    assert_eq!(plan.strategy, Strategy::CacheProxy);
    assert_eq!(
        plan.endpoint,
        "https://archive.today/latest/https%3A%2F%2Fwww.nytimes.com%2Fx"
    );
}
