use pixmatch::{
    Catalogue, Fingerprint, MatchConfig, Matcher, Tolerance, Verdict, NEAR_PERFECT_THRESHOLD,
};

const PIXELS: usize = 20;

/// A fingerprint of `PIXELS` pixels where the first `mismatched` are white.
/// Against an all-black query it scores `100 * (1 - mismatched / PIXELS)`.
fn with_mismatches(mismatched: usize) -> Fingerprint {
    let mut values = vec![0u8; PIXELS * 3];
    for v in values.iter_mut().take(mismatched * 3) {
        *v = 255;
    }
    Fingerprint::from_values(values).unwrap()
}

fn black_query() -> Fingerprint {
    Fingerprint::from_values(vec![0; PIXELS * 3]).unwrap()
}

fn matcher() -> Matcher {
    Matcher::new(MatchConfig::default()).unwrap()
}

fn names(report: &pixmatch::MatchReport) -> Vec<&str> {
    report.ranked().iter().map(|r| r.name.as_str()).collect()
}

#[test]
fn ranking_orders_by_confidence_with_stable_ties() {
    let mut cat = Catalogue::new();
    cat.upsert("A", with_mismatches(4)).unwrap(); // 80%
    cat.upsert("B", with_mismatches(1)).unwrap(); // 95%
    cat.upsert("C", with_mismatches(1)).unwrap(); // 95%

    let report = matcher().match_query(&black_query(), &cat);
    assert_eq!(names(&report), ["B", "C", "A"]);
    assert!((report.ranked()[0].confidence - 95.0).abs() < 1e-9);
    assert!((report.ranked()[2].confidence - 80.0).abs() < 1e-9);

    let mut reordered = Catalogue::new();
    reordered.upsert("A", with_mismatches(4)).unwrap();
    reordered.upsert("C", with_mismatches(1)).unwrap();
    reordered.upsert("B", with_mismatches(1)).unwrap();
    let report = matcher().match_query(&black_query(), &reordered);
    assert_eq!(names(&report), ["C", "B", "A"]);
}

#[test]
fn repeated_runs_are_identical() {
    let mut cat = Catalogue::new();
    for (i, m) in [3, 1, 1, 7, 0, 1].into_iter().enumerate() {
        cat.upsert(format!("e{i}"), with_mismatches(m)).unwrap();
    }
    let first = matcher().match_query(&black_query(), &cat);
    for _ in 0..5 {
        assert_eq!(matcher().match_query(&black_query(), &cat), first);
    }
    assert_eq!(names(&first), ["e4", "e1", "e2", "e5", "e0", "e3"]);
}

#[test]
fn empty_catalogue_yields_no_entries_sentinel() {
    let report = matcher().match_query(&black_query(), &Catalogue::new());
    assert!(report.ranked().is_empty());
    assert_eq!(report.best(), None);
    assert_eq!(report.verdict(), Verdict::NoEntries);
    assert_eq!(report.strong_match(), None);
    assert!(report.top_entries().is_empty());
}

#[test]
fn verdict_uses_inclusive_threshold() {
    let mut cat = Catalogue::new();
    cat.upsert("edge", with_mismatches(8)).unwrap(); // exactly 60%
    let report = matcher().match_query(&black_query(), &cat);
    assert_eq!(report.verdict(), Verdict::StrongMatch);
    assert_eq!(report.strong_match().map(|r| r.name.as_str()), Some("edge"));

    let mut cat = Catalogue::new();
    cat.upsert("weak", with_mismatches(9)).unwrap(); // 55%
    let report = matcher().match_query(&black_query(), &cat);
    assert_eq!(report.verdict(), Verdict::NoStrongMatch);
    assert_eq!(report.best().map(|r| r.name.as_str()), Some("weak"));
    assert_eq!(report.strong_match(), None);
}

#[test]
fn threshold_does_not_filter_ranking() {
    let mut cat = Catalogue::new();
    cat.upsert("low", with_mismatches(19)).unwrap();
    cat.upsert("lower", with_mismatches(20)).unwrap();
    let cfg = MatchConfig {
        strong_threshold: 99.0,
        ..MatchConfig::default()
    };
    let report = Matcher::new(cfg).unwrap().match_query(&black_query(), &cat);
    assert_eq!(names(&report), ["low", "lower"]);
    assert_eq!(report.verdict(), Verdict::NoStrongMatch);
}

#[test]
fn incomparable_entries_score_zero_and_rank_last() {
    let mut cat = Catalogue::new();
    cat.upsert("old-size", Fingerprint::from_values(vec![0; 9]).unwrap())
        .unwrap();
    cat.upsert("current", with_mismatches(10)).unwrap();
    let report = matcher().match_query(&black_query(), &cat);
    assert_eq!(names(&report), ["current", "old-size"]);
    assert_eq!(report.ranked()[1].confidence, 0.0);
}

#[test]
fn top_list_is_truncated() {
    let mut cat = Catalogue::new();
    for i in 0..8 {
        cat.upsert(format!("e{i}"), with_mismatches(i)).unwrap();
    }
    let report = matcher().match_query(&black_query(), &cat);
    assert_eq!(report.top_entries().len(), 5);
    assert_eq!(report.top(3).len(), 3);
    assert_eq!(report.top(100).len(), 8);
    assert_eq!(report.top_entries()[0].name, "e0");
}

#[test]
fn near_perfect_hits_are_strictly_above_cutoff() {
    let mut cat = Catalogue::new();
    cat.upsert("exact", with_mismatches(0)).unwrap();
    cat.upsert("close", with_mismatches(1)).unwrap();
    let report = matcher().match_query(&black_query(), &cat);
    let hits: Vec<_> = report.near_perfect().map(|r| r.name.as_str()).collect();
    assert_eq!(hits, ["exact"]);
    assert!(report.ranked()[1].confidence <= NEAR_PERFECT_THRESHOLD);
}

#[test]
fn tolerance_is_applied_per_pixel() {
    let mut cat = Catalogue::new();
    cat.upsert("dim", Fingerprint::from_values(vec![20; PIXELS * 3]).unwrap())
        .unwrap();

    let strict = Matcher::new(MatchConfig {
        tolerance: Tolerance(15),
        ..MatchConfig::default()
    })
    .unwrap();
    let loose = Matcher::new(MatchConfig {
        tolerance: Tolerance(20),
        ..MatchConfig::default()
    })
    .unwrap();

    assert_eq!(strict.match_query(&black_query(), &cat).ranked()[0].confidence, 0.0);
    assert_eq!(loose.match_query(&black_query(), &cat).ranked()[0].confidence, 100.0);
}
