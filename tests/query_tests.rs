use chrono::{Duration, TimeZone, Utc};
use tagscope::query::{QueryEngine, QuerySettings};
use tagscope::temporal::{ActivityStatus, Granularity};
use tagscope::{AnalyticsError, Dataset, Record};

fn repeat(out: &mut Vec<Record>, n: usize, start: chrono::DateTime<Utc>, tags: &str) {
    for i in 0..n {
        out.push(Record::new(start + Duration::hours(i as i64), tags));
    }
}

fn dataset() -> Dataset {
    let mut recs = Vec::new();
    let y2016 = Utc.with_ymd_and_hms(2016, 4, 1, 0, 0, 0).unwrap();
    repeat(&mut recs, 50, y2016, "1girl hatsune_miku long_hair");
    repeat(&mut recs, 30, y2016, "1girl rem_(re:zero) blue_hair");
    repeat(&mut recs, 5, y2016, "2girls rem_(re:zero) ram_(re:zero) blue_hair");
    repeat(&mut recs, 8, y2016, "solo saber_(fate) black_hair");
    let y2017 = Utc.with_ymd_and_hms(2017, 1, 10, 0, 0, 0).unwrap();
    repeat(&mut recs, 12, y2017, "1girl saber_(fate) black_hair");
    repeat(&mut recs, 3, y2017, "1girl hatsune_miku black_hair");
    Dataset::new(recs)
}

#[test]
fn top_entities_by_year_ranks_by_count() {
    let r = QueryEngine::default().top_entities_by_year(&dataset(), 2016).unwrap();
    let tags: Vec<&str> = r.entities.iter().map(|e| e.tag.as_str()).collect();
    // 2girls records lack the required co-tag, saber has no 1girl in 2016
    assert_eq!(tags, vec!["hatsune_miku", "rem_(re:zero)"]);
    assert_eq!(r.entities[0].count, 50);
    assert_eq!(r.entities[1].count, 30);
    assert_eq!(r.subset_size, 80);
}

#[test]
fn top_entities_for_empty_year() {
    let err = QueryEngine::default().top_entities_by_year(&dataset(), 2010).unwrap_err();
    assert!(matches!(err, AnalyticsError::NoDataInRange { year: 2010, .. }));
    assert!(err.to_string().contains("2010"));
}

#[test]
fn entity_stats_for_known_entity() {
    let stats = QueryEngine::default().entity_stats(&dataset(), "saber_(fate)").unwrap();
    assert_eq!(stats.total, 20);
    assert_eq!(stats.monthly.granularity, Granularity::Month);
    assert_eq!(stats.monthly.total(), 20);
    // April 2016 through January 2017
    assert_eq!(stats.monthly.buckets.len(), 10);
    assert_eq!(stats.peak.count, 12);
    assert_eq!(stats.peak.period.to_string(), "2017-01-01");
    assert_eq!(stats.status, ActivityStatus::Declining);
}

#[test]
fn activity_threshold_is_tunable() {
    let engine = QueryEngine::new(
        Default::default(),
        QuerySettings { activity_threshold: 10, ..Default::default() },
    );
    let stats = engine.entity_stats(&dataset(), "saber_(fate)").unwrap();
    assert_eq!(stats.status, ActivityStatus::Active);
}

#[test]
fn ghost_tag_is_not_found() {
    let err = QueryEngine::default().entity_stats(&dataset(), "ghost_tag").unwrap_err();
    assert_eq!(err, AnalyticsError::EntityNotFound { entity: "ghost_tag".into() });
    assert!(err.to_string().contains("ghost_tag"));
}

#[test]
fn trend_drivers_exclude_the_trait() {
    let r = QueryEngine::default().trend_drivers(&dataset(), 2016, "blue_hair").unwrap();
    assert_eq!(r.subset_size, 35);
    let got: Vec<(&str, usize)> = r.drivers.iter().map(|d| (d.tag.as_str(), d.count)).collect();
    assert_eq!(got, vec![("rem_(re:zero)", 35), ("ram_(re:zero)", 5)]);

    let err = QueryEngine::default().trend_drivers(&dataset(), 2016, "green_hair").unwrap_err();
    assert!(matches!(err, AnalyticsError::NoDataInRange { year: 2016, .. }));
}

#[test]
fn co_occurrence_through_engine() {
    let r = QueryEngine::default().co_occurrence(&dataset(), "rem_(re:zero)", "ram_(re:zero)").unwrap();
    assert_eq!(r.base_total, 35);
    assert_eq!(r.joint_count, 5);
}

#[test]
fn compare_picks_larger_total() {
    let r = QueryEngine::default().compare(&dataset(), "hatsune_miku", "rem_(re:zero)").unwrap();
    assert_eq!(r.first.total, 53);
    assert_eq!(r.second.total, 35);
    assert_eq!(r.winner, "hatsune_miku");
    assert_eq!(r.first_yearly.granularity, Granularity::Year);
    assert_eq!(r.first_yearly.total(), 53);

    let r = QueryEngine::default().compare(&dataset(), "rem_(re:zero)", "hatsune_miku").unwrap();
    assert_eq!(r.winner, "hatsune_miku");
}

#[test]
fn compare_tie_goes_to_first_argument() {
    let t = Utc.with_ymd_and_hms(2020, 1, 1, 0, 0, 0).unwrap();
    let ds = Dataset::new(vec![Record::new(t, "a_(x)"), Record::new(t, "b_(y)")]);
    let r = QueryEngine::default().compare(&ds, "b_(y)", "a_(x)").unwrap();
    assert_eq!(r.winner, "b_(y)");
}

#[test]
fn compare_fails_wholly_when_either_is_missing() {
    let engine = QueryEngine::default();
    let err = engine.compare(&dataset(), "nobody_(x)", "hatsune_miku").unwrap_err();
    assert_eq!(err, AnalyticsError::EntityNotFound { entity: "nobody_(x)".into() });
    let err = engine.compare(&dataset(), "hatsune_miku", "nobody_(y)").unwrap_err();
    assert_eq!(err, AnalyticsError::EntityNotFound { entity: "nobody_(y)".into() });
}

#[test]
fn every_query_reports_unavailable_dataset() {
    let ds = Dataset::unavailable();
    let e = QueryEngine::default();
    assert_eq!(e.top_entities_by_year(&ds, 2016).unwrap_err(), AnalyticsError::DatasetUnavailable);
    assert_eq!(e.entity_stats(&ds, "cirno").unwrap_err(), AnalyticsError::DatasetUnavailable);
    assert_eq!(e.co_occurrence(&ds, "cirno", "cirno").unwrap_err(), AnalyticsError::DatasetUnavailable);
    assert_eq!(e.trend_drivers(&ds, 2016, "ice").unwrap_err(), AnalyticsError::DatasetUnavailable);
    assert_eq!(e.compare(&ds, "cirno", "ice").unwrap_err(), AnalyticsError::DatasetUnavailable);
}

#[test]
fn engine_is_shareable_across_threads() {
    let ds = dataset();
    let engine = QueryEngine::default();
    std::thread::scope(|s| {
        let handles: Vec<_> = (0..4)
            .map(|_| s.spawn(|| engine.entity_stats(&ds, "hatsune_miku").map(|r| r.total)))
            .collect();
        for h in handles {
            assert_eq!(h.join().unwrap(), Ok(53));
        }
    });
}
