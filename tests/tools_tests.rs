use chrono::{Duration, TimeZone, Utc};
use tagscope::chart::{JsonChartSink, NullChartSink};
use tagscope::tools::{ToolRequest, Toolbox};
use tagscope::validate::Limits;
use tagscope::{Dataset, QueryEngine, Record};

fn dataset() -> Dataset {
    let start = Utc.with_ymd_and_hms(2016, 3, 1, 0, 0, 0).unwrap();
    let mut recs = Vec::new();
    for i in 0..40 {
        recs.push(Record::new(start + Duration::days(i), "1girl rem_(re:zero) blue_hair"));
    }
    for i in 0..25 {
        recs.push(Record::new(start + Duration::days(i), "1girl hatsune_miku aqua_hair"));
    }
    Dataset::new(recs)
}

#[test]
fn top_characters_text() {
    let ds = dataset();
    let tb = Toolbox::new(&ds, QueryEngine::default(), Limits::default(), Box::new(NullChartSink));
    let resp = tb.invoke(&ToolRequest::TopCharactersByYear { year: 2016 });
    assert!(resp.ok);
    assert_eq!(resp.text, "Top 2 Characters of 2016:\n1. Rem [Re:Zero]\n2. Hatsune Miku");
    assert_eq!(resp.chart, None);
}

#[test]
fn stats_writes_chart_to_sanitized_path() {
    let ds = dataset();
    let dir = tempfile::tempdir().unwrap();
    let tb = Toolbox::new(&ds, QueryEngine::default(), Limits::default(), Box::new(JsonChartSink::new(dir.path())));
    let resp = tb.invoke(&ToolRequest::CharacterStats { character_tag: "rem_(re:zero)".into() });
    assert!(resp.ok, "{}", resp.text);
    let chart = resp.chart.expect("chart path");
    assert_eq!(chart, dir.path().join("popularity_rem_(re_zero).json"));
    assert!(chart.exists());
    assert!(resp.text.contains("Total Artworks: 40"));
    assert!(resp.text.contains("Peak Popularity: March 2016 (31 uploads/month)"));
    assert!(resp.text.contains("Current Status: Declining"));
}

#[test]
fn ship_and_compare_and_drivers() {
    let ds = dataset();
    let tb = Toolbox::new(&ds, QueryEngine::default(), Limits::default(), Box::new(NullChartSink));

    let resp = tb.invoke(&ToolRequest::ShipDependency { char1: "1girl".into(), char2: "hatsune_miku".into() });
    assert!(resp.text.contains("appears 38.5% of the time"), "{}", resp.text);

    let resp = tb.invoke(&ToolRequest::CompareCharacters { char1: "hatsune_miku".into(), char2: "rem_(re:zero)".into() });
    assert!(resp.text.ends_with("Winner: rem_(re:zero)"), "{}", resp.text);

    let resp = tb.invoke(&ToolRequest::TagDriver { year: 2016, tag: "blue_hair".into() });
    assert!(resp.text.contains("Top Drivers: Rem [Re:Zero] [40]"), "{}", resp.text);
}

#[test]
fn failures_are_reported_not_raised() {
    let ds = dataset();
    let tb = Toolbox::new(&ds, QueryEngine::default(), Limits::default(), Box::new(NullChartSink));

    let resp = tb.invoke(&ToolRequest::TopCharactersByYear { year: 1999 });
    assert!(!resp.ok);
    assert!(resp.text.contains("between 2005 and 2025"));

    let resp = tb.invoke(&ToolRequest::CharacterStats { character_tag: "x".into() });
    assert!(!resp.ok);

    let resp = tb.invoke(&ToolRequest::CompareCharacters { char1: "rem_(re:zero)".into(), char2: "ghost_tag".into() });
    assert!(!resp.ok);
    assert!(resp.text.contains("ghost_tag"));

    let empty = Dataset::unavailable();
    let tb = Toolbox::new(&empty, QueryEngine::default(), Limits::default(), Box::new(NullChartSink));
    let resp = tb.invoke(&ToolRequest::TopCharactersByYear { year: 2016 });
    assert_eq!(resp.text, "Error: dataset not loaded");
}

#[test]
fn requests_parse_from_json() {
    let req: ToolRequest = serde_json::from_str(r#"{"tool":"tag_driver","year":2016,"tag":"black_hair"}"#).unwrap();
    assert_eq!(req, ToolRequest::TagDriver { year: 2016, tag: "black_hair".into() });
}

#[test]
fn serve_answers_each_line_until_eof() {
    let ds = dataset();
    let tb = Toolbox::new(&ds, QueryEngine::default(), Limits::default(), Box::new(NullChartSink));
    let input = concat!(
        r#"{"tool":"top_characters_by_year","year":2016}"#, "\n",
        "\n",
        "not json\n",
        r#"{"tool":"character_stats","character_tag":"x"}"#, "\n",
    );
    let mut out = Vec::new();
    tb.serve_lines(std::io::Cursor::new(input), &mut out).unwrap();

    let lines: Vec<serde_json::Value> = String::from_utf8(out)
        .unwrap()
        .lines()
        .map(|l| serde_json::from_str(l).unwrap())
        .collect();
    assert_eq!(lines.len(), 3);
    assert_eq!(lines[0]["ok"], true);
    assert_eq!(lines[1]["ok"], false);
    assert!(lines[1]["text"].as_str().unwrap().starts_with("Error: invalid request"));
    assert_eq!(lines[2]["ok"], false);
}
