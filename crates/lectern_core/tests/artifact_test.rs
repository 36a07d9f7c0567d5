use chrono::{TimeZone, Utc};
use lectern_core::{
    ArtifactHeader, ArtifactSource, DeliveryOutcome, DeliveryRecord, LessonArtifact, LessonKind,
    LessonRequest, SinkKind,
};
use lectern_error::ParseErrorKind;

fn sample() -> LessonArtifact {
    let request = LessonRequest::new(LessonKind::ProTip, "Test Title", "x");
    let header = ArtifactHeader::for_request(
        &request,
        Utc.with_ymd_and_hms(2026, 3, 14, 8, 0, 0).unwrap(),
        vec!["playwright".to_string(), "typescript".to_string()],
        ArtifactSource::Remote {
            model: "google/gemma-2-9b-it:free".to_string(),
        },
    );
    LessonArtifact::new(header, "## The Secret\n\nUse stable selectors.\n\n## Pitfalls\n\nNone.")
}

#[test]
fn markdown_has_front_matter_and_title() {
    let markdown = sample().to_markdown();
    assert!(markdown.starts_with("---\ntitle: \"Test Title\"\ntype: \"pro-tip\"\n"));
    assert!(markdown.contains("difficulty: \"Advanced\""));
    assert!(markdown.contains("duration: \"15-20 minutes\""));
    assert!(markdown.contains("tags: [\"playwright\",\"typescript\"]"));
    assert!(markdown.contains("source: \"model:google/gemma-2-9b-it:free\""));
    assert!(markdown.contains("\n# Test Title\n"));
    assert!(markdown.contains("*Generated on 2026-03-14*"));
    assert!(markdown.contains("Implementation Checklist"));
}

#[test]
fn parse_reads_back_written_lesson() {
    let artifact = sample();
    let parsed = LessonArtifact::parse(&artifact.to_markdown()).unwrap();
    assert_eq!(parsed, artifact);
    assert_eq!(parsed.header().kind(), &LessonKind::ProTip);
}

#[test]
fn parse_rejects_plain_markdown() {
    let err = LessonArtifact::parse("# Just a heading\n").unwrap_err();
    assert_eq!(err.kind(), &ParseErrorKind::MissingFrontMatter);
}

#[test]
fn parse_reports_missing_field() {
    let markdown = "---\ntitle: \"T\"\n---\n\nbody";
    let err = LessonArtifact::parse(markdown).unwrap_err();
    assert_eq!(err.kind(), &ParseErrorKind::MissingField("type".to_string()));
}

#[test]
fn parse_reports_bad_timestamp() {
    let markdown = sample()
        .to_markdown()
        .replace("2026-03-14T08:00:00+00:00", "yesterday");
    let err = LessonArtifact::parse(&markdown).unwrap_err();
    assert!(matches!(
        err.kind(),
        ParseErrorKind::InvalidField { field, .. } if field == "generated"
    ));
}

#[test]
fn outline_lists_section_headings() {
    assert_eq!(sample().outline(), vec!["The Secret", "Pitfalls"]);
}

#[test]
fn preview_cuts_on_char_boundary() {
    let request = LessonRequest::new(LessonKind::Series, "T", "");
    let header = ArtifactHeader::for_request(
        &request,
        Utc::now(),
        Vec::new(),
        ArtifactSource::Fallback {
            reason: "offline".to_string(),
        },
    );
    let artifact = LessonArtifact::new(header, "ééééé");
    assert_eq!(artifact.preview(2), "éé...");
    assert_eq!(artifact.preview(10), "ééééé");
}

#[test]
fn kinds_round_trip_through_names() {
    for name in [
        "series",
        "pro-tip",
        "knowledge",
        "ai-implementation",
        "expert",
        "welcome",
        "weekly-deep-dive",
        "monthly-assessment",
        "lightning-talk",
    ] {
        let kind: LessonKind = name.parse().unwrap();
        assert_eq!(kind.to_string(), name);
    }
    assert_eq!(LessonKind::Other("x".into()).difficulty(), "Intermediate");
    assert_eq!(LessonKind::Expert.estimated_duration(), "60+ minutes");
}

#[test]
fn delivery_record_serializes_flat() {
    let record = DeliveryRecord::new(
        SinkKind::Email,
        DeliveryOutcome::Failed {
            error: "auth".to_string(),
            fallback: Some("/tmp/notice.txt".into()),
        },
    );
    let json = serde_json::to_value(&record).unwrap();
    assert_eq!(json["sink"], "email");
    assert_eq!(json["status"], "failed");
    assert_eq!(json["fallback"], "/tmp/notice.txt");
}
