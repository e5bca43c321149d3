//! Tests for the report boundary: request rendering, date guards and
//! comparative results.

use augur::compile::{CompileOptions, QueryCompiler};
use augur::model::DateRange;
use augur::report::{
    check_date_range, rows_from_response, Comparison, ReportError, ReportRequest,
    DEFAULT_REPORT_LIMIT,
};
use chrono::NaiveDate;
use serde_json::json;

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn today() -> NaiveDate {
    date(2026, 10, 18)
}

fn compiler() -> QueryCompiler {
    QueryCompiler::builtin(CompileOptions::default().with_today(today())).unwrap()
}

#[test]
fn test_compiled_question_renders_run_report_body() {
    let output = compiler().compile("top 5 pages en France le mois dernier", None);
    let request = ReportRequest::from_spec(&output.spec, DEFAULT_REPORT_LIMIT);
    let body = request.to_run_report_body();

    insta::assert_snapshot!(serde_json::to_string_pretty(&body).unwrap(), @r###"
    {
      "dateRanges": [
        {
          "endDate": "2026-09-30",
          "startDate": "2026-09-01"
        }
      ],
      "dimensionFilter": {
        "andGroup": {
          "expressions": [
            {
              "filter": {
                "fieldName": "country",
                "stringFilter": {
                  "value": "France"
                }
              }
            }
          ]
        }
      },
      "dimensions": [
        {
          "name": "pagePath"
        }
      ],
      "limit": 5,
      "metrics": [
        {
          "name": "screenPageViews"
        }
      ]
    }
    "###);
}

#[test]
fn test_unranked_question_uses_default_limit() {
    let output = compiler().compile("sessions par pays", None);
    let request = ReportRequest::from_spec(&output.spec, DEFAULT_REPORT_LIMIT);

    assert_eq!(output.spec.limit, None);
    assert_eq!(request.limit, Some(DEFAULT_REPORT_LIMIT));
    assert!(request.total_request().is_some());
}

#[test]
fn test_comparative_question_yields_two_requests() {
    let output = compiler().compile("sessions in June vs July", None);
    let (first, second) = ReportRequest::comparative_pair(&output.spec, 100).unwrap();

    assert_eq!(first.date_range, DateRange::month(2026, 6).unwrap());
    assert_eq!(second.date_range, DateRange::month(2026, 7).unwrap());
    assert_eq!(first.dimensions, second.dimensions);
    assert_eq!(first.filters, second.filters);
}

#[test]
fn test_future_dates_guarded() {
    // Current month: end clamped to today
    let output = compiler().compile("sessions en octobre", None);
    let checked = check_date_range(output.spec.date_range, today()).unwrap();
    assert_eq!(checked, DateRange::new(date(2026, 10, 1), today()));

    // A month that has not started yet is rejected
    let output = compiler().compile("sessions en décembre", None);
    let err = check_date_range(output.spec.date_range, today()).unwrap_err();
    assert_eq!(
        err,
        ReportError::FutureStartDate {
            start: date(2026, 12, 1),
            today: today(),
        }
    );
}

#[test]
fn test_comparison_from_two_responses() {
    let response = |value: &str| {
        json!({
            "dimensionHeaders": [{ "name": "date" }],
            "metricHeaders": [{ "name": "sessions" }],
            "rows": [
                { "dimensionValues": [{ "value": "20260601" }], "metricValues": [{ "value": value }] }
            ]
        })
    };

    let rows1 = rows_from_response(&response("1200")).unwrap();
    let rows2 = rows_from_response(&response("1000")).unwrap();
    let comparison = Comparison::between("sessions", &rows1, &rows2);

    assert_eq!(comparison.value1, Some(1200.0));
    assert_eq!(comparison.delta, Some(200.0));
    assert_eq!(comparison.delta_pct, Some(20.0));
}

#[test]
fn test_comparison_against_empty_period() {
    let rows1 = rows_from_response(&json!({
        "metricHeaders": [{ "name": "sessions" }],
        "rows": [{ "metricValues": [{ "value": "42" }] }]
    }))
    .unwrap();
    let rows2 = rows_from_response(&json!({ "metricHeaders": [{ "name": "sessions" }] })).unwrap();

    let comparison = Comparison::between("sessions", &rows1, &rows2);
    assert_eq!(comparison.delta, None);
    assert_eq!(comparison.delta_pct, None);
}
