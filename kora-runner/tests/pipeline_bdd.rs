//! BDD tests for the report pipeline.
//!
//! These tests drive `ReportPipeline` against a scripted backend and verify:
//! - Render ordering of base facts, analysis, chart and sections
//! - Fatal, degraded and soft failure policies per step
//! - The single live chart instance across mode toggles
//! - The once-per-session save guard
//! - Redirect on a missing company and silent cancellation

mod support;

use kora_core::view::{ChartMode, Section, SeriesKind};
use kora_core::{CompanyRef, PipelineState};
use kora_runner::pipeline::{ALERT_PREFIX, ANSWER_FAILED, MISSING_COMPANY_ALERT};
use kora_runner::{
    BackendError, PipelineError, PipelineEvent, RunToken, SaveOutcome, StepOutcome,
};
use support::{pipeline, samsung, ScriptedBackend};

fn alerts(events: &[PipelineEvent]) -> Vec<String> {
    events
        .iter()
        .filter_map(|e| match e {
            PipelineEvent::Alert { message } => Some(message.clone()),
            _ => None,
        })
        .collect()
}

fn revealed(events: &[PipelineEvent]) -> Vec<Section> {
    events
        .iter()
        .filter_map(|e| match e {
            PipelineEvent::SectionRevealed(s) => Some(*s),
            _ => None,
        })
        .collect()
}

#[test]
fn bdd_scenario_happy_path_renders_in_order() {
    // GIVEN a backend that answers every call
    let (mut pipeline, backend, sink) = pipeline(ScriptedBackend::default());

    // WHEN the report runs
    let summary = pipeline
        .run(samsung(), &RunToken::new())
        .expect("run should succeed");

    // THEN calls happen strictly in sequence
    assert_eq!(backend.calls(), vec!["collect", "analyze", "save"]);

    // AND base facts render before the analysis, chart after both
    let base = sink.position("base_facts").unwrap();
    let analysis = sink.position("analysis").unwrap();
    let chart = sink.position("chart_created").unwrap();
    let hidden = sink.position("loading_hidden").unwrap();
    assert!(base < analysis);
    assert!(analysis < chart);
    assert!(chart < hidden);

    // AND the page ends up ready with every section revealed except the answer
    assert_eq!(pipeline.state(), PipelineState::Ready);
    let sections = revealed(&sink.events());
    assert!(!sections.contains(&Section::RequestAnswer));
    assert_eq!(sections.len(), Section::ALL.len() - 1);
    assert_eq!(sections.first(), Some(&Section::Summary));

    assert_eq!(summary.analysis, StepOutcome::Completed);
    assert!(summary.answer.is_none());
    assert!(summary.chart_rendered);
}

#[test]
fn bdd_scenario_collect_failure_aborts_with_backend_text() {
    // GIVEN a backend whose collect call is rejected with "X"
    let backend = ScriptedBackend {
        collect: Err(BackendError::Rejected("X".into())),
        ..ScriptedBackend::default()
    };
    let (mut pipeline, backend, sink) = pipeline(backend);

    // WHEN the report runs
    let result = pipeline.run(samsung(), &RunToken::new());

    // THEN the run fails and nothing after collect is called
    assert!(matches!(result, Err(PipelineError::Collect(_))));
    assert_eq!(backend.calls(), vec!["collect"]);

    // AND the alert carries the backend's message
    let events = sink.events();
    assert_eq!(alerts(&events), vec![format!("{ALERT_PREFIX}X")]);

    // AND the overlay is hidden, nothing was rendered
    assert!(sink.position("loading_hidden").is_some());
    assert!(sink.position("base_facts").is_none());
    assert!(sink.position("pdf_enabled").is_none());
    assert_eq!(pipeline.state(), PipelineState::Failed);
}

#[test]
fn bdd_scenario_analyze_failure_still_reveals_report() {
    // GIVEN a backend whose analysis fails
    let backend = ScriptedBackend {
        analyze: Err(BackendError::Transport("connection reset".into())),
        ..ScriptedBackend::default()
    };
    let (mut pipeline, backend, sink) = pipeline(backend);

    // WHEN the report runs
    let summary = pipeline.run(samsung(), &RunToken::new()).unwrap();

    // THEN the analysis is reported as skipped, not alerted
    assert!(matches!(summary.analysis, StepOutcome::Failed(_)));
    assert!(sink.position("analysis_skipped").is_some());
    assert!(alerts(&sink.events()).is_empty());

    // AND the report is still saved, with a null analysis
    let saves = backend.saves();
    assert_eq!(saves.len(), 1);
    assert!(saves[0].analysis.is_none());

    // AND the chart and every section except the unrequested answer are shown
    assert!(summary.chart_rendered);
    let expected: Vec<Section> = Section::ALL
        .into_iter()
        .filter(|s| *s != Section::RequestAnswer)
        .collect();
    assert_eq!(revealed(&sink.events()), expected);
    assert_eq!(pipeline.state(), PipelineState::Ready);
}

#[test]
fn bdd_scenario_chart_toggle_keeps_one_instance() {
    // GIVEN a finished report
    let (mut pipeline, backend, _sink) = pipeline(ScriptedBackend::default());
    pipeline.run(samsung(), &RunToken::new()).unwrap();
    let calls_before = backend.calls().len();

    // WHEN the chart is toggled to forecast and back
    pipeline.toggle_chart_mode(ChartMode::Forecast);
    let forecast = pipeline.chart().current().unwrap().view().clone();
    pipeline.toggle_chart_mode(ChartMode::OneYear);

    // THEN exactly one chart instance is live
    assert_eq!(pipeline.chart().live_count(), 1);
    assert_eq!(pipeline.chart_mode(), ChartMode::OneYear);

    // AND the forecast view carried the AI path
    assert_eq!(forecast.mode, ChartMode::Forecast);
    assert!(forecast.series(SeriesKind::Forecast).is_some());

    // AND toggling made no network calls
    assert_eq!(backend.calls().len(), calls_before);
}

#[test]
fn bdd_scenario_save_runs_once_per_company_per_session() {
    // GIVEN a pipeline that has already produced a report
    let (mut pipeline, backend, _sink) = pipeline(ScriptedBackend::default());
    let first = pipeline.run(samsung(), &RunToken::new()).unwrap();

    // WHEN the same company is reported again
    let second = pipeline.run(samsung(), &RunToken::new()).unwrap();

    // THEN only the first run saved
    assert_eq!(backend.count("save"), 1);
    assert!(matches!(first.save, SaveOutcome::Saved { .. }));
    assert_eq!(second.save, SaveOutcome::AlreadySaved);
}

#[test]
fn bdd_scenario_failed_save_is_not_retried() {
    // GIVEN a backend that rejects the save
    let backend = ScriptedBackend {
        save: Err(BackendError::Rejected("크레딧 부족".into())),
        ..ScriptedBackend::default()
    };
    let (mut pipeline, backend, sink) = pipeline(backend);

    // WHEN the report runs twice
    let first = pipeline.run(samsung(), &RunToken::new()).unwrap();
    pipeline.run(samsung(), &RunToken::new()).unwrap();

    // THEN the failure was soft and the save was attempted once
    assert!(matches!(first.save, SaveOutcome::Failed(_)));
    assert_eq!(backend.count("save"), 1);
    assert!(sink.position("credits").is_none());
}

#[test]
fn bdd_scenario_credits_are_updated_after_save() {
    // GIVEN a backend that reports 9 credits left
    let (mut pipeline, _backend, sink) = pipeline(ScriptedBackend::default());

    // WHEN the report runs
    pipeline.run(samsung(), &RunToken::new()).unwrap();

    // THEN the credit display is updated with that value
    let credits: Vec<f64> = sink
        .events()
        .iter()
        .filter_map(|e| match e {
            PipelineEvent::CreditsUpdated { remaining } => Some(*remaining),
            _ => None,
        })
        .collect();
    assert_eq!(credits, vec![9.0]);
}

#[test]
fn bdd_scenario_request_text_gets_an_answer() {
    // GIVEN a company with a free-text request
    let (mut pipeline, backend, sink) = pipeline(ScriptedBackend::default());
    let company = samsung().with_request_text("  배당 정책을 알려주세요  ");

    // WHEN the report runs
    let summary = pipeline.run(company, &RunToken::new()).unwrap();

    // THEN the answer call is made after analysis with the trimmed request
    assert_eq!(backend.calls(), vec!["collect", "analyze", "answer", "save"]);
    let answers = backend.answers();
    assert_eq!(answers[0].request_text, "배당 정책을 알려주세요");

    // AND the context is a JSON string with company and analysis
    let ctx: serde_json::Value = serde_json::from_str(&answers[0].report_context).unwrap();
    assert_eq!(ctx["company"], "삼성전자");
    assert_eq!(ctx["analysis"]["investment_grade"], "A");

    // AND the answer section is revealed
    assert_eq!(summary.answer, Some(StepOutcome::Completed));
    assert!(revealed(&sink.events()).contains(&Section::RequestAnswer));
    assert_eq!(pipeline.answer(), Some("배당 성향은 안정적입니다."));
}

#[test]
fn bdd_scenario_answer_failure_shows_fallback() {
    // GIVEN a backend whose answer call fails
    let backend = ScriptedBackend {
        answer: Err(BackendError::Timeout(30)),
        ..ScriptedBackend::default()
    };
    let (mut pipeline, backend, _sink) = pipeline(backend);

    // WHEN the report runs with a request
    let summary = pipeline
        .run(samsung().with_request_text("전망은?"), &RunToken::new())
        .unwrap();

    // THEN the fallback text is shown and the run continues to save
    assert_eq!(pipeline.answer(), Some(ANSWER_FAILED));
    assert!(matches!(summary.answer, Some(StepOutcome::Failed(_))));
    assert_eq!(backend.count("save"), 1);
}

#[test]
fn bdd_scenario_missing_company_redirects() {
    // GIVEN a company reference without a ticker
    let (mut pipeline, backend, sink) = pipeline(ScriptedBackend::default());

    // WHEN the report runs
    let result = pipeline.run(CompanyRef::new("삼성전자", " "), &RunToken::new());

    // THEN nothing is fetched and the user is sent back to selection
    assert!(matches!(result, Err(PipelineError::MissingCompany(_))));
    assert!(backend.calls().is_empty());
    assert_eq!(alerts(&sink.events()), vec![MISSING_COMPANY_ALERT.to_string()]);
    assert_eq!(sink.kinds().last(), Some(&"redirect"));
}

#[test]
fn bdd_scenario_cancelled_run_stops_silently() {
    // GIVEN a run that is cancelled while collecting
    let token = RunToken::new();
    let backend = ScriptedBackend {
        cancel_on_collect: Some(token.clone()),
        ..ScriptedBackend::default()
    };
    let (mut pipeline, backend, sink) = pipeline(backend);

    // WHEN the report runs
    let result = pipeline.run(samsung(), &token);

    // THEN no later step runs and nothing is alerted or revealed
    assert!(matches!(result, Err(PipelineError::Cancelled)));
    assert_eq!(backend.calls(), vec!["collect"]);
    assert!(alerts(&sink.events()).is_empty());
    assert!(revealed(&sink.events()).is_empty());
}

#[test]
fn bdd_scenario_run_cancelled_during_analysis_renders_nothing_more() {
    // GIVEN a run that is superseded while the analysis call is in flight
    let token = RunToken::new();
    let backend = ScriptedBackend {
        cancel_on_analyze: Some(token.clone()),
        ..ScriptedBackend::default()
    };
    let (mut pipeline, backend, sink) = pipeline(backend);

    // WHEN the analysis comes back after the cancel
    let result = pipeline.run(samsung(), &token);

    // THEN its result is not rendered and nothing later runs
    assert!(matches!(result, Err(PipelineError::Cancelled)));
    assert_eq!(backend.calls(), vec!["collect", "analyze"]);
    assert!(sink.position("analysis").is_none());
    assert!(sink.position("analysis_skipped").is_none());
    assert!(sink.position("chart_created").is_none());
    assert!(revealed(&sink.events()).is_empty());
    assert!(alerts(&sink.events()).is_empty());
}

#[test]
fn bdd_scenario_collect_failure_after_cancel_is_silent() {
    // GIVEN a run that is cancelled while a failing collect is in flight
    let token = RunToken::new();
    let backend = ScriptedBackend {
        collect: Err(BackendError::Transport("timed out".into())),
        cancel_on_collect: Some(token.clone()),
        ..ScriptedBackend::default()
    };
    let (mut pipeline, _backend, sink) = pipeline(backend);

    // WHEN the failure comes back
    let result = pipeline.run(samsung(), &token);

    // THEN no alert or overlay change reaches the sink
    assert!(matches!(result, Err(PipelineError::Cancelled)));
    assert!(alerts(&sink.events()).is_empty());
    assert!(sink.position("loading_hidden").is_none());
}

#[test]
fn bdd_scenario_report_context_without_analysis_is_null() {
    // GIVEN a run whose analysis failed
    let backend = ScriptedBackend {
        analyze: Err(BackendError::Rejected("분석 실패".into())),
        ..ScriptedBackend::default()
    };
    let (mut pipeline, _backend, _sink) = pipeline(backend);
    pipeline.run(samsung(), &RunToken::new()).unwrap();

    // WHEN the chat context is built
    let ctx: serde_json::Value = serde_json::from_str(&pipeline.report_context()).unwrap();

    // THEN it names the company and carries a null analysis
    assert_eq!(ctx["company"], "삼성전자");
    assert!(ctx["analysis"].is_null());
}
