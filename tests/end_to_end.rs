use pretty_assertions::assert_eq;
use std::fs;
use trace_modeller::attr::Value;
use trace_modeller::engine::run_pass;
use trace_modeller::model::{ModelConfig, ModelRegistry};
use trace_modeller::render::{render_json_report, render_text_report};
use trace_modeller::trace::{TraceFormat, TraceSpec, load_trace};
use trace_modeller::view::build_report_data;

const SCENARIO_TRACE: &str = r#"{
  "operations": [
    { "id": "job", "type": "Job", "children": [
      { "id": "mission", "type": "Mission" }
    ]},
    { "id": "actor-1", "type": "Actor", "attributes": { "StartTime": 100, "EndTime": 200 } },
    { "id": "actor-2", "type": "Actor", "attributes": { "StartTime": 150, "EndTime": 300 } }
  ]
}"#;

const SCENARIO_MODEL: &str = r#"{
  "root": "Job",
  "operations": [
    { "type": "Job" },
    { "type": "Mission",
      "linking": [ { "rule": "empty" } ],
      "derivations": [
        { "priority": 11, "rule": "simple_summary", "summary": "TopActorTopMission." },
        { "priority": 7, "rule": "filial_start_time" },
        { "priority": 7, "rule": "filial_end_time" }
      ] },
    { "type": "Actor",
      "linking": [ { "rule": "unique_parent", "parent": "Mission" } ] }
  ]
}"#;

fn scenario_registry() -> ModelRegistry {
    let config: ModelConfig = serde_json::from_str(SCENARIO_MODEL).unwrap();
    ModelRegistry::from_config(config).unwrap()
}

#[test]
fn job_mission_actors_scenario() {
    let spec: TraceSpec = serde_json::from_str(SCENARIO_TRACE).unwrap();
    let mut hierarchy = spec.validate_and_build().unwrap();
    let registry = scenario_registry();

    let outcome = run_pass(&mut hierarchy, &registry).unwrap();
    assert_eq!(outcome.failures, vec![]);

    let data = build_report_data(&hierarchy, &outcome);
    assert_eq!(data.roots, ["job"]);
    let mission = &data.operations["mission"];
    assert_eq!(mission.children, ["actor-1", "actor-2"]);
    assert_eq!(mission.derived["StartTime"], Value::Timestamp(100));
    assert_eq!(mission.derived["EndTime"], Value::Timestamp(300));
    assert_eq!(
        mission.derived["Summary"],
        Value::Text("TopActorTopMission.".to_string())
    );
}

#[test]
fn identical_input_renders_identical_reports() {
    let registry = scenario_registry();
    let render = || {
        let spec: TraceSpec = serde_json::from_str(SCENARIO_TRACE).unwrap();
        let mut hierarchy = spec.validate_and_build().unwrap();
        let outcome = run_pass(&mut hierarchy, &registry).unwrap();
        render_json_report(&build_report_data(&hierarchy, &outcome)).unwrap()
    };
    assert_eq!(render(), render());
}

#[test]
fn driver_log_with_bundled_model() {
    let dir = tempfile::tempdir().unwrap();
    let log = dir.path().join("driver.logs");
    fs::write(
        &log,
        "\
2015-09-09 12:00:00 INFO [main] Submitting job to YARN
2015-09-09 12:00:01 INFO [GraphX] GRANULA - OperationUuid:top ActorType:TopActor MissionType:TopMission InfoName:Platform InfoValue:GraphX
2015-09-09 12:00:01 INFO [GraphX] GRANULA - OperationUuid:load ActorType:GraphX MissionType:LoadGraph InfoName:StartTime InfoValue:1000
2015-09-09 12:00:05 INFO [GraphX] GRANULA - OperationUuid:load ActorType:GraphX MissionType:LoadGraph InfoName:EndTime InfoValue:5000
2015-09-09 12:00:05 INFO [GraphX] GRANULA - OperationUuid:proc ActorType:GraphX MissionType:ProcessGraph InfoName:StartTime InfoValue:5000
2015-09-09 12:00:09 INFO [GraphX] GRANULA - OperationUuid:proc ActorType:GraphX MissionType:ProcessGraph InfoName:EndTime InfoValue:9500
2015-09-09 12:00:09 INFO [GraphX] GRANULA - OperationUuid:save ActorType:GraphX MissionType:OffloadGraph InfoName:StartTime InfoValue:9500
",
    )
    .unwrap();

    let path = log.to_str().unwrap();
    assert_eq!(TraceFormat::infer(path), TraceFormat::Log);
    let mut hierarchy = load_trace(path, TraceFormat::Log)
        .unwrap()
        .validate_and_build()
        .unwrap();
    let registry = ModelRegistry::from_config(ModelConfig::builtin().unwrap()).unwrap();
    let outcome = run_pass(&mut hierarchy, &registry).unwrap();

    let data = build_report_data(&hierarchy, &outcome);
    let top = &data.operations["top"];
    assert_eq!(top.children, ["load", "proc", "save"]);

    // "save" never logged an EndTime: its duration, its summary and the
    // top-level end bound are each reported, the rest still derives.
    let failed: Vec<String> = data.failures.iter().map(|f| f.to_string()).collect();
    assert_eq!(
        failed,
        vec![
            "operation save: rule duration is missing EndTime on self".to_string(),
            "operation top: rule filial_end_time is missing EndTime on child save".to_string(),
            "operation save: rule simple_summary is missing Duration on self".to_string(),
        ]
    );
    assert_eq!(top.derived["StartTime"], Value::Timestamp(1000));
    assert_eq!(top.derived.get("EndTime"), None);
    assert_eq!(
        data.operations["proc"].derived["Summary"],
        Value::Text("Runs the algorithm in 4500 ms.".to_string())
    );

    let text = render_text_report(&data).unwrap();
    assert!(text.starts_with("TopActor-TopMission [top]\n  Summary = TopActorTopMission.\n"));
    assert!(text.contains("3 failure(s):"));
}
