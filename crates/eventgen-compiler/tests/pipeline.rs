use std::fs;
use std::path::{Path, PathBuf};

use eventgen_compiler::codegen::{render_dispatcher, Template};
use eventgen_compiler::{
    GenerationMode, Generator, GeneratorConfig, GeneratorError, TypeOptions, ValidationError,
};
use tempfile::TempDir;

fn fixture(name: &str) -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("tests").join("fixtures").join(name)
}

fn generator(spec_path: PathBuf, out_dir: &Path) -> Generator {
    Generator::new(GeneratorConfig {
        spec_path,
        out_dir: out_dir.to_path_buf(),
        ..GeneratorConfig::default()
    })
}

fn write_spec(dir: &TempDir, name: &str, text: &str) -> PathBuf {
    let path = dir.path().join(name);
    fs::write(&path, text).unwrap();
    path
}

/// Minimal document with one message per `(service type, event, payload)`.
fn spec_with_events(events: &[(&str, &str, &str)], schemas: &str) -> String {
    let mut text = String::from(
        "asyncapi: 2.5.0\n\
         info:\n  title: Inline\n  version: 1.0.0\n\
         x-ballerina-event-identifier:\n  type: body\n  path: \"#/components/schemas/Envelope/type\"\n\
         channels:\n  /:\n    subscribe:\n      message:\n        oneOf:\n",
    );
    for (service, event, payload) in events {
        text.push_str(&format!(
            "          - x-ballerina-service-type: {service}\n            x-ballerina-event-type: \"{event}\"\n            payload:\n              $ref: \"#/components/schemas/{payload}\"\n"
        ));
    }
    text.push_str("components:\n  schemas:\n");
    text.push_str(schemas);
    text
}

const ENVELOPE: &str = "    Envelope:\n      type: object\n      required: [type]\n      properties:\n        type:\n          type: string\n";

#[test]
fn slack_groupings_in_declaration_order() {
    let out = TempDir::new().unwrap();
    let model = generator(fixture("slack.yaml"), out.path()).check().unwrap();

    let groupings: Vec<(&str, usize)> = model
        .service_types
        .iter()
        .map(|s| (s.service_type_name.as_str(), s.remote_functions.len()))
        .collect();
    assert_eq!(
        groupings,
        vec![
            ("AppMentionHandlingService", 2),
            ("AppRateLimitedHandlingService", 1),
            ("AppCreatedHandlingService", 1),
        ]
    );

    let payloads: Vec<&str> = model
        .remote_functions()
        .map(|(_, f)| f.event_payload_type.as_str())
        .collect();
    assert_eq!(
        payloads,
        vec!["AppMentionEvent", "AppMentionEditedEvent", "AppRateLimitedEvent", "AppCreatedEvent"]
    );

    assert_eq!(model.event_path.accessor(false), "genericEvent.event.'type");
    assert_eq!(model.schemas.len(), 8);
}

#[test]
fn generates_service_artifacts() {
    let out = TempDir::new().unwrap();
    let result = generator(fixture("slack.yaml"), out.path()).generate().unwrap();

    assert_eq!(result.service_types, 3);
    assert_eq!(result.remote_functions, 4);
    assert_eq!(
        result.files,
        vec!["data_types.bal", "service_types.bal", "listener.bal", "dispatcher_service.bal"]
    );
    for file in &result.files {
        assert!(out.path().join(file).is_file(), "{file} was not written");
    }

    let data_types = fs::read_to_string(out.path().join("data_types.bal")).unwrap();
    let object_schemas = 7;
    let records = data_types
        .lines()
        .filter(|line| line.starts_with("public type ") && line.contains(" record {"))
        .count();
    assert_eq!(records, object_schemas);
    assert!(data_types.contains("public type UserId string;"));
    assert!(data_types.contains("    UserId[] authed_users?;\n"));
    assert!(data_types.contains("    string[10] scopes?;\n"));
    assert!(data_types.contains("    map<string> settings?;\n"));
    assert!(data_types.contains("    decimal rating?;\n"));
    assert!(data_types.contains("    string? name?;\n"));

    let dispatcher = fs::read_to_string(out.path().join("dispatcher_service.bal")).unwrap();
    assert!(dispatcher.contains("match genericEvent.event.'type {"));
    assert!(dispatcher.contains("\"app_rate_limited\" => {"));
    assert!(dispatcher.contains("check appCreatedHandlingServiceRef->onAppCreated(caller, appCreatedEvent);"));
}

#[test]
fn generation_is_idempotent() {
    let first = TempDir::new().unwrap();
    let second = TempDir::new().unwrap();

    let result = generator(fixture("slack.yaml"), first.path()).generate().unwrap();
    generator(fixture("slack.yaml"), second.path()).generate().unwrap();
    let before: Vec<Vec<u8>> = result
        .files
        .iter()
        .map(|f| fs::read(first.path().join(f)).unwrap())
        .collect();

    // Overwrite in place.
    generator(fixture("slack.yaml"), first.path()).generate().unwrap();

    for (file, before) in result.files.iter().zip(before) {
        assert_eq!(fs::read(first.path().join(file)).unwrap(), before, "{file} changed on rerun");
        assert_eq!(fs::read(second.path().join(file)).unwrap(), before, "{file} differs across runs");
    }
}

#[test]
fn trailing_separator_in_out_dir() {
    let out = TempDir::new().unwrap();
    let out_dir = PathBuf::from(format!("{}/gen///", out.path().display()));
    generator(fixture("slack.yaml"), &out_dir).generate().unwrap();
    assert!(out.path().join("gen").join("listener.bal").is_file());
}

#[test]
fn client_mode_artifacts() {
    let out = TempDir::new().unwrap();
    let generator = Generator::new(GeneratorConfig {
        spec_path: fixture("ticker.json"),
        out_dir: out.path().to_path_buf(),
        mode: GenerationMode::Client,
        ..GeneratorConfig::default()
    });

    let result = generator.generate().unwrap();
    assert_eq!(
        result.files,
        vec!["data_types.bal", "client.bal", "utils.bal", "tests/test.bal", "Config.toml"]
    );
    assert!(out.path().join("tests").join("test.bal").is_file());

    // Every record the client signatures name is defined.
    let data_types = fs::read_to_string(out.path().join("data_types.bal")).unwrap();
    for record in ["Tick", "Subscribe", "Ping", "Pong"] {
        assert!(data_types.contains(&format!("public type {record} record {{")), "{record} is not defined");
    }

    let client = fs::read_to_string(out.path().join("client.bal")).unwrap();
    assert!(client.contains("remote isolated function doSubscribe(Subscribe subscribe) returns stream<Tick, error?>|error {"));
    assert!(client.contains("remote isolated function doPing(Ping ping) returns Pong|error {"));
    assert!(client.contains("string serviceUrl = \"wss://ticker.example.com/ws\""));

    let config = fs::read_to_string(out.path().join("Config.toml")).unwrap();
    assert_eq!(config, "serviceUrl = \"wss://ticker.example.com/ws\"\n");
}

#[test]
fn header_dispatch_from_json_spec() {
    let out = TempDir::new().unwrap();
    let code = generator(fixture("ticker.json"), out.path()).render().unwrap();
    let listener = &code.files.iter().find(|(name, _)| name == "listener.bal").unwrap().1;
    assert!(listener.contains("req.getHeader(\"X-Event-Type\")"));
    let dispatcher = &code.files.iter().find(|(name, _)| name == "dispatcher_service.bal").unwrap().1;
    assert!(dispatcher.contains("match self.dispatchHeader {"));
    // render() never writes
    assert!(fs::read_dir(out.path()).unwrap().next().is_none());
}

#[test]
fn license_header_on_every_artifact() {
    let out = TempDir::new().unwrap();
    let generator = Generator::new(GeneratorConfig {
        spec_path: fixture("slack.yaml"),
        out_dir: out.path().to_path_buf(),
        license_header: Some("// Copyright (c) Example Inc.".to_string()),
        ..GeneratorConfig::default()
    });
    for (name, content) in generator.render().unwrap().files {
        assert!(content.starts_with("// Copyright (c) Example Inc.\n\n"), "{name} has no license header");
    }
}

#[test]
fn unresolved_reference_fails() {
    let dir = TempDir::new().unwrap();
    let schemas = format!(
        "{ENVELOPE}    Holder:\n      type: object\n      properties:\n        ghost:\n          $ref: \"#/components/schemas/Ghost\"\n"
    );
    let spec = write_spec(&dir, "api.yaml", &spec_with_events(&[("events", "ping", "Envelope")], &schemas));

    let err = generator(spec, &dir.path().join("out")).generate().err().unwrap();
    match err {
        GeneratorError::UnresolvedReference { reference, path } => {
            assert_eq!(reference, "Ghost");
            assert_eq!(path.to_string(), "#/components/schemas/Holder");
        }
        other => panic!("unexpected error: {other:?}"),
    }
    assert!(!dir.path().join("out").exists());
}

#[test]
fn validation_errors_are_collected() {
    let dir = TempDir::new().unwrap();
    let events = [("events", "message", "Envelope"), ("events", "café", "Envelope")];
    let spec = write_spec(&dir, "api.yaml", &spec_with_events(&events, ENVELOPE));

    let err = generator(spec, &dir.path().join("out")).generate().err().unwrap();
    match err {
        GeneratorError::ValidationFailed { errors } => {
            assert_eq!(
                errors,
                vec![
                    ValidationError::ReservedFunctionName {
                        function: "onMessage".into(),
                        service_type: "EventsService".into(),
                    },
                    ValidationError::InvalidFunctionName {
                        function: "onCafé".into(),
                        service_type: "EventsService".into(),
                    },
                ]
            );
        }
        other => panic!("unexpected error: {other:?}"),
    }
    assert!(!dir.path().join("out").exists());
}

#[test]
fn events_with_the_same_handler_name_fail() {
    let dir = TempDir::new().unwrap();
    let events = [("events", "app_mention", "Envelope"), ("events", "app-mention", "Envelope")];
    let spec = write_spec(&dir, "api.yaml", &spec_with_events(&events, ENVELOPE));

    let err = generator(spec, &dir.path().join("out")).generate().err().unwrap();
    match err {
        GeneratorError::ValidationFailed { errors } => assert_eq!(
            errors,
            vec![ValidationError::DuplicateFunctionName {
                function: "onAppMention".into(),
                events: "'app_mention', 'app-mention'".into(),
                service_type: "EventsService".into(),
            }]
        ),
        other => panic!("unexpected error: {other:?}"),
    }
    assert!(!dir.path().join("out").exists());
}

#[test]
fn schemas_with_the_same_type_name_fail() {
    let dir = TempDir::new().unwrap();
    let schemas = format!("{ENVELOPE}    user_profile:\n      type: string\n    UserProfile:\n      type: integer\n");
    let spec = write_spec(&dir, "api.yaml", &spec_with_events(&[("events", "ping", "Envelope")], &schemas));

    let err = generator(spec, &dir.path().join("out")).generate().err().unwrap();
    match err {
        GeneratorError::ValidationFailed { errors } => assert_eq!(
            errors,
            vec![ValidationError::DuplicateTypeName {
                type_name: "UserProfile".into(),
                schemas: "'user_profile', 'UserProfile'".into(),
            }]
        ),
        other => panic!("unexpected error: {other:?}"),
    }
}

#[test]
fn multi_line_title_stays_in_comments() {
    let dir = TempDir::new().unwrap();
    let text = spec_with_events(&[("events", "ping", "Envelope")], ENVELOPE)
        .replace("  title: Inline\n", "  title: |\n    Demo API {{DATA_TYPES}}\n    second line\n");
    let spec = write_spec(&dir, "api.yaml", &text);

    let code = generator(spec, &dir.path().join("out")).render().unwrap();
    for (name, content) in &code.files {
        assert!(content.contains("Demo API {{DATA_TYPES}} second line"), "{name} lost the title");
        for line in content.lines().filter(|line| line.contains("second line")) {
            let line = line.trim_start();
            assert!(line.starts_with("//") || line.starts_with('#'), "{name}: title outside a comment: {line}");
        }
    }
}

#[test]
fn document_without_subscribers_renders_empty_dispatcher() {
    let dir = TempDir::new().unwrap();
    let spec = write_spec(
        &dir,
        "api.yaml",
        "asyncapi: 2.5.0\n\
         info:\n  title: Quiet\n  version: 1.0.0\n\
         x-ballerina-event-identifier:\n  type: header\n  name: X-Event\n\
         channels: {}\n",
    );

    let code = generator(spec, &dir.path().join("out")).render().unwrap();
    let file = |name: &str| &code.files.iter().find(|(n, _)| n == name).unwrap().1;
    assert!(!file("dispatcher_service.bal").contains("match "));
    assert!(file("service_types.bal").contains("public type GenericServiceType websocket:Service;"));
}

#[test]
fn unsupported_spec_extension() {
    let dir = TempDir::new().unwrap();
    let spec = write_spec(&dir, "api.txt", "asyncapi: 2.5.0\n");
    let err = generator(spec, dir.path()).check().err().unwrap();
    assert!(matches!(err, GeneratorError::UnsupportedSpecFormat { .. }));
}

#[test]
fn missing_spec_file_is_an_io_error() {
    let dir = TempDir::new().unwrap();
    let err = generator(dir.path().join("absent.yaml"), dir.path()).check().err().unwrap();
    assert!(matches!(err, GeneratorError::IoError { .. }));
}

#[test]
fn dispatcher_template_without_anchor() {
    let out = TempDir::new().unwrap();
    let model = generator(fixture("slack.yaml"), out.path()).check().unwrap();
    let template = Template::new("dispatcher_service.bal", "// {{TITLE}}\nservice class DispatcherService {}\n");

    let err = render_dispatcher(&model, &TypeOptions::default(), &template).err().unwrap();
    assert!(matches!(err, GeneratorError::TemplateAnchorNotFound { .. }));
}
