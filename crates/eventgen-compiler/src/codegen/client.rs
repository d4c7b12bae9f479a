//! Client-mode artifacts: `client.bal`, `utils.bal`, `tests/test.bal` and
//! `Config.toml`.

use crate::diagnostic::GeneratorError;
use crate::ir::{ClientFunction, GenerationModel};
use crate::naming::{type_name, variable_name};

use super::template::{string_literal, Template};

/// Used when the document declares no server.
pub const DEFAULT_SERVER_URL: &str = "ws://localhost:9090";

/// Server URL escaped for use inside a quoted Ballerina or TOML string.
fn server_url(model: &GenerationModel) -> String {
    let literal = string_literal(model.server_url.as_deref().unwrap_or(DEFAULT_SERVER_URL));
    literal[1..literal.len() - 1].to_string()
}

fn response_type(function: &ClientFunction) -> Option<String> {
    function.response.as_ref().map(|response| {
        response
            .type_names
            .iter()
            .map(|name| type_name(name))
            .collect::<Vec<_>>()
            .join("|")
    })
}

fn stream_generator_name(function: &ClientFunction) -> String {
    format!("{}StreamGenerator", type_name(&function.function_name))
}

fn render_function(function: &ClientFunction) -> String {
    let payload_type = type_name(&function.payload_type);
    let payload = variable_name(&function.payload_type);
    let response = response_type(function);
    let streaming = function.response.as_ref().map(|r| r.streaming).unwrap_or(false);

    let return_type = match (&response, streaming) {
        (None, _) => "error?".to_string(),
        (Some(response), false) => format!("{}|error", response),
        (Some(response), true) => format!("stream<{}, error?>|error", response),
    };

    let mut output = String::new();
    output.push_str(&format!("\n    # Sends a `{}` message.\n", function.message_name));
    output.push_str("    #\n");
    output.push_str(&format!("    # + {} - Message payload\n", payload));
    output.push_str("    # + return - The response, or an error if the exchange failed\n");
    output.push_str(&format!(
        "    remote isolated function {}({} {}) returns {} {{\n",
        function.function_name, payload_type, payload, return_type
    ));
    output.push_str(&format!("        check self.clientEp->writeMessage({});\n", payload));

    match (&response, streaming) {
        (None, _) => {}
        (Some(_), false) => {
            output.push_str("        json response = check self.clientEp->readMessage();\n");
            output.push_str("        return response.cloneWithType();\n");
        }
        (Some(response), true) => {
            let generator = stream_generator_name(function);
            output.push_str(&format!("        {} streamGenerator = new (self.clientEp);\n", generator));
            output.push_str(&format!(
                "        stream<{}, error?> responseStream = new (streamGenerator);\n",
                response
            ));
            output.push_str("        return responseStream;\n");
        }
    }

    output.push_str("    }\n");
    output
}

fn render_stream_generator(function: &ClientFunction, response: &str) -> String {
    let mut output = String::new();
    output.push_str(&format!("\nisolated class {} {{\n", stream_generator_name(function)));
    output.push_str("    *Generator;\n");
    output.push_str("    private final websocket:Client clientEp;\n\n");
    output.push_str("    isolated function init(websocket:Client clientEp) {\n");
    output.push_str("        self.clientEp = clientEp;\n");
    output.push_str("    }\n\n");
    output.push_str(&format!(
        "    public isolated function next() returns record {{|{} value;|}}|error {{\n",
        response
    ));
    output.push_str("        json message = check self.clientEp->readMessage();\n");
    output.push_str(&format!("        {} value = check message.cloneWithType();\n", response));
    output.push_str("        return {value};\n");
    output.push_str("    }\n");
    output.push_str("}\n");
    output
}

pub fn render_client(model: &GenerationModel, template: &Template) -> Result<String, GeneratorError> {
    let server_url = server_url(model);
    let mut functions = String::new();
    let mut generators = String::new();

    for function in &model.client_functions {
        functions.push_str(&render_function(function));
        if let (Some(response), true) = (
            response_type(function),
            function.response.as_ref().map(|r| r.streaming).unwrap_or(false),
        ) {
            generators.push_str(&render_stream_generator(function, &response));
        }
    }

    template.render(&[
        ("TITLE", model.title.as_str()),
        ("SERVER_URL", server_url.as_str()),
        ("CLIENT_FUNCTIONS", functions.as_str()),
        ("STREAM_GENERATORS", generators.as_str()),
    ])
}

pub fn render_utils(model: &GenerationModel, template: &Template) -> Result<String, GeneratorError> {
    template.render(&[("TITLE", model.title.as_str())])
}

pub fn render_client_tests(model: &GenerationModel, template: &Template) -> Result<String, GeneratorError> {
    let server_url = server_url(model);
    let mut tests = String::new();
    for function in &model.client_functions {
        tests.push_str("\n@test:Config {\n    enable: false\n}\n");
        tests.push_str(&format!(
            "function test{}() returns error? {{\n}}\n",
            type_name(&function.function_name)
        ));
    }

    template.render(&[
        ("TITLE", model.title.as_str()),
        ("SERVER_URL", server_url.as_str()),
        ("CLIENT_TESTS", tests.as_str()),
    ])
}

pub fn render_config(model: &GenerationModel, template: &Template) -> Result<String, GeneratorError> {
    let server_url = server_url(model);
    template.render(&[("SERVER_URL", server_url.as_str())])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codegen::template::{CLIENT, CLIENT_TEST, CONFIG_TOML};
    use crate::ir::{ClientResponse, EventIdentifierPath, SchemaSet};

    fn model(client_functions: Vec<ClientFunction>) -> GenerationModel {
        GenerationModel {
            title: "Ticker".into(),
            server_url: Some("wss://ticker.example.com/ws".into()),
            schemas: SchemaSet::new(),
            service_types: Vec::new(),
            event_path: EventIdentifierPath::header("X-Event"),
            client_functions,
        }
    }

    fn client_function(name: &str, payload: &str, response: Option<ClientResponse>) -> ClientFunction {
        ClientFunction {
            message_name: name.into(),
            function_name: format!("do{}", name),
            payload_type: payload.into(),
            response,
        }
    }

    #[test]
    fn test_simple_rpc_function() {
        let model = model(vec![client_function(
            "Ping",
            "Ping",
            Some(ClientResponse { type_names: vec!["Pong".into()], streaming: false }),
        )]);
        let output = render_client(&model, &Template::new("client.bal", CLIENT)).unwrap();
        assert!(output.contains("remote isolated function doPing(Ping ping) returns Pong|error {\n"));
        assert!(output.contains("        check self.clientEp->writeMessage(ping);\n"));
        assert!(output.contains("string serviceUrl = \"wss://ticker.example.com/ws\""));
        assert!(!output.contains("StreamGenerator"));
    }

    #[test]
    fn test_streaming_function() {
        let model = model(vec![client_function(
            "Subscribe",
            "Subscribe",
            Some(ClientResponse { type_names: vec!["Ack".into(), "Tick".into()], streaming: true }),
        )]);
        let output = render_client(&model, &Template::new("client.bal", CLIENT)).unwrap();
        assert!(output.contains("returns stream<Ack|Tick, error?>|error {\n"));
        assert!(output.contains("isolated class DoSubscribeStreamGenerator {\n"));
        assert!(output.contains("returns record {|Ack|Tick value;|}|error {\n"));
    }

    #[test]
    fn test_fire_and_forget() {
        let model = model(vec![client_function("Notify", "Notice", None)]);
        let output = render_client(&model, &Template::new("client.bal", CLIENT)).unwrap();
        assert!(output.contains("remote isolated function doNotify(Notice notice) returns error? {\n"));
        assert!(!output.contains("readMessage"));
    }

    #[test]
    fn test_test_skeleton_and_config() {
        let model = model(vec![client_function("Ping", "Ping", None)]);
        let tests = render_client_tests(&model, &Template::new("tests/test.bal", CLIENT_TEST)).unwrap();
        assert!(tests.contains("function testDoPing() returns error? {"));

        let config = render_config(&model, &Template::new("Config.toml", CONFIG_TOML)).unwrap();
        assert_eq!(config, "serviceUrl = \"wss://ticker.example.com/ws\"\n");
    }

    #[test]
    fn test_server_url_escaped_everywhere() {
        let mut model = model(vec![client_function("Ping", "Ping", None)]);
        model.server_url = Some("ws://host/a\"b\\c".into());
        let escaped = "ws://host/a\\\"b\\\\c";

        let client = render_client(&model, &Template::new("client.bal", CLIENT)).unwrap();
        assert!(client.contains(&format!("string serviceUrl = \"{}\"", escaped)));
        let tests = render_client_tests(&model, &Template::new("tests/test.bal", CLIENT_TEST)).unwrap();
        assert!(tests.contains(escaped));
        let config = render_config(&model, &Template::new("Config.toml", CONFIG_TOML)).unwrap();
        assert_eq!(config, format!("serviceUrl = \"{}\"\n", escaped));
    }
}
