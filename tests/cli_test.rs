//! CLI integration tests for the odoo-resource binary.

use assert_cmd::Command;
use mockito::{Matcher, ServerGuard};
use predicates::prelude::*;
use serde_json::json;
use std::fs;
use tempfile::TempDir;

fn cmd() -> Command {
    Command::new(assert_cmd::cargo::cargo_bin!("odoo-resource"))
}

/// Command isolated from any config file or `ODOO_*` variable on the host.
fn isolated_cmd(dir: &TempDir) -> Command {
    let mut cmd = cmd();
    cmd.current_dir(dir.path())
        .env("HOME", dir.path())
        .env_remove("RUST_LOG")
        .env_remove("ODOO_URL")
        .env_remove("ODOO_DB")
        .env_remove("ODOO_USERNAME")
        .env_remove("ODOO_PASSWORD")
        .env_remove("ODOO_TIMEOUT")
        .env_remove("ODOO_SEARCH_LIMIT");
    cmd
}

/// Command pointed at a mock Odoo server through environment variables.
fn connected_cmd(dir: &TempDir, server: &ServerGuard) -> Command {
    let mut cmd = isolated_cmd(dir);
    cmd.env("ODOO_URL", server.url())
        .env("ODOO_DB", "odoo")
        .env("ODOO_USERNAME", "admin")
        .env("ODOO_PASSWORD", "admin");
    cmd
}

fn rpc_reply(result: serde_json::Value) -> String {
    json!({ "jsonrpc": "2.0", "id": 1, "result": result }).to_string()
}

fn mock_odoo(server: &mut ServerGuard) {
    server
        .mock("POST", "/jsonrpc")
        .match_body(Matcher::Regex(r#""method":"login""#.into()))
        .with_body(rpc_reply(json!(2)))
        .create();
    server
        .mock("POST", "/jsonrpc")
        .match_body(Matcher::Regex(r#""ir\.model","search_read""#.into()))
        .with_body(rpc_reply(json!([
            { "id": 1, "model": "res.partner" },
            { "id": 2, "model": "res.users" }
        ])))
        .create();
    server
        .mock("POST", "/jsonrpc")
        .match_body(Matcher::Regex(r#""res\.partner","read",\[\[999\]\]"#.into()))
        .with_body(rpc_reply(json!([])))
        .create();
    server
        .mock("POST", "/jsonrpc")
        .match_body(Matcher::Regex(r#""res\.partner","search_read""#.into()))
        .with_body(rpc_reply(json!([{ "id": 1, "name": "Acme" }])))
        .create();
}

mod parse_command {
    use super::*;

    #[test]
    fn parse_models() {
        cmd()
            .args(["parse", "odoo://models"])
            .assert()
            .success()
            .stdout(predicate::str::contains(r#"{"kind":"list_types"}"#));
    }

    #[test]
    fn parse_record() {
        cmd()
            .args(["parse", "odoo://record/res.partner/42"])
            .assert()
            .success()
            .stdout(predicate::str::contains(r#""type_name":"res.partner""#))
            .stdout(predicate::str::contains(r#""record_id":"42""#));
    }

    #[test]
    fn parse_search_keeps_domain_text() {
        cmd()
            .args(["parse", r#"odoo://search/res.partner/[["is_company","=",true]]"#])
            .assert()
            .success()
            .stdout(predicate::str::contains(r#""kind":"search_records""#));
    }

    #[test]
    fn parse_pretty() {
        cmd()
            .args(["parse", "odoo://model/res.partner", "--pretty"])
            .assert()
            .success()
            .stdout(predicate::str::contains("{\n"));
    }

    #[test]
    fn parse_invalid_shape() {
        cmd()
            .args(["parse", "odoo://record/res.partner/1/2"])
            .assert()
            .code(2)
            .stderr(predicate::str::contains("Invalid record resource format"));
    }

    #[test]
    fn parse_unknown_resource() {
        cmd()
            .args(["parse", "odoo://bogus"])
            .assert()
            .code(2)
            .stderr(predicate::str::contains("Unknown resource: odoo://bogus"));
    }
}

mod templates_command {
    use super::*;

    #[test]
    fn lists_all_templates() {
        cmd()
            .arg("templates")
            .assert()
            .success()
            .stdout(predicate::str::contains("odoo://models"))
            .stdout(predicate::str::contains("odoo://model/{model_name}"))
            .stdout(predicate::str::contains("odoo://record/{model_name}/{record_id}"))
            .stdout(predicate::str::contains("odoo://search/{model_name}/{domain}"));
    }
}

mod get_command {
    use super::*;

    #[test]
    fn get_models() {
        let dir = TempDir::new().unwrap();
        let mut server = mockito::Server::new();
        mock_odoo(&mut server);

        connected_cmd(&dir, &server)
            .args(["get", "odoo://models"])
            .assert()
            .success()
            .stdout(predicate::str::contains(r#"["res.partner","res.users"]"#));
    }

    #[test]
    fn get_logs_request_at_default_level() {
        let dir = TempDir::new().unwrap();
        let mut server = mockito::Server::new();
        mock_odoo(&mut server);

        connected_cmd(&dir, &server)
            .args(["get", "odoo://models"])
            .assert()
            .success()
            .stderr(predicate::str::contains("resource request"))
            .stderr(predicate::str::contains("odoo://models"));
    }

    #[test]
    fn get_missing_record_exits_1() {
        let dir = TempDir::new().unwrap();
        let mut server = mockito::Server::new();
        mock_odoo(&mut server);

        connected_cmd(&dir, &server)
            .args(["get", "odoo://record/res.partner/999"])
            .assert()
            .code(1)
            .stderr(predicate::str::contains(
                "Record not found: res.partner ID 999",
            ));
    }

    #[test]
    fn get_bad_record_id_exits_2() {
        let dir = TempDir::new().unwrap();
        let server = mockito::Server::new();

        connected_cmd(&dir, &server)
            .args(["get", "odoo://record/res.partner/abc"])
            .assert()
            .code(2)
            .stderr(predicate::str::contains("invalid record ID"));
    }

    #[test]
    fn get_search_to_output_file() {
        let dir = TempDir::new().unwrap();
        let mut server = mockito::Server::new();
        mock_odoo(&mut server);
        let output = dir.path().join("out.json");

        connected_cmd(&dir, &server)
            .args([
                "get",
                r#"odoo://search/res.partner/[["is_company","=",true]]"#,
                "--output",
                output.to_str().unwrap(),
            ])
            .assert()
            .success()
            .stdout(predicate::str::is_empty());

        let content = fs::read_to_string(&output).unwrap();
        assert!(content.contains(r#""name":"Acme""#));
    }

    #[test]
    fn get_backend_down_exits_3() {
        let dir = TempDir::new().unwrap();
        let mut server = mockito::Server::new();
        server.mock("POST", "/jsonrpc").with_status(503).create();

        connected_cmd(&dir, &server)
            .args(["get", "odoo://models"])
            .assert()
            .code(3);
    }

    #[test]
    fn get_reads_config_file() {
        let dir = TempDir::new().unwrap();
        let mut server = mockito::Server::new();
        mock_odoo(&mut server);
        let config = dir.path().join("custom.json");
        fs::write(
            &config,
            json!({
                "url": server.url(),
                "db": "odoo",
                "username": "admin",
                "password": "admin"
            })
            .to_string(),
        )
        .unwrap();

        isolated_cmd(&dir)
            .args(["--config", config.to_str().unwrap(), "get", "odoo://models"])
            .assert()
            .success()
            .stdout(predicate::str::contains("res.partner"));
    }

    #[test]
    fn get_picks_up_default_config_file() {
        let dir = TempDir::new().unwrap();
        let mut server = mockito::Server::new();
        mock_odoo(&mut server);
        fs::write(
            dir.path().join("odoo_config.json"),
            json!({
                "url": server.url(),
                "db": "odoo",
                "username": "admin",
                "password": "admin"
            })
            .to_string(),
        )
        .unwrap();

        isolated_cmd(&dir)
            .args(["get", "odoo://models"])
            .assert()
            .success();
    }
}

mod stdio_command {
    use super::*;

    #[test]
    fn reads_resource_over_stdin() {
        let dir = TempDir::new().unwrap();
        let mut server = mockito::Server::new();
        mock_odoo(&mut server);

        let input = concat!(
            r#"{"jsonrpc":"2.0","id":1,"method":"initialize","params":{}}"#,
            "\n",
            r#"{"jsonrpc":"2.0","method":"notifications/initialized"}"#,
            "\n",
            r#"{"jsonrpc":"2.0","id":2,"method":"resources/read","params":{"uri":"odoo://models"}}"#,
            "\n",
        );

        let output = connected_cmd(&dir, &server)
            .arg("stdio")
            .write_stdin(input)
            .assert()
            .success()
            .get_output()
            .stdout
            .clone();

        let text = String::from_utf8(output).unwrap();
        let lines: Vec<serde_json::Value> = text
            .lines()
            .map(|l| serde_json::from_str(l).unwrap())
            .collect();
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0]["id"], 1);
        assert_eq!(
            lines[1]["result"]["contents"][0]["text"],
            r#"["res.partner","res.users"]"#
        );
    }
}

mod error_handling {
    use super::*;

    #[test]
    fn missing_settings() {
        let dir = TempDir::new().unwrap();

        isolated_cmd(&dir)
            .args(["get", "odoo://models"])
            .assert()
            .code(2)
            .stderr(predicate::str::contains("missing setting 'url'"));
    }

    #[test]
    fn explicit_config_not_found() {
        let dir = TempDir::new().unwrap();

        isolated_cmd(&dir)
            .args(["--config", "/nonexistent/odoo.json", "get", "odoo://models"])
            .assert()
            .code(3)
            .stderr(predicate::str::contains("config file not found"));
    }

    #[test]
    fn invalid_config_json() {
        let dir = TempDir::new().unwrap();
        let config = dir.path().join("bad.json");
        fs::write(&config, "{ not valid json").unwrap();

        isolated_cmd(&dir)
            .args(["--config", config.to_str().unwrap(), "get", "odoo://models"])
            .assert()
            .code(2)
            .stderr(predicate::str::contains("invalid config JSON"));
    }

    #[test]
    fn password_never_logged() {
        let dir = TempDir::new().unwrap();
        let mut server = mockito::Server::new();
        mock_odoo(&mut server);

        connected_cmd(&dir, &server)
            .env("ODOO_PASSWORD", "s3cr3t-value")
            .args(["--verbose", "get", "odoo://models"])
            .assert()
            .stderr(predicate::str::contains("s3cr3t-value").not());
    }
}

mod help_and_version {
    use super::*;

    #[test]
    fn help_flag() {
        cmd()
            .arg("--help")
            .assert()
            .success()
            .stdout(predicate::str::contains("Resolve odoo:// resource URIs"));
    }

    #[test]
    fn version_flag() {
        cmd()
            .arg("--version")
            .assert()
            .success()
            .stdout(predicate::str::contains("odoo-resource"));
    }

    #[test]
    fn get_help() {
        cmd()
            .args(["get", "--help"])
            .assert()
            .success()
            .stdout(predicate::str::contains("--pretty"))
            .stdout(predicate::str::contains("--output"));
    }

    #[test]
    fn missing_subcommand() {
        cmd().assert().failure();
    }
}
