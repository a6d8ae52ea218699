use anyhow::Result;
use assert_cmd::Command;
use assert_fs::NamedTempFile;
use assert_fs::prelude::*;
use predicates::prelude::*;

const SCHEMA: &str = r#"{
    "@context": "http://www.w3.org/ns/shex.jsonld",
    "type": "Schema",
    "start": "http://example.org/Person",
    "shapes": [{
        "type": "ShapeDecl",
        "id": "http://example.org/Person",
        "shapeExpr": {
            "type": "Shape",
            "expression": {
                "type": "EachOf",
                "expressions": [
                    {
                        "type": "TripleConstraint",
                        "predicate": "http://example.org/name",
                        "valueExpr": {"type": "NodeConstraint", "nodeKind": "literal"}
                    },
                    {
                        "type": "TripleConstraint",
                        "predicate": "http://example.org/knows",
                        "valueExpr": "http://example.org/Person",
                        "min": 0,
                        "max": -1
                    }
                ]
            }
        }
    }]
}"#;

const DATA: &str = "@prefix ex: <http://example.org/> .
ex:alice ex:name \"Alice\" ; ex:knows ex:bob .
ex:bob ex:name \"Bob\" ; ex:knows ex:alice .
ex:carol ex:knows ex:alice .
ex:dave ex:name \"Dave\" ; ex:knows ex:carol .
";

fn cli_command() -> Result<Command> {
    Ok(Command::cargo_bin("oxshex")?)
}

fn input_files() -> Result<(NamedTempFile, NamedTempFile)> {
    let schema = NamedTempFile::new("schema.json")?;
    schema.write_str(SCHEMA)?;
    let data = NamedTempFile::new("data.ttl")?;
    data.write_str(DATA)?;
    Ok((schema, data))
}

#[test]
fn cli_help() -> Result<()> {
    cli_command()?
        .assert()
        .failure()
        .stdout("")
        .stderr(predicate::str::contains("Usage: oxshex"));
    cli_command()?
        .arg("validate")
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("--shape-map"));
    Ok(())
}

#[test]
fn cli_validate_conformant_node() -> Result<()> {
    let (schema, data) = input_files()?;
    cli_command()?
        .arg("validate")
        .arg("--schema")
        .arg(schema.path())
        .arg("--data")
        .arg(data.path())
        .arg("--node")
        .arg("http://example.org/alice")
        .arg("--shape")
        .arg("http://example.org/Person")
        .assert()
        .success()
        .stdout("")
        .stderr("");
    Ok(())
}

#[test]
fn cli_validate_nonconformant_node() -> Result<()> {
    let (schema, data) = input_files()?;
    cli_command()?
        .arg("validate")
        .arg("-x")
        .arg(schema.path())
        .arg("-d")
        .arg(data.path())
        .arg("-n")
        .arg("http://example.org/carol")
        .arg("-s")
        .arg("http://example.org/Person")
        .assert()
        .code(1)
        .stderr("<http://example.org/carol>@<http://example.org/Person> failed\n");
    Ok(())
}

#[test]
fn cli_validate_start_shape() -> Result<()> {
    let (schema, data) = input_files()?;
    cli_command()?
        .arg("validate")
        .arg("--schema")
        .arg(schema.path())
        .arg("--data")
        .arg(data.path())
        .arg("--node")
        .arg("http://example.org/dave")
        .assert()
        .code(1)
        .stderr("<http://example.org/dave>@START failed\n");
    Ok(())
}

#[test]
fn cli_validate_debug_output() -> Result<()> {
    let (schema, data) = input_files()?;
    cli_command()?
        .arg("validate")
        .arg("--schema")
        .arg(schema.path())
        .arg("--data")
        .arg(data.path())
        .arg("--node")
        .arg("http://example.org/bob")
        .arg("--debug")
        .assert()
        .success()
        .stdout("<http://example.org/bob>@START passed\nResult: passed\n");
    Ok(())
}

#[test]
fn cli_validate_shape_map() -> Result<()> {
    let (schema, data) = input_files()?;
    let shape_map = NamedTempFile::new("map.json")?;
    shape_map.write_str(
        r#"[
            {"node": {"subject": "FOCUS", "predicate": "http://example.org/knows", "object": "http://example.org/alice"}, "shape": "http://example.org/Person"},
            {"node": "http://example.org/dave", "shape": "http://example.org/Person"},
            {"node": "http://example.org/bob", "shape": "START"}
        ]"#,
    )?;
    cli_command()?
        .arg("validate")
        .arg("--schema")
        .arg(schema.path())
        .arg("--data")
        .arg(data.path())
        .arg("--shape-map")
        .arg(shape_map.path())
        .assert()
        .code(1)
        .stderr(
            "<http://example.org/carol>@<http://example.org/Person> failed\n<http://example.org/dave>@<http://example.org/Person> failed\n",
        );

    cli_command()?
        .arg("validate")
        .arg("--schema")
        .arg(schema.path())
        .arg("--data")
        .arg(data.path())
        .arg("--shape-map")
        .arg(shape_map.path())
        .arg("--bail")
        .assert()
        .code(1)
        .stderr("<http://example.org/carol>@<http://example.org/Person> failed\n");
    Ok(())
}

#[test]
fn cli_validate_with_explicit_format_and_base() -> Result<()> {
    let schema = NamedTempFile::new("schema.json")?;
    schema.write_str(SCHEMA)?;
    let data = NamedTempFile::new("data.txt")?;
    data.write_str("<alice> <name> \"Alice\" .")?;
    cli_command()?
        .arg("validate")
        .arg("--schema")
        .arg(schema.path())
        .arg("--data")
        .arg(data.path())
        .arg("--format")
        .arg("text/turtle")
        .arg("--base")
        .arg("http://example.org/")
        .arg("--node")
        .arg("http://example.org/alice")
        .assert()
        .success();
    Ok(())
}

#[test]
fn cli_unknown_data_extension() -> Result<()> {
    let schema = NamedTempFile::new("schema.json")?;
    schema.write_str(SCHEMA)?;
    let data = NamedTempFile::new("data.foo")?;
    data.write_str("")?;
    cli_command()?
        .arg("validate")
        .arg("--schema")
        .arg(schema.path())
        .arg("--data")
        .arg(data.path())
        .arg("--node")
        .arg("http://example.org/alice")
        .assert()
        .failure()
        .stderr(predicate::str::contains("'foo' is unknown"));
    Ok(())
}

#[test]
fn cli_invalid_schema() -> Result<()> {
    let schema = NamedTempFile::new("schema.json")?;
    schema.write_str(r#"{"type": "Schema", "shapes": [{"type": "Foo"}]}"#)?;
    let data = NamedTempFile::new("data.ttl")?;
    data.write_str(DATA)?;
    cli_command()?
        .arg("validate")
        .arg("--schema")
        .arg(schema.path())
        .arg("--data")
        .arg(data.path())
        .arg("--node")
        .arg("http://example.org/alice")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid ShExJ schema"));
    Ok(())
}

#[test]
fn cli_requires_node_or_shape_map() -> Result<()> {
    let (schema, data) = input_files()?;
    cli_command()?
        .arg("validate")
        .arg("--schema")
        .arg(schema.path())
        .arg("--data")
        .arg(data.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("--shape-map"));
    Ok(())
}
