//! Transcript properties of the direct-eval (JavaScript) backend.

use codepad::execution::script;
use codepad::transcript::Tag;

#[test]
fn log_line_for_each_console_call() {
    let lines = script::run(r#"console.log("hi");"#);
    assert_eq!(lines.len(), 1);
    assert_eq!(lines[0].tag, Tag::Output);
    assert_eq!(lines[0].text, "hi");
}

#[test]
fn return_value_becomes_one_trailing_return_line() {
    let lines = script::run("return 1+1");
    assert_eq!(lines.len(), 1);
    assert_eq!(lines[0].tag, Tag::Return);
    assert_eq!(lines[0].text, "2");
}

#[test]
fn channel_order_is_chronological() {
    let lines = script::run(
        r#"
        console.log("first");
        console.warn("second");
        console.error("third");
        console.log("fourth");
        "#,
    );
    let tags: Vec<Tag> = lines.iter().map(|l| l.tag).collect();
    assert_eq!(tags, vec![Tag::Output, Tag::Warn, Tag::Error, Tag::Output]);
    let texts: Vec<&str> = lines.iter().map(|l| l.text.as_str()).collect();
    assert_eq!(texts, vec!["first", "second", "third", "fourth"]);
}

#[test]
fn return_line_comes_after_all_output() {
    let lines = script::run(
        r#"
        console.log("a");
        console.warn("b");
        return 40 + 2;
        "#,
    );
    assert_eq!(lines.len(), 3);
    let returns: Vec<_> = lines.iter().filter(|l| l.tag == Tag::Return).collect();
    assert_eq!(returns.len(), 1);
    assert_eq!(lines.last().unwrap().tag, Tag::Return);
    assert_eq!(lines.last().unwrap().text, "42");
}

#[test]
fn undefined_result_emits_no_return_line() {
    let lines = script::run(r#"console.log("only output");"#);
    assert!(lines.iter().all(|l| l.tag != Tag::Return));

    // A null result is a value and does get reported.
    let lines = script::run("return null");
    assert_eq!(lines.len(), 1);
    assert_eq!(lines[0].tag, Tag::Return);
    assert_eq!(lines[0].text, "null");
}

#[test]
fn thrown_string_preserves_prior_output() {
    let lines = script::run(
        r#"
        console.log("before");
        throw "boom";
        "#,
    );
    assert_eq!(lines.len(), 2);
    assert_eq!(lines[0].tag, Tag::Output);
    assert_eq!(lines[0].text, "before");
    assert_eq!(lines[1].tag, Tag::Error);
    assert!(lines[1].text.contains("boom"), "got: {}", lines[1].text);
}

#[test]
fn thrown_error_object_keeps_its_message() {
    let lines = script::run(r#"throw new Error("kaput");"#);
    assert_eq!(lines.len(), 1);
    assert_eq!(lines[0].tag, Tag::Error);
    assert!(lines[0].text.contains("kaput"), "got: {}", lines[0].text);
}

#[test]
fn runtime_errors_become_one_error_line() {
    let lines = script::run("definitely_not_defined();");
    assert_eq!(lines.len(), 1);
    assert_eq!(lines[0].tag, Tag::Error);
    assert!(
        lines[0].text.contains("not defined"),
        "got: {}",
        lines[0].text
    );
}

#[test]
fn objects_render_as_pretty_json() {
    let lines = script::run(r#"console.log({ answer: 42 });"#);
    assert_eq!(lines.len(), 1);
    assert_eq!(lines[0].tag, Tag::Output);
    assert!(lines[0].text.contains("\"answer\": 42"), "got: {}", lines[0].text);
}

#[test]
fn multiple_console_arguments_join_with_spaces() {
    let lines = script::run(r#"console.log("x", 1, true);"#);
    assert_eq!(lines.len(), 1);
    assert_eq!(lines[0].text, "x 1 true");
}

#[test]
fn no_state_leaks_between_runs() {
    let first = script::run("globalThis.counter = (globalThis.counter || 0) + 1; return globalThis.counter;");
    let second = script::run("globalThis.counter = (globalThis.counter || 0) + 1; return globalThis.counter;");
    assert_eq!(first.last().unwrap().text, "1");
    assert_eq!(second.last().unwrap().text, "1");
}
