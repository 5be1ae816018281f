//! End-to-end replacement tests over complete documents.

mod common;

use std::sync::Arc;
use std::thread;

use common::{canonical, load_fixture, marker_texts, wrap_body};
use dom_flip_lib::{Dictionary, Document, ReplaceOptions, ReplacementSession, ReplacerConfig, RewriteError};

fn dictionary() -> Arc<Dictionary> {
    Arc::new(Dictionary::from_json_str(&load_fixture("categories.json")).unwrap())
}

fn session(config: ReplacerConfig) -> ReplacementSession {
    ReplacementSession::new(dictionary(), config).with_seed(2024)
}

fn forward(input: &str) -> String {
    session(ReplacerConfig::default())
        .process(input, "dict1", "dict2", &ReplaceOptions::default())
        .unwrap()
}

fn assert_same_markup(actual: &str, expected_body: &str) {
    assert_eq!(canonical(actual), canonical(&wrap_body(expected_body)));
}

#[test]
fn single_replacement_in_h1() {
    let out = forward("<h1>Title with term1!</h1>");
    assert_eq!(
        out,
        wrap_body(r#"<h1>Title with <span class="replaced-term" title="term1">flippedterm1</span>!</h1>"#)
    );
}

#[test]
fn multiple_replacements_in_same_tag() {
    assert_same_markup(
        &forward("<p>Text with term1 and term3 together</p>"),
        r#"<p>Text with <span class="replaced-term" title="term1">flippedterm1</span> and <span class="replaced-term" title="term3">flippedterm3</span> together</p>"#,
    );
}

#[test]
fn multiple_replacements_in_nested_tags() {
    assert_same_markup(
        &forward("<div>Text with term1 <p>and term3</p> inside</div>"),
        r#"<div>Text with <span class="replaced-term" title="term1">flippedterm1</span> <p>and <span class="replaced-term" title="term3">flippedterm3</span></p> inside</div>"#,
    );
}

#[test]
fn ambiguous_replacement_uses_registered_option() {
    for seed in 0..20 {
        let out = ReplacementSession::new(dictionary(), ReplacerConfig::default())
            .with_seed(seed)
            .process(
                "<p>This term term4amb is ambiguous</p>",
                "dict1",
                "dict2",
                &ReplaceOptions::default(),
            )
            .unwrap();

        let options = ["flippedterm4ambopt1", "flippedterm4ambopt2"];
        let matched = options.iter().any(|option| {
            canonical(&out)
                == canonical(&wrap_body(&format!(
                    r#"<p>This term <span class="replaced-term ambiguous-term" title="term4amb">{option}</span> is ambiguous</p>"#
                )))
        });
        assert!(matched, "unexpected output for seed {seed}: {out}");
    }
}

#[test]
fn ambiguous_selection_is_reproducible_with_seed() {
    let input = "<p>term4amb term4amb term4amb term2 term2 term2</p>";
    let first = session(ReplacerConfig::default())
        .process(input, "dict1", "dict2", &ReplaceOptions::default())
        .unwrap();
    let second = session(ReplacerConfig::default())
        .process(input, "dict1", "dict2", &ReplaceOptions::default())
        .unwrap();

    assert_eq!(first, second);
}

#[test]
fn existing_marker_is_not_reprocessed() {
    assert_same_markup(
        &forward(r#"<div><span class="replaced-term">Text with term1</span> <p>and term3</p></div>"#),
        r#"<div><span class="replaced-term">Text with term1</span> <p>and <span class="replaced-term" title="term3">flippedterm3</span></p></div>"#,
    );
}

#[test]
fn attributes_are_never_replaced() {
    assert_same_markup(
        &forward(r#"<div>The term1 is replaced but <img title="this term3 should not be replaced" /> and this term3 is replaced.</div>"#),
        r#"<div>The <span class="replaced-term" title="term1">flippedterm1</span> is replaced but <img title="this term3 should not be replaced"> and this <span class="replaced-term" title="term3">flippedterm3</span> is replaced.</div>"#,
    );
}

#[test]
fn comments_are_never_replaced() {
    assert_same_markup(
        &forward("<p><!-- term1 -->term3</p>"),
        r#"<p><!-- term1 --><span class="replaced-term" title="term3">flippedterm3</span></p>"#,
    );
}

#[test]
fn single_words_in_headings() {
    assert_same_markup(
        &forward("<h1>term1</h1> and also <h2>term3</h2>"),
        r#"<h1><span class="replaced-term" title="term1">flippedterm1</span></h1> and also <h2><span class="replaced-term" title="term3">flippedterm3</span></h2>"#,
    );
}

#[test]
fn substrings_of_longer_words_are_not_matched() {
    let input = "<p>term1s and preterm1 stay</p>";
    assert_eq!(forward(input), wrap_body(input));
}

#[test]
fn matching_ignores_case_and_output_keeps_it() {
    let out = forward("<p>TERM1 and Term3</p>");
    assert_eq!(marker_texts(&out, "replaced-term"), vec!["FLIPPEDTERM1", "Flippedterm3"]);
}

#[test]
fn replacing_both_ways() {
    let out = session(ReplacerConfig::default())
        .process(
            "<p>Replacing term1 but also flippedterm3</p>",
            "dict1",
            "dict2",
            &ReplaceOptions::default().both_ways(),
        )
        .unwrap();

    assert_same_markup(
        &out,
        r#"<p>Replacing <span class="replaced-term" title="term1">flippedterm1</span> but also <span class="replaced-term" title="flippedterm3">term3</span></p>"#,
    );
}

#[test]
fn one_way_pass_is_idempotent() {
    let input = "<div>term1 <b>term2</b> and term4amb, <i>nothing</i> term3.</div>";
    let once = forward(input);
    let twice = forward(&once);

    assert_eq!(once, twice);
}

#[test]
fn second_pass_on_same_tree_finds_nothing() {
    let mut session = session(ReplacerConfig::default());
    let mut document = Document::parse("<p>term1 and term3</p>");

    let first = session.rewrite(&mut document, "dict1", "dict2").unwrap();
    let after_first = document.serialize();
    let second = session.rewrite(&mut document, "dict1", "dict2").unwrap();

    assert_eq!(first.replacements, 2);
    assert_eq!(second.replacements, 0);
    assert_eq!(document.serialize(), after_first);
}

#[test]
fn reverse_pass_does_not_touch_fresh_markers() {
    let mut session = session(ReplacerConfig::default());
    let mut document = Document::parse("<p>term1</p>");

    session.rewrite(&mut document, "dict1", "dict2").unwrap();
    let reverse = session.rewrite(&mut document, "dict2", "dict1").unwrap();

    assert_eq!(reverse.replacements, 0);
    assert_eq!(marker_texts(&document.serialize(), "replaced-term"), vec!["flippedterm1"]);
}

#[test]
fn hide_original_term() {
    let out = session(ReplacerConfig {
        show_original_term: false,
        ..ReplacerConfig::default()
    })
    .process("<p>term1</p>", "dict1", "dict2", &ReplaceOptions::default())
    .unwrap();

    assert!(!out.contains("title="));
    assert_same_markup(&out, r#"<p><span class="replaced-term">flippedterm1</span></p>"#);
}

#[test]
fn show_dictionary_keys() {
    let out = session(ReplacerConfig {
        show_dictionary_keys: true,
        ..ReplacerConfig::default()
    })
    .process("<p>term1</p>", "dict1", "dict2", &ReplaceOptions::default())
    .unwrap();

    assert_same_markup(
        &out,
        r#"<p><span class="replaced-term" title="term1" data-replaced-from="dict1" data-replaced-to="dict2">flippedterm1</span></p>"#,
    );
}

#[test]
fn show_dictionary_keys_uses_literal_call_keys() {
    let out = session(ReplacerConfig {
        show_dictionary_keys: true,
        ..ReplacerConfig::default()
    })
    .process("<p>term1</p>", "DICT1", "Dict2", &ReplaceOptions::default())
    .unwrap();

    assert!(out.contains(r#"data-replaced-from="DICT1""#));
    assert!(out.contains(r#"data-replaced-to="Dict2""#));
    assert!(out.contains(">flippedterm1</span>"));
}

#[test]
fn suggestion_mode_keeps_text_and_lists_options() {
    let out = session(ReplacerConfig {
        suggestion_mode: true,
        ..ReplacerConfig::default()
    })
    .process(
        "<p>Term2 and term4amb</p>",
        "dict1",
        "dict2",
        &ReplaceOptions::default(),
    )
    .unwrap();

    assert_same_markup(
        &out,
        r#"<p><span class="replaced-term" data-replacement-options="['flippedterm2opt1','flippedterm2opt2']">Term2</span> and <span class="replaced-term ambiguous-term" data-replacement-options="['flippedterm4ambopt1','flippedterm4ambopt2']">term4amb</span></p>"#,
    );
}

#[test]
fn suggestion_mode_with_missing_target_lists_nothing() {
    let out = session(ReplacerConfig {
        suggestion_mode: true,
        ..ReplacerConfig::default()
    })
    .process("<p>term1</p>", "dict1", "nowhere", &ReplaceOptions::default())
    .unwrap();

    assert!(out.contains(r#"data-replacement-options="[]""#));
    assert_eq!(marker_texts(&out, "replaced-term"), vec!["term1"]);
}

#[test]
fn missing_target_key_leaves_text_unchanged() {
    let out = session(ReplacerConfig::default())
        .process("<p>term1</p>", "dict1", "nowhere", &ReplaceOptions::default())
        .unwrap();

    assert_eq!(out, wrap_body("<p>term1</p>"));
}

#[test]
fn custom_classes_and_marker_tag() {
    let dictionary = Dictionary::from_json_str(&load_fixture("custom_classes.json")).unwrap();
    let mut session = ReplacementSession::new(
        Arc::new(dictionary),
        ReplacerConfig {
            marker_tag: "mark".to_string(),
            term_class: "customClass".to_string(),
            ambiguous_class: "customAmbiguousClass".to_string(),
            ..ReplacerConfig::default()
        },
    );

    let out = session
        .process(
            "<p>terminology to replace and ambiguous adjective</p>",
            "dict1",
            "dict2",
            &ReplaceOptions::default(),
        )
        .unwrap();

    assert!(!out.contains("<span"));
    assert_same_markup(
        &out,
        r#"<p><mark class="customClass" title="terminology">reverseterminology</mark> to replace and ambiguous <mark class="customClass customAmbiguousClass" title="adjective">reverseadjective</mark></p>"#,
    );
}

#[test]
fn empty_term_class_from_json_still_blocks_reverse_pass() {
    let config = ReplacerConfig::from_json_str(r#"{ "termClass": "" }"#).unwrap();
    let out = session(config)
        .process(
            "<p>my term1</p>",
            "dict1",
            "dict2",
            &ReplaceOptions::default().both_ways(),
        )
        .unwrap();

    assert_same_markup(
        &out,
        r#"<p>my <span class="replaced-term" title="term1">flippedterm1</span></p>"#,
    );
}

#[test]
fn empty_term_class_in_code_is_rejected() {
    let result = session(ReplacerConfig {
        term_class: String::new(),
        ..ReplacerConfig::default()
    })
    .process("<p>term1</p>", "dict1", "dict2", &ReplaceOptions::default());

    assert!(matches!(result, Err(RewriteError::InvalidClassName(_))));
}

#[test]
fn full_page_with_head_injections() {
    let mut session = session(ReplacerConfig {
        css: Some(".replaced-term { background: yellow; }".to_string()),
        ..ReplacerConfig::default()
    });

    let out = session
        .process(
            r#"<!DOCTYPE html><html><head><title>term1</title><script>var term1;</script></head><body><p>term1</p><script>term3()</script></body></html>"#,
            "dict1",
            "dict2",
            &ReplaceOptions::default().with_base_url("https://en.wikipedia.org"),
        )
        .unwrap();

    assert!(out.starts_with("<!DOCTYPE html><html><head><base "));
    assert!(out.contains("<style>.replaced-term { background: yellow; }</style><title>term1</title>"));
    assert!(!out.contains("<script"));
    assert_eq!(marker_texts(&out, "replaced-term"), vec!["flippedterm1"]);
}

#[test]
fn sessions_process_documents_concurrently() {
    let base = session(ReplacerConfig::default());
    let inputs: Vec<String> = (0..8).map(|i| format!("<p>Doc {i}: term1 and term3</p>")).collect();

    let handles: Vec<_> = inputs
        .into_iter()
        .map(|input| {
            let mut worker = base.fork();
            thread::spawn(move || {
                worker
                    .process(&input, "dict1", "dict2", &ReplaceOptions::default())
                    .unwrap()
            })
        })
        .collect();

    for handle in handles {
        let out = handle.join().unwrap();
        assert_eq!(marker_texts(&out, "replaced-term"), vec!["flippedterm1", "flippedterm3"]);
    }
}
