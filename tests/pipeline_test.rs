//! End-to-end corpus conversion tests
//!
//! Builds a synthetic HTML corpus in a temp directory, runs the full
//! converter, and inspects the Markdown trees and aggregates it writes.

use std::path::Path;

use doc4md::corpus::{ConvertOptions, CorpusConverter};

mod common;
use common::{command_page, minimal_command_page, PageSpec, TestCorpus};

fn read(path: &Path) -> String {
    std::fs::read_to_string(path).unwrap_or_else(|e| panic!("reading {}: {e}", path.display()))
}

/// Corpus with one richly-featured page plus the satellite pages it links.
fn build_corpus() -> TestCorpus {
    let corpus = TestCorpus::new();

    corpus.write_page(
        "BEEP.301-100.en.html",
        &command_page(&PageSpec {
            theme: "User Interface",
            syntax: "BEEP ( duration )",
            param_rows: r#"<tr><td>duration</td><td><img src="pict/in_out1.png"/></td><td>Integer</td><td>Duration in ticks</td></tr>"#,
            description: r#"<p class="rte4d">Emits a system beep. The <span class="rte4d_prm">duration</span> is in ticks.</p>
<p>Related: <a href="PLAY.301-200.en.html">PLAY</a> and <a href="GONE.301-999.en.html">GONE</a>.</p>
<p><img src="pict/beep.png"/></p>
<div class="code4d"><pre>C_LONGINT($d)
`half a second
BEEP($d)</pre></div>"#,
            see_also: r#"<a href="PLAY.301-200.en.html">PLAY</a>"#,
            ..Default::default()
        }),
    );
    corpus.write_page(
        "PLAY.301-200.en.html",
        &command_page(&PageSpec {
            theme: "User Interface",
            syntax: "PLAY ( sound )",
            param_rows: r#"<tr><td>sound</td><td><img src="pict/in_out1.png"/></td><td>Text</td><td>Sound name</td></tr>"#,
            description: r#"<p class="rte4d">Plays a sound. Nothing else.</p>"#,
            ..Default::default()
        }),
    );
    // Second referrer of the broken link, to exercise the negative cache.
    corpus.write_page(
        "ECHO.301-300.en.html",
        &command_page(&PageSpec {
            theme: "User Interface",
            description: r#"<p class="rte4d">Echoes. See <a href="GONE.301-999.en.html">GONE</a>.</p>"#,
            ..Default::default()
        }),
    );
    // WritePro page: write-pro family marker and a wp slug.
    corpus.write_page(
        "WP-PRINT.301-600.en.html",
        &command_page(&PageSpec {
            family_marker: "100-6993921",
            theme: "Write Pro",
            syntax: "WP PRINT ( document )",
            param_rows: r#"<tr><td>document</td><td><img src="pict/in_out1.png"/></td><td>Object</td><td>Document</td></tr>"#,
            description: r#"<p class="rte4d">Prints a document. Done.</p><p><img src="pict/wp.png"/></p>"#,
            ..Default::default()
        }),
    );
    // Translated page: converted, but not indexed.
    corpus.write_page(
        "SUMME.301-100.de.html",
        &command_page(&PageSpec {
            description: r#"<p class="rte4d">Summiert eine Reihe. Ende.</p>"#,
            ..Default::default()
        }),
    );
    // Skipped-language page, deprecated page, and an overview page that
    // only matches the filename convention.
    corpus.write_page("BEEP.301-100.fr.html", &minimal_command_page());
    corpus.write_page("o-POLY.301-400.en.html", &minimal_command_page());
    corpus.write_page("ORIENT.301-500.en.html", "<html><body>overview</body></html>");

    corpus.write_asset("pict/beep.png", b"beep-png");
    corpus.write_asset("pict/wp.png", b"wp-png");
    corpus
}

#[test]
fn test_full_corpus_conversion() {
    let corpus = build_corpus();
    let out = tempfile::tempdir().unwrap();

    let converter =
        CorpusConverter::new(ConvertOptions::new(corpus.root(), out.path())).unwrap();
    let tasks = converter.plan().unwrap();
    // fr page dropped in planning; deprecated and overview pages are
    // planned but skipped at the content gate.
    assert_eq!(tasks.len(), 7);

    let summary = converter.run(&tasks, || {}).unwrap();
    assert_eq!(summary.converted, 5);
    assert_eq!(summary.skipped, 2);
    assert_eq!(summary.failed, 0);

    let beep = read(&out.path().join("en/commands-legacy/beep.md"));

    // Front matter
    assert!(beep.starts_with(
        "---\nid: beep\ntitle: BEEP\nslug: /commands/beep\ndisplayed_sidebar: docs\n---\n"
    ));
    // Annotated syntax inside its reference block
    assert!(beep.contains(
        "<!--REF #_command_.BEEP.Syntax-->**BEEP** ( *duration* )<!-- END REF-->"
    ));
    // Parameter table: heading row gains the spacer column, data row keeps
    // the direction glyph.
    assert!(beep.contains("| Parameter | Type |  | Description |"));
    assert!(beep.contains("| duration | → | Integer | Duration in ticks |"));
    // Summary block wraps the first sentence
    assert!(beep.contains(
        "<!--REF #_command_.BEEP.Summary-->Emits a system beep.<!-- END REF-->"
    ));
    // Valid link rewritten, broken link demoted to emphasis
    assert!(beep.contains("[PLAY](play.md)"));
    assert!(!beep.contains("GONE.301-999.en.html"));
    assert!(beep.contains("*GONE*"), "got: {beep}");
    // Image rewritten into the shared asset folder and copied there
    assert!(beep.contains("../assets/en/commands/beep.png"));
    assert!(out.path().join("en/assets/en/commands/beep.png").exists());
    // Legacy code sample modernized inside its fence; the fence keeps the
    // language tag and the raw code text, unescaped.
    assert!(
        beep.contains("```4d\nvar $d : Integer\n//half a second\nBEEP($d)\n```"),
        "got: {beep}"
    );
    assert!(!beep.contains("C\\_LONGINT"), "got: {beep}");
    // See-also block
    assert!(beep.contains("#### See also"));

    // Negative cache applies to every referrer of the broken link.
    let echo = read(&out.path().join("en/commands-legacy/echo.md"));
    assert!(!echo.contains("GONE.301-999.en.html"));
    assert!(echo.contains("*GONE*"));

    // WritePro page publishes into its own subtree with its own paths.
    let wp = read(&out.path().join("en/WritePro/commands-legacy/wp-print.md"));
    assert!(wp.contains("slug: /WritePro/commands/wp-print"));
    assert!(wp.contains("../../assets/en/WritePro/commands/wp.png"));
    assert!(out
        .path()
        .join("en/assets/en/WritePro/commands/wp.png")
        .exists());

    // Translated page lands in its language tree.
    assert!(out.path().join("de/commands-legacy/summe.md").exists());
}

#[test]
fn test_index_and_themes_cover_reference_language_only() {
    let corpus = build_corpus();
    let out = tempfile::tempdir().unwrap();
    let converter =
        CorpusConverter::new(ConvertOptions::new(corpus.root(), out.path())).unwrap();
    let tasks = converter.plan().unwrap();
    converter.run(&tasks, || {}).unwrap();

    let index = read(&out.path().join("command-index.md"));
    assert!(index.starts_with("---\nid: command-index\ntitle: Index\n---\n\n"));
    assert!(index.contains("[B](#B)"));
    assert!(index.contains("[`BEEP`](../commands-legacy/beep.md)<br/>"));
    assert!(index.contains("[`ECHO`](../commands-legacy/echo.md)<br/>"));
    assert!(index.contains("[`PLAY`](../commands-legacy/play.md)<br/>"));
    assert!(index.contains("[`WP PRINT`](../WritePro/commands-legacy/wp-print.md)<br/>"));
    // Translated pages never reach the index.
    assert!(!index.contains("SUMME"));

    let themes: serde_json::Value =
        serde_json::from_str(&read(&out.path().join("themes.json"))).unwrap();
    let labels: Vec<&str> = themes
        .as_array()
        .unwrap()
        .iter()
        .map(|t| t["label"].as_str().unwrap())
        .collect();
    assert_eq!(labels, vec!["User Interface", "Write Pro"]);
    let ui_items = themes[0]["items"].as_array().unwrap();
    assert!(ui_items.contains(&serde_json::json!("commands-legacy/beep")));
    assert!(ui_items.contains(&serde_json::json!("commands-legacy/play")));
    assert_eq!(themes[1]["items"][0], "WritePro/commands-legacy/wp-print");
}

#[test]
fn test_rerun_overwrites_cleanly() {
    let corpus = build_corpus();
    let out = tempfile::tempdir().unwrap();
    let converter =
        CorpusConverter::new(ConvertOptions::new(corpus.root(), out.path())).unwrap();
    let tasks = converter.plan().unwrap();
    let first = converter.run(&tasks, || {}).unwrap();
    let second = converter.run(&tasks, || {}).unwrap();
    assert_eq!(first.converted, second.converted);

    let beep = read(&out.path().join("en/commands-legacy/beep.md"));
    // No doubled summary blocks after the second run.
    assert_eq!(beep.matches("#_command_.BEEP.Summary").count(), 1);
}
