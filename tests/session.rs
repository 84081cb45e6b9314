use livespell::checker::dictionary::Dictionary;
use livespell::parser::SourceLang;
use livespell::{
    Config, DictionarySpellProvider, EditEvent, FileType, PassOutcome, ProviderError, SpellProvider,
    TextRange, Workspace,
};
use parking_lot::Mutex;
use std::sync::Arc;
use std::time::Duration;

fn speller(config: &Config) -> Arc<dyn SpellProvider> {
    let dict = Dictionary::from_words(&["receive", "received", "the", "a", "comment", "value"]).unwrap();
    Arc::new(DictionarySpellProvider::with_dictionary(dict, config).unwrap())
}

fn workspace(config: Config) -> Workspace {
    Workspace::new(speller(&config), config)
}

struct Exploding;

impl SpellProvider for Exploding {
    fn spell(&self, _word: &str) -> Result<bool, ProviderError> {
        Err(ProviderError::new("backend gone"))
    }

    fn suggest(&self, _word: &str) -> Result<Vec<String>, ProviderError> {
        panic!("suggest must not be reached")
    }
}

#[test]
fn test_edit_redirties_and_clears() {
    let ws = workspace(Config::default());
    let session = ws.open("main.rs", "", FileType::SourceCode(SourceLang::Rust));
    assert_eq!(session.reconcile_now(), PassOutcome::Idle);

    session.edit(0, 0, "// recieve").unwrap();
    assert_eq!(session.pending(), 1);
    session.reconcile_now();

    let line = session.document().full_range();
    let errors = session.errors(&[line]);
    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0].word, "recieve");
    assert_eq!(errors[0].range.as_span(), 3..10);
    assert!(errors[0].suggestions.iter().any(|s| s == "receive"));

    session.edit(3, 7, "received").unwrap();
    session.reconcile_now();
    assert!(session.errors(&[session.document().full_range()]).is_empty());
}

#[test]
fn test_errors_follow_edits_before_recheck() {
    let ws = workspace(Config::default());
    let session = ws.open("notes.txt", "teh value\nrecieve", FileType::PlainText);
    session.reconcile_now();
    assert_eq!(session.all_errors().len(), 2);

    // insert a line on top; the second error moves without a pass
    session.edit(0, 0, "a\n").unwrap();
    let moved: Vec<_> = session
        .all_errors()
        .into_iter()
        .map(|e| (e.word, e.range.as_span()))
        .collect();
    assert!(moved.contains(&("recieve".to_string(), 12..19)));
}

#[test]
fn test_failing_oracle_reports_nothing() {
    let config = Config::default();
    let ws = Workspace::new(Arc::new(Exploding), config);
    let session = ws.open("a.md", "# Titel\n\nsome wrods here", FileType::Markdown);

    assert!(matches!(session.reconcile_now(), PassOutcome::Reconciled { errors: 0, .. }));
    assert!(session.all_errors().is_empty());
}

#[test]
fn test_code_is_never_checked() {
    let ws = workspace(Config::default());
    let session = ws.open(
        "main.c",
        "int mispelled = 1; // a comment\nchar *s = \"valeu\";\n",
        FileType::SourceCode(SourceLang::C),
    );
    session.reconcile_now();

    let words: Vec<_> = session.all_errors().into_iter().map(|e| e.word).collect();
    assert_eq!(words, vec!["valeu".to_string()]);
}

#[test]
fn test_notifications_cover_edits_and_passes() {
    let ws = workspace(Config::default());
    let session = ws.open("a.txt", "teh", FileType::PlainText);
    let seen = Arc::new(Mutex::new(Vec::<TextRange>::new()));
    let sink = seen.clone();
    let id = session.subscribe(move |range| sink.lock().push(range));

    session.reconcile_now();
    session.edit(3, 0, " end").unwrap();
    assert_eq!(seen.lock().len(), 2);

    assert!(session.unsubscribe(id));
    session.reconcile_now();
    assert_eq!(seen.lock().len(), 2);
}

#[test]
fn test_host_edit_event_off_char_boundary() {
    let ws = workspace(Config::default());
    let session = ws.open("a.txt", "café teh\nvalue", FileType::PlainText);
    session.reconcile_now();

    // offset 4 is inside 'é'
    let event = EditEvent {
        version: 0,
        changes: vec![TextRange::new(4, 1, 0)],
    };
    session.handle_edit(&event);
    assert_eq!(session.pending(), 1);
}

#[test]
fn test_config_breakers_and_classes() {
    let config = Config {
        word_breakers: " ".to_string(),
        natural_language: vec![livespell::SpanClass::Comment],
        ..Config::default()
    };
    let ws = workspace(config);
    let session = ws.open(
        "a.py",
        "x = \"wrods\"  # the,value\n",
        FileType::SourceCode(SourceLang::Python),
    );
    session.reconcile_now();

    let words: Vec<_> = session.all_errors().into_iter().map(|e| e.word).collect();
    assert_eq!(words, vec!["the,value".to_string()]);
}

#[tokio::test]
async fn test_periodic_reconciler() {
    let config = Config {
        tick_interval_ms: 10,
        ..Config::default()
    };
    let ws = workspace(config);
    let session = ws.open("main.rs", "fn main() {}\n", FileType::SourceCode(SourceLang::Rust));
    let handle = session.start();

    session.edit(13, 0, "// recieve\n").unwrap();

    let mut found = Vec::new();
    for _ in 0..200 {
        tokio::time::sleep(Duration::from_millis(10)).await;
        found = session.all_errors();
        if !found.is_empty() {
            break;
        }
    }
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].word, "recieve");

    ws.close("main.rs");
    tokio::time::timeout(Duration::from_secs(2), handle)
        .await
        .expect("reconciler did not stop")
        .unwrap();
}
