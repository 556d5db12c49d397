use std::io::Write;
use std::sync::Arc;

use ntmprep_text::{fit, transform, Analyzer, LemmaDictionary, StopWords, Tokenizer, VocabularyOptions};

fn open_bounds() -> VocabularyOptions {
    VocabularyOptions { min_df: 0.0, max_df: 1.0, ..VocabularyOptions::default() }
}

fn reviews() -> Vec<String> {
    [
        "The battery died after two days, very disappointed.",
        "Screen cracked on arrival and the battery never charged.",
        "Returned it. The charger stopped working within a week!",
        "Cheap plastic, the screen scratches easily and batteries drain fast.",
        "Customer service refused the return; the product broke again.",
        "Stopped working after one day. Battery is useless.",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect()
}

#[test]
fn punctuation_and_whitespace_tokenize_to_nothing() {
    let tok = Tokenizer::english();
    assert!(tok.tokenize("").is_empty());
    assert!(tok.tokenize("  !!! ... ,,, ?? \t\n").is_empty());
    assert!(tok.tokenize("--- *** ((( )))").is_empty());
}

#[test]
fn tokens_carry_no_punctuation_and_verbs_keep_their_noun_form() {
    let tokens = Tokenizer::english().tokenize("Running, jumping!");
    assert_eq!(tokens, vec!["running".to_string(), "jumping".to_string()]);
    assert!(tokens.iter().all(|t| t.chars().all(|c| !c.is_ascii_punctuation())));
}

#[test]
fn plural_nouns_collapse_onto_the_lexicon() {
    let tok = Tokenizer::english();
    assert_eq!(tok.tokenize("batteries screens"), vec!["battery", "screen"]);
}

#[test]
fn common_review_plurals_are_singularized() {
    let tok = Tokenizer::english();
    assert_eq!(
        tok.tokenize("devices instructions headphones speakers cords reviewers buttons hours"),
        vec!["device", "instruction", "headphone", "speaker", "cord", "reviewer", "button", "hour"]
    );
    assert_eq!(
        tok.tokenize("Boxes, watches, knives, cookies and puppies; shoes."),
        vec!["box", "watch", "knife", "cookie", "and", "puppy", "shoe"]
    );
    assert_eq!(
        tok.tokenize("this glasses series business status"),
        vec!["this", "glass", "series", "business", "status"]
    );
}

#[test]
fn stop_words_are_checked_before_and_after_lemmatizing() {
    let analyzer = Analyzer::new(Tokenizer::english(), Some(StopWords::english()));
    assert_eq!(analyzer.analyze("It was the worst battery"), vec!["worst", "battery"]);
    assert!(!analyzer.analyze("it was made better").contains(&"make".to_string()));
    assert_eq!(analyzer.analyze("it was made better than the best one"), vec!["better", "best"]);

    let keep_all = Analyzer::new(Tokenizer::english(), None);
    assert!(keep_all.analyze("It was the worst battery").contains(&"the".to_string()));
}

#[test]
fn fitting_twice_gives_identical_listings() {
    let opts = VocabularyOptions::default();
    let a = fit(&reviews(), Analyzer::english(&opts), &opts).expect("fit a");
    let b = fit(&reviews(), Analyzer::english(&opts), &opts).expect("fit b");
    assert_eq!(a.listing().as_bytes(), b.listing().as_bytes());
    assert!(!a.listing().ends_with('\n'));
    let mut sorted = a.tokens().to_vec();
    sorted.sort();
    assert_eq!(sorted, a.tokens());
}

#[test]
fn kept_tokens_respect_frequency_bounds() {
    let docs = reviews();
    let opts = VocabularyOptions { min_df: 0.3, max_df: 0.5, ..VocabularyOptions::default() };
    let analyzer = Analyzer::english(&opts);
    let state = fit(&docs, analyzer.clone(), &opts).expect("fit");
    assert!(!state.is_empty());

    let n = docs.len() as f64;
    let analyzed: Vec<Vec<String>> = docs.iter().map(|d| analyzer.analyze(d)).collect();
    for token in state.tokens() {
        let df = analyzed.iter().filter(|toks| toks.contains(token)).count() as f64;
        assert!(df >= opts.min_df * n && df <= opts.max_df * n, "{token} has df {df}");
    }
    // "battery" appears in 4 of 6 documents
    assert_eq!(state.token_index("battery"), None);
    assert!(state.token_index("screen").is_some());
}

#[test]
fn boundary_frequencies_are_included() {
    let docs = ["apple banana cherry", "apple banana", "apple grape", "apple banana kiwi grape"];
    // 4 documents: df must lie in [2, 3]
    let opts = VocabularyOptions { min_df: 0.5, max_df: 0.75, ..VocabularyOptions::default() };
    let state = fit(&docs, Analyzer::english(&opts), &opts).expect("fit");
    assert_eq!(state.tokens(), ["banana".to_string(), "grape".to_string()]);
    assert_eq!(state.documents(), 4);
}

#[test]
fn every_split_matrix_has_vocabulary_width() {
    let docs = reviews();
    let opts = open_bounds();
    let state = fit(&docs[..4], Analyzer::english(&opts), &opts).expect("fit");
    for split in [&docs[..4], &docs[4..], &docs[..0]] {
        let m = transform(split, &state);
        assert_eq!(m.cols(), state.len());
        assert_eq!(m.rows(), split.len());
    }
}

#[test]
fn round_trip_counts_known_tokens_and_drops_unknown() {
    let train = ["good product good buy", "bad product bad return", "good bad mixed"];
    let opts = open_bounds();
    let state = fit(&train, Analyzer::english(&opts), &opts).expect("fit");

    let m = transform(&["good good bad unseen"], &state);
    let good = state.token_index("good").expect("good");
    let bad = state.token_index("bad").expect("bad");
    let row = m.outer_view(0).expect("row");
    assert_eq!(row.get(good), Some(&2));
    assert_eq!(row.get(bad), Some(&1));
    assert_eq!(row.nnz(), 2);
}

#[test]
fn empty_vocabulary_encodes_to_zero_width_rows() {
    let opts = VocabularyOptions { min_df: 1.0, max_df: 1.0, ..VocabularyOptions::default() };
    let state = fit(&["alpha bravo", "charlie delta"], Analyzer::english(&opts), &opts).expect("fit");
    assert!(state.is_empty());
    let m = transform(&["alpha bravo"], &state);
    assert_eq!((m.rows(), m.cols(), m.nnz()), (1, 0, 0));
}

#[test]
fn custom_dictionary_loads_from_file() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(file, "# custom\ngeese\tgoose\nwidget").unwrap();
    let dict = LemmaDictionary::load(Some(file.path())).expect("load");
    assert_eq!(dict.lemmatize("geese"), "goose");
    assert_eq!(dict.lemmatize("widgets"), "widget");

    let tok = Tokenizer::new(Arc::clone(&dict), 2);
    assert_eq!(tok.tokenize("Geese, widgets."), vec!["goose", "widget"]);
    assert!(Arc::ptr_eq(&LemmaDictionary::english(), &LemmaDictionary::load(None).unwrap()));
}

#[test]
fn wordnet_directory_loads_as_dictionary() {
    let dir = tempfile::tempdir().unwrap();
    let index = "  1 license header\ndevice n 3 2 @ ~ 3 0 1\nmouse n 4 2 @ ~ 4 0 1\n";
    std::fs::write(dir.path().join("index.noun"), index).unwrap();
    std::fs::write(dir.path().join("noun.exc"), "mice mouse\n").unwrap();
    let dict = LemmaDictionary::load(Some(dir.path())).expect("load");
    let tok = Tokenizer::new(dict, 2);
    assert_eq!(tok.tokenize("devices mice gizmos"), vec!["device", "mouse", "gizmos"]);
}
