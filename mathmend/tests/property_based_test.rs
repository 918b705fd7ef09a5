use mathmend::config::PipelineConfig;
use mathmend::gate::classify_text;
use mathmend::reconstruct::reconstruct;
use mathmend::validator::contains_escaped_command;
use mathmend::Pipeline;
use proptest::prelude::*;

const SHREDDABLE: &[&str] = &[
    "frac", "sqrt", "sum", "prod", "int", "left", "right", "equiv", "cdot",
];

// Interleave a word's letters the way a recognizer shreds them:
// pairs become subscripted fragments, a leftover letter trails bare.
fn shred(word: &str) -> String {
    let letters: Vec<char> = word.chars().collect();
    let mut pieces = Vec::new();
    for pair in letters.chunks(2) {
        match pair {
            [a, b] => pieces.push(format!("{}_{}", a, b)),
            [a] => pieces.push(a.to_string()),
            _ => {}
        }
    }
    pieces.join(" ")
}

fn mtext_segments(tree: &str) -> Vec<&str> {
    tree.split("<mtext>")
        .skip(1)
        .filter_map(|rest| rest.split("</mtext>").next())
        .collect()
}

proptest! {
    #![proptest_config(ProptestConfig {
        cases: 100,
        ..ProptestConfig::default()
    })]

    #[test]
    fn prop_reconstruction_is_idempotent(s in "[A-Za-z0-9 _^{}()+=<>!.,-]{0,40}") {
        let config = PipelineConfig::default();
        let once = reconstruct(&s, &config);
        let twice = reconstruct(&once.text, &config);
        prop_assert_eq!(&once.text, &twice.text, "input {:?}", s);
    }

    #[test]
    fn prop_shredded_commands_are_flagged_and_repaired(idx in 0usize..9) {
        let word = SHREDDABLE[idx];
        let shredded = shred(word);
        let config = PipelineConfig::default();

        let report = classify_text(&shredded, &config);
        prop_assert!(
            report.contains("shredded-command"),
            "{:?} must trip the gate",
            shredded
        );

        let repaired = reconstruct(&shredded, &config);
        prop_assert!(
            repaired.text.contains(&format!("\\{}", word)),
            "{:?} must reconstruct to \\{}, got {:?}",
            shredded,
            word,
            repaired.text
        );
    }

    #[test]
    fn prop_no_escaped_commands_leak_into_text_nodes(s in "[ -~]{0,40}") {
        let pipeline = Pipeline::new();
        let result = pipeline.process_formula_text(&s);
        for segment in mtext_segments(&result.semantic_tree) {
            prop_assert!(
                !contains_escaped_command(segment),
                "text node {:?} leaks command syntax for input {:?}",
                segment,
                s
            );
        }
    }

    #[test]
    fn prop_confidence_is_bounded_and_valid_results_are_clean(s in "[ -~]{0,40}") {
        let pipeline = Pipeline::new();
        let result = pipeline.process_formula_text(&s);
        prop_assert!((0.0..=1.0).contains(&result.confidence), "input {:?}", s);
        if result.is_valid {
            prop_assert!(result.corruption.is_empty(), "input {:?}", s);
            prop_assert!(!result.semantic_tree.is_empty(), "input {:?}", s);
        }
    }

    #[test]
    fn prop_accepted_markup_is_a_fixed_point(s in "[A-Za-z0-9 _^{}()+=<>.,-]{0,30}") {
        let pipeline = Pipeline::new();
        let first = pipeline.process_formula_text(&s);
        if first.is_valid {
            let second = pipeline.process_formula_text(&first.clean_markup);
            prop_assert!(second.is_valid, "re-running {:?} failed", first.clean_markup);
            prop_assert_eq!(
                &first.clean_markup,
                &second.clean_markup,
                "input {:?}",
                s
            );
        }
    }

    #[test]
    fn prop_large_deficits_never_invent_delimiters(extra in 4usize..10) {
        let input = format!("x{}", "}".repeat(extra));
        let pipeline = Pipeline::new();
        let result = pipeline.process_formula_text(&input);
        prop_assert!(!result.is_valid);
        prop_assert_eq!(
            result.clean_markup.matches('}').count(),
            extra,
            "closers must be left exactly as found"
        );
        prop_assert_eq!(result.clean_markup.matches('{').count(), 0);
    }
}
