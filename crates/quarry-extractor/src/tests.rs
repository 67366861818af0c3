//! Session-level tests for the Extractor

mod sessions {
    use crate::{
        AdvancePolicy, BookTarget, ExtractorConfig, ExtractorError, FailureReason, LlmStructurer,
        ProgressTracker, SessionController, SessionOutcome, TextDocument,
    };
    use quarry_domain::traits::{DocumentSource, PageText};
    use quarry_domain::ConceptId;
    use quarry_llm::MockProvider;
    use quarry_store::{BookInfo, JsonConceptStore, MemoryStore, BOOK_METADATA_FILE};
    use tempfile::TempDir;

    const PAGES: &[&str] = &[
        "Preface",
        "1.1 Getting Started\n\
         The only way to learn a new programming language is by writing programs in it.\n\
         #include <stdio.h>\n\
         int main(void)\n\
         {\n\
         printf(\"hello, world\\n\");\n\
         }\n",
        "1.2 Variables and Arithmetic\n\
         The next program prints a table of Fahrenheit temperatures and their equivalents.\n\
         int fahr, celsius;\n\
         fahr = 0;\n",
        "1.3 The For Statement\n\
         There are plenty of different ways to write a program for a particular task.\n\
         for (fahr = 0; fahr <= 300; fahr = fahr + 20)\n\
         printf(\"%3d %6.1f\\n\", fahr, (5.0/9.0)*(fahr-32));\n",
    ];

    const HELLO: &str = r##"{
        "topic": "Hello World",
        "explanation": "The smallest complete C program prints a greeting.",
        "syntax": "int main(void) { ... }",
        "code_example": ["#include <stdio.h>", "int main(void) {", "    printf(\"hello, world\\n\");", "}"],
        "example_explanation": "main calls printf once and returns."
    }"##;

    const VARIABLES: &str = r#"Sure! ```json
    {
        "topic": "Variables and Arithmetic",
        "explanation": "Variables must be declared before use.",
        "syntax": "type name;",
        "code_example": "int fahr, celsius;\nfahr = 0;\ncelsius = 5 * (fahr - 32) / 9;",
        "example_explanation": "Declares two ints and computes one from the other."
    }
    ```"#;

    const FOR_LOOP: &str = r#"{
        "topic": "The for Statement",
        "explanation": "for folds initialization, test and increment into one line.",
        "syntax": "for (init; test; step) body",
        "code_example": ["int fahr;", "for (fahr = 0; fahr <= 300; fahr += 20)", "    printf(\"%d\\n\", fahr);"],
        "example_explanation": "Prints every twentieth temperature."
    }"#;

    fn document() -> TextDocument {
        TextDocument::new(PAGES.iter().map(|p| p.to_string()).collect())
    }

    fn llm() -> MockProvider {
        let mut llm = MockProvider::new("no concept here");
        llm.add_response("Getting Started", HELLO);
        llm.add_response("Variables and Arithmetic", VARIABLES);
        llm.add_response("The For Statement", FOR_LOOP);
        llm
    }

    fn config(max: usize, window: usize) -> ExtractorConfig {
        ExtractorConfig {
            max_concepts_per_session: max,
            window_size: window,
            ..ExtractorConfig::default()
        }
    }

    fn controller(
        llm: MockProvider,
        dir: &TempDir,
        config: ExtractorConfig,
    ) -> SessionController<LlmStructurer<MockProvider>, MemoryStore> {
        SessionController::new(
            BookTarget::new("kr", "The C Programming Language"),
            LlmStructurer::new(llm),
            MemoryStore::new(),
            ProgressTracker::load(dir.path().join("kr.json")),
            config,
        )
        .unwrap()
    }

    fn report(outcome: SessionOutcome) -> crate::SessionReport {
        match outcome {
            SessionOutcome::Progressed(report) => report,
            SessionOutcome::Complete { .. } => panic!("expected a processed session"),
        }
    }

    #[test]
    fn test_full_session() {
        let dir = TempDir::new().unwrap();
        let mut controller = controller(llm(), &dir, config(5, 15));

        let report = report(controller.run_session(&mut document()).unwrap());

        assert_eq!(report.candidates_detected, 3);
        assert_eq!(report.candidates_attempted, 3);
        assert_eq!(
            report.stored,
            vec![
                ConceptId::from_raw("kr_001_hello_world"),
                ConceptId::from_raw("kr_002_variables_and_arithmetic"),
                ConceptId::from_raw("kr_003_the_for_statement"),
            ]
        );
        assert!(report.failures.is_empty());
        assert_eq!(report.last_processed_page, 4);
        assert_eq!(report.pages.to_string(), "1-4");

        let stored = controller
            .store()
            .get(&ConceptId::from_raw("kr_002_variables_and_arithmetic"))
            .unwrap();
        assert_eq!(stored.code_example.len(), 3);
        let meta = stored.extraction_metadata.as_ref().unwrap();
        assert_eq!(meta.page_range.to_string(), "3-3");
        assert_eq!(meta.source, "The C Programming Language");

        assert_eq!(controller.state().last_processed_page, 4);
        assert_eq!(controller.state().total_concepts_extracted, 3);
        assert_eq!(controller.state().session_history.len(), 1);
    }

    #[test]
    fn test_exhausted_document_is_complete() {
        let dir = TempDir::new().unwrap();
        let mut controller = controller(llm(), &dir, config(5, 15));
        let mut doc = document();

        controller.run_session(&mut doc).unwrap();
        let before = controller.state().clone();

        let outcome = controller.run_session(&mut doc).unwrap();
        assert_eq!(
            outcome,
            SessionOutcome::Complete {
                last_processed_page: 4
            }
        );
        assert_eq!(controller.state(), &before);
    }

    #[test]
    fn test_sparse_only_window_is_complete() {
        let dir = TempDir::new().unwrap();
        let mut controller = controller(llm(), &dir, config(5, 1));
        let outcome = controller.run_session(&mut document()).unwrap();
        assert!(outcome.is_complete());
        assert_eq!(controller.state().last_processed_page, 0);
    }

    #[test]
    fn test_failed_candidate_does_not_abort_session() {
        let dir = TempDir::new().unwrap();
        let mut llm = MockProvider::new("no concept here");
        llm.add_error("Getting Started");
        llm.add_response("Variables and Arithmetic", VARIABLES);
        let mut controller = controller(llm, &dir, config(5, 15));

        let report = report(controller.run_session(&mut document()).unwrap());

        assert_eq!(
            report.stored,
            vec![ConceptId::from_raw("kr_001_variables_and_arithmetic")]
        );
        assert_eq!(report.failures.len(), 2);
        assert!(matches!(report.failures[0].reason, FailureReason::Service(_)));
        assert_eq!(report.failures[1].reason, FailureReason::Unusable);
        assert_eq!(report.failures[1].index, 2);
        // Failed candidates still move the checkpoint
        assert_eq!(controller.state().last_processed_page, 4);
        assert_eq!(controller.state().total_concepts_extracted, 1);
    }

    #[test]
    fn test_cap_limits_structuring_calls() {
        let dir = TempDir::new().unwrap();
        let mut controller = controller(llm(), &dir, config(1, 15));

        let report = report(controller.run_session(&mut document()).unwrap());

        assert_eq!(report.candidates_detected, 3);
        assert_eq!(report.candidates_attempted, 1);
        assert_eq!(controller.structurer().llm().call_count(), 1);
        // Unattempted candidates are skipped under the default policy
        assert_eq!(report.last_processed_page, 4);
    }

    #[test]
    fn test_attempted_policy_revisits_skipped_candidates() {
        let dir = TempDir::new().unwrap();
        let mut cfg = config(1, 15);
        cfg.advance_policy = AdvancePolicy::Attempted;
        let mut controller = controller(llm(), &dir, cfg);
        let mut doc = document();

        let first = report(controller.run_session(&mut doc).unwrap());
        assert_eq!(first.last_processed_page, 2);

        let second = report(controller.run_session(&mut doc).unwrap());
        assert_eq!(
            second.stored,
            vec![ConceptId::from_raw("kr_002_variables_and_arithmetic")]
        );
        assert_eq!(second.last_processed_page, 3);

        let third = report(controller.run_session(&mut doc).unwrap());
        assert_eq!(third.stored.len(), 1);
        assert!(controller.run_session(&mut doc).unwrap().is_complete());
        assert_eq!(controller.state().total_concepts_extracted, 3);
    }

    #[test]
    fn test_run_sessions_stops_when_complete() {
        let dir = TempDir::new().unwrap();
        let mut controller = controller(llm(), &dir, config(5, 2));

        let outcomes = controller.run_sessions(&mut document(), 10).unwrap();

        assert_eq!(outcomes.len(), 3);
        assert!(outcomes[2].is_complete());
        assert_eq!(controller.state().session_history.len(), 2);
        assert_eq!(controller.state().total_concepts_extracted, 3);
    }

    struct BrokenSource;

    impl DocumentSource for BrokenSource {
        type Error = String;

        fn page_count(&self) -> usize {
            10
        }

        fn read_pages(&mut self, _start: usize, _count: usize) -> Result<Vec<PageText>, String> {
            Err("disk on fire".to_string())
        }
    }

    #[test]
    fn test_source_failure_is_fatal_and_leaves_state() {
        let dir = TempDir::new().unwrap();
        let mut controller = controller(llm(), &dir, config(5, 15));

        let result = controller.run_session(&mut BrokenSource);

        assert!(matches!(result, Err(ExtractorError::Source(msg)) if msg.contains("disk on fire")));
        assert_eq!(controller.state().last_processed_page, 0);
        assert!(!dir.path().join("kr.json").exists());
    }

    #[test]
    fn test_invalid_config_is_rejected() {
        let dir = TempDir::new().unwrap();
        let result = SessionController::new(
            BookTarget::new("kr", "K&R"),
            LlmStructurer::new(llm()),
            MemoryStore::new(),
            ProgressTracker::load(dir.path().join("kr.json")),
            config(0, 15),
        );
        assert!(matches!(result, Err(ExtractorError::Config(_))));
    }

    #[test]
    fn test_resume_after_restart() {
        let dir = TempDir::new().unwrap();
        let book = BookInfo::new("kr", "The C Programming Language");
        let progress = dir.path().join("progress").join("kr.json");

        let open = || {
            SessionController::new(
                BookTarget::new("kr", "The C Programming Language"),
                LlmStructurer::new(llm()),
                JsonConceptStore::open(dir.path().join("concepts"), &book).unwrap(),
                ProgressTracker::load(&progress),
                config(5, 2),
            )
            .unwrap()
        };

        let mut first = open();
        let report1 = report(first.run_session(&mut document()).unwrap());
        assert_eq!(report1.stored, vec![ConceptId::from_raw("kr_001_hello_world")]);
        drop(first);

        // A fresh process picks up where the last one stopped
        let mut second = open();
        assert_eq!(second.state().last_processed_page, 2);
        let report2 = report(second.run_session(&mut document()).unwrap());
        assert_eq!(
            report2.stored,
            vec![
                ConceptId::from_raw("kr_002_variables_and_arithmetic"),
                ConceptId::from_raw("kr_003_the_for_statement"),
            ]
        );
        assert_eq!(report2.pages.to_string(), "3-4");
        assert!(second
            .store()
            .concept_path(&ConceptId::from_raw("kr_003_the_for_statement"))
            .exists());
        assert_eq!(second.state().total_concepts_extracted, 3);
    }

    #[test]
    fn test_rerun_after_kill_before_checkpoint_stores_nothing_twice() {
        let dir = TempDir::new().unwrap();
        let book = BookInfo::new("kr", "The C Programming Language");
        let progress = dir.path().join("progress").join("kr.json");

        let open = || {
            SessionController::new(
                BookTarget::new("kr", "The C Programming Language"),
                LlmStructurer::new(llm()),
                JsonConceptStore::open(dir.path().join("concepts"), &book).unwrap(),
                ProgressTracker::load(&progress),
                config(5, 15),
            )
            .unwrap()
        };

        let mut first = open();
        let report1 = report(first.run_session(&mut document()).unwrap());
        assert_eq!(report1.stored.len(), 3);
        drop(first);

        // Concept files were written but the checkpoint never was
        std::fs::remove_file(&progress).unwrap();

        let mut second = open();
        assert_eq!(second.state().last_processed_page, 0);
        let report2 = report(second.run_session(&mut document()).unwrap());

        assert_eq!(report2.stored, report1.stored);
        assert!(report2.failures.is_empty());
        assert_eq!(second.state().total_concepts_extracted, 3);

        let concept_files = std::fs::read_dir(second.store().dir())
            .unwrap()
            .filter_map(Result::ok)
            .filter(|entry| entry.file_name() != BOOK_METADATA_FILE)
            .count();
        assert_eq!(concept_files, 3);
    }
}

mod scenarios {
    use crate::classifier::{classify_line, LineKind};
    use crate::{detect_concepts, ContentClassifier, ProgressTracker, SessionInfo};
    use quarry_domain::traits::PageText;
    use quarry_domain::{BlockKind, ContentBlock, PageSpan};
    use tempfile::TempDir;

    fn blocks(kinds: &[BlockKind]) -> Vec<ContentBlock> {
        kinds
            .iter()
            .enumerate()
            .map(|(i, kind)| ContentBlock::new(*kind, 1, format!("line {}", i)))
            .collect()
    }

    #[test]
    fn test_line_classification() {
        assert_eq!(classify_line("1.1 Getting Started"), LineKind::Header);
        assert_eq!(classify_line("    for (i = 0; i < 10; i++) {".trim()), LineKind::Code);
        assert_eq!(classify_line("This chapter explains pointers."), LineKind::Text);
    }

    #[test]
    fn test_header_text_code_is_one_candidate() {
        let candidates = detect_concepts(blocks(&[BlockKind::Header, BlockKind::Text, BlockKind::Code]));
        assert_eq!(candidates.len(), 1);
        assert_eq!(candidates[0].blocks().len(), 3);
    }

    #[test]
    fn test_four_text_blocks_close_one_candidate() {
        let candidates = detect_concepts(blocks(&[BlockKind::Text; 4]));
        assert_eq!(candidates.len(), 1);
        assert_eq!(candidates[0].blocks().len(), 4);
    }

    #[test]
    fn test_checkpoint_survives_restart() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("state.json");

        let mut tracker = ProgressTracker::load(&path);
        assert_eq!(tracker.state().last_processed_page, 0);
        tracker
            .update(
                42,
                3,
                SessionInfo {
                    page_range: PageSpan::new(1, 42),
                    chapter: None,
                },
            )
            .unwrap();

        let reloaded = ProgressTracker::load(&path);
        assert_eq!(reloaded.state().last_processed_page, 42);
        assert_eq!(reloaded.state().total_concepts_extracted, 3);
        assert_eq!(reloaded.state().session_history.len(), 1);
        assert_eq!(reloaded.state().session_history[0].page_range.to_string(), "1-42");
    }

    #[test]
    fn test_thirty_char_page_is_skipped() {
        let text = "int main(void) { return 0; }  ";
        assert_eq!(text.trim().len(), 28);
        let short = "x".repeat(30);
        let pages = vec![
            PageText {
                number: 1,
                text: text.to_string(),
            },
            PageText {
                number: 2,
                text: short,
            },
        ];
        assert!(ContentClassifier::default().classify_pages(&pages).is_empty());
    }
}

mod proptests {
    use crate::{classify_page, detect_concepts, ProgressTracker, SessionInfo};
    use quarry_domain::{BlockKind, ContentBlock, PageSpan};
    use proptest::prelude::*;
    use tempfile::TempDir;

    const LINES: &[&str] = &[
        "Chapter 5 Pointers and Arrays",
        "5.1 Pointers and Addresses",
        "Pointers and Arrays",
        "#include <stdio.h>",
        "int main(void)",
        "{",
        "}",
        "x = *p;",
        "for (i = 0; i < n; i++)",
        "/* swap */",
        "A pointer is a variable that contains the address of a variable.",
        "pointers and arrays are closely related,",
        "",
        "   ",
        "   indented prose line",
        "\tp = &x;",
    ];

    fn kind() -> impl Strategy<Value = BlockKind> {
        prop_oneof![
            Just(BlockKind::Header),
            Just(BlockKind::Code),
            Just(BlockKind::Text),
            Just(BlockKind::Unclassified),
        ]
    }

    proptest! {
        #[test]
        fn classifier_preserves_lines(lines in prop::collection::vec(prop::sample::select(LINES), 0..60)) {
            let text = lines.join("\n");
            let blocks = classify_page(&text, 9);

            let expected: Vec<&str> = text.lines().map(str::trim).filter(|l| !l.is_empty()).collect();
            let actual: Vec<&str> = blocks.iter().flat_map(|b| b.lines()).map(String::as_str).collect();
            prop_assert_eq!(actual, expected);
            prop_assert!(blocks.iter().all(|b| b.page() == 9 && !b.lines().is_empty()));
        }

        #[test]
        fn classifier_is_deterministic(lines in prop::collection::vec(prop::sample::select(LINES), 0..40)) {
            let text = lines.join("\n");
            prop_assert_eq!(classify_page(&text, 1), classify_page(&text, 1));
        }

        #[test]
        fn boundaries_partition_input(kinds in prop::collection::vec(kind(), 0..50)) {
            let input: Vec<ContentBlock> = kinds
                .iter()
                .enumerate()
                .map(|(i, k)| ContentBlock::new(*k, (i / 3) as u32 + 1, format!("block {}", i)))
                .collect();

            let candidates = detect_concepts(input.clone());
            let rebuilt: Vec<ContentBlock> = candidates.iter().flat_map(|c| c.blocks().to_vec()).collect();
            prop_assert_eq!(&rebuilt, &input);
            prop_assert_eq!(detect_concepts(input.clone()), candidates);
        }
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(32))]

        #[test]
        fn checkpoint_is_monotonic(steps in prop::collection::vec((0u32..20, 0u32..6), 1..12)) {
            let dir = TempDir::new().unwrap();
            let path = dir.path().join("state.json");
            let mut tracker = ProgressTracker::load(&path);

            let mut previous = 0;
            let mut expected_total = 0;
            for (advance, concepts) in steps {
                let next = previous + advance;
                tracker
                    .update(next, concepts, SessionInfo { page_range: PageSpan::new(previous + 1, next), chapter: None })
                    .unwrap();
                prop_assert!(tracker.state().last_processed_page >= previous);
                previous = tracker.state().last_processed_page;
                expected_total += concepts;
                prop_assert_eq!(tracker.state().total_concepts_extracted, expected_total);
            }

            let reloaded = ProgressTracker::load(&path);
            prop_assert_eq!(reloaded.state(), tracker.state());
            prop_assert!(reloaded.state().is_consistent());
        }
    }
}
