use super::*;
use crate::constants::{BLANK_TOKENS, UNKNOWN_TITLE};

mod sanitize_tests {
    use super::*;

    #[test]
    fn test_sanitize_lowercases_and_trims() {
        assert_eq!(
            sanitize("  Sr. Engineer \t"),
            Sanitized::Text("sr. engineer".to_string())
        );
    }

    #[test]
    fn test_sanitize_blank_tokens_case_insensitive() {
        for raw in ["", "   ", "-", "_", "NaN", "None", "NULL", "N/A", "na", " nA "] {
            assert!(sanitize(raw).is_blank(), "{raw:?} should be blank");
        }
    }

    #[test]
    fn test_every_blank_token_is_blank() {
        for token in BLANK_TOKENS {
            assert_eq!(sanitize(token), Sanitized::Blank);
            assert_eq!(sanitize(&token.to_uppercase()), Sanitized::Blank);
        }
    }

    #[test]
    fn test_sanitize_keeps_near_blank_text() {
        assert_eq!(sanitize("nana").as_text(), Some("nana"));
        assert_eq!(sanitize("--").as_text(), Some("--"));
        assert_eq!(sanitize("n/a/b").as_text(), Some("n/a/b"));
    }

    #[test]
    fn test_is_blank() {
        assert!(is_blank(" null "));
        assert!(!is_blank("engineer"));
    }
}

mod rules_tests {
    use super::*;

    #[test]
    fn test_default_rules_expand_abbreviations() {
        let corrector = RuleCorrector::default();
        assert_eq!(corrector.correct("asst engg"), "assistant engineer");
        assert_eq!(corrector.correct("site supv"), "site supervisor");
        assert_eq!(corrector.correct("suprv"), "supervisor");
        assert_eq!(corrector.correct("sr. engineer"), "senior engineer");
    }

    #[test]
    fn test_rank_abbreviation_keeps_word_separator() {
        let corrector = RuleCorrector::default();
        assert_eq!(corrector.correct("sr.engineer"), "senior engineer");
        assert_eq!(corrector.correct("jr.technician"), "junior technician");
        assert_eq!(corrector.correct("sr.  site supv"), "senior site supervisor");
        assert_eq!(corrector.correct("engineer sr."), "engineer senior");
        assert_eq!(corrector.correct("jr"), "junior");
    }

    #[test]
    fn test_default_rules_fix_misspellings() {
        let corrector = RuleCorrector::default();
        assert_eq!(corrector.correct("carpendry"), "carpenter");
        assert_eq!(corrector.correct("carpendar"), "carpenter");
        assert_eq!(corrector.correct("electrical technicain"), "electrical technician");
        assert_eq!(corrector.correct("supervisior"), "supervisor");
    }

    #[test]
    fn test_rules_respect_word_boundaries() {
        let corrector = RuleCorrector::default();
        assert_eq!(corrector.correct("enggineering"), "enggineering");
        assert_eq!(corrector.correct("assthelper"), "assthelper");
    }

    #[test]
    fn test_rules_apply_sequentially_over_rewritten_text() {
        let corrector = RuleCorrector::new(&[(r"\ba\b", "b"), (r"\bb\b", "c")]).unwrap();
        assert_eq!(corrector.correct("a"), "c");

        let reversed = RuleCorrector::new(&[(r"\bb\b", "c"), (r"\ba\b", "b")]).unwrap();
        assert_eq!(reversed.correct("a"), "b");
    }

    #[test]
    fn test_replacement_is_literal() {
        let corrector = RuleCorrector::new(&[(r"(x)", "$1y")]).unwrap();
        assert_eq!(corrector.correct("x"), "$1y");
    }

    #[test]
    fn test_invalid_pattern_is_rejected() {
        assert!(RuleCorrector::new(&[("(unclosed", "x")]).is_err());
    }

    #[test]
    fn test_empty_corrector_is_identity() {
        assert_eq!(RuleCorrector::empty().correct("asst engg"), "asst engg");
    }

    #[test]
    fn test_default_rules_order_preserved() {
        let corrector = RuleCorrector::default();
        let patterns: Vec<&str> = corrector.rules().iter().map(|r| r.pattern()).collect();
        let expected: Vec<&str> = DEFAULT_RULES.iter().map(|(p, _)| *p).collect();
        assert_eq!(patterns, expected);
    }
}

mod format_tests {
    use super::*;

    #[test]
    fn test_format_capitalizes_words() {
        assert_eq!(format_title("assistant engineer"), "Assistant Engineer");
        assert_eq!(format_title("ASSISTANT engineer"), "ASSISTANT Engineer");
        assert_eq!(format_title("sENIOR eNGINEER"), "Senior Engineer");
    }

    #[test]
    fn test_format_preserves_acronyms() {
        assert_eq!(format_title("HR manager"), "HR Manager");
        assert_eq!(format_title("R&D lead"), "R&D Lead");
        assert_eq!(format_title("QA/QC inspector"), "QA/QC Inspector");
    }

    #[test]
    fn test_format_hyphenated_compounds() {
        assert_eq!(format_title("site-engineer"), "Site-Engineer");
        assert_eq!(format_title("co-ordinator"), "Co-Ordinator");
        assert_eq!(format_title("engineer-i"), "Engineer-I");
        assert_eq!(format_title("a--b"), "A--B");
    }

    #[test]
    fn test_format_collapses_whitespace() {
        assert_eq!(format_title("  site   engineer  "), "Site Engineer");
        assert_eq!(format_title(""), "");
        assert_eq!(format_title("   "), "");
    }

    #[test]
    fn test_unknown_sentinel_is_fixed_point() {
        assert_eq!(format_title(UNKNOWN_TITLE), UNKNOWN_TITLE);
    }

    #[test]
    fn test_format_is_idempotent() {
        let samples = [
            "assistant engineer",
            "HR manager",
            "site-engineer",
            "ENGINEER-I",
            "engineer-i",
            "x-",
            "-",
            "a",
            "3rd shift lead",
            "straße meister",
            "ﬀoo",
            "mcDonald-SMITH ii",
            UNKNOWN_TITLE,
            "",
        ];
        for sample in samples {
            let once = format_title(sample);
            assert_eq!(format_title(&once), once, "not idempotent for {sample:?}");
        }
    }

    #[test]
    fn test_format_multi_char_uppercase_head() {
        assert_eq!(format_title("ßa"), "Ssa");
        assert_eq!(format_title("Ssa"), "Ssa");
    }
}
