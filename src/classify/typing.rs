use std::sync::OnceLock;

use regex::Regex;

use super::classify_consensus::classify_consensus;
use crate::config::PipelineConfig;
use crate::types::{ClassificationResult, Consensus, ReferenceSet, TypingResult, NO_HIT};

fn type_noise() -> &'static Regex {
    static NOISE: OnceLock<Regex> = OnceLock::new();
    NOISE.get_or_init(|| Regex::new(r"(?i)emm|em|\.0").expect("static pattern"))
}

/// Canonical type name of a reference id: `EMM1.0` and `emm1` both give `emm1`.
pub fn clean_type_name(reference_id: &str) -> String {
    format!("emm{}", type_noise().replace_all(reference_id, ""))
}

/// Display form of one side of a designation.
fn designation_part(result: &ClassificationResult) -> (String, String) {
    if result.is_hit() {
        let name = clean_type_name(&result.best_reference_id);
        let part = format!("{name}.0");
        (name, part)
    } else {
        (NO_HIT.to_string(), NO_HIT.to_string())
    }
}

/// Types one consensus against the trimmed reference set and, if supplied,
/// the untrimmed set. Identity, overlap and verdict come from the trimmed
/// set; the untrimmed hit only names the subtype.
pub fn type_consensus(
    consensus: &Consensus,
    trimmed: &ReferenceSet,
    untrimmed: Option<&ReferenceSet>,
    config: &PipelineConfig,
) -> TypingResult {
    let classification = classify_consensus(consensus, trimmed, config);
    let (type_name, type_part) = designation_part(&classification);

    let subtype = untrimmed.map(|refs| classify_consensus(consensus, refs, config));
    let (subtype_name, designation) = match &subtype {
        Some(sub) => {
            let (name, part) = designation_part(sub);
            (name, format!("{type_part}({part})"))
        }
        None => (NO_HIT.to_string(), type_part),
    };

    TypingResult {
        subtype_reference_id: subtype.map(|s| s.best_reference_id),
        classification,
        type_name,
        subtype_name,
        designation,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Verdict;

    #[test]
    fn test_type_noise_pattern_compiles() {
        let re = type_noise();
        assert!(re.is_match("EMM1.0"));
        assert!(!re.is_match("st2904"));
    }

    #[test]
    fn test_clean_type_name() {
        assert_eq!(clean_type_name("EMM1.0"), "emm1");
        assert_eq!(clean_type_name("emm89.0"), "emm89");
        assert_eq!(clean_type_name("Em12"), "emm12");
        assert_eq!(clean_type_name("st2904"), "emmst2904");
    }

    fn reference() -> Vec<u8> {
        b"ATGGCTAGAAAAGATACCAACAAGCAATATTCGCTTCGTAAATTAAAAACCGGTACGGCTTCAGTAGCCGTGGCTTTAACC"
            .repeat(3)
    }

    #[test]
    fn test_type_with_both_sets() {
        let seq = reference();
        let cons = Consensus::new("11", seq.clone(), vec![40; seq.len()]);
        let mut trimmed = ReferenceSet::new();
        trimmed.insert("EMM1.0", seq.clone());
        let mut untrimmed = ReferenceSet::new();
        untrimmed.insert("emm1.25", seq);

        let typed = type_consensus(&cons, &trimmed, Some(&untrimmed), &PipelineConfig::default());
        assert_eq!(typed.sample_id(), "11");
        assert_eq!(typed.type_name, "emm1");
        assert_eq!(typed.subtype_name, "emm1.25");
        assert_eq!(typed.designation, "emm1.0(emm1.25.0)");
        assert_eq!(typed.subtype_reference_id.as_deref(), Some("emm1.25"));
        assert_eq!(typed.classification.verdict, Verdict::Pass);
    }

    #[test]
    fn test_type_without_untrimmed_set() {
        let seq = reference();
        let cons = Consensus::new("3", seq.clone(), vec![40; seq.len()]);
        let mut trimmed = ReferenceSet::new();
        trimmed.insert("emm4.0", seq);
        let typed = type_consensus(&cons, &trimmed, None, &PipelineConfig::default());
        assert_eq!(typed.designation, "emm4.0");
        assert_eq!(typed.subtype_name, NO_HIT);
        assert!(typed.subtype_reference_id.is_none());
    }

    #[test]
    fn test_type_no_hit() {
        let cons = Consensus::new("6", Vec::new(), Vec::new());
        let mut trimmed = ReferenceSet::new();
        trimmed.insert("emm4.0", reference());
        let empty = ReferenceSet::new();
        let typed = type_consensus(&cons, &trimmed, Some(&empty), &PipelineConfig::default());
        assert_eq!(typed.designation, "n/a(n/a)");
        assert_eq!(typed.classification.verdict, Verdict::Fail);
    }
}
