//! Keyword classifier: first matching category wins.

use crate::types::KeywordClassification;
use regex::Regex;
use std::sync::LazyLock;

struct Category {
    pattern: &'static str,
    result: KeywordClassification,
}

const fn category(
    category: &'static str,
    subcategory: &'static str,
    confidence: f64,
    suggested_model: &'static str,
    needs_context: bool,
    needs_rag: bool,
) -> KeywordClassification {
    KeywordClassification { category, subcategory, confidence, suggested_model, needs_context, needs_rag }
}

// Order matters: coding must win over anything it overlaps with.
static CATEGORIES: [Category; 4] = [
    Category {
        pattern: r"(?i)\b(c[oó]digo|funci[oó]n(es)?|programa(r|ci[oó]n)?|python|javascript|typescript|rust|java|sql|api|script|debug(ear)?|bug|compila(r|dor)?|clase|variable|regex|html|css)\b",
        result: category("coding", "programming", 0.9, "qwen_coder", false, false),
    },
    Category {
        pattern: r"(?i)\b(anali[zc]\w*|an[aá]lisis|t[eé]cnic[oa]s?|arquitectura|sistemas?|rendimiento|optimiz\w*|compar\w*|eval[uú]\w*|investig\w*)\b",
        result: category("technical", "analysis", 0.85, "gpt_oss_complex", true, false),
    },
    Category {
        pattern: r"(?i)\b(traduc\w*|translat\w*|ingl[eé]s|franc[eé]s|alem[aá]n|italiano|portugu[eé]s|chino|japon[eé]s|idiomas?|english|french|german)\b",
        result: category("multilingual", "translation", 0.88, "aya_expanse_multilingual", false, false),
    },
    Category {
        pattern: r"(?i)\b(capibara6?|anachroni\w*|empresa|compa[ñn][ií]a|precios?|contacto|qui[eé]nes\s+(sois|son)|servicios?|productos?)\b",
        result: category("company_info", "about", 0.8, "mistral_balanced", true, true),
    },
];

const GENERAL: KeywordClassification = category("general", "conversation", 0.6, "phi4_fast", false, false);

static PATTERNS: LazyLock<Vec<(Regex, &'static KeywordClassification)>> = LazyLock::new(|| {
    CATEGORIES
        .iter()
        .filter_map(|c| match Regex::new(c.pattern) {
            Ok(re) => Some((re, &c.result)),
            Err(e) => {
                tracing::error!(category = c.result.category, error = %e, "invalid keyword pattern");
                None
            }
        })
        .collect()
});

/// Map free text to a category and suggested model name.
pub fn classify_by_keyword(text: &str) -> KeywordClassification {
    PATTERNS
        .iter()
        .find(|(re, _)| re.is_match(text))
        .map(|(_, result)| (*result).clone())
        .unwrap_or_else(|| GENERAL.clone())
}
