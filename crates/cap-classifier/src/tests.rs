use crate::*;
use crate::features::sentence_count;
use crate::memory::excerpt;
use cap_core::TaskTier;
use std::sync::Arc;

fn cfg() -> ClassifierConfig { default_classifier_config() }

fn features(prompt: &str) -> PromptFeatures {
    let c = cfg();
    extract_features(prompt, &c.indicators, &c.load_weights)
}

fn approx(a: f64, b: f64) -> bool { (a - b).abs() < 1e-9 }

// ========== Feature Extraction ==========

#[test]
fn test_empty_prompt_has_no_features() {
    assert!(features("").is_empty());
    assert!(features("   \n\t ").is_empty());
}

#[test]
fn test_complexity_weighted_double() {
    let f = features("Analiza este texto");
    assert_eq!(f.complexity, 2.0);
    assert_eq!(f.reasoning_depth, 0.0);
}

#[test]
fn test_distinct_phrases_accumulate() {
    let f = features("Analiza, compara y evalúa las opciones");
    assert_eq!(f.complexity, 6.0);
}

#[test]
fn test_case_insensitive_match() {
    let f = features("POR QUÉ SUCEDE ESTO");
    assert_eq!(f.reasoning_depth, 1.0);
}

#[test]
fn test_each_list_scored() {
    let f = features("Según el contexto, ¿por qué ocurre? Escribe un poema. ¿Qué es?");
    assert_eq!(f.context_demand, 2.0);
    assert_eq!(f.reasoning_depth, 1.0);
    assert_eq!(f.creative_elements, 2.0);
    assert_eq!(f.factual_elements, 1.0);
}

// ========== Cognitive Load ==========

#[test]
fn test_load_zero_for_empty() {
    let c = cfg();
    assert_eq!(cognitive_load("", &PromptFeatures::default(), &c.load_weights), 0.0);
}

#[test]
fn test_load_linear_combination() {
    let c = cfg();
    let f = PromptFeatures {
        complexity: 0.0,
        context_demand: 1.0,
        reasoning_depth: 1.0,
        creative_elements: 0.0,
        factual_elements: 1.0,
    };
    assert!(approx(cognitive_load("corto", &f, &c.load_weights), 0.6));
}

#[test]
fn test_load_length_bonuses_cumulative() {
    let c = cfg();
    let none = PromptFeatures::default();
    assert!(approx(cognitive_load(&"a".repeat(100), &none, &c.load_weights), 0.0));
    assert!(approx(cognitive_load(&"a".repeat(101), &none, &c.load_weights), 0.1));
    assert!(approx(cognitive_load(&"a".repeat(201), &none, &c.load_weights), 0.3));
}

#[test]
fn test_load_length_counts_chars_not_bytes() {
    let c = cfg();
    // 60 two-byte chars: 120 bytes but only 60 chars
    assert!(approx(cognitive_load(&"ñ".repeat(60), &PromptFeatures::default(), &c.load_weights), 0.0));
}

#[test]
fn test_load_sentence_bonus() {
    let c = cfg();
    let none = PromptFeatures::default();
    assert!(approx(cognitive_load("Uno. Dos. Tres.", &none, &c.load_weights), 0.0));
    assert!(approx(cognitive_load("Uno. Dos! Tres? Cuatro.", &none, &c.load_weights), 0.1));
}

#[test]
fn test_load_clamped() {
    let c = cfg();
    let f = PromptFeatures { complexity: 20.0, ..Default::default() };
    assert_eq!(cognitive_load("x", &f, &c.load_weights), 1.0);
}

#[test]
fn test_sentence_count_discards_empty_fragments() {
    assert_eq!(sentence_count(""), 0);
    assert_eq!(sentence_count("...!!!???"), 0);
    assert_eq!(sentence_count("Hola... ¿qué tal?? Bien!"), 3);
}

// ========== Tier Selection ==========

#[test]
fn test_select_high_load_complex() {
    assert_eq!(select_tier(0.7, &PromptFeatures::default(), &cfg()), TaskTier::Complex);
}

#[test]
fn test_select_mid_load_escalation() {
    let c = cfg();
    let deep = PromptFeatures { reasoning_depth: 3.0, ..Default::default() };
    let heavy = PromptFeatures { complexity: 6.0, ..Default::default() };
    let context = PromptFeatures { context_demand: 3.0, ..Default::default() };
    assert_eq!(select_tier(0.5, &deep, &c), TaskTier::Complex);
    assert_eq!(select_tier(0.5, &heavy, &c), TaskTier::Complex);
    assert_eq!(select_tier(0.5, &context, &c), TaskTier::Complex);
    assert_eq!(select_tier(0.5, &PromptFeatures::default(), &c), TaskTier::Balanced);
}

#[test]
fn test_select_creative_stays_balanced() {
    let creative = PromptFeatures { creative_elements: 2.0, ..Default::default() };
    assert_eq!(select_tier(0.5, &creative, &cfg()), TaskTier::Balanced);
}

#[test]
fn test_select_low_load() {
    let c = cfg();
    let factual = PromptFeatures { factual_elements: 4.0, ..Default::default() };
    assert_eq!(select_tier(0.3, &factual, &c), TaskTier::Balanced);
    assert_eq!(select_tier(0.3, &PromptFeatures::default(), &c), TaskTier::FastResponse);
    assert_eq!(select_tier(0.0, &PromptFeatures::default(), &c), TaskTier::FastResponse);
}

// ========== Classifier ==========

#[test]
fn test_classify_empty_fast() {
    let classifier = TaskClassifier::default();
    assert_eq!(classifier.classify(""), TaskTier::FastResponse);
}

#[test]
fn test_classify_greeting_fast() {
    let classifier = TaskClassifier::default();
    assert_eq!(classifier.classify("Hola"), TaskTier::FastResponse);
    assert_eq!(classifier.classify("¿Qué es Rust?"), TaskTier::FastResponse);
}

#[test]
fn test_classify_balanced_question() {
    let classifier = TaskClassifier::default();
    let r = classifier.analyze("¿Por qué el cielo es azul y cuándo se ve rojo?");
    assert_eq!(r.tier, TaskTier::Balanced);
    assert!(approx(r.cognitive_load, 0.4));
}

#[test]
fn test_classify_creative_balanced() {
    let classifier = TaskClassifier::default();
    assert_eq!(classifier.classify("Escribe un poema sobre el mar"), TaskTier::Balanced);
}

#[test]
fn test_classify_context_heavy_complex() {
    let classifier = TaskClassifier::default();
    let r = classifier.analyze("Según el documento y su contexto, resume");
    assert_eq!(r.features.context_demand, 3.0);
    assert!(r.cognitive_load <= 0.65);
    assert_eq!(r.tier, TaskTier::Complex);
}

#[test]
fn test_classify_long_complex_prompt() {
    let prompt = "Analiza y compara las dos propuestas. Evalúa sus riesgos. Desarrolla un plan. \
        Sintetiza las conclusiones finales para el comité directivo, incluyendo todos los puntos \
        relevantes que hemos discutido durante las últimas semanas de trabajo intenso.";
    assert!(prompt.chars().count() > 200);
    let classifier = TaskClassifier::default();
    let r = classifier.analyze(prompt);
    assert_eq!(r.tier, TaskTier::Complex);
    assert_eq!(r.cognitive_load, 1.0);
}

#[test]
fn test_classify_total_over_odd_input() {
    let classifier = TaskClassifier::default();
    for prompt in ["?", "....", "🦫🦫🦫", "\u{0}", &"¿por qué? ".repeat(500)] {
        let tier = classifier.classify(prompt);
        assert!(TaskTier::ALL.contains(&tier));
    }
}

#[test]
fn test_analyze_does_not_record() {
    let classifier = TaskClassifier::default();
    classifier.analyze("Analiza esto");
    assert_eq!(classifier.working_memory_stats().total_decisions, 0);
}

// ========== Working Memory ==========

#[test]
fn test_history_bounded_fifo() {
    let classifier = TaskClassifier::default();
    for i in 0..51 {
        classifier.classify(&format!("mensaje {i}"));
    }
    let memory = classifier.memory().lock();
    assert_eq!(memory.len(), 50);
    let excerpts: Vec<&str> = memory.records().map(|r| r.prompt_excerpt.as_str()).collect();
    assert!(!excerpts.contains(&"mensaje 0"));
    assert_eq!(excerpts[0], "mensaje 1");
    assert_eq!(excerpts[49], "mensaje 50");
}

#[test]
fn test_history_never_exceeds_capacity() {
    let classifier = TaskClassifier::default();
    for _ in 0..500 {
        classifier.classify("Hola");
    }
    assert_eq!(classifier.working_memory_stats().total_decisions, 50);
}

#[test]
fn test_custom_capacity() {
    let mut c = cfg();
    c.history_capacity = 3;
    let classifier = TaskClassifier::new(c);
    for _ in 0..10 {
        classifier.classify("Hola");
    }
    let stats = classifier.working_memory_stats();
    assert_eq!(stats.total_decisions, 3);
    assert_eq!(stats.window, 3);
}

#[test]
fn test_excerpt_truncation() {
    assert_eq!(excerpt("corto"), "corto");
    assert_eq!(excerpt(&"x".repeat(100)), "x".repeat(100));
    let long = excerpt(&"é".repeat(150));
    assert_eq!(long.chars().count(), 103);
    assert!(long.ends_with("..."));
}

#[test]
fn test_stats_distribution_and_average() {
    let classifier = TaskClassifier::default();
    classifier.classify("Hola");
    classifier.classify("Escribe un poema sobre el mar");
    classifier.classify("Analiza esto");
    let stats = classifier.working_memory_stats();
    assert_eq!(stats.total_decisions, 3);
    assert_eq!(stats.task_type_distribution[&TaskTier::FastResponse], 1);
    assert_eq!(stats.task_type_distribution[&TaskTier::Balanced], 1);
    assert_eq!(stats.task_type_distribution[&TaskTier::Complex], 1);
    assert!(approx(stats.average_cognitive_load, (0.0 + 0.5 + 0.8) / 3.0));
}

#[test]
fn test_stats_empty() {
    let stats = WorkingMemory::new(50).stats();
    assert_eq!(stats.total_decisions, 0);
    assert_eq!(stats.average_cognitive_load, 0.0);
    assert!(stats.task_type_distribution.is_empty());
}

#[test]
fn test_stats_serialize_tier_keys() {
    let classifier = TaskClassifier::default();
    classifier.classify("Hola");
    let json = serde_json::to_value(classifier.working_memory_stats()).unwrap();
    assert_eq!(json["task_type_distribution"]["fast_response"], 1);
    assert_eq!(json["window"], 50);
}

#[test]
fn test_shared_memory_between_classifiers() {
    let memory = WorkingMemory::shared(50);
    let a = TaskClassifier::with_memory(cfg(), Arc::clone(&memory));
    let b = TaskClassifier::with_memory(cfg(), Arc::clone(&memory));
    a.classify("Hola");
    b.classify("Adiós");
    assert_eq!(memory.lock().len(), 2);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_classification() {
    let classifier = Arc::new(TaskClassifier::default());
    let mut handles = Vec::new();
    for i in 0..16 {
        let c = Arc::clone(&classifier);
        handles.push(tokio::spawn(async move {
            for j in 0..20 {
                c.classify(&format!("tarea {i}-{j}"));
            }
        }));
    }
    for h in handles {
        h.await.unwrap();
    }
    assert_eq!(classifier.working_memory_stats().total_decisions, 50);
}

// ========== Keyword Classifier ==========

#[test]
fn test_keyword_coding() {
    let r = classify_by_keyword("escribe una función en python");
    assert_eq!(r.category, "coding");
    assert_eq!(r.suggested_model, "qwen_coder");
    assert!(!r.needs_rag);
}

#[test]
fn test_keyword_multilingual() {
    let r = classify_by_keyword("traducir al inglés");
    assert_eq!(r.category, "multilingual");
    assert_eq!(r.suggested_model, "aya_expanse_multilingual");
}

#[test]
fn test_keyword_coding_wins_overlap() {
    let r = classify_by_keyword("compara el rendimiento de python y rust");
    assert_eq!(r.category, "coding");
    let r = classify_by_keyword("traduce este código a inglés");
    assert_eq!(r.category, "coding");
}

#[test]
fn test_keyword_technical() {
    let r = classify_by_keyword("analiza el rendimiento del sistema");
    assert_eq!(r.category, "technical");
    assert_eq!(r.subcategory, "analysis");
    assert!(r.needs_context);
}

#[test]
fn test_keyword_company_info() {
    let r = classify_by_keyword("¿Qué servicios ofrece Capibara6?");
    assert_eq!(r.category, "company_info");
    assert!(r.needs_rag);
}

#[test]
fn test_keyword_api_needs_word_boundary() {
    // "capibara" contains "api" but is not a coding request
    assert_ne!(classify_by_keyword("háblame de capibara").category, "coding");
}

#[test]
fn test_keyword_general_fallback() {
    let r = classify_by_keyword("hola, ¿cómo estás?");
    assert_eq!(r.category, "general");
    assert_eq!(r.suggested_model, "phi4_fast");
    assert_eq!(r.confidence, 0.6);
    assert_eq!(classify_by_keyword("").category, "general");
}

#[test]
fn test_keyword_case_insensitive() {
    assert_eq!(classify_by_keyword("ESCRIBE CÓDIGO JAVASCRIPT").category, "coding");
}

// ========== Performance ==========

#[test]
fn test_classification_performance() {
    let classifier = TaskClassifier::default();
    let start = std::time::Instant::now();
    for _ in 0..1000 {
        classifier.classify("Analiza la arquitectura del sistema y explica en detalle por qué falla");
    }
    assert!(start.elapsed().as_millis() < 5000);
}
