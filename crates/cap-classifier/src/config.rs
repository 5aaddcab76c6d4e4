//! Default classifier configuration with Spanish indicator phrases.

use crate::types::*;

fn s(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

fn indicators() -> IndicatorSet {
    IndicatorSet {
        complexity: s(&[
            "analiza", "análisis", "compara", "evalúa", "explica en detalle",
            "desarrolla", "diseña", "implementa", "optimiza", "arquitectura",
            "algoritmo", "estrategia", "investiga", "profundiza", "sintetiza",
            "critica", "complejo", "exhaustivo",
        ]),
        context: s(&[
            "contexto", "antecedentes", "según", "basado en", "basándote en",
            "considerando", "teniendo en cuenta", "en relación con", "respecto a",
            "documento", "anteriormente", "previamente", "conversación", "historial",
        ]),
        reasoning: s(&[
            "por qué", "cómo funciona", "razona", "demuestra", "justifica",
            "deduce", "infiere", "causa", "consecuencia", "implicaciones",
            "paso a paso", "lógica", "argumenta", "ventajas y desventajas",
        ]),
        creative: s(&[
            "escribe un", "escribe una", "poema", "cuento", "imagina", "inventa",
            "historia", "canción", "guion", "narrativa", "creativo", "creativa",
            "metáfora", "relato",
        ]),
        factual: s(&[
            "qué es", "quién es", "quién fue", "cuándo", "dónde", "cuál es",
            "cuánto", "cuántos", "define", "definición", "fecha", "capital de",
            "nombre de", "dato",
        ]),
    }
}

fn load_weights() -> LoadWeights {
    LoadWeights {
        complexity_match: 2.0,
        other_match: 1.0,
        complexity: 0.4,
        context_demand: 0.2,
        reasoning_depth: 0.3,
        creative_elements: 0.25,
        factual_elements: 0.1,
        length_bonuses: vec![(100, 0.1), (200, 0.2)],
        sentence_threshold: 3,
        sentence_bonus: 0.1,
    }
}

/// Default classifier configuration.
pub fn default_classifier_config() -> ClassifierConfig {
    ClassifierConfig {
        indicators: indicators(),
        load_weights: load_weights(),
        complex_threshold: 0.65,
        balanced_threshold: 0.3,
        history_capacity: 50,
    }
}

/// The default config instance.
pub static CLASSIFIER_CONFIG: std::sync::LazyLock<ClassifierConfig> =
    std::sync::LazyLock::new(default_classifier_config);
