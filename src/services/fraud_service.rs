//! Scoring heurístico de fraude en mensajes
//!
//! Asigna un score 0-100 a cada mensaje del chat al momento de enviarse.
//! Los mensajes con score alto se marcan para moderación pero nunca se
//! bloquean: detección, no censura.

use lazy_static::lazy_static;
use regex::Regex;

/// Umbral a partir del cual un mensaje queda marcado
pub const FLAG_THRESHOLD: u32 = 70;

/// Palabras y frases típicas de estafa con su peso
const SCAM_KEYWORDS: [(&str, u32); 12] = [
    ("western union", 40),
    ("gift card", 40),
    ("tarjeta regalo", 40),
    ("wire transfer", 35),
    ("transferencia urgente", 35),
    ("moneygram", 35),
    ("overpayment", 30),
    ("te pago de más", 30),
    ("fuera de la plataforma", 25),
    ("escrow", 20),
    ("shipping agent", 25),
    ("agente de envío", 25),
];

/// Marcadores de urgencia excesiva
const URGENCY_MARKERS: [&str; 5] = [
    "urgente",
    "ahora mismo",
    "última oportunidad",
    "act now",
    "right now",
];

lazy_static! {
    static ref URL_REGEX: Regex =
        Regex::new(r"https?://[^\s]+").expect("URL regex inválida");
    static ref EMAIL_REGEX: Regex =
        Regex::new(r"[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}").expect("email regex inválida");
    static ref PHONE_REGEX: Regex =
        Regex::new(r"\+?\d[\d\s().-]{8,}\d").expect("phone regex inválida");
}

/// Resultado del análisis de un mensaje
#[derive(Debug, Clone)]
pub struct FraudAssessment {
    pub score: u32,
    pub flagged: bool,
    pub indicators: Vec<String>,
}

/// Calcular el score de fraude de un mensaje.
///
/// `is_early_message` indica que la conversación recién empieza: compartir
/// contacto o links en los primeros mensajes pesa más.
pub fn score_message(body: &str, is_early_message: bool) -> FraudAssessment {
    let text = body.to_lowercase();
    let mut score: u32 = 0;
    let mut indicators = Vec::new();

    for (keyword, weight) in SCAM_KEYWORDS {
        if text.contains(keyword) {
            score += weight;
            indicators.push(format!("keyword: {}", keyword));
        }
    }

    let urgency_hits = URGENCY_MARKERS
        .iter()
        .filter(|marker| text.contains(*marker))
        .count() as u32;
    if urgency_hits > 0 {
        score += 15 * urgency_hits;
        indicators.push(format!("urgency markers: {}", urgency_hits));
    }

    if URL_REGEX.is_match(&text) {
        score += if is_early_message { 25 } else { 10 };
        indicators.push("external link".to_string());
    }

    if is_early_message {
        if EMAIL_REGEX.is_match(&text) {
            score += 20;
            indicators.push("email in early message".to_string());
        }
        if PHONE_REGEX.is_match(&text) {
            score += 15;
            indicators.push("phone number in early message".to_string());
        }
    }

    let score = score.min(100);
    let flagged = score >= FLAG_THRESHOLD;

    if flagged {
        log::warn!(
            "🚩 Mensaje marcado por posible fraude (score {}): {:?}",
            score,
            indicators
        );
    }

    FraudAssessment {
        score,
        flagged,
        indicators,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_benign_message_scores_low() {
        let result = score_message("Hola, ¿la moto sigue disponible? ¿Puedo verla el sábado?", true);
        assert_eq!(result.score, 0);
        assert!(!result.flagged);
    }

    #[test]
    fn test_gift_card_plus_urgency_is_flagged() {
        let result = score_message(
            "Te pago con gift card pero tiene que ser ahora mismo, urgente",
            false,
        );
        assert!(result.score >= FLAG_THRESHOLD, "score: {}", result.score);
        assert!(result.flagged);
    }

    #[test]
    fn test_early_contact_sharing_raises_score() {
        let early = score_message("Escríbeme a estafador@example.com mejor", true);
        let late = score_message("Escríbeme a estafador@example.com mejor", false);
        assert!(early.score > late.score);
    }

    #[test]
    fn test_link_in_early_message() {
        let result = score_message("Paga aquí https://pago-seguro.example/abc", true);
        assert!(result.indicators.iter().any(|i| i == "external link"));
    }

    #[test]
    fn test_score_is_capped_at_100() {
        let result = score_message(
            "western union gift card wire transfer moneygram overpayment urgente ahora mismo \
             https://x.example escrow shipping agent",
            true,
        );
        assert_eq!(result.score, 100);
    }
}
