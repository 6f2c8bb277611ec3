//! Message text families.
//!
//! A discriminator draw selects one of four mutually exclusive families by
//! cumulative threshold:
//!
//! | Range          | Family        |
//! |----------------|---------------|
//! | `[0.00, 0.42)` | phrase        |
//! | `[0.42, 0.72)` | token salad   |
//! | `[0.72, 0.87)` | posted trade  |
//! | `[0.87, 1.00)` | question      |

use super::template::{render_template, TemplateEnv};
use crate::rng::XorShift32;
use crate::vocab::{EMOJI, FILLER_WORDS, PHRASES, QUESTIONS, TOKENS};

pub const PHRASE_THRESHOLD: f64 = 0.42;
pub const SALAD_THRESHOLD: f64 = 0.72;
pub const POSTED_THRESHOLD: f64 = 0.87;

/// Probability a salad word is a market token.
const SALAD_TOKEN_CHANCE: f64 = 0.13;
/// Probability a non-token salad word is an emoji.
const SALAD_EMOJI_CHANCE: f64 = 0.11;

/// Minimum text length in characters.
pub const MIN_TEXT_CHARS: usize = 6;

/// Text family selected by the discriminator draw.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextFamily {
    Phrase,
    TokenSalad,
    PostedTrade,
    Question,
}

impl TextFamily {
    pub fn from_draw(draw: f64) -> Self {
        if draw < PHRASE_THRESHOLD {
            TextFamily::Phrase
        } else if draw < SALAD_THRESHOLD {
            TextFamily::TokenSalad
        } else if draw < POSTED_THRESHOLD {
            TextFamily::PostedTrade
        } else {
            TextFamily::Question
        }
    }
}

/// Inputs of text generation beyond the template environment.
#[derive(Debug, Clone, Copy)]
pub struct TextParams<'a> {
    pub first_name: &'a str,
    pub min_words: u32,
    pub max_words: u32,
}

/// Draw the discriminator and produce text for the selected family.
pub fn generate_text(rng: &mut XorShift32, env: &TemplateEnv, params: TextParams<'_>) -> String {
    match TextFamily::from_draw(rng.next_f64()) {
        TextFamily::Phrase => pick_template(rng, PHRASES, env),
        TextFamily::TokenSalad => token_salad(rng, params.min_words, params.max_words),
        TextFamily::PostedTrade => format!(
            "{} posted: {} {} @ {} on the {} — TP {} / SL {}",
            params.first_name, env.token, env.order, env.price, env.timeframe, env.tp, env.stop
        ),
        TextFamily::Question => pick_template(rng, QUESTIONS, env),
    }
}

fn pick_template(rng: &mut XorShift32, templates: &[&str], env: &TemplateEnv) -> String {
    rng.pick(templates)
        .map(|t| render_template(t, env))
        .unwrap_or_default()
}

/// Random words, tokens and emoji. The emoji check uses a fresh draw after
/// a failed token check.
fn token_salad(rng: &mut XorShift32, min_words: u32, max_words: u32) -> String {
    let spread = f64::from(max_words.saturating_sub(min_words));
    let words = (rng.next_f64() * spread + f64::from(min_words)) as usize;

    let mut parts: Vec<&str> = Vec::with_capacity(words);
    for _ in 0..words {
        let word = if rng.chance(SALAD_TOKEN_CHANCE) {
            rng.pick(TOKENS)
        } else if rng.chance(SALAD_EMOJI_CHANCE) {
            rng.pick(EMOJI)
        } else {
            rng.pick(FILLER_WORDS)
        };
        parts.extend(word.copied());
    }
    parts.join(" ")
}

/// Append emoji until the text reaches [`MIN_TEXT_CHARS`].
pub fn pad_text(text: &mut String, rng: &mut XorShift32) {
    while text.chars().count() < MIN_TEXT_CHARS {
        if let Some(emoji) = rng.pick(EMOJI) {
            if !text.is_empty() {
                text.push(' ');
            }
            text.push_str(emoji);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn env() -> TemplateEnv {
        TemplateEnv {
            token: "SOL".to_string(),
            indicator: "RSI".to_string(),
            timeframe: "4h".to_string(),
            order: "limit".to_string(),
            price: "700.12".to_string(),
            tp: "750".to_string(),
            stop: "650.3".to_string(),
        }
    }

    fn params() -> TextParams<'static> {
        TextParams {
            first_name: "Luna",
            min_words: 4,
            max_words: 20,
        }
    }

    #[test]
    fn test_family_thresholds() {
        assert_eq!(TextFamily::from_draw(0.0), TextFamily::Phrase);
        assert_eq!(TextFamily::from_draw(0.4199), TextFamily::Phrase);
        assert_eq!(TextFamily::from_draw(0.42), TextFamily::TokenSalad);
        assert_eq!(TextFamily::from_draw(0.72), TextFamily::PostedTrade);
        assert_eq!(TextFamily::from_draw(0.87), TextFamily::Question);
        assert_eq!(TextFamily::from_draw(0.9999), TextFamily::Question);
    }

    #[test]
    fn test_generate_text_is_deterministic() {
        for seed in 1..200 {
            let a = generate_text(&mut XorShift32::new(seed), &env(), params());
            let b = generate_text(&mut XorShift32::new(seed), &env(), params());
            assert_eq!(a, b);
            assert!(!a.is_empty());
            assert!(!a.contains("{token}"));
        }
    }

    #[test]
    fn test_posted_trade_text() {
        let seed = (1..10_000)
            .find(|s| TextFamily::from_draw(XorShift32::new(*s).next_f64()) == TextFamily::PostedTrade)
            .unwrap();
        let text = generate_text(&mut XorShift32::new(seed), &env(), params());
        assert_eq!(text, "Luna posted: SOL limit @ 700.12 on the 4h — TP 750 / SL 650.3");
    }

    #[test]
    fn test_salad_word_count() {
        let mut rng = XorShift32::new(77);
        for _ in 0..200 {
            let salad = token_salad(&mut rng, 4, 20);
            let words = salad.split(' ').count();
            assert!((4..20).contains(&words), "{words} words: {salad}");
        }
    }

    #[test]
    fn test_pad_text() {
        let mut rng = XorShift32::new(5);
        let mut text = "ok".to_string();
        pad_text(&mut text, &mut rng);
        assert!(text.chars().count() >= MIN_TEXT_CHARS);
        assert!(text.starts_with("ok "));

        let mut long = "Diamond hands.".to_string();
        pad_text(&mut long, &mut rng);
        assert_eq!(long, "Diamond hands.");
    }
}
