use super::tokenizer::Query;

/// Full phrase equals the text
pub const EXACT_SCORE: u32 = 100;
/// Text starts with the full phrase
pub const PHRASE_PREFIX_SCORE: u32 = 70;
/// Text contains the full phrase
pub const PHRASE_CONTAINS_SCORE: u32 = 50;
/// Per term found anywhere in the text
pub const TERM_SCORE: u32 = 10;
/// Text starts with at least one term
pub const TERM_PREFIX_SCORE: u32 = 30;

pub const NAME_WEIGHT: f64 = 1.0;
pub const TAG_WEIGHT: f64 = 0.2;
pub const INGREDIENT_WEIGHT: f64 = 0.15;
/// Ingredient score used when a recipe's matched foods carry no score
pub const INGREDIENT_FALLBACK_SCORE: f64 = 10.0;

/// Score how well `text` matches the query.
///
/// Exact and prefix phrase matches return immediately; otherwise phrase
/// containment, per-term containment and a term prefix bonus accumulate.
pub fn match_score(text: &str, query: &Query) -> u32 {
    if query.is_empty() {
        return 0;
    }

    let text = text.to_lowercase();

    if text == query.joined {
        return EXACT_SCORE;
    }
    if text.starts_with(&query.joined) {
        return PHRASE_PREFIX_SCORE;
    }

    let mut score = 0;
    if text.contains(&query.joined) {
        score += PHRASE_CONTAINS_SCORE;
    }

    let matching_terms = query
        .terms
        .iter()
        .filter(|term| text.contains(term.as_str()))
        .count() as u32;
    score += matching_terms * TERM_SCORE;

    if query.terms.iter().any(|term| text.starts_with(term.as_str())) {
        score += TERM_PREFIX_SCORE;
    }

    score
}

/// Scale a score by a signal weight, flooring to an integer
pub fn weighted(score: f64, weight: f64) -> u32 {
    (score * weight).floor() as u32
}
