/// A normalized search query
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Query {
    /// Lowercased, whitespace separated tokens in input order
    pub terms: Vec<String>,
    /// Terms rejoined with single spaces, for whole-phrase matching
    pub joined: String,
}

impl Query {
    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }
}

pub fn tokenize(raw: &str) -> Query {
    let terms: Vec<String> = raw
        .to_lowercase()
        .split_whitespace()
        .map(str::to_string)
        .collect();
    let joined = terms.join(" ");

    Query { terms, joined }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tokenize_collapses_whitespace() {
        let query = tokenize("  Pollo  Asado ");
        assert_eq!(query.terms, vec!["pollo", "asado"]);
        assert_eq!(query.joined, "pollo asado");
    }

    #[test]
    fn test_tokenize_blank_input() {
        assert!(tokenize("").is_empty());
        assert!(tokenize(" \t\n ").is_empty());
        assert_eq!(tokenize("   ").joined, "");
    }

    #[test]
    fn test_tokenize_unicode() {
        let query = tokenize("PIÑA Colada");
        assert_eq!(query.terms, vec!["piña", "colada"]);
    }
}
