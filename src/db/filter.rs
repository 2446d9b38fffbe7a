//! Parameterized "any term matches any column" predicates.
//!
//! Columns are trusted SQL expressions chosen by this crate; terms are user
//! input and only ever reach the database as bound parameters.

/// A `WHERE` fragment plus the values to bind, in placeholder order
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnyTermFilter {
    clause: String,
    binds: Vec<String>,
}

impl AnyTermFilter {
    /// Substring match of any lowercased term against any column.
    ///
    /// Columns must already hold lowercased text. An empty term or column
    /// list produces a predicate that matches nothing.
    pub fn new(columns: &[&str], terms: &[String]) -> Self {
        let mut predicates = Vec::with_capacity(columns.len() * terms.len());
        let mut binds = Vec::with_capacity(columns.len() * terms.len());

        for column in columns {
            for term in terms {
                predicates.push(format!(
                    r"COALESCE({column}, '') LIKE ? ESCAPE '\'"
                ));
                binds.push(like_pattern(term));
            }
        }

        let clause = if predicates.is_empty() {
            "0".to_string()
        } else {
            format!("({})", predicates.join(" OR "))
        };

        Self { clause, binds }
    }

    pub fn clause(&self) -> &str {
        &self.clause
    }

    pub fn binds(&self) -> &[String] {
        &self.binds
    }

    pub fn is_empty(&self) -> bool {
        self.binds.is_empty()
    }
}

/// `%term%` with LIKE wildcards in the term escaped
fn like_pattern(term: &str) -> String {
    let mut pattern = String::with_capacity(term.len() + 2);
    pattern.push('%');
    for c in term.to_lowercase().chars() {
        if matches!(c, '%' | '_' | '\\') {
            pattern.push('\\');
        }
        pattern.push(c);
    }
    pattern.push('%');
    pattern
}
