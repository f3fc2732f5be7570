//! Vocabulary categories and the built-in French street-type list.

use crate::error::VocabularyError;
use serde::Serialize;
use std::fmt;

/// The category a vocabulary list belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Category {
    StreetType,
    Commune,
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Category::StreetType => write!(f, "street-type"),
            Category::Commune => write!(f, "commune"),
        }
    }
}

/// French street types with their usual abbreviations.
///
/// Each entry is one term; spelling variants of the same word are listed separately.
pub const STREET_TYPES: &[&str] = &[
    "Allée",
    "ALL",
    "Avenue",
    "AV",
    "Boulevard",
    "BD",
    "Centre",
    "CTRE",
    "Centre Commercial",
    "CCAA",
    "Chemin",
    "CHEM",
    "Immeuble",
    "Immeubles",
    "IMM",
    "Impasse",
    "IMP",
    "Lieu-dit",
    "Lieu dit",
    "Lieudit",
    "LD",
    "Lotissement",
    "LOT",
    "Montée",
    "Passage",
    "PAS",
    "Place",
    "PL",
    "Résidence",
    "RES",
    "Rond-Point",
    "Rond Point",
    "RondPoint",
    "RPT",
    "Route",
    "RTE",
    "Rue",
    "Ruelle",
    "Sentier",
    "SENT",
    "Square",
    "SQ",
    "Village",
    "VLGE",
    "Zone d'activité",
    "ZA",
    "Zone d'activité concerté",
    "ZAC",
    "Zone d'activité différé",
    "ZAD",
    "Zone industrielle",
    "ZI",
];

/// A category-homogeneous list of raw terms.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Vocabulary {
    category: Category,
    terms: Vec<String>,
}

impl Vocabulary {
    pub fn new<S: AsRef<str>>(category: Category, terms: &[S]) -> Self {
        Self {
            category,
            terms: terms.iter().map(|t| t.as_ref().to_string()).collect(),
        }
    }

    /// The built-in street-type vocabulary.
    pub fn street_types() -> Self {
        Self::new(Category::StreetType, STREET_TYPES)
    }

    pub fn category(&self) -> Category {
        self.category
    }

    pub fn terms(&self) -> &[String] {
        &self.terms
    }

    pub fn len(&self) -> usize {
        self.terms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }

    /// Reject empty lists and terms that cannot be matched.
    pub fn validate(&self) -> Result<(), VocabularyError> {
        if self.terms.is_empty() {
            return Err(VocabularyError::Empty {
                category: self.category,
            });
        }
        for (index, term) in self.terms.iter().enumerate() {
            let reason = if term.trim().is_empty() {
                Some("blank term")
            } else if term.chars().any(char::is_control) {
                Some("control character")
            } else {
                None
            };
            if let Some(reason) = reason {
                return Err(VocabularyError::MalformedTerm {
                    category: self.category,
                    index,
                    term: term.clone(),
                    reason,
                });
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn built_in_street_types_are_valid() {
        assert!(Vocabulary::street_types().validate().is_ok());
    }

    #[test]
    fn built_in_entries_are_not_merged() {
        assert!(STREET_TYPES.contains(&"Lieudit"));
        assert!(STREET_TYPES.contains(&"Lotissement"));
        assert!(STREET_TYPES.contains(&"RPT"));
        assert!(STREET_TYPES.contains(&"Route"));
        assert!(!STREET_TYPES.iter().any(|t| t.contains("LieuditLotissement")));
    }

    #[test]
    fn empty_vocabulary_is_rejected() {
        let empty: [&str; 0] = [];
        let err = Vocabulary::new(Category::Commune, &empty)
            .validate()
            .unwrap_err();
        assert_eq!(
            err,
            VocabularyError::Empty {
                category: Category::Commune
            }
        );
    }

    #[test]
    fn blank_and_control_terms_are_rejected() {
        let err = Vocabulary::new(Category::Commune, &["Paris", "  "])
            .validate()
            .unwrap_err();
        assert!(matches!(
            err,
            VocabularyError::MalformedTerm { index: 1, reason: "blank term", .. }
        ));

        let err = Vocabulary::new(Category::StreetType, &["Rue\u{7}"])
            .validate()
            .unwrap_err();
        assert!(matches!(
            err,
            VocabularyError::MalformedTerm { reason: "control character", .. }
        ));
    }
}
