//! This file defines the types for transaction categories.
//!
//! A transaction carries up to [MAX_CATEGORIES] category labels. For
//! aggregation the list behaves like a set: each label receives the
//! transaction's full amount (fan-out), amounts are never split between
//! labels.

use std::fmt::Display;

use serde::{Deserialize, Serialize};

use crate::Error;

/// The maximum number of categories a single transaction may have.
pub const MAX_CATEGORIES: usize = 3;

/// The label of a category, e.g. 'food' or 'snacks'.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize, Hash)]
#[serde(transparent)]
pub struct CategoryName(String);

impl CategoryName {
    /// Create a category name.
    ///
    /// # Errors
    /// This function will return an error if `name` is an empty string.
    pub fn new(name: &str) -> Result<Self, Error> {
        if name.is_empty() {
            Err(Error::EmptyCategoryName)
        } else {
            Ok(Self(name.to_string()))
        }
    }

    /// Create a category name without validation.
    ///
    /// The caller should ensure that the string is not empty. This function
    /// is intended for category names read back from the database, which
    /// were validated on the way in.
    pub fn new_unchecked(name: &str) -> Self {
        Self(name.to_string())
    }
}

impl AsRef<str> for CategoryName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl Display for CategoryName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// The category labels of a single transaction.
///
/// Holds at most [MAX_CATEGORIES] non-empty labels.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<String>")]
pub struct Categories(Vec<CategoryName>);

impl Categories {
    /// Create a category list from raw labels.
    ///
    /// # Errors
    /// This function will return a:
    /// - [Error::TooManyCategories] if more than [MAX_CATEGORIES] labels
    ///   are given,
    /// - [Error::EmptyCategoryName] if any label is an empty string.
    pub fn new(labels: Vec<String>) -> Result<Self, Error> {
        if labels.len() > MAX_CATEGORIES {
            return Err(Error::TooManyCategories(labels.len()));
        }

        labels
            .iter()
            .map(|label| CategoryName::new(label))
            .collect::<Result<Vec<_>, _>>()
            .map(Self)
    }

    /// Create a category list without validation.
    ///
    /// Intended for labels read back from the database, which were
    /// validated on the way in.
    pub fn new_unchecked(labels: Vec<String>) -> Self {
        Self(
            labels
                .iter()
                .map(|label| CategoryName::new_unchecked(label))
                .collect(),
        )
    }

    /// Iterate over the category labels.
    pub fn iter(&self) -> impl Iterator<Item = &CategoryName> {
        self.0.iter()
    }

    /// The number of labels on this transaction.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether the transaction has no categories.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl TryFrom<Vec<String>> for Categories {
    type Error = Error;

    fn try_from(labels: Vec<String>) -> Result<Self, Self::Error> {
        Self::new(labels)
    }
}

#[cfg(test)]
mod categories_tests {
    use crate::Error;

    use super::{Categories, CategoryName};

    #[test]
    fn new_succeeds_on_three_labels() {
        let categories =
            Categories::new(vec!["food".to_owned(), "snacks".to_owned(), "gifts".to_owned()])
                .unwrap();

        assert_eq!(categories.len(), 3);
    }

    #[test]
    fn new_fails_on_four_labels() {
        let labels = vec![
            "food".to_owned(),
            "snacks".to_owned(),
            "gifts".to_owned(),
            "travel".to_owned(),
        ];

        let result = Categories::new(labels);

        assert_eq!(result, Err(Error::TooManyCategories(4)));
    }

    #[test]
    fn new_fails_on_empty_label() {
        let result = Categories::new(vec!["food".to_owned(), "".to_owned()]);

        assert_eq!(result, Err(Error::EmptyCategoryName));
    }

    #[test]
    fn category_name_rejects_empty_string() {
        assert_eq!(CategoryName::new(""), Err(Error::EmptyCategoryName));
    }

    #[test]
    fn deserialize_rejects_too_many_labels() {
        let result: Result<Categories, _> =
            serde_json::from_str(r#"["a", "b", "c", "d"]"#);

        assert!(result.is_err());
    }
}
