//! Category dictionaries: deterministic string-to-code translation
//!
//! A trained model expects a fixed code assignment, so codes are assigned in
//! sorted lexical order of the distinct reference values. Rebuilding from the
//! same reference data always yields the same dictionary.

use std::collections::{BTreeSet, HashMap};

use crate::{CategoryCode, PodiumError, Result};

/// How a dictionary handles values it has never seen.
///
/// Chosen once at construction and applied uniformly to every lookup. Strict
/// is the default: a silent fallback would feed the model a code it was never
/// trained on without anyone noticing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnknownCategoryPolicy {
    /// Encoding an unseen value fails with `UnknownCategory`
    Strict,
    /// Encoding an unseen value returns the designated sentinel code
    Sentinel(CategoryCode),
}

/// Bijective mapping between a categorical column's raw values and integer
/// codes, built once from the reference dataset and read-only thereafter
#[derive(Debug, Clone)]
pub struct CategoryDictionary {
    column: String,
    /// Code-to-value table; index is the code
    values: Vec<String>,
    /// Value-to-code table
    codes: HashMap<String, i64>,
    policy: UnknownCategoryPolicy,
}

impl CategoryDictionary {
    /// Build a dictionary from the raw values of one reference column.
    ///
    /// Duplicates are collapsed; the distinct values are sorted and assigned
    /// codes `0..n` in that order. Fails with `EmptyReferenceData` when no
    /// values remain.
    pub fn from_values<I, S>(column: &str, raw_values: I, policy: UnknownCategoryPolicy) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let distinct: BTreeSet<String> = raw_values.into_iter().map(Into::into).collect();

        if distinct.is_empty() {
            return Err(PodiumError::EmptyReferenceData {
                column: column.to_string(),
            });
        }

        let values: Vec<String> = distinct.into_iter().collect();
        let codes = values
            .iter()
            .enumerate()
            .map(|(i, v)| (v.clone(), i as i64))
            .collect();

        Ok(CategoryDictionary {
            column: column.to_string(),
            values,
            codes,
            policy,
        })
    }

    /// Encode a raw value to its integer code.
    ///
    /// Unseen values follow the dictionary's unknown-category policy.
    pub fn encode(&self, raw_value: &str) -> Result<CategoryCode> {
        match self.codes.get(raw_value) {
            Some(&code) => Ok(CategoryCode(code)),
            None => match self.policy {
                UnknownCategoryPolicy::Strict => Err(PodiumError::UnknownCategory {
                    column: self.column.clone(),
                    value: raw_value.to_string(),
                }),
                UnknownCategoryPolicy::Sentinel(code) => Ok(code),
            },
        }
    }

    /// Decode an integer code back to its raw value.
    ///
    /// Sentinel codes are not decodable: only codes assigned at construction
    /// are in range.
    pub fn decode(&self, code: CategoryCode) -> Result<&str> {
        if code.0 < 0 || code.0 as usize >= self.values.len() {
            return Err(PodiumError::InvalidCode {
                code: code.0,
                size: self.values.len(),
            });
        }
        Ok(&self.values[code.0 as usize])
    }

    /// Whether a raw value was observed in the reference data
    pub fn contains(&self, raw_value: &str) -> bool {
        self.codes.contains_key(raw_value)
    }

    /// Number of distinct values
    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Reference column this dictionary was built from
    pub fn column(&self) -> &str {
        &self.column
    }

    pub fn policy(&self) -> UnknownCategoryPolicy {
        self.policy
    }

    /// Values in code order
    pub fn values(&self) -> impl Iterator<Item = &str> {
        self.values.iter().map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn constructors() -> CategoryDictionary {
        CategoryDictionary::from_values(
            "constructorRef",
            ["Ferrari", "McLaren", "Mercedes"],
            UnknownCategoryPolicy::Strict,
        )
        .unwrap()
    }

    #[test]
    fn test_sorted_code_assignment() {
        let dict = constructors();
        assert_eq!(dict.encode("Ferrari").unwrap(), CategoryCode(0));
        assert_eq!(dict.encode("McLaren").unwrap(), CategoryCode(1));
        assert_eq!(dict.encode("Mercedes").unwrap(), CategoryCode(2));
        assert_eq!(dict.decode(CategoryCode(2)).unwrap(), "Mercedes");
    }

    #[test]
    fn test_deterministic_across_rebuilds() {
        // Unsorted, duplicated input must produce the same assignment as the
        // sorted distinct set
        let shuffled = CategoryDictionary::from_values(
            "constructorRef",
            ["Mercedes", "Ferrari", "McLaren", "Ferrari", "Mercedes"],
            UnknownCategoryPolicy::Strict,
        )
        .unwrap();
        let reference = constructors();

        assert_eq!(shuffled.len(), reference.len());
        for value in reference.values() {
            assert_eq!(
                shuffled.encode(value).unwrap(),
                reference.encode(value).unwrap()
            );
        }
    }

    #[test]
    fn test_round_trip_all_members() {
        let dict = constructors();
        for value in ["Ferrari", "McLaren", "Mercedes"] {
            let code = dict.encode(value).unwrap();
            assert_eq!(dict.decode(code).unwrap(), value);
        }
    }

    #[test]
    fn test_bijection_over_code_range() {
        let dict = constructors();
        let mut seen = std::collections::HashSet::new();
        for code in 0..dict.len() as i64 {
            let value = dict.decode(CategoryCode(code)).unwrap().to_string();
            assert!(seen.insert(value), "two codes decoded to the same value");
        }
        assert_eq!(seen.len(), dict.len());
    }

    #[test]
    fn test_strict_rejects_unknown() {
        let dict = constructors();
        for _ in 0..3 {
            match dict.encode("RedBull") {
                Err(PodiumError::UnknownCategory { column, value }) => {
                    assert_eq!(column, "constructorRef");
                    assert_eq!(value, "RedBull");
                }
                other => panic!("expected UnknownCategory, got {:?}", other),
            }
        }
    }

    #[test]
    fn test_sentinel_is_stable() {
        let dict = CategoryDictionary::from_values(
            "constructorRef",
            ["Ferrari", "McLaren", "Mercedes"],
            UnknownCategoryPolicy::Sentinel(CategoryCode(-1)),
        )
        .unwrap();

        for _ in 0..3 {
            assert_eq!(dict.encode("RedBull").unwrap(), CategoryCode(-1));
        }
        // Known values are unaffected by the policy
        assert_eq!(dict.encode("Ferrari").unwrap(), CategoryCode(0));
        // The sentinel never decodes
        assert!(dict.decode(CategoryCode(-1)).is_err());
    }

    #[test]
    fn test_decode_out_of_range() {
        let dict = constructors();
        match dict.decode(CategoryCode(3)) {
            Err(PodiumError::InvalidCode { code, size }) => {
                assert_eq!(code, 3);
                assert_eq!(size, 3);
            }
            other => panic!("expected InvalidCode, got {:?}", other),
        }
    }

    #[test]
    fn test_empty_reference_data() {
        let result = CategoryDictionary::from_values(
            "driverRef",
            Vec::<String>::new(),
            UnknownCategoryPolicy::Strict,
        );
        assert!(matches!(
            result,
            Err(PodiumError::EmptyReferenceData { .. })
        ));
    }
}
