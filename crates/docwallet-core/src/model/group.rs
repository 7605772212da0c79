// ── One-or-many card container ──

use std::collections::HashMap;

use super::card::CardRef;
use super::document::DocTypeCode;

/// One collection entry: either a single value or a non-empty stack of
/// values sharing a document type.
#[derive(Debug, Clone)]
pub enum MultipleOrSingle<T> {
    Single(T),
    /// Never empty. Build through [`MultipleOrSingle::multiple`] or
    /// [`MultipleOrSingle::try_multiple`].
    Multiple(Vec<T>),
}

/// A collection entry of cards.
pub type CardGroup = MultipleOrSingle<CardRef>;

impl<T> MultipleOrSingle<T> {
    pub fn single(value: T) -> Self {
        Self::Single(value)
    }

    /// Build a stack. Panics on an empty vector.
    pub fn multiple(values: Vec<T>) -> Self {
        assert!(!values.is_empty(), "MultipleOrSingle::multiple requires at least one value");
        Self::Multiple(values)
    }

    /// Build a stack, or `None` for an empty vector.
    pub fn try_multiple(values: Vec<T>) -> Option<Self> {
        (!values.is_empty()).then_some(Self::Multiple(values))
    }

    /// `Single` for one value, `Multiple` for more, `None` for none.
    pub fn from_values(mut values: Vec<T>) -> Option<Self> {
        match values.len() {
            0 => None,
            1 => values.pop().map(Self::Single),
            _ => Some(Self::Multiple(values)),
        }
    }

    /// Number of members (always at least one).
    pub fn count(&self) -> usize {
        match self {
            Self::Single(_) => 1,
            Self::Multiple(values) => values.len(),
        }
    }

    pub fn is_single(&self) -> bool {
        matches!(self, Self::Single(_))
    }

    pub fn values(&self) -> &[T] {
        match self {
            Self::Single(value) => std::slice::from_ref(value),
            Self::Multiple(values) => values,
        }
    }

    pub fn into_values(self) -> Vec<T> {
        match self {
            Self::Single(value) => vec![value],
            Self::Multiple(values) => values,
        }
    }

    /// The value shown on top. Panics if a `Multiple` was built empty,
    /// which the constructors rule out.
    pub fn representative(&self) -> &T {
        match self {
            Self::Single(value) => value,
            Self::Multiple(values) => values
                .first()
                .unwrap_or_else(|| panic!("MultipleOrSingle::Multiple must not be empty")),
        }
    }
}

// ── Grouping ─────────────────────────────────────────────────────────

/// Group cards by document type.
///
/// Groups follow `order`; types missing from `order` come after it in
/// first-seen order. Cards without a type stay single and go last.
/// Members keep their input order.
pub fn group_by_type(order: &[DocTypeCode], cards: Vec<CardRef>) -> Vec<CardGroup> {
    let mut buckets: Vec<(DocTypeCode, Vec<CardRef>)> = Vec::new();
    let mut index: HashMap<DocTypeCode, usize> = HashMap::new();
    let mut untyped = Vec::new();

    for card in cards {
        let Some(code) = card.document_type().map(|t| t.code.clone()) else {
            untyped.push(card);
            continue;
        };
        if let Some(&i) = index.get(&code) {
            if let Some((_, members)) = buckets.get_mut(i) {
                members.push(card);
            }
        } else {
            index.insert(code.clone(), buckets.len());
            buckets.push((code, vec![card]));
        }
    }

    let rank = |code: &DocTypeCode| order.iter().position(|c| c == code).unwrap_or(order.len());
    buckets.sort_by_key(|(code, _)| rank(code));

    buckets
        .into_iter()
        .filter_map(|(_, members)| MultipleOrSingle::from_values(members))
        .chain(untyped.into_iter().map(MultipleOrSingle::Single))
        .collect()
}

/// Sort stack members by a stored per-type order of keys. Members whose
/// key is not in `order_keys` keep their relative order after the rest.
pub fn sort_by_order_keys(members: &mut [CardRef], order_keys: &[String]) {
    let rank = |card: &CardRef| {
        order_keys
            .iter()
            .position(|k| k == card.order_key())
            .unwrap_or(order_keys.len())
    };
    members.sort_by_key(rank);
}
