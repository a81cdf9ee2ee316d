//! Variation matrix generation

use smallvec::SmallVec;

use crate::attributes::{Attribute, AttributePair};

/// Compute the Cartesian product of a sequence of option lists.
///
/// Returns every ordered tuple choosing exactly one element from each list,
/// with the first list varying slowest (nested-iteration order, outer list
/// first). The result has `n1 * n2 * ... * nk` tuples; an empty input or any
/// empty list yields no tuples at all.
pub fn cartesian_product<T: Clone>(lists: &[Vec<T>]) -> Vec<Vec<T>> {
    if lists.is_empty() || lists.iter().any(Vec::is_empty) {
        return Vec::new();
    }

    lists.iter().fold(vec![Vec::new()], |tuples, options| {
        tuples
            .iter()
            .flat_map(|tuple| {
                options.iter().map(move |option| {
                    let mut next = tuple.clone();
                    next.push(option.clone());
                    next
                })
            })
            .collect()
    })
}

/// Expand variation attributes into every attribute-pair combination, in
/// declared attribute order within each combination.
pub fn attribute_combinations(attributes: &[&Attribute]) -> Vec<SmallVec<[AttributePair; 4]>> {
    let lists: Vec<Vec<String>> = attributes
        .iter()
        .map(|attribute| attribute.options.clone())
        .collect();

    cartesian_product(&lists)
        .into_iter()
        .map(|tuple| {
            attributes
                .iter()
                .zip(tuple)
                .map(|(attribute, option)| AttributePair {
                    name: attribute.name.clone(),
                    option,
                })
                .collect()
        })
        .collect()
}
