//! Filter and ordering evaluation for in-memory queries.
//!
//! Filters are string equality only. A multi-valued property matches when any of its
//! values matches. Ordering follows the usual property-store rules: an entity without
//! the sort property is left out of a sorted query, ascending order compares the
//! smallest value of a repeated property and descending order the largest.

use proplayer_core::{
    property::{Entity, PropertyValue},
    query::{EqFilter, Sort, SortDirection},
};

pub(crate) struct EntityEvaluator<'a> {
    entity: &'a Entity,
}

impl<'a> EntityEvaluator<'a> {
    pub fn new(entity: &'a Entity) -> Self {
        Self { entity }
    }

    /// True when every filter matches (logical AND). No filters match everything.
    pub fn matches_all(&self, filters: &[EqFilter]) -> bool {
        filters.iter().all(|filter| self.matches(filter))
    }

    fn matches(&self, filter: &EqFilter) -> bool {
        Self::values(self.entity, &filter.field)
            .any(|value| value.as_str() == Some(filter.value.as_str()))
    }

    /// The value this entity sorts by, or `None` if it lacks the property.
    pub fn sort_value(&self, sort: &Sort) -> Option<&'a PropertyValue> {
        let values = Self::values(self.entity, &sort.field);

        match sort.direction {
            SortDirection::Asc => values.min_by(|a, b| a.sort_cmp(b)),
            SortDirection::Desc => values.max_by(|a, b| a.sort_cmp(b)),
        }
    }

    fn values<'n>(entity: &'a Entity, name: &'n str) -> impl Iterator<Item = &'a PropertyValue> {
        entity
            .properties
            .iter()
            .filter(move |p| p.name == name)
            .map(|p| &p.value)
    }

    /// Filters and orders entities for a query.
    ///
    /// Without a sort the input order is kept. With a sort, ties break on ascending id.
    pub fn select(entities: impl IntoIterator<Item = &'a Entity>, filters: &[EqFilter], sort: Option<&Sort>) -> Vec<Entity> {
        let matching = entities
            .into_iter()
            .filter(|entity| EntityEvaluator::new(entity).matches_all(filters));

        let Some(sort) = sort else {
            return matching.cloned().collect();
        };

        let mut keyed = matching
            .filter_map(|entity| {
                EntityEvaluator::new(entity)
                    .sort_value(sort)
                    .map(|value| (value, entity))
            })
            .collect::<Vec<_>>();

        keyed.sort_by(|(left, a), (right, b)| {
            let by_value = match sort.direction {
                SortDirection::Asc => left.sort_cmp(right),
                SortDirection::Desc => right.sort_cmp(left),
            };
            by_value.then_with(|| a.id.cmp(&b.id))
        });

        keyed
            .into_iter()
            .map(|(_, entity)| entity.clone())
            .collect()
    }
}
