//! Mapping human-typed references onto stored records.

use mission_core::{
    Agent, MissionError, MissionResult, NotFoundError, Record, RecordIdType, ValidationError,
};

/// Find the record whose identifier equals `fragment` or ends with it.
///
/// An exact identifier match always wins. Otherwise exactly one candidate may
/// end with the fragment; several matches are an
/// [`AmbiguousReference`](ValidationError::AmbiguousReference) and none is a
/// [`NotFoundError::Fragment`]. Matching is case-sensitive.
pub fn resolve_suffix<'a, R: Record>(fragment: &str, candidates: &'a [R]) -> MissionResult<&'a R> {
    if fragment.is_empty() {
        return Err(MissionError::required("id"));
    }

    if let Some(exact) = candidates.iter().find(|r| r.id().as_str() == fragment) {
        return Ok(exact);
    }

    let matches: Vec<&R> = candidates
        .iter()
        .filter(|r| r.id().as_str().ends_with(fragment))
        .collect();

    match matches.as_slice() {
        [] => Err(NotFoundError::Fragment {
            collection: R::COLLECTION,
            fragment: fragment.to_string(),
        }
        .into()),
        [only] => Ok(*only),
        several => {
            let ids: Vec<String> = several.iter().map(|r| r.id().to_string()).collect();
            tracing::warn!(
                collection = %R::COLLECTION,
                fragment,
                matches = ids.len(),
                "Identifier fragment matches more than one record"
            );
            Err(ValidationError::AmbiguousReference {
                collection: R::COLLECTION,
                input: fragment.to_string(),
                matches: ids,
            }
            .into())
        }
    }
}

/// Case-insensitive exact match on agent name; the first match in candidate order wins.
pub fn resolve_agent_name<'a>(name: &str, agents: &'a [Agent]) -> MissionResult<&'a Agent> {
    let wanted = name.to_lowercase();
    agents
        .iter()
        .find(|agent| agent.name.to_lowercase() == wanted)
        .ok_or_else(|| {
            NotFoundError::AgentName {
                name: name.to_string(),
            }
            .into()
        })
}


#[cfg(test)]
mod prop_tests {
    use super::*;
    use mission_core::{Task, TaskId, TaskStatus};
    use mission_test_utils::fixtures::make_task;
    use mission_test_utils::generators::arb_record_id;
    use proptest::prelude::*;

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(100))]

        /// Any suffix of an identifier that is unique among the candidates
        /// resolves to that record; the full identifier always does.
        #[test]
        fn prop_unique_suffix_resolves(
            ids in prop::collection::hash_set(arb_record_id(), 1..8),
            pick in 0usize..8,
            len in 1usize..=32,
        ) {
            let tasks: Vec<Task> = ids
                .into_iter()
                .map(|id| Task {
                    id: TaskId::new(id),
                    ..make_task("t", TaskStatus::Inbox)
                })
                .collect();
            let target = &tasks[pick % tasks.len()];
            let id = target.id.as_str();

            prop_assert_eq!(resolve_suffix(id, &tasks).unwrap(), target);

            let fragment = &id[id.len() - len..];
            let sharing = tasks.iter().filter(|t| t.id.as_str().ends_with(fragment)).count();
            match resolve_suffix(fragment, &tasks) {
                Ok(found) => {
                    prop_assert_eq!(sharing, 1);
                    prop_assert_eq!(found, target);
                }
                Err(MissionError::Validation(ValidationError::AmbiguousReference { matches, .. })) => {
                    prop_assert_eq!(matches.len(), sharing);
                }
                Err(other) => prop_assert!(false, "unexpected error {:?}", other),
            }
        }
    }
}
