use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use taskdeck_core::{TaskdeckError, TaskdeckResult};
use uuid::Uuid;

use crate::arrangement::{Arrangement, Positioned};

/// A completed drag gesture, reduced to plain data. The caller's view of the
/// source index must agree with the current arrangement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MoveInstruction {
    pub item_id: Uuid,
    pub source_container_id: Uuid,
    pub source_index: i32,
    pub dest_container_id: Uuid,
    pub dest_index: i32,
}

/// One row update to persist: new position, and the new container fk when
/// the item crossed containers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PositionDelta {
    pub item_id: Uuid,
    pub new_position: i32,
    pub new_container_id: Option<Uuid>,
}

impl MoveInstruction {
    /// Container ids the move touches, source first. Drives the write-set
    /// and the rollback refetch.
    pub fn touched_containers(&self) -> Vec<Uuid> {
        if self.source_container_id == self.dest_container_id {
            vec![self.source_container_id]
        } else {
            vec![self.source_container_id, self.dest_container_id]
        }
    }
}

#[derive(Debug, Clone)]
pub struct ReorderOutcome<T> {
    pub arrangement: Arrangement<T>,
    pub deltas: Vec<PositionDelta>,
}

/// Compute the arrangement after one move, plus the minimal delta list to
/// persist it. Pure and all-or-nothing: on error the input is untouched and
/// no partial result escapes.
///
/// Destination indexes past the end of the sequence are clamped rather than
/// rejected, so a caller racing with itself cannot crash the engine.
pub fn compute_reorder<T>(
    current: &Arrangement<T>,
    instruction: &MoveInstruction,
) -> TaskdeckResult<ReorderOutcome<T>>
where
    T: Positioned + Clone,
{
    if instruction.source_index < 0 || instruction.dest_index < 0 {
        return Err(TaskdeckError::Validation(format!(
            "negative index in move instruction: source {}, dest {}",
            instruction.source_index, instruction.dest_index
        )));
    }

    // Dropped back where it started: idempotent no-op.
    if instruction.source_container_id == instruction.dest_container_id
        && instruction.source_index == instruction.dest_index
    {
        return Ok(ReorderOutcome {
            arrangement: current.clone(),
            deltas: Vec::new(),
        });
    }

    let source = current
        .container(instruction.source_container_id)
        .ok_or_else(|| {
            TaskdeckError::NotFound(format!(
                "source container {} not in arrangement",
                instruction.source_container_id
            ))
        })?;
    let actual_index = source.index_of(instruction.item_id).ok_or_else(|| {
        TaskdeckError::NotFound(format!(
            "item {} not in container {}",
            instruction.item_id, instruction.source_container_id
        ))
    })?;
    if actual_index != instruction.source_index as usize {
        return Err(TaskdeckError::NotFound(format!(
            "item {} is at index {}, caller expected {}; state is stale",
            instruction.item_id, actual_index, instruction.source_index
        )));
    }

    let cross_container = instruction.source_container_id != instruction.dest_container_id;
    if cross_container && current.container(instruction.dest_container_id).is_none() {
        return Err(TaskdeckError::NotFound(format!(
            "destination container {} not in arrangement",
            instruction.dest_container_id
        )));
    }

    // Old (position, container) per item, for the delta diff below.
    let mut previous: HashMap<Uuid, (i32, Uuid)> = HashMap::new();
    for container in &current.containers {
        for item in &container.items {
            previous.insert(item.id(), (item.position(), container.id));
        }
    }

    let mut next = current.clone();

    let mut item = match next.container_mut(instruction.source_container_id) {
        Some(container) => container.items.remove(actual_index),
        None => {
            return Err(TaskdeckError::Internal(
                "source container disappeared during reorder".to_string(),
            ))
        }
    };
    if cross_container {
        item.set_container_id(instruction.dest_container_id);
    }
    match next.container_mut(instruction.dest_container_id) {
        Some(container) => {
            let insert_at = (instruction.dest_index as usize).min(container.items.len());
            container.items.insert(insert_at, item);
        }
        None => {
            return Err(TaskdeckError::Internal(
                "destination container disappeared during reorder".to_string(),
            ))
        }
    }

    // Renumber only the touched containers; everything else keeps its
    // stored positions, which bounds the write-set.
    let touched = instruction.touched_containers();
    for container in next
        .containers
        .iter_mut()
        .filter(|container| touched.contains(&container.id))
    {
        for (index, item) in container.items.iter_mut().enumerate() {
            item.set_position(index as i32);
        }
    }

    let mut deltas = Vec::new();
    for container_id in &touched {
        let container = match next.container(*container_id) {
            Some(container) => container,
            None => continue,
        };
        for item in &container.items {
            let (old_position, old_container) = match previous.get(&item.id()) {
                Some(entry) => *entry,
                None => continue,
            };
            let container_changed = old_container != container.id;
            if container_changed || old_position != item.position() {
                deltas.push(PositionDelta {
                    item_id: item.id(),
                    new_position: item.position(),
                    new_container_id: container_changed.then_some(container.id),
                });
            }
        }
    }

    Ok(ReorderOutcome {
        arrangement: next,
        deltas,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Arrangement, Card, Container, List};

    fn seeded_list(board_id: Uuid, name: &str, position: i32) -> List {
        List::new(board_id, name.to_string(), position, Uuid::new_v4())
    }

    fn seeded_card(list_id: Uuid, title: &str, position: i32) -> Card {
        Card::new(list_id, title.to_string(), position, Uuid::new_v4())
    }

    /// Board with "Todo" = [a, b, c] and "Doing" = [].
    fn todo_doing() -> (Arrangement<Card>, Uuid, Uuid) {
        let todo = Uuid::new_v4();
        let doing = Uuid::new_v4();
        let arrangement = Arrangement::new(vec![
            Container::from_rows(
                todo,
                vec![
                    seeded_card(todo, "a", 0),
                    seeded_card(todo, "b", 1),
                    seeded_card(todo, "c", 2),
                ],
            ),
            Container::new(doing),
        ]);
        (arrangement, todo, doing)
    }

    fn positions(container: &Container<Card>) -> Vec<(String, i32)> {
        container
            .items
            .iter()
            .map(|card| (card.title.clone(), card.position))
            .collect()
    }

    #[test]
    fn test_move_to_same_place_is_noop() {
        let (arrangement, todo, _) = todo_doing();
        let item_id = arrangement.container(todo).unwrap().items[1].id;

        let outcome = compute_reorder(
            &arrangement,
            &MoveInstruction {
                item_id,
                source_container_id: todo,
                source_index: 1,
                dest_container_id: todo,
                dest_index: 1,
            },
        )
        .unwrap();

        assert!(outcome.deltas.is_empty());
        assert_eq!(outcome.arrangement, arrangement);
    }

    #[test]
    fn test_cross_list_move_to_empty_list() {
        let (arrangement, todo, doing) = todo_doing();
        let moved = arrangement.container(todo).unwrap().items[1].id;

        let outcome = compute_reorder(
            &arrangement,
            &MoveInstruction {
                item_id: moved,
                source_container_id: todo,
                source_index: 1,
                dest_container_id: doing,
                dest_index: 0,
            },
        )
        .unwrap();

        let todo_after = outcome.arrangement.container(todo).unwrap();
        let doing_after = outcome.arrangement.container(doing).unwrap();
        assert_eq!(
            positions(todo_after),
            vec![("a".to_string(), 0), ("c".to_string(), 1)]
        );
        assert_eq!(positions(doing_after), vec![("b".to_string(), 0)]);
        assert_eq!(doing_after.items[0].list_id, doing);
        assert!(todo_after.index_of(moved).is_none());
    }

    #[test]
    fn test_cross_list_move_emits_minimal_deltas() {
        let (arrangement, todo, doing) = todo_doing();
        let moved = arrangement.container(todo).unwrap().items[1].id;
        let shifted = arrangement.container(todo).unwrap().items[2].id;

        let outcome = compute_reorder(
            &arrangement,
            &MoveInstruction {
                item_id: moved,
                source_container_id: todo,
                source_index: 1,
                dest_container_id: doing,
                dest_index: 0,
            },
        )
        .unwrap();

        // Card "a" kept position 0 and must not be rewritten.
        assert_eq!(outcome.deltas.len(), 2);
        assert!(outcome.deltas.contains(&PositionDelta {
            item_id: shifted,
            new_position: 1,
            new_container_id: None,
        }));
        assert!(outcome.deltas.contains(&PositionDelta {
            item_id: moved,
            new_position: 0,
            new_container_id: Some(doing),
        }));
    }

    #[test]
    fn test_reorder_lists_within_board() {
        let board_id = Uuid::new_v4();
        let arrangement = Arrangement::new(vec![Container::from_rows(
            board_id,
            vec![
                seeded_list(board_id, "L1", 0),
                seeded_list(board_id, "L2", 1),
                seeded_list(board_id, "L3", 2),
            ],
        )]);
        let l3 = arrangement.container(board_id).unwrap().items[2].id;

        let outcome = compute_reorder(
            &arrangement,
            &MoveInstruction {
                item_id: l3,
                source_container_id: board_id,
                source_index: 2,
                dest_container_id: board_id,
                dest_index: 0,
            },
        )
        .unwrap();

        let names: Vec<(String, i32)> = outcome
            .arrangement
            .container(board_id)
            .unwrap()
            .items
            .iter()
            .map(|list| (list.name.clone(), list.position))
            .collect();
        assert_eq!(
            names,
            vec![
                ("L3".to_string(), 0),
                ("L1".to_string(), 1),
                ("L2".to_string(), 2),
            ]
        );
        // All three lists shifted, so all three are in the write-set.
        assert_eq!(outcome.deltas.len(), 3);
        assert!(outcome.deltas.iter().all(|d| d.new_container_id.is_none()));
    }

    #[test]
    fn test_unknown_item_is_not_found() {
        let (arrangement, todo, doing) = todo_doing();

        let err = compute_reorder(
            &arrangement,
            &MoveInstruction {
                item_id: Uuid::new_v4(),
                source_container_id: todo,
                source_index: 0,
                dest_container_id: doing,
                dest_index: 0,
            },
        )
        .unwrap_err();

        assert!(matches!(err, taskdeck_core::TaskdeckError::NotFound(_)));
    }

    #[test]
    fn test_stale_source_index_is_not_found() {
        let (arrangement, todo, doing) = todo_doing();
        let item_id = arrangement.container(todo).unwrap().items[0].id;

        let err = compute_reorder(
            &arrangement,
            &MoveInstruction {
                item_id,
                source_container_id: todo,
                source_index: 2,
                dest_container_id: doing,
                dest_index: 0,
            },
        )
        .unwrap_err();

        assert!(matches!(err, taskdeck_core::TaskdeckError::NotFound(_)));
    }

    #[test]
    fn test_negative_index_is_rejected() {
        let (arrangement, todo, doing) = todo_doing();
        let item_id = arrangement.container(todo).unwrap().items[0].id;

        let err = compute_reorder(
            &arrangement,
            &MoveInstruction {
                item_id,
                source_container_id: todo,
                source_index: 0,
                dest_container_id: doing,
                dest_index: -1,
            },
        )
        .unwrap_err();

        assert!(matches!(err, taskdeck_core::TaskdeckError::Validation(_)));
    }

    #[test]
    fn test_oversized_dest_index_clamps_to_end() {
        let (arrangement, todo, _) = todo_doing();
        let item_id = arrangement.container(todo).unwrap().items[0].id;

        let outcome = compute_reorder(
            &arrangement,
            &MoveInstruction {
                item_id,
                source_container_id: todo,
                source_index: 0,
                dest_container_id: todo,
                dest_index: 99,
            },
        )
        .unwrap();

        assert_eq!(
            positions(outcome.arrangement.container(todo).unwrap()),
            vec![
                ("b".to_string(), 0),
                ("c".to_string(), 1),
                ("a".to_string(), 2),
            ]
        );
    }

    #[test]
    fn test_emptying_a_container_keeps_it() {
        let list_a = Uuid::new_v4();
        let list_b = Uuid::new_v4();
        let arrangement = Arrangement::new(vec![
            Container::from_rows(list_a, vec![seeded_card(list_a, "only", 0)]),
            Container::new(list_b),
        ]);
        let item_id = arrangement.container(list_a).unwrap().items[0].id;

        let outcome = compute_reorder(
            &arrangement,
            &MoveInstruction {
                item_id,
                source_container_id: list_a,
                source_index: 0,
                dest_container_id: list_b,
                dest_index: 0,
            },
        )
        .unwrap();

        let emptied = outcome.arrangement.container(list_a).unwrap();
        assert!(emptied.is_empty());
        assert_eq!(outcome.arrangement.containers.len(), 2);
    }

    #[test]
    fn test_conservation_and_contiguity() {
        let (arrangement, todo, doing) = todo_doing();
        let before_total = arrangement.total_items();
        let item_id = arrangement.container(todo).unwrap().items[2].id;

        let outcome = compute_reorder(
            &arrangement,
            &MoveInstruction {
                item_id,
                source_container_id: todo,
                source_index: 2,
                dest_container_id: doing,
                dest_index: 5,
            },
        )
        .unwrap();

        assert_eq!(outcome.arrangement.total_items(), before_total);
        for container in &outcome.arrangement.containers {
            for (index, card) in container.items.iter().enumerate() {
                assert_eq!(card.position, index as i32);
            }
        }
    }

    #[test]
    fn test_error_leaves_input_untouched() {
        let (arrangement, todo, _) = todo_doing();
        let snapshot = arrangement.clone();

        let _ = compute_reorder(
            &arrangement,
            &MoveInstruction {
                item_id: Uuid::new_v4(),
                source_container_id: todo,
                source_index: 0,
                dest_container_id: Uuid::new_v4(),
                dest_index: 0,
            },
        );

        assert_eq!(arrangement, snapshot);
    }
}
