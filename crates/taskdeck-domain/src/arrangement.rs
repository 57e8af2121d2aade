use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{Board, Card, List};

/// An entity that holds a zero-based rank inside exactly one container.
/// Lists are positioned within their board, cards within their list.
pub trait Positioned {
    fn id(&self) -> Uuid;
    fn position(&self) -> i32;
    fn set_position(&mut self, position: i32);
    fn container_id(&self) -> Uuid;
    fn set_container_id(&mut self, container_id: Uuid);
}

impl Positioned for List {
    fn id(&self) -> Uuid {
        self.id
    }

    fn position(&self) -> i32 {
        self.position
    }

    fn set_position(&mut self, position: i32) {
        self.update_position(position);
    }

    fn container_id(&self) -> Uuid {
        self.board_id
    }

    fn set_container_id(&mut self, container_id: Uuid) {
        self.board_id = container_id;
        self.updated_at = chrono::Utc::now();
    }
}

impl Positioned for Card {
    fn id(&self) -> Uuid {
        self.id
    }

    fn position(&self) -> i32 {
        self.position
    }

    fn set_position(&mut self, position: i32) {
        self.update_position(position);
    }

    fn container_id(&self) -> Uuid {
        self.list_id
    }

    fn set_container_id(&mut self, container_id: Uuid) {
        self.list_id = container_id;
        self.updated_at = chrono::Utc::now();
    }
}

/// One ordered sequence of items. A container that loses its last item
/// stays alive as a valid zero-length sequence.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Container<T> {
    pub id: Uuid,
    pub items: Vec<T>,
}

impl<T: Positioned> Container<T> {
    pub fn new(id: Uuid) -> Self {
        Self {
            id,
            items: Vec::new(),
        }
    }

    /// Build from unordered rows, sorting by stored position.
    pub fn from_rows(id: Uuid, mut rows: Vec<T>) -> Self {
        rows.sort_by_key(|row| row.position());
        Self { id, items: rows }
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn index_of(&self, item_id: Uuid) -> Option<usize> {
        self.items.iter().position(|item| item.id() == item_id)
    }
}

/// The full set of containers a reorder operation may touch: all lists of a
/// board (items are cards), or the board itself as a single container
/// (items are lists).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Arrangement<T> {
    pub containers: Vec<Container<T>>,
}

impl<T: Positioned> Arrangement<T> {
    pub fn new(containers: Vec<Container<T>>) -> Self {
        Self { containers }
    }

    /// Group unordered rows under the given containers. Container order is
    /// preserved; containers with no rows come out empty.
    pub fn from_rows(container_ids: &[Uuid], rows: Vec<T>) -> Self {
        let mut containers: Vec<Container<T>> = container_ids
            .iter()
            .map(|&id| Container::new(id))
            .collect();
        for row in rows {
            if let Some(container) = containers
                .iter_mut()
                .find(|container| container.id == row.container_id())
            {
                container.items.push(row);
            }
        }
        for container in &mut containers {
            container.items.sort_by_key(|item| item.position());
        }
        Self { containers }
    }

    pub fn container(&self, id: Uuid) -> Option<&Container<T>> {
        self.containers.iter().find(|container| container.id == id)
    }

    pub fn container_mut(&mut self, id: Uuid) -> Option<&mut Container<T>> {
        self.containers
            .iter_mut()
            .find(|container| container.id == id)
    }

    /// Swap in a refetched container, or append it if it was unknown.
    pub fn replace_container(&mut self, container: Container<T>) {
        match self
            .containers
            .iter_mut()
            .find(|existing| existing.id == container.id)
        {
            Some(existing) => *existing = container,
            None => self.containers.push(container),
        }
    }

    pub fn total_items(&self) -> usize {
        self.containers.iter().map(Container::len).sum()
    }
}

impl Arrangement<List> {
    /// Board-level arrangement: the board is the single container and its
    /// lists are the items.
    pub fn for_board(board: &Board, lists: Vec<List>) -> Self {
        Self::new(vec![Container::from_rows(board.id, lists)])
    }
}
