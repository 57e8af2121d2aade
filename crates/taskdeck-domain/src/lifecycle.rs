//! Archive cascades. Entities are soft-deleted only; archiving a parent
//! flags its children so they drop out of every ordered view together.

use crate::{Board, Card, List};

/// Archive a board and every list that belongs to it. Lists belonging to
/// other boards are left alone.
pub fn archive_board(board: &mut Board, lists: &mut [List]) {
    board.archive();
    for list in lists.iter_mut().filter(|list| list.board_id == board.id) {
        list.archive();
    }
}

/// Archive a list and every card in it.
pub fn archive_list(list: &mut List, cards: &mut [Card]) {
    list.archive();
    for card in cards.iter_mut().filter(|card| card.list_id == list.id) {
        card.archive();
    }
}
