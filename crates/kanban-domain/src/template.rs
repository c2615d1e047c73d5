//! Starter layout for an empty board.

/// A column to create on a fresh board, with its sample tasks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnTemplate {
    pub name: &'static str,
    pub title: &'static str,
    pub tasks: &'static [&'static str],
}

const STARTER_BOARD: &[ColumnTemplate] = &[
    ColumnTemplate {
        name: "todo",
        title: "Taches à faire",
        tasks: &["Exemple 1", "Example 2"],
    },
    ColumnTemplate {
        name: "doing",
        title: "Taches en cours",
        tasks: &["Example 3"],
    },
    ColumnTemplate {
        name: "blocked",
        title: "Taches bloquées",
        tasks: &[],
    },
    ColumnTemplate {
        name: "done",
        title: "Taches terminées",
        tasks: &[],
    },
];

pub fn starter_board() -> &'static [ColumnTemplate] {
    STARTER_BOARD
}
