//! Game state: the shuffled board, the hidden partition and the guess/reveal
//! state machine.
//!
//! Entries move from unlocked to locked exactly once. The session is won when
//! every entry is locked. Group membership of an entry is only exposed once
//! it is locked or the board has been revealed.

use crate::assembler::Puzzle;
use crate::describe::{describe, Connection};
use crate::error::{GuessError, SelectError};
use crate::item::ItemRecord;
use crate::strategy::{Group, GroupRule};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap, HashSet};
use tracing::debug;

/// Global session state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GameStatus {
    InProgress,
    Won,
}

/// Result of a selection toggle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Toggle {
    Selected,
    Deselected,
    /// The entry is locked; nothing changed
    Ignored,
}

/// Result of a well-formed guess
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "result", rename_all = "snake_case")]
pub enum GuessOutcome {
    Correct {
        group: usize,
        connection: Connection,
        won: bool,
    },
    Incorrect {
        /// All but one of the items share a group
        one_away: bool,
        /// This exact set was already tried
        repeated: bool,
    },
}

impl GuessOutcome {
    pub fn is_correct(&self) -> bool {
        matches!(self, GuessOutcome::Correct { .. })
    }
}

/// One board position
#[derive(Debug, Clone)]
struct BoardEntry {
    record: ItemRecord,
    locked: bool,
    /// Owning group; never exposed before a correct guess or reveal
    group: usize,
}

/// Read-only view of one board position
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntryView {
    pub position: usize,
    pub id: String,
    pub name: String,
    pub locked: bool,
    pub selected: bool,
    /// Present only once locked or revealed
    pub group: Option<usize>,
}

/// A claimed or revealed group
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupView {
    pub index: usize,
    pub members: Vec<String>,
    pub positions: Vec<usize>,
    pub connection: Connection,
    /// Rule used at assembly time; only present after reveal
    pub formed_by: Option<GroupRule>,
    pub solved: bool,
}

/// Read-only view of the whole board for presentation layers
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoardView {
    pub entries: Vec<EntryView>,
    pub status: GameStatus,
    pub revealed: bool,
    pub mistakes: usize,
    /// Claimed groups in solve order
    pub solved: Vec<GroupView>,
}

#[derive(Debug)]
pub struct GameState {
    entries: Vec<BoardEntry>,
    groups: Vec<Group>,
    positions: HashMap<String, usize>,
    selection: BTreeSet<usize>,
    solved: Vec<usize>,
    tried: HashSet<BTreeSet<String>>,
    mistakes: usize,
    revealed: bool,
    group_size: usize,
}

impl GameState {
    /// Lay out a puzzle. Items missing from `records` are shown without attributes.
    pub fn new(puzzle: Puzzle, records: &HashMap<String, ItemRecord>) -> Self {
        let solution: HashMap<String, usize> = puzzle
            .solution()
            .into_iter()
            .map(|(id, group)| (id.to_string(), group))
            .collect();

        let entries: Vec<BoardEntry> = puzzle
            .layout
            .iter()
            .filter_map(|id| {
                let group = *solution.get(id)?;
                let record = records
                    .get(id)
                    .cloned()
                    .unwrap_or_else(|| ItemRecord::bare(id.clone()));
                Some(BoardEntry {
                    record,
                    locked: false,
                    group,
                })
            })
            .collect();

        let positions = entries
            .iter()
            .enumerate()
            .map(|(pos, e)| (e.record.id.clone(), pos))
            .collect();
        let group_size = puzzle.groups.first().map_or(4, Group::len);

        Self {
            entries,
            groups: puzzle.groups,
            positions,
            selection: BTreeSet::new(),
            solved: Vec::new(),
            tried: HashSet::new(),
            mistakes: 0,
            revealed: false,
            group_size,
        }
    }

    // ==================== Queries ====================

    pub fn status(&self) -> GameStatus {
        if !self.entries.is_empty() && self.entries.iter().all(|e| e.locked) {
            GameStatus::Won
        } else {
            GameStatus::InProgress
        }
    }

    pub fn is_won(&self) -> bool {
        self.status() == GameStatus::Won
    }

    pub fn is_revealed(&self) -> bool {
        self.revealed
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn group_size(&self) -> usize {
        self.group_size
    }

    pub fn mistakes(&self) -> usize {
        self.mistakes
    }

    /// Group indices in the order they were claimed
    pub fn solved_groups(&self) -> &[usize] {
        &self.solved
    }

    /// Currently selected positions, ascending
    pub fn selection(&self) -> Vec<usize> {
        self.selection.iter().copied().collect()
    }

    pub fn is_locked(&self, position: usize) -> bool {
        self.entries.get(position).is_some_and(|e| e.locked)
    }

    pub fn record(&self, position: usize) -> Option<&ItemRecord> {
        self.entries.get(position).map(|e| &e.record)
    }

    /// Owning group of a position, if the player is allowed to know it
    pub fn visible_group(&self, position: usize) -> Option<usize> {
        let entry = self.entries.get(position)?;
        (entry.locked || self.revealed).then_some(entry.group)
    }

    pub fn view(&self) -> BoardView {
        let entries = self
            .entries
            .iter()
            .enumerate()
            .map(|(position, entry)| EntryView {
                position,
                id: entry.record.id.clone(),
                name: entry.record.display_name(),
                locked: entry.locked,
                selected: self.selection.contains(&position),
                group: self.visible_group(position),
            })
            .collect();

        BoardView {
            entries,
            status: self.status(),
            revealed: self.revealed,
            mistakes: self.mistakes,
            solved: self.solved.iter().map(|&g| self.group_view(g)).collect(),
        }
    }

    // ==================== Selection ====================

    /// Toggle a position in or out of the selection
    pub fn toggle_select(&mut self, position: usize) -> Result<Toggle, SelectError> {
        if self.revealed {
            return Err(SelectError::BoardRevealed);
        }
        if self.is_won() {
            return Err(SelectError::GameWon);
        }
        let entry = self
            .entries
            .get(position)
            .ok_or(SelectError::OutOfRange(position))?;
        if entry.locked {
            return Ok(Toggle::Ignored);
        }
        if self.selection.remove(&position) {
            return Ok(Toggle::Deselected);
        }
        if self.selection.len() >= self.group_size {
            return Err(SelectError::SelectionFull);
        }
        self.selection.insert(position);
        Ok(Toggle::Selected)
    }

    pub fn clear_selection(&mut self) {
        self.selection.clear();
    }

    // ==================== Guessing ====================

    /// Submit the current selection as a guess
    pub fn submit_selection(&mut self) -> Result<GuessOutcome, GuessError> {
        let ids: Vec<String> = self
            .selection
            .iter()
            .map(|&pos| self.entries[pos].record.id.clone())
            .collect();
        self.submit_guess(&ids)
    }

    /// Validate a set of identifiers against the hidden partition.
    ///
    /// Needs exactly `group_size` distinct, unlocked identifiers. A correct
    /// guess locks its entries; an incorrect one changes nothing but the
    /// mistake count, so the same items can be tried again in another set.
    pub fn submit_guess<S: AsRef<str>>(&mut self, ids: &[S]) -> Result<GuessOutcome, GuessError> {
        self.ensure_playable()?;

        let distinct: BTreeSet<&str> = ids.iter().map(AsRef::as_ref).collect();
        if ids.len() != self.group_size {
            return Err(GuessError::InvalidSelectionSize { got: ids.len() });
        }
        if distinct.len() != self.group_size {
            return Err(GuessError::InvalidSelectionSize { got: distinct.len() });
        }

        let mut positions = Vec::with_capacity(self.group_size);
        for id in &distinct {
            let pos = *self
                .positions
                .get(*id)
                .ok_or_else(|| GuessError::UnknownItem(id.to_string()))?;
            if self.entries[pos].locked {
                return Err(GuessError::AlreadyLocked(id.to_string()));
            }
            positions.push(pos);
        }

        let mut per_group: HashMap<usize, usize> = HashMap::new();
        for &pos in &positions {
            *per_group.entry(self.entries[pos].group).or_default() += 1;
        }

        if per_group.len() == 1 {
            let group = self.entries[positions[0]].group;
            for &pos in &positions {
                self.entries[pos].locked = true;
            }
            self.solved.push(group);
            self.selection.clear();
            let won = self.is_won();
            debug!(group, won, "group claimed by player");
            return Ok(GuessOutcome::Correct {
                group,
                connection: self.connection_of(group),
                won,
            });
        }

        let key: BTreeSet<String> = distinct.iter().map(|id| id.to_string()).collect();
        let repeated = !self.tried.insert(key);
        if !repeated {
            self.mistakes += 1;
        }
        let one_away = per_group.values().any(|&n| n + 1 == self.group_size);
        Ok(GuessOutcome::Incorrect { one_away, repeated })
    }

    // ==================== Reveal ====================

    /// Expose every group with its inferred connection and true origin rule.
    ///
    /// Lock flags are untouched; the board stops accepting input.
    pub fn reveal(&mut self) -> Vec<GroupView> {
        self.revealed = true;
        self.selection.clear();
        (0..self.groups.len()).map(|g| self.group_view(g)).collect()
    }

    /// Best-effort description of a group's shared trait
    pub fn connection_of(&self, group: usize) -> Connection {
        let members: Vec<&ItemRecord> = self
            .entries
            .iter()
            .filter(|e| e.group == group)
            .map(|e| &e.record)
            .collect();
        describe(&members)
    }

    fn group_view(&self, group: usize) -> GroupView {
        let positions: Vec<usize> = self
            .entries
            .iter()
            .enumerate()
            .filter(|(_, e)| e.group == group)
            .map(|(pos, _)| pos)
            .collect();
        GroupView {
            index: group,
            members: positions
                .iter()
                .map(|&p| self.entries[p].record.id.clone())
                .collect(),
            solved: positions.iter().all(|&p| self.entries[p].locked),
            positions,
            connection: self.connection_of(group),
            formed_by: self
                .revealed
                .then(|| self.groups.get(group).map(|g| g.rule.clone()))
                .flatten(),
        }
    }

    fn ensure_playable(&self) -> Result<(), GuessError> {
        if self.revealed {
            return Err(GuessError::BoardRevealed);
        }
        Ok(())
    }
}
