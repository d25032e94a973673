// ABOUTME: Undo/redo stacks of executed commands.
// ABOUTME: The undo stack is capped; the oldest entries fall off first.

use std::collections::VecDeque;

use crate::command::Command;

#[derive(Debug)]
pub struct History {
    undo: VecDeque<Box<dyn Command>>,
    redo: Vec<Box<dyn Command>>,
    max_levels: usize,
}

impl History {
    pub fn new(max_levels: usize) -> Self {
        Self {
            undo: VecDeque::new(),
            redo: Vec::new(),
            max_levels,
        }
    }

    /// Record a freshly executed command; this invalidates everything redoable
    pub fn record(&mut self, command: Box<dyn Command>) {
        self.redo.clear();
        self.push_undo(command);
    }

    fn push_undo(&mut self, command: Box<dyn Command>) {
        if self.max_levels == 0 {
            return;
        }
        while self.undo.len() >= self.max_levels {
            self.undo.pop_front();
        }
        self.undo.push_back(command);
    }

    pub fn pop_undo(&mut self) -> Option<Box<dyn Command>> {
        self.undo.pop_back()
    }

    pub fn pop_redo(&mut self) -> Option<Box<dyn Command>> {
        self.redo.pop()
    }

    /// An undone command becomes redoable
    pub fn push_redo(&mut self, command: Box<dyn Command>) {
        self.redo.push(command);
    }

    /// A redone command goes back on the undo stack without touching the redo stack
    pub fn push_redone(&mut self, command: Box<dyn Command>) {
        self.push_undo(command);
    }

    pub fn can_undo(&self) -> bool {
        !self.undo.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.redo.is_empty()
    }

    pub fn undo_len(&self) -> usize {
        self.undo.len()
    }

    pub fn redo_len(&self) -> usize {
        self.redo.len()
    }

    pub fn undo_description(&self) -> Option<String> {
        self.undo.back().map(|c| c.description())
    }

    pub fn redo_description(&self) -> Option<String> {
        self.redo.last().map(|c| c.description())
    }

    pub fn clear(&mut self) {
        self.undo.clear();
        self.redo.clear();
    }

    pub fn max_levels(&self) -> usize {
        self.max_levels
    }
}
