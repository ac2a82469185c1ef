//! The go-to-definition jump stack.
//!
//! A cursor into a stack of locations: jumping to a definition pushes
//! the *departure* point, jumping back rewinds the cursor without
//! discarding what lies above it, and a fresh jump from a rewound
//! position truncates the abandoned tail.

use lsp_types::Location;

/// Jump history with a movable cursor.
#[derive(Debug, Default)]
pub struct JumpStack {
	stack: Vec<Location>,
	pos: usize,
}

impl JumpStack {
	/// Creates an empty stack.
	pub fn new() -> Self {
		Self::default()
	}

	/// Records `from` as the departure point of a new jump, discarding
	/// any locations above the cursor.
	pub fn push(&mut self, from: Location) {
		self.stack.truncate(self.pos);
		self.stack.push(from);
		self.pos = self.stack.len();
	}

	/// Rewinds the cursor by `count` entries and returns the location to
	/// return to, or `None` when already at the bottom.
	pub fn rewind(&mut self, count: usize) -> Option<&Location> {
		if self.pos == 0 {
			return None;
		}
		self.pos = self.pos.saturating_sub(count.max(1));
		Some(&self.stack[self.pos])
	}

	/// Number of entries below the cursor.
	pub fn depth(&self) -> usize {
		self.pos
	}
}

#[cfg(test)]
mod tests {
	use lsp_types::{Position, Range};

	use super::*;

	fn location(path: &str, line: u32) -> Location {
		Location {
			uri: format!("file://{path}").parse().unwrap(),
			range: Range {
				start: Position { line, character: 0 },
				end: Position { line, character: 0 },
			},
		}
	}

	#[test]
	fn test_rewind_returns_departure_points_in_reverse() {
		let mut jumps = JumpStack::new();
		jumps.push(location("/a.go", 1));
		jumps.push(location("/b.go", 2));

		assert_eq!(jumps.rewind(1).unwrap().range.start.line, 2);
		assert_eq!(jumps.rewind(1).unwrap().range.start.line, 1);
		assert!(jumps.rewind(1).is_none());
	}

	#[test]
	fn test_rewind_count_clamps_to_bottom() {
		let mut jumps = JumpStack::new();
		jumps.push(location("/a.go", 1));
		jumps.push(location("/b.go", 2));

		assert_eq!(jumps.rewind(10).unwrap().range.start.line, 1);
		assert_eq!(jumps.depth(), 0);
	}

	#[test]
	fn test_push_after_rewind_truncates_tail() {
		let mut jumps = JumpStack::new();
		jumps.push(location("/a.go", 1));
		jumps.push(location("/b.go", 2));
		jumps.rewind(1);

		jumps.push(location("/c.go", 3));
		assert_eq!(jumps.depth(), 2);
		assert_eq!(jumps.rewind(1).unwrap().range.start.line, 3);
		assert_eq!(jumps.rewind(1).unwrap().range.start.line, 1);
	}

	#[test]
	fn test_empty_stack_rewind() {
		let mut jumps = JumpStack::new();
		assert!(jumps.rewind(1).is_none());
	}
}
