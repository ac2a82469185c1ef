//! Two-phase completion session state.
//!
//! Editors drive completion in two callbacks: the first asks where the
//! completed text starts, the second asks for the candidates. The
//! service is queried once, during the first phase; the candidates are
//! parked here and handed over when the second phase fires. The parked
//! state is consumed on read, so a phase-two callback arriving without
//! a fresh phase one sees an empty candidate list rather than stale
//! results.

use lsp_types::{CompletionItem, CompletionResponse, CompletionTextEdit};
use serde::Serialize;

/// One candidate in the editor's completion-menu shape.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CompletionMatch {
	/// Text inserted when the candidate is accepted.
	pub word: String,
	/// Label shown in the menu.
	pub abbr: String,
	/// Extra detail shown alongside the menu.
	pub info: String,
}

impl CompletionMatch {
	fn from_item(item: CompletionItem) -> Self {
		let word = match item.text_edit {
			Some(CompletionTextEdit::Edit(edit)) => edit.new_text,
			Some(CompletionTextEdit::InsertAndReplace(edit)) => edit.new_text,
			None => item.insert_text.unwrap_or_else(|| item.label.clone()),
		};
		Self {
			word,
			abbr: item.label,
			info: item.detail.unwrap_or_default(),
		}
	}
}

#[derive(Default)]
enum State {
	#[default]
	Idle,
	AwaitingMatches {
		start_col: usize,
		items: Vec<CompletionItem>,
	},
}

/// Candidates parked between the two completion phases.
#[derive(Default)]
pub struct CompletionSession {
	state: State,
}

impl CompletionSession {
	/// Creates an idle session.
	pub fn new() -> Self {
		Self::default()
	}

	/// Phase one: parks the service's candidates and returns the 1-based
	/// byte column where the completed text starts.
	pub fn begin(&mut self, start_col: usize, response: Option<CompletionResponse>) -> usize {
		let items = match response {
			Some(CompletionResponse::Array(items)) => items,
			Some(CompletionResponse::List(list)) => list.items,
			None => Vec::new(),
		};
		self.state = State::AwaitingMatches { start_col, items };
		start_col
	}

	/// Phase two: consumes the parked candidates. Empty when no phase
	/// one preceded this call.
	pub fn matches(&mut self) -> Vec<CompletionMatch> {
		match std::mem::take(&mut self.state) {
			State::Idle => Vec::new(),
			State::AwaitingMatches { items, .. } => {
				items.into_iter().map(CompletionMatch::from_item).collect()
			}
		}
	}

	/// The start column parked by phase one, if phase two is pending.
	pub fn start_col(&self) -> Option<usize> {
		match &self.state {
			State::Idle => None,
			State::AwaitingMatches { start_col, .. } => Some(*start_col),
		}
	}
}

#[cfg(test)]
mod tests {
	use lsp_types::CompletionList;

	use super::*;

	fn item(label: &str, insert: Option<&str>) -> CompletionItem {
		CompletionItem {
			label: label.to_string(),
			insert_text: insert.map(str::to_owned),
			detail: Some(format!("func {label}()")),
			..CompletionItem::default()
		}
	}

	#[test]
	fn test_two_phase_handoff() {
		let mut session = CompletionSession::new();
		let response = CompletionResponse::Array(vec![item("Foo", None), item("Bar", Some("Bar("))]);

		assert_eq!(session.begin(5, Some(response)), 5);
		assert_eq!(session.start_col(), Some(5));

		let matches = session.matches();
		assert_eq!(matches.len(), 2);
		assert_eq!(matches[0].word, "Foo");
		assert_eq!(matches[1].word, "Bar(");
		assert_eq!(matches[1].abbr, "Bar");
	}

	#[test]
	fn test_matches_consume_state() {
		let mut session = CompletionSession::new();
		session.begin(1, Some(CompletionResponse::Array(vec![item("X", None)])));
		assert_eq!(session.matches().len(), 1);
		// Second phase-two callback without a fresh phase one.
		assert!(session.matches().is_empty());
		assert_eq!(session.start_col(), None);
	}

	#[test]
	fn test_fresh_phase_one_discards_parked_candidates() {
		let mut session = CompletionSession::new();
		session.begin(2, Some(CompletionResponse::Array(vec![item("Stale", None)])));
		// A new completion attempt starts before phase two ever fires.
		session.begin(7, Some(CompletionResponse::Array(vec![item("Fresh", None)])));

		assert_eq!(session.start_col(), Some(7));
		let matches = session.matches();
		assert_eq!(matches.len(), 1);
		assert_eq!(matches[0].word, "Fresh");
	}

	#[test]
	fn test_list_response_and_empty_response() {
		let mut session = CompletionSession::new();
		let list = CompletionResponse::List(CompletionList {
			is_incomplete: false,
			items: vec![item("Only", None)],
		});
		session.begin(3, Some(list));
		assert_eq!(session.matches().len(), 1);

		session.begin(3, None);
		assert!(session.matches().is_empty());
	}

	#[test]
	fn test_text_edit_wins_over_insert_text() {
		let edit = lsp_types::TextEdit {
			range: lsp_types::Range::default(),
			new_text: "Edited".to_string(),
		};
		let candidate = CompletionItem {
			label: "Label".to_string(),
			insert_text: Some("Inserted".to_string()),
			text_edit: Some(CompletionTextEdit::Edit(edit)),
			..CompletionItem::default()
		};
		let mut session = CompletionSession::new();
		session.begin(1, Some(CompletionResponse::Array(vec![candidate])));
		assert_eq!(session.matches()[0].word, "Edited");
	}
}
