//! Translation between editor and protocol coordinate systems.
//!
//! Editor positions are 1-based (line, byte column) pairs; protocol
//! positions are 0-based lines with UTF-16 code unit columns. A column
//! is only meaningful against a specific buffer's current content, so
//! every conversion here is resolved against a [`Buffer`] (or its
//! rope).
//!
//! Conversions walk the line's decoded code points rather than raw
//! bytes: a code point outside the Basic Multilingual Plane advances
//! the protocol column by two UTF-16 units while occupying its UTF-8
//! width in editor bytes. Positions that fall outside the current
//! content, or inside a code point, fail with
//! [`Error::PositionResolution`].

use lsp_types::Position;
use ropey::Rope;

use crate::buffer::Buffer;
use crate::{Error, Result};

/// A 1-based editor position. The column counts bytes from line start,
/// starting at 1.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Point {
	/// 1-based line.
	pub line: usize,
	/// 1-based byte column.
	pub col: usize,
}

/// Converts an editor point to a protocol position against `buf`'s
/// current content.
///
/// Round-trip law: for any point on a code-point boundary,
/// `point_from_position(buf, position_from_point(buf, p)?) == p`.
pub fn position_from_point(buf: &Buffer, point: Point) -> Result<Position> {
	position_in_rope(buf.contents(), point)
}

/// Converts a protocol position to a 1-based editor point against
/// `buf`'s current content.
pub fn point_from_position(buf: &Buffer, pos: Position) -> Result<Point> {
	point_in_rope(buf.contents(), pos)
}

pub(crate) fn position_in_rope(text: &Rope, point: Point) -> Result<Position> {
	let fail = || Error::PositionResolution {
		line: point.line,
		col: point.col,
	};
	if point.line == 0 || point.col == 0 {
		return Err(fail());
	}
	let line_idx = point.line - 1;
	if line_idx >= text.len_lines() {
		return Err(fail());
	}

	let target = point.col - 1;
	let mut bytes = 0usize;
	let mut units = 0u32;
	for ch in text.line(line_idx).chars() {
		if bytes == target {
			break;
		}
		bytes += ch.len_utf8();
		units += ch.len_utf16() as u32;
		if bytes > target {
			// column lands inside a multi-byte code point
			return Err(fail());
		}
	}
	if bytes < target {
		return Err(fail());
	}

	Ok(Position {
		line: line_idx as u32,
		character: units,
	})
}

pub(crate) fn point_in_rope(text: &Rope, pos: Position) -> Result<Point> {
	let fail = || Error::PositionResolution {
		line: pos.line as usize,
		col: pos.character as usize,
	};
	let line_idx = pos.line as usize;
	if line_idx >= text.len_lines() {
		return Err(fail());
	}

	let mut units = 0u32;
	let mut bytes = 0usize;
	for ch in text.line(line_idx).chars() {
		if units == pos.character {
			break;
		}
		units += ch.len_utf16() as u32;
		bytes += ch.len_utf8();
		if units > pos.character {
			// column lands between the surrogate halves of a code point
			return Err(fail());
		}
	}
	if units < pos.character {
		return Err(fail());
	}

	Ok(Point {
		line: line_idx + 1,
		col: bytes + 1,
	})
}

/// Resolves a protocol position to a char offset into `text`.
///
/// This is the offset form used by [`crate::apply::apply_edits`] when
/// splicing edits into full document content.
pub fn lsp_position_to_char(text: &Rope, pos: Position) -> Result<usize> {
	let fail = || Error::PositionResolution {
		line: pos.line as usize,
		col: pos.character as usize,
	};
	let line_idx = pos.line as usize;
	if line_idx >= text.len_lines() {
		return Err(fail());
	}

	let mut units = 0u32;
	let mut chars = 0usize;
	for ch in text.line(line_idx).chars() {
		if units == pos.character {
			break;
		}
		units += ch.len_utf16() as u32;
		chars += 1;
		if units > pos.character {
			return Err(fail());
		}
	}
	if units < pos.character {
		return Err(fail());
	}

	Ok(text.line_to_char(line_idx) + chars)
}
