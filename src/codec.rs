//! Compact binary and text identity of a board state.
//!
//! The blob starts with two bytes holding the number of rows and columns. The
//! cells follow row-major from the bottom-left corner, two bits per cell and
//! four cells per byte, the first cell in the most significant bits. The last
//! byte is padded with zero bits. The text form is the standard Base64 encoding
//! of the blob and doubles as the state's key in model files.

use base64::{engine::general_purpose::STANDARD, Engine as _};

use crate::{
    action::GameSide,
    state::{BoardState, GameState},
    NWinsError, Result,
};

const HEADER_LEN: usize = 2;
const CELLS_PER_BYTE: usize = 4;
const BITS_PER_CELL: usize = 2;

fn body_len(cells: usize) -> usize {
    (cells + CELLS_PER_BYTE - 1) / CELLS_PER_BYTE
}

/// Encodes a state as a binary blob
///
/// Fails with [`NWinsError::InvalidArgument`] when a dimension does not fit
/// into one byte.
pub fn encode<S: BoardState>(state: &S) -> Result<Vec<u8>> {
    let rows = u8::try_from(state.rows()).map_err(|_| {
        NWinsError::InvalidArgument(format!("{} rows do not fit into a state blob", state.rows()))
    })?;
    let columns = u8::try_from(state.columns()).map_err(|_| {
        NWinsError::InvalidArgument(format!(
            "{} columns do not fit into a state blob",
            state.columns()
        ))
    })?;

    let cells = state.cells();
    let mut blob = Vec::with_capacity(HEADER_LEN + body_len(cells.len()));
    blob.push(rows);
    blob.push(columns);
    for chunk in cells.chunks(CELLS_PER_BYTE) {
        let mut byte = 0u8;
        for i in 0..CELLS_PER_BYTE {
            let code = chunk.get(i).map_or(0, |side| side.as_u8());
            byte = (byte << BITS_PER_CELL) | code;
        }
        blob.push(byte);
    }
    Ok(blob)
}

/// Decodes a binary blob into a state
///
/// The result is equal to the encoded state, with column sums recomputed
/// from the cells. Truncated blobs, unknown cell codes, non-zero padding and
/// boards no legal game can produce fail with [`NWinsError::Decode`].
pub fn decode(blob: &[u8]) -> Result<GameState> {
    if blob.len() < HEADER_LEN {
        return Err(NWinsError::Decode(format!(
            "a state blob needs at least {} bytes, got {}",
            HEADER_LEN,
            blob.len()
        )));
    }
    let rows = blob[0] as usize;
    let columns = blob[1] as usize;
    if rows == 0 || columns == 0 {
        return Err(NWinsError::Decode(format!(
            "invalid board dimensions {}x{}",
            rows, columns
        )));
    }

    let cell_count = rows * columns;
    let body = &blob[HEADER_LEN..];
    if body.len() != body_len(cell_count) {
        return Err(NWinsError::Decode(format!(
            "a {}x{} board needs {} cell bytes, got {}",
            rows,
            columns,
            body_len(cell_count),
            body.len()
        )));
    }

    let mut cells = Vec::with_capacity(cell_count);
    for (byte_index, &byte) in body.iter().enumerate() {
        for slot in 0..CELLS_PER_BYTE {
            let shift = (CELLS_PER_BYTE - 1 - slot) * BITS_PER_CELL;
            let code = (byte >> shift) & 0b11;
            if byte_index * CELLS_PER_BYTE + slot < cell_count {
                let side = GameSide::try_from(code)
                    .map_err(|_| NWinsError::Decode(format!("unknown cell code {}", code)))?;
                cells.push(side);
            } else if code != 0 {
                return Err(NWinsError::Decode("non-zero padding bits".to_string()));
            }
        }
    }

    GameState::from_cells(rows, columns, &cells).map_err(|e| NWinsError::Decode(e.to_string()))
}

/// Returns the Base64 hash string of a state
pub fn to_hash<S: BoardState>(state: &S) -> Result<String> {
    Ok(STANDARD.encode(encode(state)?))
}

/// Parses a Base64 hash string into a state
pub fn from_hash(hash: &str) -> Result<GameState> {
    let blob = STANDARD
        .decode(hash.trim())
        .map_err(|e| NWinsError::Decode(format!("'{}' is not valid Base64: {}", hash, e)))?;
    decode(&blob)
}
