//! Text persistence for Q-tables and replay buffers
//!
//! Both formats are plain comma-separated lines without a header:
//!
//! ```text
//! Q-table:       stateHash,nextStateHash,side,column,qValue
//! replay buffer: oldStateHash,newStateHash,side,column,reward,isTerminal
//! ```
//!
//! States are written as their Base64 hash strings. The `nextStateHash` of a
//! Q-table line is informational only; the reader ignores it. Writers create
//! missing parent directories and overwrite existing files.

use std::fs::{self, File};
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::Path;

use log::info;

use crate::{
    action::{GameAction, GameSide},
    engine::ActionLog,
    q_table::QTable,
    replay::ReplayBuffer,
    state::{BoardState, GameState},
    NWinsError, Result,
};

const SEPARATOR: char = ',';

fn create_writer(path: &Path) -> Result<BufWriter<File>> {
    if let Some(dir) = path.parent() {
        if !dir.as_os_str().is_empty() {
            fs::create_dir_all(dir)?;
        }
    }
    Ok(BufWriter::new(File::create(path)?))
}

fn malformed(line: usize, reason: impl Into<String>) -> NWinsError {
    NWinsError::MalformedRecord {
        line,
        reason: reason.into(),
    }
}

fn parse_state(hash: &str, line: usize) -> Result<GameState> {
    GameState::from_hash(hash.trim()).map_err(|e| malformed(line, e.to_string()))
}

fn parse_action(side: &str, column: &str, line: usize) -> Result<GameAction> {
    let side = side
        .trim()
        .parse::<u8>()
        .map_err(|_| malformed(line, format!("invalid side '{}'", side)))
        .and_then(|raw| GameSide::try_from(raw).map_err(|e| malformed(line, e.to_string())))?;
    let column = column
        .trim()
        .parse::<usize>()
        .map_err(|_| malformed(line, format!("invalid column '{}'", column)))?;
    Ok(GameAction::new(column, side))
}

fn parse_number(value: &str, what: &str, line: usize) -> Result<f64> {
    value
        .trim()
        .parse::<f64>()
        .map_err(|_| malformed(line, format!("invalid {} '{}'", what, value)))
}

/// Writes every (state, action) pair of a table, one per line
pub fn write_q_table(table: &QTable, path: &Path) -> Result<()> {
    let mut writer = create_writer(path)?;
    let mut lines = 0usize;

    for (state, values) in table {
        let state_hash = state.to_hash()?;
        for (action, q_value) in values {
            let next_hash = state.apply_action(action)?.to_hash()?;
            writeln!(
                writer,
                "{}{sep}{}{sep}{}{sep}{}{sep}{}",
                state_hash,
                next_hash,
                action.side.as_u8(),
                action.column,
                q_value,
                sep = SEPARATOR
            )?;
            lines += 1;
        }
    }

    writer.flush()?;
    info!(
        "stored Q-table with {} states and {} entries to {}",
        table.len(),
        lines,
        path.display()
    );
    Ok(())
}

/// Reads a table written by [`write_q_table`]
pub fn read_q_table(path: &Path) -> Result<QTable> {
    let reader = BufReader::new(File::open(path)?);
    let mut table = QTable::new();

    for (index, line) in reader.lines().enumerate() {
        let line = line?;
        let number = index + 1;
        if line.trim().is_empty() {
            continue;
        }

        let parts: Vec<&str> = line.splitn(5, SEPARATOR).collect();
        if parts.len() != 5 {
            return Err(malformed(number, "expected 5 comma-separated fields"));
        }

        let state = parse_state(parts[0], number)?;
        let action = parse_action(parts[2], parts[3], number)?;
        state
            .apply_action(&action)
            .map_err(|e| malformed(number, e.to_string()))?;
        let q_value = parse_number(parts[4], "Q-value", number)?;
        table.set_value(&state, action, q_value);
    }

    info!(
        "loaded Q-table with {} states from {}",
        table.len(),
        path.display()
    );
    Ok(table)
}

/// Writes the buffer contents from oldest to newest, one log per line
pub fn write_replay_buffer(buffer: &ReplayBuffer<ActionLog>, path: &Path) -> Result<()> {
    let mut writer = create_writer(path)?;

    for log in buffer {
        writeln!(
            writer,
            "{}{sep}{}{sep}{}{sep}{}{sep}{}{sep}{}",
            log.old_state.to_hash()?,
            log.new_state.to_hash()?,
            log.action.side.as_u8(),
            log.action.column,
            log.reward,
            log.is_terminal,
            sep = SEPARATOR
        )?;
    }

    writer.flush()?;
    info!(
        "stored replay buffer with {} entries to {}",
        buffer.len(),
        path.display()
    );
    Ok(())
}

/// Reads a buffer written by [`write_replay_buffer`]
///
/// If the file holds more lines than `capacity`, only the most recent ones
/// remain in the buffer.
pub fn read_replay_buffer(path: &Path, capacity: usize) -> Result<ReplayBuffer<ActionLog>> {
    let reader = BufReader::new(File::open(path)?);
    let mut buffer = ReplayBuffer::new(capacity)?;

    for (index, line) in reader.lines().enumerate() {
        let line = line?;
        let number = index + 1;
        if line.trim().is_empty() {
            continue;
        }

        let parts: Vec<&str> = line.split(SEPARATOR).collect();
        if parts.len() != 6 {
            return Err(malformed(number, "expected 6 comma-separated fields"));
        }

        let old_state = parse_state(parts[0], number)?;
        let new_state = parse_state(parts[1], number)?;
        let action = parse_action(parts[2], parts[3], number)?;
        let reward = parse_number(parts[4], "reward", number)?;
        let is_terminal = match parts[5].trim().to_ascii_lowercase().as_str() {
            "true" => true,
            "false" => false,
            other => return Err(malformed(number, format!("invalid flag '{}'", other))),
        };

        buffer.push(ActionLog::new(old_state, new_state, action, reward, is_terminal));
    }

    info!(
        "loaded replay buffer with {} entries from {}",
        buffer.len(),
        path.display()
    );
    Ok(buffer)
}
