//! Reads the first worksheet of an uploaded workbook into a grid of trimmed
//! cell strings. `grid[0]` is spreadsheet row 1 and `grid[r][0]` column A,
//! regardless of where the used range starts.

use std::io::Cursor;

use calamine::{open_workbook_auto_from_rs, Data, Reader};

use crate::import::ImportError;

pub type Grid = Vec<Vec<String>>;

/// Returns `None` when the workbook has no worksheet.
pub fn read_first_sheet(bytes: &[u8]) -> Result<Option<Grid>, ImportError> {
    let mut workbook = open_workbook_auto_from_rs(Cursor::new(bytes.to_vec()))
        .map_err(|e| ImportError::Workbook(e.to_string()))?;

    let Some(range) = workbook.worksheet_range_at(0) else {
        return Ok(None);
    };
    let range = range.map_err(|e| ImportError::Workbook(e.to_string()))?;

    let (start_row, start_col) = range.start().unwrap_or((0, 0));
    let mut grid: Grid = vec![Vec::new(); start_row as usize];
    for row in range.rows() {
        let mut cells = vec![String::new(); start_col as usize];
        cells.extend(row.iter().map(cell_text));
        grid.push(cells);
    }
    Ok(Some(grid))
}

/// Dates stay as spreadsheet serials; the importer converts them.
fn cell_text(cell: &Data) -> String {
    match cell {
        Data::Empty | Data::Error(_) => String::new(),
        Data::String(s) | Data::DateTimeIso(s) | Data::DurationIso(s) => s.trim().to_string(),
        Data::DateTime(dt) => dt.as_f64().to_string(),
        other => other.to_string(),
    }
}
