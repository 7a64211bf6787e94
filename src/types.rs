use crate::error::{CambioError, CambioResult};
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// Largest column Excel accepts (XFD).
const MAX_COLUMNS: u32 = 16_384;

//==============================================================================
// Cell Addressing
//==============================================================================

/// A worksheet column, stored zero-based and shown as letters (0 → A, 26 → AA)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ColumnRef(u16);

impl ColumnRef {
    pub const A: ColumnRef = ColumnRef(0);
    pub const B: ColumnRef = ColumnRef(1);
    pub const C: ColumnRef = ColumnRef(2);
    pub const D: ColumnRef = ColumnRef(3);
    pub const E: ColumnRef = ColumnRef(4);
    pub const F: ColumnRef = ColumnRef(5);
    pub const G: ColumnRef = ColumnRef(6);

    pub const fn from_index(index: u16) -> Self {
        ColumnRef(index)
    }

    pub fn index(self) -> u16 {
        self.0
    }

    /// Parse column letters, case-insensitive
    ///
    /// Examples:
    /// - "A" → 0
    /// - "f" → 5
    /// - "AA" → 26
    pub fn parse(letters: &str) -> CambioResult<Self> {
        let trimmed = letters.trim();
        if trimmed.is_empty() || trimmed.len() > 3 {
            return Err(CambioError::InvalidReference(letters.to_string()));
        }

        let mut number: u32 = 0;
        for ch in trimmed.chars() {
            if !ch.is_ascii_alphabetic() {
                return Err(CambioError::InvalidReference(letters.to_string()));
            }
            let digit = (ch.to_ascii_uppercase() as u8 - b'A') as u32 + 1;
            number = number * 26 + digit;
        }

        if number > MAX_COLUMNS {
            return Err(CambioError::InvalidReference(letters.to_string()));
        }
        Ok(ColumnRef((number - 1) as u16))
    }

    pub fn letters(self) -> String {
        let mut result = String::new();
        let mut idx = self.0 as usize;

        loop {
            let remainder = idx % 26;
            result.insert(0, (b'A' + remainder as u8) as char);
            if idx < 26 {
                break;
            }
            idx = idx / 26 - 1;
        }

        result
    }
}

impl fmt::Display for ColumnRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.letters())
    }
}

impl FromStr for ColumnRef {
    type Err = CambioError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ColumnRef::parse(s)
    }
}

impl TryFrom<String> for ColumnRef {
    type Error = CambioError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        ColumnRef::parse(&value)
    }
}

impl From<ColumnRef> for String {
    fn from(column: ColumnRef) -> Self {
        column.letters()
    }
}

/// A single cell position: column letter plus 1-based row number (`E12`)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CellRef {
    pub column: ColumnRef,
    pub row: u32,
}

impl CellRef {
    pub fn new(column: ColumnRef, row: u32) -> Self {
        Self { column, row }
    }
}

impl fmt::Display for CellRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.column, self.row)
    }
}

impl FromStr for CellRef {
    type Err = CambioError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let split = trimmed
            .find(|c: char| c.is_ascii_digit())
            .ok_or_else(|| CambioError::InvalidReference(s.to_string()))?;
        let (letters, digits) = trimmed.split_at(split);
        let column = ColumnRef::parse(letters)?;
        let row: u32 = digits
            .parse()
            .map_err(|_| CambioError::InvalidReference(s.to_string()))?;
        if row == 0 {
            return Err(CambioError::InvalidReference(s.to_string()));
        }
        Ok(CellRef { column, row })
    }
}

//==============================================================================
// Cell Contents
//==============================================================================

/// Value held by a cell. Formulas are kept as text with a leading `=` and are
/// never evaluated here.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum CellValue {
    #[default]
    Empty,
    Text(String),
    Number(f64),
    Bool(bool),
    Formula(String),
    Date(NaiveDateTime),
    Error(String),
}

impl CellValue {
    pub fn is_empty(&self) -> bool {
        match self {
            CellValue::Empty => true,
            CellValue::Text(s) => s.is_empty(),
            _ => false,
        }
    }

    /// Numeric reading of the cell, if it has one.
    ///
    /// Numbers and numeric text (surrounding whitespace allowed) convert;
    /// everything else, including NaN and infinities, does not.
    pub fn as_number(&self) -> Option<f64> {
        let n = match self {
            CellValue::Number(n) => *n,
            CellValue::Text(s) => s.trim().parse::<f64>().ok()?,
            _ => return None,
        };
        n.is_finite().then_some(n)
    }

    /// Text rendering used when matching descriptions and currency codes
    pub fn to_text(&self) -> String {
        match self {
            CellValue::Empty => String::new(),
            CellValue::Text(s) | CellValue::Formula(s) | CellValue::Error(s) => s.clone(),
            CellValue::Number(n) => n.to_string(),
            CellValue::Bool(b) => (if *b { "TRUE" } else { "FALSE" }).to_string(),
            CellValue::Date(dt) => dt.to_string(),
        }
    }

    pub fn is_date(&self) -> bool {
        matches!(self, CellValue::Date(_))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HorizontalAlign {
    Left,
    Center,
    Right,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Cell {
    pub value: CellValue,
    pub number_format: Option<String>,
    pub align: Option<HorizontalAlign>,
}

impl Cell {
    pub fn new(value: CellValue) -> Self {
        Self {
            value,
            ..Default::default()
        }
    }

    pub fn has_style(&self) -> bool {
        self.number_format.is_some() || self.align.is_some()
    }
}

//==============================================================================
// Sheet
//==============================================================================

static EMPTY_VALUE: CellValue = CellValue::Empty;

/// A sparse grid of cells keyed by (row, column) so iteration is row-major
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Sheet {
    pub name: String,
    cells: BTreeMap<(u32, u16), Cell>,
}

impl Sheet {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            cells: BTreeMap::new(),
        }
    }

    /// Highest row that holds a cell (0 for an empty sheet)
    pub fn max_row(&self) -> u32 {
        self.cells
            .keys()
            .next_back()
            .map(|(row, _)| *row)
            .unwrap_or(0)
    }

    pub fn cell(&self, column: ColumnRef, row: u32) -> Option<&Cell> {
        self.cells.get(&(row, column.index()))
    }

    pub fn value(&self, column: ColumnRef, row: u32) -> &CellValue {
        self.cell(column, row)
            .map(|cell| &cell.value)
            .unwrap_or(&EMPTY_VALUE)
    }

    /// Mutable access, creating an empty cell when none exists
    pub fn cell_mut(&mut self, column: ColumnRef, row: u32) -> &mut Cell {
        debug_assert!(row >= 1, "rows are 1-based");
        self.cells.entry((row, column.index())).or_default()
    }

    pub fn set_value(&mut self, column: ColumnRef, row: u32, value: CellValue) {
        self.cell_mut(column, row).value = value;
    }

    pub fn set_number_format(&mut self, column: ColumnRef, row: u32, format: impl Into<String>) {
        self.cell_mut(column, row).number_format = Some(format.into());
    }

    pub fn set_align(&mut self, column: ColumnRef, row: u32, align: HorizontalAlign) {
        self.cell_mut(column, row).align = Some(align);
    }

    /// Cells of one column that exist, in row order
    pub fn column_cells(&self, column: ColumnRef) -> impl Iterator<Item = (u32, &Cell)> {
        self.cells
            .iter()
            .filter(move |((_, col), _)| *col == column.index())
            .map(|((row, _), cell)| (*row, cell))
    }

    /// Every stored cell as (position, cell), row-major
    pub fn cells(&self) -> impl Iterator<Item = (CellRef, &Cell)> {
        self.cells
            .iter()
            .map(|((row, col), cell)| (CellRef::new(ColumnRef::from_index(*col), *row), cell))
    }

    pub fn cell_count(&self) -> usize {
        self.cells.len()
    }
}

//==============================================================================
// Workbook
//==============================================================================

/// Workbook-level name such as `TC` → `Hoja1!$H$1`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DefinedName {
    pub name: String,
    pub formula: String,
}

/// Ordered sheets plus the defined names generated formulas rely on
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Workbook {
    pub sheets: Vec<Sheet>,
    pub defined_names: Vec<DefinedName>,
}

impl Workbook {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_sheet(&mut self, sheet: Sheet) {
        self.sheets.push(sheet);
    }

    pub fn sheet_names(&self) -> Vec<String> {
        self.sheets.iter().map(|s| s.name.clone()).collect()
    }

    pub fn first_sheet_name(&self) -> Option<&str> {
        self.sheets.first().map(|s| s.name.as_str())
    }

    pub fn sheet(&self, name: &str) -> Option<&Sheet> {
        self.sheets.iter().find(|s| s.name == name)
    }

    pub fn sheet_mut(&mut self, name: &str) -> Option<&mut Sheet> {
        self.sheets.iter_mut().find(|s| s.name == name)
    }

    /// Like [`Workbook::sheet_mut`] but reports the available sheets on a miss
    pub fn require_sheet_mut(&mut self, name: &str) -> CambioResult<&mut Sheet> {
        let available = self.sheet_names();
        self.sheet_mut(name).ok_or(CambioError::MissingSheet {
            sheet: name.to_string(),
            available,
        })
    }

    pub fn defined_name(&self, name: &str) -> Option<&DefinedName> {
        self.defined_names
            .iter()
            .find(|d| d.name.eq_ignore_ascii_case(name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_column_letters() {
        assert_eq!(ColumnRef::from_index(0).letters(), "A");
        assert_eq!(ColumnRef::from_index(25).letters(), "Z");
        assert_eq!(ColumnRef::from_index(26).letters(), "AA");
        assert_eq!(ColumnRef::from_index(51).letters(), "AZ");
        assert_eq!(ColumnRef::from_index(52).letters(), "BA");
        assert_eq!(ColumnRef::from_index(702).letters(), "AAA");
    }

    #[test]
    fn test_column_parse() {
        assert_eq!(ColumnRef::parse("A").unwrap(), ColumnRef::A);
        assert_eq!(ColumnRef::parse("g").unwrap(), ColumnRef::G);
        assert_eq!(ColumnRef::parse(" aa ").unwrap().index(), 26);
        assert_eq!(ColumnRef::parse("XFD").unwrap().index(), 16_383);
        assert!(ColumnRef::parse("XFE").is_err());
        assert!(ColumnRef::parse("").is_err());
        assert!(ColumnRef::parse("A1").is_err());
        assert!(ColumnRef::parse("ABCD").is_err());
    }

    #[test]
    fn test_cell_ref_parse_and_display() {
        let cell: CellRef = "E12".parse().unwrap();
        assert_eq!(cell.column, ColumnRef::E);
        assert_eq!(cell.row, 12);
        assert_eq!(cell.to_string(), "E12");

        assert!("E0".parse::<CellRef>().is_err());
        assert!("12".parse::<CellRef>().is_err());
        assert!("E".parse::<CellRef>().is_err());
    }

    #[test]
    fn test_as_number() {
        assert_eq!(CellValue::Number(1000.0).as_number(), Some(1000.0));
        assert_eq!(CellValue::Text(" 12.5 ".into()).as_number(), Some(12.5));
        assert_eq!(CellValue::Text("1e3".into()).as_number(), Some(1000.0));
        assert_eq!(CellValue::Text("abc".into()).as_number(), None);
        assert_eq!(CellValue::Text("nan".into()).as_number(), None);
        assert_eq!(CellValue::Text("inf".into()).as_number(), None);
        assert_eq!(CellValue::Formula("=A1*2".into()).as_number(), None);
        assert_eq!(CellValue::Bool(true).as_number(), None);
        assert_eq!(CellValue::Empty.as_number(), None);
    }

    #[test]
    fn test_sheet_max_row_and_access() {
        let mut sheet = Sheet::new("Hoja1");
        assert_eq!(sheet.max_row(), 0);

        sheet.set_value(ColumnRef::B, 3, CellValue::Text("x".into()));
        sheet.set_value(ColumnRef::A, 7, CellValue::Number(1.0));
        assert_eq!(sheet.max_row(), 7);
        assert_eq!(sheet.value(ColumnRef::B, 3), &CellValue::Text("x".into()));
        assert_eq!(sheet.value(ColumnRef::F, 3), &CellValue::Empty);

        let rows: Vec<u32> = sheet.column_cells(ColumnRef::B).map(|(r, _)| r).collect();
        assert_eq!(rows, vec![3]);
    }

    #[test]
    fn test_require_sheet_reports_available() {
        let mut wb = Workbook::new();
        wb.add_sheet(Sheet::new("Hoja1"));
        wb.add_sheet(Sheet::new("Resumen"));

        match wb.require_sheet_mut("Nope") {
            Err(CambioError::MissingSheet { sheet, available }) => {
                assert_eq!(sheet, "Nope");
                assert_eq!(available, vec!["Hoja1", "Resumen"]);
            }
            other => panic!("Expected MissingSheet, got {:?}", other.map(|s| s.name.clone())),
        }
    }
}
