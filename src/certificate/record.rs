//! Roster rows and CSV parsing.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

pub const PERSON_NAME: &str = "Person Name";
pub const COURSE_NAME: &str = "Course Name";
pub const COURSE_DESCRIPTION: &str = "Course Description";
pub const COURSE_DATE: &str = "Course Date";

/// Columns every roster must carry, in reporting order.
pub const REQUIRED_COLUMNS: [&str; 4] = [PERSON_NAME, COURSE_NAME, COURSE_DESCRIPTION, COURSE_DATE];

const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

/// One course-completion entry.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct Record {
    #[schema(example = "Alice Smith")]
    pub person_name: String,
    #[schema(example = "Python Programming")]
    pub course_name: String,
    #[schema(example = "Variables and types\nControl flow")]
    pub course_description: String,
    #[schema(example = "2023-01-15")]
    pub course_date: String,
}

impl Record {
    pub fn new(
        person_name: impl Into<String>,
        course_name: impl Into<String>,
        course_description: impl Into<String>,
        course_date: impl Into<String>,
    ) -> Self {
        Self {
            person_name: person_name.into(),
            course_name: course_name.into(),
            course_description: course_description.into(),
            course_date: course_date.into(),
        }
    }

    /// Name used in failure reports, `N/A` when blank.
    pub fn display_name(&self) -> &str {
        let trimmed = self.person_name.trim();
        if trimmed.is_empty() {
            "N/A"
        } else {
            trimmed
        }
    }
}

/// Parsed table: the header row plus data rows in input order.
#[derive(Debug, Clone, Default)]
pub struct Roster {
    headers: Vec<String>,
    records: Vec<Record>,
}

impl Roster {
    pub fn new(headers: Vec<String>, records: Vec<Record>) -> Self {
        Self { headers, records }
    }

    /// Parses CSV bytes. Short rows are padded with empty cells and a leading
    /// UTF-8 byte order mark is ignored.
    pub fn from_csv_bytes(data: &[u8]) -> Result<Self, csv::Error> {
        let data = data.strip_prefix(UTF8_BOM).unwrap_or(data);
        let mut reader = csv::ReaderBuilder::new()
            .flexible(true)
            .from_reader(data);

        let headers: Vec<String> = reader.headers()?.iter().map(str::to_string).collect();
        let column = |name: &str| headers.iter().position(|h| h == name);
        let indices = [
            column(PERSON_NAME),
            column(COURSE_NAME),
            column(COURSE_DESCRIPTION),
            column(COURSE_DATE),
        ];

        let mut records = Vec::new();
        for row in reader.records() {
            let row = row?;
            let cell = |index: Option<usize>| {
                index
                    .and_then(|i| row.get(i))
                    .unwrap_or_default()
                    .to_string()
            };
            records.push(Record {
                person_name: cell(indices[0]),
                course_name: cell(indices[1]),
                course_description: cell(indices[2]),
                course_date: cell(indices[3]),
            });
        }

        Ok(Self { headers, records })
    }

    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    pub fn records(&self) -> &[Record] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}
