//! Certificate identifier derivation.
//!
//! An identifier reads `INITIALS-COURSEFRAG-DATECODE-RANDOM`, for example
//! `AS-PythonPr-150123-004217`. The first three parts are derived from the
//! record; the last one comes from a [`SuffixSource`] so tests can swap the
//! process-wide randomness for a seeded generator.

use std::fmt;
use std::sync::Arc;

use chrono::NaiveDate;
use lazy_static::lazy_static;
use parking_lot::Mutex;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use regex::Regex;
use thiserror::Error;

/// Maximum number of characters kept from the sanitized course title.
pub const COURSE_FRAGMENT_LEN: usize = 8;

/// Date code used when no supported format matches the course date.
pub const UNKNOWN_DATE_CODE: &str = "000000";

/// Accepted course date formats, tried in order.
pub const DATE_FORMATS: [&str; 3] = ["%Y-%m-%d", "%d-%m-%Y", "%m/%d/%Y"];

const MAX_SUFFIX: u32 = 999_999;

lazy_static! {
    static ref IDENTIFIER_PATTERN: Regex =
        Regex::new(r"^[A-Z]+-[A-Za-z0-9]{0,8}-\d{6}-\d{6}$").expect("identifier pattern compiles");

    /// Shape each of [`DATE_FORMATS`] must have before chrono sees it.
    /// chrono's `%Y` takes short or signed years; a year here is exactly four digits.
    static ref DATE_SHAPES: [Regex; 3] = [
        Regex::new(r"^\d{4}-\d{1,2}-\d{1,2}$").expect("iso date shape compiles"),
        Regex::new(r"^\d{1,2}-\d{1,2}-\d{4}$").expect("dmy date shape compiles"),
        Regex::new(r"^\d{1,2}/\d{1,2}/\d{4}$").expect("us date shape compiles"),
    ];
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum IdentifierError {
    #[error("person name has no ASCII letter to derive initials from")]
    EmptyPersonName,
}

/// Source of the six-digit random suffix.
pub trait SuffixSource: Send + Sync {
    /// Returns a value in `0..=999_999`.
    fn next_suffix(&self) -> u32;
}

/// Draws suffixes from the thread-local OS-seeded generator.
#[derive(Debug, Default, Clone, Copy)]
pub struct ThreadRngSuffix;

impl SuffixSource for ThreadRngSuffix {
    fn next_suffix(&self) -> u32 {
        rand::thread_rng().gen_range(0..=MAX_SUFFIX)
    }
}

/// Reproducible suffixes for tests and dry runs.
pub struct SeededSuffix {
    rng: Mutex<StdRng>,
}

impl SeededSuffix {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: Mutex::new(StdRng::seed_from_u64(seed)),
        }
    }
}

impl SuffixSource for SeededSuffix {
    fn next_suffix(&self) -> u32 {
        self.rng.lock().gen_range(0..=MAX_SUFFIX)
    }
}

/// A derived certificate identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CertificateId {
    initials: String,
    course_fragment: String,
    date_code: String,
    suffix: u32,
}

impl CertificateId {
    pub fn initials(&self) -> &str {
        &self.initials
    }

    pub fn course_fragment(&self) -> &str {
        &self.course_fragment
    }

    pub fn date_code(&self) -> &str {
        &self.date_code
    }

    pub fn suffix(&self) -> u32 {
        self.suffix
    }

    /// Output file name for the rendered certificate.
    pub fn file_name(&self) -> String {
        format!("{}.pdf", self)
    }

    /// Checks a string against the identifier grammar.
    pub fn is_well_formed(value: &str) -> bool {
        IDENTIFIER_PATTERN.is_match(value)
    }
}

impl fmt::Display for CertificateId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}-{}-{}-{:06}",
            self.initials, self.course_fragment, self.date_code, self.suffix
        )
    }
}

/// Derives identifiers from record fields.
#[derive(Clone)]
pub struct IdentifierDeriver {
    suffix_source: Arc<dyn SuffixSource>,
}

impl Default for IdentifierDeriver {
    fn default() -> Self {
        Self::new(Arc::new(ThreadRngSuffix))
    }
}

impl IdentifierDeriver {
    pub fn new(suffix_source: Arc<dyn SuffixSource>) -> Self {
        Self { suffix_source }
    }

    pub fn derive(
        &self,
        person_name: &str,
        course_name: &str,
        course_date: &str,
    ) -> Result<CertificateId, IdentifierError> {
        let initials = initials(person_name).ok_or(IdentifierError::EmptyPersonName)?;

        Ok(CertificateId {
            initials,
            course_fragment: course_fragment(course_name),
            date_code: date_code(course_date),
            suffix: self.suffix_source.next_suffix().min(MAX_SUFFIX),
        })
    }
}

/// First letter of every whitespace-separated token, uppercased.
///
/// Tokens that do not start with an ASCII letter contribute nothing; the
/// initials end up in a file name.
pub fn initials(person_name: &str) -> Option<String> {
    let initials: String = person_name
        .split_whitespace()
        .filter_map(|token| token.chars().next())
        .filter(char::is_ascii_alphabetic)
        .map(|c| c.to_ascii_uppercase())
        .collect();

    if initials.is_empty() {
        None
    } else {
        Some(initials)
    }
}

/// Alphanumeric-only prefix of the course title.
pub fn course_fragment(course_name: &str) -> String {
    course_name
        .chars()
        .filter(|c| *c != '\n' && *c != '\r')
        .filter(char::is_ascii_alphanumeric)
        .take(COURSE_FRAGMENT_LEN)
        .collect()
}

/// `ddmmyy` of the first date in `course_date`, or [`UNKNOWN_DATE_CODE`].
///
/// Ranges are written `start:end`; only the start is considered, with
/// surrounding whitespace ignored.
pub fn date_code(course_date: &str) -> String {
    let first = course_date.split(':').next().unwrap_or_default().trim();

    match parse_course_date(first) {
        Some(date) => date.format("%d%m%y").to_string(),
        None => {
            log::debug!("No supported date format matched '{}'", course_date);
            UNKNOWN_DATE_CODE.to_string()
        }
    }
}

fn parse_course_date(value: &str) -> Option<NaiveDate> {
    DATE_FORMATS
        .iter()
        .zip(DATE_SHAPES.iter())
        .filter(|(_, shape)| shape.is_match(value))
        .find_map(|(format, _)| NaiveDate::parse_from_str(value, format).ok())
}
