use crate::error::{Error, Result};
use std::fs;
use std::path::{Path, PathBuf};

/// A logical page number referenced by an instruction.
pub type Page = u32;

const TOKEN_BEGIN: &str = "begin";
const TOKEN_END: &str = "end";

/// `Job` is the immutable template a process is created from: an identifier, a display name and
/// the ordered page reference of every instruction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Job {
    id: usize,
    name: String,
    pages: Vec<Page>,
}

impl Job {
    pub fn new(id: usize, name: impl Into<String>, pages: Vec<Page>) -> Self {
        Self {
            id,
            name: name.into(),
            pages,
        }
    }

    /// Build a job from the textual description of its page references.
    ///
    /// The text is split on whitespace. A `begin` token is skipped and an `end` token stops the
    /// read (both case-insensitive); every other token must be a page number.
    ///
    /// # Errors
    ///
    /// Returns `Error::InvalidToken` naming the first token that is not a page number.
    ///
    /// # Examples
    ///
    /// ```
    /// use paging_sim::job::Job;
    /// let job = Job::parse(1, "demo", "begin 1 2 3 end 4").unwrap();
    /// assert_eq!(job.pages(), &[1, 2, 3]);
    /// ```
    pub fn parse(id: usize, name: &str, text: &str) -> Result<Self> {
        let mut pages = Vec::new();
        for token in text.split_whitespace() {
            if token.eq_ignore_ascii_case(TOKEN_END) {
                break;
            }
            if token.eq_ignore_ascii_case(TOKEN_BEGIN) {
                continue;
            }
            let page = token.parse::<Page>().map_err(|_| Error::InvalidToken {
                name: String::from(name),
                token: String::from(token),
            })?;
            pages.push(page);
        }
        Ok(Self::new(id, name, pages))
    }

    /// Read a job description from a file. The job is named after the path it came from.
    ///
    /// # Errors
    ///
    /// `Error::JobFile` when the file cannot be read, `Error::InvalidToken` when its content does
    /// not parse.
    pub fn read(id: usize, path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path).map_err(|source| Error::JobFile {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(id, &path.display().to_string(), &text)
    }

    pub fn id(&self) -> usize {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn pages(&self) -> &[Page] {
        &self.pages
    }
}

/// Read every job file in order, numbering the jobs from 1.
pub fn read_jobs(paths: &[PathBuf]) -> Result<Vec<Job>> {
    paths
        .iter()
        .enumerate()
        .map(|(index, path)| Job::read(index + 1, path))
        .collect()
}
