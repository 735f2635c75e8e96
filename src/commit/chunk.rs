//! Splitting a staged diff into independently submittable chunks.

use crate::commit::diff::FileDiff;

/// One slice of the diff, paired with the file it came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiffChunk {
    pub file_name: String,
    pub content: String,
}

impl DiffChunk {
    pub fn new(file_name: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            file_name: file_name.into(),
            content: content.into(),
        }
    }
}

/// Default chunk budget in characters.
pub const DEFAULT_MAX_CHUNK_CHARS: usize = 8_000;

/// Split per-file diffs into ordered chunks no larger than `max_chars`.
///
/// A diff that fits in the budget is sent whole as a single chunk. Otherwise
/// each file becomes its own chunk, and files over budget are split on hunk
/// headers and then on line boundaries. A single line longer than the budget
/// is kept intact rather than cut mid-line.
pub fn chunk_diff(files: &[FileDiff], max_chars: usize) -> Vec<DiffChunk> {
    let max_chars = max_chars.max(1);
    let total: usize = files.iter().map(|f| f.patch.len()).sum();

    if total <= max_chars {
        return match files {
            [] => Vec::new(),
            [only] => vec![DiffChunk::new(&only.path, &only.patch)],
            _ => {
                let content: String = files.iter().map(|f| f.patch.as_str()).collect();
                vec![DiffChunk::new(format!("{} files", files.len()), content)]
            }
        };
    }

    let mut chunks = Vec::new();
    for file in files {
        let pieces = split_patch(&file.patch, max_chars);
        let count = pieces.len();
        if count == 1 {
            chunks.push(DiffChunk::new(&file.path, &file.patch));
            continue;
        }
        for (i, piece) in pieces.into_iter().enumerate() {
            chunks.push(DiffChunk::new(
                format!("{} (part {}/{})", file.path, i + 1, count),
                piece,
            ));
        }
    }
    chunks
}

/// Split one file's patch into pieces of at most `max_chars` where possible.
fn split_patch(patch: &str, max_chars: usize) -> Vec<String> {
    if patch.len() <= max_chars {
        return vec![patch.to_string()];
    }

    let mut pieces = Vec::new();
    let mut current = String::new();

    for section in hunk_sections(patch) {
        if current.len() + section.len() <= max_chars {
            current.push_str(section);
            continue;
        }
        if !current.is_empty() {
            pieces.push(std::mem::take(&mut current));
        }
        if section.len() <= max_chars {
            current.push_str(section);
            continue;
        }
        for line in section.split_inclusive('\n') {
            if !current.is_empty() && current.len() + line.len() > max_chars {
                pieces.push(std::mem::take(&mut current));
            }
            current.push_str(line);
        }
    }

    if !current.is_empty() {
        pieces.push(current);
    }
    pieces
}

/// Cut a patch into one section per `@@` hunk, the file header riding with
/// the first hunk.
fn hunk_sections(patch: &str) -> Vec<&str> {
    let mut sections = Vec::new();
    let mut start = 0;
    let mut offset = 0;
    let mut in_hunk = false;

    for line in patch.split_inclusive('\n') {
        if line.starts_with("@@") {
            if in_hunk {
                sections.push(&patch[start..offset]);
                start = offset;
            }
            in_hunk = true;
        }
        offset += line.len();
    }
    if start < patch.len() {
        sections.push(&patch[start..]);
    }
    sections
}
