//! Candidate-to-reference pairing by filename convention.
//!
//! A candidate such as `5.jpg.geometric.png` carries the depth-output suffix
//! `.geometric.png` and an optional intermediate extension `.jpg`; stripping
//! both yields the key `5`, whose reference is expected at `5.png`.

use crate::trace::trace_warn;
use crate::util::{DepthEvalError, DepthEvalResult};
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

/// Filename rules relating candidate outputs to reference depth maps.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NamingConvention {
    /// Suffix every candidate depth output carries, e.g. `.geometric.png`.
    pub candidate_suffix: String,
    /// Extension left over from the source image, stripped case-insensitively.
    pub intermediate_extension: Option<String>,
    /// Extension of reference files, without the dot.
    pub reference_extension: String,
}

impl Default for NamingConvention {
    fn default() -> Self {
        Self {
            candidate_suffix: ".geometric.png".to_string(),
            intermediate_extension: Some(".jpg".to_string()),
            reference_extension: "png".to_string(),
        }
    }
}

impl NamingConvention {
    /// Derives the shared key from a candidate filename.
    ///
    /// Returns `None` when the name lacks the candidate suffix.
    pub fn candidate_key<'a>(&self, file_name: &'a str) -> Option<&'a str> {
        let core = file_name.strip_suffix(self.candidate_suffix.as_str())?;
        let Some(ext) = self.intermediate_extension.as_deref() else {
            return Some(core);
        };
        let split = core.len().checked_sub(ext.len());
        match split {
            Some(at) if core.is_char_boundary(at) && core[at..].eq_ignore_ascii_case(ext) => {
                Some(&core[..at])
            }
            _ => Some(core),
        }
    }

    /// Reference filename expected for `key`.
    pub fn reference_name(&self, key: &str) -> String {
        format!("{key}.{}", self.reference_extension)
    }
}

/// Candidate/reference file pair sharing a base key.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Pair {
    pub candidate: PathBuf,
    pub reference: PathBuf,
    pub key: String,
}

/// A candidate whose reference file does not exist.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct UnmatchedCandidate {
    pub file_name: String,
    pub expected_reference: String,
}

/// Pairs found plus the candidates that were skipped.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PairMatch {
    pub pairs: Vec<Pair>,
    pub unmatched: Vec<UnmatchedCandidate>,
}

/// Matches candidate names against the available reference names.
///
/// Output order follows `candidates`. Names without the candidate suffix are
/// ignored; candidates without a reference are reported in `unmatched`.
pub fn match_pairs<S: AsRef<str>>(
    candidate_dir: &Path,
    candidates: &[S],
    reference_dir: &Path,
    references: &HashSet<String>,
    naming: &NamingConvention,
) -> PairMatch {
    let mut out = PairMatch::default();
    for name in candidates {
        let name = name.as_ref();
        let Some(key) = naming.candidate_key(name) else {
            continue;
        };
        let expected = naming.reference_name(key);
        if references.contains(&expected) {
            out.pairs.push(Pair {
                candidate: candidate_dir.join(name),
                reference: reference_dir.join(&expected),
                key: key.to_string(),
            });
        } else {
            trace_warn!(
                "unmatched_candidate",
                file = name,
                expected = expected.as_str()
            );
            out.unmatched.push(UnmatchedCandidate {
                file_name: name.to_string(),
                expected_reference: expected,
            });
        }
    }
    out
}

/// Lists the names of files in `dir` (following symlinks), in directory order.
pub fn list_file_names(dir: &Path) -> DepthEvalResult<Vec<String>> {
    let entries = fs::read_dir(dir).map_err(|err| DepthEvalError::io(dir, err))?;
    let mut names = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|err| DepthEvalError::io(dir, err))?;
        // Follows symlinks, so linked depth files are listed like regular ones.
        if !entry.path().is_file() {
            continue;
        }
        // Non UTF-8 names cannot follow the naming convention.
        if let Ok(name) = entry.file_name().into_string() {
            names.push(name);
        }
    }
    Ok(names)
}

/// Enumerates both directories once and pairs their files.
pub fn discover_pairs(
    candidate_dir: &Path,
    reference_dir: &Path,
    naming: &NamingConvention,
) -> DepthEvalResult<PairMatch> {
    let candidates = list_file_names(candidate_dir)?;
    let references: HashSet<String> = list_file_names(reference_dir)?.into_iter().collect();
    Ok(match_pairs(
        candidate_dir,
        &candidates,
        reference_dir,
        &references,
        naming,
    ))
}
