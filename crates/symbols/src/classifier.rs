use crate::Arch;
use std::collections::HashSet;

/// Path tokens that mark a 64-bit symbol. Matched case-insensitively.
pub const X64_MARKERS: &[&str] = &["x64", "amd64"];

/// Decides which symbols are published and what they were built for.
#[derive(Debug, Clone, Default)]
pub struct SymbolClassifier {
    excluded: HashSet<String>,
}

impl SymbolClassifier {
    pub fn new<I, S>(exclude: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            excluded: exclude
                .into_iter()
                .map(|name| name.as_ref().trim().to_lowercase())
                .filter(|name| !name.is_empty())
                .collect(),
        }
    }

    /// Case-insensitive membership test against the exclude list.
    pub fn is_excluded(&self, name: &str) -> bool {
        !self.excluded.is_empty() && self.excluded.contains(&name.to_lowercase())
    }

    pub fn detect_architecture(&self, path: &str) -> Arch {
        detect_architecture(path)
    }
}

/// Heuristic: any 64-bit marker anywhere in the path wins, otherwise x86.
///
/// Architecture-neutral paths are reported as x86.
#[must_use]
pub fn detect_architecture(path: &str) -> Arch {
    let lowered = path.to_lowercase();
    if X64_MARKERS.iter().any(|marker| lowered.contains(marker)) {
        Arch::X64
    } else {
        Arch::X86
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn x64_markers_match_any_case() {
        for path in [
            r"\Build\X64\foo.pdb",
            r"\Build\x64\foo.pdb",
            r"\Build\AMD64\foo.pdb",
            r"\Build\release_amd64\foo.pdb",
        ] {
            assert_eq!(detect_architecture(path), Arch::X64, "{path}");
        }
    }

    #[test]
    fn everything_else_is_x86() {
        for path in [r"\Build\x86\foo.pdb", r"\Build\anything\foo.pdb", ""] {
            assert_eq!(detect_architecture(path), Arch::X86, "{path}");
        }
    }

    #[test]
    fn exclude_list_ignores_case() {
        let classifier = SymbolClassifier::new(["vc140.PDB", " ntdll.pdb "]);
        assert!(classifier.is_excluded("VC140.pdb"));
        assert!(classifier.is_excluded("vc140.pdb"));
        assert!(classifier.is_excluded("NTDLL.PDB"));
        assert!(!classifier.is_excluded("cbt_client.pdb"));
    }

    #[test]
    fn empty_exclude_list_excludes_nothing() {
        let classifier = SymbolClassifier::default();
        assert!(!classifier.is_excluded(""));
        assert!(!classifier.is_excluded("foo.pdb"));
    }
}
