//! Candidate/challengee file handling — walking, filtering, reading,
//! and sampling
//!
//! The walk skips dependency and build directories wholesale, then drops
//! files whose extension or basename marks them as non-code (media,
//! archives, lockfiles, generated manifests). What remains feeds the
//! TF-IDF corpus and the comparison pipeline.

use crate::CopytraceResult;
use once_cell::sync::Lazy;
use rand::seq::SliceRandom;
use rayon::prelude::*;
use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Extensions that never hold hand-written code.
static NON_CODE_EXTENSIONS: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    [
        // documents
        ".txt", ".md", ".pdf", ".doc", ".docx", ".xls", ".xlsx", ".ppt", ".pptx", ".csv",
        ".rtf", ".odt",
        // images
        ".jpg", ".jpeg", ".png", ".gif", ".bmp", ".tiff", ".svg", ".ico", ".psd",
        // archives
        ".zip", ".tar", ".gz", ".rar", ".7z", ".bz2", ".xz",
        // audio / video
        ".mp3", ".wav", ".ogg", ".flac", ".mp4", ".avi", ".mkv", ".mov", ".webm",
        // logs and data stores
        ".log", ".db", ".sqlite", ".sqlite3", ".bak",
        // binaries
        ".exe", ".dll", ".so", ".dylib", ".jar", ".bin", ".dmg", ".iso", ".wasm",
        // fonts
        ".ttf", ".otf", ".woff", ".woff2", ".eot",
        // configuration and markup
        ".ini", ".cfg", ".conf", ".yaml", ".yml", ".toml", ".xml", ".plist", ".json",
        // temp, lock, cache
        ".tmp", ".swp", ".swo", ".lock", ".cache", ".gch", ".pch",
        // VCS metadata
        ".gitignore", ".gitattributes", ".gitmodules", ".gitkeep",
    ]
    .into_iter()
    .collect()
});

/// Basenames that never hold hand-written code, regardless of extension.
static NON_CODE_BASENAMES: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    [
        "license", "license.txt", "license.md", "copying", "notice",
        "readme", "readme.md", "readme.txt", "changelog", "changelog.md",
        "package.json", "package-lock.json", "yarn.lock", "pnpm-lock.yaml",
        "cargo.lock", "go.sum", "makefile", "dockerfile",
        ".gitignore", ".gitattributes", ".editorconfig", ".env",
    ]
    .into_iter()
    .collect()
});

/// Directories skipped wholesale during the walk.
static SKIP_DIRS: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    [
        "node_modules", "dist", "build", "target", "vendor", "out",
        ".git", ".svn", ".hg", ".vscode", ".idea", "__pycache__", ".cache",
    ]
    .into_iter()
    .collect()
});

/// Extensions counted as "code" when composing the discovery sample.
static CODE_EXTENSIONS: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    [
        ".rs", ".go", ".py", ".js", ".ts", ".jsx", ".tsx", ".java", ".c", ".h",
        ".cpp", ".hpp", ".cc", ".cs", ".rb", ".php", ".swift", ".kt", ".scala",
        ".lua", ".dart", ".ex", ".exs", ".hs", ".ml", ".clj", ".vue",
    ]
    .into_iter()
    .collect()
});

/// Lower-cased `.ext` of a path, or empty when there is none.
fn dotted_extension(path: &Path) -> String {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| format!(".{}", e.to_lowercase()))
        .unwrap_or_default()
}

/// Whether a file survives the non-code denylists.
pub fn is_code_candidate(path: &Path) -> bool {
    let basename = path
        .file_name()
        .and_then(|n| n.to_str())
        .map(str::to_lowercase)
        .unwrap_or_default();
    if NON_CODE_BASENAMES.contains(basename.as_str()) {
        return false;
    }
    !NON_CODE_EXTENSIONS.contains(dotted_extension(path).as_str())
}

/// Whether a path's extension puts it in the sample's "code" bucket.
pub fn has_code_extension(path: &Path) -> bool {
    CODE_EXTENSIONS.contains(dotted_extension(path).as_str())
}

/// Two paths share an extension class when their lower-cased extensions are
/// equal, or both sit in the JS/TS family.
pub fn is_extension_same(a: &Path, b: &Path) -> bool {
    let ext_a = dotted_extension(a);
    let ext_b = dotted_extension(b);
    if ext_a == ext_b {
        return true;
    }
    let js_family = |e: &str| e == ".js" || e == ".ts";
    js_family(&ext_a) && js_family(&ext_b)
}

/// Walk `root` and return every file path that passes the denylists,
/// skipping ignored directories entirely.
pub fn collect_files(root: &Path) -> Vec<PathBuf> {
    WalkDir::new(root)
        .into_iter()
        .filter_entry(|entry| {
            let name = entry.file_name().to_string_lossy();
            !(entry.file_type().is_dir() && SKIP_DIRS.contains(name.as_ref()))
        })
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.file_type().is_file())
        .map(|entry| entry.into_path())
        .filter(|path| is_code_candidate(path))
        .collect()
}

/// Read every path into memory in parallel. Unreadable files are logged and
/// skipped; invalid UTF-8 is converted lossily.
pub fn read_all(paths: &[PathBuf]) -> CopytraceResult<HashMap<PathBuf, String>> {
    let files: HashMap<PathBuf, String> = paths
        .par_iter()
        .filter_map(|path| match std::fs::read(path) {
            Ok(bytes) => Some((
                path.clone(),
                String::from_utf8_lossy(&bytes).into_owned(),
            )),
            Err(e) => {
                tracing::warn!("skipping unreadable {}: {e}", path.display());
                None
            }
        })
        .collect();
    Ok(files)
}

/// Select up to `limit` files for discovery: up to `limit/2` drawn from the
/// code-extension bucket, the remainder uniformly without replacement from
/// the rest. The code bucket backfills when the rest runs short, so the
/// sample reaches `limit` whenever enough files exist.
pub fn sample_files(paths: &[PathBuf], limit: usize) -> Vec<PathBuf> {
    let mut rng = rand::thread_rng();

    let (code, rest): (Vec<&PathBuf>, Vec<&PathBuf>) =
        paths.iter().partition(|p| has_code_extension(p));

    let n_code = (limit / 2).min(code.len());
    let mut sample: Vec<PathBuf> = code
        .choose_multiple(&mut rng, n_code)
        .map(|p| (*p).clone())
        .collect();

    let n_rest = (limit - sample.len()).min(rest.len());
    sample.extend(rest.choose_multiple(&mut rng, n_rest).map(|p| (*p).clone()));

    if sample.len() < limit && code.len() > n_code {
        let chosen: HashSet<&PathBuf> = sample.iter().collect();
        let leftover: Vec<&PathBuf> = code
            .iter()
            .copied()
            .filter(|p| !chosen.contains(p))
            .collect();
        let n_more = (limit - sample.len()).min(leftover.len());
        let backfill: Vec<PathBuf> = leftover
            .choose_multiple(&mut rng, n_more)
            .map(|p| (*p).clone())
            .collect();
        sample.extend(backfill);
    }

    sample
}

#[cfg(test)]
mod tests {
    use super::*;

    fn paths(names: &[&str]) -> Vec<PathBuf> {
        names.iter().map(PathBuf::from).collect()
    }

    #[test]
    fn denylists_reject_the_usual_suspects() {
        for name in ["logo.png", "bundle.zip", "Cargo.lock", "notes.md", "package.json"] {
            assert!(!is_code_candidate(Path::new(name)), "{name}");
        }
    }

    #[test]
    fn denylists_keep_source_files() {
        for name in ["main.rs", "app.ts", "server.go", "script", "lib.c"] {
            assert!(is_code_candidate(Path::new(name)), "{name}");
        }
    }

    #[test]
    fn denylists_are_case_insensitive() {
        assert!(!is_code_candidate(Path::new("LICENSE")));
        assert!(!is_code_candidate(Path::new("README")));
        assert!(!is_code_candidate(Path::new("IMAGE.PNG")));
    }

    #[test]
    fn extension_class_matches_identical_and_js_ts() {
        assert!(is_extension_same(Path::new("a.rs"), Path::new("b.rs")));
        assert!(is_extension_same(Path::new("a.js"), Path::new("b.ts")));
        assert!(is_extension_same(Path::new("a.TS"), Path::new("b.js")));
        assert!(!is_extension_same(Path::new("a.rs"), Path::new("b.go")));
        assert!(!is_extension_same(Path::new("a.jsx"), Path::new("b.ts")));
    }

    #[test]
    fn sample_is_capped_at_limit() {
        let all = paths(&[
            "a.rs", "b.rs", "c.rs", "d.rs", "e.rs", "f.rs", "g.rs", "h.rs", "i.rs", "j.rs",
            "k.html", "l.html", "m.html", "n.html", "o.html", "p.html", "q.html", "r.html",
            "s.html", "t.html",
        ]);
        let sample = sample_files(&all, 18);
        assert_eq!(sample.len(), 18);
        let distinct: HashSet<_> = sample.iter().collect();
        assert_eq!(distinct.len(), 18, "sampling must be without replacement");
    }

    #[test]
    fn sample_splits_between_code_and_rest() {
        let all = paths(&[
            "a.rs", "b.rs", "c.rs", "d.rs", "e.rs", "f.rs", "g.rs", "h.rs", "i.rs", "j.rs",
            "k.html", "l.html", "m.html", "n.html", "o.html", "p.html", "q.html", "r.html",
            "s.html", "t.html",
        ]);
        let sample = sample_files(&all, 18);
        let code = sample.iter().filter(|p| has_code_extension(p)).count();
        assert_eq!(code, 9, "half the sample comes from the code bucket");
    }

    #[test]
    fn sample_backfills_from_code_when_rest_is_short() {
        let all = paths(&[
            "a.rs", "b.rs", "c.rs", "d.rs", "e.rs", "f.rs", "g.rs", "h.rs", "i.rs", "j.rs",
            "k.rs", "l.rs", "m.rs", "n.rs", "o.rs", "p.rs", "q.rs", "r.rs", "only.html",
        ]);
        let sample = sample_files(&all, 18);
        assert_eq!(sample.len(), 18);
    }

    #[test]
    fn sample_of_small_input_returns_everything() {
        let all = paths(&["a.rs", "b.html"]);
        let mut sample = sample_files(&all, 18);
        sample.sort();
        assert_eq!(sample, paths(&["a.rs", "b.html"]));
    }
}
