//! Input file classification

use std::path::Path;

/// Kinds of input the extractor understands
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SourceKind {
    /// JavaScript (.js, .mjs, .cjs, and anything unrecognised)
    JavaScript,
    /// JavaScript with JSX (.jsx, .mjsx, .cjsx)
    JavaScriptReact,
    /// TypeScript (.ts, .mts, .cts)
    TypeScript,
    /// TypeScript with JSX (.tsx, .mtsx, .ctsx)
    TypeScriptReact,
    /// HTML page with inline `<script>` blocks (.html, .htm, .xhtml)
    Html,
}

impl SourceKind {
    /// Classify by file extension
    ///
    /// Returns `None` if the extension is not recognized.
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_ascii_lowercase().as_str() {
            "js" | "mjs" | "cjs" => Some(SourceKind::JavaScript),
            "jsx" | "mjsx" | "cjsx" => Some(SourceKind::JavaScriptReact),
            "ts" | "mts" | "cts" => Some(SourceKind::TypeScript),
            "tsx" | "mtsx" | "ctsx" => Some(SourceKind::TypeScriptReact),
            "html" | "htm" | "xhtml" => Some(SourceKind::Html),
            _ => None,
        }
    }

    /// Classify a path, treating unknown extensions as plain JavaScript
    pub fn from_path(path: &Path) -> Self {
        path.extension()
            .and_then(|ext| ext.to_str())
            .and_then(Self::from_extension)
            .unwrap_or(SourceKind::JavaScript)
    }

    pub fn is_html(&self) -> bool {
        matches!(self, SourceKind::Html)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_extension() {
        assert_eq!(SourceKind::from_extension("js"), Some(SourceKind::JavaScript));
        assert_eq!(SourceKind::from_extension("cjs"), Some(SourceKind::JavaScript));
        assert_eq!(SourceKind::from_extension("jsx"), Some(SourceKind::JavaScriptReact));
        assert_eq!(SourceKind::from_extension("mts"), Some(SourceKind::TypeScript));
        assert_eq!(SourceKind::from_extension("tsx"), Some(SourceKind::TypeScriptReact));
        assert_eq!(SourceKind::from_extension("HTML"), Some(SourceKind::Html));
        assert_eq!(SourceKind::from_extension("py"), None);
    }

    #[test]
    fn test_from_path_defaults_to_javascript() {
        assert_eq!(SourceKind::from_path(Path::new("lib/app.ts")), SourceKind::TypeScript);
        assert_eq!(SourceKind::from_path(Path::new("page.htm")), SourceKind::Html);
        assert_eq!(SourceKind::from_path(Path::new("script")), SourceKind::JavaScript);
        assert_eq!(SourceKind::from_path(Path::new("notes.txt")), SourceKind::JavaScript);
    }
}
