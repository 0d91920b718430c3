/*!
 * Static table of project-type rules
 */

use once_cell::sync::Lazy;

/// A manifest shared by several ecosystems that only counts fully when it
/// mentions a specific dependency
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ManifestCheck {
    /// Manifest file name, relative to the project root
    pub file: &'static str,
    /// Text the manifest must contain, compared case-insensitively
    pub needle: &'static str,
}

/// Heuristic profile for one ecosystem
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectRule {
    /// Display name, also the key into the ignore defaults table
    pub name: &'static str,
    /// Tie-break weight between candidates of similar confidence
    pub priority: i32,
    /// Files (literal or glob) at the project root
    pub file_patterns: &'static [&'static str],
    /// Directories relative to the project root
    pub folder_patterns: &'static [&'static str],
    /// Globs tested against a shallow recursive listing of file names
    pub content_patterns: &'static [&'static str],
    /// Secondary check for a generic manifest in `file_patterns`
    pub manifest_check: Option<ManifestCheck>,
    /// Build files only count when a source file was also seen
    pub requires_source: bool,
}

impl ProjectRule {
    const fn new(name: &'static str, priority: i32) -> Self {
        Self {
            name,
            priority,
            file_patterns: &[],
            folder_patterns: &[],
            content_patterns: &[],
            manifest_check: None,
            requires_source: false,
        }
    }

    const fn files(mut self, patterns: &'static [&'static str]) -> Self {
        self.file_patterns = patterns;
        self
    }

    const fn folders(mut self, patterns: &'static [&'static str]) -> Self {
        self.folder_patterns = patterns;
        self
    }

    const fn content(mut self, patterns: &'static [&'static str]) -> Self {
        self.content_patterns = patterns;
        self
    }

    const fn manifest(mut self, file: &'static str, needle: &'static str) -> Self {
        self.manifest_check = Some(ManifestCheck { file, needle });
        self
    }

    const fn requires_source(mut self) -> Self {
        self.requires_source = true;
        self
    }
}

/// Directory names the content scan is allowed to descend into
pub const SOURCE_DIRS: &[&str] = &[
    "src",
    "lib",
    "app",
    "source",
    "sources",
    "include",
    "pkg",
    "cmd",
    "internal",
    "components",
    "scripts",
    "test",
    "tests",
];

/// Maximum depth of the content scan below the project root
pub const CONTENT_SCAN_DEPTH: usize = 2;

/// All known project rules
pub static RULES: Lazy<Vec<ProjectRule>> = Lazy::new(|| {
    vec![
        ProjectRule::new("React", 10)
            .files(&["package.json"])
            .manifest("package.json", "\"react\"")
            .content(&["*.jsx", "*.tsx"]),
        ProjectRule::new("Vue", 10)
            .files(&["package.json", "vue.config.js"])
            .manifest("package.json", "\"vue\"")
            .content(&["*.vue"]),
        ProjectRule::new("Angular", 10)
            .files(&["angular.json"])
            .content(&["*.component.ts"]),
        ProjectRule::new("Next.js", 11)
            .files(&["next.config.js", "next.config.mjs", "next.config.ts"])
            .folders(&[".next", "pages"]),
        ProjectRule::new("TypeScript", 9)
            .files(&["tsconfig.json"])
            .content(&["*.ts", "*.tsx"]),
        ProjectRule::new("Node.js", 8)
            .files(&["package.json", "package-lock.json", "yarn.lock", "pnpm-lock.yaml"])
            .folders(&["node_modules"])
            .content(&["*.js", "*.mjs", "*.cjs"]),
        ProjectRule::new("Python", 8)
            .files(&["pyproject.toml", "requirements.txt", "setup.py", "Pipfile"])
            .folders(&[".venv", "venv", "__pycache__"])
            .content(&["*.py"]),
        ProjectRule::new("Django", 10)
            .files(&["manage.py", "requirements.txt"])
            .manifest("requirements.txt", "django")
            .content(&["settings.py", "wsgi.py"]),
        ProjectRule::new("Rust", 9)
            .files(&["Cargo.toml"])
            .folders(&["target"])
            .content(&["*.rs"]),
        ProjectRule::new("Go", 9)
            .files(&["go.mod", "go.sum"])
            .folders(&["vendor"])
            .content(&["*.go"]),
        ProjectRule::new("Java", 8)
            .files(&["pom.xml", "build.gradle", "gradlew"])
            .folders(&["src/main/java", ".gradle"])
            .content(&["*.java"]),
        ProjectRule::new("Kotlin", 9)
            .files(&["build.gradle.kts", "settings.gradle.kts"])
            .folders(&["src/main/kotlin"])
            .content(&["*.kt", "*.kts"]),
        ProjectRule::new("C/C++", 7)
            .files(&["CMakeLists.txt", "Makefile", "makefile", "configure.ac", "meson.build"])
            .content(&["*.c", "*.cpp", "*.cc", "*.cxx", "*.h", "*.hpp"])
            .requires_source(),
        ProjectRule::new(".NET", 8)
            .files(&["*.sln", "*.csproj", "*.fsproj", "global.json"])
            .folders(&["obj", "Properties"])
            .content(&["*.cs", "*.fs"]),
        ProjectRule::new("PHP", 8)
            .files(&["composer.json", "artisan"])
            .folders(&["vendor"])
            .content(&["*.php"]),
        ProjectRule::new("Ruby", 8)
            .files(&["Gemfile", "Rakefile", "*.gemspec"])
            .folders(&[".bundle"])
            .content(&["*.rb"]),
        ProjectRule::new("Swift", 8)
            .files(&["Package.swift", "Podfile"])
            .folders(&["Pods", ".build"])
            .content(&["*.swift"]),
        ProjectRule::new("Flutter", 9)
            .files(&["pubspec.yaml"])
            .folders(&[".dart_tool"])
            .content(&["*.dart"]),
        ProjectRule::new("Elixir", 8)
            .files(&["mix.exs"])
            .folders(&["_build", "deps"])
            .content(&["*.ex", "*.exs"]),
    ]
});

/// Look up a rule by name
pub fn find_rule(name: &str) -> Option<&'static ProjectRule> {
    RULES.iter().find(|rule| rule.name == name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_rule_names_are_unique() {
        let names: HashSet<_> = RULES.iter().map(|r| r.name).collect();
        assert_eq!(names.len(), RULES.len());
    }

    #[test]
    fn test_manifest_checks_reference_declared_files() {
        for rule in RULES.iter() {
            if let Some(check) = rule.manifest_check {
                assert!(
                    rule.file_patterns.contains(&check.file),
                    "{} checks an undeclared manifest",
                    rule.name
                );
            }
        }
    }

    #[test]
    fn test_source_gated_rules_declare_sources() {
        for rule in RULES.iter().filter(|r| r.requires_source) {
            assert!(!rule.content_patterns.is_empty(), "{}", rule.name);
        }
    }

    #[test]
    fn test_find_rule() {
        assert_eq!(find_rule("Go").map(|r| r.priority), Some(9));
        assert!(find_rule("Cobol").is_none());
    }
}
