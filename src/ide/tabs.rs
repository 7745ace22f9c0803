/// Editor tab strip: ordered open paths plus the focused one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OpenTabs {
    tabs: Vec<String>,
    active: String,
}

impl OpenTabs {
    pub fn new(initial: &str) -> Self {
        Self { tabs: vec![initial.to_owned()], active: initial.to_owned() }
    }

    pub fn tabs(&self) -> &[String] {
        &self.tabs
    }

    pub fn active(&self) -> &str {
        &self.active
    }

    /// Focuses `path`, appending a tab the first time.
    pub fn open(&mut self, path: &str) {
        if !self.tabs.iter().any(|t| t == path) {
            self.tabs.push(path.to_owned());
        }
        self.active = path.to_owned();
    }

    /// Closing the focused tab focuses the last remaining one. Closing the
    /// only tab leaves the editor pointing at it.
    pub fn close(&mut self, path: &str) {
        self.tabs.retain(|t| t != path);
        if self.active == path {
            if let Some(last) = self.tabs.last() {
                self.active = last.clone();
            }
        }
    }
}

/// Tab label: the file name part of a path.
pub fn file_name(path: &str) -> &str {
    path.rsplit('/').next().unwrap_or(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn open_is_idempotent() {
        let mut t = OpenTabs::new("a.ts");
        t.open("b.json");
        t.open("a.ts");
        assert_eq!(t.tabs(), ["a.ts", "b.json"]);
        assert_eq!(t.active(), "a.ts");
    }

    #[test]
    fn closing_active_focuses_last() {
        let mut t = OpenTabs::new("a.ts");
        t.open("b.json");
        t.open("c.md");
        t.open("a.ts");
        t.close("a.ts");
        assert_eq!(t.active(), "c.md");
        t.close("b.json");
        assert_eq!(t.active(), "c.md");
        t.close("c.md");
        assert!(t.tabs().is_empty());
        assert_eq!(t.active(), "c.md");
    }

    #[test]
    fn labels() {
        assert_eq!(file_name("applique/src/course-module.ts"), "course-module.ts");
        assert_eq!(file_name(".env"), ".env");
    }
}
