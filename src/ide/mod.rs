//! The fake editor: a few canned files, a tab strip and a highlighter.

pub mod highlight;
pub mod tabs;

pub use highlight::{highlight, Language};
pub use tabs::OpenTabs;

pub const DEFAULT_FILE: &str = "applique/index.ts";

const NOT_FOUND: &str = "// File not found";

/// Canned editor contents, keyed by path.
pub static FILES: &[(&str, &str)] = &[
    (
        "applique/index.ts",
        r#"import { CourseModule } from './src/course-module';
import { ScormExporter } from './src/scorm-export';

// Entry point: publish every course in the catalog
export async function publishAll(courses: CourseModule[]) {
  const exporter = new ScormExporter({ version: '2004' });
  for (const course of courses) {
    await exporter.publish(course);
  }
  console.log(`published ${courses.length} courses`);
}
"#,
    ),
    (
        "applique/package.json",
        r#"{
  "name": "applique",
  "version": "2.0.0",
  "private": true,
  "scripts": {
    "build": "gulp build",
    "test": "mocha --recursive"
  }
}
"#,
    ),
    (
        "roles/tech-lead.md",
        r#"# Tech Lead

- Owned the authoring tool architecture
- Shipped `SCORM 2004` export
- Mentored a team of five
"#,
    ),
];

pub fn file(path: &str) -> Option<&'static str> {
    FILES.iter().find(|(p, _)| *p == path).map(|(_, body)| *body)
}

/// Highlighted HTML for the file at `path`, or a placeholder comment.
pub fn render(path: &str) -> String {
    match file(path) {
        Some(body) => highlight(body, Language::from_path(path)),
        None => highlight(NOT_FOUND, Language::TypeScript),
    }
}
