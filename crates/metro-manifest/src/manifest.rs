//! Manifest loading and page planning.

use std::fmt;
use std::path::{Path, PathBuf};

use metro_renderer::{MarkdownConverter, TocOptions};
use serde_json::Value;
use tracing::info;

use crate::ManifestError;
use crate::document::{FrontMatter, SourceDocument};
use crate::entry::{Operation, PageEntry};

/// Where a page to create is attached.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ParentRef {
    /// An existing page.
    Id(u64),
    /// The page at this index of [`Manifest::to_create`], created earlier in the run.
    Planned(usize),
}

/// A page to create or update, with its rendered body.
#[derive(Clone, Debug)]
pub struct PagePlan {
    pub title: String,
    /// Confluence storage format.
    pub body: String,
    /// Markdown source the body was rendered from.
    pub source: PathBuf,
    /// Target page; set for updates.
    pub page_id: Option<u64>,
    /// Parent for creates. `None` falls back to the configured default parent.
    pub parent: Option<ParentRef>,
    /// Update a same-titled page under the parent instead of skipping it.
    pub overwrite: bool,
    pub images: Vec<PathBuf>,
    pub attachments: Vec<PathBuf>,
    pub auto_gen: Option<String>,
    pub front_matter: FrontMatter,
}

/// A validated manifest, split into the pages to create, update and delete.
///
/// Creates are ordered so that a page always comes after its planned parent.
#[derive(Debug, Default)]
pub struct Manifest {
    pub to_create: Vec<PagePlan>,
    pub to_update: Vec<PagePlan>,
    /// Ids of pages to delete.
    pub to_delete: Vec<u64>,
}

impl Manifest {
    /// Load, validate and render the manifest at `path`.
    ///
    /// Relative paths in the manifest are resolved against its directory.
    ///
    /// # Errors
    ///
    /// Returns `ManifestError` if the file is missing or unreadable, is not
    /// JSON, describes pages incorrectly, or names unreadable sources.
    pub fn load(path: &Path) -> Result<Self, ManifestError> {
        if !path.is_file() {
            return Err(ManifestError::NotFound(path.to_path_buf()));
        }
        let content = std::fs::read_to_string(path).map_err(|source| ManifestError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let base = path.parent().unwrap_or(Path::new("."));
        let manifest = Self::from_json(&content, base)?;
        info!(
            "Loaded manifest {} ({} to create, {} to update, {} to delete)",
            path.display(),
            manifest.to_create.len(),
            manifest.to_update.len(),
            manifest.to_delete.len()
        );
        Ok(manifest)
    }

    /// Build a manifest from JSON text with paths relative to `base`.
    ///
    /// Every page is validated before any source is rendered.
    ///
    /// # Errors
    ///
    /// See [`Manifest::load`].
    pub fn from_json(json: &str, base: &Path) -> Result<Self, ManifestError> {
        let root: Value = serde_json::from_str(json)?;
        let pages = root
            .get("pages")
            .ok_or_else(|| ManifestError::invalid("The JSON manifest file has no \"pages\" entry."))?
            .as_array()
            .ok_or_else(|| {
                ManifestError::invalid("The \"pages\" entry in the JSON manifest file is not a list.")
            })?;

        let entries = pages
            .iter()
            .map(|page| PageEntry::from_value(page, base))
            .collect::<Result<Vec<_>, _>>()?;

        let converter = MarkdownConverter::new();
        let mut manifest = Self::default();
        for entry in entries {
            let parent = entry.parent_id.map(ParentRef::Id);
            manifest.add(&converter, entry, parent)?;
        }
        Ok(manifest)
    }

    fn add(
        &mut self,
        converter: &MarkdownConverter,
        entry: PageEntry,
        parent: Option<ParentRef>,
    ) -> Result<(), ManifestError> {
        let (Some(file), Operation::Create | Operation::Update) = (&entry.file, entry.operation)
        else {
            if let Some(page_id) = entry.page_id {
                self.to_delete.push(page_id);
            }
            return Ok(());
        };

        let document = SourceDocument::read(file)?;
        let toc = entry.toc.clone().or_else(|| {
            (document.front_matter.toc == Some(true)).then(TocOptions::default)
        });
        let body = converter.render(
            &document.heading_title,
            &document.markdown,
            toc.as_ref(),
            entry.auto_gen.as_deref(),
        );
        let title = entry
            .title
            .clone()
            .or_else(|| document.front_matter.title.clone())
            .unwrap_or_else(|| document.heading_title.clone());

        let plan = PagePlan {
            title,
            body,
            source: file.clone(),
            page_id: entry.page_id,
            parent,
            overwrite: entry.overwrite,
            images: entry.images,
            attachments: entry.attachments,
            auto_gen: entry.auto_gen,
            front_matter: document.front_matter,
        };

        let child_parent = match entry.operation {
            Operation::Create => {
                self.to_create.push(plan);
                Some(ParentRef::Planned(self.to_create.len() - 1))
            }
            _ => {
                let id = plan.page_id;
                self.to_update.push(plan);
                id.map(ParentRef::Id)
            }
        };

        for child in entry.children {
            self.add(converter, child, child_parent)?;
        }
        Ok(())
    }

    /// True when there is nothing to do.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.to_create.is_empty() && self.to_update.is_empty() && self.to_delete.is_empty()
    }

    fn fmt_page(&self, f: &mut fmt::Formatter<'_>, page: &PagePlan) -> fmt::Result {
        writeln!(f, "Page(\"{}\")", page.title)?;
        if let Some(id) = page.page_id {
            writeln!(f, " Page ID: {id}")?;
        }
        match page.parent {
            Some(ParentRef::Id(id)) => writeln!(f, " Parent page ID: {id}")?,
            Some(ParentRef::Planned(index)) => {
                if let Some(parent) = self.to_create.get(index) {
                    writeln!(f, " Parent page: {}", parent.title)?;
                }
            }
            None => {}
        }
        writeln!(f, " Images: {:?}", basenames(&page.images))?;
        writeln!(f, " Attachments: {:?}", basenames(&page.attachments))
    }
}

fn basenames(paths: &[PathBuf]) -> Vec<String> {
    paths
        .iter()
        .filter_map(|path| path.file_name())
        .map(|name| name.to_string_lossy().into_owned())
        .collect()
}

const RULE: &str = "------------------------------------";

impl fmt::Display for Manifest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Metro Manifest:\n")?;

        if !self.to_create.is_empty() {
            writeln!(f, "{RULE}\nThe following pages will be created:\n{RULE}\n")?;
            for page in &self.to_create {
                self.fmt_page(f, page)?;
                writeln!(f)?;
            }
        }
        if !self.to_update.is_empty() {
            writeln!(f, "{RULE}\nThe following pages will be updated:\n{RULE}\n")?;
            for page in &self.to_update {
                self.fmt_page(f, page)?;
                writeln!(f)?;
            }
        }
        if !self.to_delete.is_empty() {
            writeln!(f, "{RULE}\nThe following pages will be deleted:\n{RULE}\n")?;
            for id in &self.to_delete {
                writeln!(f, "Page(ID = {id})\n")?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn write(dir: &Path, name: &str, content: &str) {
        let path = dir.join(name);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).unwrap();
        }
        std::fs::write(path, content).unwrap();
    }

    fn invalid(json: &str) -> String {
        let dir = tempfile::tempdir().unwrap();
        match Manifest::from_json(json, dir.path()) {
            Err(ManifestError::Invalid(message)) => message,
            other => panic!("expected Invalid, got {other:?}"),
        }
    }

    #[test]
    fn test_missing_pages() {
        assert_eq!(invalid("{}"), "The JSON manifest file has no \"pages\" entry.");
    }

    #[test]
    fn test_pages_not_a_list() {
        assert_eq!(
            invalid(r#"{"pages": {}}"#),
            "The \"pages\" entry in the JSON manifest file is not a list."
        );
    }

    #[test]
    fn test_invalid_json() {
        let dir = tempfile::tempdir().unwrap();
        let err = Manifest::from_json("{pages", dir.path()).unwrap_err();
        assert!(matches!(err, ManifestError::Json(_)));
    }

    #[test]
    fn test_load_missing_manifest() {
        let err = Manifest::load(Path::new("/nonexistent/manifest.json")).unwrap_err();
        assert!(matches!(err, ManifestError::NotFound(_)));
    }

    #[test]
    fn test_load_plans_all_operations() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "docs/new.md", "# New Page\n\nHello.\n");
        write(dir.path(), "docs/old.md", "---\ntitle: From Front Matter\n---\n# Old\n\nText.\n");
        write(
            dir.path(),
            "manifest.json",
            r#"{"pages": [
                {"operation": "create", "folder": "docs", "file": "new.md", "parent_id": 100},
                {"operation": "update", "folder": "docs", "file": "old.md", "page_id": "200"},
                {"operation": "delete", "page_id": 300}
            ]}"#,
        );

        let manifest = Manifest::load(&dir.path().join("manifest.json")).unwrap();

        assert_eq!(manifest.to_create.len(), 1);
        let created = &manifest.to_create[0];
        assert_eq!(created.title, "New Page");
        assert_eq!(created.parent, Some(ParentRef::Id(100)));
        assert_eq!(created.body, "<p>Hello.</p>\n");

        assert_eq!(manifest.to_update.len(), 1);
        let updated = &manifest.to_update[0];
        assert_eq!(updated.title, "From Front Matter");
        assert_eq!(updated.page_id, Some(200));
        assert_eq!(updated.body, "<p>Text.</p>\n");

        assert_eq!(manifest.to_delete, vec![300]);
    }

    #[test]
    fn test_manifest_title_wins() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "a.md", "---\ntitle: Front\n---\n# Heading\n");
        let manifest = Manifest::from_json(
            r#"{"pages": [{"operation": "create", "file": "a.md", "title": "Manifest"}]}"#,
            dir.path(),
        )
        .unwrap();
        assert_eq!(manifest.to_create[0].title, "Manifest");
    }

    #[test]
    fn test_children_follow_parent() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "root.md", "# Root\n");
        write(dir.path(), "child.md", "# Child\n");
        write(dir.path(), "grandchild.md", "# Grandchild\n");
        write(dir.path(), "existing.md", "# Existing\n");
        let manifest = Manifest::from_json(
            r#"{"pages": [
                {"operation": "create", "file": "root.md", "parent_id": 1, "children": [
                    {"operation": "create", "file": "child.md", "children": [
                        {"operation": "create", "file": "grandchild.md"}
                    ]}
                ]},
                {"operation": "update", "file": "existing.md", "page_id": 50, "children": [
                    {"operation": "create", "file": "child.md", "title": "Under existing"}
                ]}
            ]}"#,
            dir.path(),
        )
        .unwrap();

        let parents: Vec<_> = manifest
            .to_create
            .iter()
            .map(|p| (p.title.as_str(), p.parent))
            .collect();
        assert_eq!(
            parents,
            vec![
                ("Root", Some(ParentRef::Id(1))),
                ("Child", Some(ParentRef::Planned(0))),
                ("Grandchild", Some(ParentRef::Planned(1))),
                ("Under existing", Some(ParentRef::Id(50))),
            ]
        );
    }

    #[test]
    fn test_toc_and_banner_rendered() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "a.md", "# A\n\nBody.\n");
        let manifest = Manifest::from_json(
            r#"{"pages": [{"operation": "create", "file": "a.md",
                "table_of_contents": {"min_level": 2},
                "auto_gen": "https://github.com/org/repo/blob/main/a.md"}]}"#,
            dir.path(),
        )
        .unwrap();
        let body = &manifest.to_create[0].body;
        assert!(body.starts_with(r#"<ac:structured-macro ac:name="panel">"#));
        assert!(body.contains(r#"<ac:parameter ac:name="minLevel">2</ac:parameter>"#));
        assert!(body.ends_with("<p>Body.</p>\n"));
    }

    #[test]
    fn test_front_matter_toc_enables_default_toc() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "a.md", "---\ntoc: true\n---\n# A\n");
        let manifest = Manifest::from_json(
            r#"{"pages": [{"operation": "create", "file": "a.md"}]}"#,
            dir.path(),
        )
        .unwrap();
        assert!(manifest.to_create[0].body.contains(r#"ac:name="toc""#));
    }

    #[test]
    fn test_validation_happens_before_rendering() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "a.md", "# A\n");
        let message = invalid_in(
            dir.path(),
            r#"{"pages": [{"operation": "create", "file": "a.md"}, {"operation": "bogus"}]}"#,
        );
        assert!(message.contains("Invalid operation"));
    }

    fn invalid_in(dir: &Path, json: &str) -> String {
        match Manifest::from_json(json, dir) {
            Err(ManifestError::Invalid(message)) => message,
            other => panic!("expected Invalid, got {other:?}"),
        }
    }

    #[test]
    fn test_display() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "a.md", "# Parent\n");
        write(dir.path(), "b.md", "# Child\n");
        write(dir.path(), "img/shot.png", "png");
        let manifest = Manifest::from_json(
            r#"{"pages": [
                {"operation": "create", "file": "a.md", "parent_id": 9, "images": ["img/shot.png"],
                 "children": [{"operation": "create", "file": "b.md"}]},
                {"operation": "delete", "page_id": 77}
            ]}"#,
            dir.path(),
        )
        .unwrap();

        assert_eq!(
            manifest.to_string(),
            concat!(
                "Metro Manifest:\n\n",
                "------------------------------------\n",
                "The following pages will be created:\n",
                "------------------------------------\n\n",
                "Page(\"Parent\")\n",
                " Parent page ID: 9\n",
                " Images: [\"shot.png\"]\n",
                " Attachments: []\n\n",
                "Page(\"Child\")\n",
                " Parent page: Parent\n",
                " Images: []\n",
                " Attachments: []\n\n",
                "------------------------------------\n",
                "The following pages will be deleted:\n",
                "------------------------------------\n\n",
                "Page(ID = 77)\n\n",
            )
        );
    }

    #[test]
    fn test_empty_pages() {
        let dir = tempfile::tempdir().unwrap();
        let manifest = Manifest::from_json(r#"{"pages": []}"#, dir.path()).unwrap();
        assert!(manifest.is_empty());
    }
}
