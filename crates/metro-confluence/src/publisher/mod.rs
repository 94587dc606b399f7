//! Manifest publisher.
//!
//! Brings a wiki in line with a [`Manifest`]: pages are created first (parents
//! before children), then updated, then deleted. Each page is handled on its
//! own; a failure is logged, recorded in the [`PublishReport`] and the run
//! moves on.
//!
//! # Example
//!
//! ```no_run
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! use std::path::Path;
//! use std::time::Duration;
//! use metro_confluence::{ConfluenceClient, PublishOptions, Publisher};
//! use metro_manifest::Manifest;
//!
//! let client = ConfluenceClient::new(
//!     "https://confluence.example.com",
//!     "user",
//!     "secret",
//!     Duration::from_secs(30),
//! );
//! let manifest = Manifest::load(Path::new("docs/manifest.json"))?;
//! let options = PublishOptions {
//!     default_parent_id: Some(123),
//!     dry_run: false,
//! };
//! let report = Publisher::new(&client, options).publish(&manifest);
//! println!("{report}");
//! # Ok(())
//! # }
//! ```

mod report;

pub use report::{Action, Outcome, PublishReport};

use std::path::Path;

use metro_manifest::{Manifest, PagePlan, ParentRef};
use sha2::{Digest, Sha256};
use tracing::{debug, info, warn};

use crate::error::PublishError;
use crate::wiki::Wiki;

/// Publish run settings.
#[derive(Clone, Copy, Debug, Default)]
pub struct PublishOptions {
    /// Parent for created pages that name none.
    pub default_parent_id: Option<u64>,
    /// Read from the wiki but write nothing.
    pub dry_run: bool,
}

/// Applies a manifest to a wiki.
pub struct Publisher<'a, W: Wiki> {
    wiki: &'a W,
    options: PublishOptions,
}

impl<'a, W: Wiki> Publisher<'a, W> {
    #[must_use]
    pub fn new(wiki: &'a W, options: PublishOptions) -> Self {
        Self { wiki, options }
    }

    /// Publish every page of `manifest`.
    pub fn publish(&self, manifest: &Manifest) -> PublishReport {
        let mut report = PublishReport::default();

        // Ids of `to_create` pages, by index, for their planned children.
        let mut created = Vec::with_capacity(manifest.to_create.len());
        for page in &manifest.to_create {
            let mut page_id = None;
            let result = self.create(page, manifest, &created, &mut page_id);
            created.push(page_id);
            report.push(settle(&page.title, result));
        }

        for page in &manifest.to_update {
            let result = page
                .page_id
                .ok_or_else(|| PublishError::NoPageId(page.title.clone()))
                .and_then(|page_id| self.update(page_id, page));
            report.push(settle(&page.title, result));
        }

        for &page_id in &manifest.to_delete {
            report.push(settle(&format!("page {page_id}"), self.delete(page_id)));
        }

        report
    }

    fn create(
        &self,
        page: &PagePlan,
        manifest: &Manifest,
        created: &[Option<u64>],
        page_id: &mut Option<u64>,
    ) -> Result<Outcome, PublishError> {
        let Some(parent_id) = self.resolve_parent(page, manifest, created)? else {
            return Ok(Outcome::Planned {
                action: Action::Create,
                target: format!("\"{}\"", page.title),
            });
        };

        let parent = self.wiki.info(parent_id)?;
        if let Some(&existing) = self.wiki.children(parent_id)?.get(&page.title) {
            *page_id = Some(existing);
            if page.overwrite {
                return self.update(existing, page);
            }
            info!(
                "Page \"{}\" already exists under \"{}\" (id = {})",
                page.title, parent.title, existing
            );
            return Ok(Outcome::Skipped {
                title: page.title.clone(),
                id: existing,
            });
        }

        if self.options.dry_run {
            return Ok(Outcome::Planned {
                action: Action::Create,
                target: format!("\"{}\" under \"{}\"", page.title, parent.title),
            });
        }

        let new_page =
            self.wiki
                .create_page(parent_id, &parent.space.key, &page.title, &page.body)?;
        *page_id = Some(new_page.id);
        info!(
            "Created new page \"{}\" (id = {}) under parent \"{}\"",
            page.title, new_page.id, parent.title
        );

        self.wiki
            .set_checksum(new_page.id, &checksum(&page.title, &page.body), None)?;
        self.sync_files(new_page.id, page, page.overwrite)?;

        Ok(Outcome::Created {
            title: page.title.clone(),
            id: new_page.id,
            url: self.wiki.page_url(new_page.id),
        })
    }

    /// Parent page id for a create. `None` only in a dry run, when the parent
    /// is itself still to be created.
    fn resolve_parent(
        &self,
        page: &PagePlan,
        manifest: &Manifest,
        created: &[Option<u64>],
    ) -> Result<Option<u64>, PublishError> {
        match page.parent {
            Some(ParentRef::Id(id)) => Ok(Some(id)),
            Some(ParentRef::Planned(index)) => match created.get(index).copied().flatten() {
                Some(id) => Ok(Some(id)),
                None if self.options.dry_run => Ok(None),
                None => {
                    let title = manifest
                        .to_create
                        .get(index)
                        .map_or_else(|| format!("#{index}"), |parent| parent.title.clone());
                    Err(PublishError::ParentNotCreated(title))
                }
            },
            None => self
                .options
                .default_parent_id
                .map(Some)
                .ok_or_else(|| PublishError::NoParent(page.title.clone())),
        }
    }

    fn update(&self, page_id: u64, page: &PagePlan) -> Result<Outcome, PublishError> {
        let new_checksum = checksum(&page.title, &page.body);
        let stored = self.wiki.checksum(page_id)?;
        let changed = stored
            .as_ref()
            .is_none_or(|stored| stored.value != new_checksum);

        if self.options.dry_run {
            return Ok(if changed {
                Outcome::Planned {
                    action: Action::Update,
                    target: format!("\"{}\" (id {})", page.title, page_id),
                }
            } else {
                Outcome::Unchanged {
                    title: page.title.clone(),
                    id: page_id,
                }
            });
        }

        let outcome = if changed {
            let current = self.wiki.info(page_id)?;
            let parent_id = self.wiki.ancestors(page_id)?.last().map(|a| a.id);
            self.wiki.update_page(
                page_id,
                &page.title,
                &page.body,
                current.version.number,
                parent_id,
            )?;
            info!(
                "Updated content for page \"{}\" (id = {})",
                page.title, page_id
            );
            self.wiki
                .set_checksum(page_id, &new_checksum, stored.as_ref())?;
            Outcome::Updated {
                title: page.title.clone(),
                id: page_id,
                url: self.wiki.page_url(page_id),
            }
        } else {
            info!(
                "Did not update content for page \"{}\" (identical)",
                page.title
            );
            Outcome::Unchanged {
                title: page.title.clone(),
                id: page_id,
            }
        };

        self.sync_files(page_id, page, true)?;
        Ok(outcome)
    }

    fn delete(&self, page_id: u64) -> Result<Outcome, PublishError> {
        if self.options.dry_run {
            return Ok(Outcome::Planned {
                action: Action::Delete,
                target: format!("page {page_id}"),
            });
        }
        self.wiki.delete_page(page_id)?;
        info!("Deleted page (id = {})", page_id);
        Ok(Outcome::Deleted { id: page_id })
    }

    /// Upload a page's images and attachments.
    fn sync_files(
        &self,
        page_id: u64,
        page: &PagePlan,
        overwrite: bool,
    ) -> Result<(), PublishError> {
        for path in page.images.iter().chain(&page.attachments) {
            self.sync_file(page_id, path, overwrite)?;
        }
        Ok(())
    }

    /// Upload a file unless the page already has it. An existing attachment
    /// is replaced only when `overwrite` is set and its content differs.
    fn sync_file(&self, page_id: u64, path: &Path, overwrite: bool) -> Result<(), PublishError> {
        let filename = path
            .file_name()
            .map_or_else(|| path.display().to_string(), |n| n.to_string_lossy().into_owned());
        let data = std::fs::read(path).map_err(|source| PublishError::Io {
            path: path.display().to_string(),
            source,
        })?;
        let content_type = mime_guess::from_path(path).first_or_octet_stream();

        match self.wiki.attachment(page_id, &filename)? {
            None => {
                self.wiki.upload_attachment(
                    page_id,
                    &filename,
                    &data,
                    content_type.essence_str(),
                    None,
                )?;
                info!("Uploaded new attachment {}", filename);
            }
            Some(existing) if overwrite => {
                if self.wiki.download(&existing)? == data {
                    info!("Did not update attachment {} (identical content)", filename);
                } else {
                    self.wiki.upload_attachment(
                        page_id,
                        &filename,
                        &data,
                        content_type.essence_str(),
                        Some(&existing),
                    )?;
                    info!("Updated attachment {}", filename);
                }
            }
            Some(_) => debug!("Kept existing attachment {}", filename),
        }
        Ok(())
    }
}

/// Turn a page result into an outcome, logging failures.
fn settle(title: &str, result: Result<Outcome, PublishError>) -> Outcome {
    result.unwrap_or_else(|e| {
        warn!("Could not publish \"{}\": {}", title, e);
        Outcome::Failed {
            title: title.to_owned(),
            error: e.to_string(),
        }
    })
}

/// Hex SHA-256 of the published title and body.
fn checksum(title: &str, body: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(title.as_bytes());
    hasher.update(body.as_bytes());
    hex::encode(hasher.finalize())
}
