//! In-memory [`Wiki`] for tests.

use std::collections::{BTreeMap, HashSet};
use std::sync::{Mutex, MutexGuard, PoisonError};

use crate::error::ConfluenceError;
use crate::types::{Ancestor, Attachment, AttachmentLinks, Checksum, PageInfo, Space, Version};
use crate::wiki::Wiki;

/// First id handed out to created pages.
const FIRST_CREATED_ID: u64 = 1000;

/// A page held by [`MockWiki`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MockPage {
    pub title: String,
    pub body: String,
    pub version: u32,
    pub parent: Option<u64>,
    pub space: String,
}

/// Write calls made against a [`MockWiki`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct MockCalls {
    pub creates: usize,
    pub updates: usize,
    pub deletes: usize,
    pub checksum_writes: usize,
    pub uploads: usize,
}

#[derive(Debug)]
struct StoredAttachment {
    page_id: u64,
    filename: String,
    data: Vec<u8>,
}

#[derive(Debug, Default)]
struct State {
    pages: BTreeMap<u64, MockPage>,
    checksums: BTreeMap<u64, Checksum>,
    attachments: BTreeMap<String, StoredAttachment>,
    failing_titles: HashSet<String>,
    next_id: u64,
    calls: MockCalls,
}

/// Page tree kept in memory, with the same error behavior as a server:
/// unknown pages are 404 and stale versions are 409.
#[derive(Debug)]
pub struct MockWiki {
    state: Mutex<State>,
}

impl Default for MockWiki {
    fn default() -> Self {
        Self::new()
    }
}

impl MockWiki {
    #[must_use]
    pub fn new() -> Self {
        Self {
            state: Mutex::new(State {
                next_id: FIRST_CREATED_ID,
                ..State::default()
            }),
        }
    }

    /// Add an existing page.
    #[must_use]
    pub fn with_page(self, id: u64, parent: Option<u64>, title: &str, body: &str) -> Self {
        self.lock().pages.insert(
            id,
            MockPage {
                title: title.to_owned(),
                body: body.to_owned(),
                version: 1,
                parent,
                space: "DOC".to_owned(),
            },
        );
        self
    }

    /// Store a checksum on an existing page.
    #[must_use]
    pub fn with_checksum(self, page_id: u64, value: &str) -> Self {
        self.lock().checksums.insert(
            page_id,
            Checksum {
                value: value.to_owned(),
                version: Version { number: 1 },
            },
        );
        self
    }

    /// Attach a file to an existing page.
    #[must_use]
    pub fn with_attachment(self, page_id: u64, filename: &str, data: &[u8]) -> Self {
        self.lock().attachments.insert(
            attachment_id(page_id, filename),
            StoredAttachment {
                page_id,
                filename: filename.to_owned(),
                data: data.to_vec(),
            },
        );
        self
    }

    /// Reject creates and updates of pages with this title with a 500.
    #[must_use]
    pub fn failing_on(self, title: &str) -> Self {
        self.lock().failing_titles.insert(title.to_owned());
        self
    }

    #[must_use]
    pub fn page(&self, id: u64) -> Option<MockPage> {
        self.lock().pages.get(&id).cloned()
    }

    /// Id of the page titled `title`, if exactly one exists.
    #[must_use]
    pub fn find(&self, title: &str) -> Option<u64> {
        let state = self.lock();
        let mut ids = state
            .pages
            .iter()
            .filter(|(_, page)| page.title == title)
            .map(|(id, _)| *id);
        let id = ids.next()?;
        ids.next().is_none().then_some(id)
    }

    #[must_use]
    pub fn checksum_value(&self, page_id: u64) -> Option<String> {
        self.lock()
            .checksums
            .get(&page_id)
            .map(|checksum| checksum.value.clone())
    }

    #[must_use]
    pub fn attachment_data(&self, page_id: u64, filename: &str) -> Option<Vec<u8>> {
        self.lock()
            .attachments
            .get(&attachment_id(page_id, filename))
            .map(|stored| stored.data.clone())
    }

    #[must_use]
    pub fn calls(&self) -> MockCalls {
        self.lock().calls
    }

    fn lock(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn check_writable(state: &State, title: &str) -> Result<(), ConfluenceError> {
        if state.failing_titles.contains(title) {
            return Err(ConfluenceError::HttpResponse {
                status: 500,
                body: format!("cannot store \"{title}\""),
            });
        }
        Ok(())
    }
}

fn attachment_id(page_id: u64, filename: &str) -> String {
    format!("att{page_id}-{filename}")
}

fn not_found(what: &str) -> ConfluenceError {
    ConfluenceError::HttpResponse {
        status: 404,
        body: format!("No content found: {what}"),
    }
}

fn page_info(id: u64, page: &MockPage) -> PageInfo {
    PageInfo {
        id,
        title: page.title.clone(),
        version: Version {
            number: page.version,
        },
        space: Space {
            key: page.space.clone(),
        },
    }
}

fn to_attachment(id: &str, stored: &StoredAttachment) -> Attachment {
    Attachment {
        id: id.to_owned(),
        title: stored.filename.clone(),
        links: AttachmentLinks {
            download: Some(format!(
                "/download/attachments/{}/{}",
                stored.page_id, stored.filename
            )),
        },
    }
}

impl Wiki for MockWiki {
    fn info(&self, page_id: u64) -> Result<PageInfo, ConfluenceError> {
        let state = self.lock();
        let page = state
            .pages
            .get(&page_id)
            .ok_or_else(|| not_found(&format!("page {page_id}")))?;
        Ok(page_info(page_id, page))
    }

    fn ancestors(&self, page_id: u64) -> Result<Vec<Ancestor>, ConfluenceError> {
        let state = self.lock();
        let mut current = state
            .pages
            .get(&page_id)
            .ok_or_else(|| not_found(&format!("page {page_id}")))?
            .parent;

        let mut ancestors = Vec::new();
        while let Some(id) = current {
            let Some(page) = state.pages.get(&id) else {
                break;
            };
            ancestors.push(Ancestor {
                id,
                title: page.title.clone(),
            });
            current = page.parent;
        }
        ancestors.reverse();
        Ok(ancestors)
    }

    fn children(&self, page_id: u64) -> Result<BTreeMap<String, u64>, ConfluenceError> {
        let state = self.lock();
        if !state.pages.contains_key(&page_id) {
            return Err(not_found(&format!("page {page_id}")));
        }
        Ok(state
            .pages
            .iter()
            .filter(|(_, page)| page.parent == Some(page_id))
            .map(|(id, page)| (page.title.clone(), *id))
            .collect())
    }

    fn create_page(
        &self,
        parent_id: u64,
        space_key: &str,
        title: &str,
        body: &str,
    ) -> Result<PageInfo, ConfluenceError> {
        let mut state = self.lock();
        Self::check_writable(&state, title)?;
        if !state.pages.contains_key(&parent_id) {
            return Err(not_found(&format!("parent {parent_id}")));
        }

        let id = state.next_id;
        state.next_id += 1;
        state.calls.creates += 1;
        let page = MockPage {
            title: title.to_owned(),
            body: body.to_owned(),
            version: 1,
            parent: Some(parent_id),
            space: space_key.to_owned(),
        };
        let info = page_info(id, &page);
        state.pages.insert(id, page);
        Ok(info)
    }

    fn update_page(
        &self,
        page_id: u64,
        title: &str,
        body: &str,
        version: u32,
        parent_id: Option<u64>,
    ) -> Result<PageInfo, ConfluenceError> {
        let mut state = self.lock();
        Self::check_writable(&state, title)?;
        state.calls.updates += 1;

        let page = state
            .pages
            .get_mut(&page_id)
            .ok_or_else(|| not_found(&format!("page {page_id}")))?;
        if page.version != version {
            return Err(ConfluenceError::HttpResponse {
                status: 409,
                body: format!("version {version} is stale, current is {}", page.version),
            });
        }
        page.title = title.to_owned();
        page.body = body.to_owned();
        page.version += 1;
        if parent_id.is_some() {
            page.parent = parent_id;
        }
        Ok(page_info(page_id, page))
    }

    fn delete_page(&self, page_id: u64) -> Result<(), ConfluenceError> {
        let mut state = self.lock();
        state
            .pages
            .remove(&page_id)
            .ok_or_else(|| not_found(&format!("page {page_id}")))?;
        state.calls.deletes += 1;
        state.checksums.remove(&page_id);
        state
            .attachments
            .retain(|_, stored| stored.page_id != page_id);
        Ok(())
    }

    fn checksum(&self, page_id: u64) -> Result<Option<Checksum>, ConfluenceError> {
        Ok(self.lock().checksums.get(&page_id).cloned())
    }

    fn set_checksum(
        &self,
        page_id: u64,
        value: &str,
        existing: Option<&Checksum>,
    ) -> Result<(), ConfluenceError> {
        let mut state = self.lock();
        let number = existing.map_or(1, |checksum| checksum.version.number + 1);
        state.calls.checksum_writes += 1;
        state.checksums.insert(
            page_id,
            Checksum {
                value: value.to_owned(),
                version: Version { number },
            },
        );
        Ok(())
    }

    fn attachment(
        &self,
        page_id: u64,
        filename: &str,
    ) -> Result<Option<Attachment>, ConfluenceError> {
        let id = attachment_id(page_id, filename);
        Ok(self
            .lock()
            .attachments
            .get(&id)
            .map(|stored| to_attachment(&id, stored)))
    }

    fn download(&self, attachment: &Attachment) -> Result<Vec<u8>, ConfluenceError> {
        self.lock()
            .attachments
            .get(&attachment.id)
            .map(|stored| stored.data.clone())
            .ok_or_else(|| not_found(&attachment.id))
    }

    fn upload_attachment(
        &self,
        page_id: u64,
        filename: &str,
        data: &[u8],
        _content_type: &str,
        _existing: Option<&Attachment>,
    ) -> Result<Attachment, ConfluenceError> {
        let mut state = self.lock();
        if !state.pages.contains_key(&page_id) {
            return Err(not_found(&format!("page {page_id}")));
        }
        state.calls.uploads += 1;

        let id = attachment_id(page_id, filename);
        let stored = StoredAttachment {
            page_id,
            filename: filename.to_owned(),
            data: data.to_vec(),
        };
        let attachment = to_attachment(&id, &stored);
        state.attachments.insert(id, stored);
        Ok(attachment)
    }

    fn page_url(&self, page_id: u64) -> String {
        format!("https://wiki.test/pages/viewpage.action?pageId={page_id}")
    }
}
