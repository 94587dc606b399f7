//! Validation of individual page objects.
//!
//! Entries are checked field by field against the JSON value so each mistake
//! gets a precise message, then converted into a typed [`PageEntry`] with
//! paths resolved against the manifest directory.

use std::path::{Path, PathBuf};

use metro_renderer::TocOptions;
use serde::Deserialize;
use serde_json::{Map, Value};

use crate::ManifestError;

/// What to do with a page.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Operation {
    Create,
    Update,
    Delete,
}

impl Operation {
    fn parse(value: &Value) -> Result<Self, ManifestError> {
        match value.as_str() {
            Some("create") => Ok(Self::Create),
            Some("update") => Ok(Self::Update),
            Some("delete") => Ok(Self::Delete),
            _ => Err(ManifestError::invalid(format!(
                "Invalid operation found for manifest page: {value}"
            ))),
        }
    }

    fn as_str(self) -> &'static str {
        match self {
            Self::Create => "create",
            Self::Update => "update",
            Self::Delete => "delete",
        }
    }
}

/// A validated page object.
#[derive(Debug)]
pub(crate) struct PageEntry {
    pub operation: Operation,
    /// Markdown source; present for create and update.
    pub file: Option<PathBuf>,
    pub page_id: Option<u64>,
    pub parent_id: Option<u64>,
    pub title: Option<String>,
    pub overwrite: bool,
    pub images: Vec<PathBuf>,
    pub attachments: Vec<PathBuf>,
    /// `None` when absent or `false`.
    pub toc: Option<TocOptions>,
    pub auto_gen: Option<String>,
    pub children: Vec<PageEntry>,
}

impl PageEntry {
    /// Validate a page object whose relative paths start at `base`.
    pub(crate) fn from_value(value: &Value, base: &Path) -> Result<Self, ManifestError> {
        let page = value.as_object().ok_or_else(|| {
            ManifestError::invalid(
                "Each page in the \"pages\" entry for the JSON manifest file must be a JSON object.",
            )
        })?;

        let operation = Operation::parse(page.get("operation").ok_or_else(|| {
            ManifestError::invalid("A page in the manifest is missing the \"operation\" entry.")
        })?)?;

        let needs_file = matches!(operation, Operation::Create | Operation::Update);
        let needs_id = matches!(operation, Operation::Update | Operation::Delete);
        if needs_id && !page.contains_key("page_id") {
            return Err(ManifestError::invalid(format!(
                "The \"{}\" operation for a page requires a page_id.",
                operation.as_str()
            )));
        }
        if needs_file && !page.contains_key("file") {
            return Err(ManifestError::invalid(format!(
                "The \"{}\" operation for a page requires a file.",
                operation.as_str()
            )));
        }

        let page_id = optional_id(page, "page_id")?;
        let parent_id = optional_id(page, "parent_id")?;
        let title = optional_string(page, "title")?.map(str::to_owned);

        let folder = match optional_string(page, "folder")? {
            Some(name) => {
                let folder = base.join(name);
                if !folder.is_dir() {
                    return Err(ManifestError::invalid(format!(
                        "The page folder {} is not a valid directory.",
                        folder.display()
                    )));
                }
                folder
            }
            None => base.to_path_buf(),
        };

        let file = match optional_string(page, "file")? {
            Some(name) => {
                let path = folder.join(name);
                if !path.is_file() {
                    return Err(ManifestError::invalid(format!(
                        "The page file {} is not a valid file.",
                        path.display()
                    )));
                }
                Some(path)
            }
            None => None,
        };

        let overwrite = match page.get("overwrite") {
            None => false,
            Some(Value::Bool(flag)) => *flag,
            Some(Value::String(flag)) if flag == "true" => true,
            Some(Value::String(flag)) if flag == "false" => false,
            Some(_) => {
                return Err(ManifestError::invalid(
                    "The \"overwrite\" page attribute must be true or false.",
                ));
            }
        };

        let images = path_list(page, "images", &folder)?;
        if let Some(image) = images.iter().find(|image| !is_supported_image(image)) {
            return Err(ManifestError::invalid(format!(
                "Page image {} is not a PNG or JPEG file.",
                image.display()
            )));
        }
        let attachments = path_list(page, "attachments", &folder)?;

        let toc = match page.get("table_of_contents") {
            None | Some(Value::Bool(false) | Value::Null) => None,
            Some(Value::Bool(true)) => Some(TocOptions::default()),
            Some(options) if options.is_object() => {
                Some(TocOptions::deserialize(options).map_err(|e| {
                    ManifestError::invalid(format!(
                        "The \"table_of_contents\" attribute for a page is invalid: {e}"
                    ))
                })?)
            }
            Some(_) => {
                return Err(ManifestError::invalid(
                    "The \"table_of_contents\" attribute for a page must be an object or a boolean.",
                ));
            }
        };

        let auto_gen = match page.get("auto_gen") {
            None => None,
            Some(Value::String(uri)) if uri.starts_with("https://") => Some(uri.clone()),
            Some(_) => {
                return Err(ManifestError::invalid(
                    "The \"auto_gen\" attribute for a page must be an https URI.",
                ));
            }
        };

        let children = match page.get("children") {
            None => Vec::new(),
            Some(Value::Array(children)) => children
                .iter()
                .map(|child| Self::from_value(child, base))
                .collect::<Result<_, _>>()?,
            Some(_) => {
                return Err(ManifestError::invalid(
                    "The \"children\" attribute for a page must be a list.",
                ));
            }
        };

        Ok(Self {
            operation,
            file,
            page_id,
            parent_id,
            title,
            overwrite,
            images,
            attachments,
            toc,
            auto_gen,
            children,
        })
    }
}

/// Read a non-negative id given as a JSON integer or numeric string.
fn optional_id(page: &Map<String, Value>, key: &str) -> Result<Option<u64>, ManifestError> {
    let Some(value) = page.get(key) else {
        return Ok(None);
    };
    let id = match value {
        Value::Number(n) => n.as_u64(),
        Value::String(s) => s.trim().parse::<u64>().ok(),
        _ => None,
    };
    id.map(Some).ok_or_else(|| {
        ManifestError::invalid(format!(
            "The \"{key}\" attribute for a page must be a non-negative integer."
        ))
    })
}

fn optional_string<'a>(
    page: &'a Map<String, Value>,
    key: &str,
) -> Result<Option<&'a str>, ManifestError> {
    match page.get(key) {
        None => Ok(None),
        Some(Value::String(s)) => Ok(Some(s)),
        Some(_) => Err(ManifestError::invalid(format!(
            "The \"{key}\" attribute for a page must be a string."
        ))),
    }
}

/// Resolve a list of file names against `folder`, requiring each to exist.
fn path_list(
    page: &Map<String, Value>,
    key: &str,
    folder: &Path,
) -> Result<Vec<PathBuf>, ManifestError> {
    let Some(value) = page.get(key) else {
        return Ok(Vec::new());
    };
    let not_a_list = || {
        ManifestError::invalid(format!(
            "The \"{key}\" attribute for a page must be a list."
        ))
    };
    let names = value.as_array().ok_or_else(not_a_list)?;

    names
        .iter()
        .map(|name| {
            let name = name.as_str().ok_or_else(not_a_list)?;
            let path = folder.join(name);
            if path.is_file() {
                Ok(path)
            } else {
                Err(ManifestError::invalid(format!(
                    "Page {} {name} not found.",
                    key.trim_end_matches('s')
                )))
            }
        })
        .collect()
}

fn is_supported_image(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("png") || ext.eq_ignore_ascii_case("jpg"))
}
