//! Form bodies that may carry files, and storage of uploaded images.

use guid_create::GUID;
use image::ImageFormat;
use multipart::server::{
    save::{SaveResult, SavedData},
    Multipart,
};
use rocket::{http::ContentType, Data};
use std::{
    collections::HashMap,
    fs,
    io::{self, Read},
    path::{Path, PathBuf},
};
use tracing::warn;
use url::form_urlencoded;
use yatube_models::{config::limits, Error, Result};

/// A file sent with a form.
#[derive(Clone, Debug, PartialEq)]
pub struct Upload {
    pub filename: Option<String>,
    pub bytes: Vec<u8>,
}

/// A submitted form: its text fields, url-encoded whatever the request
/// encoding was, and its files.
#[derive(Debug, Default)]
pub struct FormBody {
    pub encoded: String,
    pub files: HashMap<String, Upload>,
}

impl FormBody {
    /// Reads an `application/x-www-form-urlencoded` or `multipart/form-data`
    /// body. Other bodies are read as an empty form.
    pub fn read(data: Data, ct: &ContentType) -> Result<FormBody> {
        let limits = limits();
        if ct.is_form_data() {
            let boundary = ct
                .params()
                .find(|&(k, _)| k == "boundary")
                .map(|(_, v)| v)
                .ok_or(Error::InvalidValue)?;
            let upload_limit = limits.get("upload").unwrap_or(5 * 1024 * 1024);
            match Multipart::with_body(data.open().take(upload_limit), boundary)
                .save()
                .temp()
            {
                SaveResult::Full(entries) => {
                    let mut body = FormBody::default();
                    let mut fields = form_urlencoded::Serializer::new(String::new());
                    for (name, values) in entries.fields {
                        for field in values {
                            match field.headers.filename {
                                Some(filename) => {
                                    let bytes = read_bytes(field.data)?;
                                    if !filename.is_empty() || !bytes.is_empty() {
                                        body.files.insert(
                                            name.to_string(),
                                            Upload {
                                                filename: Some(filename),
                                                bytes,
                                            },
                                        );
                                    }
                                }
                                None => {
                                    let bytes = read_bytes(field.data)?;
                                    fields.append_pair(&name, &String::from_utf8_lossy(&bytes));
                                }
                            }
                        }
                    }
                    body.encoded = fields.finish();
                    Ok(body)
                }
                SaveResult::Partial(_, reason) => {
                    warn!("Incomplete multipart body: {:?}", reason);
                    Err(Error::InvalidValue)
                }
                SaveResult::Error(e) => Err(Error::from(e)),
            }
        } else if ct.is_form() {
            let form_limit = limits.get("forms").unwrap_or(128 * 1024);
            let mut encoded = String::new();
            data.open().take(form_limit).read_to_string(&mut encoded)?;
            Ok(FormBody {
                encoded,
                files: HashMap::new(),
            })
        } else {
            Ok(FormBody::default())
        }
    }
}

fn read_bytes(data: SavedData) -> io::Result<Vec<u8>> {
    match data {
        SavedData::Text(s) => Ok(s.into_bytes()),
        SavedData::Bytes(bytes) => Ok(bytes),
        SavedData::File(path, _) => fs::read(path),
    }
}

/// Image formats accepted for post illustrations.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum ImageKind {
    Gif,
    Png,
    Jpeg,
    WebP,
    Bmp,
}

impl ImageKind {
    fn from_format(format: ImageFormat) -> Option<ImageKind> {
        match format {
            ImageFormat::Gif => Some(ImageKind::Gif),
            ImageFormat::Png => Some(ImageKind::Png),
            ImageFormat::Jpeg => Some(ImageKind::Jpeg),
            ImageFormat::WebP => Some(ImageKind::WebP),
            ImageFormat::Bmp => Some(ImageKind::Bmp),
            _ => None,
        }
    }

    /// Recognizes an accepted image. The whole file must decode, a matching
    /// header is not enough.
    pub fn detect(bytes: &[u8]) -> Option<ImageKind> {
        let format = image::guess_format(bytes).ok()?;
        let kind = ImageKind::from_format(format)?;
        match image::load_from_memory_with_format(bytes, format) {
            Ok(_) => Some(kind),
            Err(e) => {
                warn!("Upload announced as {:?} doesn't decode: {}", format, e);
                None
            }
        }
    }

    pub fn extension(self) -> &'static str {
        match self {
            ImageKind::Gif => "gif",
            ImageKind::Png => "png",
            ImageKind::Jpeg => "jpg",
            ImageKind::WebP => "webp",
            ImageKind::Bmp => "bmp",
        }
    }
}

/// Keeps the last path component of a client-supplied name, restricted to
/// ASCII letters, digits, dots, hyphens and underscores.
pub fn sanitize_filename(name: &str) -> String {
    let base = name.rsplit(|c: char| c == '/' || c == '\\').next().unwrap_or("");
    let clean = base
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '.' || c == '-' || c == '_' {
                c
            } else {
                '_'
            }
        })
        .collect::<String>();
    clean.trim_start_matches('.').to_owned()
}

/// Where uploaded images are written.
pub struct MediaStore {
    root: PathBuf,
}

impl MediaStore {
    pub const POSTS_DIR: &'static str = "posts";

    pub fn new<P: Into<PathBuf>>(root: P) -> Self {
        MediaStore { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Saves a post image and returns its path relative to the media root,
    /// `posts/<file name>`. An existing file is never overwritten: a unique
    /// suffix goes before the extension instead.
    pub fn store_post_image(&self, upload: &Upload, kind: ImageKind) -> Result<String> {
        let dir = self.root.join(Self::POSTS_DIR);
        fs::create_dir_all(&dir)?;

        let name = upload
            .filename
            .as_deref()
            .map(sanitize_filename)
            .filter(|n| !n.is_empty())
            .unwrap_or_else(|| format!("{}.{}", GUID::rand(), kind.extension()));
        let name = if dir.join(&name).exists() {
            let (stem, ext) = match name.rfind('.') {
                Some(dot) if dot > 0 => (&name[..dot], &name[dot..]),
                _ => (name.as_str(), ""),
            };
            format!("{}_{}{}", stem, GUID::rand(), ext)
        } else {
            name
        };

        fs::write(dir.join(&name), &upload.bytes)?;
        Ok(format!("{}/{}", Self::POSTS_DIR, name))
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use std::env::temp_dir;

    pub(crate) const SMALL_GIF: &[u8] = b"GIF89a\x02\x00\x01\x00\x80\x00\x00\x00\x00\x00\xff\xff\xff!\xf9\x04\x00\x00\x00\x00\x00,\x00\x00\x00\x00\x02\x00\x01\x00\x00\x02\x02\x0c\n\x00;";

    #[test]
    fn detection() {
        assert_eq!(ImageKind::detect(SMALL_GIF), Some(ImageKind::Gif));
        assert_eq!(ImageKind::detect(b"not an image"), None);
        assert_eq!(ImageKind::detect(b""), None);
    }

    #[test]
    fn headers_alone_are_not_images() {
        assert_eq!(ImageKind::detect(b"GIF89a<?php system($_GET[c]); ?>"), None);
        assert_eq!(ImageKind::detect(&SMALL_GIF[..20]), None);
        assert_eq!(ImageKind::detect(b"\x89PNG\r\n\x1a\n\x00\x00"), None);
        assert_eq!(ImageKind::detect(b"BM0123456789abcdef"), None);
    }

    #[test]
    fn filenames() {
        assert_eq!(sanitize_filename("small.gif"), "small.gif");
        assert_eq!(sanitize_filename("../../etc/passwd"), "passwd");
        assert_eq!(sanitize_filename("C:\\photos\\my cat.png"), "my_cat.png");
        assert_eq!(sanitize_filename(".hidden"), "hidden");
        assert_eq!(sanitize_filename(""), "");
    }

    #[test]
    fn collisions_get_a_suffix() {
        let store = MediaStore::new(temp_dir().join(format!("yatube-media-{}", GUID::rand())));
        let upload = Upload {
            filename: Some("small.gif".to_owned()),
            bytes: SMALL_GIF.to_vec(),
        };
        let first = store.store_post_image(&upload, ImageKind::Gif).unwrap();
        let second = store.store_post_image(&upload, ImageKind::Gif).unwrap();
        assert_eq!(first, "posts/small.gif");
        assert_ne!(first, second);
        assert!(second.starts_with("posts/small_") && second.ends_with(".gif"));
        assert_eq!(fs::read(store.root().join(&second)).unwrap(), SMALL_GIF);
        fs::remove_dir_all(store.root()).unwrap();
    }

    #[test]
    fn unnamed_uploads_get_a_generated_name() {
        let store = MediaStore::new(temp_dir().join(format!("yatube-media-{}", GUID::rand())));
        let upload = Upload {
            filename: None,
            bytes: SMALL_GIF.to_vec(),
        };
        let path = store.store_post_image(&upload, ImageKind::Gif).unwrap();
        assert!(path.starts_with("posts/") && path.ends_with(".gif"));
        fs::remove_dir_all(store.root()).unwrap();
    }
}
